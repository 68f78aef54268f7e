use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub top_words: usize,
    pub top_emojis: usize,
    pub ngram: usize,
    pub top_ngrams: usize,
    pub tfidf_top: usize,
    pub silence_top: usize,
    pub emoji_trend_top: usize,
    pub word_cloud_limit: usize,
    pub length_bin_width: usize,
    pub participant_top: usize,
    pub drop_stopwords: bool,
    pub include_chart_style: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            top_words: 20,
            top_emojis: 20,
            ngram: 3,
            top_ngrams: 20,
            tfidf_top: 10,
            silence_top: 10,
            emoji_trend_top: 5,
            word_cloud_limit: 100,
            length_bin_width: 10,
            participant_top: 3,
            drop_stopwords: false,
            include_chart_style: false,
        }
    }
}

impl AnalysisOptions {
    pub fn with_ngram(mut self, ngram: usize) -> Self {
        self.ngram = ngram.max(1);
        self
    }

    pub fn with_top_words(mut self, n: usize) -> Self {
        self.top_words = n;
        self
    }

    pub fn with_top_emojis(mut self, n: usize) -> Self {
        self.top_emojis = n;
        self
    }

    pub fn with_tfidf_top(mut self, n: usize) -> Self {
        self.tfidf_top = n;
        self
    }

    pub fn with_silence_top(mut self, n: usize) -> Self {
        self.silence_top = n;
        self
    }

    pub fn with_drop_stopwords(mut self, drop: bool) -> Self {
        self.drop_stopwords = drop;
        self
    }

    pub fn with_chart_style(mut self, include: bool) -> Self {
        self.include_chart_style = include;
        self
    }

    pub fn from_json(raw: &str) -> crate::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }
}

// Presentation constants for the chart layer. The core never reads these;
// they travel to the renderer as an explicit value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub title_size: u32,
    pub tick_font_size: u32,
    pub left_margin: u32,
    pub palette: Vec<String>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title_size: 20,
            tick_font_size: 14,
            left_margin: 80,
            palette: [
                "#2a6ebb", "#00b894", "#0984e3", "#00cec9", "#6c5ce7", "#fdcb6e", "#e17055",
                "#636e72",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

impl ChartStyle {
    pub fn color_for(&self, idx: usize) -> Option<&str> {
        if self.palette.is_empty() {
            return None;
        }
        Some(self.palette[idx % self.palette.len()].as_str())
    }
}
