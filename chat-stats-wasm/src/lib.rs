use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use wasm_bindgen::prelude::*;

mod config;
mod error;
mod gaps;
mod metrics;
mod parsing;
mod phrases;
mod text;
mod types;

pub use config::{AnalysisOptions, ChartStyle};
pub use error::{ChatError, Result};
pub use gaps::{format_duration, longest_personal_gap, longest_silences, response_times};
pub use metrics::{
    chat_summary, count_by_sender, day_key, hourly_counts, hourly_share_by_participant,
    length_histogram, longest_streaks, message_lengths, participant_cards, participant_series,
    participant_share, period_counts, streak_for, week_key, weekday_counts, weekday_hour_heatmap,
    Period,
};
pub use parsing::{
    parse, resolve_timestamp, ChatParser, Classified, ColonSplit, Message, ParsedChat,
    SenderClassifier, SkippedHeader,
};
pub use phrases::{
    count_words, emoji_counts, emoji_counts_by_sender, emoji_trend, rank, tfidf, top_emojis,
    top_ngrams, top_words, word_cloud, word_counts, word_counts_by_sender, WordCountOptions,
    WordCounts,
};
pub use text::{extract_emojis, ngrams, normalize, tokenize};
pub use types::*;

// Milliseconds from a monotonic clock; `performance.now()` in the browser.
#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    use once_cell::sync::Lazy;
    use std::time::Instant;
    static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);
    EPOCH.elapsed().as_secs_f64() * 1000.0
}

#[cfg(all(target_arch = "wasm32", feature = "timing"))]
macro_rules! log_step {
    ($label:expr, $ms:expr) => {
        web_sys::console::log_1(&format!("[wasm] {} took {:.1}ms", $label, $ms).into());
    };
}

#[cfg(not(all(target_arch = "wasm32", feature = "timing")))]
macro_rules! log_step {
    ($label:expr, $ms:expr) => {
        let _ = (&$label, &$ms);
    };
}

// Outcome of one engine inside a `Report`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Ready(T),
    NotEnoughData,
    Failed(String),
}

impl<T> Section<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(v) => Some(v),
            _ => None,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "engine panicked".to_string())
}

// Run one engine so that its failure is reported instead of propagated.
fn section<T>(engine: &'static str, run: impl FnOnce() -> Result<T>) -> Section<T> {
    let started = now_ms();
    let outcome = catch_unwind(AssertUnwindSafe(run));
    let elapsed = now_ms() - started;
    log_step!(engine, elapsed);

    match outcome {
        Ok(Ok(value)) => {
            tracing::debug!(engine, elapsed_ms = elapsed, "engine finished");
            Section::Ready(value)
        }
        Ok(Err(err)) if err.is_not_enough_data() => {
            tracing::debug!(engine, error = %err, "not enough data");
            Section::NotEnoughData
        }
        Ok(Err(err)) => {
            tracing::error!(engine, error = %err, "engine failed");
            Section::Failed(err.to_string())
        }
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            tracing::error!(engine, panic = %msg, "engine panicked");
            Section::Failed(msg)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub skipped: Vec<SkippedHeader>,
    pub summary: Section<ChatSummary>,
    pub by_participant: Section<Vec<Count>>,
    pub daily: Section<Vec<Count>>,
    pub weekly: Section<Vec<Count>>,
    pub monthly: Section<Vec<Count>>,
    pub hourly: Section<Vec<HourCount>>,
    pub weekdays: Section<Vec<Count>>,
    pub heatmap: Section<Heatmap>,
    pub hourly_by_participant: Section<Vec<ParticipantHourly>>,
    pub weekly_by_participant: Section<PeriodSeries>,
    pub monthly_share: Section<PeriodShare>,
    pub streaks: Section<Vec<Streak>>,
    pub silences: Section<Vec<Silence>>,
    pub response_times: Section<Vec<ResponseStats>>,
    pub length_histogram: Section<Vec<LengthBin>>,
    pub participants: Section<Vec<ParticipantCard>>,
    pub top_words: Section<Vec<Count>>,
    pub top_ngrams: Section<Vec<Count>>,
    pub word_cloud: Section<Vec<CloudWord>>,
    pub top_emojis: Section<Vec<Count>>,
    pub emoji_trend: Section<EmojiTrend>,
    pub tfidf: Section<Vec<ParticipantTerms>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_style: Option<ChartStyle>,
}

pub fn build_report(chat: &ParsedChat, opts: &AnalysisOptions) -> Report {
    let msgs = chat.messages();
    let started = now_ms();

    let report = Report {
        skipped: chat.skipped.clone(),
        summary: section("summary", || chat_summary(msgs)),
        by_participant: section("by_participant", || Ok(count_by_sender(msgs))),
        daily: section("daily", || Ok(period_counts(msgs, Period::Day))),
        weekly: section("weekly", || Ok(period_counts(msgs, Period::Week))),
        monthly: section("monthly", || Ok(period_counts(msgs, Period::Month))),
        hourly: section("hourly", || Ok(hourly_counts(msgs))),
        weekdays: section("weekdays", || Ok(weekday_counts(msgs))),
        heatmap: section("heatmap", || Ok(weekday_hour_heatmap(msgs))),
        hourly_by_participant: section("hourly_by_participant", || {
            Ok(hourly_share_by_participant(msgs))
        }),
        weekly_by_participant: section("weekly_by_participant", || {
            Ok(participant_series(msgs, Period::Week))
        }),
        monthly_share: section("monthly_share", || {
            Ok(participant_share(msgs, Period::Month))
        }),
        streaks: section("streaks", || Ok(longest_streaks(msgs))),
        silences: section("silences", || longest_silences(msgs, opts.silence_top)),
        response_times: section("response_times", || response_times(msgs)),
        length_histogram: section("length_histogram", || {
            Ok(length_histogram(msgs, opts.length_bin_width))
        }),
        participants: section("participants", || {
            Ok(participant_cards(msgs, opts.participant_top))
        }),
        top_words: section("top_words", || {
            Ok(top_words(msgs, opts.top_words, opts.drop_stopwords))
        }),
        top_ngrams: section("top_ngrams", || {
            Ok(top_ngrams(msgs, opts.ngram, opts.top_ngrams))
        }),
        word_cloud: section("word_cloud", || {
            Ok(word_cloud(msgs, opts.word_cloud_limit, opts.drop_stopwords))
        }),
        top_emojis: section("top_emojis", || Ok(top_emojis(msgs, opts.top_emojis))),
        emoji_trend: section("emoji_trend", || Ok(emoji_trend(msgs, opts.emoji_trend_top))),
        tfidf: section("tfidf", || Ok(tfidf(msgs, opts.tfidf_top))),
        chart_style: opts.include_chart_style.then(ChartStyle::default),
    };

    tracing::debug!(
        messages = msgs.len(),
        elapsed_ms = now_ms() - started,
        "report built"
    );
    report
}

pub fn analyze(raw: &str, opts: &AnalysisOptions) -> Result<Report> {
    let chat = parse(raw).non_empty()?;
    Ok(build_report(&chat, opts))
}

#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js<T: Serialize>(value: &T) -> std::result::Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn options_from_js(options: JsValue) -> std::result::Result<AnalysisOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(AnalysisOptions::default());
    }
    serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn parse_chat(raw: &str) -> std::result::Result<JsValue, JsValue> {
    to_js(&parse(raw))
}

#[wasm_bindgen]
pub fn analyze_chat(raw: &str, options: JsValue) -> std::result::Result<JsValue, JsValue> {
    let opts = options_from_js(options)?;
    let report = analyze(raw, &opts).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_js(&report)
}

#[wasm_bindgen]
pub fn default_chart_style() -> std::result::Result<JsValue, JsValue> {
    to_js(&ChartStyle::default())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn analyze_chat_native(raw: &str, options_json: &str) -> Result<String> {
    let opts = AnalysisOptions::from_json(options_json)?;
    let report = analyze(raw, &opts)?;
    Ok(serde_json::to_string(&report)?)
}
