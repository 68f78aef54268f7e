use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;

use crate::parsing::Message;
use crate::text::{extract_emojis, ngrams, stopwords_set, tokenize};
use crate::types::{
    CloudWord, Count, CountMap, EmojiSeries, EmojiTrend, ParticipantTerms, TfIdfEntry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordCountOptions {
    pub ngram: usize,
    pub skip_emojis: bool,
    pub drop_stopwords: bool,
    pub by_participant: bool,
}

impl Default for WordCountOptions {
    fn default() -> Self {
        Self {
            ngram: 1,
            skip_emojis: false,
            drop_stopwords: false,
            by_participant: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WordCounts {
    Flat(CountMap),
    BySender(HashMap<String, CountMap>),
}

fn grams_for(body: &str, opts: &WordCountOptions) -> Vec<String> {
    let mut tokens = tokenize(body, opts.skip_emojis);
    if opts.drop_stopwords {
        let stop = stopwords_set();
        tokens.retain(|t| !stop.contains(t.as_str()));
    }
    ngrams(&tokens, opts.ngram)
}

pub fn word_counts(messages: &[Message], opts: &WordCountOptions) -> CountMap {
    let mut map = CountMap::new();
    for m in messages.iter().filter(|m| !m.is_system()) {
        for gram in grams_for(&m.body, opts) {
            *map.entry(gram).or_insert(0) += 1;
        }
    }
    map
}

pub fn word_counts_by_sender(
    messages: &[Message],
    opts: &WordCountOptions,
) -> HashMap<String, CountMap> {
    let mut map: HashMap<String, CountMap> = HashMap::new();
    for m in messages {
        let Some(sender) = m.sender.as_deref() else {
            continue;
        };
        let entry = map.entry(sender.to_string()).or_default();
        for gram in grams_for(&m.body, opts) {
            *entry.entry(gram).or_insert(0) += 1;
        }
    }
    map
}

pub fn count_words(messages: &[Message], opts: &WordCountOptions) -> WordCounts {
    if opts.by_participant {
        WordCounts::BySender(word_counts_by_sender(messages, opts))
    } else {
        WordCounts::Flat(word_counts(messages, opts))
    }
}

pub fn emoji_counts(messages: &[Message]) -> CountMap {
    let mut map = CountMap::new();
    for m in messages.iter().filter(|m| !m.is_system()) {
        for hit in extract_emojis(&m.body) {
            *map.entry(hit).or_insert(0) += 1;
        }
    }
    map
}

pub fn emoji_counts_by_sender(messages: &[Message]) -> HashMap<String, CountMap> {
    let mut map: HashMap<String, CountMap> = HashMap::new();
    for m in messages {
        let Some(sender) = m.sender.as_deref() else {
            continue;
        };
        let entry = map.entry(sender.to_string()).or_default();
        for hit in extract_emojis(&m.body) {
            *entry.entry(hit).or_insert(0) += 1;
        }
    }
    map
}

// Highest counts first. Equal counts keep the map's enumeration order, so
// their relative order is unspecified.
pub fn rank(map: &CountMap, take: usize) -> Vec<Count> {
    let mut items: Vec<Count> = map
        .iter()
        .map(|(label, value)| Count {
            label: label.clone(),
            value: *value,
        })
        .collect();
    items.sort_by_key(|c| std::cmp::Reverse(c.value));
    items.truncate(take);
    items
}

pub fn top_words(messages: &[Message], take: usize, drop_stopwords: bool) -> Vec<Count> {
    let opts = WordCountOptions {
        skip_emojis: true,
        drop_stopwords,
        ..WordCountOptions::default()
    };
    rank(&word_counts(messages, &opts), take)
}

pub fn top_ngrams(messages: &[Message], n: usize, take: usize) -> Vec<Count> {
    let opts = WordCountOptions {
        ngram: n,
        ..WordCountOptions::default()
    };
    rank(&word_counts(messages, &opts), take)
}

pub fn top_emojis(messages: &[Message], take: usize) -> Vec<Count> {
    rank(&emoji_counts(messages), take)
}

pub fn word_cloud(messages: &[Message], take: usize, drop_stopwords: bool) -> Vec<CloudWord> {
    let opts = WordCountOptions {
        skip_emojis: true,
        drop_stopwords,
        ..WordCountOptions::default()
    };
    let counts: CountMap = word_counts(messages, &opts)
        .into_iter()
        .filter(|(word, count)| word.chars().count() > 1 && *count > 1)
        .collect();
    let total = messages.iter().filter(|m| !m.is_system()).count().max(1) as f64;
    rank(&counts, take)
        .into_iter()
        .map(|c| CloudWord {
            ratio: c.value as f64 / total,
            word: c.label,
            count: c.value,
        })
        .collect()
}

pub fn emoji_trend(messages: &[Message], top_k: usize) -> EmojiTrend {
    let top: Vec<String> = top_emojis(messages, top_k)
        .into_iter()
        .map(|c| c.label)
        .collect();

    let mut per_month: BTreeMap<String, HashMap<String, u32>> = BTreeMap::new();
    for m in messages.iter().filter(|m| !m.is_system()) {
        let month = format!("{:04}-{:02}", m.timestamp.year(), m.timestamp.month());
        let bucket = per_month.entry(month).or_default();
        for hit in extract_emojis(&m.body) {
            if top.contains(&hit) {
                *bucket.entry(hit).or_insert(0) += 1;
            }
        }
    }

    let series = top
        .iter()
        .map(|emoji| EmojiSeries {
            emoji: emoji.clone(),
            counts: per_month
                .values()
                .map(|b| b.get(emoji).copied().unwrap_or(0))
                .collect(),
        })
        .collect();

    EmojiTrend {
        months: per_month.into_keys().collect(),
        series,
    }
}

// Each participant's vocabulary is one document: `tf` is the raw count,
// `idf = ln(participants / participants_using_word)`. Words every
// participant uses score zero.
pub fn tfidf(messages: &[Message], take: usize) -> Vec<ParticipantTerms> {
    let opts = WordCountOptions {
        skip_emojis: true,
        ..WordCountOptions::default()
    };
    let by_sender = word_counts_by_sender(messages, &opts);
    let participants = by_sender.len() as f64;

    let mut doc_freq: HashMap<&str, u32> = HashMap::new();
    for counts in by_sender.values() {
        for word in counts.keys() {
            *doc_freq.entry(word.as_str()).or_insert(0) += 1;
        }
    }

    let mut res: Vec<ParticipantTerms> = by_sender
        .iter()
        .map(|(name, counts)| {
            let mut terms: Vec<TfIdfEntry> = counts
                .iter()
                .map(|(word, &raw_count)| {
                    let df = doc_freq.get(word.as_str()).copied().unwrap_or(1).max(1);
                    let idf = (participants / df as f64).ln();
                    TfIdfEntry {
                        word: word.clone(),
                        raw_count,
                        score: raw_count as f64 * idf,
                    }
                })
                .collect();
            terms.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            terms.truncate(take);
            ParticipantTerms {
                name: name.clone(),
                terms,
            }
        })
        .collect();

    res.sort_by(|a, b| a.name.cmp(&b.name));
    res
}
