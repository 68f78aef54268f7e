use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;

pub type CountMap = HashMap<String, u32>;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Count {
    pub label: String,
    pub value: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HourCount {
    pub hour: u32,
    pub value: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatSummary {
    pub total_messages: usize,
    pub user_messages: usize,
    pub system_messages: usize,
    pub participants: usize,
    pub first_message: NaiveDateTime,
    pub last_message: NaiveDateTime,
    pub total_characters: usize,
    pub average_per_day: f64,
    pub most_active_day: Option<Count>,
    pub most_active_hour: Option<HourCount>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ParticipantHourly {
    pub name: String,
    pub total: u32,
    pub fractions: Vec<f64>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Heatmap {
    pub days: Vec<String>,
    pub grid: Vec<[u32; 24]>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ParticipantSeries {
    pub name: String,
    pub counts: Vec<u32>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PeriodSeries {
    pub buckets: Vec<String>,
    pub series: Vec<ParticipantSeries>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ParticipantShare {
    pub name: String,
    pub percents: Vec<f64>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PeriodShare {
    pub buckets: Vec<String>,
    pub series: Vec<ParticipantShare>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Streak {
    pub sender: String,
    pub length: u32,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Silence {
    pub duration_ms: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub breaker: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ResponseStats {
    pub responder: String,
    pub replies: u32,
    pub median_ms: i64,
    pub mean_ms: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PersonalGap {
    pub duration_ms: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LengthBin {
    pub start: usize,
    pub end: usize,
    pub count: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ParticipantCard {
    pub name: String,
    pub messages: u32,
    pub average_length: f64,
    pub longest_length: usize,
    pub longest_text: String,
    pub unique_words: usize,
    pub top_emojis: Vec<Count>,
    pub top_words: Vec<Count>,
    pub longest_gap: Option<PersonalGap>,
    pub last_message: NaiveDateTime,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CloudWord {
    pub word: String,
    pub count: u32,
    // count / user messages in the chat
    pub ratio: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EmojiSeries {
    pub emoji: String,
    pub counts: Vec<u32>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EmojiTrend {
    pub months: Vec<String>,
    pub series: Vec<EmojiSeries>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TfIdfEntry {
    pub word: String,
    pub raw_count: u32,
    pub score: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ParticipantTerms {
    pub name: String,
    pub terms: Vec<TfIdfEntry>,
}
