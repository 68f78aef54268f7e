use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{ChatError, Result};
use crate::gaps::longest_personal_gap;
use crate::parsing::Message;
use crate::phrases::{emoji_counts_by_sender, rank, word_counts_by_sender, WordCountOptions};
use crate::text::grapheme_len;
use crate::types::{
    ChatSummary, Count, Heatmap, HourCount, LengthBin, ParticipantCard, ParticipantHourly,
    ParticipantSeries, ParticipantShare, PeriodSeries, PeriodShare, Streak,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn key(self, ts: &NaiveDateTime) -> String {
        match self {
            Period::Day => day_key(ts.date()),
            Period::Week => week_key(ts.date()),
            Period::Month => format!("{:04}-{:02}", ts.year(), ts.month()),
        }
    }
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// The week belongs to the ISO year of its Thursday; week 1 holds the
// year's first Thursday.
pub fn week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

pub(crate) fn weekday_index(wd: chrono::Weekday) -> usize {
    wd.num_days_from_sunday() as usize
}

pub(crate) fn weekday_label(idx: usize) -> String {
    match idx {
        0 => "Sun",
        1 => "Mon",
        2 => "Tue",
        3 => "Wed",
        4 => "Thu",
        5 => "Fri",
        6 => "Sat",
        _ => "?",
    }
    .to_string()
}

fn user_messages(messages: &[Message]) -> impl Iterator<Item = (&str, &Message)> {
    messages
        .iter()
        .filter_map(|m| m.sender.as_deref().map(|s| (s, m)))
}

fn grouped_by_sender(messages: &[Message]) -> HashMap<&str, Vec<&Message>> {
    let mut grouped: HashMap<&str, Vec<&Message>> = HashMap::new();
    for (sender, m) in user_messages(messages) {
        grouped.entry(sender).or_default().push(m);
    }
    grouped
}

fn senders_by_activity(messages: &[Message]) -> Vec<String> {
    count_by_sender(messages)
        .into_iter()
        .map(|c| c.label)
        .collect()
}

pub fn count_by_sender(messages: &[Message]) -> Vec<Count> {
    let mut map = HashMap::new();
    for (sender, _) in user_messages(messages) {
        *map.entry(sender.to_string()).or_insert(0u32) += 1;
    }
    let mut items: Vec<_> = map
        .into_iter()
        .map(|(label, value)| Count { label, value })
        .collect();
    items.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
    items
}

pub fn period_counts(messages: &[Message], period: Period) -> Vec<Count> {
    let mut map: BTreeMap<String, u32> = BTreeMap::new();
    for (_, m) in user_messages(messages) {
        *map.entry(period.key(&m.timestamp)).or_insert(0) += 1;
    }
    map.into_iter()
        .map(|(label, value)| Count { label, value })
        .collect()
}

pub fn hourly_counts(messages: &[Message]) -> Vec<HourCount> {
    let mut map = [0u32; 24];
    for (_, m) in user_messages(messages) {
        map[m.timestamp.hour() as usize] += 1;
    }
    map.iter()
        .enumerate()
        .map(|(hour, value)| HourCount {
            hour: hour as u32,
            value: *value,
        })
        .collect()
}

pub fn weekday_counts(messages: &[Message]) -> Vec<Count> {
    let mut map = [0u32; 7];
    for (_, m) in user_messages(messages) {
        map[weekday_index(m.timestamp.weekday())] += 1;
    }
    map.iter()
        .enumerate()
        .map(|(i, value)| Count {
            label: weekday_label(i),
            value: *value,
        })
        .collect()
}

pub fn weekday_hour_heatmap(messages: &[Message]) -> Heatmap {
    let mut grid = vec![[0u32; 24]; 7];
    for (_, m) in user_messages(messages) {
        grid[weekday_index(m.timestamp.weekday())][m.timestamp.hour() as usize] += 1;
    }
    Heatmap {
        days: (0..7).map(weekday_label).collect(),
        grid,
    }
}

pub fn hourly_share_by_participant(messages: &[Message]) -> Vec<ParticipantHourly> {
    let mut hours: HashMap<&str, [u32; 24]> = HashMap::new();
    for (sender, m) in user_messages(messages) {
        hours.entry(sender).or_insert([0; 24])[m.timestamp.hour() as usize] += 1;
    }

    senders_by_activity(messages)
        .into_iter()
        .map(|name| {
            let counts = hours.get(name.as_str()).copied().unwrap_or([0; 24]);
            let total: u32 = counts.iter().sum();
            let denom = total.max(1) as f64;
            ParticipantHourly {
                fractions: counts.iter().map(|c| *c as f64 / denom).collect(),
                name,
                total,
            }
        })
        .collect()
}

fn per_sender_buckets(
    messages: &[Message],
    period: Period,
) -> (Vec<String>, HashMap<&str, HashMap<String, u32>>) {
    let mut per_sender: HashMap<&str, HashMap<String, u32>> = HashMap::new();
    let mut all: BTreeSet<String> = BTreeSet::new();
    for (sender, m) in user_messages(messages) {
        let key = period.key(&m.timestamp);
        *per_sender
            .entry(sender)
            .or_default()
            .entry(key.clone())
            .or_insert(0) += 1;
        all.insert(key);
    }
    (all.into_iter().collect(), per_sender)
}

// Counts per participant per bucket. A bucket any participant posted in
// appears for everyone, with 0 where they were silent.
pub fn participant_series(messages: &[Message], period: Period) -> PeriodSeries {
    let (buckets, per_sender) = per_sender_buckets(messages, period);
    let series = senders_by_activity(messages)
        .into_iter()
        .map(|name| {
            let own = per_sender.get(name.as_str());
            let counts = buckets
                .iter()
                .map(|b| own.and_then(|o| o.get(b)).copied().unwrap_or(0))
                .collect();
            ParticipantSeries { name, counts }
        })
        .collect();
    PeriodSeries { buckets, series }
}

pub fn participant_share(messages: &[Message], period: Period) -> PeriodShare {
    let PeriodSeries { buckets, series } = participant_series(messages, period);
    let totals: Vec<u32> = (0..buckets.len())
        .map(|i| series.iter().map(|s| s.counts[i]).sum())
        .collect();
    let series = series
        .into_iter()
        .map(|s| ParticipantShare {
            percents: s
                .counts
                .iter()
                .zip(&totals)
                .map(|(count, total)| *count as f64 / (*total).max(1) as f64 * 100.0)
                .collect(),
            name: s.name,
        })
        .collect();
    PeriodShare { buckets, series }
}

// Longest run of consecutive calendar days in `days`. Ties keep the
// earliest run.
fn longest_run(days: &BTreeSet<NaiveDate>) -> (u32, Option<NaiveDate>, Option<NaiveDate>) {
    let mut iter = days.iter().copied();
    let Some(first) = iter.next() else {
        return (0, None, None);
    };

    let (mut best, mut best_start, mut best_end) = (1u32, first, first);
    let (mut current, mut current_start, mut prev) = (1u32, first, first);

    for day in iter {
        if day - prev == chrono::Duration::days(1) {
            current += 1;
        } else {
            current = 1;
            current_start = day;
        }
        if current > best {
            best = current;
            best_start = current_start;
            best_end = day;
        }
        prev = day;
    }
    (best, Some(best_start), Some(best_end))
}

pub fn streak_for(messages: &[Message], sender: &str) -> Streak {
    let days: BTreeSet<NaiveDate> = user_messages(messages)
        .filter(|(s, _)| *s == sender)
        .map(|(_, m)| m.timestamp.date())
        .collect();
    let (length, start, end) = longest_run(&days);
    Streak {
        sender: sender.to_string(),
        length,
        start,
        end,
    }
}

pub fn longest_streaks(messages: &[Message]) -> Vec<Streak> {
    let mut days: HashMap<&str, BTreeSet<NaiveDate>> = HashMap::new();
    for (sender, m) in user_messages(messages) {
        days.entry(sender).or_default().insert(m.timestamp.date());
    }

    let mut streaks: Vec<Streak> = days
        .into_iter()
        .map(|(sender, set)| {
            let (length, start, end) = longest_run(&set);
            Streak {
                sender: sender.to_string(),
                length,
                start,
                end,
            }
        })
        .collect();
    streaks.sort_by(|a, b| b.length.cmp(&a.length).then_with(|| a.sender.cmp(&b.sender)));
    streaks
}

pub fn message_lengths(messages: &[Message]) -> Vec<usize> {
    user_messages(messages)
        .map(|(_, m)| grapheme_len(&m.body))
        .collect()
}

pub fn length_histogram(messages: &[Message], bin_width: usize) -> Vec<LengthBin> {
    let width = bin_width.max(1);
    let lengths = message_lengths(messages);
    let Some(max) = lengths.iter().max().copied() else {
        return Vec::new();
    };

    let mut bins: Vec<LengthBin> = (0..=max / width)
        .map(|i| LengthBin {
            start: i * width,
            end: (i + 1) * width,
            count: 0,
        })
        .collect();
    for len in lengths {
        bins[len / width].count += 1;
    }
    bins
}

fn busiest<K: Ord + Clone>(map: &BTreeMap<K, u32>) -> Option<(K, u32)> {
    // First key wins a tie.
    map.iter()
        .fold(None, |best: Option<(&K, u32)>, (k, v)| match best {
            Some((_, bv)) if bv >= *v => best,
            _ => Some((k, *v)),
        })
        .map(|(k, v)| (k.clone(), v))
}

pub fn chat_summary(messages: &[Message]) -> Result<ChatSummary> {
    let users: Vec<&Message> = user_messages(messages).map(|(_, m)| m).collect();
    let (Some(first), Some(last)) = (
        users.iter().map(|m| m.timestamp).min(),
        users.iter().map(|m| m.timestamp).max(),
    ) else {
        return Err(ChatError::AggregationInputEmpty {
            engine: "summary",
            needed: 1,
            got: 0,
        });
    };

    let mut days: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    let mut hours: BTreeMap<u32, u32> = BTreeMap::new();
    for m in &users {
        *days.entry(m.timestamp.date()).or_insert(0) += 1;
        *hours.entry(m.timestamp.hour()).or_insert(0) += 1;
    }

    Ok(ChatSummary {
        total_messages: messages.len(),
        user_messages: users.len(),
        system_messages: messages.len() - users.len(),
        participants: grouped_by_sender(messages).len(),
        first_message: first,
        last_message: last,
        total_characters: users.iter().map(|m| grapheme_len(&m.body)).sum(),
        average_per_day: users.len() as f64 / days.len().max(1) as f64,
        most_active_day: busiest(&days).map(|(d, value)| Count {
            label: day_key(d),
            value,
        }),
        most_active_hour: busiest(&hours).map(|(hour, value)| HourCount { hour, value }),
    })
}

pub fn participant_cards(messages: &[Message], top: usize) -> Vec<ParticipantCard> {
    let Some(chat_end) = user_messages(messages).map(|(_, m)| m.timestamp).max() else {
        return Vec::new();
    };
    let grouped = grouped_by_sender(messages);
    let words = word_counts_by_sender(
        messages,
        &WordCountOptions {
            skip_emojis: true,
            ..WordCountOptions::default()
        },
    );
    let emojis = emoji_counts_by_sender(messages);

    let mut cards: Vec<ParticipantCard> = grouped
        .into_iter()
        .map(|(name, msgs)| {
            let mut longest_length = 0usize;
            let mut longest_text = String::new();
            let mut total_length = 0usize;
            for m in &msgs {
                let len = grapheme_len(&m.body);
                total_length += len;
                if len > longest_length {
                    longest_length = len;
                    longest_text = m.body.clone();
                }
            }
            let vocab = words.get(name);
            ParticipantCard {
                name: name.to_string(),
                messages: msgs.len() as u32,
                average_length: total_length as f64 / msgs.len().max(1) as f64,
                longest_length,
                longest_text,
                unique_words: vocab.map(|v| v.len()).unwrap_or(0),
                top_emojis: emojis.get(name).map(|e| rank(e, top)).unwrap_or_default(),
                top_words: vocab.map(|v| rank(v, top)).unwrap_or_default(),
                longest_gap: longest_personal_gap(&msgs, chat_end),
                last_message: msgs
                    .iter()
                    .map(|m| m.timestamp)
                    .max()
                    .unwrap_or(chat_end),
            }
        })
        .collect();

    cards.sort_by(|a, b| b.messages.cmp(&a.messages).then_with(|| a.name.cmp(&b.name)));
    cards
}
