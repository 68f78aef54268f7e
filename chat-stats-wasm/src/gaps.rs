use chrono::NaiveDateTime;
use std::collections::HashMap;

use crate::error::{ChatError, Result};
use crate::parsing::Message;
use crate::types::{PersonalGap, ResponseStats, Silence};

fn millis(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_milliseconds()
}

// The `take` longest gaps between chronologically adjacent messages of the
// whole chat, longest first. `breaker` is whoever ended the gap.
pub fn longest_silences(messages: &[Message], take: usize) -> Result<Vec<Silence>> {
    if messages.len() < 2 {
        return Err(ChatError::AggregationInputEmpty {
            engine: "silences",
            needed: 2,
            got: messages.len(),
        });
    }

    // Stable, so an export that is already in order is walked as-is.
    let mut ordered: Vec<&Message> = messages.iter().collect();
    ordered.sort_by_key(|m| m.timestamp);

    let mut gaps: Vec<Silence> = ordered
        .windows(2)
        .map(|pair| Silence {
            duration_ms: millis(pair[0].timestamp, pair[1].timestamp),
            start: pair[0].timestamp,
            end: pair[1].timestamp,
            breaker: pair[1].sender.clone(),
        })
        .collect();
    gaps.sort_by_key(|g| std::cmp::Reverse(g.duration_ms));
    gaps.truncate(take);
    Ok(gaps)
}

fn median(sorted: &[i64]) -> i64 {
    match sorted.len() {
        0 => 0,
        n if n % 2 == 1 => sorted[n / 2],
        n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2,
    }
}

// Reply delays: whenever consecutive user messages come from different
// senders, the later sender is credited with the gap.
pub fn response_times(messages: &[Message]) -> Result<Vec<ResponseStats>> {
    let users: Vec<(&str, NaiveDateTime)> = messages
        .iter()
        .filter_map(|m| m.sender.as_deref().map(|s| (s, m.timestamp)))
        .collect();
    if users.len() < 2 {
        return Err(ChatError::AggregationInputEmpty {
            engine: "response_times",
            needed: 2,
            got: users.len(),
        });
    }

    let mut delays: HashMap<&str, Vec<i64>> = HashMap::new();
    for pair in users.windows(2) {
        let ((prev_sender, prev_ts), (sender, ts)) = (pair[0], pair[1]);
        if prev_sender != sender {
            delays.entry(sender).or_default().push(millis(prev_ts, ts).max(0));
        }
    }

    let mut stats: Vec<ResponseStats> = delays
        .into_iter()
        .map(|(responder, mut ms)| {
            ms.sort_unstable();
            let total: i64 = ms.iter().sum();
            ResponseStats {
                responder: responder.to_string(),
                replies: ms.len() as u32,
                median_ms: median(&ms),
                mean_ms: total as f64 / ms.len() as f64,
            }
        })
        .collect();
    stats.sort_by(|a, b| b.replies.cmp(&a.replies).then_with(|| a.responder.cmp(&b.responder)));
    Ok(stats)
}

pub fn longest_personal_gap(own: &[&Message], chat_end: NaiveDateTime) -> Option<PersonalGap> {
    let mut times: Vec<NaiveDateTime> = own.iter().map(|m| m.timestamp).collect();
    times.sort();
    let last = *times.last()?;

    let mut best: Option<PersonalGap> = None;
    let candidates = times
        .windows(2)
        .map(|w| (w[0], w[1]))
        .chain(std::iter::once((last, chat_end)));
    for (start, end) in candidates {
        let duration_ms = millis(start, end);
        if duration_ms > best.as_ref().map(|b| b.duration_ms).unwrap_or(0) {
            best = Some(PersonalGap {
                duration_ms,
                start,
                end,
            });
        }
    }
    best
}

// `1d 2h`, `3h 4m`, `5m 6s` or `7s`.
pub fn format_duration(ms: i64) -> String {
    let sec = ms.max(0) / 1000;
    let min = sec / 60;
    let hr = min / 60;
    let day = hr / 24;
    if day > 0 {
        format!("{}d {}h", day, hr % 24)
    } else if hr > 0 {
        format!("{}h {}m", hr, min % 60)
    } else if min > 0 {
        format!("{}m {}s", min, sec % 60)
    } else {
        format!("{}s", sec)
    }
}
