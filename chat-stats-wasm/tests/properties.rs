//! Property-based tests for the parser and the aggregation engines.
//!
//! Chats are rendered in the Android export layout from generated
//! `(sender, body, minutes since previous)` triples, then parsed back.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use chat_stats_wasm::{
    longest_silences, longest_streaks, ngrams, normalize, parse, participant_share, tokenize,
    Message, Period,
};

fn arb_entry() -> impl Strategy<Value = (String, String, i64)> {
    (
        prop::sample::select(vec![
            "Alice".to_string(),
            "Bob".to_string(),
            "Charlie".to_string(),
            "Иван".to_string(),
            "User 123".to_string(),
        ]),
        prop::sample::select(vec![
            "Hello".to_string(),
            "Hi there!".to_string(),
            "How are you?".to_string(),
            "first line\nsecond line".to_string(),
            "ratio is 3:2".to_string(),
            "<Media omitted>".to_string(),
            "🎉🔥 party".to_string(),
            "Привет мир".to_string(),
            "see you at 10:30 - ok?".to_string(),
        ]),
        0i64..5000,
    )
}

fn arb_entries(max_len: usize) -> impl Strategy<Value = Vec<(String, String, i64)>> {
    prop::collection::vec(arb_entry(), 0..max_len)
}

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn render(entries: &[(String, String, i64)]) -> (String, Vec<NaiveDateTime>) {
    let mut at = start();
    let mut lines = Vec::with_capacity(entries.len());
    let mut stamps = Vec::with_capacity(entries.len());
    for (sender, body, gap) in entries {
        at += Duration::minutes(*gap);
        stamps.push(at);
        lines.push(format!(
            "{}, {} - {}: {}",
            at.format("%-m/%-d/%y"),
            at.format("%H:%M"),
            sender,
            body
        ));
    }
    (lines.join("\n"), stamps)
}

fn to_messages(entries: &[(String, String, i64)]) -> Vec<Message> {
    let (_, stamps) = render(entries);
    entries
        .iter()
        .zip(stamps)
        .map(|((sender, body, _), at)| Message::user(at, sender, body))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ============================================
    // PARSER PROPERTIES
    // ============================================

    /// Every rendered message comes back, in order, with its fields intact
    #[test]
    fn parse_preserves_order_and_fields(entries in arb_entries(30)) {
        let (raw, stamps) = render(&entries);
        let chat = parse(&raw);
        prop_assert_eq!(chat.len(), entries.len());
        prop_assert!(chat.skipped.is_empty());
        for ((m, (sender, body, _)), at) in chat.messages.iter().zip(&entries).zip(&stamps) {
            prop_assert_eq!(m.sender.as_deref(), Some(sender.as_str()));
            prop_assert_eq!(&m.body, &normalize(body));
            prop_assert_eq!(m.timestamp, *at);
        }
    }

    /// Parsing the same text twice yields the same result
    #[test]
    fn parse_is_deterministic(entries in arb_entries(20)) {
        let (raw, _) = render(&entries);
        prop_assert_eq!(parse(&raw), parse(&raw));
    }

    /// Senders are never empty and never span lines, whatever the input
    #[test]
    fn senders_are_single_line(raw in "(1/1/24, 9:0[0-9] - [a-z :\n]{0,12}\n?){0,6}") {
        let chat = parse(&raw);
        for m in chat.messages() {
            if let Some(sender) = &m.sender {
                prop_assert!(!sender.is_empty());
                prop_assert!(!sender.contains('\n'));
            }
        }
    }

    /// Arbitrary text never panics the parser
    #[test]
    fn parse_never_panics(raw in "\\PC{0,200}") {
        let _ = parse(&raw);
    }

    // ============================================
    // TEXT PROPERTIES
    // ============================================

    /// A token list of length L yields max(0, L - n + 1) n-grams
    #[test]
    fn ngram_window_law(words in prop::collection::vec("[a-z]{1,6}", 0..12), n in 1usize..6) {
        let tokens = tokenize(&words.join(" "), false);
        prop_assert_eq!(ngrams(&tokens, n).len(), tokens.len().saturating_sub(n - 1));
    }

    /// Tokens are lowercase and contain no whitespace
    #[test]
    fn tokens_are_clean(body in "[A-Za-z ,.!?'-]{0,40}") {
        for token in tokenize(&body, false) {
            prop_assert!(!token.is_empty());
            prop_assert!(!token.chars().any(char::is_whitespace));
            prop_assert_eq!(token.to_lowercase(), token.clone());
        }
    }

    // ============================================
    // ENGINE PROPERTIES
    // ============================================

    /// min(k, n - 1) silences, longest first
    #[test]
    fn silences_are_bounded_and_sorted(entries in arb_entries(25), k in 0usize..10) {
        let messages = to_messages(&entries);
        match longest_silences(&messages, k) {
            Ok(gaps) => {
                prop_assert_eq!(gaps.len(), k.min(messages.len() - 1));
                prop_assert!(gaps.windows(2).all(|w| w[0].duration_ms >= w[1].duration_ms));
                prop_assert!(gaps.iter().all(|g| g.duration_ms >= 0));
            }
            Err(err) => {
                prop_assert!(messages.len() < 2);
                prop_assert!(err.is_not_enough_data());
            }
        }
    }

    /// Participant percentages of every bucket add up to 100
    #[test]
    fn shares_sum_to_hundred(entries in arb_entries(25)) {
        let messages = to_messages(&entries);
        let share = participant_share(&messages, Period::Day);
        for i in 0..share.buckets.len() {
            let total: f64 = share.series.iter().map(|s| s.percents[i]).sum();
            prop_assert!((total - 100.0).abs() < 1e-6);
        }
    }

    /// A streak never exceeds the number of distinct active days
    #[test]
    fn streaks_fit_active_days(entries in arb_entries(25)) {
        let messages = to_messages(&entries);
        for streak in longest_streaks(&messages) {
            let mut days: Vec<_> = messages
                .iter()
                .filter(|m| m.sender.as_deref() == Some(streak.sender.as_str()))
                .map(|m| m.timestamp.date())
                .collect();
            days.dedup();
            prop_assert!(streak.length >= 1);
            prop_assert!(streak.length as usize <= days.len());
            let (Some(first), Some(last)) = (streak.start, streak.end) else {
                return Err(TestCaseError::fail("streak without bounds"));
            };
            prop_assert_eq!((last - first).num_days() + 1, streak.length as i64);
        }
    }
}
