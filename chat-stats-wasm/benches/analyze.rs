use chat_stats_wasm::{analyze, parse, AnalysisOptions};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn header(i: usize) -> String {
    let hour = (8 + (i % 14)) % 24;
    let minute = i % 60;
    let day = 1 + (i % 28);
    let month = 1 + (i / 1000) % 12;
    let ampm = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{}/{}/23, {}:{:02} {} -", month, day, hour12, minute, ampm)
}

fn generate_chat(num_messages: usize) -> String {
    let senders = ["Alice", "Bob", "Charlie", "Diana"];
    let phrases = [
        "let's go to the park",
        "I love this weather",
        "what do you think about it",
        "see you later",
        "that sounds great",
        "I'm on my way",
        "can't wait to see you",
        "this is amazing",
        "happy birthday to you",
        "let me know when ready",
        "<Media omitted>",
        "good morning everyone",
        "have a nice day",
        "thanks for your help",
    ];
    let emojis = ["😀", "🎉", "❤️", "🚀", "👍🏽", "😂", "🔥", "💯"];

    let mut lines = Vec::with_capacity(num_messages);
    for i in 0..num_messages {
        let sender = senders[i % senders.len()];
        let phrase = phrases[i % phrases.len()];
        let emoji = if i % 5 == 0 {
            emojis[i % emojis.len()]
        } else {
            ""
        };
        if i % 97 == 0 {
            lines.push(format!("{} {} changed the group description", header(i), sender));
        } else {
            lines.push(format!("{} {}: {} {}", header(i), sender, phrase, emoji));
        }
    }
    lines.join("\n")
}

fn generate_multiline_chat(num_messages: usize) -> String {
    let senders = ["Alice", "Bob", "Charlie", "Diana", "Eve", "Frank"];
    let messages = [
        "hey how are you doing today",
        "did you see the news about the economy\nyeah it's pretty crazy",
        "we should meet up sometime soon",
        "how about this weekend\nmaybe saturday\naround noon",
        "don't forget to bring the documents",
        "the ones we discussed last week",
        "by the way have you heard from john lately",
        "bye take care",
    ];

    let mut lines = Vec::with_capacity(num_messages);
    for i in 0..num_messages {
        let sender = senders[i % senders.len()];
        let body = messages[i % messages.len()];
        let extra = if i % 11 == 0 {
            format!(" and also something else unique_{}", i)
        } else {
            String::new()
        };
        lines.push(format!("{} {}: {}{}", header(i), sender, body, extra));
    }
    lines.join("\n")
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for size in [1000, 10000, 50000].iter() {
        let chat = generate_multiline_chat(*size);
        group.bench_with_input(BenchmarkId::new("messages", size), &chat, |b, chat| {
            b.iter(|| parse(black_box(chat)));
        });
    }

    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let opts = AnalysisOptions::default();

    for size in [100, 1000, 5000, 10000, 20000].iter() {
        let chat = generate_chat(*size);
        group.bench_with_input(BenchmarkId::new("messages", size), &chat, |b, chat| {
            b.iter(|| analyze(black_box(chat), &opts));
        });
    }

    group.finish();
}

fn bench_stopwords(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_stopwords");
    group.sample_size(10);
    let opts = AnalysisOptions::default().with_drop_stopwords(true);

    for size in [1000, 10000].iter() {
        let chat = generate_multiline_chat(*size);
        group.bench_with_input(BenchmarkId::new("messages", size), &chat, |b, chat| {
            b.iter(|| analyze(black_box(chat), &opts));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_analyze, bench_stopwords);
criterion_main!(benches);
