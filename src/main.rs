//! whatsapp-stats - print statistics for an exported WhatsApp chat
//!
//! Reads a `.txt` export, runs every analysis engine, and prints either a
//! human-readable digest or the full JSON report.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chat_stats_wasm::{analyze, format_duration, AnalysisOptions, Report, Section};
use chrono::NaiveDateTime;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "whatsapp-stats")]
#[command(about = "Statistics for an exported WhatsApp chat")]
#[command(version)]
struct Args {
    /// Exported chat (.txt)
    file: PathBuf,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Pretty-print the JSON report
    #[arg(long, requires = "json")]
    pretty: bool,

    /// JSON file with analysis options; flags below override it
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    #[arg(long, value_name = "N")]
    top_words: Option<usize>,

    #[arg(long, value_name = "N")]
    top_emojis: Option<usize>,

    /// Word window for the phrase ranking
    #[arg(long, value_name = "N")]
    ngram: Option<usize>,

    /// Distinctive words listed per participant
    #[arg(long, value_name = "N")]
    tfidf_top: Option<usize>,

    /// Longest silences to list
    #[arg(long, value_name = "N")]
    silences: Option<usize>,

    /// Leave English stopwords out of word rankings
    #[arg(long)]
    stopwords: bool,

    /// Embed the chart style in the JSON report
    #[arg(long)]
    chart_style: bool,

    /// Refuse files larger than this many bytes
    #[arg(long, value_name = "BYTES", default_value_t = 5 * 1024 * 1024)]
    max_size: u64,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_options(args: &Args) -> Result<AnalysisOptions> {
    let mut opts = match &args.options {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read options file {}", path.display()))?;
            AnalysisOptions::from_json(&raw)
                .with_context(|| format!("invalid options in {}", path.display()))?
        }
        None => AnalysisOptions::default(),
    };

    if let Some(n) = args.top_words {
        opts = opts.with_top_words(n);
    }
    if let Some(n) = args.top_emojis {
        opts = opts.with_top_emojis(n);
    }
    if let Some(n) = args.ngram {
        opts = opts.with_ngram(n);
    }
    if let Some(n) = args.tfidf_top {
        opts = opts.with_tfidf_top(n);
    }
    if let Some(n) = args.silences {
        opts = opts.with_silence_top(n);
    }
    if args.stopwords {
        opts = opts.with_drop_stopwords(true);
    }
    if args.chart_style {
        opts = opts.with_chart_style(true);
    }
    Ok(opts)
}

fn read_export(path: &Path, max_size: u64) -> Result<String> {
    let meta =
        fs::metadata(path).with_context(|| format!("failed to open {}", path.display()))?;
    if meta.len() > max_size {
        anyhow::bail!(
            "{} is {} bytes, larger than the {} byte limit",
            path.display(),
            meta.len(),
            max_size
        );
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn stamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Print a section heading and return its data when the engine produced any.
fn heading<'a, T>(title: &str, section: &'a Section<T>) -> Option<&'a T> {
    println!("\n{}", title);
    match section {
        Section::Ready(data) => Some(data),
        Section::NotEnoughData => {
            println!("  (not enough messages)");
            None
        }
        Section::Failed(reason) => {
            println!("  (failed: {})", reason);
            None
        }
    }
}

fn print_report(report: &Report) {
    if let Some(s) = heading("Summary", &report.summary) {
        println!("  Messages:      {} ({} system)", s.total_messages, s.system_messages);
        println!("  Participants:  {}", s.participants);
        println!("  First message: {}", stamp(s.first_message));
        println!("  Last message:  {}", stamp(s.last_message));
        println!("  Per day:       {:.1}", s.average_per_day);
        if let Some(day) = &s.most_active_day {
            println!("  Busiest day:   {} ({} messages)", day.label, day.value);
        }
        if let Some(hour) = &s.most_active_hour {
            println!("  Busiest hour:  {:02}:00 ({} messages)", hour.hour, hour.value);
        }
    }
    if !report.skipped.is_empty() {
        println!("  Skipped:       {} malformed headers", report.skipped.len());
    }

    if let Some(counts) = heading("Messages by participant", &report.by_participant) {
        for c in counts {
            println!("  {:<24} {}", c.label, c.value);
        }
    }

    if let Some(words) = heading("Top words", &report.top_words) {
        for c in words {
            println!("  {:<24} {}", c.label, c.value);
        }
    }

    if let Some(grams) = heading("Top phrases", &report.top_ngrams) {
        for c in grams {
            println!("  {:<32} {}", c.label, c.value);
        }
    }

    if let Some(emojis) = heading("Top emoji", &report.top_emojis) {
        let line: Vec<String> = emojis.iter().map(|c| format!("{} {}", c.label, c.value)).collect();
        println!("  {}", line.join("  "));
    }

    if let Some(streaks) = heading("Longest streaks", &report.streaks) {
        for s in streaks {
            match (s.start, s.end) {
                (Some(start), Some(end)) => {
                    println!("  {:<24} {} days ({} to {})", s.sender, s.length, start, end)
                }
                _ => println!("  {:<24} {} days", s.sender, s.length),
            }
        }
    }

    if let Some(gaps) = heading("Longest silences", &report.silences) {
        for g in gaps {
            println!(
                "  {:<10} {} -> {}  broken by {}",
                format_duration(g.duration_ms),
                stamp(g.start),
                stamp(g.end),
                g.breaker.as_deref().unwrap_or("(system)")
            );
        }
    }

    if let Some(replies) = heading("Reply times", &report.response_times) {
        for r in replies {
            println!(
                "  {:<24} {} replies, median {}",
                r.responder,
                r.replies,
                format_duration(r.median_ms)
            );
        }
    }

    if let Some(people) = heading("Distinctive words", &report.tfidf) {
        for p in people {
            let words: Vec<&str> = p.terms.iter().map(|t| t.word.as_str()).collect();
            println!("  {:<24} {}", p.name, words.join(", "));
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let opts = load_options(&args)?;
    let raw = read_export(&args.file, args.max_size)?;
    tracing::debug!(bytes = raw.len(), path = %args.file.display(), "loaded export");

    let report = analyze(&raw, &opts)
        .with_context(|| format!("failed to analyze {}", args.file.display()))?;

    if args.json {
        let json = if args.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        }
        .context("failed to encode report")?;
        println!("{}", json);
    } else {
        print_report(&report);
    }
    Ok(())
}
