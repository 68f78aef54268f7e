use std::fs;
use std::time::Instant;

fn main() {
    // Relative to the crate root when run via `cargo run --example bench_real`.
    let path = std::env::var("BENCH_FILE").unwrap_or_else(|_| "../samples/sample.txt".to_string());
    let raw =
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e));
    println!("Loaded {} bytes, {} lines", raw.len(), raw.lines().count());

    let chat = chat_stats_wasm::parse(&raw);
    println!(
        "Parsed {} messages, skipped {} headers",
        chat.len(),
        chat.skipped.len()
    );

    for i in 0..3 {
        let start = Instant::now();
        match chat_stats_wasm::analyze_chat_native(&raw, "") {
            Ok(json) => {
                if i == 0 {
                    println!("Success! JSON length: {}", json.len());
                }
            }
            Err(e) => {
                println!("Error: {}", e);
            }
        }
        println!("Run {}: {:?}", i + 1, start.elapsed());
    }
}
