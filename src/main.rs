use anyhow::Result;
use log::info;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use foodlog::food_model::{FoodRecord, MatchCandidate, ResolutionResult, Source};
use foodlog::menu_db::MenuDb;
use foodlog::normalizer::normalize;
use foodlog::off_client::OffClient;
use foodlog::ollama_client::{OllamaClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use foodlog::resolver::Resolver;
use foodlog::tracker::DailyTracker;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    info!("Starting foodlog");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let db_path = env::var("FOODLOG_DB").unwrap_or_else(|_| "data/nutrition.json".to_string());
    let model = env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    let ollama_url = env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

    info!("Using database at {db_path}, model {model}");

    let mut db = MenuDb::open(Path::new(&db_path));
    if db.is_empty() {
        seed_defaults(&mut db)?;
    }

    // Shared handle: the resolver writes external and AI hits back into the
    // database so repeat queries resolve offline.
    let resolver = Resolver::with_defaults(
        Arc::new(Mutex::new(db)),
        OffClient::new(),
        OllamaClient::new(&model, &ollama_url),
    );
    let mut tracker = DailyTracker::new();

    println!("foodlog: what did you eat? ('summary' for totals, 'quit' to exit)");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            "summary" => {
                print_summary(&mut tracker);
                continue;
            }
            _ => {}
        }

        let query = match normalize(line) {
            Ok(query) => query,
            Err(err) => {
                println!("  {err}");
                continue;
            }
        };

        match resolver.resolve_query(&query).await {
            Err(err) => println!("  {err}"),
            Ok(ResolutionResult::Resolved(record)) => {
                println!("  logged: {record}");
                tracker.log_record(record);
                println!("  today so far: {:.0} kcal", tracker.totals().calories);
            }
            Ok(ResolutionResult::Ambiguous(candidates)) => match pick_candidate(&candidates)? {
                Some(index) => match resolver.select(&candidates, index, &query) {
                    Ok(record) => {
                        println!("  logged: {record}");
                        tracker.log_record(record);
                    }
                    Err(err) => println!("  {err}"),
                },
                None => println!("  skipped"),
            },
            Ok(ResolutionResult::Unresolved(reason)) => {
                println!("  could not resolve: {reason}");
            }
        }
    }

    print_summary(&mut tracker);
    Ok(())
}

/// Show an ambiguous candidate list and read the user's pick (empty to skip)
fn pick_candidate(candidates: &[MatchCandidate]) -> Result<Option<usize>> {
    println!("  did you mean:");
    for (i, candidate) in candidates.iter().enumerate() {
        println!(
            "    {}. {} ({:.0} kcal, score {:.2})",
            i + 1,
            candidate.record.name,
            candidate.record.calories,
            candidate.score
        );
    }
    print!("  pick a number (or press enter to skip): ");
    io::stdout().flush()?;
    let mut choice = String::new();
    io::stdin().lock().read_line(&mut choice)?;
    match choice.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= candidates.len() => Ok(Some(n - 1)),
        _ => Ok(None),
    }
}

fn print_summary(tracker: &mut DailyTracker) {
    let summary = tracker.summary();
    println!("=== {} ===", summary.date);
    println!(
        "  {:.0} kcal | P {:.0}g | F {:.0}g | C {:.0}g",
        summary.totals.calories, summary.totals.protein, summary.totals.fat, summary.totals.carbs
    );
    for entry in &summary.entries {
        println!("  • {entry}");
    }
}

/// Seed a fresh database with a starter menu so first runs resolve something
fn seed_defaults(db: &mut MenuDb) -> Result<()> {
    info!("Seeding empty database with starter foods");
    let starters = vec![
        FoodRecord::new("egg", 70.0, 6.0, 5.0, 0.6, Source::Local),
        FoodRecord::new("white rice", 160.0, 2.7, 0.3, 36.0, Source::Local),
        FoodRecord::new("natto", 100.0, 8.5, 5.0, 7.5, Source::Local),
        FoodRecord::new("banana", 105.0, 1.3, 0.4, 27.0, Source::Local),
        FoodRecord::new("apple", 95.0, 0.5, 0.3, 25.0, Source::Local),
        FoodRecord::new("Matsuya Beef Bowl (regular)", 692.0, 18.0, 23.0, 101.0, Source::Local)
            .with_chain("matsuya")
            .with_variant("regular"),
        FoodRecord::new("Matsuya Beef Bowl (large)", 846.0, 22.0, 28.0, 124.0, Source::Local)
            .with_chain("matsuya")
            .with_variant("large"),
        FoodRecord::new("Sukiya Beef Bowl (small)", 496.0, 15.7, 16.8, 70.8, Source::Local)
            .with_chain("sukiya")
            .with_variant("small"),
        FoodRecord::new("Sukiya Beef Bowl (regular)", 733.0, 22.9, 25.2, 104.1, Source::Local)
            .with_chain("sukiya")
            .with_variant("regular"),
        FoodRecord::new("Sukiya Beef Bowl (large)", 966.0, 30.4, 32.6, 138.9, Source::Local)
            .with_chain("sukiya")
            .with_variant("large"),
    ];
    for record in starters {
        db.add_food(record)?;
    }
    Ok(())
}
