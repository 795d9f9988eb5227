use std::sync::Arc;

use exam_core::generator::ExamGenerator;
use exam_core::model::{ExamBlueprint, ExamSequence};
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::ExamController;
use storage::bank::{JsonFileBank, QuestionBankSource};
use storage::repository::Storage;

mod config;
mod console;
mod logging;

use config::{Args, ArgsError, Command, Database};

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- run      [--db <sqlite_url> | --memory] [--bank <json>]");
    eprintln!("                               [--blueprint <toml>] [--seed <n>]");
    eprintln!("  cargo run -p app -- generate [--bank <json>] [--blueprint <toml>] [--seed <n>] [--json]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {}", config::DEFAULT_DB_URL);
    eprintln!("  --bank {}", config::DEFAULT_BANK_PATH);
    eprintln!("  --blueprint (built-in three-section board exam)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_DB_URL, EXAM_BANK_PATH, EXAM_BLUEPRINT, EXAM_LOG (or RUST_LOG)");
}

fn print_summary(blueprint: &ExamBlueprint, sequence: &ExamSequence) {
    for section in blueprint.sections() {
        let questions: Vec<_> = sequence.section(section.id()).collect();
        let situations = questions.iter().filter(|q| q.is_situation()).count();
        println!(
            "{:<8} {:<40} {:>4}/{:<4} ({situations} situation stems)",
            section.id(),
            section.title(),
            questions.len(),
            section.total(),
        );
    }
    println!("total: {} questions", sequence.len());
}

async fn generate(
    args: &Args,
    blueprint: &ExamBlueprint,
    bank: &dyn QuestionBankSource,
) -> Result<(), Box<dyn std::error::Error>> {
    let questions = bank.load_bank().await?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let sequence = ExamGenerator::new(blueprint).generate_with(&questions, &mut rng);
    tracing::info!(
        bank = questions.len(),
        questions = sequence.len(),
        "exam generated"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sequence)?);
    } else {
        print_summary(blueprint, &sequence);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: run the exam when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Run,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Run,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = match Args::parse(&mut iter, |key| std::env::var(key).ok()) {
        Ok(parsed) => parsed,
        Err(ArgsError::HelpRequested) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    logging::init();

    let blueprint = config::load_blueprint(parsed.blueprint_path.as_deref())?;
    let bank = Arc::new(JsonFileBank::new(parsed.bank_path.clone()));

    match cmd {
        Command::Generate => generate(&parsed, &blueprint, bank.as_ref()).await,
        Command::Run => {
            let storage = match &parsed.database {
                Database::Memory => Storage::in_memory(),
                Database::Sqlite(db_url) => {
                    // Open + migrate SQLite at startup; the library crates never touch the filesystem path.
                    config::prepare_sqlite_file(db_url)?;
                    Storage::sqlite(db_url).await?
                }
            };

            let mut controller = ExamController::new(blueprint, &storage, bank);
            if let Some(seed) = parsed.seed {
                controller = controller.with_seed(seed);
            }
            controller.initialize().await;
            console::run(&mut controller).await?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
