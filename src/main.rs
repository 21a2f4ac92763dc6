use clap::{Parser, Subcommand};
use tracing::{error, info};

use plenar_scraper::analysis::Analyzer;
use plenar_scraper::config::Config;
use plenar_scraper::logging;
use plenar_scraper::parser::ProtokollParser;
use plenar_scraper::scraper::OpenDataScraper;
use plenar_scraper::storage;

#[derive(Parser)]
#[command(name = "plenar_scraper")]
#[command(about = "Bundestag plenary protocol scraper and analysis pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download transcript XML files from the open-data listing
    Scraper,
    /// Parse downloaded transcripts into the JSON artifacts
    Parser,
    /// Create the database and its tables
    SetupDb,
    /// Load the JSON artifacts into the database
    Loader,
    /// Run read-only aggregate reports against the loaded store
    Analyze {
        /// How many rows/words to show per report
        #[arg(long, default_value_t = 15)]
        limit: usize,
    },
    /// Run scraper, parser, database setup and loader sequentially
    Run,
}

async fn run_scraper(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let scraper = OpenDataScraper::new(config.scraper.clone())?;
    info!("Starting open-data fetch");
    let summary = scraper.fetch_all(&config.paths.xml_dir).await?;
    println!("\n📊 Fetch Results:");
    println!("   Documents discovered: {}", summary.discovered);
    println!("   Downloaded: {}", summary.downloaded);
    println!("   Already present: {}", summary.skipped);
    Ok(())
}

fn run_parser(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut parser = ProtokollParser::new();
    let summary = parser.crawl_directory(&config.paths.xml_dir, &config.paths.json_dir)?;

    println!("\n📊 Parse Results:");
    println!("   Files found: {}", summary.total_files);
    println!("   Parsed: {}", summary.parsed_files);
    println!("   Sessions: {}", summary.sessions);
    println!("   Speakers: {}", parser.redner.len());
    println!("   Roles: {}", parser.rollen.rollen.len());
    println!("   Errors: {}", summary.errors.len());

    if !summary.errors.is_empty() {
        println!("\n⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("   - {error}");
        }
    }
    Ok(())
}

fn run_analysis(config: &Config, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = Analyzer::open(&config.paths.database)?;

    println!("\n🗓  Sessions:");
    for session in analyzer.session_overview()? {
        println!(
            "   {} ({}): {} speeches, {} interjections",
            session.sitzungs_id, session.datum, session.reden, session.kommentare
        );
    }

    println!("\n🎤 Most active speakers:");
    for speaker in analyzer.speaker_activity(limit as u32)? {
        println!(
            "   {} ({}): {} speeches, {} interjections received",
            speaker.name,
            speaker.fraktion.as_deref().unwrap_or("ohne Fraktion"),
            speaker.reden,
            speaker.kommentare_erhalten
        );
    }

    println!("\n🗣  Interjections by faction:");
    for (fraktion, count) in analyzer.kommentare_per_fraktion()? {
        println!("   {fraktion}: {count}");
    }

    println!("\n🔤 Most frequent words:");
    for (word, count) in analyzer.word_frequencies(limit)? {
        println!("   {word}: {count}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Scraper => {
            println!("🔄 Running scraper...");
            run_scraper(&config).await?;
        }
        Commands::Parser => {
            println!("🔄 Running parser...");
            run_parser(&config)?;
        }
        Commands::SetupDb => {
            println!("🔄 Setting up database...");
            storage::schema::setup_database(&config.paths.database)?;
            println!("✅ Database ready at {}", config.paths.database.display());
        }
        Commands::Loader => {
            println!("🔄 Running loader...");
            match storage::loader::load(&config.paths.json_dir, &config.paths.database) {
                Ok(()) => println!("✅ Load completed successfully"),
                Err(e) => {
                    error!("Load failed: {e}");
                    println!("❌ Load failed: {e}");
                }
            }
        }
        Commands::Analyze { limit } => {
            run_analysis(&config, limit)?;
        }
        Commands::Run => {
            println!("🚀 Running full pipeline (scraper + parser + loader)...");

            println!("\n📥 Step 1: Running scraper...");
            run_scraper(&config).await?;

            println!("\n🧾 Step 2: Running parser...");
            run_parser(&config)?;

            println!("\n🗄  Step 3: Setting up database...");
            storage::schema::setup_database(&config.paths.database)?;

            println!("\n📤 Step 4: Running loader...");
            match storage::loader::load(&config.paths.json_dir, &config.paths.database) {
                Ok(()) => println!("✅ Full pipeline completed successfully!"),
                Err(e) => {
                    error!("Load failed: {e}");
                    println!("❌ Load failed: {e}");
                }
            }
        }
    }
    Ok(())
}
