use chrono::NaiveDate;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use studyhall::application::hall::StudyHall;
use studyhall::config::HallConfig;
use studyhall::domain::ports::HallStoreBox;
use studyhall::infrastructure::clock::FixedClock;
use studyhall::infrastructure::in_memory::InMemoryHallStore;
use studyhall::interfaces::csv::command_reader::CommandReader;
use studyhall::interfaces::csv::summary_writer::SummaryWriter;
use studyhall::logging::init_logger;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// TOML file with the room topology and seeding options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Provision the configured rooms and tables before running commands
    #[arg(long)]
    seed: bool,

    /// Date to use as "today" (YYYY-MM-DD) instead of the system date
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn open_store(db_path: Option<PathBuf>) -> Result<HallStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            use studyhall::infrastructure::rocksdb::RocksDBStore;
            info!(path = %path.display(), "using RocksDB storage");
            Ok(Box::new(RocksDBStore::open(path)?))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryHallStore::new()))
        }
        None => Ok(Box::new(InMemoryHallStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = match &cli.config {
        Some(path) => HallConfig::from_file(path)?,
        None => HallConfig::default(),
    };
    let store = open_store(cli.db_path)?;
    let hall = match cli.today {
        Some(date) => StudyHall::new(store, Box::new(FixedClock(date))),
        None => StudyHall::with_system_clock(store),
    };

    if cli.seed {
        hall.seed(&config.topology, config.seed.sample_students)
            .await?;
    }

    // Process commands
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    let (mut processed, mut failed) = (0usize, 0usize);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = command.execute(&hall, &config).await {
                    error!("Error processing command: {}", e);
                    failed += 1;
                } else {
                    processed += 1;
                }
            }
            Err(e) => {
                error!("Error reading command: {}", e);
                failed += 1;
            }
        }
    }
    info!(processed, failed, "commands finished");

    for finding in hall.audit().await? {
        warn!(%finding, "inconsistent hall state");
    }

    // Output final state
    let summaries = hall.student_summaries().await?;
    let stdout = io::stdout();
    let mut writer = SummaryWriter::new(stdout.lock());
    writer.write_summaries(&summaries)?;

    Ok(())
}
