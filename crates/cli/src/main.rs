//! lsl - keeps a size-limited application log in a storage file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use logger::{
    DefaultFormatter, LocalStorageLoggerConfig, LogBootstrapper, LogEntry, LogEntryFormatter,
    LogLevel,
};
use queue::LimitedSizeQueue;
use storage::FileStorage;

/// lsl - a persistent, size-limited log
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Storage file holding the log
    #[arg(long, default_value = "lsl-store.json")]
    store: PathBuf,

    /// Name of the log inside the storage file
    #[arg(long)]
    log_name: Option<String>,

    /// Approximate maximum size of the log in bytes
    #[arg(long)]
    max_size: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append an entry to the log
    Log {
        /// Level of the entry (trace, debug, info, warn, error, fatal)
        level: LogLevel,

        /// Message parts
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Print every stored entry, oldest first
    Export,
    /// Print and remove every stored entry, oldest first
    Drain,
    /// Print entry count and space usage
    Stats,
}

impl Args {
    fn logger_config(&self) -> LocalStorageLoggerConfig {
        let mut config = LocalStorageLoggerConfig::default();
        if let Some(log_name) = &self.log_name {
            config = config.with_log_name(log_name.clone());
        }
        if let Some(max_size) = self.max_size {
            config = config.with_max_log_size_in_bytes(max_size);
        }
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.logger_config();
    let storage = open_storage(&args.store)?;
    debug!(store = %args.store.display(), log = %config.log_name, "Opened storage");

    for line in run(args.command, &config, storage)? {
        println!("{}", line);
    }

    Ok(())
}

fn open_storage(path: &Path) -> Result<FileStorage> {
    FileStorage::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

/// Execute `command` and return the lines to print.
fn run(
    command: Command,
    config: &LocalStorageLoggerConfig,
    storage: FileStorage,
) -> Result<Vec<String>> {
    match command {
        Command::Log { level, message } => {
            let mut log = LogBootstrapper::new().bootstrap(config, storage)?;
            log.write(level, message);
            Ok(Vec::new())
        }
        Command::Export => {
            let log = LogBootstrapper::new().bootstrap(config, storage)?;
            Ok(log.export_to_array()?)
        }
        Command::Drain => {
            let mut queue: LimitedSizeQueue<LogEntry, _> =
                LimitedSizeQueue::new(config.queue_config(), storage)?;
            let mut lines = Vec::new();
            while let Some(entry) = queue.dequeue()? {
                lines.push(DefaultFormatter.format(&entry));
            }
            Ok(lines)
        }
        Command::Stats => {
            let queue: LimitedSizeQueue<LogEntry, _> =
                LimitedSizeQueue::new(config.queue_config(), storage)?;
            let entries = queue.iter().count();
            Ok(vec![
                format!("log:       {}", config.log_name),
                format!("entries:   {}", entries),
                format!("used:      {} bytes", queue.size_in_bytes()),
                format!("remaining: {} bytes", queue.remaining_space()),
            ])
        }
    }
}
