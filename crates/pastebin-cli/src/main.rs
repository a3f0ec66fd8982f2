use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use pastebin::{
    DEFAULT_TTL, KeyError, LookupError, RecordStore, StoreError, StoreUrl, StoreUrlError,
    open_existing_store, open_store, resolve,
};

/// CLI-specific errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Library error (wraps all pastebin errors)
    #[error(transparent)]
    Library(#[from] pastebin::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Nothing stored under the key
    #[error("No paste stored under '{0}'")]
    NotFound(String),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        Self::Library(e.into())
    }
}

impl From<StoreUrlError> for AppError {
    fn from(e: StoreUrlError) -> Self {
        Self::Library(e.into())
    }
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::NotFound(key) => Self::NotFound(key.into_inner()),
            other => Self::Library(other.into()),
        }
    }
}

#[derive(Parser)]
#[command(name = "pastebin")]
#[command(about = "Inspect and maintain a pastebin store")]
struct Cli {
    /// Store connection string: hash://<dir>, hash+full://<dir> or counter://<dir>
    #[arg(short, long, env = "STORE_URL")]
    store: String,

    /// Expiry horizon for digest-keyed pastes, in seconds
    #[arg(long, default_value_t = DEFAULT_TTL.as_secs())]
    ttl_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a paste and print its key, creating the store if needed
    Put {
        /// File to read the payload from (stdin if omitted)
        file: Option<PathBuf>,
    },

    /// Write a paste to stdout
    Get {
        /// Key of the paste
        key: String,
    },

    /// Print the key the landing page redirects to
    Latest,

    /// Remove expired pastes and print how many were removed
    Purge,

    /// Print the key scheme and the number of readable pastes
    Stats,
}

/// Format an error for user-friendly display
fn format_error(err: &AppError) -> String {
    use std::io::IsTerminal;

    let use_colors = std::io::stderr().is_terminal();

    let (red, yellow, reset) = if use_colors {
        ("\x1b[0;31m", "\x1b[0;33m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    let mut output = format!("{}Error:{} {}\n", red, reset, err);

    if let Some(hint) = get_error_hint(err) {
        output.push_str(&format!("{}Hint:{} {}\n", yellow, reset, hint));
    }

    output
}

/// Get a helpful hint for common errors
fn get_error_hint(err: &AppError) -> Option<&'static str> {
    match err {
        AppError::Library(pastebin::Error::Store(StoreError::NotInitialized(_))) => {
            Some("Run 'pastebin --store <URL> put' to create the store with a first paste")
        }
        AppError::Library(pastebin::Error::Store(StoreError::SchemeMismatch { .. })) => {
            Some("The store was created with a different scheme; fix the prefix of --store")
        }
        AppError::Library(pastebin::Error::StoreUrl(_)) => {
            Some("Store urls look like hash://./data, hash+full://./data or counter://./data")
        }
        AppError::Library(pastebin::Error::Lookup(LookupError::InvalidIdentifier(
            KeyError::InvalidDecimal(_),
        ))) => Some("Counter stores use decimal keys such as 42"),
        AppError::Library(pastebin::Error::Lookup(LookupError::InvalidIdentifier(_))) => {
            Some("Digest stores use lowercase hex keys such as 5d41402")
        }
        _ => None,
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprint!("{}", format_error(&err));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let url: StoreUrl = cli.store.parse()?;
    let ttl = Duration::from_secs(cli.ttl_secs);

    match cli.command {
        Commands::Put { file } => {
            let payload = match file {
                Some(path) => std::fs::read(path)?,
                None => {
                    let mut buf = Vec::new();
                    std::io::stdin().read_to_end(&mut buf)?;
                    buf
                }
            };
            let store = open_store(&url, ttl)?;
            let key = store.submit(&payload)?;
            println!("{}", key);
            Ok(())
        }
        Commands::Get { key } => {
            let store = open_existing_store(&url, ttl)?;
            let payload = resolve(store.as_ref(), &key)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&payload)?;
            stdout.flush()?;
            Ok(())
        }
        Commands::Latest => {
            let store = open_existing_store(&url, ttl)?;
            if let Some(key) = store.latest()? {
                println!("{}", key);
            }
            Ok(())
        }
        Commands::Purge => {
            let store = open_existing_store(&url, ttl)?;
            let removed = store.purge_expired()?;
            println!("{}", removed);
            Ok(())
        }
        Commands::Stats => {
            let store = open_existing_store(&url, ttl)?;
            print_stats(store.as_ref(), &url)
        }
    }
}

fn print_stats(store: &dyn RecordStore, url: &StoreUrl) -> Result<(), AppError> {
    println!("store:  {}", url);
    println!("scheme: {}", store.scheme());
    println!("pastes: {}", store.count()?);
    Ok(())
}
