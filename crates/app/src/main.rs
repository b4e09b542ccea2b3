use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use services::{AppServices, Clock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod command;
mod repl;

use repl::{Flow, Repl};

const DEFAULT_LOG_FILTER: &str = "paperbuddy=info,services=info,storage=info";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidAssetsDir { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidAssetsDir { raw } => write!(f, "invalid --assets value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  paperbuddy [--assets <dir>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --assets assets");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PAPER_ASSETS_DIR, PAPER_AI_API_KEY, PAPER_AI_BASE_URL, PAPER_AI_MODEL, RUST_LOG");
}

struct Args {
    assets_dir: PathBuf,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut assets_dir = std::env::var("PAPER_ASSETS_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from("assets"), PathBuf::from);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--assets" => {
                    let value = require_value(args, "--assets")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidAssetsDir { raw: value });
                    }
                    assets_dir = PathBuf::from(value);
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(Self { assets_dir }))
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let Some(args) = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    init_tracing();
    tracing::info!(assets = %args.assets_dir.display(), "starting paperbuddy");

    let services = AppServices::from_assets(&args.assets_dir, Clock::default())?;
    let mut repl = Repl::new(services, std::io::stdout());
    repl.banner()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", repl.prompt());
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if repl.handle_line(&line).await? == Flow::Quit {
            break;
        }
    }

    tracing::info!("session ended");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_owned());
        Args::parse(&mut iter)
    }

    #[test]
    fn assets_flag_overrides_default() {
        let args = parse(&["--assets", "/tmp/data"]).unwrap().unwrap();
        assert_eq!(args.assets_dir, PathBuf::from("/tmp/data"));
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(matches!(
            parse(&["--assets"]),
            Err(ArgsError::MissingValue { flag: "--assets" })
        ));
        assert!(matches!(
            parse(&["--assets", " "]),
            Err(ArgsError::InvalidAssetsDir { .. })
        ));
        assert!(matches!(parse(&["--db"]), Err(ArgsError::UnknownArg(_))));
        assert!(parse(&["--help"]).unwrap().is_none());
    }
}
