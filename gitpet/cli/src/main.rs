//! Gitpet - A Virtual Pet That Lives in Your Repository
//!
//! Commits feed it, touched files tire it, inserted lines excite it, and time
//! drains it. Every command that changes the pet commits its new state back
//! into the repository.
//!
//! # Usage
//!
//! ```bash
//! # Adopt a pet into the current repository
//! gitpet adopt tom --personality hyper
//!
//! # Catch up with everything since the last visit
//! gitpet status tom
//!
//! # Attention without catching up
//! gitpet pet tom
//! gitpet nap tom
//!
//! # Look without touching anything
//! gitpet show tom
//!
//! # Remove every pet from the repository
//! gitpet release
//!
//! # Verbose logging
//! RUST_LOG=debug gitpet status tom
//! ```

mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Gitpet - a virtual pet fed by your commits
#[derive(Parser, Debug)]
#[command(name = "gitpet")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Any path inside the repository
    #[arg(short = 'C', long, env = "GITPET_REPO", value_name = "PATH", default_value = ".")]
    repo: PathBuf,

    /// Configuration file path
    #[arg(short = 'c', long, env = "GITPET_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pet store directory, relative to the work tree unless absolute
    #[arg(long, value_name = "DIR")]
    store_dir: Option<PathBuf>,

    /// Directory of personality files
    #[arg(long, value_name = "DIR")]
    preset_dir: Option<PathBuf>,

    /// Save state changes without committing them
    #[arg(long)]
    no_commit: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "GITPET_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

/// Pet commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Adopt a new pet into this repository
    Adopt {
        /// Name of your new pet
        name: String,

        /// Personality preset (see `gitpet personalities`)
        #[arg(short, long)]
        personality: Option<String>,
    },

    /// Catch up with new commits and elapsed time, then show the pet
    Status {
        /// Pet name
        name: String,
    },

    /// Pet your pet. Very important.
    Pet {
        /// Pet name
        name: String,
    },

    /// Let your pet take a nap
    Nap {
        /// Pet name
        name: String,
    },

    /// Show the pet as last saved, without catching up
    Show {
        /// Pet name
        name: String,
    },

    /// List the pets living in this repository
    List,

    /// List the available personality presets
    Personalities,

    /// Release every pet and remove the store from the repository
    Release,
}

/// Initialize logging with the specified level
///
/// Logs go to stderr; stdout carries only the rendered output.
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("gitpet={level},gitpet_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), command = ?args.command, "Starting");

    let output = commands::run(&args, chrono::Utc::now())?;
    print!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_adopt_with_personality() {
        let args = Args::try_parse_from(["gitpet", "adopt", "tom", "--personality", "lazy"]).unwrap();
        assert_eq!(
            args.command,
            Command::Adopt {
                name: "tom".to_string(),
                personality: Some("lazy".to_string()),
            }
        );
        assert!(!args.no_commit);
    }

    #[test]
    fn test_parse_global_flags() {
        let args = Args::try_parse_from([
            "gitpet",
            "-C",
            "/work/repo",
            "--store-dir",
            "pets",
            "--no-commit",
            "status",
            "tom",
        ])
        .unwrap();

        assert_eq!(args.repo, PathBuf::from("/work/repo"));
        assert_eq!(args.store_dir, Some(PathBuf::from("pets")));
        assert!(args.no_commit);
        assert_eq!(
            args.command,
            Command::Status {
                name: "tom".to_string()
            }
        );
    }

    #[test]
    fn test_parse_commands_without_arguments() {
        for (word, expected) in [
            ("list", Command::List),
            ("personalities", Command::Personalities),
            ("release", Command::Release),
        ] {
            let args = Args::try_parse_from(["gitpet", word]).unwrap();
            assert_eq!(args.command, expected);
        }
    }

    #[test]
    fn test_parse_requires_name() {
        assert!(Args::try_parse_from(["gitpet", "pet"]).is_err());
        assert!(Args::try_parse_from(["gitpet"]).is_err());
    }

    #[test]
    fn test_args_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
