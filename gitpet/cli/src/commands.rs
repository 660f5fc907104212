//! Command dispatch
//!
//! Resolves configuration, opens the repository and store, runs one
//! [`Keeper`] operation and returns the text to print.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gitpet_core::config::{default_config_path, load_config_from_path};
use gitpet_core::{
    ConfigOverrides, FileStore, GitRepository, GitpetConfig, Keeper, PresetLibrary,
};
use tracing::debug;

use crate::render;
use crate::{Args, Command};

/// Terminal width used for wrapping when nothing better is known
const OUTPUT_WIDTH: usize = 60;

/// Load configuration from file and environment, then apply CLI flags
fn resolve_config(args: &Args) -> Result<GitpetConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(ref dir) = args.store_dir {
        overrides = overrides.with_store_dir(dir.clone());
    }
    if let Some(ref dir) = args.preset_dir {
        overrides = overrides.with_preset_dir(dir.clone());
    }
    if args.no_commit {
        overrides = overrides.with_auto_commit(false);
    }
    overrides.apply(&mut config);

    config.validate().context("Invalid configuration")?;
    debug!(source = %config.source(), store_dir = %config.store_dir.display(), "Configuration resolved");
    Ok(config)
}

/// Run the command in `args` at time `now`
pub fn run(args: &Args, now: DateTime<Utc>) -> Result<String> {
    let config = resolve_config(args)?;

    // Needs no repository
    if args.command == Command::Personalities {
        return personalities(&config.preset_library(), &config.default_personality);
    }

    run_in_repository(args, &config, now)
}

fn run_in_repository(args: &Args, config: &GitpetConfig, now: DateTime<Utc>) -> Result<String> {
    let repo = GitRepository::discover(&args.repo)
        .with_context(|| format!("No git repository found at {}", args.repo.display()))?;
    let store = FileStore::new(config.store_root(&repo.workdir()?));
    let keeper = Keeper::new(store, &repo, &repo, config.identity.clone())
        .with_auto_commit(config.auto_commit);

    let mut out = String::new();
    match &args.command {
        Command::Adopt { name, personality } => {
            let preset = personality
                .as_deref()
                .unwrap_or(&config.default_personality);
            let personality = config.preset_library().load_preset(preset)?;
            let update = keeper.adopt(name, &personality, now)?;

            writeln!(out, "Successfully adopted {name}, your new best friend!")?;
            out.push_str(&render::pet_card(&update.pet, OUTPUT_WIDTH));
        }
        Command::Status { name } => {
            let report = keeper.status(name, now)?;

            writeln!(
                out,
                "Caught up on {} new commit{} over {:.1} days.",
                report.catch_up.processed,
                if report.catch_up.processed == 1 { "" } else { "s" },
                report.catch_up.elapsed_days
            )?;
            if let Some(event) = &report.catch_up.evolution {
                out.push_str(&render::evolution_banner(name, event, OUTPUT_WIDTH));
            }
            out.push_str(&render::pet_card(&report.pet, OUTPUT_WIDTH));
        }
        Command::Pet { name } => {
            let update = keeper.pet(name)?;
            writeln!(out, "{}", render::pet_reaction(&update.pet))?;
        }
        Command::Nap { name } => {
            let update = keeper.nap(name)?;
            writeln!(out, "{}", render::nap_reaction(&update.pet))?;
        }
        Command::Show { name } => {
            let pet = keeper.peek(name)?;
            out.push_str(&render::pet_card(&pet, OUTPUT_WIDTH));
        }
        Command::List => {
            let names = keeper.list()?;
            if names.is_empty() {
                writeln!(out, "No pets live here yet.")?;
            }
            for name in names {
                writeln!(out, "{name}")?;
            }
        }
        Command::Release => {
            keeper.release()?;
            writeln!(out, "Releasing all pets into the cloud!")?;
        }
        Command::Personalities => {
            out = personalities(&config.preset_library(), &config.default_personality)?;
        }
    }

    Ok(out)
}

fn personalities(library: &PresetLibrary, default: &str) -> Result<String> {
    let mut out = String::new();
    for name in library.available()? {
        let marker = if name == default { " (default)" } else { "" };
        writeln!(out, "{name}{marker}")?;
    }
    Ok(out)
}
