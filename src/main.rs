use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use release_pr::changelog::GitCliff;
use release_pr::config::{self, Config, Overrides};
use release_pr::domain::{require_version, EventDescriptor};
use release_pr::engine::{classify, ReleaseEngine, Settings};
use release_pr::git::{Git2Repository, Repository};
use release_pr::github;
use release_pr::host::{GhCli, Host};
use release_pr::lock::RunLock;
use release_pr::notice::Notice;
use release_pr::{logging, ui};

#[derive(Parser)]
#[command(
    name = "release-pr",
    version,
    about = "Keep a release pull request in sync with the next version and release it on merge"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, global = true, help = "Log level when RUST_LOG is not set")]
    log_level: Option<String>,

    #[arg(long, global = true, help = "Prefix of release commits and PR titles")]
    commit_prefix: Option<String>,

    #[arg(long, global = true, help = "Technical branch holding the release commit")]
    pr_branch: Option<String>,

    #[arg(long, global = true, help = "Branch releases are cut from")]
    target_branch: Option<String>,

    #[arg(long, global = true, help = "Shell command run with VERSION set before the changelog is written")]
    version_cmd: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Handle the event that triggered the current GitHub Actions run
    Run,
    /// Print what the current event would do, without side effects
    Classify,
    /// Print the version carried by a release title or commit message
    ExtractVersion {
        /// Title or commit message
        text: String,
    },
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            commit_prefix: self.commit_prefix.clone(),
            pr_branch: self.pr_branch.clone(),
            target_branch: self.target_branch.clone(),
            version_cmd: self.version_cmd.clone(),
        }
    }
}

fn main() {
    let args = Args::parse();

    let config = match load_settings(&args) {
        Ok(config) => config,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {:#}", e));
            std::process::exit(1);
        }
    };
    logging::init(args.log_level.as_deref().unwrap_or(&config.log_level));

    let outcome = match &args.command {
        Command::Run => run(&config),
        Command::Classify => classify_event(&config),
        Command::ExtractVersion { text } => extract(&config, text),
    };

    if let Err(e) = outcome {
        match e.downcast_ref::<release_pr::ReleasePrError>() {
            Some(error) => ui::report(&Notice::from_error(error)),
            None => ui::display_error(&format!("{:#}", e)),
        }
        std::process::exit(1);
    }
}

/// File config, then Action inputs, then command-line flags
fn load_settings(args: &Args) -> Result<Config> {
    let mut config = config::load_config(args.config.as_deref())?;
    config.apply(Overrides::from_env());
    config.apply(args.overrides());
    Ok(config)
}

fn target_branch<H: Host>(config: &Config, event: &EventDescriptor, host: &H) -> Result<String> {
    if let Some(branch) = config.target_branch.as_ref().or(event.default_branch.as_ref()) {
        return Ok(branch.clone());
    }
    host.default_branch()
        .context("Cannot determine the target branch; set target_branch")
}

fn run(config: &Config) -> Result<()> {
    let event = github::load_from_env()?;
    let repo = Git2Repository::open(".")?;
    let workdir = repo.workdir();

    let mut host = GhCli::new(&workdir);
    if let Some(full_name) = &event.repo_full_name {
        host = host.with_repo(full_name);
    }
    let changelog = GitCliff::new(&config.changelog.git_cliff_bin, &workdir)
        .with_config(config.changelog.config.clone());

    let target = target_branch(config, &event, &host)?;
    let settings = Settings::from_config(config, target);

    let _lock = RunLock::acquire(repo.git_dir(), Duration::from_secs(config.lock_timeout_secs))?;

    let engine = ReleaseEngine::new(&repo, &host, &changelog, settings);
    let report = engine.run(&event)?;

    ui::report(&Notice::from_report(&report));

    match std::env::var_os("GITHUB_OUTPUT").filter(|p| !p.is_empty()) {
        Some(path) => github::write_outputs(&PathBuf::from(path), &report)
            .context("Cannot write step outputs")?,
        None => debug!("GITHUB_OUTPUT not set, skipping step outputs"),
    }
    Ok(())
}

fn classify_event(config: &Config) -> Result<()> {
    let event = github::load_from_env()?;
    let host = GhCli::new(std::env::current_dir()?);
    let target = target_branch(config, &event, &host)?;

    let intent = classify(&event, &Settings::from_config(config, target));
    println!("{}", intent.name());
    if let Some(reason) = intent.skip_reason() {
        println!("{}", reason);
    }
    Ok(())
}

fn extract(config: &Config, text: &str) -> Result<()> {
    let version = require_version(text, &config.commit_prefix)?;
    println!("{}", version);
    Ok(())
}
