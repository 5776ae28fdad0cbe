mod accounts;
mod ansible;
mod cli;
mod commands;
mod config;
mod git;
mod paths;
mod runner;
mod selfupdate;
mod sudo;
mod ui;
mod venv;

use anyhow::{Context as _, Result};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::{ProjectKind, Settings};
use selfupdate::Startup;
use std::io;
use std::process::ExitCode;
use tagcache::TagCache;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub settings: Settings,
}

impl Context {
    /// Load the tag cache; a corrupt cache file is an error
    pub fn open_cache(&self) -> Result<TagCache> {
        let path = self.settings.cache_file();
        TagCache::open(&path).with_context(|| {
            format!(
                "Tag cache {} is unusable; fix or delete it",
                path.display()
            )
        })
    }

    /// `user:user` owner of the Saltbox checkouts, from accounts.yml
    pub fn owner(&self) -> Result<String> {
        let accounts = accounts::Accounts::load(&self.settings.accounts_file())?;
        Ok(accounts.owner())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            ui::error(&format!("{e:#}"));
            match e.downcast_ref::<ansible::PlaybookFailed>() {
                Some(failed) => exit_code(failed.code),
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "sb", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    if !sudo::is_root() {
        ui::info("Relaunching with root privileges.");
        let status = sudo::reexec_with_sudo(&sudo::current_args())?;
        return Ok(exit_code(sudo::exit_code(status)));
    }

    let settings = Settings::load(&paths::config_file())?;

    if !cli.no_self_update
        && let Startup::Relaunched(code) = selfupdate::check(&settings)?
    {
        return Ok(exit_code(code));
    }

    let ctx = Context {
        verbose: cli.verbose,
        settings,
    };

    match cli.command {
        Command::Update => commands::update::run(&ctx)?,
        Command::List => commands::list::run(&ctx)?,
        Command::Install(args) => commands::install::run(&ctx, args)?,
        Command::Bench => commands::bench::run(&ctx)?,
        Command::RecreateVenv => commands::venv::recreate(&ctx)?,
        Command::Inventory => commands::inventory::run(&ctx)?,
        Command::Branch(args) => commands::branch::run(&ctx, ProjectKind::Saltbox, args)?,
        Command::SandboxBranch(args) => commands::branch::run(&ctx, ProjectKind::Sandbox, args)?,
        Command::Completions { .. } => {}
    }

    Ok(ExitCode::SUCCESS)
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
