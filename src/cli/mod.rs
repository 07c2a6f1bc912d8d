//! Command-line interface.

pub mod confirm;
pub mod keys;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};

use crate::core::cipher::AnsibleVault;
use crate::core::config::{self, Config};
use crate::core::fs::BackupCollision;
use crate::core::processor::{Confirm, FileProcessor, ProcessOptions};
use crate::core::rekey::{RekeyPolicy, Rekeyer};
use crate::core::tree::{self, RunOptions, Summary, WalkOptions};
use crate::error::{ConfigError, Result};

use confirm::TerminalConfirm;

/// vault2vault - Rekey every Ansible vault value under a directory tree.
#[derive(Parser, Debug)]
#[command(
    name = "vault2vault",
    about = "Rekey Ansible vault files and inline vaulted values in bulk",
    version
)]
pub struct Cli {
    /// Files or directories to process
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// File holding the current vault password (surrounding whitespace is stripped)
    #[arg(long, env = "VAULT2VAULT_OLD_PASS_FILE", value_name = "FILE")]
    pub old_pass_file: Option<PathBuf>,

    /// File holding the new vault password (surrounding whitespace is stripped)
    #[arg(long, env = "VAULT2VAULT_NEW_PASS_FILE", value_name = "FILE")]
    pub new_pass_file: Option<PathBuf>,

    /// Environment variable holding the current vault password (a password file wins)
    #[arg(long, value_name = "VAR")]
    pub old_pass_env: Option<String>,

    /// Environment variable holding the new vault password
    #[arg(long, value_name = "VAR")]
    pub new_pass_env: Option<String>,

    /// Only rekey values with this vault-id ("default" matches untagged values)
    #[arg(long, value_name = "ID")]
    pub vault_id: Option<String>,

    /// Ask before rekeying each file or value
    #[arg(short, long)]
    pub interactive: bool,

    /// Keep a copy of each file before replacing it
    #[arg(short, long)]
    pub backup: bool,

    /// Suffix for backup copies [default: .bak]
    #[arg(long, value_name = "SUFFIX")]
    pub backup_suffix: Option<String>,

    /// What to do when a backup already exists
    #[arg(long, value_enum, value_name = "POLICY")]
    pub backup_collision: Option<BackupCollision>,

    /// Leave values the old password cannot decrypt untouched
    #[arg(long)]
    pub ignore_undecryptable: bool,

    /// Worker threads
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Stop at the first failed file
    #[arg(long)]
    pub fail_fast: bool,

    /// Do not follow symbolic links while walking directories
    #[arg(long)]
    pub no_follow_symlinks: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything a run needs after merging defaults, config file and flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub policy: RekeyPolicy,
    pub process: ProcessOptions,
    pub run: RunOptions,
}

impl Settings {
    /// Merge `config` with the command line, which always wins.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero job count or an
    /// unusable backup suffix.
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let mut backups = config.backup.policy();
        if let Some(suffix) = &cli.backup_suffix {
            backups.suffix = suffix.clone();
        }
        if let Some(collision) = cli.backup_collision {
            backups.collision = collision;
        }
        config::validate_suffix(&backups.suffix)?;

        let interactive = cli.interactive;
        let jobs = cli.jobs.unwrap_or(config.run.jobs);
        if jobs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "jobs",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if interactive && jobs > 1 {
            debug!("interactive run, processing files sequentially");
        }

        let ignore_undecryptable = cli.ignore_undecryptable || config.run.ignore_undecryptable;
        let policy = RekeyPolicy {
            vault_id: cli.vault_id.clone(),
            ignore_undecryptable,
            verify: !ignore_undecryptable || interactive,
        };

        let process = ProcessOptions {
            backup: (cli.backup || config.backup.enabled).then_some(backups),
            interactive,
        };

        let run = RunOptions {
            walk: WalkOptions {
                follow_symlinks: config.walk.follow_symlinks && !cli.no_follow_symlinks,
                skip_dirs: config.walk.skip_dirs.clone(),
                backups: process.backup.clone(),
            },
            jobs: if interactive { 1 } else { jobs },
            fail_fast: cli.fail_fast || config.run.fail_fast,
        };

        Ok(Self {
            policy,
            process,
            run,
        })
    }
}

/// Run a rekey over the paths on the command line and print the report.
///
/// # Errors
///
/// Returns error when configuration or passwords cannot be obtained.
/// Per-file failures are part of the returned [`Summary`].
pub fn execute(cli: &Cli) -> Result<Summary> {
    let config = Config::load(cli.config.as_deref())?;
    let settings = Settings::resolve(cli, &config)?;

    let old_key = keys::resolve("old", cli.old_pass_file.as_ref(), cli.old_pass_env.as_deref())?
        .obtain()?;
    let new_key = keys::resolve("new", cli.new_pass_file.as_ref(), cli.new_pass_env.as_deref())?
        .obtain()?;

    info!(
        paths = cli.paths.len(),
        jobs = settings.run.jobs,
        backup = settings.process.backup.is_some(),
        "starting rekey"
    );

    let rekeyer = Rekeyer::new(&AnsibleVault, &old_key, &new_key, &settings.policy);
    let terminal = TerminalConfirm;
    let confirm: Option<&dyn Confirm> = if settings.process.interactive {
        Some(&terminal)
    } else {
        None
    };
    let processor = FileProcessor::new(rekeyer, &settings.process, confirm);

    let summary = tree::run(&cli.paths, &processor, &settings.run);

    if cli.json {
        output::report_json(&summary)?;
    } else {
        output::report(&summary, cli.verbose);
    }

    Ok(summary)
}
