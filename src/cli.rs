use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "sb")]
#[command(author = "Saltbox Contributors")]
#[command(version)]
#[command(about = "Manage Saltbox, Sandbox and Saltbox_mod installs", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (also passed to ansible-playbook as -v...)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Skip the sb self-update check
    #[arg(long, global = true)]
    pub no_self_update: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Update Saltbox and Sandbox (resets the branches to master)
    Update,

    /// List Saltbox, Sandbox and Saltbox_mod tags
    List,

    /// Install one or more tags
    Install(InstallArgs),

    /// Run the bench.sh server benchmark
    Bench,

    /// Re-create the Ansible Python virtual environment
    RecreateVenv,

    /// Edit the inventory 'localhost.yml' file
    Inventory,

    /// Change the branch of the Saltbox repository
    Branch(BranchArgs),

    /// Change the branch of the Sandbox repository
    SandboxBranch(BranchArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Install
// ============================================================================

#[derive(Args)]
pub struct InstallArgs {
    /// Tags to install (comma or space separated; prefix with sandbox- or mod-)
    #[arg(required = true)]
    pub tags: Vec<String>,

    /// Tags to skip (comma or space separated)
    #[arg(long, num_args = 1..)]
    pub skip_tags: Vec<String>,

    /// Extra variables as key=value, repeatable
    #[arg(short, long = "extra-vars")]
    pub extra_vars: Vec<String>,
}

// ============================================================================
// Branch
// ============================================================================

#[derive(Args)]
pub struct BranchArgs {
    /// The name of the branch to switch to
    pub branch_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_install_args() {
        let cli = Cli::try_parse_from([
            "sb",
            "install",
            "plex,sonarr",
            "sandbox-code_server",
            "--skip-tags",
            "settings",
            "-e",
            "continuous_integration=true",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Command::Install(args) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(args.tags, vec!["plex,sonarr", "sandbox-code_server"]);
        assert_eq!(args.skip_tags, vec!["settings"]);
        assert_eq!(args.extra_vars, vec!["continuous_integration=true"]);
    }

    #[test]
    fn test_install_requires_tags() {
        assert!(Cli::try_parse_from(["sb", "install"]).is_err());
    }

    #[test]
    fn test_branch_args() {
        let cli = Cli::try_parse_from(["sb", "sandbox-branch", "develop"]).unwrap();
        let Command::SandboxBranch(args) = cli.command else {
            panic!("expected sandbox-branch");
        };
        assert_eq!(args.branch_name, "develop");
    }
}
