use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output logs as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Hide progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Provide custom config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set request headers (key:value)
    #[arg(required = false, long, short = 'H', global = true)]
    pub header: Option<Vec<String>>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the newest remote version of targets
    #[clap(name = "update", visible_alias = "u")]
    Update {
        /// Targets to check (default: all enabled)
        targets: Vec<String>,
    },

    /// Install the cached version of targets that are not installed
    #[clap(name = "install", visible_alias = "i")]
    Install {
        /// Targets to install (default: all enabled)
        targets: Vec<String>,
    },

    /// Install the cached version of targets where it differs from the installed one
    #[clap(name = "upgrade", visible_alias = "up")]
    Upgrade {
        /// Targets to upgrade (default: all enabled)
        targets: Vec<String>,
    },

    /// Remove every installed version of targets
    #[clap(name = "uninstall", visible_alias = "rm")]
    Uninstall {
        /// Targets to uninstall (default: all enabled)
        targets: Vec<String>,
    },

    /// Enable targets
    Enable {
        /// Targets to enable (default: all known)
        targets: Vec<String>,
    },

    /// Disable targets
    Disable {
        /// Targets to disable (default: all enabled)
        targets: Vec<String>,
    },

    /// List known targets
    #[clap(name = "list", visible_alias = "ls")]
    List,

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,
}
