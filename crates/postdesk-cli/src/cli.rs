use clap::{Args, Parser, Subcommand};

use postdesk_core::VERSION;

/// Postdesk - local settings store for drafting social-media posts
#[derive(Parser)]
#[command(name = "postdesk")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the settings database
    #[arg(short, long, global = true, env = "POSTDESK_DATABASE")]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the config file and create the settings database
    Init(InitArgs),

    /// Read one setting
    Get(GetArgs),

    /// Write one setting
    Set(SetArgs),

    /// Remove one setting
    Delete(DeleteArgs),

    /// List every setting
    List(ListArgs),

    /// Print all settings as a JSON object
    Export(ExportArgs),

    /// Write settings from a JSON object file
    Import(ImportArgs),

    /// Write a backup document
    Backup(BackupArgs),

    /// Restore settings from a backup document
    Restore(RestoreArgs),

    /// Delete every setting
    Reset(ResetArgs),

    /// Typed application settings
    #[command(subcommand)]
    App(AppSubcommand),

    /// Check config, database and key
    Doctor,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Cache TTL written to the config
    #[arg(long, value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Log level written to the config (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `get` command
#[derive(Args)]
pub struct GetArgs {
    /// Setting key
    #[arg(value_name = "KEY")]
    pub key: String,

    /// JSON value printed when the key is absent or unreadable
    #[arg(long, value_name = "JSON")]
    pub default: Option<String>,
}

/// Arguments for the `set` command
#[derive(Args)]
pub struct SetArgs {
    /// Setting key
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Value; stored as a string unless --json is given
    #[arg(value_name = "VALUE")]
    pub value: String,

    /// Parse VALUE as JSON
    #[arg(long)]
    pub json: bool,

    /// Encrypt the value at rest
    #[arg(long)]
    pub encrypt: bool,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Setting key
    #[arg(value_name = "KEY")]
    pub key: String,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Reveal encrypted values
    #[arg(long)]
    pub include_encrypted: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `export` command
#[derive(Args)]
pub struct ExportArgs {
    /// Reveal encrypted values
    #[arg(long)]
    pub include_encrypted: bool,

    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,
}

/// Arguments for the `import` command
#[derive(Args)]
pub struct ImportArgs {
    /// JSON object of settings
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Store credentials without encryption
    #[arg(long)]
    pub no_encrypt_sensitive: bool,
}

/// Arguments for the `backup` command
#[derive(Args)]
pub struct BackupArgs {
    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,
}

/// Arguments for the `restore` command
#[derive(Args)]
pub struct RestoreArgs {
    /// Backup document
    #[arg(value_name = "FILE")]
    pub file: String,
}

/// Arguments for the `reset` command
#[derive(Args)]
pub struct ResetArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum AppSubcommand {
    /// Show application settings with defaults applied
    Show(AppShowArgs),

    /// Apply a camelCase JSON patch
    Update(AppUpdateArgs),
}

/// Arguments for the `app show` command
#[derive(Args)]
pub struct AppShowArgs {
    /// Show credentials instead of redacting them
    #[arg(long)]
    pub reveal: bool,
}

/// Arguments for the `app update` command
#[derive(Args)]
pub struct AppUpdateArgs {
    /// Patch such as '{"theme":"dark","maxCharacterCount":500}'
    #[arg(value_name = "JSON")]
    pub patch: String,
}
