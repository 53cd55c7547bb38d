//! Postdesk CLI - settings store for a local social-media drafting tool
//!
//! Exposes the core settings store, backups and the typed application
//! settings on the command line.

mod app;
mod cli;
mod commands;
mod config;
mod output;

use clap::Parser;
use postdesk_core::VERSION;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{AppSubcommand, Cli, Commands};
use crate::commands::{app_settings, maintenance, settings};
use crate::output::print_error;

fn main() {
    let cli = Cli::parse();

    let result = AppContext::load(&cli).and_then(|ctx| {
        init_logging(ctx.log_level());
        run(&ctx, &cli)
    });

    if let Err(e) = result {
        let error_msg = format!("{:#}", e);
        let (message, hint) = split_error_hint(&error_msg);
        print_error(message, hint.as_deref());
        std::process::exit(1);
    }
}

/// Install the stderr subscriber. `POSTDESK_LOG` overrides the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env("POSTDESK_LOG")
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_LEVEL));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Separate an embedded "Hint:" line from the message, or derive a hint
/// for common failures.
fn split_error_hint(error: &str) -> (&str, Option<String>) {
    if let Some(idx) = error.find("\nHint:") {
        return (&error[..idx], Some(error[idx + 1..].to_string()));
    }

    let error_lower = error.to_lowercase();

    if error_lower.contains("setting not found") {
        return (
            error,
            Some("Hint: Run `postdesk list` to see stored keys.".to_string()),
        );
    }

    if error_lower.contains("invalid backup format") {
        return (
            error,
            Some("Hint: Backups are written by `postdesk backup`.".to_string()),
        );
    }

    if error_lower.contains("import incomplete") {
        return (
            error,
            Some("Hint: Entries not listed were written; fix the failed keys and import again.".to_string()),
        );
    }

    if error_lower.contains("sqlite error") {
        return (
            error,
            Some("Hint: Run `postdesk doctor` to check the settings database.".to_string()),
        );
    }

    (error, None)
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => maintenance::handle_init(ctx, args),
        Some(Commands::Get(args)) => settings::handle_get(ctx, args),
        Some(Commands::Set(args)) => settings::handle_set(ctx, args),
        Some(Commands::Delete(args)) => settings::handle_delete(ctx, args),
        Some(Commands::List(args)) => settings::handle_list(ctx, args),
        Some(Commands::Export(args)) => maintenance::handle_export(ctx, args),
        Some(Commands::Import(args)) => maintenance::handle_import(ctx, args),
        Some(Commands::Backup(args)) => maintenance::handle_backup(ctx, args),
        Some(Commands::Restore(args)) => maintenance::handle_restore(ctx, args),
        Some(Commands::Reset(args)) => maintenance::handle_reset(ctx, args),
        Some(Commands::App(AppSubcommand::Show(args))) => app_settings::handle_show(ctx, args),
        Some(Commands::App(AppSubcommand::Update(args))) => app_settings::handle_update(ctx, args),
        Some(Commands::Doctor) => maintenance::handle_doctor(ctx),
        None => {
            println!("Postdesk v{}", VERSION);
            println!("\nRun `postdesk --help` for usage information.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_hint_is_split_off() {
        let (message, hint) = split_error_hint("Config missing\nHint: Run `postdesk init`.");
        assert_eq!(message, "Config missing");
        assert_eq!(hint.as_deref(), Some("Hint: Run `postdesk init`."));
    }

    #[test]
    fn test_contextual_hint() {
        let (message, hint) = split_error_hint("Persistence error: Setting not found: theme");
        assert_eq!(message, "Persistence error: Setting not found: theme");
        assert!(hint.unwrap().contains("postdesk list"));
    }

    #[test]
    fn test_no_hint() {
        assert_eq!(split_error_hint("boom"), ("boom", None));
    }
}
