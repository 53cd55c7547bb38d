use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use postdesk_core::storage::{SettingsBackend, SqliteBackend};
use serde_json::Value;

use crate::app::{missing_config_message, AppContext};
use crate::cli::{BackupArgs, ExportArgs, ImportArgs, InitArgs, ResetArgs, RestoreArgs};
use crate::config::{
    default_database_path, write_config, PostdeskConfig, DEFAULT_CACHE_TTL_SECONDS,
    DEFAULT_LOG_LEVEL,
};
use crate::output::write_or_print;

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = ctx.config_path();
    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists: {}\nHint: Pass --force to overwrite it.",
            config_path.display()
        ));
    }

    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    log_level
        .parse::<tracing::Level>()
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", log_level))?;

    let database_path = match ctx.cli().database.as_deref() {
        Some(path) => PathBuf::from(path),
        None => default_database_path()?,
    };
    let config = PostdeskConfig::new(
        database_path.clone(),
        args.cache_ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECONDS),
        log_level,
    );
    write_config(config_path, &config)?;
    SqliteBackend::open(&database_path)?;

    if !ctx.quiet() {
        println!("Initialized settings database at {}", database_path.display());
        println!("Config written to {}", config_path.display());
    }
    Ok(())
}

pub fn handle_export(ctx: &AppContext, args: &ExportArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let settings = store.get_all(args.include_encrypted)?;
    let contents = serde_json::to_string_pretty(&settings)?;
    write_or_print(args.output.as_deref(), &contents)?;

    if let Some(path) = &args.output {
        if !ctx.quiet() {
            println!("Exported {} settings to {}", settings.len(), path);
        }
    }
    Ok(())
}

pub fn handle_import(ctx: &AppContext, args: &ImportArgs) -> anyhow::Result<()> {
    let contents = read_input(Path::new(&args.file))?;
    let settings = match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(settings)) => settings,
        Ok(_) => {
            return Err(anyhow::anyhow!(
                "Import file must contain a JSON object of settings\nHint: Use `postdesk restore` for backup documents."
            ))
        }
        Err(e) => return Err(anyhow::anyhow!("Import file is not valid JSON: {}", e)),
    };

    let store = ctx.open_store()?;
    let summary = store.import_settings(&settings, !args.no_encrypt_sensitive)?;
    if !ctx.quiet() {
        println!(
            "Imported {} settings ({} skipped)",
            summary.applied, summary.skipped
        );
    }
    Ok(())
}

pub fn handle_backup(ctx: &AppContext, args: &BackupArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let backup = store.create_backup()?;
    write_or_print(args.output.as_deref(), &backup)?;

    if let Some(path) = &args.output {
        if !ctx.quiet() {
            println!("Backed up settings to {}", path);
        }
    }
    Ok(())
}

pub fn handle_restore(ctx: &AppContext, args: &RestoreArgs) -> anyhow::Result<()> {
    let contents = read_input(Path::new(&args.file))?;
    let store = ctx.open_store()?;
    let summary = store.restore_from_backup(&contents)?;
    if !ctx.quiet() {
        println!(
            "Restored {} settings ({} skipped)",
            summary.applied, summary.skipped
        );
    }
    Ok(())
}

pub fn handle_reset(ctx: &AppContext, args: &ResetArgs) -> anyhow::Result<()> {
    if !args.yes {
        if !std::io::stdin().is_terminal() {
            return Err(anyhow::anyhow!(
                "Refusing to reset settings without confirmation\nHint: Pass --yes to reset non-interactively."
            ));
        }
        let proceed = dialoguer::Confirm::new()
            .with_prompt("Delete every stored setting?")
            .default(false)
            .interact()?;
        if !proceed {
            return Err(anyhow::anyhow!("Reset cancelled"));
        }
    }

    let store = ctx.open_store()?;
    let removed = store.reset()?;
    if !ctx.quiet() {
        println!("Reset complete: {} settings removed", removed);
    }
    Ok(())
}

pub fn handle_doctor(ctx: &AppContext) -> anyhow::Result<()> {
    let config_status = match ctx.config() {
        Some(_) => format!("OK ({})", ctx.config_path().display()),
        None if ctx.cli().database.is_some() => "not found, using --database".to_string(),
        None => {
            eprintln!("{}", missing_config_message(ctx.config_path()));
            return Err(anyhow::anyhow!("Postdesk is not initialized"));
        }
    };

    let database_path = ctx.database_path()?;
    let store = ctx.open_store().map_err(|e| {
        anyhow::anyhow!("Failed to open settings database for diagnostics: {}", e)
    })?;
    let backend = store.backend();

    if !backend.health_check() {
        eprintln!("Doctor: FAILED");
        eprintln!("- database: FAILED ({})", database_path.display());
        eprintln!("Hint: Restore from a backup with `postdesk restore <file>`.");
        return Err(anyhow::anyhow!("Doctor failed"));
    }

    let format_version = backend.format_version()?;
    let count = backend.count()?;
    let encrypted = backend
        .find_all()?
        .iter()
        .filter(|setting| setting.is_encrypted)
        .count();
    let unreadable = store
        .get_all(true)?
        .values()
        .filter(|value| {
            value.as_str() == Some(postdesk_core::settings::DECRYPT_ERROR_SENTINEL)
        })
        .count();

    if !ctx.quiet() {
        println!("Doctor: {}", if unreadable == 0 { "OK" } else { "WARN" });
        println!("- config: {}", config_status);
        println!("- database: OK ({})", database_path.display());
        println!("- schema format: {}", format_version);
        println!("- settings: {} ({} encrypted)", count, encrypted);
        println!("- key fingerprint: {}", store.cipher().key_fingerprint());
        if unreadable > 0 {
            println!("- unreadable: {}", unreadable);
            println!(
                "Hint: Encrypted values are bound to this host and user; re-enter them with `postdesk app update`."
            );
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
}
