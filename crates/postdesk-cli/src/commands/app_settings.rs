use postdesk_core::crypto::REDACTED;
use postdesk_core::settings::AppSettingsPatch;
use serde_json::Value;

use crate::app::AppContext;
use crate::cli::{AppShowArgs, AppUpdateArgs};

pub fn handle_show(ctx: &AppContext, args: &AppShowArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let settings = store.app().get_app_settings();

    let mut value = serde_json::to_value(&settings)?;
    if !args.reveal {
        mask_credentials(&mut value);
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub fn handle_update(ctx: &AppContext, args: &AppUpdateArgs) -> anyhow::Result<()> {
    let patch: AppSettingsPatch = serde_json::from_str(&args.patch)
        .map_err(|e| anyhow::anyhow!("Invalid settings patch: {}\nHint: Use camelCase field names, e.g. '{{\"theme\":\"dark\"}}'.", e))?;
    if patch.is_empty() {
        return Err(anyhow::anyhow!("Settings patch is empty"));
    }

    let store = ctx.open_store()?;
    store.app().update_app_settings(&patch)?;
    if !ctx.quiet() {
        println!("Application settings updated");
    }
    Ok(())
}

// Credentials that are set are masked; unset ones stay null.
fn mask_credentials(value: &mut Value) {
    const CREDENTIAL_FIELDS: &[&str] = &[
        "newsApiKey",
        "openaiApiKey",
        "xApiKey",
        "xApiSecret",
        "xBearerToken",
    ];
    let Some(fields) = value.as_object_mut() else {
        return;
    };
    for name in CREDENTIAL_FIELDS {
        if let Some(field) = fields.get_mut(*name) {
            if !field.is_null() {
                *field = Value::String(REDACTED.to_string());
            }
        }
    }
}
