use serde_json::Value;

use crate::app::AppContext;
use crate::cli::{DeleteArgs, GetArgs, ListArgs, SetArgs};
use crate::output::{display_value, settings_listing};

pub fn handle_get(ctx: &AppContext, args: &GetArgs) -> anyhow::Result<()> {
    let default = args
        .default
        .as_deref()
        .map(|raw| {
            serde_json::from_str::<Value>(raw)
                .map_err(|e| anyhow::anyhow!("--default is not valid JSON: {}", e))
        })
        .transpose()?;

    let store = ctx.open_store()?;
    match store.get::<Value>(&args.key).or(default) {
        Some(value) => {
            println!("{}", display_value(&value));
            Ok(())
        }
        None => Err(anyhow::anyhow!("Setting not found: {}", args.key)),
    }
}

pub fn handle_set(ctx: &AppContext, args: &SetArgs) -> anyhow::Result<()> {
    let value = if args.json {
        serde_json::from_str::<Value>(&args.value)
            .map_err(|e| anyhow::anyhow!("VALUE is not valid JSON: {}", e))?
    } else {
        Value::String(args.value.clone())
    };

    let store = ctx.open_store()?;
    store.set(&args.key, &value, args.encrypt)?;
    if !ctx.quiet() {
        let note = if args.encrypt && !value.is_null() {
            " (encrypted)"
        } else {
            ""
        };
        println!("Set {}{}", args.key, note);
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    store.delete(&args.key)?;
    if !ctx.quiet() {
        println!("Deleted {}", args.key);
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let settings = store.get_all(args.include_encrypted)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }
    if settings.is_empty() {
        if !ctx.quiet() {
            println!("No settings stored.");
        }
        return Ok(());
    }
    println!("{}", settings_listing(&settings));
    Ok(())
}
