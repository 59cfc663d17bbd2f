use super::{block_on, connect, redact_dsn, Context};
use crate::output::print_json;
use anyhow::Result;
use partsdb_core::seed;

// ---------------------------------------------------------------------------
// init-db
// ---------------------------------------------------------------------------

pub fn init(ctx: &Context, install_triggers: bool) -> Result<()> {
    block_on(async {
        let store = connect(&ctx.config).await?;
        store.init_schema(install_triggers).await?;
        if ctx.json {
            print_json(&serde_json::json!({
                "initialized": true,
                "triggers": install_triggers,
            }))?;
        } else {
            println!(
                "Schema ready on {}{}",
                redact_dsn(&ctx.config.database.dsn),
                if install_triggers { "" } else { " (no triggers)" }
            );
        }
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// bootstrap
// ---------------------------------------------------------------------------

/// Schema with triggers, then sample data. Idempotent.
pub fn bootstrap(ctx: &Context) -> Result<()> {
    block_on(async {
        let store = connect(&ctx.config).await?;
        store.init_schema(true).await?;
        let report = seed::seed(&store).await?;
        if ctx.json {
            print_json(&report)?;
        } else {
            println!(
                "Category {} ({}), part {} ({})",
                report.category_id,
                if report.category_created { "created" } else { "existing" },
                report.part_id,
                if report.part_created { "created" } else { "existing" },
            );
        }
        Ok(())
    })
}
