//! Manual sync triggers.
//!
//! `sync <user>` runs one user and propagates failure; `sync-all` isolates
//! failures per user so one broken account never blocks the rest.

use anyhow::{bail, Context, Result};
use horas_core::IngestionEngine;
use horas_provider_google::GoogleClientProvider;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::config::HorasConfig;

async fn sync_one(
    app: &App,
    engine: &IngestionEngine<GoogleClientProvider>,
    user: &str,
    reset: bool,
) -> Result<()> {
    if reset {
        app.reset_sync_state(user)?;
    }
    engine.sync_user(user).await?;
    Ok(())
}

pub async fn run_one(app: &App, user: &str, reset: bool) -> Result<()> {
    let engine = app.engine()?;

    eprintln!("Syncing {user}...");
    sync_one(app, &engine, user, reset)
        .await
        .with_context(|| format!("sync failed for {user}"))?;
    eprintln!("{}     {user}", "OK".green());
    Ok(())
}

pub async fn run_all(app: &App, reset: bool) -> Result<()> {
    if app.config.users.is_empty() {
        bail!(
            "No users configured. Add `users = [\"you@example.com\"]` to {}",
            HorasConfig::config_path()?.display()
        );
    }

    let engine = app.engine()?;
    let mut failed = 0;

    for user in &app.config.users {
        eprintln!("Syncing {user}...");
        match sync_one(app, &engine, user, reset).await {
            Ok(()) => eprintln!("{}     {user}", "OK".green()),
            Err(e) => {
                failed += 1;
                eprintln!("{}  {user}: {e:#}", "ERROR".red());
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} users failed to sync", app.config.users.len());
    }
    Ok(())
}
