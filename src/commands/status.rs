//! Per-user sync state overview.

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;

pub fn run(app: &App) -> Result<()> {
    if app.config.users.is_empty() {
        eprintln!("No users configured.");
        return Ok(());
    }

    let states = app.states.all()?;
    let events = app.events.all()?;
    let calendar_id = &app.config.sync.calendar_id;

    for user in &app.config.users {
        let state = states
            .iter()
            .find(|s| s.user_email == *user && s.calendar_id == *calendar_id);
        let event_count = events.iter().filter(|e| e.user_email == *user).count();

        let last_synced = state
            .and_then(|s| s.last_synced_at)
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "never".to_string());

        let mode = match state.and_then(|s| s.sync_token.as_deref()) {
            Some(token) if !token.trim().is_empty() => "incremental".green().to_string(),
            _ => "full".yellow().to_string(),
        };

        println!("{user}: {event_count} events, last synced {last_synced}, next sync {mode}");
    }

    Ok(())
}
