//! Per-account token storage.
//!
//! Access tokens live in:
//!   ~/.config/horas/providers/google/tokens/{account}.json
//!
//! Minting and refreshing them (service-account impersonation, OAuth, ...)
//! is handled outside this crate; we only read the result.

use std::path::PathBuf;

use horas_core::{HorasError, HorasResult};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AccountToken {
    pub access_token: String,
}

fn tokens_dir() -> HorasResult<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| HorasError::Config("Could not determine config directory".into()))?
        .join("horas")
        .join("providers")
        .join("google")
        .join("tokens"))
}

pub fn load_token(account: &str) -> HorasResult<AccountToken> {
    let path = tokens_dir()?.join(format!("{account}.json"));

    if !path.exists() {
        return Err(HorasError::Auth(format!(
            "No Google token for account {account}. Place one at {}",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(&path)?;
    serde_json::from_str(&contents)
        .map_err(|e| HorasError::Serialization(format!("{}: {}", path.display(), e)))
}
