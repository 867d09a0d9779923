//! Administrator provisioning list.
//!
//! Admin accounts are named explicitly in `ADMIN_ACCOUNT_IDS` (comma-separated
//! identity-provider ids) and promoted by the bootstrap, never as a side effect
//! of signing in.

/// Environment variable holding the admin account ids
pub const ADMIN_ACCOUNT_IDS_VAR: &str = "ADMIN_ACCOUNT_IDS";

/// Splits a comma-separated id list, trimming blanks and dropping duplicates.
#[must_use]
pub fn parse_admin_ids(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// Reads the configured admin ids from the environment.
///
/// Returns an empty list when the variable is unset.
#[must_use]
pub fn get_admin_account_ids() -> Vec<String> {
    std::env::var(ADMIN_ACCOUNT_IDS_VAR)
        .map(|raw| parse_admin_ids(&raw))
        .unwrap_or_default()
}
