//! Validation for ids passed on the command line.
//!
//! Deal and stage ids end up in request paths (`/items/deals/{id}`), so only
//! a conservative character set is accepted.

use anyhow::{bail, Result};

/// Maximum allowed length for ids.
pub const MAX_ID_LENGTH: usize = 128;

/// Validates that an id is safe to embed in a request path.
///
/// An id is valid if:
/// - It is not empty
/// - It is no longer than MAX_ID_LENGTH characters
/// - It contains only alphanumeric characters, dashes, and underscores
///
/// # Examples
///
/// ```
/// use dealboard::validation::validate_id;
///
/// assert!(validate_id("d-101").is_ok());
/// assert!(validate_id("42").is_ok());
/// assert!(validate_id("").is_err());
/// assert!(validate_id("../users").is_err());
/// ```
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        bail!("ID cannot be empty");
    }

    if id.len() > MAX_ID_LENGTH {
        bail!(
            "ID too long: {} characters (max {})",
            id.len(),
            MAX_ID_LENGTH
        );
    }

    let valid_chars = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid_chars {
        bail!("ID '{id}' contains invalid characters. Use only alphanumeric characters, dashes (-), and underscores (_)");
    }

    Ok(())
}

/// Clap value parser for id arguments.
///
/// ```ignore
/// #[arg(value_parser = clap_id_validator)]
/// deal_id: String,
/// ```
pub fn clap_id_validator(s: &str) -> Result<String, String> {
    validate_id(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}
