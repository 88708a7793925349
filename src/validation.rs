use crate::error::{AppError, Result};

const MAX_NAME_LEN: usize = 64;

/// Instance names are joined onto the state root and passed to the CLI, so
/// only a conservative character set is accepted.
pub fn validate_instance_name(name: &str) -> Result<()> {
    let is_safe = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if !is_safe {
        return Err(AppError::invalid_name(name));
    }
    Ok(())
}
