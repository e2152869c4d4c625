// src/core/paths.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not expand path '{path}': {reason}")]
    Expansion { path: String, reason: String },
}

/// Expands `~` and `$VAR`/`${VAR}` references in a user-supplied path.
pub fn expand_path(template: &str) -> Result<PathBuf, PathError> {
    shellexpand::full(template)
        .map(|expanded| PathBuf::from(expanded.into_owned()))
        .map_err(|e| PathError::Expansion {
            path: template.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_is_unchanged() {
        assert_eq!(
            expand_path("/etc/krb5.conf").unwrap(),
            PathBuf::from("/etc/krb5.conf")
        );
        assert_eq!(expand_path("./batchop.err").unwrap(), PathBuf::from("./batchop.err"));
    }

    #[test]
    fn test_env_var_is_expanded() {
        let home = std::env::var("HOME").unwrap_or_default();
        if home.is_empty() {
            return;
        }
        assert_eq!(
            expand_path("$HOME/batchop.err").unwrap(),
            PathBuf::from(format!("{}/batchop.err", home))
        );
    }

    #[test]
    fn test_undefined_variable_is_an_error() {
        let result = expand_path("$BATCHOP_SURELY_UNDEFINED_VARIABLE/x");
        assert!(matches!(result, Err(PathError::Expansion { .. })));
    }
}
