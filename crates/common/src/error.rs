//! Errors for block construction.

use thiserror::Error;

/// Errors that occur while turning an authored block spec into a [`crate::Block`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    /// The block type is not in the catalog and no explicit template was given.
    #[error("unknown block type: '{0}'")]
    UnknownType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_type() {
        assert_eq!(
            BlockError::UnknownType("frobnicate".to_string()).to_string(),
            "unknown block type: 'frobnicate'"
        );
    }
}
