//! Parsing of user-entered node values

use crate::domain::DomainError;

/// Parse the text of the value input into a node value.
///
/// Surrounding whitespace is ignored; anything else that is not a plain
/// (optionally signed) integer is rejected.
pub fn parse_node_value(raw: &str) -> Result<i64, DomainError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| DomainError::InvalidValue {
            input: raw.to_string(),
        })
}
