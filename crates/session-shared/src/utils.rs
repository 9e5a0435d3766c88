//! Utility functions

use crate::constants::REDACTED_PREFIX_LEN;

/// Shorten a secret-bearing token to a prefix that is safe to log.
pub fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(REDACTED_PREFIX_LEN).collect();
    if prefix.len() < token.len() {
        format!("{}***", prefix)
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_long_token() {
        assert_eq!(redact("abcdefghijklmnop"), "abcdef***");
    }

    #[test]
    fn test_redact_short_token_hides_everything() {
        assert_eq!(redact("abc"), "***");
        assert_eq!(redact(""), "***");
    }
}
