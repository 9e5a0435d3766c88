//! Secure random tokens

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;

/// Generate `byte_len` random bytes from the thread-local CSPRNG, URL-safe base64 encoded.
pub fn generate_token(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_length() {
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(generate_token(32).len(), 43);
        assert_eq!(generate_token(16).len(), 22);
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = generate_token(64);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_tokens_are_distinct() {
        let tokens: HashSet<String> = (0..10_000).map(|_| generate_token(32)).collect();
        assert_eq!(tokens.len(), 10_000);
    }
}
