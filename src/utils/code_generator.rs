//! Short id generation and validation.
//!
//! Ids are 6 random bytes encoded as URL-safe base64 without padding,
//! giving 8 characters and 2^48 possible values.

use base64::Engine as _;

/// Length of random bytes before base64 encoding.
const ID_LENGTH_BYTES: usize = 6;

/// Encoded id length.
pub const SHORT_ID_LEN: usize = 8;

/// Generates a random short id.
///
/// Uses `getrandom` for entropy and encodes the result as URL-safe base64
/// without padding.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
///
/// # Examples
///
/// ```ignore
/// let id = generate_short_id();
/// assert_eq!(id.len(), 8);
/// assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
/// ```
pub fn generate_short_id() -> String {
    let mut buffer = [0u8; ID_LENGTH_BYTES];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
}

/// Returns `true` if `id` could have been produced by [`generate_short_id`].
///
/// Used to reject malformed ids before touching storage.
pub fn is_valid_short_id(id: &str) -> bool {
    id.len() == SHORT_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_short_id_has_correct_length() {
        assert_eq!(generate_short_id().len(), SHORT_ID_LEN);
    }

    #[test]
    fn test_generate_short_id_url_safe_characters() {
        let id = generate_short_id();
        assert!(
            id.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert!(!id.contains('='));
    }

    #[test]
    fn test_generate_short_id_produces_unique_ids() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_short_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_generated_ids_are_valid() {
        for _ in 0..100 {
            assert!(is_valid_short_id(&generate_short_id()));
        }
    }

    #[test]
    fn test_is_valid_short_id_rejects_bad_input() {
        assert!(!is_valid_short_id(""));
        assert!(!is_valid_short_id("abc"));
        assert!(!is_valid_short_id("abcdefghi"));
        assert!(!is_valid_short_id("abc/../x"));
        assert!(!is_valid_short_id("abcd efg"));
    }
}
