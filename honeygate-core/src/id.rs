//! Opaque identifier generation
//!
//! Prefixed identifiers with at least 96 bits of entropy, URL-safe and
//! unpredictable per call. Used for the one-time-passcode redemption ids.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};

/// Number of random bytes behind each identifier (96 bits).
const ID_ENTROPY_BYTES: usize = 12;

/// Generate a prefixed opaque identifier.
///
/// The format is `{prefix}_{random}` where the random part is base64
/// URL-safe encoded without padding. Identifiers are unique per call with
/// overwhelming probability; a timestamp-derived scheme would collide for
/// calls within the same instant.
pub fn generate_opaque_id(prefix: &str) -> String {
    let mut bytes = [0u8; ID_ENTROPY_BYTES];
    OsRng.try_fill_bytes(&mut bytes).unwrap();

    let encoded = BASE64_URL_SAFE_NO_PAD.encode(bytes);

    format!("{prefix}_{encoded}")
}

/// Validate that an identifier has the expected prefix and enough entropy.
pub fn validate_opaque_id(id: &str, expected_prefix: &str) -> bool {
    let Some(random_part) = id
        .strip_prefix(expected_prefix)
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };

    match BASE64_URL_SAFE_NO_PAD.decode(random_part) {
        Ok(decoded) => decoded.len() >= ID_ENTROPY_BYTES,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_opaque_id() {
        let id = generate_opaque_id("otp");
        assert!(id.starts_with("otp_"));
        assert!(id.len() > 4);

        // Ensure uniqueness across calls
        let id2 = generate_opaque_id("otp");
        assert_ne!(id, id2);
    }

    #[test]
    fn test_validate_opaque_id() {
        let id = generate_opaque_id("otp");
        assert!(validate_opaque_id(&id, "otp"));
        assert!(!validate_opaque_id(&id, "usr"));

        assert!(!validate_opaque_id("otp", "otp"));
        assert!(!validate_opaque_id("otp_", "otp"));
        assert!(!validate_opaque_id("otp_invalid!", "otp"));
        assert!(!validate_opaque_id("otp_YWJj", "otp")); // too little entropy
    }

    #[test]
    fn test_id_is_url_safe() {
        let id = generate_opaque_id("otp");
        assert!(
            id.chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        );
    }
}
