//! Content fingerprints for conditional GET.

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Hex characters of the digest kept in the tag
const FINGERPRINT_LEN: usize = 16;

/// Entity tag for a payload: the first 16 hex digits of the SHA-256 of its
/// JSON form, quoted.
///
/// Serialization follows struct field order, so the same value always yields
/// the same tag. Map-typed payloads are not canonicalized.
pub fn fingerprint<T: Serialize + ?Sized>(payload: &T) -> Result<String> {
    let json = serde_json::to_vec(payload).context("Failed to serialize payload for ETag")?;

    let mut hasher = Sha256::new();
    hasher.update(&json);
    let digest = hex::encode(hasher.finalize());

    Ok(format!("\"{}\"", &digest[..FINGERPRINT_LEN]))
}

/// True when the client's `If-None-Match` value is exactly the current tag
pub fn is_unchanged(client_tag: Option<&str>, current: &str) -> bool {
    client_tag == Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Payload<'a> {
        data: Vec<u32>,
        time_range: &'a str,
        limit: usize,
    }

    #[test]
    fn test_fingerprint_shape() {
        let tag = fingerprint(&Payload {
            data: vec![1, 2, 3],
            time_range: "1w",
            limit: 50,
        })
        .unwrap();

        assert_eq!(tag.len(), FINGERPRINT_LEN + 2);
        assert!(tag.starts_with('"') && tag.ends_with('"'));
        assert!(tag[1..tag.len() - 1].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_matches_sha256_prefix() {
        // sha256("[]") = 4f53cda18c2baa0c0354bb5f9a3ecbe5ed12ab4d8e11ba873c2f11161202b945
        let tag = fingerprint(&Vec::<u8>::new()).unwrap();
        assert_eq!(tag, "\"4f53cda18c2baa0c\"");
    }

    #[test]
    fn test_fingerprint_deterministic_and_sensitive() {
        let a = Payload {
            data: vec![1, 2, 3],
            time_range: "1w",
            limit: 50,
        };
        let same = Payload {
            data: vec![1, 2, 3],
            time_range: "1w",
            limit: 50,
        };
        let other_limit = Payload {
            data: vec![1, 2, 3],
            time_range: "1w",
            limit: 10,
        };

        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&same).unwrap());
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&other_limit).unwrap());
    }

    #[test]
    fn test_is_unchanged() {
        assert!(is_unchanged(Some("\"abc\""), "\"abc\""));
        assert!(!is_unchanged(Some("abc"), "\"abc\""));
        assert!(!is_unchanged(None, "\"abc\""));
    }
}
