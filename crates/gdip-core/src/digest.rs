//! Hex digests used by the GnuDIP challenge/response
//!
//! The password is hashed once when the client is configured, and that hash
//! is hashed again with every fresh salt:
//!
//! ```text
//! stored = md5_hex(plaintext)
//! pass   = md5_hex(stored + "." + salt)
//! ```

use md5::{Digest, Md5};

/// MD5 of `input` as 32 lowercase hex characters
pub fn digest_hex(input: &[u8]) -> String {
    hex::encode(Md5::digest(input))
}

/// Hash of the plaintext password, computed once at construction time
pub fn password_hash(plaintext: &str) -> String {
    digest_hex(plaintext.as_bytes())
}

/// The `pass` value sent in the update request
pub fn challenge_response(stored_hash: &str, salt: &str) -> String {
    let mut h = Md5::new();
    h.update(stored_hash.as_bytes());
    h.update(b".");
    h.update(salt.as_bytes());
    hex::encode(h.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_hex_known_vectors() {
        assert_eq!(digest_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(digest_hex(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            digest_hex(b"The quick brown fox jumps over the lazy dog"),
            "9e107d9d372bb6826bd81d3542a419d6"
        );
    }

    #[test]
    fn test_digest_hex_shape() {
        // Leading zero bytes must stay padded
        let hex = digest_hex(&[0u8, 1, 2, 255]);
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_challenge_response_is_hash_of_hash() {
        let stored = password_hash("secret");
        let expected = digest_hex(format!("{}.{}", stored, "s4lt").as_bytes());

        assert_eq!(challenge_response(&stored, "s4lt"), expected);
        assert_eq!(challenge_response(&stored, "s4lt"), expected);
        assert_ne!(challenge_response(&stored, "other"), expected);
    }
}
