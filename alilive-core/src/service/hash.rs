//! MD5 digest used to sign live URLs

/// Lowercase hex MD5 of `input`, always 32 characters
///
/// Returns an empty string for empty input instead of the digest of nothing.
#[must_use]
pub fn md5_hex(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    format!("{:x}", md5::compute(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(md5_hex("hello"), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(md5_hex(""), "");
    }

    #[test]
    fn test_leading_zero_bytes_are_kept() {
        // digest starts with 0x00 0x00
        let digest = md5_hex("stream-18137");
        assert_eq!(digest, "00001100d3151399644edf98e821a8d8");
        assert_eq!(digest.len(), 32);
    }

    #[test]
    fn test_lowercase_hex() {
        for input in ["a", "/live/abc123-1700000000-0-1-pushkey", "直播"] {
            let digest = md5_hex(input);
            assert_eq!(digest.len(), 32);
            assert!(digest
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }
}
