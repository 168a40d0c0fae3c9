//! MD5 checksum utility for drift detection.

use md5::{Digest, Md5};

/// Compute the uppercase hex MD5 digest of a script's text
///
/// The text is hashed as single-byte characters: anything outside ASCII is
/// replaced by `?` before hashing. Two scripts that differ only in non-ASCII
/// characters therefore share a checksum.
pub fn compute_checksum(text: &str) -> String {
    let bytes: Vec<u8> = text
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect();

    let mut hasher = Md5::new();
    hasher.update(&bytes);
    hex::encode_upper(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(compute_checksum(""), "D41D8CD98F00B204E9800998ECF8427E");
        assert_eq!(compute_checksum("abc"), "900150983CD24FB0D6963F7D28E17F72");
    }

    #[test]
    fn test_stable_and_sensitive() {
        let a = compute_checksum("CREATE TABLE t (id INTEGER);");
        let b = compute_checksum("CREATE TABLE t (id INTEGER);");
        let c = compute_checksum("CREATE TABLE t (id INTEGEr);");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|ch| ch.is_ascii_digit() || ch.is_ascii_uppercase()));
    }

    #[test]
    fn test_non_ascii_hashes_as_question_mark() {
        assert_eq!(compute_checksum("caf\u{e9}"), compute_checksum("caf?"));
    }
}
