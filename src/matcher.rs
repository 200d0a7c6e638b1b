use memchr::memmem;

/// Literal byte sequence a class file must contain to be flagged.
///
/// `withECDSA` appears in the constant pool of any class that requests an
/// ECDSA `Signature` instance (`SHA256withECDSA`, `SHA384withECDSAinP1363Format`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    bytes: Vec<u8>,
    label: String,
}

pub const DEFAULT_MARKER: &[u8] = b"withECDSA";
pub const DEFAULT_LABEL: &str = "ECDSA";

impl Default for Marker {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER, DEFAULT_LABEL)
    }
}

impl Marker {
    pub fn new(bytes: impl Into<Vec<u8>>, label: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            label: label.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Name used in finding lines, e.g. `potential use of ECDSA`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_match(&self, content: &[u8]) -> bool {
        if self.bytes.is_empty() {
            return false;
        }
        memmem::find(content, &self.bytes).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_marker_anywhere_in_content() {
        let marker = Marker::default();
        assert!(marker.is_match(b"withECDSA"));
        assert!(marker.is_match(b"\xca\xfe\xba\xbe\x00\x0fSHA256withECDSA\x01"));
        assert!(marker.is_match(b"SHA384withECDSAinP1363Format"));
    }

    #[test]
    fn rejects_empty_and_truncated_content() {
        let marker = Marker::default();
        assert!(!marker.is_match(b""));
        assert!(!marker.is_match(b"withECDS"));
        assert!(!marker.is_match(b"ithECDSA"));
        assert!(!marker.is_match(b"with ECDSA"));
    }

    #[test]
    fn tolerates_non_utf8_bytes() {
        let marker = Marker::default();
        let mut content = vec![0xff, 0xfe, 0x00, 0xc3];
        content.extend_from_slice(b"withECDSA");
        content.push(0x80);
        assert!(marker.is_match(&content));
        assert!(!marker.is_match(&[0xff; 64]));
    }

    #[test]
    fn match_is_case_sensitive() {
        assert!(!Marker::default().is_match(b"WITHECDSA withecdsa"));
    }

    #[test]
    fn custom_marker_uses_its_own_bytes() {
        let marker = Marker::new(b"withRSA".to_vec(), "RSA");
        assert_eq!(marker.label(), "RSA");
        assert!(marker.is_match(b"SHA256withRSA"));
        assert!(!marker.is_match(b"SHA256withECDSA"));
    }
}
