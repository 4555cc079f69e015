use md5::{Digest, Md5};

/// Deterministic hex digest used for row signatures and change detection.
pub fn content_signature(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(content_signature("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn deterministic() {
        assert_eq!(content_signature("sheetgate"), content_signature("sheetgate"));
        assert_ne!(content_signature("a"), content_signature("b"));
    }

    #[test]
    fn hex_width() {
        assert_eq!(content_signature("").len(), 32);
    }
}
