//! Constant-time secret comparison.

use subtle::ConstantTimeEq;

/// Compare a presented token against the expected secret.
///
/// Runtime depends only on the two lengths, never on where the first
/// differing byte sits. A missing or empty value on either side is a
/// non-match, so an unconfigured secret can never authorize anything.
pub fn compare(token: Option<&str>, secret: Option<&str>) -> bool {
    let (Some(token), Some(secret)) = (token, secret) else {
        return false;
    };
    if token.is_empty() || secret.is_empty() {
        return false;
    }

    let (a, b) = (token.as_bytes(), secret.as_bytes());
    let longest = a.len().max(b.len());

    let mut acc = (a.len() ^ b.len()) as u64;
    for i in 0..longest {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        acc |= u64::from(x ^ y);
    }

    acc.ct_eq(&0).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_strings_match() {
        assert!(compare(Some("secret"), Some("secret")));
    }

    #[test]
    fn test_prefix_does_not_match() {
        assert!(!compare(Some("abc"), Some("abcd")));
        assert!(!compare(Some("abcd"), Some("abc")));
    }

    #[test]
    fn test_single_byte_difference() {
        assert!(!compare(Some("secreT"), Some("secret")));
        assert!(!compare(Some("Secret"), Some("secret")));
    }

    #[test]
    fn test_missing_values_never_match() {
        assert!(!compare(None, Some("secret")));
        assert!(!compare(Some("secret"), None));
        assert!(!compare(None, None));
    }

    #[test]
    fn test_empty_values_never_match() {
        assert!(!compare(Some(""), Some("")));
        assert!(!compare(Some(""), Some("secret")));
        assert!(!compare(Some("secret"), Some("")));
    }

    #[test]
    fn test_trailing_nul_is_not_padding() {
        // Out-of-range bytes read as zero, the length term must still differ.
        assert!(!compare(Some("abc\0"), Some("abc")));
    }

    #[test]
    fn test_multibyte_utf8() {
        assert!(compare(Some("pässwörd"), Some("pässwörd")));
        assert!(!compare(Some("pässwörd"), Some("passwörd")));
    }
}
