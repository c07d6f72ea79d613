use crate::error::EarlyAccessError;
use regex::Regex;
use std::sync::LazyLock;

/// One `@`, no whitespace, and a dot splitting the domain into non-empty parts.
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Whitespace, plus the byte-order mark that copy-paste from some editors leaves behind.
fn is_padding(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Trims `raw` and checks it looks like an address.
///
/// Absent, empty and all-whitespace input is [`EarlyAccessError::MissingInput`]; that
/// check runs before the shape check.
pub fn normalize_email(raw: Option<&str>) -> Result<&str, EarlyAccessError> {
    let email = raw.map(|raw| raw.trim_matches(is_padding)).unwrap_or_default();

    if email.is_empty() {
        return Err(EarlyAccessError::missing("email is empty or absent"));
    }
    if !EMAIL_SHAPE.is_match(email) {
        return Err(EarlyAccessError::invalid("does not match local@domain.tld"));
    }

    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trims_and_keeps_case() {
        assert_eq!(normalize_email(Some("  Teacher@School.edu.cn \n")).unwrap(), "Teacher@School.edu.cn");
    }

    #[test]
    fn byte_order_mark_is_trimmed() {
        assert_eq!(normalize_email(Some("\u{FEFF}a@b.co\u{FEFF} ")).unwrap(), "a@b.co");
        assert!(matches!(
            normalize_email(Some("\u{FEFF}\u{FEFF}")),
            Err(EarlyAccessError::MissingInput { .. })
        ));
    }

    #[test]
    fn missing_wins_over_invalid() {
        for raw in [None, Some(""), Some("   "), Some("\t\n")] {
            assert!(matches!(normalize_email(raw), Err(EarlyAccessError::MissingInput { .. })), "{:?} should be missing input", raw);
        }
    }

    #[test]
    fn rejects_malformed_shapes() {
        for raw in [
            "not-an-email",
            "a@b",
            "@b.com",
            "a@.com",
            "a@b.",
            "a b@c.com",
            "a@b@c.com",
            "a@b .com",
        ] {
            assert!(
                matches!(normalize_email(Some(raw)), Err(EarlyAccessError::InvalidFormat { .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn accepts_common_addresses() {
        for raw in ["a@b.co", "first.last+tag@sub.example.org", "老师@学校.中国"] {
            assert!(normalize_email(Some(raw)).is_ok(), "{raw} should be accepted");
        }
    }

    proptest! {
        #[test]
        fn whitespace_only_is_missing(raw in r"\s*") {
            prop_assert!(matches!(normalize_email(Some(&raw)), Err(EarlyAccessError::MissingInput { .. })), "{:?} should be missing input", raw);
        }

        #[test]
        fn text_without_at_is_invalid(raw in r"[^@\s]{1,40}") {
            prop_assert!(matches!(normalize_email(Some(&raw)), Err(EarlyAccessError::InvalidFormat { .. })), "{:?} should be rejected", raw);
        }

        #[test]
        fn well_formed_parts_are_accepted(
            local in r"[a-zA-Z0-9._+-]{1,16}",
            host in r"[a-z0-9-]{1,16}",
            tld in r"[a-z]{2,6}",
        ) {
            let email = format!("{local}@{host}.{tld}");
            prop_assert_eq!(normalize_email(Some(&email)).unwrap(), email.as_str());
        }

        #[test]
        fn surrounding_whitespace_is_ignored(pad in r"[ \t]{0,4}") {
            let raw = format!("{pad}user@example.com{pad}");
            prop_assert_eq!(normalize_email(Some(&raw)).unwrap(), "user@example.com");
        }
    }
}
