//! Moniker rules.
//!
//! A moniker is the public key of a camp and is written verbatim into URLs as
//! a path segment, so it is limited to the unreserved URL characters
//! (`A-Z a-z 0-9 . _ ~ -`) and may not be a dot segment. Comparison is
//! case-sensitive (`ATL2018` and `atl2018` are different camps).

use codecamp_core::ValidationErrors;

pub const MONIKER_FIELD: &str = "moniker";
pub const MAX_MONIKER_LEN: usize = 50;

fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '~' | '-')
}

/// Validate a moniker, recording failures under the `moniker` field.
pub fn validate_moniker(moniker: &str, errors: &mut ValidationErrors) {
    if moniker.is_empty() {
        errors.add(MONIKER_FIELD, "Moniker is required");
        return;
    }
    if moniker.chars().count() > MAX_MONIKER_LEN {
        errors.add(
            MONIKER_FIELD,
            format!("Moniker must be at most {MAX_MONIKER_LEN} characters"),
        );
    }
    if !moniker.chars().all(is_unreserved) {
        errors.add(
            MONIKER_FIELD,
            "Moniker may only contain letters, digits, '.', '_', '~' and '-'",
        );
    } else if moniker == "." || moniker == ".." {
        errors.add(MONIKER_FIELD, "Moniker must not be a dot segment");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn check(moniker: &str) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        validate_moniker(moniker, &mut errors);
        errors
    }

    #[test]
    fn empty_moniker_is_required() {
        let errors = check("");
        assert_eq!(errors.get(MONIKER_FIELD).unwrap(), ["Moniker is required"]);
    }

    #[test]
    fn rejects_characters_with_meaning_in_urls() {
        for bad in ["ATL 2019", "ATL/2019", "ATL2018?x", "ATL#1", "50%", "A\u{1}B", "Zürich"] {
            assert!(check(bad).get(MONIKER_FIELD).is_some(), "{bad:?}");
        }
    }

    #[test]
    fn rejects_dot_segments() {
        assert!(check(".").get(MONIKER_FIELD).is_some());
        assert!(check("..").get(MONIKER_FIELD).is_some());
        assert!(check("v1.1").is_empty());
    }

    proptest! {
        #[test]
        fn unreserved_monikers_are_valid(m in "[A-Za-z0-9_~-][A-Za-z0-9._~-]{0,49}") {
            prop_assert!(check(&m).is_empty());
        }

        #[test]
        fn monikers_with_whitespace_are_rejected(a in "[A-Z]{1,10}", b in "[0-9]{1,10}") {
            let m = format!("{a} {b}");
            prop_assert!(check(&m).get(MONIKER_FIELD).is_some());
        }
    }
}
