//! Placeholder canonicalization between substitution conventions.
//!
//! The repository stores values in the "object" convention (`%@`, `%1$@`).
//! Formats built on the "generic string" convention (`%s`, `%1$s`) convert
//! on the way out with [`to_generic`] and on the way in with [`to_object`].
//! Both directions are pure and idempotent.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

// printf-style middle: flags, width, precision, length modifier.
const FLAGS_WIDTH_PRECISION_LENGTH: &str =
    r"(?:[-+ 0#])?(?:\d+|\*)?(?:\.(?:\d+|\*))?(?:hh?|ll?|L|z|j|t|q)?";

lazy_static! {
    static ref OBJECT_TOKEN: Regex = Regex::new(&format!(
        r"%%|%((?:\d+\$)?{FLAGS_WIDTH_PRECISION_LENGTH})@"
    ))
    .unwrap();
    static ref GENERIC_TOKEN: Regex = Regex::new(&format!(
        r"%%|%((?:\d+\$)?{FLAGS_WIDTH_PRECISION_LENGTH})s"
    ))
    .unwrap();
    static ref ANY_TOKEN: Regex = Regex::new(&format!(
        r"%%|%((\d+\$)?({FLAGS_WIDTH_PRECISION_LENGTH})([diufFeEgGxXoscpaA]))"
    ))
    .unwrap();
}

/// Converts object-style placeholders to the generic string convention.
///
/// `%@` becomes `%s` (and `%1$@` becomes `%1$s`). When the result holds more
/// than one substitution token and none of them carries a positional index,
/// indices `1$`, `2$`, … are synthesized in occurrence order so translators
/// can reorder safely. A string where any token already carries an index is
/// left alone by the numbering step; partial numbering is never repaired.
/// A value beginning with a bare `@ ` gets the `@` escaped.
pub fn to_generic(input: &str) -> String {
    let mut value = OBJECT_TOKEN
        .replace_all(input, |caps: &Captures| match caps.get(1) {
            Some(prefix) => format!("%{}s", prefix.as_str()),
            None => "%%".to_string(),
        })
        .into_owned();

    if value.starts_with("@ ") {
        value.insert(0, '\\');
    }

    number_unindexed_tokens(&value)
}

/// Converts generic-style placeholders back to the object convention.
/// `%s` becomes `%@` (and `%1$s` becomes `%1$@`); `%%` is never touched.
pub fn to_object(input: &str) -> String {
    GENERIC_TOKEN
        .replace_all(input, |caps: &Captures| match caps.get(1) {
            Some(prefix) => format!("%{}@", prefix.as_str()),
            None => "%%".to_string(),
        })
        .into_owned()
}

fn number_unindexed_tokens(value: &str) -> String {
    let mut token_count = 0usize;
    let mut any_indexed = false;
    for caps in ANY_TOKEN.captures_iter(value) {
        if caps.get(1).is_some() {
            token_count += 1;
            if caps.get(2).is_some() {
                any_indexed = true;
            }
        }
    }

    if token_count < 2 || any_indexed {
        return value.to_string();
    }

    let mut index = 0usize;
    ANY_TOKEN
        .replace_all(value, |caps: &Captures| {
            if caps.get(1).is_none() {
                return "%%".to_string();
            }
            index += 1;
            format!("%{}${}{}", index, &caps[3], &caps[4])
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_object_token_converts_without_index() {
        assert_eq!(to_generic("Hello %@!"), "Hello %s!");
    }

    #[test]
    fn test_two_unindexed_tokens_get_numbered() {
        assert_eq!(to_generic("%@ sent %@"), "%1$s sent %2$s");
    }

    #[test]
    fn test_mixed_types_get_numbered_together() {
        assert_eq!(to_generic("%d apples from %@"), "%1$d apples from %2$s");
    }

    #[test]
    fn test_indexed_tokens_pass_through_numbering() {
        assert_eq!(to_generic("%1$@ and %2$@"), "%1$s and %2$s");
        // Partial numbering is never repaired.
        assert_eq!(to_generic("%1$@ and %@"), "%1$s and %s");
    }

    #[test]
    fn test_escaped_percent_is_not_a_token() {
        assert_eq!(to_generic("100%% of %@"), "100%% of %s");
        assert_eq!(to_generic("50%% off %@ and %@"), "50%% off %1$s and %2$s");
        assert_eq!(to_object("100%% of %s"), "100%% of %@");
    }

    #[test]
    fn test_leading_object_marker_is_escaped() {
        assert_eq!(to_generic("@ mention"), "\\@ mention");
        assert_eq!(to_generic("@mention"), "@mention");
    }

    #[test]
    fn test_width_and_flags_survive() {
        assert_eq!(to_generic("%-10@"), "%-10s");
        assert_eq!(to_object("%-10s"), "%-10@");
        assert_eq!(to_object("%05.2f %s"), "%05.2f %@");
    }

    #[test]
    fn test_to_object_positional() {
        assert_eq!(to_object("%1$s sent %2$s"), "%1$@ sent %2$@");
        assert_eq!(to_object("no placeholders"), "no placeholders");
    }

    #[test]
    fn test_to_generic_is_idempotent() {
        for input in [
            "Hello %@!",
            "%@ sent %@",
            "%d apples from %@",
            "100%% of %@",
            "@ mention",
            "plain text",
        ] {
            let once = to_generic(input);
            assert_eq!(to_generic(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_to_object_is_idempotent() {
        for input in ["%1$s sent %2$s", "%s", "100%% and %s", "plain"] {
            let once = to_object(input);
            assert_eq!(to_object(&once), once, "not idempotent for {input:?}");
        }
    }
}
