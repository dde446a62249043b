//! Identifier sanitizer.
//!
//! Raw sample keys can be anything: spaces, symbols, scripts other than latin.
//! Schema identifiers end up inside dotted property paths, so they are folded
//! down to `[A-Za-z0-9_]`. Non-ASCII text is first punycoded so that distinct
//! non-latin keys stay distinct after folding.

use crate::schema::{ARRAY_ITEM_KEY, ROOT_SCHEMA_KEY};

const PUNYCODE_PREFIX: &str = "xn--";
const BASE: u32 = 36;
const T_MIN: u32 = 1;
const T_MAX: u32 = 26;
const SKEW: u32 = 38;
const DAMP: u32 = 700;
const INITIAL_BIAS: u32 = 72;
const INITIAL_N: u32 = 128;

/// Converts `key` into an identifier that is unique among `existing`.
///
/// Collisions get a numeric suffix appended directly (`__`, `__1`, `__2`).
/// The reserved synthetic keys are always treated as taken. Running the
/// result through again with itself excluded from `existing` returns it
/// unchanged.
pub fn sanitize_key<S: AsRef<str>>(key: &str, existing: &[S]) -> String {
    let base = fold_identifier(&to_ascii(key));
    let taken = |candidate: &str| {
        is_reserved(candidate) || existing.iter().any(|e| e.as_ref() == candidate)
    };
    if !taken(&base) {
        return base;
    }
    let mut suffix = 1usize;
    loop {
        let candidate = format!("{base}{suffix}");
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Whether `identifier` is one of the reserved synthetic keys.
pub fn is_reserved(identifier: &str) -> bool {
    identifier == ARRAY_ITEM_KEY || identifier == ROOT_SCHEMA_KEY
}

fn fold_identifier(ascii: &str) -> String {
    let folded: String = ascii
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' => c,
            _ => '_',
        })
        .collect();
    if folded.is_empty() {
        "_".to_string()
    } else {
        folded
    }
}

/// Punycodes every dot-separated label that carries non-ASCII characters.
pub fn to_ascii(value: &str) -> String {
    value
        .split('.')
        .map(|label| {
            if label.is_ascii() {
                label.to_string()
            } else {
                format!("{PUNYCODE_PREFIX}{}", punycode_encode(label))
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn adapt(delta: u32, num_points: u32, first_time: bool) -> u32 {
    let mut delta = if first_time { delta / DAMP } else { delta / 2 };
    delta += delta / num_points;
    let mut k = 0;
    while delta > ((BASE - T_MIN) * T_MAX) / 2 {
        delta /= BASE - T_MIN;
        k += BASE;
    }
    k + (BASE - T_MIN + 1) * delta / (delta + SKEW)
}

fn encode_digit(digit: u32) -> char {
    let byte = if digit < 26 {
        b'a' + digit as u8
    } else {
        b'0' + (digit - 26) as u8
    };
    byte as char
}

/// RFC 3492 encoding of a single label, without the `xn--` prefix.
fn punycode_encode(label: &str) -> String {
    let code_points: Vec<u32> = label.chars().map(u32::from).collect();
    let mut output: String = label.chars().filter(char::is_ascii).collect();
    let basic_len = output.len() as u32;
    let mut handled = basic_len;
    if basic_len > 0 {
        output.push('-');
    }

    let mut n = INITIAL_N;
    let mut delta: u32 = 0;
    let mut bias = INITIAL_BIAS;
    let total = code_points.len() as u32;

    while handled < total {
        let Some(next) = code_points.iter().copied().filter(|&c| c >= n).min() else {
            break;
        };
        delta = delta.saturating_add((next - n).saturating_mul(handled + 1));
        n = next;

        for &c in &code_points {
            if c < n {
                delta = delta.saturating_add(1);
            }
            if c == n {
                let mut q = delta;
                let mut k = BASE;
                loop {
                    let t = if k <= bias {
                        T_MIN
                    } else if k >= bias + T_MAX {
                        T_MAX
                    } else {
                        k - bias
                    };
                    if q < t {
                        break;
                    }
                    output.push(encode_digit(t + (q - t) % (BASE - t)));
                    q = (q - t) / (BASE - t);
                    k += BASE;
                }
                output.push(encode_digit(q));
                bias = adapt(delta, handled + 1, handled == basic_len);
                delta = 0;
                handled += 1;
            }
        }
        delta = delta.saturating_add(1);
        n += 1;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_are_untouched() {
        let none: &[&str] = &[];
        assert_eq!(sanitize_key("firstName", none), "firstName");
        assert_eq!(sanitize_key("Line1", none), "Line1");
        assert_eq!(sanitize_key("snake_case", none), "snake_case");
    }

    #[test]
    fn symbols_are_replaced_one_for_one() {
        let none: &[&str] = &[];
        assert_eq!(sanitize_key("##", none), "__");
        assert_eq!(sanitize_key("first name", none), "first_name");
        assert_eq!(sanitize_key("a-b/c", none), "a_b_c");
        assert_eq!(sanitize_key("", none), "_");
    }

    #[test]
    fn collisions_get_numeric_suffixes() {
        let mut existing: Vec<String> = Vec::new();
        for key in ["##", "%%", "##"] {
            let identifier = sanitize_key(key, &existing);
            existing.push(identifier);
        }
        assert_eq!(existing, vec!["__", "__1", "__2"]);
    }

    #[test]
    fn non_ascii_keys_are_punycoded() {
        let none: &[&str] = &[];
        assert_eq!(to_ascii("हिन्दि"), "xn--j2bd4cyac6f");
        assert_eq!(to_ascii("münchen"), "xn--mnchen-3ya");
        assert_eq!(sanitize_key("हिन्दि", none), "xn__j2bd4cyac6f");
    }

    #[test]
    fn sanitizing_a_sanitized_key_is_stable() {
        let existing = ["name", "__", "__1"];
        let again = sanitize_key("__1", &existing[..2]);
        assert_eq!(again, "__1");
    }

    #[test]
    fn reserved_keys_never_collide_with_user_keys() {
        let none: &[&str] = &[];
        assert!(is_reserved(ARRAY_ITEM_KEY));
        assert!(!is_reserved("__"));
        assert_eq!(sanitize_key("__array_item__", none), "__array_item__1");
        assert_eq!(sanitize_key("__root_schema__", none), "__root_schema__1");
    }
}
