// File: src/builtins.rs
//
// Pure helper functions behind the Pika native library.
// These work on plain Rust types; the native-function modules unwrap
// runtime values, call into here and wrap the results back up.

use rand::Rng;

/// Math functions

pub fn pow(base: f64, exp: f64) -> f64 {
    base.powf(exp)
}

/// Generate a random integer between min and max (inclusive).
/// Returns None when the range is empty.
pub fn random_int(min: f64, max: f64) -> Option<f64> {
    let min_i = min.trunc() as i64;
    let max_i = max.trunc() as i64;
    if min_i > max_i {
        return None;
    }
    let mut rng = rand::thread_rng();
    Some(rng.gen_range(min_i..=max_i) as f64)
}

/// Parses the text of a number the way `num()` accepts it
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// String functions

pub fn str_len(s: &str) -> f64 {
    s.chars().count() as f64
}

pub fn to_upper(s: &str) -> String {
    s.to_uppercase()
}

pub fn to_lower(s: &str) -> String {
    s.to_lowercase()
}

/// Uppercases the first character, leaving the rest untouched
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn starts_with(s: &str, prefix: &str) -> bool {
    s.starts_with(prefix)
}

pub fn ends_with(s: &str, suffix: &str) -> bool {
    s.ends_with(suffix)
}

pub fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}

/// Character at a possibly negative index, counted from the end when negative
pub fn char_at(s: &str, index: i64) -> Option<String> {
    let len = s.chars().count() as i64;
    let idx = if index < 0 { len + index } else { index };
    if idx < 0 || idx >= len {
        return None;
    }
    s.chars().nth(idx as usize).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("pika"), "Pika");
        assert_eq!(capitalize("élan"), "Élan");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_reverse_handles_unicode() {
        assert_eq!(reverse("abc"), "cba");
        assert_eq!(reverse("añb"), "bña");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("-1.5"), Some(-1.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_random_int_stays_in_range() {
        for _ in 0..50 {
            let n = random_int(1.0, 3.0).unwrap();
            assert!((1.0..=3.0).contains(&n));
            assert_eq!(n.fract(), 0.0);
        }
        assert_eq!(random_int(5.0, 1.0), None);
    }

    #[test]
    fn test_char_at() {
        assert_eq!(char_at("abc", 0).as_deref(), Some("a"));
        assert_eq!(char_at("abc", -1).as_deref(), Some("c"));
        assert_eq!(char_at("abc", 3), None);
    }
}
