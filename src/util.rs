//! Common utility functions.
//!
//! Provides branch prediction hints used on the input hot path and the
//! environment readers used for startup overrides.

/// Marker function for cold code paths.
///
/// Used with branch prediction hints to inform the compiler about infrequently executed paths.
#[inline(always)]
#[cold]
pub fn cold() {}

/// Branch prediction hint for conditions expected to be false.
///
/// # Example
/// ```ignore
/// if unlikely(!send_events) {
///     return;
/// }
/// ```
#[inline(always)]
pub fn unlikely(b: bool) -> bool {
    if b {
        cold()
    }
    b
}

/// Branch prediction hint for conditions expected to be true.
#[inline(always)]
pub fn likely(b: bool) -> bool {
    if !b {
        cold()
    }
    b
}

/// Parses a boolean flag value.
///
/// Accepts `1`, `true`, `yes` and `on` (case insensitive) as set; `0`, `false`,
/// `no`, `off` and the empty string as unset. Anything else yields `None`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Reads a boolean flag from the environment.
///
/// Returns `default` when the variable is missing or not a recognised flag value.
pub fn read_env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

/// Reads an integer from the environment.
///
/// Returns `default` when the variable is missing or does not parse.
pub fn read_env_int(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_likely_unlikely() {
        assert!(likely(true));
        assert!(!likely(false));
        assert!(unlikely(true));
        assert!(!unlikely(false));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" on "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag(""), Some(false));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_read_env_missing_uses_default() {
        assert!(read_env_flag("INPUTSHIM_TEST_SURELY_UNSET_FLAG", true));
        assert!(!read_env_flag("INPUTSHIM_TEST_SURELY_UNSET_FLAG", false));
        assert_eq!(read_env_int("INPUTSHIM_TEST_SURELY_UNSET_INT", 42), 42);
    }
}
