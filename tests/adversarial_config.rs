//! Adversarial Property-Based Tests for Configuration and Request Parsing
//!
//! # Attack Plan
//!
//! 1. **Port Number Attacks**: negative numbers, overflow, floats, scientific
//!    notation, whitespace.
//!
//! 2. **Offset Attacks**: named zones, missing sign, out-of-range hours,
//!    unicode digits.
//!
//! 3. **Query Attacks**: percent-encoding garbage, repeated keys, huge numbers,
//!    exponent notation, NaN/inf spellings.
//!
//! # Invariants
//!
//! - from_getter never panics on any input
//! - HOLIDAYS_URL missing returns Err
//! - a parsed offset is always within ±14:00
//! - parse_query never panics and never accepts negative or non-finite values

use proptest::prelude::*;
use std::collections::HashMap;

use workdays::config::{parse_utc_offset, Config, MAX_UTC_OFFSET_SECS};
use workdays::request::{parse_query, MAX_DAYS, MAX_HOURS};

// ============================================================================
// ADVERSARIAL GENERATORS
// ============================================================================

fn malformed_port() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("-1".to_string()),
        Just("65536".to_string()),
        Just("99999".to_string()),
        Just("4294967296".to_string()),
        Just("3000.5".to_string()),
        Just("3e3".to_string()),
        Just("".to_string()),
        Just("   ".to_string()),
        Just(" 3000".to_string()),
        Just("0x0BB8".to_string()),
        "[^0-9]{1,10}",
    ]
}

fn malformed_offset() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("America/Bogota".to_string()),
        Just("05:00".to_string()),
        Just("-5".to_string()),
        Just("-0500".to_string()),
        Just("-05:00:00".to_string()),
        Just("+24:00".to_string()),
        Just("+20:00".to_string()),
        Just("-14:30".to_string()),
        Just("-٠٥:٠٠".to_string()), // Arabic-Indic digits
        Just("+-5:00".to_string()),
        ".{0,12}",
    ]
}

fn hostile_number() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("-0".to_string()),
        Just("-1".to_string()),
        Just("NaN".to_string()),
        Just("inf".to_string()),
        Just("-inf".to_string()),
        Just("infinity".to_string()),
        Just("1e400".to_string()),
        Just("1e5".to_string()),
        Just("%2D1".to_string()), // percent-encoded minus
        Just("%ZZ".to_string()),
        Just("%FF%FE".to_string()),
        Just("18446744073709551616".to_string()),
        "[0-9.eE+-]{1,12}",
    ]
}

fn base_env() -> HashMap<&'static str, String> {
    let mut env = HashMap::new();
    env.insert("HOLIDAYS_URL", "https://example.com/holidays".to_string());
    env
}

// ============================================================================
// CONFIG
// ============================================================================

proptest! {
    #[test]
    fn malformed_port_never_panics(port in malformed_port()) {
        let mut env = base_env();
        env.insert("PORT", port.clone());
        let result = Config::from_getter(|key| env.get(key).cloned());
        if let Ok(config) = result {
            prop_assert_eq!(Ok(config.port), port.parse::<u16>());
        }
    }

    #[test]
    fn malformed_offset_rejected_or_in_range(offset in malformed_offset()) {
        if let Ok(parsed) = parse_utc_offset(&offset) {
            prop_assert!(parsed.local_minus_utc().abs() <= MAX_UTC_OFFSET_SECS);
        }
    }

    #[test]
    fn arbitrary_env_never_panics(
        url in proptest::option::of(".{0,40}"),
        port in proptest::option::of(".{0,10}"),
        timeout in proptest::option::of(".{0,10}"),
        offset in proptest::option::of(".{0,10}")
    ) {
        let mut env: HashMap<&str, String> = HashMap::new();
        if let Some(v) = url { env.insert("HOLIDAYS_URL", v); }
        if let Some(v) = port { env.insert("PORT", v); }
        if let Some(v) = timeout { env.insert("HOLIDAYS_TIMEOUT_SECS", v); }
        if let Some(v) = offset { env.insert("BUSINESS_UTC_OFFSET", v); }

        if let Ok(config) = Config::from_getter(|key| env.get(key).cloned()) {
            let _ = config.validate();
        }
    }

    #[test]
    fn missing_url_always_fails(port in 1u16..=65535u16) {
        let mut env: HashMap<&str, String> = HashMap::new();
        env.insert("PORT", port.to_string());
        prop_assert!(Config::from_getter(|key| env.get(key).cloned()).is_err());
    }
}

// ============================================================================
// QUERY
// ============================================================================

proptest! {
    #[test]
    fn hostile_numbers_never_accepted_out_of_range(days in hostile_number(), hours in hostile_number()) {
        let query = format!("days={}&hours={}", days, hours);
        if let Ok(request) = parse_query(&query) {
            prop_assert!(request.days <= MAX_DAYS);
            prop_assert!(request.hours.is_finite());
            prop_assert!(request.hours >= 0.0 && request.hours <= MAX_HOURS);
        }
    }

    #[test]
    fn repeated_keys_last_wins(first in 1u32..100, second in 1u32..100) {
        let request = parse_query(&format!("days={}&days={}", first, second)).unwrap();
        prop_assert_eq!(request.days, second);
    }

    #[test]
    fn garbage_query_never_panics(query in "[a-z=&%0-9.:TZ+-]{0,60}") {
        let _ = parse_query(&query);
    }
}
