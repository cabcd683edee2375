//! Property-based tests for the probectl lifecycle core
//!
//! Covers the suggestion engine, error classification precedence, telemetry
//! sanitisation and hashing, and exit-code resolution.
//!
//! ## Configuration
//!
//! - `PROPTEST_CASES`: Number of test cases per property (default: 64)
//! - `PROPTEST_MAX_SHRINK_ITERS`: Max shrinking iterations on failure (default: 1000)
//!
//! ```bash
//! PROPTEST_CASES=256 cargo test --test property_based_tests
//! ```

use proptest::prelude::*;
use std::env;

use probectl::{
    ApiError, ExitCode, Fault, MessageCatalog, ShutdownHandle, ShutdownSignal, classify,
    hash_org_id, levenshtein, sanitize_command, suggest,
};

const DEFAULT_PROPTEST_CASES: u32 = 64;
const DEFAULT_MAX_SHRINK_ITERS: u32 = 1000;

/// Creates a ProptestConfig that respects `PROPTEST_CASES` and
/// `PROPTEST_MAX_SHRINK_ITERS`.
fn proptest_config() -> ProptestConfig {
    let cases = env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_PROPTEST_CASES);

    let max_shrink_iters = env::var("PROPTEST_MAX_SHRINK_ITERS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_MAX_SHRINK_ITERS);

    ProptestConfig {
        cases,
        max_shrink_iters,
        ..ProptestConfig::default()
    }
}

fn arb_word() -> impl Strategy<Value = String> {
    "[a-zA-Z_]{0,12}"
}

fn arb_options() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z_]{1,10}", 1..8)
}

#[test]
fn prop_levenshtein_is_a_metric() {
    proptest!(proptest_config(), |(a in arb_word(), b in arb_word(), c in arb_word())| {
        prop_assert_eq!(levenshtein(&a, &a), 0);
        prop_assert_eq!(levenshtein(&a, &b), levenshtein(&b, &a));
        prop_assert!(levenshtein(&a, &c) <= levenshtein(&a, &b) + levenshtein(&b, &c));

        let longest = a.chars().count().max(b.chars().count());
        prop_assert!(levenshtein(&a, &b) <= longest);
    });
}

#[test]
fn prop_levenshtein_against_empty_is_length() {
    proptest!(proptest_config(), |(a in arb_word())| {
        prop_assert_eq!(levenshtein("", &a), a.chars().count());
    });
}

#[test]
fn prop_suggestion_is_a_near_non_exact_option() {
    proptest!(proptest_config(), |(input in arb_word(), options in arb_options(), max in 0usize..4)| {
        let effective_max = if max == 0 { 2 } else { max };

        if let Some(found) = suggest(&input, &options, max) {
            prop_assert!(options.contains(&found));
            prop_assert_ne!(found.to_lowercase(), input.to_lowercase());

            let distance = levenshtein(&input.to_lowercase(), &found.to_lowercase());
            prop_assert!(distance > 0 && distance <= effective_max);

            // Nothing strictly closer was passed over.
            for option in &options {
                let d = levenshtein(&input.to_lowercase(), &option.to_lowercase());
                prop_assert!(d == 0 || d >= distance);
            }
        }
    });
}

#[test]
fn prop_exact_match_never_suggests() {
    proptest!(proptest_config(), |(options in arb_options(), pick in any::<prop::sample::Index>())| {
        let chosen = pick.get(&options).to_uppercase();
        prop_assert_eq!(suggest(&chosen, &options, 2), None);
    });
}

#[test]
fn prop_sanitized_command_has_no_flags_or_paths() {
    proptest!(proptest_config(), |(text in "[ a-z/=-]{0,40}")| {
        let sanitized = sanitize_command(&text);

        prop_assert!(!sanitized.is_empty());
        prop_assert!(!sanitized.contains("  "));
        for token in sanitized.split(' ') {
            prop_assert!(!token.starts_with('-'));
            prop_assert!(!token.starts_with('/'));
        }
        prop_assert_eq!(sanitize_command(&sanitized), sanitized.clone());
    });
}

#[test]
fn prop_org_hash_is_short_and_stable() {
    proptest!(proptest_config(), |(org in "[a-zA-Z0-9_-]{1,40}")| {
        let hash = hash_org_id(&org);
        prop_assert_eq!(hash.len(), 16);
        prop_assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        prop_assert_eq!(hash_org_id(&org), hash);
    });
}

#[test]
fn prop_plan_limit_beats_forbidden() {
    let codes = prop_oneof![Just("plan_limit_exceeded"), Just("plan_limit_reached")];
    proptest!(proptest_config(), |(code in codes, message in "[a-z ]{0,30}")| {
        let fault = Fault::from(ApiError::new(403, code, message));
        let classified = classify(&fault, &MessageCatalog::default());
        prop_assert_eq!(classified.exit_code, ExitCode::PLAN_LIMIT);
    });
}

#[test]
fn prop_classification_never_yields_signal_codes() {
    proptest!(proptest_config(), |(text in ".{0,80}", status in 100u16..600)| {
        let catalog = MessageCatalog::default();

        let opaque = classify(&Fault::opaque(text.clone()), &catalog);
        prop_assert!(!opaque.exit_code.is_signal());

        let api = classify(&Fault::from(ApiError::new(status, "", text)), &catalog);
        prop_assert!(!api.exit_code.is_signal());
    });
}

#[test]
fn prop_resolve_without_signal_is_identity() {
    proptest!(proptest_config(), |(raw in 0i32..256)| {
        let (_token, handle) = ShutdownHandle::new();
        let candidate = ExitCode::from_i32(raw);
        prop_assert_eq!(handle.resolve_exit_code(candidate), candidate);

        handle.notify(ShutdownSignal::Interrupt);
        prop_assert_eq!(handle.resolve_exit_code(candidate), ExitCode::INTERRUPTED);
    });
}
