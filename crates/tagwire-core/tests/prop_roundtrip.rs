/// Property-Based Roundtrip Tests for tagwire
///
/// Uses the `proptest` crate to generate random value trees and verify that
/// `decode(encode(v)) == v` holds for all generated inputs, in both field
/// modes, and that the flow-control settings never change the bytes produced.
///
/// Strategies generate:
/// - Random numbers (every f64 except NaN, which never equals itself)
/// - Random Unicode text, including field and tag characters
/// - Random mappings nested up to 4 levels deep
/// - "Compact-safe" trees whose every field is a single digit
///
/// Compact mode can only carry single-character fields, so arbitrary trees
/// are checked to either roundtrip or fail with `FieldOverflow`.
use std::future::Future;

use proptest::prelude::*;
use tagwire_core::{
    decode_from_slice, encode_to_vec, CodecConfig, CodecError, FieldMode, Mapping, Value,
};

fn block_on<F: Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime")
        .block_on(fut)
}

async fn roundtrip(value: &Value, config: &CodecConfig) -> tagwire_core::Result<Value> {
    let wire = encode_to_vec(value, config).await?;
    decode_from_slice(&wire, config).await
}

fn delimited() -> CodecConfig {
    CodecConfig::default().with_field_mode(FieldMode::Delimited)
}

// ============================================================================
// Strategies for generating values
// ============================================================================

/// Any f64 that compares equal to itself.
fn arb_number() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("NaN never equals itself", |n| !n.is_nan())
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        // Plain ASCII
        "[a-zA-Z0-9 ]{0,30}",
        // Characters that look like wire syntax
        "[NSO0-9;]{0,12}",
        // Arbitrary Unicode
        ".{0,20}",
        Just(String::new()),
    ]
}

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_][a-z0-9_]{0,10}",
        "[NSO;0-9]{1,4}",
        ".{0,6}",
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        arb_number().prop_map(Value::Number),
        arb_text().prop_map(Value::Text),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop::collection::vec((arb_key(), inner), 0..8)
            .prop_map(|pairs| Value::Mapping(pairs.into_iter().collect::<Mapping>()))
    })
}

/// Trees whose numbers, lengths and counts are all single digits.
fn arb_compact_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        (0u8..10).prop_map(|d| Value::Number(f64::from(d))),
        "[a-zA-Z0-9 ]{0,9}".prop_map(Value::Text),
    ];
    leaf.prop_recursive(4, 48, 9, |inner| {
        prop::collection::vec(("[a-z0-9]{0,9}", inner), 0..10)
            .prop_map(|pairs| Value::Mapping(pairs.into_iter().collect::<Mapping>()))
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn delimited_roundtrip(value in arb_value()) {
        let config = delimited();
        let back = block_on(roundtrip(&value, &config));
        prop_assert_eq!(back.ok(), Some(value));
    }

    #[test]
    fn compact_roundtrip_for_single_digit_fields(value in arb_compact_value()) {
        let config = CodecConfig::default();
        let back = block_on(roundtrip(&value, &config));
        prop_assert_eq!(back.ok(), Some(value));
    }

    #[test]
    fn compact_roundtrips_or_reports_overflow(value in arb_value()) {
        let config = CodecConfig::default();
        let res = block_on(roundtrip(&value, &config));
        match res {
            Ok(back) => prop_assert_eq!(back, value),
            Err(CodecError::FieldOverflow(_)) => {}
            Err(err) => prop_assert!(false, "unexpected error: {}", err),
        }
    }

    #[test]
    fn high_water_mark_does_not_change_bytes(value in arb_value(), hwm in 1usize..64) {
        let (small, large) = block_on(async {
            let small = encode_to_vec(&value, &delimited().with_high_water_mark(hwm)).await;
            let large = encode_to_vec(&value, &delimited()).await;
            (small.ok(), large.ok())
        });
        prop_assert!(large.is_some());
        prop_assert_eq!(small, large);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        for config in [CodecConfig::default(), delimited()] {
            let _ = block_on(decode_from_slice(&bytes, &config));
        }
    }

    #[test]
    fn wire_starting_with_foreign_tag_is_unknown_tag(
        tag in any::<u8>().prop_filter("not a tag", |b| !matches!(*b, b'N' | b'S' | b'O')),
        rest in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let mut bytes = vec![tag];
        bytes.extend(rest);
        let res = block_on(decode_from_slice(&bytes, &CodecConfig::default()));
        prop_assert!(matches!(res, Err(CodecError::UnknownTag(b)) if b == tag));
    }
}
