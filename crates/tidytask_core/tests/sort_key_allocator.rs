use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tidytask_core::{allocate_key, JitterRange, OrderKey, SortKeyConfig, SortKeyError};

fn key(raw: &str) -> OrderKey {
    raw.parse().unwrap()
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn config_with(max_key: i64, jitter_min: i64, jitter_max: i64) -> SortKeyConfig {
    SortKeyConfig::new(
        OrderKey::from(1),
        OrderKey::from(max_key),
        OrderKey::from(max_key / 2),
        JitterRange::new(Decimal::from(jitter_min), Decimal::from(jitter_max)).unwrap(),
    )
    .unwrap()
}

#[test]
fn no_neighbors_returns_default_key() {
    let config = SortKeyConfig::default();
    let result = allocate_key(None, None, &config, &mut rng()).unwrap();
    assert_eq!(result, config.default_key());
}

#[test]
fn both_neighbors_bisect_exactly() {
    let config = SortKeyConfig::default();
    let result = allocate_key(Some(key("100")), Some(key("200")), &config, &mut rng()).unwrap();
    assert_eq!(result, key("150"));

    let result = allocate_key(Some(key("1")), Some(key("2")), &config, &mut rng()).unwrap();
    assert_eq!(result.to_string(), "1.5");
}

#[test]
fn head_insert_with_small_headroom_halves() {
    let config = config_with(1000, 1, 5);
    let result = allocate_key(None, Some(key("10")), &config, &mut rng()).unwrap();
    assert_eq!(result, key("5"));
    let result = allocate_key(None, Some(key("4")), &config, &mut rng()).unwrap();
    assert_eq!(result, key("2"));
}

#[test]
fn head_insert_at_exact_ceiling_still_halves() {
    let config = config_with(1000, 1, 5);
    let result = allocate_key(None, Some(key("2000")), &config, &mut rng()).unwrap();
    assert_eq!(result, key("1000"));
}

#[test]
fn head_insert_with_large_headroom_subtracts_jitter() {
    let config = config_with(1000, 3, 9);
    let next = key("3000");
    let mut rng = rng();
    for _ in 0..100 {
        let result = allocate_key(None, Some(next), &config, &mut rng).unwrap();
        assert!(result < next);
        assert!(result >= key("2991") && result <= key("2997"), "{result}");
    }
}

#[test]
fn tail_insert_adds_jitter_within_range() {
    let config = config_with(1000, 1, 5);
    let mut rng = rng();
    for _ in 0..100 {
        let result = allocate_key(Some(key("50")), None, &config, &mut rng).unwrap();
        assert!(result >= key("51") && result <= key("55"), "{result}");
    }
}

#[test]
fn result_is_strictly_between_any_ordered_pair() {
    let config = SortKeyConfig::default();
    let pairs = [
        ("0", "1"),
        ("-10", "-9.5"),
        ("-3", "7"),
        ("1.0000001", "1.0000002"),
        ("10000000000", "10000000001"),
        ("0.1", "100000000000000"),
    ];
    for (top, next) in pairs {
        let (top, next) = (key(top), key(next));
        let result = allocate_key(Some(top), Some(next), &config, &mut rng()).unwrap();
        assert!(top < result && result < next, "{top} < {result} < {next}");
    }
}

#[test]
fn result_is_strictly_between_random_pairs_at_mixed_scales() {
    let config = SortKeyConfig::default();
    let mut source = StdRng::seed_from_u64(2024);
    let mut checked = 0;
    while checked < 2000 {
        let a = Decimal::new(
            source.gen_range(-1_000_000_000_000i64..=1_000_000_000_000),
            source.gen_range(0..=12),
        );
        let b = Decimal::new(
            source.gen_range(-1_000_000_000_000i64..=1_000_000_000_000),
            source.gen_range(0..=12),
        );
        if a == b {
            continue;
        }
        let (top, next) = (OrderKey::new(a.min(b)), OrderKey::new(a.max(b)));
        let result = allocate_key(Some(top), Some(next), &config, &mut rng()).unwrap();
        assert!(top < result && result < next, "{top} < {result} < {next}");
        checked += 1;
    }
}

#[test]
fn out_of_order_neighbors_are_rejected() {
    let config = SortKeyConfig::default();
    for (top, next) in [("5", "5"), ("6", "5")] {
        let err = allocate_key(Some(key(top)), Some(key(next)), &config, &mut rng()).unwrap_err();
        assert!(matches!(err, SortKeyError::NeighborsOutOfOrder { .. }));
    }
}

#[test]
fn repeated_bisection_into_one_gap_reports_exhaustion() {
    let config = SortKeyConfig::default();
    let top = key("1");
    let mut next = key("2");
    let mut outcome = None;
    for _ in 0..500 {
        match allocate_key(Some(top), Some(next), &config, &mut rng()) {
            Ok(result) => {
                assert!(top < result && result < next);
                next = result;
            }
            Err(err) => {
                outcome = Some(err);
                break;
            }
        }
    }
    assert!(matches!(
        outcome,
        Some(SortKeyError::PrecisionExhausted { .. })
    ));
}

#[test]
fn repeated_head_halving_never_produces_a_tie() {
    let config = config_with(1000, 1, 5);
    let mut next = key("10");
    for _ in 0..500 {
        match allocate_key(None, Some(next), &config, &mut rng()) {
            Ok(result) => {
                assert!(result < next, "{result} !< {next}");
                next = result;
            }
            Err(err) => {
                assert!(matches!(err, SortKeyError::PrecisionExhausted { .. }));
                break;
            }
        }
    }
}

#[test]
fn thousand_head_inserts_with_default_config_never_exhaust() {
    let config = SortKeyConfig::default();
    let mut rng = rng();
    let mut head = allocate_key(None, None, &config, &mut rng).unwrap();
    for _ in 0..1000 {
        let result = allocate_key(None, Some(head), &config, &mut rng).unwrap();
        assert!(result < head, "{result} !< {head}");
        head = result;
    }
    // Halving bottoms out at zero, after which jitter takes over.
    assert!(head < key("0"), "{head}");
}

#[test]
fn thousand_tail_inserts_stay_strictly_increasing() {
    let config = SortKeyConfig::default();
    let mut rng = rng();
    let mut tail = allocate_key(None, None, &config, &mut rng).unwrap();
    for _ in 0..1000 {
        let result = allocate_key(Some(tail), None, &config, &mut rng).unwrap();
        assert!(result > tail);
        tail = result;
    }
}

#[test]
fn seeded_sources_reproduce_identical_keys() {
    let config = SortKeyConfig::default();
    let mut first = StdRng::seed_from_u64(9);
    let mut second = StdRng::seed_from_u64(9);
    for _ in 0..20 {
        let a = allocate_key(Some(key("50")), None, &config, &mut first).unwrap();
        let b = allocate_key(Some(key("50")), None, &config, &mut second).unwrap();
        assert_eq!(a, b);
    }
}
