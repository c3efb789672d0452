//! Randomized property tests: accuracy bounds, monotonicity, merge
//! commutativity/associativity, and repeated encode/merge equivalence.
//! Seeded explicitly so failures reproduce.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Sketch;

fn random_bytes(rng: &mut StdRng) -> [u8; 16] {
    let mut buf = [0u8; 16];
    rng.fill(&mut buf);
    buf
}

#[test]
fn empirical_relative_error_stays_within_a_generous_multiple_of_the_expected_stddev() {
    let p = 10u32;
    let m = 1u32 << p;
    let expected_stddev = 1.04 / (m as f64).sqrt();
    let n = 20_000usize;

    let trials = 12;
    let mut errors = Vec::with_capacity(trials);

    for trial in 0..trials {
        let mut rng = StdRng::seed_from_u64(trial as u64);
        let mut s = Sketch::new(p, trial as u32, false, None).unwrap();
        for _ in 0..n {
            s.add(&random_bytes(&mut rng));
        }
        let est = s.cardinality();
        errors.push((est - n as f64) / n as f64);
    }

    let mean = errors.iter().sum::<f64>() / errors.len() as f64;
    let variance = errors.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / errors.len() as f64;
    let observed_stddev = variance.sqrt();

    assert!(
        observed_stddev < 5.0 * expected_stddev,
        "observed stddev {observed_stddev} exceeds 5x expected {expected_stddev}"
    );
}

#[test]
fn scenario_insert_ten_thousand_distinct_strings_at_low_precision() {
    let mut s = Sketch::new(5, 0, false, None).unwrap();
    for i in 0..10_000u64 {
        s.add(i.to_string().as_bytes());
    }
    let est = s.cardinality();
    let rel_err = (est - 10_000.0).abs() / 10_000.0;
    assert!(rel_err < 0.20, "relative error {rel_err} exceeds 20%");
}

#[test]
fn scenario_merge_of_mostly_overlapping_sets_is_close_to_the_union_size() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut a = Sketch::new(8, 42, false, None).unwrap();
    let mut b = Sketch::new(8, 42, false, None).unwrap();

    let mut shared = Vec::new();
    for _ in 0..500 {
        let v = random_bytes(&mut rng);
        shared.push(v);
    }
    for v in &shared {
        a.add(v);
        b.add(v);
    }
    for _ in 0..500 {
        a.add(&random_bytes(&mut rng));
    }
    for _ in 0..500 {
        b.add(&random_bytes(&mut rng));
    }

    a.merge(&b).unwrap();
    let est = a.cardinality();
    let rel_err = (est - 1500.0).abs() / 1500.0;
    assert!(rel_err < 0.10, "relative error {rel_err} exceeds 10%");
}

#[test]
fn merge_is_commutative_and_associative_on_cardinality() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut a = Sketch::new(9, 1, false, None).unwrap();
    let mut b = Sketch::new(9, 1, false, None).unwrap();
    let mut c = Sketch::new(9, 1, false, None).unwrap();

    for _ in 0..400 {
        a.add(&random_bytes(&mut rng));
        b.add(&random_bytes(&mut rng));
        c.add(&random_bytes(&mut rng));
    }

    let mut ab = a.clone();
    ab.merge(&b).unwrap();
    let mut ba = b.clone();
    ba.merge(&a).unwrap();
    assert_eq!(ab.cardinality(), ba.cardinality());

    let mut ab_c = ab.clone();
    ab_c.merge(&c).unwrap();

    let mut bc = b.clone();
    bc.merge(&c).unwrap();
    let mut a_bc = a.clone();
    a_bc.merge(&bc).unwrap();

    assert_eq!(ab_c.cardinality(), a_bc.cardinality());
    for i in 0..ab_c.size() as u32 {
        assert_eq!(
            ab_c.get_register(i).unwrap(),
            a_bc.get_register(i).unwrap()
        );
    }
}

#[test]
fn repeated_encode_decode_merge_matches_direct_insertion() {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut control = Sketch::new(8, 3, false, None).unwrap();
    let mut aggregator = Sketch::new(8, 3, false, None).unwrap();

    for _ in 0..64 {
        let mut piece = Sketch::new(8, 3, false, None).unwrap();
        let mut values = Vec::new();
        for _ in 0..20 {
            values.push(random_bytes(&mut rng));
        }
        for v in &values {
            piece.add(v);
            control.add(v);
        }

        let bytes = piece.encode();
        let restored = Sketch::decode(&bytes).unwrap();
        aggregator.merge(&restored).unwrap();
    }

    assert_eq!(aggregator.cardinality(), control.cardinality());
}

#[test]
fn registers_never_decrease_across_an_insert_sequence() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut s = Sketch::new(6, 0, false, None).unwrap();
    let mut last = vec![0u8; s.size()];

    for _ in 0..2000 {
        s.add(&random_bytes(&mut rng));
        for (i, prev) in last.iter_mut().enumerate() {
            let current = s.get_register(i as u32).unwrap();
            assert!(current >= *prev, "register {i} decreased");
            *prev = current;
        }
    }
}
