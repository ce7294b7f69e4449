//! Tests for secret generation.

use std::collections::HashMap;

use bulls_cows::{RandomSecrets, SecretSource, generate};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_secrets_have_four_distinct_digits() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10_000 {
        let secret = generate(&mut rng);
        let digits = secret.digits();
        assert!(digits.iter().all(|&d| d <= 9));
        for i in 0..4 {
            for j in (i + 1)..4 {
                assert_ne!(digits[i], digits[j], "repeat in {secret}");
            }
        }
    }
}

#[test]
fn test_random_source_yields_valid_secrets() {
    let source = RandomSecrets;
    for _ in 0..100 {
        let secret = source.next_secret();
        assert_eq!(secret.to_string().len(), 4);
    }
}

#[test]
fn test_orderings_are_uniform_chi_square() {
    const CELLS: f64 = 5040.0;
    const PER_CELL: usize = 100;
    let draws = 5040 * PER_CELL;

    let mut rng = StdRng::seed_from_u64(0x1a2b);
    let mut counts: HashMap<[u8; 4], usize> = HashMap::new();
    for _ in 0..draws {
        *counts.entry(*generate(&mut rng).digits()).or_default() += 1;
    }
    assert_eq!(counts.len(), 5040, "every ordering should appear");

    let expected = PER_CELL as f64;
    let chi_square: f64 = counts
        .values()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum();

    // 5039 degrees of freedom: mean 5039, standard deviation about 100.
    let dof = CELLS - 1.0;
    let bound = dof + 6.0 * (2.0 * dof).sqrt();
    assert!(chi_square < bound, "chi-square {chi_square} exceeds {bound}");
}

#[test]
fn test_no_digit_position_bias() {
    let mut rng = StdRng::seed_from_u64(42);
    let draws = 100_000;
    let mut counts = [[0usize; 10]; 4];
    for _ in 0..draws {
        for (pos, &d) in generate(&mut rng).digits().iter().enumerate() {
            counts[pos][usize::from(d)] += 1;
        }
    }
    // Each digit should sit in each position about a tenth of the time.
    for per_pos in &counts {
        for &n in per_pos {
            let share = n as f64 / draws as f64;
            assert!((share - 0.1).abs() < 0.01, "share {share}");
        }
    }
}
