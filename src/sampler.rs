// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Softmax-weighted session sampling.
//!
//! Each card gets the weight `exp(frequency_factor / temperature)`. Weights
//! are computed relative to the largest factor in the pool, which leaves the
//! probabilities unchanged but keeps `exp` finite at low temperatures.

use rand::Rng;

/// Temperatures below this floor are raised to it before use.
pub const MIN_TEMPERATURE: f64 = 0.01;

/// Anything that carries a frequency factor can be sampled.
pub trait Weighted {
    fn frequency_factor(&self) -> f64;
}

impl<T: Weighted> Weighted for &T {
    fn frequency_factor(&self) -> f64 {
        (**self).frequency_factor()
    }
}

fn effective_temperature(temperature: f64) -> f64 {
    if temperature.is_nan() {
        return MIN_TEMPERATURE;
    }
    temperature.max(MIN_TEMPERATURE)
}

/// Non-finite factors count as zero.
fn factor_of<T: Weighted>(item: &T) -> f64 {
    let factor = item.frequency_factor();
    if factor.is_finite() { factor } else { 0.0 }
}

/// Unnormalised sampling weights, one per item. The largest weight is 1.
pub fn weights<T: Weighted>(pool: &[T], temperature: f64) -> Vec<f64> {
    let t = effective_temperature(temperature);
    let max = pool
        .iter()
        .map(factor_of)
        .fold(f64::NEG_INFINITY, f64::max);
    pool.iter()
        .map(|item| ((factor_of(item) - max) / t).exp())
        .collect()
}

/// Selection probabilities, one per item, summing to 1. Empty for an empty
/// pool.
pub fn probabilities<T: Weighted>(pool: &[T], temperature: f64) -> Vec<f64> {
    let weights = weights(pool, temperature);
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Sample `size` distinct positions from `pool` without replacement. A size
/// of zero means the whole pool. Returns indices into `pool`, in draw order.
pub fn sample_without_replacement<T: Weighted, R: Rng>(
    pool: &[T],
    size: usize,
    temperature: f64,
    rng: &mut R,
) -> Vec<usize> {
    let size = if size == 0 {
        pool.len()
    } else {
        size.min(pool.len())
    };
    let mut remaining: Vec<usize> = (0..pool.len()).collect();
    let mut session = Vec::with_capacity(size);
    while session.len() < size {
        let candidates: Vec<&T> = remaining.iter().map(|&i| &pool[i]).collect();
        let probs = probabilities(&candidates, temperature);
        let dart: f64 = rng.random();
        session.push(remaining.remove(pick(&probs, dart)));
    }
    log::debug!(
        "Sampled a session of {} from a pool of {} at temperature {}.",
        session.len(),
        pool.len(),
        temperature
    );
    session
}

/// The first position whose cumulative probability reaches `dart`. Rounding
/// can leave the total just under the dart, in which case the last position
/// with a non-zero probability is taken.
fn pick(probs: &[f64], dart: f64) -> usize {
    let mut cumulative = 0.0;
    for (position, p) in probs.iter().enumerate() {
        cumulative += p;
        if *p > 0.0 && cumulative >= dart {
            return position;
        }
    }
    last_positive(probs)
}

fn last_positive(values: &[f64]) -> usize {
    values
        .iter()
        .rposition(|v| *v > 0.0)
        .unwrap_or(values.len().saturating_sub(1))
}

/// Build a batch session: `min(size, pool.len())` distinct cards, harder
/// cards tending to come first.
pub fn build_session<T: Weighted + Clone, R: Rng>(
    pool: &[T],
    size: usize,
    temperature: f64,
    rng: &mut R,
) -> Vec<T> {
    sample_without_replacement(pool, size, temperature, rng)
        .into_iter()
        .map(|i| pool[i].clone())
        .collect()
}

/// Draw one position using precomputed weights. `None` if there are no
/// weights.
pub fn draw_with_weights<R: Rng>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let total: f64 = weights.iter().sum();
    let mut dart = rng.random::<f64>() * total;
    for (i, w) in weights.iter().enumerate() {
        dart -= w;
        if *w > 0.0 && dart <= 0.0 {
            return Some(i);
        }
    }
    Some(last_positive(weights))
}

/// Draw one position from `pool` with replacement. `None` only if the pool is
/// empty.
pub fn draw_one<T: Weighted, R: Rng>(
    pool: &[T],
    temperature: f64,
    rng: &mut R,
) -> Option<usize> {
    draw_with_weights(&weights(pool, temperature), rng)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        name: usize,
        factor: f64,
    }

    impl Weighted for Item {
        fn frequency_factor(&self) -> f64 {
            self.factor
        }
    }

    fn pool(factors: &[f64]) -> Vec<Item> {
        factors
            .iter()
            .enumerate()
            .map(|(name, &factor)| Item { name, factor })
            .collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn test_pick_skips_zero_probabilities() {
        assert_eq!(pick(&[0.5, 0.5, 0.0], 0.3), 0);
        assert_eq!(pick(&[0.0, 0.5, 0.5], 0.0), 1);
        // A dart above the rounded total never lands on an underflowed card.
        assert_eq!(pick(&[0.5, 0.4999999, 0.0], 1.0), 1);
        assert_eq!(pick(&[1.0, 0.0, 0.0], 1.0 + 1e-9), 0);
    }

    #[test]
    fn test_draw_with_weights_skips_zero_weights() {
        let mut rng = rng();
        for _ in 0..100 {
            assert_eq!(draw_with_weights(&[0.0, 1.0, 0.0], &mut rng), Some(1));
        }
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let probs = probabilities(&pool(&[-9.0, 0.0, 3.0, 9.0]), 1.0);
        let total: f64 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(probs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_probabilities_match_softmax() {
        let probs = probabilities(&pool(&[0.0, 1.0]), 1.0);
        let e = 1.0_f64.exp();
        assert!((probs[1] - e / (1.0 + e)).abs() < 1e-12);
    }

    #[test]
    fn test_floor_temperature_is_finite() {
        for t in [0.0, -1.0, f64::NAN, 1e-9] {
            let probs = probabilities(&pool(&[9.0, -9.0, 0.0]), t);
            assert!(probs.iter().all(|p| p.is_finite()));
            assert!((probs[0] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_non_finite_factor_is_zero() {
        let probs = probabilities(&pool(&[f64::NAN, 0.0]), 1.0);
        assert!((probs[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_pool() {
        let empty: Vec<Item> = Vec::new();
        assert!(build_session(&empty, 5, 1.0, &mut rng()).is_empty());
        assert!(build_session(&empty, 0, 1.0, &mut rng()).is_empty());
        assert_eq!(draw_one(&empty, 1.0, &mut rng()), None);
        assert!(probabilities(&empty, 1.0).is_empty());
    }

    #[test]
    fn test_single_card() {
        let single = pool(&[0.0]);
        assert_eq!(build_session(&single, 1, 1.0, &mut rng()), single);
    }

    #[test]
    fn test_session_size_and_distinct() {
        let items = pool(&[0.0, 1.0, -1.0, 5.0, 2.0, -3.0, 0.0, 9.0]);
        let mut rng = rng();
        for size in 0..12 {
            let session = build_session(&items, size, 0.5, &mut rng);
            let expected = if size == 0 { items.len() } else { size.min(items.len()) };
            assert_eq!(session.len(), expected);
            let names: HashSet<usize> = session.iter().map(|i| i.name).collect();
            assert_eq!(names.len(), session.len());
            assert!(session.iter().all(|i| items.contains(i)));
        }
    }

    #[test]
    fn test_low_temperature_concentrates() {
        let items = pool(&[0.0, 9.0, 1.0, 2.0]);
        let mut rng = rng();
        for _ in 0..200 {
            let session = build_session(&items, 1, MIN_TEMPERATURE, &mut rng);
            assert_eq!(session[0].name, 1);
            assert_eq!(draw_one(&items, MIN_TEMPERATURE, &mut rng), Some(1));
        }
    }

    #[test]
    fn test_low_temperature_orders_full_session() {
        let items = pool(&[0.0, 9.0, 5.0, -4.0]);
        let session = sample_without_replacement(&items, 0, MIN_TEMPERATURE, &mut rng());
        assert_eq!(session, vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_high_temperature_is_near_uniform() {
        let items = pool(&[-9.0, 0.0, 9.0]);
        let mut rng = rng();
        let trials = 30_000;
        let mut first = [0usize; 3];
        let mut drawn = [0usize; 3];
        for _ in 0..trials {
            first[sample_without_replacement(&items, 1, 1e6, &mut rng)[0]] += 1;
            drawn[draw_one(&items, 1e6, &mut rng).unwrap()] += 1;
        }
        for counts in [first, drawn] {
            for count in counts {
                let share = count as f64 / trials as f64;
                assert!((share - 1.0 / 3.0).abs() < 0.03, "share {share}");
            }
        }
    }

    #[test]
    fn test_draw_frequency_follows_weights() {
        let items = pool(&[0.0, 2.0_f64.ln()]);
        let mut rng = rng();
        let trials = 30_000;
        let hits = (0..trials)
            .filter(|_| draw_one(&items, 1.0, &mut rng) == Some(1))
            .count();
        let share = hits as f64 / trials as f64;
        assert!((share - 2.0 / 3.0).abs() < 0.03, "share {share}");
    }

    #[test]
    fn test_draw_with_replacement_repeats() {
        let items = pool(&[0.0, 0.0]);
        let mut rng = rng();
        let draws: Vec<usize> = (0..50)
            .map(|_| draw_one(&items, 1.0, &mut rng).unwrap())
            .collect();
        let distinct: HashSet<usize> = draws.iter().copied().collect();
        assert_eq!(distinct.len(), 2);
        assert_eq!(draws.len(), 50);
    }

    #[test]
    fn test_works_on_references() {
        let items = pool(&[1.0, 2.0]);
        let refs: Vec<&Item> = items.iter().collect();
        let session = build_session(&refs, 2, 1.0, &mut rng());
        assert_eq!(session.len(), 2);
    }
}
