//! The transmission sampler: per positive case, one draw for how many
//! people the case contacts per day and one for how many days it stays an
//! undetected carrier.

use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// One simulation step's random draws, one pair per positive case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmissionSamples {
    spread_counts: Vec<u32>,
    carrier_days: Vec<u32>,
}

impl TransmissionSamples {
    /// Draw `positive_cases` pairs, each component uniform over its
    /// inclusive `[0, max]` range.
    pub fn draw(
        rng: &mut impl Rng,
        max_spread_count: u32,
        max_days_as_carrier: u32,
        positive_cases: u64,
    ) -> Self {
        let spread = Uniform::new_inclusive(0, max_spread_count).unwrap();
        let days = Uniform::new_inclusive(0, max_days_as_carrier).unwrap();
        let spread_counts = (0..positive_cases).map(|_| spread.sample(rng)).collect();
        let carrier_days = (0..positive_cases).map(|_| days.sample(rng)).collect();
        Self {
            spread_counts,
            carrier_days,
        }
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(u32, u32)]) -> Self {
        Self {
            spread_counts: pairs.iter().map(|&(s, _)| s).collect(),
            carrier_days: pairs.iter().map(|&(_, d)| d).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.spread_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spread_counts.is_empty()
    }

    /// Total onward contacts across the sample set: each case contacts
    /// spread-count people per day for as long as it carries, so map each
    /// pair to its product and fold with addition.
    pub fn total_contacts(&self) -> u64 {
        self.spread_counts
            .iter()
            .zip(&self.carrier_days)
            .map(|(&spread, &days)| u64::from(spread) * u64::from(days))
            .sum()
    }

    #[cfg(test)]
    fn spread_counts(&self) -> &[u32] {
        &self.spread_counts
    }

    #[cfg(test)]
    fn carrier_days(&self) -> &[u32] {
        &self.carrier_days
    }
}

/// Simulated count of new positive cases entering the next month: the total
/// onward contacts weighted by the current month's probability of testing
/// positive, truncated toward zero.
pub fn simulate_transmitted(samples: &TransmissionSamples, probability: f64) -> u64 {
    (samples.total_contacts() as f64 * probability) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_draw_sizes_and_bounds() {
        let mut rng = StdRng::seed_from_u64(17);
        let samples = TransmissionSamples::draw(&mut rng, 3, 7, 500);
        assert_eq!(samples.len(), 500);
        assert!(samples.spread_counts().iter().all(|&s| s <= 3));
        assert!(samples.carrier_days().iter().all(|&d| d <= 7));
    }

    #[test]
    fn test_draw_is_deterministic_for_a_seed() {
        let mut a = StdRng::seed_from_u64(8675309);
        let mut b = StdRng::seed_from_u64(8675309);
        assert_eq!(
            TransmissionSamples::draw(&mut a, 3, 7, 100),
            TransmissionSamples::draw(&mut b, 3, 7, 100)
        );
    }

    #[test]
    fn test_inclusive_upper_bound_is_reached() {
        let mut rng = StdRng::seed_from_u64(1);
        let samples = TransmissionSamples::draw(&mut rng, 1, 1, 2000);
        assert!(samples.spread_counts().contains(&1));
        assert!(samples.carrier_days().contains(&1));
    }

    #[test]
    fn test_zero_positive_cases_simulates_zero() {
        let mut rng = StdRng::seed_from_u64(99);
        let samples = TransmissionSamples::draw(&mut rng, 3, 7, 0);
        assert!(samples.is_empty());
        assert_eq!(simulate_transmitted(&samples, 1.0), 0);
        assert_eq!(simulate_transmitted(&samples, 16.71), 0);
    }

    #[test]
    fn test_simulate_transmitted_aggregates_products() {
        let samples = TransmissionSamples::from_pairs(&[(1, 1), (2, 1), (3, 3)]);
        assert_eq!(samples.total_contacts(), 12);
        assert_eq!(simulate_transmitted(&samples, 1.0), 12);
    }

    #[test]
    fn test_simulate_transmitted_truncates_toward_zero() {
        // 9 + 0 + 100 = 109 contacts; 109 * 0.5 = 54.5 -> 54
        let samples = TransmissionSamples::from_pairs(&[(3, 3), (4, 0), (10, 10)]);
        assert_eq!(simulate_transmitted(&samples, 0.5), 54);
    }

    #[test]
    fn test_simulate_transmitted_monotone_in_probability() {
        let samples = TransmissionSamples::from_pairs(&[(3, 3), (4, 0), (10, 10), (2, 5)]);
        let mut previous = 0;
        for step in 0..=20 {
            let result = simulate_transmitted(&samples, f64::from(step) * 0.05);
            assert!(result >= previous);
            previous = result;
        }
    }
}
