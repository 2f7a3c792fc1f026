//! First-order removal of airborne mass
//!
//! Dry deposition spread through the mixed layer and chemical loss both
//! remove a fixed fraction of what is aloft per second, so after `t`
//! seconds of transport the surviving fraction is `exp(-k·t)` with
//! `k = vd / h_mix + λ`.

use crate::core_types::units::Seconds;

/// Fraction of mass surviving `elapsed` at `removal_rate` (1/s).
///
/// Always in `[0, 1]` for non-negative rates; 1 at `t = 0`.
///
/// # Arguments
/// * `removal_rate` - Combined removal rate k (1/s), see
///   [`SourceParams::removal_rate`](crate::core_types::SourceParams::removal_rate)
/// * `elapsed` - Time since release
#[must_use]
pub fn decay_factor(removal_rate: f64, elapsed: Seconds) -> f64 {
    let factor = (-removal_rate.max(0.0) * *elapsed.max(Seconds::new(0.0))).exp();
    if factor.is_finite() {
        factor.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Decay factor for each hour of a run, starting at `t = 0`
#[must_use]
pub fn hourly_decay_factors(removal_rate: f64, hours: usize) -> Vec<f64> {
    let mut elapsed = Seconds::new(0.0);
    (0..hours)
        .map(|_| {
            let factor = decay_factor(removal_rate, elapsed);
            elapsed = elapsed + Seconds::HOUR;
            factor
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn no_decay_at_release() {
        assert_eq!(decay_factor(1e-3, Seconds::new(0.0)), 1.0);
    }

    #[test]
    fn pm25_default_after_one_hour() {
        // vd = 0.002 m/s, h_mix = 500 m
        let k = 0.002 / 500.0;
        assert_relative_eq!(
            decay_factor(k, Seconds::HOUR),
            (-14.4_f64 / 1000.0).exp(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn never_amplifies() {
        let factors = hourly_decay_factors(3e-5, 168);
        assert_eq!(factors[0], 1.0);
        for pair in factors.windows(2) {
            assert!(pair[1] < pair[0]);
            assert!(pair[1] > 0.0);
        }
    }

    #[test]
    fn zero_rate_keeps_everything() {
        assert!(hourly_decay_factors(0.0, 24).iter().all(|&f| f == 1.0));
    }

    #[test]
    fn degenerate_inputs_stay_in_unit_interval() {
        assert_eq!(decay_factor(-1.0, Seconds::HOUR), 1.0);
        assert_eq!(decay_factor(f64::INFINITY, Seconds::HOUR), 0.0);
        assert_eq!(decay_factor(1.0, Seconds::new(-5.0)), 1.0);
    }
}
