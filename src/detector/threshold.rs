//! Contamination-driven threshold selection

use crate::error::{MetricsenseError, Result};

/// Lower bound for the contamination fraction
pub const CONTAMINATION_MIN: f64 = 0.01;
/// Upper bound for the contamination fraction
pub const CONTAMINATION_MAX: f64 = 0.30;

/// Reject contamination values outside [0.01, 0.30].
pub fn validate_contamination(contamination: f64) -> Result<()> {
    if !contamination.is_finite()
        || contamination < CONTAMINATION_MIN
        || contamination > CONTAMINATION_MAX
    {
        return Err(MetricsenseError::Range {
            name: "contamination".to_string(),
            value: contamination.to_string(),
            reason: format!("must be within [{CONTAMINATION_MIN}, {CONTAMINATION_MAX}]"),
        });
    }
    Ok(())
}

/// Flag the `round(n * contamination)` highest-scoring rows.
///
/// Ties are broken by earliest batch position so the flagged set is
/// deterministic even when scores collide (e.g. a batch of identical rows).
pub fn flag_anomalies(scores: &[f64], contamination: f64) -> Result<Vec<bool>> {
    validate_contamination(contamination)?;

    let n = scores.len();
    let k = ((n as f64 * contamination).round() as usize).min(n);

    let mut flags = vec![false; n];
    if k == 0 {
        return Ok(flags);
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    for &idx in order.iter().take(k) {
        flags[idx] = true;
    }
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contamination_bounds() {
        assert!(validate_contamination(0.01).is_ok());
        assert!(validate_contamination(0.30).is_ok());
        assert!(validate_contamination(0.05).is_ok());
        assert!(validate_contamination(0.009).is_err());
        assert!(validate_contamination(0.31).is_err());
        assert!(validate_contamination(f64::NAN).is_err());
    }

    #[test]
    fn test_exact_count() {
        let scores = vec![0.1, 0.9, 0.5, 0.3, 0.8, 0.2, 0.4, 0.6, 0.7, 0.15];
        let flags = flag_anomalies(&scores, 0.30).unwrap();
        assert_eq!(flags.iter().filter(|f| **f).count(), 3);
        assert!(flags[1] && flags[4] && flags[8]); // 0.9, 0.8, 0.7
    }

    #[test]
    fn test_rounds_to_zero() {
        let scores = vec![0.9, 0.1, 0.2];
        // round(3 * 0.10) = 0
        let flags = flag_anomalies(&scores, 0.10).unwrap();
        assert!(flags.iter().all(|f| !f));
    }

    #[test]
    fn test_tie_break_earliest_position() {
        let scores = vec![0.5; 8];
        let flags = flag_anomalies(&scores, 0.25).unwrap();
        assert_eq!(flags, vec![true, true, false, false, false, false, false, false]);
    }

    #[test]
    fn test_single_point_never_flagged_in_range() {
        // round(1 * c) = 0 for every allowed contamination
        let flags = flag_anomalies(&[0.99], 0.30).unwrap();
        assert_eq!(flags, vec![false]);
    }
}
