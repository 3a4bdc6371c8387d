//! Seeded synthetic metric generation
//!
//! Produces demo batches shaped like the real telemetry: gaussian baseline
//! signals for each feature plus a few injected cpu/disk/latency spikes.
//! Everything is driven by one `StdRng`, so a seed fully determines the
//! batch.

use chrono::{Duration, Utc};
use rand::prelude::*;

use crate::data::MetricPoint;

/// Sample a gaussian via Box-Muller from two uniform draws
fn gaussian(rng: &mut StdRng, mean: f64, std: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std * z
}

/// Generate `n` metric points spaced `interval_secs` apart, with spikes
/// injected into roughly 2% of them (at least 3).
pub fn make_sample_metrics(n: usize, interval_secs: i64, seed: u64) -> Vec<MetricPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Utc::now();

    let mut points: Vec<MetricPoint> = (0..n)
        .map(|i| {
            let ts = start + Duration::seconds(i as i64 * interval_secs);
            MetricPoint {
                ts: ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
                cpu: gaussian(&mut rng, 28.0, 6.0).clamp(1.0, 95.0),
                ram: gaussian(&mut rng, 58.0, 5.0).clamp(10.0, 95.0),
                disk: gaussian(&mut rng, 18.0, 4.0).clamp(1.0, 95.0),
                latency_ms: gaussian(&mut rng, 110.0, 12.0).clamp(20.0, 1500.0),
            }
        })
        .collect();

    let n_spikes = ((n as f64 * 0.02) as usize).max(3).min(n);
    let spike_at = rand::seq::index::sample(&mut rng, n, n_spikes);
    for idx in spike_at.iter() {
        let point = &mut points[idx];
        point.cpu = (point.cpu + gaussian(&mut rng, 35.0, 10.0)).clamp(1.0, 99.0);
        point.disk = (point.disk + gaussian(&mut rng, 30.0, 10.0)).clamp(1.0, 99.0);
        point.latency_ms = (point.latency_ms + gaussian(&mut rng, 500.0, 200.0)).clamp(20.0, 2000.0);
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_size_and_ranges() {
        let points = make_sample_metrics(120, 60, 42);
        assert_eq!(points.len(), 120);
        for p in &points {
            assert!(p.cpu >= 1.0 && p.cpu <= 99.0);
            assert!(p.ram >= 10.0 && p.ram <= 95.0);
            assert!(p.disk >= 1.0 && p.disk <= 99.0);
            assert!(p.latency_ms >= 20.0 && p.latency_ms <= 2000.0);
        }
    }

    #[test]
    fn test_same_seed_same_batch() {
        let a = make_sample_metrics(60, 30, 7);
        let b = make_sample_metrics(60, 30, 7);
        // timestamps depend on wall clock; the signal values do not
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert_eq!(pa.cpu, pb.cpu);
            assert_eq!(pa.ram, pb.ram);
            assert_eq!(pa.disk, pb.disk);
            assert_eq!(pa.latency_ms, pb.latency_ms);
        }
    }

    #[test]
    fn test_spikes_present() {
        let points = make_sample_metrics(200, 60, 3);
        let spiked = points.iter().filter(|p| p.latency_ms > 350.0).count();
        assert!(spiked >= 1);
    }
}
