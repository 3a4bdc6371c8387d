//! Integration tests: detection pipeline properties

use metricsense::data::MetricPoint;
use metricsense::detector::{detect, DetectorConfig};

fn point(ts: &str, cpu: f64, ram: f64, disk: f64, latency_ms: f64) -> MetricPoint {
    MetricPoint {
        ts: ts.to_string(),
        cpu,
        ram,
        disk,
        latency_ms,
    }
}

/// 240 points: 230 near baseline plus 10 latency spikes at scattered
/// positions. Deterministic by construction (no rng needed).
fn scenario_batch() -> (Vec<MetricPoint>, Vec<String>) {
    let spike_positions = [23, 47, 71, 95, 119, 143, 167, 191, 215, 232];
    let mut points = Vec::with_capacity(240);
    let mut spike_ts = Vec::new();

    for i in 0..240 {
        let ts = format!("2026-02-01T{:02}:{:02}:00", i / 60, i % 60);
        if spike_positions.contains(&i) {
            spike_ts.push(ts.clone());
            points.push(point(
                &ts,
                25.0 + (i % 11) as f64,
                50.0 + (i % 10) as f64,
                15.0 + (i % 10) as f64,
                1500.0 + (i % 6) as f64 * 100.0,
            ));
        } else {
            points.push(point(
                &ts,
                25.0 + (i % 11) as f64,
                50.0 + (i % 10) as f64,
                15.0 + (i % 10) as f64,
                100.0 + (i % 40) as f64,
            ));
        }
    }
    (points, spike_ts)
}

#[test]
fn test_determinism_repeated_runs() {
    let (points, _) = scenario_batch();
    let config = DetectorConfig::default().with_seed(1234);

    let first = detect(&points, &config).unwrap();
    let second = detect(&points, &config).unwrap();

    for (a, b) in first.scored.iter().zip(second.scored.iter()) {
        assert_eq!(a.score, b.score);
        assert_eq!(a.is_anomaly, b.is_anomaly);
    }
    assert_eq!(first.anomalies, second.anomalies);
}

#[test]
fn test_determinism_independent_of_thread_count() {
    let (points, _) = scenario_batch();
    let config = DetectorConfig::default().with_seed(1234);

    let parallel = detect(&points, &config).unwrap();
    let sequential = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| detect(&points, &config).unwrap());

    for (a, b) in parallel.scored.iter().zip(sequential.scored.iter()) {
        assert_eq!(a.score, b.score);
        assert_eq!(a.is_anomaly, b.is_anomaly);
    }
}

#[test]
fn test_different_seeds_may_differ_but_stay_valid() {
    let (points, _) = scenario_batch();
    let a = detect(&points, &DetectorConfig::default().with_seed(1)).unwrap();
    let b = detect(&points, &DetectorConfig::default().with_seed(2)).unwrap();
    // flagged counts are identical regardless of seed
    assert_eq!(a.anomalies.len(), b.anomalies.len());
}

#[test]
fn test_contamination_cardinality() {
    for n in [1usize, 2, 7, 40, 99] {
        let points: Vec<MetricPoint> = (0..n)
            .map(|i| {
                point(
                    &format!("2026-02-01T00:00:{:02}", i % 60),
                    20.0 + (i % 13) as f64,
                    50.0 + (i % 7) as f64,
                    10.0 + (i % 5) as f64,
                    100.0 + (i % 17) as f64,
                )
            })
            .collect();
        for c in [0.01, 0.05, 0.10, 0.30] {
            let config = DetectorConfig::default().with_contamination(c);
            let detection = detect(&points, &config).unwrap();
            let expected = (n as f64 * c).round() as usize;
            let flagged = detection.scored.iter().filter(|p| p.is_anomaly).count();
            assert_eq!(flagged, expected, "n={n} c={c}");
            assert_eq!(detection.anomalies.len(), expected);
        }
    }
}

#[test]
fn test_flagged_set_is_top_scored() {
    let (points, _) = scenario_batch();
    let detection = detect(&points, &DetectorConfig::default()).unwrap();

    let min_flagged = detection
        .scored
        .iter()
        .filter(|p| p.is_anomaly)
        .map(|p| p.score)
        .fold(f64::INFINITY, f64::min);
    for p in detection.scored.iter().filter(|p| !p.is_anomaly) {
        assert!(p.score <= min_flagged);
    }
}

#[test]
fn test_explanation_shape() {
    let (points, _) = scenario_batch();
    let detection = detect(&points, &DetectorConfig::default()).unwrap();

    for record in &detection.anomalies {
        assert!(!record.fields.is_empty() && record.fields.len() <= 2);
        for f in &record.fields {
            assert!(["cpu", "ram", "disk", "latency_ms"].contains(&f.as_str()));
        }
        if record.fields.len() == 2 {
            assert_ne!(record.fields[0], record.fields[1]);
        }
    }
}

#[test]
fn test_degenerate_batch_tie_breaks_by_position() {
    let points: Vec<MetricPoint> = (0..20)
        .map(|i| point(&format!("2026-02-01T00:00:{i:02}"), 5.0, 5.0, 5.0, 5.0))
        .collect();
    let config = DetectorConfig::default().with_contamination(0.10);
    let detection = detect(&points, &config).unwrap();

    // all scores equal, so the earliest positions win the tie-break
    let scores: Vec<f64> = detection.scored.iter().map(|p| p.score).collect();
    assert!(scores.iter().all(|s| *s == scores[0]));

    let flagged: Vec<usize> = detection
        .scored
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_anomaly)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(flagged, vec![0, 1]);
}

#[test]
fn test_latency_spike_scenario() {
    let (points, spike_ts) = scenario_batch();
    let config = DetectorConfig::default().with_contamination(0.05);
    let detection = detect(&points, &config).unwrap();

    // round(240 * 0.05) = 12
    assert_eq!(detection.anomalies.len(), 12);

    let flagged_ts: Vec<&str> = detection.anomalies.iter().map(|a| a.ts.as_str()).collect();
    for ts in &spike_ts {
        assert!(flagged_ts.contains(&ts.as_str()), "spike {ts} not flagged");
    }

    // each injected spike names latency_ms as its top field
    for record in detection
        .anomalies
        .iter()
        .filter(|r| spike_ts.contains(&r.ts))
    {
        assert_eq!(record.fields[0], "latency_ms");
    }
}

#[test]
fn test_anomalies_sorted_by_score() {
    let (points, _) = scenario_batch();
    let detection = detect(&points, &DetectorConfig::default()).unwrap();
    for pair in detection.anomalies.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}
