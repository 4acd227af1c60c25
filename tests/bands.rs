use latscope::{categorize, Sample, SampleAttrs, SeverityBand, DEFAULT_WARNING_LIMIT_MS};

fn sample(id: &str, ts_ms: i64, rt_ms: f64) -> Sample {
    Sample {
        id: id.to_owned(),
        timestamp_ms: ts_ms,
        response_time_ms: rt_ms,
        attrs: SampleAttrs::default(),
    }
}

#[test]
fn empty_window_has_empty_bands() {
    let bands = categorize(&[], DEFAULT_WARNING_LIMIT_MS);
    assert!(bands.is_empty());
    for band in SeverityBand::ALL {
        assert_eq!(bands.count(band), 0);
    }
}

#[test]
fn bands_partition_the_window() {
    let samples: Vec<Sample> = (0..50)
        .map(|i| sample(&format!("s{i}"), 1_000 + i, 30.0 * i as f64))
        .collect();
    let bands = categorize(&samples, 1200.0);

    let total: usize = SeverityBand::ALL.iter().map(|&b| bands.count(b)).sum();
    assert_eq!(total, samples.len(), "every sample lands in exactly one band");

    for (i, band) in bands.iter() {
        let rt = samples[i].response_time_ms;
        if band == SeverityBand::Warning {
            assert!(rt >= 1200.0, "warning sample {i} below the limit");
        } else {
            assert!(rt < 1200.0, "non-warning sample {i} at or over the limit");
        }
    }
}

#[test]
fn two_sample_scenario_single_safe_sample_is_high() {
    let samples = vec![sample("a", 1_000, 100.0), sample("b", 2_000, 2_000.0)];
    let bands = categorize(&samples, 1200.0);
    assert_eq!(
        bands.band(0),
        SeverityBand::High,
        "a single safe sample ranks high (ceil(0.3 * 1) = 1)"
    );
    assert_eq!(bands.band(1), SeverityBand::Warning);
}

#[test]
fn rank_splits_use_ceil() {
    // 10 safe samples: ceil(3) = 3 high, ceil(7) - 3 = 4 normal, 3 low.
    let samples: Vec<Sample> = (0..10)
        .map(|i| sample(&format!("s{i}"), 1_000 + i, 100.0 * (10 - i) as f64))
        .collect();
    let bands = categorize(&samples, 1_200.0);
    assert_eq!(bands.count(SeverityBand::Warning), 0);
    assert_eq!(bands.count(SeverityBand::High), 3);
    assert_eq!(bands.count(SeverityBand::Normal), 4);
    assert_eq!(bands.count(SeverityBand::Low), 3);

    // Input is sorted fastest-last, so the first indices are the slowest.
    assert_eq!(bands.band(0), SeverityBand::High);
    assert_eq!(bands.band(2), SeverityBand::High);
    assert_eq!(bands.band(3), SeverityBand::Normal);
    assert_eq!(bands.band(6), SeverityBand::Normal);
    assert_eq!(bands.band(7), SeverityBand::Low);
    assert_eq!(bands.band(9), SeverityBand::Low);
}

#[test]
fn ties_keep_insertion_order() {
    // Four equal response times; with N = 4: 2 high, 1 normal, 1 low.
    // The stable sort must hand out ranks in insertion order.
    let samples: Vec<Sample> = (0..4)
        .map(|i| sample(&format!("s{i}"), 1_000 + i, 500.0))
        .collect();
    let bands = categorize(&samples, 1_200.0);
    assert_eq!(bands.band(0), SeverityBand::High);
    assert_eq!(bands.band(1), SeverityBand::High);
    assert_eq!(bands.band(2), SeverityBand::Normal);
    assert_eq!(bands.band(3), SeverityBand::Low);

    // Re-running on identical input is deterministic.
    let again = categorize(&samples, 1_200.0);
    for (i, band) in bands.iter() {
        assert_eq!(band, again.band(i), "band of sample {i} changed between passes");
    }
}

#[test]
fn warning_limit_is_inclusive() {
    let samples = vec![
        sample("under", 1_000, 1_199.9),
        sample("at", 1_001, 1_200.0),
        sample("over", 1_002, 1_200.1),
    ];
    let bands = categorize(&samples, 1_200.0);
    assert_ne!(bands.band(0), SeverityBand::Warning);
    assert_eq!(bands.band(1), SeverityBand::Warning, "limit itself is warning");
    assert_eq!(bands.band(2), SeverityBand::Warning);
}

#[test]
fn all_warning_leaves_relative_bands_empty() {
    let samples: Vec<Sample> = (0..5)
        .map(|i| sample(&format!("s{i}"), 1_000 + i, 2_000.0))
        .collect();
    let bands = categorize(&samples, 1_200.0);
    assert_eq!(bands.count(SeverityBand::Warning), 5);
    assert_eq!(bands.count(SeverityBand::High), 0);
    assert_eq!(bands.count(SeverityBand::Normal), 0);
    assert_eq!(bands.count(SeverityBand::Low), 0);
}
