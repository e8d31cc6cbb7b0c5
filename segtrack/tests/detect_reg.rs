//! End-to-end line detection regression test
//!
//! Test structure:
//!   Test 1: empty image
//!   Test 2: gap bridged into one segment
//!   Test 3: merging strokes come out as two segments
//!   Test 4: table grid with crossings
//!   Test 5: configuration errors
//!   Test 6: configuration read from JSON
//!   Test 7: repeated detection gives the same segments
//!   Test 8: light strokes on a dark background

use segtrack::{
    Error, GrayImage, SegDetParams, Segment, TrackerStrategy, TraversalMode, detect_lines,
    detect_lines_with_report,
};
use segtrack_test::{Canvas, RegParams};

fn sorted_by_position(segments: &[Segment]) -> Vec<&Segment> {
    let mut sorted: Vec<&Segment> = segments.iter().collect();
    sorted.sort_by(|a, b| a.first_span.position.total_cmp(&b.first_span.position));
    sorted
}

/// Test 1: nothing to detect
#[test]
fn test_1_empty_image() {
    let mut rp = RegParams::new("detect_1_empty");
    let image = GrayImage::new(64, 48, 255);

    let detection = detect_lines_with_report(&image, &SegDetParams::default()).expect("detect");
    rp.compare_values(0.0, detection.segments.len() as f64, 0.0);
    rp.compare_values(48.0, detection.report.vertical.scanlines as f64, 0.0);
    rp.compare_values(64.0, detection.report.horizontal.scanlines as f64, 0.0);
    rp.compare_values(0.0, detection.report.vertical.observations as f64, 0.0);

    assert!(rp.cleanup(), "detect test 1 (empty) failed");
}

/// Test 2: three blank scanlines inside a stroke
#[test]
fn test_2_gap_bridged() {
    let mut rp = RegParams::new("detect_2_gap");
    let image = Canvas::new(20, 103)
        .vertical_stroke(9, 3, 0, 49)
        .vertical_stroke(9, 3, 53, 102)
        .build();
    let params = SegDetParams::new()
        .with_discontinuity(0.0, 3)
        .with_min_length(20);

    let segments = detect_lines(&image, &params).expect("detect");
    rp.compare_values(1.0, segments.len() as f64, 0.0);
    if let Some(segment) = segments.first() {
        rp.check(!segment.is_horizontal(), "vertical segment");
        rp.compare_values(103.0, segment.length as f64, 0.0);
        rp.check(
            segment.endpoints() == ((10.0, 0.0), (10.0, 102.0)),
            "endpoints at both stroke ends",
        );
    }

    assert!(rp.cleanup(), "detect test 2 (gap) failed");
}

/// Test 3: two strokes touching over five scanlines
#[test]
fn test_3_merging_strokes() {
    let mut rp = RegParams::new("detect_3_merge");
    let params = SegDetParams::new()
        .with_traversal_mode(TraversalMode::Vertical)
        .with_min_length(40);

    // merged rows right after the strokes start, then far from them
    for (merge_start, contested) in [(5, Some(5.0)), (8, Some(5.0)), (40, None)] {
        let image = Canvas::new(48, 100)
            .vertical_stroke(19, 3, 0, 99)
            .vertical_stroke(23, 3, 0, 99)
            .fill_rect(22, merge_start, 22, merge_start + 4, 0)
            .build();

        let detection = detect_lines_with_report(&image, &params).expect("detect");
        if let Some(contested) = contested {
            rp.compare_values(
                contested,
                detection.report.vertical.contested_observations as f64,
                0.0,
            );
        }
        rp.compare_values(2.0, detection.segments.len() as f64, 0.0);
        for (segment, x) in sorted_by_position(&detection.segments)
            .into_iter()
            .zip([20.0, 24.0])
        {
            rp.compare_values(x, segment.first_span.position as f64, 0.0);
            rp.compare_values(x, segment.last_span.position as f64, 0.0);
            rp.compare_values(100.0, segment.length as f64, 0.0);
        }
    }

    assert!(rp.cleanup(), "detect test 3 (merge) failed");
}

/// Test 4: rulings of a 3x3 table
#[test]
fn test_4_table_grid() {
    let mut rp = RegParams::new("detect_4_grid");
    let mut canvas = Canvas::new(100, 100);
    for offset in [10, 50, 88] {
        canvas = canvas
            .horizontal_stroke(offset, 3, 10, 90)
            .vertical_stroke(offset, 3, 10, 90);
    }
    let image = canvas.build();
    let params = SegDetParams::new().with_min_length(30);

    let detection = detect_lines_with_report(&image, &params).expect("detect");
    let segments = &detection.segments;
    rp.compare_values(6.0, segments.len() as f64, 0.0);
    rp.compare_values(0.0, detection.report.postprocess.duplicates_removed as f64, 0.0);

    let (horizontal, vertical): (Vec<Segment>, Vec<Segment>) =
        segments.iter().cloned().partition(|s| s.is_horizontal());
    rp.compare_values(3.0, horizontal.len() as f64, 0.0);
    rp.check(
        segments.iter().take(3).all(|s| s.is_horizontal()),
        "horizontal segments first",
    );
    for group in [&horizontal, &vertical] {
        for (segment, position) in sorted_by_position(group).into_iter().zip([11.0, 51.0, 89.0]) {
            rp.compare_values(position, segment.first_span.position as f64, 0.0);
            // the end rulings swallow the first and last three scanlines
            rp.compare_values(13.0, segment.first_span.t as f64, 0.0);
            rp.compare_values(87.0, segment.last_span.t as f64, 0.0);
            // passing under the middle ruling
            let occluded: Vec<u32> = segment.occluded_spans.iter().map(|s| s.t).collect();
            rp.check(occluded == vec![50, 51, 52], "occluded under the middle ruling");
        }
    }

    assert!(rp.cleanup(), "detect test 4 (grid) failed");
}

/// Test 5: configuration errors are reported before any work
#[test]
fn test_5_configuration_errors() {
    let mut rp = RegParams::new("detect_5_config_errors");

    let err = "kalmann".parse::<TrackerStrategy>().unwrap_err();
    rp.check(err == Error::UnknownStrategy("kalmann".to_string()), "unknown strategy");
    rp.check(err.is_configuration(), "strategy error is a configuration error");

    let image = GrayImage::new(16, 16, 0);
    let params = SegDetParams::new().with_bucket_size(0);
    let err = detect_lines(&image, &params).unwrap_err();
    rp.check(err.is_configuration(), "invalid parameter is a configuration error");

    let json = serde_json::from_str::<SegDetParams>(r#"{"tracker": "kalmann"}"#);
    match json {
        Ok(_) => rp.check(false, "unknown strategy accepted from JSON"),
        Err(e) => rp.check(
            e.to_string().contains("unknown tracker strategy"),
            "JSON error names the strategy problem",
        ),
    };

    assert!(rp.cleanup(), "detect test 5 (configuration errors) failed");
}

/// Test 6: partial configuration from JSON, other fields at defaults
#[test]
fn test_6_json_configuration() {
    let mut rp = RegParams::new("detect_6_json");
    let params: SegDetParams = serde_json::from_str(
        r#"{"tracker": "one_euro", "traversal_mode": "vertical", "min_length": 20}"#,
    )
    .expect("valid JSON configuration");
    rp.check(params.tracker == TrackerStrategy::OneEuro, "tracker read");
    rp.compare_values(20.0, params.min_length as f64, 0.0);
    rp.compare_values(32.0, params.bucket_size as f64, 0.0);

    let image = Canvas::new(40, 50)
        .vertical_stroke(5, 2, 0, 49)
        .horizontal_stroke(20, 2, 0, 39)
        .build();
    let segments = detect_lines(&image, &params).expect("detect");
    rp.compare_values(1.0, segments.len() as f64, 0.0);
    rp.check(
        segments.iter().all(|s| !s.is_horizontal()),
        "only the vertical sweep ran",
    );

    assert!(rp.cleanup(), "detect test 6 (JSON configuration) failed");
}

/// Test 7: determinism
#[test]
fn test_7_deterministic() {
    let mut rp = RegParams::new("detect_7_determinism");
    let image = Canvas::new(80, 80)
        .vertical_stroke(20, 3, 5, 75)
        .horizontal_stroke(40, 4, 0, 79)
        .slanted_stroke(50.0, 0.2, 3, 0, 79)
        .fill_rect(60, 10, 70, 20, 40)
        .build();

    for strategy in TrackerStrategy::ALL {
        let params = SegDetParams::new().with_tracker(strategy);
        let first = detect_lines(&image, &params).expect("detect");
        let second = detect_lines(&image, &params).expect("detect");
        rp.compare_segments(&first, &second);
    }

    assert!(rp.cleanup(), "detect test 7 (determinism) failed");
}

/// Test 8: a negated image gives the segments of the original
#[test]
fn test_8_negated_image() {
    let mut rp = RegParams::new("detect_8_negate");
    let image = Canvas::new(60, 60)
        .vertical_stroke(29, 3, 0, 59)
        .horizontal_stroke(29, 3, 0, 59)
        .build();
    let params = SegDetParams::new().with_min_length(20);

    let expected = detect_lines(&image, &params).expect("detect");
    rp.compare_values(2.0, expected.len() as f64, 0.0);
    let negated = detect_lines(&image.invert(), &params.clone().with_negate_image(true))
        .expect("detect");
    rp.compare_segments(&expected, &negated);
    let plain = detect_lines(&image.invert(), &params).expect("detect");
    rp.check(plain != expected, "light strokes are not found without negation");

    assert!(rp.cleanup(), "detect test 8 (negated image) failed");
}
