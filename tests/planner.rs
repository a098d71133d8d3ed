//! Planning integration tests.
//!
//! Planning is pure, so none of these need fixture files.

use std::time::Duration;

use vidfit::{Constraints, FrameRate, PlanError, TransformPlanner, VideoMetadata, parse_timecode};

fn video(width: u32, height: u32, fps: u32, frames: u64) -> VideoMetadata {
    VideoMetadata::new(width, height, FrameRate::from_integer(fps), frames)
}

// ── Resize ─────────────────────────────────────────────────────────

#[test]
fn resize_uhd_to_1280() {
    let input = video(3840, 2160, 30, 900);
    let size = TransformPlanner::plan_resize(&input, Some(1280)).expect("resize");
    assert_eq!(size, (1280, 720));
}

#[test]
fn resize_portrait_limits_height() {
    let input = video(1080, 1920, 30, 900);
    let size = TransformPlanner::plan_resize(&input, Some(640)).expect("resize");
    assert_eq!(size, (360, 640));
}

#[test]
fn resize_square_uses_width() {
    let input = video(1000, 1000, 30, 900);
    assert_eq!(
        TransformPlanner::plan_resize(&input, Some(333)).expect("resize"),
        (333, 333)
    );
}

#[test]
fn resize_without_limit_keeps_source_size() {
    let input = video(1920, 1080, 30, 900);
    assert_eq!(
        TransformPlanner::plan_resize(&input, None).expect("resize"),
        (1920, 1080)
    );
}

#[test]
fn resize_truncates_toward_zero() {
    // 1000 * 1080 / 1920 = 562.5
    let input = video(1920, 1080, 30, 900);
    assert_eq!(
        TransformPlanner::plan_resize(&input, Some(1000)).expect("resize"),
        (1000, 562)
    );
}

#[test]
fn resize_never_goes_below_one_pixel() {
    let input = video(10_000, 1, 30, 900);
    assert_eq!(
        TransformPlanner::plan_resize(&input, Some(100)).expect("resize"),
        (100, 1)
    );
}

#[test]
fn resize_stays_within_rounding_bound() {
    let sources = [
        (3840, 2160),
        (1920, 1080),
        (1280, 720),
        (720, 1280),
        (640, 480),
        (1366, 768),
        (4096, 2160),
        (853, 480),
        (1, 1),
        (10_000, 1),
        (1, 10_000),
    ];
    for (width, height) in sources {
        for max_dimension in [1, 2, 100, 333, 720, 1280, 4000] {
            let input = video(width, height, 30, 100);
            let (target_width, target_height) =
                TransformPlanner::plan_resize(&input, Some(max_dimension)).expect("resize");

            assert_eq!(target_width.max(target_height), max_dimension);

            // |h' * width - height * M| <= width, transposed for portrait sources.
            let (long_side, short_side, scaled_short) = if width >= height {
                (width, height, target_height)
            } else {
                (height, width, target_width)
            };
            let error = (i64::from(scaled_short) * i64::from(long_side)
                - i64::from(short_side) * i64::from(max_dimension))
            .abs();
            assert!(
                error <= i64::from(long_side),
                "{width}x{height} -> {target_width}x{target_height} misses the truncation bound",
            );
        }
    }
}

#[test]
fn resize_rejects_zero_dimension_source() {
    let input = video(0, 1080, 30, 900);
    let result = TransformPlanner::plan_resize(&input, Some(640));
    assert!(matches!(
        result,
        Err(PlanError::DegenerateAspectRatio {
            width: 0,
            height: 1080
        })
    ));
}

#[test]
fn resize_rejects_zero_max_dimension() {
    let input = video(1920, 1080, 30, 900);
    assert_eq!(
        TransformPlanner::plan_resize(&input, Some(0)),
        Err(PlanError::InvalidMaxDimension)
    );
}

// ── Duration matching ──────────────────────────────────────────────

#[test]
fn speed_factor_is_duration_ratio() {
    let reference = video(1280, 720, 30, 3600); // 120 s
    let input = video(1920, 1080, 30, 4500); // 150 s
    let speed = TransformPlanner::plan_duration_match(&reference, &input).expect("match");
    assert_eq!(speed, 0.8);
}

#[test]
fn speed_factor_slows_down_shorter_input() {
    let reference = video(640, 360, 5, 100); // 20 s
    let input = video(1920, 1080, 25, 250); // 10 s
    let speed = TransformPlanner::plan_duration_match(&reference, &input).expect("match");
    assert_eq!(speed, 2.0);
}

#[test]
fn zero_input_duration_is_an_error() {
    let reference = video(1280, 720, 30, 3600);
    let input = video(1920, 1080, 30, 0);
    let result = TransformPlanner::plan_duration_match(&reference, &input);
    assert!(matches!(
        result,
        Err(PlanError::DegenerateDuration { input, .. }) if input == 0.0
    ));
}

#[test]
fn unknown_frame_rate_is_an_error() {
    let reference = VideoMetadata::new(1280, 720, FrameRate::ZERO, 3600);
    let input = video(1920, 1080, 30, 900);
    assert!(matches!(
        TransformPlanner::plan_duration_match(&reference, &input),
        Err(PlanError::DegenerateDuration { .. })
    ));
}

// ── Full plans ─────────────────────────────────────────────────────

#[test]
fn full_plan_combines_resize_and_speed() {
    let input = video(3840, 2160, 30, 4500);
    let reference = video(1280, 720, 30, 3600);
    let constraints = Constraints::new()
        .with_max_dimension(1280)
        .with_reference(reference);

    let plan = TransformPlanner::plan_full(&input, &constraints).expect("plan");
    assert_eq!((plan.target_width, plan.target_height), (1280, 720));
    assert_eq!(plan.speed_factor, 0.8);
    assert_eq!(plan.target_fps, None);
    assert!(!plan.is_trimmed());
    assert!((plan.output_duration(&input) - 120.0).abs() < 1e-9);
}

#[test]
fn empty_constraints_plan_identity() {
    let input = video(1920, 1080, 25, 250);
    let plan = TransformPlanner::plan_full(&input, &Constraints::new()).expect("plan");
    assert_eq!((plan.target_width, plan.target_height), (1920, 1080));
    assert_eq!(plan.speed_factor, 1.0);
    assert!(!plan.changes_speed());
}

#[test]
fn reversed_trim_window_is_rejected() {
    let input = video(1920, 1080, 30, 9000);
    let start = parse_timecode("00:01:00").expect("start");
    let end = parse_timecode("00:00:30").expect("end");

    let result = TransformPlanner::plan_full(&input, &Constraints::new().with_trim(start, end));
    assert_eq!(
        result,
        Err(PlanError::InvalidTrimWindow {
            start: Duration::from_secs(60),
            end: Duration::from_secs(30),
        })
    );
}

#[test]
fn zero_trim_end_is_rejected() {
    let input = video(1920, 1080, 30, 9000);
    assert_eq!(
        TransformPlanner::plan_full(&input, &Constraints::new().with_trim_end(Duration::ZERO)),
        Err(PlanError::InvalidTrimWindow {
            start: Duration::ZERO,
            end: Duration::ZERO,
        })
    );
}

#[test]
fn lone_start_past_the_end_is_rejected() {
    // 300 s input.
    let input = video(1920, 1080, 30, 9000);
    let result = TransformPlanner::plan_full(
        &input,
        &Constraints::new().with_trim_start(Duration::from_secs(400)),
    );
    assert_eq!(
        result,
        Err(PlanError::InvalidTrimWindow {
            start: Duration::from_secs(400),
            end: Duration::from_secs(300),
        })
    );
}

#[test]
fn lone_start_with_unknown_duration_is_accepted() {
    let input = VideoMetadata::new(1920, 1080, FrameRate::ZERO, 0);
    let plan = TransformPlanner::plan_full(
        &input,
        &Constraints::new().with_trim_start(Duration::from_secs(400)),
    )
    .expect("plan");
    assert_eq!(plan.trim_start, Some(Duration::from_secs(400)));
}

#[test]
fn empty_trim_window_is_rejected() {
    let input = video(1920, 1080, 30, 9000);
    let at = Duration::from_secs(10);
    assert!(matches!(
        TransformPlanner::plan_full(&input, &Constraints::new().with_trim(at, at)),
        Err(PlanError::InvalidTrimWindow { .. })
    ));
}

#[test]
fn open_ended_trim_is_accepted() {
    let input = video(1920, 1080, 30, 9000);
    let plan = TransformPlanner::plan_full(
        &input,
        &Constraints::new().with_trim_start(Duration::from_secs(200)),
    )
    .expect("plan");
    assert!(plan.is_trimmed());
    assert_eq!(plan.trim_end, None);
    assert!((plan.output_duration(&input) - 100.0).abs() < 1e-6);
}

#[test]
fn speed_is_computed_on_trimmed_window() {
    // 300 s input, keep 60..90, match a 15 s reference.
    let input = video(1920, 1080, 30, 9000);
    let reference = video(640, 360, 30, 450);
    let constraints = Constraints::new()
        .with_trim(Duration::from_secs(60), Duration::from_secs(90))
        .with_reference(reference);

    let plan = TransformPlanner::plan_full(&input, &constraints).expect("plan");
    assert_eq!(plan.speed_factor, 0.5);
}

#[test]
fn matching_reproduces_reference() {
    let input = video(3840, 2160, 60, 9000); // 150 s
    let reference = VideoMetadata::new(640, 360, FrameRate::new(30000, 1001), 3597);

    let plan = TransformPlanner::plan_full(&input, &Constraints::matching(reference))
        .expect("plan");
    assert_eq!((plan.target_width, plan.target_height), (640, 360));
    assert_eq!(plan.target_fps, Some(FrameRate::new(30000, 1001)));
    assert!((plan.output_duration(&input) - reference.duration).abs() < 1e-9);
}

#[test]
fn degenerate_reference_without_fallback_fails() {
    let input = video(1920, 1080, 30, 0);
    let constraints = Constraints::new().with_reference(video(640, 360, 30, 300));
    assert!(matches!(
        TransformPlanner::plan_full(&input, &constraints),
        Err(PlanError::DegenerateDuration { .. })
    ));
}

#[test]
fn degenerate_reference_with_fallback_uses_it() {
    let input = video(1920, 1080, 30, 0);
    let constraints = Constraints::new()
        .with_reference(video(640, 360, 30, 300))
        .with_speed_fallback(1.0);

    let plan = TransformPlanner::plan_full(&input, &constraints).expect("plan");
    assert_eq!(plan.speed_factor, 1.0);
}

#[test]
fn fallback_is_ignored_when_match_succeeds() {
    let constraints = Constraints::new()
        .with_reference(video(640, 360, 30, 3600))
        .with_speed_fallback(1.0);
    let plan = TransformPlanner::plan_full(&video(1920, 1080, 30, 4500), &constraints)
        .expect("plan");
    assert_eq!(plan.speed_factor, 0.8);
}

#[test]
fn non_positive_fallback_is_rejected() {
    let constraints = Constraints::new()
        .with_reference(video(640, 360, 30, 300))
        .with_speed_fallback(0.0);
    assert_eq!(
        TransformPlanner::plan_full(&video(1920, 1080, 30, 0), &constraints),
        Err(PlanError::InvalidSpeedFallback(0.0))
    );
}

#[test]
fn size_and_max_dimension_conflict() {
    let constraints = Constraints::new()
        .with_target_size(640, 360)
        .with_max_dimension(720);
    assert_eq!(
        TransformPlanner::plan_full(&video(1920, 1080, 30, 300), &constraints),
        Err(PlanError::ConflictingSize)
    );
}

#[test]
fn zero_target_size_is_rejected() {
    let constraints = Constraints::new().with_target_size(640, 0);
    assert!(matches!(
        TransformPlanner::plan_full(&video(1920, 1080, 30, 300), &constraints),
        Err(PlanError::DegenerateAspectRatio { .. })
    ));
}

#[test]
fn zero_target_fps_is_rejected() {
    let constraints = Constraints::new().with_target_fps(FrameRate::ZERO);
    assert!(matches!(
        TransformPlanner::plan_full(&video(1920, 1080, 30, 300), &constraints),
        Err(PlanError::InvalidFrameRate(_))
    ));
}

#[test]
fn planning_is_deterministic() {
    let input = video(3840, 2160, 30, 4500);
    let constraints = Constraints::new()
        .with_max_dimension(720)
        .with_target_fps(FrameRate::from_integer(5))
        .with_trim(Duration::from_secs(10), Duration::from_secs(100))
        .with_reference(video(640, 360, 5, 300));

    let first = TransformPlanner::plan_full(&input, &constraints).expect("plan");
    for _ in 0..10 {
        assert_eq!(
            TransformPlanner::plan_full(&input, &constraints).expect("plan"),
            first
        );
    }
}
