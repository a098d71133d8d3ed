//! Metadata comparison tests.

use vidfit::{FrameRate, MetadataComparison, SYNC_TOLERANCE_SECONDS, VideoMetadata};

fn video(width: u32, height: u32, fps: u32, frames: u64) -> VideoMetadata {
    VideoMetadata::new(width, height, FrameRate::from_integer(fps), frames)
}

#[test]
fn identical_videos_match_everywhere() {
    let clip = video(1280, 720, 30, 900);
    let comparison = MetadataComparison::new(&clip, &clip);

    assert_eq!(comparison.duration_difference(), 0.0);
    assert!(comparison.is_in_sync());
    assert!(comparison.resolution_matches());
    assert!(comparison.frame_rate_matches());
}

#[test]
fn sub_second_difference_is_in_sync() {
    let original = video(1920, 1080, 25, 2500); // 100 s
    let processed = video(640, 360, 5, 498); // 99.6 s
    let comparison = MetadataComparison::new(&original, &processed);

    assert!((comparison.duration_difference() - 0.4).abs() < 1e-9);
    assert!(comparison.is_in_sync());
    assert!(!comparison.resolution_matches());
    assert!(!comparison.frame_rate_matches());
}

#[test]
fn exactly_one_second_is_in_sync() {
    let comparison = MetadataComparison::new(&video(640, 360, 10, 100), &video(640, 360, 10, 110));
    assert_eq!(comparison.duration_difference(), SYNC_TOLERANCE_SECONDS);
    assert!(comparison.is_in_sync());
}

#[test]
fn large_difference_warns() {
    let comparison = MetadataComparison::new(&video(640, 360, 30, 900), &video(640, 360, 30, 1800));
    assert!(!comparison.is_in_sync());

    let report = comparison.to_string();
    assert!(report.contains("Duration Difference: 30.00 seconds"), "{report}");
    assert!(report.contains("significantly different durations"), "{report}");
}

#[test]
fn custom_tolerance() {
    let comparison = MetadataComparison::new(&video(640, 360, 30, 900), &video(640, 360, 30, 1800))
        .with_tolerance(60.0);
    assert!(comparison.is_in_sync());
    assert!(comparison.to_string().contains("similar durations"));
}

#[test]
fn report_lists_mismatched_properties() {
    let report =
        MetadataComparison::new(&video(1920, 1080, 25, 250), &video(640, 360, 5, 50)).to_string();
    assert!(report.contains("Resolution differs: 1920x1080 vs 640x360"), "{report}");
    assert!(report.contains("Frame rate differs: 25.00 vs 5.00 fps"), "{report}");
}
