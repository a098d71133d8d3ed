//! Timecode and frame-rate parsing tests.

use std::time::Duration;

use vidfit::{FrameRate, PlanError, format_timecode, parse_timecode};

// ── Timecodes ──────────────────────────────────────────────────────

#[test]
fn parse_plain_seconds() {
    assert_eq!(parse_timecode("75").unwrap(), Duration::from_secs(75));
    assert_eq!(parse_timecode("75.5").unwrap(), Duration::from_millis(75_500));
    assert_eq!(parse_timecode(" 0 ").unwrap(), Duration::ZERO);
}

#[test]
fn parse_minutes_and_seconds() {
    assert_eq!(parse_timecode("07:34").unwrap(), Duration::from_secs(454));
    assert_eq!(parse_timecode("1:02.25").unwrap(), Duration::from_millis(62_250));
}

#[test]
fn parse_hours_minutes_seconds() {
    assert_eq!(parse_timecode("00:07:34").unwrap(), Duration::from_secs(454));
    assert_eq!(parse_timecode("00:07:38").unwrap(), Duration::from_secs(458));
    assert_eq!(parse_timecode("01:00:00").unwrap(), Duration::from_secs(3600));
    assert_eq!(parse_timecode("100:00:00").unwrap(), Duration::from_secs(360_000));
}

#[test]
fn reject_malformed_timecodes() {
    for value in [
        "",
        "abc",
        "-5",
        "00:60:00",
        "00:00:60",
        "1:2:3:4",
        "::",
        "1:-1",
        "NaN",
        "1e20",
        "18446744073709551615:00:00",
        "5124095576030432:00:00",
    ] {
        assert!(
            matches!(parse_timecode(value), Err(PlanError::InvalidTimecode(_))),
            "{value:?} should be rejected",
        );
    }
}

#[test]
fn format_pads_fields() {
    assert_eq!(format_timecode(Duration::from_secs(454)), "00:07:34.000");
    assert_eq!(format_timecode(Duration::from_millis(3_723_042)), "01:02:03.042");
    assert_eq!(format_timecode(Duration::ZERO), "00:00:00.000");
}

#[test]
fn format_then_parse_is_stable() {
    let duration = Duration::from_millis(5_025_125);
    assert_eq!(parse_timecode(&format_timecode(duration)).unwrap(), duration);
}

// ── Frame rates ────────────────────────────────────────────────────

#[test]
fn parse_integer_rate() {
    let rate: FrameRate = "30".parse().unwrap();
    assert_eq!(rate, FrameRate::from_integer(30));
    assert_eq!(rate.to_string(), "30");
}

#[test]
fn parse_ratio_rate_is_reduced() {
    let rate: FrameRate = "60/2".parse().unwrap();
    assert_eq!((rate.numerator(), rate.denominator()), (30, 1));

    let ntsc: FrameRate = "30000/1001".parse().unwrap();
    assert_eq!(ntsc.to_string(), "30000/1001");
    assert!((ntsc.as_f64() - 29.97).abs() < 0.001);
}

#[test]
fn parse_decimal_rate() {
    let rate: FrameRate = "29.97".parse().unwrap();
    assert_eq!(rate, FrameRate::new(2997, 100));
    assert_eq!("12.5".parse::<FrameRate>().unwrap(), FrameRate::new(25, 2));
}

#[test]
fn reject_malformed_rates() {
    for value in [
        "",
        "fast",
        "30/0",
        "-5",
        "1/x",
        "inf",
        "4294967295/1",
        "1/4294967295",
        "3000000000",
        "4294967.3",
    ] {
        assert!(
            matches!(value.parse::<FrameRate>(), Err(PlanError::InvalidFrameRate(_))),
            "{value:?} should be rejected",
        );
    }
}

#[test]
fn large_rates_that_reduce_are_accepted() {
    let rate: FrameRate = "4294967294/2".parse().unwrap();
    assert_eq!(rate, FrameRate::from_integer(2_147_483_647));
    assert_eq!(FrameRate::new(u32::MAX, 1), FrameRate::ZERO);
}

#[test]
fn huge_timecodes_near_the_limit_still_parse() {
    assert_eq!(
        parse_timecode("1000000:00:00").unwrap(),
        Duration::from_secs(3_600_000_000)
    );
}

#[test]
fn zero_rate_is_zero() {
    assert!(FrameRate::ZERO.is_zero());
    assert_eq!(FrameRate::ZERO.as_f64(), 0.0);
    assert!(FrameRate::new(0, 1).is_zero());
}
