use std::time::Duration;

use super::driver::{clamp_volume, reported_position};
use super::fetch::is_remote;
use super::*;

#[test]
fn volume_is_clamped_into_unit_range() {
    assert_eq!(clamp_volume(1.7), 1.0);
    assert_eq!(clamp_volume(-0.2), 0.0);
    assert_eq!(clamp_volume(0.4), 0.4);
    assert_eq!(clamp_volume(f32::NAN), 0.0);
}

#[test]
fn reported_position_never_passes_known_duration() {
    let d = Some(Duration::from_secs(90));
    assert_eq!(
        reported_position(Duration::from_secs(95), d, false),
        Duration::from_secs(90)
    );
    assert_eq!(
        reported_position(Duration::from_secs(10), d, false),
        Duration::from_secs(10)
    );
    // A drained sink reports the end even if its clock lags behind.
    assert_eq!(
        reported_position(Duration::from_secs(89), d, true),
        Duration::from_secs(90)
    );
    assert_eq!(
        reported_position(Duration::from_secs(12), None, true),
        Duration::from_secs(12)
    );
}

#[test]
fn remote_sources_are_recognised_by_scheme() {
    assert!(is_remote("https://audio.example/preview.m4a"));
    assert!(is_remote("HTTP://audio.example/a.mp3"));
    assert!(!is_remote("music/track.mp3"));
    assert!(!is_remote("/home/me/httpsong.mp3"));
}

#[test]
fn media_errors_read_like_player_messages() {
    assert_eq!(MediaError::Aborted.to_string(), "Fetching process aborted");
    assert_eq!(MediaError::Unsupported.to_string(), "Format not supported");
    assert_eq!(
        MediaError::Network("HTTP 404 Not Found".into()).to_string(),
        "Network error: HTTP 404 Not Found"
    );
}
