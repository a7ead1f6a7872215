use std::time::{Duration, Instant};

use dimflow_core::{
    LightPower, LightState, SetPayload, DEFAULT_ON_BRIGHTNESS, DMX_QUIET_WINDOW,
};

fn set(state: Option<LightPower>, brightness: Option<u8>) -> SetPayload {
    SetPayload { state, brightness }
}

#[test]
fn test_frame_applies_all_zones_and_stamps_clock() {
    let mut light = LightState::new(6);
    let now = Instant::now();
    assert!(light.last_dmx().is_none());

    light.apply_frame(&[10, 20, 30, 40, 50, 60], now);

    assert_eq!(light.zones().targets(), vec![10, 20, 30, 40, 50, 60]);
    assert_eq!(light.last_dmx(), Some(now));
}

#[test]
fn test_short_frame_leaves_remaining_zones_alone() {
    let mut light = LightState::new(6);
    let now = Instant::now();
    light.apply_frame(&[1, 2, 3, 4, 5, 6], now);
    light.apply_frame(&[9, 9], now + Duration::from_millis(25));

    assert_eq!(light.zones().targets(), vec![9, 9, 3, 4, 5, 6]);
}

#[test]
fn test_remote_on_at_zero_defaults_to_midrange() {
    let mut light = LightState::new(6);
    light.apply_remote_set(set(Some(LightPower::On), Some(0)), Instant::now());

    assert_eq!(light.remote().power, LightPower::On);
    assert_eq!(light.remote().brightness, DEFAULT_ON_BRIGHTNESS);
    assert!(light
        .zones()
        .targets()
        .iter()
        .all(|&v| v == DEFAULT_ON_BRIGHTNESS));
}

#[test]
fn test_remote_on_at_zero_only_defaults_on_state_change() {
    let mut light = LightState::new(6);
    let now = Instant::now();
    light.apply_remote_set(set(Some(LightPower::On), Some(40)), now);
    // Already on: dimming to 0 is a real request, not a meaningless turn-on.
    light.apply_remote_set(set(Some(LightPower::On), Some(0)), now);

    assert_eq!(light.remote().brightness, 0);
    assert!(light.zones().targets().iter().all(|&v| v == 0));
}

#[test]
fn test_remote_authoritative_when_dmx_idle() {
    let mut light = LightState::new(6);
    let start = Instant::now();
    light.apply_frame(&[100; 6], start);

    // Past the quiet window the remote wins.
    let later = start + DMX_QUIET_WINDOW + Duration::from_millis(1);
    light.apply_remote_set(set(Some(LightPower::On), Some(200)), later);

    assert!(light.zones().targets().iter().all(|&v| v == 200));
    assert_eq!(light.remote().brightness, 200);
}

#[test]
fn test_remote_rejected_while_dmx_active() {
    let mut light = LightState::new(6);
    let start = Instant::now();
    light.apply_frame(&[80, 10, 10, 10, 10, 10], start);
    // Drain the startup publish so the mirror republish is observable.
    let _ = light.take_publish();

    let soon = start + Duration::from_secs(2);
    light.apply_remote_set(set(Some(LightPower::On), Some(255)), soon);

    // Targets untouched; remote mirrors zone 1 instead.
    assert_eq!(light.zones().targets(), vec![80, 10, 10, 10, 10, 10]);
    assert_eq!(light.remote().power, LightPower::On);
    assert_eq!(light.remote().brightness, 80);

    // The mirrored state is forced out even if it was published before.
    let payload = light.take_publish().expect("mirror must republish");
    assert_eq!(payload.brightness, 80);
    assert_eq!(payload.state, LightPower::On);
}

#[test]
fn test_remote_mirror_of_dark_zone_one_reads_off() {
    let mut light = LightState::new(6);
    let start = Instant::now();
    light.apply_frame(&[0, 90, 90, 90, 90, 90], start);

    light.apply_remote_set(set(Some(LightPower::On), Some(64)), start);

    assert_eq!(light.remote().power, LightPower::Off);
    assert_eq!(light.remote().brightness, 0);
}

#[test]
fn test_remote_off_zeroes_all_zones() {
    let mut light = LightState::new(6);
    let now = Instant::now();
    light.apply_remote_set(set(Some(LightPower::On), Some(150)), now);
    light.apply_remote_set(set(Some(LightPower::Off), None), now);

    assert!(light.zones().targets().iter().all(|&v| v == 0));
    assert_eq!(light.remote().power, LightPower::Off);
    // Brightness is remembered for the next turn-on.
    assert_eq!(light.remote().brightness, 150);
}

#[test]
fn test_panel_report_updates_remote() {
    let mut light = LightState::new(6);
    light.apply_panel_report(100);
    assert_eq!(light.remote().power, LightPower::On);
    assert_eq!(light.remote().brightness, 100);

    light.apply_panel_report(0);
    assert_eq!(light.remote().power, LightPower::Off);
}

#[test]
fn test_publish_once_per_distinct_pair() {
    let mut light = LightState::new(6);
    let now = Instant::now();

    light.apply_remote_set(set(Some(LightPower::On), Some(77)), now);
    assert!(light.take_publish().is_some());
    assert!(light.take_publish().is_none());

    // Same command again: no state change, nothing published.
    light.apply_remote_set(set(Some(LightPower::On), Some(77)), now);
    assert!(light.take_publish().is_none());

    light.apply_panel_report(78);
    assert!(light.take_publish().is_some());
    assert!(light.take_publish().is_none());
}
