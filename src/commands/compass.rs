//! Handle the compass command: a live session fed by recorded orientation events.
//!
//! The loop pumps the session every [`COMPASS_POLL_INTERVAL_MS`], prints each
//! changed snapshot and stops on the first of: the `--duration` deadline, a
//! shutdown signal, a finished recording, or a blocked gate with no demo mode.

use anyhow::{Result, anyhow};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::args::CompassOptions;
use crate::common::constants::COMPASS_POLL_INTERVAL_MS;
use crate::config::Config;
use crate::heading::HeadingSource;
use crate::permission::PermissionState;
use crate::providers::{
    FixedLocationProvider, NoOrientation, OrientationProvider, PermissionMode,
    ReplayOrientationProvider,
};
use crate::session::{QiblaSession, QiblaSnapshot};
use crate::signals::setup_signal_handler;
use crate::time_source::RealTimeSource;

/// Why the compass loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Deadline,
    Signal,
    RecordingFinished,
    NoHeadingSource,
}

impl StopReason {
    fn describe(&self) -> &'static str {
        match self {
            StopReason::Deadline => "duration elapsed",
            StopReason::Signal => "interrupted",
            StopReason::RecordingFinished => "recording finished",
            StopReason::NoHeadingSource => "no compass and demo mode not enabled",
        }
    }
}

/// Decide whether the loop should stop after a pump.
///
/// `replay_done` must be sampled before the pump so every event emitted ahead
/// of the flag has already been processed.
pub fn stop_reason(
    snapshot: &QiblaSnapshot,
    replay_done: bool,
    demo_available: bool,
) -> Option<StopReason> {
    if snapshot.permission_state.is_blocked() && !snapshot.using_fallback && !demo_available {
        return Some(StopReason::NoHeadingSource);
    }
    if replay_done && snapshot.heading_source.is_some_and(|source| source.is_real()) {
        return Some(StopReason::RecordingFinished);
    }
    None
}

/// Handle the compass command from the CLI.
pub fn handle_compass_command(options: &CompassOptions, debug_enabled: bool) -> Result<()> {
    let config = Config::load()?;
    if !options.json {
        config.log_config();
    }
    let settings = config.engine_settings()?;
    let location = super::resolve_location(options.latitude, options.longitude, &config)?;

    let (orientation, replay_finished) = build_orientation(options)?;

    let mut session = QiblaSession::new(settings, orientation, Arc::new(RealTimeSource))
        .with_debug(debug_enabled);

    let mut location_provider = FixedLocationProvider::new(location);
    session
        .locate(&mut location_provider, &config.fix_options())
        .map_err(|e| {
            anyhow!("{e}. Pass --lat/--lon or set latitude and longitude in qibla.toml")
        })?;

    if session.permission_state() == PermissionState::NotRequested {
        session.request_permission();
    }

    let signal_state = setup_signal_handler(debug_enabled)?;
    let deadline = options
        .duration_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));

    let mut demo_started = false;
    let mut last_printed: Option<QiblaSnapshot> = None;

    let reason = loop {
        if !signal_state.is_running() {
            break StopReason::Signal;
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            break StopReason::Deadline;
        }

        let replay_done = replay_finished
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst));
        session.pump_timeout(Duration::from_millis(COMPASS_POLL_INTERVAL_MS));

        if options.demo && !demo_started && session.permission_state().is_blocked() {
            demo_started = session.enable_demo_mode();
        }

        let snapshot = session.snapshot();
        if last_printed.as_ref() != Some(&snapshot) {
            print_snapshot(&snapshot, options.json)?;
            last_printed = Some(snapshot.clone());
        }

        if let Some(reason) = stop_reason(&snapshot, replay_done, demo_started) {
            break reason;
        }
    };

    session.teardown();

    log_block_start!("Compass stopped: {}", reason.describe());
    log_indented!("Alignment entries: {}", session.alignment_entries());
    log_end!();

    Ok(())
}

type ReplayFinished = Option<Arc<AtomicBool>>;

fn build_orientation(
    options: &CompassOptions,
) -> Result<(Box<dyn OrientationProvider>, ReplayFinished)> {
    let Some(path) = &options.replay else {
        return Ok((Box::new(NoOrientation), None));
    };

    let mode = options.permission.unwrap_or(PermissionMode::None);
    let provider = ReplayOrientationProvider::load(Path::new(path), mode)?;
    if provider.is_empty() {
        log_warning!("Recording contains no events");
    }
    let finished = provider.finished_flag();
    Ok((Box::new(provider), Some(finished)))
}

fn print_snapshot(snapshot: &QiblaSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }

    if snapshot.alignment_just_entered {
        log_block_start!("Facing the Qibla");
    }

    let Some(heading) = snapshot.heading_degrees else {
        return Ok(());
    };
    let source = snapshot
        .heading_source
        .map(|source| source.as_str())
        .unwrap_or(HeadingSource::Simulated.as_str());

    match (snapshot.accuracy_degrees, snapshot.guidance()) {
        (Some(accuracy), Some(guidance)) => log_decorated!(
            "Heading {:.1}° ({}), off by {:.1}°: {}",
            heading,
            source,
            accuracy,
            guidance
        ),
        _ => log_decorated!("Heading {:.1}° ({})", heading, source),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(permission_state: PermissionState) -> QiblaSnapshot {
        QiblaSnapshot {
            heading_degrees: None,
            heading_source: None,
            qibla_bearing_degrees: Some(61.1),
            qibla_direction: Some("NE"),
            distance_km: Some(98),
            accuracy_degrees: None,
            accuracy_band: None,
            aligned: false,
            alignment_just_entered: false,
            permission_state,
            using_fallback: false,
            has_location: true,
            location_error: None,
            fix_quality: None,
        }
    }

    #[test]
    fn test_blocked_gate_without_demo_stops() {
        let snap = snapshot(PermissionState::Unsupported);
        assert_eq!(
            stop_reason(&snap, false, false),
            Some(StopReason::NoHeadingSource)
        );
        assert_eq!(stop_reason(&snap, false, true), None);

        let denied = snapshot(PermissionState::Denied);
        assert_eq!(
            stop_reason(&denied, false, false),
            Some(StopReason::NoHeadingSource)
        );
    }

    #[test]
    fn test_waiting_for_permission_keeps_running() {
        let snap = snapshot(PermissionState::Requesting);
        assert_eq!(stop_reason(&snap, false, false), None);
    }

    #[test]
    fn test_finished_recording_stops_after_real_heading() {
        let mut snap = snapshot(PermissionState::Granted);
        assert_eq!(stop_reason(&snap, true, false), None);

        snap.heading_degrees = Some(60.0);
        snap.heading_source = Some(HeadingSource::TrueNorthSensor);
        assert_eq!(stop_reason(&snap, false, false), None);
        assert_eq!(
            stop_reason(&snap, true, false),
            Some(StopReason::RecordingFinished)
        );
    }

    #[test]
    fn test_fallback_heading_does_not_end_recording() {
        let mut snap = snapshot(PermissionState::Granted);
        snap.heading_degrees = Some(10.0);
        snap.heading_source = Some(HeadingSource::Simulated);
        snap.using_fallback = true;
        assert_eq!(stop_reason(&snap, true, false), None);
    }

    #[test]
    fn test_no_replay_uses_no_orientation() {
        let (provider, finished) = build_orientation(&CompassOptions::default()).unwrap();
        assert!(!provider.is_supported());
        assert!(finished.is_none());
    }

    #[test]
    fn test_missing_recording_fails() {
        let options = CompassOptions {
            replay: Some("/nonexistent/qibla/recording.jsonl".to_string()),
            ..CompassOptions::default()
        };
        assert!(build_orientation(&options).is_err());
    }
}
