//! Orientation provider that replays recorded sensor events.
//!
//! Recordings are JSON-lines files, one raw event per line:
//!
//! ```text
//! {"alpha": 300.2, "beta": 1.5, "gamma": -0.4, "delay_ms": 100}
//! {"alpha": 299.8, "compass_heading": 61.4}
//! {"beta": 2.0}
//! ```
//!
//! `delay_ms` is the pause before the event is delivered (100 ms when absent).
//! Blank lines and lines starting with `#` are ignored. The permission
//! behaviour of the simulated platform is chosen with [`PermissionMode`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::thread;
use std::time::Duration;

use super::{OrientationProvider, Subscription};
use crate::common::utils::private_path;
use crate::events::{EventSink, PermissionResponder};
use crate::heading::RawOrientationEvent;
use crate::permission::PermissionDecision;

const DEFAULT_REPLAY_DELAY_MS: u64 = 100;

/// How the replayed platform behaves when asked for orientation access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionMode {
    /// No permission concept; events flow as soon as the session starts.
    None,
    /// A prompt exists and the user accepts it.
    Grant,
    /// A prompt exists and the user refuses it.
    Deny,
    /// No orientation API at all.
    Unsupported,
}

impl PermissionMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(PermissionMode::None),
            "granted" | "grant" => Some(PermissionMode::Grant),
            "denied" | "deny" => Some(PermissionMode::Deny),
            "unsupported" => Some(PermissionMode::Unsupported),
            _ => None,
        }
    }
}

/// One line of a recording.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayRecord {
    #[serde(flatten)]
    pub event: RawOrientationEvent,
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

impl ReplayRecord {
    fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.unwrap_or(DEFAULT_REPLAY_DELAY_MS))
    }
}

pub struct ReplayOrientationProvider {
    records: Arc<Vec<ReplayRecord>>,
    mode: PermissionMode,
    finished: Arc<AtomicBool>,
}

impl ReplayOrientationProvider {
    pub fn new(records: Vec<ReplayRecord>, mode: PermissionMode) -> Self {
        Self {
            records: Arc::new(records),
            mode,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Load a JSON-lines recording.
    pub fn load(path: &Path, mode: PermissionMode) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recording {}", private_path(path)))?;
        let records = parse_recording(&content)
            .with_context(|| format!("Failed to parse recording {}", private_path(path)))?;
        Ok(Self::new(records, mode))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Flag set once every recorded event has been delivered.
    pub fn finished_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.finished)
    }
}

/// Parse JSON-lines content into records.
pub fn parse_recording(content: &str) -> Result<Vec<ReplayRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid event on line {}", index + 1))
        })
        .collect()
}

impl OrientationProvider for ReplayOrientationProvider {
    fn is_supported(&self) -> bool {
        self.mode != PermissionMode::Unsupported
    }

    fn requires_permission(&self) -> bool {
        matches!(self.mode, PermissionMode::Grant | PermissionMode::Deny)
    }

    fn request_permission(&mut self, responder: PermissionResponder) {
        let decision = match self.mode {
            PermissionMode::Deny => PermissionDecision::Denied,
            _ => PermissionDecision::Granted,
        };
        // Answer from another thread, the way a platform prompt would
        thread::spawn(move || responder.resolve(decision));
    }

    fn subscribe(&mut self, sink: EventSink) -> Result<Subscription> {
        if !self.is_supported() {
            anyhow::bail!("orientation events are not supported by this recording");
        }

        let records = Arc::clone(&self.records);
        let finished = Arc::clone(&self.finished);
        let (stop_tx, stop_rx) = channel::<()>();

        let handle = thread::spawn(move || {
            for record in records.iter() {
                match stop_rx.recv_timeout(record.delay()) {
                    Err(RecvTimeoutError::Timeout) => {
                        if !sink.emit(record.event) {
                            return;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                }
            }
            finished.store(true, Ordering::SeqCst);
        });

        Ok(Subscription::new(move || {
            let _ = stop_tx.send(());
            let _ = handle.join();
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SessionEvent;

    #[test]
    fn test_parse_recording() {
        let content = r#"
# recorded on a phone lying flat
{"alpha": 300.0, "delay_ms": 5}
{"compass_heading": 61.0}

{"beta": 2.0}
"#;
        let records = parse_recording(content).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].event.alpha, Some(300.0));
        assert_eq!(records[0].delay(), Duration::from_millis(5));
        assert_eq!(records[1].event.compass_heading, Some(61.0));
        assert_eq!(records[1].delay(), Duration::from_millis(DEFAULT_REPLAY_DELAY_MS));
        assert_eq!(records[2].event.alpha, None);
    }

    #[test]
    fn test_parse_recording_reports_line() {
        let err = parse_recording("{\"alpha\": 1.0}\nnot json\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn test_permission_modes() {
        assert_eq!(PermissionMode::parse("granted"), Some(PermissionMode::Grant));
        assert_eq!(PermissionMode::parse("none"), Some(PermissionMode::None));
        assert_eq!(PermissionMode::parse("maybe"), None);

        let provider = ReplayOrientationProvider::new(Vec::new(), PermissionMode::Unsupported);
        assert!(!provider.is_supported());
        let provider = ReplayOrientationProvider::new(Vec::new(), PermissionMode::None);
        assert!(provider.is_supported());
        assert!(!provider.requires_permission());
    }

    #[test]
    fn test_replay_delivers_all_events() {
        let records = parse_recording(
            "{\"alpha\": 10.0, \"delay_ms\": 1}\n{\"alpha\": 20.0, \"delay_ms\": 1}\n",
        )
        .unwrap();
        let mut provider = ReplayOrientationProvider::new(records, PermissionMode::None);
        let finished = provider.finished_flag();
        let (tx, rx) = channel();

        let subscription = provider.subscribe(EventSink::new(tx)).unwrap();
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        subscription.cancel();

        assert!(matches!(first, SessionEvent::Orientation(e) if e.alpha == Some(10.0)));
        assert!(matches!(second, SessionEvent::Orientation(e) if e.alpha == Some(20.0)));
        assert!(finished.load(Ordering::SeqCst));
    }

    #[test]
    fn test_cancel_stops_delivery() {
        let records = parse_recording("{\"alpha\": 10.0, \"delay_ms\": 10000}\n").unwrap();
        let mut provider = ReplayOrientationProvider::new(records, PermissionMode::None);
        let (tx, rx) = channel();

        let subscription = provider.subscribe(EventSink::new(tx)).unwrap();
        let started = std::time::Instant::now();
        subscription.cancel();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_denying_platform_answers_prompt() {
        let mut provider = ReplayOrientationProvider::new(Vec::new(), PermissionMode::Deny);
        let (tx, rx) = channel();
        provider.request_permission(PermissionResponder::new(
            crate::permission::RequestId(1),
            tx,
        ));

        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            SessionEvent::PermissionResolved { decision, .. } => {
                assert_eq!(decision, PermissionDecision::Denied)
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
