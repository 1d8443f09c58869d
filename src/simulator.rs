//! Synthetic rotating heading for demo and no-sensor situations.
//!
//! When no real orientation data can be obtained the compass still needs
//! something to show. The simulator runs a worker thread that, on every tick,
//! advances an angle by a fixed step (wrapping at 360°) and posts it to the
//! session as a `Simulated` heading sample.
//!
//! Lifecycle:
//!
//! ```text
//! Idle --start()--> Running --retire()--> Retired
//! Idle --retire()-----------------------> Retired
//! ```
//!
//! `Retired` is final: once a real sample has been seen, or the owning session
//! is torn down, the simulator never starts again. Retiring stops the worker
//! and joins it before returning, so no timer outlives the session.

use std::sync::Arc;
use std::sync::mpsc::{RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::common::utils::normalize_degrees;
use crate::events::EventSink;
use crate::heading::{HeadingSample, HeadingSource};
use crate::time_source::TimeSource;

/// Next simulated angle after one tick.
pub fn advance_angle(angle: f64, step_degrees: f64) -> f64 {
    normalize_degrees(angle + step_degrees)
}

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

enum SimulatorState {
    Idle,
    Running(Worker),
    Retired,
}

pub struct FallbackSimulator {
    step_degrees: f64,
    tick: Duration,
    state: SimulatorState,
}

impl FallbackSimulator {
    pub fn new(step_degrees: f64, tick: Duration) -> Self {
        Self {
            step_degrees,
            tick,
            state: SimulatorState::Idle,
        }
    }

    /// Start emitting samples from `start_angle`. Returns `false` if the
    /// simulator is already running or has been retired.
    pub fn start(
        &mut self,
        sink: EventSink,
        clock: Arc<dyn TimeSource>,
        start_angle: f64,
    ) -> bool {
        if !matches!(self.state, SimulatorState::Idle) {
            return false;
        }

        let (stop_tx, stop_rx) = channel::<()>();
        let step = self.step_degrees;
        let tick = self.tick;

        let handle = thread::spawn(move || {
            let mut angle = normalize_degrees(start_angle);
            loop {
                match stop_rx.recv_timeout(tick) {
                    Err(RecvTimeoutError::Timeout) => {
                        angle = advance_angle(angle, step);
                        let sample = HeadingSample::new(angle, HeadingSource::Simulated, clock.now());
                        if !sink.emit_simulated(sample) {
                            break;
                        }
                    }
                    // Stop requested, or the simulator itself was dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        self.state = SimulatorState::Running(Worker { stop_tx, handle });
        true
    }

    /// Stop for good. Joins the worker if one is running.
    pub fn retire(&mut self) {
        let previous = std::mem::replace(&mut self.state, SimulatorState::Retired);
        if let SimulatorState::Running(worker) = previous {
            let _ = worker.stop_tx.send(());
            let _ = worker.handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SimulatorState::Running(_))
    }

    pub fn is_retired(&self) -> bool {
        matches!(self.state, SimulatorState::Retired)
    }
}

impl Drop for FallbackSimulator {
    fn drop(&mut self) {
        self.retire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SessionEvent;
    use crate::time_source::RealTimeSource;
    use std::sync::mpsc::Receiver;

    fn collect_samples(rx: &Receiver<SessionEvent>) -> Vec<HeadingSample> {
        rx.try_iter()
            .filter_map(|event| match event {
                SessionEvent::SimulatedHeading(sample) => Some(sample),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_advance_angle_wraps() {
        assert_eq!(advance_angle(0.0, 1.0), 1.0);
        assert_eq!(advance_angle(359.5, 1.0), 0.5);
        assert_eq!(advance_angle(359.0, 1.0), 0.0);
    }

    #[test]
    fn test_emits_increasing_simulated_samples() {
        let (tx, rx) = channel();
        let mut simulator = FallbackSimulator::new(2.0, Duration::from_millis(5));

        assert!(simulator.start(EventSink::new(tx), Arc::new(RealTimeSource), 0.0));
        assert!(simulator.is_running());
        thread::sleep(Duration::from_millis(60));
        simulator.retire();

        let samples = collect_samples(&rx);
        assert!(samples.len() >= 2, "expected several ticks, got {}", samples.len());
        assert!(samples.iter().all(|s| s.source == HeadingSource::Simulated));
        assert_eq!(samples[0].degrees, 2.0);
        assert_eq!(samples[1].degrees, 4.0);
    }

    #[test]
    fn test_no_samples_after_retire() {
        let (tx, rx) = channel();
        let mut simulator = FallbackSimulator::new(1.0, Duration::from_millis(5));
        simulator.start(EventSink::new(tx), Arc::new(RealTimeSource), 0.0);
        thread::sleep(Duration::from_millis(20));

        simulator.retire();
        let _ = collect_samples(&rx);

        thread::sleep(Duration::from_millis(30));
        assert!(collect_samples(&rx).is_empty());
        assert!(simulator.is_retired());
    }

    #[test]
    fn test_never_restarts_after_retire() {
        let (tx, _rx) = channel();
        let mut simulator = FallbackSimulator::new(1.0, Duration::from_millis(5));
        simulator.retire();

        assert!(!simulator.start(EventSink::new(tx), Arc::new(RealTimeSource), 0.0));
        assert!(!simulator.is_running());
    }

    #[test]
    fn test_double_start_is_rejected() {
        let (tx, _rx) = channel();
        let mut simulator = FallbackSimulator::new(1.0, Duration::from_millis(50));
        let sink = EventSink::new(tx);

        assert!(simulator.start(sink.clone(), Arc::new(RealTimeSource), 0.0));
        assert!(!simulator.start(sink, Arc::new(RealTimeSource), 0.0));
    }

    #[test]
    fn test_worker_exits_when_session_channel_closes() {
        let (tx, rx) = channel();
        let mut simulator = FallbackSimulator::new(1.0, Duration::from_millis(5));
        simulator.start(EventSink::new(tx), Arc::new(RealTimeSource), 0.0);

        drop(rx);
        thread::sleep(Duration::from_millis(20));
        // retire must still join cleanly
        simulator.retire();
        assert!(simulator.is_retired());
    }
}
