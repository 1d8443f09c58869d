//! One compass-screen activation: the orchestrator tying the engine together.
//!
//! A `QiblaSession` owns every piece of engine state and one event channel.
//! Producers (the orientation subscription, permission prompts and the fallback
//! simulator) only ever post into that channel; the session drains it on the
//! caller's thread in [`QiblaSession::pump`] / [`QiblaSession::pump_timeout`],
//! so no engine state is shared between threads.
//!
//! ## Lifecycle
//!
//! 1. `new` probes the orientation provider. No API at all makes the gate
//!    `Unsupported`; an API without a permission prompt is granted and
//!    subscribed immediately.
//! 2. `locate` requests one location fix and derives the `QiblaSolution`.
//!    Orientation samples are ignored until a solution exists.
//! 3. `request_permission` shows the platform prompt when one is needed.
//! 4. `pump` processes pending events. When access is granted and a location
//!    fix exists but no real sample arrived within the grace period, the
//!    simulator takes over until the first real sample retires it for good.
//! 5. `teardown` (or drop) cancels the subscription, invalidates a pending
//!    prompt and joins the simulator worker.

mod settings;
mod snapshot;

pub use settings::EngineSettings;
pub use snapshot::QiblaSnapshot;

use chrono::{DateTime, Local};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::time::Duration;

use crate::alignment::{AccuracyBand, AlignmentState, AlignmentTracker};
use crate::events::{EventSink, PermissionResponder, SessionEvent};
use crate::geo::{FixQuality, QiblaSolution, cardinal_direction, format_coordinate, solve};
use crate::heading::{HeadingNormalizer, HeadingSample};
use crate::permission::{GateAction, PermissionDecision, PermissionGate, PermissionState};
use crate::providers::{
    FixOptions, LocationError, LocationFix, LocationProvider, OrientationProvider, Subscription,
};
use crate::simulator::FallbackSimulator;
use crate::time_source::{TimeSource, elapsed_between};

/// Outcome of the most recent location request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationState {
    Pending,
    Fixed {
        fix: LocationFix,
        solution: QiblaSolution,
    },
    Failed(LocationError),
}

pub struct QiblaSession {
    settings: EngineSettings,
    orientation: Box<dyn OrientationProvider>,
    clock: Arc<dyn TimeSource>,
    tx: Sender<SessionEvent>,
    rx: Receiver<SessionEvent>,

    gate: PermissionGate,
    normalizer: HeadingNormalizer,
    tracker: AlignmentTracker,
    simulator: FallbackSimulator,

    location: LocationState,
    fix_options: FixOptions,
    last_heading: Option<HeadingSample>,
    alignment: Option<AlignmentState>,
    alignment_just_entered: bool,

    subscription: Option<Subscription>,
    subscribed_at: Option<DateTime<Local>>,
    real_sample_seen: bool,
    torn_down: bool,
    debug_enabled: bool,
}

impl QiblaSession {
    pub fn new(
        settings: EngineSettings,
        orientation: Box<dyn OrientationProvider>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        let (tx, rx) = channel();

        let mut session = Self {
            settings,
            orientation,
            clock,
            tx,
            rx,
            gate: PermissionGate::new(),
            normalizer: HeadingNormalizer::new(),
            tracker: AlignmentTracker::new(settings.alignment_threshold),
            simulator: FallbackSimulator::new(settings.simulator_step, settings.simulator_tick),
            location: LocationState::Pending,
            fix_options: FixOptions::default(),
            last_heading: None,
            alignment: None,
            alignment_just_entered: false,
            subscription: None,
            subscribed_at: None,
            real_sample_seen: false,
            torn_down: false,
            debug_enabled: false,
        };
        session.probe_orientation();
        session
    }

    /// Emit `[DEBUG]` lines for dropped events and state transitions.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_enabled = enabled;
        self
    }

    fn probe_orientation(&mut self) {
        if !self.orientation.is_supported() {
            self.gate.mark_unsupported();
            log_block_start!("Compass unavailable on this device");
            log_indented!("Demo mode can show a simulated heading");
            return;
        }

        if !self.orientation.requires_permission()
            && self.gate.grant_without_prompt() == GateAction::Subscribe
        {
            self.subscribe();
        }
    }

    // # Location

    /// Request a location fix and derive the solution from it.
    ///
    /// A failure leaves the session without bearing, distance or alignment;
    /// call [`retry_location`](Self::retry_location) to try again.
    pub fn locate(
        &mut self,
        provider: &mut dyn LocationProvider,
        options: &FixOptions,
    ) -> Result<QiblaSolution, LocationError> {
        self.fix_options = *options;
        if self.torn_down {
            return Err(LocationError::Unavailable);
        }

        match provider.current_fix(options) {
            Ok(fix) => {
                let solution = solve(fix.coordinate, self.settings.target);
                let changed = self.solution() != Some(solution);
                self.location = LocationState::Fixed { fix, solution };

                if changed {
                    // A new bearing invalidates the current alignment run
                    self.tracker.reset();
                    self.alignment = None;
                    self.log_solution(&fix, &solution);
                }
                Ok(solution)
            }
            Err(error) => {
                // Keep a previous good fix; the failure only matters without one
                if self.solution().is_none() {
                    self.location = LocationState::Failed(error);
                }
                log_pipe!();
                log_warning!("Location request failed: {error}");
                Err(error)
            }
        }
    }

    /// Request a fresh fix with the options of the last request.
    pub fn retry_location(
        &mut self,
        provider: &mut dyn LocationProvider,
    ) -> Result<QiblaSolution, LocationError> {
        let options = self.fix_options;
        self.locate(provider, &options)
    }

    fn log_solution(&self, fix: &LocationFix, solution: &QiblaSolution) {
        log_block_start!("Location fix acquired");
        log_indented!(
            "{} (accuracy: {})",
            format_coordinate(&fix.coordinate),
            FixQuality::from_accuracy_meters(fix.accuracy_meters).as_str()
        );
        log_decorated!(
            "Qibla bearing {:.1}° ({}), {} km",
            solution.bearing_degrees,
            cardinal_direction(solution.bearing_degrees),
            solution.distance_km
        );
    }

    // # Permission

    /// Ask for orientation access.
    ///
    /// Shows the platform prompt from `NotRequested`, or again after a denial
    /// as an explicit retry. Otherwise does nothing. Returns the gate state
    /// after the call.
    pub fn request_permission(&mut self) -> PermissionState {
        if self.torn_down {
            return self.gate.state();
        }

        match self.gate.request() {
            GateAction::Prompt(id) => {
                if self.debug_enabled {
                    log_debug!("Requesting orientation permission (request {})", id.0);
                }
                let responder = PermissionResponder::new(id, self.tx.clone());
                self.orientation.request_permission(responder);
            }
            GateAction::Subscribe => self.subscribe(),
            GateAction::None => {}
        }
        self.gate.state()
    }

    fn subscribe(&mut self) {
        if self.subscription.is_some() || self.torn_down {
            return;
        }

        match self.orientation.subscribe(EventSink::new(self.tx.clone())) {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                self.subscribed_at = Some(self.clock.now());
                if self.debug_enabled {
                    log_debug!("Subscribed to orientation events");
                }
            }
            Err(e) => {
                log_pipe!();
                log_warning!("Failed to subscribe to orientation events: {e}");
                self.gate.mark_unsupported();
            }
        }
    }

    /// Start the simulator on request when real headings are out of reach.
    ///
    /// Only honoured while the gate is `Denied` or `Unsupported`. Returns
    /// whether a simulator was started.
    pub fn enable_demo_mode(&mut self) -> bool {
        if self.torn_down || !self.gate.state().is_blocked() {
            return false;
        }
        let started = self.start_simulator();
        if started {
            log_block_start!("Demo mode enabled");
            log_indented!("Showing a simulated heading; alignment is not reported");
        }
        started
    }

    fn start_simulator(&mut self) -> bool {
        self.simulator.start(
            EventSink::new(self.tx.clone()),
            Arc::clone(&self.clock),
            0.0,
        )
    }

    // # Event processing

    /// Process every event already queued. Returns the number processed.
    pub fn pump(&mut self) -> usize {
        self.alignment_just_entered = false;
        let mut processed = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.process(event);
            processed += 1;
        }
        self.check_grace_period();
        processed
    }

    /// Wait up to `timeout` for the first event, then behave like `pump`.
    pub fn pump_timeout(&mut self, timeout: Duration) -> usize {
        self.alignment_just_entered = false;
        let mut processed = 0;
        match self.rx.recv_timeout(timeout) {
            Ok(event) => {
                self.process(event);
                processed += 1;
                while let Ok(event) = self.rx.try_recv() {
                    self.process(event);
                    processed += 1;
                }
            }
            // The session holds a sender, so only a timeout can happen here
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {}
        }
        self.check_grace_period();
        processed
    }

    fn process(&mut self, event: SessionEvent) {
        if self.torn_down {
            return;
        }

        match event {
            SessionEvent::Orientation(raw) => {
                if !self.gate.is_granted() {
                    return;
                }
                let Some(sample) = self.normalizer.normalize(&raw, self.clock.now()) else {
                    if self.debug_enabled {
                        log_debug!("Dropped orientation event without heading");
                    }
                    return;
                };
                self.on_real_sample();
                self.apply_heading(sample);
            }
            SessionEvent::SimulatedHeading(sample) => {
                // Ticks queued before the simulator was retired are stale
                if self.simulator.is_running() {
                    self.apply_heading(sample);
                }
            }
            SessionEvent::PermissionResolved { request, decision } => {
                let action = self.gate.resolve(request, decision);
                match (action, decision) {
                    (GateAction::Subscribe, _) => {
                        log_block_start!("Compass access granted");
                        self.subscribe();
                    }
                    (GateAction::None, PermissionDecision::Denied)
                        if self.gate.state() == PermissionState::Denied =>
                    {
                        log_block_start!("Compass access denied");
                        log_indented!("Demo mode can show a simulated heading");
                    }
                    _ => {
                        if self.debug_enabled {
                            log_debug!("Ignored stale permission reply (request {})", request.0);
                        }
                    }
                }
            }
        }
    }

    fn on_real_sample(&mut self) {
        if self.real_sample_seen {
            return;
        }
        self.real_sample_seen = true;
        if self.simulator.is_running() {
            log_block_start!("Compass data received, leaving simulated heading");
        }
        // Retired even when idle so the grace window can never start it later
        self.simulator.retire();
    }

    fn apply_heading(&mut self, sample: HeadingSample) {
        let Some(solution) = self.solution() else {
            return;
        };

        let update = self.tracker.on_new_heading(&sample, &solution);
        self.last_heading = Some(sample);
        self.alignment = Some(update.state);

        if update.entered {
            self.alignment_just_entered = true;
            log_info!(
                "Alignment entered (accuracy {:.1}°)",
                update.state.accuracy_degrees
            );
        }
    }

    fn check_grace_period(&mut self) {
        if self.torn_down
            || self.real_sample_seen
            || !self.gate.is_granted()
            || self.solution().is_none()
            || self.simulator.is_running()
            || self.simulator.is_retired()
        {
            return;
        }
        let Some(subscribed_at) = self.subscribed_at else {
            return;
        };

        if elapsed_between(subscribed_at, self.clock.now()) >= self.settings.grace_period
            && self.start_simulator()
        {
            log_block_start!("No compass data received");
            log_indented!("Falling back to a simulated heading");
        }
    }

    // # Read model

    pub fn snapshot(&self) -> QiblaSnapshot {
        let solution = self.solution();
        let (fix, location_error) = match self.location {
            LocationState::Fixed { fix, .. } => (Some(fix), None),
            LocationState::Failed(error) => (None, Some(error)),
            LocationState::Pending => (None, None),
        };
        let accuracy = self.alignment.map(|state| state.accuracy_degrees);

        QiblaSnapshot {
            heading_degrees: self.last_heading.map(|sample| sample.degrees),
            heading_source: self.last_heading.map(|sample| sample.source),
            qibla_bearing_degrees: solution.map(|s| s.bearing_degrees),
            qibla_direction: solution.map(|s| cardinal_direction(s.bearing_degrees)),
            distance_km: solution.map(|s| s.distance_km),
            accuracy_degrees: accuracy,
            accuracy_band: accuracy.map(AccuracyBand::from_accuracy),
            aligned: self.alignment.is_some_and(|state| state.aligned),
            alignment_just_entered: self.alignment_just_entered,
            permission_state: self.gate.state(),
            using_fallback: self.simulator.is_running(),
            has_location: solution.is_some(),
            location_error,
            fix_quality: fix.map(|f| FixQuality::from_accuracy_meters(f.accuracy_meters)),
        }
    }

    pub fn solution(&self) -> Option<QiblaSolution> {
        match self.location {
            LocationState::Fixed { solution, .. } => Some(solution),
            _ => None,
        }
    }

    pub fn location_state(&self) -> LocationState {
        self.location
    }

    pub fn permission_state(&self) -> PermissionState {
        self.gate.state()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Alignment-entered events emitted over the whole session.
    pub fn alignment_entries(&self) -> u64 {
        self.tracker.entries()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // # Teardown

    /// Release every resource the session holds. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        self.gate.cancel_pending();
        self.simulator.retire();

        // Discard whatever the producers queued before they stopped
        while self.rx.try_recv().is_ok() {}

        if self.debug_enabled {
            log_debug!(
                "Session torn down ({} events without heading dropped)",
                self.normalizer.dropped()
            );
        }
    }
}

impl Drop for QiblaSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
