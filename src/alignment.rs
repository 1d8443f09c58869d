//! Alignment tracking between the device heading and the target bearing.
//!
//! The tracker turns a stream of heading samples into two signals:
//!
//! - a continuous **accuracy** (shortest angular distance to the bearing), and
//! - a debounced **aligned** flag with a one-shot *entered* event.
//!
//! Entering alignment fires exactly one event per continuous in-threshold run,
//! however many samples the run contains. Leaving alignment is immediate so
//! feedback clears as soon as the user turns away. Simulated headings never
//! count as aligned.

use serde::Serialize;

use crate::common::constants::{
    ACCURACY_EXCELLENT, ACCURACY_FAIR, ACCURACY_GOOD, ACCURACY_PERFECT,
};
use crate::geo::QiblaSolution;
use crate::heading::HeadingSample;

/// Shortest angular distance between two directions, in `[0, 180]`.
///
/// `accuracy_degrees(350.0, 10.0) == 20.0`: the raw difference of 340° is
/// measured the other way round.
pub fn accuracy_degrees(bearing_degrees: f64, heading_degrees: f64) -> f64 {
    let raw_delta = (bearing_degrees - heading_degrees).abs() % 360.0;
    raw_delta.min(360.0 - raw_delta)
}

/// Result of evaluating one heading sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignmentState {
    pub accuracy_degrees: f64,
    pub aligned: bool,
}

/// What a single sample did to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentUpdate {
    pub state: AlignmentState,
    /// True only on the sample that moved the tracker from not aligned to aligned.
    pub entered: bool,
}

#[derive(Debug)]
pub struct AlignmentTracker {
    threshold_degrees: f64,
    last_alignment: Option<AlignmentState>,
    is_aligned: bool,
    has_ever_aligned: bool,
    entries: u64,
}

impl AlignmentTracker {
    pub fn new(threshold_degrees: f64) -> Self {
        Self {
            threshold_degrees,
            last_alignment: None,
            is_aligned: false,
            has_ever_aligned: false,
            entries: 0,
        }
    }

    /// Evaluate a heading sample against the solution.
    ///
    /// Callers must hold a `QiblaSolution` before feeding samples; the session
    /// withholds orientation processing until a location fix exists.
    pub fn on_new_heading(
        &mut self,
        sample: &HeadingSample,
        solution: &QiblaSolution,
    ) -> AlignmentUpdate {
        let accuracy = accuracy_degrees(solution.bearing_degrees, sample.degrees);
        let candidate = accuracy < self.threshold_degrees;
        let aligned_now = candidate && sample.source.is_real();

        let entered = aligned_now && !self.is_aligned;
        if entered {
            self.has_ever_aligned = true;
            self.entries += 1;
        }
        self.is_aligned = aligned_now;

        let state = AlignmentState {
            accuracy_degrees: accuracy,
            aligned: aligned_now,
        };
        self.last_alignment = Some(state);

        AlignmentUpdate { state, entered }
    }

    pub fn last_alignment(&self) -> Option<AlignmentState> {
        self.last_alignment
    }

    pub fn is_aligned(&self) -> bool {
        self.is_aligned
    }

    pub fn has_ever_aligned(&self) -> bool {
        self.has_ever_aligned
    }

    /// Number of alignment-entered events emitted so far.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    pub fn threshold(&self) -> f64 {
        self.threshold_degrees
    }

    /// Forget the current run. Used when the location fix, and therefore the
    /// bearing, changes.
    pub fn reset(&mut self) {
        self.last_alignment = None;
        self.is_aligned = false;
    }
}

/// Coarse feedback band for an accuracy value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyBand {
    Perfect,
    Excellent,
    Good,
    Fair,
    Adjust,
}

impl AccuracyBand {
    pub fn from_accuracy(accuracy_degrees: f64) -> Self {
        if accuracy_degrees <= ACCURACY_PERFECT {
            AccuracyBand::Perfect
        } else if accuracy_degrees <= ACCURACY_EXCELLENT {
            AccuracyBand::Excellent
        } else if accuracy_degrees <= ACCURACY_GOOD {
            AccuracyBand::Good
        } else if accuracy_degrees <= ACCURACY_FAIR {
            AccuracyBand::Fair
        } else {
            AccuracyBand::Adjust
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AccuracyBand::Perfect => "Perfect! You are facing the Qibla",
            AccuracyBand::Excellent => "Excellent! Almost aligned with the Qibla",
            AccuracyBand::Good => "Good! Rotate to align with the Qibla",
            AccuracyBand::Fair => "Fair! Turn towards the Qibla direction",
            AccuracyBand::Adjust => "Adjust! Rotate to align with the Qibla",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heading::HeadingSource;
    use chrono::Local;

    fn solution(bearing: f64) -> QiblaSolution {
        QiblaSolution {
            bearing_degrees: bearing,
            distance_km: 1000,
        }
    }

    fn sample(degrees: f64, source: HeadingSource) -> HeadingSample {
        HeadingSample::new(degrees, source, Local::now())
    }

    fn real(degrees: f64) -> HeadingSample {
        sample(degrees, HeadingSource::TrueNorthSensor)
    }

    #[test]
    fn test_accuracy_wraparound() {
        assert_eq!(accuracy_degrees(350.0, 10.0), 20.0);
        assert_eq!(accuracy_degrees(10.0, 350.0), 20.0);
        assert_eq!(accuracy_degrees(0.0, 180.0), 180.0);
        assert_eq!(accuracy_degrees(90.0, 90.0), 0.0);
        assert_eq!(accuracy_degrees(61.0, 241.0), 180.0);
    }

    #[test]
    fn test_single_entry_event_per_run() {
        let mut tracker = AlignmentTracker::new(10.0);
        let qibla = solution(61.1);

        let entered: usize = (0..50)
            .map(|i| real(61.1 + (i % 5) as f64))
            .filter(|s| tracker.on_new_heading(s, &qibla).entered)
            .count();

        assert_eq!(entered, 1);
        assert!(tracker.is_aligned());
        assert_eq!(tracker.entries(), 1);
    }

    #[test]
    fn test_exit_is_immediate_and_reentry_fires_again() {
        let mut tracker = AlignmentTracker::new(10.0);
        let qibla = solution(100.0);

        assert!(tracker.on_new_heading(&real(101.0), &qibla).entered);

        let away = tracker.on_new_heading(&real(111.0), &qibla);
        assert!(!away.state.aligned);
        assert!(!away.entered);

        let back = tracker.on_new_heading(&real(99.0), &qibla);
        assert!(back.entered);
        assert_eq!(tracker.entries(), 2);
        assert!(tracker.has_ever_aligned());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut tracker = AlignmentTracker::new(10.0);
        let qibla = solution(0.0);

        let update = tracker.on_new_heading(&real(10.0), &qibla);
        assert_eq!(update.state.accuracy_degrees, 10.0);
        assert!(!update.state.aligned);

        let update = tracker.on_new_heading(&real(9.99), &qibla);
        assert!(update.state.aligned);
    }

    #[test]
    fn test_simulated_never_aligns() {
        let mut tracker = AlignmentTracker::new(10.0);
        let qibla = solution(200.0);

        let update = tracker.on_new_heading(&sample(200.0, HeadingSource::Simulated), &qibla);
        assert_eq!(update.state.accuracy_degrees, 0.0);
        assert!(!update.state.aligned);
        assert!(!update.entered);
        assert!(!tracker.has_ever_aligned());
    }

    #[test]
    fn test_simulated_sample_clears_alignment() {
        let mut tracker = AlignmentTracker::new(10.0);
        let qibla = solution(200.0);

        tracker.on_new_heading(&real(200.0), &qibla);
        assert!(tracker.is_aligned());

        tracker.on_new_heading(&sample(200.0, HeadingSource::Simulated), &qibla);
        assert!(!tracker.is_aligned());
    }

    #[test]
    fn test_magnetic_source_counts_as_real() {
        let mut tracker = AlignmentTracker::new(10.0);
        let update = tracker.on_new_heading(
            &sample(45.0, HeadingSource::MagneticNorthSensor),
            &solution(50.0),
        );
        assert!(update.entered);
    }

    #[test]
    fn test_reset_allows_new_entry() {
        let mut tracker = AlignmentTracker::new(10.0);
        let qibla = solution(30.0);
        tracker.on_new_heading(&real(30.0), &qibla);

        tracker.reset();
        assert!(tracker.last_alignment().is_none());
        assert!(tracker.on_new_heading(&real(30.0), &qibla).entered);
    }

    #[test]
    fn test_accuracy_bands() {
        assert_eq!(AccuracyBand::from_accuracy(0.0), AccuracyBand::Perfect);
        assert_eq!(AccuracyBand::from_accuracy(5.0), AccuracyBand::Perfect);
        assert_eq!(AccuracyBand::from_accuracy(7.5), AccuracyBand::Excellent);
        assert_eq!(AccuracyBand::from_accuracy(20.0), AccuracyBand::Good);
        assert_eq!(AccuracyBand::from_accuracy(30.0), AccuracyBand::Fair);
        assert_eq!(AccuracyBand::from_accuracy(120.0), AccuracyBand::Adjust);
    }
}
