//! Collaborator interfaces: where location fixes and orientation events come from.
//!
//! The engine never talks to hardware directly. A session is handed one
//! `LocationProvider` and one `OrientationProvider`; the adapters in this
//! module cover the terminal use cases:
//!
//! - [`fixed`]: a location fix from configuration or command-line coordinates
//! - [`replay`]: orientation events replayed from a recorded JSON-lines file
//! - [`NoOrientation`]: a platform with no orientation API at all

pub mod fixed;
pub mod replay;

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::common::constants::{
    DEFAULT_HIGH_ACCURACY, DEFAULT_LOCATION_MAX_AGE_MS, DEFAULT_LOCATION_TIMEOUT_MS,
};
use crate::events::{EventSink, PermissionResponder};
use crate::geo::GeoCoordinate;

pub use fixed::FixedLocationProvider;
pub use replay::{PermissionMode, ReplayOrientationProvider};

/// Options for a one-shot location request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixOptions {
    pub high_accuracy: bool,
    /// Give up after this long.
    pub timeout: Duration,
    /// Accept a cached fix no older than this.
    pub max_age: Duration,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            high_accuracy: DEFAULT_HIGH_ACCURACY,
            timeout: Duration::from_millis(DEFAULT_LOCATION_TIMEOUT_MS),
            max_age: Duration::from_millis(DEFAULT_LOCATION_MAX_AGE_MS),
        }
    }
}

/// A location fix with its reported horizontal accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationFix {
    pub coordinate: GeoCoordinate,
    /// Radius of the 68% confidence circle in meters, when known.
    pub accuracy_meters: Option<f64>,
}

/// Why a location request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    PermissionDenied,
    Unavailable,
    Timeout,
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::PermissionDenied => write!(f, "location permission was denied"),
            LocationError::Unavailable => write!(f, "location is unavailable"),
            LocationError::Timeout => write!(f, "location request timed out"),
        }
    }
}

impl std::error::Error for LocationError {}

/// Source of the user's position.
pub trait LocationProvider {
    /// Request one fix. Called once per screen activation, and again only on
    /// an explicit retry.
    fn current_fix(&mut self, options: &FixOptions) -> Result<LocationFix, LocationError>;
}

/// Source of raw orientation events.
pub trait OrientationProvider: Send {
    /// Whether the platform exposes orientation events at all.
    fn is_supported(&self) -> bool;

    /// Whether orientation access is gated behind a permission prompt.
    fn requires_permission(&self) -> bool;

    /// Show the permission prompt. The outcome is reported through
    /// `responder`, at most once, possibly from another thread.
    fn request_permission(&mut self, responder: PermissionResponder);

    /// Begin delivering events to `sink`. Delivery stops when the returned
    /// subscription is cancelled or dropped.
    fn subscribe(&mut self, sink: EventSink) -> anyhow::Result<Subscription>;
}

/// Handle to an active orientation subscription.
///
/// Unsubscribes exactly once, either on `cancel` or on drop.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn cancel(mut self) {
        self.run_unsubscribe();
    }

    fn run_unsubscribe(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// A platform without any orientation API.
#[derive(Debug, Default)]
pub struct NoOrientation;

impl OrientationProvider for NoOrientation {
    fn is_supported(&self) -> bool {
        false
    }

    fn requires_permission(&self) -> bool {
        false
    }

    fn request_permission(&mut self, responder: PermissionResponder) {
        drop(responder);
    }

    fn subscribe(&mut self, _sink: EventSink) -> anyhow::Result<Subscription> {
        anyhow::bail!("orientation events are not supported on this platform")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscription_unsubscribes_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let subscription = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        subscription.cancel();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_unsubscribes_on_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        {
            let _subscription = Subscription::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_location_error_messages() {
        assert_eq!(
            LocationError::PermissionDenied.to_string(),
            "location permission was denied"
        );
        assert_eq!(LocationError::Timeout.to_string(), "location request timed out");
    }
}
