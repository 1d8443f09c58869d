//! Event channel plumbing shared by the session and its producers.
//!
//! Every asynchronous producer (the orientation subscription, the permission
//! prompt and the fallback simulator) posts into one `mpsc` channel owned by
//! the session. The session drains it on its own thread, so engine state is only
//! ever touched serially.

use std::sync::mpsc::Sender;

use crate::heading::{HeadingSample, RawOrientationEvent};
use crate::permission::{PermissionDecision, RequestId};

/// Everything that can arrive on the session channel.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A raw event from the platform orientation stream.
    Orientation(RawOrientationEvent),
    /// A synthetic heading from the fallback simulator.
    SimulatedHeading(HeadingSample),
    /// The platform answered permission prompt `request`.
    PermissionResolved {
        request: RequestId,
        decision: PermissionDecision,
    },
}

/// Sending half handed to orientation providers.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<SessionEvent>,
}

impl EventSink {
    pub(crate) fn new(tx: Sender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// Deliver one raw orientation event. Returns `false` once the session is
    /// gone, which producers treat as a signal to stop.
    pub fn emit(&self, event: RawOrientationEvent) -> bool {
        self.tx.send(SessionEvent::Orientation(event)).is_ok()
    }

    pub(crate) fn emit_simulated(&self, sample: HeadingSample) -> bool {
        self.tx.send(SessionEvent::SimulatedHeading(sample)).is_ok()
    }
}

/// One-shot reply channel for a permission prompt.
///
/// `resolve` consumes the responder, so a prompt can be answered at most once.
#[derive(Debug)]
pub struct PermissionResponder {
    request: RequestId,
    tx: Sender<SessionEvent>,
}

impl PermissionResponder {
    pub(crate) fn new(request: RequestId, tx: Sender<SessionEvent>) -> Self {
        Self { request, tx }
    }

    pub fn request_id(&self) -> RequestId {
        self.request
    }

    pub fn resolve(self, decision: PermissionDecision) {
        // A closed channel means the session was torn down; nobody is waiting
        let _ = self.tx.send(SessionEvent::PermissionResolved {
            request: self.request,
            decision,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_sink_reports_closed_channel() {
        let (tx, rx) = channel();
        let sink = EventSink::new(tx);

        assert!(sink.emit(RawOrientationEvent::with_alpha(1.0)));
        drop(rx);
        assert!(!sink.emit(RawOrientationEvent::with_alpha(2.0)));
    }

    #[test]
    fn test_responder_carries_request_id() {
        let (tx, rx) = channel();
        let responder = PermissionResponder::new(RequestId(7), tx);
        assert_eq!(responder.request_id(), RequestId(7));

        responder.resolve(PermissionDecision::Denied);
        match rx.try_recv().unwrap() {
            SessionEvent::PermissionResolved { request, decision } => {
                assert_eq!(request, RequestId(7));
                assert_eq!(decision, PermissionDecision::Denied);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
