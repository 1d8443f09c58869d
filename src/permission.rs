//! Orientation permission state machine.
//!
//! ```text
//! NotRequested --request()--------------------> Requesting
//! Requesting   --platform grants--------------> Granted
//! Requesting   --platform denies--------------> Denied
//! NotRequested --no permission concept--------> Granted
//! *            --no orientation API at all----> Unsupported
//! Denied       --explicit user retry----------> Requesting
//! ```
//!
//! Each request carries an id. A reply is only accepted if it answers the
//! request currently in flight, so replies that arrive after teardown or after
//! a newer request are ignored.

use serde::Serialize;

/// Where the permission flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    NotRequested,
    Requesting,
    Granted,
    Denied,
    Unsupported,
}

impl PermissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionState::NotRequested => "not requested",
            PermissionState::Requesting => "requesting",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
            PermissionState::Unsupported => "unsupported",
        }
    }

    /// States from which only demo mode can produce headings.
    pub fn is_blocked(&self) -> bool {
        matches!(self, PermissionState::Denied | PermissionState::Unsupported)
    }
}

/// The platform's answer to a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionDecision {
    Granted,
    Denied,
}

/// Identifier of one permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

/// What the gate's caller should do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// Ask the platform; the reply must carry this id.
    Prompt(RequestId),
    /// Access is available now; start the orientation subscription.
    Subscribe,
    /// Nothing changed.
    None,
}

#[derive(Debug)]
pub struct PermissionGate {
    state: PermissionState,
    pending: Option<RequestId>,
    next_id: u64,
}

impl Default for PermissionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionGate {
    pub fn new() -> Self {
        Self {
            state: PermissionState::NotRequested,
            pending: None,
            next_id: 1,
        }
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    pub fn is_granted(&self) -> bool {
        self.state == PermissionState::Granted
    }

    /// The platform exposes no orientation API. Terminal from any state.
    pub fn mark_unsupported(&mut self) {
        self.pending = None;
        self.state = PermissionState::Unsupported;
    }

    /// The platform has orientation events but no permission prompt.
    pub fn grant_without_prompt(&mut self) -> GateAction {
        match self.state {
            PermissionState::NotRequested => {
                self.state = PermissionState::Granted;
                GateAction::Subscribe
            }
            _ => GateAction::None,
        }
    }

    /// User asked for access. Starts a prompt from `NotRequested`, or from
    /// `Denied` as an explicit retry. Every other state is left alone.
    pub fn request(&mut self) -> GateAction {
        match self.state {
            PermissionState::NotRequested | PermissionState::Denied => {
                let id = RequestId(self.next_id);
                self.next_id += 1;
                self.pending = Some(id);
                self.state = PermissionState::Requesting;
                GateAction::Prompt(id)
            }
            _ => GateAction::None,
        }
    }

    /// Apply the platform's reply to prompt `id`.
    pub fn resolve(&mut self, id: RequestId, decision: PermissionDecision) -> GateAction {
        if self.state != PermissionState::Requesting || self.pending != Some(id) {
            return GateAction::None;
        }
        self.pending = None;
        match decision {
            PermissionDecision::Granted => {
                self.state = PermissionState::Granted;
                GateAction::Subscribe
            }
            PermissionDecision::Denied => {
                self.state = PermissionState::Denied;
                GateAction::None
            }
        }
    }

    /// Forget the prompt in flight. A late reply will be ignored and the gate
    /// returns to `NotRequested`.
    pub fn cancel_pending(&mut self) {
        if self.pending.take().is_some() && self.state == PermissionState::Requesting {
            self.state = PermissionState::NotRequested;
        }
    }

    pub fn has_pending_request(&self) -> bool {
        self.pending.is_some()
    }
}
