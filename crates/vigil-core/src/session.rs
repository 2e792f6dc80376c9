//! Registration session state machine.
//!
//! One session per wizard run: name a person, capture a fixed number of
//! reference photos, confirm the save. The backend owns the captured
//! encodings; this type only tracks the step, the capture progress
//! reported by the server, and the auto-capture gate.

use thiserror::Error;

/// Number of reference photos a registration needs by default.
pub const DEFAULT_CAPTURE_TARGET: usize = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("a name is required to start a registration")]
    EmptyName,
    #[error("a registration is already in progress")]
    AlreadyStarted,
}

/// Wizard steps, in order. Transitions are strictly forward except for
/// cancel/reset, which return to `NameEntry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    NameEntry,
    Capturing,
    ReadyToSave,
    Success,
}

/// Visual state of one capture slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Pending,
    Captured,
}

#[derive(Debug)]
pub struct RegistrationSession {
    step: WizardStep,
    name: String,
    captured: usize,
    target: usize,
    slots: Vec<Slot>,
    auto_capturing: bool,
}

impl RegistrationSession {
    pub fn new(target: usize) -> Self {
        Self {
            step: WizardStep::NameEntry,
            name: String::new(),
            captured: 0,
            target,
            slots: vec![Slot::Pending; target],
            auto_capturing: false,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn captured(&self) -> usize {
        self.captured
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn auto_capturing(&self) -> bool {
        self.auto_capturing
    }

    /// Begin a session for `name` (trimmed, must be non-empty) and move to
    /// the capture step.
    pub fn start(&mut self, name: &str) -> Result<(), SessionError> {
        if self.step != WizardStep::NameEntry {
            return Err(SessionError::AlreadyStarted);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        self.name = name.to_string();
        self.step = WizardStep::Capturing;
        Ok(())
    }

    /// Record a server-confirmed capture. `count` is the server's total for
    /// the session; the local count never decreases and never exceeds the
    /// target. Returns `true` on the single call that moves the session to
    /// `ReadyToSave`.
    pub fn record_capture(&mut self, count: usize, complete: bool) -> bool {
        if self.step != WizardStep::Capturing {
            return false;
        }
        let clamped = count.min(self.target);
        if clamped > self.captured {
            self.captured = clamped;
        }
        for slot in &mut self.slots[..self.captured] {
            *slot = Slot::Captured;
        }
        if complete || self.captured >= self.target {
            self.step = WizardStep::ReadyToSave;
            self.auto_capturing = false;
            return true;
        }
        false
    }

    /// Gate for the automatic-capture loop. Only meaningful while capturing;
    /// the loop consults this between awaited steps.
    pub fn set_auto(&mut self, enabled: bool) {
        self.auto_capturing = enabled && self.step == WizardStep::Capturing;
    }

    /// Abort the session: capture progress and slots reset, back to name
    /// entry. The name is kept so the operator can restart without
    /// retyping it.
    pub fn cancel(&mut self) {
        self.captured = 0;
        self.slots.fill(Slot::Pending);
        self.auto_capturing = false;
        self.step = WizardStep::NameEntry;
    }

    /// Mark the session committed server-side. No-op unless the session is
    /// ready to save; returns whether the transition happened.
    pub fn mark_saved(&mut self) -> bool {
        if self.step != WizardStep::ReadyToSave {
            return false;
        }
        self.step = WizardStep::Success;
        true
    }

    /// Clear everything for a fresh registration.
    pub fn reset(&mut self) {
        self.cancel();
        self.name.clear();
    }
}

impl Default for RegistrationSession {
    fn default() -> Self {
        Self::new(DEFAULT_CAPTURE_TARGET)
    }
}
