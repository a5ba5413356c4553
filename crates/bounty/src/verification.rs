//! Simulated bounty verification.
//!
//! A session walks a fixed, linear pipeline:
//!
//! ```text
//! Idle -> Scanning -> CrossReferencing -> Verdict -> (complete) Idle
//! ```
//!
//! Every transition after `Scanning` is delivered as a [`PhaseEvent`] at a
//! fixed offset from session start. Events carry the id of the session that
//! scheduled them; an event whose session is no longer active is discarded.
//! There is no failure branch and no dependence on the evidence content.

use serde::{Deserialize, Serialize};
use tracing::debug;

use foundation::ids::{LocationId, SessionId};
use foundation::time::Time;

use crate::error::Rejected;
use crate::wallet::Credits;

/// Verdict text attached to every approved bounty.
pub const APPROVAL_NOTE: &str = "Data seems consistent with public records.";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Scanning,
    CrossReferencing,
    Verdict,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Scanning => "scanning image",
            Phase::CrossReferencing => "cross-referencing signals",
            Phase::Verdict => "verdict: approved",
        }
    }
}

/// A scheduled transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    CrossReference,
    Verdict,
    Complete,
}

impl Step {
    /// Phase the session must be in for this step to apply.
    fn expected_phase(self) -> Phase {
        match self {
            Step::CrossReference => Phase::Scanning,
            Step::Verdict => Phase::CrossReferencing,
            Step::Complete => Phase::Verdict,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PhaseEvent {
    pub session: SessionId,
    pub step: Step,
}

/// Offsets (seconds from session start) at which each step fires.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeline {
    pub cross_reference_at: f64,
    pub verdict_at: f64,
    pub complete_at: f64,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            cross_reference_at: 1.5,
            verdict_at: 3.0,
            complete_at: 4.0,
        }
    }
}

impl Timeline {
    pub fn validate(&self) -> Result<(), String> {
        let offsets = [self.cross_reference_at, self.verdict_at, self.complete_at];
        if offsets.iter().any(|o| !o.is_finite()) {
            return Err("timeline offsets must be finite".to_string());
        }
        if self.cross_reference_at <= 0.0 {
            return Err("cross_reference_at must be positive".to_string());
        }
        if !(self.cross_reference_at < self.verdict_at && self.verdict_at < self.complete_at) {
            return Err(format!(
                "timeline offsets must be strictly increasing, got {} / {} / {}",
                self.cross_reference_at, self.verdict_at, self.complete_at
            ));
        }
        Ok(())
    }

    /// Absolute due times of every step for a session started at `started_at`.
    pub fn schedule(&self, session: SessionId, started_at: Time) -> [(Time, PhaseEvent); 3] {
        let at = |offset: f64, step: Step| (started_at.after(offset), PhaseEvent { session, step });
        [
            at(self.cross_reference_at, Step::CrossReference),
            at(self.verdict_at, Step::Verdict),
            at(self.complete_at, Step::Complete),
        ]
    }
}

/// Opaque handle to the photo attached to a bounty. Never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceImage(String);

impl EvidenceImage {
    /// Returns `None` for a blank handle.
    pub fn new(handle: impl Into<String>) -> Option<Self> {
        let handle = handle.into();
        if handle.trim().is_empty() {
            None
        } else {
            Some(EvidenceImage(handle))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the user typed into the bounty form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub image: Option<String>,
    pub note: Option<String>,
}

impl Submission {
    pub fn with_image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            note: None,
        }
    }

    pub fn without_image() -> Self {
        Self::default()
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Checks the form and produces the evidence a session holds on to.
    pub fn into_evidence(self) -> Result<Evidence, Rejected> {
        let image = self
            .image
            .and_then(EvidenceImage::new)
            .ok_or(Rejected::MissingEvidence)?;
        let note = self
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(Evidence { image, note })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evidence {
    pub image: EvidenceImage,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub target: LocationId,
    pub started_at: Time,
    pub phase: Phase,
    pub evidence: Evidence,
    /// Fixed when the session starts, from the location's pre-update state.
    pub reward: Credits,
}

/// Payload handed back when a session finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub session: SessionId,
    pub target: LocationId,
    pub reward: Credits,
    pub evidence: Evidence,
    pub started_at: Time,
}

/// Result of delivering one [`PhaseEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// The event belonged to a session that is no longer active.
    Discarded(PhaseEvent),
    Advanced { session: SessionId, phase: Phase },
    Completed(Completion),
}

/// Owns the (at most one) active verification session.
#[derive(Debug, Clone, Default)]
pub struct VerificationMachine {
    timeline: Timeline,
    active: Option<Session>,
    last_id: SessionId,
}

impl VerificationMachine {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            active: None,
            last_id: SessionId(0),
        }
    }

    pub fn phase(&self) -> Phase {
        self.active.as_ref().map_or(Phase::Idle, |s| s.phase)
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    /// Starts a session and returns the events the caller must deliver back
    /// through [`VerificationMachine::apply`] at their due times.
    ///
    /// Eligibility (selected, stale) is the caller's concern; this only
    /// enforces that a single session runs at a time.
    pub fn start(
        &mut self,
        target: LocationId,
        evidence: Evidence,
        reward: Credits,
        now: Time,
    ) -> Result<(SessionId, [(Time, PhaseEvent); 3]), Rejected> {
        if let Some(active) = &self.active {
            return Err(Rejected::SessionInFlight(active.id));
        }
        let id = self.last_id.next();
        self.last_id = id;
        self.active = Some(Session {
            id,
            target,
            started_at: now,
            phase: Phase::Scanning,
            evidence,
            reward,
        });
        debug!(session = %id, %target, "verification scanning");
        Ok((id, self.timeline.schedule(id, now)))
    }

    pub fn apply(&mut self, event: PhaseEvent) -> Applied {
        let Some(session) = self.active.as_mut() else {
            return Applied::Discarded(event);
        };
        if session.id != event.session || session.phase != event.step.expected_phase() {
            return Applied::Discarded(event);
        }

        let next = match event.step {
            Step::CrossReference => Some(Phase::CrossReferencing),
            Step::Verdict => Some(Phase::Verdict),
            Step::Complete => None,
        };
        if let Some(phase) = next {
            session.phase = phase;
            debug!(session = %session.id, ?phase, "verification advanced");
            return Applied::Advanced {
                session: session.id,
                phase,
            };
        }

        let Some(done) = self.active.take() else {
            return Applied::Discarded(event);
        };
        debug!(session = %done.id, "verification complete");
        Applied::Completed(Completion {
            session: done.id,
            target: done.target,
            reward: done.reward,
            evidence: done.evidence,
            started_at: done.started_at,
        })
    }

    /// Drops the active session, if any. Its pending events will be discarded.
    pub fn invalidate(&mut self) -> Option<Session> {
        self.active.take()
    }
}
