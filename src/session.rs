// 🔁 Pattern Session - Gesture accumulation and the set/confirm/verify workflow
//
// One session per lock widget. Gesture callbacks arrive strictly as
// start -> move* -> end, so the session is plain `&mut self` state.

use crate::grid::GridCell;
use crate::pattern::{GestureSequence, PatternCode};
use crate::store::{CredentialStore, DEFAULT_CREDENTIAL_KEY};
use anyhow::Result;
use tracing::{debug, info, warn};

/// Shortest pattern accepted as a new credential
pub const MIN_PATTERN_LEN: usize = 4;

// ============================================================================
// STATE
// ============================================================================

/// Where the credential workflow currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    AwaitingFirstEntry,
    /// Holds the code from the first entry until it is confirmed or rejected
    AwaitingConfirmation { pending: PatternCode },
    AwaitingVerification,
}

impl WorkflowState {
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowState::AwaitingFirstEntry => "awaiting first entry",
            WorkflowState::AwaitingConfirmation { .. } => "awaiting confirmation",
            WorkflowState::AwaitingVerification => "awaiting verification",
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            WorkflowState::AwaitingVerification => Mode::Verify,
            _ => Mode::Set,
        }
    }
}

/// User-selected workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Set,
    Verify,
}

/// Result of [`PatternSession::select_mode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSelection {
    /// Now collecting a new pattern
    SetStarted,
    /// Now checking against the stored credential
    VerifyStarted,
    /// Verify was requested but nothing is stored; fell back to setting one
    CredentialRequired,
}

// ============================================================================
// OUTCOME
// ============================================================================

/// What a finished gesture amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// First entry had fewer than [`MIN_PATTERN_LEN`] cells
    TooShort,
    /// First entry accepted, waiting for the same pattern again
    ConfirmationPending,
    /// Second entry differed; `credential_set` tells whether an older
    /// credential is still stored
    ConfirmationMismatch { credential_set: bool },
    CredentialSaved,
    VerifyMatch,
    VerifyMismatch,
}

impl Outcome {
    /// Whether the gesture should be shown as a success
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Outcome::ConfirmationPending | Outcome::CredentialSaved | Outcome::VerifyMatch
        )
    }
}

// ============================================================================
// SESSION
// ============================================================================

pub struct PatternSession<S> {
    store: S,
    credential_key: String,
    state: WorkflowState,
    sequence: GestureSequence,
}

impl<S: CredentialStore> PatternSession<S> {
    /// Fresh session collecting a new pattern
    pub fn new(store: S) -> Self {
        PatternSession {
            store,
            credential_key: DEFAULT_CREDENTIAL_KEY.to_string(),
            state: WorkflowState::AwaitingFirstEntry,
            sequence: GestureSequence::new(),
        }
    }

    /// Session for `key` that starts in verify mode when a valid credential
    /// is already stored under it
    pub fn resume(store: S, key: impl Into<String>) -> Result<Self> {
        let mut session = PatternSession::new(store).with_credential_key(key);
        session.select_mode(Mode::Verify)?;
        Ok(session)
    }

    /// Use a different store key for the credential
    pub fn with_credential_key(mut self, key: impl Into<String>) -> Self {
        self.credential_key = key.into();
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn active_mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn sequence(&self) -> &GestureSequence {
        &self.sequence
    }

    pub fn credential_key(&self) -> &str {
        &self.credential_key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Stored credential, if it is a code a gesture could have produced.
    /// Empty, short or malformed values count as no credential.
    fn stored_code(&self) -> Result<Option<PatternCode>> {
        let stored = self.store.get(&self.credential_key)?;
        let code = stored.as_deref().and_then(|s| PatternCode::parse(s, MIN_PATTERN_LEN));
        if stored.is_some() && code.is_none() {
            warn!(key = %self.credential_key, "ignoring invalid stored credential");
        }
        Ok(code)
    }

    /// Switch between setting and verifying. Any pending first entry and any
    /// gesture in progress are dropped.
    pub fn select_mode(&mut self, mode: Mode) -> Result<ModeSelection> {
        self.sequence.clear();

        let selection = match mode {
            Mode::Set => {
                self.state = WorkflowState::AwaitingFirstEntry;
                ModeSelection::SetStarted
            }
            Mode::Verify => {
                if self.stored_code()?.is_some() {
                    self.state = WorkflowState::AwaitingVerification;
                    ModeSelection::VerifyStarted
                } else {
                    self.state = WorkflowState::AwaitingFirstEntry;
                    ModeSelection::CredentialRequired
                }
            }
        };

        debug!(?mode, ?selection, "mode selected");
        Ok(selection)
    }

    /// Begin a new gesture at `cell` (empty when the touch missed every cell)
    pub fn on_gesture_start(&mut self, cell: Option<GridCell>) {
        self.sequence.clear();
        if let Some(cell) = cell {
            self.sequence.push(cell);
        }
    }

    /// Add `cell` to the gesture unless it is a miss or already visited
    pub fn on_gesture_move(&mut self, cell: Option<GridCell>) {
        if let Some(cell) = cell {
            if self.sequence.push(cell) {
                debug!(%cell, len = self.sequence.len(), "cell visited");
            }
        }
    }

    /// Evaluate the finished gesture and advance the workflow.
    ///
    /// The gesture is cleared whatever the result. Errors only come from the
    /// credential store; a missing credential is a plain `VerifyMismatch`.
    pub fn on_gesture_end(&mut self) -> Result<Outcome> {
        let code = self.sequence.code();
        self.sequence.clear();

        let from = self.state.label();
        let state = std::mem::replace(&mut self.state, WorkflowState::AwaitingFirstEntry);
        let (next, outcome) = match state {
            WorkflowState::AwaitingFirstEntry => {
                if code.len() < MIN_PATTERN_LEN {
                    (WorkflowState::AwaitingFirstEntry, Outcome::TooShort)
                } else {
                    (
                        WorkflowState::AwaitingConfirmation { pending: code },
                        Outcome::ConfirmationPending,
                    )
                }
            }
            WorkflowState::AwaitingConfirmation { pending } => {
                if code == pending {
                    if let Err(err) = self.store.set(&self.credential_key, code.as_str()) {
                        self.state = WorkflowState::AwaitingConfirmation { pending };
                        return Err(err);
                    }
                    info!(key = %self.credential_key, "credential saved");
                    (WorkflowState::AwaitingVerification, Outcome::CredentialSaved)
                } else {
                    let credential_set = self.stored_code()?.is_some();
                    (
                        WorkflowState::AwaitingFirstEntry,
                        Outcome::ConfirmationMismatch { credential_set },
                    )
                }
            }
            WorkflowState::AwaitingVerification => {
                self.state = WorkflowState::AwaitingVerification;
                let outcome = match self.stored_code()? {
                    Some(stored) if code == stored => Outcome::VerifyMatch,
                    _ => Outcome::VerifyMismatch,
                };
                (WorkflowState::AwaitingVerification, outcome)
            }
        };

        info!(from, to = next.label(), ?outcome, "gesture evaluated");
        self.state = next;
        Ok(outcome)
    }
}
