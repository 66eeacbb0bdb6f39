//! Accumulator owned by a single activation.

use card_defence_core::{Command, TargetingError};

/// Predicate that was not performed because its targets could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedPredicate {
    /// Position of the effect within the activated list.
    pub effect: usize,
    /// Position of the predicate within its effect.
    pub predicate: usize,
    /// Reason the targets could not be resolved.
    pub error: TargetingError,
}

/// Everything an activation produced.
///
/// Predicates push commands through [`ResolutionInfo::push_command`]; the
/// pipeline applies them to the world after each predicate and keeps them as
/// the applied history.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolutionInfo {
    pending: Vec<Command>,
    applied: Vec<Command>,
    skipped: Vec<SkippedPredicate>,
    notes: Vec<String>,
}

impl ResolutionInfo {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a world mutation.
    pub fn push_command(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Records a free-form diagnostic note.
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Commands queued but not yet applied.
    #[must_use]
    pub fn pending(&self) -> &[Command] {
        &self.pending
    }

    /// Commands applied to the world, in order.
    #[must_use]
    pub fn applied(&self) -> &[Command] {
        &self.applied
    }

    /// Predicates skipped because of targeting errors.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedPredicate] {
        &self.skipped
    }

    /// Diagnostic notes in the order they were recorded.
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub(crate) fn take_pending(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn record_applied(&mut self, command: Command) {
        self.applied.push(command);
    }

    pub(crate) fn record_skip(&mut self, skipped: SkippedPredicate) {
        self.skipped.push(skipped);
    }
}
