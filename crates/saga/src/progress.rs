//! Replays an envelope history into a summary of the saga.

use crate::channel::Channel;
use crate::envelope::{Envelope, HistoryEntry};
use crate::outcome::Outcome;
use crate::party::Party;
use crate::state::SagaStatus;

/// What a saga's history says about it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SagaProgress {
    status: SagaStatus,
    steps: usize,
    completed_participants: Vec<Party>,
    last_channel: Option<Channel>,
    failure_reason: Option<String>,
}

impl SagaProgress {
    /// Folds the history of `envelope`.
    pub fn of(envelope: &Envelope) -> Self {
        Self::from_history(&envelope.history)
    }

    /// Folds a history, oldest entry first.
    pub fn from_history(history: &[HistoryEntry]) -> Self {
        let mut progress = Self::default();
        for entry in history {
            progress.apply(entry);
        }
        progress
    }

    fn apply(&mut self, entry: &HistoryEntry) {
        self.steps += 1;
        self.last_channel = Some(entry.channel.clone());

        if matches!(entry.party, Party::Service(_))
            && entry.outcome == Outcome::Success
            && !self.completed_participants.contains(&entry.party)
        {
            self.completed_participants.push(entry.party.clone());
        }

        if entry.outcome.is_failure() && self.failure_reason.is_none() {
            self.failure_reason = Some(
                entry
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("{} reported {}", entry.party, entry.outcome)),
            );
        }

        self.status = if entry.channel == Channel::FINISH_SUCCESS {
            SagaStatus::Succeeded
        } else if entry.channel == Channel::FINISH_FAIL || entry.channel == Channel::DEAD_LETTER {
            SagaStatus::Failed
        } else if entry.channel == Channel::NOTIFY_ENDING {
            if entry.outcome == Outcome::Success {
                SagaStatus::Succeeded
            } else {
                SagaStatus::Failed
            }
        } else if entry.outcome.is_failure() {
            SagaStatus::Compensating
        } else {
            SagaStatus::Running
        };

        if entry.channel == Channel::DEAD_LETTER && self.failure_reason.is_none() {
            self.failure_reason = entry.message.clone();
        }
    }
}

// Query methods
impl SagaProgress {
    pub fn status(&self) -> SagaStatus {
        self.status
    }

    /// Number of history entries folded.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Participants that reported `SUCCESS`, in the order they did.
    pub fn completed_participants(&self) -> &[Party] {
        &self.completed_participants
    }

    pub fn last_channel(&self) -> Option<&Channel> {
        self.last_channel.as_ref()
    }

    /// The first failure recorded, if any.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
