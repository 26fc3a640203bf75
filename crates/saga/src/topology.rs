//! The transition table: saga topology expressed as data.
//!
//! A topology is the ordered participant chain, the channel registry derived
//! from it, and the `(party, outcome) -> channel` rules. It is built and
//! validated once at startup and shared read-only afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::channel::{Channel, ChannelRegistry};
use crate::error::{Result, SagaError};
use crate::outcome::Outcome;
use crate::party::Party;

/// A single routing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRule {
    pub party: Party,
    pub outcome: Outcome,
    pub channel: Channel,
}

impl TransitionRule {
    pub fn new(party: Party, outcome: Outcome, channel: Channel) -> Self {
        Self {
            party,
            outcome,
            channel,
        }
    }
}

/// Ordered rules with a keyed index for lookup.
///
/// The rule order is kept for display only; each `(party, outcome)` key may
/// appear once, which is enforced on construction.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    rules: Vec<TransitionRule>,
    index: HashMap<(Party, Outcome), usize>,
}

impl TransitionTable {
    /// Builds the table, rejecting duplicate keys.
    pub fn new(rules: Vec<TransitionRule>) -> Result<Self> {
        let mut index = HashMap::with_capacity(rules.len());
        for (position, rule) in rules.iter().enumerate() {
            let key = (rule.party.clone(), rule.outcome);
            if index.insert(key, position).is_some() {
                return Err(SagaError::DuplicateTransition {
                    party: rule.party.clone(),
                    outcome: rule.outcome,
                });
            }
        }
        Ok(Self { rules, index })
    }

    /// Returns the channel configured for `(party, outcome)`.
    pub fn next_channel(&self, party: &Party, outcome: Outcome) -> Result<&Channel> {
        self.index
            .get(&(party.clone(), outcome))
            .and_then(|&position| self.rules.get(position))
            .map(|rule| &rule.channel)
            .ok_or_else(|| SagaError::UndefinedTransition {
                party: party.clone(),
                outcome,
            })
    }

    /// Returns the rules in declaration order.
    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A participant service in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub party: Party,
    pub channel_prefix: String,
}

impl Participant {
    pub fn new(party: Party, channel_prefix: impl Into<String>) -> Self {
        Self {
            party,
            channel_prefix: channel_prefix.into(),
        }
    }

    /// Channel on which the participant receives work requests.
    pub fn work_channel(&self) -> Channel {
        Channel::success_of(&self.channel_prefix)
    }

    /// Channel on which the participant receives compensation requests.
    pub fn compensation_channel(&self) -> Channel {
        Channel::fail_of(&self.channel_prefix)
    }
}

/// The validated, immutable routing configuration of a deployment.
#[derive(Debug, Clone)]
pub struct Topology {
    participants: Vec<Participant>,
    registry: ChannelRegistry,
    table: TransitionTable,
    dead_letter: Channel,
}

impl Topology {
    /// Validates and assembles a topology.
    ///
    /// Fails on an empty participant chain, a participant posing as the
    /// orchestrator, a party registered twice, a rule naming an unregistered
    /// party or channel, or a duplicate rule key.
    pub fn new(
        participants: Vec<Participant>,
        rules: Vec<TransitionRule>,
        dead_letter: Channel,
    ) -> Result<Self> {
        if participants.is_empty() {
            return Err(SagaError::InvalidTopology(
                "at least one participant is required".to_string(),
            ));
        }

        let mut seen = Vec::with_capacity(participants.len());
        for participant in &participants {
            if participant.party.is_orchestrator() || participant.party.as_str().trim().is_empty()
            {
                return Err(SagaError::InvalidTopology(format!(
                    "'{}' is not a valid participant name",
                    participant.party
                )));
            }
            if seen.contains(&&participant.party) {
                return Err(SagaError::InvalidTopology(format!(
                    "participant '{}' is declared more than once",
                    participant.party
                )));
            }
            seen.push(&participant.party);
        }

        let registry =
            ChannelRegistry::new(participants.iter().map(|p| p.channel_prefix.as_str()))?;

        for rule in &rules {
            if !registry.contains(&rule.channel) {
                return Err(SagaError::UnknownChannel(rule.channel.to_string()));
            }
            let registered =
                rule.party.is_orchestrator() || participants.iter().any(|p| p.party == rule.party);
            if !registered {
                return Err(SagaError::InvalidTopology(format!(
                    "rule references unknown party '{}'",
                    rule.party
                )));
            }
        }
        if !registry.contains(&dead_letter) {
            return Err(SagaError::UnknownChannel(dead_letter.to_string()));
        }

        let table = TransitionTable::new(rules)?;

        Ok(Self {
            participants,
            registry,
            table,
            dead_letter,
        })
    }

    /// Looks up the next channel for `(party, outcome)`.
    pub fn next_channel(&self, party: &Party, outcome: Outcome) -> Result<&Channel> {
        self.table.next_channel(party, outcome)
    }

    /// Returns true if `party` is the orchestrator or a configured participant.
    pub fn is_registered(&self, party: &Party) -> bool {
        party.is_orchestrator() || self.participants.iter().any(|p| &p.party == party)
    }

    /// Returns the participant chain in order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Channel receiving sagas that hit a topology gap.
    pub fn dead_letter_channel(&self) -> &Channel {
        &self.dead_letter
    }
}
