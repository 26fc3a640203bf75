//! Topology configuration loaded at startup.
//!
//! The participant chain and its routing rules are deployment data. A JSON
//! document looks like:
//!
//! ```json
//! {
//!   "participants": [{ "party": "DOCUMENT_BOT_SERVICE", "channelPrefix": "document-bot" }],
//!   "rules": [
//!     { "party": "ORCHESTRATOR", "outcome": "SUCCESS", "channel": "document-bot-success" },
//!     { "party": "ORCHESTRATOR", "outcome": "FAIL", "channel": "finish-fail" }
//!   ],
//!   "deadLetterChannel": "saga-dead-letter"
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::error::{Result, SagaError};
use crate::outcome::Outcome;
use crate::party::{ORCHESTRATOR, Party};
use crate::topology::{Participant, Topology, TransitionRule};

/// Wire name of the participant in the default deployment.
pub const DOCUMENT_BOT_SERVICE: &str = "DOCUMENT_BOT_SERVICE";
/// Channel prefix of the participant in the default deployment.
pub const DOCUMENT_BOT_PREFIX: &str = "document-bot";

/// Where a participant's `FAIL` is routed when a chain is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Every participant failure ends the saga directly.
    #[default]
    FinishFail,
    /// A failure is handed to the upstream participant's compensation
    /// channel; the first participant still routes to `finish-fail`.
    CascadeCompensation,
}

/// A participant entry of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantConfig {
    pub party: String,
    pub channel_prefix: String,
}

impl ParticipantConfig {
    pub fn new(party: impl Into<String>, channel_prefix: impl Into<String>) -> Self {
        Self {
            party: party.into(),
            channel_prefix: channel_prefix.into(),
        }
    }
}

/// A routing rule entry of the configuration, with the channel by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub party: String,
    pub outcome: Outcome,
    pub channel: String,
}

impl RuleConfig {
    pub fn new(party: impl Into<String>, outcome: Outcome, channel: impl Into<String>) -> Self {
        Self {
            party: party.into(),
            outcome,
            channel: channel.into(),
        }
    }
}

/// Raw topology description, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyConfig {
    pub participants: Vec<ParticipantConfig>,
    pub rules: Vec<RuleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_letter_channel: Option<String>,
}

impl TopologyConfig {
    /// Parses a JSON topology document.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| SagaError::InvalidTopology(format!("unreadable topology document: {e}")))
    }

    /// Reads and parses a JSON topology document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::info!(path = %path.display(), "loaded topology document");
        Self::from_json(&text)
    }

    /// Generates the rules for a linear chain of participants.
    ///
    /// - orchestrator `SUCCESS` starts the first participant, `FAIL` ends the saga
    /// - a participant's `SUCCESS` starts the next one, or ends the saga after the last
    /// - a participant's `ROLLBACK_PENDING` goes to its own compensation channel
    /// - a participant's `FAIL` follows `policy`
    pub fn linear(participants: Vec<ParticipantConfig>, policy: FailurePolicy) -> Self {
        let mut rules = Vec::with_capacity(2 + participants.len() * 3);

        if let Some(first) = participants.first() {
            rules.push(RuleConfig::new(
                ORCHESTRATOR,
                Outcome::Success,
                Channel::success_of(&first.channel_prefix).as_str(),
            ));
        }
        rules.push(RuleConfig::new(
            ORCHESTRATOR,
            Outcome::Fail,
            Channel::FINISH_FAIL.as_str(),
        ));

        for (i, participant) in participants.iter().enumerate() {
            let upstream = i.checked_sub(1).and_then(|j| participants.get(j));
            let downstream = participants.get(i + 1);

            let on_fail = match (policy, upstream) {
                (FailurePolicy::CascadeCompensation, Some(up)) => {
                    Channel::fail_of(&up.channel_prefix)
                }
                _ => Channel::FINISH_FAIL,
            };
            let on_success = match downstream {
                Some(next) => Channel::success_of(&next.channel_prefix),
                None => Channel::FINISH_SUCCESS,
            };

            rules.push(RuleConfig::new(
                participant.party.clone(),
                Outcome::RollbackPending,
                Channel::fail_of(&participant.channel_prefix).as_str(),
            ));
            rules.push(RuleConfig::new(
                participant.party.clone(),
                Outcome::Fail,
                on_fail.as_str(),
            ));
            rules.push(RuleConfig::new(
                participant.party.clone(),
                Outcome::Success,
                on_success.as_str(),
            ));
        }

        Self {
            participants,
            rules,
            dead_letter_channel: None,
        }
    }

    /// Resolves every name and produces the validated topology.
    pub fn build(&self) -> Result<Topology> {
        let participants: Vec<Participant> = self
            .participants
            .iter()
            .map(|p| Participant::new(Party::from_name(&p.party), p.channel_prefix.clone()))
            .collect();

        // The registry is rebuilt inside `Topology::new`; resolving here
        // turns a typo in a rule into an error naming the bad channel.
        let registry = crate::channel::ChannelRegistry::new(
            self.participants.iter().map(|p| p.channel_prefix.as_str()),
        )?;

        let rules = self
            .rules
            .iter()
            .map(|rule| {
                Ok(TransitionRule::new(
                    Party::from_name(&rule.party),
                    rule.outcome,
                    registry.resolve(&rule.channel)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let dead_letter = match &self.dead_letter_channel {
            Some(name) => registry.resolve(name)?,
            None => Channel::DEAD_LETTER,
        };

        let topology = Topology::new(participants, rules, dead_letter)?;
        tracing::info!(
            participants = topology.participants().len(),
            rules = topology.table().len(),
            dead_letter = %topology.dead_letter_channel(),
            "saga topology built"
        );
        Ok(topology)
    }
}

impl Default for TopologyConfig {
    /// The deployed topology: a single document-bot participant.
    fn default() -> Self {
        Self::linear(
            vec![ParticipantConfig::new(DOCUMENT_BOT_SERVICE, DOCUMENT_BOT_PREFIX)],
            FailurePolicy::FinishFail,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(party: &str, outcome: Outcome, channel: &str) -> RuleConfig {
        RuleConfig::new(party, outcome, channel)
    }

    #[test]
    fn test_default_matches_deployed_topology() {
        let config = TopologyConfig::default();
        assert_eq!(
            config.rules,
            vec![
                rule("ORCHESTRATOR", Outcome::Success, "document-bot-success"),
                rule("ORCHESTRATOR", Outcome::Fail, "finish-fail"),
                rule("DOCUMENT_BOT_SERVICE", Outcome::RollbackPending, "document-bot-fail"),
                rule("DOCUMENT_BOT_SERVICE", Outcome::Fail, "finish-fail"),
                rule("DOCUMENT_BOT_SERVICE", Outcome::Success, "finish-success"),
            ]
        );
        assert!(config.build().is_ok());
    }

    #[test]
    fn test_linear_chain_finish_fail_policy() {
        let config = TopologyConfig::linear(
            vec![
                ParticipantConfig::new("PRODUCT_VALIDATION_SERVICE", "product-validation"),
                ParticipantConfig::new("PAYMENT_SERVICE", "payment"),
                ParticipantConfig::new("INVENTORY_SERVICE", "inventory"),
            ],
            FailurePolicy::FinishFail,
        );
        let topology = config.build().unwrap();
        let payment = Party::service("PAYMENT_SERVICE");
        let inventory = Party::service("INVENTORY_SERVICE");

        assert_eq!(topology.table().len(), 11);
        assert_eq!(
            topology.next_channel(&Party::Orchestrator, Outcome::Success).unwrap().as_str(),
            "product-validation-success"
        );
        assert_eq!(
            topology.next_channel(&payment, Outcome::Success).unwrap().as_str(),
            "inventory-success"
        );
        assert_eq!(
            topology.next_channel(&payment, Outcome::Fail).unwrap().as_str(),
            "finish-fail"
        );
        assert_eq!(
            topology.next_channel(&inventory, Outcome::Success).unwrap().as_str(),
            "finish-success"
        );
        assert_eq!(
            topology.next_channel(&inventory, Outcome::RollbackPending).unwrap().as_str(),
            "inventory-fail"
        );
    }

    #[test]
    fn test_linear_chain_cascading_compensation() {
        let config = TopologyConfig::linear(
            vec![
                ParticipantConfig::new("PRODUCT_VALIDATION_SERVICE", "product-validation"),
                ParticipantConfig::new("PAYMENT_SERVICE", "payment"),
            ],
            FailurePolicy::CascadeCompensation,
        );
        let topology = config.build().unwrap();

        assert_eq!(
            topology
                .next_channel(&Party::service("PAYMENT_SERVICE"), Outcome::Fail)
                .unwrap()
                .as_str(),
            "product-validation-fail"
        );
        assert_eq!(
            topology
                .next_channel(&Party::service("PRODUCT_VALIDATION_SERVICE"), Outcome::Fail)
                .unwrap()
                .as_str(),
            "finish-fail"
        );
    }

    #[test]
    fn test_from_json() {
        let text = r#"{
            "participants": [{ "party": "DOCUMENT_BOT_SERVICE", "channelPrefix": "document-bot" }],
            "rules": [
                { "party": "ORCHESTRATOR", "outcome": "SUCCESS", "channel": "document-bot-success" },
                { "party": "DOCUMENT_BOT_SERVICE", "outcome": "SUCCESS", "channel": "finish-success" }
            ],
            "deadLetterChannel": "finish-fail"
        }"#;
        let topology = TopologyConfig::from_json(text).unwrap().build().unwrap();
        assert_eq!(topology.table().len(), 2);
        assert_eq!(topology.dead_letter_channel(), &Channel::FINISH_FAIL);
    }

    #[test]
    fn test_from_json_rejects_unknown_outcome() {
        let text = r#"{
            "participants": [],
            "rules": [{ "party": "ORCHESTRATOR", "outcome": "MAYBE", "channel": "finish-fail" }]
        }"#;
        assert!(matches!(
            TopologyConfig::from_json(text),
            Err(SagaError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_build_rejects_misspelled_channel() {
        let mut config = TopologyConfig::default();
        config.rules.push(rule("ORCHESTRATOR", Outcome::RollbackPending, "finish-fial"));
        assert!(matches!(
            config.build(),
            Err(SagaError::UnknownChannel(name)) if name == "finish-fial"
        ));
    }

    #[test]
    fn test_build_rejects_unknown_dead_letter_channel() {
        let mut config = TopologyConfig::default();
        config.dead_letter_channel = Some("nowhere".to_string());
        assert!(matches!(config.build(), Err(SagaError::UnknownChannel(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = TopologyConfig::load("/definitely/not/here/topology.json");
        assert!(matches!(result, Err(SagaError::Io(_))));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = TopologyConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(TopologyConfig::from_json(&json).unwrap(), config);
    }
}
