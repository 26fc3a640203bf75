//! Named communication channels (broker topics) and their registry.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SagaError};

/// Suffix of a participant's work-request channel.
pub const SUCCESS_SUFFIX: &str = "success";
/// Suffix of a participant's compensation channel.
pub const FAIL_SUFFIX: &str = "fail";

/// A named communication path between services.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Channel(Cow<'static, str>);

impl Channel {
    /// Entry point used by saga initiators.
    pub const START_SAGA: Channel = Channel(Cow::Borrowed("start-saga"));
    /// Where participants report their outcomes back to the orchestrator.
    pub const ORCHESTRATOR: Channel = Channel(Cow::Borrowed("orchestrator"));
    /// Final success of a saga.
    pub const FINISH_SUCCESS: Channel = Channel(Cow::Borrowed("finish-success"));
    /// Final failure of a saga.
    pub const FINISH_FAIL: Channel = Channel(Cow::Borrowed("finish-fail"));
    /// Announces that a saga reached a terminal state.
    pub const NOTIFY_ENDING: Channel = Channel(Cow::Borrowed("notify-ending"));
    /// Receives sagas that hit a topology gap.
    pub const DEAD_LETTER: Channel = Channel(Cow::Borrowed("saga-dead-letter"));

    /// Channels that exist in every deployment.
    pub const FIXED: [Channel; 6] = [
        Channel::START_SAGA,
        Channel::ORCHESTRATOR,
        Channel::FINISH_SUCCESS,
        Channel::FINISH_FAIL,
        Channel::NOTIFY_ENDING,
        Channel::DEAD_LETTER,
    ];

    /// Work-request channel of the participant with the given prefix.
    pub fn success_of(prefix: &str) -> Channel {
        Channel(Cow::Owned(format!("{prefix}-{SUCCESS_SUFFIX}")))
    }

    /// Compensation channel of the participant with the given prefix.
    pub fn fail_of(prefix: &str) -> Channel {
        Channel(Cow::Owned(format!("{prefix}-{FAIL_SUFFIX}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the two channels that end a saga.
    pub fn is_terminal(&self) -> bool {
        *self == Channel::FINISH_SUCCESS || *self == Channel::FINISH_FAIL
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Channel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The closed set of channels a deployment can address.
///
/// Built once at startup from the fixed channels plus two channels per
/// participant; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    channels: BTreeMap<String, Channel>,
}

impl ChannelRegistry {
    /// Builds the registry for the given participant channel prefixes.
    ///
    /// Fails on an empty prefix or on any name collision, including
    /// collisions with the fixed channels.
    pub fn new<'a>(prefixes: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut channels = BTreeMap::new();
        for channel in Channel::FIXED {
            channels.insert(channel.as_str().to_string(), channel);
        }

        for prefix in prefixes {
            if prefix.trim().is_empty() {
                return Err(SagaError::InvalidTopology(
                    "participant channel prefix must not be empty".to_string(),
                ));
            }
            for channel in [Channel::success_of(prefix), Channel::fail_of(prefix)] {
                let name = channel.as_str().to_string();
                if channels.contains_key(&name) {
                    return Err(SagaError::InvalidTopology(format!(
                        "channel '{name}' is declared more than once"
                    )));
                }
                channels.insert(name, channel);
            }
        }

        Ok(Self { channels })
    }

    /// Looks up a channel by name.
    pub fn resolve(&self, name: &str) -> Result<Channel> {
        self.channels
            .get(name)
            .cloned()
            .ok_or_else(|| SagaError::UnknownChannel(name.to_string()))
    }

    pub fn contains(&self, channel: &Channel) -> bool {
        self.channels.contains_key(channel.as_str())
    }

    /// Iterates over all registered channels in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
