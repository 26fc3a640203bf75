//! The relay's line protocol: one `<channel>\t<body>` frame per line.

use saga::{Channel, ChannelRegistry};

use crate::error::{RelayError, Result};

const SEPARATOR: char = '\t';

/// A message addressed to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub channel: Channel,
    pub body: String,
}

impl Frame {
    pub fn new(channel: Channel, body: impl Into<String>) -> Self {
        Self {
            channel,
            body: body.into(),
        }
    }

    /// Parses an input line, resolving the channel name against `registry`.
    ///
    /// Returns `Ok(None)` for blank lines.
    pub fn parse(line: &str, registry: &ChannelRegistry) -> Result<Option<Self>> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Ok(None);
        }

        let (name, body) = line
            .split_once(SEPARATOR)
            .ok_or_else(|| RelayError::InvalidFrame("missing tab between channel and body".into()))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(RelayError::InvalidFrame("empty channel name".into()));
        }

        let channel = registry.resolve(name)?;
        Ok(Some(Self::new(channel, body)))
    }

    /// Renders the frame as a single output line, newline included.
    ///
    /// Bodies come from the compact JSON codec and never contain raw newlines.
    pub fn to_line(&self) -> String {
        format!("{}{SEPARATOR}{}\n", self.channel, self.body)
    }
}

#[cfg(test)]
mod tests {
    use saga::SagaError;

    use super::*;

    fn registry() -> ChannelRegistry {
        ChannelRegistry::new(["document-bot"]).unwrap()
    }

    #[test]
    fn test_parse_frame() {
        let frame = Frame::parse("orchestrator\t{\"a\":1}\n", &registry())
            .unwrap()
            .unwrap();
        assert_eq!(frame.channel, Channel::ORCHESTRATOR);
        assert_eq!(frame.body, "{\"a\":1}");
    }

    #[test]
    fn test_parse_participant_channel() {
        let frame = Frame::parse("document-bot-fail\t{}", &registry())
            .unwrap()
            .unwrap();
        assert_eq!(frame.channel, Channel::fail_of("document-bot"));
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        assert!(Frame::parse("", &registry()).unwrap().is_none());
        assert!(Frame::parse("   \r\n", &registry()).unwrap().is_none());
    }

    #[test]
    fn test_missing_separator_is_invalid() {
        let err = Frame::parse("orchestrator {}", &registry()).unwrap_err();
        assert!(matches!(err, RelayError::InvalidFrame(_)));
    }

    #[test]
    fn test_empty_channel_is_invalid() {
        let err = Frame::parse("\t{}", &registry()).unwrap_err();
        assert!(matches!(err, RelayError::InvalidFrame(_)));
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        let err = Frame::parse("billing-success\t{}", &registry()).unwrap_err();
        assert!(matches!(err, RelayError::Saga(SagaError::UnknownChannel(_))));
    }

    #[test]
    fn test_body_may_contain_tabs() {
        let frame = Frame::parse("start-saga\t{\"text\":\"a\tb\"}", &registry())
            .unwrap()
            .unwrap();
        assert_eq!(frame.body, "{\"text\":\"a\tb\"}");
    }

    #[test]
    fn test_to_line() {
        let frame = Frame::new(Channel::FINISH_FAIL, "{}");
        assert_eq!(frame.to_line(), "finish-fail\t{}\n");
    }
}
