//! Port mappings: `[source:]target[/protocol]`.

use crate::error::{CoreError, CoreResult};
use crate::literal::split_components;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Published or exposed port
///
/// `source` is either a host port or `host:port`. A port without a source is
/// only exposed to the container network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Port {
    /// Host side, `port` or `host:port`
    pub source: Option<String>,
    /// Container port
    pub target: String,
    /// Transport protocol
    pub protocol: Option<String>,
}

impl Port {
    /// Create a port with only a target
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            source: None,
            target: target.into(),
            protocol: None,
        }
    }

    /// Set the source
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the protocol
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Parse a port literal
    ///
    /// One token is the target, three tokens are `host:port:target`, two
    /// tokens are `port:target`. The protocol follows `/` in the target token.
    ///
    /// # Errors
    ///
    /// Returns error on more than three components or an empty component
    pub fn parse(s: &str) -> CoreResult<Self> {
        let invalid = |reason: String| CoreError::InvalidPort {
            input: s.to_string(),
            reason,
        };

        let tokens = split_components(s, 3).map_err(invalid)?;
        let (source, target_token) = match tokens.as_slice() {
            [target] => (None, *target),
            [host, port, target] => (Some(format!("{}:{}", host, port)), *target),
            [source, target] => (Some((*source).to_string()), *target),
            _ => return Err(invalid("empty literal".to_string())),
        };

        let (target, protocol) = match target_token.split_once('/') {
            Some((target, protocol)) => {
                if protocol.is_empty() {
                    return Err(invalid("empty protocol".to_string()));
                }
                (target, Some(protocol.to_string()))
            }
            None => (target_token, None),
        };

        if target.is_empty() {
            return Err(invalid("empty target".to_string()));
        }

        Ok(Self {
            source,
            target: target.to_string(),
            protocol,
        })
    }

    /// Whether the port is published on the host
    #[must_use]
    pub fn is_mapped(&self) -> bool {
        self.source.is_some()
    }

    /// Copy without the host side
    #[must_use]
    pub fn unmapped(&self) -> Self {
        Self {
            source: None,
            target: self.target.clone(),
            protocol: self.protocol.clone(),
        }
    }

    /// The `target[/protocol]` part of the literal
    #[must_use]
    pub fn target_literal(&self) -> String {
        match &self.protocol {
            Some(protocol) => format!("{}/{}", self.target, protocol),
            None => self.target.clone(),
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{}:", source)?;
        }
        write!(f, "{}", self.target_literal())
    }
}

impl FromStr for Port {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
