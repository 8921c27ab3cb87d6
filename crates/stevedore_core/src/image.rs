//! Image references: `[owner/]repository[:tag]`.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag assumed by the container engine when none is given
pub const DEFAULT_TAG: &str = "latest";

/// Owner of the official images on the default registry
pub const DEFAULT_OWNER: &str = "library";

/// Container image reference
///
/// The owner is everything before the last `/`, so registry hosts with a port
/// (`registry:5000/app`) keep their colon in the owner and never read as a tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Image {
    /// Owner prefix (user, organisation, or registry path)
    pub owner: Option<String>,
    /// Repository name
    pub repository: String,
    /// Tag
    pub tag: Option<String>,
}

impl Image {
    /// Create an image with only a repository
    #[must_use]
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            owner: None,
            repository: repository.into(),
            tag: None,
        }
    }

    /// Set the owner
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Parse an image reference
    ///
    /// # Errors
    ///
    /// Returns error if the owner, repository, or tag is present but empty
    pub fn parse(s: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidImage {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (owner, rest) = match s.rsplit_once('/') {
            Some((owner, rest)) => {
                if owner.is_empty() {
                    return Err(invalid("empty owner"));
                }
                (Some(owner.to_string()), rest)
            }
            None => (None, s),
        };

        let (repository, tag) = match rest.rsplit_once(':') {
            Some((repository, tag)) => {
                if tag.is_empty() {
                    return Err(invalid("empty tag"));
                }
                (repository, Some(tag.to_string()))
            }
            None => (rest, None),
        };

        if repository.is_empty() {
            return Err(invalid("empty repository"));
        }

        Ok(Self {
            owner,
            repository: repository.to_string(),
            tag,
        })
    }

    /// Whether a tag was given
    #[must_use]
    pub fn has_tag(&self) -> bool {
        self.tag.is_some()
    }

    /// Whether an owner was given
    #[must_use]
    pub fn has_owner(&self) -> bool {
        self.owner.is_some()
    }

    /// Copy with the default tag filled in when missing
    #[must_use]
    pub fn tagged_or_latest(&self) -> Self {
        let mut image = self.clone();
        if image.tag.is_none() {
            image.tag = Some(DEFAULT_TAG.to_string());
        }
        image
    }

    /// Copy with the default owner filled in when missing
    #[must_use]
    pub fn owned_or_library(&self) -> Self {
        let mut image = self.clone();
        if image.owner.is_none() {
            image.owner = Some(DEFAULT_OWNER.to_string());
        }
        image
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(owner) = &self.owner {
            write!(f, "{}/", owner)?;
        }
        write!(f, "{}", self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{}", tag)?;
        }
        Ok(())
    }
}

impl FromStr for Image {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
