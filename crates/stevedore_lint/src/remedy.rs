//! Registered remediations and the components that can apply them.

use crate::diagnostic::Location;
use stevedore_compose::{ComposeDocument, Field, GlobalVolume, Network, Scope, Service};
use stevedore_core::Image;
use thiserror::Error;

/// Remediation attached to a warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remedy {
    /// Drop the host side of the port at the location's index
    StripPortSource,
    /// Remove the field or configuration key
    DropField,
    /// Replace `build` with this image, or drop it if an image is present
    BuildToImage(Image),
    /// Tag the image `latest`
    AddImageTag,
    /// Give the image the `library` owner
    AddImageOwner,
    /// Nothing can be done without a human
    Manual,
}

impl Remedy {
    /// Short description of what applying the remedy does
    #[must_use]
    pub fn describe(&self, location: &Location) -> String {
        let path = location.path();
        match self {
            Self::StripPortSource => format!("unpublished {}", path),
            Self::DropField => format!("removed {}", path),
            Self::BuildToImage(image) => format!("replaced {} with image '{}'", path, image),
            Self::AddImageTag => format!("tagged {} 'latest'", path),
            Self::AddImageOwner => format!("set owner of {} to 'library'", path),
            Self::Manual => format!("{} needs a manual fix", path),
        }
    }
}

/// Error applying a remedy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    /// The remedy needs a human
    #[error("{path} requires a manual fix")]
    Manual {
        /// Target path
        path: String,
    },
    /// The located component does not exist
    #[error("nothing to fix at {path}")]
    Missing {
        /// Target path
        path: String,
    },
    /// The remedy does not apply to the located component
    #[error("remedy does not apply to {path}")]
    Inapplicable {
        /// Target path
        path: String,
    },
}

impl FixError {
    fn manual(location: &Location) -> Self {
        Self::Manual {
            path: location.path(),
        }
    }

    fn missing(location: &Location) -> Self {
        Self::Missing {
            path: location.path(),
        }
    }

    fn inapplicable(location: &Location) -> Self {
        Self::Inapplicable {
            path: location.path(),
        }
    }
}

/// A component that can apply remedies to itself
pub trait Fixable {
    /// Apply `remedy` at `location`
    ///
    /// Returns whether anything changed; a remedy already in effect changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns error if the remedy is manual, the target is gone, or the
    /// remedy does not fit the target
    fn remediate(&mut self, remedy: &Remedy, location: &Location) -> Result<bool, FixError>;
}

impl Fixable for Service {
    fn remediate(&mut self, remedy: &Remedy, location: &Location) -> Result<bool, FixError> {
        match remedy {
            Remedy::StripPortSource => {
                let index = location.index.ok_or_else(|| FixError::inapplicable(location))?;
                let port = self
                    .ports_mut()
                    .and_then(|ports| ports.items.get_mut(index))
                    .ok_or_else(|| FixError::missing(location))?;
                if !port.is_mapped() {
                    return Ok(false);
                }
                *port = port.unmapped();
                Ok(true)
            }
            Remedy::DropField => Ok(self.remove(&location.field).is_some()),
            Remedy::BuildToImage(image) => {
                if !self.contains(&location.field) {
                    return Ok(false);
                }
                if self.contains("image") {
                    self.remove(&location.field);
                } else {
                    self.replace(&location.field, Field::image(image.clone()));
                }
                Ok(true)
            }
            Remedy::AddImageTag => {
                let image = self.image_mut().ok_or_else(|| FixError::missing(location))?;
                if image.has_tag() {
                    return Ok(false);
                }
                *image = image.tagged_or_latest();
                Ok(true)
            }
            Remedy::AddImageOwner => {
                let image = self.image_mut().ok_or_else(|| FixError::missing(location))?;
                if image.has_owner() {
                    return Ok(false);
                }
                *image = image.owned_or_library();
                Ok(true)
            }
            Remedy::Manual => Err(FixError::manual(location)),
        }
    }
}

impl Fixable for Network {
    fn remediate(&mut self, remedy: &Remedy, location: &Location) -> Result<bool, FixError> {
        match remedy {
            Remedy::DropField => Ok(self.config.remove(&location.field).is_some()),
            Remedy::Manual => Err(FixError::manual(location)),
            _ => Err(FixError::inapplicable(location)),
        }
    }
}

impl Fixable for GlobalVolume {
    fn remediate(&mut self, remedy: &Remedy, location: &Location) -> Result<bool, FixError> {
        match remedy {
            Remedy::Manual => Err(FixError::manual(location)),
            _ => Err(FixError::inapplicable(location)),
        }
    }
}

impl Fixable for ComposeDocument {
    fn remediate(&mut self, remedy: &Remedy, location: &Location) -> Result<bool, FixError> {
        let owner = location.owner.as_str();
        match location.scope {
            Scope::Service => self
                .service_mut(owner)
                .ok_or_else(|| FixError::missing(location))?
                .remediate(remedy, location),
            Scope::Volume => self
                .volume_mut(owner)
                .ok_or_else(|| FixError::missing(location))?
                .remediate(remedy, location),
            Scope::Network => self
                .network_mut(owner)
                .ok_or_else(|| FixError::missing(location))?
                .remediate(remedy, location),
            Scope::Document => Err(FixError::inapplicable(location)),
        }
    }
}
