//! Error types shared across the frame

use crate::traits::fetch::ServiceError;

/// Reasons a single panel render can fail
///
/// All of these are non-fatal: the scheduler records them and rotation
/// continues with the next slot on the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// A required credential or config value is absent
    ConfigMissing,
    /// A remote service could not be reached or rejected the request
    Service(ServiceError),
    /// Image decode, drawing, or display refresh failed
    Render,
}

impl From<ServiceError> for PanelError {
    fn from(e: ServiceError) -> Self {
        PanelError::Service(e)
    }
}

/// Errors that abort startup
///
/// Raised only while the panel list is being built. Everything after boot
/// is downgraded to a logged [`PanelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FatalError {
    /// The playlist has no slots to rotate through
    EmptyPlaylist,
    /// The photo directory could not be enumerated
    PhotoDirectory,
}
