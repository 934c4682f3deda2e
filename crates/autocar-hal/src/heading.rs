//! Generic `HeadingActuator` trait for the rangefinder's servo mount.

use autocar_types::AutocarError;

/// Leftmost heading.
pub const HEADING_MIN_DEG: u8 = 0;
/// Straight ahead.
pub const HEADING_CENTER_DEG: u8 = 90;
/// Rightmost heading.
pub const HEADING_MAX_DEG: u8 = 180;

/// A position-controlled mount commandable to an absolute angle.
pub trait HeadingActuator: Send {
    /// Stable identifier, e.g. `"sg90"`.
    fn id(&self) -> &str;

    /// Command the mount to `angle_deg`.  Callers guarantee
    /// `angle_deg <= 180`; use [`HeadingActuator::point`] to clamp.
    ///
    /// # Errors
    ///
    /// Returns [`AutocarError::HardwareFault`] if the command cannot be applied.
    fn set_angle_deg(&mut self, angle_deg: u8) -> Result<(), AutocarError>;

    /// Most recently commanded angle.
    fn angle_deg(&self) -> u8;

    /// Command `angle_deg`, clamped to the mount's travel.
    fn point(&mut self, angle_deg: u8) -> Result<(), AutocarError> {
        self.set_angle_deg(angle_deg.clamp(HEADING_MIN_DEG, HEADING_MAX_DEG))
    }

    /// Return the mount to straight ahead.
    fn center(&mut self) -> Result<(), AutocarError> {
        self.set_angle_deg(HEADING_CENTER_DEG)
    }
}
