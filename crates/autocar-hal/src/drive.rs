//! Generic `DriveBase` trait for the vehicle's differential drive.
//!
//! Drivers implement the per-direction primitives; the rest of the
//! controller issues [`DriveCommand`] values through [`DriveBase::apply`].

use autocar_types::{AutocarError, DriveCommand};

/// A two-sided wheel drive with an enable gate (e.g. an L298N bridge).
///
/// Motion only happens while the drive is enabled.  Speeds are in `[0, 1]`.
pub trait DriveBase: Send {
    /// Stable identifier for this drive, e.g. `"l298n"`.
    fn id(&self) -> &str;

    fn forward(&mut self, speed: f32) -> Result<(), AutocarError>;

    fn backward(&mut self, speed: f32) -> Result<(), AutocarError>;

    /// Spin counter-clockwise in place.
    fn left(&mut self, speed: f32) -> Result<(), AutocarError>;

    /// Spin clockwise in place.
    fn right(&mut self, speed: f32) -> Result<(), AutocarError>;

    /// Cut drive to both sides.
    fn stop(&mut self) -> Result<(), AutocarError>;

    /// Assert the drive-enable lines.
    ///
    /// # Errors
    ///
    /// Returns [`AutocarError::HardwareFault`] if the lines cannot be driven.
    fn enable(&mut self) -> Result<(), AutocarError>;

    /// De-energise the drive-enable lines.
    fn disable(&mut self) -> Result<(), AutocarError>;

    /// Issue `command`, clamping its speed to `[0, 1]` first.
    fn apply(&mut self, command: DriveCommand) -> Result<(), AutocarError> {
        match command.clamped() {
            DriveCommand::Forward(speed) => self.forward(speed),
            DriveCommand::Backward(speed) => self.backward(speed),
            DriveCommand::Left(speed) => self.left(speed),
            DriveCommand::Right(speed) => self.right(speed),
            DriveCommand::Stop => self.stop(),
        }
    }
}
