//! Generic `ProximitySensor` trait for binary obstacle sensors (IR modules).

use autocar_types::{AutocarError, Proximity};

/// A binary, active-low obstacle sensor.
pub trait ProximitySensor: Send {
    /// Stable identifier, e.g. `"ir_left"`.
    fn id(&self) -> &str;

    /// Sample the sensor line.
    ///
    /// # Errors
    ///
    /// Returns [`AutocarError::HardwareFault`] if the line cannot be read.
    fn read(&mut self) -> Result<Proximity, AutocarError>;
}
