//! Generic `RangeSensor` trait for distance-measuring hardware.

use autocar_types::AutocarError;

/// An ultrasonic (or similar) rangefinder.
pub trait RangeSensor: Send {
    /// Stable identifier, e.g. `"hc-sr04"`.
    fn id(&self) -> &str;

    /// Take one raw distance reading in centimetres.
    ///
    /// # Errors
    ///
    /// Returns [`AutocarError::HardwareFault`] if no reading can be taken
    /// (e.g. the echo never returned).
    fn read_distance_cm(&mut self) -> Result<f32, AutocarError>;

    /// Take one reading and reject values outside the sensor contract.
    ///
    /// A NaN, infinite, or negative distance is a fault; it is never
    /// replaced with a default.
    fn measure_cm(&mut self) -> Result<f32, AutocarError> {
        let distance = self.read_distance_cm()?;
        if distance.is_finite() && distance >= 0.0 {
            Ok(distance)
        } else {
            Err(AutocarError::hardware(
                self.id(),
                format!("out-of-contract distance reading: {distance}"),
            ))
        }
    }
}
