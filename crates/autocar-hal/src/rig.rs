//! [`Rig`] – the vehicle's complete set of hardware drivers.
//!
//! A rig owns exactly one driver for each capability the controller uses:
//! the drive base, the heading actuator, the rangefinder, and the left and
//! right proximity sensors.  Build one with [`RigBuilder`], which refuses to
//! produce a rig with a missing device.
//!
//! # Teardown
//!
//! [`Rig::engage`] asserts the drive-enable lines and marks the rig as
//! energised.  [`Rig::shutdown`] issues Stop and then de-energises the
//! enable lines, attempting the second step even when the first fails.
//! Dropping a rig that is still energised runs the same shutdown, so a
//! panic or a cancelled task never leaves the motors powered.

use autocar_types::{AutocarError, DriveCommand, SensorSnapshot};
use tracing::{debug, error, info, instrument};

use crate::drive::DriveBase;
use crate::heading::HeadingActuator;
use crate::proximity::ProximitySensor;
use crate::ranging::RangeSensor;

/// All hardware drivers of one vehicle.
pub struct Rig {
    drive: Box<dyn DriveBase>,
    heading: Box<dyn HeadingActuator>,
    ranging: Box<dyn RangeSensor>,
    left: Box<dyn ProximitySensor>,
    right: Box<dyn ProximitySensor>,
    energised: bool,
}

impl Rig {
    pub(crate) fn from_parts(
        drive: Box<dyn DriveBase>,
        heading: Box<dyn HeadingActuator>,
        ranging: Box<dyn RangeSensor>,
        left: Box<dyn ProximitySensor>,
        right: Box<dyn ProximitySensor>,
    ) -> Self {
        Self {
            drive,
            heading,
            ranging,
            left,
            right,
            energised: false,
        }
    }

    /// Assert the drive-enable lines and point the rangefinder ahead.
    ///
    /// # Errors
    ///
    /// Propagates the driver fault.  If enabling succeeded but centring the
    /// mount failed, the rig is still marked energised so teardown runs.
    pub fn engage(&mut self) -> Result<(), AutocarError> {
        self.drive.enable()?;
        self.energised = true;
        self.heading.center()?;
        info!(drive = self.drive.id(), "drive enabled");
        Ok(())
    }

    /// `true` between a successful [`engage`][Self::engage] and the next
    /// [`shutdown`][Self::shutdown].
    pub fn is_energised(&self) -> bool {
        self.energised
    }

    /// Send `command` to the drive base.
    pub fn drive(&mut self, command: DriveCommand) -> Result<(), AutocarError> {
        self.drive.apply(command)
    }

    /// Direct access to the drive base, for multi-step maneuvers.
    pub fn drive_base(&mut self) -> &mut dyn DriveBase {
        self.drive.as_mut()
    }

    /// The heading actuator and the rangefinder it carries, borrowed together
    /// for a sweep.
    pub fn scan_head(&mut self) -> (&mut dyn HeadingActuator, &mut dyn RangeSensor) {
        (self.heading.as_mut(), self.ranging.as_mut())
    }

    /// Point the rangefinder straight ahead.
    pub fn center_heading(&mut self) -> Result<(), AutocarError> {
        self.heading.center()
    }

    /// Read the rangefinder and both proximity sensors.
    ///
    /// # Errors
    ///
    /// The first failing sensor aborts the read; no reading is substituted.
    pub fn read_sensors(&mut self) -> Result<SensorSnapshot, AutocarError> {
        let distance_cm = self.ranging.measure_cm()?;
        let left = self.left.read()?;
        let right = self.right.read()?;
        debug!(?left, ?right, distance_cm, "sensor snapshot");
        Ok(SensorSnapshot {
            left,
            right,
            distance_cm,
        })
    }

    /// Stop the drive and de-energise the drive-enable lines.
    ///
    /// Disable is attempted even when Stop fails.  The rig is marked
    /// de-energised regardless of the outcome; the first error is returned.
    #[instrument(skip(self), fields(drive = self.drive.id()))]
    pub fn shutdown(&mut self) -> Result<(), AutocarError> {
        let stopped = self.drive.stop();
        if let Err(ref e) = stopped {
            error!(error = %e, "stop failed during shutdown");
        }
        let disabled = self.drive.disable();
        if let Err(ref e) = disabled {
            error!(error = %e, "disable failed during shutdown");
        }
        self.energised = false;
        info!("drive stopped and disabled");
        stopped.and(disabled)
    }
}

impl Drop for Rig {
    fn drop(&mut self) {
        if self.energised {
            // Errors are already logged inside shutdown.
            let _ = self.shutdown();
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RigBuilder
// ────────────────────────────────────────────────────────────────────────────

/// Collects the drivers of a [`Rig`].
///
/// Call the `with_*` methods for every device, then [`build`][Self::build].
#[derive(Default)]
pub struct RigBuilder {
    drive: Option<Box<dyn DriveBase>>,
    heading: Option<Box<dyn HeadingActuator>>,
    ranging: Option<Box<dyn RangeSensor>>,
    left: Option<Box<dyn ProximitySensor>>,
    right: Option<Box<dyn ProximitySensor>>,
}

impl RigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the drive base.  Replaces any previously set driver.
    pub fn with_drive(mut self, drive: Box<dyn DriveBase>) -> Self {
        self.drive = Some(drive);
        self
    }

    pub fn with_heading(mut self, heading: Box<dyn HeadingActuator>) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_ranging(mut self, ranging: Box<dyn RangeSensor>) -> Self {
        self.ranging = Some(ranging);
        self
    }

    pub fn with_left_proximity(mut self, sensor: Box<dyn ProximitySensor>) -> Self {
        self.left = Some(sensor);
        self
    }

    pub fn with_right_proximity(mut self, sensor: Box<dyn ProximitySensor>) -> Self {
        self.right = Some(sensor);
        self
    }

    /// Consume the builder and return the rig, de-energised.
    ///
    /// # Errors
    ///
    /// Returns [`AutocarError::HardwareFault`] naming the first missing device.
    pub fn build(self) -> Result<Rig, AutocarError> {
        fn require<T>(slot: Option<T>, name: &str) -> Result<T, AutocarError> {
            slot.ok_or_else(|| AutocarError::hardware(name, format!("{name} is not registered")))
        }
        Ok(Rig::from_parts(
            require(self.drive, "drive")?,
            require(self.heading, "heading")?,
            require(self.ranging, "ranging")?,
            require(self.left, "left_proximity")?,
            require(self.right, "right_proximity")?,
        ))
    }
}
