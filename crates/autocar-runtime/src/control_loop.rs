//! [`ControlLoop`] – the single cooperative scheduler.
//!
//! Each tick:
//!
//! 1. **Poll** the joystick link, waiting at most the read timeout.
//! 2. **Arbitrate** the mode from the switch.  A toggle stops the drive and
//!    holds for the settle delay before the new mode acts.
//! 3. **Act**:
//!    - *Manual*: translate the joystick axes and drive.
//!    - *Autonomous*: read the sensors.  With the path clear, cruise forward.
//!      On an obstacle, stop, sweep for the clearest heading, re-centre the
//!      rangefinder and run the maneuver.  Sweep and maneuver block the tick
//!      until they finish.
//! 4. **Pace**: sleep the tick delay.
//!
//! # Teardown
//!
//! [`ControlLoop::run`] engages the rig and ticks until the shutdown signal
//! fires, the session ends (under [`SessionEndPolicy::Exit`]), or a tick
//! fails.  On every one of those paths it then stops the drive, de-energises
//! it and closes the session before returning.  A hardware fault is returned
//! only after that teardown.

use autocar_hal::Rig;
use autocar_kernel::{DriveTranslator, ModeArbiter};
use autocar_middleware::{JoystickLink, LinkEvent};
use autocar_perception::{DirectionalScanner, DistanceHistory, ObstacleDetector, Sweep};
use autocar_types::{
    AutocarError, DriveCommand, JoystickState, Mode, SessionEndPolicy, VehicleConfig,
};
use tokio::io::AsyncRead;
use tracing::{debug, info, instrument, warn};

use crate::maneuver::ManeuverExecutor;
use crate::shutdown::ShutdownSignal;

/// Why [`ControlLoop::run`] returned without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The shutdown signal fired.
    Shutdown,
    /// The joystick session closed and the policy is to exit.
    SessionEnded,
}

/// Result of one [`ControlLoop::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    SessionEnded,
}

pub struct ControlLoop<S> {
    config: VehicleConfig,
    rig: Rig,
    link: Option<JoystickLink<S>>,
    joystick: JoystickState,
    arbiter: ModeArbiter,
    translator: DriveTranslator,
    detector: ObstacleDetector,
    scanner: DirectionalScanner,
    maneuver: ManeuverExecutor,
    history: DistanceHistory,
    last_sweep: Option<Sweep>,
    last_manual: Option<DriveCommand>,
    shutdown: ShutdownSignal,
}

impl<S: AsyncRead + Unpin> ControlLoop<S> {
    /// Wire every component from one validated `config`.
    pub fn new(
        config: VehicleConfig,
        rig: Rig,
        link: JoystickLink<S>,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            arbiter: ModeArbiter::new(config.debounce()),
            translator: DriveTranslator::new(config.deadzone, config.manual_speed),
            detector: ObstacleDetector::new(config.front_threshold_cm),
            scanner: DirectionalScanner::new(config.sweep_step_deg, config.sweep_settle()),
            maneuver: ManeuverExecutor::new(&config),
            history: DistanceHistory::new(config.history_capacity),
            joystick: link.state(),
            link: Some(link),
            last_sweep: None,
            last_manual: None,
            rig,
            shutdown,
            config,
        }
    }

    pub fn mode(&self) -> Mode {
        self.arbiter.mode()
    }

    /// Joystick state as of the last poll.
    pub fn joystick(&self) -> JoystickState {
        self.joystick
    }

    pub fn session_open(&self) -> bool {
        self.link.is_some()
    }

    /// The most recent completed sweep, samples included.
    pub fn last_sweep(&self) -> Option<&Sweep> {
        self.last_sweep.as_ref()
    }

    pub fn history(&self) -> &DistanceHistory {
        &self.history
    }

    /// Engage the rig and tick until shutdown, session end, or a fault.
    /// Teardown always runs before this returns.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<LoopExit, AutocarError> {
        let outcome = self.run_until_exit().await;

        let teardown = self.rig.shutdown();
        if self.link.take().is_some() {
            info!("joystick session closed");
        }

        match &outcome {
            Ok(exit) => info!(?exit, "control loop stopped"),
            Err(e) => warn!(error = %e, "control loop aborted"),
        }
        outcome.and_then(|exit| teardown.map(|()| exit))
    }

    async fn run_until_exit(&mut self) -> Result<LoopExit, AutocarError> {
        self.rig.engage()?;
        info!(mode = %self.mode(), "control loop running");

        let shutdown = self.shutdown.clone();
        loop {
            if shutdown.is_triggered() {
                return Ok(LoopExit::Shutdown);
            }
            tokio::select! {
                biased;
                _ = shutdown.wait() => return Ok(LoopExit::Shutdown),
                tick = self.tick() => {
                    if tick? == TickOutcome::SessionEnded {
                        return Ok(LoopExit::SessionEnded);
                    }
                }
            }
        }
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Any hardware fault or non-recoverable link error.  The caller owns
    /// teardown; [`run`][Self::run] handles it.
    pub async fn tick(&mut self) -> Result<TickOutcome, AutocarError> {
        if self.poll_link().await? == TickOutcome::SessionEnded {
            return Ok(TickOutcome::SessionEnded);
        }

        let now = tokio::time::Instant::now().into_std();
        if self.arbiter.update(self.joystick.switch(), now).is_some() {
            self.rig.drive(DriveCommand::Stop)?;
            self.last_manual = None;
            tokio::time::sleep(self.config.mode_settle()).await;
        }

        match self.arbiter.mode() {
            Mode::Manual => self.manual_step()?,
            Mode::Autonomous => self.autonomous_step().await?,
        }

        tokio::time::sleep(self.config.tick_delay()).await;
        Ok(TickOutcome::Continue)
    }

    async fn poll_link(&mut self) -> Result<TickOutcome, AutocarError> {
        let Some(link) = self.link.as_mut() else {
            return Ok(TickOutcome::Continue);
        };
        match link.poll().await? {
            LinkEvent::Idle => {}
            LinkEvent::Data { .. } => self.joystick = link.state(),
            LinkEvent::Closed => match self.config.session_end {
                SessionEndPolicy::Exit => return Ok(TickOutcome::SessionEnded),
                SessionEndPolicy::Continue => {
                    warn!("joystick session ended; continuing with last known state");
                    self.joystick = link.state();
                    self.link = None;
                }
            },
        }
        Ok(TickOutcome::Continue)
    }

    fn manual_step(&mut self) -> Result<(), AutocarError> {
        let command = self.translator.translate(self.joystick.x(), self.joystick.y());
        if self.last_manual != Some(command) {
            debug!(?command, x = self.joystick.x(), y = self.joystick.y(), "manual command");
        }
        self.last_manual = Some(command);
        self.rig.drive(command)
    }

    async fn autonomous_step(&mut self) -> Result<(), AutocarError> {
        let snapshot = self.rig.read_sensors()?;
        self.history.push(snapshot.distance_cm);

        let Some(cause) = self.detector.assess(&snapshot) else {
            return self.rig.drive(DriveCommand::Forward(self.config.cruise_speed));
        };

        info!(
            ?cause,
            distance_cm = snapshot.distance_cm,
            threshold_cm = self.detector.front_threshold_cm(),
            left = ?snapshot.left,
            right = ?snapshot.right,
            "obstacle detected, stopping"
        );
        self.rig.drive(DriveCommand::Stop)?;
        tokio::time::sleep(self.config.maneuver_settle()).await;

        let (heading, ranging) = self.rig.scan_head();
        let sweep = self.scanner.sweep(heading, ranging).await?;
        let target = sweep.result();
        self.last_sweep = Some(sweep);

        self.rig.center_heading()?;
        let decision = self.maneuver.execute(self.rig.drive_base(), &target).await?;
        info!(?decision, best_angle_deg = target.best_angle_deg, "maneuver complete");

        if let Some(stats) = self.history.stats() {
            info!(
                readings = stats.count,
                mean_cm = stats.mean,
                median_cm = stats.median,
                min_cm = stats.min,
                max_cm = stats.max,
                stdev_cm = stats.stdev,
                "front distance history"
            );
        }
        Ok(())
    }
}
