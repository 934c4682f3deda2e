//! Directional sweep for the clearest heading.
//!
//! The rangefinder mount travels centre → 0° → 180° → centre in fixed
//! steps.  Each angle is sampled the first time it is reached; later visits
//! in the same sweep are skipped.  The heading with the largest distance
//! wins, and on a tie the one visited first wins.
//!
//! A sweep is synchronous with respect to the control loop: nothing else is
//! commanded until it returns.

use std::time::Duration;

use autocar_hal::{HeadingActuator, RangeSensor};
use autocar_hal::heading::{HEADING_CENTER_DEG, HEADING_MAX_DEG, HEADING_MIN_DEG};
use autocar_types::{AutocarError, ScanResult, ScanSample};
use tracing::{debug, info, instrument};

/// Angles visited by one sweep with the given step, in visit order, each
/// angle once.
///
/// A step of zero is treated as one.
pub fn sweep_pattern(step_deg: u8) -> Vec<u8> {
    let step = usize::from(step_deg.max(1));
    let to_min = (HEADING_MIN_DEG..=HEADING_CENTER_DEG).rev().step_by(step);
    let across = (HEADING_MIN_DEG..=HEADING_MAX_DEG).step_by(step);
    let back = (HEADING_CENTER_DEG..=HEADING_MAX_DEG).rev().step_by(step);

    let mut visited = [false; HEADING_MAX_DEG as usize + 1];
    to_min
        .chain(across)
        .chain(back)
        .filter(|&angle| !std::mem::replace(&mut visited[usize::from(angle)], true))
        .collect()
}

/// Pick the sample with the strictly largest distance; ties keep the
/// earlier sample.
pub fn select_best(samples: &[ScanSample]) -> Option<ScanResult> {
    let mut best: Option<&ScanSample> = None;
    for sample in samples {
        if best.is_none_or(|b| sample.distance_cm > b.distance_cm) {
            best = Some(sample);
        }
    }
    best.map(|b| ScanResult {
        best_angle_deg: b.angle_deg,
        best_distance_cm: b.distance_cm,
    })
}

/// A completed sweep: every sample in visit order plus the chosen heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    samples: Vec<ScanSample>,
    result: ScanResult,
}

impl Sweep {
    /// `None` when `samples` is empty.
    pub fn from_samples(samples: Vec<ScanSample>) -> Option<Self> {
        let result = select_best(&samples)?;
        Some(Self { samples, result })
    }

    pub fn samples(&self) -> &[ScanSample] {
        &self.samples
    }

    pub fn result(&self) -> ScanResult {
        self.result
    }
}

/// Drives the heading actuator through [`sweep_pattern`] and samples range
/// at every angle.
#[derive(Debug, Clone)]
pub struct DirectionalScanner {
    pattern: Vec<u8>,
    settle: Duration,
}

impl DirectionalScanner {
    /// `settle` is the wait between commanding an angle and sampling.
    pub fn new(step_deg: u8, settle: Duration) -> Self {
        Self {
            pattern: sweep_pattern(step_deg),
            settle,
        }
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// Run one full sweep.
    ///
    /// # Errors
    ///
    /// Any actuator or rangefinder fault aborts the sweep immediately.
    #[instrument(skip_all, fields(angles = self.pattern.len()))]
    pub async fn sweep(
        &self,
        heading: &mut dyn HeadingActuator,
        ranging: &mut dyn RangeSensor,
    ) -> Result<Sweep, AutocarError> {
        let mut samples = Vec::with_capacity(self.pattern.len());
        for &angle_deg in &self.pattern {
            heading.point(angle_deg)?;
            tokio::time::sleep(self.settle).await;
            let distance_cm = ranging.measure_cm()?;
            debug!(angle_deg, distance_cm, "sweep sample");
            samples.push(ScanSample {
                angle_deg,
                distance_cm,
            });
        }
        let sweep = Sweep::from_samples(samples).ok_or_else(|| {
            AutocarError::hardware(heading.id(), "sweep pattern is empty")
        })?;
        info!(
            best_angle_deg = sweep.result.best_angle_deg,
            best_distance_cm = sweep.result.best_distance_cm,
            "sweep complete"
        );
        Ok(sweep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocar_hal::sim::{SimHeading, SimRangeSensor};

    fn sample(angle_deg: u8, distance_cm: f32) -> ScanSample {
        ScanSample {
            angle_deg,
            distance_cm,
        }
    }

    #[test]
    fn pattern_visits_each_angle_once_in_sweep_order() {
        let pattern = sweep_pattern(5);
        assert_eq!(pattern.len(), 37);
        assert_eq!(&pattern[..3], &[90, 85, 80]);
        assert_eq!(pattern[18], 0);
        assert_eq!(pattern[19], 95);
        assert_eq!(*pattern.last().unwrap(), 180);

        let mut sorted = pattern.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), pattern.len());
    }

    #[test]
    fn pattern_with_uneven_step_covers_return_leg() {
        // 90,83,..,6 then 0,7,..,175 (new ones only) then 180,173,..,96 (new ones only)
        let pattern = sweep_pattern(7);
        assert_eq!(pattern[0], 90);
        assert!(pattern.contains(&0));
        assert!(pattern.contains(&180));
        assert!(pattern.contains(&96));
        assert!(pattern.iter().all(|&a| a <= 180));
    }

    #[test]
    fn zero_step_is_treated_as_one() {
        assert_eq!(sweep_pattern(0).len(), 181);
    }

    #[test]
    fn best_is_strict_maximum() {
        let samples = [sample(90, 30.0), sample(45, 120.0), sample(135, 80.0)];
        let best = select_best(&samples).unwrap();
        assert_eq!(best.best_angle_deg, 45);
        assert_eq!(best.best_distance_cm, 120.0);
    }

    #[test]
    fn tie_goes_to_first_visited() {
        let samples = [sample(90, 10.0), sample(40, 200.0), sample(150, 200.0)];
        assert_eq!(select_best(&samples).unwrap().best_angle_deg, 40);
    }

    #[test]
    fn empty_samples_have_no_best() {
        assert!(select_best(&[]).is_none());
        assert!(Sweep::from_samples(Vec::new()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_samples_every_pattern_angle() {
        let mut servo = SimHeading::new("servo");
        let mut range = SimRangeSensor::by_heading(servo.log(), |angle| {
            // Wall everywhere except an opening around 150°.
            if (140..=160).contains(&angle) { 300.0 } else { 20.0 }
        });
        let scanner = DirectionalScanner::new(5, Duration::from_millis(50));

        let started = tokio::time::Instant::now();
        let sweep = scanner.sweep(&mut servo, &mut range).await.unwrap();

        assert_eq!(sweep.samples().len(), 37);
        assert_eq!(servo.log().snapshot(), scanner.pattern());
        // First visited angle of the opening in sweep order.
        assert_eq!(sweep.result().best_angle_deg, 140);
        assert_eq!(sweep.result().best_distance_cm, 300.0);
        assert!(started.elapsed() >= Duration::from_millis(50 * 37));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_tie_prefers_earlier_visit() {
        let mut servo = SimHeading::new("servo");
        // 60° is visited on the first leg, 120° on the second; both read 250.
        let mut range = SimRangeSensor::by_heading(servo.log(), |angle| match angle {
            60 | 120 => 250.0,
            _ => 50.0,
        });
        let scanner = DirectionalScanner::new(5, Duration::from_millis(50));
        let sweep = scanner.sweep(&mut servo, &mut range).await.unwrap();
        assert_eq!(sweep.result().best_angle_deg, 60);
    }

    #[tokio::test(start_paused = true)]
    async fn sensor_fault_aborts_sweep() {
        let mut servo = SimHeading::new("servo");
        let mut range = SimRangeSensor::constant(100.0).failing_after(3);
        let scanner = DirectionalScanner::new(5, Duration::from_millis(50));
        let err = scanner.sweep(&mut servo, &mut range).await.unwrap_err();
        assert!(matches!(err, AutocarError::HardwareFault { .. }));
        assert_eq!(servo.log().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn actuator_fault_aborts_sweep() {
        let mut servo = SimHeading::new("servo").failing_after(0);
        let mut range = SimRangeSensor::constant(100.0);
        let scanner = DirectionalScanner::new(10, Duration::from_millis(50));
        assert!(scanner.sweep(&mut servo, &mut range).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_contract_reading_is_a_fault() {
        let mut servo = SimHeading::new("servo");
        let mut range = SimRangeSensor::scripted([40.0, f32::NAN]);
        let scanner = DirectionalScanner::new(30, Duration::from_millis(10));
        assert!(scanner.sweep(&mut servo, &mut range).await.is_err());
    }
}
