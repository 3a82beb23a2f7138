//! Timed trajectories

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{
    geom::Pose2,
    units::Angle,
};
use util::maths::lerp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single point on a trajectory.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimedSample {
    /// Time at which the robot should reach this sample.
    ///
    /// Units: seconds
    pub t_s: f64,

    /// Units: meters
    pub x_m: f64,

    /// Units: meters
    pub y_m: f64,

    /// Units: radians
    pub heading_rad: f64,

    /// Curvature of the path, positive turning anticlockwise.
    ///
    /// Units: 1/meters
    pub curvature_m: f64,

    /// Units: meters/second
    pub vel_ms: f64,

    /// Units: meters/second^2
    pub accel_mss: f64,
}

/// A validated trajectory.
///
/// Samples are non-empty, finite and strictly increasing in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedTrajectory {
    samples: Vec<TimedSample>,
}

/// Layout of a trajectory file.
#[derive(Deserialize)]
struct TrajectoryFile {
    samples: Vec<TimedSample>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    #[error("The trajectory has no samples")]
    Empty,

    #[error("Sample {0} contains a non-finite value")]
    NonFinite(usize),

    #[error("Sample {0} is not after the previous sample")]
    NonIncreasingTime(usize),

    #[error("Cannot load the trajectory file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot parse the trajectory file: {0}")]
    DeserialiseError(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TimedSample {
    pub fn pose(&self) -> Pose2 {
        Pose2::from_m_rad(self.x_m, self.y_m, self.heading_rad)
    }

    /// Angular velocity of the sample.
    ///
    /// Units: radians/second
    pub fn omega_rads(&self) -> f64 {
        self.vel_ms * self.curvature_m
    }

    fn is_finite(&self) -> bool {
        [
            self.t_s,
            self.x_m,
            self.y_m,
            self.heading_rad,
            self.curvature_m,
            self.vel_ms,
            self.accel_mss,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Interpolate between this sample and `other`, `frac` being 0 at `self` and 1 at `other`.
    fn interpolate(&self, other: &TimedSample, frac: f64) -> TimedSample {
        let heading_diff = (Angle::from_rad(other.heading_rad) - Angle::from_rad(self.heading_rad))
            .wrapped()
            .rad();

        TimedSample {
            t_s: lerp(self.t_s, other.t_s, frac),
            x_m: lerp(self.x_m, other.x_m, frac),
            y_m: lerp(self.y_m, other.y_m, frac),
            heading_rad: Angle::from_rad(self.heading_rad + heading_diff * frac)
                .wrapped()
                .rad(),
            curvature_m: lerp(self.curvature_m, other.curvature_m, frac),
            vel_ms: lerp(self.vel_ms, other.vel_ms, frac),
            accel_mss: lerp(self.accel_mss, other.accel_mss, frac),
        }
    }
}

impl TimedTrajectory {
    pub fn new(samples: Vec<TimedSample>) -> Result<Self, TrajectoryError> {
        if samples.is_empty() {
            return Err(TrajectoryError::Empty);
        }

        for (i, s) in samples.iter().enumerate() {
            if !s.is_finite() {
                return Err(TrajectoryError::NonFinite(i));
            }
            if i > 0 && s.t_s <= samples[i - 1].t_s {
                return Err(TrajectoryError::NonIncreasingTime(i));
            }
        }

        Ok(Self { samples })
    }

    /// Load a trajectory from a JSON file of the form `{"samples": [...]}`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TrajectoryError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| TrajectoryError::FileLoadError(path.to_path_buf(), e))?;

        Self::from_json(&s)
    }

    pub fn from_json(json_str: &str) -> Result<Self, TrajectoryError> {
        let file: TrajectoryFile =
            serde_json::from_str(json_str).map_err(TrajectoryError::DeserialiseError)?;

        Self::new(file.samples)
    }

    pub fn samples(&self) -> &[TimedSample] {
        &self.samples
    }

    pub fn first(&self) -> &TimedSample {
        &self.samples[0]
    }

    pub fn last(&self) -> &TimedSample {
        &self.samples[self.samples.len() - 1]
    }

    /// Time of the first sample.
    ///
    /// Units: seconds
    pub fn start_time_s(&self) -> f64 {
        self.first().t_s
    }

    /// Units: seconds
    pub fn duration_s(&self) -> f64 {
        self.last().t_s - self.first().t_s
    }

    /// Sample the trajectory at time `t_s`, clamping to the first or last sample outside the
    /// trajectory.
    pub fn sample(&self, t_s: f64) -> TimedSample {
        if t_s <= self.first().t_s {
            return *self.first();
        }
        if t_s >= self.last().t_s {
            return *self.last();
        }

        // Index of the first sample after t
        let i = self.samples.partition_point(|s| s.t_s <= t_s);
        let (a, b) = (&self.samples[i - 1], &self.samples[i]);

        a.interpolate(b, (t_s - a.t_s) / (b.t_s - a.t_s))
    }

    /// Index of the first sample strictly after `t_s`, or `None` if there isn't one.
    pub(crate) fn next_index(&self, t_s: f64) -> Option<usize> {
        let i = self.samples.partition_point(|s| s.t_s <= t_s);

        if i < self.samples.len() {
            Some(i)
        } else {
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    pub fn sample(t_s: f64, x_m: f64, vel_ms: f64) -> TimedSample {
        TimedSample {
            t_s,
            x_m,
            vel_ms,
            ..Default::default()
        }
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            TimedTrajectory::new(vec![]),
            Err(TrajectoryError::Empty)
        ));
        assert!(matches!(
            TimedTrajectory::new(vec![sample(0.0, 0.0, 1.0), sample(0.0, 1.0, 1.0)]),
            Err(TrajectoryError::NonIncreasingTime(1))
        ));
        assert!(matches!(
            TimedTrajectory::new(vec![sample(0.0, 0.0, 1.0), sample(1.0, f64::NAN, 1.0)]),
            Err(TrajectoryError::NonFinite(1))
        ));

        // A single sample is a valid, zero length, trajectory
        let t = TimedTrajectory::new(vec![sample(2.0, 0.0, 0.0)]).unwrap();
        assert_eq!(t.duration_s(), 0.0);
        assert_eq!(t.sample(100.0), sample(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_sample() {
        let t = TimedTrajectory::new(vec![
            sample(1.0, 0.0, 0.0),
            sample(2.0, 1.0, 2.0),
            sample(4.0, 2.0, 2.0),
        ])
        .unwrap();

        assert_eq!(t.start_time_s(), 1.0);
        assert_eq!(t.duration_s(), 3.0);

        // Clamped outside
        assert_eq!(t.sample(0.0), *t.first());
        assert_eq!(t.sample(5.0), *t.last());

        let s = t.sample(1.5);
        assert_relative_eq!(s.x_m, 0.5);
        assert_relative_eq!(s.vel_ms, 1.0);

        let s = t.sample(3.0);
        assert_relative_eq!(s.x_m, 1.5);
        assert_relative_eq!(s.t_s, 3.0);

        // Exactly on a sample
        assert_eq!(t.sample(2.0).x_m, 1.0);
    }

    #[test]
    fn test_heading_interpolation_wraps() {
        let mut a = sample(0.0, 0.0, 0.0);
        a.heading_rad = PI - 0.1;
        let mut b = sample(1.0, 0.0, 0.0);
        b.heading_rad = -PI + 0.1;

        let t = TimedTrajectory::new(vec![a, b]).unwrap();
        assert_relative_eq!(t.sample(0.5).heading_rad.abs(), PI, epsilon = 1e-9);
    }

    #[test]
    fn test_from_json() {
        let t = TimedTrajectory::from_json(
            r#"{"samples": [
                {"t_s": 0.0, "x_m": 0.0, "y_m": 0.0, "heading_rad": 0.0, "curvature_m": 0.0,
                 "vel_ms": 1.0, "accel_mss": 0.0},
                {"t_s": 1.0, "x_m": 1.0, "y_m": 0.0, "heading_rad": 0.0, "curvature_m": 0.0,
                 "vel_ms": 1.0, "accel_mss": 0.0}
            ]}"#,
        )
        .unwrap();
        assert_eq!(t.samples().len(), 2);

        assert!(matches!(
            TimedTrajectory::from_json(r#"{"samples": []}"#),
            Err(TrajectoryError::Empty)
        ));
        assert!(matches!(
            TimedTrajectory::from_json("[]"),
            Err(TrajectoryError::DeserialiseError(_))
        ));
    }
}
