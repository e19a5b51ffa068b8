mod segment;

use core::fmt;

use log::{debug, warn};
#[allow(unused_imports)]
use micromath::F32Ext;
use serde::{Deserialize, Serialize};

pub use segment::MotionSegment;

const DEFAULT_TOLERANCE: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProfileError {
    NegativeDiscriminant { discriminant: f32 },
    OppositeVelocities { v_start: f32, v_end: f32 },
    TimeOrder { t0: f32, t1: f32, t2: f32, t3: f32 },
    VelocitySaturation { v_sat: f32, bound: f32 },
    EndVelocity { v_end: f32, v_target: f32 },
    DistanceMismatch { expected: f32, actual: f32 },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NegativeDiscriminant { discriminant } => {
                write!(f, "discriminant is negative: {}", discriminant)
            }
            Self::OppositeVelocities { v_start, v_end } => write!(
                f,
                "start and end velocities have opposite signs: vs: {}, ve: {}",
                v_start, v_end
            ),
            Self::TimeOrder { t0, t1, t2, t3 } => write!(
                f,
                "time stamps are out of order: t0: {}, t1: {}, t2: {}, t3: {}",
                t0, t1, t2, t3
            ),
            Self::VelocitySaturation { v_sat, bound } => write!(
                f,
                "saturation velocity {} exceeds the bound {}",
                v_sat, bound
            ),
            Self::EndVelocity { v_end, v_target } => write!(
                f,
                "end velocity {} is farther from the start than the target {}",
                v_end, v_target
            ),
            Self::DistanceMismatch { expected, actual } => write!(
                f,
                "travelled distance {} does not match the request {}",
                actual, expected
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProfileError {}

/// Magnitudes of the kinematic limits. All of them must be positive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub j_max: f32,
    pub a_max: f32,
    pub v_max: f32,
}

impl Limits {
    pub fn new(j_max: f32, a_max: f32, v_max: f32) -> Self {
        Self {
            j_max,
            a_max,
            v_max,
        }
    }

    /// Limits for replaying the same path `gain` times faster.
    pub fn scaled(&self, gain: f32) -> Self {
        Self {
            j_max: gain * gain * gain * self.j_max,
            a_max: gain * gain * self.a_max,
            v_max: gain * self.v_max,
        }
    }
}

/// A jerk-limited motion that covers an exact signed distance.
///
/// The motion consists of an accelerating segment, an optional constant
/// velocity phase and a decelerating segment. When the target velocity or the
/// velocity bound cannot be reached within the distance they are lowered, so
/// the distance is always honored.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionProfile {
    limits: Limits,
    v_start: f32,
    v_target: f32,
    ac: MotionSegment,
    dc: MotionSegment,
    x0: f32,
    x3: f32,
    t0: f32,
    t1: f32,
    t2: f32,
    t3: f32,
}

impl MotionProfile {
    /// Builds a profile, keeping the fallback motion on a domain error.
    pub fn new(
        limits: &Limits,
        v_start: f32,
        v_target: f32,
        distance: f32,
        x_start: f32,
        t_start: f32,
    ) -> Self {
        let mut profile = Self::default();
        // the error is logged and the profile still holds a usable motion
        let _ = profile.reset(limits, v_start, v_target, distance, x_start, t_start);
        profile
    }

    pub fn try_new(
        limits: &Limits,
        v_start: f32,
        v_target: f32,
        distance: f32,
        x_start: f32,
        t_start: f32,
    ) -> Result<Self, ProfileError> {
        let mut profile = Self::default();
        profile.reset(limits, v_start, v_target, distance, x_start, t_start)?;
        Ok(profile)
    }

    /// Recomputes the whole profile.
    ///
    /// On `Err` the profile has been built with the start velocity as the peak
    /// velocity and can still be evaluated.
    pub fn reset(
        &mut self,
        limits: &Limits,
        v_start: f32,
        v_target: f32,
        distance: f32,
        x_start: f32,
        t_start: f32,
    ) -> Result<(), ProfileError> {
        let Limits {
            j_max,
            a_max,
            v_max,
        } = *limits;
        let mut result = Ok(());

        let mut v_end = v_target;
        let d_min = MotionSegment::distance_from_velocity(j_max, a_max, v_start, v_target);
        if distance.abs() < d_min.abs() {
            v_end = MotionSegment::reachable_velocity_end(j_max, a_max, v_start, v_target, distance);
            debug!(
                "target velocity {} is unreachable, lowered to {}",
                v_target, v_end
            );
        }

        let mut v_sat = if distance > 0.0 {
            v_start.max(v_max).max(v_end)
        } else {
            v_start.min(-v_max).min(v_end)
        };
        self.ac.reset(j_max, a_max, v_start, v_sat);
        self.dc.reset(j_max, a_max, v_sat, v_end);

        if distance.abs() < (self.ac.x_end() + self.dc.x_end()).abs() {
            let v_rm = match MotionSegment::reachable_velocity_max(
                j_max, a_max, v_start, v_end, distance,
            ) {
                Ok(v_rm) => v_rm,
                Err(err) => {
                    result = Err(err);
                    v_start
                }
            };
            // never decelerate below the end velocity only to reaccelerate
            v_sat = if distance > 0.0 {
                v_start.max(v_rm).max(v_end)
            } else {
                v_start.min(v_rm).min(v_end)
            };
            debug!("velocity bound is unreachable, peak lowered to {}", v_sat);
            self.ac.reset(j_max, a_max, v_start, v_sat);
            self.dc.reset(j_max, a_max, v_sat, v_end);
        }

        if v_sat.abs() < f32::EPSILON {
            v_sat = 1.0;
        }
        let t23 = (distance - self.ac.x_end() - self.dc.x_end()) / v_sat;

        self.limits = *limits;
        self.v_start = v_start;
        self.v_target = v_target;
        self.x0 = x_start;
        self.x3 = x_start + distance;
        self.t0 = t_start;
        self.t1 = self.t0 + self.ac.t_end();
        self.t2 = self.t1 + t23;
        self.t3 = self.t2 + self.dc.t_end();

        if result.is_ok() {
            if let Err(err) = self.verify(DEFAULT_TOLERANCE) {
                warn!("{}: {}", err, self);
            }
        }
        result
    }

    /// Checks the computed profile for numerical drift.
    pub fn verify(&self, tolerance: f32) -> Result<(), ProfileError> {
        if !(self.t0 <= self.t1 + tolerance
            && self.t1 <= self.t2 + tolerance
            && self.t2 <= self.t3 + tolerance)
        {
            return Err(ProfileError::TimeOrder {
                t0: self.t0,
                t1: self.t1,
                t2: self.t2,
                t3: self.t3,
            });
        }
        let bound = self
            .limits
            .v_max
            .max(self.v_start.abs())
            .max(self.v_end().abs());
        if self.v_sat().abs() > bound + tolerance {
            return Err(ProfileError::VelocitySaturation {
                v_sat: self.v_sat(),
                bound,
            });
        }
        if (self.v_start - self.v_end()).abs() > (self.v_start - self.v_target).abs() + tolerance
        {
            return Err(ProfileError::EndVelocity {
                v_end: self.v_end(),
                v_target: self.v_target,
            });
        }
        let actual = self.ac.x(self.t2 - self.t0) + self.dc.x_end();
        let expected = self.x3 - self.x0;
        if (actual - expected).abs() > tolerance {
            return Err(ProfileError::DistanceMismatch { expected, actual });
        }
        Ok(())
    }

    pub fn j(&self, t: f32) -> f32 {
        if t < self.t2 {
            self.ac.j(t - self.t0)
        } else {
            self.dc.j(t - self.t2)
        }
    }

    pub fn a(&self, t: f32) -> f32 {
        if t < self.t2 {
            self.ac.a(t - self.t0)
        } else {
            self.dc.a(t - self.t2)
        }
    }

    pub fn v(&self, t: f32) -> f32 {
        if t < self.t2 {
            self.ac.v(t - self.t0)
        } else {
            self.dc.v(t - self.t2)
        }
    }

    pub fn x(&self, t: f32) -> f32 {
        if t < self.t2 {
            self.x0 + self.ac.x(t - self.t0)
        } else {
            self.x3 - self.dc.x_end() + self.dc.x(t - self.t2)
        }
    }

    pub fn t_start(&self) -> f32 {
        self.t0
    }

    pub fn t_end(&self) -> f32 {
        self.t3
    }

    pub fn v_start(&self) -> f32 {
        self.v_start
    }

    pub fn v_end(&self) -> f32 {
        self.dc.v_end()
    }

    /// The peak velocity, i.e. the coasting velocity.
    pub fn v_sat(&self) -> f32 {
        self.dc.v(0.0)
    }

    pub fn x_end(&self) -> f32 {
        self.x3
    }

    /// Boundary times `[t0, t1, t2, t3]` of the profile.
    pub fn boundaries(&self) -> [f32; 4] {
        [self.t0, self.t1, self.t2, self.t3]
    }

    /// The eight phase boundaries of both segments in absolute time.
    pub fn time_stamps(&self) -> [f32; 8] {
        let [a0, a1, a2, a3] = self.ac.time_stamps();
        let [d0, d1, d2, d3] = self.dc.time_stamps();
        [
            self.t0 + a0,
            self.t0 + a1,
            self.t0 + a2,
            self.t0 + a3,
            self.t2 + d0,
            self.t2 + d1,
            self.t2 + d2,
            self.t2 + d3,
        ]
    }

    pub fn accel_segment(&self) -> &MotionSegment {
        &self.ac
    }

    pub fn decel_segment(&self) -> &MotionSegment {
        &self.dc
    }
}

impl fmt::Display for MotionProfile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "MotionProfile\tx: {}\tv0: {}\tv1: {}\tv3: {}\tt0: {}\tt1: {}\tt2: {}\tt3: {}",
            self.x3 - self.x0,
            self.v_start,
            self.v_sat(),
            self.v_end(),
            self.t0,
            self.t1,
            self.t2,
            self.t3
        )
    }
}
