use core::fmt;

use log::{debug, error};
#[allow(unused_imports)]
use micromath::F32Ext;

use super::ProfileError;
use crate::utils::cbrt;

/// A jerk-limited velocity transition between two velocities.
///
/// The jerk is `+jm`, `0`, `-jm` over the three phases, so the acceleration is
/// trapezoidal (or triangular when `a_max` is never reached) and the velocity
/// is a smooth S-curve. The segment always starts at `t = 0`, `x = 0`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionSegment {
    jm: f32,
    am: f32,
    t0: f32,
    t1: f32,
    t2: f32,
    t3: f32,
    v0: f32,
    v1: f32,
    v2: f32,
    v3: f32,
    x0: f32,
    x1: f32,
    x2: f32,
    x3: f32,
}

impl MotionSegment {
    pub fn new(j_max: f32, a_max: f32, v_start: f32, v_end: f32) -> Self {
        let mut segment = Self::default();
        segment.reset(j_max, a_max, v_start, v_end);
        segment
    }

    /// Recomputes every boundary from the given limits.
    ///
    /// `j_max` and `a_max` must be positive; their signs are derived from the
    /// direction of the velocity change.
    pub fn reset(&mut self, j_max: f32, a_max: f32, v_start: f32, v_end: f32) {
        self.am = if v_end > v_start { a_max } else { -a_max };
        self.jm = if v_end > v_start { j_max } else { -j_max };
        self.v0 = v_start;
        self.v3 = v_end;
        self.t0 = 0.0;
        self.x0 = 0.0;

        if (v_end - v_start).abs() < f32::EPSILON {
            self.t1 = self.t0;
            self.t2 = self.t0;
            self.t3 = self.t0;
            self.v1 = v_start;
            self.v2 = v_start;
            self.x1 = self.x0;
            self.x2 = self.x0;
            self.x3 = self.x0;
            return;
        }

        let tc = a_max / j_max;
        let tm = (self.v3 - self.v0) / self.am - tc;
        if tm > 0.0 {
            // jerk up, constant acceleration, jerk down
            self.t1 = self.t0 + tc;
            self.t2 = self.t1 + tm;
            self.t3 = self.t2 + tc;
            self.v1 = self.v0 + self.am * tc / 2.0;
            self.v2 = self.v1 + self.am * tm;
            self.x1 = self.x0 + self.v0 * tc + self.am * tc * tc / 6.0;
            self.x2 = self.x1 + self.v1 * tm + self.am * tm * tm / 2.0;
            self.x3 = self.x0 + (self.v0 + self.v3) / 2.0 * (self.t3 - self.t0);
        } else {
            // acceleration never saturates
            let tcp = ((self.v3 - self.v0) / self.jm).sqrt();
            self.t1 = self.t0 + tcp;
            self.t2 = self.t1;
            self.t3 = self.t2 + tcp;
            self.v1 = (self.v0 + self.v3) / 2.0;
            self.v2 = self.v1;
            self.x1 = self.x0 + self.v1 * tcp + self.jm * tcp * tcp * tcp / 6.0;
            self.x2 = self.x1;
            self.x3 = self.x0 + 2.0 * self.v1 * tcp;
        }
    }

    pub fn j(&self, t: f32) -> f32 {
        if t <= self.t0 {
            0.0
        } else if t <= self.t1 {
            self.jm
        } else if t <= self.t2 {
            0.0
        } else if t <= self.t3 {
            -self.jm
        } else {
            0.0
        }
    }

    pub fn a(&self, t: f32) -> f32 {
        if t <= self.t0 {
            0.0
        } else if t <= self.t1 {
            self.jm * (t - self.t0)
        } else if t <= self.t2 {
            self.am
        } else if t <= self.t3 {
            -self.jm * (t - self.t3)
        } else {
            0.0
        }
    }

    pub fn v(&self, t: f32) -> f32 {
        if t <= self.t0 {
            self.v0
        } else if t <= self.t1 {
            let dt = t - self.t0;
            self.v0 + self.jm / 2.0 * dt * dt
        } else if t <= self.t2 {
            self.v1 + self.am * (t - self.t1)
        } else if t <= self.t3 {
            let dt = t - self.t3;
            self.v3 - self.jm / 2.0 * dt * dt
        } else {
            self.v3
        }
    }

    pub fn x(&self, t: f32) -> f32 {
        if t <= self.t0 {
            self.x0 + self.v0 * (t - self.t0)
        } else if t <= self.t1 {
            let dt = t - self.t0;
            self.x0 + self.v0 * dt + self.jm / 6.0 * dt * dt * dt
        } else if t <= self.t2 {
            let dt = t - self.t1;
            self.x1 + self.v1 * dt + self.am / 2.0 * dt * dt
        } else if t <= self.t3 {
            let dt = t - self.t3;
            self.x3 + self.v3 * dt - self.jm / 6.0 * dt * dt * dt
        } else {
            self.x3 + self.v3 * (t - self.t3)
        }
    }

    pub fn t_end(&self) -> f32 {
        self.t3
    }

    pub fn v_end(&self) -> f32 {
        self.v3
    }

    pub fn x_end(&self) -> f32 {
        self.x3
    }

    /// Boundary times `[t0, t1, t2, t3]`.
    pub fn time_stamps(&self) -> [f32; 4] {
        [self.t0, self.t1, self.t2, self.t3]
    }

    /// Returns the velocity reachable from `vs` toward `vt` within the signed
    /// distance `d`.
    pub fn reachable_velocity_end(j_max: f32, a_max: f32, vs: f32, vt: f32, d: f32) -> f32 {
        if d.abs() < f32::EPSILON {
            return vs;
        }
        let tc = a_max / j_max;
        let am = if vt > vs { a_max } else { -a_max };
        let jm = if vt > vs { j_max } else { -j_max };
        // distance and end velocity of the triangular curve whose peak is `am`
        let d_triangle = (2.0 * vs + am * tc) * tc;
        let v_triangle = jm / am * d - vs;
        if d * v_triangle > 0.0 && d.abs() > d_triangle.abs() {
            debug!("reachable velocity: curve - straight - curve");
            let amtc = am * tc;
            let discriminant = amtc * amtc - 4.0 * (amtc * vs - vs * vs - 2.0 * am * d);
            let sqrt_d = discriminant.sqrt();
            return (-amtc + if d > 0.0 { sqrt_d } else { -sqrt_d }) / 2.0;
        }

        // depressed cubic solved on magnitudes, the sign is restored at the end
        let sign = if d > 0.0 { 1.0 } else { -1.0 };
        let a = vs.abs();
        let b = sign * jm * d * d;
        let aaa_27 = a * a * a / 27.0;
        let cr = 8.0 * aaa_27 + b / 2.0;
        let ci_b = 8.0 * aaa_27 / b + 0.25;
        if ci_b >= 0.0 {
            debug!("reachable velocity: curve - curve (cardano)");
            let c = cbrt(cr + b.abs() * ci_b.sqrt());
            sign * (c + 4.0 * a * a / c / 9.0 - a / 3.0)
        } else {
            debug!("reachable velocity: curve - curve (polar)");
            let ci = b.abs() * (-ci_b).sqrt();
            let r = cr.hypot(ci);
            let th = ci.atan2(cr);
            sign * (2.0 * cbrt(r) * (th / 3.0).cos() - a / 3.0)
        }
    }

    /// Returns the peak velocity of a two-segment curve from `vs` to `ve` that
    /// covers exactly `d`.
    pub fn reachable_velocity_max(
        j_max: f32,
        a_max: f32,
        vs: f32,
        ve: f32,
        d: f32,
    ) -> Result<f32, ProfileError> {
        let tc = a_max / j_max;
        let am = if d > 0.0 { a_max } else { -a_max };
        let amtc = am * tc;
        let discriminant = amtc * amtc - 2.0 * (vs + ve) * amtc
            + 4.0 * am * d
            + 2.0 * (vs * vs + ve * ve);
        // also rejects NaN
        if !(discriminant >= 0.0) {
            error!("negative discriminant: {}", discriminant);
            if vs * ve < 0.0 {
                error!("opposite velocities: vs: {}, ve: {}", vs, ve);
                return Err(ProfileError::OppositeVelocities {
                    v_start: vs,
                    v_end: ve,
                });
            }
            return Err(ProfileError::NegativeDiscriminant { discriminant });
        }
        let sqrt_d = discriminant.sqrt();
        Ok((-amtc + if d > 0.0 { sqrt_d } else { -sqrt_d }) / 2.0)
    }

    /// Distance covered by a segment from `v_start` to `v_end`.
    pub fn distance_from_velocity(j_max: f32, a_max: f32, v_start: f32, v_end: f32) -> f32 {
        let am = if v_end > v_start { a_max } else { -a_max };
        let jm = if v_end > v_start { j_max } else { -j_max };
        let tc = a_max / j_max;
        let tm = (v_end - v_start) / am - tc;
        let t_all = if tm > 0.0 {
            tc + tm + tc
        } else {
            2.0 * ((v_end - v_start) / jm).sqrt()
        };
        (v_start + v_end) / 2.0 * t_all
    }
}

impl fmt::Display for MotionSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "MotionSegment\tvs: {}\tve: {}\tt0: {}\tt1: {}\tt2: {}\tt3: {}\td: {}",
            self.v0,
            self.v3,
            self.t0,
            self.t1,
            self.t2,
            self.t3,
            self.x3 - self.x0
        )
    }
}
