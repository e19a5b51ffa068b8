use core::f32::consts::PI;
use core::fmt;

use log::trace;
#[allow(unused_imports)]
use micromath::F32Ext;
use serde::{Deserialize, Serialize};
use uom::si::{
    acceleration::meter_per_second_squared,
    angle::radian,
    angular_acceleration::radian_per_second_squared,
    angular_jerk::radian_per_second_cubed,
    angular_velocity::radian_per_second,
    f32::{
        Acceleration, Angle, AngularAcceleration, AngularJerk, AngularVelocity, Jerk, Length,
        Velocity,
    },
    jerk::meter_per_second_cubed,
    length::{meter, millimeter},
    velocity::{meter_per_second, millimeter_per_second},
};

use crate::pose::Pose;
use crate::profile::{Limits, MotionProfile, ProfileError};
use crate::state::State;

// integration period of the calibration
const CALIBRATION_PERIOD: f32 = 1.5e-3;
const CALIBRATION_ITERATIONS: usize = 3;
const INITIAL_VELOCITY: f32 = 0.6;

/// Bounds of the heading motion during a turn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngularLimits {
    pub jerk: AngularJerk,
    pub acceleration: AngularAcceleration,
    pub velocity: AngularVelocity,
}

impl Default for AngularLimits {
    fn default() -> Self {
        Self {
            jerk: AngularJerk::new::<radian_per_second_cubed>(1200.0 * PI),
            acceleration: AngularAcceleration::new::<radian_per_second_squared>(36.0 * PI),
            velocity: AngularVelocity::new::<radian_per_second>(3.0 * PI),
        }
    }
}

impl AngularLimits {
    pub(crate) fn to_limits(self) -> Limits {
        Limits::new(
            self.jerk.get::<radian_per_second_cubed>(),
            self.acceleration.get::<radian_per_second_squared>(),
            self.velocity.get::<radian_per_second>(),
        )
    }
}

/// The geometry of a turn calibrated for a reference velocity.
///
/// A turn is a straight of `straight_prev`, the curve and a straight of
/// `straight_post`, which together move the robot by `total`. The fields
/// depend on each other, so they are only produced by [`TurnShape::new`] or
/// restored from a previous calibration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnShape {
    pub total: Pose,
    pub curve: Pose,
    pub straight_prev: Length,
    pub straight_post: Length,
    pub v_ref: Velocity,
    pub limits: AngularLimits,
}

impl TurnShape {
    /// Calibrates the turn so that the curve ends `y_curve_end` away from the
    /// start line.
    ///
    /// `x_adv` is the length of both straights of a turn whose heading change
    /// is a multiple of 180 degrees. It is ignored otherwise.
    pub fn new(
        total: Pose,
        y_curve_end: Length,
        x_adv: Length,
        limits: &AngularLimits,
    ) -> Result<Self, ProfileError> {
        let total_theta = total.theta.get::<radian>();
        let y_curve_end = y_curve_end.get::<meter>();
        let profile =
            MotionProfile::try_new(&limits.to_limits(), 0.0, 0.0, total_theta, 0.0, 0.0)?;

        let mut v = INITIAL_VELOCITY;
        let mut state = State::default();
        for i in 0..CALIBRATION_ITERATIONS {
            state.x.x = Default::default();
            state.y.x = Default::default();
            let mut t = 0.0;
            while t + CALIBRATION_PERIOD < profile.t_end() {
                Self::integrate(&profile, &mut state, v, t, CALIBRATION_PERIOD, 0.0);
                t += CALIBRATION_PERIOD;
            }
            Self::integrate(&profile, &mut state, v, t, profile.t_end() - t, 0.0);

            let y = state.y.x.get::<meter>();
            if y.abs() < f32::EPSILON {
                break;
            }
            v *= y_curve_end / y;
            trace!("calibration {}: v: {} m/s, y: {} m", i, v, y);
        }

        let mut curve = state.pose();
        let sin_th = total_theta.sin();
        let cos_th = total_theta.cos();
        let (straight_prev, straight_post) = if sin_th.abs() < 1e-3 {
            curve = total;
            (x_adv, x_adv)
        } else {
            (
                total.x - curve.x - (total.y - curve.y) * (cos_th / sin_th),
                (total.y - curve.y) / sin_th,
            )
        };

        Ok(Self {
            total,
            curve,
            straight_prev,
            straight_post,
            v_ref: Velocity::new::<meter_per_second>(v),
            limits: *limits,
        })
    }

    /// Assembles a shape from the results of an earlier calibration.
    pub fn from_parts(
        total: Pose,
        curve: Pose,
        straight_prev: Length,
        straight_post: Length,
        v_ref: Velocity,
        limits: &AngularLimits,
    ) -> Self {
        Self {
            total,
            curve,
            straight_prev,
            straight_post,
            v_ref,
            limits: *limits,
        }
    }

    /// The mismatch between `total` and the composition of both straights and
    /// the curve.
    pub fn integral_error(&self) -> Pose {
        let end = Pose::straight(self.straight_prev)
            + self.curve
            + Pose::straight(self.straight_post).rotate(self.curve.theta);
        self.total - end
    }

    /// Advances `state` by `ts` along the heading profile at the constant
    /// velocity `v`.
    ///
    /// The position is integrated with Simpson's rule over the heading sampled
    /// at `t`, `t + ts / 2` and `t + ts`. A non-zero `k_slip` (in s^2/m) bends
    /// the velocity by the slip angle `atan(-k_slip * v * omega)`.
    pub fn integrate(
        profile: &MotionProfile,
        state: &mut State,
        v: f32,
        t: f32,
        ts: f32,
        k_slip: f32,
    ) {
        let times = [t, t + ts / 2.0, t + ts];
        let mut cos_th = [0.0; 3];
        let mut sin_th = [0.0; 3];
        for (i, &time) in times.iter().enumerate() {
            let th_slip = (-k_slip * v * profile.v(time)).atan();
            let th = profile.x(time) + th_slip;
            cos_th[i] = th.cos();
            sin_th[i] = th.sin();
        }

        let dx = v * ts * (cos_th[0] + 4.0 * cos_th[1] + cos_th[2]) / 6.0;
        let dy = v * ts * (sin_th[0] + 4.0 * sin_th[1] + sin_th[2]) / 6.0;
        state.x.x += Length::new::<meter>(dx);
        state.y.x += Length::new::<meter>(dy);

        let t_next = t + ts;
        let w = profile.v(t_next);
        let dw = profile.a(t_next);
        let vx = v * cos_th[2];
        let vy = v * sin_th[2];
        let ax = -vy * w;
        let ay = vx * w;

        state.x.v = Velocity::new::<meter_per_second>(vx);
        state.y.v = Velocity::new::<meter_per_second>(vy);
        state.x.a = Acceleration::new::<meter_per_second_squared>(ax);
        state.y.a = Acceleration::new::<meter_per_second_squared>(ay);
        state.x.j = Jerk::new::<meter_per_second_cubed>(-ay * w - vy * dw);
        state.y.j = Jerk::new::<meter_per_second_cubed>(ax * w + vx * dw);
        state.theta.x = Angle::new::<radian>(profile.x(t_next));
        state.theta.v = AngularVelocity::new::<radian_per_second>(w);
        state.theta.a = AngularAcceleration::new::<radian_per_second_squared>(dw);
        state.theta.j = AngularJerk::new::<radian_per_second_cubed>(profile.j(t_next));
    }
}

impl fmt::Display for TurnShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "TurnShape")?;
        writeln!(f, "\ttotal:\t{}", self.total)?;
        writeln!(f, "\tcurve:\t{}", self.curve)?;
        writeln!(
            f,
            "\tv_ref:\t{} mm/s",
            self.v_ref.get::<millimeter_per_second>()
        )?;
        writeln!(
            f,
            "\tstraight_prev:\t{} mm",
            self.straight_prev.get::<millimeter>()
        )?;
        writeln!(
            f,
            "\tstraight_post:\t{} mm",
            self.straight_post.get::<millimeter>()
        )?;
        write!(f, "\tintegral error:\t{}", self.integral_error())
    }
}
