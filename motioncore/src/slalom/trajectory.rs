use uom::si::{
    angle::radian,
    f32::{Angle, Time, Velocity},
    ratio::ratio,
    time::second,
    velocity::meter_per_second,
};

use super::TurnShape;
use crate::profile::{MotionProfile, ProfileError};
use crate::state::State;

/// Replays a [`TurnShape`] at an arbitrary velocity.
///
/// The heading profile of the shape is rescaled in time so that the path is
/// identical to the calibrated one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnTrajectory {
    shape: TurnShape,
    profile: MotionProfile,
    velocity: Velocity,
}

impl TurnTrajectory {
    /// `mirror_x` turns a left turn into a right one and vice versa.
    pub fn new(shape: &TurnShape, mirror_x: bool) -> Self {
        let mut shape = *shape;
        if mirror_x {
            shape.curve = shape.curve.mirror_x();
            shape.total = shape.total.mirror_x();
        }
        Self {
            shape,
            profile: MotionProfile::default(),
            velocity: Default::default(),
        }
    }

    /// Prepares the heading profile for `velocity`, starting at `th_start`
    /// and `t_start`.
    pub fn reset(
        &mut self,
        velocity: Velocity,
        th_start: Angle,
        t_start: Time,
    ) -> Result<(), ProfileError> {
        self.velocity = velocity;
        let gain = (velocity / self.shape.v_ref).get::<ratio>();
        self.profile.reset(
            &self.shape.limits.to_limits().scaled(gain),
            0.0,
            0.0,
            self.shape.total.theta.get::<radian>(),
            th_start.get::<radian>(),
            t_start.get::<second>(),
        )
    }

    /// Advances `state` from `t` to `t + ts`. `k_slip` is the slip-angle
    /// coefficient in s^2/m.
    pub fn update(&self, state: &mut State, t: Time, ts: Time, k_slip: f32) {
        TurnShape::integrate(
            &self.profile,
            state,
            self.velocity.get::<meter_per_second>(),
            t.get::<second>(),
            ts.get::<second>(),
            k_slip,
        );
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// Duration of the curve.
    pub fn t_curve(&self) -> Time {
        Time::new::<second>(self.profile.t_end() - self.profile.t_start())
    }

    pub fn t_end(&self) -> Time {
        Time::new::<second>(self.profile.t_end())
    }

    pub fn shape(&self) -> &TurnShape {
        &self.shape
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }
}
