use serde::{Deserialize, Serialize};
use uom::si::{
    acceleration::meter_per_second_squared,
    f32::{Acceleration, Jerk, Length, Time, Velocity},
    jerk::meter_per_second_cubed,
    length::meter,
    time::second,
    velocity::meter_per_second,
};

use crate::profile::{Limits, MotionProfile, ProfileError};
use crate::state::{LengthState, State};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranslationalLimits {
    pub jerk: Jerk,
    pub acceleration: Acceleration,
    pub velocity: Velocity,
}

impl TranslationalLimits {
    pub fn new(jerk: Jerk, acceleration: Acceleration, velocity: Velocity) -> Self {
        Self {
            jerk,
            acceleration,
            velocity,
        }
    }

    fn to_limits(self) -> Limits {
        Limits::new(
            self.jerk.get::<meter_per_second_cubed>(),
            self.acceleration.get::<meter_per_second_squared>(),
            self.velocity.get::<meter_per_second>(),
        )
    }
}

/// A straight motion along the local x axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StraightTrajectory {
    profile: MotionProfile,
}

impl StraightTrajectory {
    pub fn new(
        limits: &TranslationalLimits,
        v_start: Velocity,
        v_target: Velocity,
        distance: Length,
    ) -> Result<Self, ProfileError> {
        let mut trajectory = Self::default();
        trajectory.reset(
            limits,
            v_start,
            v_target,
            distance,
            Default::default(),
            Default::default(),
        )?;
        Ok(trajectory)
    }

    pub fn reset(
        &mut self,
        limits: &TranslationalLimits,
        v_start: Velocity,
        v_target: Velocity,
        distance: Length,
        x_start: Length,
        t_start: Time,
    ) -> Result<(), ProfileError> {
        self.profile.reset(
            &limits.to_limits(),
            v_start.get::<meter_per_second>(),
            v_target.get::<meter_per_second>(),
            distance.get::<meter>(),
            x_start.get::<meter>(),
            t_start.get::<second>(),
        )
    }

    /// Moves `state` to time `t`. The lateral and angular parts are zero.
    pub fn update(&self, state: &mut State, t: Time) {
        let t = t.get::<second>();
        *state = State {
            x: LengthState {
                x: Length::new::<meter>(self.profile.x(t)),
                v: Velocity::new::<meter_per_second>(self.profile.v(t)),
                a: Acceleration::new::<meter_per_second_squared>(self.profile.a(t)),
                j: Jerk::new::<meter_per_second_cubed>(self.profile.j(t)),
            },
            ..Default::default()
        };
    }

    pub fn t_start(&self) -> Time {
        Time::new::<second>(self.profile.t_start())
    }

    pub fn t_end(&self) -> Time {
        Time::new::<second>(self.profile.t_end())
    }

    pub fn v_end(&self) -> Velocity {
        Velocity::new::<meter_per_second>(self.profile.v_end())
    }

    pub fn x_end(&self) -> Length {
        Length::new::<meter>(self.profile.x_end())
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use uom::si::length::millimeter;

    use super::*;

    fn limits() -> TranslationalLimits {
        TranslationalLimits::new(
            Jerk::new::<meter_per_second_cubed>(100.0),
            Acceleration::new::<meter_per_second_squared>(10.0),
            Velocity::new::<meter_per_second>(4.0),
        )
    }

    #[test]
    fn test_straight() {
        let trajectory = StraightTrajectory::new(
            &limits(),
            Default::default(),
            Velocity::new::<meter_per_second>(2.0),
            Length::new::<meter>(4.0),
        )
        .unwrap();
        assert_relative_eq!(trajectory.t_end().get::<second>(), 1.325, epsilon = 1e-5);
        assert_relative_eq!(trajectory.v_end().get::<meter_per_second>(), 2.0);

        let mut state = State::default();
        trajectory.update(&mut state, trajectory.t_end());
        assert_relative_eq!(state.x.x.get::<meter>(), 4.0, epsilon = 1e-5);
        assert_relative_eq!(state.x.v.get::<meter_per_second>(), 2.0, epsilon = 1e-5);
        assert_relative_eq!(state.y.x.get::<meter>(), 0.0);
        assert_relative_eq!(state.theta.x.value, 0.0);

        trajectory.update(&mut state, Time::new::<second>(0.75));
        assert_relative_eq!(state.x.v.get::<meter_per_second>(), 4.0);
        assert_relative_eq!(state.x.a.get::<meter_per_second_squared>(), 0.0);
    }

    #[test]
    fn test_short_straight() {
        let trajectory = StraightTrajectory::new(
            &limits(),
            Default::default(),
            Velocity::new::<meter_per_second>(2.0),
            Length::new::<millimeter>(100.0),
        )
        .unwrap();
        assert_relative_eq!(
            trajectory.v_end().get::<meter_per_second>(),
            1.0,
            epsilon = 1e-4
        );
        assert_relative_eq!(trajectory.x_end().get::<millimeter>(), 100.0, epsilon = 1e-3);
    }
}
