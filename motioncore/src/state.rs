use core::fmt;

#[allow(unused_imports)]
use micromath::F32Ext;
use serde::{Deserialize, Serialize};
use uom::si::{
    acceleration::meter_per_second_squared,
    angle::radian,
    angular_velocity::radian_per_second,
    f32::{
        Acceleration, Angle, AngularAcceleration, AngularJerk, AngularVelocity, Jerk, Length,
        Velocity,
    },
    length::meter,
    velocity::meter_per_second,
};

use crate::pose::{Polar, Pose};

/// A pose and its first three time derivatives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub x: LengthState,
    pub y: LengthState,
    pub theta: AngleState,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LengthState {
    pub x: Length,
    pub v: Velocity,
    pub a: Acceleration,
    pub j: Jerk,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AngleState {
    pub x: Angle,
    pub v: AngularVelocity,
    pub a: AngularAcceleration,
    pub j: AngularJerk,
}

impl State {
    /// A state standing still at `pose`.
    pub fn at(pose: &Pose) -> Self {
        Self {
            x: LengthState {
                x: pose.x,
                ..Default::default()
            },
            y: LengthState {
                x: pose.y,
                ..Default::default()
            },
            theta: AngleState {
                x: pose.theta,
                ..Default::default()
            },
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.x.x, self.y.x, self.theta.x)
    }

    /// Velocity along the heading and angular velocity.
    pub fn velocity(&self) -> Polar<Velocity, AngularVelocity> {
        let sin_th = self.theta.x.get::<radian>().sin();
        let cos_th = self.theta.x.get::<radian>().cos();
        Polar::new(self.x.v * cos_th + self.y.v * sin_th, self.theta.v)
    }

    /// Acceleration along the heading and angular acceleration.
    pub fn acceleration(&self) -> Polar<Acceleration, AngularAcceleration> {
        let sin_th = self.theta.x.get::<radian>().sin();
        let cos_th = self.theta.x.get::<radian>().cos();
        Polar::new(self.x.a * cos_th + self.y.a * sin_th, self.theta.a)
    }

    /// Re-expresses a state given in the frame of `pose` in the parent frame.
    pub fn shift(&self, pose: &Pose) -> Self {
        let sin_th = pose.theta.get::<radian>().sin();
        let cos_th = pose.theta.get::<radian>().cos();
        Self {
            x: LengthState {
                x: self.x.x * cos_th - self.y.x * sin_th + pose.x,
                v: self.x.v * cos_th - self.y.v * sin_th,
                a: self.x.a * cos_th - self.y.a * sin_th,
                j: self.x.j * cos_th - self.y.j * sin_th,
            },
            y: LengthState {
                x: self.x.x * sin_th + self.y.x * cos_th + pose.y,
                v: self.x.v * sin_th + self.y.v * cos_th,
                a: self.x.a * sin_th + self.y.a * cos_th,
                j: self.x.j * sin_th + self.y.j * cos_th,
            },
            theta: AngleState {
                x: self.theta.x + pose.theta,
                ..self.theta
            },
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "q: ({}, {}, {})\tdq: ({}, {}, {})\tddq: ({}, {}, {})",
            self.x.x.get::<meter>(),
            self.y.x.get::<meter>(),
            self.theta.x.get::<radian>(),
            self.x.v.get::<meter_per_second>(),
            self.y.v.get::<meter_per_second>(),
            self.theta.v.get::<radian_per_second>(),
            self.x.a.get::<meter_per_second_squared>(),
            self.y.a.get::<meter_per_second_squared>(),
            self.theta.a.value,
        )
    }
}
