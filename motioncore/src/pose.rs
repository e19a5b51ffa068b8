use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

#[allow(unused_imports)]
use micromath::F32Ext;
use serde::{Deserialize, Serialize};
use uom::si::{
    angle::radian,
    f32::{Angle, Length},
    length::millimeter,
};

use crate::SideData;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: Length,
    pub y: Length,
    pub theta: Angle,
}

impl Pose {
    pub fn new(x: Length, y: Length, theta: Angle) -> Self {
        Self { x, y, theta }
    }

    /// A pose on the x axis with zero heading.
    pub fn straight(x: Length) -> Self {
        Self {
            x,
            ..Default::default()
        }
    }

    /// Reflects the pose across the x axis.
    pub fn mirror_x(&self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
            theta: -self.theta,
        }
    }

    /// Rotates the position around the origin. The heading is kept.
    pub fn rotate(&self, angle: Angle) -> Self {
        let sin_th = angle.get::<radian>().sin();
        let cos_th = angle.get::<radian>().cos();
        Self {
            x: self.x * cos_th - self.y * sin_th,
            y: self.x * sin_th + self.y * cos_th,
            theta: self.theta,
        }
    }

    /// Expresses a pose given in the frame of `offset` in the parent frame.
    pub fn homogeneous(&self, offset: &Pose) -> Self {
        *offset + self.rotate(offset.theta)
    }
}

impl Add for Pose {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            theta: self.theta + rhs.theta,
        }
    }
}

impl Sub for Pose {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            theta: self.theta - rhs.theta,
        }
    }
}

impl AddAssign for Pose {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Pose {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "({} mm, {} mm, {} rad)",
            self.x.get::<millimeter>(),
            self.y.get::<millimeter>(),
            self.theta.get::<radian>()
        )
    }
}

/// A pair of translational and rotational values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polar<T, R = T> {
    pub tra: T,
    pub rot: R,
}

impl<T, R> Polar<T, R> {
    pub fn new(tra: T, rot: R) -> Self {
        Self { tra, rot }
    }
}

impl<T: Copy + Add<Output = T> + Sub<Output = T>> Polar<T> {
    /// Splits into wheel values, the rotational part is signed positive for
    /// the right wheel.
    pub fn sides(&self) -> SideData<T> {
        SideData {
            left: self.tra - self.rot,
            right: self.tra + self.rot,
        }
    }
}

impl<T: Add<Output = T>, R: Add<Output = R>> Add for Polar<T, R> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            tra: self.tra + rhs.tra,
            rot: self.rot + rhs.rot,
        }
    }
}

impl<T: Sub<Output = T>, R: Sub<Output = R>> Sub for Polar<T, R> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            tra: self.tra - rhs.tra,
            rot: self.rot - rhs.rot,
        }
    }
}

impl<T: Mul<Output = T>, R: Mul<Output = R>> Mul for Polar<T, R> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            tra: self.tra * rhs.tra,
            rot: self.rot * rhs.rot,
        }
    }
}

impl<T: Div<Output = T>, R: Div<Output = R>> Div for Polar<T, R> {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self {
            tra: self.tra / rhs.tra,
            rot: self.rot / rhs.rot,
        }
    }
}

impl<T: Mul<f32, Output = T>, R: Mul<f32, Output = R>> Mul<f32> for Polar<T, R> {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            tra: self.tra * rhs,
            rot: self.rot * rhs,
        }
    }
}

impl<T: Div<f32, Output = T>, R: Div<f32, Output = R>> Div<f32> for Polar<T, R> {
    type Output = Self;

    fn div(self, rhs: f32) -> Self::Output {
        Self {
            tra: self.tra / rhs,
            rot: self.rot / rhs,
        }
    }
}
