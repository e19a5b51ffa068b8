#[allow(unused_imports)]
use micromath::F32Ext;
use uom::si::{angle::radian, f32::Angle};

pub(crate) fn cbrt(x: f32) -> f32 {
    #[cfg(any(test, feature = "std"))]
    {
        x.cbrt()
    }
    #[cfg(not(any(test, feature = "std")))]
    {
        num_traits::Float::cbrt(x)
    }
}

// normalize angle to [-pi, pi].
pub(crate) fn normalize_angle(angle: Angle) -> Angle {
    use core::f32::consts::{PI, TAU};

    let raw_angle = angle.value.rem_euclid(TAU);

    Angle::new::<radian>(if raw_angle > PI {
        raw_angle - TAU
    } else {
        raw_angle
    })
}

// calculate sin(x)/x
pub(crate) fn sinc(x: f32) -> f32 {
    let xx = x * x;
    let xxxx = xx * xx;
    xxxx * xxxx / 362880.0 - xxxx * xx / 5040.0 + xxxx / 120.0 - xx / 6.0 + 1.0
}
