use core::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// First order plant `K1 / (T1 s + 1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackModel<T> {
    pub k1: T,
    pub t1: T,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackGain<T> {
    pub kp: T,
    pub ki: T,
    pub kd: T,
}

/// Terms of the last control input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown<T> {
    pub ff: T,
    pub fbp: T,
    pub fbi: T,
    pub fbd: T,
    pub fb: T,
    pub u: T,
}

/// Model based feedforward plus PID feedback.
///
/// `T` is usually `f32` or a [`Polar`](crate::pose::Polar) of them, which
/// controls the translational and rotational axes at once.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedbackController<T> {
    model: FeedbackModel<T>,
    gain: FeedbackGain<T>,
    breakdown: Breakdown<T>,
    error_sum: T,
}

impl<T> FeedbackController<T>
where
    T: Copy
        + Default
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<Output = T>
        + Div<Output = T>
        + Mul<f32, Output = T>,
{
    pub fn new(model: FeedbackModel<T>, gain: FeedbackGain<T>) -> Self {
        Self {
            model,
            gain,
            breakdown: Breakdown::default(),
            error_sum: T::default(),
        }
    }

    pub fn reset(&mut self) {
        self.error_sum = T::default();
    }

    /// Computes the input from the reference `r`, the measurement `y` and
    /// their derivatives. `ts` is the control period in seconds.
    pub fn update(&mut self, r: T, y: T, dr: T, dy: T, ts: f32) -> T {
        let ff = (self.model.t1 * dr + r) / self.model.k1;
        let fbp = self.gain.kp * (r - y);
        let fbi = self.gain.ki * self.error_sum;
        let fbd = self.gain.kd * (dr - dy);
        let fb = fbp + fbi + fbd;
        let u = ff + fb;
        self.error_sum = self.error_sum + (r - y) * ts;
        self.breakdown = Breakdown {
            ff,
            fbp,
            fbi,
            fbd,
            fb,
            u,
        };
        u
    }

    pub fn breakdown(&self) -> &Breakdown<T> {
        &self.breakdown
    }

    pub fn model(&self) -> &FeedbackModel<T> {
        &self.model
    }

    pub fn gain(&self) -> &FeedbackGain<T> {
        &self.gain
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::pose::Polar;

    fn controller() -> FeedbackController<f32> {
        FeedbackController::new(
            FeedbackModel { k1: 2.0, t1: 0.5 },
            FeedbackGain {
                kp: 3.0,
                ki: 10.0,
                kd: 0.1,
            },
        )
    }

    #[test]
    fn test_feedforward_only() {
        let mut controller = controller();
        let u = controller.update(1.0, 1.0, 2.0, 2.0, 1e-3);
        // (0.5 * 2 + 1) / 2
        assert_relative_eq!(u, 1.0);
        let breakdown = controller.breakdown();
        assert_relative_eq!(breakdown.ff, 1.0);
        assert_relative_eq!(breakdown.fb, 0.0);
    }

    #[test]
    fn test_integral_lags_one_step() {
        let mut controller = controller();
        controller.update(1.0, 0.0, 0.0, 0.0, 0.1);
        assert_relative_eq!(controller.breakdown().fbi, 0.0);
        assert_relative_eq!(controller.breakdown().fbp, 3.0);

        controller.update(1.0, 0.0, 0.0, 0.0, 0.1);
        assert_relative_eq!(controller.breakdown().fbi, 1.0);
        assert_relative_eq!(controller.breakdown().u, 0.5 + 3.0 + 1.0);

        controller.reset();
        controller.update(1.0, 0.0, 0.0, 0.0, 0.1);
        assert_relative_eq!(controller.breakdown().fbi, 0.0);
    }

    #[test]
    fn test_derivative() {
        let mut controller = controller();
        controller.update(0.0, 0.0, 1.0, 0.0, 1e-3);
        let breakdown = controller.breakdown();
        assert_relative_eq!(breakdown.fbd, 0.1);
        assert_relative_eq!(breakdown.fb, 0.1);
        assert_relative_eq!(breakdown.u, 0.25 + 0.1);
    }

    #[test]
    fn test_polar_axes_are_independent() {
        let mut controller = FeedbackController::new(
            FeedbackModel {
                k1: Polar::new(2.0, 4.0),
                t1: Polar::new(0.5, 0.25),
            },
            FeedbackGain {
                kp: Polar::new(1.0, 2.0),
                ki: Polar::default(),
                kd: Polar::default(),
            },
        );
        let u = controller.update(
            Polar::new(1.0, 2.0),
            Polar::new(0.5, 2.0),
            Polar::default(),
            Polar::default(),
            1e-3,
        );
        assert_relative_eq!(u.tra, 0.5 + 0.5);
        assert_relative_eq!(u.rot, 0.5);
    }
}
