use core::marker::PhantomData;

use log::trace;
#[allow(unused_imports)]
use micromath::F32Ext;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uom::{
    si::{
        angle::radian,
        f32::{
            Acceleration, AngularAcceleration, AngularVelocity, Frequency, Time, Velocity,
        },
        frequency::hertz,
        time::second,
        velocity::{meter_per_second, millimeter_per_second},
        Quantity, ISQ, SI,
    },
    typenum::*,
    Kind,
};

use crate::pose::{Polar, Pose};
use crate::state::State;
use crate::utils::{normalize_angle, sinc};

/// Weight of the lateral error in the low speed law, per square length.
pub type BType = Quantity<ISQ<N2, Z0, Z0, Z0, Z0, Z0, Z0, dyn Kind>, SI<f32>, f32>;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackerGain {
    pub zeta: f32,
    pub omega_n: Frequency,
    pub low_zeta: f32,
    pub low_b: BType,
}

impl Default for TrackerGain {
    fn default() -> Self {
        Self {
            zeta: 1.0,
            omega_n: Frequency::new::<hertz>(15.0),
            low_zeta: 1.0,
            // 1e-3 per square millimeter
            low_b: BType {
                value: 1e3,
                dimension: PhantomData,
                units: PhantomData,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlTarget {
    pub v: Velocity,
    pub a: Acceleration,
    pub omega: AngularVelocity,
    pub alpha: AngularAcceleration,
}

impl ControlTarget {
    pub fn velocity(&self) -> Polar<Velocity, AngularVelocity> {
        Polar::new(self.v, self.omega)
    }

    pub fn acceleration(&self) -> Polar<Acceleration, AngularAcceleration> {
        Polar::new(self.a, self.alpha)
    }
}

/// Nonlinear trajectory tracking with dynamic feedback linearization.
///
/// `xi` approximates the translational velocity. The linearized law divides
/// by it, so below `xi_threshold` a time-varying state feedback law is used
/// instead. `xi` keeps being integrated in both regimes.
#[derive(Debug, TypedBuilder)]
pub struct TrajectoryTracker {
    #[builder(default)]
    gain: TrackerGain,
    #[builder(default = Time::new::<second>(1e-3))]
    period: Time,
    #[builder(default = Velocity::new::<millimeter_per_second>(150.0))]
    xi_threshold: Velocity,
    #[builder(default, setter(skip))]
    xi: Velocity,
    #[builder(default, setter(skip))]
    low_speed: bool,
}

impl TrajectoryTracker {
    pub fn reset(&mut self, velocity: Velocity) {
        self.xi = velocity;
    }

    pub fn xi(&self) -> Velocity {
        self.xi
    }

    pub fn xi_threshold(&self) -> Velocity {
        self.xi_threshold
    }

    pub fn gain(&self) -> &TrackerGain {
        &self.gain
    }

    /// Computes the command from the estimated pose, velocity and
    /// acceleration and the reference state.
    pub fn update(
        &mut self,
        pose: &Pose,
        velocity: &Polar<Velocity, AngularVelocity>,
        acceleration: &Polar<Acceleration, AngularAcceleration>,
        reference: &State,
    ) -> ControlTarget {
        let sin_th = pose.theta.get::<radian>().sin();
        let cos_th = pose.theta.get::<radian>().cos();
        let dx = velocity.tra * cos_th;
        let dy = velocity.tra * sin_th;
        let ddx = acceleration.tra * cos_th;
        let ddy = acceleration.tra * sin_th;

        let sin_th_r = reference.theta.x.get::<radian>().sin();
        let cos_th_r = reference.theta.x.get::<radian>().cos();

        let kx = self.gain.omega_n * self.gain.omega_n;
        let kdx = 2.0 * self.gain.zeta * self.gain.omega_n;

        let ex = reference.x.x - pose.x;
        let ey = reference.y.x - pose.y;
        let u1 = reference.x.a + kdx * (reference.x.v - dx) + kx * ex;
        let u2 = reference.y.a + kdx * (reference.y.v - dy) + kx * ey;
        let du1 = reference.x.j + kdx * (reference.x.a - ddx) + kx * (reference.x.v - dx);
        let du2 = reference.y.j + kdx * (reference.y.a - ddy) + kx * (reference.y.v - dy);

        let d_xi = u1 * cos_th_r + u2 * sin_th_r;
        self.xi += d_xi * self.period;

        let low_speed = self.xi.abs() < self.xi_threshold;
        if low_speed != self.low_speed {
            trace!(
                "tracker switched to the {} speed law at xi: {} m/s",
                if low_speed { "low" } else { "high" },
                self.xi.get::<meter_per_second>()
            );
            self.low_speed = low_speed;
        }

        let (v, omega, a, alpha): (Velocity, AngularVelocity, Acceleration, AngularAcceleration) =
            if low_speed {
                let v_d = reference.x.v * cos_th_r + reference.y.v * sin_th_r;
                let w_d = reference.theta.v;
                let b = self.gain.low_b;
                let k1 = 2.0
                    * self.gain.low_zeta
                    * Frequency::new::<hertz>((w_d * w_d + b * v_d * v_d).value.sqrt());
                let k2 = b;
                let k3 = k1;
                let e_th = normalize_angle(reference.theta.x - pose.theta);

                let v = v_d * e_th.get::<radian>().cos() + k1 * (ex * cos_th + ey * sin_th);
                let omega = w_d
                    + AngularVelocity::from(
                        k2 * v_d * (-ex * sin_th + ey * cos_th) * sinc(e_th.get::<radian>()),
                    )
                    + AngularVelocity::from(k3 * e_th);
                (
                    v,
                    omega,
                    reference.x.a * cos_th_r + reference.y.a * sin_th_r,
                    reference.theta.a,
                )
            } else {
                let omega = AngularVelocity::from((u2 * cos_th_r - u1 * sin_th_r) / self.xi);
                let alpha = -AngularAcceleration::from(
                    (2.0 * d_xi * omega + du1 * sin_th_r - du2 * cos_th_r) / self.xi,
                );
                (self.xi, omega, d_xi, alpha)
            };

        ControlTarget {
            v,
            a,
            omega,
            alpha,
        }
    }
}
