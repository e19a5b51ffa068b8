#![cfg_attr(not(test), no_std)]

#[allow(unused_imports)]
use micromath::F32Ext;
use motioncore::{
    pose::{Polar, Pose},
    state::State,
    SideData,
};
use typed_builder::TypedBuilder;
use uom::si::{
    angle::radian,
    angular_velocity::radian_per_second,
    electric_potential::volt,
    f32::{
        Acceleration, Angle, AngularAcceleration, AngularVelocity, ElectricPotential, Length, Time,
        Velocity,
    },
    ratio::ratio,
    velocity::meter_per_second,
};

/// Differential drive robot whose translational and rotational velocities
/// follow first order lags of the motor voltages.
#[derive(Debug, TypedBuilder)]
pub struct Simulator {
    current: State,
    last: State,
    #[builder(default, setter(skip))]
    right_voltage: ElectricPotential,
    #[builder(default, setter(skip))]
    left_voltage: ElectricPotential,
    max_voltage: ElectricPotential,
    period: Time,
    trans_k: f32,
    trans_t1: Time,
    rot_k: f32,
    rot_t1: Time,
    wheel_interval: Length,
}

impl Simulator {
    pub fn step(&mut self) {
        let mut next = self.current;

        let current_trans_vel = self.current.velocity().tra;
        let next_trans_vel = self.next_trans_vel();
        let next_rot_vel = self.next_rot_vel();

        next.theta.x += Angle::from(next_rot_vel * self.period);
        next.theta.v = next_rot_vel;
        next.theta.a =
            AngularAcceleration::from((next_rot_vel - self.current.theta.v) / self.period);

        let cur_sin = self.current.theta.x.get::<radian>().sin();
        let cur_cos = self.current.theta.x.get::<radian>().cos();
        let next_sin = next.theta.x.get::<radian>().sin();
        let next_cos = next.theta.x.get::<radian>().cos();

        next.x.x += (current_trans_vel * cur_cos + next_trans_vel * next_cos) * self.period / 2.0;
        next.y.x += (current_trans_vel * cur_sin + next_trans_vel * next_sin) * self.period / 2.0;

        next.x.v = next_trans_vel * next_cos;
        next.y.v = next_trans_vel * next_sin;

        next.x.a = (next.x.v - self.current.x.v) / self.period;
        next.y.a = (next.y.v - self.current.y.v) / self.period;

        self.last = self.current;
        self.current = next;
    }

    fn next_trans_vel(&self) -> Velocity {
        let alpha = (self.trans_t1 / (self.trans_t1 + self.period)).get::<ratio>();
        let current = self.current.velocity().tra;
        let trans_voltage = (self.right_voltage + self.left_voltage) / 2.0;
        current * alpha
            + (1.0 - alpha)
                * Velocity::new::<meter_per_second>(self.trans_k * trans_voltage.get::<volt>())
    }

    fn next_rot_vel(&self) -> AngularVelocity {
        let alpha = (self.rot_t1 / (self.rot_t1 + self.period)).get::<ratio>();
        let current = self.current.theta.v;
        let rot_voltage = (self.right_voltage - self.left_voltage) / 2.0;
        current * alpha
            + (1.0 - alpha)
                * AngularVelocity::new::<radian_per_second>(self.rot_k * rot_voltage.get::<volt>())
    }

    /// Distances travelled by the wheels during the last step.
    pub fn distance(&self) -> SideData<Length> {
        let trans = (self.current.velocity().tra + self.last.velocity().tra) / 2.0;
        let rot = (self.current.theta.v + self.last.theta.v) / 2.0;
        let rot = Velocity::new::<meter_per_second>(
            rot.get::<radian_per_second>() * self.wheel_interval.value / 2.0,
        );
        Polar::new(trans * self.period, rot * self.period).sides()
    }

    pub fn state(&self) -> &State {
        &self.current
    }

    pub fn pose(&self) -> Pose {
        self.current.pose()
    }

    pub fn velocity(&self) -> Polar<Velocity, AngularVelocity> {
        self.current.velocity()
    }

    pub fn acceleration(&self) -> Polar<Acceleration, AngularAcceleration> {
        self.current.acceleration()
    }

    /// Applies motor voltages, saturated at the battery voltage.
    pub fn apply(&mut self, voltage: &SideData<ElectricPotential>) {
        let limit = |val| {
            if val > self.max_voltage {
                self.max_voltage
            } else if val < -self.max_voltage {
                -self.max_voltage
            } else {
                val
            }
        };
        let left = limit(voltage.left);
        let right = limit(voltage.right);
        self.left_voltage = left;
        self.right_voltage = right;
    }

    pub fn voltage(&self) -> SideData<ElectricPotential> {
        SideData {
            left: self.left_voltage,
            right: self.right_voltage,
        }
    }
}

#[cfg(test)]
mod tests {
    use uom::si::{length::millimeter, time::second};

    use super::*;

    fn simulator() -> Simulator {
        Simulator::builder()
            .current(State::default())
            .last(State::default())
            .max_voltage(ElectricPotential::new::<volt>(3.7))
            .period(Time::new::<second>(0.001))
            .trans_k(1.865)
            .trans_t1(Time::new::<second>(0.4443))
            .rot_k(82.39)
            .rot_t1(Time::new::<second>(0.2855))
            .wheel_interval(Length::new::<millimeter>(33.5))
            .build()
    }

    #[test]
    fn test_voltage_saturation() {
        let mut simulator = simulator();
        simulator.apply(&SideData {
            left: ElectricPotential::new::<volt>(-5.0),
            right: ElectricPotential::new::<volt>(1.0),
        });
        let voltage = simulator.voltage();
        assert!((voltage.left.get::<volt>() + 3.7).abs() < 1e-6);
        assert!((voltage.right.get::<volt>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_straight_converges_to_gain() {
        let mut simulator = simulator();
        let voltage = ElectricPotential::new::<volt>(0.5);
        simulator.apply(&SideData {
            left: voltage,
            right: voltage,
        });
        for _ in 0..5000 {
            simulator.step();
        }
        let velocity = simulator.velocity();
        assert!((velocity.tra.get::<meter_per_second>() - 1.865 * 0.5).abs() < 1e-3);
        assert!(velocity.rot.get::<radian_per_second>().abs() < 1e-6);
        let pose = simulator.pose();
        assert!(pose.y.get::<millimeter>().abs() < 1e-3);
        assert!(pose.x > Length::default());

        let distance = simulator.distance();
        assert!((distance.left - distance.right).get::<millimeter>().abs() < 1e-6);
    }

    #[test]
    fn test_rotation_direction() {
        let mut simulator = simulator();
        simulator.apply(&SideData {
            left: ElectricPotential::new::<volt>(-0.1),
            right: ElectricPotential::new::<volt>(0.1),
        });
        for _ in 0..100 {
            simulator.step();
        }
        assert!(simulator.velocity().rot > AngularVelocity::default());
        assert!(simulator.state().theta.x > Angle::default());
        let distance = simulator.distance();
        assert!(distance.right > distance.left);
    }
}
