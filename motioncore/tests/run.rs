use motioncore::{
    feedback::{FeedbackController, FeedbackGain, FeedbackModel},
    pose::{Polar, Pose},
    slalom::{slalom_parameters_map, AngularLimits, SlalomDirection, SlalomKind},
    state::State,
    straight::{StraightTrajectory, TranslationalLimits},
    tracker::TrajectoryTracker,
    trajectory::{slalom, Trajectory},
    SideData,
};
use motionsim::Simulator;
use uom::si::{
    acceleration::meter_per_second_squared,
    angular_acceleration::radian_per_second_squared,
    angular_velocity::radian_per_second,
    electric_potential::volt,
    f32::{Acceleration, ElectricPotential, Jerk, Length, Time, Velocity},
    jerk::meter_per_second_cubed,
    length::millimeter,
    time::second,
    velocity::meter_per_second,
};

#[test]
fn test_run_search90() {
    for &v in &[0.2, 0.3, 0.5] {
        for &dir in &[SlalomDirection::Left, SlalomDirection::Right] {
            test_run(Velocity::new::<meter_per_second>(v), dir);
        }
    }
}

fn reference(velocity: Velocity, dir: SlalomDirection, period: Time) -> Vec<State> {
    let cell = Length::new::<millimeter>(90.0);
    let limits = TranslationalLimits::new(
        Jerk::new::<meter_per_second_cubed>(100.0),
        Acceleration::new::<meter_per_second_squared>(10.0),
        velocity,
    );
    let shape = slalom_parameters_map(SlalomKind::Search90, dir)
        .shape(&AngularLimits::default())
        .unwrap();

    let accel = StraightTrajectory::new(&limits, Default::default(), velocity, cell).unwrap();
    let decel = StraightTrajectory::new(&limits, velocity, Default::default(), cell).unwrap();

    let turn_start = Pose::straight(cell);
    let decel_start = shape.total.homogeneous(&turn_start);
    let goal = Pose::straight(cell).homogeneous(&decel_start);

    Trajectory::from(accel)
        .iter(period)
        .chain(slalom(&shape, false, velocity, turn_start, period).unwrap())
        .chain(Trajectory::from(decel).iter(period).shift(decel_start))
        .chain(Trajectory::stop(goal, Time::new::<second>(0.3)).iter(period))
        .collect()
}

fn test_run(velocity: Velocity, dir: SlalomDirection) {
    // common settings
    let period = Time::new::<second>(0.001);
    let trans_k = 1.865;
    let trans_t1 = Time::new::<second>(0.4443);
    let rot_k = 82.39;
    let rot_t1 = Time::new::<second>(0.2855);

    let mut tracker = TrajectoryTracker::builder().period(period).build();
    let mut controller = FeedbackController::new(
        FeedbackModel {
            k1: Polar::new(trans_k, rot_k),
            t1: Polar::new(trans_t1.get::<second>(), rot_t1.get::<second>()),
        },
        FeedbackGain {
            kp: Polar::new(4.8497, 0.21134),
            ki: Polar::new(29.5783, 2.9317),
            kd: Polar::default(),
        },
    );
    let mut simulator = Simulator::builder()
        .period(period)
        .trans_k(trans_k)
        .trans_t1(trans_t1)
        .rot_k(rot_k)
        .rot_t1(rot_t1)
        .wheel_interval(Length::new::<millimeter>(33.5))
        .current(State::default())
        .last(State::default())
        .max_voltage(ElectricPotential::new::<volt>(3.7))
        .build();

    let mut max_error = Length::default();
    let mut max_omega = 0.0f32;
    let mut low_speed_visited = false;
    let mut high_speed_visited = false;
    for target in reference(velocity, dir, period) {
        if tracker.xi().abs() < tracker.xi_threshold() {
            low_speed_visited = true;
        } else {
            high_speed_visited = true;
        }

        let command = tracker.update(
            &simulator.pose(),
            &simulator.velocity(),
            &simulator.acceleration(),
            &target,
        );
        let measured = simulator.velocity();
        let measured_acc = simulator.acceleration();
        let u = controller.update(
            Polar::new(
                command.v.get::<meter_per_second>(),
                command.omega.get::<radian_per_second>(),
            ),
            Polar::new(
                measured.tra.get::<meter_per_second>(),
                measured.rot.get::<radian_per_second>(),
            ),
            Polar::new(
                command.a.get::<meter_per_second_squared>(),
                command.alpha.get::<radian_per_second_squared>(),
            ),
            Polar::new(
                measured_acc.tra.get::<meter_per_second_squared>(),
                measured_acc.rot.get::<radian_per_second_squared>(),
            ),
            period.get::<second>(),
        );
        let SideData { left, right } = u.sides();
        simulator.apply(&SideData {
            left: ElectricPotential::new::<volt>(left),
            right: ElectricPotential::new::<volt>(right),
        });
        simulator.step();

        let pose = simulator.pose();
        let dx = target.x.x - pose.x;
        let dy = target.y.x - pose.y;
        let error = Length::new::<millimeter>(
            dx.get::<millimeter>().hypot(dy.get::<millimeter>()),
        );
        if error > max_error {
            max_error = error;
        }
        max_omega = max_omega.max(command.omega.get::<radian_per_second>().abs());
    }

    assert!(
        max_error < Length::new::<millimeter>(10.0),
        "v: {:?}, dir: {:?}, max error: {} mm",
        velocity,
        dir,
        max_error.get::<millimeter>()
    );
    assert!(max_omega < 20.0, "max omega: {} rad/s", max_omega);
    assert!(low_speed_visited && high_speed_visited);
}
