use core::iter::Chain;

use uom::si::{
    acceleration::meter_per_second_squared,
    f32::{Acceleration, Jerk, Length, Time, Velocity},
    jerk::meter_per_second_cubed,
    time::second,
};

use crate::pose::Pose;
use crate::profile::ProfileError;
use crate::slalom::{TurnShape, TurnTrajectory};
use crate::state::State;
use crate::straight::{StraightTrajectory, TranslationalLimits};

/// Producers of reference states.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Trajectory {
    Straight(StraightTrajectory),
    Slalom(TurnTrajectory),
    /// Standing still at `pose` for `duration`.
    Stop { pose: Pose, duration: Time },
}

impl Trajectory {
    pub fn stop(pose: Pose, duration: Time) -> Self {
        Trajectory::Stop { pose, duration }
    }

    /// Advances `state` from `t` to `t + ts`.
    pub fn update(&self, state: &mut State, t: Time, ts: Time) {
        match self {
            Trajectory::Straight(straight) => straight.update(state, t + ts),
            Trajectory::Slalom(slalom) => slalom.update(state, t, ts, 0.0),
            Trajectory::Stop { pose, .. } => *state = State::at(pose),
        }
    }

    pub fn t_start(&self) -> Time {
        match self {
            Trajectory::Straight(straight) => straight.t_start(),
            Trajectory::Slalom(slalom) => Time::new::<second>(slalom.profile().t_start()),
            Trajectory::Stop { .. } => Time::default(),
        }
    }

    pub fn t_end(&self) -> Time {
        match self {
            Trajectory::Straight(straight) => straight.t_end(),
            Trajectory::Slalom(slalom) => slalom.t_end(),
            Trajectory::Stop { duration, .. } => *duration,
        }
    }

    /// Samples the trajectory every `period`, ending exactly at its end time.
    pub fn iter(self, period: Time) -> TrajectoryIter {
        TrajectoryIter {
            t: self.t_start(),
            t_end: self.t_end(),
            trajectory: self,
            state: State::default(),
            origin: Pose::default(),
            period,
        }
    }
}

impl From<StraightTrajectory> for Trajectory {
    fn from(straight: StraightTrajectory) -> Self {
        Trajectory::Straight(straight)
    }
}

impl From<TurnTrajectory> for Trajectory {
    fn from(slalom: TurnTrajectory) -> Self {
        Trajectory::Slalom(slalom)
    }
}

/// Fixed period samples of a [`Trajectory`], expressed in the frame of
/// `origin`.
#[derive(Clone, Debug)]
pub struct TrajectoryIter {
    trajectory: Trajectory,
    // kept in the local frame, producers integrate from it
    state: State,
    origin: Pose,
    t: Time,
    t_end: Time,
    period: Time,
}

impl TrajectoryIter {
    /// Places the samples in the frame whose origin is `origin`.
    pub fn shift(mut self, origin: Pose) -> Self {
        self.origin = self.origin.homogeneous(&origin);
        self
    }
}

impl Iterator for TrajectoryIter {
    type Item = State;

    fn next(&mut self) -> Option<Self::Item> {
        if self.t >= self.t_end {
            return None;
        }
        let ts = if self.t + self.period < self.t_end {
            self.period
        } else {
            self.t_end - self.t
        };
        self.trajectory.update(&mut self.state, self.t, ts);
        self.t = if ts < self.period {
            self.t_end
        } else {
            self.t + ts
        };
        Some(self.state.shift(&self.origin))
    }
}

pub type SlalomIter = Chain<Chain<TrajectoryIter, TrajectoryIter>, TrajectoryIter>;

/// A complete turn at constant `velocity` starting at `origin`: the leading
/// straight, the curve and the trailing straight.
pub fn slalom(
    shape: &TurnShape,
    mirror_x: bool,
    velocity: Velocity,
    origin: Pose,
    period: Time,
) -> Result<SlalomIter, ProfileError> {
    let mut curve = TurnTrajectory::new(shape, mirror_x);
    curve.reset(velocity, Default::default(), Default::default())?;
    let shape = *curve.shape();

    // only the velocity bound matters at a constant velocity
    let limits = TranslationalLimits::new(
        Jerk::new::<meter_per_second_cubed>(1.0),
        Acceleration::new::<meter_per_second_squared>(1.0),
        velocity.abs(),
    );
    let straight = |distance: Length| {
        if distance > Length::default() {
            StraightTrajectory::new(&limits, velocity, velocity, distance)
        } else {
            Ok(StraightTrajectory::default())
        }
    };
    let prev = straight(shape.straight_prev)?;
    let post = straight(shape.straight_post)?;

    let curve_start = Pose::straight(shape.straight_prev);
    let post_start = curve_start + shape.curve;

    Ok(Trajectory::from(prev)
        .iter(period)
        .shift(origin)
        .chain(
            Trajectory::from(curve)
                .iter(period)
                .shift(curve_start.homogeneous(&origin)),
        )
        .chain(
            Trajectory::from(post)
                .iter(period)
                .shift(post_start.homogeneous(&origin)),
        ))
}
