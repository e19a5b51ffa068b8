#[cfg(test)]
use proptest_derive::Arbitrary;
use serde::{Deserialize, Serialize};
use uom::si::{
    angle::degree,
    f32::{Angle, Length},
    length::millimeter,
};

use super::{AngularLimits, TurnShape};
use crate::pose::Pose;
use crate::profile::ProfileError;

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlalomDirection {
    Right,
    Left,
}

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlalomKind {
    Search90,
    FastRun45,
    FastRun90,
    FastRun135,
    FastRun180,
    FastRunDiagonal90,
}

/// Calibration inputs of a turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlalomParameters {
    pub total: Pose,
    pub y_curve_end: Length,
    pub x_adv: Length,
}

impl SlalomParameters {
    pub fn shape(&self, limits: &AngularLimits) -> Result<TurnShape, ProfileError> {
        TurnShape::new(self.total, self.y_curve_end, self.x_adv, limits)
    }
}

/// Turns of a maze with 90 mm cells.
pub fn slalom_parameters_map(kind: SlalomKind, dir: SlalomDirection) -> SlalomParameters {
    use SlalomDirection::*;
    use SlalomKind::*;

    let params = match kind {
        Search90 => (45.0, 45.0, 90.0, 44.0, 0.0),
        FastRun45 => (90.0, 45.0, 45.0, 30.0, 0.0),
        FastRun90 => (90.0, 90.0, 90.0, 70.0, 0.0),
        FastRun135 => (45.0, 90.0, 135.0, 80.0, 0.0),
        FastRun180 => (0.0, 90.0, 180.0, 90.0, 24.0),
        FastRunDiagonal90 => (63.639_61, 63.639_61, 90.0, 48.0, 0.0),
    };
    let params = match dir {
        Left => params,
        Right => (params.0, -params.1, -params.2, -params.3, params.4),
    };
    SlalomParameters {
        total: Pose::new(
            Length::new::<millimeter>(params.0),
            Length::new::<millimeter>(params.1),
            Angle::new::<degree>(params.2),
        ),
        y_curve_end: Length::new::<millimeter>(params.3),
        x_adv: Length::new::<millimeter>(params.4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uom::si::{angle::radian, velocity::millimeter_per_second};

    fn expected_v_ref(kind: SlalomKind) -> f32 {
        use SlalomKind::*;

        match kind {
            Search90 => 265.749,
            FastRun45 => 411.636,
            FastRun90 => 422.783,
            FastRun135 => 353.609,
            FastRun180 => 412.228,
            FastRunDiagonal90 => 289.908,
        }
    }

    proptest! {
        #[test]
        fn test_slalom_shapes(kind: SlalomKind, dir: SlalomDirection) {
            use approx::assert_relative_eq;

            let shape = slalom_parameters_map(kind, dir)
                .shape(&AngularLimits::default())
                .unwrap();
            assert_relative_eq!(
                shape.v_ref.get::<millimeter_per_second>(),
                expected_v_ref(kind),
                max_relative = 1e-3
            );
            let error = shape.integral_error();
            prop_assert!(error.x.get::<millimeter>().abs() < 1e-3);
            prop_assert!(error.y.get::<millimeter>().abs() < 1e-3);
            prop_assert!(error.theta.get::<radian>().abs() < 1e-3);
            prop_assert!(shape.straight_prev.get::<millimeter>() > -1e-3);
            prop_assert!(shape.straight_post.get::<millimeter>() > -1e-3);
        }
    }

    #[test]
    fn test_right_is_mirror_of_left() {
        let left = slalom_parameters_map(SlalomKind::FastRun135, SlalomDirection::Left);
        let right = slalom_parameters_map(SlalomKind::FastRun135, SlalomDirection::Right);
        assert_eq!(right.total, left.total.mirror_x());
        assert_eq!(right.y_curve_end, -left.y_curve_end);
    }
}
