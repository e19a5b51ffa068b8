mod kind;
mod shape;
mod trajectory;

pub use kind::{slalom_parameters_map, SlalomDirection, SlalomKind, SlalomParameters};
pub use shape::{AngularLimits, TurnShape};
pub use trajectory::TurnTrajectory;
