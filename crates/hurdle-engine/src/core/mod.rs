pub use self::{geometry::*, kinematics::*};

pub(crate) mod geometry;
pub(crate) mod kinematics;
