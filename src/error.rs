use crate::point::Point3;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum Error {
    /// The caller supplied a value outside its defined domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A query point lies outside the tree's bounding cube.
    #[error("point {point} is outside the mapped volume")]
    OutOfRange { point: Point3 },
}
