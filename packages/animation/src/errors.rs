use std::time::Duration;
use thiserror::Error;

pub type AnimationResult<T> = Result<T, AnimationError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    #[error("Animation interval must be non-zero")]
    ZeroInterval,

    #[error("Animation duration {duration:?} is shorter than the tick interval {interval:?}")]
    DurationTooShort { duration: Duration, interval: Duration },

    #[error("Animation step {step} never finishes")]
    InvalidStep { step: f64 },
}
