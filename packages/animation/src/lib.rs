//! # Tiddly Animation
//!
//! One tick source drives every running animation.
//!
//! ```text
//!            start()                     tick() every interval
//! Animation ─────────→ Scheduler ──────────────────────────────→ progress += step
//!                         │                                        │
//!                         │  0 ≤ progress ≤ 1 → animation.tick(p)  │
//!                         │  otherwise        → animation.stop()   │
//!                         │                     removed after pass │
//!                         └── tick source runs while any animation is active
//! ```
//!
//! The scheduler never owns a timer itself: hosts either call
//! [`Scheduler::tick`] from their own frame loop or drive it with
//! [`Scheduler::run`], which ticks on a `tokio` interval until idle.

mod animations;
mod easing;
mod errors;
mod scheduler;


pub use animations::{Rect, Scroller, Slider, SliderFrame, ZoomFrame, Zoomer};
pub use easing::slow_in_slow_out;
pub use errors::{AnimationError, AnimationResult};
pub use scheduler::{Animation, AnimationId, Scheduler, Timing};
