//! Motion capability
//!
//! The actuator drivers live outside this crate. The agent only sees the five
//! fire-and-forget actions below.

mod stub;

pub use stub::LoggingMotion;

/// Executes discrete motion actions on the robot
///
/// Implementations must not block; no result is observed by the caller.
pub trait MotionController {
    fn forward(&mut self);
    fn backward(&mut self);
    fn turn_left(&mut self);
    fn turn_right(&mut self);
    fn stop(&mut self);
}
