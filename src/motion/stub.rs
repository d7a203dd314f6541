//! Stub motion driver that only logs

use super::MotionController;
use tracing::info;

/// Motion controller for boards without actuator drivers wired in
#[derive(Debug, Default)]
pub struct LoggingMotion {
    actions: u64,
}

impl LoggingMotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of actions executed so far
    pub fn actions(&self) -> u64 {
        self.actions
    }

    fn log(&mut self, action: &str) {
        self.actions += 1;
        info!("[MOTION] [stub] {}()", action);
    }
}

impl MotionController for LoggingMotion {
    fn forward(&mut self) {
        self.log("move_forward");
    }

    fn backward(&mut self) {
        self.log("move_backward");
    }

    fn turn_left(&mut self) {
        self.log("turn_left");
    }

    fn turn_right(&mut self) {
        self.log("turn_right");
    }

    fn stop(&mut self) {
        self.log("stop_motion");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_actions() {
        let mut motion = LoggingMotion::new();
        motion.forward();
        motion.turn_left();
        motion.stop();
        assert_eq!(motion.actions(), 3);
    }
}
