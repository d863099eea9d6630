//! Inertia decay and coast scheduling
use std::collections::VecDeque;

use crate::controller::{AngularVelocity, CoastTask};

/// Velocity after one frame of friction
pub fn decay(velocity: AngularVelocity, friction: f32) -> AngularVelocity {
    velocity.scaled(friction)
}

/// Frames a coast starting at `v0` runs before it drops below `epsilon`.
///
/// This is the smallest `n` with `v0 * friction^n < epsilon`, i.e.
/// `floor(ln(epsilon / v0) / ln(friction)) + 1`.
pub fn frames_to_rest(v0: f32, friction: f32, epsilon: f32) -> u32 {
    let v0 = f64::from(v0.abs());
    let epsilon = f64::from(epsilon);
    if v0 < epsilon {
        return 0;
    }
    let exact = (epsilon / v0).ln() / f64::from(friction).ln();
    exact.floor() as u32 + 1
}

/// Rotation contributed by `frames` coast steps starting at `v0`.
///
/// Geometric series `v0 * (1 - f^n) / (1 - f)`; tends to `v0 / (1 - f)`.
pub fn coast_distance(v0: f32, friction: f32, frames: u32) -> f32 {
    let f = f64::from(friction);
    let total = f64::from(v0) * (1.0 - f.powi(frames as i32)) / (1.0 - f);
    total as f32
}

/// Upper bound on the coast rotation for any number of frames
pub fn coast_limit(v0: f32, friction: f32) -> f32 {
    v0 / (1.0 - friction)
}

/// "Request next frame" primitive used by the coast loop
pub trait FrameScheduler {
    fn request_frame(&mut self, task: CoastTask);
}

/// Frame scheduler for hosts that drive their own loop.
///
/// Tasks requested during a frame run on the next one.
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: VecDeque<CoastTask>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Take every task due this frame
    pub fn take_due(&mut self) -> Vec<CoastTask> {
        self.pending.drain(..).collect()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self, task: CoastTask) {
        if !self.pending.contains(&task) {
            self.pending.push_back(task);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frames_to_rest_unit_velocity() {
        assert_eq!(frames_to_rest(1.0, 0.99, 1e-4), 917);
    }

    #[test]
    fn test_frames_to_rest_matches_simulation() {
        for v0 in [1.0f32, 0.25, 0.003, -0.5] {
            let mut velocity = AngularVelocity::new(0.0, v0);
            let mut frames = 0;
            while velocity.peak() >= 1e-4 {
                velocity = decay(velocity, 0.99);
                frames += 1;
            }
            assert_eq!(frames, frames_to_rest(v0, 0.99, 1e-4), "v0 = {}", v0);
        }
    }

    #[test]
    fn test_below_epsilon_needs_no_frames() {
        assert_eq!(frames_to_rest(5e-5, 0.99, 1e-4), 0);
    }

    #[test]
    fn test_coast_distance_series() {
        let v0 = 0.25;
        let frames = frames_to_rest(v0, 0.99, 1e-4);
        let mut summed = 0.0f64;
        let mut v = f64::from(v0);
        for _ in 0..frames {
            summed += v;
            v *= f64::from(0.99f32);
        }
        assert_relative_eq!(coast_distance(v0, 0.99, frames), summed as f32, epsilon = 1e-4);
        assert!(coast_distance(v0, 0.99, frames) < coast_limit(v0, 0.99));
        assert_relative_eq!(coast_limit(v0, 0.99), 25.0, epsilon = 1e-3);
    }

    #[test]
    fn test_queue_defers_to_next_frame() {
        let mut queue = FrameQueue::new();
        assert!(queue.is_empty());

        let task = CoastTask::new(7);
        queue.request_frame(task);
        queue.request_frame(task);
        queue.request_frame(CoastTask::new(8));
        assert_eq!(queue.len(), 2);

        let due = queue.take_due();
        assert_eq!(due, vec![task, CoastTask::new(8)]);
        assert!(queue.is_empty());
    }
}
