//! Drag-to-rotate interaction with inertial coasting
//!
//! The controller owns only interaction state. The pivot it rotates and the
//! model it hit-tests are borrowed per call, so an absent model (still loading)
//! is simply `None` and every handler becomes a no-op.
use log::{debug, trace};

use crate::camera::{Camera, Viewport};
use crate::config::ControllerConfig;
use crate::inertia;
use crate::input::PointerPosition;
use crate::ray::Ray;

/// Something a pick ray can hit
pub trait HitTest {
    fn intersects(&self, ray: &Ray) -> bool;
}

/// Something that accepts screen-driven rotation, in radians
pub trait Rotatable {
    fn rotate(&mut self, yaw: f32, pitch: f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging,
    Coasting,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragState {
    pub active: bool,
    pub last_pointer: PointerPosition,
}

/// Radians per frame; `vx` drives pitch, `vy` drives yaw
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngularVelocity {
    pub vx: f32,
    pub vy: f32,
}

impl AngularVelocity {
    pub const ZERO: Self = Self { vx: 0.0, vy: 0.0 };

    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    pub fn is_zero(&self) -> bool {
        self.vx == 0.0 && self.vy == 0.0
    }

    /// Largest component magnitude; coasting ends when this drops below epsilon
    pub fn peak(&self) -> f32 {
        self.vx.abs().max(self.vy.abs())
    }

    pub fn magnitude(&self) -> f32 {
        self.vx.hypot(self.vy)
    }

    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            vx: self.vx * factor,
            vy: self.vy * factor,
        }
    }
}

/// Handle for one scheduled coast; goes stale when a newer drag or coast starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoastTask {
    generation: u64,
}

impl CoastTask {
    pub(crate) fn new(generation: u64) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Whether a frame callback should be scheduled again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    Continue,
    Stop,
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    config: ControllerConfig,
    state: InteractionState,
    drag: DragState,
    velocity: AngularVelocity,
    generation: u64,
    coasted: f32,
}

impl InteractionController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            state: InteractionState::Idle,
            drag: DragState::default(),
            velocity: AngularVelocity::ZERO,
            generation: 0,
            coasted: 0.0,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn velocity(&self) -> AngularVelocity {
        self.velocity
    }

    /// Total rotation applied by the current or most recent coast
    pub fn coasted(&self) -> f32 {
        self.coasted
    }

    /// Start a drag if the pick ray through `position` hits the target.
    ///
    /// Returns whether a drag started. A miss leaves every piece of state as it
    /// was, including an in-progress coast.
    pub fn pointer_down<T: HitTest + ?Sized>(
        &mut self,
        position: PointerPosition,
        camera: &Camera,
        viewport: Viewport,
        target: Option<&T>,
    ) -> bool {
        let Some(target) = target else {
            trace!("pointer down before the model is loaded");
            return false;
        };
        let hit = camera
            .pick_ray(viewport, position)
            .is_some_and(|ray| target.intersects(&ray));
        if !hit {
            trace!("pointer down at ({}, {}) missed the model", position.x, position.y);
            return false;
        }

        if self.state == InteractionState::Coasting {
            debug!("drag supersedes coast");
        }
        self.generation += 1;
        self.velocity = AngularVelocity::ZERO;
        self.drag = DragState {
            active: true,
            last_pointer: position,
        };
        self.state = InteractionState::Dragging;
        true
    }

    /// Rotate the target by the pointer delta since the previous event
    pub fn pointer_move<T: Rotatable + ?Sized>(
        &mut self,
        position: PointerPosition,
        target: Option<&mut T>,
    ) {
        if self.state != InteractionState::Dragging {
            return;
        }
        let Some(target) = target else {
            return;
        };

        let k = self.config.sensitivity;
        let delta_x = position.x - self.drag.last_pointer.x;
        let delta_y = position.y - self.drag.last_pointer.y;
        self.velocity = AngularVelocity::new(delta_y * k, delta_x * k);
        target.rotate(self.velocity.vy, self.velocity.vx);
        self.drag.last_pointer = position;
    }

    /// End the drag. Returns a coast task when there is velocity left to spend.
    pub fn pointer_up(&mut self) -> Option<CoastTask> {
        if self.state != InteractionState::Dragging {
            return None;
        }
        self.drag.active = false;

        if self.velocity.is_zero() {
            self.state = InteractionState::Idle;
            return None;
        }

        self.generation += 1;
        self.coasted = 0.0;
        self.state = InteractionState::Coasting;
        debug!(
            "coasting from vx={:.5} vy={:.5}",
            self.velocity.vx, self.velocity.vy
        );
        Some(CoastTask::new(self.generation))
    }

    /// One inertia step. Stale tasks and finished coasts return `Stop`.
    pub fn coast_frame<T: Rotatable + ?Sized>(
        &mut self,
        task: CoastTask,
        target: Option<&mut T>,
    ) -> FrameRequest {
        if self.state != InteractionState::Coasting || task.generation != self.generation {
            return FrameRequest::Stop;
        }
        let Some(target) = target else {
            self.come_to_rest();
            return FrameRequest::Stop;
        };

        let mut step = self.velocity;
        let mut exhausted = false;
        if let Some(max) = self.config.max_coast_angle {
            let remaining = (max - self.coasted).max(0.0);
            let magnitude = step.magnitude();
            if magnitude >= remaining {
                step = step.scaled(if magnitude > 0.0 { remaining / magnitude } else { 0.0 });
                exhausted = true;
            }
        }
        self.coasted += step.magnitude();
        target.rotate(step.vy, step.vx);

        self.velocity = inertia::decay(self.velocity, self.config.friction);
        if exhausted || self.velocity.peak() < self.config.rest_epsilon {
            self.come_to_rest();
            FrameRequest::Stop
        } else {
            FrameRequest::Continue
        }
    }

    /// Abandon any drag or coast, e.g. when the window loses focus
    pub fn cancel(&mut self) {
        if self.state != InteractionState::Idle {
            debug!("interaction cancelled while {:?}", self.state);
        }
        self.generation += 1;
        self.drag.active = false;
        self.velocity = AngularVelocity::ZERO;
        self.state = InteractionState::Idle;
    }

    fn come_to_rest(&mut self) {
        debug!("coast finished after {:.4} rad", self.coasted);
        self.velocity = AngularVelocity::ZERO;
        self.state = InteractionState::Idle;
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}
