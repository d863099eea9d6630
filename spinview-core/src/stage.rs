//! The viewer as a whole: camera, scene and interaction wired together
//!
//! Hosts own a `Stage`, feed it pointer or touch events in viewport pixels,
//! and drive coasting through whatever frame primitive they have.
use log::{debug, info};
use nalgebra::UnitQuaternion;

use crate::asset::{model_from_stl, AssetError};
use crate::camera::{Camera, Viewport};
use crate::config::ViewerConfig;
use crate::controller::{CoastTask, FrameRequest, InteractionController, InteractionState};
use crate::inertia::{FrameQueue, FrameScheduler};
use crate::input::{PointerEvent, PointerPosition, TouchPhase};
use crate::render::{project_scene, ProjectedTriangle};
use crate::scene::{Node, Scene, SceneError};

#[derive(Debug, Clone)]
pub struct Stage {
    config: ViewerConfig,
    camera: Camera,
    viewport: Viewport,
    scene: Scene,
    controller: InteractionController,
}

impl Stage {
    pub fn new(viewport: Viewport, config: ViewerConfig) -> Self {
        Self {
            camera: Camera::from_settings(&config.camera, viewport),
            viewport,
            scene: Scene::new(),
            controller: InteractionController::new(config.interaction),
            config,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn state(&self) -> InteractionState {
        self.controller.state()
    }

    pub fn is_model_loaded(&self) -> bool {
        self.scene.pivot().is_some()
    }

    /// Current model orientation; identity until a model is attached
    pub fn orientation(&self) -> UnitQuaternion<f32> {
        self.scene
            .pivot()
            .map_or_else(UnitQuaternion::identity, |pivot| pivot.orientation())
    }

    pub fn attach_model(&mut self, model: Node) -> Result<(), SceneError> {
        self.scene.attach_model(model)?;
        Ok(())
    }

    /// Decode STL data with the configured model settings and attach it
    pub fn load_stl(&mut self, bytes: &[u8], name: &str) -> Result<(), StageError> {
        let model = model_from_stl(bytes, name, &self.config.model, self.config.material)?;
        self.attach_model(model)?;
        Ok(())
    }

    pub fn pointer_down(&mut self, position: PointerPosition) -> bool {
        self.controller
            .pointer_down(position, &self.camera, self.viewport, self.scene.pivot())
    }

    pub fn pointer_move(&mut self, position: PointerPosition) {
        self.controller.pointer_move(position, self.scene.pivot_mut());
    }

    pub fn pointer_up(&mut self) -> Option<CoastTask> {
        self.controller.pointer_up()
    }

    /// Dispatch a normalized pointer event. Returns a coast task on release.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<CoastTask> {
        match event {
            PointerEvent::Down(position) => {
                self.pointer_down(position);
                None
            }
            PointerEvent::Move(position) => {
                self.pointer_move(position);
                None
            }
            PointerEvent::Up => self.pointer_up(),
        }
    }

    /// Touch input, tracking the first contact point only
    pub fn handle_touch(
        &mut self,
        phase: TouchPhase,
        touches: &[PointerPosition],
    ) -> Option<CoastTask> {
        PointerEvent::from_touch(phase, touches).and_then(|event| self.handle_pointer(event))
    }

    pub fn coast_frame(&mut self, task: CoastTask) -> FrameRequest {
        self.controller.coast_frame(task, self.scene.pivot_mut())
    }

    /// Run the coast steps due this frame, rescheduling those that continue
    pub fn run_frame(&mut self, queue: &mut FrameQueue) {
        for task in queue.take_due() {
            if self.coast_frame(task) == FrameRequest::Continue {
                queue.request_frame(task);
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.camera.set_viewport(self.viewport);
        debug!("viewport resized to {}x{}", self.viewport.width, self.viewport.height);
    }

    /// Stop any motion and put the model back to its loaded orientation
    pub fn reset_orientation(&mut self) {
        self.controller.cancel();
        if let Some(pivot) = self.scene.pivot_mut() {
            pivot.set_orientation(UnitQuaternion::identity());
            info!("orientation reset");
        }
    }

    pub fn cancel_interaction(&mut self) {
        self.controller.cancel();
    }

    /// Front-facing triangles in draw order
    pub fn project(&self) -> Vec<ProjectedTriangle> {
        project_scene(&self.scene, &self.camera, self.viewport)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}
