//! spinview core library - model viewing and drag-to-rotate interaction
//!
//! Everything here is independent of the host: STL decoding, the scene graph,
//! picking, the interaction controller and a software projection that both the
//! terminal and the browser front ends rasterize.

pub mod asset;
pub mod camera;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod inertia;
pub mod input;
pub mod ray;
pub mod render;
pub mod scene;
pub mod stage;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use asset::{load_model, model_from_stl, AssetError};
pub use camera::{Camera, ProjectionMode, Viewport};
pub use config::{CameraSettings, ConfigError, ControllerConfig, ModelSettings, ViewerConfig};
pub use controller::{
    AngularVelocity, CoastTask, FrameRequest, HitTest, InteractionController, InteractionState,
    Rotatable,
};
pub use geometry::{Aabb, Mesh, Triangle, Vertex};
pub use inertia::{FrameQueue, FrameScheduler};
pub use input::{PointerEvent, PointerPosition, TouchPhase, TouchPoint, TouchTracker};
pub use ray::Ray;
pub use render::{project_scene, ProjectedTriangle};
pub use scene::{Material, Node, Pivot, Scene, SceneError, Surface};
pub use stage::{Stage, StageError};
pub use transform::Transform;
