//! Camera, viewport and projection utilities
use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::config::CameraSettings;
use crate::input::PointerPosition;
use crate::ray::Ray;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Size of the drawing surface in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Normalize a pixel position to device coordinates in `[-1, 1]`, y up
    pub fn to_ndc(&self, position: PointerPosition) -> Point2<f32> {
        Point2::new(
            position.x / self.width as f32 * 2.0 - 1.0,
            1.0 - position.y / self.height as f32 * 2.0,
        )
    }
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: Viewport::new(width, height).aspect(),
            near: 0.1,
            far: 100.0,
            mode: ProjectionMode::Perspective,
        }
    }

    pub fn from_settings(settings: &CameraSettings, viewport: Viewport) -> Self {
        let mut camera = Self::new(viewport.width, viewport.height);
        camera.position = Point3::new(0.0, 0.0, settings.distance);
        camera.fov = settings.fov_degrees.to_radians();
        camera.mode = settings.projection;
        camera.far = camera.far.max(settings.distance * 4.0);
        camera
    }

    /// Projection-update hook for viewport resizes
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = (self.position - self.target).norm();
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a 3D point to screen space, returning `(x, y, ndc_depth)`.
    ///
    /// Points behind the camera or outside the near/far range yield `None`.
    /// Points beside the viewport still project, to coordinates outside it;
    /// rasterizers clip those.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        viewport: Viewport,
    ) -> Option<(f32, f32, f32)> {
        let clip = self.view_projection() * model_matrix * point.to_homogeneous();
        if clip.w <= 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if ndc.z.abs() > 1.0 {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * viewport.width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * viewport.height as f32;

        Some((screen_x, screen_y, ndc.z))
    }

    /// World-space ray from the near plane through a device-space point.
    ///
    /// Returns `None` when the view-projection matrix is not invertible.
    pub fn ray_through(&self, ndc: Point2<f32>) -> Option<Ray> {
        let inverse = self.view_projection().try_inverse()?;
        let unproject = |z: f32| {
            let p = inverse * Vector4::new(ndc.x, ndc.y, z, 1.0);
            (p.w.abs() > f32::EPSILON).then(|| Point3::from(p.xyz() / p.w))
        };

        let near = unproject(-1.0)?;
        let far = unproject(1.0)?;
        let direction = (far - near).try_normalize(f32::EPSILON)?;
        Some(Ray::new(near, direction))
    }

    /// Ray through a pixel position of the viewport
    pub fn pick_ray(&self, viewport: Viewport, position: PointerPosition) -> Option<Ray> {
        self.ray_through(viewport.to_ndc(position))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
