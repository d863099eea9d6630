//! Backend-agnostic projection of the scene into screen-space triangles
use nalgebra::Vector3;

use crate::camera::{Camera, Viewport};
use crate::scene::Scene;

/// Screen-space triangle ready for rasterization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedTriangle {
    /// Pixel coordinates, y down
    pub points: [(f32, f32); 3],
    /// Mean NDC depth; larger is farther
    pub depth: f32,
    /// Light intensity in `[0, 1]`
    pub shade: f32,
    pub color: [u8; 3],
}

impl ProjectedTriangle {
    /// Material color scaled by the shade
    pub fn shaded_color(&self) -> [u8; 3] {
        self.color
            .map(|channel| (channel as f32 * self.shade).round().clamp(0.0, 255.0) as u8)
    }
}

/// Light direction in world space, pointing from the surface to the light
pub fn light_direction() -> Vector3<f32> {
    Vector3::new(0.4, 0.6, 1.0).normalize()
}

/// Project every front-facing triangle of the scene, sorted far to near
pub fn project_scene(scene: &Scene, camera: &Camera, viewport: Viewport) -> Vec<ProjectedTriangle> {
    let light = light_direction();
    let mut projected = Vec::new();

    scene.visit_surfaces(&mut |surface, world| {
        for triangle in &surface.mesh.triangles {
            let mut points = [(0.0, 0.0); 3];
            let mut depth = 0.0;
            let mut visible = true;
            for (slot, vertex) in points.iter_mut().zip(&triangle.vertices) {
                match camera.project_to_screen(&vertex.position, world, viewport) {
                    Some((x, y, z)) => {
                        *slot = (x, y);
                        depth += z / 3.0;
                    }
                    None => {
                        visible = false;
                        break;
                    }
                }
            }
            if !visible {
                continue;
            }

            // Counter-clockwise faces come out clockwise once y points down
            let [a, b, c] = points;
            let area = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
            if area >= 0.0 {
                continue;
            }

            let normal = triangle
                .face_normal()
                .unwrap_or(triangle.vertices[0].normal);
            let lambert = world
                .transform_vector(&normal)
                .try_normalize(f32::EPSILON)
                .map_or(0.0, |n| n.dot(&light));

            projected.push(ProjectedTriangle {
                points,
                depth,
                shade: surface.material.shade(lambert),
                color: surface.material.color,
            });
        }
    });

    projected.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    projected
}
