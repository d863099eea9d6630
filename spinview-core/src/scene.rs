//! Scene graph: model nodes, the rotation pivot and the scene root
use log::{debug, info};
use nalgebra::{Matrix4, UnitQuaternion};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controller::{HitTest, Rotatable};
use crate::geometry::Mesh;
use crate::ray::Ray;
use crate::transform::{yaw_pitch_delta, Transform};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("a model is already attached to the pivot")]
    ModelAlreadyLoaded,
}

/// Surface appearance shared by every renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Material {
    pub color: [u8; 3],
    /// Light contribution on faces turned away from the light, in `[0, 1]`
    pub ambient: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: [96, 165, 250],
            ambient: 0.25,
        }
    }
}

impl Material {
    /// Lambert term blended with the ambient floor
    pub fn shade(&self, lambert: f32) -> f32 {
        let ambient = self.ambient.clamp(0.0, 1.0);
        ambient + (1.0 - ambient) * lambert.clamp(0.0, 1.0)
    }
}

/// Renderable surface capability of a node
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub mesh: Mesh,
    pub material: Material,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub surface: Option<Surface>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            surface: None,
            children: Vec::new(),
        }
    }

    pub fn with_surface(name: impl Into<String>, mesh: Mesh, material: Material) -> Self {
        Self {
            surface: Some(Surface { mesh, material }),
            ..Self::new(name)
        }
    }

    pub fn add_child(&mut self, child: Node) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Visit every node carrying a surface, with its world matrix
    pub fn visit_surfaces<F>(&self, parent: &Matrix4<f32>, visit: &mut F)
    where
        F: FnMut(&Surface, &Matrix4<f32>),
    {
        let world = parent * self.transform.matrix();
        if let Some(surface) = &self.surface {
            visit(surface, &world);
        }
        for child in &self.children {
            child.visit_surfaces(&world, visit);
        }
    }

    pub fn visit_surfaces_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(&mut Surface),
    {
        if let Some(surface) = &mut self.surface {
            visit(surface);
        }
        for child in &mut self.children {
            child.visit_surfaces_mut(visit);
        }
    }

    /// Override the material of every surface in the subtree
    pub fn apply_material(&mut self, material: Material) {
        self.visit_surfaces_mut(&mut |surface| surface.material = material);
    }

    pub fn triangle_count(&self) -> usize {
        let mut total = 0;
        self.visit_surfaces(&Matrix4::identity(), &mut |surface, _| {
            total += surface.mesh.triangles.len()
        });
        total
    }

    /// Nearest ray parameter over the whole subtree, descendants included
    pub fn intersect_ray(&self, ray: &Ray, parent: &Matrix4<f32>) -> Option<f32> {
        let mut nearest: Option<f32> = None;
        self.visit_surfaces(parent, &mut |surface, world| {
            // Affine maps preserve the ray parameter, so distances stay comparable
            let Some(inverse) = world.try_inverse() else {
                return;
            };
            if let Some(t) = ray.transformed(&inverse).intersect_mesh(&surface.mesh) {
                nearest = Some(nearest.map_or(t, |n| n.min(t)));
            }
        });
        nearest
    }
}

/// Orientable node at the origin that owns the loaded model
#[derive(Debug, Clone, PartialEq)]
pub struct Pivot {
    orientation: UnitQuaternion<f32>,
    model: Node,
}

impl Pivot {
    pub fn new(mut model: Node) -> Self {
        if !model.transform.is_identity() {
            debug!("resetting transform of model '{}' under pivot", model.name);
            model.transform = Transform::identity();
        }
        Self {
            orientation: UnitQuaternion::identity(),
            model,
        }
    }

    pub fn orientation(&self) -> UnitQuaternion<f32> {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: UnitQuaternion<f32>) {
        self.orientation = orientation;
    }

    pub fn model(&self) -> &Node {
        &self.model
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        self.orientation.to_homogeneous()
    }
}

impl Rotatable for Pivot {
    fn rotate(&mut self, yaw: f32, pitch: f32) {
        self.orientation = yaw_pitch_delta(yaw, pitch) * self.orientation;
        self.orientation.renormalize_fast();
    }
}

impl HitTest for Pivot {
    fn intersects(&self, ray: &Ray) -> bool {
        self.model.intersect_ray(ray, &self.matrix()).is_some()
    }
}

/// Scene root: background plus the pivot, absent until the model loads
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: [u8; 3],
    pivot: Option<Pivot>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            background: [17, 24, 39],
            pivot: None,
        }
    }

    /// Wrap the model in a pivot and attach it. Only one model per scene.
    pub fn attach_model(&mut self, model: Node) -> Result<&mut Pivot, SceneError> {
        if self.pivot.is_some() {
            return Err(SceneError::ModelAlreadyLoaded);
        }
        info!(
            "attached model '{}' ({} triangles)",
            model.name,
            model.triangle_count()
        );
        Ok(self.pivot.insert(Pivot::new(model)))
    }

    pub fn pivot(&self) -> Option<&Pivot> {
        self.pivot.as_ref()
    }

    pub fn pivot_mut(&mut self) -> Option<&mut Pivot> {
        self.pivot.as_mut()
    }

    /// Visit every surface of the model with its world matrix
    pub fn visit_surfaces<F>(&self, visit: &mut F)
    where
        F: FnMut(&Surface, &Matrix4<f32>),
    {
        if let Some(pivot) = &self.pivot {
            pivot.model.visit_surfaces(&pivot.matrix(), visit);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
