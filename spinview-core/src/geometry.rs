//! Geometry primitives for the loaded model
use nalgebra::{Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal from the winding order, or `None` for a degenerate face
    pub fn face_normal(&self) -> Option<Vector3<f32>> {
        let [v0, v1, v2] = self.positions();
        (v1 - v0).cross(&(v2 - v0)).try_normalize(1e-12)
    }

    pub fn positions(&self) -> [Point3<f32>; 3] {
        [
            self.vertices[0].position,
            self.vertices[1].position,
            self.vertices[2].position,
        ]
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, `None` when there are no points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f32>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, p| Self {
            min: bounds.min.inf(p),
            max: bounds.max.sup(p),
        }))
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn extents(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(
            self.triangles
                .iter()
                .flat_map(|t| t.vertices.iter().map(|v| &v.position)),
        )
    }

    /// Translate the vertex data so the bounds center sits at the origin.
    ///
    /// Only the geometry moves; whatever node owns the mesh keeps its transform.
    pub fn recenter(&mut self) {
        let Some(bounds) = self.bounds() else {
            return;
        };
        let offset = bounds.center().coords;
        for triangle in &mut self.triangles {
            for vertex in &mut triangle.vertices {
                vertex.position -= offset;
            }
        }
    }

    /// Uniformly scale the vertex data so the largest extent equals `size`
    pub fn fit_to_size(&mut self, size: f32) {
        let Some(bounds) = self.bounds() else {
            return;
        };
        let largest = bounds.extents().max();
        if largest <= f32::EPSILON {
            return;
        }
        let factor = size / largest;
        for triangle in &mut self.triangles {
            for vertex in &mut triangle.vertices {
                vertex.position.coords *= factor;
            }
        }
    }

    /// Axis-aligned cube centered at the origin
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        // (normal, four corners counter-clockwise seen from outside)
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0], [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]]),
            ([0.0, 0.0, -1.0], [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]]),
            ([0.0, 1.0, 0.0], [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]]),
            ([0.0, -1.0, 0.0], [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]]),
            ([1.0, 0.0, 0.0], [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]]),
            ([-1.0, 0.0, 0.0], [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]]),
        ];

        let mut mesh = Self::with_capacity(12);
        for ([nx, ny, nz], corners) in faces {
            let v = |[x, y, z]: [f32; 3]| Vertex::new(x, y, z, nx, ny, nz);
            mesh.add_triangle(Triangle::new(v(corners[0]), v(corners[1]), v(corners[2])));
            mesh.add_triangle(Triangle::new(v(corners[0]), v(corners[2]), v(corners[3])));
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_winding_matches_normals() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.triangles.len(), 12);
        for triangle in &cube.triangles {
            let face = triangle.face_normal().unwrap();
            assert_relative_eq!(face, triangle.vertices[0].normal, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_bounds() {
        let bounds = Mesh::cube(2.0).bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));
        assert!(Mesh::new().bounds().is_none());
    }

    #[test]
    fn test_recenter_and_fit() {
        let mut mesh = Mesh::cube(4.0);
        for triangle in &mut mesh.triangles {
            for vertex in &mut triangle.vertices {
                vertex.position += Vector3::new(10.0, 0.0, -3.0);
            }
        }
        mesh.recenter();
        mesh.fit_to_size(1.0);

        let bounds = mesh.bounds().unwrap();
        assert_relative_eq!(bounds.center(), Point3::origin(), epsilon = 1e-5);
        assert_relative_eq!(bounds.extents().max(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_degenerate_face_has_no_normal() {
        let v = Vertex::new(1.0, 1.0, 1.0, 0.0, 0.0, 1.0);
        assert!(Triangle::new(v, v, v).face_normal().is_none());
    }
}
