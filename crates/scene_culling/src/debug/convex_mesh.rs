//! Triangle soup generated from a convex region's surface

use crate::foundation::math::Vec3;

/// A flat-shaded triangle with outward facing normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshTriangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
    /// Unit normal shared by all three vertices
    pub normal: Vec3,
}

impl MeshTriangle {
    /// Creates a new triangle with an explicit normal
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, normal: Vec3) -> Self {
        Self { v0, v1, v2, normal }
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Normal derived from the winding (right-hand rule), unnormalized
    pub fn winding_normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }
}

/// Diagnostic mesh of a [`BoundingConvex`](crate::spatial::BoundingConvex)
#[derive(Debug, Clone, Default)]
pub struct ConvexMesh {
    /// Triangles in the convex region's space
    pub triangles: Vec<MeshTriangle>,
}

impl ConvexMesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a triangle
    pub fn add_triangle(&mut self, v0: Vec3, v1: Vec3, v2: Vec3, normal: Vec3) {
        self.triangles.push(MeshTriangle::new(v0, v1, v2, normal));
    }

    /// Number of triangles
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// True if no triangle was generated
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Flat vertex positions, three per triangle
    pub fn positions(&self) -> Vec<Vec3> {
        self.triangles
            .iter()
            .flat_map(|tri| [tri.v0, tri.v1, tri.v2])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_add_and_flatten() {
        let mut mesh = ConvexMesh::new();
        assert!(mesh.is_empty());
        mesh.add_triangle(
            Vec3::zeros(),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        );
        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh.positions().len(), 3);
        let tri = mesh.triangles[0];
        assert_relative_eq!(tri.winding_normal().normalize(), tri.normal, epsilon = 1e-6);
        assert_relative_eq!(tri.centroid(), Vec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0), epsilon = 1e-6);
    }
}
