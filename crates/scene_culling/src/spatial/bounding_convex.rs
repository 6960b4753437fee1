//! Convex region formed by intersecting half-spaces
//!
//! Every [`Cutplane`] keeps the point set in front of its plane. Besides the
//! planes themselves the region tracks, per plane, the edges of the polygon
//! that plane contributes to the region's surface. Those edges are what make
//! it possible to discard planes that do not touch the region and to notice
//! when the region has collapsed to nothing.

use std::fmt;

use crate::core::DebugMeshConfig;
use crate::debug::ConvexMesh;
use crate::foundation::math::{Plane, Vec3};

use super::bounding_box::BoundingBox;
use super::bounding_sphere::BoundingSphere;
use super::bounding_volume::{BoundingVolume, TestResult};

/// Edges shorter than this are dropped while trimming
const MIN_EDGE_LENGTH: f32 = 0.0001;

/// How far behind a plane something must be before it counts as cut away
const BEHIND_TOLERANCE: f32 = 0.0001;

/// Sine of the angle below which an edge counts as parallel to a plane
const PARALLEL_TOLERANCE: f32 = 0.000001;

/// Boundary segment of a cutplane's polygon. Either end may extend forever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Start point, or a point on the line if `begin_endless`
    pub begin: Vec3,
    /// End point, or a point on the line if `end_endless`
    pub end: Vec3,
    /// The edge continues forever behind `begin`
    pub begin_endless: bool,
    /// The edge continues forever past `end`
    pub end_endless: bool,
}

impl Edge {
    fn endless_line(pos: Vec3, dir: Vec3) -> Self {
        Self {
            begin: pos,
            end: pos + dir,
            begin_endless: true,
            end_endless: true,
        }
    }

    fn dir(&self) -> Vec3 {
        self.end - self.begin
    }

    fn is_finite(&self) -> bool {
        !self.begin_endless && !self.end_endless
    }

    /// Shorten the edge so that only the part in front of `plane` remains.
    /// Returns false if nothing is left.
    fn trim(&mut self, plane: &Plane) -> bool {
        let dir = self.dir();
        debug_assert!(dir.magnitude() > 0.000001, "Edge direction is too short");

        let towards = plane.normal().dot(&dir);
        let (hit, mult) = match plane.hits_line(self.begin, dir) {
            Some(found) => found,
            None if towards.abs() <= PARALLEL_TOLERANCE * dir.magnitude() => {
                // Parallel to the plane, so either fully kept or fully cut
                return plane.distance_to_position(self.begin) >= -BEHIND_TOLERANCE;
            }
            None => {
                // Nearly parallel lines still cross the plane, only far away
                let mult = -plane.distance_to_position(self.begin) / towards;
                (self.begin + dir * mult, mult)
            }
        };

        if towards > 0.0 {
            // Cut from the begin side
            if !self.begin_endless && mult < 0.0 {
                // Plane does not reach the edge
            } else if self.end_endless {
                self.begin = hit;
                self.end = hit + dir;
                self.begin_endless = false;
            } else if mult < 1.0 {
                self.begin = hit;
                self.begin_endless = false;
            } else {
                return false;
            }
        } else {
            // Cut from the end side
            if !self.end_endless && mult > 1.0 {
                // Plane does not reach the edge
            } else if self.begin_endless {
                self.end = hit;
                self.begin = hit - dir;
                self.end_endless = false;
            } else if mult > 0.0 {
                self.end = hit;
                self.end_endless = false;
            } else {
                return false;
            }
        }

        self.dir().magnitude() >= MIN_EDGE_LENGTH
    }
}

/// One half-space of a [`BoundingConvex`], normal pointing into the region
#[derive(Debug, Clone, PartialEq)]
pub struct Cutplane {
    /// The bounding plane
    pub plane: Plane,
    /// Visible boundary of this plane within the region
    pub edges: Vec<Edge>,
}

impl Cutplane {
    fn new(plane: Plane) -> Self {
        Self {
            plane,
            edges: Vec::new(),
        }
    }
}

/// Intersection of half-spaces.
///
/// With no cutplanes and `nothing == false` the region contains everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingConvex {
    cutplanes: Vec<Cutplane>,
    nothing: bool,
}

impl BoundingConvex {
    /// Region containing everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Region bounded by `planes`, normals pointing inwards
    pub fn from_planes(planes: &[Plane]) -> Self {
        let mut convex = Self::new();
        convex.set_cutplanes(planes);
        convex
    }

    /// Replace every cutplane
    pub fn set_cutplanes(&mut self, planes: &[Plane]) {
        self.cutplanes = planes.iter().copied().map(Cutplane::new).collect();
        self.discard_useless_cutplanes();
    }

    /// Cut the region with one more half-space
    pub fn cut(&mut self, plane: Plane) {
        self.cutplanes.push(Cutplane::new(plane));
        self.discard_useless_cutplanes();
    }

    /// Surviving cutplanes with their edges
    pub fn cutplanes(&self) -> &[Cutplane] {
        &self.cutplanes
    }

    /// True if the half-spaces have no common point
    pub fn is_nothing(&self) -> bool {
        self.nothing
    }

    /// Classify another volume against this region
    pub fn test_another_bounding_volume<'b>(&self, other: impl Into<BoundingVolume<'b>>) -> TestResult {
        BoundingVolume::from(self).test(other.into())
    }

    /// Classify a sphere by its signed distance to every plane
    pub fn test_sphere(&self, sphere: &BoundingSphere) -> TestResult {
        if self.nothing {
            return TestResult::Outside;
        }
        if sphere.is_infinite() {
            return TestResult::PartiallyInside;
        }
        let mut fully_inside = true;
        for cutplane in &self.cutplanes {
            let distance = cutplane.plane.distance_to_position(sphere.center);
            if distance < -sphere.radius {
                return TestResult::Outside;
            }
            if distance < sphere.radius {
                fully_inside = false;
            }
        }
        if fully_inside {
            TestResult::Inside
        } else {
            TestResult::PartiallyInside
        }
    }

    /// Classify a box through its circumscribed sphere, then retry a partial
    /// result with the inscribed sphere.
    pub fn test_box(&self, aabb: &BoundingBox) -> TestResult {
        if self.nothing {
            return TestResult::Outside;
        }
        let center = aabb.center();
        let outer = BoundingSphere::new(center, aabb.space_diagonal_length() / 2.0);
        match self.test_sphere(&outer) {
            TestResult::PartiallyInside => {}
            decided => return decided,
        }

        let smallest = aabb.width_x().min(aabb.depth_y()).min(aabb.height_z());
        let inner = BoundingSphere::new(center, smallest / 2.0);
        if self.test_sphere(&inner) == TestResult::Inside {
            TestResult::Inside
        } else {
            TestResult::PartiallyInside
        }
    }

    /// Polytope overlap is not computed; any non-empty pair may overlap.
    pub fn test_convex(&self, other: &BoundingConvex) -> TestResult {
        if self.nothing || other.nothing {
            return TestResult::Outside;
        }
        TestResult::PartiallyInside
    }

    /// True if `pos` is strictly in front of every plane
    pub fn is_position_inside(&self, pos: Vec3) -> bool {
        if self.nothing {
            return false;
        }
        self.cutplanes
            .iter()
            .all(|cutplane| cutplane.plane.is_position_at_front(pos))
    }

    /// Region covered by both `self` and `other`
    pub fn intersection(&self, other: &BoundingConvex) -> BoundingConvex {
        if self.nothing || other.nothing {
            return BoundingConvex {
                cutplanes: Vec::new(),
                nothing: true,
            };
        }
        let mut result = BoundingConvex {
            cutplanes: Vec::with_capacity(self.cutplanes.len() + other.cutplanes.len()),
            nothing: false,
        };
        result.cutplanes.extend(self.cutplanes.iter().cloned());
        result.cutplanes.extend(other.cutplanes.iter().cloned());
        result.discard_useless_cutplanes();
        result
    }

    /// Move the whole region
    pub fn translate(&mut self, translation: Vec3) {
        for cutplane in &mut self.cutplanes {
            cutplane.plane = Plane::from_normal_point(
                cutplane.plane.normal(),
                cutplane.plane.position() + translation,
            );
            for edge in &mut cutplane.edges {
                edge.begin += translation;
                edge.end += translation;
            }
        }
    }

    /// Triangulate the visible surface for debugging.
    ///
    /// Endless edges are cut at `config.endless_edge_extent`, and planes with
    /// too few finite edge endpoints are not drawn at all.
    pub fn create_mesh(&self, config: &DebugMeshConfig) -> ConvexMesh {
        let mut mesh = ConvexMesh::new();

        for cutplane in &self.cutplanes {
            let finite_points: Vec<Vec3> = cutplane
                .edges
                .iter()
                .flat_map(|edge| {
                    let begin = (!edge.begin_endless).then_some(edge.begin);
                    let end = (!edge.end_endless).then_some(edge.end);
                    begin.into_iter().chain(end)
                })
                .collect();
            if finite_points.len() <= 2 {
                continue;
            }
            let center = finite_points.iter().sum::<Vec3>() / finite_points.len() as f32;

            for edge in &cutplane.edges {
                let mut begin = edge.begin;
                let mut end = edge.end;
                if edge.begin_endless {
                    begin += (edge.begin - edge.end).normalize() * config.endless_edge_extent;
                }
                if edge.end_endless {
                    end += (edge.end - edge.begin).normalize() * config.endless_edge_extent;
                }

                let tri_normal = (begin - center).cross(&(end - center));
                let tri_normal_len = tri_normal.magnitude();
                if tri_normal_len < config.min_triangle_normal {
                    continue;
                }
                let mut tri_normal = tri_normal / tri_normal_len;

                // Cutplane normals point inwards, mesh normals outwards
                if cutplane.plane.normal().dot(&tri_normal) > 0.0 {
                    std::mem::swap(&mut begin, &mut end);
                    tri_normal = -tri_normal;
                }
                mesh.add_triangle(center, begin, end, tri_normal);
            }
        }

        log::debug!("Generated convex debug mesh with {} triangles", mesh.len());
        mesh
    }

    /// Rebuild every plane's edges, drop planes that do not bound the region
    /// and detect an empty region.
    fn discard_useless_cutplanes(&mut self) {
        self.nothing = false;
        match self.cutplanes.len() {
            0 => return,
            1 => {
                self.cutplanes[0].edges.clear();
                return;
            }
            _ => {}
        }

        let planes: Vec<Plane> = self.cutplanes.iter().map(|c| c.plane).collect();
        let all_planes = planes.as_slice();
        let mut to_destroy = Vec::new();

        for (id1, cutplane1) in self.cutplanes.iter_mut().enumerate() {
            let plane1 = cutplane1.plane;
            let others = move || {
                all_planes
                    .iter()
                    .enumerate()
                    .filter(move |(id2, _)| *id2 != id1)
                    .map(|(_, plane2)| plane2)
            };

            cutplane1.edges = others()
                .filter_map(|plane2| plane1.hits_plane(plane2))
                .map(|(pos, dir)| Edge::endless_line(pos, dir))
                .collect();

            let destroy = if cutplane1.edges.is_empty() {
                // Every other plane is parallel. Useless only if some other
                // plane has this one behind it.
                let pos_at_plane = plane1.position();
                others().any(|plane2| plane2.distance_to_position(pos_at_plane) < 0.0)
            } else {
                for plane2 in others() {
                    let mut edge_id = 0;
                    while edge_id < cutplane1.edges.len() {
                        if cutplane1.edges[edge_id].trim(plane2) {
                            edge_id += 1;
                        } else {
                            cutplane1.edges.swap_remove(edge_id);
                        }
                    }
                }
                cutplane1.edges.retain(|edge| {
                    !edge.is_finite()
                        || !others().any(|plane2| {
                            plane2.distance_to_position(edge.begin) < -BEHIND_TOLERANCE
                                && plane2.distance_to_position(edge.end) < -BEHIND_TOLERANCE
                        })
                });
                cutplane1.edges.is_empty()
            };

            if destroy {
                log::trace!("Discarding cutplane {}", plane1);
                to_destroy.push(id1);
            }
        }

        for id in to_destroy.into_iter().rev() {
            self.cutplanes.swap_remove(id);
        }

        if self.cutplanes.is_empty() {
            log::debug!("Convex region of {} planes is empty", planes.len());
            self.nothing = true;
        }
    }
}

impl fmt::Display for BoundingConvex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cutplane) in self.cutplanes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", cutplane.plane)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plane(nx: f32, ny: f32, nz: f32, d: f32) -> Plane {
        Plane::from_normal_distance(Vec3::new(nx, ny, nz), d)
    }

    /// Six inward facing planes of the box `[-1, 1]^3`
    fn unit_cube() -> BoundingConvex {
        BoundingConvex::from_planes(&[
            plane(1.0, 0.0, 0.0, -1.0),
            plane(-1.0, 0.0, 0.0, -1.0),
            plane(0.0, 1.0, 0.0, -1.0),
            plane(0.0, -1.0, 0.0, -1.0),
            plane(0.0, 0.0, 1.0, -1.0),
            plane(0.0, 0.0, -1.0, -1.0),
        ])
    }

    #[test]
    fn test_empty_convex_contains_everything() {
        let convex = BoundingConvex::new();
        assert!(!convex.is_nothing());
        assert!(convex.is_position_inside(Vec3::new(1e5, -1e5, 3.0)));
        assert_eq!(convex.test_sphere(&BoundingSphere::new(Vec3::zeros(), 1.0)), TestResult::Inside);
    }

    #[test]
    fn test_single_plane_has_no_edges() {
        let convex = BoundingConvex::from_planes(&[plane(0.0, 0.0, 1.0, 2.0)]);
        assert_eq!(convex.cutplanes().len(), 1);
        assert!(convex.cutplanes()[0].edges.is_empty());
        assert!(convex.is_position_inside(Vec3::new(0.0, 0.0, 3.0)));
        assert!(!convex.is_position_inside(Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_contradicting_planes_are_nothing() {
        let convex = BoundingConvex::from_planes(&[plane(1.0, 0.0, 0.0, 5.0), plane(-1.0, 0.0, 0.0, 0.0)]);
        assert!(convex.is_nothing());
        assert!(convex.cutplanes().is_empty());
        assert_eq!(convex.test_sphere(&BoundingSphere::infinite()), TestResult::Outside);
        assert!(!convex.is_position_inside(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_contradiction_through_third_plane() {
        let convex = BoundingConvex::from_planes(&[
            plane(1.0, 0.0, 0.0, 5.0),
            plane(-1.0, 0.0, 0.0, 0.0),
            plane(0.0, 1.0, 0.0, 0.0),
        ]);
        assert!(convex.is_nothing());
    }

    #[test]
    fn test_duplicate_planes_do_not_collapse() {
        let p = plane(0.0, 1.0, 0.0, 1.0);
        let convex = BoundingConvex::from_planes(&[p, p]);
        assert!(!convex.is_nothing());
        assert_eq!(convex.cutplanes().len(), 2);
    }

    #[test]
    fn test_parallel_slab_is_kept() {
        let convex = BoundingConvex::from_planes(&[plane(1.0, 0.0, 0.0, 0.0), plane(-1.0, 0.0, 0.0, -5.0)]);
        assert!(!convex.is_nothing());
        assert!(convex.is_position_inside(Vec3::new(2.5, 0.0, 0.0)));
        assert!(!convex.is_position_inside(Vec3::new(6.0, 0.0, 0.0)));
    }

    #[test]
    fn test_nearly_parallel_edges_keep_region_alive() {
        // The third plane meets the x = y = 0 axis only at z of about 70
        let convex = BoundingConvex::from_planes(&[
            plane(1.0, 0.0, 0.0, 0.0),
            plane(0.0, 1.0, 0.0, 0.0),
            plane(-1.0, -1.0, 0.0002, 0.01),
        ]);
        let far_inside = Vec3::new(0.1, 0.1, 10000.0);
        assert!(!convex.is_nothing());
        assert_eq!(convex.cutplanes().len(), 3);
        assert!(convex.is_position_inside(far_inside));
        assert_ne!(convex.test_sphere(&BoundingSphere::new(far_inside, 0.05)), TestResult::Outside);
        assert_eq!(convex.test_sphere(&BoundingSphere::new(Vec3::new(0.1, 0.1, 0.0), 0.05)), TestResult::Outside);
    }

    #[test]
    fn test_redundant_plane_is_discarded() {
        let convex = BoundingConvex::from_planes(&[
            plane(1.0, 0.0, 0.0, 0.0),
            plane(1.0, 0.0, 0.0, -1.0),
            plane(0.0, 1.0, 0.0, 0.0),
        ]);
        assert!(!convex.is_nothing());
        assert_eq!(convex.cutplanes().len(), 2);
        assert!(convex.cutplanes().iter().all(|c| c.plane.distance_from_origin() == 0.0));
    }

    #[test]
    fn test_cube_edges_are_finite() {
        let cube = unit_cube();
        assert_eq!(cube.cutplanes().len(), 6);
        for cutplane in cube.cutplanes() {
            assert_eq!(cutplane.edges.len(), 4);
            for edge in &cutplane.edges {
                assert!(edge.is_finite());
                assert_relative_eq!(edge.dir().magnitude(), 2.0, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_cut_grows_region_one_plane_at_a_time() {
        let mut convex = BoundingConvex::new();
        convex.cut(plane(1.0, 0.0, 0.0, 0.0));
        convex.cut(plane(0.0, 1.0, 0.0, 0.0));
        assert!(convex.is_position_inside(Vec3::new(1.0, 1.0, 0.0)));
        assert!(!convex.is_position_inside(Vec3::new(1.0, -1.0, 0.0)));
        convex.cut(plane(-1.0, 0.0, 0.0, 2.0));
        assert!(convex.is_nothing());
    }

    #[test]
    fn test_sphere_classification() {
        let cube = unit_cube();
        assert_eq!(cube.test_sphere(&BoundingSphere::new(Vec3::zeros(), 0.5)), TestResult::Inside);
        assert_eq!(cube.test_sphere(&BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 0.5)), TestResult::PartiallyInside);
        assert_eq!(cube.test_sphere(&BoundingSphere::new(Vec3::new(3.0, 0.0, 0.0), 0.5)), TestResult::Outside);
        assert_eq!(cube.test_sphere(&BoundingSphere::infinite()), TestResult::PartiallyInside);
    }

    #[test]
    fn test_box_classification() {
        let cube = unit_cube();
        let small = BoundingBox::new(Vec3::new(-0.2, -0.2, -0.2), Vec3::new(0.2, 0.2, 0.2));
        let far = BoundingBox::new(Vec3::new(4.0, 4.0, 4.0), Vec3::new(5.0, 5.0, 5.0));
        let straddling = BoundingBox::new(Vec3::new(0.5, -0.5, -0.5), Vec3::new(1.5, 0.5, 0.5));
        assert_eq!(cube.test_box(&small), TestResult::Inside);
        assert_eq!(cube.test_box(&far), TestResult::Outside);
        assert_eq!(cube.test_box(&straddling), TestResult::PartiallyInside);
    }

    #[test]
    fn test_convex_classification_is_conservative() {
        let cube = unit_cube();
        let nothing = BoundingConvex::from_planes(&[plane(1.0, 0.0, 0.0, 5.0), plane(-1.0, 0.0, 0.0, 0.0)]);
        assert_eq!(cube.test_convex(&cube.clone()), TestResult::PartiallyInside);
        assert_eq!(cube.test_convex(&nothing), TestResult::Outside);
        assert_eq!(nothing.test_another_bounding_volume(&cube), TestResult::Outside);
    }

    #[test]
    fn test_intersection_and_translate() {
        let half = BoundingConvex::from_planes(&[plane(1.0, 0.0, 0.0, 0.0)]);
        let both = unit_cube().intersection(&half);
        assert!(both.is_position_inside(Vec3::new(0.5, 0.0, 0.0)));
        assert!(!both.is_position_inside(Vec3::new(-0.5, 0.0, 0.0)));

        let mut moved = unit_cube();
        moved.translate(Vec3::new(10.0, 0.0, 0.0));
        assert!(moved.is_position_inside(Vec3::new(10.5, 0.0, 0.0)));
        assert!(!moved.is_position_inside(Vec3::zeros()));
        for cutplane in moved.cutplanes() {
            for edge in &cutplane.edges {
                assert!(edge.begin.x >= 8.9 && edge.end.x <= 11.1);
            }
        }
    }

    #[test]
    fn test_intersection_with_nothing_is_nothing() {
        let nothing = BoundingConvex::from_planes(&[plane(1.0, 0.0, 0.0, 5.0), plane(-1.0, 0.0, 0.0, 0.0)]);
        for result in [nothing.intersection(&unit_cube()), unit_cube().intersection(&nothing)] {
            assert!(result.is_nothing());
            assert!(result.cutplanes().is_empty());
            assert!(!result.is_position_inside(Vec3::zeros()));
        }
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let planes = [
            plane(1.0, 0.0, 0.0, -1.0),
            plane(-1.0, 0.0, 0.0, -1.0),
            plane(0.0, 1.0, 1.0, 0.0),
        ];
        let mut convex = BoundingConvex::from_planes(&planes);
        let first = convex.clone();
        convex.set_cutplanes(&planes);
        assert_eq!(convex, first);
    }

    #[test]
    fn test_cube_mesh_faces_outwards() {
        let mesh = unit_cube().create_mesh(&DebugMeshConfig::default());
        // Four fan triangles per face
        assert_eq!(mesh.len(), 24);
        for tri in &mesh.triangles {
            assert!(tri.centroid().dot(&tri.normal) > 0.0);
            assert_relative_eq!(tri.winding_normal().normalize(), tri.normal, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_display_joins_planes() {
        let convex = BoundingConvex::from_planes(&[plane(1.0, 0.0, 0.0, 0.0)]);
        assert_eq!(convex.to_string(), "(1, 0, 0):0");
    }
}
