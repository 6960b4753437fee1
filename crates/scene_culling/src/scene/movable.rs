//! Scene graph of movables
//!
//! Every movable has a local transform relative to its parent, an optional
//! local bounding sphere and a list of renderables. Two derived values are
//! kept up to date lazily:
//!
//! - the absolute transform, guarded by a three-state [`TransformState`]
//!   that is pushed down on mutation and pulled up again on update
//! - the total bounding sphere, enclosing the movable and all its visible
//!   descendants in the movable's own space
//!
//! After a batch of mutations, call [`SceneGraph::update_absolute_transform`]
//! and then [`SceneGraph::update_total_bounding_sphere`] on the root before
//! [`SceneGraph::get_all_visibles`].

use crate::error::SceneError;
use crate::foundation::collections::{MovableArena, MovableId};
use crate::foundation::math::{Transform, Vec3};
use crate::spatial::{BoundingSphere, TestResult, ViewFrustum};

use super::cache::{Cache, TransformState};
use super::visibles::{Renderable, Visibles};

/// A node of the scene graph
#[derive(Debug, Clone)]
struct MovableNode<R> {
    parent: Option<MovableId>,
    children: Vec<MovableId>,
    transform: Transform,
    absolute_transform: Transform,
    transform_state: TransformState,
    bounding_sphere: BoundingSphere,
    total_bounding_sphere: Cache<BoundingSphere>,
    visible: bool,
    renderables: Vec<R>,
}

impl<R> MovableNode<R> {
    fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            transform: Transform::identity(),
            absolute_transform: Transform::identity(),
            transform_state: TransformState::No,
            bounding_sphere: BoundingSphere::nothing(),
            total_bounding_sphere: Cache::stale(BoundingSphere::nothing()),
            visible: true,
            renderables: Vec::new(),
        }
    }
}

/// Arena owning every movable and their parent/child links
#[derive(Debug, Clone)]
pub struct SceneGraph<R> {
    nodes: MovableArena<MovableNode<R>>,
}

impl<R> Default for SceneGraph<R> {
    fn default() -> Self {
        Self {
            nodes: MovableArena::with_key(),
        }
    }
}

impl<R: Renderable + Clone> SceneGraph<R> {
    /// Create an empty scene graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached, visible movable with identity transform
    pub fn create_movable(&mut self) -> MovableId {
        self.nodes.insert(MovableNode::new())
    }

    /// Destroy a movable. It must not have children.
    pub fn destroy(&mut self, id: MovableId) -> Result<(), SceneError> {
        let node = self.node(id)?;
        if !node.children.is_empty() {
            return Err(SceneError::HasChildren(id));
        }
        if let Some(parent) = node.parent {
            self.detach_from_parent(id, parent);
        }
        self.nodes.remove(id);
        log::trace!("Destroyed movable {:?}", id);
        Ok(())
    }

    /// True if `id` refers to a live movable
    pub fn contains(&self, id: MovableId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live movables
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if there are no movables
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------

    /// Attach `id` under `parent`, or detach it with `None`
    pub fn set_parent(&mut self, id: MovableId, parent: Option<MovableId>) -> Result<(), SceneError> {
        let old_parent = self.node(id)?.parent;
        if let Some(new_parent) = parent {
            self.node(new_parent)?;
            let mut ancestor = Some(new_parent);
            while let Some(current) = ancestor {
                if current == id {
                    return Err(SceneError::ParentLoop { child: id, parent: new_parent });
                }
                ancestor = self.nodes[current].parent;
            }
        }

        if let Some(old_parent) = old_parent {
            self.detach_from_parent(id, old_parent);
        }
        self.nodes[id].parent = parent;
        if let Some(new_parent) = parent {
            self.register_child(new_parent, id);
        }

        // Pretend the transform was valid so the change reaches children and ancestors
        let node = &mut self.nodes[id];
        if node.visible {
            node.transform_state = TransformState::Yes;
            self.transform_changed(id);
        } else {
            node.transform_state = TransformState::No;
        }
        log::trace!("Parent of {:?} set to {:?}", id, parent);
        Ok(())
    }

    /// Parent of a movable
    pub fn parent(&self, id: MovableId) -> Result<Option<MovableId>, SceneError> {
        Ok(self.node(id)?.parent)
    }

    /// Children of a movable
    pub fn children(&self, id: MovableId) -> Result<&[MovableId], SceneError> {
        Ok(&self.node(id)?.children)
    }

    // ------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------

    /// Local transform relative to the parent
    pub fn transform(&self, id: MovableId) -> Result<&Transform, SceneError> {
        Ok(&self.node(id)?.transform)
    }

    /// Transform relative to the root. Must not be read while stale.
    pub fn absolute_transform(&self, id: MovableId) -> Result<&Transform, SceneError> {
        let node = self.node(id)?;
        debug_assert!(
            node.transform_state.is_readable(),
            "Unable to get absolute transform because it is not up to date"
        );
        Ok(&node.absolute_transform)
    }

    /// State of the absolute transform
    pub fn transform_state(&self, id: MovableId) -> Result<TransformState, SceneError> {
        Ok(self.node(id)?.transform_state)
    }

    /// Replace the local transform
    pub fn set_transform(&mut self, id: MovableId, transform: Transform) -> Result<(), SceneError> {
        self.modify_transform(id, |t| *t = transform)
    }

    /// Reset the local transform to identity
    pub fn reset_transform(&mut self, id: MovableId) -> Result<(), SceneError> {
        self.modify_transform(id, Transform::reset)
    }

    /// Set the translation part of the local transform
    pub fn set_position(&mut self, id: MovableId, position: Vec3) -> Result<(), SceneError> {
        self.modify_transform(id, |t| t.set_position(position))
    }

    /// Translate in parent space
    pub fn translate(&mut self, id: MovableId, v: Vec3) -> Result<(), SceneError> {
        self.modify_transform(id, |t| t.translate(v))
    }

    /// Rotate around the parent's X axis
    pub fn rotate_x(&mut self, id: MovableId, angle: f32) -> Result<(), SceneError> {
        self.modify_transform(id, |t| t.rotate_x(angle))
    }

    /// Rotate around the parent's Y axis
    pub fn rotate_y(&mut self, id: MovableId, angle: f32) -> Result<(), SceneError> {
        self.modify_transform(id, |t| t.rotate_y(angle))
    }

    /// Rotate around the parent's Z axis
    pub fn rotate_z(&mut self, id: MovableId, angle: f32) -> Result<(), SceneError> {
        self.modify_transform(id, |t| t.rotate_z(angle))
    }

    /// Scale per axis in parent space
    pub fn scale(&mut self, id: MovableId, v: Vec3) -> Result<(), SceneError> {
        self.modify_transform(id, |t| t.scale(v))
    }

    /// Bring the absolute transform of `id` and its visible descendants up
    /// to date. The parent's absolute transform must not be stale.
    pub fn update_absolute_transform(&mut self, id: MovableId) -> Result<(), SceneError> {
        let node = self.node(id)?;
        if node.transform_state == TransformState::Yes {
            return Ok(());
        }
        let parent = node.parent;
        let parent_absolute = match parent {
            Some(parent) => {
                let parent_node = &self.nodes[parent];
                debug_assert!(
                    parent_node.transform_state.is_readable(),
                    "Parent transform must be up to date"
                );
                parent_node.absolute_transform
            }
            None => Transform::identity(),
        };

        self.update_absolute_transform_from(id, &parent_absolute);

        // This might have been the last lagging child of the parent
        if let Some(parent) = parent {
            self.recheck_children_up_to_date(parent);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bounding spheres and visibility
    // ------------------------------------------------------------------

    /// Local bounding sphere
    pub fn bounding_sphere(&self, id: MovableId) -> Result<BoundingSphere, SceneError> {
        Ok(self.node(id)?.bounding_sphere)
    }

    /// Replace the local bounding sphere
    pub fn set_bounding_sphere(&mut self, id: MovableId, sphere: BoundingSphere) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        node.bounding_sphere = sphere;
        if node.visible {
            self.mark_total_bounding_sphere_stale(id);
        }
        Ok(())
    }

    /// Sphere enclosing the movable and its visible descendants, in the
    /// movable's own space. The movable must be visible and up to date.
    pub fn total_bounding_sphere(&self, id: MovableId) -> Result<BoundingSphere, SceneError> {
        let node = self.node(id)?;
        debug_assert!(node.visible, "Hidden movables have no total bounding sphere");
        Ok(*node.total_bounding_sphere.get())
    }

    /// Recompute total bounding spheres below a root movable
    pub fn update_total_bounding_sphere(&mut self, id: MovableId) -> Result<(), SceneError> {
        let node = self.node(id)?;
        if !node.visible {
            return Ok(());
        }
        debug_assert!(node.parent.is_none(), "Total bounding sphere must be updated from the root");
        if node.total_bounding_sphere.is_valid() {
            return Ok(());
        }
        self.update_total_bounding_sphere_recursive(id);
        Ok(())
    }

    /// Show or hide a movable together with its subtree
    pub fn set_visible(&mut self, id: MovableId, visible: bool) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        if node.visible == visible {
            return Ok(());
        }
        node.visible = visible;
        self.mark_total_bounding_sphere_stale(id);
        if visible {
            // Hidden movables were skipped by updates, so force a refresh
            self.nodes[id].transform_state = TransformState::Yes;
            self.transform_changed(id);
        }
        log::trace!("Movable {:?} visible: {}", id, visible);
        Ok(())
    }

    /// True unless hidden with [`SceneGraph::set_visible`]
    pub fn is_visible(&self, id: MovableId) -> Result<bool, SceneError> {
        Ok(self.node(id)?.visible)
    }

    // ------------------------------------------------------------------
    // Renderables
    // ------------------------------------------------------------------

    /// Renderables attached to a movable
    pub fn renderables(&self, id: MovableId) -> Result<&[R], SceneError> {
        Ok(&self.node(id)?.renderables)
    }

    /// Replace all renderables with a single one
    pub fn set_renderable(&mut self, id: MovableId, renderable: R) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        node.renderables.clear();
        node.renderables.push(renderable);
        Ok(())
    }

    /// Replace all renderables
    pub fn set_renderables(&mut self, id: MovableId, renderables: Vec<R>) -> Result<(), SceneError> {
        self.node_mut(id)?.renderables = renderables;
        Ok(())
    }

    /// Attach one more renderable
    pub fn add_renderable(&mut self, id: MovableId, renderable: R) -> Result<(), SceneError> {
        self.node_mut(id)?.renderables.push(renderable);
        Ok(())
    }

    /// Attach several renderables
    pub fn add_renderables(&mut self, id: MovableId, renderables: impl IntoIterator<Item = R>) -> Result<(), SceneError> {
        self.node_mut(id)?.renderables.extend(renderables);
        Ok(())
    }

    /// Detach every renderable
    pub fn clear_renderables(&mut self, id: MovableId) -> Result<(), SceneError> {
        self.node_mut(id)?.renderables.clear();
        Ok(())
    }

    /// Collect renderables of `id` and its descendants that may be visible.
    ///
    /// A movable is visible if it overlaps some view frustum (or no view
    /// frustums are given) and is not fully inside any occlusion frustum.
    /// Absolute transforms and total bounding spheres must be up to date.
    pub fn get_all_visibles(
        &self,
        id: MovableId,
        result: &mut Visibles<R>,
        view_frustums: &[ViewFrustum],
        occlusion_frustums: &[ViewFrustum],
    ) -> Result<(), SceneError> {
        self.node(id)?;
        let vfrusts: Vec<&ViewFrustum> = view_frustums.iter().collect();
        let ofrusts: Vec<&ViewFrustum> = occlusion_frustums.iter().collect();
        self.collect_visibles(id, result, &vfrusts, &ofrusts);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn node(&self, id: MovableId) -> Result<&MovableNode<R>, SceneError> {
        self.nodes.get(id).ok_or(SceneError::UnknownMovable(id))
    }

    fn node_mut(&mut self, id: MovableId) -> Result<&mut MovableNode<R>, SceneError> {
        self.nodes.get_mut(id).ok_or(SceneError::UnknownMovable(id))
    }

    fn modify_transform(&mut self, id: MovableId, modify: impl FnOnce(&mut Transform)) -> Result<(), SceneError> {
        modify(&mut self.node_mut(id)?.transform);
        self.transform_changed(id);
        Ok(())
    }

    fn register_child(&mut self, parent: MovableId, child: MovableId) {
        let parent_node = &mut self.nodes[parent];
        debug_assert!(!parent_node.children.contains(&child), "That child is already registered");
        parent_node.children.push(child);
        if parent_node.visible {
            self.mark_total_bounding_sphere_stale(parent);
        }
    }

    fn detach_from_parent(&mut self, child: MovableId, parent: MovableId) {
        let parent_node = &mut self.nodes[parent];
        debug_assert!(parent_node.children.contains(&child), "That child does not exist");
        parent_node.children.retain(|&c| c != child);
        if parent_node.visible {
            self.mark_total_bounding_sphere_stale(parent);
        }
        self.recheck_children_up_to_date(parent);
    }

    /// Local transform of `id` changed
    fn transform_changed(&mut self, id: MovableId) {
        if !self.nodes[id].visible {
            return;
        }

        // Already stale movables have pushed their state down and up before
        if self.nodes[id].transform_state != TransformState::No {
            for i in 0..self.nodes[id].children.len() {
                let child = self.nodes[id].children[i];
                self.transform_changed_recursive(child);
            }
            self.nodes[id].transform_state = TransformState::No;

            let mut ancestor = self.nodes[id].parent;
            while let Some(current) = ancestor {
                let node = &mut self.nodes[current];
                if node.transform_state != TransformState::Yes {
                    break;
                }
                node.transform_state = TransformState::NoForChildren;
                ancestor = node.parent;
            }
        }

        self.mark_total_bounding_sphere_stale(id);
    }

    fn transform_changed_recursive(&mut self, id: MovableId) {
        let node = &self.nodes[id];
        if !node.visible || node.transform_state == TransformState::No {
            return;
        }
        for i in 0..node.children.len() {
            let child = self.nodes[id].children[i];
            self.transform_changed_recursive(child);
        }
        self.nodes[id].transform_state = TransformState::No;
    }

    fn update_absolute_transform_from(&mut self, id: MovableId, parent_absolute: &Transform) {
        let node = &mut self.nodes[id];
        if !node.visible {
            return;
        }
        debug_assert!(node.transform_state != TransformState::Yes, "Must not be up to date already");

        if node.transform_state == TransformState::No {
            node.absolute_transform = node.transform.compose(parent_absolute);
        }
        node.transform_state = TransformState::Yes;
        let absolute = node.absolute_transform;

        for i in 0..self.nodes[id].children.len() {
            let child = self.nodes[id].children[i];
            if self.nodes[child].transform_state != TransformState::Yes {
                self.update_absolute_transform_from(child, &absolute);
            }
        }
    }

    /// Promote `id` from `NoForChildren` to `Yes` once every visible child
    /// is up to date, and continue with its parent.
    fn recheck_children_up_to_date(&mut self, id: MovableId) {
        let node = &self.nodes[id];
        if node.transform_state != TransformState::NoForChildren {
            return;
        }
        let all_up_to_date = node
            .children
            .iter()
            .map(|&child| &self.nodes[child])
            .filter(|child| child.visible)
            .all(|child| child.transform_state == TransformState::Yes);
        if !all_up_to_date {
            return;
        }
        let parent = node.parent;
        self.nodes[id].transform_state = TransformState::Yes;
        if let Some(parent) = parent {
            self.recheck_children_up_to_date(parent);
        }
    }

    /// Invalidate the total bounding sphere of `id` and of every ancestor
    /// up to the first one that is already stale.
    fn mark_total_bounding_sphere_stale(&mut self, id: MovableId) {
        self.nodes[id].total_bounding_sphere.invalidate();
        let mut ancestor = self.nodes[id].parent;
        while let Some(current) = ancestor {
            let node = &mut self.nodes[current];
            if !node.total_bounding_sphere.is_valid() {
                break;
            }
            node.total_bounding_sphere.invalidate();
            ancestor = node.parent;
        }
    }

    fn update_total_bounding_sphere_recursive(&mut self, id: MovableId) {
        if !self.nodes[id].visible {
            return;
        }
        for i in 0..self.nodes[id].children.len() {
            let child = self.nodes[id].children[i];
            let child_node = &self.nodes[child];
            if child_node.visible && !child_node.total_bounding_sphere.is_valid() {
                self.update_total_bounding_sphere_recursive(child);
            }
        }

        let total = self.compute_total_bounding_sphere(id);
        self.nodes[id].total_bounding_sphere.set(total);
    }

    /// Average the centers of every sphere to enclose, then take the
    /// largest radius needed from there. Not a minimal sphere.
    fn compute_total_bounding_sphere(&self, id: MovableId) -> BoundingSphere {
        let node = &self.nodes[id];
        if node.bounding_sphere.is_infinite() {
            return BoundingSphere::infinite();
        }

        let mut spheres = Vec::with_capacity(node.children.len() + 1);
        if !node.bounding_sphere.is_nothing() {
            spheres.push(node.bounding_sphere);
        }
        for &child in &node.children {
            let child_node = &self.nodes[child];
            if !child_node.visible {
                continue;
            }
            let child_sphere = *child_node.total_bounding_sphere.get();
            if child_sphere.is_infinite() {
                return BoundingSphere::infinite();
            }
            if child_sphere.is_nothing() {
                continue;
            }
            spheres.push(child_sphere.transformed(&child_node.transform));
        }

        if spheres.is_empty() {
            return BoundingSphere::nothing();
        }
        let center = spheres.iter().map(|s| s.center).sum::<Vec3>() / spheres.len() as f32;
        let radius = spheres
            .iter()
            .map(|s| (center - s.center).magnitude() + s.radius)
            .fold(0.0_f32, f32::max);
        BoundingSphere::new(center, radius)
    }

    fn collect_visibles(
        &self,
        id: MovableId,
        result: &mut Visibles<R>,
        vfrusts: &[&ViewFrustum],
        ofrusts: &[&ViewFrustum],
    ) {
        let node = &self.nodes[id];
        if !node.visible {
            return;
        }
        let total = *node.total_bounding_sphere.get();
        if total.is_nothing() {
            return;
        }
        debug_assert!(node.transform_state.is_readable(), "Absolute transform is not up to date");
        let absolute = &node.absolute_transform;

        let mut children_vfrusts = Vec::new();
        let mut children_ofrusts = Vec::new();
        if total.is_infinite() {
            children_vfrusts.extend_from_slice(vfrusts);
            children_ofrusts.extend_from_slice(ofrusts);
        } else {
            let total_world = total.transformed(absolute);

            // Occluders first, one of them may hide the whole subtree
            for &ofrust in ofrusts {
                match ofrust.test_bounding_sphere(&total_world) {
                    TestResult::Inside => return,
                    TestResult::PartiallyInside => children_ofrusts.push(ofrust),
                    TestResult::Outside => {}
                }
            }

            // No view frustums at all means everything is in view
            if !vfrusts.is_empty() {
                let mut fully_outside = true;
                for &vfrust in vfrusts {
                    match vfrust.test_bounding_sphere(&total_world) {
                        TestResult::Inside => {
                            children_vfrusts.clear();
                            fully_outside = false;
                            break;
                        }
                        TestResult::PartiallyInside => {
                            children_vfrusts.push(vfrust);
                            fully_outside = false;
                        }
                        TestResult::Outside => {}
                    }
                }
                if fully_outside {
                    return;
                }
            }
        }

        let local_world = node.bounding_sphere.transformed(absolute);
        if is_sphere_visible(&local_world, &children_vfrusts, &children_ofrusts) {
            for renderable in &node.renderables {
                result.push(renderable.clone());
            }
        }

        for &child in &node.children {
            self.collect_visibles(child, result, &children_vfrusts, &children_ofrusts);
        }
    }
}

fn is_sphere_visible(sphere: &BoundingSphere, vfrusts: &[&ViewFrustum], ofrusts: &[&ViewFrustum]) -> bool {
    if !vfrusts.is_empty()
        && vfrusts
            .iter()
            .all(|vfrust| vfrust.test_bounding_sphere(sphere) == TestResult::Outside)
    {
        return false;
    }
    !ofrusts
        .iter()
        .any(|ofrust| ofrust.test_bounding_sphere(sphere) == TestResult::Inside)
}
