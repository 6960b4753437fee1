//! Output of the visibility traversal

/// Something a movable can carry that ends up in draw lists
pub trait Renderable {
    /// True if the renderable must be drawn with lighting
    fn needs_light(&self) -> bool;
}

/// Renderables found visible, split by whether they need lighting
#[derive(Debug, Clone, PartialEq)]
pub struct Visibles<R> {
    /// Lit renderables
    pub normal: Vec<R>,
    /// Renderables drawn without lighting
    pub no_light: Vec<R>,
}

impl<R> Default for Visibles<R> {
    fn default() -> Self {
        Self {
            normal: Vec::new(),
            no_light: Vec::new(),
        }
    }
}

impl<R: Renderable> Visibles<R> {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort a renderable into the right list
    pub fn push(&mut self, renderable: R) {
        if renderable.needs_light() {
            self.normal.push(renderable);
        } else {
            self.no_light.push(renderable);
        }
    }

    /// Total number of renderables
    pub fn len(&self) -> usize {
        self.normal.len() + self.no_light.len()
    }

    /// True if nothing was found
    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.no_light.is_empty()
    }

    /// Drop everything, keeping allocations for the next frame
    pub fn clear(&mut self) {
        self.normal.clear();
        self.no_light.clear();
    }
}
