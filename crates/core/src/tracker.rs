//! Viewport intersection tracking.
//!
//! A geometric stand-in for the browser's intersection observer: the host
//! hands over a layout snapshot (viewport box plus element bounds) once per
//! debounced scroll/resize, and the tracker reports which registered
//! elements crossed their threshold since the previous pass.

use std::collections::HashMap;

use folio_protocol::{ElementId, Rect};
use tracing::trace;

use crate::config::ObserverOptions;

/// Source of element bounds for one observation pass.
pub trait ElementLayout {
    /// Bounds of `id` in the same coordinate space as the viewport, or `None`
    /// when the element is not laid out (treated as not intersecting).
    fn bounds(&self, id: &ElementId) -> Option<Rect>;
}

impl ElementLayout for HashMap<ElementId, Rect> {
    fn bounds(&self, id: &ElementId) -> Option<Rect> {
        self.get(id).copied()
    }
}

/// One element's state as last observed.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedElement {
    pub id: ElementId,
    pub currently_intersecting: bool,
}

/// A threshold crossing reported by [`IntersectionTracker::observe`].
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionChange {
    pub target: ElementId,
    pub is_intersecting: bool,
    /// Visible fraction of the element inside the root box.
    pub ratio: f64,
}

#[derive(Debug, Clone)]
pub struct IntersectionTracker {
    options: ObserverOptions,
    elements: Vec<TrackedElement>,
}

impl IntersectionTracker {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            elements: Vec::new(),
        }
    }

    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    /// Begin observing `id`. Returns `false` if it was already registered.
    pub fn register(&mut self, id: ElementId) -> bool {
        if self.is_registered(&id) {
            return false;
        }
        self.elements.push(TrackedElement {
            id,
            currently_intersecting: false,
        });
        true
    }

    /// Stop observing `id`. Returns `false` if it was not registered.
    pub fn unregister(&mut self, id: &ElementId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| &e.id != id);
        self.elements.len() != before
    }

    pub fn unregister_all(&mut self) {
        self.elements.clear();
    }

    pub fn is_registered(&self, id: &ElementId) -> bool {
        self.elements.iter().any(|e| &e.id == id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[TrackedElement] {
        &self.elements
    }

    /// Run one observation pass and return the crossings, in registration
    /// order.
    ///
    /// An element registered since the last pass reports only if it is
    /// already intersecting; its initial "not intersecting" state is the
    /// default and carries no information.
    pub fn observe(&mut self, viewport: Rect, layout: &impl ElementLayout) -> Vec<IntersectionChange> {
        let root = self.options.root_margin.apply(viewport);
        let threshold = self.options.threshold;
        let mut changes = Vec::new();

        for element in &mut self.elements {
            let (touching, ratio) = match layout.bounds(&element.id) {
                Some(bounds) => (
                    root.intersection(&bounds).is_some(),
                    intersection_ratio(&root, &bounds),
                ),
                None => (false, 0.0),
            };
            let is_intersecting = touching && ratio >= threshold;

            if is_intersecting != element.currently_intersecting {
                trace!(target_id = %element.id, ratio, is_intersecting, "intersection crossed");
                element.currently_intersecting = is_intersecting;
                changes.push(IntersectionChange {
                    target: element.id.clone(),
                    is_intersecting,
                    ratio,
                });
            }
        }
        changes
    }
}

/// Visible fraction of `bounds` inside `root`.
///
/// A zero-area element that touches the root counts as fully visible.
pub fn intersection_ratio(root: &Rect, bounds: &Rect) -> f64 {
    let Some(overlap) = root.intersection(bounds) else {
        return 0.0;
    };
    let area = bounds.area();
    if area <= 0.0 {
        return 1.0;
    }
    (overlap.area() / area).clamp(0.0, 1.0)
}
