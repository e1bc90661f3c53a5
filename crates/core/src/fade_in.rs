//! One-shot reveal of elements as they scroll into view.

use folio_protocol::{DomCommand, ElementId};
use tracing::debug;

use crate::tracker::{IntersectionChange, IntersectionTracker};

#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedElement {
    pub id: ElementId,
    pub has_animated: bool,
}

/// Latches each element visible on its first intersection and stops
/// observing it, so total work is bounded by the number of elements.
#[derive(Debug, Clone)]
pub struct FadeInController {
    elements: Vec<AnimatedElement>,
    visible_class: String,
}

impl FadeInController {
    pub fn new(ids: impl IntoIterator<Item = ElementId>, visible_class: impl Into<String>) -> Self {
        Self {
            elements: ids
                .into_iter()
                .map(|id| AnimatedElement {
                    id,
                    has_animated: false,
                })
                .collect(),
            visible_class: visible_class.into(),
        }
    }

    pub fn elements(&self) -> &[AnimatedElement] {
        &self.elements
    }

    pub fn pending(&self) -> usize {
        self.elements.iter().filter(|e| !e.has_animated).count()
    }

    /// Register every element with `tracker`, or, under reduced motion, reveal
    /// everything now and register nothing.
    pub fn init(&mut self, tracker: &mut IntersectionTracker, reduced_motion: bool) -> Vec<DomCommand> {
        if reduced_motion {
            debug!(count = self.elements.len(), "reduced motion: revealing all");
            return self
                .elements
                .iter_mut()
                .filter(|e| !e.has_animated)
                .map(|e| {
                    e.has_animated = true;
                    DomCommand::add_class(&e.id, &self.visible_class)
                })
                .collect();
        }
        for element in self.elements.iter().filter(|e| !e.has_animated) {
            tracker.register(element.id.clone());
        }
        Vec::new()
    }

    pub fn handle(
        &mut self,
        change: &IntersectionChange,
        tracker: &mut IntersectionTracker,
    ) -> Vec<DomCommand> {
        if !change.is_intersecting {
            return Vec::new();
        }
        let Some(element) = self
            .elements
            .iter_mut()
            .find(|e| e.id == change.target && !e.has_animated)
        else {
            return Vec::new();
        };
        element.has_animated = true;
        tracker.unregister(&element.id);
        vec![DomCommand::add_class(&element.id, &self.visible_class)]
    }

    pub fn handle_batch(
        &mut self,
        changes: &[IntersectionChange],
        tracker: &mut IntersectionTracker,
    ) -> Vec<DomCommand> {
        changes
            .iter()
            .flat_map(|c| self.handle(c, tracker))
            .collect()
    }

    /// Stop observing everything that has not animated yet.
    pub fn dispose(&self, tracker: &mut IntersectionTracker) {
        for element in &self.elements {
            tracker.unregister(&element.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use folio_protocol::Rect;

    use super::*;
    use crate::config::ObserverOptions;

    fn setup(ids: &[&str]) -> (FadeInController, IntersectionTracker) {
        let fade = FadeInController::new(ids.iter().map(|s| ElementId::from(*s)), "visible");
        let tracker = IntersectionTracker::new(ObserverOptions::new(0.1, "0px").unwrap());
        (fade, tracker)
    }

    #[test]
    fn init_registers_every_element() {
        let (mut fade, mut tracker) = setup(&["a", "b"]);
        assert!(fade.init(&mut tracker, false).is_empty());
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn reduced_motion_reveals_everything_without_observing() {
        let (mut fade, mut tracker) = setup(&["a", "b"]);
        let cmds = fade.init(&mut tracker, true);
        assert_eq!(cmds.len(), 2);
        assert!(tracker.is_empty());
        assert_eq!(fade.pending(), 0);
    }

    #[test]
    fn first_intersection_latches_and_unregisters() {
        let (mut fade, mut tracker) = setup(&["a"]);
        fade.init(&mut tracker, false);

        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let visible: HashMap<ElementId, Rect> =
            [("a".into(), Rect::new(0.0, 0.0, 100.0, 100.0))].into();

        let changes = tracker.observe(viewport, &visible);
        let cmds = fade.handle_batch(&changes, &mut tracker);
        assert_eq!(cmds, vec![DomCommand::add_class(&"a".into(), "visible")]);
        assert!(fade.elements()[0].has_animated);
        assert!(!tracker.is_registered(&"a".into()));

        // Scrolling away and back yields nothing further.
        assert!(tracker.observe(viewport, &HashMap::new()).is_empty());
        assert!(tracker.observe(viewport, &visible).is_empty());
    }

    #[test]
    fn repeated_reports_animate_at_most_once() {
        let (mut fade, mut tracker) = setup(&["a"]);
        fade.init(&mut tracker, false);
        let change = IntersectionChange {
            target: "a".into(),
            is_intersecting: true,
            ratio: 1.0,
        };
        assert_eq!(fade.handle(&change, &mut tracker).len(), 1);
        assert!(fade.handle(&change, &mut tracker).is_empty());
    }

    #[test]
    fn exit_reports_do_nothing() {
        let (mut fade, mut tracker) = setup(&["a"]);
        fade.init(&mut tracker, false);
        let change = IntersectionChange {
            target: "a".into(),
            is_intersecting: false,
            ratio: 0.0,
        };
        assert!(fade.handle(&change, &mut tracker).is_empty());
        assert!(tracker.is_registered(&"a".into()));
    }
}
