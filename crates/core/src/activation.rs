//! Navigation highlighting driven by section visibility.

use folio_protocol::{DomCommand, ElementId};
use tracing::debug;

use crate::error::FolioError;
use crate::tracker::IntersectionChange;

/// A navigation entry and the section it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    pub section: ElementId,
    pub link: ElementId,
}

/// Which section currently owns the active marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationState {
    pub active_section: Option<ElementId>,
}

/// Keeps exactly one navigation link marked active.
///
/// Only intersecting reports cause transitions; a section leaving the
/// viewport keeps its marker until another one takes over. When several
/// sections intersect in the same batch, the last one delivered wins.
#[derive(Debug, Clone)]
pub struct ScrollActivation {
    links: Vec<NavLink>,
    active_class: String,
    state: ActivationState,
}

impl ScrollActivation {
    /// Fails with `MissingElement` when there is nothing to highlight.
    pub fn new(links: Vec<NavLink>, active_class: impl Into<String>) -> Result<Self, FolioError> {
        if links.is_empty() {
            return Err(FolioError::missing_element("navigation", ".nav-link[href^='#']"));
        }
        Ok(Self {
            links,
            active_class: active_class.into(),
            state: ActivationState::default(),
        })
    }

    /// Sections this controller wants observed, in navigation order.
    pub fn sections(&self) -> impl Iterator<Item = &ElementId> {
        self.links.iter().map(|l| &l.section)
    }

    pub fn state(&self) -> &ActivationState {
        &self.state
    }

    pub fn active(&self) -> Option<&ElementId> {
        self.state.active_section.as_ref()
    }

    /// Mark `default_section` active before any scrolling happens. Unknown
    /// defaults leave the state at no-active.
    pub fn init(&mut self, default_section: Option<&str>) -> Vec<DomCommand> {
        match default_section {
            Some(section) => self.activate(&ElementId::from(section)),
            None => Vec::new(),
        }
    }

    pub fn handle(&mut self, change: &IntersectionChange) -> Vec<DomCommand> {
        if !change.is_intersecting {
            return Vec::new();
        }
        self.activate(&change.target)
    }

    /// Apply a whole observation batch in delivery order.
    pub fn handle_batch(&mut self, changes: &[IntersectionChange]) -> Vec<DomCommand> {
        changes.iter().flat_map(|c| self.handle(c)).collect()
    }

    /// Move the marker to `section`. The old marker is removed first, within
    /// the same command list, so a host never shows two active links.
    pub fn activate(&mut self, section: &ElementId) -> Vec<DomCommand> {
        if self.state.active_section.as_ref() == Some(section) {
            return Vec::new();
        }
        let Some(link) = self.link_for(section).cloned() else {
            return Vec::new();
        };

        let mut commands = Vec::with_capacity(2);
        if let Some(previous) = self.state.active_section.take()
            && let Some(old_link) = self.link_for(&previous)
        {
            commands.push(DomCommand::remove_class(old_link, &self.active_class));
        }
        commands.push(DomCommand::add_class(&link, &self.active_class));
        debug!(section = %section, "active section changed");
        self.state.active_section = Some(section.clone());
        commands
    }

    /// Clear the marker (used on dispose).
    pub fn clear(&mut self) -> Vec<DomCommand> {
        let Some(previous) = self.state.active_section.take() else {
            return Vec::new();
        };
        self.link_for(&previous)
            .map(|link| vec![DomCommand::remove_class(link, &self.active_class)])
            .unwrap_or_default()
    }

    fn link_for(&self, section: &ElementId) -> Option<&ElementId> {
        self.links
            .iter()
            .find(|l| &l.section == section)
            .map(|l| &l.link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(sections: &[&str]) -> ScrollActivation {
        let links = sections
            .iter()
            .map(|s| NavLink {
                section: ElementId::from(*s),
                link: ElementId::from(format!("nav-{s}")),
            })
            .collect();
        ScrollActivation::new(links, "active").unwrap()
    }

    fn enter(id: &str) -> IntersectionChange {
        IntersectionChange {
            target: id.into(),
            is_intersecting: true,
            ratio: 1.0,
        }
    }

    fn leave(id: &str) -> IntersectionChange {
        IntersectionChange {
            target: id.into(),
            is_intersecting: false,
            ratio: 0.0,
        }
    }

    #[test]
    fn no_links_is_missing_element() {
        let err = ScrollActivation::new(Vec::new(), "active").unwrap_err();
        assert!(matches!(
            &err,
            FolioError::MissingElement { selector, .. } if selector == ".nav-link[href^='#']"
        ));
        assert!(err.to_string().is_ascii());
    }

    #[test]
    fn starts_with_no_active_section() {
        let nav = controller(&["home", "about"]);
        assert!(nav.active().is_none());
    }

    #[test]
    fn default_section_is_marked_at_init() {
        let mut nav = controller(&["home", "about"]);
        let cmds = nav.init(Some("home"));
        assert_eq!(cmds, vec![DomCommand::add_class(&"nav-home".into(), "active")]);
        assert_eq!(nav.active().map(ElementId::as_str), Some("home"));
    }

    #[test]
    fn switching_clears_old_marker_first() {
        let mut nav = controller(&["home", "about"]);
        nav.handle(&enter("home"));
        let cmds = nav.handle(&enter("about"));
        assert_eq!(
            cmds,
            vec![
                DomCommand::remove_class(&"nav-home".into(), "active"),
                DomCommand::add_class(&"nav-about".into(), "active"),
            ]
        );
    }

    #[test]
    fn leaving_does_not_transition() {
        let mut nav = controller(&["home", "about"]);
        nav.handle(&enter("about"));
        assert!(nav.handle(&leave("about")).is_empty());
        assert_eq!(nav.active().map(ElementId::as_str), Some("about"));
    }

    #[test]
    fn last_event_in_batch_wins() {
        let mut nav = controller(&["a", "b", "c"]);
        nav.handle_batch(&[enter("a"), enter("c"), enter("b")]);
        assert_eq!(nav.active().map(ElementId::as_str), Some("b"));
    }

    #[test]
    fn reactivating_current_section_is_a_no_op() {
        let mut nav = controller(&["a"]);
        assert_eq!(nav.handle(&enter("a")).len(), 1);
        assert!(nav.handle(&enter("a")).is_empty());
    }

    #[test]
    fn unknown_section_is_ignored() {
        let mut nav = controller(&["a"]);
        nav.handle(&enter("a"));
        assert!(nav.handle(&enter("footer")).is_empty());
        assert_eq!(nav.active().map(ElementId::as_str), Some("a"));
    }

    #[test]
    fn marker_count_never_exceeds_one() {
        let mut nav = controller(&["a", "b", "c", "d"]);
        let mut marked: std::collections::HashSet<ElementId> = Default::default();
        let sequence = ["a", "b", "b", "d", "c", "a", "d", "d", "b"];
        for (i, id) in sequence.iter().enumerate() {
            let change = if i % 3 == 2 { leave(id) } else { enter(id) };
            for cmd in nav.handle(&change) {
                match cmd {
                    DomCommand::AddClass { target, .. } => {
                        marked.insert(target);
                    }
                    DomCommand::RemoveClass { target, .. } => {
                        marked.remove(&target);
                    }
                    other => panic!("unexpected command {other:?}"),
                }
            }
            assert!(marked.len() <= 1);
        }
    }

    #[test]
    fn clear_removes_marker() {
        let mut nav = controller(&["a"]);
        nav.handle(&enter("a"));
        assert_eq!(
            nav.clear(),
            vec![DomCommand::remove_class(&"nav-a".into(), "active")]
        );
        assert!(nav.active().is_none());
    }
}
