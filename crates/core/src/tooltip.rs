//! Single-flight tooltip for the pipeline stations, plus their keyboard
//! navigation.

use folio_protocol::{DomCommand, ElementId, Point, Rect, TooltipId};
use tracing::debug;

use crate::error::FolioError;

/// Vertical gap between the tooltip's anchor and the target's top edge.
const TOOLTIP_GAP: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipTarget {
    pub id: ElementId,
    pub title: String,
    pub detail: String,
}

/// The live tooltip, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub target: ElementId,
    pub id: TooltipId,
}

/// Keys that move focus between targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Next,
    Previous,
    First,
    Last,
}

impl NavKey {
    /// Map a DOM `KeyboardEvent.key` value; other keys are not handled.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" | "ArrowDown" => Some(Self::Next),
            "ArrowLeft" | "ArrowUp" => Some(Self::Previous),
            "Home" => Some(Self::First),
            "End" => Some(Self::Last),
            _ => None,
        }
    }
}

/// At most one tooltip exists at a time. Showing always removes the previous
/// tooltip (and its highlight) first, in the same command list.
#[derive(Debug, Clone)]
pub struct TooltipManager {
    targets: Vec<TooltipTarget>,
    live: Option<Tooltip>,
    next_id: u64,
}

impl TooltipManager {
    pub fn new(targets: Vec<TooltipTarget>) -> Result<Self, FolioError> {
        if targets.is_empty() {
            return Err(FolioError::missing_element("tooltip", ".pipeline-svg circle"));
        }
        Ok(Self {
            targets,
            live: None,
            next_id: 0,
        })
    }

    pub fn targets(&self) -> &[TooltipTarget] {
        &self.targets
    }

    pub fn live(&self) -> Option<&Tooltip> {
        self.live.as_ref()
    }

    pub fn is_target(&self, id: &ElementId) -> bool {
        self.index_of(id).is_some()
    }

    /// Make every target focusable and labelled.
    pub fn init(&self) -> Vec<DomCommand> {
        self.targets
            .iter()
            .flat_map(|t| {
                [
                    DomCommand::set_attribute(&t.id, "tabindex", "0"),
                    DomCommand::set_attribute(&t.id, "role", "button"),
                    DomCommand::set_attribute(&t.id, "aria-label", format!("{}: {}", t.title, t.detail)),
                ]
            })
            .collect()
    }

    /// Hover-enter or focus on `target`, whose bounds were measured just now.
    pub fn show(&mut self, target: &ElementId, bounds: Rect) -> Vec<DomCommand> {
        let Some(index) = self.index_of(target) else {
            return Vec::new();
        };
        let mut commands = self.hide();

        self.next_id += 1;
        let id = TooltipId(self.next_id);
        let entry = &self.targets[index];
        commands.push(DomCommand::ShowTooltip {
            id,
            anchor: Point::new(bounds.center_x(), bounds.y - TOOLTIP_GAP),
            title: entry.title.clone(),
            detail: entry.detail.clone(),
        });
        commands.push(DomCommand::set_style(
            &entry.id,
            "filter",
            "drop-shadow(0 0 8px #2D8CFF)",
        ));
        debug!(target_id = %entry.id, "tooltip shown");
        self.live = Some(Tooltip {
            target: entry.id.clone(),
            id,
        });
        commands
    }

    /// Hover-leave or blur. Clears every highlight even without a live
    /// tooltip, so a stray highlight cannot outlive its tooltip.
    pub fn hide(&mut self) -> Vec<DomCommand> {
        let mut commands = Vec::with_capacity(self.targets.len() + 1);
        if let Some(tooltip) = self.live.take() {
            commands.push(DomCommand::RemoveTooltip { id: tooltip.id });
        }
        commands.extend(
            self.targets
                .iter()
                .map(|t| DomCommand::set_style(&t.id, "filter", "")),
        );
        commands
    }

    /// Keyboard navigation from the focused target. Only moves focus; the
    /// resulting focus/blur events drive the tooltip.
    pub fn navigate(&self, from: &ElementId, key: NavKey) -> Option<DomCommand> {
        let index = self.index_of(from)?;
        let len = self.targets.len();
        let next = match key {
            NavKey::Next => (index + 1) % len,
            NavKey::Previous => (index + len - 1) % len,
            NavKey::First => 0,
            NavKey::Last => len - 1,
        };
        Some(DomCommand::Focus {
            target: self.targets[next].id.clone(),
        })
    }

    fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.targets.iter().position(|t| &t.id == id)
    }
}
