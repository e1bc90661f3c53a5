use serde::{Deserialize, Serialize};

use crate::ids::ElementId;
use crate::types::Point;

/// Identifier of a tooltip node created by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TooltipId(pub u64);

/// A DOM mutation requested by the core.
///
/// The core never touches the document. Controllers return these and the
/// host applies them in order, after it has released its own state borrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomCommand {
    AddClass {
        target: ElementId,
        class: String,
    },
    RemoveClass {
        target: ElementId,
        class: String,
    },
    SetText {
        target: ElementId,
        text: String,
    },
    SetAttribute {
        target: ElementId,
        name: String,
        value: String,
    },
    /// Set one inline style property; an empty value removes it.
    SetStyle {
        target: ElementId,
        property: String,
        value: String,
    },
    /// Replace an element's children with the given (already escaped) markup.
    ReplaceChildren {
        target: ElementId,
        html: String,
    },
    /// Append an SVG `<circle>` with the given id to `parent`.
    SpawnSvgCircle {
        parent: ElementId,
        id: ElementId,
        center: Point,
        radius: f64,
    },
    /// Attach a floating tooltip to the document body, anchored (bottom
    /// center) at `anchor` in page coordinates.
    ShowTooltip {
        id: TooltipId,
        anchor: Point,
        title: String,
        detail: String,
    },
    RemoveTooltip {
        id: TooltipId,
    },
    Focus {
        target: ElementId,
    },
}

impl DomCommand {
    pub fn add_class(target: &ElementId, class: &str) -> Self {
        Self::AddClass {
            target: target.clone(),
            class: class.to_string(),
        }
    }

    pub fn remove_class(target: &ElementId, class: &str) -> Self {
        Self::RemoveClass {
            target: target.clone(),
            class: class.to_string(),
        }
    }

    pub fn set_text(target: &ElementId, text: impl Into<String>) -> Self {
        Self::SetText {
            target: target.clone(),
            text: text.into(),
        }
    }

    pub fn set_attribute(target: &ElementId, name: &str, value: impl Into<String>) -> Self {
        Self::SetAttribute {
            target: target.clone(),
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn set_style(target: &ElementId, property: &str, value: impl Into<String>) -> Self {
        Self::SetStyle {
            target: target.clone(),
            property: property.to_string(),
            value: value.into(),
        }
    }

    /// The element this command mutates, if it targets one.
    pub fn target(&self) -> Option<&ElementId> {
        match self {
            Self::AddClass { target, .. }
            | Self::RemoveClass { target, .. }
            | Self::SetText { target, .. }
            | Self::SetAttribute { target, .. }
            | Self::SetStyle { target, .. }
            | Self::ReplaceChildren { target, .. }
            | Self::Focus { target } => Some(target),
            Self::SpawnSvgCircle { parent, .. } => Some(parent),
            Self::ShowTooltip { .. } | Self::RemoveTooltip { .. } => None,
        }
    }
}
