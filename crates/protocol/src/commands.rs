use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A single, stateless canvas drawing instruction.
///
/// Animators emit a `Vec<RenderCommand>` per frame. Hosts consume the list
/// in order; each command carries everything it needs, including opacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Erase a region back to transparent.
    ClearRect { rect: Rect },

    /// Fill a rectangle (used for the translucent trail wash of the matrix
    /// background).
    FillRect {
        rect: Rect,
        color: ThemeToken,
        alpha: f64,
    },

    /// Fill a circle, optionally with a soft glow of the given blur radius.
    FillCircle {
        center: Point,
        radius: f64,
        color: ThemeToken,
        alpha: f64,
        glow: Option<f64>,
    },

    /// Stroke a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
        alpha: f64,
    },

    /// Draw a text string with its baseline at `position`.
    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
    },
}
