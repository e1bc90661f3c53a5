use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the host's palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,

    // Network background
    NodeFill,
    ConnectionStroke,

    // Matrix background
    MatrixGlyph,
    MatrixFade,

    // Pipeline
    CapsuleFill,
    StationGlow,
}
