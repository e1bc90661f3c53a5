pub mod commands;
pub mod dom;
pub mod ids;
pub mod theme;
pub mod types;

pub use commands::RenderCommand;
pub use dom::{DomCommand, TooltipId};
pub use ids::ElementId;
pub use theme::ThemeToken;
pub use types::{Point, Rect, Size};
