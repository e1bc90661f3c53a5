mod host;
mod inventory;
mod logging;
mod scheduler;
mod surface;
mod theme;

use folio_core::animator::Background;
use folio_core::config::{BackgroundConfig, BackgroundKind};
use folio_protocol::{RenderCommand, Size};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::Level;
use wasm_bindgen::prelude::*;

/// Entry point called by the page's loader script once the DOM is ready.
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logging::init(if cfg!(debug_assertions) { Level::DEBUG } else { Level::INFO });
    host::Host::boot()
}

/// Render the background after `frames` simulation steps, returning render
/// commands as JSON. Used for static previews and screenshots.
#[wasm_bindgen]
pub fn render_background(kind: &str, width: f64, height: f64, seed: u64, frames: u32) -> Result<String, JsError> {
    let kind = parse_kind(kind).ok_or_else(|| JsError::new(&format!("unknown background: {kind}")))?;
    let commands = background_frame(kind, Size::new(width, height), seed, frames);
    serde_json::to_string(&commands).map_err(|e| JsError::new(&e.to_string()))
}

fn parse_kind(kind: &str) -> Option<BackgroundKind> {
    match kind {
        "network" => Some(BackgroundKind::Network),
        "matrix" => Some(BackgroundKind::Matrix),
        _ => None,
    }
}

fn background_frame(kind: BackgroundKind, size: Size, seed: u64, frames: u32) -> Vec<RenderCommand> {
    let config = BackgroundConfig {
        kind,
        ..BackgroundConfig::default()
    };
    let mut background = Background::build(&config, size, &mut SmallRng::seed_from_u64(seed));
    let mut commands = background.render();
    for _ in 0..frames {
        background.advance(1.0);
        commands = background.render();
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_config_names() {
        assert_eq!(parse_kind("network"), Some(BackgroundKind::Network));
        assert_eq!(parse_kind("matrix"), Some(BackgroundKind::Matrix));
        assert_eq!(parse_kind("starfield"), None);
    }

    #[test]
    fn same_seed_renders_the_same_frame() {
        let size = Size::new(640.0, 480.0);
        let a = background_frame(BackgroundKind::Network, size, 7, 30);
        let b = background_frame(BackgroundKind::Network, size, 7, 30);
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn network_frame_starts_by_clearing_the_canvas() {
        let commands = background_frame(BackgroundKind::Network, Size::new(300.0, 200.0), 1, 0);
        assert!(matches!(
            commands.first(),
            Some(RenderCommand::ClearRect { rect }) if rect.w == 300.0 && rect.h == 200.0
        ));
    }
}
