use folio_protocol::{Point, Rect, RenderCommand, Size, ThemeToken};
use rand::Rng;
use rand::rngs::SmallRng;

use crate::config::MatrixConfig;

/// Falling glyph columns.
///
/// Each frame washes the canvas with a translucent rect (so earlier glyphs
/// leave a trail) and draws one glyph per column. A drop past the bottom
/// restarts with a small per-frame probability.
#[derive(Debug, Clone)]
pub struct MatrixRain {
    drops: Vec<f64>,
    glyphs: Vec<char>,
    bounds: Size,
    config: MatrixConfig,
    rng: SmallRng,
}

impl MatrixRain {
    pub fn new(config: MatrixConfig, bounds: Size, mut rng: SmallRng) -> Self {
        let glyphs: Vec<char> = config.glyphs.chars().collect();
        let columns = column_count(bounds.width, config.font_size);
        let rows = bounds.height / config.font_size;
        let drops = (0..columns).map(|_| random_row(&mut rng, rows)).collect();
        Self {
            drops,
            glyphs,
            bounds,
            config,
            rng,
        }
    }

    pub fn columns(&self) -> usize {
        self.drops.len()
    }

    pub fn drops(&self) -> &[f64] {
        &self.drops
    }

    /// Adopt new canvas extents. Columns are added when the canvas widens and
    /// kept (off-canvas) when it narrows.
    pub fn resize(&mut self, bounds: Size) {
        self.bounds = bounds;
        let wanted = column_count(bounds.width, self.config.font_size);
        let rows = bounds.height / self.config.font_size;
        while self.drops.len() < wanted {
            let row = random_row(&mut self.rng, rows);
            self.drops.push(row);
        }
    }

    pub fn advance(&mut self, scale: f64) {
        let font = self.config.font_size;
        let reset_chance = self.config.reset_chance.clamp(0.0, 1.0);
        for drop in &mut self.drops {
            if *drop * font > self.bounds.height && self.rng.gen_bool(reset_chance) {
                *drop = 0.0;
            }
            *drop += scale;
        }
    }

    pub fn render(&mut self) -> Vec<RenderCommand> {
        let font = self.config.font_size;
        let mut commands = Vec::with_capacity(self.drops.len() + 1);
        commands.push(RenderCommand::FillRect {
            rect: Rect::from_size(self.bounds),
            color: ThemeToken::MatrixFade,
            alpha: self.config.fade_alpha,
        });
        if self.glyphs.is_empty() {
            return commands;
        }
        for (i, drop) in self.drops.iter().enumerate() {
            let glyph = self.glyphs[self.rng.gen_range(0..self.glyphs.len())];
            commands.push(RenderCommand::DrawText {
                position: Point::new(i as f64 * font, drop * font),
                text: glyph.to_string(),
                color: ThemeToken::MatrixGlyph,
                font_size: font,
            });
        }
        commands
    }
}

fn column_count(width: f64, font_size: f64) -> usize {
    (width / font_size).floor().max(0.0) as usize
}

fn random_row(rng: &mut SmallRng, rows: f64) -> f64 {
    if rows > 0.0 {
        rng.gen_range(0.0..rows)
    } else {
        0.0
    }
}
