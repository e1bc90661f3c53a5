use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use folio_core::FolioConfig;
use folio_core::animator::{Animator, Background, CapsuleTrack, PipelineTrack};
use folio_core::config::BackgroundKind;
use folio_core::scheduler::ManualScheduler;
use folio_protocol::{Point, RenderCommand, Size, ThemeToken};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};

/// Canvas pixels covered by one terminal cell.
const CELL: Size = Size {
    width: 8.0,
    height: 16.0,
};

/// Rows reserved at the bottom for the pipeline strip.
const PIPELINE_ROWS: u16 = 3;

fn theme_to_rgb(token: ThemeToken) -> (u8, u8, u8) {
    match token {
        ThemeToken::Background | ThemeToken::MatrixFade => (0, 0, 0),
        ThemeToken::NodeFill | ThemeToken::ConnectionStroke => (74, 158, 255),
        ThemeToken::MatrixGlyph => (0, 255, 0),
        ThemeToken::CapsuleFill | ThemeToken::StationGlow => (45, 140, 255),
    }
}

/// Token color dimmed by `alpha`; terminals have no blending.
fn theme_to_color(token: ThemeToken, alpha: f64) -> Color {
    let (r, g, b) = theme_to_rgb(token);
    let a = alpha.clamp(0.0, 1.0);
    let dim = |c: u8| (f64::from(c) * a).round() as u8;
    Color::Rgb(dim(r), dim(g), dim(b))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub glyph: char,
    pub color: ThemeToken,
    pub alpha: f64,
}

/// Render commands rasterized into terminal cells.
///
/// Cells persist between frames so partial-alpha fills fade earlier glyphs,
/// the way matrix trails fade on a real canvas.
#[derive(Debug, Clone)]
pub struct CellCanvas {
    cols: u16,
    rows: u16,
    cells: Vec<Option<Cell>>,
}

impl CellCanvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![None; usize::from(cols) * usize::from(rows)],
        }
    }

    /// Pixel extents matching this grid.
    pub fn pixel_size(&self) -> Size {
        Size::new(f64::from(self.cols) * CELL.width, f64::from(self.rows) * CELL.height)
    }

    pub fn get(&self, col: u16, row: u16) -> Option<Cell> {
        self.index(col, row).and_then(|i| self.cells[i])
    }

    fn index(&self, col: u16, row: u16) -> Option<usize> {
        (col < self.cols && row < self.rows).then(|| usize::from(row) * usize::from(self.cols) + usize::from(col))
    }

    fn cell_at(&self, point: Point) -> Option<usize> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let col = (point.x / CELL.width) as u16;
        let row = (point.y / CELL.height) as u16;
        self.index(col, row)
    }

    fn cells_in(&self, rect: &folio_protocol::Rect) -> Vec<usize> {
        let to_col = |x: f64| (x / CELL.width).clamp(0.0, f64::from(self.cols)) as u16;
        let to_row = |y: f64| (y / CELL.height).clamp(0.0, f64::from(self.rows)) as u16;
        let (c0, c1) = (to_col(rect.x), to_col(rect.right()).max(to_col(rect.x)));
        let (r0, r1) = (to_row(rect.y), to_row(rect.bottom()));
        (r0..r1.min(self.rows))
            .flat_map(|r| (c0..c1.min(self.cols)).map(move |c| (c, r)))
            .filter_map(|(c, r)| self.index(c, r))
            .collect()
    }

    pub fn apply(&mut self, commands: &[RenderCommand]) {
        for cmd in commands {
            match cmd {
                RenderCommand::ClearRect { rect } => {
                    for i in self.cells_in(rect) {
                        self.cells[i] = None;
                    }
                }
                RenderCommand::FillRect { rect, alpha, .. } => {
                    for i in self.cells_in(rect) {
                        if let Some(cell) = &mut self.cells[i] {
                            cell.alpha *= 1.0 - alpha;
                            if cell.alpha < 0.05 {
                                self.cells[i] = None;
                            }
                        }
                    }
                }
                RenderCommand::FillCircle {
                    center, color, alpha, ..
                } => {
                    if let Some(i) = self.cell_at(*center) {
                        self.cells[i] = Some(Cell {
                            glyph: '●',
                            color: *color,
                            alpha: *alpha,
                        });
                    }
                }
                RenderCommand::DrawLine {
                    from,
                    to,
                    color,
                    alpha,
                    ..
                } => {
                    let steps = ((to.x - from.x).abs() / CELL.width)
                        .max((to.y - from.y).abs() / CELL.height)
                        .ceil()
                        .max(1.0) as usize;
                    for s in 0..=steps {
                        let t = s as f64 / steps as f64;
                        let p = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
                        if let Some(i) = self.cell_at(p)
                            && self.cells[i].is_none()
                        {
                            self.cells[i] = Some(Cell {
                                glyph: '·',
                                color: *color,
                                alpha: *alpha,
                            });
                        }
                    }
                }
                RenderCommand::DrawText {
                    position, text, color, ..
                } => {
                    if let Some(glyph) = text.chars().next()
                        && let Some(i) = self.cell_at(*position)
                    {
                        self.cells[i] = Some(Cell {
                            glyph,
                            color: *color,
                            alpha: 1.0,
                        });
                    }
                }
            }
        }
    }

    fn paint(&self, buf: &mut Buffer, area: Rect) {
        for row in 0..self.rows.min(area.height) {
            for col in 0..self.cols.min(area.width) {
                if let Some(cell) = self.get(col, row) {
                    buf[(area.x + col, area.y + row)]
                        .set_char(cell.glyph)
                        .set_fg(theme_to_color(cell.color, cell.alpha))
                        .set_bg(Color::Black);
                }
            }
        }
    }
}

/// Columns of the pipeline strip occupied by each capsule.
fn capsule_columns(track: &CapsuleTrack, start: f64, end: f64, width: u16) -> Vec<u16> {
    let length = (end - start).max(f64::EPSILON);
    track
        .capsules()
        .iter()
        .map(|c| {
            let t = ((c.position - start) / length).clamp(0.0, 1.0);
            ((t * f64::from(width.saturating_sub(1))).round() as u16).min(width.saturating_sub(1))
        })
        .collect()
}

struct Preview {
    config: FolioConfig,
    kind: BackgroundKind,
    seed: u64,
    scheduler: ManualScheduler,
    animator: Animator,
    canvas: CellCanvas,
    paused: bool,
}

impl Preview {
    fn new(config: FolioConfig, cols: u16, rows: u16) -> Self {
        let kind = config.background.kind;
        let canvas = CellCanvas::new(cols, rows);
        let animator = build(&config, kind, canvas.pixel_size(), 1);
        let mut preview = Self {
            config,
            kind,
            seed: 1,
            scheduler: ManualScheduler::new(),
            animator,
            canvas,
            paused: false,
        };
        preview.animator.start(&mut preview.scheduler);
        preview
    }

    fn rebuild(&mut self) {
        self.animator.stop(&mut self.scheduler);
        self.seed += 1;
        self.animator = build(&self.config, self.kind, self.canvas.pixel_size(), self.seed);
        self.canvas = CellCanvas::new(self.canvas.cols, self.canvas.rows);
        if !self.paused {
            self.animator.start(&mut self.scheduler);
        }
    }

    fn toggle_kind(&mut self) {
        self.kind = match self.kind {
            BackgroundKind::Network => BackgroundKind::Matrix,
            BackgroundKind::Matrix => BackgroundKind::Network,
        };
        self.rebuild();
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if self.paused {
            self.animator.stop(&mut self.scheduler);
        } else {
            self.animator.start(&mut self.scheduler);
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        if (cols, rows) == (self.canvas.cols, self.canvas.rows) {
            return;
        }
        self.canvas = CellCanvas::new(cols, rows);
        self.animator.resize(self.canvas.pixel_size());
    }

    fn frame(&mut self, now_ms: f64) {
        if let Some(token) = self.scheduler.fire()
            && let Some(frame) = self.animator.on_frame(token, now_ms, &mut self.scheduler)
        {
            self.canvas.apply(&frame.render);
        }
    }
}

fn build(config: &FolioConfig, kind: BackgroundKind, bounds: Size, seed: u64) -> Animator {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut background = config.background.clone();
    background.kind = kind;
    let background = Background::build(&background, bounds, &mut rng);
    let pipeline = PipelineTrack::new("pipeline".into(), CapsuleTrack::new(&config.pipeline, &mut rng));
    Animator::new(Some(background), Some(pipeline))
}

pub fn render_tui(config: FolioConfig) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let canvas_rows = |h: u16| h.saturating_sub(1 + PIPELINE_ROWS);
    let mut preview = Preview::new(config, size.width, canvas_rows(size.height));
    let started = Instant::now();

    loop {
        let term_size = terminal.size()?;
        preview.resize(term_size.width, canvas_rows(term_size.height));
        preview.frame(started.elapsed().as_secs_f64() * 1000.0);

        terminal.draw(|frame| {
            let area = frame.area();

            let header_area = Rect::new(0, 0, area.width, 1);
            let kind = match preview.kind {
                BackgroundKind::Network => "network",
                BackgroundKind::Matrix => "matrix",
            };
            let state = if preview.paused { "paused" } else { "running" };
            let header = Block::default()
                .title(format!(" folio preview: {kind} ({state}) | m background | space pause | q quit "))
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, header_area);

            let canvas_area = Rect::new(0, 1, area.width, canvas_rows(area.height));
            let block = Block::default()
                .borders(Borders::NONE)
                .style(Style::default().bg(Color::Black));
            frame.render_widget(block, canvas_area);
            preview.canvas.paint(frame.buffer_mut(), canvas_area);

            let strip = Rect::new(
                0,
                area.height.saturating_sub(PIPELINE_ROWS),
                area.width,
                PIPELINE_ROWS.min(area.height),
            );
            let block = Block::default()
                .borders(Borders::TOP)
                .title(" pipeline ")
                .style(Style::default().fg(Color::DarkGray).bg(Color::Black));
            frame.render_widget(block, strip);
            if strip.height < 2 {
                return;
            }
            let lane = strip.y + 1;
            let buf = frame.buffer_mut();
            for x in 0..strip.width {
                buf[(x, lane)].set_char('─').set_fg(Color::DarkGray);
            }
            let stations = &preview.config.pipeline.stations;
            for (i, station) in stations.iter().enumerate() {
                let x = ((i + 1) as f64 / (stations.len() + 1) as f64 * f64::from(strip.width)) as u16;
                buf[(x.min(strip.width.saturating_sub(1)), lane)]
                    .set_char('◆')
                    .set_fg(theme_to_color(ThemeToken::StationGlow, 1.0));
                if strip.height > 2 {
                    for (j, ch) in station.title.chars().enumerate() {
                        let cx = x.saturating_sub(station.title.len() as u16 / 2) + j as u16;
                        if cx < strip.width {
                            buf[(cx, lane + 1)].set_char(ch).set_fg(Color::Gray);
                        }
                    }
                }
            }
            if let Some(pipeline) = preview.animator.pipeline() {
                let cfg = &preview.config.pipeline;
                for x in capsule_columns(&pipeline.track, cfg.path_start, cfg.path_end, strip.width) {
                    buf[(x, lane)]
                        .set_char('●')
                        .set_fg(theme_to_color(ThemeToken::CapsuleFill, 0.8));
                }
            }
        })?;

        if event::poll(Duration::from_millis(16))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('m') => preview.toggle_kind(),
                KeyCode::Char(' ') => preview.toggle_pause(),
                _ => {}
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
