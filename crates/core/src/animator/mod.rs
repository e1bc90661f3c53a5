//! Frame-stepped animations: the canvas background and the pipeline capsules.
//!
//! Both run off one [`FrameLoop`] and advance by elapsed time measured in
//! reference frames, so motion speed does not depend on the display's
//! refresh rate.

pub mod capsules;
pub mod matrix;
pub mod particles;

use folio_protocol::{DomCommand, ElementId, RenderCommand, Size};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

pub use capsules::{Capsule, CapsuleTrack};
pub use matrix::MatrixRain;
pub use particles::{ParticleField, ParticleNode};

use crate::config::{BackgroundConfig, BackgroundKind};
use crate::scheduler::{FrameLoop, FrameScheduler, FrameToken};

/// Duration of one simulation step.
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// Upper bound on steps taken in one frame, so a long stall (background tab)
/// does not teleport everything.
pub const MAX_STEPS_PER_FRAME: f64 = 4.0;

#[derive(Debug, Clone)]
pub enum Background {
    Network(ParticleField),
    Matrix(MatrixRain),
}

impl Background {
    /// Build the configured background for a canvas of `bounds`. Matrix rain
    /// keeps its own generator, seeded from `rng`.
    pub fn build(config: &BackgroundConfig, bounds: Size, rng: &mut SmallRng) -> Self {
        match config.kind {
            BackgroundKind::Network => Self::Network(ParticleField::new(config.network.clone(), bounds, rng)),
            BackgroundKind::Matrix => Self::Matrix(MatrixRain::new(
                config.matrix.clone(),
                bounds,
                SmallRng::seed_from_u64(rng.r#gen()),
            )),
        }
    }

    pub fn resize(&mut self, bounds: Size) {
        match self {
            Self::Network(field) => field.resize(bounds),
            Self::Matrix(rain) => rain.resize(bounds),
        }
    }

    pub fn advance(&mut self, scale: f64) {
        match self {
            Self::Network(field) => field.advance(scale),
            Self::Matrix(rain) => rain.advance(scale),
        }
    }

    pub fn render(&mut self) -> Vec<RenderCommand> {
        match self {
            Self::Network(field) => field.render(),
            Self::Matrix(rain) => rain.render(),
        }
    }
}

/// Capsules bound to the SVG element they are drawn into.
#[derive(Debug, Clone)]
pub struct PipelineTrack {
    pub svg: ElementId,
    pub track: CapsuleTrack,
    spawned: bool,
}

impl PipelineTrack {
    pub fn new(svg: ElementId, track: CapsuleTrack) -> Self {
        Self {
            svg,
            track,
            spawned: false,
        }
    }
}

/// Output of one animation frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub render: Vec<RenderCommand>,
    pub dom: Vec<DomCommand>,
}

#[derive(Debug)]
pub struct Animator {
    frame_loop: FrameLoop,
    background: Option<Background>,
    pipeline: Option<PipelineTrack>,
    last_frame_ms: Option<f64>,
}

impl Animator {
    pub fn new(background: Option<Background>, pipeline: Option<PipelineTrack>) -> Self {
        Self {
            frame_loop: FrameLoop::new(),
            background,
            pipeline,
            last_frame_ms: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub fn pipeline(&self) -> Option<&PipelineTrack> {
        self.pipeline.as_ref()
    }

    /// Start the loop. Idempotent; the first start also returns the commands
    /// that create the capsule circles.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> Vec<DomCommand> {
        if !self.frame_loop.start(scheduler) {
            return Vec::new();
        }
        debug!("animator started");
        self.last_frame_ms = None;
        match &mut self.pipeline {
            Some(pipeline) if !pipeline.spawned => {
                pipeline.spawned = true;
                pipeline.track.spawn(&pipeline.svg)
            }
            _ => Vec::new(),
        }
    }

    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        let stopped = self.frame_loop.stop(scheduler);
        if stopped {
            debug!("animator stopped");
        }
        stopped
    }

    /// Adopt new canvas extents. Positions are not rescaled.
    pub fn resize(&mut self, bounds: Size) {
        if let Some(background) = &mut self.background {
            background.resize(bounds);
        }
    }

    /// Run one frame if `token` is the loop's outstanding request.
    pub fn on_frame(
        &mut self,
        token: FrameToken,
        now_ms: f64,
        scheduler: &mut dyn FrameScheduler,
    ) -> Option<Frame> {
        if !self.frame_loop.on_frame(token, scheduler) {
            return None;
        }
        let scale = match self.last_frame_ms {
            Some(previous) => ((now_ms - previous) / REFERENCE_FRAME_MS).clamp(0.0, MAX_STEPS_PER_FRAME),
            None => 1.0,
        };
        self.last_frame_ms = Some(now_ms);

        let mut frame = Frame::default();
        if let Some(background) = &mut self.background {
            background.advance(scale);
            frame.render = background.render();
        }
        if let Some(pipeline) = &mut self.pipeline {
            pipeline.track.advance(scale);
            frame.dom = pipeline.track.sync();
        }
        Some(frame)
    }
}
