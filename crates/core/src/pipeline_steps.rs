//! Cycles the pipeline diagram's steps and connectors through `active`.

use folio_protocol::{DomCommand, ElementId};

use crate::error::FolioError;

pub const ACTIVE: &str = "active";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Clock {
    /// Anchors on the next tick.
    Armed,
    Running { next_due_ms: f64 },
    Stopped,
}

/// Lights steps `0..=current` and connectors `0..current` once per
/// interval, then advances `current` through `0..=steps.len()` and wraps.
/// The first state is shown one interval after the anchoring tick.
#[derive(Debug, Clone)]
pub struct StepCycler {
    steps: Vec<ElementId>,
    connectors: Vec<ElementId>,
    interval_ms: f64,
    current: usize,
    clock: Clock,
}

impl StepCycler {
    pub fn new(steps: Vec<ElementId>, connectors: Vec<ElementId>, interval_ms: f64) -> Result<Self, FolioError> {
        if steps.is_empty() {
            return Err(FolioError::missing_element("pipeline steps", ".pipeline-step"));
        }
        Ok(Self {
            steps,
            connectors,
            interval_ms,
            current: 0,
            clock: Clock::Armed,
        })
    }

    /// The step index the next interval will light up to.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_stopped(&self) -> bool {
        self.clock == Clock::Stopped
    }

    pub fn stop(&mut self) {
        self.clock = Clock::Stopped;
    }

    /// Restart from the current step; the clock anchors on the next tick.
    pub fn resume(&mut self) {
        if self.clock == Clock::Stopped {
            self.clock = Clock::Armed;
        }
    }

    /// Stop cycling and show every step and connector lit.
    pub fn settle(&mut self) -> Vec<DomCommand> {
        self.stop();
        self.steps
            .iter()
            .chain(&self.connectors)
            .map(|id| DomCommand::add_class(id, ACTIVE))
            .collect()
    }

    /// Catches up on every interval that became due and returns the class
    /// changes for the latest state. Empty when nothing was due.
    pub fn tick(&mut self, now_ms: f64) -> Vec<DomCommand> {
        let due = match self.clock {
            Clock::Stopped => return Vec::new(),
            Clock::Armed => {
                self.clock = Clock::Running {
                    next_due_ms: now_ms + self.interval_ms,
                };
                return Vec::new();
            }
            Clock::Running { next_due_ms } => next_due_ms,
        };
        if now_ms < due {
            return Vec::new();
        }

        let states = self.steps.len() + 1;
        let skipped = ((now_ms - due) / self.interval_ms).floor() as usize;
        self.current = (self.current + skipped) % states;
        let dom = self.render();
        self.current = (self.current + 1) % states;
        self.clock = Clock::Running {
            next_due_ms: due + (skipped + 1) as f64 * self.interval_ms,
        };
        dom
    }

    fn render(&self) -> Vec<DomCommand> {
        let toggle = |id: &ElementId, on: bool| {
            if on {
                DomCommand::add_class(id, ACTIVE)
            } else {
                DomCommand::remove_class(id, ACTIVE)
            }
        };
        let steps = self.steps.iter().enumerate().map(|(i, id)| toggle(id, i <= self.current));
        let connectors = self.connectors.iter().enumerate().map(|(i, id)| toggle(id, i < self.current));
        steps.chain(connectors).collect()
    }
}
