//! Count-up statistics that start when they scroll into view.

use folio_protocol::{DomCommand, ElementId};
use tracing::debug;

use crate::tracker::{IntersectionChange, IntersectionTracker};

#[derive(Debug, Clone, Copy, PartialEq)]
enum CounterState {
    Waiting,
    Counting { started_ms: Option<f64> },
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatCounter {
    pub id: ElementId,
    pub target: u64,
    state: CounterState,
}

impl StatCounter {
    pub fn new(id: ElementId, target: u64) -> Self {
        Self {
            id,
            target,
            state: CounterState::Waiting,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == CounterState::Done
    }
}

/// One-shot count-ups, timed by elapsed milliseconds so the final value lands
/// at the same moment on any display.
#[derive(Debug, Clone)]
pub struct CounterController {
    counters: Vec<StatCounter>,
    duration_ms: f64,
}

impl CounterController {
    pub fn new(counters: Vec<StatCounter>, duration_ms: f64) -> Self {
        Self {
            counters,
            duration_ms,
        }
    }

    pub fn counters(&self) -> &[StatCounter] {
        &self.counters
    }

    pub fn is_animating(&self) -> bool {
        self.counters
            .iter()
            .any(|c| matches!(c.state, CounterState::Counting { .. }))
    }

    /// Register with `tracker`, or under reduced motion write every final
    /// value now.
    pub fn init(&mut self, tracker: &mut IntersectionTracker, reduced_motion: bool) -> Vec<DomCommand> {
        if reduced_motion {
            return self
                .counters
                .iter_mut()
                .map(|c| {
                    c.state = CounterState::Done;
                    DomCommand::set_text(&c.id, c.target.to_string())
                })
                .collect();
        }
        for counter in &self.counters {
            tracker.register(counter.id.clone());
        }
        Vec::new()
    }

    /// Start counting on first intersection. The clock starts at the next
    /// [`tick`](Self::tick), which is the first frame that renders it.
    pub fn handle(&mut self, change: &IntersectionChange, tracker: &mut IntersectionTracker) {
        if !change.is_intersecting {
            return;
        }
        if let Some(counter) = self
            .counters
            .iter_mut()
            .find(|c| c.id == change.target && c.state == CounterState::Waiting)
        {
            debug!(counter = %counter.id, target = counter.target, "count-up started");
            counter.state = CounterState::Counting { started_ms: None };
            tracker.unregister(&counter.id);
        }
    }

    pub fn tick(&mut self, now_ms: f64) -> Vec<DomCommand> {
        let duration = self.duration_ms;
        let mut commands = Vec::new();
        for counter in &mut self.counters {
            let CounterState::Counting { started_ms } = counter.state else {
                continue;
            };
            let started = started_ms.unwrap_or(now_ms);
            let progress = ((now_ms - started) / duration).clamp(0.0, 1.0);
            let value = (progress * counter.target as f64).floor() as u64;
            counter.state = if progress >= 1.0 {
                CounterState::Done
            } else {
                CounterState::Counting {
                    started_ms: Some(started),
                }
            };
            commands.push(DomCommand::set_text(&counter.id, value.to_string()));
        }
        commands
    }
}
