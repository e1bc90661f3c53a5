//! Staged sequences as data: an ordered list of (delay, action) steps run by
//! one driver instead of nested timeouts.

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineStep<A> {
    /// Offset from the timeline's start, in milliseconds.
    pub at_ms: f64,
    pub action: A,
}

/// Releases each step's action exactly once, in `at_ms` order, once its
/// time has come. Steps with equal offsets keep insertion order.
#[derive(Debug, Clone)]
pub struct Timeline<A> {
    steps: Vec<TimelineStep<A>>,
    cursor: usize,
    origin_ms: Option<f64>,
}

impl<A> Default for Timeline<A> {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            cursor: 0,
            origin_ms: None,
        }
    }
}

impl<A: Clone> Timeline<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: impl IntoIterator<Item = (f64, A)>) -> Self {
        let mut timeline = Self::new();
        for (at_ms, action) in steps {
            timeline.push(at_ms, action);
        }
        timeline
    }

    /// Insert a step. Steps already released are unaffected; a step added
    /// behind the cursor of a running timeline is released on the next poll.
    pub fn push(&mut self, at_ms: f64, action: A) {
        let at_ms = at_ms.max(0.0);
        let index = self.steps[self.cursor..]
            .iter()
            .position(|s| s.at_ms > at_ms)
            .map_or(self.steps.len(), |i| i + self.cursor);
        self.steps.insert(index, TimelineStep { at_ms, action });
    }

    /// Anchor the timeline at `now_ms`. Restarting re-anchors without
    /// replaying released steps.
    pub fn start(&mut self, now_ms: f64) {
        self.origin_ms = Some(now_ms);
    }

    pub fn is_started(&self) -> bool {
        self.origin_ms.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    pub fn remaining(&self) -> usize {
        self.steps.len() - self.cursor
    }

    /// Every action due at `now_ms` that has not been released yet.
    pub fn poll(&mut self, now_ms: f64) -> Vec<A> {
        let Some(origin) = self.origin_ms else {
            return Vec::new();
        };
        let elapsed = now_ms - origin;
        let mut due = Vec::new();
        while let Some(step) = self.steps.get(self.cursor) {
            if step.at_ms > elapsed {
                break;
            }
            due.push(step.action.clone());
            self.cursor += 1;
        }
        due
    }

    /// Release everything at once (used when motion is reduced).
    pub fn drain(&mut self) -> Vec<A> {
        let due = self.steps[self.cursor..]
            .iter()
            .map(|s| s.action.clone())
            .collect();
        self.cursor = self.steps.len();
        due
    }

    /// Drop all steps not yet released.
    pub fn cancel(&mut self) {
        self.steps.truncate(self.cursor);
    }
}
