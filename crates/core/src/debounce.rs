/// Trailing-edge debouncer over caller-supplied timestamps.
///
/// Bursts of `trigger` calls collapse into one `poll` hit, `quantum_ms` after
/// the last trigger. Used only to bound redundant layout work.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quantum_ms: f64,
    deadline_ms: Option<f64>,
}

impl Debouncer {
    pub fn new(quantum_ms: f64) -> Self {
        Self {
            quantum_ms,
            deadline_ms: None,
        }
    }

    pub fn trigger(&mut self, now_ms: f64) {
        self.deadline_ms = Some(now_ms + self.quantum_ms);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// `true` exactly once per burst, when the deadline has passed.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }
}
