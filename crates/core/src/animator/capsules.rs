use folio_protocol::{DomCommand, ElementId, Point, RenderCommand, ThemeToken};
use rand::Rng;

use crate::config::PipelineConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// Horizontal position along the pipeline path.
    pub position: f64,
    pub speed: f64,
}

/// Capsules flowing along the pipeline path.
///
/// Unlike network nodes, capsules wrap: reaching the end of the path, or
/// falling behind its start, puts a capsule back at the start.
#[derive(Debug, Clone)]
pub struct CapsuleTrack {
    capsules: Vec<Capsule>,
    ids: Vec<ElementId>,
    start: f64,
    end: f64,
    y: f64,
    radius: f64,
}

impl CapsuleTrack {
    pub fn new(config: &PipelineConfig, rng: &mut impl Rng) -> Self {
        let length = config.path_end - config.path_start;
        let capsules = (0..config.capsule_count)
            .map(|i| {
                let offset = (i as f64 * config.spacing).rem_euclid(length);
                let jitter = if config.speed_jitter > 0.0 {
                    rng.gen_range(0.0..config.speed_jitter)
                } else {
                    0.0
                };
                Capsule {
                    position: config.path_start + offset,
                    speed: config.base_speed + jitter,
                }
            })
            .collect();
        Self::with_capsules(config, capsules)
    }

    pub fn with_capsules(config: &PipelineConfig, capsules: Vec<Capsule>) -> Self {
        let ids = (0..capsules.len())
            .map(|i| ElementId::from(format!("pipeline-capsule-{i}")))
            .collect();
        Self {
            capsules,
            ids,
            start: config.path_start,
            end: config.path_end,
            y: config.path_y,
            radius: config.capsule_radius,
        }
    }

    pub fn capsules(&self) -> &[Capsule] {
        &self.capsules
    }

    pub fn step(&mut self) {
        self.advance(1.0);
    }

    pub fn advance(&mut self, scale: f64) {
        for capsule in &mut self.capsules {
            capsule.position += capsule.speed * scale;
            if capsule.position >= self.end || capsule.position < self.start {
                capsule.position = self.start;
            }
        }
    }

    /// Commands that add one SVG circle per capsule under `svg`.
    pub fn spawn(&self, svg: &ElementId) -> Vec<DomCommand> {
        self.capsules
            .iter()
            .zip(&self.ids)
            .map(|(capsule, id)| DomCommand::SpawnSvgCircle {
                parent: svg.clone(),
                id: id.clone(),
                center: Point::new(capsule.position, self.y),
                radius: self.radius,
            })
            .collect()
    }

    /// Move the spawned circles to the current positions.
    pub fn sync(&self) -> Vec<DomCommand> {
        self.capsules
            .iter()
            .zip(&self.ids)
            .map(|(capsule, id)| DomCommand::set_attribute(id, "cx", format!("{:.2}", capsule.position)))
            .collect()
    }

    pub fn render(&self) -> Vec<RenderCommand> {
        self.capsules
            .iter()
            .map(|capsule| RenderCommand::FillCircle {
                center: Point::new(capsule.position, self.y),
                radius: self.radius,
                color: ThemeToken::CapsuleFill,
                alpha: 0.8,
                glow: Some(4.0),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn track(position: f64, speed: f64) -> CapsuleTrack {
        CapsuleTrack::with_capsules(&PipelineConfig::default(), vec![Capsule { position, speed }])
    }

    #[test]
    fn spawns_staggered_inside_path() {
        let mut rng = SmallRng::seed_from_u64(1);
        let track = CapsuleTrack::new(&PipelineConfig::default(), &mut rng);
        let positions: Vec<_> = track.capsules().iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![30.0, 70.0, 110.0]);
        for c in track.capsules() {
            assert!((0.5..0.8).contains(&c.speed));
        }
    }

    #[test]
    fn wraps_to_start_at_end() {
        let mut t = track(389.6, 0.5);
        t.step();
        assert_eq!(t.capsules()[0].position, 30.0);
    }

    #[test]
    fn wraps_when_landing_exactly_on_end() {
        let mut t = track(389.5, 0.5);
        t.step();
        assert_eq!(t.capsules()[0].position, 30.0);
    }

    #[test]
    fn stays_within_path_over_many_steps() {
        let mut t = track(30.0, 0.73);
        for _ in 0..10_000 {
            t.step();
            let p = t.capsules()[0].position;
            assert!((30.0..390.0).contains(&p));
        }
    }

    #[test]
    fn backward_speed_cannot_leave_the_path() {
        let mut t = track(30.0, -1.0);
        for _ in 0..1000 {
            t.step();
            let p = t.capsules()[0].position;
            assert!((30.0..390.0).contains(&p));
        }
    }

    #[test]
    fn sync_targets_spawned_ids() {
        let t = track(100.0, 0.5);
        let spawn = t.spawn(&"pipeline-svg".into());
        let DomCommand::SpawnSvgCircle { id, center, .. } = &spawn[0] else {
            panic!("expected spawn command");
        };
        assert_eq!(center.y, 60.0);
        assert_eq!(
            t.sync(),
            vec![DomCommand::set_attribute(id, "cx", "100.00")]
        );
    }
}
