use folio_protocol::{Point, Rect, RenderCommand, Size, ThemeToken};
use rand::Rng;

use crate::config::NetworkConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleNode {
    pub position: Point,
    pub velocity: Point,
    pub radius: f64,
}

/// Drifting nodes joined by distance-faded edges.
///
/// Nodes reflect off the canvas edges and never collide with each other.
/// Resizing changes the bounds only; positions are left where they are.
#[derive(Debug, Clone)]
pub struct ParticleField {
    nodes: Vec<ParticleNode>,
    bounds: Size,
    config: NetworkConfig,
}

impl ParticleField {
    pub fn new(config: NetworkConfig, bounds: Size, rng: &mut impl Rng) -> Self {
        let speed = config.max_speed;
        let nodes = (0..config.node_count)
            .map(|_| ParticleNode {
                position: Point::new(
                    rng.gen_range(0.0..=bounds.width.max(0.0)),
                    rng.gen_range(0.0..=bounds.height.max(0.0)),
                ),
                velocity: Point::new(random_speed(rng, speed), random_speed(rng, speed)),
                radius: config.node_radius,
            })
            .collect();
        Self {
            nodes,
            bounds,
            config,
        }
    }

    /// Build a field from explicit nodes.
    pub fn with_nodes(config: NetworkConfig, bounds: Size, nodes: Vec<ParticleNode>) -> Self {
        Self {
            nodes,
            bounds,
            config,
        }
    }

    pub fn nodes(&self) -> &[ParticleNode] {
        &self.nodes
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn resize(&mut self, bounds: Size) {
        self.bounds = bounds;
    }

    /// Advance one reference frame.
    pub fn step(&mut self) {
        self.advance(1.0);
    }

    /// Advance by `scale` reference frames.
    pub fn advance(&mut self, scale: f64) {
        let Size { width, height } = self.bounds;
        for node in &mut self.nodes {
            node.position.x += node.velocity.x * scale;
            node.position.y += node.velocity.y * scale;
            node.velocity.x = reflect(node.position.x, node.velocity.x, width);
            node.velocity.y = reflect(node.position.y, node.velocity.y, height);
        }
    }

    pub fn render(&self) -> Vec<RenderCommand> {
        let distance = self.config.connection_distance;
        let mut commands = Vec::with_capacity(self.nodes.len() * 2 + 1);
        commands.push(RenderCommand::ClearRect {
            rect: Rect::from_size(self.bounds),
        });

        for node in &self.nodes {
            commands.push(RenderCommand::FillCircle {
                center: node.position,
                radius: node.radius,
                color: ThemeToken::NodeFill,
                alpha: self.config.node_alpha,
                glow: None,
            });
        }

        for (i, a) in self.nodes.iter().enumerate() {
            for b in &self.nodes[i + 1..] {
                let d = a.position.distance(b.position);
                if d < distance {
                    commands.push(RenderCommand::DrawLine {
                        from: a.position,
                        to: b.position,
                        color: ThemeToken::ConnectionStroke,
                        width: self.config.line_width,
                        alpha: self.config.max_edge_alpha * (1.0 - d / distance),
                    });
                }
            }
        }
        commands
    }
}

fn random_speed(rng: &mut impl Rng, max: f64) -> f64 {
    if max > 0.0 {
        rng.gen_range(-max..max)
    } else {
        0.0
    }
}

/// Point the velocity back into `0..=extent` once the position has left it.
fn reflect(position: f64, velocity: f64, extent: f64) -> f64 {
    if position < 0.0 {
        velocity.abs()
    } else if position > extent {
        -velocity.abs()
    } else {
        velocity
    }
}
