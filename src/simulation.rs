//! Particle simulation
//!
//! Anchored cells detach into free particles, bounce around the viewport,
//! and return home on demand. The step function runs once per animation
//! tick; all tuning constants are per-tick, not per-second.
//!
//! Two return disciplines exist. Organic return eases 10% of the remaining
//! distance per tick and damps velocity. Matrix return moves at constant
//! speed, resolving X completely before Y so particles walk home along the
//! grid.

use crate::config::{audio, physics, timing};
use crate::field::FieldConfig;
use crate::layout::{CellId, CellRect};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Organic,
    Matrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub friction: f32,
    pub restitution: f32,
    pub drag_stiffness: f32,
    pub gravity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            friction: physics::FRICTION,
            restitution: physics::RESTITUTION,
            drag_stiffness: physics::DRAG_STIFFNESS,
            gravity: physics::GRAVITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub id: CellId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub origin_x: f32,
    pub origin_y: f32,
    /// Spawn color, assigned at detach time
    pub color: (f32, f32, f32),
    pub returning: bool,
    pub dragging: bool,
}

impl Particle {
    fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Within snapping distance of the origin while returning.
    pub fn at_home(&self) -> bool {
        self.returning
            && (self.x - self.origin_x).abs() < physics::RETURN_EPSILON
            && (self.y - self.origin_y).abs() < physics::RETURN_EPSILON
    }
}

/// Everything the renderer needs to draw one particle.
#[derive(Debug, Clone, Copy)]
pub struct ParticleRender {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub rot_deg: f32,
    pub scale: f32,
    /// Spawn color carried from the particle
    pub color: (f32, f32, f32),
    /// Returned home; drawn in the anchored cell color
    pub at_home: bool,
}

/// Per-step inputs gathered by the app.
pub struct StepInput {
    pub pointer: (f32, f32),
    pub viewport: (f32, f32),
    pub mode: InteractionMode,
    pub field: FieldConfig,
    pub field_radius: f32,
    pub field_force: f32,
    pub volume: f32,
    pub cell_size: f32,
}

#[derive(Default)]
pub struct Simulation {
    particles: Vec<Particle>,
    pub physics: PhysicsConfig,
    reset_deadline: Option<Instant>,
}

impl Simulation {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Particle lifecycle
    // =========================================================================

    pub fn is_detached(&self, id: CellId) -> bool {
        self.particles.iter().any(|p| p.id == id)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Detach a cell into a free particle with a small random kick. The
    /// spawn color sticks to the particle for its whole lifetime.
    /// Detaching an already-detached cell does nothing.
    pub fn detach<R: Rng>(&mut self, cell: &CellRect, color: (f32, f32, f32), rng: &mut R) {
        if self.is_detached(cell.id()) {
            return;
        }
        self.particles.push(Particle {
            id: cell.id(),
            x: cell.x,
            y: cell.y,
            vx: rng.gen_range(-1.0..1.0) * physics::SPAWN_KICK,
            vy: rng.gen_range(-1.0..1.0) * physics::SPAWN_KICK,
            width: cell.size,
            height: cell.size,
            origin_x: cell.x,
            origin_y: cell.y,
            color,
            returning: false,
            dragging: false,
        });
    }

    pub fn begin_drag(&mut self, id: CellId) {
        if let Some(p) = self.particles.iter_mut().find(|p| p.id == id) {
            p.dragging = true;
            p.returning = false;
        }
    }

    pub fn end_drag(&mut self) {
        for p in &mut self.particles {
            p.dragging = false;
        }
    }

    /// Topmost particle under a canvas point, if any.
    pub fn particle_at(&self, px: f32, py: f32) -> Option<CellId> {
        self.particles
            .iter()
            .rev()
            .find(|p| px >= p.x && px < p.x + p.width && py >= p.y && py < p.y + p.height)
            .map(|p| p.id)
    }

    pub fn return_all(&mut self) {
        for p in &mut self.particles {
            p.returning = true;
            p.dragging = false;
        }
    }

    /// Flag everything returning and clear the store after a grace period so
    /// particles are seen flying home before they vanish.
    pub fn reset(&mut self, now: Instant) {
        self.return_all();
        self.reset_deadline = Some(now + Duration::from_millis(timing::RESET_CLEAR_MS));
    }

    /// Drop particles whose cells no longer exist in the layout.
    pub fn retain_cells(&mut self, exists: impl Fn(CellId) -> bool) {
        self.particles.retain(|p| exists(p.id));
    }

    /// Re-home surviving particles after a layout change.
    pub fn rebase_origins(&mut self, origin_of: impl Fn(CellId) -> Option<(f32, f32)>) {
        for p in &mut self.particles {
            if let Some((ox, oy)) = origin_of(p.id) {
                p.origin_x = ox;
                p.origin_y = oy;
            }
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.reset_deadline = None;
    }

    // =========================================================================
    // Tick
    // =========================================================================

    pub fn step<R: Rng>(&mut self, now: Instant, input: &StepInput, rng: &mut R) {
        if let Some(deadline) = self.reset_deadline {
            if now >= deadline {
                self.clear();
                return;
            }
        }

        let cfg = self.physics;
        let (vw, vh) = input.viewport;
        let matrix = input.mode == InteractionMode::Matrix;

        for i in 0..self.particles.len() {
            let p = &mut self.particles[i];

            if p.returning {
                if matrix {
                    // Constant speed, X resolved fully before Y
                    let speed = (input.cell_size * 0.5).max(2.0);
                    let dx = p.origin_x - p.x;
                    let dy = p.origin_y - p.y;
                    if dx.abs() > 1.0 {
                        p.x += dx.signum() * dx.abs().min(speed);
                    } else {
                        p.x = p.origin_x;
                        if dy.abs() > 1.0 {
                            p.y += dy.signum() * dy.abs().min(speed);
                        } else {
                            p.y = p.origin_y;
                        }
                    }
                    p.vx = 0.0;
                    p.vy = 0.0;
                } else {
                    let dx = p.origin_x - p.x;
                    let dy = p.origin_y - p.y;
                    p.x += dx * physics::RETURN_EASE;
                    p.y += dy * physics::RETURN_EASE;
                    p.vx *= physics::RETURN_DAMPING;
                    p.vy *= physics::RETURN_DAMPING;
                    if dx.abs() < physics::RETURN_EPSILON && dy.abs() < physics::RETURN_EPSILON {
                        p.x = p.origin_x;
                        p.y = p.origin_y;
                    }
                }
                continue;
            }

            if p.dragging {
                let (cx, cy) = p.center();
                p.vx = (input.pointer.0 - cx) * cfg.drag_stiffness;
                p.vy = (input.pointer.1 - cy) * cfg.drag_stiffness;
                p.x += p.vx;
                p.y += p.vy;
                continue;
            }

            p.vy += cfg.gravity;

            if input.volume > audio::JITTER_THRESHOLD {
                p.vx += rng.gen_range(-0.5..0.5) * input.volume * audio::JITTER_STRENGTH;
                p.vy += rng.gen_range(-0.5..0.5) * input.volume * audio::JITTER_STRENGTH;
            }

            if input.field.enabled {
                if let Some((fx, fy)) = input.field.burst(
                    p.center(),
                    input.pointer,
                    input.field_radius,
                    input.field_force,
                    matrix,
                ) {
                    p.vx += fx;
                    p.vy += fy;
                }
            }

            p.vx *= cfg.friction;
            p.vy *= cfg.friction;
            p.x += p.vx;
            p.y += p.vy;

            let max_x = vw - p.width;
            let max_y = vh - p.height;
            if p.y > max_y {
                p.y = max_y;
                p.vy *= -cfg.restitution;
            }
            if p.y < 0.0 {
                p.y = 0.0;
                p.vy *= -cfg.restitution;
            }
            if p.x > max_x {
                p.x = max_x;
                p.vx *= -cfg.restitution;
            }
            if p.x < 0.0 {
                p.x = 0.0;
                p.vx *= -cfg.restitution;
            }

            // Pairwise separation, each pair visited once
            for j in (i + 1)..self.particles.len() {
                let (head, tail) = self.particles.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];
                if b.returning || b.dragging {
                    continue;
                }

                let (ax, ay) = a.center();
                let (bx, by) = b.center();
                let dx = ax - bx;
                let dy = ay - by;
                let dist = (dx * dx + dy * dy).sqrt();
                let min_dist = (a.width + b.width) * 0.5;

                if dist < min_dist {
                    let angle = dy.atan2(dx);
                    let push_x = angle.cos() * physics::COLLISION_PUSH;
                    let push_y = angle.sin() * physics::COLLISION_PUSH;
                    a.vx += push_x;
                    a.vy += push_y;
                    b.vx -= push_x;
                    b.vy -= push_y;
                }
            }
        }
    }

    // =========================================================================
    // Render states
    // =========================================================================

    /// Snapshot of every particle as the renderer should draw it this frame.
    /// `pulse_ms` is the animation clock in milliseconds for the ensemble
    /// pulse; pass `ensemble` when sequenced playback should make the whole
    /// cloud breathe.
    pub fn render_states(
        &self,
        mode: InteractionMode,
        cell_size: f32,
        mic_active: bool,
        volume: f32,
        ensemble: bool,
        pulse_ms: f64,
    ) -> Vec<ParticleRender> {
        self.particles
            .iter()
            .map(|p| {
                let mut scale = 1.0;
                if mic_active {
                    scale += volume;
                }
                if ensemble {
                    scale += ((pulse_ms * audio::PULSE_SPEED as f64) as f32
                        + p.x * audio::PULSE_SPATIAL)
                        .sin()
                        * audio::PULSE_AMPLITUDE;
                }
                scale = scale.max(0.1);

                let (x, y, rot_deg) = match mode {
                    InteractionMode::Matrix => (
                        (p.x / cell_size).round() * cell_size,
                        (p.y / cell_size).round() * cell_size,
                        0.0,
                    ),
                    InteractionMode::Organic => (p.x, p.y, p.vx * 2.0),
                };

                ParticleRender {
                    x,
                    y,
                    size: p.width,
                    rot_deg,
                    scale,
                    color: p.color,
                    at_home: p.at_home(),
                }
            })
            .collect()
    }
}
