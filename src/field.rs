//! Vortex distortion field
//!
//! A pointer-centered radial field that warps anchored cells and kicks free
//! particles. Anchored cells are rotated around the pointer and pulled or
//! pushed along the radius; free particles get a velocity burst instead.
//! Audio input widens the radius and strengthens the rotation.

use crate::config::field;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub enabled: bool,
    pub base_radius: f32,
    /// Negative values rotate counter-clockwise
    pub rotational_force: f32,
    /// Positive pulls toward the pointer, negative pushes away
    pub attraction_strength: f32,
    pub noise_intensity: f32,
    pub audio_radius_scale: f32,
    pub audio_force_scale: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_radius: field::BASE_RADIUS,
            rotational_force: field::ROTATIONAL_FORCE,
            attraction_strength: field::ATTRACTION_STRENGTH,
            noise_intensity: field::NOISE_INTENSITY,
            audio_radius_scale: field::AUDIO_RADIUS_SCALE,
            audio_force_scale: field::AUDIO_FORCE_SCALE,
        }
    }
}

/// Per-cell visual offset produced by the field. Applied at render time only;
/// the layout itself never moves.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellTransform {
    pub tx: f32,
    pub ty: f32,
    pub rot_deg: f32,
}

impl FieldConfig {
    /// Field radius after audio widening. `max_dim` is the larger viewport
    /// dimension so a loud signal can cover the whole canvas.
    pub fn effective_radius(&self, volume: f32, max_dim: f32) -> f32 {
        self.base_radius + volume * max_dim * self.audio_radius_scale
    }

    /// Rotational force after audio boost.
    pub fn effective_force(&self, volume: f32) -> f32 {
        self.rotational_force + volume * self.audio_force_scale
    }

    /// Distort an anchored cell around the pointer. `snap` is the cell size
    /// when running in matrix mode, which quantizes the offset to the grid
    /// and suppresses rotation.
    pub fn distort<R: Rng>(
        &self,
        base: (f32, f32),
        pointer: (f32, f32),
        radius: f32,
        force: f32,
        snap: Option<f32>,
        rng: &mut R,
    ) -> CellTransform {
        let dx = pointer.0 - base.0;
        let dy = pointer.1 - base.1;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist >= radius {
            return CellTransform::default();
        }

        let angle = dy.atan2(dx);
        let factor = 1.0 - dist / radius;
        let new_angle = angle + factor * force;

        let radial_move = factor * self.attraction_strength * field::ATTRACTION_REACH;
        let mut new_dist = dist - radial_move;
        // An attracted cell stops at the pointer instead of crossing it
        if self.attraction_strength > 0.0 && new_dist < 0.0 {
            new_dist = 0.0;
        }

        let mut new_x = pointer.0 - new_angle.cos() * new_dist;
        let mut new_y = pointer.1 - new_angle.sin() * new_dist;

        if self.noise_intensity > 0.0 {
            let jitter = self.noise_intensity * factor * field::NOISE_REACH;
            new_x += rng.gen_range(-0.5..0.5) * jitter;
            new_y += rng.gen_range(-0.5..0.5) * jitter;
        }

        let mut tx = new_x - base.0;
        let mut ty = new_y - base.1;
        let mut rot_deg = factor * field::MAX_ROTATION_DEG;

        if let Some(cell) = snap {
            tx = (tx / cell).round() * cell;
            ty = (ty / cell).round() * cell;
            rot_deg = 0.0;
        }

        CellTransform { tx, ty, rot_deg }
    }

    /// Velocity burst for a free particle at `center`. Organic mode pushes
    /// radially away from the pointer; matrix mode pushes along the dominant
    /// axis only. Returns None outside the field.
    pub fn burst(
        &self,
        center: (f32, f32),
        pointer: (f32, f32),
        radius: f32,
        force: f32,
        matrix_mode: bool,
    ) -> Option<(f32, f32)> {
        let dx = center.0 - pointer.0;
        let dy = center.1 - pointer.1;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist >= radius {
            return None;
        }

        let magnitude = (1.0 - dist / radius) * force;
        if matrix_mode {
            if dx.abs() > dy.abs() {
                Some((if dx > 0.0 { magnitude } else { -magnitude }, 0.0))
            } else {
                Some((0.0, if dy > 0.0 { magnitude } else { -magnitude }))
            }
        } else {
            let angle = dy.atan2(dx);
            Some((angle.cos() * magnitude, angle.sin() * magnitude))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_identity_outside_radius() {
        let cfg = FieldConfig::default();
        let t = cfg.distort((500.0, 0.0), (0.0, 0.0), 200.0, 2.0, None, &mut rng());
        assert_eq!(t, CellTransform::default());
    }

    #[test]
    fn test_pure_rotation_preserves_distance() {
        let cfg = FieldConfig {
            attraction_strength: 0.0,
            noise_intensity: 0.0,
            ..FieldConfig::default()
        };
        let base = (100.0, 0.0);
        let t = cfg.distort(base, (0.0, 0.0), 200.0, 2.0, None, &mut rng());

        let nx = base.0 + t.tx;
        let ny = base.1 + t.ty;
        let dist = (nx * nx + ny * ny).sqrt();
        assert!((dist - 100.0).abs() < 1e-3);
        assert!(t.tx != 0.0 || t.ty != 0.0);
    }

    #[test]
    fn test_attraction_never_crosses_pointer() {
        let cfg = FieldConfig {
            attraction_strength: 1.0,
            noise_intensity: 0.0,
            ..FieldConfig::default()
        };
        // factor near 1 so the pull exceeds the distance
        let base = (10.0, 0.0);
        let t = cfg.distort(base, (0.0, 0.0), 400.0, 0.0, None, &mut rng());

        let nx = base.0 + t.tx;
        let ny = base.1 + t.ty;
        assert!((nx * nx + ny * ny).sqrt() < 1e-3);
    }

    #[test]
    fn test_matrix_mode_snaps_and_kills_rotation() {
        let cfg = FieldConfig::default();
        let t = cfg.distort((80.0, 30.0), (0.0, 0.0), 200.0, 2.0, Some(16.0), &mut rng());
        assert_eq!(t.rot_deg, 0.0);
        assert_eq!(t.tx % 16.0, 0.0);
        assert_eq!(t.ty % 16.0, 0.0);
    }

    #[test]
    fn test_noise_jitters_within_reach() {
        let cfg = FieldConfig {
            noise_intensity: 1.0,
            attraction_strength: 0.0,
            ..FieldConfig::default()
        };
        // Zero force and attraction: any offset left over is pure jitter
        let t = cfg.distort((100.0, 0.0), (0.0, 0.0), 200.0, 0.0, None, &mut rng());
        assert!(t.tx != 0.0 || t.ty != 0.0);
        // Bounded by half the jitter reach at factor 0.5
        assert!(t.tx.abs() <= 0.5 * 0.5 * 50.0);
        assert!(t.ty.abs() <= 0.5 * 0.5 * 50.0);
    }

    #[test]
    fn test_rotation_scales_toward_center() {
        let cfg = FieldConfig::default();
        let near = cfg.distort((10.0, 0.0), (0.0, 0.0), 200.0, 0.0, None, &mut rng());
        let far = cfg.distort((190.0, 0.0), (0.0, 0.0), 200.0, 0.0, None, &mut rng());
        assert!(near.rot_deg > far.rot_deg);
        assert!(near.rot_deg <= 360.0);
    }

    #[test]
    fn test_audio_widens_radius_and_force() {
        let cfg = FieldConfig::default();
        assert_eq!(cfg.effective_radius(0.0, 1000.0), cfg.base_radius);
        assert_eq!(
            cfg.effective_radius(0.5, 1000.0),
            cfg.base_radius + 0.5 * 1000.0 * cfg.audio_radius_scale
        );
        assert_eq!(
            cfg.effective_force(0.5),
            cfg.rotational_force + 0.5 * cfg.audio_force_scale
        );
    }

    #[test]
    fn test_burst_pushes_away_from_pointer() {
        let cfg = FieldConfig::default();
        let (fx, fy) = cfg.burst((50.0, 0.0), (0.0, 0.0), 200.0, 2.0, false).unwrap();
        assert!(fx > 0.0);
        assert!(fy.abs() < 1e-6);
    }

    #[test]
    fn test_burst_matrix_mode_uses_dominant_axis() {
        let cfg = FieldConfig::default();
        let (fx, fy) = cfg.burst((10.0, 60.0), (0.0, 0.0), 200.0, 2.0, true).unwrap();
        assert_eq!(fx, 0.0);
        assert!(fy > 0.0);
    }

    #[test]
    fn test_burst_none_outside_radius() {
        let cfg = FieldConfig::default();
        assert!(cfg.burst((300.0, 0.0), (0.0, 0.0), 200.0, 2.0, false).is_none());
    }
}
