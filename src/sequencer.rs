//! Snapshot sequencer
//!
//! Captures the full canvas state into named snapshots and plays them back
//! as an eased sequence. Discrete state (text, alignment, overrides, modes)
//! is applied the instant a snapshot is restored; the continuous scalars
//! (weight, height, cell size, line spacing) interpolate over the transition
//! so the glyphs visibly morph between states.
//!
//! Scheduling is deadline-based: the app polls `tick` every frame and the
//! sequencer reports which snapshot to restore when its deadline passes.

use crate::field::FieldConfig;
use crate::params::TypoParams;
use crate::simulation::{InteractionMode, PhysicsConfig};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

// =============================================================================
// Easing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    Elastic,
}

impl Easing {
    /// Map linear progress `t` in [0, 1] to eased progress.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Elastic => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else {
                    let c4 = (2.0 * std::f32::consts::PI) / 3.0;
                    (2.0f32).powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
                }
            }
        }
    }
}

// =============================================================================
// Snapshots
// =============================================================================

/// A complete captured canvas state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub params: TypoParams,
    pub field: FieldConfig,
    pub physics: PhysicsConfig,
    pub mode: InteractionMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotBank {
    pub snapshots: Vec<Snapshot>,
}

impl SnapshotBank {
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn capture(
        &mut self,
        name: impl Into<String>,
        params: &TypoParams,
        field: &FieldConfig,
        physics: &PhysicsConfig,
        mode: InteractionMode,
    ) {
        self.snapshots.push(Snapshot {
            name: name.into(),
            params: params.clone(),
            field: *field,
            physics: *physics,
            mode,
        });
    }

    pub fn delete(&mut self, index: usize) {
        if index < self.snapshots.len() {
            self.snapshots.remove(index);
        }
    }

    pub fn duplicate(&mut self, index: usize) {
        if let Some(snap) = self.snapshots.get(index).cloned() {
            self.snapshots.insert(index + 1, snap);
        }
    }

    /// Reorder a snapshot; both indices clamp into range.
    pub fn reorder(&mut self, from: usize, to: usize) {
        if self.snapshots.is_empty() {
            return;
        }
        let from = from.min(self.snapshots.len() - 1);
        let snap = self.snapshots.remove(from);
        let to = to.min(self.snapshots.len());
        self.snapshots.insert(to, snap);
    }
}

// =============================================================================
// Transitions
// =============================================================================

/// The scalars a transition animates. Everything else in a snapshot is
/// applied discretely at restore time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuousSet {
    pub weight: f32,
    pub height: f32,
    pub cell_size: f32,
    pub line_spacing: f32,
}

impl ContinuousSet {
    pub fn of(params: &TypoParams) -> Self {
        Self {
            weight: params.weight,
            height: params.height,
            cell_size: params.cell_size,
            line_spacing: params.line_spacing,
        }
    }

    pub fn write_to(&self, params: &mut TypoParams) {
        params.weight = self.weight;
        params.height = self.height;
        params.cell_size = self.cell_size;
        params.line_spacing = self.line_spacing;
    }

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        let mix = |x: f32, y: f32| x + (y - x) * t;
        Self {
            weight: mix(a.weight, b.weight),
            height: mix(a.height, b.height),
            cell_size: mix(a.cell_size, b.cell_size),
            line_spacing: mix(a.line_spacing, b.line_spacing),
        }
    }
}

/// An in-flight interpolation between two continuous sets.
#[derive(Debug, Clone)]
pub struct Transition {
    started: Instant,
    duration: Duration,
    easing: Easing,
    from: ContinuousSet,
    to: ContinuousSet,
}

impl Transition {
    pub fn new(
        now: Instant,
        duration: Duration,
        easing: Easing,
        from: ContinuousSet,
        to: ContinuousSet,
    ) -> Self {
        Self {
            started: now,
            duration,
            easing,
            from,
            to,
        }
    }

    /// Sample the eased value at `now`. The bool is true once the transition
    /// has reached its target and can be dropped.
    pub fn sample(&self, now: Instant) -> (ContinuousSet, bool) {
        if self.duration.is_zero() {
            return (self.to, true);
        }
        let elapsed = now.saturating_duration_since(self.started);
        let t = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0);
        if t >= 1.0 {
            (self.to, true)
        } else {
            (
                ContinuousSet::lerp(self.from, self.to, self.easing.apply(t)),
                false,
            )
        }
    }
}

/// Apply a snapshot: discrete state lands immediately, continuous scalars
/// come back as a transition for the caller to drive. A zero duration
/// applies everything at once and returns no transition.
pub fn restore(
    snapshot: &Snapshot,
    params: &mut TypoParams,
    field: &mut FieldConfig,
    physics: &mut PhysicsConfig,
    mode: &mut InteractionMode,
    now: Instant,
    duration: Duration,
    easing: Easing,
) -> Option<Transition> {
    let from = ContinuousSet::of(params);
    let to = ContinuousSet::of(&snapshot.params);

    *params = snapshot.params.clone();
    *field = snapshot.field;
    *physics = snapshot.physics;
    *mode = snapshot.mode;

    if duration.is_zero() {
        return None;
    }
    // Rewind the scalars so the transition can walk them forward
    from.write_to(params);
    Some(Transition::new(now, duration, easing, from, to))
}

// =============================================================================
// Playback
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    #[default]
    Loop,
    Once,
    PingPong,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    pub mode: PlayMode,
    pub transition_secs: f32,
    pub hold_secs: f32,
    pub easing: Easing,
    playing: bool,
    cursor: usize,
    direction: i32,
    next_advance_at: Option<Instant>,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self {
            mode: PlayMode::default(),
            transition_secs: crate::config::timing::TRANSITION_SECS,
            hold_secs: crate::config::timing::HOLD_SECS,
            easing: Easing::default(),
            playing: false,
            cursor: 0,
            direction: 1,
            next_advance_at: None,
        }
    }
}

impl Sequencer {
    pub fn from_settings(
        mode: PlayMode,
        transition_secs: f32,
        hold_secs: f32,
        easing: Easing,
    ) -> Self {
        Self {
            mode,
            transition_secs,
            hold_secs,
            easing,
            ..Self::default()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn transition_duration(&self) -> Duration {
        Duration::from_secs_f32(self.transition_secs.max(0.0))
    }

    /// Start playback from the first snapshot. The first restore fires on
    /// the next tick.
    pub fn play(&mut self, now: Instant) {
        self.playing = true;
        self.cursor = 0;
        self.direction = 1;
        self.next_advance_at = Some(now);
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.next_advance_at = None;
    }

    /// Poll the deadline. Returns the snapshot index to restore when it is
    /// time to advance, and schedules the next step.
    pub fn tick(&mut self, now: Instant, bank_len: usize) -> Option<usize> {
        if !self.playing || bank_len == 0 {
            return None;
        }
        let deadline = self.next_advance_at?;
        if now < deadline {
            return None;
        }

        let index = self.cursor.min(bank_len - 1);

        match self.mode {
            PlayMode::Loop => {
                self.cursor = (index + 1) % bank_len;
            }
            PlayMode::Once => {
                if index + 1 >= bank_len {
                    self.stop();
                    return Some(index);
                }
                self.cursor = index + 1;
            }
            PlayMode::PingPong => {
                if bank_len == 1 {
                    self.cursor = 0;
                } else {
                    let tentative = index as i64 + self.direction as i64;
                    if tentative >= bank_len as i64 {
                        self.direction = -1;
                        self.cursor = bank_len - 2;
                    } else if tentative < 0 {
                        self.direction = 1;
                        self.cursor = 1;
                    } else {
                        self.cursor = tentative as usize;
                    }
                }
            }
        }

        let delay = Duration::from_secs_f32((self.transition_secs + self.hold_secs).max(0.0));
        self.next_advance_at = Some(now + delay);
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EASINGS: [Easing; 5] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::Elastic,
    ];

    fn bank_of(n: usize) -> SnapshotBank {
        let mut bank = SnapshotBank::default();
        let params = TypoParams::default();
        for i in 0..n {
            bank.capture(
                format!("state {i}"),
                &params,
                &FieldConfig::default(),
                &PhysicsConfig::default(),
                InteractionMode::Organic,
            );
        }
        bank
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in EASINGS {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_easing_clamps_out_of_range_input() {
        for easing in EASINGS {
            assert_eq!(easing.apply(-0.5), easing.apply(0.0));
            assert_eq!(easing.apply(1.5), easing.apply(1.0));
        }
    }

    #[test]
    fn test_linear_transition_midpoint() {
        let t0 = Instant::now();
        let from = ContinuousSet {
            weight: 0.0,
            height: 0.0,
            cell_size: 16.0,
            line_spacing: 0.5,
        };
        let to = ContinuousSet {
            weight: 8.0,
            height: 4.0,
            cell_size: 32.0,
            line_spacing: 1.5,
        };
        let tr = Transition::new(t0, Duration::from_secs(1), Easing::Linear, from, to);

        let (mid, done) = tr.sample(t0 + Duration::from_millis(500));
        assert!(!done);
        assert!((mid.weight - 4.0).abs() < 0.1);
        assert!((mid.cell_size - 24.0).abs() < 0.2);

        let (end, done) = tr.sample(t0 + Duration::from_millis(1100));
        assert!(done);
        assert_eq!(end, to);
    }

    #[test]
    fn test_restore_applies_discrete_immediately() {
        let mut params = TypoParams::default();
        let mut field = FieldConfig::default();
        let mut physics = PhysicsConfig::default();
        let mut mode = InteractionMode::Organic;

        let mut target = TypoParams::default();
        target.set_text("AFTER");
        target.weight = 8.0;
        let snap = Snapshot {
            name: "s".into(),
            params: target,
            field: FieldConfig {
                enabled: true,
                ..FieldConfig::default()
            },
            physics: PhysicsConfig::default(),
            mode: InteractionMode::Matrix,
        };

        let t0 = Instant::now();
        let tr = restore(
            &snap,
            &mut params,
            &mut field,
            &mut physics,
            &mut mode,
            t0,
            Duration::from_secs(1),
            Easing::Linear,
        )
        .unwrap();

        // Text and modes land at once, weight starts at its old value
        assert_eq!(params.text, "AFTER");
        assert!(field.enabled);
        assert_eq!(mode, InteractionMode::Matrix);
        assert_eq!(params.weight, 0.0);

        let (end, _) = tr.sample(t0 + Duration::from_secs(2));
        assert_eq!(end.weight, 8.0);
    }

    #[test]
    fn test_restore_zero_duration_applies_everything() {
        let mut params = TypoParams::default();
        let mut field = FieldConfig::default();
        let mut physics = PhysicsConfig::default();
        let mut mode = InteractionMode::Organic;

        let mut target = TypoParams::default();
        target.weight = 8.0;
        let snap = Snapshot {
            name: "s".into(),
            params: target,
            field,
            physics,
            mode,
        };

        let tr = restore(
            &snap,
            &mut params,
            &mut field,
            &mut physics,
            &mut mode,
            Instant::now(),
            Duration::ZERO,
            Easing::Linear,
        );
        assert!(tr.is_none());
        assert_eq!(params.weight, 8.0);
    }

    #[test]
    fn test_loop_mode_wraps() {
        let bank = bank_of(3);
        let mut seq = Sequencer::default();
        let mut t = Instant::now();
        seq.play(t);

        let mut fired = Vec::new();
        for _ in 0..5 {
            fired.push(seq.tick(t, bank.len()).unwrap());
            t += Duration::from_secs_f32(seq.transition_secs + seq.hold_secs + 0.01);
        }
        assert_eq!(fired, vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn test_once_mode_stops_at_last() {
        let bank = bank_of(2);
        let mut seq = Sequencer {
            mode: PlayMode::Once,
            ..Sequencer::default()
        };
        let mut t = Instant::now();
        seq.play(t);

        assert_eq!(seq.tick(t, bank.len()), Some(0));
        t += Duration::from_secs(3);
        assert_eq!(seq.tick(t, bank.len()), Some(1));
        assert!(!seq.is_playing());
        t += Duration::from_secs(3);
        assert_eq!(seq.tick(t, bank.len()), None);
    }

    #[test]
    fn test_pingpong_bounces_inside_bounds() {
        let bank = bank_of(3);
        let mut seq = Sequencer {
            mode: PlayMode::PingPong,
            ..Sequencer::default()
        };
        let mut t = Instant::now();
        seq.play(t);

        let mut fired = Vec::new();
        for _ in 0..7 {
            fired.push(seq.tick(t, bank.len()).unwrap());
            t += Duration::from_secs(3);
        }
        assert_eq!(fired, vec![0, 1, 2, 1, 0, 1, 2]);
    }

    #[test]
    fn test_tick_waits_for_deadline() {
        let bank = bank_of(2);
        let mut seq = Sequencer::default();
        let t = Instant::now();
        seq.play(t);

        assert_eq!(seq.tick(t, bank.len()), Some(0));
        // Deadline is transition + hold away; half that is too early
        assert_eq!(seq.tick(t + Duration::from_secs(1), bank.len()), None);
        assert_eq!(seq.tick(t + Duration::from_secs(3), bank.len()), Some(1));
    }

    #[test]
    fn test_bank_reorder_and_duplicate() {
        let mut bank = bank_of(3);
        bank.snapshots[0].name = "a".into();
        bank.snapshots[1].name = "b".into();
        bank.snapshots[2].name = "c".into();

        bank.reorder(0, 2);
        let names: Vec<_> = bank.snapshots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);

        bank.duplicate(1);
        assert_eq!(bank.len(), 4);
        assert_eq!(bank.snapshots[2].name, "c");

        bank.delete(0);
        assert_eq!(bank.snapshots[0].name, "c");
    }
}
