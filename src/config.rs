//! Centralized configuration constants for Pixel Typo
//!
//! All magic numbers and tunable parameters should be defined here.
//! Some constants may be defined for future use or documentation purposes.

#![allow(dead_code)]

/// Glyph grid constants
pub mod grid {
    /// Base glyph width in cells
    pub const BASE_COLS: usize = 6;
    /// Base glyph height in cells
    pub const BASE_ROWS: usize = 11;
    /// Synthesized glyphs never get narrower than this
    pub const MIN_COLS: usize = 4;
    /// Synthesized glyphs never get shorter than this
    pub const MIN_ROWS: usize = 5;
    /// Default cell size in logical pixels
    pub const DEFAULT_CELL_SIZE: f32 = 16.0;
    /// Horizontal advance of a space, in cells
    pub const SPACE_ADVANCE_CELLS: usize = 3;
    /// Rows a descender (g j p q y) drops below the baseline
    pub const DESCENDER_DROP_ROWS: usize = 5;
}

/// Modifier clamp ranges
pub mod clamps {
    /// Weight modifier range
    pub const WEIGHT_MIN: f32 = -2.0;
    pub const WEIGHT_MAX: f32 = 12.0;
    /// Height modifier range
    pub const HEIGHT_MIN: f32 = -6.0;
    pub const HEIGHT_MAX: f32 = 22.0;
    /// Cell size range in logical pixels
    pub const CELL_SIZE_MIN: f32 = 4.0;
    pub const CELL_SIZE_MAX: f32 = 64.0;
    /// Line spacing scale range
    pub const LINE_SPACING_MIN: f32 = 0.0;
    pub const LINE_SPACING_MAX: f32 = 3.0;
}

/// Pointer interaction tuning
pub mod interaction {
    /// Accumulated horizontal drag (px) per weight step in shift-drag
    pub const WEIGHT_DRAG_THRESHOLD: f32 = 30.0;
    /// Accumulated vertical drag (px) per height step in shift-drag
    pub const HEIGHT_DRAG_THRESHOLD: f32 = 30.0;
    /// Extrude drag threshold, in cell sizes
    pub const EXTRUDE_THRESHOLD_CELLS: f32 = 1.0;
}

/// Particle physics defaults
pub mod physics {
    pub const FRICTION: f32 = 0.98;
    pub const RESTITUTION: f32 = 0.8;
    pub const DRAG_STIFFNESS: f32 = 0.2;
    pub const GRAVITY: f32 = 0.0;
    /// Symmetric push applied when two free particles overlap
    pub const COLLISION_PUSH: f32 = 0.5;
    /// Fraction of remaining distance covered per tick while returning (organic)
    pub const RETURN_EASE: f32 = 0.1;
    /// Velocity decay per tick while returning (organic)
    pub const RETURN_DAMPING: f32 = 0.8;
    /// Distance below which a returning particle snaps to its origin
    pub const RETURN_EPSILON: f32 = 0.5;
    /// Initial spawn velocity is uniform in +/- this range
    pub const SPAWN_KICK: f32 = 1.0;
}

/// Vortex field defaults
pub mod field {
    pub const BASE_RADIUS: f32 = 200.0;
    pub const ROTATIONAL_FORCE: f32 = 2.0;
    pub const ATTRACTION_STRENGTH: f32 = 0.0;
    pub const NOISE_INTENSITY: f32 = 0.0;
    pub const AUDIO_RADIUS_SCALE: f32 = 0.8;
    pub const AUDIO_FORCE_SCALE: f32 = 3.0;
    /// Maximum radial displacement (px) at attraction strength 1.0
    pub const ATTRACTION_REACH: f32 = 100.0;
    /// Maximum positional jitter (px) at noise intensity 1.0
    pub const NOISE_REACH: f32 = 50.0;
    /// Full rotation (degrees) applied at the field center
    pub const MAX_ROTATION_DEG: f32 = 360.0;
}

/// Audio-reactive tuning
pub mod audio {
    /// Default amplitude sensitivity multiplier
    pub const DEFAULT_SENSITIVITY: f32 = 1.0;
    /// Volume above which free particles receive random jitter
    pub const JITTER_THRESHOLD: f32 = 0.1;
    /// Jitter velocity per unit of volume
    pub const JITTER_STRENGTH: f32 = 5.0;
    /// Ensemble pulse amplitude on particle scale
    pub const PULSE_AMPLITUDE: f32 = 0.2;
    /// Ensemble pulse speed (radians per millisecond)
    pub const PULSE_SPEED: f32 = 0.03;
    /// Ensemble pulse spatial frequency along x
    pub const PULSE_SPATIAL: f32 = 0.1;
}

/// Timing constants
pub mod timing {
    /// Default snapshot transition duration in seconds
    pub const TRANSITION_SECS: f32 = 1.0;
    /// Default hold duration between sequencer advances in seconds
    pub const HOLD_SECS: f32 = 1.0;
    /// Grace period before a full reset clears the particle store
    pub const RESET_CLEAR_MS: u64 = 1500;
}
