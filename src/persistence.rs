use crate::audio::AudioInput;
use crate::field::FieldConfig;
use crate::params::TypoParams;
use crate::sequencer::{Easing, PlayMode, SnapshotBank};
use crate::simulation::{InteractionMode, PhysicsConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Get the data directory for storing projects
/// - If running from source (binary path contains "target") or PIXEL_TYPO_DEV is set: ./tmp/pixel-typo
/// - If installed (binary path elsewhere): ~/.local/share/pixel-typo
pub fn get_data_dir() -> PathBuf {
    let use_local_storage = std::env::var("PIXEL_TYPO_DEV").is_ok()
        || std::env::current_exe()
            .map(|p| p.iter().any(|c| c == "target"))
            .unwrap_or(false);

    if use_local_storage {
        // When running via 'cargo run' the CWD is the project root
        let mut path = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        path.push("tmp");
        path.push("pixel-typo");
        path
    } else {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("pixel-typo")
    }
}

/// Ensure the data directory exists
pub fn ensure_data_dir() -> std::io::Result<PathBuf> {
    let dir = get_data_dir();
    if let Some(parent) = dir.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Everything a saved project carries: the live canvas state plus the
/// snapshot bank and sequencer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectState {
    pub params: TypoParams,
    pub field: FieldConfig,
    pub physics: PhysicsConfig,
    pub mode: InteractionMode,
    pub audio: AudioInput,
    pub bank: SnapshotBank,
    pub play_mode: PlayMode,
    pub transition_secs: f32,
    pub hold_secs: f32,
    pub easing: Easing,
}

impl Default for ProjectState {
    fn default() -> Self {
        Self {
            params: TypoParams::default(),
            field: FieldConfig::default(),
            physics: PhysicsConfig::default(),
            mode: InteractionMode::default(),
            audio: AudioInput::default(),
            bank: SnapshotBank::default(),
            play_mode: PlayMode::default(),
            transition_secs: crate::config::timing::TRANSITION_SECS,
            hold_secs: crate::config::timing::HOLD_SECS,
            easing: Easing::default(),
        }
    }
}

fn project_path() -> PathBuf {
    get_data_dir().join("project.json")
}

pub fn load_project() -> Option<ProjectState> {
    let content = fs::read_to_string(project_path()).ok()?;
    let mut state = serde_json::from_str::<ProjectState>(&content).ok()?;
    // Corrupted or hand-edited files must not reach the layout with
    // degenerate matrices
    state.params.prune_invalid_matrices();
    for snapshot in &mut state.bank.snapshots {
        snapshot.params.prune_invalid_matrices();
    }
    Some(state)
}

pub fn save_project(state: &ProjectState) -> std::io::Result<()> {
    let dir = ensure_data_dir()?;
    let payload = serde_json::to_string_pretty(state)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
    fs::write(dir.join("project.json"), payload)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowState {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

fn window_state_path() -> PathBuf {
    get_data_dir().join("window_state.json")
}

pub fn load_window_state() -> Option<WindowState> {
    let content = fs::read_to_string(window_state_path()).ok()?;
    let state = serde_json::from_str::<WindowState>(&content).ok()?;
    if state.width == 0 || state.height == 0 {
        return None;
    }
    Some(state)
}

pub fn save_window_state(state: WindowState) -> std::io::Result<()> {
    let dir = ensure_data_dir()?;
    let payload = serde_json::to_string_pretty(&state)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
    fs::write(dir.join("window_state.json"), payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_state_json_roundtrip() {
        let mut state = ProjectState::default();
        state.params.set_text("SAVE ME");
        state.params.set_global_weight(4.0);
        state.field.enabled = true;
        state.mode = InteractionMode::Matrix;
        state.bank.capture(
            "one",
            &state.params,
            &state.field,
            &state.physics,
            state.mode,
        );

        let payload = serde_json::to_string_pretty(&state).unwrap();
        let back: ProjectState = serde_json::from_str(&payload).unwrap();
        assert_eq!(back.params.text, "SAVE ME");
        assert_eq!(back.params.weight, 4.0);
        assert!(back.field.enabled);
        assert_eq!(back.mode, InteractionMode::Matrix);
        assert_eq!(back.bank.len(), 1);
    }

    #[test]
    fn test_project_state_tolerates_missing_fields() {
        let back: ProjectState = serde_json::from_str("{}").unwrap();
        assert_eq!(back.params.text, "HELLO");
        assert!(back.bank.is_empty());
    }

    #[test]
    fn test_window_state_roundtrip() {
        let state = WindowState {
            x: 10,
            y: 20,
            width: 1280,
            height: 800,
        };
        let payload = serde_json::to_string(&state).unwrap();
        let back: WindowState = serde_json::from_str(&payload).unwrap();
        assert_eq!(back.width, 1280);
    }
}
