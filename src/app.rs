//! Application state and coordination

use crate::audio::AudioInput;
use crate::config::interaction;
use crate::field::{CellTransform, FieldConfig};
use crate::glyph;
use crate::layout::{self, Layout};
use crate::params::{TextAlign, TypoParams, VerticalAlign};
use crate::persistence::{self, ProjectState};
use crate::renderer::{self, CellDraw, GridOverlay, Scene};
use crate::sequencer::{self, Sequencer, SnapshotBank, Transition};
use crate::simulation::{InteractionMode, Simulation, StepInput};
use crate::theme::Theme;
use femtovg::{Canvas, renderer::OpenGl};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::time::Instant;

/// Result type for application actions that may trigger UI updates
#[must_use = "Handle the AppResult to ensure the UI updates correctly"]
pub enum AppResult {
    /// No action needed
    Ok,
    /// UI needs to be redrawn
    Redraw,
}

impl AppResult {
    pub fn needs_redraw(&self) -> bool {
        matches!(self, AppResult::Redraw)
    }
}

/// Canvas operating mode: Edit composes text, Play detaches cells into
/// particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasMode {
    Edit,
    Play,
}

/// Active edit-mode tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Move,
    Extrude,
}

/// In-flight extrude drag on one glyph.
struct ExtrudeDrag {
    index: usize,
    row: usize,
    col: usize,
    start: (f32, f32),
    applied_cols: i32,
    applied_rows: i32,
}

/// In-flight character move.
struct CharDrag {
    index: usize,
    start: (f32, f32),
    origin: (f32, f32),
}

/// Transient interaction state (pointer, drags, accumulators)
struct InputState {
    pointer: (f32, f32),
    shift_down: bool,
    pointer_down: bool,
    selection: Vec<usize>,
    weight_accum: f32,
    height_accum: f32,
    last_drag: (f32, f32),
    char_drag: Option<CharDrag>,
    extrude_drag: Option<ExtrudeDrag>,
    dragging_particle: bool,
}

impl InputState {
    fn new() -> Self {
        Self {
            pointer: (-1000.0, -1000.0),
            shift_down: false,
            pointer_down: false,
            selection: Vec::new(),
            weight_accum: 0.0,
            height_accum: 0.0,
            last_drag: (0.0, 0.0),
            char_drag: None,
            extrude_drag: None,
            dragging_particle: false,
        }
    }
}

pub struct App {
    canvas: Canvas<OpenGl>,
    width: f32,
    height: f32,
    scale: f32,
    theme: Theme,
    rainbow: bool,

    params: TypoParams,
    field: FieldConfig,
    mode: InteractionMode,
    canvas_mode: CanvasMode,
    tool: Tool,
    sim: Simulation,
    audio: AudioInput,

    bank: SnapshotBank,
    sequencer: Sequencer,
    transition: Option<Transition>,

    rng: StdRng,
    started: Instant,
    state: InputState,
}

impl App {
    pub fn new(gl_renderer: OpenGl, width: f32, height: f32, scale: f32) -> Self {
        let mut canvas = Canvas::new(gl_renderer).unwrap_or_else(|err| {
            eprintln!("Failed to create canvas: {err}");
            std::process::exit(1);
        });
        canvas.set_size(width as u32, height as u32, scale);

        let project = persistence::load_project().unwrap_or_default();
        let mut sim = Simulation::new();
        sim.physics = project.physics;

        let sequencer = Sequencer::from_settings(
            project.play_mode,
            project.transition_secs,
            project.hold_secs,
            project.easing,
        );

        Self {
            canvas,
            width,
            height,
            scale,
            theme: Theme::dark(),
            rainbow: false,
            params: project.params,
            field: project.field,
            mode: project.mode,
            canvas_mode: CanvasMode::Edit,
            tool: Tool::Select,
            sim,
            audio: project.audio,
            bank: project.bank,
            sequencer,
            transition: None,
            rng: StdRng::from_entropy(),
            started: Instant::now(),
            state: InputState::new(),
        }
    }

    // =========================================================================
    // Core lifecycle
    // =========================================================================

    pub fn tick(&mut self) -> AppResult {
        let now = Instant::now();

        if let Some(index) = self.sequencer.tick(now, self.bank.len()) {
            if let Some(snapshot) = self.bank.get(index) {
                self.transition = sequencer::restore(
                    snapshot,
                    &mut self.params,
                    &mut self.field,
                    &mut self.sim.physics,
                    &mut self.mode,
                    now,
                    self.sequencer.transition_duration(),
                    self.sequencer.easing,
                );
            }
        }

        if let Some(transition) = &self.transition {
            let (values, done) = transition.sample(now);
            values.write_to(&mut self.params);
            if done {
                self.transition = None;
            }
        }

        self.sync_particles_to_layout();

        let volume = self.audio.volume();
        let max_dim = self.width.max(self.height);
        let input = StepInput {
            pointer: self.state.pointer,
            viewport: (self.width, self.height),
            mode: self.mode,
            field: self.field,
            field_radius: self.field.effective_radius(volume, max_dim),
            field_force: self.field.effective_force(volume),
            volume,
            cell_size: self.params.cell_size,
        };
        self.sim.step(now, &input, &mut self.rng);

        AppResult::Redraw
    }

    pub fn resize(&mut self, width: f32, height: f32, scale: f32) {
        self.width = width;
        self.height = height;
        self.scale = scale;
        self.canvas
            .set_size(width as u32, height as u32, scale);
    }

    pub fn render(&mut self) {
        let layout = self.compose();
        let scene = self.build_scene(&layout);
        renderer::draw_scene(&mut self.canvas, &scene, &self.theme);
        self.canvas.flush();
    }

    fn compose(&self) -> Layout {
        layout::compose(&self.params, self.width, self.height)
    }

    /// Drop particles whose cells vanished and re-home the survivors.
    fn sync_particles_to_layout(&mut self) {
        if self.sim.is_empty() {
            return;
        }
        let layout = self.compose();
        let cells = layout.active_cells(self.params.cell_size);
        let by_id: std::collections::HashMap<_, _> =
            cells.iter().map(|c| (c.id(), (c.x, c.y))).collect();
        self.sim.retain_cells(|id| by_id.contains_key(&id));
        self.sim.rebase_origins(|id| by_id.get(&id).copied());
    }

    fn build_scene(&mut self, layout: &Layout) -> Scene {
        let volume = self.audio.volume();
        let max_dim = self.width.max(self.height);
        let radius = self.field.effective_radius(volume, max_dim);
        let force = self.field.effective_force(volume);
        let snap = match self.mode {
            InteractionMode::Matrix => Some(self.params.cell_size),
            InteractionMode::Organic => None,
        };
        let clock_ms = self.started.elapsed().as_secs_f64() * 1000.0;

        let detached: HashSet<_> = self.sim.particles().iter().map(|p| p.id).collect();

        let mut scene = Scene {
            viewport: (self.width, self.height),
            rainbow: self.rainbow,
            clock_ms,
            ..Scene::default()
        };

        for cell in layout.active_cells(self.params.cell_size) {
            if detached.contains(&cell.id()) {
                continue;
            }
            let transform = if self.field.enabled {
                self.field.distort(
                    cell.center(),
                    self.state.pointer,
                    radius,
                    force,
                    snap,
                    &mut self.rng,
                )
            } else {
                CellTransform::default()
            };
            scene.cells.push(CellDraw {
                x: cell.x,
                y: cell.y,
                size: cell.size,
                transform,
            });
        }

        for ch in &layout.chars {
            if ch.matrix.is_none() {
                scene.placeholders.push((
                    ch.x,
                    ch.y,
                    ch.cols as f32 * self.params.cell_size,
                    ch.rows as f32 * self.params.cell_size,
                ));
            }
        }

        if self.canvas_mode == CanvasMode::Edit {
            for &index in &self.state.selection {
                if let Some(ch) = layout.chars.iter().find(|c| c.index == index) {
                    scene.selections.push((
                        ch.x,
                        ch.y,
                        ch.cols as f32 * self.params.cell_size,
                        ch.rows as f32 * self.params.cell_size,
                    ));
                }
            }

            if self.tool == Tool::Extrude {
                let (px, py) = self.state.pointer;
                if let Some(ch) = layout.char_at(px, py, self.params.cell_size) {
                    scene.grid_overlay = Some(GridOverlay {
                        x: ch.x,
                        y: ch.y,
                        cols: ch.cols,
                        rows: ch.rows,
                        cell: self.params.cell_size,
                    });
                }
            }
        }

        scene.particles = self.sim.render_states(
            self.mode,
            self.params.cell_size,
            self.audio.active,
            volume,
            self.audio.ensemble && self.sequencer.is_playing(),
            clock_ms,
        );

        scene
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    pub fn handle_mouse_move(&mut self, x: f32, y: f32) -> AppResult {
        self.state.pointer = (x, y);
        if self.state.pointer_down {
            return self.drag_at(x, y);
        }
        AppResult::Redraw
    }

    pub fn set_shift(&mut self, down: bool) {
        self.state.shift_down = down;
        if !down {
            self.state.weight_accum = 0.0;
            self.state.height_accum = 0.0;
        }
    }

    pub fn click_at(&mut self, x: f32, y: f32) -> AppResult {
        self.state.pointer = (x, y);
        self.state.pointer_down = true;
        self.state.last_drag = (x, y);
        self.state.weight_accum = 0.0;
        self.state.height_accum = 0.0;

        match self.canvas_mode {
            CanvasMode::Play => self.click_play(x, y),
            CanvasMode::Edit => self.click_edit(x, y),
        }
    }

    fn click_play(&mut self, x: f32, y: f32) -> AppResult {
        if let Some(id) = self.sim.particle_at(x, y) {
            self.sim.begin_drag(id);
            self.state.dragging_particle = true;
            return AppResult::Redraw;
        }

        let layout = self.compose();
        let cells = layout.active_cells(self.params.cell_size);
        if let Some(cell) = cells
            .iter()
            .find(|c| x >= c.x && x < c.x + c.size && y >= c.y && y < c.y + c.size)
        {
            self.sim.detach(cell, self.theme.particle, &mut self.rng);
            return AppResult::Redraw;
        }
        AppResult::Ok
    }

    fn click_edit(&mut self, x: f32, y: f32) -> AppResult {
        let layout = self.compose();
        let Some(ch) = layout.char_at(x, y, self.params.cell_size) else {
            if !self.state.shift_down {
                self.state.selection.clear();
            }
            return AppResult::Redraw;
        };
        let index = ch.index;

        match self.tool {
            Tool::Select => {
                if self.state.shift_down {
                    if let Some(pos) = self.state.selection.iter().position(|&i| i == index) {
                        self.state.selection.remove(pos);
                    } else {
                        self.state.selection.push(index);
                    }
                } else {
                    self.state.selection = vec![index];
                }
            }
            Tool::Move => {
                let pos = self.params.position(index);
                self.state.char_drag = Some(CharDrag {
                    index,
                    start: (x, y),
                    origin: (pos.x, pos.y),
                });
            }
            Tool::Extrude => {
                // Freeze the glyph as rendered, then edit the literal matrix
                if !self.params.has_frozen_matrix(index) {
                    if let Some((matrix, _)) = glyph::resolve(ch.ch, index, &self.params) {
                        self.params.freeze_matrix(index, matrix);
                    } else {
                        return AppResult::Ok;
                    }
                }
                let cell = self.params.cell_size;
                let col = (((x - ch.x) / cell).floor().max(0.0)) as usize;
                let row = (((y - ch.y) / cell).floor().max(0.0)) as usize;
                self.state.extrude_drag = Some(ExtrudeDrag {
                    index,
                    row,
                    col,
                    start: (x, y),
                    applied_cols: 0,
                    applied_rows: 0,
                });
            }
        }
        AppResult::Redraw
    }

    pub fn drag_at(&mut self, x: f32, y: f32) -> AppResult {
        let (lx, ly) = self.state.last_drag;
        let (dx, dy) = (x - lx, y - ly);
        self.state.last_drag = (x, y);
        self.state.pointer = (x, y);

        if self.state.dragging_particle {
            // Simulation pulls the particle toward the live pointer
            return AppResult::Redraw;
        }

        if self.state.shift_down && self.canvas_mode == CanvasMode::Edit {
            self.shift_drag_modifiers(dx, dy);
            return AppResult::Redraw;
        }

        if let Some(drag) = &self.state.char_drag {
            let cell = self.params.cell_size;
            let gx = drag.origin.0 + (x - drag.start.0) / cell;
            let gy = drag.origin.1 + (y - drag.start.1) / cell;
            let index = drag.index;
            match self.mode {
                InteractionMode::Matrix => self.params.set_position(index, gx.round(), gy.round()),
                InteractionMode::Organic => self.params.set_position(index, gx, gy),
            }
            return AppResult::Redraw;
        }

        if self.state.extrude_drag.is_some() {
            self.extrude_drag_to(x, y);
            return AppResult::Redraw;
        }

        AppResult::Ok
    }

    /// Shift-drag: every threshold of accumulated travel steps the weight
    /// (horizontal) or height (vertical) by one.
    fn shift_drag_modifiers(&mut self, dx: f32, dy: f32) {
        self.state.weight_accum += dx;
        self.state.height_accum += dy;

        let mut weight_steps = 0.0;
        while self.state.weight_accum >= interaction::WEIGHT_DRAG_THRESHOLD {
            weight_steps += 1.0;
            self.state.weight_accum -= interaction::WEIGHT_DRAG_THRESHOLD;
        }
        while self.state.weight_accum <= -interaction::WEIGHT_DRAG_THRESHOLD {
            weight_steps -= 1.0;
            self.state.weight_accum += interaction::WEIGHT_DRAG_THRESHOLD;
        }

        let mut height_steps = 0.0;
        while self.state.height_accum >= interaction::HEIGHT_DRAG_THRESHOLD {
            height_steps += 1.0;
            self.state.height_accum -= interaction::HEIGHT_DRAG_THRESHOLD;
        }
        while self.state.height_accum <= -interaction::HEIGHT_DRAG_THRESHOLD {
            height_steps -= 1.0;
            self.state.height_accum += interaction::HEIGHT_DRAG_THRESHOLD;
        }

        if weight_steps != 0.0 {
            if self.state.selection.is_empty() {
                self.params.nudge_global_weight(weight_steps);
            } else {
                let indices = self.state.selection.clone();
                let base = self.params.effective_weight(indices[0]);
                self.params
                    .set_weight_for(&indices, glyph::clamp_weight(base + weight_steps));
            }
        }
        if height_steps != 0.0 {
            if self.state.selection.is_empty() {
                self.params.nudge_global_height(height_steps);
            } else {
                let indices = self.state.selection.clone();
                let base = self.params.effective_height(indices[0]);
                self.params
                    .set_height_for(&indices, glyph::clamp_height(base + height_steps));
            }
        }
    }

    fn extrude_drag_to(&mut self, x: f32, y: f32) {
        let Some(drag) = &self.state.extrude_drag else {
            return;
        };
        let threshold = self.params.cell_size * interaction::EXTRUDE_THRESHOLD_CELLS;
        let dx = x - drag.start.0;
        let dy = y - drag.start.1;

        // Dominant axis decides between column and row edits
        let (index, row, col) = (drag.index, drag.row, drag.col);
        if dx.abs() >= dy.abs() {
            let want = (dx / threshold).trunc() as i32;
            let applied = drag.applied_cols;
            if want > applied {
                for _ in applied..want {
                    self.params.extrude_insert_column(index, col);
                }
            } else if want < applied {
                for _ in want..applied {
                    self.params.extrude_delete_column(index, col);
                }
            }
            if let Some(drag) = &mut self.state.extrude_drag {
                drag.applied_cols = want;
            }
        } else {
            let want = (dy / threshold).trunc() as i32;
            let applied = drag.applied_rows;
            if want > applied {
                for _ in applied..want {
                    self.params.extrude_insert_row(index, row, col);
                }
            } else if want < applied {
                for _ in want..applied {
                    self.params.extrude_delete_row(index, row);
                }
            }
            if let Some(drag) = &mut self.state.extrude_drag {
                drag.applied_rows = want;
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.state.pointer_down = false;
        self.state.char_drag = None;
        self.state.extrude_drag = None;
        if self.state.dragging_particle {
            self.sim.end_drag();
            self.state.dragging_particle = false;
        }
        self.state.weight_accum = 0.0;
        self.state.height_accum = 0.0;
    }

    // =========================================================================
    // Text input
    // =========================================================================

    pub fn handle_char(&mut self, ch: char) -> AppResult {
        if self.canvas_mode != CanvasMode::Edit {
            return AppResult::Ok;
        }
        if ch.is_control() {
            return AppResult::Ok;
        }
        self.params.push_char(ch);
        AppResult::Redraw
    }

    pub fn handle_return(&mut self) -> AppResult {
        if self.canvas_mode != CanvasMode::Edit {
            return AppResult::Ok;
        }
        self.params.push_char('\n');
        AppResult::Redraw
    }

    pub fn handle_backspace(&mut self) -> AppResult {
        if self.canvas_mode != CanvasMode::Edit {
            return AppResult::Ok;
        }
        self.params.backspace();
        self.state.selection.clear();
        AppResult::Redraw
    }

    // =========================================================================
    // Commands
    // =========================================================================

    pub fn toggle_canvas_mode(&mut self) -> AppResult {
        self.canvas_mode = match self.canvas_mode {
            CanvasMode::Edit => {
                // Entering play cancels sequenced playback
                self.sequencer.stop();
                self.transition = None;
                CanvasMode::Play
            }
            CanvasMode::Play => CanvasMode::Edit,
        };
        self.state.selection.clear();
        AppResult::Redraw
    }

    pub fn cycle_tool(&mut self) -> AppResult {
        self.tool = match self.tool {
            Tool::Select => Tool::Move,
            Tool::Move => Tool::Extrude,
            Tool::Extrude => Tool::Select,
        };
        AppResult::Redraw
    }

    pub fn toggle_field(&mut self) -> AppResult {
        self.field.enabled = !self.field.enabled;
        AppResult::Redraw
    }

    pub fn toggle_interaction_mode(&mut self) -> AppResult {
        self.mode = match self.mode {
            InteractionMode::Organic => InteractionMode::Matrix,
            InteractionMode::Matrix => InteractionMode::Organic,
        };
        AppResult::Redraw
    }

    pub fn toggle_mic(&mut self) -> AppResult {
        self.audio.toggle();
        AppResult::Redraw
    }

    pub fn toggle_rainbow(&mut self) -> AppResult {
        self.rainbow = !self.rainbow;
        AppResult::Redraw
    }

    pub fn toggle_theme(&mut self) -> AppResult {
        self.theme = if self.theme.bg.0 < 0.5 {
            Theme::light()
        } else {
            Theme::dark()
        };
        AppResult::Redraw
    }

    pub fn feed_audio(&mut self, amplitude: f32) {
        self.audio.feed(amplitude);
    }

    pub fn cycle_align(&mut self) -> AppResult {
        self.params.align = match self.params.align {
            TextAlign::Left => TextAlign::Center,
            TextAlign::Center => TextAlign::Right,
            TextAlign::Right => TextAlign::Left,
        };
        AppResult::Redraw
    }

    pub fn cycle_valign(&mut self) -> AppResult {
        self.params.valign = match self.params.valign {
            VerticalAlign::Top => VerticalAlign::Center,
            VerticalAlign::Center => VerticalAlign::Bottom,
            VerticalAlign::Bottom => VerticalAlign::Top,
        };
        AppResult::Redraw
    }

    pub fn adjust_cell_size(&mut self, delta: f32) -> AppResult {
        self.params.set_cell_size(self.params.cell_size + delta);
        AppResult::Redraw
    }

    pub fn adjust_line_spacing(&mut self, delta: f32) -> AppResult {
        self.params.set_line_spacing(self.params.line_spacing + delta);
        AppResult::Redraw
    }

    pub fn select_all(&mut self) -> AppResult {
        self.state.selection = self
            .params
            .text
            .chars()
            .enumerate()
            .filter(|&(_, c)| c != ' ' && c != '\n' && c != layout::LINE_BREAK)
            .map(|(i, _)| i)
            .collect();
        AppResult::Redraw
    }

    pub fn return_particles(&mut self) -> AppResult {
        self.sim.return_all();
        AppResult::Redraw
    }

    /// Full reset: particles fly home, then everything clears after a grace
    /// period; typography goes back to defaults immediately.
    pub fn reset_canvas(&mut self) -> AppResult {
        self.sim.reset(Instant::now());
        self.params.clear_positions();
        self.params.clear_overrides();
        self.params.set_global_weight(0.0);
        self.params.set_global_height(0.0);
        self.state.selection.clear();
        AppResult::Redraw
    }

    // =========================================================================
    // Snapshots and sequencing
    // =========================================================================

    pub fn capture_snapshot(&mut self) -> AppResult {
        let name = format!("state {}", self.bank.len() + 1);
        self.bank.capture(
            name,
            &self.params,
            &self.field,
            &self.sim.physics,
            self.mode,
        );
        AppResult::Redraw
    }

    pub fn restore_snapshot(&mut self, index: usize) -> AppResult {
        let Some(snapshot) = self.bank.get(index) else {
            return AppResult::Ok;
        };
        self.transition = sequencer::restore(
            snapshot,
            &mut self.params,
            &mut self.field,
            &mut self.sim.physics,
            &mut self.mode,
            Instant::now(),
            self.sequencer.transition_duration(),
            self.sequencer.easing,
        );
        AppResult::Redraw
    }

    pub fn toggle_sequence(&mut self) -> AppResult {
        if self.canvas_mode == CanvasMode::Play {
            return AppResult::Ok;
        }
        if self.sequencer.is_playing() {
            self.sequencer.stop();
            self.transition = None;
        } else if !self.bank.is_empty() {
            self.sequencer.play(Instant::now());
        }
        AppResult::Redraw
    }

    pub fn delete_last_snapshot(&mut self) -> AppResult {
        if self.bank.is_empty() {
            return AppResult::Ok;
        }
        self.bank.delete(self.bank.len() - 1);
        AppResult::Redraw
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    pub fn save(&self) {
        let state = ProjectState {
            params: self.params.clone(),
            field: self.field,
            physics: self.sim.physics,
            mode: self.mode,
            audio: self.audio,
            bank: self.bank.clone(),
            play_mode: self.sequencer.mode,
            transition_secs: self.sequencer.transition_secs,
            hold_secs: self.sequencer.hold_secs,
            easing: self.sequencer.easing,
        };
        if let Err(err) = persistence::save_project(&state) {
            eprintln!("Failed to save project: {err}");
        }
    }
}
