//! Canvas rendering
//!
//! Draws one fully-described frame: anchored cells with their field
//! transforms, free particles, placeholder outlines, selection boxes, and
//! the extrude grid overlay. The app assembles a `Scene` each frame; nothing
//! here mutates state.

use crate::field::CellTransform;
use crate::simulation::ParticleRender;
use crate::theme::Theme;
use femtovg::{Canvas, Color, Paint, Path, renderer::OpenGl};

/// One anchored cell, field transform already resolved.
#[derive(Debug, Clone, Copy)]
pub struct CellDraw {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub transform: CellTransform,
}

/// An axis-aligned outline rectangle (placeholders, selections).
pub type OutlineRect = (f32, f32, f32, f32);

/// Cell grid overlay shown while the extrude tool hovers a glyph.
#[derive(Debug, Clone, Copy)]
pub struct GridOverlay {
    pub x: f32,
    pub y: f32,
    pub cols: usize,
    pub rows: usize,
    pub cell: f32,
}

#[derive(Default)]
pub struct Scene {
    pub viewport: (f32, f32),
    pub cells: Vec<CellDraw>,
    pub particles: Vec<ParticleRender>,
    pub placeholders: Vec<OutlineRect>,
    pub selections: Vec<OutlineRect>,
    pub grid_overlay: Option<GridOverlay>,
    pub rainbow: bool,
    /// Animation clock in milliseconds, drives the rainbow hue
    pub clock_ms: f64,
}

fn color_of((r, g, b): (f32, f32, f32)) -> Color {
    Color::rgbf(r, g, b)
}

pub fn draw_scene(canvas: &mut Canvas<OpenGl>, scene: &Scene, theme: &Theme) {
    let (vw, vh) = scene.viewport;
    canvas.clear_rect(0, 0, vw as u32, vh as u32, color_of(theme.bg));

    draw_cells(canvas, scene, theme);
    draw_placeholders(canvas, scene, theme);
    draw_particles(canvas, scene, theme);
    draw_selections(canvas, scene, theme);
    if let Some(overlay) = &scene.grid_overlay {
        draw_grid_overlay(canvas, overlay, theme);
    }
}

fn draw_cells(canvas: &mut Canvas<OpenGl>, scene: &Scene, theme: &Theme) {
    let paint = Paint::color(color_of(theme.cell));

    for cell in &scene.cells {
        let t = cell.transform;
        if t.rot_deg == 0.0 {
            let mut path = Path::new();
            path.rect(cell.x + t.tx, cell.y + t.ty, cell.size, cell.size);
            canvas.fill_path(&path, &paint);
            continue;
        }

        // Rotate around the displaced cell center
        canvas.save();
        let cx = cell.x + t.tx + cell.size * 0.5;
        let cy = cell.y + t.ty + cell.size * 0.5;
        canvas.translate(cx, cy);
        canvas.rotate(t.rot_deg.to_radians());
        let mut path = Path::new();
        path.rect(-cell.size * 0.5, -cell.size * 0.5, cell.size, cell.size);
        canvas.fill_path(&path, &paint);
        canvas.restore();
    }
}

fn draw_particles(canvas: &mut Canvas<OpenGl>, scene: &Scene, theme: &Theme) {
    for p in &scene.particles {
        let paint = if p.at_home {
            Paint::color(color_of(theme.cell))
        } else if scene.rainbow {
            let hue = ((scene.clock_ms * 0.2) as f32 + (p.x + p.y) * 0.5) % 360.0;
            Paint::color(Color::hsl(hue / 360.0, 1.0, 0.5))
        } else {
            Paint::color(color_of(p.color))
        };

        canvas.save();
        let half = p.size * 0.5;
        canvas.translate(p.x + half, p.y + half);
        if p.rot_deg != 0.0 {
            canvas.rotate(p.rot_deg.to_radians());
        }
        if p.scale != 1.0 {
            canvas.scale(p.scale, p.scale);
        }
        let mut path = Path::new();
        path.rect(-half, -half, p.size, p.size);
        canvas.fill_path(&path, &paint);
        canvas.restore();
    }
}

fn draw_placeholders(canvas: &mut Canvas<OpenGl>, scene: &Scene, theme: &Theme) {
    let mut paint = Paint::color(color_of(theme.placeholder));
    paint.set_line_width(1.0);

    for &(x, y, w, h) in &scene.placeholders {
        let mut path = Path::new();
        path.rect(x, y, w, h);
        canvas.stroke_path(&path, &paint);
    }
}

fn draw_selections(canvas: &mut Canvas<OpenGl>, scene: &Scene, theme: &Theme) {
    let mut paint = Paint::color(color_of(theme.selection));
    paint.set_line_width(2.0);

    for &(x, y, w, h) in &scene.selections {
        let mut path = Path::new();
        path.rect(x - 2.0, y - 2.0, w + 4.0, h + 4.0);
        canvas.stroke_path(&path, &paint);
    }
}

fn draw_grid_overlay(canvas: &mut Canvas<OpenGl>, overlay: &GridOverlay, theme: &Theme) {
    let mut paint = Paint::color(color_of(theme.grid));
    paint.set_line_width(1.0);

    let w = overlay.cols as f32 * overlay.cell;
    let h = overlay.rows as f32 * overlay.cell;

    let mut path = Path::new();
    for c in 0..=overlay.cols {
        let x = overlay.x + c as f32 * overlay.cell;
        path.move_to(x, overlay.y);
        path.line_to(x, overlay.y + h);
    }
    for r in 0..=overlay.rows {
        let y = overlay.y + r as f32 * overlay.cell;
        path.move_to(overlay.x, y);
        path.line_to(overlay.x + w, y);
    }
    canvas.stroke_path(&path, &paint);
}
