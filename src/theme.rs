//! Canvas and particle colors

pub struct Theme {
    /// Canvas background color (RGB 0.0-1.0)
    pub bg: (f32, f32, f32),
    /// Anchored cell color
    pub cell: (f32, f32, f32),
    /// Detached particle color
    pub particle: (f32, f32, f32),
    /// Selection outline color
    pub selection: (f32, f32, f32),
    /// Placeholder outline for unresolved characters
    pub placeholder: (f32, f32, f32),
    /// Alignment grid lines
    pub grid: (f32, f32, f32),
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg: (0.0, 0.0, 0.0),          // Pure black
            cell: (1.0, 1.0, 1.0),        // White pixels
            particle: (0.0, 0.08, 1.0),   // #0015FF detach blue
            selection: (1.0, 1.0, 1.0),   // Outline in cell color
            placeholder: (0.5, 0.5, 0.5), // Dashed grey box
            grid: (0.2, 0.2, 0.2),        // #333 grid lines
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bg: (0.98, 0.98, 0.98),
            cell: (0.05, 0.05, 0.05),
            particle: (0.0, 0.08, 1.0),
            selection: (0.05, 0.05, 0.05),
            placeholder: (0.6, 0.6, 0.6),
            grid: (0.85, 0.85, 0.85),
        }
    }
}
