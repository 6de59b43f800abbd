//! Terminal camera
//!
//! Maps world cells to character cells of the map pane. Zoom works by
//! sampling stride: at stride 2 every screen cell shows one of every
//! two world cells, so twice the area fits in the same pane.

use crate::core::types::{Cell, Vec2};

const STRIDES: [i32; 3] = [1, 2, 4];

pub struct Camera {
    /// World position at the centre of the pane
    pub center: Vec2,
    /// Index into the stride table
    zoom_idx: usize,
    /// True once the user panned manually; following resumes on refocus
    pub manual: bool,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            center: Vec2::default(),
            zoom_idx: 0,
            manual: false,
        }
    }

    pub fn stride(&self) -> i32 {
        STRIDES[self.zoom_idx]
    }

    pub fn zoom_out(&mut self) {
        if self.zoom_idx + 1 < STRIDES.len() {
            self.zoom_idx += 1;
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom_idx = self.zoom_idx.saturating_sub(1);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.center.x += dx * self.stride() as f32;
        self.center.y += dy * self.stride() as f32;
        self.manual = true;
    }

    pub fn follow(&mut self, pos: Vec2) {
        self.center = pos;
        self.manual = false;
    }

    /// World cell shown at a given pane coordinate
    pub fn cell_at(&self, col: u16, row: u16, width: u16, height: u16) -> Cell {
        let stride = self.stride();
        let cam = self.center.cell();
        (
            cam.0 + (col as i32 - width as i32 / 2) * stride,
            cam.1 + (row as i32 - height as i32 / 2) * stride,
        )
    }

    /// Pane coordinate of a world position, if visible
    pub fn project(&self, pos: Vec2, width: u16, height: u16) -> Option<(u16, u16)> {
        let stride = self.stride();
        let cam = self.center.cell();
        let cell = pos.cell();
        let col = (cell.0 - cam.0) / stride + width as i32 / 2;
        let row = (cell.1 - cam.1) / stride + height as i32 / 2;
        if col >= 0 && col < width as i32 && row >= 0 && row < height as i32 {
            Some((col as u16, row as u16))
        } else {
            None
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_projects_to_middle() {
        let cam = Camera::new();
        assert_eq!(cam.project(Vec2::new(0.5, 0.5), 80, 40), Some((40, 20)));
    }

    #[test]
    fn test_cell_at_inverts_project() {
        let mut cam = Camera::new();
        cam.follow(Vec2::new(12.5, -3.5));
        let (col, row) = cam.project(Vec2::new(15.5, -1.5), 60, 30).expect("visible");
        assert_eq!(cam.cell_at(col, row, 60, 30), (15, -1));
    }

    #[test]
    fn test_offscreen_is_none() {
        let cam = Camera::new();
        assert_eq!(cam.project(Vec2::new(500.0, 0.0), 80, 40), None);
    }

    #[test]
    fn test_zoom_bounds() {
        let mut cam = Camera::new();
        for _ in 0..10 {
            cam.zoom_out();
        }
        assert_eq!(cam.stride(), 4);
        for _ in 0..10 {
            cam.zoom_in();
        }
        assert_eq!(cam.stride(), 1);
    }
}
