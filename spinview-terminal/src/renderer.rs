/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use spinview_core::{PointerPosition, ProjectedTriangle};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide. The stage works
/// in half-cell units vertically so the model keeps its proportions.
pub const CELL_ASPECT: f32 = 2.0;

/// Stage-space pointer position at the center of a terminal cell
pub fn cell_to_pointer(column: u16, row: u16) -> PointerPosition {
    PointerPosition::new(column as f32 + 0.5, (row as f32 + 0.5) * CELL_ASPECT)
}

/// Stage viewport size for a terminal of the given cell size
pub fn stage_size(columns: u16, rows: u16) -> (u32, u32) {
    (columns as u32, (rows as f32 * CELL_ASPECT) as u32)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    color: [u8; 3],
}

/// ASCII renderer that turns projected triangles into terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Option<Cell>>,
    background: [u8; 3],
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize, background: [u8; 3]) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![None; size],
            background,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height, self.background);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(None);
    }

    pub fn render(&mut self, triangles: &[ProjectedTriangle]) {
        for triangle in triangles {
            self.rasterize_triangle(triangle);
        }
    }

    fn rasterize_triangle(&mut self, triangle: &ProjectedTriangle) {
        let [v0, v1, v2] = triangle
            .points
            .map(|(x, y)| (x, y / CELL_ASPECT));
        let cell = Cell {
            character: shade_character(triangle.shade),
            color: triangle.shaded_color(),
        };

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric(v0, v1, v2, (px, py)) else {
                    continue;
                };
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    let idx = y as usize * self.width + x as usize;
                    if triangle.depth < self.depth_buffer[idx] {
                        self.depth_buffer[idx] = triangle.depth;
                        self.cells[idx] = Some(cell);
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let [r, g, b] = self.background;
        writer.queue(SetBackgroundColor(Color::Rgb { r, g, b }))?;
        for y in 0..self.height {
            for x in 0..self.width {
                match self.cells[y * self.width + x] {
                    Some(Cell { character, color: [r, g, b] }) => {
                        writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                        writer.queue(Print(character))?;
                    }
                    None => {
                        writer.queue(Print(' '))?;
                    }
                }
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    #[cfg(test)]
    fn character_at(&self, x: usize, y: usize) -> Option<char> {
        self.cells[y * self.width + x].map(|cell| cell.character)
    }
}

fn shade_character(shade: f32) -> char {
    let index = (shade.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_half(depth: f32, shade: f32) -> ProjectedTriangle {
        // Covers the top-left half of a 10x10 cell area (y in stage units)
        ProjectedTriangle {
            points: [(0.0, 0.0), (10.0, 0.0), (0.0, 20.0)],
            depth,
            shade,
            color: [255, 255, 255],
        }
    }

    #[test]
    fn test_triangle_fills_cells() {
        let mut renderer = AsciiRenderer::new(10, 10, [0, 0, 0]);
        renderer.render(&[quad_half(0.5, 1.0)]);
        assert_eq!(renderer.character_at(1, 1), Some('@'));
        assert_eq!(renderer.character_at(9, 9), None);
    }

    #[test]
    fn test_nearer_triangle_wins() {
        let mut renderer = AsciiRenderer::new(10, 10, [0, 0, 0]);
        renderer.render(&[quad_half(0.2, 1.0), quad_half(0.8, 0.0)]);
        assert_eq!(renderer.character_at(1, 1), Some('@'));

        renderer.clear();
        assert_eq!(renderer.character_at(1, 1), None);
    }

    #[test]
    fn test_cell_mapping_uses_half_cells() {
        assert_eq!(cell_to_pointer(3, 4), PointerPosition::new(3.5, 9.0));
        assert_eq!(stage_size(80, 24), (80, 48));
    }

    #[test]
    fn test_shade_ramp_ends() {
        assert_eq!(shade_character(0.0), '.');
        assert_eq!(shade_character(1.0), '@');
        assert_eq!(shade_character(7.0), '@');
    }
}
