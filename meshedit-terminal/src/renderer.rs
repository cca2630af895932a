/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use meshedit_core::{silhouette, Camera, Editor, Mesh, Transformable, Triangle, Viewport};
use nalgebra::{Point3, Vector3};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

const OUTLINE_CHAR: char = '#';
const VERTEX_CHAR: char = 'o';
const LIGHT_CHAR: char = '*';

/// Screen position plus depth of a projected corner
type ScreenPoint = (f32, f32, f32);

/// ASCII renderer that converts the editor's scene to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::White; size],
        }
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::White);
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.width as u32, self.height as u32)
    }

    /// Draw every object, then outlines and the selected vertices on top
    pub fn render_editor(&mut self, editor: &Editor) {
        let camera = &editor.context().camera;
        let selection = editor.selection();

        for (id, object) in editor.scene().iter() {
            let tint = if selection.is_selected(id) { Some(Color::Yellow) } else { None };
            match object.as_mesh() {
                Some(mesh) => self.render_mesh(mesh, camera, tint),
                None => {
                    for triangle in object.bounding_proxy() {
                        self.fill_flat(triangle, camera, LIGHT_CHAR, tint.unwrap_or(Color::Magenta));
                    }
                }
            }
        }

        for (id, object) in editor.scene().iter() {
            if let Some(mesh) = object.as_mesh() {
                let color = if selection.is_selected(id) { Color::Yellow } else { Color::Cyan };
                self.render_outline(mesh, camera, color);
            }
        }

        for vertex in selection.vertices() {
            if let Some((x, y, _)) = self.project(camera, &vertex.position) {
                self.plot(x, y, VERTEX_CHAR, Color::Red);
            }
        }
    }

    pub fn render_mesh(&mut self, mesh: &Mesh, camera: &Camera, tint: Option<Color>) {
        for (face, triangle) in mesh.triangles().iter().enumerate() {
            let brightness = [0, 1, 2].map(|corner| {
                let normal = mesh.shading_normal(face, corner);
                lambert(&normal, &triangle.corners()[corner], &camera.position)
            });
            self.render_triangle(triangle, camera, brightness, tint);
        }
    }

    /// Silhouette edges as lines, drawn over the shaded faces
    pub fn render_outline(&mut self, mesh: &Mesh, camera: &Camera, color: Color) {
        for edge in silhouette::silhouette_edges(mesh, &camera.position) {
            let (a, b) = edge.vertices();
            let vertices = mesh.vertices();
            let (Some(start), Some(end)) = (
                self.project(camera, &vertices[a as usize].position),
                self.project(camera, &vertices[b as usize].position),
            ) else {
                continue;
            };
            self.draw_line(start, end, OUTLINE_CHAR, color);
        }
    }

    fn project(&self, camera: &Camera, point: &Point3<f32>) -> Option<ScreenPoint> {
        camera
            .project_to_screen(point, &self.viewport())
            .map(|screen| (screen.x, screen.y, screen.z))
    }

    fn project_triangle(&self, triangle: &Triangle, camera: &Camera) -> Option<[ScreenPoint; 3]> {
        let [a, b, c] = triangle.corners();
        Some([
            self.project(camera, a)?,
            self.project(camera, b)?,
            self.project(camera, c)?,
        ])
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        camera: &Camera,
        brightness: [f32; 3],
        tint: Option<Color>,
    ) {
        if triangle.is_degenerate() {
            return;
        }
        // Triangle is clipped
        let Some(coords) = self.project_triangle(triangle, camera) else {
            return;
        };

        self.rasterize_triangle(&coords, |w0, w1, w2| {
            let shade = w0 * brightness[0] + w1 * brightness[1] + w2 * brightness[2];
            let character = ramp(shade);
            (character, tint.unwrap_or_else(|| shade_color(character)))
        });
    }

    fn fill_flat(&mut self, triangle: &Triangle, camera: &Camera, character: char, color: Color) {
        if let Some(coords) = self.project_triangle(triangle, camera) {
            self.rasterize_triangle(&coords, |_, _, _| (character, color));
        }
    }

    fn rasterize_triangle<F>(&mut self, coords: &[ScreenPoint; 3], shade: F)
    where
        F: Fn(f32, f32, f32) -> (char, Color),
    {
        let [v0, v1, v2] = *coords;

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

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            let (character, color) = shade(w0, w1, w2);
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = character;
                            self.color_buffer[idx] = color;
                        }
                    }
                }
            }
        }
    }

    fn draw_line(&mut self, start: ScreenPoint, end: ScreenPoint, character: char, color: Color) {
        let (dx, dy) = (end.0 - start.0, end.1 - start.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            self.plot(start.0 + dx * t, start.1 + dy * t, character, color);
        }
    }

    fn plot(&mut self, x: f32, y: f32, character: char, color: Color) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        self.char_buffer[idx] = character;
        self.color_buffer[idx] = color;
    }

    /// Character at a cell, for inspection
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Diffuse term for a headlight sitting at the camera
fn lambert(normal: &Vector3<f32>, point: &Point3<f32>, eye: &Point3<f32>) -> f32 {
    let to_eye = (eye - point).try_normalize(1e-6).unwrap_or_else(Vector3::z);
    normal.dot(&to_eye).max(0.0)
}

fn ramp(brightness: f32) -> char {
    let char_index = (brightness.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
    LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)]
}

// Color based on character intensity
fn shade_color(character: char) -> Color {
    match character {
        ' ' | '.' | ':' => Color::DarkGrey,
        '-' | '=' => Color::Grey,
        '+' | '*' => Color::White,
        '#' | '%' | '@' => Color::Cyan,
        _ => Color::White,
    }
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
