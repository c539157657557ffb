//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┬──────────────┐
//! │                                              │  VISITORS    │
//! │  gallery seen through the camera             │  (skeletons) │
//! │  [pic] [pic] [pic] ...                       │              │
//! │                                              ├──────────────┤
//! │  blur / vignette / overlays                  │  FLOOR MAP   │
//! │                                              │  (top-down)  │
//! ├──────────────────────────────────────────────┴──────────────┤
//! │  status bar                                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The camera is a pinhole at `(camera_x, 0, camera_z)` looking down +Z at
//! the picture plane; pitch shifts the image vertically.  Depth of field is
//! approximated by washing colors toward gray as the aperture closes.

use std::sync::mpsc::Sender;

use glam::{Vec2, Vec3};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use gallery_core::body::SkeletonView;
use gallery_core::config::{BlurLaw, ViewingVolume};
use gallery_core::control::ControlOutput;

use crate::simulator::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:      usize = 1000;
pub const WIN_H:      usize = 560;
const VIEW_W:         usize = 720;
const VIEW_H:         usize = 480;
const PANEL_X:        usize = VIEW_W;
const PANEL_W:        usize = WIN_W - VIEW_W;
const SKELETON_H:     usize = 240;
const MAP_Y:          usize = SKELETON_H;
const MAP_H:          usize = VIEW_H - SKELETON_H;
const STATUS_Y:       usize = VIEW_H;
/// Pixels per scene unit at unit depth.
const FOCAL:          f32   = 300.0;
/// Picture size in scene units.
const PICTURE_W:      f32   = 16.0;
const PICTURE_H:      f32   = 10.0;
const WALL_COLOR:     u32   = 0xFF1A1A2E;
const PANEL_BG:       u32   = 0xFF16213E;
const TEXT_BG:        u32   = 0xFF0F3460;
const LIGHT_COLOR:    u32   = 0xFFFFD700;  // accent light, gold
const VOLUME_COLOR:   u32   = 0xFF3E5F8A;
const MARGIN_COLOR:   u32   = 0xFF8A3E3E;
const HEAD_COLOR:     u32   = 0xFFFFFFFF;

/// Everything drawn in one frame.
pub struct Scene<'a> {
    pub output:     &'a ControlOutput,
    pub blur:       &'a BlurLaw,
    pub volume:     &'a ViewingVolume,
    /// Gallery position and slot offsets, scene units.
    pub gallery:    Vec3,
    pub slots:      &'a [Vec3],
    pub active:     usize,
    pub lights:     &'a [bool],
    pub skeletons:  Vec<&'a SkeletonView>,
    /// Controlling visitor's floor position (x, sensor Z), if known.
    pub visitor:    Option<Vec2>,
    pub status:     &'a str,
    pub mode:       &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    sim_tx: Sender<SimInput>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>, fps: u32) -> Result<Self, String> {
        let mut window = Window::new(
            "Zoom Walk — body-tracked gallery",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        let frame_ms = 1000 / u64::from(fps.max(1));
        window.limit_update_rate(Some(std::time::Duration::from_millis(frame_ms)));

        Ok(Visualizer {
            window,
            buf: vec![WALL_COLOR; WIN_W * WIN_H],
            sim_tx,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard inputs and translate to SimInput events.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let held    = |k: Key| self.window.is_key_down(k);

        if pressed(Key::Q) || pressed(Key::Escape) {
            let _ = self.sim_tx.send(SimInput::Pressed(SimKey::Quit));
            return false;
        }

        let one_shots = [
            (Key::Left,  SimKey::PrevPicture),
            (Key::Right, SimKey::NextPicture),
            (Key::V,     SimKey::SecondVisitor),
            (Key::M,     SimKey::ToggleMode),
        ];
        for (key, sim) in one_shots {
            if pressed(key) {
                let _ = self.sim_tx.send(SimInput::Pressed(sim));
            }
        }

        let holds = [
            (Key::W, SimKey::Forward),
            (Key::S, SimKey::Back),
            (Key::A, SimKey::StepLeft),
            (Key::D, SimKey::StepRight),
            (Key::J, SimKey::LeftArm),
            (Key::L, SimKey::RightArm),
            (Key::I, SimKey::LeanForward),
            (Key::K, SimKey::LeanBack),
        ];
        for (key, sim) in holds {
            if held(key) {
                let _ = self.sim_tx.send(SimInput::Held(sim));
            }
        }

        true
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &Scene) {
        self.buf.fill(WALL_COLOR);

        // ── Gallery through the camera ────────────────────────────────────
        for (i, offset) in scene.slots.iter().enumerate() {
            let lit = scene.lights.get(i).copied().unwrap_or(false);
            self.draw_picture(scene.gallery + *offset, i, scene.slots.len(), lit, scene.output);
        }
        self.apply_lens(scene.output, scene.blur);

        // ── Overlays ──────────────────────────────────────────────────────
        if scene.output.out_of_range_opacity > 0 {
            let alpha = f32::from(scene.output.out_of_range_opacity) / 255.0;
            self.draw_overlay("OUT OF RANGE", VIEW_H / 2 - 20, alpha);
        }
        if scene.output.crowd_opacity > 0 {
            let alpha = f32::from(scene.output.crowd_opacity) / 255.0;
            self.draw_overlay("ONE VISITOR AT A TIME", VIEW_H / 2 + 20, alpha);
        }

        // ── Side panel ────────────────────────────────────────────────────
        self.fill_rect(PANEL_X, 0, PANEL_W, VIEW_H, PANEL_BG);
        self.draw_label("VISITORS", PANEL_X + 10, 8, LIGHT_COLOR);
        for skeleton in &scene.skeletons {
            self.draw_skeleton(skeleton);
        }
        self.draw_floor_map(scene.volume, scene.visitor);

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        let header = format!(
            "mode: {}  picture {}/{}  cam x={:.1} z={:.1} pitch={:.1}  aperture={:.1}",
            scene.mode,
            scene.active + 1,
            scene.slots.len(),
            scene.output.camera_x,
            scene.output.camera_z,
            scene.output.pitch_deg,
            scene.output.aperture,
        );
        self.draw_label(&header, 10, STATUS_Y + 10, 0xFFAADDFF);
        self.draw_label(scene.status, 10, STATUS_Y + 30, 0xFFEEEEEE);
        self.draw_label(
            "W/S=walk  A/D=step  arrows=picture  J/L=arm  I/K=lean  V=visitor  M=mode  Q=quit",
            10, WIN_H - 16, 0xFF888888,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Gallery ───────────────────────────────────────────────────────────

    fn draw_picture(&mut self, center: Vec3, index: usize, count: usize, lit: bool, out: &ControlOutput) {
        let depth = center.z - out.camera_z;
        if depth <= 0.1 { return; }
        let scale = FOCAL / depth;
        let pitch_shift = out.pitch_deg.to_radians().tan() * FOCAL;

        let cx = VIEW_W as f32 / 2.0 + (center.x - out.camera_x) * scale;
        let cy = VIEW_H as f32 / 2.0 - center.y * scale + pitch_shift;
        let half_w = PICTURE_W * scale / 2.0;
        let half_h = PICTURE_H * scale / 2.0;

        let x0 = (cx - half_w).max(0.0) as usize;
        let x1 = (cx + half_w).clamp(0.0, VIEW_W as f32) as usize;
        let y0 = (cy - half_h).max(0.0) as usize;
        let y1 = (cy + half_h).clamp(0.0, VIEW_H as f32) as usize;
        if x0 >= x1 || y0 >= y1 { return; }

        let hue = index as f32 / count.max(1) as f32 * 360.0;
        let top = hsv_to_argb(hue, 0.55, 0.95);
        let bottom = hsv_to_argb(hue + 40.0, 0.85, 0.45);
        let top_y = cy - half_h;
        for row in y0..y1 {
            let t = (row as f32 - top_y) / (half_h * 2.0);
            self.fill_span(x0, x1, row, blend(top, bottom, t));
        }

        let frame = if lit { LIGHT_COLOR } else { 0xFF000000 };
        let thickness = if lit { 3 } else { 1 };
        for k in 0..thickness {
            if x1 - x0 > 2 * k && y1 - y0 > 2 * k {
                self.draw_border(x0 + k, y0 + k, x1 - x0 - 2 * k, y1 - y0 - 2 * k, frame);
            }
        }
    }

    /// Wash the view toward gray as the aperture closes and darken its rim
    /// by the vignette amount.
    fn apply_lens(&mut self, out: &ControlOutput, law: &BlurLaw) {
        let span = (law.max_aperture - law.min_aperture).max(f32::EPSILON);
        let wash = (1.0 - (out.aperture - law.min_aperture) / span).clamp(0.0, 1.0) * 0.8;
        let vignette = out.vignette.clamp(0.0, 1.0);
        if wash <= 0.0 && vignette <= 0.0 { return; }

        let (hx, hy) = (VIEW_W as f32 / 2.0, VIEW_H as f32 / 2.0);
        for row in 0..VIEW_H {
            for col in 0..VIEW_W {
                let idx = row * WIN_W + col;
                let mut c = blend(self.buf[idx], 0xFF808080, wash);
                if vignette > 0.0 {
                    let dx = (col as f32 - hx) / hx;
                    let dy = (row as f32 - hy) / hy;
                    let rim = ((dx * dx + dy * dy) / 2.0).min(1.0);
                    c = blend(c, 0xFF000000, vignette * 2.0 * rim);
                }
                self.buf[idx] = c;
            }
        }
    }

    fn draw_overlay(&mut self, text: &str, y: usize, alpha: f32) {
        const SCALE: usize = 4;
        let width = text.chars().count() * 4 * SCALE;
        let x = VIEW_W.saturating_sub(width) / 2;
        let color = blend(WALL_COLOR, 0xFFFFFFFF, alpha);
        self.draw_text(text, x, y, color, SCALE);
    }

    // ── Side panel ────────────────────────────────────────────────────────

    /// Front view of each skeleton; scene units → panel pixels.
    fn draw_skeleton(&mut self, skeleton: &SkeletonView) {
        const PX_PER_UNIT: f32 = 8.0;
        let origin = Vec2::new(PANEL_X as f32 + PANEL_W as f32 / 2.0, SKELETON_H as f32 * 0.35);
        let to_px = |p: Vec3| Vec2::new(origin.x + p.x * PX_PER_UNIT, origin.y - p.y * PX_PER_UNIT);

        for bone in &skeleton.bones {
            let (a, b) = (to_px(bone.from), to_px(bone.to));
            let mid = (a + b) / 2.0;
            self.draw_line(a, mid, bone.from_color);
            self.draw_line(mid, b, bone.to_color);
        }
        for point in &skeleton.points {
            let p = to_px(point.position);
            self.fill_rect_clipped(p.x as isize - 1, p.y as isize - 1, 3, 3, point.color);
        }
    }

    /// Top-down map of the viewing volume: outer rectangle, blur band and
    /// the controlling head.
    fn draw_floor_map(&mut self, volume: &ViewingVolume, visitor: Option<Vec2>) {
        self.draw_label("FLOOR", PANEL_X + 10, MAP_Y + 8, LIGHT_COLOR);

        let (x_lo, x_hi) = (volume.min_x - 0.3, volume.max_x + 0.3);
        let (z_lo, z_hi) = (volume.min_z_for_blur - 0.3, volume.max_z + 0.3);
        let (left, top) = (PANEL_X as f32 + 20.0, MAP_Y as f32 + 24.0);
        let (w, h) = (PANEL_W as f32 - 40.0, MAP_H as f32 - 36.0);
        let to_px = |x: f32, z: f32| Vec2::new(
            left + (x - x_lo) / (x_hi - x_lo) * w,
            top + (z - z_lo) / (z_hi - z_lo) * h,
        );

        let outer = (to_px(volume.min_x, volume.min_z_for_blur), to_px(volume.max_x, volume.max_z));
        let inner = (
            to_px(volume.blur_start_min_x(), volume.blur_start_min_z()),
            to_px(volume.blur_start_max_x(), volume.blur_start_max_z()),
        );
        self.draw_rect_outline(outer.0, outer.1, MARGIN_COLOR);
        self.draw_rect_outline(inner.0, inner.1, VOLUME_COLOR);

        if let Some(v) = visitor {
            let p = to_px(v.x, v.y);
            self.fill_rect_clipped(p.x as isize - 2, p.y as isize - 2, 5, 5, HEAD_COLOR);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            self.fill_span(x, (x+w).min(WIN_W), row, color);
        }
    }

    fn fill_rect_clipped(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32) {
        let (x0, y0) = (x.max(0) as usize, y.max(0) as usize);
        let x1 = (x + w as isize).max(0) as usize;
        let y1 = (y + h as isize).max(0) as usize;
        if x1 > x0 && y1 > y0 {
            self.fill_rect(x0, y0, x1 - x0, y1 - y0, color);
        }
    }

    fn fill_span(&mut self, x0: usize, x1: usize, row: usize, color: u32) {
        if row >= WIN_H { return; }
        let start = row * WIN_W;
        for col in x0..x1.min(WIN_W) {
            self.buf[start + col] = color;
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x+w).min(WIN_W) {
            if y < WIN_H           { self.buf[y           * WIN_W + col] = color; }
            if y+h-1 < WIN_H       { self.buf[(y+h-1)     * WIN_W + col] = color; }
        }
        for row in y..(y+h).min(WIN_H) {
            if x < WIN_W           { self.buf[row * WIN_W + x    ] = color; }
            if x+w-1 < WIN_W       { self.buf[row * WIN_W + x+w-1] = color; }
        }
    }

    fn draw_rect_outline(&mut self, a: Vec2, b: Vec2, color: u32) {
        let (x0, y0) = (a.x.min(b.x).max(0.0) as usize, a.y.min(b.y).max(0.0) as usize);
        let (x1, y1) = (a.x.max(b.x).max(0.0) as usize, a.y.max(b.y).max(0.0) as usize);
        self.draw_border(x0, y0, x1.saturating_sub(x0) + 1, y1.saturating_sub(y0) + 1, color);
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// Bresenham line, clipped to the window.
    fn draw_line(&mut self, a: Vec2, b: Vec2, color: u32) {
        let (mut x, mut y) = (a.x as isize, a.y as isize);
        let (x1, y1) = (b.x as isize, b.y as isize);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            if x >= 0 && y >= 0 {
                self.set_pixel(x as usize, y as usize, color);
            }
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        self.draw_text(text, x, y, color, 1);
    }

    /// 3×5 bitmap font, each dot drawn as a `scale`×`scale` block.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
            if cx + 4 * scale > WIN_W { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Convert HSV → packed ARGB (0xAARRGGBB, A=0xFF).
fn hsv_to_argb(h: f32, s: f32, v: f32) -> u32 {
    let h  = h.rem_euclid(360.0);
    let hi = (h / 60.0) as u32;
    let f  = h / 60.0 - hi as f32;
    let p  = v * (1.0 - s);
    let q  = v * (1.0 - s * f);
    let t  = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match hi {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let ri = (r * 255.0) as u32;
    let gi = (g * 255.0) as u32;
    let bi = (b * 255.0) as u32;
    0xFF000000 | (ri << 16) | (gi << 8) | bi
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn picture_colors_are_opaque_and_distinct() {
        let a = hsv_to_argb(0.0, 0.55, 0.95);
        let b = hsv_to_argb(60.0, 0.55, 0.95);
        assert_eq!(a >> 24, 0xFF);
        assert_ne!(a, b);
    }

    #[test]
    fn negative_hue_wraps() {
        assert_eq!(hsv_to_argb(-120.0, 0.5, 0.5), hsv_to_argb(240.0, 0.5, 0.5));
    }
}
