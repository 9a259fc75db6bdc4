/// RGBA colour.
pub type Rgba = [u8; 4];

/// Parse `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(s: &str) -> Option<Rgba> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}

/// A CPU-side RGBA8 drawing surface, row-major, no padding.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn clear(&mut self, color: Rgba) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(out)
    }

    /// Alpha-blend `color` over the pixel at (x, y); out-of-bounds is ignored.
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        let a = color[3] as f32 / 255.0;
        let inv_a = 1.0 - a;
        for c in 0..3 {
            self.pixels[idx + c] =
                (color[c] as f32 * a + self.pixels[idx + c] as f32 * inv_a).round() as u8;
        }
        self.pixels[idx + 3] = 255;
    }

    /// Straight segment from (x0, y0) to (x1, y1), `thickness` pixels wide.
    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba, thickness: f32) {
        let radius = ((thickness - 1.0) / 2.0).max(0.0);
        let r = radius.ceil() as i32;

        // Stepping is bounded by the visible part of the segment.
        let margin = r as f32 + 1.0;
        let bounds = (
            -margin,
            -margin,
            self.width as f32 + margin,
            self.height as f32 + margin,
        );
        let Some((x0, y0, x1, y1)) = clip_segment((x0, y0), (x1, y1), bounds) else {
            return;
        };

        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let cx = x0 + dx * t;
            let cy = y0 + dy * t;
            if r == 0 {
                self.blend(cx.round() as i32, cy.round() as i32, color);
                continue;
            }
            for oy in -r..=r {
                for ox in -r..=r {
                    if ((ox * ox + oy * oy) as f32) <= radius * radius + 0.5 {
                        self.blend(cx.round() as i32 + ox, cy.round() as i32 + oy, color);
                    }
                }
            }
        }
    }
}

/// Liang-Barsky clip of a segment to `(xmin, ymin, xmax, ymax)`. `None` when
/// nothing is inside or a coordinate is not finite.
pub fn clip_segment(
    from: (f32, f32),
    to: (f32, f32),
    (xmin, ymin, xmax, ymax): (f32, f32, f32, f32),
) -> Option<(f32, f32, f32, f32)> {
    let (x0, y0) = from;
    let (x1, y1) = to;
    if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let dx = x1 - x0;
    let dy = y1 - y0;
    let edges = [
        (-dx, x0 - xmin),
        (dx, xmax - x0),
        (-dy, y0 - ymin),
        (dy, ymax - y0),
    ];

    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 {
                return None;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return None;
            }
            t1 = t1.min(t);
        }
    }
    Some((x0 + t0 * dx, y0 + t0 * dy, x0 + t1 * dx, y0 + t1 * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba = [255, 255, 255, 255];
    const BLACK: Rgba = [0, 0, 0, 255];

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#60a5fa"), Some([0x60, 0xa5, 0xfa, 255]));
        assert_eq!(parse_hex_color("0f172acc"), Some([0x0f, 0x17, 0x2a, 0xcc]));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut canvas = Canvas::new(4, 3);
        canvas.clear(WHITE);
        assert!(canvas.pixels().chunks(4).all(|px| px == WHITE));
        assert_eq!(canvas.pixels().len(), 48);
    }

    #[test]
    fn horizontal_line_covers_its_span() {
        let mut canvas = Canvas::new(10, 5);
        canvas.clear(BLACK);
        canvas.draw_line(1.0, 2.0, 8.0, 2.0, WHITE, 1.0);
        for x in 1..=8 {
            assert_eq!(canvas.pixel(x, 2), Some(WHITE));
        }
        assert_eq!(canvas.pixel(0, 2), Some(BLACK));
        assert_eq!(canvas.pixel(9, 2), Some(BLACK));
        assert_eq!(canvas.pixel(4, 1), Some(BLACK));
    }

    #[test]
    fn thick_lines_spread_vertically() {
        let mut canvas = Canvas::new(10, 7);
        canvas.clear(BLACK);
        canvas.draw_line(0.0, 3.0, 9.0, 3.0, WHITE, 3.0);
        assert_eq!(canvas.pixel(5, 2), Some(WHITE));
        assert_eq!(canvas.pixel(5, 4), Some(WHITE));
        assert_eq!(canvas.pixel(5, 0), Some(BLACK));
    }

    #[test]
    fn drawing_is_clipped() {
        let mut canvas = Canvas::new(4, 4);
        canvas.clear(BLACK);
        canvas.draw_line(-10.0, -10.0, 20.0, 20.0, WHITE, 2.0);
        assert_eq!(canvas.pixel(2, 2), Some(WHITE));
        assert_eq!(canvas.pixel(3, 0), Some(BLACK));
    }

    #[test]
    fn clipping_keeps_inside_segments() {
        let bounds = (0.0, 0.0, 10.0, 10.0);
        assert_eq!(
            clip_segment((1.0, 2.0), (8.0, 9.0), bounds),
            Some((1.0, 2.0, 8.0, 9.0))
        );
        assert_eq!(
            clip_segment((-5.0, 5.0), (15.0, 5.0), bounds),
            Some((0.0, 5.0, 10.0, 5.0))
        );
        assert_eq!(clip_segment((-5.0, -5.0), (-1.0, 20.0), bounds), None);
        assert_eq!(clip_segment((0.0, 0.0), (f32::INFINITY, 3.0), bounds), None);
    }

    #[test]
    fn extreme_endpoints_only_draw_the_visible_part() {
        let mut canvas = Canvas::new(20, 20);
        canvas.clear(BLACK);
        canvas.draw_line(0.0, 10.0, 19.0, -1.0e30, WHITE, 1.0);
        assert_eq!(canvas.pixel(0, 10), Some(WHITE));

        canvas.clear(BLACK);
        canvas.draw_line(0.0, 1.0e30, 19.0, 1.0e30, WHITE, 3.0);
        assert!(canvas.pixels().chunks(4).all(|px| px == BLACK));
    }
}
