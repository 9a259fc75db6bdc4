use std::path::Path;

use anyhow::{Context, Result};
use fontdue::{Font, FontSettings};

use super::canvas::{Canvas, Rgba};

pub struct TextOverlay {
    font: Font,
    font_size: f32,
}

impl TextOverlay {
    /// Load from raw font bytes, falling back to a font file path.
    pub fn new(
        font_size: f32,
        font_path: Option<&Path>,
        font_bytes: Option<&[u8]>,
    ) -> Result<Self> {
        let owned;
        let data = match (font_bytes, font_path) {
            (Some(bytes), _) => bytes,
            (None, Some(path)) => {
                owned = std::fs::read(path)
                    .with_context(|| format!("Failed to read font: {}", path.display()))?;
                owned.as_slice()
            }
            (None, None) => anyhow::bail!("Text overlay needs a font (--font or --font-url)"),
        };
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| anyhow::anyhow!("Failed to parse font: {}", e))?;
        Ok(Self { font, font_size })
    }

    pub fn line_height(&self) -> u32 {
        self.font
            .horizontal_line_metrics(self.font_size)
            .map(|m| m.new_line_size.ceil() as u32)
            .unwrap_or(self.font_size.ceil() as u32)
    }

    /// Composite text onto the canvas with its top-left corner at (x, y).
    pub fn composite(&self, canvas: &mut Canvas, text: &str, x: u32, y: u32, color: Rgba) {
        let mut cursor_x = x as i32;
        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, self.font_size);
            let glyph_y = y as i32 + self.font_size as i32 - metrics.height as i32 - metrics.ymin;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    let alpha = (coverage as f32 / 255.0 * color[3] as f32) as u8;
                    canvas.blend(
                        cursor_x + metrics.xmin + gx as i32,
                        glyph_y + gy as i32,
                        [color[0], color[1], color[2], alpha],
                    );
                }
            }

            cursor_x += metrics.advance_width as i32;
        }
    }

    /// Measure the width of rendered text in pixels.
    pub fn measure_width(&self, text: &str) -> u32 {
        let mut width = 0.0f32;
        for ch in text.chars() {
            let metrics = self.font.metrics(ch, self.font_size);
            width += metrics.advance_width;
        }
        width.ceil() as u32
    }
}

/// Download a TTF/OTF font.
pub fn load_font_from_url(url: &str) -> Result<Vec<u8>> {
    log::info!("Downloading font from {}", url);
    let resp = reqwest::blocking::get(url)
        .with_context(|| format!("Failed to download font from {}", url))?
        .error_for_status()
        .with_context(|| format!("Font download failed: {}", url))?;
    let bytes = resp.bytes().context("Failed to read font body")?;
    Ok(bytes.to_vec())
}

/// `MM:SS.cc`, or `HH:MM:SS.cc` past the hour.
pub fn format_timestamp(secs: f32) -> String {
    let secs = secs.max(0.0);
    let total_secs = secs as u64;
    let centis = ((secs - total_secs as f32) * 100.0) as u64;
    if total_secs >= 3600 {
        format!(
            "{:02}:{:02}:{:02}.{:02}",
            total_secs / 3600,
            (total_secs % 3600) / 60,
            total_secs % 60,
            centis
        )
    } else {
        format!("{:02}:{:02}.{:02}", total_secs / 60, total_secs % 60, centis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps() {
        assert_eq!(format_timestamp(0.0), "00:00.00");
        assert_eq!(format_timestamp(2.5), "00:02.50");
        assert_eq!(format_timestamp(61.25), "01:01.25");
        assert_eq!(format_timestamp(3723.0), "01:02:03.00");
        assert_eq!(format_timestamp(-4.0), "00:00.00");
    }

    #[test]
    fn overlay_requires_a_font() {
        assert!(TextOverlay::new(24.0, None, None).is_err());
        assert!(TextOverlay::new(24.0, Some(Path::new("/no/such/font.ttf")), None).is_err());
        assert!(TextOverlay::new(24.0, None, Some(b"not a font")).is_err());
    }
}
