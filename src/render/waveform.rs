use super::canvas::{Canvas, Rgba};
use crate::playback::WaveformSink;

pub const DEFAULT_STROKE: Rgba = [0x60, 0xa5, 0xfa, 255];
pub const DEFAULT_BACKGROUND: Rgba = [0x0f, 0x17, 0x2a, 255];
pub const DEFAULT_LINE_WIDTH: f32 = 2.0;

/// Receives each finished waveform frame.
pub trait FrameTap {
    fn frame(&mut self, canvas: &mut Canvas);
}

/// Plot coordinates for a sample prefix: sample `i` of `n` sits at
/// `x = i / n * w`, `y = h / 2 - s * h / 3`.
pub fn plot_points(prefix: &[f32], width: f32, height: f32) -> Vec<(f32, f32)> {
    let n = prefix.len() as f32;
    prefix
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f32 / n * width, height / 2.0 - s * (height / 3.0)))
        .collect()
}

/// Draws the waveform prefix as a connected line plot. Every frame starts
/// from a cleared surface.
pub struct WaveformRenderer<'t> {
    canvas: Canvas,
    stroke: Rgba,
    background: Rgba,
    line_width: f32,
    tap: Option<&'t mut dyn FrameTap>,
}

impl<'t> WaveformRenderer<'t> {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            stroke: DEFAULT_STROKE,
            background: DEFAULT_BACKGROUND,
            line_width: DEFAULT_LINE_WIDTH,
            tap: None,
        }
    }

    pub fn with_style(mut self, stroke: Rgba, background: Rgba, line_width: f32) -> Self {
        self.stroke = stroke;
        self.background = background;
        self.line_width = line_width;
        self
    }

    pub fn with_tap(mut self, tap: &'t mut dyn FrameTap) -> Self {
        self.tap = Some(tap);
        self
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn render(&mut self, prefix: &[f32]) {
        self.canvas.clear(self.background);
        let points = plot_points(
            prefix,
            self.canvas.width() as f32,
            self.canvas.height() as f32,
        );
        match points.as_slice() {
            [] => {}
            [(x, y)] => self.canvas.draw_line(*x, *y, *x, *y, self.stroke, self.line_width),
            _ => {
                for pair in points.windows(2) {
                    let (x0, y0) = pair[0];
                    let (x1, y1) = pair[1];
                    self.canvas.draw_line(x0, y0, x1, y1, self.stroke, self.line_width);
                }
            }
        }
    }
}

impl WaveformSink for WaveformRenderer<'_> {
    fn draw(&mut self, prefix: &[f32]) {
        self.render(prefix);
        if let Some(tap) = self.tap.as_deref_mut() {
            tap.frame(&mut self.canvas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_follow_the_plot_formula() {
        let points = plot_points(&[0.0, 1.5, -1.5, 0.75], 400.0, 300.0);
        assert_eq!(
            points,
            vec![(0.0, 150.0), (100.0, 0.0), (200.0, 300.0), (300.0, 75.0)]
        );
    }

    #[test]
    fn zero_amplitude_sits_on_the_centre_line() {
        let mut renderer = WaveformRenderer::new(20, 10);
        renderer.render(&[0.0; 5]);
        let canvas = renderer.canvas();
        assert_eq!(canvas.pixel(8, 5), Some(DEFAULT_STROKE));
        assert_eq!(canvas.pixel(8, 0), Some(DEFAULT_BACKGROUND));
        assert_eq!(canvas.pixel(8, 9), Some(DEFAULT_BACKGROUND));
    }

    #[test]
    fn out_of_range_samples_are_drawn_clipped() {
        let mut renderer = WaveformRenderer::new(900, 240);
        renderer.render(&[0.0, 1.0e6, -1.0e30, 0.0]);
        assert_eq!(renderer.canvas().pixel(0, 120), Some(DEFAULT_STROKE));
    }

    #[test]
    fn positive_amplitude_plots_upward() {
        let points = plot_points(&[0.0, 0.9], 100.0, 90.0);
        assert!(points[1].1 < points[0].1);
    }

    #[test]
    fn each_frame_is_drawn_from_scratch() {
        let mut renderer = WaveformRenderer::new(40, 30)
            .with_style([255, 255, 255, 255], [0, 0, 0, 255], 1.0);
        // A high plateau leaves marks near the top of the canvas.
        renderer.render(&[1.0; 40]);
        assert_eq!(renderer.canvas().pixel(20, 5), Some([255, 255, 255, 255]));

        // The next, flat frame must not keep them.
        renderer.render(&[0.0; 40]);
        assert_eq!(renderer.canvas().pixel(20, 5), Some([0, 0, 0, 255]));
        assert_eq!(renderer.canvas().pixel(20, 15), Some([255, 255, 255, 255]));
    }

    #[test]
    fn finished_frames_reach_the_tap() {
        struct Count(usize);
        impl FrameTap for Count {
            fn frame(&mut self, canvas: &mut Canvas) {
                assert_eq!(canvas.width(), 16);
                self.0 += 1;
            }
        }

        let mut count = Count(0);
        {
            let mut renderer = WaveformRenderer::new(16, 8).with_tap(&mut count);
            renderer.draw(&[0.1, 0.2]);
            renderer.draw(&[0.1, 0.2, 0.3]);
        }
        assert_eq!(count.0, 2);
    }
}
