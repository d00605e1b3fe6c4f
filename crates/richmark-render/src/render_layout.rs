use richmark::{atomize, parse_runs, Color};

use crate::line_wrap::{LineWrapper, WrappedLine};
use crate::render_ir::{HAlign, LaidOutLine, LayoutResult, Rect, TextSize, VAlign};

/// Text measurement port.
///
/// Reports the advance width of `text` rendered at `pixel_size` in
/// `font_family`. Implementations must be deterministic for identical input.
pub trait TextMeasurer {
    /// Measure rendered text width in pixels.
    fn measure_text_px(&self, text: &str, pixel_size: u32, font_family: &str) -> f32;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure_text_px(&self, text: &str, pixel_size: u32, font_family: &str) -> f32 {
        (**self).measure_text_px(text, pixel_size, font_family)
    }
}

/// Font-free width estimate from per-glyph em widths.
///
/// Useful for headless sizing and tests when no font backend is available.
/// Families containing `mono` or `fixed` use a flat advance.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicMeasurer;

impl TextMeasurer for HeuristicMeasurer {
    fn measure_text_px(&self, text: &str, pixel_size: u32, font_family: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let family = font_family.to_ascii_lowercase();
        let proportional = !(family.contains("mono") || family.contains("fixed"));
        let em_sum: f32 = if proportional {
            text.chars().map(proportional_glyph_em_width).sum()
        } else {
            text.chars()
                .map(|ch| if ch == ' ' { 0.52 } else { 0.58 })
                .sum()
        };
        let family_scale = if family.contains("serif") && !family.contains("sans") {
            1.03
        } else if family.contains("sans") {
            0.99
        } else {
            1.00
        };
        em_sum * pixel_size as f32 * family_scale
    }
}

fn proportional_glyph_em_width(ch: char) -> f32 {
    match ch {
        ' ' => 0.32,
        '\t' => 1.28,
        '\u{00A0}' => 0.32,
        'i' | 'l' | 'I' | '|' | '!' => 0.24,
        '.' | ',' | ':' | ';' | '\'' | '"' | '`' => 0.23,
        '-' | '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => 0.34,
        '(' | ')' | '[' | ']' | '{' | '}' => 0.30,
        'f' | 't' | 'j' | 'r' => 0.34,
        'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' | '#' => 0.74,
        c if c.is_ascii_digit() => 0.52,
        c if c.is_ascii_uppercase() => 0.64,
        c if c.is_ascii_lowercase() => 0.52,
        c if c.is_whitespace() => 0.32,
        c if c.is_ascii_punctuation() => 0.42,
        _ => 0.56,
    }
}

/// Engine configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Internal upscale factor for small fonts, before the pixel-ratio divide.
    pub supersample_factor: f32,
    /// Device pixel ratio of the target surface.
    pub device_pixel_ratio: f32,
    /// Requested sizes below this are laid out supersampled.
    pub small_font_threshold_px: f32,
}

impl LayoutConfig {
    /// Defaults for a surface with the given device pixel ratio.
    pub fn for_device_pixel_ratio(device_pixel_ratio: f32) -> Self {
        Self {
            device_pixel_ratio,
            ..Self::default()
        }
    }

    /// `supersample_factor / device_pixel_ratio`, never below 1.
    pub fn effective_supersample_factor(self) -> f32 {
        let dpr = if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        };
        let factor = self.supersample_factor / dpr;
        if factor.is_finite() {
            factor.max(1.0)
        } else {
            1.0
        }
    }

    /// Internal scale and base pixel size for a requested font size.
    ///
    /// Returns `(scale, base_pixel_size)`; geometry computed at
    /// `base_pixel_size` maps back to surface pixels by multiplying with
    /// `scale`.
    pub fn scale_for(self, requested_size: f32) -> (f32, f32) {
        if requested_size < self.small_font_threshold_px {
            let factor = self.effective_supersample_factor();
            (1.0 / factor, (requested_size * factor).ceil())
        } else {
            (1.0, requested_size)
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            supersample_factor: 48.0,
            device_pixel_ratio: 1.0,
            small_font_threshold_px: 8.0,
        }
    }
}

/// Parameters of one measure or layout call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextRequest<'a> {
    /// Markup text.
    pub text: &'a str,
    /// Requested base font size in pixels.
    pub font_size_px: f32,
    /// Font family passed through to the measurer and surface.
    pub font_family: &'a str,
    /// Available area.
    pub rect: Rect,
    /// Color for segments without `fg`.
    pub default_color: &'a str,
    /// Per-line horizontal alignment.
    pub halign: HAlign,
    /// Block vertical alignment.
    pub valign: VAlign,
    /// Wrap at the rect width; otherwise only the first line is kept.
    pub wordwrap: bool,
}

impl<'a> TextRequest<'a> {
    /// Request with black text, top-left alignment and wrapping enabled.
    pub fn new(text: &'a str, font_size_px: f32, font_family: &'a str, rect: Rect) -> Self {
        Self {
            text,
            font_size_px,
            font_family,
            rect,
            default_color: "black",
            halign: HAlign::Left,
            valign: VAlign::Top,
            wordwrap: true,
        }
    }

    /// Set the default text color.
    pub fn with_default_color(mut self, color: &'a str) -> Self {
        self.default_color = color;
        self
    }

    /// Set horizontal and vertical alignment.
    pub fn with_align(mut self, halign: HAlign, valign: VAlign) -> Self {
        self.halign = halign;
        self.valign = valign;
        self
    }

    /// Enable or disable word wrapping.
    pub fn with_wordwrap(mut self, wordwrap: bool) -> Self {
        self.wordwrap = wordwrap;
        self
    }
}

/// Stateless layout engine. Every call starts from scratch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutEngine {
    cfg: LayoutConfig,
}

impl LayoutEngine {
    /// Create an engine.
    pub fn new(cfg: LayoutConfig) -> Self {
        Self { cfg }
    }

    /// Active configuration.
    pub fn config(&self) -> LayoutConfig {
        self.cfg
    }

    /// Size-only pass: `(rect.width, text height)` in surface pixels.
    pub fn measure(&self, measurer: &dyn TextMeasurer, req: &TextRequest<'_>) -> TextSize {
        let (scale, base_pixel_size) = self.cfg.scale_for(req.font_size_px);
        let lines = self.wrap_lines(measurer, req, scale, base_pixel_size);
        let total: f32 = lines
            .iter()
            .map(|line| line.height(base_pixel_size))
            .sum();
        TextSize {
            width: req.rect.width,
            height: total * scale,
        }
    }

    /// Full pass: positioned, render-ready lines.
    pub fn layout(&self, measurer: &dyn TextMeasurer, req: &TextRequest<'_>) -> LayoutResult {
        let (scale, base_pixel_size) = self.cfg.scale_for(req.font_size_px);
        let wrapped = self.wrap_lines(measurer, req, scale, base_pixel_size);

        let area_width = req.rect.width / scale;
        let left = req.rect.x / scale;
        let mut cursor_y = req.rect.y / scale;
        let mut lines = Vec::with_capacity(wrapped.len());
        for line in wrapped {
            let height = line.height(base_pixel_size);
            lines.push(LaidOutLine {
                x: left + req.halign.offset(area_width, line.width),
                y: cursor_y,
                width: line.width,
                height,
                segments: line.segments,
            });
            cursor_y += height;
        }

        let text_height: f32 = lines.iter().map(|line| line.height).sum();
        let vertical_offset = req.valign.offset(req.rect.height / scale, text_height);

        LayoutResult {
            font_family: req.font_family.to_string(),
            lines,
            vertical_offset,
            base_color: Color::from(req.default_color),
            base_pixel_size,
            requested_size: req.font_size_px,
            scale,
            rect: req.rect,
        }
    }

    fn wrap_lines(
        &self,
        measurer: &dyn TextMeasurer,
        req: &TextRequest<'_>,
        scale: f32,
        base_pixel_size: f32,
    ) -> Vec<WrappedLine> {
        if scale != 1.0 {
            log::debug!(
                "layout: {}px below {}px threshold, supersampling at {}px (scale {})",
                req.font_size_px,
                self.cfg.small_font_threshold_px,
                base_pixel_size,
                scale
            );
        }
        let runs = parse_runs(req.text);
        let atoms = atomize(&runs);
        if req.wordwrap {
            let max_width = req.rect.width / scale;
            LineWrapper::new(measurer, base_pixel_size, req.font_family, max_width).wrap(&atoms)
        } else {
            let mut lines =
                LineWrapper::unbounded(measurer, base_pixel_size, req.font_family).wrap(&atoms);
            lines.truncate(1);
            lines
        }
    }
}

/// Size-only pass with the default configuration.
pub fn measure(measurer: &dyn TextMeasurer, req: &TextRequest<'_>) -> TextSize {
    LayoutEngine::default().measure(measurer, req)
}

/// Full layout pass with the default configuration.
pub fn layout(measurer: &dyn TextMeasurer, req: &TextRequest<'_>) -> LayoutResult {
    LayoutEngine::default().layout(measurer, req)
}
