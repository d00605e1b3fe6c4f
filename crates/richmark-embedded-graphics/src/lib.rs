//! embedded-graphics backend for `richmark-render` layouts.
//!
//! [`EgTextMeasurer`] and [`EgSurface`] share one mono-font size mapping so
//! wrapping decisions match what gets rasterized.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_6X9, FONT_7X14, FONT_8X13},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use richmark_render::{DrawSurface, LayoutConfig, TextMeasurer};
use std::borrow::Cow;

/// Pixel-size to mono-font mapping shared by measurement and painting.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonoFontBackend;

impl MonoFontBackend {
    /// Font face used for text requested at `pixel_size`.
    pub fn font_for(pixel_size: u32) -> &'static MonoFont<'static> {
        if pixel_size >= 24 {
            &FONT_10X20
        } else if pixel_size >= 20 {
            &FONT_8X13
        } else if pixel_size >= 16 {
            &FONT_7X14
        } else {
            &FONT_6X9
        }
    }

    /// Horizontal advance of one glyph, spacing included.
    pub fn advance(pixel_size: u32) -> u32 {
        let font = Self::font_for(pixel_size);
        font.character_size.width + font.character_spacing
    }

    fn family_supported(family: &str) -> bool {
        matches!(
            family.trim().to_ascii_lowercase().as_str(),
            "monospace" | "mono" | "fixed" | "serif" | "sans" | "sans-serif"
        )
    }
}

/// `TextMeasurer` backed by the mono-font advances [`EgSurface`] paints with.
#[derive(Clone, Copy, Debug, Default)]
pub struct EgTextMeasurer;

impl EgTextMeasurer {
    /// Create a measurer.
    pub fn new() -> Self {
        Self
    }

    /// Layout configuration suited to bitmap faces.
    ///
    /// Mono fonts do not scale, so supersampling is disabled.
    pub fn layout_config() -> LayoutConfig {
        LayoutConfig {
            small_font_threshold_px: 0.0,
            ..LayoutConfig::default()
        }
    }
}

impl TextMeasurer for EgTextMeasurer {
    fn measure_text_px(&self, text: &str, pixel_size: u32, font_family: &str) -> f32 {
        if !MonoFontBackend::family_supported(font_family) {
            log::debug!("eg: family {:?} not available, using mono face", font_family);
        }
        let glyphs = normalize_text_for_mono(text).chars().count() as u32;
        (glyphs * MonoFontBackend::advance(pixel_size)) as f32
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SurfaceState {
    scale: f32,
    pixel_size: u32,
    fill: Option<Rgb888>,
    fill_alpha: f32,
    alpha: f32,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pixel_size: 16,
            fill: Some(Rgb888::BLACK),
            fill_alpha: 1.0,
            alpha: 1.0,
        }
    }
}

/// [`DrawSurface`] over any RGB888 embedded-graphics target.
///
/// Alpha is emulated by blending the fill color against a fixed paper color,
/// since draw targets expose no readback. Paints with an effective alpha of
/// zero or an unparseable color are skipped.
pub struct EgSurface<'d, D> {
    display: &'d mut D,
    paper: Rgb888,
    state: SurfaceState,
    saved: Vec<SurfaceState>,
}

impl<'d, D> EgSurface<'d, D>
where
    D: DrawTarget<Color = Rgb888>,
{
    /// Wrap `display`, blending against white paper.
    pub fn new(display: &'d mut D) -> Self {
        Self::with_paper(display, Rgb888::WHITE)
    }

    /// Wrap `display`, blending against `paper`.
    pub fn with_paper(display: &'d mut D, paper: Rgb888) -> Self {
        Self {
            display,
            paper,
            state: SurfaceState::default(),
            saved: Vec::new(),
        }
    }

    /// Number of unmatched `save` calls.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    fn paint_color(&self) -> Option<Rgb888> {
        let alpha = (self.state.alpha * self.state.fill_alpha).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return None;
        }
        let fill = self.state.fill?;
        Some(blend(fill, self.paper, alpha))
    }

    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(
            (x * self.state.scale).round() as i32,
            (y * self.state.scale).round() as i32,
        )
    }
}

impl<D> DrawSurface for EgSurface<'_, D>
where
    D: DrawTarget<Color = Rgb888>,
{
    type Error = D::Error;

    fn save(&mut self) {
        self.saved.push(self.state);
    }

    fn restore(&mut self) {
        match self.saved.pop() {
            Some(state) => self.state = state,
            None => log::warn!("eg: restore without matching save"),
        }
    }

    fn scale(&mut self, factor: f32) {
        self.state.scale *= factor;
    }

    fn set_font(&mut self, pixel_size: u32, _font_family: &str) {
        self.state.pixel_size = pixel_size;
    }

    fn set_fill_color(&mut self, color: &str) {
        match color.parse::<csscolorparser::Color>() {
            Ok(parsed) => {
                let [r, g, b, a] = parsed.to_rgba8();
                self.state.fill = Some(Rgb888::new(r, g, b));
                self.state.fill_alpha = a as f32 / 255.0;
            }
            Err(err) => {
                log::warn!("eg: unparseable color {:?}: {}", color, err);
                self.state.fill = None;
            }
        }
    }

    fn alpha(&self) -> f32 {
        self.state.alpha
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.state.alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<(), Self::Error> {
        let Some(color) = self.paint_color() else {
            return Ok(());
        };
        let top_left = self.point(x, y);
        let size = Size::new(
            (width * self.state.scale).round().max(0.0) as u32,
            (height * self.state.scale).round().max(0.0) as u32,
        );
        Rectangle::new(top_left, size)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut *self.display)
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) -> Result<(), Self::Error> {
        let Some(color) = self.paint_color() else {
            return Ok(());
        };
        let painted_px = (self.state.pixel_size as f32 * self.state.scale)
            .round()
            .max(1.0) as u32;
        let style = MonoTextStyle::new(MonoFontBackend::font_for(painted_px), color);
        let normalized = normalize_text_for_mono(text);
        Text::with_baseline(normalized.as_ref(), self.point(x, y), style, Baseline::Top)
            .draw(&mut *self.display)?;
        Ok(())
    }
}

fn blend(fg: Rgb888, paper: Rgb888, alpha: f32) -> Rgb888 {
    let mix = |over: u8, under: u8| -> u8 {
        let value = under as f32 + (over as f32 - under as f32) * alpha;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgb888::new(
        mix(fg.r(), paper.r()),
        mix(fg.g(), paper.g()),
        mix(fg.b(), paper.b()),
    )
}

fn normalize_text_for_mono(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|ch| {
        matches!(
            ch,
            '\u{00A0}' // nbsp
                | '\u{2013}' // en dash
                | '\u{2014}' // em dash
                | '\u{2018}'
                | '\u{2019}'
                | '\u{201C}'
                | '\u{201D}'
                | '\u{2026}' // ellipsis
        )
    }) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{00A0}' => out.push(' '),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}
