use core::ops::{Deref, DerefMut};

use crate::render_ir::LayoutResult;

/// Drawing port consumed by the paint pass.
///
/// Modeled on a 2D canvas: `save`/`restore` bracket every mutation of
/// transform, font, fill color, and alpha. Paint calls may fail with the
/// surface's own error, which is returned to the caller unchanged.
pub trait DrawSurface {
    /// Error reported by paint calls.
    type Error;

    /// Push the current transform, font, fill color, and alpha.
    fn save(&mut self);
    /// Pop state pushed by the matching [`save`](Self::save).
    fn restore(&mut self);
    /// Scale subsequent geometry uniformly.
    fn scale(&mut self, factor: f32);
    /// Select the font for subsequent text.
    fn set_font(&mut self, pixel_size: u32, font_family: &str);
    /// Select the fill color for subsequent paints.
    fn set_fill_color(&mut self, color: &str);
    /// Current global alpha.
    fn alpha(&self) -> f32;
    /// Set global alpha for subsequent paints.
    fn set_alpha(&mut self, alpha: f32);
    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<(), Self::Error>;
    /// Fill text whose top edge sits at `y`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32) -> Result<(), Self::Error>;
}

/// Saved surface state, restored on drop.
///
/// Restoration runs on every exit path, including `?` returns from paint
/// errors.
pub struct SurfaceScope<'s, S: DrawSurface + ?Sized> {
    surface: &'s mut S,
}

impl<'s, S: DrawSurface + ?Sized> SurfaceScope<'s, S> {
    /// Save surface state and hand out scoped access.
    pub fn enter(surface: &'s mut S) -> Self {
        surface.save();
        Self { surface }
    }
}

impl<S: DrawSurface + ?Sized> Deref for SurfaceScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: DrawSurface + ?Sized> DerefMut for SurfaceScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: DrawSurface + ?Sized> Drop for SurfaceScope<'_, S> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

/// Paint pass options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintConfig {
    /// Background box padding as a fraction of the segment pixel size.
    pub background_pad_ratio: f32,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            background_pad_ratio: 0.15,
        }
    }
}

/// Paints a [`LayoutResult`]. Performs no measurement or wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Painter {
    cfg: PaintConfig,
}

impl Painter {
    /// Create a painter.
    pub fn new(cfg: PaintConfig) -> Self {
        Self { cfg }
    }

    /// Paint `layout` onto `surface`.
    ///
    /// `override_color` replaces every segment's foreground when set.
    pub fn render<S>(
        &self,
        surface: &mut S,
        layout: &LayoutResult,
        override_color: Option<&str>,
    ) -> Result<(), S::Error>
    where
        S: DrawSurface + ?Sized,
    {
        let mut surface = SurfaceScope::enter(surface);
        if layout.scale != 1.0 {
            surface.scale(layout.scale);
        }
        let base_alpha = surface.alpha();

        for line in &layout.lines {
            let y_top = line.y + layout.vertical_offset;
            let mut x = line.x;
            for segment in &line.segments {
                let alpha = base_alpha * segment.alpha_mul;
                if let Some(bg) = segment.bg.as_deref() {
                    let pad = (segment.pixel_size as f32 * self.cfg.background_pad_ratio).round();
                    surface.set_alpha(alpha);
                    surface.set_fill_color(bg);
                    surface.fill_rect(
                        x - pad,
                        y_top - pad,
                        segment.width + pad * 2.0,
                        line.height + pad * 2.0,
                    )?;
                }

                let color = override_color
                    .or(segment.fg.as_deref())
                    .unwrap_or(&*layout.base_color);
                surface.set_font(segment.pixel_size, &layout.font_family);
                surface.set_fill_color(color);
                surface.set_alpha(alpha);
                surface.fill_text(&segment.text, x, y_top)?;
                x += segment.width;
            }
        }
        Ok(())
    }
}

/// Paint `layout` with the default paint options.
pub fn render<S>(
    surface: &mut S,
    layout: &LayoutResult,
    override_color: Option<&str>,
) -> Result<(), S::Error>
where
    S: DrawSurface + ?Sized,
{
    Painter::default().render(surface, layout, override_color)
}
