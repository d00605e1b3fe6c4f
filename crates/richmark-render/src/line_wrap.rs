use richmark::Atom;

use crate::render_ir::Segment;
use crate::render_layout::TextMeasurer;

/// Line produced by the wrapper, before positioning.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WrappedLine {
    /// Merged segments in paint order.
    pub segments: Vec<Segment>,
    /// Sum of segment widths.
    pub width: f32,
    /// Number of atoms placed on this line.
    pub atom_count: usize,
}

impl WrappedLine {
    /// Tallest segment pixel size, or `base_pixel_size` when empty.
    pub fn height(&self, base_pixel_size: f32) -> f32 {
        self.segments
            .iter()
            .map(|segment| segment.pixel_size)
            .max()
            .map_or(base_pixel_size, |px| px as f32)
    }
}

/// Pixel size an atom is measured and painted at.
pub fn atom_pixel_size(base_size: f32, size_mul: f32) -> u32 {
    (base_size * size_mul).max(1.0).round() as u32
}

/// Greedy word wrapper.
///
/// Atoms are packed onto a line until the next one would push the width
/// strictly past `max_width`. A whitespace atom that triggers a break is
/// dropped; any other atom starts the next line even if it alone overflows.
#[derive(Clone, Copy)]
pub struct LineWrapper<'a> {
    measurer: &'a dyn TextMeasurer,
    base_size: f32,
    font_family: &'a str,
    max_width: f32,
}

impl core::fmt::Debug for LineWrapper<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LineWrapper")
            .field("base_size", &self.base_size)
            .field("font_family", &self.font_family)
            .field("max_width", &self.max_width)
            .finish()
    }
}

impl<'a> LineWrapper<'a> {
    /// Create a wrapper for one layout pass.
    pub fn new(
        measurer: &'a dyn TextMeasurer,
        base_size: f32,
        font_family: &'a str,
        max_width: f32,
    ) -> Self {
        Self {
            measurer,
            base_size,
            font_family,
            max_width,
        }
    }

    /// Wrapper that only breaks on explicit newlines.
    pub fn unbounded(measurer: &'a dyn TextMeasurer, base_size: f32, font_family: &'a str) -> Self {
        Self::new(measurer, base_size, font_family, f32::INFINITY)
    }

    /// Wrap atoms into lines. Always returns at least one line.
    pub fn wrap(&self, atoms: &[Atom<'_>]) -> Vec<WrappedLine> {
        let mut state = WrapState::default();
        for atom in atoms {
            if atom.is_newline() {
                state.flush();
                continue;
            }

            let pixel_size = atom_pixel_size(self.base_size, atom.style.size_mul);
            let width = self
                .measurer
                .measure_text_px(atom.text, pixel_size, self.font_family);

            if state.line_width + width > self.max_width && !state.candidates.is_empty() {
                state.flush();
                if atom.is_whitespace() {
                    continue;
                }
            } else if state.candidates.is_empty() && width > self.max_width {
                log::trace!(
                    "wrap: atom {:?} ({}px) overflows max width {}px",
                    atom.text,
                    width,
                    self.max_width
                );
            }
            state.push(atom, pixel_size, width);
        }
        state.flush();
        state.lines
    }
}

#[derive(Default)]
struct WrapState {
    candidates: Vec<Segment>,
    line_width: f32,
    lines: Vec<WrappedLine>,
}

impl WrapState {
    fn push(&mut self, atom: &Atom<'_>, pixel_size: u32, width: f32) {
        self.candidates.push(Segment {
            text: atom.text.to_string(),
            fg: atom.style.fg.clone(),
            bg: atom.style.bg.clone(),
            alpha_mul: atom.style.alpha_mul,
            pixel_size,
            width,
        });
        self.line_width += width;
    }

    fn flush(&mut self) {
        let atom_count = self.candidates.len();
        let mut segments: Vec<Segment> = Vec::with_capacity(atom_count);
        for candidate in self.candidates.drain(..) {
            match segments.last_mut() {
                Some(last) if last.same_style(&candidate) => {
                    last.text.push_str(&candidate.text);
                    last.width += candidate.width;
                }
                _ => segments.push(candidate),
            }
        }
        let width = segments.iter().map(|segment| segment.width).sum();
        self.lines.push(WrappedLine {
            segments,
            width,
            atom_count,
        });
        self.line_width = 0.0;
    }
}
