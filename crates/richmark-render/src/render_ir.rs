use core::fmt;
use core::str::FromStr;
use richmark::Color;
use serde::{Deserialize, Serialize};

/// Axis-aligned area text is laid out into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Available width.
    pub width: f32,
    /// Available height.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Measured block size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSize {
    /// Block width (the rect width).
    pub width: f32,
    /// Sum of line heights.
    pub height: f32,
}

/// Horizontal alignment of each line inside the rect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Vertical alignment of the whole block inside the rect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VAlign {
    /// Top edge.
    #[default]
    Top,
    /// Centered.
    Middle,
    /// Bottom edge.
    Bottom,
}

impl HAlign {
    /// Canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    /// Offset of a line of `line_width` inside `available` width.
    pub fn offset(self, available: f32, line_width: f32) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Center => (available - line_width) / 2.0,
            Self::Right => available - line_width,
        }
    }
}

impl VAlign {
    /// Canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        }
    }

    /// Offset of a block of `text_height` inside `available` height.
    pub fn offset(self, available: f32, text_height: f32) -> f32 {
        match self {
            Self::Top => 0.0,
            Self::Middle => (available - text_height) / 2.0,
            Self::Bottom => available - text_height,
        }
    }
}

/// Unknown alignment keyword.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseAlignError {
    value: String,
}

impl fmt::Display for ParseAlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown alignment: {:?}", self.value)
    }
}

impl std::error::Error for ParseAlignError {}

impl FromStr for HAlign {
    type Err = ParseAlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(ParseAlignError {
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for VAlign {
    type Err = ParseAlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "middle" => Ok(Self::Middle),
            "bottom" => Ok(Self::Bottom),
            _ => Err(ParseAlignError {
                value: s.to_string(),
            }),
        }
    }
}

/// Paint unit: one or more adjacent same-style atoms on a line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Concatenated atom text.
    pub text: String,
    /// Foreground color; `None` paints with the base color.
    pub fg: Option<Color>,
    /// Background fill; `None` paints no box.
    pub bg: Option<Color>,
    /// Alpha multiplier applied on top of the surface alpha.
    pub alpha_mul: f32,
    /// Effective font size in pixels.
    pub pixel_size: u32,
    /// Measured width in pixels.
    pub width: f32,
}

impl Segment {
    /// Whether `other` paints with the exact same style.
    pub fn same_style(&self, other: &Segment) -> bool {
        self.fg == other.fg
            && self.bg == other.bg
            && self.alpha_mul == other.alpha_mul
            && self.pixel_size == other.pixel_size
    }
}

/// Positioned line inside a [`LayoutResult`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaidOutLine {
    /// Left edge after horizontal alignment.
    pub x: f32,
    /// Top edge before the block's vertical offset.
    pub y: f32,
    /// Sum of segment widths.
    pub width: f32,
    /// Tallest segment pixel size, or the base size for an empty line.
    pub height: f32,
    /// Segments in paint order.
    pub segments: Vec<Segment>,
}

/// Render-ready layout.
///
/// Geometry is stored in the internal (possibly supersampled) coordinate
/// space; [`scale`](Self::scale) maps it back to surface pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    /// Font family every segment is painted with.
    pub font_family: String,
    /// Lines top to bottom; never empty.
    pub lines: Vec<LaidOutLine>,
    /// Offset added to every line's `y` for vertical alignment.
    pub vertical_offset: f32,
    /// Color used where a segment has no foreground.
    pub base_color: Color,
    /// Base font size in the internal coordinate space.
    pub base_pixel_size: f32,
    /// Font size the caller asked for.
    pub requested_size: f32,
    /// Internal-to-surface scale factor (1 unless supersampled).
    pub scale: f32,
    /// Rect the layout was computed for, in surface pixels.
    pub rect: Rect,
}

impl LayoutResult {
    /// Sum of line heights in the internal coordinate space.
    pub fn text_height(&self) -> f32 {
        self.lines.iter().map(|line| line.height).sum()
    }

    /// Block size in surface pixels, as the size-only path reports it.
    pub fn size(&self) -> TextSize {
        TextSize {
            width: self.rect.width,
            height: self.text_height() * self.scale,
        }
    }

    /// Total number of segments across all lines.
    pub fn segment_count(&self) -> usize {
        self.lines.iter().map(|line| line.segments.len()).sum()
    }
}
