//! Line wrapping, layout, and paint pass for `richmark` markup.
//!
//! Two layout passes share one pipeline: [`measure`] reports the block size
//! for auto-sizing, [`layout`] returns a positioned [`LayoutResult`] that
//! [`render`] paints onto any [`DrawSurface`] without re-measuring.

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

mod line_wrap;
pub mod persist;
mod render_ir;
mod render_layout;
mod render_paint;

pub use line_wrap::{atom_pixel_size, LineWrapper, WrappedLine};
pub use persist::PersistError;
pub use render_ir::{
    HAlign, LaidOutLine, LayoutResult, ParseAlignError, Rect, Segment, TextSize, VAlign,
};
pub use render_layout::{
    layout, measure, HeuristicMeasurer, LayoutConfig, LayoutEngine, TextMeasurer, TextRequest,
};
pub use render_paint::{render, DrawSurface, PaintConfig, Painter, SurfaceScope};
pub use richmark::Color;
