//! Style stack resolution: tokens in, styled runs out.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use smallvec::SmallVec;

use crate::markup::{TagAttrs, Token, Tokenizer};

/// Opaque color string as written in markup (`red`, `#ff0000`, ...).
///
/// Interpretation is left to the drawing backend.
pub type Color = Arc<str>;

/// Resolved style in effect at one point of the markup.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleFrame {
    /// Foreground color; `None` inherits the caller's base color.
    pub fg: Option<Color>,
    /// Background fill; `None` means no fill.
    pub bg: Option<Color>,
    /// Font size multiplier, always finite and `> 0`.
    pub size_mul: f32,
    /// Alpha multiplier in `[0, 1]`.
    pub alpha_mul: f32,
}

impl StyleFrame {
    /// The frame at the bottom of every style stack.
    pub fn root() -> Self {
        Self {
            fg: None,
            bg: None,
            size_mul: 1.0,
            alpha_mul: 1.0,
        }
    }

    /// Derive the child frame opened by a tag.
    ///
    /// `fg`/`bg` replace the parent's value. `s` multiplies `size_mul` when it
    /// parses to a finite positive number; the product is kept within the
    /// positive finite `f32` range. `a` is clamped to `[0, 1]` and then
    /// multiplied into `alpha_mul`. Unusable values leave the field unchanged.
    pub fn with_attrs(&self, attrs: &TagAttrs<'_>) -> Self {
        let mut frame = self.clone();
        if let Some(fg) = attrs.fg {
            frame.fg = Some(Color::from(fg));
        }
        if let Some(bg) = attrs.bg {
            frame.bg = Some(Color::from(bg));
        }
        if let Some(raw) = attrs.s {
            match raw.parse::<f32>() {
                Ok(mul) if mul.is_finite() && mul > 0.0 => {
                    frame.size_mul = (frame.size_mul * mul).clamp(f32::MIN_POSITIVE, f32::MAX);
                }
                _ => log::debug!("style: ignoring size multiplier s={:?}", raw),
            }
        }
        if let Some(raw) = attrs.a {
            match raw.parse::<f32>() {
                Ok(mul) if mul.is_finite() => frame.alpha_mul *= mul.clamp(0.0, 1.0),
                _ => log::debug!("style: ignoring alpha multiplier a={:?}", raw),
            }
        }
        frame
    }
}

impl Default for StyleFrame {
    fn default() -> Self {
        Self::root()
    }
}

/// Contiguous text carrying one resolved style.
#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    /// Run text, never empty.
    pub text: String,
    /// Snapshot of the style frame in effect.
    pub style: StyleFrame,
}

/// Walks tokens, maintaining the style stack, and collects runs.
///
/// The root frame is never popped: a close tag at depth 1 is ignored.
#[derive(Clone, Debug)]
pub struct StyleResolver {
    stack: SmallVec<[StyleFrame; 8]>,
    runs: Vec<Run>,
}

impl Default for StyleResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleResolver {
    /// Resolver holding only the root frame.
    pub fn new() -> Self {
        let mut stack = SmallVec::new();
        stack.push(StyleFrame::root());
        Self {
            stack,
            runs: Vec::new(),
        }
    }

    /// Current stack depth, root included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Frame on top of the stack.
    pub fn current(&self) -> &StyleFrame {
        // The stack is seeded with the root and never drained below it.
        &self.stack[self.stack.len() - 1]
    }

    /// Feed one token.
    pub fn push_token(&mut self, token: Token<'_>) {
        match token {
            Token::Text(text) => {
                if !text.is_empty() {
                    let style = self.current().clone();
                    self.runs.push(Run {
                        text: text.into_owned(),
                        style,
                    });
                }
            }
            Token::TagOpen(attrs) => {
                let frame = self.current().with_attrs(&attrs);
                self.stack.push(frame);
            }
            Token::TagClose => {
                if self.stack.len() > 1 {
                    self.stack.pop();
                }
            }
        }
    }

    /// Consume the resolver and return the collected runs in input order.
    pub fn finish(self) -> Vec<Run> {
        self.runs
    }
}

/// Resolve a token stream into runs.
pub fn resolve_runs<'a, I>(tokens: I) -> Vec<Run>
where
    I: IntoIterator<Item = Token<'a>>,
{
    let mut resolver = StyleResolver::new();
    for token in tokens {
        resolver.push_token(token);
    }
    resolver.finish()
}

/// Tokenize and resolve markup text in one pass.
pub fn parse_runs(text: &str) -> Vec<Run> {
    resolve_runs(Tokenizer::new(text))
}
