//! Markup tokenizer.
//!
//! The grammar is scanned left to right in a single pass:
//!
//! | Sequence | Token |
//! |---|---|
//! | `[[` | literal `[` |
//! | `]]` | literal `]` |
//! | `[/]` | close the innermost style scope |
//! | `[k=v k=v ...]`, `k` in `fg`, `bg`, `s`, `a` | open a style scope |
//!
//! Anything else, including brackets that fit none of the rules, is literal
//! text. Tokenizing never fails.

use alloc::borrow::Cow;
use alloc::vec::Vec;

/// Attribute keys recognised inside an open tag.
const TAG_KEYS: [&str; 4] = ["fg", "bg", "s", "a"];

/// Attributes captured by one open tag.
///
/// Each field holds the raw value text of the last occurrence of its key in
/// the tag, or `None` when the key did not appear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TagAttrs<'a> {
    /// Foreground color (`fg=`).
    pub fg: Option<&'a str>,
    /// Background fill color (`bg=`).
    pub bg: Option<&'a str>,
    /// Size multiplier (`s=`), unparsed.
    pub s: Option<&'a str>,
    /// Alpha multiplier (`a=`), unparsed.
    pub a: Option<&'a str>,
}

impl<'a> TagAttrs<'a> {
    fn set(&mut self, key: &str, value: &'a str) {
        match key {
            "fg" => self.fg = Some(value),
            "bg" => self.bg = Some(value),
            "s" => self.s = Some(value),
            "a" => self.a = Some(value),
            _ => {}
        }
    }

    /// True when no attribute was captured.
    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.s.is_none() && self.a.is_none()
    }
}

/// One markup token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text. Borrowed from the input unless produced by an escape.
    Text(Cow<'a, str>),
    /// Style scope opened with the given attributes.
    TagOpen(TagAttrs<'a>),
    /// Innermost style scope closed.
    TagClose,
}

/// Streaming tokenizer over a markup string.
#[derive(Clone, Debug)]
pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    /// Start tokenizing `src` from the beginning.
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Byte offset of the next unread character.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Try every bracket rule at byte offset `at`.
    ///
    /// Returns the token and the number of bytes it consumes.
    fn bracket_rule_at(&self, at: usize) -> Option<(Token<'a>, usize)> {
        let rest = &self.src[at..];
        if rest.starts_with("[[") {
            return Some((Token::Text(Cow::Borrowed("[")), 2));
        }
        if rest.starts_with("]]") {
            return Some((Token::Text(Cow::Borrowed("]")), 2));
        }
        if rest.starts_with("[/]") {
            return Some((Token::TagClose, 3));
        }
        if rest.starts_with('[') {
            return parse_open_tag(rest).map(|(attrs, len)| (Token::TagOpen(attrs), len));
        }
        None
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.src.len() {
            return None;
        }
        if let Some((token, len)) = self.bracket_rule_at(self.pos) {
            self.pos += len;
            return Some(token);
        }

        // Literal text runs until the next position where a bracket rule matches.
        let start = self.pos;
        let bytes = self.src.as_bytes();
        let mut end = start + 1;
        while end < bytes.len() {
            if matches!(bytes[end], b'[' | b']') && self.bracket_rule_at(end).is_some() {
                break;
            }
            end += 1;
        }
        // Only ASCII bytes end a run, so `end` is on a char boundary; a run
        // that started on a stray bracket is still a whole char.
        while !self.src.is_char_boundary(end) {
            end += 1;
        }
        if matches!(bytes[start], b'[' | b']') {
            log::trace!(
                "markup: unmatched bracket at byte {} treated as literal text",
                start
            );
        }
        self.pos = end;
        Some(Token::Text(Cow::Borrowed(&self.src[start..end])))
    }
}

/// Tokenize a whole markup string.
pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    Tokenizer::new(src).collect()
}

/// Parse `[k=v k=v ...]` at the start of `src`.
fn parse_open_tag(src: &str) -> Option<(TagAttrs<'_>, usize)> {
    let mut attrs = TagAttrs::default();
    let mut pos = 1;
    loop {
        let rest = &src[pos..];
        let key = TAG_KEYS.iter().copied().find(|key| {
            rest.starts_with(key) && rest.as_bytes().get(key.len()) == Some(&b'=')
        })?;
        pos += key.len() + 1;

        let value_len = src[pos..]
            .char_indices()
            .find(|(_, ch)| ch.is_whitespace() || *ch == ']')
            .map(|(idx, _)| idx)
            .unwrap_or(src.len() - pos);
        if value_len == 0 {
            return None;
        }
        attrs.set(key, &src[pos..pos + value_len]);
        pos += value_len;

        let rest = &src[pos..];
        if rest.starts_with(']') {
            return Some((attrs, pos + 1));
        }
        let gap = rest
            .char_indices()
            .find(|(_, ch)| !ch.is_whitespace())
            .map(|(idx, _)| idx)?;
        if gap == 0 {
            return None;
        }
        pos += gap;
    }
}
