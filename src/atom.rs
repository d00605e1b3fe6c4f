//! Splitting runs into wrap atoms.

use alloc::vec::Vec;

use crate::style::{Run, StyleFrame};

/// Smallest unit the line wrapper places.
///
/// An atom is a maximal non-whitespace word, a maximal whitespace span, or a
/// single `\n`. It borrows both text and style from its owning [`Run`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Atom<'a> {
    /// Atom text, never empty.
    pub text: &'a str,
    /// Style of the owning run.
    pub style: &'a StyleFrame,
}

impl Atom<'_> {
    /// Hard line break.
    pub fn is_newline(&self) -> bool {
        self.text == "\n"
    }

    /// Whitespace span other than a hard break.
    ///
    /// These are dropped when they would start a wrapped line.
    pub fn is_whitespace(&self) -> bool {
        !self.is_newline() && self.text.chars().all(char::is_whitespace)
    }
}

/// A `\n` is a hard break only where a whitespace span starts; inside a
/// longer span it belongs to that span.
fn split_run<'a>(run: &'a Run, out: &mut Vec<Atom<'a>>) {
    let mut rest = run.text.as_str();
    while let Some(first) = rest.chars().next() {
        let len = if first == '\n' {
            1
        } else if first.is_whitespace() {
            rest.find(|ch: char| !ch.is_whitespace()).unwrap_or(rest.len())
        } else {
            rest.find(char::is_whitespace).unwrap_or(rest.len())
        };
        let (piece, tail) = rest.split_at(len);
        out.push(Atom {
            text: piece,
            style: &run.style,
        });
        rest = tail;
    }
}
