//! Inline rich-text markup front end.
//!
//! `richmark` turns marked-up strings such as `"[fg=red s=2]Hi[/] there"`
//! into styled runs and wrap atoms. Layout and painting live in
//! `richmark-render`.
//!
//! ```
//! let runs = richmark::parse_runs("[s=2]big[/] small");
//! assert_eq!(runs.len(), 2);
//! assert_eq!(runs[0].style.size_mul, 2.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
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

extern crate alloc;

pub mod atom;
pub mod markup;
pub mod style;

pub use atom::{atomize, Atom};
pub use markup::{tokenize, TagAttrs, Token, Tokenizer};
pub use style::{parse_runs, resolve_runs, Color, Run, StyleFrame, StyleResolver};
