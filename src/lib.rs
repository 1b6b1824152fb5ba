//! Deferred, reusable string templates.
//!
//! A template is parsed once into literal segments and `{0}` / `{name}`
//! placeholders, then formatted any number of times. Positional placeholders
//! index into the call arguments; named placeholders look their key up in a
//! trailing dictionary argument.
//!
//! ```
//! use retemplate::{Template, Value};
//!
//! let template = Template::parse("{0}: This is the {0}{suffix} template string{1}")?;
//! let out = template.format(&[1.into(), "!".into(), Value::map([("suffix", "st")])])?;
//! assert_eq!(out, "1: This is the 1st template string!");
//! # Ok::<(), retemplate::Error>(())
//! ```

pub mod ast;
pub mod catalog;
pub mod error;
pub mod formatter;
pub mod parser;
pub mod value;

pub use ast::Token;
pub use catalog::Catalog;
pub use error::{Error, Result};
pub use formatter::{MissingKey, Template, resolve_value};
pub use value::{Dict, Value};
