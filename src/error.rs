use std::path::PathBuf;

use thiserror::Error;

use crate::parser::Rule;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("positional placeholder {{{index}}} is out of bounds for {len} argument(s)")]
    OutOfBounds { index: isize, len: usize },

    #[error("positional placeholder {{{index}}} refers to a dictionary, expected a scalar or list")]
    InvalidPositionalTarget { index: isize },

    #[error("named placeholder {{{key}}} used but the last argument is not a dictionary")]
    MissingDictionary { key: String },

    #[error("named placeholder {{{key}}} has no value in the dictionary")]
    MissingKey { key: String },

    #[error("`{key}` cannot be used as a placeholder name")]
    InvalidName { key: String },

    #[error("template with {tokens} placeholder(s) needs one more literal segment, got {literals}")]
    Shape { literals: usize, tokens: usize },

    #[error("Error parsing template: {}", .0)]
    Parse(Box<pest::error::Error<Rule>>),

    #[error("No template named `{}`", .0)]
    UnknownTemplate(String),

    #[error("IO error with template file at path `{}`: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<pest::error::Error<Rule>> for Error {
    fn from(err: pest::error::Error<Rule>) -> Self {
        Self::Parse(Box::new(err))
    }
}
