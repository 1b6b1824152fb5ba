use std::fmt;

/// Placeholder token sitting between two literal segments of a template
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Positional argument reference: {0}, {1}, etc.
    /// Signed so that a negative index can be rejected at call time.
    Positional(isize),
    /// Named argument reference, looked up in the trailing dictionary: {name}
    Named(String),
}

impl Token {
    pub fn named(key: impl Into<String>) -> Self {
        Token::Named(key.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Positional(index) => write!(f, "{{{index}}}"),
            Token::Named(key) => write!(f, "{{{key}}}"),
        }
    }
}
