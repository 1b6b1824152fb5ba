use std::fmt;
use std::str::FromStr;

use log::trace;

use crate::ast::Token;
use crate::error::{Error, Result};
use crate::parser::{Parts, TemplateParser};
use crate::value::{Dict, UNDEFINED, Value};

/// How a named placeholder renders when its key is absent from the dictionary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingKey {
    /// Render nothing
    #[default]
    Empty,
    /// Render the placeholder itself, e.g. `{name}`
    Placeholder,
    /// Fail with [`Error::MissingKey`]
    Error,
}

/// Reusable template: literal segments interleaved with placeholder tokens.
///
/// Built once, then formatted any number of times with different arguments.
/// Formatting never mutates the template, so a `Template` can be shared freely
/// between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    literals: Vec<String>,
    tokens: Vec<Token>,
    missing_key: MissingKey,
}

impl Template {
    /// Build a template from explicit literal segments and placeholder tokens.
    ///
    /// There must be exactly one more literal segment than there are tokens:
    /// `literals[0]` precedes the first placeholder and `literals[i + 1]`
    /// follows placeholder `i`. Named keys must be valid placeholder names
    /// (`[A-Za-z_][A-Za-z0-9_]*`).
    pub fn new<L, S>(literals: L, tokens: Vec<Token>) -> Result<Self>
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let literals: Vec<String> = literals.into_iter().map(Into::into).collect();
        if literals.len() != tokens.len() + 1 {
            return Err(Error::Shape {
                literals: literals.len(),
                tokens: tokens.len(),
            });
        }
        if let Some(key) = tokens.iter().find_map(|token| match token {
            Token::Named(key) if !TemplateParser::is_placeholder_name(key) => Some(key),
            _ => None,
        }) {
            return Err(Error::InvalidName { key: key.clone() });
        }

        Ok(Self::from_parts(Parts { literals, tokens }))
    }

    /// Parse template source such as `"{0}: hello {name}"`
    pub fn parse(source: &str) -> Result<Self> {
        TemplateParser::parse_input(source).map(Self::from_parts)
    }

    pub(crate) fn from_parts(parts: Parts) -> Self {
        Self {
            literals: parts.literals,
            tokens: parts.tokens,
            missing_key: MissingKey::default(),
        }
    }

    pub fn with_missing_key(mut self, missing_key: MissingKey) -> Self {
        self.missing_key = missing_key;
        self
    }

    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn missing_key(&self) -> MissingKey {
        self.missing_key
    }

    pub fn placeholder_count(&self) -> usize {
        self.tokens.len()
    }

    /// Resolve every placeholder against `args` and concatenate the result.
    ///
    /// The first failing placeholder aborts the call; no partial output is returned.
    pub fn format(&self, args: &[Value]) -> Result<String> {
        trace!(
            "formatting {} placeholder(s) with {} argument(s)",
            self.tokens.len(),
            args.len()
        );

        let named = named_arguments(args);
        let mut result = String::with_capacity(self.literals.iter().map(String::len).sum());
        result.push_str(&self.literals[0]);

        for (token, literal) in self.tokens.iter().zip(&self.literals[1..]) {
            let value = resolve_value(token, args, named)?;
            match (token, value) {
                (Token::Named(key), Value::Undefined) => match self.missing_key {
                    MissingKey::Empty => {}
                    MissingKey::Placeholder => result.push_str(&token.to_string()),
                    MissingKey::Error => return Err(Error::MissingKey { key: key.clone() }),
                },
                _ => result.push_str(&value.to_string()),
            }
            result.push_str(literal);
        }

        Ok(result)
    }
}

/// The named-argument dictionary: the last argument, if it is a dictionary
pub fn named_arguments(args: &[Value]) -> Option<&Dict> {
    args.last().and_then(Value::as_dict)
}

/// Resolve a single placeholder token against the call arguments.
///
/// Positional tokens index into `args` and must not land on a dictionary.
/// Named tokens need a dictionary; a key missing from it yields
/// [`Value::Undefined`] rather than an error.
pub fn resolve_value<'a>(
    token: &Token,
    args: &'a [Value],
    named: Option<&'a Dict>,
) -> Result<&'a Value> {
    match token {
        Token::Positional(index) => {
            let value = usize::try_from(*index).ok().and_then(|i| args.get(i));

            match value {
                None => Err(Error::OutOfBounds {
                    index: *index,
                    len: args.len(),
                }),
                Some(value) if value.is_object() => {
                    Err(Error::InvalidPositionalTarget { index: *index })
                }
                Some(value) => Ok(value),
            }
        }
        Token::Named(key) => {
            let dict = named.ok_or_else(|| Error::MissingDictionary { key: key.clone() })?;
            Ok(dict.get(key).unwrap_or(&UNDEFINED))
        }
    }
}

impl FromStr for Template {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Template {
    /// Re-renders template source, escaping literal braces.
    /// A negative positional index renders as `{-1}`, which does not parse back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let escape = |s: &str| s.replace('{', "{{").replace('}', "}}");

        f.write_str(&escape(&self.literals[0]))?;
        for (token, literal) in self.tokens.iter().zip(&self.literals[1..]) {
            write!(f, "{token}{}", escape(literal))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ordinal_template() -> Template {
        Template::new(
            ["", ": This is the ", "", " template string", ""],
            vec![
                Token::Positional(0),
                Token::Positional(0),
                Token::named("suffix"),
                Token::Positional(1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_reuse_with_different_arguments() {
        let template = ordinal_template();

        let first = template
            .format(&[1.into(), "!".into(), Value::map([("suffix", "st")])])
            .unwrap();
        assert_eq!(first, "1: This is the 1st template string!");

        let second = template
            .format(&[2.into(), "?".into(), Value::map([("suffix", "nd")])])
            .unwrap();
        assert_eq!(second, "2: This is the 2nd template string?");
    }

    #[test]
    fn test_parsed_template_matches_explicit() {
        let parsed = Template::parse("{0}: This is the {0}{suffix} template string{1}").unwrap();
        assert_eq!(parsed, ordinal_template());
    }

    #[test]
    fn test_idempotent() {
        let template = ordinal_template();
        let args = [3.into(), ".".into(), Value::map([("suffix", "rd")])];
        assert_eq!(template.format(&args).unwrap(), template.format(&args).unwrap());
    }

    #[test]
    fn test_no_placeholders_ignores_arguments() {
        let template = Template::new(["static text"], vec![]).unwrap();
        assert_eq!(template.format(&[]).unwrap(), "static text");
        assert_eq!(
            template.format(&[Value::map([("a", 1)]), 5.into()]).unwrap(),
            "static text"
        );
    }

    #[test]
    fn test_out_of_bounds() {
        let args = [Value::from("a"), Value::from("b")];
        for index in [2, 7, -1] {
            let template = Template::new(["<", ">"], vec![Token::Positional(index)]).unwrap();
            let err = template.format(&args).unwrap_err();
            assert!(
                matches!(err, Error::OutOfBounds { index: i, len: 2 } if i == index),
                "{index}: {err}"
            );
        }
    }

    #[test]
    fn test_index_validated_per_call() {
        let template = Template::parse("{0}-{1}").unwrap();
        assert_eq!(template.format(&["a".into(), "b".into()]).unwrap(), "a-b");
        assert!(matches!(
            template.format(&["a".into()]),
            Err(Error::OutOfBounds { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_positional_dictionary_rejected() {
        let template = Template::parse("{0}").unwrap();
        let err = template.format(&[Value::map([("a", 1)])]).unwrap_err();
        assert!(matches!(err, Error::InvalidPositionalTarget { index: 0 }));

        let err = template
            .format(&[Value::map([("a", 1)]), Value::from(2)])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPositionalTarget { index: 0 }));
    }

    #[test]
    fn test_positional_list_accepted() {
        let template = Template::parse("[{0}]").unwrap();
        let out = template.format(&[Value::from(vec![1, 2, 3])]).unwrap();
        assert_eq!(out, "[1,2,3]");
    }

    #[test]
    fn test_named_without_dictionary() {
        let template = Template::parse("{foo}").unwrap();

        let err = template.format(&[42.into()]).unwrap_err();
        assert!(matches!(err, Error::MissingDictionary { ref key } if key == "foo"));

        assert!(matches!(
            template.format(&[]),
            Err(Error::MissingDictionary { .. })
        ));
    }

    #[test]
    fn test_dictionary_only_counts_when_last() {
        let template = Template::parse("{foo}").unwrap();
        let args = [Value::map([("foo", "bar")]), 1.into()];
        assert!(matches!(
            template.format(&args),
            Err(Error::MissingDictionary { .. })
        ));
    }

    #[test]
    fn test_trailing_dictionary_is_still_positional() {
        let template = Template::parse("{0} {1}").unwrap();
        let args = ["x".into(), Value::map([("k", "v")])];
        assert!(matches!(
            template.format(&args),
            Err(Error::InvalidPositionalTarget { index: 1 })
        ));
    }

    #[test]
    fn test_missing_key_policies() {
        let args = [Value::map([("present", "yes")])];
        let template = Template::parse("[{present}|{absent}]").unwrap();

        assert_eq!(template.format(&args).unwrap(), "[yes|]");

        let template = template.with_missing_key(MissingKey::Placeholder);
        assert_eq!(template.format(&args).unwrap(), "[yes|{absent}]");

        let template = template.with_missing_key(MissingKey::Error);
        let err = template.format(&args).unwrap_err();
        assert!(matches!(err, Error::MissingKey { ref key } if key == "absent"));
    }

    #[test]
    fn test_error_aborts_whole_call() {
        let template = Template::parse("{0} then {missing}").unwrap();
        // 1 is not a dictionary, so the named lookup fails after {0} resolved
        assert!(template.format(&[1.into()]).is_err());
    }

    #[test]
    fn test_resolve_value_directly() {
        let args = [Value::from(7), Value::map([("n", Value::Null)])];
        let named = named_arguments(&args);

        assert_eq!(resolve_value(&Token::Positional(0), &args, named).unwrap(), &Value::Int(7));
        assert_eq!(resolve_value(&Token::named("n"), &args, named).unwrap(), &Value::Null);
        assert_eq!(
            resolve_value(&Token::named("other"), &args, named).unwrap(),
            &Value::Undefined
        );
        assert!(resolve_value(&Token::named("n"), &args, None).is_err());
    }

    #[test]
    fn test_shape_mismatch() {
        let err = Template::new(["a", "b"], vec![]).unwrap_err();
        assert!(matches!(err, Error::Shape { literals: 2, tokens: 0 }));

        let err = Template::new(Vec::<String>::new(), vec![]).unwrap_err();
        assert!(matches!(err, Error::Shape { literals: 0, tokens: 0 }));
    }

    #[test]
    fn test_invalid_named_keys_rejected() {
        for key in ["0", "a b", "", "x}"] {
            let err = Template::new(["<", ">"], vec![Token::named(key)]).unwrap_err();
            assert!(matches!(err, Error::InvalidName { key: ref k } if k == key), "{key:?}");
        }

        // a key that looks like an index would read back as a positional placeholder
        assert!(Template::new(["<", ">"], vec![Token::named("0")]).is_err());
        assert!(Template::new(["<", ">"], vec![Token::named("_0")]).is_ok());
    }

    #[test]
    fn test_display_of_negative_index() {
        let template = Template::new(["<", ">"], vec![Token::Positional(-1)]).unwrap();
        assert_eq!(template.to_string(), "<{-1}>");
        assert!(template.to_string().parse::<Template>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let source = "{{x}} = {0}, {name}}}";
        let template: Template = source.parse().unwrap();
        assert_eq!(template.to_string(), source);
        assert_eq!(template.to_string().parse::<Template>().unwrap(), template);
    }

    #[test]
    fn test_concurrent_formatting() {
        let template = ordinal_template();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (1..=4i64)
                .map(|n| {
                    let template = &template;
                    scope.spawn(move || {
                        template
                            .format(&[n.into(), "!".into(), Value::map([("suffix", "th")])])
                            .unwrap()
                    })
                })
                .collect();

            for (n, handle) in (1..=4).zip(handles) {
                assert_eq!(
                    handle.join().unwrap(),
                    format!("{n}: This is the {n}th template string!")
                );
            }
        });
    }
}
