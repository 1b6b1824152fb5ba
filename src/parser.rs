use pest::{
    Parser,
    error::ErrorVariant,
    iterators::{Pair, Pairs},
};
use pest_derive::Parser;

use crate::ast::Token;
use crate::error::Result;

#[derive(Parser)]
#[grammar = "src/template.pest"]
pub struct TemplateParser;

/// Literal segments and placeholder tokens of a parsed template.
/// `literals.len() == tokens.len() + 1` always holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parts {
    pub literals: Vec<String>,
    pub tokens: Vec<Token>,
}

impl TemplateParser {
    /// Parse template source into literal segments and placeholder tokens
    pub fn parse_input(input: &str) -> Result<Parts> {
        let mut pairs: Pairs<'_, Rule> = TemplateParser::parse(Rule::template, input)?;
        let template = pairs.next().expect("parser returned no template rule");

        Self::collect_parts(template.into_inner())
    }

    /// Parse catalog source into `(key, template)` entries, in file order
    pub fn parse_catalog(input: &str) -> Result<Vec<(String, Parts)>> {
        let mut pairs = TemplateParser::parse(Rule::catalog, input)?;
        let catalog = pairs.next().expect("parser returned no catalog rule");

        catalog
            .into_inner()
            .filter(|p| p.as_rule() == Rule::entry)
            .map(Self::parse_entry)
            .collect()
    }

    /// Whether `key` can be written as a `{key}` placeholder
    pub fn is_placeholder_name(key: &str) -> bool {
        TemplateParser::parse(Rule::named_key, key).is_ok()
    }

    fn parse_entry(pair: Pair<'_, Rule>) -> Result<(String, Parts)> {
        let mut inner = pair.into_inner();
        let key = inner.next().map(|p| p.as_str().to_owned()).unwrap_or_default();
        let parts = match inner.next() {
            Some(body) => Self::collect_parts(body.into_inner())?,
            None => Parts::default(),
        };

        Ok((key, parts))
    }

    fn collect_parts(pairs: Pairs<'_, Rule>) -> Result<Parts> {
        let mut parts = Parts::default();
        let mut current = String::new();

        for pair in pairs {
            match pair.as_rule() {
                Rule::literal | Rule::line_literal => current.push_str(pair.as_str()),
                Rule::escaped_open => current.push('{'),
                Rule::escaped_close => current.push('}'),
                Rule::placeholder => {
                    parts.literals.push(std::mem::take(&mut current));
                    parts.tokens.push(Self::parse_placeholder(pair)?);
                }
                _ => {}
            }
        }
        parts.literals.push(current);

        Ok(parts)
    }

    fn parse_placeholder(pair: Pair<'_, Rule>) -> Result<Token> {
        let span = pair.as_span();
        let inner = pair
            .into_inner()
            .next()
            .expect("placeholder without index or name");

        match inner.as_rule() {
            Rule::index => inner.as_str().parse::<isize>().map(Token::Positional).map_err(|_| {
                pest::error::Error::new_from_span(
                    ErrorVariant::CustomError {
                        message: format!("positional index {} is too large", inner.as_str()),
                    },
                    span,
                )
                .into()
            }),
            _ => Ok(Token::Named(inner.as_str().to_owned())),
        }
    }
}
