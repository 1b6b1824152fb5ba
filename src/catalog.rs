use std::collections::HashMap;
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::formatter::Template;
use crate::parser::TemplateParser;
use crate::value::Value;

/// Registry of named templates
#[derive(Debug, Default, Clone)]
pub struct Catalog(HashMap<String, Template>);

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load template definitions from catalog source text (`key = template` lines).
    /// Later definitions replace earlier ones with the same key.
    /// Nothing is registered if any entry fails to parse.
    pub fn load(&mut self, source: &str) -> Result<()> {
        let entries = TemplateParser::parse_catalog(source)?;
        debug!("loaded {} template definition(s)", entries.len());

        for (name, parts) in entries {
            self.define(name, Template::from_parts(parts));
        }
        Ok(())
    }

    /// Load template definitions from a file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("reading templates from {}", path.display());
        self.load(&source)
    }

    /// Register a template under `name`, replacing any previous one
    pub fn define(&mut self, name: impl Into<String>, template: Template) {
        self.0.insert(name.into(), template);
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.0.get(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Format the template registered under `name`
    pub fn format(&self, name: &str, args: &[Value]) -> Result<String> {
        self.get(name)
            .ok_or_else(|| Error::UnknownTemplate(name.to_owned()))?
            .format(args)
    }
}
