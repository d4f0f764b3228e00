// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Named, customizable PSDL fragments spliced in by `load preset:` lines.

mod builtin;
mod schema;

use indexmap::IndexMap;

pub use schema::{ParameterKind, ParameterSchema, ParameterValue, PresetArguments};

use crate::error::{Error, Result};

pub type PresetGenerator = fn(&PresetArguments) -> anyhow::Result<String>;

/// Source of the PSDL text of a preset.
#[derive(Debug, Clone)]
pub enum PresetBody {
    /// PSDL text with `{name}` placeholders for the arguments.
    Template(String),
    /// Renders PSDL text from the arguments.
    Generator(PresetGenerator),
}

#[derive(Debug, Clone)]
pub struct Preset {
    pub name: String,
    pub parameters: Vec<ParameterSchema>,
    pub body: PresetBody,
}

impl Preset {
    pub fn new(name: impl Into<String>, parameters: Vec<ParameterSchema>, body: PresetBody) -> Self {
        Self {
            name: name.into(),
            parameters,
            body,
        }
    }

    /// Resolve `key=value` overrides against the schema, filling in defaults.
    ///
    /// A time or float override naming one of `variables` is kept as a reference to that scan
    /// variable, so the rendered text binds the field to it.
    pub fn resolve_arguments(
        &self,
        overrides: &[(&str, &str)],
        variables: &[&str],
    ) -> Result<PresetArguments> {
        let mut arguments = PresetArguments::default();
        for schema in &self.parameters {
            arguments.insert(&schema.name, schema.default.clone());
        }
        for (key, value) in overrides {
            let schema = self
                .parameters
                .iter()
                .find(|s| s.name == *key)
                .ok_or_else(|| Error::parameter(&self.name, format!("unknown parameter '{key}'")))?;
            let value = if schema.kind.is_bindable() && variables.contains(value) {
                ParameterValue::Variable {
                    name: value.to_string(),
                    kind: schema.kind,
                }
            } else {
                schema
                    .parse_value(value)
                    .map_err(|e| Error::parameter(&self.name, format!("'{key}': {e:#}")))?
            };
            arguments.insert(*key, value);
        }
        Ok(arguments)
    }

    /// Produce the PSDL text of the preset for the given overrides.
    pub fn render(&self, overrides: &[(&str, &str)], variables: &[&str]) -> Result<String> {
        let arguments = self.resolve_arguments(overrides, variables)?;
        match &self.body {
            PresetBody::Template(template) => {
                Ok(arguments
                    .iter()
                    .fold(template.clone(), |text, (name, value)| {
                        text.replace(&format!("{{{name}}}"), &value.to_string())
                    }))
            }
            PresetBody::Generator(generate) => generate(&arguments)
                .map_err(|e| Error::parameter(&self.name, format!("{e:#}"))),
        }
    }
}

/// Resolves preset names to presets.
pub trait PresetRegistry {
    fn get(&self, name: &str) -> Option<&Preset>;
}

/// An in-memory preset registry.
#[derive(Debug, Clone, Default)]
pub struct PresetLibrary {
    presets: IndexMap<String, Preset>,
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with the `rabi`, `ramsey` and `hahn_echo` presets.
    pub fn builtin() -> Self {
        let mut library = Self::new();
        for preset in builtin::presets() {
            library.insert(preset);
        }
        library
    }

    /// Add a preset, replacing any preset with the same name.
    pub fn insert(&mut self, preset: Preset) {
        self.presets.insert(preset.name.clone(), preset);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }
}

impl PresetRegistry for PresetLibrary {
    fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }
}
