// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use anyhow::{anyhow, bail};
use indexmap::IndexMap;
use psdl_units::{Duration, Seconds};

use crate::expressions::{parse_number, parse_timing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Time,
    Float,
    Integer,
    Text,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterKind::Time => "time",
            ParameterKind::Float => "float",
            ParameterKind::Integer => "integer",
            ParameterKind::Text => "text",
        };
        f.write_str(name)
    }
}

impl ParameterKind {
    /// Whether a scan variable can stand in for a value of this kind.
    pub fn is_bindable(self) -> bool {
        matches!(self, ParameterKind::Time | ParameterKind::Float)
    }
}

/// Typed value of a preset parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Time(Duration<Seconds>),
    Float(f64),
    Integer(i64),
    Text(String),
    /// The name of a declared scan variable standing in for a value of `kind`.
    Variable { name: String, kind: ParameterKind },
}

impl ParameterValue {
    pub fn kind(&self) -> ParameterKind {
        match self {
            ParameterValue::Time(_) => ParameterKind::Time,
            ParameterValue::Float(_) => ParameterKind::Float,
            ParameterValue::Integer(_) => ParameterKind::Integer,
            ParameterValue::Text(_) => ParameterKind::Text,
            ParameterValue::Variable { kind, .. } => *kind,
        }
    }
}

/// Renders the value as PSDL source text.
impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Time(t) => write!(f, "{:e}s", t.value()),
            ParameterValue::Float(v) => write!(f, "{v}"),
            ParameterValue::Integer(v) => write!(f, "{v}"),
            ParameterValue::Text(v) | ParameterValue::Variable { name: v, .. } => f.write_str(v),
        }
    }
}

/// Declaration of a customizable preset parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSchema {
    pub name: String,
    pub kind: ParameterKind,
    pub default: ParameterValue,
    /// Empty when any value of the right kind is accepted.
    pub allowed: Vec<ParameterValue>,
}

impl ParameterSchema {
    pub fn new(name: impl Into<String>, default: ParameterValue) -> Self {
        Self {
            name: name.into(),
            kind: default.kind(),
            default,
            allowed: Vec::new(),
        }
    }

    pub fn with_allowed(mut self, allowed: impl IntoIterator<Item = ParameterValue>) -> Self {
        self.allowed = allowed.into_iter().collect();
        self
    }

    /// Parse `text` as a value of this parameter.
    pub fn parse_value(&self, text: &str) -> anyhow::Result<ParameterValue> {
        let text = text.trim();
        let value = match self.kind {
            ParameterKind::Time => ParameterValue::Time(parse_timing(text)?),
            ParameterKind::Float => ParameterValue::Float(
                parse_number(text).ok_or_else(|| anyhow!("'{text}' is not a number"))?,
            ),
            ParameterKind::Integer => ParameterValue::Integer(
                text.parse()
                    .map_err(|_| anyhow!("'{text}' is not an integer"))?,
            ),
            ParameterKind::Text => ParameterValue::Text(text.to_string()),
        };
        if !self.allowed.is_empty() && !self.allowed.contains(&value) {
            let allowed: Vec<String> = self.allowed.iter().map(|v| v.to_string()).collect();
            bail!(
                "'{text}' is not one of the allowed values ({})",
                allowed.join(", ")
            );
        }
        Ok(value)
    }
}

/// Resolved arguments of a preset, one per declared parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetArguments {
    values: IndexMap<String, ParameterValue>,
}

impl PresetArguments {
    pub fn insert(&mut self, name: impl Into<String>, value: ParameterValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn typed<T>(
        &self,
        name: &str,
        kind: ParameterKind,
        extract: impl FnOnce(&ParameterValue) -> Option<T>,
    ) -> anyhow::Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| anyhow!("missing argument '{name}'"))?;
        if let ParameterValue::Variable { name: variable, .. } = value {
            bail!("argument '{name}' cannot follow scan variable '{variable}' in this preset");
        }
        extract(value).ok_or_else(|| anyhow!("argument '{name}' is not of kind {kind}"))
    }

    pub fn time(&self, name: &str) -> anyhow::Result<Duration<Seconds>> {
        self.typed(name, ParameterKind::Time, |v| match v {
            ParameterValue::Time(t) => Some(*t),
            _ => None,
        })
    }

    pub fn float(&self, name: &str) -> anyhow::Result<f64> {
        self.typed(name, ParameterKind::Float, |v| match v {
            ParameterValue::Float(x) => Some(*x),
            _ => None,
        })
    }

    pub fn integer(&self, name: &str) -> anyhow::Result<i64> {
        self.typed(name, ParameterKind::Integer, |v| match v {
            ParameterValue::Integer(x) => Some(*x),
            _ => None,
        })
    }

    pub fn text(&self, name: &str) -> anyhow::Result<&str> {
        let value = self
            .get(name)
            .ok_or_else(|| anyhow!("missing argument '{name}'"))?;
        match value {
            ParameterValue::Text(s) => Ok(s),
            _ => bail!("argument '{name}' is not of kind {}", ParameterKind::Text),
        }
    }
}
