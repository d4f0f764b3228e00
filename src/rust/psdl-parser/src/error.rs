// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Parse error{}: {message}", at_line(.line))]
    Parse {
        line: Option<usize>,
        message: String,
    },
    #[error("Invalid parameter for preset '{preset}': {message}")]
    Parameter { preset: String, message: String },
    #[error("Validation failed for {entity}: {message}")]
    Validation { entity: String, message: String },
    #[error("Failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" at line {line}"),
        None => String::new(),
    }
}

impl Error {
    pub fn new<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Anyhow(anyhow::anyhow!(msg.to_string()))
    }

    pub fn parse<T: Display>(line: Option<usize>, msg: T) -> Self {
        Error::Parse {
            line,
            message: msg.to_string(),
        }
    }

    pub fn parameter<T: Display>(preset: &str, msg: T) -> Self {
        Error::Parameter {
            preset: preset.to_string(),
            message: msg.to_string(),
        }
    }

    pub fn validation<T: Display>(entity: impl Into<String>, msg: T) -> Self {
        Error::Validation {
            entity: entity.into(),
            message: msg.to_string(),
        }
    }
}
