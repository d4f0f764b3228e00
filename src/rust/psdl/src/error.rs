// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::error::Error as StdError;

use psdl_builder::Error as BuilderError;
use psdl_parser::Error as ParserError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parser(#[from] ParserError),
    #[error(transparent)]
    Builder(#[from] BuilderError),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Create a formatted error message.
pub fn create_error_message<T: Into<Error>>(error: T) -> String {
    let error = error.into();
    let mut causes = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    let message = error.to_string();
    if causes.is_empty() {
        return message;
    }
    // Reverse to show highest-level cause first
    causes.reverse();
    let msg = format!("Caused by:\n  {:}", causes.join("\n  "));
    format!("{message}\n{msg}")
}
