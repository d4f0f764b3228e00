// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

/// A significant (non-blank, non-comment) line of PSDL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SourceLine<'a> {
    /// 1-based line number in the text it was read from.
    pub number: usize,
    pub text: &'a str,
}

pub(crate) fn significant_lines(text: &str) -> Vec<SourceLine<'_>> {
    text.lines()
        .enumerate()
        .map(|(index, line)| SourceLine {
            number: index + 1,
            text: line.trim(),
        })
        .filter(|line| !line.text.is_empty() && !line.text.starts_with('#'))
        .collect()
}

/// What a line is, decided by its prefix. Payloads are the text after the keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    Header(&'a str),
    Variable(&'a str),
    Loop(&'a str),
    Conditional(&'a str),
    Else,
    End,
    Preset(&'a str),
    Pulse(&'a str),
}

impl<'a> LineKind<'a> {
    pub fn classify(text: &'a str) -> Self {
        if let Some(rest) = text.strip_prefix("sequence:") {
            return LineKind::Header(rest);
        }
        if let Some(rest) = text
            .strip_prefix("variable")
            .filter(|rest| rest.starts_with(char::is_whitespace))
        {
            return LineKind::Variable(rest);
        }
        if let Some(rest) = text.strip_prefix("loop:") {
            return LineKind::Loop(rest);
        }
        if let Some(rest) = text.strip_prefix("if ") {
            return LineKind::Conditional(rest);
        }
        if let Some(rest) = text.strip_prefix("load preset:") {
            return LineKind::Preset(rest);
        }
        match text {
            "else" => LineKind::Else,
            "end" => LineKind::End,
            _ => LineKind::Pulse(text),
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            LineKind::Header(_) => "sequence:",
            LineKind::Variable(_) => "variable",
            LineKind::Loop(_) => "loop:",
            LineKind::Conditional(_) => "if",
            LineKind::Else => "else",
            LineKind::End => "end",
            LineKind::Preset(_) => "load preset:",
            LineKind::Pulse(_) => "pulse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_and_blank_lines_are_dropped() {
        let lines = significant_lines("# header\n\n  laser pulse  \n   # note\nend\n");
        assert_eq!(
            lines,
            vec![
                SourceLine {
                    number: 3,
                    text: "laser pulse"
                },
                SourceLine {
                    number: 5,
                    text: "end"
                },
            ]
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            LineKind::classify("sequence: name=x"),
            LineKind::Header(" name=x")
        );
        assert_eq!(
            LineKind::classify("variable tau, start=1ns"),
            LineKind::Variable(" tau, start=1ns")
        );
        assert_eq!(
            LineKind::classify("variable_pulse pulse on channel 1 at 0ns, square, 1ns, 1"),
            LineKind::Pulse("variable_pulse pulse on channel 1 at 0ns, square, 1ns, 1")
        );
        assert_eq!(LineKind::classify("loop: 3"), LineKind::Loop(" 3"));
        assert_eq!(
            LineKind::classify("if photon_detected"),
            LineKind::Conditional("photon_detected")
        );
        assert_eq!(LineKind::classify("else"), LineKind::Else);
        assert_eq!(LineKind::classify("end"), LineKind::End);
        assert_eq!(
            LineKind::classify("load preset: rabi"),
            LineKind::Preset(" rabi")
        );
    }
}
