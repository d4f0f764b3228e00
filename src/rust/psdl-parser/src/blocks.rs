// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use crate::line::{LineKind, SourceLine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BlockHeader {
    Loop { iterations: u32 },
    Conditional { condition: String },
}

impl BlockHeader {
    fn name(&self) -> &'static str {
        match self {
            BlockHeader::Loop { .. } => "loop",
            BlockHeader::Conditional { .. } => "if",
        }
    }
}

/// The raw lines of a `loop:` or `if` block, split at `else`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawBlock<'a> {
    pub header: BlockHeader,
    pub opening_line: usize,
    /// Loop body, or the `true` branch of a conditional.
    pub body: Vec<SourceLine<'a>>,
    pub else_body: Vec<SourceLine<'a>>,
}

fn parse_block_header(line: &SourceLine<'_>) -> Result<BlockHeader> {
    match LineKind::classify(line.text) {
        LineKind::Loop(count) => {
            let count = count.trim();
            let iterations = count.parse::<u32>().map_err(|_| {
                Error::parse(
                    Some(line.number),
                    format!("loop count must be a non-negative integer, got '{count}'"),
                )
            })?;
            Ok(BlockHeader::Loop { iterations })
        }
        LineKind::Conditional(condition) if !condition.trim().is_empty() => {
            Ok(BlockHeader::Conditional {
                condition: condition.trim().to_string(),
            })
        }
        _ => Err(Error::parse(
            Some(line.number),
            format!("expected a block opening, found '{}'", line.text),
        )),
    }
}

/// Collect the block opened by `lines[0]` up to its `end`.
///
/// Returns the block and the number of lines consumed, `end` included.
/// Blocks do not nest. Any other line belongs to the body and is parsed as a pulse.
pub(crate) fn collect_block<'a>(lines: &[SourceLine<'a>]) -> Result<(RawBlock<'a>, usize)> {
    let Some(opening) = lines.first() else {
        return Err(Error::new("cannot collect a block from no lines"));
    };
    let header = parse_block_header(opening)?;
    let mut block = RawBlock {
        header,
        opening_line: opening.number,
        body: Vec::new(),
        else_body: Vec::new(),
    };
    let mut in_else = false;
    for (index, line) in lines.iter().enumerate().skip(1) {
        match LineKind::classify(line.text) {
            LineKind::End => return Ok((block, index + 1)),
            LineKind::Else if matches!(block.header, BlockHeader::Conditional { .. }) && !in_else => {
                in_else = true;
            }
            kind @ (LineKind::Loop(_) | LineKind::Conditional(_)) => {
                return Err(Error::parse(
                    Some(line.number),
                    format!(
                        "nested '{}' blocks are not supported ({} block opened at line {})",
                        kind.keyword(),
                        block.header.name(),
                        block.opening_line
                    ),
                ));
            }
            // Everything else is read as a pulse, and skipped with a warning if it is none
            _ if in_else => block.else_body.push(*line),
            _ => block.body.push(*line),
        }
    }
    Err(Error::parse(
        Some(block.opening_line),
        format!("unterminated {} block, missing 'end'", block.header.name()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::significant_lines;

    #[test]
    fn test_loop_block() {
        let lines = significant_lines("loop: 3\nA\n# comment\nB\nend\nC");
        let (block, consumed) = collect_block(&lines).unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(block.header, BlockHeader::Loop { iterations: 3 });
        assert_eq!(block.opening_line, 1);
        assert_eq!(
            block.body.iter().map(|l| l.text).collect::<Vec<_>>(),
            vec!["A", "B"]
        );
        assert!(block.else_body.is_empty());
    }

    #[test]
    fn test_conditional_block() {
        let lines = significant_lines("if photon_detected\nA\nelse\nB\nC\nend");
        let (block, consumed) = collect_block(&lines).unwrap();
        assert_eq!(consumed, 6);
        assert_eq!(
            block.header,
            BlockHeader::Conditional {
                condition: "photon_detected".to_string()
            }
        );
        assert_eq!(block.body.len(), 1);
        assert_eq!(block.else_body.len(), 2);
    }

    #[test]
    fn test_block_errors() {
        let unterminated = significant_lines("\nloop: 2\nA");
        let err = collect_block(&unterminated).unwrap_err();
        assert!(matches!(err, Error::Parse { line: Some(2), .. }));

        let nested = significant_lines("loop: 2\nif x\nend\nend");
        let err = collect_block(&nested).unwrap_err();
        assert!(matches!(err, Error::Parse { line: Some(2), .. }));

        let bad_count = significant_lines("loop: many\nend");
        assert!(collect_block(&bad_count).is_err());

        let no_condition = significant_lines("if \nend");
        assert!(collect_block(&no_condition).is_err());
    }

    #[test]
    fn test_stray_lines_stay_in_the_body() {
        let lines = significant_lines(
            "loop: 2\nA\nsequence: name=y\nvariable t, start=1ns, stop=2ns, steps=2\nelse\nB\nend",
        );
        let (block, consumed) = collect_block(&lines).unwrap();
        assert_eq!(consumed, 7);
        assert_eq!(block.body.len(), 5);
        assert_eq!(block.body[4].text, "B");

        let double_else = significant_lines("if x\nA\nelse\nB\nelse\nload preset: rabi\nend");
        let (block, _) = collect_block(&double_else).unwrap();
        assert_eq!(block.body.len(), 1);
        assert_eq!(
            block.else_body.iter().map(|l| l.text).collect::<Vec<_>>(),
            vec!["B", "else", "load preset: rabi"]
        );
    }
}
