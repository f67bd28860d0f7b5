//! Line layout of block-style YAML
//!
//! `serde_yaml` carries no source positions, so nodes are located by walking
//! the indentation structure of the raw lines. Supported:
//! - block mappings with plain, single- or double-quoted keys
//! - block sequences, indented or at the parent key's column
//! - compact entries (`- name: x`, `- - a`)
//! - blank lines, comment lines and nested block scalars
//!
//! Flow collections are opaque: their key line can be located, their
//! elements cannot.

use crate::comment::{comment_start, split_terminator};
use crate::path::{FieldPath, PathSegment};

/// Location of a block node inside a document body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSpan {
    /// Line holding the node's key, or its `-` for sequence elements
    pub line: usize,
    /// Column of the key (or of the `-`)
    pub column: usize,
    /// End of the node (exclusive); trailing blank and comment lines are not part of it
    pub end: usize,
    /// Column of the node's block children, if any
    pub child_column: Option<usize>,
}

/// Why a path could not be located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateFailure {
    /// The path is empty
    Root,
    /// A segment has no matching node
    Missing,
    /// A segment descends into a scalar or flow collection
    NotBlock,
}

/// A run of lines forming one block node's contents
///
/// `head` overrides the column of the first line: for `- key: v` the
/// nested mapping starts after the dash, not at the line's indentation.
#[derive(Debug, Clone, Copy)]
struct Block {
    start: usize,
    end: usize,
    head: Option<usize>,
}

/// Indexed view over the lines of one document body
#[derive(Debug)]
pub struct Layout<'a> {
    lines: Vec<&'a str>,
}

impl<'a> Layout<'a> {
    /// Split `body` into lines (terminators stripped)
    #[must_use]
    pub fn new(body: &'a str) -> Self {
        Self {
            lines: body
                .split_inclusive('\n')
                .map(|raw| split_terminator(raw).0)
                .collect(),
        }
    }

    /// Number of lines
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the body has no lines
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line `index` without terminator
    #[inline]
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    /// Whether line `index` carries YAML content (not blank, not a comment)
    #[must_use]
    pub fn is_content(&self, index: usize) -> bool {
        self.lines.get(index).is_some_and(|line| is_content(line))
    }

    /// Locate the node addressed by `path`
    ///
    /// # Errors
    /// Returns the reason the walk stopped.
    pub fn locate(&self, path: &FieldPath) -> Result<NodeSpan, LocateFailure> {
        let mut block = Some(Block {
            start: 0,
            end: self.lines.len(),
            head: None,
        });
        let mut found = None;

        for segment in path.iter() {
            let current = block.ok_or(LocateFailure::NotBlock)?;
            let (span, children) = match segment {
                PathSegment::Key(key) => self.find_key(current, key),
                PathSegment::Index(index) => self.find_index(current, *index),
            }
            .ok_or(LocateFailure::Missing)?;
            found = Some(span);
            block = children;
        }

        found.ok_or(LocateFailure::Root)
    }

    /// Last content line of the body, if any
    #[must_use]
    pub fn last_content_line(&self) -> Option<usize> {
        (0..self.lines.len()).rev().find(|&i| self.is_content(i))
    }

    fn column_of(&self, index: usize, block: Block) -> usize {
        match block.head {
            Some(head) if index == block.start => head,
            _ => indent(self.lines[index]),
        }
    }

    fn first_content(&self, block: Block) -> Option<usize> {
        (block.start..block.end).find(|&i| {
            let line = self.lines[i];
            let column = self.column_of(i, block);
            line.get(column..).is_some_and(is_content)
        })
    }

    fn find_key(&self, block: Block, key: &str) -> Option<(NodeSpan, Option<Block>)> {
        let first = self.first_content(block)?;
        let column = self.column_of(first, block);

        for i in first..block.end {
            if !self.is_content(i) || self.column_of(i, block) != column {
                continue;
            }
            let text = &self.lines[i][column..];
            let Some(rest) = match_key(text, key) else {
                continue;
            };

            let end = self.node_end(i, column, block.end, true);
            let children = if has_inline_value(rest) {
                None
            } else {
                self.block_of(i + 1, end)
            };
            let child_column = children.and_then(|c| self.first_content(c)).map(|c| indent(self.lines[c]));
            let span = NodeSpan {
                line: i,
                column,
                end,
                child_column,
            };
            return Some((span, children));
        }
        None
    }

    fn find_index(&self, block: Block, index: usize) -> Option<(NodeSpan, Option<Block>)> {
        let first = self.first_content(block)?;
        let column = self.column_of(first, block);
        let mut seen = 0;

        for i in first..block.end {
            if !self.is_content(i) || self.column_of(i, block) != column {
                continue;
            }
            let text = &self.lines[i][column..];
            if !is_sequence_entry(text) {
                // A mapping at this level: not a sequence
                return None;
            }
            if seen < index {
                seen += 1;
                continue;
            }

            let end = self.node_end(i, column, block.end, false);
            let after_dash = &text[1..];
            let inline = after_dash.trim_start();
            let children = if has_inline_value(inline) {
                let head = column + 1 + (after_dash.len() - inline.len());
                Some(Block {
                    start: i,
                    end,
                    head: Some(head),
                })
            } else {
                self.block_of(i + 1, end)
            };
            let child_column = children.and_then(|c| {
                self.first_content(c).map(|first| self.column_of(first, c))
            });
            let span = NodeSpan {
                line: i,
                column,
                end,
                child_column,
            };
            return Some((span, children));
        }
        None
    }

    /// End of the node starting at `start`, whose own column is `column`
    ///
    /// Mapping values may hold a sequence at the key's own column
    /// (`key:\n- a`), so for keys a dash at `column` still belongs to the node.
    fn node_end(&self, start: usize, column: usize, limit: usize, is_key: bool) -> usize {
        let mut end = start + 1;
        for i in start + 1..limit {
            if !self.is_content(i) {
                continue;
            }
            let line = self.lines[i];
            let line_indent = indent(line);
            let nested = line_indent > column
                || (is_key && line_indent == column && is_sequence_entry(&line[line_indent..]));
            if !nested {
                break;
            }
            end = i + 1;
        }
        end
    }

    fn block_of(&self, start: usize, end: usize) -> Option<Block> {
        (start < end).then_some(Block {
            start,
            end,
            head: None,
        })
    }
}

fn indent(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_content(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

fn is_sequence_entry(text: &str) -> bool {
    text == "-" || text.starts_with("- ") || text.starts_with("-\t")
}

/// Whether the text after a key's `:` (or an entry's `-`) holds a value on the same line
fn has_inline_value(rest: &str) -> bool {
    let rest = rest.trim_start();
    !rest.is_empty() && comment_start(rest) != Some(0)
}

/// If `text` opens the mapping entry `key`, return what follows the colon
fn match_key<'t>(text: &'t str, key: &str) -> Option<&'t str> {
    let double = format!("\"{key}\"");
    let single = format!("'{key}'");
    for token in [key, double.as_str(), single.as_str()] {
        let Some(rest) = text.strip_prefix(token) else {
            continue;
        };
        let Some(rest) = rest.trim_start_matches(' ').strip_prefix(':') else {
            continue;
        };
        if rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t') {
            return Some(rest);
        }
    }
    None
}
