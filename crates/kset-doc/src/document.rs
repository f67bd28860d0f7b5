//! Multi-document YAML sources
//!
//! A [`DocumentSet`] keeps every byte of its source: each [`Document`] owns
//! the separator text that precedes it and its raw body, next to the parsed
//! `serde_yaml::Value`. Rendering concatenates the raw pieces, so documents
//! that were not edited come back unchanged.

use crate::comment::{split_terminator, trailing_comment, with_trailing_comment};
use crate::error::DocError;
use crate::layout::{Layout, NodeSpan};
use crate::path::FieldPath;
use crate::value;
use serde_yaml::Value;
use std::ops::Range;

/// One YAML document with its raw text
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Position within its set
    index: usize,
    /// Separator (and any leading comments) preceding the body
    preamble: String,
    /// Raw body text
    body: String,
    /// Parsed body
    value: Value,
}

impl Document {
    /// Parse a standalone single document
    ///
    /// # Errors
    /// Returns `DocError::Parse` if the text is not a single valid YAML document.
    pub fn parse(text: &str) -> Result<Self, DocError> {
        Self::from_parts(0, String::new(), text.to_string())
    }

    fn from_parts(index: usize, preamble: String, body: String) -> Result<Self, DocError> {
        let value = parse_body(index, &body)?;
        Ok(Self {
            index,
            preamble,
            body,
            value,
        })
    }

    /// Position within its set
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Parsed value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Raw body text
    #[inline]
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether the document holds no YAML content
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_null()
    }

    /// Value at `path`
    #[inline]
    #[must_use]
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        value::select(&self.value, path)
    }

    /// Line layout of the body
    #[inline]
    #[must_use]
    pub fn layout(&self) -> Layout<'_> {
        Layout::new(&self.body)
    }

    /// Source position of the node at `path`
    ///
    /// # Errors
    /// Returns `DocError::Unlocatable` if the node is absent or not in block style.
    pub fn locate(&self, path: &FieldPath) -> Result<NodeSpan, DocError> {
        self.layout()
            .locate(path)
            .map_err(|failure| DocError::unlocatable(self.index, path, failure))
    }

    /// Trailing comment of the line holding the node at `path`
    ///
    /// # Errors
    /// Returns `DocError::Unlocatable` if the node cannot be located.
    pub fn line_comment(&self, path: &FieldPath) -> Result<Option<String>, DocError> {
        let span = self.locate(path)?;
        Ok(self
            .layout()
            .line(span.line)
            .and_then(trailing_comment)
            .map(str::to_string))
    }

    /// Set the trailing comment on the line holding the node at `path`
    ///
    /// Only the comment part of that single line changes. Returns the comment
    /// that was replaced, if any.
    ///
    /// # Errors
    /// Returns `DocError::Unlocatable` if the node cannot be located, and
    /// `DocError::ContentChanged` if the edited body no longer parses to the
    /// same value (a multi-line scalar starting on that line). The document is
    /// left unchanged on error.
    pub fn set_line_comment(
        &mut self,
        path: &FieldPath,
        comment: &str,
    ) -> Result<Option<String>, DocError> {
        let span = self.locate(path)?;
        let mut previous = None;
        let mut body = String::with_capacity(self.body.len() + comment.len() + 3);

        for (i, raw) in self.body.split_inclusive('\n').enumerate() {
            if i == span.line {
                let (line, terminator) = split_terminator(raw);
                previous = trailing_comment(line).map(str::to_string);
                body.push_str(&with_trailing_comment(line, comment));
                body.push_str(terminator);
            } else {
                body.push_str(raw);
            }
        }

        match parse_body(self.index, &body) {
            Ok(value) if value == self.value => {}
            _ => {
                return Err(DocError::ContentChanged {
                    index: self.index,
                    path: path.to_string(),
                })
            }
        }

        tracing::trace!(document = self.index, line = span.line, "set line comment");
        self.body = body;
        Ok(previous)
    }

    /// Replace lines `range` of the body with `replacement` and re-parse
    ///
    /// `replacement` is inserted verbatim and should end with a newline.
    /// `range.start == range.end` inserts before that line; a start past the
    /// last line appends.
    ///
    /// # Errors
    /// Returns `DocError::Parse` if the edited body is not valid YAML; the
    /// document is left unchanged in that case.
    pub fn splice_lines(&mut self, range: Range<usize>, replacement: &str) -> Result<(), DocError> {
        let lines: Vec<&str> = self.body.split_inclusive('\n').collect();
        let start = range.start.min(lines.len());
        let end = range.end.clamp(start, lines.len());

        let mut body: String = lines[..start].concat();
        if !body.is_empty() && !body.ends_with('\n') {
            body.push('\n');
        }
        body.push_str(replacement);
        body.push_str(&lines[end..].concat());

        let value = parse_body(self.index, &body)?;
        self.body = body;
        self.value = value;
        Ok(())
    }

    /// Replace the whole body and re-parse
    ///
    /// # Errors
    /// Returns `DocError::Parse` if `body` is not valid YAML.
    pub fn replace_body(&mut self, body: String) -> Result<(), DocError> {
        self.value = parse_body(self.index, &body)?;
        self.body = body;
        Ok(())
    }

    /// Raw text of this document including its preamble
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.preamble.len() + self.body.len());
        out.push_str(&self.preamble);
        out.push_str(&self.body);
        out
    }
}

/// Ordered documents loaded from one source
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentSet {
    documents: Vec<Document>,
}

impl DocumentSet {
    /// Split `text` on `---` lines and parse every document
    ///
    /// Leading comments and directives before the first separator are kept
    /// with the first document.
    ///
    /// # Errors
    /// - `DocError::InlineDocumentStart` for `--- value` lines
    /// - `DocError::Parse` for any invalid document
    pub fn parse(text: &str) -> Result<Self, DocError> {
        let mut chunks: Vec<(String, String)> = vec![(String::new(), String::new())];
        let mut seen_separator = false;

        for (line_no, raw) in text.split_inclusive('\n').enumerate() {
            let (line, _) = split_terminator(raw);
            match separator_kind(line) {
                Separator::None => {
                    if let Some((_, body)) = chunks.last_mut() {
                        body.push_str(raw);
                    }
                }
                Separator::Plain => {
                    let leading_only =
                        !seen_separator && chunks[0].1.lines().all(|l| !is_yaml_content(l));
                    seen_separator = true;
                    if leading_only {
                        // Comments/directives before the first `---` stay with document 0
                        let (preamble, body) = &mut chunks[0];
                        preamble.push_str(&std::mem::take(body));
                        preamble.push_str(raw);
                    } else {
                        chunks.push((raw.to_string(), String::new()));
                    }
                }
                Separator::Inline => {
                    return Err(DocError::InlineDocumentStart {
                        index: chunks.len(),
                        line: line_no + 1,
                    });
                }
            }
        }

        let documents = chunks
            .into_iter()
            .enumerate()
            .map(|(index, (preamble, body))| Document::from_parts(index, preamble, body))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(documents = documents.len(), "parsed document set");
        Ok(Self { documents })
    }

    /// Documents in source order
    #[inline]
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Document at `index`
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    /// Mutable document at `index`
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Document> {
        self.documents.get_mut(index)
    }

    /// Number of documents
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the set has no documents
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterator over documents
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Re-join all documents with their original separators
    #[must_use]
    pub fn render(&self) -> String {
        self.documents.iter().map(Document::render).collect()
    }
}

enum Separator {
    None,
    Plain,
    Inline,
}

fn separator_kind(line: &str) -> Separator {
    let Some(rest) = line.strip_prefix("---") else {
        return Separator::None;
    };
    let rest = rest.trim();
    if rest.is_empty() || rest.starts_with('#') {
        Separator::Plain
    } else if line.as_bytes().get(3).is_some_and(u8::is_ascii_whitespace) {
        Separator::Inline
    } else {
        // `----` or `---x` is plain content
        Separator::None
    }
}

fn is_yaml_content(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#') && !trimmed.starts_with('%')
}

fn parse_body(index: usize, body: &str) -> Result<Value, DocError> {
    if !body.lines().any(is_yaml_content) {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(body).map_err(|source| DocError::Parse { index, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MULTI: &str = "\
# leading comment
---
apiVersion: example.com/v1beta1
kind: Example1
spec:
  list:
  - \"a\"
  - \"b\"
--- # second
kind: Example2
spec:
  replicas: 3 # keep me
";

    #[test]
    fn splits_on_separators() {
        let set = DocumentSet::parse(MULTI).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().get(&"kind".parse().unwrap()), Some(&Value::String("Example1".into())));
        assert_eq!(set.get(1).unwrap().get(&"spec.replicas".parse().unwrap()), Some(&Value::Number(3.into())));
    }

    #[test]
    fn render_is_byte_identical() {
        let set = DocumentSet::parse(MULTI).unwrap();
        assert_eq!(set.render(), MULTI);

        let plain = "a: 1\n---\nb: 2";
        assert_eq!(DocumentSet::parse(plain).unwrap().render(), plain);
    }

    #[test]
    fn empty_documents_are_null() {
        let set = DocumentSet::parse("---\n# nothing\n---\na: 1\n").unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.get(0).unwrap().is_empty());
        assert!(!set.get(1).unwrap().is_empty());
    }

    #[test]
    fn inline_document_start_is_rejected() {
        let err = DocumentSet::parse("a: 1\n--- {b: 2}\n").unwrap_err();
        assert!(matches!(err, DocError::InlineDocumentStart { index: 1, line: 2 }));
    }

    #[test]
    fn malformed_document_reports_index() {
        let err = DocumentSet::parse("a: 1\n---\nb: [unclosed\n").unwrap_err();
        assert!(matches!(err, DocError::Parse { index: 1, .. }));
    }

    #[test]
    fn set_line_comment_touches_one_line() {
        let mut set = DocumentSet::parse(MULTI).unwrap();
        let doc = set.get_mut(1).unwrap();
        let previous = doc
            .set_line_comment(&"spec.replicas".parse().unwrap(), r#"{"$openapi":"replicas"}"#)
            .unwrap();
        assert_eq!(previous.as_deref(), Some("keep me"));

        let expected = MULTI.replace("replicas: 3 # keep me", r#"replicas: 3 # {"$openapi":"replicas"}"#);
        assert_eq!(set.render(), expected);
    }

    #[test]
    fn set_line_comment_preserves_crlf() {
        let mut doc = Document::parse("spec:\r\n  list:\r\n  - a\r\n").unwrap();
        doc.set_line_comment(&"spec.list".parse().unwrap(), "m").unwrap();
        assert_eq!(doc.render(), "spec:\r\n  list: # m\r\n  - a\r\n");
    }

    #[test]
    fn set_line_comment_rejects_multi_line_scalars() {
        for text in [
            "spec:\n  note: first part\n    second part\n",
            "spec:\n  note: \"first part\n    second part\"\n",
        ] {
            let mut doc = Document::parse(text).unwrap();
            let err = doc
                .set_line_comment(&"spec.note".parse().unwrap(), r#"{"$openapi":"note"}"#)
                .unwrap_err();
            assert!(matches!(err, DocError::ContentChanged { index: 0, .. }), "{text:?}: {err}");
            assert_eq!(doc.body(), text);
        }
    }

    #[test]
    fn set_line_comment_keeps_block_scalars() {
        let text = "spec:\n  note: |\n    first # not a comment\n    second\n";
        let mut doc = Document::parse(text).unwrap();
        let before = doc.value().clone();
        doc.set_line_comment(&"spec.note".parse().unwrap(), "m").unwrap();
        assert_eq!(doc.body(), "spec:\n  note: | # m\n    first # not a comment\n    second\n");
        assert_eq!(Document::parse(doc.body()).unwrap().value(), &before);
    }

    #[test]
    fn splice_lines_reparses() {
        let mut doc = Document::parse("a: 1\nb: 2\n").unwrap();
        doc.splice_lines(1..2, "b: 3\nc: 4\n").unwrap();
        assert_eq!(doc.body(), "a: 1\nb: 3\nc: 4\n");
        assert_eq!(doc.get(&"c".parse().unwrap()), Some(&Value::Number(4.into())));

        let mut unterminated = Document::parse("a: 1").unwrap();
        unterminated.splice_lines(5..5, "b: 2\n").unwrap();
        assert_eq!(unterminated.body(), "a: 1\nb: 2\n");
    }

    #[test]
    fn failed_splice_leaves_document_unchanged() {
        let mut doc = Document::parse("a: 1\n").unwrap();
        assert!(doc.splice_lines(1..1, "b: [\n").is_err());
        assert_eq!(doc.body(), "a: 1\n");
    }

    #[test]
    fn unlocatable_path_reports_document() {
        let doc = Document::parse("a: 1\n").unwrap();
        let err = doc.locate(&"b".parse().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "cannot locate `b` in document 0: no such node");
    }
}
