// Word-vector spaces and their plain-text file format.
//
//   <vocab_size> <dimension>
//   <character> <d_1> ... <d_D>
//
// Single spaces, `\n` line endings, one line per vocabulary entry in
// insertion order. Reading is strict: a short row, an unparseable number or
// a header that disagrees with the body is a `Malformed` error.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::{require_file, PipelineError};
use crate::output;

/// Character → fixed-dimension vector, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingSpace {
    dim: usize,
    characters: Vec<char>,
    index: HashMap<char, usize>,
    vectors: Vec<Vec<f64>>,
}

impl EmbeddingSpace {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            characters: Vec::new(),
            index: HashMap::new(),
            vectors: Vec::new(),
        }
    }

    /// Add or replace the vector for `c`.
    ///
    /// Returns the offending length as `Err` when it doesn't match the space.
    pub fn insert(&mut self, c: char, vector: Vec<f64>) -> Result<(), usize> {
        if vector.len() != self.dim {
            return Err(vector.len());
        }
        match self.index.get(&c) {
            Some(&i) => self.vectors[i] = vector,
            None => {
                self.index.insert(c, self.characters.len());
                self.characters.push(c);
                self.vectors.push(vector);
            }
        }
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.index.contains_key(&c)
    }

    pub fn vector(&self, c: char) -> Option<&[f64]> {
        self.index.get(&c).map(|&i| self.vectors[i].as_slice())
    }

    /// Characters in insertion order.
    pub fn characters(&self) -> &[char] {
        &self.characters
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &[f64])> + '_ {
        self.characters
            .iter()
            .zip(&self.vectors)
            .map(|(&c, v)| (c, v.as_slice()))
    }

    /// Render the text format. Floats use the shortest representation that
    /// reads back to the same value.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {}", self.len(), self.dim);
        for (c, v) in self.iter() {
            out.push(c);
            for x in v {
                let _ = write!(out, " {x}");
            }
            out.push('\n');
        }
        out
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        output::ensure_parent(path)?;
        fs::write(path, self.to_text())
            .with_context(|| format!("Failed to write vectors to {}", path.display()))?;
        debug!(words = self.len(), dim = self.dim, path = %path.display(), "Saved embedding space");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        require_file(path)?;
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read vectors from {}", path.display()))?;
        let space = Self::parse(&text, path)?;
        debug!(words = space.len(), dim = space.dim, path = %path.display(), "Loaded embedding space");
        Ok(space)
    }

    /// Parse the text format. `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self, PipelineError> {
        let malformed = |line: usize, detail: String| PipelineError::Malformed {
            what: "word-vector file",
            path: path.to_path_buf(),
            line,
            detail,
        };

        let mut lines = text.lines().enumerate();
        let (_, header) = lines
            .next()
            .ok_or_else(|| PipelineError::EmptyInput {
                path: path.to_path_buf(),
            })?;
        let mut fields = header.split_whitespace();
        let (count, dim) = match (fields.next(), fields.next(), fields.next()) {
            (Some(n), Some(d), None) => match (n.parse::<usize>(), d.parse::<usize>()) {
                (Ok(n), Ok(d)) => (n, d),
                _ => return Err(malformed(1, format!("bad header '{header}'"))),
            },
            _ => return Err(malformed(1, format!("bad header '{header}'"))),
        };

        let mut space = Self::new(dim);
        for (i, line) in lines {
            let line_no = i + 1;
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split(' ').filter(|f| !f.is_empty());
            let word = fields.next().unwrap_or_default();
            let mut chars = word.chars();
            let c = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(malformed(line_no, format!("'{word}' is not a single character"))),
            };
            let vector = fields
                .map(|f| f.parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| malformed(line_no, e.to_string()))?;
            space
                .insert(c, vector)
                .map_err(|found| malformed(line_no, format!("expected {dim} values, found {found}")))?;
        }

        if space.len() != count {
            return Err(malformed(
                1,
                format!("header declares {count} vectors, body has {}", space.len()),
            ));
        }
        Ok(space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EmbeddingSpace {
        let mut space = EmbeddingSpace::new(2);
        space.insert('月', vec![0.5, -1.25]).unwrap();
        space.insert('山', vec![3.0, 0.1]).unwrap();
        space
    }

    #[test]
    fn test_text_format() {
        assert_eq!(sample().to_text(), "2 2\n月 0.5 -1.25\n山 3 0.1\n");
    }

    #[test]
    fn test_parse_reads_back() {
        let space = sample();
        let parsed = EmbeddingSpace::parse(&space.to_text(), Path::new("x.txt")).unwrap();
        assert_eq!(parsed, space);
    }

    #[test]
    fn test_insert_wrong_dimension() {
        let mut space = EmbeddingSpace::new(3);
        assert_eq!(space.insert('水', vec![1.0]), Err(1));
        assert!(space.is_empty());
    }

    #[test]
    fn test_parse_short_row_is_malformed() {
        let err = EmbeddingSpace::parse("1 3\n水 1 2\n", Path::new("x.txt")).unwrap_err();
        assert!(matches!(err, PipelineError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_parse_count_mismatch_is_malformed() {
        let err = EmbeddingSpace::parse("2 1\n水 1\n", Path::new("x.txt")).unwrap_err();
        assert!(matches!(err, PipelineError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_parse_empty_file() {
        let err = EmbeddingSpace::parse("", Path::new("x.txt")).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EmbeddingSpace::load(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingInput { .. })
        ));
    }
}
