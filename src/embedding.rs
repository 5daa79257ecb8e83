//! Word embeddings and the queries the game needs from them.
//!
//! The engine only talks to [`EmbeddingProvider`]. [`VectorTable`] is the
//! concrete provider backed by a plain-text word2vec file.

use crate::error::EmbeddingError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Upper bound on rows reserved up front when loading a table.
const MAX_PREALLOCATED_ROWS: usize = 1 << 16;

/// Read-only access to a word embedding model.
pub trait EmbeddingProvider: Send + Sync {
    /// Whether `word` is in the vocabulary.
    fn contains(&self, word: &str) -> bool;

    /// Similarity of two words, `0.0` if either is out of vocabulary.
    fn similarity(&self, a: &str, b: &str) -> f32;

    /// Up to `top_n` words closest to `word`, best first, excluding `word`
    /// itself. Empty when `word` is out of vocabulary.
    fn nearest_neighbors(&self, word: &str, top_n: usize) -> Vec<(String, f32)>;
}

/// Unit-normalised word vectors held in memory.
#[derive(Debug, Default)]
pub struct VectorTable {
    words: Vec<String>,
    index: HashMap<String, usize>,
    vectors: Vec<Vec<f32>>,
}

impl VectorTable {
    /// Build a table from `(word, vector)` pairs. Later duplicates are ignored.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut table = Self::default();
        for (word, vector) in entries {
            table.insert(word, vector);
        }
        table
    }

    /// Load a word2vec text file, keeping at most `limit` rows if given.
    pub fn load<P: AsRef<Path>>(path: P, limit: Option<usize>) -> Result<Self, EmbeddingError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| EmbeddingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), limit).map_err(|e| match e {
            EmbeddingError::Read { source, .. } => EmbeddingError::Read {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse word2vec text from any reader.
    pub fn from_reader<R: BufRead>(reader: R, limit: Option<usize>) -> Result<Self, EmbeddingError> {
        let mut lines = reader.lines();
        let header = match lines.next() {
            Some(line) => line.map_err(read_error)?,
            None => return Err(EmbeddingError::Empty),
        };
        let (count, dims) = parse_header(&header)?;
        let rows = limit.map_or(count, |l| l.min(count));
        // The header is untrusted; it bounds the rows read, not the reservation.
        let reserve = rows.min(MAX_PREALLOCATED_ROWS);

        let mut table = Self {
            words: Vec::with_capacity(reserve),
            index: HashMap::with_capacity(reserve),
            vectors: Vec::with_capacity(reserve),
        };

        for (offset, line) in lines.enumerate() {
            if table.len() >= rows {
                break;
            }
            let line = line.map_err(read_error)?;
            let line_no = offset + 2;
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let vector = parts
                .map(|value| {
                    value.parse::<f32>().map_err(|_| EmbeddingError::Component {
                        line: line_no,
                        value: value.to_string(),
                    })
                })
                .collect::<Result<Vec<f32>, _>>()?;
            if vector.len() != dims {
                return Err(EmbeddingError::Dimensions {
                    line: line_no,
                    expected: dims,
                    found: vector.len(),
                });
            }
            table.insert(word.to_string(), vector);
        }

        if table.is_empty() {
            return Err(EmbeddingError::Empty);
        }
        log::info!(
            "Loaded {} word vectors ({} dimensions)",
            table.len(),
            dims
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn insert(&mut self, word: String, mut vector: Vec<f32>) {
        if self.index.contains_key(&word) {
            return;
        }
        normalize(&mut vector);
        self.index.insert(word.clone(), self.words.len());
        self.words.push(word);
        self.vectors.push(vector);
    }

    fn vector(&self, word: &str) -> Option<&[f32]> {
        self.index.get(word).map(|&i| self.vectors[i].as_slice())
    }
}

impl EmbeddingProvider for VectorTable {
    fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    fn similarity(&self, a: &str, b: &str) -> f32 {
        match (self.vector(a), self.vector(b)) {
            (Some(va), Some(vb)) => dot(va, vb),
            _ => 0.0,
        }
    }

    fn nearest_neighbors(&self, word: &str, top_n: usize) -> Vec<(String, f32)> {
        let Some(&origin) = self.index.get(word) else {
            return Vec::new();
        };
        let query = &self.vectors[origin];
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != origin)
            .map(|(i, v)| (i, dot(query, v)))
            .collect();
        // Stable sort keeps file order among equal scores.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
            .into_iter()
            .take(top_n)
            .map(|(i, score)| (self.words[i].clone(), score))
            .collect()
    }
}

fn read_error(source: std::io::Error) -> EmbeddingError {
    EmbeddingError::Read {
        path: Default::default(),
        source,
    }
}

fn parse_header(line: &str) -> Result<(usize, usize), EmbeddingError> {
    let mut parts = line.split_whitespace();
    match (
        parts.next().and_then(|c| c.parse::<usize>().ok()),
        parts.next().and_then(|d| d.parse::<usize>().ok()),
        parts.next(),
    ) {
        (Some(count), Some(dims), None) if dims > 0 => Ok((count, dims)),
        _ => Err(EmbeddingError::Header { line: 1 }),
    }
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn sample_table() -> VectorTable {
        VectorTable::from_entries([
            ("apple".to_string(), vec![1.0, 0.0, 0.0]),
            ("pear".to_string(), vec![0.9, 0.1, 0.0]),
            ("plum".to_string(), vec![0.7, 0.7, 0.0]),
            ("rock".to_string(), vec![0.0, 0.0, 1.0]),
        ])
    }

    #[test]
    fn test_similarity_is_cosine() {
        let table = sample_table();
        assert!((table.similarity("apple", "apple") - 1.0).abs() < 1e-6);
        assert!(table.similarity("apple", "rock").abs() < 1e-6);
        let expected = 0.7 / (0.7f32 * 0.7 + 0.7 * 0.7).sqrt();
        assert!((table.similarity("apple", "plum") - expected).abs() < 1e-5);
    }

    #[test]
    fn test_similarity_out_of_vocabulary_is_zero() {
        let table = sample_table();
        assert_eq!(table.similarity("apple", "missing"), 0.0);
        assert_eq!(table.similarity("missing", "apple"), 0.0);
    }

    #[test]
    fn test_nearest_neighbors_excludes_query_and_sorts() {
        let table = sample_table();
        let neighbors = table.nearest_neighbors("apple", 10);
        let words: Vec<&str> = neighbors.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["pear", "plum", "rock"]);
        assert!(neighbors.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_nearest_neighbors_respects_top_n() {
        let table = sample_table();
        assert_eq!(table.nearest_neighbors("apple", 2).len(), 2);
        assert!(table.nearest_neighbors("missing", 2).is_empty());
    }

    #[test]
    fn test_from_reader_parses_word2vec_text() {
        let data = "3 2\n犬 1.0 0.0\n猫 0.8 0.2\n石 0.0 1.0\n";
        let table = VectorTable::from_reader(Cursor::new(data), None).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.contains("猫"));
    }

    #[test]
    fn test_from_reader_applies_limit() {
        let data = "3 2\na 1.0 0.0\nb 0.8 0.2\nc 0.0 1.0\n";
        let table = VectorTable::from_reader(Cursor::new(data), Some(2)).unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table.contains("c"));
    }

    #[test]
    fn test_from_reader_header_overstates_row_count() {
        let data = "999999999999999 2\na 1.0 0.0\nb 0.0 1.0\n";
        let table = VectorTable::from_reader(Cursor::new(data), None).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.contains("b"));
    }

    #[test]
    fn test_from_reader_rejects_bad_header() {
        let result = VectorTable::from_reader(Cursor::new("not a header\n"), None);
        assert!(matches!(result, Err(EmbeddingError::Header { line: 1 })));
    }

    #[test]
    fn test_from_reader_rejects_wrong_dimensions() {
        let data = "2 3\na 1.0 0.0 0.0\nb 1.0 0.0\n";
        let result = VectorTable::from_reader(Cursor::new(data), None);
        assert!(matches!(
            result,
            Err(EmbeddingError::Dimensions {
                line: 3,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_from_reader_rejects_bad_component() {
        let data = "1 2\na 1.0 x\n";
        let result = VectorTable::from_reader(Cursor::new(data), None);
        assert!(matches!(result, Err(EmbeddingError::Component { line: 2, .. })));
    }

    #[test]
    fn test_from_reader_empty_input() {
        let result = VectorTable::from_reader(Cursor::new(""), None);
        assert!(matches!(result, Err(EmbeddingError::Empty)));
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let result = VectorTable::load("/nonexistent/vectors.vec", None);
        match result {
            Err(EmbeddingError::Read { path, .. }) => {
                assert_eq!(path, Path::new("/nonexistent/vectors.vec"));
            }
            _ => panic!("Expected Read error"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "2 2").unwrap();
        writeln!(file, "sun 1.0 0.0").unwrap();
        writeln!(file, "moon 0.6 0.8").unwrap();
        let table = VectorTable::load(file.path(), None).unwrap();
        assert!((table.similarity("sun", "moon") - 0.6).abs() < 1e-6);
    }
}
