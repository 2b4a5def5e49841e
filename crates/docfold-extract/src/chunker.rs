//! Format-agnostic chunker.
//!
//! Folds an ordered sequence of text units into chunks of at most
//! `budget` characters, joining units with a newline. Units are never
//! split: a single unit larger than the budget becomes its own chunk.

use docfold_core::{Chunk, SourceRef, TextUnit};

/// Chunker settings.
#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    /// Maximum chunk size in characters. The joining newline counts
    /// against the budget.
    pub budget: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self { budget: 1000 }
    }
}

/// Stateless folder from text units to chunks.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Fold units into chunks, preserving unit order and content exactly.
    pub fn fold(&self, units: &[TextUnit]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut acc = String::new();
        let mut acc_chars = 0usize;
        let mut span: Option<(SourceRef, SourceRef)> = None;

        for unit in units {
            let unit_chars = unit.text.chars().count();

            match span {
                None => {
                    acc.push_str(&unit.text);
                    acc_chars = unit_chars;
                    span = Some((unit.source_ref.clone(), unit.source_ref.clone()));
                }
                Some((start, end)) => {
                    // +1 for the joining newline
                    if acc_chars + 1 + unit_chars > self.config.budget {
                        chunks.push(make_chunk(chunks.len(), start, end, &mut acc, acc_chars));
                        acc.push_str(&unit.text);
                        acc_chars = unit_chars;
                        span = Some((unit.source_ref.clone(), unit.source_ref.clone()));
                    } else {
                        acc.push('\n');
                        acc.push_str(&unit.text);
                        acc_chars += 1 + unit_chars;
                        span = Some((start, unit.source_ref.clone()));
                    }
                }
            }
        }

        if let Some((start, end)) = span {
            chunks.push(make_chunk(chunks.len(), start, end, &mut acc, acc_chars));
        }

        chunks
    }
}

fn make_chunk(
    chunk_id: usize,
    span_start: SourceRef,
    span_end: SourceRef,
    acc: &mut String,
    char_count: usize,
) -> Chunk {
    Chunk {
        chunk_id,
        span_start,
        span_end,
        text: std::mem::take(acc),
        char_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(i: usize, text: &str) -> TextUnit {
        TextUnit::new(i, text, SourceRef::Line { line: i })
    }

    fn chunker(budget: usize) -> Chunker {
        Chunker::new(ChunkerConfig { budget })
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunker(1000).fold(&[]).is_empty());
    }

    #[test]
    fn test_units_fit_in_one_chunk() {
        let units = vec![unit(0, "alpha"), unit(1, "beta"), unit(2, "gamma")];
        let chunks = chunker(1000).fold(&units);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "alpha\nbeta\ngamma");
        assert_eq!(chunks[0].char_count, 16);
        assert_eq!(chunks[0].span_start, SourceRef::Line { line: 0 });
        assert_eq!(chunks[0].span_end, SourceRef::Line { line: 2 });
    }

    #[test]
    fn test_budget_splits_three_lines_into_two_chunks() {
        // Three 400-char lines against a 1000-char budget: the first two
        // fit (801 chars with the newline), the third would make 1202.
        let line = "x".repeat(400);
        let units = vec![unit(0, &line), unit(1, &line), unit(2, &line)];
        let chunks = chunker(1000).fold(&units);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].char_count, 801);
        assert_eq!(chunks[0].span_start, SourceRef::Line { line: 0 });
        assert_eq!(chunks[0].span_end, SourceRef::Line { line: 1 });
        assert_eq!(chunks[1].char_count, 400);
        assert_eq!(chunks[1].span_start, SourceRef::Line { line: 2 });
        assert_eq!(chunks[1].span_end, SourceRef::Line { line: 2 });
    }

    #[test]
    fn test_oversized_unit_gets_its_own_chunk() {
        let big = "y".repeat(5000);
        let units = vec![unit(0, "small"), unit(1, &big), unit(2, "tail")];
        let chunks = chunker(1000).fold(&units);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "small");
        assert_eq!(chunks[1].char_count, 5000);
        assert_eq!(chunks[2].text, "tail");
    }

    #[test]
    fn test_exact_fit_is_not_split() {
        // 499 + 1 + 500 = 1000, exactly the budget
        let a = "a".repeat(499);
        let b = "b".repeat(500);
        let chunks = chunker(1000).fold(&[unit(0, &a), unit(1, &b)]);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].char_count, 1000);
    }

    #[test]
    fn test_partition_preserves_all_text() {
        let units: Vec<TextUnit> = (0..50)
            .map(|i| unit(i, &format!("line number {i} with some padding")))
            .collect();
        let chunks = chunker(100).fold(&units);

        let rejoined: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let expected: Vec<String> = units.iter().map(|u| u.text.clone()).collect();
        assert_eq!(rejoined.join("\n"), expected.join("\n"));

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_id, i);
            assert_eq!(chunk.char_count, chunk.text.chars().count());
        }
    }

    #[test]
    fn test_char_budget_counts_chars_not_bytes() {
        // Multibyte characters: 4 chars each, 12 bytes each
        let units = vec![unit(0, "日本語文"), unit(1, "日本語文")];
        let chunks = chunker(9).fold(&units);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].char_count, 9);
    }
}
