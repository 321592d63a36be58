use crate::domain::entities::document::{DocumentMetadata, ScoredDocument};
use crate::domain::error::DomainError;
use crate::domain::values::vector::dot;
use std::cmp::Ordering;

/// Immutable, internally aligned store state: row `i` of the matrix always
/// belongs to `metadata[i]`.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    dimension: Option<usize>,
    /// Row-major N x D matrix.
    vectors: Vec<f32>,
    metadata: Vec<DocumentMetadata>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rebuilds a snapshot from persisted parts, checking that they line up.
    pub fn from_parts(
        dimension: usize,
        vectors: Vec<f32>,
        metadata: Vec<DocumentMetadata>,
    ) -> Result<Self, DomainError> {
        if metadata.is_empty() && vectors.is_empty() {
            return Ok(Self::empty());
        }
        if dimension == 0 {
            return Err(DomainError::Corrupt("vector dimension is zero".into()));
        }
        if vectors.len() != dimension * metadata.len() {
            return Err(DomainError::Corrupt(format!(
                "{} vector values do not fit {} records of dimension {dimension}",
                vectors.len(),
                metadata.len()
            )));
        }
        Ok(Self {
            dimension: Some(dimension),
            vectors,
            metadata,
        })
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn vectors(&self) -> &[f32] {
        &self.vectors
    }

    pub fn metadata(&self) -> &[DocumentMetadata] {
        &self.metadata
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let dim = self.dimension?;
        self.vectors.get(index * dim..(index + 1) * dim)
    }

    /// Returns a copy of this snapshot with one more record. The first record fixes the dimension.
    pub fn appended(&self, vector: Vec<f32>, metadata: DocumentMetadata) -> Result<Self, DomainError> {
        if vector.is_empty() {
            return Err(DomainError::InvalidInput("cannot store an empty vector".into()));
        }
        if let Some(expected) = self.dimension {
            if vector.len() != expected {
                return Err(DomainError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        let mut next = self.clone();
        next.dimension = Some(vector.len());
        next.vectors.extend_from_slice(&vector);
        next.metadata.push(metadata);
        Ok(next)
    }

    /// Scores every row against `query` and returns the top `limit` in
    /// descending order. Equal scores keep insertion order.
    pub fn rank(&self, query: &[f32], limit: usize) -> Result<Vec<ScoredDocument>, DomainError> {
        let dim = match self.dimension {
            Some(dim) if limit > 0 && !self.is_empty() => dim,
            _ => return Ok(vec![]),
        };
        if query.len() != dim {
            return Err(DomainError::DimensionMismatch {
                expected: dim,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f64)> = self
            .vectors
            .chunks_exact(dim)
            .map(|row| dot(row, query))
            .enumerate()
            .collect();
        // `sort_by` is stable, which gives the insertion-order tie-break.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(i, similarity)| ScoredDocument {
                similarity,
                metadata: self.metadata[i].clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(text: &str) -> DocumentMetadata {
        let mut m = DocumentMetadata::new("test");
        m.document = text.to_string();
        m
    }

    #[test]
    fn test_first_append_fixes_dimension() {
        let s = Snapshot::empty().appended(vec![1.0, 0.0], meta("a")).unwrap();
        assert_eq!(s.dimension(), Some(2));
        assert_eq!(s.len(), 1);

        let err = s.appended(vec![1.0, 0.0, 0.0], meta("b")).unwrap_err();
        assert!(matches!(err, DomainError::DimensionMismatch { expected: 2, actual: 3 }));
        assert_eq!(s.len(), 1);
        assert_eq!(s.vectors().len(), 2);
    }

    #[test]
    fn test_rank_orders_and_caps() {
        let s = Snapshot::empty()
            .appended(vec![1.0, 0.0], meta("x"))
            .unwrap()
            .appended(vec![0.0, 1.0], meta("y"))
            .unwrap()
            .appended(vec![0.6, 0.8], meta("xy"))
            .unwrap();

        let hits = s.rank(&[0.0, 1.0], 10).unwrap();
        let texts: Vec<&str> = hits.iter().map(|h| h.text()).collect();
        assert_eq!(texts, vec!["y", "xy", "x"]);
        assert!((hits[1].similarity - 0.8).abs() < 1e-6);

        assert_eq!(s.rank(&[0.0, 1.0], 1).unwrap().len(), 1);
        assert!(s.rank(&[0.0, 1.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_rank_ties_keep_insertion_order() {
        let s = Snapshot::empty()
            .appended(vec![1.0, 0.0], meta("first"))
            .unwrap()
            .appended(vec![0.0, 1.0], meta("other"))
            .unwrap()
            .appended(vec![1.0, 0.0], meta("second"))
            .unwrap();
        let hits = s.rank(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].text(), "first");
        assert_eq!(hits[1].text(), "second");
    }

    #[test]
    fn test_rank_rejects_wrong_query_dimension() {
        let s = Snapshot::empty().appended(vec![1.0, 0.0], meta("a")).unwrap();
        assert!(s.rank(&[1.0], 3).is_err());
        assert!(Snapshot::empty().rank(&[1.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_from_parts_checks_alignment() {
        assert!(Snapshot::from_parts(2, vec![1.0, 0.0, 0.0], vec![meta("a")]).is_err());
        assert!(Snapshot::from_parts(0, vec![1.0], vec![meta("a")]).is_err());
        let s = Snapshot::from_parts(2, vec![1.0, 0.0], vec![meta("a")]).unwrap();
        assert_eq!(s.row(0), Some(&[1.0, 0.0][..]));
        assert_eq!(s.row(1), None);
    }
}
