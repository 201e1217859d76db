//! Exact k-nearest-neighbor search under Euclidean distance.
//!
//! Brute force over raw feature values; no scaling is applied, since
//! rescaling changes which neighbors are selected. Results are ordered by
//! distance with ties broken by the lower point offset, which keeps the
//! search deterministic for duplicated points.

use crate::errors::{validate_width, ForensicError, ForensicResult};
use std::cmp::Ordering;

/// One search hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Offset of the point within the indexed set
    pub index: usize,
    /// Euclidean distance to the query
    pub distance: f64,
}

/// Squared Euclidean distance between two equal-width vectors.
#[inline]
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index over a borrowed set of feature vectors.
#[derive(Debug, Clone)]
pub struct NearestNeighbors<'a> {
    points: Vec<&'a [f64]>,
    width: usize,
}

impl<'a> NearestNeighbors<'a> {
    /// Build an index over `points`. All points must share one width.
    pub fn fit(points: Vec<&'a [f64]>) -> ForensicResult<Self> {
        let width = points
            .first()
            .map(|p| p.len())
            .ok_or(ForensicError::InsufficientData {
                required: 1,
                actual: 0,
            })?;
        for (i, p) in points.iter().enumerate() {
            validate_width(width, p.len(), &format!("neighbor index point {}", i))?;
        }
        Ok(Self { points, width })
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the index is empty (never true for a fitted index).
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The `k` indexed points closest to `query`, nearest first.
    ///
    /// `k` is capped at the number of indexed points.
    pub fn kneighbors(&self, query: &[f64], k: usize) -> ForensicResult<Vec<Neighbor>> {
        validate_width(self.width, query.len(), "neighbor query")?;
        let mut hits: Vec<(usize, f64)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, squared_euclidean(query, p)))
            .collect();
        hits.sort_by(by_distance_then_index);
        hits.truncate(k.min(self.points.len()));

        Ok(hits
            .into_iter()
            .map(|(index, d2)| Neighbor {
                index,
                distance: d2.sqrt(),
            })
            .collect())
    }

    /// Neighbor lists of every indexed point against the index itself.
    ///
    /// Each list has `min(n_neighbors, len)` offsets and starts with the
    /// point's own offset, followed by the nearest other points. A point
    /// that has exact duplicates still comes first in its own list.
    pub fn kneighbors_of_members(&self, n_neighbors: usize) -> Vec<Vec<usize>> {
        let n_neighbors = n_neighbors.min(self.points.len());
        (0..self.points.len())
            .map(|i| {
                if n_neighbors == 0 {
                    return Vec::new();
                }
                let mut others: Vec<(usize, f64)> = self
                    .points
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(j, p)| (j, squared_euclidean(self.points[i], p)))
                    .collect();
                others.sort_by(by_distance_then_index);

                let mut list = Vec::with_capacity(n_neighbors);
                list.push(i);
                list.extend(others.into_iter().take(n_neighbors - 1).map(|(j, _)| j));
                list
            })
            .collect()
    }
}

fn by_distance_then_index(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn line_points() -> Vec<Vec<f64>> {
        vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![3.0, 0.0], vec![10.0, 0.0]]
    }

    #[test]
    fn test_squared_euclidean() {
        assert_approx_eq!(squared_euclidean(&[0.0, 0.0], &[3.0, 4.0]), 25.0, 1e-12);
        assert_eq!(squared_euclidean(&[1.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_kneighbors_orders_by_distance() {
        let points = line_points();
        let index = NearestNeighbors::fit(points.iter().map(|p| p.as_slice()).collect()).unwrap();

        let hits = index.kneighbors(&[2.6, 0.0], 3).unwrap();
        let order: Vec<usize> = hits.iter().map(|h| h.index).collect();
        assert_eq!(order, vec![2, 1, 0]);
        assert_approx_eq!(hits[0].distance, 0.4, 1e-12);

        // k is capped at the index size
        assert_eq!(index.kneighbors(&[0.0, 0.0], 99).unwrap().len(), 4);
    }

    #[test]
    fn test_kneighbors_width_mismatch() {
        let points = line_points();
        let index = NearestNeighbors::fit(points.iter().map(|p| p.as_slice()).collect()).unwrap();
        assert!(matches!(
            index.kneighbors(&[1.0], 1),
            Err(ForensicError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_fit_rejects_empty_and_ragged() {
        assert!(NearestNeighbors::fit(Vec::new()).is_err());
        let a = [1.0, 2.0];
        let b = [1.0];
        assert!(NearestNeighbors::fit(vec![&a[..], &b[..]]).is_err());
    }

    #[test]
    fn test_member_lists_start_with_self() {
        let points = line_points();
        let index = NearestNeighbors::fit(points.iter().map(|p| p.as_slice()).collect()).unwrap();

        let lists = index.kneighbors_of_members(3);
        assert_eq!(lists[0], vec![0, 1, 2]);
        assert_eq!(lists[1], vec![1, 0, 2]);
        assert_eq!(lists[2], vec![2, 1, 0]);
        assert_eq!(lists[3], vec![3, 2, 1]);
    }

    #[test]
    fn test_member_lists_shrink_to_population() {
        let points = vec![vec![0.0], vec![5.0]];
        let index = NearestNeighbors::fit(points.iter().map(|p| p.as_slice()).collect()).unwrap();
        let lists = index.kneighbors_of_members(6);
        assert_eq!(lists, vec![vec![0, 1], vec![1, 0]]);
    }

    #[test]
    fn test_duplicates_keep_self_first() {
        let points = vec![vec![1.0, 1.0], vec![1.0, 1.0], vec![2.0, 2.0]];
        let index = NearestNeighbors::fit(points.iter().map(|p| p.as_slice()).collect()).unwrap();
        let lists = index.kneighbors_of_members(2);
        assert_eq!(lists[0], vec![0, 1]);
        assert_eq!(lists[1], vec![1, 0]);
    }
}
