use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ModelError;

pub const DEFAULT_NEIGHBOURS: usize = 5;

/// Synthetic minority oversampling on an already encoded matrix.
#[derive(Debug, Clone, Copy)]
pub struct Smote {
    pub k_neighbours: usize,
    pub seed: u64,
}

impl Default for Smote {
    fn default() -> Self {
        Self {
            k_neighbours: DEFAULT_NEIGHBOURS,
            seed: 42,
        }
    }
}

impl Smote {
    /// Appends synthetic minority rows until both classes have the same
    /// count. Original rows keep their order at the front.
    pub fn fit_resample(
        &self,
        rows: &[Vec<f64>],
        labels: &[u8],
    ) -> Result<(Vec<Vec<f64>>, Vec<u8>), ModelError> {
        if rows.len() != labels.len() {
            return Err(ModelError::DimensionMismatch {
                expected: rows.len(),
                found: labels.len(),
            });
        }
        let positives = labels.iter().filter(|label| **label == 1).count();
        let negatives = labels.len() - positives;
        if positives == 0 || negatives == 0 {
            return Err(ModelError::SingleClass(if positives == 0 { 0 } else { 1 }));
        }

        let mut out_rows = rows.to_vec();
        let mut out_labels = labels.to_vec();
        if positives == negatives {
            return Ok((out_rows, out_labels));
        }

        let minority_label = if positives < negatives { 1u8 } else { 0u8 };
        let minority: Vec<&Vec<f64>> = rows
            .iter()
            .zip(labels.iter())
            .filter(|(_, label)| **label == minority_label)
            .map(|(row, _)| row)
            .collect();
        if minority.len() < 2 {
            return Err(ModelError::InsufficientMinority(minority.len()));
        }

        let k = self.k_neighbours.min(minority.len() - 1).max(1);
        let neighbours = nearest_neighbours(&minority, k);
        let needed = positives.abs_diff(negatives);

        let mut rng = StdRng::seed_from_u64(self.seed);
        for _ in 0..needed {
            let base = rng.gen_range(0..minority.len());
            let neighbour = neighbours[base][rng.gen_range(0..k)];
            let gap: f64 = rng.gen();
            let synthetic = minority[base]
                .iter()
                .zip(minority[neighbour].iter())
                .map(|(a, b)| a + gap * (b - a))
                .collect();
            out_rows.push(synthetic);
            out_labels.push(minority_label);
        }

        Ok((out_rows, out_labels))
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest_neighbours(points: &[&Vec<f64>], k: usize) -> Vec<Vec<usize>> {
    points
        .iter()
        .enumerate()
        .map(|(idx, point)| {
            let mut distances: Vec<(f64, usize)> = points
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != idx)
                .map(|(other, candidate)| (squared_distance(point, candidate), other))
                .collect();
            distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            distances.into_iter().take(k).map(|(_, other)| other).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imbalanced() -> (Vec<Vec<f64>>, Vec<u8>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            rows.push(vec![i as f64 * 0.1, 0.0]);
            labels.push(0);
        }
        for i in 0..6 {
            rows.push(vec![10.0 + i as f64, 5.0]);
            labels.push(1);
        }
        (rows, labels)
    }

    #[test]
    fn output_is_balanced() {
        let (rows, labels) = imbalanced();
        let (out_rows, out_labels) = Smote::default().fit_resample(&rows, &labels).expect("smote");
        let positives = out_labels.iter().filter(|l| **l == 1).count();
        assert_eq!(positives, 40);
        assert_eq!(out_labels.len(), 80);
        assert_eq!(out_rows.len(), 80);
        assert_eq!(&out_rows[..rows.len()], &rows[..]);
    }

    #[test]
    fn synthetic_rows_lie_between_minority_samples() {
        let (rows, labels) = imbalanced();
        let (out_rows, _) = Smote::default().fit_resample(&rows, &labels).expect("smote");
        for row in &out_rows[rows.len()..] {
            assert!((10.0..=15.0).contains(&row[0]));
            assert_eq!(row[1], 5.0);
        }
    }

    #[test]
    fn seeded_runs_match() {
        let (rows, labels) = imbalanced();
        let first = Smote::default().fit_resample(&rows, &labels).expect("smote");
        let second = Smote::default().fit_resample(&rows, &labels).expect("smote");
        assert_eq!(first, second);
    }

    #[test]
    fn single_minority_sample_is_an_error() {
        let rows = vec![vec![0.0], vec![1.0], vec![2.0]];
        let labels = vec![0, 0, 1];
        assert!(matches!(
            Smote::default().fit_resample(&rows, &labels),
            Err(ModelError::InsufficientMinority(1))
        ));
    }

    #[test]
    fn few_minority_samples_shrink_k() {
        let rows = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![10.0], vec![12.0]];
        let labels = vec![0, 0, 0, 0, 1, 1];
        let (out_rows, out_labels) = Smote::default().fit_resample(&rows, &labels).expect("smote");
        assert_eq!(out_labels.iter().filter(|l| **l == 1).count(), 4);
        assert!(out_rows[6..].iter().all(|row| (10.0..=12.0).contains(&row[0])));
    }
}
