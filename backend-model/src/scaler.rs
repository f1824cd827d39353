use serde::{Deserialize, Serialize};

/// Standardizes numeric columns with population mean and variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[Vec<f64>], width: usize) -> Self {
        let n = rows.len().max(1) as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (acc, value) in mean.iter_mut().zip(row.iter()) {
                *acc += value;
            }
        }
        mean.iter_mut().for_each(|acc| *acc /= n);

        let mut variance = vec![0.0; width];
        for row in rows {
            for ((acc, value), mu) in variance.iter_mut().zip(row.iter()).zip(mean.iter()) {
                *acc += (value - mu) * (value - mu);
            }
        }
        let scale = variance
            .into_iter()
            .map(|sum| {
                let std = (sum / n).sqrt();
                // constant columns pass through centered
                if std == 0.0 || !std.is_finite() {
                    1.0
                } else {
                    std
                }
            })
            .collect();
        Self { mean, scale }
    }

    pub fn transform_into(&self, row: &[f64], out: &mut Vec<f64>) {
        out.extend(
            row.iter()
                .zip(self.mean.iter().zip(self.scale.iter()))
                .map(|(value, (mu, sigma))| (value - mu) / sigma),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_population_variance() {
        let scaler = StandardScaler::fit(&[vec![1.0], vec![3.0]], 1);
        assert_eq!(scaler.mean, vec![2.0]);
        assert_eq!(scaler.scale, vec![1.0]);
        let mut out = Vec::new();
        scaler.transform_into(&[3.0], &mut out);
        assert_eq!(out, vec![1.0]);
    }

    #[test]
    fn constant_column_gets_unit_scale() {
        let scaler = StandardScaler::fit(&[vec![5.0, 0.0], vec![5.0, 4.0]], 2);
        assert_eq!(scaler.scale, vec![1.0, 2.0]);
        let mut out = Vec::new();
        scaler.transform_into(&[5.0, 2.0], &mut out);
        assert_eq!(out, vec![0.0, 0.0]);
    }
}
