use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One-hot encoder over several categorical columns.
///
/// Categories are kept sorted per column. Values not seen during fit encode
/// as an all-zero block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OneHotEncoder {
    pub columns: Vec<String>,
    pub categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    /// `values[i]` holds one row's categorical values in `columns` order.
    pub fn fit(columns: Vec<String>, values: &[Vec<&str>]) -> Self {
        let mut seen: Vec<BTreeSet<String>> = vec![BTreeSet::new(); columns.len()];
        for row in values {
            for (slot, value) in seen.iter_mut().zip(row.iter()) {
                slot.insert((*value).to_string());
            }
        }
        Self {
            columns,
            categories: seen.into_iter().map(|set| set.into_iter().collect()).collect(),
        }
    }

    pub fn output_dim(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    pub fn transform_into(&self, row: &[&str], out: &mut Vec<f64>) {
        for (column_categories, value) in self.categories.iter().zip(row.iter()) {
            let hit = column_categories
                .binary_search_by(|category| category.as_str().cmp(*value))
                .ok();
            out.extend((0..column_categories.len()).map(|idx| {
                if Some(idx) == hit {
                    1.0
                } else {
                    0.0
                }
            }));
        }
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(self.categories.iter())
            .flat_map(|(column, categories)| {
                categories
                    .iter()
                    .map(move |category| format!("{}_{}", column, category))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> OneHotEncoder {
        OneHotEncoder::fit(
            vec!["gender".to_string(), "category".to_string()],
            &[vec!["M", "Food"], vec!["F", "Fuel"], vec!["M", "Clothing"]],
        )
    }

    #[test]
    fn categories_are_sorted() {
        let encoder = encoder();
        assert_eq!(encoder.categories[0], vec!["F", "M"]);
        assert_eq!(encoder.categories[1], vec!["Clothing", "Food", "Fuel"]);
        assert_eq!(encoder.output_dim(), 5);
        assert_eq!(encoder.feature_names()[2], "category_Clothing");
    }

    #[test]
    fn known_values_set_one_slot() {
        let mut out = Vec::new();
        encoder().transform_into(&["M", "Fuel"], &mut out);
        assert_eq!(out, vec![0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn unknown_values_encode_as_zeros() {
        let mut out = Vec::new();
        encoder().transform_into(&["X", "Toys"], &mut out);
        assert_eq!(out, vec![0.0; 5]);
    }
}
