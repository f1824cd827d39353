use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Stratified train/test split over binary labels.
///
/// Each class contributes `round(test_size * class_count)` rows to the test
/// side (at least one when the class has two or more rows). Returns
/// `(train_indices, test_indices)`.
pub fn stratified_split(labels: &[u8], test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for class in [0u8, 1u8] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == class)
            .map(|(idx, _)| idx)
            .collect();
        if members.is_empty() {
            continue;
        }
        members.shuffle(&mut rng);
        let mut n_test = (members.len() as f64 * test_size).round() as usize;
        if members.len() >= 2 {
            n_test = n_test.clamp(1, members.len() - 1);
        } else {
            n_test = 0;
        }
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_class_ratio_on_both_sides() {
        let mut labels = vec![0u8; 900];
        labels.extend(vec![1u8; 100]);
        let (train, test) = stratified_split(&labels, 0.35, 42);
        assert_eq!(train.len() + test.len(), 1000);
        assert_eq!(test.len(), 350);
        assert_eq!(test.iter().filter(|idx| labels[**idx] == 1).count(), 35);
        assert_eq!(train.iter().filter(|idx| labels[**idx] == 1).count(), 65);
    }

    #[test]
    fn split_is_deterministic_and_disjoint() {
        let labels: Vec<u8> = (0..200).map(|i| u8::from(i % 7 == 0)).collect();
        let first = stratified_split(&labels, 0.35, 42);
        let second = stratified_split(&labels, 0.35, 42);
        assert_eq!(first, second);
        assert!(first.1.iter().all(|idx| !first.0.contains(idx)));
    }
}
