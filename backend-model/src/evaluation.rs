use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfusionMatrix {
    pub true_negative: u64,
    pub false_positive: u64,
    pub false_negative: u64,
    pub true_positive: u64,
}

impl ConfusionMatrix {
    pub fn from_predictions(labels: &[u8], predictions: &[u8]) -> Self {
        let mut matrix = Self::default();
        for (label, prediction) in labels.iter().zip(predictions.iter()) {
            match (label, prediction) {
                (0, 0) => matrix.true_negative += 1,
                (0, _) => matrix.false_positive += 1,
                (_, 0) => matrix.false_negative += 1,
                _ => matrix.true_positive += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> u64 {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    /// Rows are actual classes, columns predicted classes.
    pub fn as_rows(&self) -> [[u64; 2]; 2] {
        [
            [self.true_negative, self.false_positive],
            [self.false_negative, self.true_positive],
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: u64,
}

impl ClassMetrics {
    fn new(true_hits: u64, predicted: u64, support: u64) -> Self {
        let precision = ratio(true_hits, predicted);
        let recall = ratio(true_hits, support);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            precision,
            recall,
            f1,
            support,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub legit: ClassMetrics,
    pub fraud: ClassMetrics,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub confusion_matrix: ConfusionMatrix,
    pub classification: ClassificationReport,
    pub roc_auc: f64,
    /// x = false positive rate, y = true positive rate
    pub roc_curve: Vec<CurvePoint>,
    /// x = recall, y = precision
    pub pr_curve: Vec<CurvePoint>,
    pub average_precision: f64,
}

impl EvaluationReport {
    pub fn evaluate(labels: &[u8], scores: &[f64], threshold: f64) -> Self {
        let predictions: Vec<u8> = scores.iter().map(|p| u8::from(*p > threshold)).collect();
        let confusion_matrix = ConfusionMatrix::from_predictions(labels, &predictions);
        let classification = classification_report(&confusion_matrix);
        let roc_curve = roc_curve(labels, scores);
        let roc_auc = trapezoid(&roc_curve);
        let pr_curve = precision_recall_curve(labels, scores);
        let average_precision = average_precision(&pr_curve);
        Self {
            confusion_matrix,
            classification,
            roc_auc,
            roc_curve,
            pr_curve,
            average_precision,
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

pub fn classification_report(matrix: &ConfusionMatrix) -> ClassificationReport {
    let legit = ClassMetrics::new(
        matrix.true_negative,
        matrix.true_negative + matrix.false_negative,
        matrix.true_negative + matrix.false_positive,
    );
    let fraud = ClassMetrics::new(
        matrix.true_positive,
        matrix.true_positive + matrix.false_positive,
        matrix.true_positive + matrix.false_negative,
    );
    let total = matrix.total();
    let accuracy = ratio(matrix.true_negative + matrix.true_positive, total);
    let macro_avg = ClassMetrics {
        precision: (legit.precision + fraud.precision) / 2.0,
        recall: (legit.recall + fraud.recall) / 2.0,
        f1: (legit.f1 + fraud.f1) / 2.0,
        support: total,
    };
    let weight = |a: f64, b: f64| {
        if total == 0 {
            0.0
        } else {
            (a * legit.support as f64 + b * fraud.support as f64) / total as f64
        }
    };
    let weighted_avg = ClassMetrics {
        precision: weight(legit.precision, fraud.precision),
        recall: weight(legit.recall, fraud.recall),
        f1: weight(legit.f1, fraud.f1),
        support: total,
    };
    ClassificationReport {
        legit,
        fraud,
        accuracy,
        macro_avg,
        weighted_avg,
    }
}

/// Cumulative (false positives, true positives) at each distinct score,
/// walking scores from high to low.
fn cumulative_counts(labels: &[u8], scores: &[f64]) -> Vec<(u64, u64, f64)> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));
    let mut out = Vec::new();
    let (mut fp, mut tp) = (0u64, 0u64);
    for (pos, idx) in order.iter().enumerate() {
        if labels[*idx] == 1 {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_run = order
            .get(pos + 1)
            .map(|next| scores[*next] != scores[*idx])
            .unwrap_or(true);
        if last_of_run {
            out.push((fp, tp, scores[*idx]));
        }
    }
    out
}

pub fn roc_curve(labels: &[u8], scores: &[f64]) -> Vec<CurvePoint> {
    let positives = labels.iter().filter(|l| **l == 1).count() as u64;
    let negatives = labels.len() as u64 - positives;
    let mut curve = vec![CurvePoint {
        x: 0.0,
        y: 0.0,
        threshold: f64::INFINITY,
    }];
    for (fp, tp, threshold) in cumulative_counts(labels, scores) {
        curve.push(CurvePoint {
            x: ratio(fp, negatives),
            y: ratio(tp, positives),
            threshold,
        });
    }
    curve
}

pub fn precision_recall_curve(labels: &[u8], scores: &[f64]) -> Vec<CurvePoint> {
    let positives = labels.iter().filter(|l| **l == 1).count() as u64;
    cumulative_counts(labels, scores)
        .into_iter()
        .map(|(fp, tp, threshold)| CurvePoint {
            x: ratio(tp, positives),
            y: ratio(tp, tp + fp),
            threshold,
        })
        .collect()
}

pub fn trapezoid(curve: &[CurvePoint]) -> f64 {
    curve
        .windows(2)
        .map(|pair| (pair[1].x - pair[0].x) * (pair[1].y + pair[0].y) / 2.0)
        .sum()
}

/// Sum of precision weighted by the recall increase at each threshold.
pub fn average_precision(pr_curve: &[CurvePoint]) -> f64 {
    let mut previous_recall = 0.0;
    let mut total = 0.0;
    for point in pr_curve {
        total += (point.x - previous_recall) * point.y;
        previous_recall = point.x;
    }
    total
}
