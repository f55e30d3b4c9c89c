//! Accuracy and per-class precision / recall / F1.
//!
//! [`ClassificationReport`] renders as the usual fixed-width table:
//!
//! ```text
//!               precision    recall  f1-score   support
//!
//!            0       1.00      0.50      0.67         2
//!            1       0.67      1.00      0.80         2
//!
//!     accuracy                           0.75         4
//!    macro avg       0.83      0.75      0.73         4
//! weighted avg       0.83      0.75      0.73         4
//! ```
//!
//! A ratio with a zero denominator is reported as 0.

use std::fmt;

/// Fraction of positions where `y_true` and `y_pred` agree. 0 for empty input.
pub fn accuracy_score(y_true: &[u8], y_pred: &[u8]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    hits as f64 / y_true.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    /// Per-class rows, sorted by label. Covers every label seen in either input.
    pub classes: Vec<(u8, ClassMetrics)>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl ClassificationReport {
    pub fn new(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut labels: Vec<u8> = y_true.iter().chain(y_pred).copied().collect();
        labels.sort_unstable();
        labels.dedup();

        let classes: Vec<(u8, ClassMetrics)> = labels
            .iter()
            .map(|&label| {
                let pairs = || y_true.iter().zip(y_pred);
                let tp = pairs().filter(|(t, p)| **t == label && **p == label).count();
                let predicted = y_pred.iter().filter(|p| **p == label).count();
                let support = y_true.iter().filter(|t| **t == label).count();

                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                (
                    label,
                    ClassMetrics {
                        precision,
                        recall,
                        f1,
                        support,
                    },
                )
            })
            .collect();

        let total: usize = classes.iter().map(|(_, m)| m.support).sum();
        let n = classes.len().max(1) as f64;
        let macro_avg = ClassMetrics {
            precision: classes.iter().map(|(_, m)| m.precision).sum::<f64>() / n,
            recall: classes.iter().map(|(_, m)| m.recall).sum::<f64>() / n,
            f1: classes.iter().map(|(_, m)| m.f1).sum::<f64>() / n,
            support: total,
        };
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                return 0.0;
            }
            classes
                .iter()
                .map(|(_, m)| f(m) * m.support as f64)
                .sum::<f64>()
                / total as f64
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
        };

        Self {
            accuracy: accuracy_score(y_true, y_pred),
            classes,
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LAST_LINE: &str = "weighted avg";
        let width = self
            .classes
            .iter()
            .map(|(label, _)| label.to_string().len())
            .max()
            .unwrap_or(0)
            .max(LAST_LINE.len());

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}\n",
            "", "precision", "recall", "f1-score", "support"
        )?;

        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )
        };
        for (label, m) in &self.classes {
            row(f, &label.to_string(), m)?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, LAST_LINE, &self.weighted_avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy_score(&[0, 1, 1, 0], &[0, 1, 0, 0]), 0.75);
        assert_eq!(accuracy_score(&[], &[]), 0.0);
    }

    #[test]
    fn test_per_class_metrics() {
        let report = ClassificationReport::new(&[0, 0, 1, 1], &[0, 1, 1, 1]);
        let (label, zero) = report.classes[0];
        assert_eq!(label, 0);
        assert_eq!(zero.precision, 1.0);
        assert_eq!(zero.recall, 0.5);
        assert!((zero.f1 - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(zero.support, 2);

        let (_, one) = report.classes[1];
        assert!((one.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(one.recall, 1.0);
        assert_eq!(report.accuracy, 0.75);
        assert_eq!(report.macro_avg.support, 4);
    }

    #[test]
    fn test_unpredicted_class_scores_zero() {
        let report = ClassificationReport::new(&[0, 1], &[0, 0]);
        let (_, one) = report.classes[1];
        assert_eq!(one.precision, 0.0);
        assert_eq!(one.f1, 0.0);
    }

    #[test]
    fn test_weighted_average_uses_support() {
        let report = ClassificationReport::new(&[0, 0, 0, 1], &[0, 0, 0, 0]);
        // class 0: recall 1.0 (support 3); class 1: recall 0.0 (support 1)
        assert!((report.weighted_avg.recall - 0.75).abs() < 1e-12);
        assert!((report.macro_avg.recall - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_display_layout() {
        let text = ClassificationReport::new(&[0, 0, 1, 1], &[0, 1, 1, 1]).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "              precision    recall  f1-score   support"
        );
        assert_eq!(lines[1], "");
        assert_eq!(
            lines[2],
            "           0       1.00      0.50      0.67         2"
        );
        assert_eq!(
            lines[5],
            "    accuracy                           0.75         4"
        );
        assert!(lines[7].starts_with("weighted avg"));
    }
}
