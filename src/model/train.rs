//! Train/test split, fitting and evaluation.

use crate::config::ModelSettings;
use crate::error::TrainError;
use crate::model::features::FeatureMatrix;
use crate::model::forest::RandomForest;
use crate::model::metrics::{ClassificationReport, accuracy_score};
use ndarray::Axis;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{info, instrument};

/// Row indices of the two partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(test_size * n)` rows.
///
/// # Errors
///
/// [`TrainError::InvalidTestSize`] unless `0 < test_size < 1`, and
/// [`TrainError::TooSmall`] when either partition would be empty.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<Split, TrainError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainError::InvalidTestSize(test_size));
    }
    let n_test = (test_size * n as f64).ceil() as usize;
    if n < 2 || n_test == 0 || n_test >= n {
        return Err(TrainError::TooSmall(n));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = order.split_off(n_test);
    Ok(Split { train, test: order })
}

/// The fitted model and its held-out scores.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub model: RandomForest,
    pub accuracy: f64,
    pub report: ClassificationReport,
}

/// Split, fit a forest on the training rows, and score the held-out rows.
#[instrument(level = "info", skip_all, fields(rows = x.n_rows(), cols = x.columns.len()))]
pub fn train_and_evaluate(
    x: &FeatureMatrix,
    y: &[u8],
    settings: &ModelSettings,
) -> Result<Evaluation, TrainError> {
    if x.n_rows() != y.len() {
        return Err(TrainError::LengthMismatch {
            rows: x.n_rows(),
            labels: y.len(),
        });
    }

    let split = train_test_split(y.len(), settings.test_size, settings.seed)?;
    let pick = |idx: &[usize]| idx.iter().map(|&i| y[i]).collect::<Vec<u8>>();
    let x_train = x.values.select(Axis(0), &split.train);
    let x_test = x.values.select(Axis(0), &split.test);
    let (y_train, y_test) = (pick(&split.train), pick(&split.test));
    info!(
        train = y_train.len(),
        test = y_test.len(),
        "Split dataset"
    );

    let model = RandomForest::fit(
        x_train.view(),
        &y_train,
        settings.n_estimators,
        settings.seed,
    )?;
    let y_pred = model.predict(x_test.view());

    let accuracy = accuracy_score(&y_test, &y_pred);
    let report = ClassificationReport::new(&y_test, &y_pred);
    info!(accuracy, "Evaluated model");

    Ok(Evaluation {
        model,
        accuracy,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn matrix(rows: usize) -> (FeatureMatrix, Vec<u8>) {
        let values = Array2::from_shape_fn((rows, 2), |(i, j)| (i * (j + 1)) as f64);
        let y = (0..rows).map(|i| u8::from(i >= rows / 2)).collect();
        let columns = vec!["0".to_string(), "title_length".to_string()];
        (FeatureMatrix { columns, values }, y)
    }

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_rounds_test_up() {
        let split = train_test_split(2, 0.2, 42).unwrap();
        assert_eq!((split.train.len(), split.test.len()), (1, 1));
        let split = train_test_split(11, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 3);
    }

    #[test]
    fn test_split_is_reproducible() {
        assert_eq!(
            train_test_split(50, 0.2, 42).unwrap(),
            train_test_split(50, 0.2, 42).unwrap()
        );
    }

    #[test]
    fn test_split_rejects_tiny_or_bad_input() {
        assert!(matches!(train_test_split(1, 0.2, 0), Err(TrainError::TooSmall(1))));
        assert!(matches!(
            train_test_split(10, 1.5, 0),
            Err(TrainError::InvalidTestSize(_))
        ));
    }

    #[test]
    fn test_train_and_evaluate_is_deterministic() {
        let (x, y) = matrix(40);
        let settings = ModelSettings::default();

        let a = train_and_evaluate(&x, &y, &settings).unwrap();
        let b = train_and_evaluate(&x, &y, &settings).unwrap();
        assert_eq!(a.accuracy, b.accuracy);
        assert_eq!(a.report, b.report);
        assert_eq!(a.report.macro_avg.support, 8);
        assert!((0.0..=1.0).contains(&a.accuracy));
    }

    #[test]
    fn test_train_and_evaluate_learns_threshold() {
        let (x, y) = matrix(40);
        let settings = ModelSettings {
            n_estimators: 20,
            ..ModelSettings::default()
        };
        let eval = train_and_evaluate(&x, &y, &settings).unwrap();
        assert!(eval.accuracy >= 0.75, "accuracy {}", eval.accuracy);
        assert_eq!(eval.model.trees().len(), 20);
    }

    #[test]
    fn test_label_length_mismatch() {
        let (x, _) = matrix(10);
        let err = train_and_evaluate(&x, &[0, 1], &ModelSettings::default()).unwrap_err();
        assert!(matches!(err, TrainError::LengthMismatch { rows: 10, labels: 2 }));
    }
}
