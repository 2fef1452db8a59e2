//! Win-prediction check over a team's stored games.
//!
//! Contiguous (unshuffled) K-fold cross-validation of an L2-regularised
//! logistic regression on the per-game statistics, trained with `burn` on
//! the CPU `ndarray` backend.

use burn::backend::{Autodiff, NdArray};
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::optim::{GradientsParams, Optimizer, SgdConfig};
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor};
use std::ops::Range;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::model::{GameRecord, GameResult, Venue};

pub const FEATURE_NAMES: [&str; 11] = [
    "venue",
    "goals",
    "powerPlayPercentage",
    "powerPlayGoals",
    "powerPlayOpportunities",
    "faceOffWinPercentage",
    "shots",
    "blocked",
    "takeaways",
    "giveaways",
    "hits",
];

const EPOCHS: usize = 500;
const LEARNING_RATE: f64 = 0.5;
/// Inverse regularisation strength.
const C: f64 = 1.0;

/// Backend the cross-validation trains on.
pub type EvalBackend = Autodiff<NdArray<f32>>;

pub fn features(record: &GameRecord) -> Vec<f64> {
    vec![
        match record.venue {
            Venue::Home => 1.0,
            Venue::Away => 0.0,
        },
        record.goals as f64,
        record.power_play_percentage,
        record.power_play_goals as f64,
        record.power_play_opportunities as f64,
        record.face_off_win_percentage,
        record.shots as f64,
        record.blocked as f64,
        record.takeaways as f64,
        record.giveaways as f64,
        record.hits as f64,
    ]
}

fn label(record: &GameRecord) -> f64 {
    match record.result {
        GameResult::Win => 1.0,
        GameResult::Loss => 0.0,
    }
}

/// Split `0..n` into `k` contiguous folds; the first `n % k` get one extra item.
pub fn fold_ranges(n: usize, k: usize) -> Vec<Range<usize>> {
    let base = n / k;
    let extra = n % k;
    let mut start = 0;
    (0..k)
        .map(|i| {
            let len = base + usize::from(i < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

/// Per-column mean and standard deviation of the training rows.
#[derive(Debug, Clone)]
struct Standardiser {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl Standardiser {
    fn fit(x: &[Vec<f64>]) -> Self {
        let n = x.len() as f64;
        let width = x.first().map_or(0, Vec::len);

        let means: Vec<f64> = (0..width)
            .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / n)
            .collect();
        let scales = (0..width)
            .map(|j| {
                let var = x.iter().map(|row| (row[j] - means[j]).powi(2)).sum::<f64>() / n;
                if var > 0.0 {
                    var.sqrt()
                } else {
                    1.0
                }
            })
            .collect();
        Self { means, scales }
    }

    /// Row-major `[rows, width]` tensor of standardised values.
    fn tensor<B: Backend>(&self, x: &[Vec<f64>], device: &B::Device) -> Tensor<B, 2> {
        let flat: Vec<f32> = x
            .iter()
            .flat_map(|row| {
                row.iter()
                    .zip(self.means.iter().zip(&self.scales))
                    .map(|(v, (mean, scale))| ((v - mean) / scale) as f32)
            })
            .collect();
        Tensor::<B, 1>::from_floats(flat.as_slice(), device).reshape([x.len(), self.means.len()])
    }
}

/// Logistic regression as a single linear unit, trained full-batch with SGD
/// on binary cross-entropy plus an L2 penalty on the weights.
pub struct LogisticRegression<B: AutodiffBackend> {
    model: Linear<B>,
    standardiser: Standardiser,
    device: B::Device,
}

impl<B: AutodiffBackend> LogisticRegression<B> {
    /// Rows must be non-empty and of equal width; `y` holds 1.0 for a win.
    pub fn fit(x: &[Vec<f64>], y: &[f64], device: &B::Device) -> Self {
        let standardiser = Standardiser::fit(x);
        let width = standardiser.means.len();
        let inputs = standardiser.tensor::<B>(x, device);
        let targets: Vec<f32> = y.iter().map(|&v| v as f32).collect();
        let targets = Tensor::<B, 1>::from_floats(targets.as_slice(), device).unsqueeze_dim(1);
        let penalty = 1.0 / (2.0 * C * x.len() as f64);

        let mut model = LinearConfig::new(width, 1)
            .with_initializer(Initializer::Zeros)
            .init(device);
        let mut optimizer = SgdConfig::new().init::<B, Linear<B>>();

        for epoch in 0..EPOCHS {
            let probs = sigmoid(model.forward(inputs.clone()));
            let weights = model.weight.val();
            let loss = binary_cross_entropy(probs, targets.clone())
                + (weights.clone() * weights).sum().mul_scalar(penalty);

            if epoch == EPOCHS - 1 {
                let loss_val: f32 = loss.clone().into_scalar().elem();
                debug!("Final training loss {:.4}", loss_val);
            }

            let grads = loss.backward();
            let grads_params = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(LEARNING_RATE, model, grads_params);
        }

        Self {
            model,
            standardiser,
            device: device.clone(),
        }
    }

    /// Win probability for each row.
    pub fn probabilities(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let inputs = self.standardiser.tensor::<B>(x, &self.device);
        let probs = sigmoid(self.model.forward(inputs)).into_data();
        let probs: &[f32] = probs
            .as_slice()
            .map_err(|e| IngestError::Evaluation(format!("{e:?}")))?;
        Ok(probs.iter().map(|&p| f64::from(p)).collect())
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<bool>> {
        Ok(self.probabilities(x)?.into_iter().map(|p| p >= 0.5).collect())
    }
}

fn binary_cross_entropy<B: Backend>(probs: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    let eps = 1e-7;
    let probs_clamped = probs.clamp(eps, 1.0 - eps);
    let loss = targets.clone().neg() * probs_clamped.clone().log()
        - (targets.neg() + 1.0) * (probs_clamped.neg() + 1.0).log();
    loss.mean()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub fold_accuracies: Vec<f64>,
}

impl Evaluation {
    pub fn mean(&self) -> f64 {
        self.fold_accuracies.iter().sum::<f64>() / self.fold_accuracies.len() as f64
    }

    /// Population standard deviation across folds.
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let var = self
            .fold_accuracies
            .iter()
            .map(|a| (a - mean).powi(2))
            .sum::<f64>()
            / self.fold_accuracies.len() as f64;
        var.sqrt()
    }
}

pub fn cross_validate(records: &[GameRecord], folds: usize) -> Result<Evaluation> {
    if folds < 2 {
        return Err(IngestError::InsufficientData(format!(
            "need at least 2 folds, got {folds}"
        )));
    }
    if records.len() < folds {
        return Err(IngestError::InsufficientData(format!(
            "{} games is fewer than {} folds",
            records.len(),
            folds
        )));
    }

    let x: Vec<Vec<f64>> = records.iter().map(features).collect();
    let y: Vec<f64> = records.iter().map(label).collect();

    let device = <EvalBackend as Backend>::Device::default();
    let mut fold_accuracies = Vec::with_capacity(folds);
    for (fold, test) in fold_ranges(records.len(), folds).into_iter().enumerate() {
        let (train_x, train_y): (Vec<Vec<f64>>, Vec<f64>) = (0..records.len())
            .filter(|i| !test.contains(i))
            .map(|i| (x[i].clone(), y[i]))
            .unzip();

        let wins = train_y.iter().filter(|&&v| v > 0.5).count();
        if wins == 0 || wins == train_y.len() {
            return Err(IngestError::InsufficientData(format!(
                "fold {} trains on a single outcome",
                fold + 1
            )));
        }

        let model = LogisticRegression::<EvalBackend>::fit(&train_x, &train_y, &device);
        let predictions = model.predict(&x[test.clone()])?;
        let correct = predictions
            .iter()
            .zip(&y[test.clone()])
            .filter(|&(&predicted, &actual)| predicted == (actual > 0.5))
            .count();
        let accuracy = correct as f64 / test.len() as f64;
        debug!("Fold {}: accuracy {:.3}", fold + 1, accuracy);
        fold_accuracies.push(accuracy);
    }

    Ok(Evaluation { fold_accuracies })
}
