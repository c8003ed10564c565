// ============================================================
// Layer 5 — Segmentation Losses
// ============================================================
// Pure numeric transforms from predicted logits + ground-truth
// mask to a scalar tensor. No side effects, no state beyond the
// fixed hyperparameters each loss carries.
//
// The training objective combines two terms:
//   loss = criterion(logits, mask) + sigmoid_focal_loss(logits, mask)
// where the criterion is Dice or BCE-with-logits, selected by
// the experiment spec.
//
// Probabilities are clamped away from 0 and 1 before any log()
// so the losses stay finite for saturated logits.
//
// Reference: Milletari et al. (2016) — Dice loss
//            Lin et al. (2017) — Focal loss

use burn::prelude::*;
use burn::tensor::activation::sigmoid;

use crate::application::experiment::LossKind;

/// Keeps log() finite on saturated probabilities.
const PROB_EPS: f32 = 1e-6;

/// Focal loss defaults, matching the torchvision formulation.
pub const FOCAL_ALPHA: f32 = 0.25;
pub const FOCAL_GAMMA: f32 = 2.0;

// ─── Dice Loss ────────────────────────────────────────────────────────────────

/// Region-overlap loss derived from the Dice similarity coefficient:
///
///   1 - (2·Σ(p·m) + ε) / (Σp + Σm + ε)
///
/// Output lies in [0, 1]; 0 means perfect overlap. The smoothing
/// constant ε keeps the ratio defined when both prediction and mask
/// are empty, at the cost of exact complement symmetry.
#[derive(Debug, Clone)]
pub struct DiceLoss {
    smooth: f32,
}

impl Default for DiceLoss {
    fn default() -> Self {
        Self { smooth: 1e-6 }
    }
}

impl DiceLoss {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logits and targets must have identical shape; both are
    /// flattened so the coefficient is computed over the whole batch.
    pub fn forward<B: Backend, const D: usize>(
        &self,
        logits: Tensor<B, D>,
        targets: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        let probs = sigmoid(logits).flatten::<1>(0, D - 1);
        let targets = targets.flatten::<1>(0, D - 1);

        let intersection = (probs.clone() * targets.clone()).sum();
        let denom = probs.sum() + targets.sum();

        let dice = intersection
            .mul_scalar(2.0)
            .add_scalar(self.smooth)
            .div(denom.add_scalar(self.smooth));
        dice.neg().add_scalar(1.0)
    }
}

// ─── Focal Loss ───────────────────────────────────────────────────────────────

/// Sigmoid focal loss with mean reduction.
///
/// Per pixel: `α_t · (1 - p_t)^γ · CE(p, m)` where `p_t` is the
/// predicted probability of the true class. The `(1 - p_t)^γ` term
/// down-weights easy, well-classified pixels; `α_t` rebalances
/// foreground against background.
pub fn sigmoid_focal_loss<B: Backend, const D: usize>(
    logits: Tensor<B, D>,
    targets: Tensor<B, D>,
    alpha: f32,
    gamma: f32,
) -> Tensor<B, 1> {
    let probs = sigmoid(logits).clamp(PROB_EPS, 1.0 - PROB_EPS);
    let ones = probs.ones_like();

    // Elementwise binary cross-entropy on clamped probabilities.
    let ce = (targets.clone() * probs.clone().log()
        + (ones.clone() - targets.clone()) * (ones.clone() - probs.clone()).log())
    .neg();

    // Probability assigned to the true class.
    let p_t = probs.clone() * targets.clone() + (ones.clone() - probs) * (ones.clone() - targets.clone());

    let alpha_t = targets.clone().mul_scalar(alpha)
        + (ones.clone() - targets).mul_scalar(1.0 - alpha);
    let modulator = (ones - p_t).powf_scalar(gamma);

    (alpha_t * modulator * ce).mean()
}

/// Class-balanced focal loss with fixed weighting and focusing
/// parameters, as a reusable module alongside the free
/// `sigmoid_focal_loss` used by the training objective.
#[derive(Debug, Clone)]
pub struct WeightedFocalLoss {
    alpha: f32,
    gamma: f32,
}

impl Default for WeightedFocalLoss {
    fn default() -> Self {
        Self {
            alpha: FOCAL_ALPHA,
            gamma: FOCAL_GAMMA,
        }
    }
}

impl WeightedFocalLoss {
    pub fn new(alpha: f32, gamma: f32) -> Self {
        Self { alpha, gamma }
    }

    pub fn forward<B: Backend, const D: usize>(
        &self,
        logits: Tensor<B, D>,
        targets: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        sigmoid_focal_loss(logits, targets, self.alpha, self.gamma)
    }
}

// ─── BCE With Logits ──────────────────────────────────────────────────────────

/// Mean binary cross-entropy on sigmoid(logits), with clamped
/// probabilities. Criterion for `LossFunction = "BCE"`.
#[derive(Debug, Clone, Default)]
pub struct BceWithLogitsLoss;

impl BceWithLogitsLoss {
    pub fn new() -> Self {
        Self
    }

    pub fn forward<B: Backend, const D: usize>(
        &self,
        logits: Tensor<B, D>,
        targets: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        let probs = sigmoid(logits).clamp(PROB_EPS, 1.0 - PROB_EPS);
        let ones = probs.ones_like();
        (targets.clone() * probs.clone().log() + (ones.clone() - targets) * (ones - probs).log())
            .neg()
            .mean()
    }
}

// ─── Criterion ────────────────────────────────────────────────────────────────

/// The spec-selected criterion driving the objective.
pub enum Criterion {
    Dice(DiceLoss),
    Bce(BceWithLogitsLoss),
}

impl Criterion {
    pub fn new(kind: LossKind) -> Self {
        match kind {
            LossKind::Dice => Criterion::Dice(DiceLoss::new()),
            LossKind::Bce => Criterion::Bce(BceWithLogitsLoss::new()),
        }
    }

    pub fn forward<B: Backend, const D: usize>(
        &self,
        logits: Tensor<B, D>,
        targets: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        match self {
            Criterion::Dice(loss) => loss.forward(logits, targets),
            Criterion::Bce(loss) => loss.forward(logits, targets),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray<f32>;

    fn tensor2(values: &[f32], rows: usize, cols: usize) -> Tensor<TestBackend, 2> {
        Tensor::<TestBackend, 1>::from_floats(values, &Default::default())
            .reshape([rows, cols])
    }

    fn scalar(t: Tensor<TestBackend, 1>) -> f32 {
        t.into_scalar().elem::<f32>()
    }

    #[test]
    fn test_dice_zero_on_saturated_match() {
        // +/-12 saturates the sigmoid to ~1/~0
        let logits = tensor2(&[12.0, -12.0, 12.0, -12.0], 2, 2);
        let mask = tensor2(&[1.0, 0.0, 1.0, 0.0], 2, 2);
        let loss = scalar(DiceLoss::new().forward(logits, mask));
        assert!(loss.abs() < 1e-3, "dice on exact match was {loss}");
    }

    #[test]
    fn test_dice_stays_in_unit_interval() {
        let logits = tensor2(&[3.0, -1.0, 0.5, -7.0], 2, 2);
        for mask in [[1.0, 1.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0], [1.0; 4]] {
            let loss = scalar(DiceLoss::new().forward(logits.clone(), tensor2(&mask, 2, 2)));
            assert!((0.0..=1.0).contains(&loss), "dice out of range: {loss}");
        }
    }

    #[test]
    fn test_dice_complement_symmetry_is_approximate() {
        // With the smoothing constant fixed, complementing both
        // prediction and mask changes the loss only by O(eps).
        let logits = tensor2(&[2.0, -3.0, 1.0, -0.5], 2, 2);
        let mask = tensor2(&[1.0, 0.0, 1.0, 0.0], 2, 2);

        let direct = scalar(DiceLoss::new().forward(logits.clone(), mask.clone()));
        let complement = scalar(
            DiceLoss::new().forward(logits.neg(), mask.ones_like() - mask),
        );
        assert!(
            (direct - complement).abs() < 1e-3,
            "direct={direct} complement={complement}"
        );
    }

    #[test]
    fn test_focal_is_non_negative() {
        let logits = tensor2(&[5.0, -5.0, 0.0, 2.5], 2, 2);
        let mask = tensor2(&[0.0, 1.0, 1.0, 0.0], 2, 2);
        let loss = scalar(sigmoid_focal_loss(logits, mask, FOCAL_ALPHA, FOCAL_GAMMA));
        assert!(loss >= 0.0);
    }

    #[test]
    fn test_focal_decreases_with_confidence() {
        let mask = tensor2(&[1.0; 4], 2, 2);
        let mut previous = f32::INFINITY;
        for logit in [0.0, 1.0, 3.0, 8.0] {
            let logits = tensor2(&[logit; 4], 2, 2);
            let loss = scalar(WeightedFocalLoss::default().forward(logits, mask.clone()));
            assert!(loss < previous, "focal not decreasing at logit {logit}");
            previous = loss;
        }
    }

    #[test]
    fn test_bce_matches_hand_computed_value() {
        // p = sigmoid(0) = 0.5 everywhere → BCE = ln(2)
        let logits = tensor2(&[0.0; 4], 2, 2);
        let mask = tensor2(&[1.0, 0.0, 1.0, 0.0], 2, 2);
        let loss = scalar(BceWithLogitsLoss::new().forward(logits, mask));
        assert!((loss - std::f32::consts::LN_2).abs() < 1e-5);
    }

    #[test]
    fn test_criterion_dispatch() {
        let logits = tensor2(&[1.0, -1.0, 0.5, -0.5], 2, 2);
        let mask = tensor2(&[1.0, 0.0, 1.0, 0.0], 2, 2);

        let dice = scalar(Criterion::new(LossKind::Dice).forward(logits.clone(), mask.clone()));
        let bce = scalar(Criterion::new(LossKind::Bce).forward(logits, mask));
        assert!(dice > 0.0 && bce > 0.0);
        assert_ne!(dice, bce);
    }
}
