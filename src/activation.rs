//! The closed set of scalar activation functions and node aggregations.
//!
//! Both are tagged enums (not function pointers) so that node-distance can
//! compare them structurally: `Activation == Activation` and
//! `Aggregation == Aggregation` are well-defined without relying on
//! function-pointer identity.

const SIGMOID_SCALE: f64 = 2.5;
const SIGMOID_CLIP: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activation {
    Sigmoid,
    Tanh,
    Relu,
    Abs,
    Sin,
    Cos,
    Step,
    Linear,
}

impl Activation {
    pub const ALL: [Activation; 8] = [
        Activation::Sigmoid,
        Activation::Tanh,
        Activation::Relu,
        Activation::Abs,
        Activation::Sin,
        Activation::Cos,
        Activation::Step,
        Activation::Linear,
    ];

    pub fn activate(&self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => {
                let z = (SIGMOID_SCALE * x).clamp(-SIGMOID_CLIP, SIGMOID_CLIP);
                1.0 / (1.0 + (-z).exp())
            }
            Activation::Tanh => {
                let z = (SIGMOID_SCALE * x).clamp(-SIGMOID_CLIP, SIGMOID_CLIP);
                z.tanh()
            }
            Activation::Relu => x.max(0.0),
            Activation::Abs => x.abs(),
            Activation::Sin => x.sin(),
            Activation::Cos => x.cos(),
            Activation::Step => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Linear => 2.0 * x,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    Sum,
}

impl Aggregation {
    pub const ALL: [Aggregation; 1] = [Aggregation::Sum];

    pub fn aggregate(&self, values: &[f64]) -> f64 {
        match self {
            Aggregation::Sum => values.iter().sum(),
        }
    }
}

impl Default for Aggregation {
    fn default() -> Self {
        Aggregation::Sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_clips_large_inputs() {
        let a = Activation::Sigmoid;
        assert!((a.activate(1000.0) - 1.0).abs() < 1e-9);
        assert!((a.activate(-1000.0) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn sigmoid_at_zero_is_half() {
        assert!((Activation::Sigmoid.activate(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn step_uses_default_threshold_and_value() {
        assert_eq!(Activation::Step.activate(1.0), 1.0);
        assert_eq!(Activation::Step.activate(0.0), 0.0);
        assert_eq!(Activation::Step.activate(-1.0), 0.0);
    }

    #[test]
    fn linear_scales_by_two() {
        assert_eq!(Activation::Linear.activate(3.0), 6.0);
    }

    #[test]
    fn aggregation_sum() {
        assert_eq!(Aggregation::Sum.aggregate(&[1.0, 2.0, 3.0]), 6.0);
        assert_eq!(Aggregation::Sum.aggregate(&[]), 0.0);
    }
}
