//! Dense feed-forward network exported as JSON
//!
//! Each layer stores weights as `[input][output]`, the layout Keras uses for
//! `Dense` kernels, so an export is a direct dump of `layer.get_weights()`.

use super::{check_input, EmotionModel, Prediction};
use crate::error::{MoodError, Result};
use crate::scaler::ScaledFeatures;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Tanh,
    Sigmoid,
    Elu,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Elu => {
                if x > 0.0 {
                    x
                } else {
                    x.exp() - 1.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// `[input][output]`
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    #[serde(default = "default_activation")]
    pub activation: Activation,
}

fn default_activation() -> Activation {
    Activation::Linear
}

impl DenseLayer {
    fn input_dim(&self) -> usize {
        self.weights.len()
    }

    fn output_dim(&self) -> usize {
        self.bias.len()
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        let mut out = self.bias.clone();
        for (&x, row) in input.iter().zip(&self.weights) {
            for (o, &w) in out.iter_mut().zip(row) {
                *o += x * w;
            }
        }
        for o in out.iter_mut() {
            *o = self.activation.apply(*o);
        }
        out
    }
}

/// Feed-forward regression network with a two-unit output layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseNetwork {
    pub layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self> {
        let network = Self { layers };
        network.validate()?;
        Ok(network)
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json_str = std::fs::read_to_string(path).map_err(|e| {
            MoodError::ModelLoad(format!("cannot read model {}: {}", path.display(), e))
        })?;
        let network: DenseNetwork = serde_json::from_str(&json_str).map_err(|e| {
            MoodError::ModelLoad(format!("cannot parse model {}: {}", path.display(), e))
        })?;
        network.validate()?;
        Ok(network)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json_str = serde_json::to_string(self)
            .map_err(|e| MoodError::ModelLoad(format!("cannot serialize model: {}", e)))?;
        std::fs::write(path, json_str)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let Some(last) = self.layers.last() else {
            return Err(MoodError::ModelLoad("model has no layers".into()));
        };

        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.input_dim() == 0 {
                return Err(MoodError::ModelLoad(format!("layer {} has no inputs", idx)));
            }
            if let Some(row) = layer.weights.iter().find(|row| row.len() != layer.output_dim()) {
                return Err(MoodError::ModelLoad(format!(
                    "layer {}: weight row has {} outputs, bias has {}",
                    idx,
                    row.len(),
                    layer.output_dim()
                )));
            }
        }

        for (idx, pair) in self.layers.windows(2).enumerate() {
            if pair[0].output_dim() != pair[1].input_dim() {
                return Err(MoodError::ModelLoad(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    idx,
                    pair[0].output_dim(),
                    idx + 1,
                    pair[1].input_dim()
                )));
            }
        }

        if last.output_dim() != 2 {
            return Err(MoodError::ModelLoad(format!(
                "model must output 2 values (valence, arousal), got {}",
                last.output_dim()
            )));
        }
        Ok(())
    }
}

impl EmotionModel for DenseNetwork {
    fn input_dim(&self) -> usize {
        self.layers.first().map(|l| l.input_dim()).unwrap_or(0)
    }

    fn predict(&self, features: &ScaledFeatures) -> Result<Prediction> {
        check_input(self, features)?;

        let output = self
            .layers
            .iter()
            .fold(features.as_slice().to_vec(), |acc, layer| layer.forward(&acc));

        Ok(Prediction {
            valence: output[0],
            arousal: output[1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_layer() -> DenseNetwork {
        DenseNetwork::new(vec![
            DenseLayer {
                weights: vec![vec![1.0, -1.0, 0.5], vec![2.0, 0.0, -0.5]],
                bias: vec![0.0, 0.5, 0.0],
                activation: Activation::Relu,
            },
            DenseLayer {
                weights: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
                bias: vec![5.0, 5.0],
                activation: Activation::Linear,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_forward_pass() {
        let model = two_layer();
        // hidden = relu([1 + 2, -1 + 0.5, 0.5 - 0.5]) = [3, 0, 0]
        let prediction = model.predict(&ScaledFeatures(vec![1.0, 1.0])).unwrap();
        assert_relative_eq!(prediction.valence, 8.0);
        assert_relative_eq!(prediction.arousal, 5.0);
    }

    #[test]
    fn test_input_width_checked() {
        let model = two_layer();
        assert_eq!(model.input_dim(), 2);
        assert!(matches!(
            model.predict(&ScaledFeatures(vec![1.0; 3])),
            Err(MoodError::FeatureShapeMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_rejects_chained_shape_mismatch() {
        let result = DenseNetwork::new(vec![
            DenseLayer {
                weights: vec![vec![1.0, 1.0]],
                bias: vec![0.0, 0.0],
                activation: Activation::Linear,
            },
            DenseLayer {
                weights: vec![vec![1.0, 1.0]; 3],
                bias: vec![0.0, 0.0],
                activation: Activation::Linear,
            },
        ]);
        assert!(matches!(result, Err(MoodError::ModelLoad(_))));
    }

    #[test]
    fn test_rejects_wrong_output_width() {
        let result = DenseNetwork::new(vec![DenseLayer {
            weights: vec![vec![1.0, 1.0, 1.0]],
            bias: vec![0.0, 0.0, 0.0],
            activation: Activation::Linear,
        }]);
        assert!(matches!(result, Err(MoodError::ModelLoad(_))));
        assert!(DenseNetwork::new(vec![]).is_err());
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = two_layer();
        model.save(&path).unwrap();
        assert_eq!(DenseNetwork::load(&path).unwrap(), model);
    }

    #[test]
    fn test_activations() {
        assert_eq!(Activation::Relu.apply(-2.0), 0.0);
        assert_relative_eq!(Activation::Sigmoid.apply(0.0), 0.5);
        assert_relative_eq!(Activation::Elu.apply(-1.0), (-1.0f32).exp() - 1.0);
        assert_relative_eq!(Activation::Tanh.apply(0.5), 0.5f32.tanh());
    }
}
