//! ONNX Runtime session wrapper.

use crate::config::InferenceDevice;
use crate::constants::DEFAULT_INPUT_NAME;
use crate::error::{Error, Result};
use crate::scorer::{TileScore, softmax2, tile_to_tensor};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Options for building a [`TileScorer`].
#[derive(Debug, Clone, Copy)]
pub struct ScorerOptions {
    /// Tile edge length the model expects.
    pub tile_size: u32,
    /// Temperature divisor applied to logits before the softmax.
    pub temperature: f64,
    /// Inference device selection.
    pub device: InferenceDevice,
}

/// A two-class tile scorer backed by an ONNX Runtime session.
pub struct TileScorer {
    session: Session,
    input_name: String,
    tile_size: u32,
    temperature: f64,
    model_sha256: String,
}

impl TileScorer {
    /// Build a scorer from an ONNX model file.
    pub fn from_model(model_path: &Path, options: ScorerOptions) -> Result<Self> {
        let model_sha256 = crate::utils::hash::file_sha256(model_path)?;

        let builder = Session::builder().map_err(|e| Error::ScorerBuild {
            reason: e.to_string(),
        })?;
        let builder = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::ScorerBuild {
                reason: e.to_string(),
            })?;

        let mut builder = match options.device {
            InferenceDevice::Cpu => {
                info!("Requested device: CPU");
                builder
            }
            #[cfg(feature = "cuda")]
            InferenceDevice::Auto | InferenceDevice::Gpu => {
                use ort::execution_providers::CUDAExecutionProvider;
                info!("Registering CUDA provider (CPU fallback if unavailable)");
                builder
                    .with_execution_providers([CUDAExecutionProvider::default().build()])
                    .map_err(|e| Error::ScorerBuild {
                        reason: e.to_string(),
                    })?
            }
            #[cfg(not(feature = "cuda"))]
            InferenceDevice::Auto => {
                info!("Auto mode: built without CUDA support, using CPU");
                builder
            }
            #[cfg(not(feature = "cuda"))]
            InferenceDevice::Gpu => {
                tracing::warn!("--gpu requested but this build has no CUDA support, using CPU");
                builder
            }
        };

        let session = builder
            .commit_from_file(model_path)
            .map_err(|e| Error::ScorerBuild {
                reason: e.to_string(),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map_or_else(|| DEFAULT_INPUT_NAME.to_string(), |i| i.name().to_string());

        info!(
            "Loaded model: {} (input '{}', tile size {}, temperature {})",
            model_path.display(),
            input_name,
            options.tile_size,
            options.temperature
        );

        Ok(Self {
            session,
            input_name,
            tile_size: options.tile_size,
            temperature: options.temperature,
            model_sha256,
        })
    }

    /// SHA-256 digest of the model file, recorded in decision records.
    pub fn model_sha256(&self) -> &str {
        &self.model_sha256
    }

    /// Score a single tile image.
    ///
    /// The reported latency covers the inference call only, not image
    /// decoding.
    pub fn score_tile(&mut self, path: &Path) -> Result<TileScore> {
        let tensor = tile_to_tensor(path, self.tile_size)?;

        let start = Instant::now();
        let input = ort::value::Tensor::from_array(tensor).map_err(|e| Error::Inference {
            reason: e.to_string(),
        })?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let logits = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;
        let mut values = logits.iter().copied();
        let (Some(mut l0), Some(mut l1)) = (values.next(), values.next()) else {
            return Err(Error::Inference {
                reason: "model output has fewer than 2 logits".to_string(),
            });
        };

        if self.temperature != 1.0 {
            #[allow(clippy::cast_possible_truncation)]
            let t = self.temperature as f32;
            l0 /= t;
            l1 /= t;
        }
        let probs = softmax2([l0, l1]);

        Ok(TileScore {
            prob_background: probs[0],
            prob_event: probs[1],
            pred_class: u8::from(probs[1] > probs[0]),
            max_prob: probs[0].max(probs[1]),
            latency_ms,
        })
    }
}
