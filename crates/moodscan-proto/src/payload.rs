//! Request payload files
//!
//! The host writes each audio segment to a JSON file and sends its path over
//! stdin. A payload is read in two steps: the file is parsed as generic JSON
//! (so it can be removed right away), then decoded into an [`AnalysisRequest`]
//! as part of processing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One audio segment plus its precomputed musical metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Mono waveform
    pub samples: Vec<f32>,
    /// Hz; signed so that non-positive rates reach validation instead of failing decode
    #[serde(deserialize_with = "deserialize_sample_rate")]
    pub sample_rate: i64,
    /// Key label such as "C Major" or "F# Minor"
    pub key: String,
    /// Tempo in beats per minute
    pub bpm: f64,
}

impl AnalysisRequest {
    pub fn new(samples: Vec<f32>, sample_rate: i64, key: impl Into<String>, bpm: f64) -> Self {
        Self {
            samples,
            sample_rate,
            key: key.into(),
            bpm,
        }
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json_str = serde_json::to_string(self)?;
        std::fs::write(path, json_str)
            .with_context(|| format!("Failed to write payload file: {}", path.display()))?;
        Ok(())
    }

    /// Load and decode a payload file in one step
    pub fn load(path: &Path) -> Result<Self> {
        let raw = RawPayload::load(path)?;
        Ok(raw.decode()?)
    }
}

/// Accept integral JSON numbers as well as floats (truncated toward zero)
fn deserialize_sample_rate<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(rate) = number.as_i64() {
        return Ok(rate);
    }
    match number.as_f64() {
        Some(rate) if rate.is_finite() && rate.abs() < i64::MAX as f64 => Ok(rate.trunc() as i64),
        _ => Err(serde::de::Error::custom(format!("invalid sample rate: {}", number))),
    }
}

/// Payload file contents that parsed as JSON but are not yet validated
#[derive(Debug, Clone, PartialEq)]
pub struct RawPayload(serde_json::Value);

impl RawPayload {
    /// Read and parse a payload file
    pub fn load(path: &Path) -> Result<Self> {
        let json_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file: {}", path.display()))?;
        let value = serde_json::from_str(&json_str)
            .with_context(|| format!("Payload file is not valid JSON: {}", path.display()))?;
        Ok(Self(value))
    }

    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Decode into a typed request (missing or mistyped fields fail here)
    pub fn decode(self) -> serde_json::Result<AnalysisRequest> {
        serde_json::from_value(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_wire_field_names() {
        let raw = RawPayload::from_value(json!({
            "samples": [0.0, 0.25, -0.5],
            "sampleRate": 44100,
            "key": "F# Minor",
            "bpm": 128.5
        }));
        let request = raw.decode().unwrap();
        assert_eq!(request.samples, vec![0.0, 0.25, -0.5]);
        assert_eq!(request.sample_rate, 44100);
        assert_eq!(request.key, "F# Minor");
        assert!((request.bpm - 128.5).abs() < 1e-9);
    }

    #[test]
    fn test_decode_float_sample_rate() {
        let raw = RawPayload::from_value(json!({
            "samples": [0.0],
            "sampleRate": 48000.0,
            "key": "C Major",
            "bpm": 120
        }));
        assert_eq!(raw.decode().unwrap().sample_rate, 48000);

        let raw = RawPayload::from_value(json!({
            "samples": [0.0],
            "sampleRate": "fast",
            "key": "C Major",
            "bpm": 120
        }));
        assert!(raw.decode().is_err());
    }

    #[test]
    fn test_decode_missing_field() {
        let raw = RawPayload::from_value(json!({
            "samples": [0.0],
            "sampleRate": 44100,
            "bpm": 120
        }));
        let err = raw.decode().unwrap_err();
        assert!(err.to_string().contains("key"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");

        let request = AnalysisRequest::new(vec![0.5; 8], 22050, "C Major", 120.0);
        request.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"sampleRate\":22050"));
        assert_eq!(AnalysisRequest::load(&path).unwrap(), request);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RawPayload::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read payload file"));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"samples\": [").unwrap();
        assert!(RawPayload::load(&path).is_err());
    }
}
