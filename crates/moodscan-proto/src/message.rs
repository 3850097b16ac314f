//! Control lines read from stdin and response lines written to stdout

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Error text emitted for a line that is not valid JSON
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON input";

/// Request line written by the host: `{"filePath": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRequest {
    #[serde(rename = "filePath")]
    pub file_path: PathBuf,
}

impl FileRequest {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Serialize as a single protocol line (without trailing newline)
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlLine {
    /// Indirection to a payload file on disk
    File(PathBuf),
    /// Valid JSON that carries no usable `filePath`
    Unsupported,
}

impl ControlLine {
    /// Parse one input line. Fails only when the line is not JSON at all.
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(line.trim())?;

        match value.get("filePath").and_then(|p| p.as_str()) {
            Some(path) => Ok(ControlLine::File(PathBuf::from(path))),
            None => Ok(ControlLine::Unsupported),
        }
    }
}

/// Discrete mood label, serialized with its display text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    #[serde(rename = "Happy / Excited")]
    HappyExcited,
    #[serde(rename = "Intense / Powerful")]
    IntensePowerful,
    #[serde(rename = "Angry / Tense")]
    AngryTense,
    #[serde(rename = "Calm / Peaceful")]
    CalmPeaceful,
    #[serde(rename = "Sad")]
    Sad,
    #[serde(rename = "Neutral")]
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::HappyExcited,
        Emotion::IntensePowerful,
        Emotion::AngryTense,
        Emotion::CalmPeaceful,
        Emotion::Sad,
        Emotion::Neutral,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Emotion::HappyExcited => "Happy / Excited",
            Emotion::IntensePowerful => "Intense / Powerful",
            Emotion::AngryTense => "Angry / Tense",
            Emotion::CalmPeaceful => "Calm / Peaceful",
            Emotion::Sad => "Sad",
            Emotion::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Successful classification of one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionReport {
    pub valence: f64,
    pub arousal: f64,
    pub emotion: Emotion,
    pub processed: bool,
}

/// One response line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Emotion(EmotionReport),
    Error { error: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            error: message.into(),
        }
    }

    pub fn invalid_json() -> Self {
        Self::error(INVALID_JSON_MESSAGE)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    /// Serialize as a single protocol line (without trailing newline).
    ///
    /// Always yields valid JSON: a serialization failure is itself reported
    /// as an error object.
    pub fn to_line(&self) -> String {
        match serde_json::to_string(self) {
            Ok(line) => line,
            Err(e) => serde_json::json!({ "error": e.to_string() }).to_string(),
        }
    }
}

impl From<EmotionReport> for Response {
    fn from(report: EmotionReport) -> Self {
        Response::Emotion(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_request() {
        let line = ControlLine::parse(r#"{"filePath": "/tmp/segment-1.json"}"#).unwrap();
        assert_eq!(line, ControlLine::File(PathBuf::from("/tmp/segment-1.json")));
    }

    #[test]
    fn test_parse_tolerates_trailing_whitespace() {
        let line = ControlLine::parse("{\"filePath\": \"/tmp/a.json\"}\r\n").unwrap();
        assert_eq!(line, ControlLine::File(PathBuf::from("/tmp/a.json")));
    }

    #[test]
    fn test_parse_inline_payload_is_unsupported() {
        let line = ControlLine::parse(r#"{"samples": [0.1], "sampleRate": 22050}"#).unwrap();
        assert_eq!(line, ControlLine::Unsupported);

        let line = ControlLine::parse("[1, 2, 3]").unwrap();
        assert_eq!(line, ControlLine::Unsupported);

        let line = ControlLine::parse(r#"{"filePath": 42}"#).unwrap();
        assert_eq!(line, ControlLine::Unsupported);
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(ControlLine::parse("{not json").is_err());
        assert!(ControlLine::parse("").is_err());
    }

    #[test]
    fn test_file_request_line() {
        let line = FileRequest::new("/tmp/x.json").to_line().unwrap();
        assert_eq!(line, r#"{"filePath":"/tmp/x.json"}"#);
    }

    #[test]
    fn test_error_line_exact() {
        assert_eq!(Response::invalid_json().to_line(), r#"{"error":"Invalid JSON input"}"#);
    }

    #[test]
    fn test_report_line_field_order() {
        let response = Response::from(EmotionReport {
            valence: 7.5,
            arousal: 3.0,
            emotion: Emotion::CalmPeaceful,
            processed: true,
        });
        assert_eq!(
            response.to_line(),
            r#"{"valence":7.5,"arousal":3.0,"emotion":"Calm / Peaceful","processed":true}"#
        );
    }

    #[test]
    fn test_response_untagged_decode() {
        let ok: Response = serde_json::from_str(
            r#"{"valence":1.0,"arousal":2.0,"emotion":"Sad","processed":true}"#,
        )
        .unwrap();
        assert!(!ok.is_error());

        let err: Response = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(err, Response::error("boom"));
    }

    #[test]
    fn test_emotion_labels_match_serde() {
        for emotion in Emotion::ALL {
            let json = serde_json::to_string(&emotion).unwrap();
            assert_eq!(json, format!("\"{}\"", emotion.label()));
        }
    }
}
