//! Line protocol loop
//!
//! One JSON request per input line, exactly one JSON response per output line,
//! strictly in order. Requests are handled one at a time; the loop only ends
//! when the input is exhausted or the output can no longer be written.

use moodscan_core::{EmotionPipeline, MoodError};
use moodscan_proto::{ControlLine, RawPayload, Response};
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtocolStats {
    pub lines: usize,
    pub processed: usize,
    pub errors: usize,
}

/// Serve requests from `reader` until end of input
pub fn run_protocol<R: BufRead, W: Write>(
    pipeline: &EmotionPipeline,
    mut reader: R,
    mut writer: W,
) -> io::Result<ProtocolStats> {
    let mut stats = ProtocolStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        stats.lines += 1;

        // Undecodable bytes cannot be JSON; let the parser reject them
        let line = String::from_utf8_lossy(&buf);
        let response = handle_line(pipeline, &line);

        if response.is_error() {
            stats.errors += 1;
        } else {
            stats.processed += 1;
        }

        writeln!(writer, "{}", response.to_line())?;
        writer.flush()?;
    }

    Ok(stats)
}

/// Produce the response for a single input line
pub fn handle_line(pipeline: &EmotionPipeline, line: &str) -> Response {
    match ControlLine::parse(line) {
        Ok(ControlLine::File(path)) => handle_file_request(pipeline, &path),
        Ok(ControlLine::Unsupported) => {
            log::warn!("Request without filePath rejected");
            Response::error(MoodError::UnsupportedRequestFormat.to_string())
        }
        Err(e) => {
            log::debug!("Rejected line: {}", e);
            Response::error(MoodError::InvalidJsonInput.to_string())
        }
    }
}

/// Read the payload, remove the file, then analyze the in-memory copy.
///
/// A payload that cannot be read or parsed is left on disk.
fn handle_file_request(pipeline: &EmotionPipeline, path: &Path) -> Response {
    log::debug!("Payload file: {}", path.display());

    let raw = match RawPayload::load(path) {
        Ok(raw) => raw,
        Err(e) if e.downcast_ref::<serde_json::Error>().is_some() => {
            log::warn!("{:#}", e);
            return Response::error(MoodError::InvalidJsonInput.to_string());
        }
        Err(e) => {
            log::warn!("{:#}", e);
            return Response::error(format!("{:#}", e));
        }
    };

    remove_payload(path);
    pipeline.process_raw(raw)
}

/// Best-effort cleanup; failures are logged, never reported to the host
fn remove_payload(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        log::warn!("Failed to remove payload file {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodscan_core::model::{Activation, DenseLayer, DenseNetwork};
    use moodscan_core::{AnalysisConfig, FeatureScaler};
    use moodscan_proto::{AnalysisRequest, Emotion, FileRequest};
    use std::sync::Arc;

    fn pipeline(valence: f32, arousal: f32) -> EmotionPipeline {
        let width = AnalysisConfig::default().feature_len();
        let scaler = FeatureScaler::Standard {
            mean: vec![0.0; width],
            scale: vec![1.0; width],
        };
        let model = DenseNetwork::new(vec![DenseLayer {
            weights: vec![vec![0.0, 0.0]; width],
            bias: vec![valence, arousal],
            activation: Activation::Linear,
        }])
        .unwrap();
        EmotionPipeline::new(&AnalysisConfig::default(), Arc::new(scaler), Arc::new(model)).unwrap()
    }

    fn run(pipeline: &EmotionPipeline, input: &str) -> (Vec<String>, ProtocolStats) {
        let mut out = Vec::new();
        let stats = run_protocol(pipeline, input.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        (text.lines().map(str::to_string).collect(), stats)
    }

    #[test]
    fn test_invalid_json_then_continue() {
        let pipeline = pipeline(7.0, 7.0);
        let (lines, stats) = run(&pipeline, "{oops\nnot json either\n");
        assert_eq!(lines, vec![r#"{"error":"Invalid JSON input"}"#; 2]);
        assert_eq!(stats, ProtocolStats { lines: 2, processed: 0, errors: 2 });
    }

    #[test]
    fn test_blank_line_gets_a_response() {
        let pipeline = pipeline(7.0, 7.0);
        let (lines, _) = run(&pipeline, "\n");
        assert_eq!(lines, vec![r#"{"error":"Invalid JSON input"}"#]);
    }

    #[test]
    fn test_inline_payload_unsupported() {
        let pipeline = pipeline(7.0, 7.0);
        let (lines, _) = run(&pipeline, r#"{"samples":[0.1],"sampleRate":22050,"key":"C Major","bpm":120}"#);
        assert_eq!(
            lines,
            vec![r#"{"error":"Unsupported request format: expected a filePath field"}"#]
        );
    }

    #[test]
    fn test_file_request_processed_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("segment.json");
        AnalysisRequest::new(vec![0.2, -0.1, 0.4, 0.0], 22050, "D Minor", 90.0)
            .save(&payload)
            .unwrap();

        let pipeline = pipeline(3.0, 2.0);
        let input = format!("{}\n", FileRequest::new(&payload).to_line().unwrap());
        let (lines, stats) = run(&pipeline, &input);

        let response: Response = serde_json::from_str(&lines[0]).unwrap();
        match response {
            Response::Emotion(report) => assert_eq!(report.emotion, Emotion::Sad),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(stats.processed, 1);
        assert!(!payload.exists());
    }

    #[test]
    fn test_failed_processing_still_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("empty.json");
        AnalysisRequest::new(vec![], 22050, "C Major", 120.0)
            .save(&payload)
            .unwrap();

        let pipeline = pipeline(7.0, 7.0);
        let input = FileRequest::new(&payload).to_line().unwrap();
        let (lines, _) = run(&pipeline, &input);

        assert!(lines[0].starts_with(r#"{"error":"Processing failed: "#), "{}", lines[0]);
        assert!(!payload.exists());
    }

    #[test]
    fn test_missing_file_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.json");

        let pipeline = pipeline(7.0, 7.0);
        let response = handle_line(&pipeline, &FileRequest::new(&missing).to_line().unwrap());
        match response {
            Response::Error { error } => assert!(error.contains("gone.json"), "{}", error),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_payload_kept_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("corrupt.json");
        std::fs::write(&payload, "{\"samples\": [0.1,").unwrap();

        let pipeline = pipeline(7.0, 7.0);
        let response = handle_line(&pipeline, &FileRequest::new(&payload).to_line().unwrap());
        assert_eq!(response, Response::invalid_json());
        assert!(payload.exists());
    }

    #[test]
    fn test_one_response_per_line_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.json");
        let second = dir.path().join("b.json");
        AnalysisRequest::new(vec![0.1; 1024], 44100, "A Major", 120.0).save(&first).unwrap();
        AnalysisRequest::new(vec![0.3; 512], 44100, "A Minor", 70.0).save(&second).unwrap();

        let input = format!(
            "{}\nbroken\n{}\n{{}}",
            FileRequest::new(&first).to_line().unwrap(),
            FileRequest::new(&second).to_line().unwrap()
        );

        let pipeline = pipeline(8.0, 2.0);
        let (lines, stats) = run(&pipeline, &input);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Calm / Peaceful"));
        assert_eq!(lines[1], r#"{"error":"Invalid JSON input"}"#);
        assert!(lines[2].contains("Calm / Peaceful"));
        assert!(lines[3].contains("Unsupported request format"));
        assert_eq!(stats, ProtocolStats { lines: 4, processed: 2, errors: 2 });
    }
}
