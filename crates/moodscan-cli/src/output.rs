//! JSON output formatting

use moodscan_core::{FeatureVector, Response};
use serde::Serialize;

#[derive(Serialize)]
struct AnalysisOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    features: Option<&'a [f32]>,
    #[serde(flatten)]
    response: &'a Response,
}

/// Print a response as pretty JSON, optionally with the raw feature vector
pub fn print_json_response(response: &Response, features: Option<&FeatureVector>) {
    let output = AnalysisOutput {
        features: features.map(|f| f.as_slice()),
        response,
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing response: {}", e),
    }
}
