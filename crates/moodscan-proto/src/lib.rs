//! Moodscan wire protocol
//!
//! Line-delimited JSON control messages exchanged with the host process, and the
//! request payload files those messages point at.

pub mod message;
pub mod payload;

pub use message::{ControlLine, Emotion, EmotionReport, FileRequest, Response, INVALID_JSON_MESSAGE};
pub use payload::{AnalysisRequest, RawPayload};
