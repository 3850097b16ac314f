//! Moodscan command-line tools

pub mod output;
pub mod protocol;
