//! Schema module
//!
//! Wire formats for outbound API calls.

pub mod gemini;
