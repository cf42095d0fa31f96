//! Climate article corpus reduction: sentence ranking against a topical
//! glossary or frame-specific references, plus offline frame keyword extraction.

pub mod cli;
pub mod config;
pub mod data;
pub mod frames;
pub mod logging;
pub mod nlp;
pub mod ranking;
