//! recipes-import library - Word-document migration pipeline
//!
//! Extracts raw text from `.docx` files and turns it into recipe
//! payloads, either with the rule-based Hebrew section parser or by
//! handing the text to an AI model.

pub mod ai;
pub mod docx;
pub mod parser;
