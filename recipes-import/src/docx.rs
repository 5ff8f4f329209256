//! Raw text extraction from .docx files
//!
//! A .docx is a ZIP container; the document body lives in
//! `word/document.xml` as WordprocessingML. We only need paragraph
//! text: walk the XML events, accumulate text runs per `w:p` and emit
//! one line per paragraph.

use quick_xml::events::Event;
use quick_xml::Reader;
use recipes_common::{Error, Result};
use std::io::Read;
use std::path::Path;

/// Extract paragraph text from a .docx file, one line per paragraph.
pub fn extract_text(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| Error::InvalidInput(format!("Not a valid .docx file: {}", e)))?;

    let mut document = archive
        .by_name("word/document.xml")
        .map_err(|e| Error::InvalidInput(format!("Missing document body: {}", e)))?;

    let mut xml = String::new();
    document.read_to_string(&mut xml)?;

    extract_paragraphs(&xml)
}

fn extract_paragraphs(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut lines: Vec<String> = Vec::new();
    let mut in_paragraph = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:p" => {
                in_paragraph = true;
                current.clear();
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => {
                in_paragraph = false;
                let line = current.trim();
                if !line.is_empty() {
                    lines.push(line.to_string());
                }
            }
            // w:br and w:tab separate runs that would otherwise merge
            Ok(Event::Empty(e))
                if matches!(e.name().as_ref(), b"w:br" | b"w:tab") && in_paragraph =>
            {
                current.push(' ');
            }
            Ok(Event::Text(e)) if in_paragraph => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::InvalidInput(format!("Malformed document XML: {}", err)))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::InvalidInput(format!(
                    "Malformed document XML: {}",
                    e
                )))
            }
            _ => {}
        }
    }

    if lines.is_empty() {
        return Err(Error::InvalidInput(
            "Document appears to be empty or unreadable".to_string(),
        ));
    }

    Ok(lines.join("\n"))
}
