//! Canonical text loading. The editor's document is either a `.docx` file
//! or plain UTF-8 text.

use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::AlignmentError;

const DOCUMENT_PART: &str = "word/document.xml";

pub fn read_canonical(path: &Path) -> Result<String, AlignmentError> {
    let is_docx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
    if is_docx {
        let bytes =
            std::fs::read(path).map_err(|e| AlignmentError::io("read canonical docx", e))?;
        return docx_text(&bytes);
    }
    std::fs::read_to_string(path).map_err(|e| AlignmentError::io("read canonical text", e))
}

/// Paragraph text of a docx body, one paragraph per line.
pub fn docx_text(bytes: &[u8]) -> Result<String, AlignmentError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AlignmentError::document("open docx archive", e))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| AlignmentError::document("locate word/document.xml", e))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| AlignmentError::document("read word/document.xml", e))?;
    paragraphs_from_xml(&xml)
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

fn paragraphs_from_xml(xml: &str) -> Result<String, AlignmentError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut buf = Vec::new();
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text_run = true,
                b"p" => push_break(&mut out),
                _ => {}
            },
            Ok(Event::Empty(e)) => match local_name(e.name().as_ref()) {
                b"br" | b"cr" => push_break(&mut out),
                b"tab" => push_space(&mut out),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_run => {
                let text = e
                    .unescape()
                    .map_err(|e| AlignmentError::document("unescape docx text", e))?;
                out.push_str(&text);
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text_run = false,
                b"p" => push_break(&mut out),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(AlignmentError::document("parse word/document.xml", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(out.trim_end().to_string())
}

fn push_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn push_space(out: &mut String) {
    if !out.is_empty() && !out.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}
