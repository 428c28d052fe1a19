//! JSON-lines capture format: one serialized [`Update`] per line.
//!
//! Blank lines and lines starting with `#` are skipped so captures can carry
//! comments.

use std::io::BufRead;

use crate::errors::FoldError;
use crate::update::Update;

/// Parses one capture line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_update_line(line: &str, line_number: usize) -> Result<Option<Update>, FoldError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| FoldError::Decode {
            line: line_number,
            message: e.to_string(),
        })
}

/// Reads every update of a capture, failing on the first unreadable or
/// undecodable line.
pub fn read_updates(reader: impl BufRead) -> Result<Vec<Update>, FoldError> {
    let mut updates = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|e| FoldError::Read {
            line: line_number,
            message: e.to_string(),
        })?;
        if let Some(update) = parse_update_line(&line, line_number)? {
            updates.push(update);
        }
    }
    Ok(updates)
}

/// Serializes updates back into capture lines.
pub fn write_updates(updates: &[Update]) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for update in updates {
        out.push_str(&serde_json::to_string(update)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentItem;

    #[test]
    fn skips_blank_and_comment_lines() {
        let capture = "# captured\n\n{\"contents\":[{\"type\":\"text\",\"text\":\"a\"}]}\n";
        let updates = read_updates(capture.as_bytes()).unwrap();
        assert_eq!(updates, vec![Update::text("a")]);
    }

    #[test]
    fn decode_error_reports_line_number() {
        let capture = "{\"message_id\":\"m1\"}\nnot json\n";
        let err = read_updates(capture.as_bytes()).unwrap_err();
        assert!(matches!(err, FoldError::Decode { line: 2, .. }));
    }

    #[test]
    fn unreadable_line_is_a_read_error() {
        let capture: &[u8] = b"{\"message_id\":\"m1\"}\n\xff\xfe\n";
        let err = read_updates(capture).unwrap_err();
        assert!(matches!(err, FoldError::Read { line: 2, .. }));
        assert!(err.to_string().starts_with("failed to read capture at line 2"));
    }

    #[test]
    fn written_capture_reads_back() {
        let updates = vec![
            Update::text("a").role("assistant"),
            Update::new().content(ContentItem::reasoning("r")),
        ];
        let capture = write_updates(&updates).unwrap();
        assert_eq!(read_updates(capture.as_bytes()).unwrap(), updates);
    }
}
