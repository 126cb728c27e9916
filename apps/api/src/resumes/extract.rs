use std::path::{Path, PathBuf};

use tracing::warn;

/// Pulls plain text out of an uploaded file. PDF and plain text are read;
/// Word documents yield no text. Extraction problems are logged and produce
/// an empty string rather than failing the upload. The result never contains
/// control characters other than newline and tab, since Postgres TEXT rejects NUL.
pub async fn extract_text(path: &Path, content_type: &str) -> String {
    let path: PathBuf = path.to_path_buf();
    let content_type = content_type.to_string();

    let result = tokio::task::spawn_blocking(move || match content_type.as_str() {
        "application/pdf" => pdf_extract::extract_text(&path)
            .map_err(|e| format!("PDF extraction failed: {e:?}")),
        "text/plain" => std::fs::read(&path)
            .map(|bytes| decode_text(&bytes))
            .map_err(|e| format!("reading text upload failed: {e}")),
        _ => Ok(String::new()),
    })
    .await;

    match result {
        Ok(Ok(text)) => strip_control_chars(&text),
        Ok(Err(reason)) => {
            warn!("{reason}");
            String::new()
        }
        Err(e) => {
            warn!("Text extraction task failed: {e}");
            String::new()
        }
    }
}

/// Decodes a text upload: UTF-16 when it starts with a byte order mark,
/// otherwise lossy UTF-8 (with any UTF-8 BOM dropped).
fn decode_text(bytes: &[u8]) -> String {
    let utf16 = |units: Vec<u16>| String::from_utf16_lossy(&units);
    match bytes {
        [0xFF, 0xFE, rest @ ..] => utf16(
            rest.chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect(),
        ),
        [0xFE, 0xFF, rest @ ..] => utf16(
            rest.chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect(),
        ),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}
