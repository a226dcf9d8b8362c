//! Local files as embedded data URLs.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::Result;

/// A local file ready to embed in a media block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedFile {
    /// File name without directories
    pub file_name: String,
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
}

/// Read `path` into a data URL, guessing the MIME type from its extension.
pub fn read_data_url(path: &Path) -> Result<EmbeddedFile> {
    let _scope = crate::perf::scope("media.read").with("path", path.display());
    let bytes = std::fs::read(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    crate::perf::log_event(
        "media.read",
        format!("name={file_name} mime={mime} bytes={}", bytes.len()),
    );
    Ok(EmbeddedFile {
        file_name,
        data_url: data_url(mime.essence_str(), &bytes),
    })
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
