use crate::error::{Error, Result};
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Read a JSON request body from `--file` or `--data`.
///
/// `--file` wins when both are given. A file path of `-` reads stdin.
/// The parsed document is returned untouched so it reaches the API exactly
/// as the user wrote it.
pub fn read_payload(file: Option<&Path>, data: Option<&str>) -> Result<Value> {
    match (file, data) {
        (Some(path), _) => {
            let contents = if path == Path::new("-") {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                fs::read_to_string(path).map_err(|e| {
                    Error::Input(format!("Failed to read {}: {}", path.display(), e))
                })?
            };
            parse_json(&contents, &path.display().to_string())
        }
        (None, Some(data)) => parse_json(data, "--data"),
        (None, None) => Err(Error::MissingPayload),
    }
}

fn parse_json(contents: &str, source: &str) -> Result<Value> {
    serde_json::from_str(contents)
        .map_err(|e| Error::Input(format!("Invalid JSON in {}: {}", source, e)))
}
