// GDrive Music - Google Drive music library client
// Copyright (C) 2025 GDrive Music contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Extraction of the JSON payload from a batch response
//!
//! The batch endpoint answers with multipart framing around an embedded HTTP
//! response, roughly:
//!
//! ```text
//! --batch_abc
//! Content-Type: application/http
//!
//! HTTP/1.1 200 OK
//! Content-Type: application/json; charset=UTF-8
//!
//! { ...payload... }
//! --batch_abc--
//! ```
//!
//! No JSON decoder accepts that as-is, so [`extract_embedded_json`] scans it
//! once, left to right, and returns the first balanced top-level object.
//! Braces inside string literals are ignored.

use crate::error::{preview, DriveError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Return the first balanced `{...}` object found outside string literals
///
/// # Errors
/// - `NoJsonFound` if no `{` appears outside a string
/// - `UnclosedJson` if the object never closes
pub fn extract_embedded_json(body: &str) -> Result<&str> {
    let bytes = body.as_bytes();
    let mut depth: usize = 0;
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escape_next = false;

    // Only ASCII bytes are inspected, so every index we slice at is a char boundary
    for (i, &b) in bytes.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match b {
            b'\\' if in_string => escape_next = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if !in_string && depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start {
                        return Ok(&body[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    match start {
        None => Err(DriveError::NoJsonFound {
            response_preview: Some(preview(body)),
        }),
        Some(_) => Err(DriveError::UnclosedJson {
            response_preview: Some(preview(body)),
        }),
    }
}

/// Decode JSON text into `T`; unknown fields are ignored
pub fn decode<T: DeserializeOwned>(json_text: &str) -> Result<T> {
    serde_json::from_str(json_text.trim()).map_err(|e| {
        DriveError::invalid_response(format!("Failed to decode JSON: {}", e), json_text)
    })
}

/// Extract the embedded object from a batch body and decode it
pub fn extract_and_decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let json_text = extract_embedded_json(body)?;
    decode(json_text)
}

/// Encode a value as compact JSON, the inverse of [`decode`]
pub fn encode<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
