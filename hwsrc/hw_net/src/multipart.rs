//! `multipart/form-data` body encoding (RFC 7578), enough to upload files to a local service.

use common::now_ms;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BOUNDARY_ID: AtomicU64 = AtomicU64::new(0);

fn next_boundary() -> String {
    let id = NEXT_BOUNDARY_ID.fetch_add(1, Ordering::Relaxed);
    format!("----HwFormBoundary{:x}{:04x}", now_ms(), id)
}

struct FilePart {
    name: String,
    file_name: String,
    content: Vec<u8>,
}

pub struct MultipartForm {
    boundary: String,
    parts: Vec<FilePart>,
}

impl Default for MultipartForm {
    fn default() -> Self { MultipartForm::with_boundary(&next_boundary()) }
}

impl MultipartForm {
    pub fn new() -> MultipartForm { MultipartForm::default() }

    pub fn with_boundary(boundary: &str) -> MultipartForm {
        MultipartForm {
            boundary: boundary.to_owned(),
            parts: Vec::new(),
        }
    }

    pub fn file(mut self, name: &str, file_name: &str, content: Vec<u8>) -> MultipartForm {
        self.parts.push(FilePart {
            name: name.to_owned(),
            file_name: file_name.to_owned(),
            content,
        });
        self
    }

    pub fn boundary(&self) -> &str { &self.boundary }

    pub fn content_type(&self) -> String { format!("multipart/form-data; boundary={}", self.boundary) }

    pub fn into_body(self) -> Vec<u8> {
        let mut body = Vec::new();
        for part in self.parts {
            body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, part.file_name
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(&part.content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_part_layout() {
        let body = MultipartForm::with_boundary("XYZ")
            .file("file", "firmware.bin", vec![0x01, 0x02])
            .into_body();
        let mut expected = b"--XYZ\r\nContent-Disposition: form-data; name=\"file\"; filename=\"firmware.bin\"\r\n\
Content-Type: application/octet-stream\r\n\r\n"
            .to_vec();
        expected.extend_from_slice(&[0x01, 0x02]);
        expected.extend_from_slice(b"\r\n--XYZ--\r\n");
        assert_eq!(body, expected);
    }

    #[test]
    fn test_boundaries_are_unique() {
        let first = MultipartForm::new();
        let second = MultipartForm::new();
        assert_ne!(first.boundary(), second.boundary());
        assert_eq!(
            first.content_type(),
            format!("multipart/form-data; boundary={}", first.boundary())
        );
    }
}
