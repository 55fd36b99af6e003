// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// multipart/form-data framing (RFC 7578) for a single file part followed by
// plain-text fields.
//
// The body is split into three pieces so the file bytes in the middle can be
// streamed straight from disk:
//
// ```text
// preamble:  --B CRLF
//            Content-Disposition: form-data; name="F"; filename="N" CRLF
//            Content-Type: T CRLF
//            Content-Transfer-Encoding: binary CRLF
//            CRLF
// file:      <bytes>
// epilogue:  CRLF
//            ( --B CRLF
//              Content-Disposition: form-data; name="K" CRLF
//              Content-Type: text/plain CRLF
//              CRLF
//              V CRLF )*
//            --B-- CRLF
// ```

use fileuploader_core::types::{FormField, UploadRequest};
use uuid::Uuid;

/// Boundary delimiter prefix.
pub const TWO_HYPHENS: &str = "--";

/// Line terminator mandated by RFC 7578.
pub const LINE_END: &str = "\r\n";

/// Padding placed around the random part of the boundary.
const BOUNDARY_PADDING: &str = "*****";

/// Generate a fresh boundary: `*****<uuid-v4>*****`.
pub fn generate_boundary() -> String {
    format!("{BOUNDARY_PADDING}{}{BOUNDARY_PADDING}", Uuid::new_v4())
}

/// Framing for one upload.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    field_name: String,
    file_name: String,
    content_type: String,
    fields: Vec<FormField>,
}

impl MultipartForm {
    /// Build the framing for `request` with a freshly generated boundary.
    pub fn for_request(request: &UploadRequest) -> Self {
        Self::with_boundary(request, generate_boundary())
    }

    /// Build the framing with an explicit boundary.
    pub fn with_boundary(request: &UploadRequest, boundary: String) -> Self {
        Self {
            boundary,
            field_name: request.field_name.clone(),
            file_name: request.file_name.clone(),
            content_type: request.content_type.clone(),
            fields: request.fields.clone(),
        }
    }

    /// Value of the request's `Content-Type` header.
    pub fn content_type_header(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Everything before the file bytes.
    pub fn preamble(&self) -> Vec<u8> {
        let mut out = String::with_capacity(256);
        out.push_str(TWO_HYPHENS);
        out.push_str(&self.boundary);
        out.push_str(LINE_END);
        out.push_str(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"{LINE_END}",
            escape_quoted(&self.field_name),
            escape_quoted(&self.file_name),
        ));
        out.push_str(&format!("Content-Type: {}{LINE_END}", self.content_type));
        out.push_str(&format!("Content-Transfer-Encoding: binary{LINE_END}"));
        out.push_str(LINE_END);
        out.into_bytes()
    }

    /// Everything after the file bytes: the file part terminator, one part
    /// per text field, and the closing delimiter.
    pub fn epilogue(&self) -> Vec<u8> {
        let mut out = String::with_capacity(64 + self.fields.len() * 96);
        out.push_str(LINE_END);
        for field in &self.fields {
            out.push_str(TWO_HYPHENS);
            out.push_str(&self.boundary);
            out.push_str(LINE_END);
            out.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"{LINE_END}",
                escape_quoted(&field.name)
            ));
            out.push_str(&format!("Content-Type: text/plain{LINE_END}"));
            out.push_str(LINE_END);
            out.push_str(&field.value);
            out.push_str(LINE_END);
        }
        out.push_str(TWO_HYPHENS);
        out.push_str(&self.boundary);
        out.push_str(TWO_HYPHENS);
        out.push_str(LINE_END);
        out.into_bytes()
    }

    /// Exact body length for a file of `file_len` bytes.
    pub fn content_length(&self, file_len: u64) -> u64 {
        self.preamble().len() as u64 + file_len + self.epilogue().len() as u64
    }
}

/// Quotes and line breaks would end the quoted-string early; percent-encode
/// them the way browsers do for form-data names.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(fields: Vec<FormField>) -> UploadRequest {
        UploadRequest {
            uri: "file:///tmp/cat.png".into(),
            upload_url: "http://example.test/upload".into(),
            method: "POST".into(),
            content_type: "image/png".into(),
            file_name: "cat.png".into(),
            field_name: "file".into(),
            fields,
        }
    }

    #[test]
    fn boundary_is_padded_uuid() {
        let b = generate_boundary();
        assert!(b.starts_with("*****"));
        assert!(b.ends_with("*****"));
        assert_eq!(b.len(), 5 + 36 + 5);
        assert_ne!(b, generate_boundary());
    }

    #[test]
    fn preamble_has_file_part_headers() {
        let form = MultipartForm::with_boundary(&request(vec![]), "XYZ".into());
        let preamble = String::from_utf8(form.preamble()).unwrap();
        assert_eq!(
            preamble,
            "--XYZ\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cat.png\"\r\n\
             Content-Type: image/png\r\n\
             Content-Transfer-Encoding: binary\r\n\
             \r\n"
        );
    }

    #[test]
    fn epilogue_without_fields_only_closes() {
        let form = MultipartForm::with_boundary(&request(vec![]), "XYZ".into());
        assert_eq!(form.epilogue(), b"\r\n--XYZ--\r\n");
    }

    #[test]
    fn epilogue_lists_fields_in_order() {
        let fields = vec![
            FormField { name: "title".into(), value: "Cat".into() },
            FormField { name: "rating".into(), value: "5".into() },
        ];
        let form = MultipartForm::with_boundary(&request(fields), "XYZ".into());
        let epilogue = String::from_utf8(form.epilogue()).unwrap();
        assert_eq!(
            epilogue,
            "\r\n\
             --XYZ\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\
             Content-Type: text/plain\r\n\
             \r\n\
             Cat\r\n\
             --XYZ\r\n\
             Content-Disposition: form-data; name=\"rating\"\r\n\
             Content-Type: text/plain\r\n\
             \r\n\
             5\r\n\
             --XYZ--\r\n"
        );
    }

    #[test]
    fn content_length_sums_all_pieces() {
        let form = MultipartForm::with_boundary(&request(vec![]), "XYZ".into());
        let expected = form.preamble().len() + 1000 + form.epilogue().len();
        assert_eq!(form.content_length(1000), expected as u64);
    }

    #[test]
    fn header_carries_boundary() {
        let form = MultipartForm::with_boundary(&request(vec![]), "XYZ".into());
        assert_eq!(form.content_type_header(), "multipart/form-data; boundary=XYZ");
    }

    #[test]
    fn quotes_in_names_are_escaped() {
        let mut req = request(vec![]);
        req.file_name = "a\"b.png".into();
        let form = MultipartForm::with_boundary(&req, "XYZ".into());
        let preamble = String::from_utf8(form.preamble()).unwrap();
        assert!(preamble.contains("filename=\"a%22b.png\""));
    }
}
