/// Text and page count pulled out of one PDF
pub struct ExtractedPdf {
    pub text: String,
    pub pages: usize,
}

/// Extract the full text and page count from raw PDF bytes.
///
/// Parsing is CPU-bound and `pdf-extract` can panic on malformed input, so
/// callers on the async path should run this under `spawn_blocking`.
pub fn extract(bytes: &[u8]) -> Result<ExtractedPdf, pdf_extract::OutputError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)?;
    Ok(ExtractedPdf {
        pages: pages.len(),
        text: pages.join("\n"),
    })
}

#[cfg(test)]
pub mod test_pdf {
    /// Assemble a minimal single-page PDF carrying `text` in Helvetica.
    ///
    /// Offsets in the xref table are computed from the actual byte positions
    /// so the file is well formed without an on-disk fixture.
    pub fn minimal_pdf(text: &str) -> Vec<u8> {
        let escaped = text.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
        let stream = format!("BT /F1 12 Tf 72 720 Td ({escaped}) Tj ET");

        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{stream}\nendstream", stream.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (idx, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", idx + 1));
        }

        let xref_offset = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
        pdf.push_str("0000000000 65535 f \n");
        for offset in offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.into_bytes()
    }

    #[test]
    fn test_extract_single_page() {
        let bytes = minimal_pdf("Hello searchable world");
        let extracted = super::extract(&bytes).unwrap();
        assert_eq!(extracted.pages, 1);
        assert!(extracted.text.contains("Hello searchable world"));
    }

    #[test]
    fn test_extract_rejects_garbage() {
        assert!(super::extract(b"not a pdf at all").is_err());
    }
}
