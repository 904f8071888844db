//! Document decoder: per-page PDF text extraction.

use crate::registry::Decoder;
use chinwag_core::attachment::{NormalizedContent, UploadedFile};
use chinwag_core::error::IngestError;

/// Extracts text from each page of a PDF and concatenates the pages in
/// order with a blank line between them. Encrypted or structurally broken
/// documents fail with the extractor's diagnostic.
pub struct PdfDecoder;

impl Decoder for PdfDecoder {
    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn decode(&self, file: &UploadedFile) -> Result<NormalizedContent, IngestError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(&file.bytes).map_err(|e| {
            IngestError::Malformed {
                name: file.name.clone(),
                diagnostic: e.to_string(),
            }
        })?;

        let text = pages
            .iter()
            .map(|page| page.trim_end())
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(NormalizedContent::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A minimal single-page PDF with the text "Hello" — enough structure
    /// for the extractor to walk.
    fn tiny_pdf() -> Vec<u8> {
        let mut pdf = Vec::new();
        pdf.extend_from_slice(b"%PDF-1.4\n");
        let objects: Vec<String> = vec![
            "1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n".into(),
            "2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n".into(),
            "3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n"
                .into(),
            {
                let stream = b"BT /F1 12 Tf 72 712 Td (Hello) Tj ET";
                format!(
                    "4 0 obj << /Length {} >> stream\n{}\nendstream endobj\n",
                    stream.len(),
                    String::from_utf8_lossy(stream)
                )
            },
            "5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n".into(),
        ];

        let mut offsets = Vec::new();
        for obj in &objects {
            offsets.push(pdf.len());
            pdf.extend_from_slice(obj.as_bytes());
        }

        let xref_start = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer << /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_start
            )
            .as_bytes(),
        );
        pdf
    }

    #[test]
    fn extracts_page_text() {
        let file = UploadedFile::new("doc.pdf", "application/pdf", tiny_pdf());
        let content = PdfDecoder.decode(&file).unwrap();
        let NormalizedContent::Text(text) = content else {
            panic!("expected text");
        };
        assert!(text.contains("Hello"), "extracted: {text:?}");
    }

    #[test]
    fn corrupt_pdf_fails_with_diagnostic() {
        let file = UploadedFile::new(
            "broken.pdf",
            "application/pdf",
            b"%PDF-1.4 garbage with no structure".to_vec(),
        );
        let err = PdfDecoder.decode(&file).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { ref name, .. } if name == "broken.pdf"));
    }

    #[test]
    fn not_a_pdf_at_all_fails() {
        let file = UploadedFile::new("fake.pdf", "application/pdf", b"just text".to_vec());
        assert!(PdfDecoder.decode(&file).is_err());
    }
}
