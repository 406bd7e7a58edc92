pub mod pdf_fixtures {
    //! Programmatic PDF fixtures for tests
    //!
    //! Builds minimal well-formed documents (computed xref, Helvetica
    //! text marker per page) so tests need no checked-in binaries.

    /// Build a minimal `page_count`-page PDF. Every page is US Letter
    /// (612x792 points) and draws a "Page N" marker near the top.
    #[must_use]
    pub fn minimal_pdf(page_count: usize) -> Vec<u8> {
        assert!(page_count > 0, "fixture needs at least one page");

        // Object layout: 1 catalog, 2 page tree, 3 font, then one
        // page + content pair per page
        let kids: Vec<String> = (0..page_count)
            .map(|i| format!("{} 0 R", 4 + 2 * i))
            .collect();

        let mut objects: Vec<String> = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                page_count
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        for i in 0..page_count {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                5 + 2 * i
            ));

            let marker = format!("BT /F1 24 Tf 72 720 Td (Page {}) Tj ET", i + 1);
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                marker.len(),
                marker
            ));
        }

        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n");

        let mut offsets = Vec::with_capacity(objects.len());
        for (idx, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", idx + 1).as_bytes());
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }

        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );

        out
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn fixture_starts_with_pdf_magic() {
            let bytes = minimal_pdf(1);
            assert!(bytes.starts_with(b"%PDF-"));
        }

        #[test]
        fn fixture_has_one_xref_entry_per_object() {
            let bytes = minimal_pdf(3);
            let text = String::from_utf8_lossy(&bytes);
            // 3 fixed objects + 2 per page, plus the free entry
            assert!(text.contains("xref\n0 10\n"));
            assert!(text.contains("/Count 3"));
        }
    }
}
