use std::fmt::Write as _;

/// Hand-assembles a minimal, valid, single-page PDF (no external rendering
/// crate — none exists anywhere in the retrieval pack). Draws `lines` as
/// left-aligned monospace text starting near the top of a US Letter page.
pub fn build_pdf(lines: &[String]) -> Vec<u8> {
    let mut content = String::new();
    content.push_str("BT /F1 12 Tf 72 720 Td 14 TL\n");
    for line in lines {
        let escaped = escape_pdf_string(line);
        writeln!(content, "({escaped}) Tj T*").unwrap();
    }
    content.push_str("ET");

    let objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Courier >>".to_string(),
        format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
    ];

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let header = format!("{} 0 obj\n", i + 1);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(body.as_bytes());
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    let mut xref = String::new();
    writeln!(xref, "xref").unwrap();
    writeln!(xref, "0 {}", objects.len() + 1).unwrap();
    writeln!(xref, "0000000000 65535 f ").unwrap();
    for offset in &offsets {
        writeln!(xref, "{offset:010} 00000 n ").unwrap();
    }
    out.extend_from_slice(xref.as_bytes());

    let trailer = format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF",
        objects.len() + 1
    );
    out.extend_from_slice(trailer.as_bytes());

    out
}

fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_a_header_and_trailer() {
        let bytes = build_pdf(&["hello".to_string()]);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/Type /Catalog"));
    }
}
