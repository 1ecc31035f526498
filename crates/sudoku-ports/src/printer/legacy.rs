use std::fs;
use std::path::Path;

use crate::error::PortError;
use crate::traits::{PrinterInput, PrinterOutput, PrinterPort};

use super::pdf::build_pdf;

/// Writes a minimal single-page PDF rendering the solved grid as plain text.
pub struct LegacyPrinter;

impl PrinterPort for LegacyPrinter {
    fn export(&self, input: &PrinterInput<'_>, output_dir: &Path) -> Result<PrinterOutput, PortError> {
        fs::create_dir_all(output_dir).map_err(|source| PortError::Io {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let size = input.spec.size as usize;
        let mut lines = vec![format!("{} ({}x{})", input.spec.name, size, size)];
        for row in input.grid.as_bytes().chunks(size) {
            lines.push(String::from_utf8_lossy(row).to_string());
        }

        let bytes = build_pdf(&lines);
        let path = output_dir.join(format!("{}.pdf", input.spec.name));
        fs::write(&path, &bytes).map_err(|source| PortError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(PrinterOutput {
            path,
            bytes_written: bytes.len() as u64,
        })
    }
}
