//! Document output handling
//!
//! The rendered BOM document goes to stdout; everything diagnostic goes to
//! stderr through `tracing`. This module only owns the stdout side.

use std::io::Write;

use crate::error::CliError;

/// Writes a rendered document followed by a trailing newline when missing.
pub fn write_document(w: &mut dyn Write, document: &[u8]) -> std::io::Result<()> {
    w.write_all(document)?;
    if !document.ends_with(b"\n") {
        writeln!(w)?;
    }
    Ok(())
}

/// Writes a rendered document to stdout.
pub fn print_document(document: &[u8]) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_document(&mut handle, document)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_trailing_newline() {
        let mut buffer = Vec::new();
        write_document(&mut buffer, b"{\"bomFormat\":\"CycloneDX\"}").unwrap();
        assert!(buffer.ends_with(b"}\n"));
    }

    #[test]
    fn keeps_existing_trailing_newline() {
        let mut buffer = Vec::new();
        write_document(&mut buffer, b"<!DOCTYPE html>\n").unwrap();
        assert_eq!(buffer, b"<!DOCTYPE html>\n");
    }

    #[test]
    fn passes_document_bytes_through_unchanged() {
        let document = br#"{"components":[{"name":"gpt2"}]}"#;
        let mut buffer = Vec::new();
        write_document(&mut buffer, document).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_slice(buffer.strip_suffix(b"\n").unwrap()).unwrap();
        assert_eq!(parsed["components"][0]["name"], "gpt2");
    }
}
