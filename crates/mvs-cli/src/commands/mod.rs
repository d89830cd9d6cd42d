pub mod annotations;
pub mod compile;
pub mod validate;

use crate::error::{CliError, Result};
use anyhow::Context;
use molviewspec::core::tree::io::MvsDocument;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub(crate) fn read_document(path: &Path) -> Result<MvsDocument> {
    info!("Reading MVS document from {:?}", path);
    let content = fs::read_to_string(path)?;
    MvsDocument::from_json(&content).map_err(|source| CliError::Document {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `content` to `path`, or to standard output when there is none.
pub(crate) fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            info!("Writing output to {:?}", path);
            fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{content}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn document_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mvsj");
        fs::write(&path, r#"{ "kind": "download" }"#).unwrap();

        let err = read_document(&path).unwrap_err();
        assert!(matches!(err, CliError::Document { .. }));
        assert!(err.to_string().contains("broken.mvsj"));
    }

    #[test]
    fn unwritable_output_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("out.json");
        let err = write_output(Some(&target), "{}").unwrap_err();
        assert!(matches!(err, CliError::Other(_)));
        assert!(err.to_string().contains("out.json"));
    }

    #[test]
    fn missing_document_is_an_io_error() {
        let result = read_document(&PathBuf::from("/nonexistent/view.mvsj"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
