// Merge manifest - JSON list of input file-set stems handed to the merge tool

use crate::domain::paths::append_extension;
use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MANIFEST_EXTENSION: &str = "parts.json";

/// Ordered stems written next to the merge output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeManifest {
    pub path: PathBuf,
    pub stems: Vec<String>,
}

impl MergeManifest {
    /// Manifest for the merge whose output stem is `output_stem`
    pub fn for_output(output_stem: &Path, stems: Vec<String>) -> Self {
        Self {
            path: append_extension(output_stem, MANIFEST_EXTENSION),
            stems,
        }
    }

    /// Write, flush, sync and close the manifest before returning.
    ///
    /// Content goes to a sibling temp file that is renamed into place, so the
    /// manifest path never holds a partial list.
    pub fn write(&self) -> Result<()> {
        let tmp = append_extension(&self.path, "tmp");
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, &self.stems)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), stems = self.stems.len(), "Merge manifest written");
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Vec<String>> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_path_sits_next_to_output() {
        let manifest = MergeManifest::for_output(Path::new("/d/out"), vec![]);
        assert_eq!(manifest.path, PathBuf::from("/d/out.parts.json"));
    }

    #[test]
    fn test_manifest_round_trip_keeps_order() {
        let tmp = tempfile::tempdir().unwrap();
        let stems: Vec<String> = ["/d/c", "/d/a", "/d/b"].iter().map(|s| s.to_string()).collect();
        let manifest = MergeManifest::for_output(&tmp.path().join("merged"), stems.clone());
        manifest.write().unwrap();

        assert_eq!(MergeManifest::read(&manifest.path).unwrap(), stems);
        assert!(!append_extension(&manifest.path, "tmp").exists());
    }

    #[test]
    fn test_manifest_is_a_json_array() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = MergeManifest::for_output(
            &tmp.path().join("merged"),
            vec!["/d/a".to_string(), "/d/b".to_string()],
        );
        manifest.write().unwrap();
        let raw = std::fs::read_to_string(&manifest.path).unwrap();
        assert_eq!(raw, r#"["/d/a","/d/b"]"#);
    }
}
