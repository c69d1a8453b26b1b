// PLINK binary file set (.bed / .bim / .fam triple)

use super::paths::{append_extension, replace_extension, strip_extension};
use std::path::{Path, PathBuf};

pub const BED_EXTENSION: &str = "bed";
pub const BIM_EXTENSION: &str = "bim";
pub const FAM_EXTENSION: &str = "fam";

/// Three sibling files sharing one stem: genotype data, variant metadata, sample metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    pub bed: PathBuf,
    pub bim: PathBuf,
    pub fam: PathBuf,
}

impl FileSet {
    /// Build the triple from a stem such as `/d/out`
    pub fn from_stem(stem: &Path) -> Self {
        Self {
            bed: append_extension(stem, BED_EXTENSION),
            bim: append_extension(stem, BIM_EXTENSION),
            fam: append_extension(stem, FAM_EXTENSION),
        }
    }

    /// Build the triple from a primary path. A `.bed` (or any other) extension is
    /// replaced; a bare stem gets the extensions appended.
    pub fn from_primary(primary: &Path) -> Self {
        let stem = if primary.extension().is_some() {
            replace_extension(primary, "")
        } else {
            primary.to_path_buf()
        };
        Self::from_stem(&stem)
    }

    pub fn stem(&self) -> PathBuf {
        strip_extension(&self.bed, BED_EXTENSION)
    }

    /// Paths in canonical order: data, variant metadata, sample metadata
    pub fn into_paths(self) -> Vec<PathBuf> {
        vec![self.bed, self.bim, self.fam]
    }
}

/// Expected artifacts for a primary `.bed` path, primary first
pub fn plink_fileset(primary: &Path) -> Vec<PathBuf> {
    FileSet::from_primary(primary).into_paths()
}
