//! Loaders for named input files.

use std::fs::File;
use std::path::Path;

use gyr_tree::Document;

use crate::codec::YamlCodec;
use crate::error::{YamlError, YamlResult};

/// Decode one file into its documents.
pub fn documents_from_file(path: impl AsRef<Path>) -> YamlResult<Vec<Document>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| YamlError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    YamlCodec::decode_reader(file)
}

/// Decode several files and concatenate their forests in argument order.
pub fn documents_from_files<P: AsRef<Path>>(paths: &[P]) -> YamlResult<Vec<Document>> {
    let mut forest = Vec::new();
    for path in paths {
        forest.extend(documents_from_file(path)?);
    }
    Ok(forest)
}
