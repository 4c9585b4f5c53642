//! Parcel ID source file.
//!
//! The capture run is driven by a JSON document of the form
//! `{"land_ids": [5, 3, 7]}`. Duplicates are removed before use.

use crate::error::Result;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Deserialize)]
struct IdDocument {
    land_ids: Vec<i64>,
}

/// Parse an ID document from a string.
pub fn parse_ids(json: &str) -> Result<BTreeSet<i64>> {
    let doc: IdDocument = serde_json::from_str(json)?;
    Ok(doc.land_ids.into_iter().collect())
}

/// Read the unique parcel IDs from a JSON file.
pub fn extract_ids<P: AsRef<Path>>(path: P) -> Result<BTreeSet<i64>> {
    let file = File::open(path.as_ref())?;
    let doc: IdDocument = serde_json::from_reader(BufReader::new(file))?;
    let ids: BTreeSet<i64> = doc.land_ids.into_iter().collect();
    tracing::debug!(path = %path.as_ref().display(), count = ids.len(), "loaded land ids");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use std::io::Write;

    #[test]
    fn test_parse_ids_deduplicates() {
        let ids = parse_ids(r#"{"land_ids":[5,5,3,3,7]}"#).unwrap();
        assert_eq!(ids, BTreeSet::from([3, 5, 7]));
    }

    #[test]
    fn test_parse_ids_missing_key() {
        let result = parse_ids(r#"{"ids":[1]}"#);
        assert!(matches!(result, Err(PipelineError::Json(_))));
    }

    #[test]
    fn test_extract_ids_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"land_ids": [42, 1, 42]}}"#).unwrap();

        let ids = extract_ids(file.path()).unwrap();
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![1, 42]);
    }

    #[test]
    fn test_extract_ids_missing_file() {
        let result = extract_ids("/definitely/not/here/land_ids.json");
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }
}
