use std::fs;
use std::path::Path;

use crate::error::{DigestError, Result};

/// Suffix of per-period topic reports that feed the daily aggregate
pub const TOPIC_SUFFIX: &str = "_topic.md";

/// Concatenate every file in `directory` whose name ends with `suffix`.
///
/// Each file's content is followed by a newline. With `sort` off, files are
/// taken in directory-listing order, which depends on the filesystem.
pub fn aggregate_reports(directory: &Path, suffix: &str, sort: bool) -> Result<String> {
    if !directory.is_dir() {
        tracing::error!("Directory not found: {}", directory.display());
        return Err(DigestError::DirectoryNotFound(directory.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let matches_suffix = entry
            .file_name()
            .to_str()
            .map(|name| name.ends_with(suffix))
            .unwrap_or(false);

        if matches_suffix && entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }

    if sort {
        paths.sort();
    }

    let mut content = String::new();
    for path in &paths {
        content.push_str(&fs::read_to_string(path)?);
        content.push('\n');
    }

    tracing::info!(
        "Aggregated {} {} files from {}",
        paths.len(),
        suffix,
        directory.display()
    );

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_only_matching_suffix_is_aggregated() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a_topic.md"), "X").unwrap();
        fs::write(dir.path().join("b_topic.md"), "Y").unwrap();
        fs::write(dir.path().join("c.md"), "Z").unwrap();

        let content = aggregate_reports(dir.path(), TOPIC_SUFFIX, false).unwrap();
        assert!(content.contains('X'));
        assert!(content.contains('Y'));
        assert!(!content.contains('Z'));
    }

    #[test]
    fn test_sorted_aggregation_is_deterministic() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("16_topic.md"), "afternoon").unwrap();
        fs::write(dir.path().join("08_topic.md"), "morning").unwrap();
        fs::write(dir.path().join("12_topic.md"), "noon").unwrap();

        let content = aggregate_reports(dir.path(), TOPIC_SUFFIX, true).unwrap();
        assert_eq!(content, "morning\nnoon\nafternoon\n");
    }

    #[test]
    fn test_empty_directory_yields_empty_input() {
        let dir = tempdir().unwrap();
        assert_eq!(aggregate_reports(dir.path(), TOPIC_SUFFIX, true).unwrap(), "");
    }

    #[test]
    fn test_subdirectory_with_suffix_is_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested_topic.md")).unwrap();
        fs::write(dir.path().join("a_topic.md"), "X").unwrap();

        assert_eq!(aggregate_reports(dir.path(), TOPIC_SUFFIX, true).unwrap(), "X\n");
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("2024-09-01");

        match aggregate_reports(&missing, TOPIC_SUFFIX, true) {
            Err(DigestError::DirectoryNotFound(path)) => assert_eq!(path, missing),
            other => panic!("Expected DirectoryNotFound, got {:?}", other),
        }
    }
}
