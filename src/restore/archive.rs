// textpair-restore/src/restore/archive.rs
use lz4::Decoder as Lz4Decoder;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::{RestoreError, Result};

/// Table dumps inside a backup are named `textpair_<table>.sql`.
pub const DUMP_PREFIX: &str = "textpair_";
pub const DUMP_EXTENSION: &str = "sql";

/// One table dump found inside the unpacked backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDump {
    pub table: String,
    pub path: PathBuf,
}

/// Decompresses and unpacks a `.tar.lz4` backup archive into `workspace`,
/// then locates the backup's single top-level directory.
///
/// When the container holds more than one top-level entry, the
/// lexicographically first one is taken as the backup directory; it must be
/// a directory for the archive to be considered well formed.
pub fn extract_archive(archive_path: &Path, workspace: &Path) -> Result<PathBuf> {
    if !archive_path.is_file() {
        return Err(RestoreError::NotFound(archive_path.to_path_buf()));
    }

    println!("  - Decompressing with LZ4...");
    let archive_file = File::open(archive_path)?;
    let decoder =
        Lz4Decoder::new(BufReader::new(archive_file)).map_err(|e| RestoreError::CorruptArchive {
            path: archive_path.to_path_buf(),
            source: e,
        })?;

    println!("  - Extracting files...");
    let mut container = tar::Archive::new(decoder);
    container
        .unpack(workspace)
        .map_err(|e| RestoreError::CorruptArchive {
            path: archive_path.to_path_buf(),
            source: e,
        })?;

    locate_backup_dir(workspace)
}

fn locate_backup_dir(workspace: &Path) -> Result<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(workspace)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    let backup_dir = entries.into_iter().next().ok_or_else(|| {
        RestoreError::MalformedArchive("backup archive appears to be empty".to_string())
    })?;
    if !backup_dir.is_dir() {
        return Err(RestoreError::MalformedArchive(format!(
            "unexpected backup structure: top-level entry '{}' is not a directory",
            backup_dir.file_name().unwrap_or_default().to_string_lossy()
        )));
    }
    Ok(backup_dir)
}

/// Lists the table dumps inside the unpacked backup directory, sorted by
/// table name. A backup with no table dumps is malformed.
pub fn find_table_dumps(backup_dir: &Path) -> Result<Vec<TableDump>> {
    let mut dumps = Vec::new();
    for entry in std::fs::read_dir(backup_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(DUMP_EXTENSION) {
            continue;
        }
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem,
            None => continue,
        };
        if let Some(table) = stem.strip_prefix(DUMP_PREFIX) {
            if !table.is_empty() {
                dumps.push(TableDump {
                    table: table.to_string(),
                    path: path.clone(),
                });
            }
        }
    }

    if dumps.is_empty() {
        return Err(RestoreError::MalformedArchive(format!(
            "no table dumps ({}*.{}) found in backup",
            DUMP_PREFIX, DUMP_EXTENSION
        )));
    }
    dumps.sort_by(|a, b| a.table.cmp(&b.table));
    Ok(dumps)
}

/// Finds the web application directory inside the unpacked backup, if any.
/// With more than one candidate, the lexicographically first directory wins.
pub fn find_web_app_dir(backup_dir: &Path) -> Result<Option<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(backup_dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lz4::EncoderBuilder;
    use std::fs;
    use std::io::Write;
    use walkdir::WalkDir;

    /// Packs `source_dir` into a `.tar.lz4` at `archive_path`, with entry
    /// paths relative to `source_dir`.
    fn build_archive(source_dir: &Path, archive_path: &Path) {
        let archive_file = File::create(archive_path).unwrap();
        let encoder = EncoderBuilder::new().build(archive_file).unwrap();
        let mut builder = tar::Builder::new(encoder);

        for entry in WalkDir::new(source_dir) {
            let entry = entry.unwrap();
            let path = entry.path();
            let name = path.strip_prefix(source_dir).unwrap();
            if name.as_os_str().is_empty() {
                continue;
            }
            if path.is_dir() {
                builder.append_dir(name, path).unwrap();
            } else {
                builder.append_path_with_name(path, name).unwrap();
            }
        }

        let encoder = builder.into_inner().unwrap();
        let (_, result) = encoder.finish();
        result.unwrap();
    }

    fn touch(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_extract_well_formed_archive() {
        let scratch = tempfile::tempdir().unwrap();
        let root = scratch.path().join("root");
        let source = root.join("textpair_backup");
        touch(&source.join("textpair_alignments.sql"), "SELECT 1;");
        touch(&source.join("web_app/index.html"), "<html></html>");
        let archive_path = scratch.path().join("backup.tar.lz4");
        build_archive(&root, &archive_path);

        let workspace = scratch.path().join("workspace");
        fs::create_dir(&workspace).unwrap();
        let backup_dir = extract_archive(&archive_path, &workspace).unwrap();

        assert_eq!(backup_dir.file_name().unwrap(), "textpair_backup");
        assert!(backup_dir.join("textpair_alignments.sql").is_file());
        assert!(backup_dir.join("web_app/index.html").is_file());
    }

    #[test]
    fn test_extract_missing_archive() {
        let scratch = tempfile::tempdir().unwrap();
        let result = extract_archive(&scratch.path().join("gone.tar.lz4"), scratch.path());
        assert!(matches!(result, Err(RestoreError::NotFound(_))));
    }

    #[test]
    fn test_extract_garbage_bytes() {
        let scratch = tempfile::tempdir().unwrap();
        let archive_path = scratch.path().join("bogus.tar.lz4");
        touch(&archive_path, "this is not an lz4 frame");

        let workspace = scratch.path().join("workspace");
        fs::create_dir(&workspace).unwrap();
        let result = extract_archive(&archive_path, &workspace);
        assert!(matches!(result, Err(RestoreError::CorruptArchive { .. })));
    }

    #[test]
    fn test_extract_empty_container() {
        let scratch = tempfile::tempdir().unwrap();
        let source = scratch.path().join("empty");
        fs::create_dir(&source).unwrap();
        let archive_path = scratch.path().join("empty.tar.lz4");
        build_archive(&source, &archive_path);

        let workspace = scratch.path().join("workspace");
        fs::create_dir(&workspace).unwrap();
        let result = extract_archive(&archive_path, &workspace);
        assert!(matches!(result, Err(RestoreError::MalformedArchive(_))));
    }

    #[test]
    fn test_extract_top_level_entry_not_a_directory() {
        let scratch = tempfile::tempdir().unwrap();
        let source = scratch.path().join("flat");
        touch(&source.join("loose_file.sql"), "SELECT 1;");
        let archive_path = scratch.path().join("flat.tar.lz4");
        build_archive(&source, &archive_path);

        let workspace = scratch.path().join("workspace");
        fs::create_dir(&workspace).unwrap();
        let result = extract_archive(&archive_path, &workspace);
        assert!(matches!(result, Err(RestoreError::MalformedArchive(_))));
    }

    #[test]
    fn test_find_table_dumps_sorted_by_table_name() {
        let scratch = tempfile::tempdir().unwrap();
        let backup_dir = scratch.path();
        touch(&backup_dir.join("textpair_passages.sql"), "");
        touch(&backup_dir.join("textpair_alignments.sql"), "");
        touch(&backup_dir.join("README.txt"), "not a dump");
        touch(&backup_dir.join("unrelated.sql"), "no prefix");

        let dumps = find_table_dumps(backup_dir).unwrap();
        let tables: Vec<&str> = dumps.iter().map(|d| d.table.as_str()).collect();
        assert_eq!(tables, vec!["alignments", "passages"]);
    }

    #[test]
    fn test_find_table_dumps_none_found() {
        let scratch = tempfile::tempdir().unwrap();
        touch(&scratch.path().join("notes.txt"), "");
        let result = find_table_dumps(scratch.path());
        assert!(matches!(result, Err(RestoreError::MalformedArchive(_))));
    }

    #[test]
    fn test_find_web_app_dir_prefers_lexicographically_first() {
        let scratch = tempfile::tempdir().unwrap();
        fs::create_dir(scratch.path().join("web_app")).unwrap();
        fs::create_dir(scratch.path().join("another_app")).unwrap();
        touch(&scratch.path().join("textpair_alignments.sql"), "");

        let dir = find_web_app_dir(scratch.path()).unwrap().unwrap();
        assert_eq!(dir.file_name().unwrap(), "another_app");
    }

    #[test]
    fn test_find_web_app_dir_absent() {
        let scratch = tempfile::tempdir().unwrap();
        touch(&scratch.path().join("textpair_alignments.sql"), "");
        assert!(find_web_app_dir(scratch.path()).unwrap().is_none());
    }
}
