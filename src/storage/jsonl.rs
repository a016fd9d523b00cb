//! JSONL (JSON Lines) files.
//!
//! Each line is a valid JSON object representing one entity.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use super::{StorageConfig, StorageError};

/// Entity types for JSONL storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Tournament,
    Player,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Tournament => "tournaments.jsonl",
            EntityType::Player => "players.jsonl",
        }
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for a specific entity type.
    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(config.data_dir.join(entity.filename()))
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append a single entity to the file.
    pub fn append(&self, entity: &T) -> Result<(), StorageError> {
        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        let json = serde_json::to_string(entity)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        debug!("Appended entity to {:?}", self.path);
        Ok(())
    }

    /// Write entities, replacing the entire file.
    ///
    /// Goes through a sibling temp file and a rename so readers never see a
    /// half-written file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let tmp = self.path.with_extension("jsonl.tmp");
        let mut writer = BufWriter::new(File::create(&tmp)?);
        let mut count = 0;

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        drop(writer);
        fs::rename(&tmp, &self.path)?;

        debug!("Wrote {} entities to {:?}", count, self.path);
        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for a specific entity type.
    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(config.data_dir.join(entity.filename()))
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all entities from the file. Unparseable lines are logged and skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        self.read(false)
    }

    /// Read all entities, failing on the first unparseable line.
    ///
    /// Use this for files that are read, modified and written back whole, where
    /// a skipped line would be dropped from the file.
    pub fn read_all_strict(&self) -> Result<Vec<T>, StorageError> {
        self.read(true)
    }

    fn read(&self, strict: bool) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) if strict => {
                    error!("Failed to parse line {} in {:?}: {}", idx + 1, self.path, e);
                    return Err(e.into());
                }
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", idx + 1, self.path, e);
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }

    /// Read entities matching a predicate.
    pub fn read_where<F>(&self, predicate: F) -> Result<Vec<T>, StorageError>
    where
        F: Fn(&T) -> bool,
    {
        let all = self.read_all()?;
        Ok(all.into_iter().filter(predicate).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Row {
        id: String,
        value: u32,
    }

    fn row(id: &str, value: u32) -> Row {
        Row {
            id: id.to_string(),
            value,
        }
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rows.jsonl");

        let writer: JsonlWriter<Row> = JsonlWriter::new(path.clone());
        assert_eq!(writer.write_all(&[row("1", 10), row("2", 20)]).unwrap(), 2);

        let reader: JsonlReader<Row> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), vec![row("1", 10), row("2", 20)]);
    }

    #[test]
    fn test_append_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("rows.jsonl");

        let writer: JsonlWriter<Row> = JsonlWriter::new(path.clone());
        writer.append(&row("1", 1)).unwrap();
        writer.append(&row("2", 2)).unwrap();

        let reader: JsonlReader<Row> = JsonlReader::new(path);
        assert!(reader.exists());
        assert_eq!(reader.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_write_all_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rows.jsonl");

        let writer: JsonlWriter<Row> = JsonlWriter::new(path.clone());
        writer.write_all(&[row("old", 1)]).unwrap();
        writer.write_all(&[row("a", 2), row("b", 3)]).unwrap();

        let reader: JsonlReader<Row> = JsonlReader::new(path.clone());
        let rows = reader.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "a");
        assert!(!path.with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let reader: JsonlReader<Row> = JsonlReader::new(temp_dir.path().join("none.jsonl"));
        assert!(!reader.exists());
        assert!(reader.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_read_all_skips_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.jsonl");
        std::fs::write(
            &path,
            r#"{"id":"1","value":1}
not-valid-json

{"id":"2","value":2}
"#,
        )
        .unwrap();

        let reader: JsonlReader<Row> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), vec![row("1", 1), row("2", 2)]);
    }

    #[test]
    fn test_read_all_strict_rejects_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.jsonl");
        std::fs::write(&path, "{\"id\":\"1\",\"value\":1}\n{broken\n").unwrap();

        let reader: JsonlReader<Row> = JsonlReader::new(path);
        let err = reader.read_all_strict().unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }

    #[test]
    fn test_read_where() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("filter.jsonl");
        JsonlWriter::new(path.clone())
            .write_all(&[row("a", 50), row("b", 150), row("c", 250)])
            .unwrap();

        let reader: JsonlReader<Row> = JsonlReader::new(path);
        let big = reader.read_where(|r| r.value > 100).unwrap();
        assert_eq!(big.len(), 2);
        assert_eq!(big[0].id, "b");
    }

    #[test]
    fn test_for_entity_paths() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());
        let writer: JsonlWriter<Row> = JsonlWriter::for_entity(&config, EntityType::Player);
        writer.append(&row("1", 1)).unwrap();
        assert!(config.players_path().exists());
        assert!(!config.tournaments_path().exists());
        assert_eq!(EntityType::Tournament.filename(), "tournaments.jsonl");
    }
}
