//! Local filesystem storage implementation.
//!
//! JSON documents are written pretty-printed and every write goes through a
//! temp file and a rename, so a crash never leaves a half-written checkpoint
//! or season file behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{CrawlState, ErrorRecord, FixtureRecord, LeagueSource, PathsConfig};
use crate::storage::{RecordSink, StateStore, csv};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    paths: PathsConfig,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, paths: PathsConfig) -> Self {
        Self {
            root_dir: root_dir.into(),
            paths,
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Relative key of a season's output file.
    pub fn season_key(&self, source: &LeagueSource, season: &str) -> String {
        format!(
            "{}/{}/{}.csv",
            self.paths.output_dir,
            source.country,
            source.file_stem(season)
        )
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl StateStore for LocalStorage {
    async fn load_state(&self) -> Result<Option<CrawlState>> {
        self.read_json(&self.paths.state_file).await.map_err(|e| {
            AppError::validation(format!("Corrupt progress state {}: {e}", self.paths.state_file))
        })
    }

    async fn save_state(&self, state: &CrawlState) -> Result<()> {
        self.write_json(&self.paths.state_file, state).await?;
        log::debug!("Checkpoint saved: {:?}", state);
        Ok(())
    }

    async fn append_error(&self, record: &ErrorRecord) -> Result<()> {
        let mut errors = self.load_errors().await?;
        errors.push(record.clone());
        self.write_json(&self.paths.errors_file, &errors).await
    }

    async fn load_errors(&self) -> Result<Vec<ErrorRecord>> {
        Ok(self
            .read_json(&self.paths.errors_file)
            .await?
            .unwrap_or_default())
    }
}

#[async_trait]
impl RecordSink for LocalStorage {
    async fn write_season(
        &self,
        source: &LeagueSource,
        season: &str,
        records: &[FixtureRecord],
    ) -> Result<Option<PathBuf>> {
        let key = self.season_key(source, season);
        if records.is_empty() {
            log::warn!(
                "No fixtures for {} {} {}, nothing written",
                source.country,
                source.league_name,
                season
            );
            // Output of an earlier run of this season no longer applies
            let path = self.path(&key);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => log::warn!("Removed stale season file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            return Ok(None);
        }

        let bytes = csv::encode_records(records)?;
        let path = self.write_bytes(&key, &bytes).await?;
        log::info!("{} fixtures written to {}", records.len(), path.display());
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use crate::storage::csv::Table;
    use tempfile::TempDir;

    fn storage(tmp: &TempDir) -> LocalStorage {
        LocalStorage::new(tmp.path(), PathsConfig::default())
    }

    fn source() -> LeagueSource {
        LeagueSource {
            country: "england".into(),
            league_name: "premier-league".into(),
            base_url: "https://example.com/england/premier-league".into(),
            seasons: vec!["2022-2023".into()],
        }
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!tmp.path().join("test.tmp").exists());
    }

    #[tokio::test]
    async fn test_state_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        assert_eq!(storage.load_state().await.unwrap(), None);
        let state = CrawlState {
            active: true,
            league_index: 2,
            season_index: 3,
        };
        storage.save_state(&state).await.unwrap();
        assert_eq!(storage.load_state().await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn test_corrupt_state_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        std::fs::write(tmp.path().join("state.json"), "{not json").unwrap();
        assert!(storage.load_state().await.is_err());
    }

    #[tokio::test]
    async fn test_errors_are_appended() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        for season_index in 0..2 {
            storage
                .append_error(&ErrorRecord {
                    url: format!("https://example.com/s{season_index}"),
                    error: "timeout".into(),
                    league_index: 0,
                    season_index,
                })
                .await
                .unwrap();
        }
        let errors = storage.load_errors().await.unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].season_index, 1);
    }

    #[tokio::test]
    async fn test_write_season_overwrites() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        let source = source();

        let mut record = FixtureRecord::new();
        record.set(Field::Round, 1u32);
        storage.write_season(&source, "2022-2023", &[record.clone()]).await.unwrap();

        record.set(Field::Round, 2u32);
        let path = storage
            .write_season(&source, "2022-2023", &[record])
            .await
            .unwrap()
            .unwrap();

        assert!(path.ends_with("historical/england/england_premier-league_2022-2023.csv"));
        let table = Table::parse(&std::fs::read_to_string(&path).unwrap());
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.cell(0, "round"), Some("2"));
    }

    #[tokio::test]
    async fn test_zero_records_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        let written = storage.write_season(&source(), "2022-2023", &[]).await.unwrap();
        assert!(written.is_none());
        assert!(!tmp.path().join("historical").exists());
    }

    #[tokio::test]
    async fn test_zero_records_removes_previous_season_file() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        let source = source();

        let mut record = FixtureRecord::new();
        record.set(Field::Round, 1u32);
        let path = storage
            .write_season(&source, "2022-2023", &[record])
            .await
            .unwrap()
            .unwrap();
        assert!(path.exists());

        let written = storage.write_season(&source, "2022-2023", &[]).await.unwrap();
        assert!(written.is_none());
        assert!(!path.exists());
    }
}
