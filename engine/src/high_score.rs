use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{
    ConfigContentProvider, ConfigManager, FileContentConfigProvider, MemoryContentProvider,
    Validate, YamlConfigSerializer,
};

const KEY_PREFIX: &str = "snake-high-";

/// Best-score storage keyed by strings such as `snake-high-NORMAL`.
pub trait HighScoreStore: Send {
    fn load(&self, key: &str) -> Result<Option<u32>, String>;
    fn save(&self, key: &str, score: u32) -> Result<(), String>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScoreTable(pub BTreeMap<String, u32>);

impl Validate for HighScoreTable {
    fn validate(&self) -> Result<(), String> {
        match self.0.keys().find(|key| !key.starts_with(KEY_PREFIX)) {
            Some(key) => Err(format!("Unexpected high score key: {}", key)),
            None => Ok(()),
        }
    }
}

/// High scores kept as one YAML mapping behind any content provider.
pub struct YamlHighScoreStore<TProvider: ConfigContentProvider> {
    manager: ConfigManager<TProvider, HighScoreTable, YamlConfigSerializer>,
}

pub type FileHighScoreStore = YamlHighScoreStore<FileContentConfigProvider>;
pub type MemoryHighScoreStore = YamlHighScoreStore<MemoryContentProvider>;

impl<TProvider: ConfigContentProvider> YamlHighScoreStore<TProvider> {
    pub fn with_provider(provider: TProvider) -> Self {
        Self {
            manager: ConfigManager::new(provider, YamlConfigSerializer::new()),
        }
    }
}

impl FileHighScoreStore {
    pub fn new(file_path: &str) -> Self {
        Self::with_provider(FileContentConfigProvider::new(file_path))
    }
}

impl MemoryHighScoreStore {
    pub fn new() -> Self {
        Self::with_provider(MemoryContentProvider::new())
    }
}

impl Default for MemoryHighScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<TProvider> HighScoreStore for YamlHighScoreStore<TProvider>
where
    TProvider: ConfigContentProvider + Send,
{
    fn load(&self, key: &str) -> Result<Option<u32>, String> {
        Ok(self.manager.get_config()?.0.get(key).copied())
    }

    fn save(&self, key: &str, score: u32) -> Result<(), String> {
        let mut table = self.manager.get_config()?;
        table.0.insert(key.to_string(), score);
        self.manager.set_config(&table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_temp_file_path() -> String {
        let mut path = std::env::temp_dir();
        let random_number: u32 = rand::random();
        path.push(format!("temp_snake_high_scores_{}.yaml", random_number));
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_missing_key_loads_none() {
        let store = MemoryHighScoreStore::new();
        assert_eq!(store.load("snake-high-EASY").unwrap(), None);
    }

    #[test]
    fn test_keys_are_independent() {
        let store = MemoryHighScoreStore::new();
        store.save("snake-high-EASY", 30).unwrap();
        store.save("snake-high-INSANE", 120).unwrap();

        assert_eq!(store.load("snake-high-EASY").unwrap(), Some(30));
        assert_eq!(store.load("snake-high-INSANE").unwrap(), Some(120));
        assert_eq!(store.load("snake-high-NORMAL").unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let path = get_temp_file_path();
        FileHighScoreStore::new(&path)
            .save("snake-high-NORMAL", 90)
            .unwrap();

        let reopened = FileHighScoreStore::new(&path);
        assert_eq!(reopened.load("snake-high-NORMAL").unwrap(), Some(90));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_corrupt_content_is_an_error() {
        let store = YamlHighScoreStore::with_provider(MemoryContentProvider::with_content(
            "snake-high-EASY: [not, a, number]",
        ));
        assert!(store.load("snake-high-EASY").is_err());

        let foreign = YamlHighScoreStore::with_provider(MemoryContentProvider::with_content(
            "best: 10",
        ));
        assert!(foreign.load("snake-high-EASY").is_err());
    }
}
