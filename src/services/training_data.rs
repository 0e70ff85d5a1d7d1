// Training Data Service
// Collects technical/natural text pairs and exports them as CSV

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use super::text_processor::preprocess_text;

#[derive(Error, Debug)]
pub enum TrainingDataError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPair {
    pub technical: String,
    pub natural: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub source: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// In-memory batch of training pairs.
///
/// Pairs are stored as given; cleaning happens on the way out
/// (`training_pairs`, `save_csv`), never on import.
#[derive(Debug, Default)]
pub struct TrainingSet {
    pairs: Vec<TrainingPair>,
}

impl TrainingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pair(&mut self, technical: &str, natural: &str, source: Option<&str>) {
        self.pairs.push(TrainingPair {
            technical: technical.to_string(),
            natural: natural.to_string(),
            source: source.map(str::to_string),
        });
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Raw pairs as added or loaded.
    pub fn raw_pairs(&self) -> &[TrainingPair] {
        &self.pairs
    }

    /// Pairs with both texts run through [`preprocess_text`].
    pub fn training_pairs(&self) -> Vec<TrainingPair> {
        self.pairs
            .iter()
            .map(|p| TrainingPair {
                technical: preprocess_text(&p.technical),
                natural: preprocess_text(&p.natural),
                source: p.source.clone(),
            })
            .collect()
    }

    /// Write preprocessed pairs with a `technical,natural,source` header.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<(), TrainingDataError> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)?;
        for pair in self.training_pairs() {
            writer.serialize(pair)?;
        }
        writer.flush()?;
        info!(path = %path.display(), pairs = self.pairs.len(), "training_data.saved");
        Ok(())
    }

    /// Replace the current pairs with the rows of a CSV file.
    pub fn load_csv(&mut self, path: impl AsRef<Path>) -> Result<(), TrainingDataError> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)?;
        let pairs = reader
            .deserialize::<TrainingPair>()
            .collect::<Result<Vec<_>, _>>()?;
        info!(path = %path.display(), pairs = pairs.len(), "training_data.loaded");
        self.pairs = pairs;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_pairs_are_preprocessed() {
        let mut set = TrainingSet::new();
        set.add_pair(
            "Detaylar için  http://ornek.com  bakınız.",
            "  Girintili   doğal metin.  ",
            Some("katalog"),
        );

        let pairs = set.training_pairs();
        assert_eq!(pairs[0].technical, "Detaylar için bakınız.");
        assert_eq!(pairs[0].natural, "  Girintili doğal metin.");
        assert_eq!(pairs[0].source.as_deref(), Some("katalog"));
        // Stored pairs stay untouched.
        assert_eq!(set.raw_pairs()[0].natural, "  Girintili   doğal metin.  ");
    }

    #[test]
    fn test_csv_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.csv");

        let mut set = TrainingSet::new();
        set.add_pair("Satır 1,\nsatır 2  www.x.com", "Doğal \"alıntı\" metin", None);
        set.add_pair("İkinci teknik", "İkinci doğal", Some("yorum"));
        set.save_csv(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("technical,natural,source\n"));

        let mut loaded = TrainingSet::new();
        loaded.load_csv(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.raw_pairs()[0].technical, "Satır 1,\nsatır 2");
        assert_eq!(loaded.raw_pairs()[0].natural, "Doğal \"alıntı\" metin");
        assert_eq!(loaded.raw_pairs()[0].source, None);
        assert_eq!(loaded.raw_pairs()[1].source.as_deref(), Some("yorum"));
    }

    #[test]
    fn test_import_does_not_preprocess() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "technical,natural,source\n\"a   b http://x\",c,\n").unwrap();

        let mut set = TrainingSet::new();
        set.load_csv(&path).unwrap();
        assert_eq!(set.raw_pairs()[0].technical, "a   b http://x");
        assert_eq!(set.raw_pairs()[0].source, None);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut set = TrainingSet::new();
        assert!(set.load_csv("/nonexistent/pairs.csv").is_err());
    }
}
