// ============================================
// src/data.rs
// バイオームごとの家データの読み込み
// ============================================

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::biome::Biome;
use crate::house::House;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 家リストの供給元
pub trait HouseSource {
    fn houses(&self, biome: Biome) -> Result<Vec<House>, DataError>;
}

/// `<dir>/<biome>.json` を読む
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, biome: Biome) -> PathBuf {
        self.dir.join(format!("{}.json", biome.key()))
    }
}

impl HouseSource for DirSource {
    fn houses(&self, biome: Biome) -> Result<Vec<House>, DataError> {
        let path = self.path_for(biome);
        read_houses(&path)
    }
}

fn read_houses(path: &Path) -> Result<Vec<House>, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let houses: Vec<House> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| DataError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!("read {} houses from {}", houses.len(), path.display());
    Ok(houses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use test_log::test;

    #[test]
    fn reads_biome_file_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("taiga.json"),
            r#"[
                {"image":"img/t1.png","name":"Log cabin","beds":2,"chest":"iron"},
                {"image":"img/t2.png","name":"Hut","beds":0,"chest":"none"}
            ]"#,
        )
        .unwrap();

        let source = DirSource::new(dir.path());
        let houses = source.houses(Biome::Taiga).unwrap();
        assert_eq!(houses.len(), 2);
        assert_eq!(houses[0].name, "Log cabin");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path());
        assert!(matches!(source.houses(Biome::Snowy), Err(DataError::Io { .. })));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("plains.json"), "[{\"name\":").unwrap();
        let source = DirSource::new(dir.path());
        assert!(matches!(source.houses(Biome::Plains), Err(DataError::Parse { .. })));
    }

    #[test]
    fn bundled_data_parses() {
        let source = DirSource::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"));
        for biome in crate::biome::BIOMES {
            let houses = source.houses(biome).unwrap();
            assert!(!houses.is_empty());
            if biome.needs_craft() {
                assert!(houses.iter().all(|h| h.craft.is_some()));
            }
        }
    }
}
