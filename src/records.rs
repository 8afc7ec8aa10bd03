// ============================================
// src/records.rs
// セッション成績の記録と読み書き
// ============================================

use bincode::config::{Config, standard};
use bincode::{Decode, Encode};
use chrono::{DateTime, TimeZone, Utc};
use directories::ProjectDirs;
use thiserror::Error;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::biome::{BIOMES, Biome};
use crate::quiz::Summary;

/// 記録ファイルの上限。壊れた長さ情報で巨大な確保をしないため
const MAX_RECORD_BYTES: usize = 1 << 20;

fn record_config() -> impl Config {
    standard().with_limit::<MAX_RECORD_BYTES>()
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record file is corrupt: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("failed to encode records: {0}")]
    Encode(#[from] bincode::error::EncodeError),
}

/// 終了したセッション1回分の記録
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub timestamp: DateTime<Utc>,
    pub biome: Biome,
    pub correct: u32,
    pub attempts: u32,
    pub percent: u32,
}

impl SessionRecord {
    pub fn from_summary(summary: &Summary, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            biome: summary.biome,
            correct: summary.correct,
            attempts: summary.attempts,
            percent: summary.percent,
        }
    }
}

/// bincode用の内部表現（DateTimeをi64、バイオームを番号に変換）
#[derive(Encode, Decode)]
struct SessionRecordBin {
    timestamp_secs: i64,
    biome: u8,
    correct: u32,
    attempts: u32,
    percent: u32,
}

impl From<&SessionRecord> for SessionRecordBin {
    fn from(record: &SessionRecord) -> Self {
        Self {
            timestamp_secs: record.timestamp.timestamp(),
            biome: record.biome.index() as u8,
            correct: record.correct,
            attempts: record.attempts,
            percent: record.percent,
        }
    }
}

impl SessionRecordBin {
    /// 読めない記録（未知のバイオーム、壊れた時刻）は None
    fn into_record(self) -> Option<SessionRecord> {
        let biome = *BIOMES.get(usize::from(self.biome))?;
        let timestamp = Utc.timestamp_opt(self.timestamp_secs, 0).single()?;
        Some(SessionRecord {
            timestamp,
            biome,
            correct: self.correct,
            attempts: self.attempts,
            percent: self.percent,
        })
    }
}

/// 過去のセッション記録
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBook {
    pub history: Vec<SessionRecord>,
}

impl RecordBook {
    // MARK: 記録ファイルのパスを取得する関数
    pub fn default_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("jp", "Fukumoto0141", "VILLAGE_QUIZ") {
            return proj_dirs.data_dir().join("records.bin");
        }
        // 取得できなかったらカレントディレクトリに
        PathBuf::from("records.bin")
    }

    pub fn push(&mut self, record: SessionRecord) {
        self.history.push(record);
    }

    /// そのバイオームの自己ベスト（%）
    pub fn best_percent(&self, biome: Biome) -> Option<u32> {
        self.history
            .iter()
            .filter(|r| r.biome == biome)
            .map(|r| r.percent)
            .max()
    }

    /// MARK: ファイルに保存する
    pub fn save_to(&self, path: &Path) -> Result<(), RecordError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let bin: Vec<SessionRecordBin> = self.history.iter().map(SessionRecordBin::from).collect();
        let encoded = bincode::encode_to_vec(&bin, record_config())?;

        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&encoded)?;
        writer.flush()?;
        Ok(())
    }

    /// MARK: ファイルから読み込む。ファイルがなければ空
    pub fn load_from(path: &Path) -> Result<Self, RecordError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let buffer = fs::read(path)?;
        let (bin, _): (Vec<SessionRecordBin>, usize) =
            bincode::decode_from_slice(&buffer, record_config())?;
        let history = bin
            .into_iter()
            .filter_map(SessionRecordBin::into_record)
            .collect();
        Ok(Self { history })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(biome: Biome, correct: u32, attempts: u32) -> SessionRecord {
        let summary = Summary {
            biome,
            correct,
            attempts,
            percent: crate::quiz::percent_of(correct, attempts),
        };
        SessionRecord::from_summary(&summary, Utc.timestamp_opt(1_760_000_000, 0).unwrap())
    }

    #[test]
    fn missing_file_is_empty_book() {
        let dir = tempfile::tempdir().unwrap();
        let book = RecordBook::load_from(&dir.path().join("none.bin")).unwrap();
        assert!(book.history.is_empty());
    }

    #[test]
    fn saved_book_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("records.bin");

        let mut book = RecordBook::default();
        book.push(record(Biome::Desert, 3, 4));
        book.push(record(Biome::Plains, 5, 5));
        book.save_to(&path).unwrap();

        let loaded = RecordBook::load_from(&path).unwrap();
        assert_eq!(loaded, book);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.bin");
        fs::write(&path, [0xff, 0xff, 0xff]).unwrap();
        assert!(matches!(
            RecordBook::load_from(&path),
            Err(RecordError::Decode(_))
        ));
    }

    #[test]
    fn huge_length_prefix_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.bin");
        let mut bytes = vec![0xfd];
        bytes.extend_from_slice(&(1u64 << 40).to_le_bytes());
        fs::write(&path, bytes).unwrap();
        assert!(matches!(
            RecordBook::load_from(&path),
            Err(RecordError::Decode(_))
        ));
    }

    #[test]
    fn unreadable_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.bin");

        let good = record(Biome::Taiga, 2, 4);
        let bin = vec![
            SessionRecordBin::from(&good),
            SessionRecordBin {
                timestamp_secs: 1_760_000_000,
                biome: 9,
                correct: 1,
                attempts: 1,
                percent: 100,
            },
            SessionRecordBin {
                timestamp_secs: i64::MAX,
                biome: 0,
                correct: 1,
                attempts: 1,
                percent: 100,
            },
        ];
        fs::write(&path, bincode::encode_to_vec(&bin, record_config()).unwrap()).unwrap();

        let loaded = RecordBook::load_from(&path).unwrap();
        assert_eq!(loaded.history, vec![good]);
    }

    #[test]
    fn best_percent_per_biome() {
        let mut book = RecordBook::default();
        book.push(record(Biome::Taiga, 1, 4));
        book.push(record(Biome::Taiga, 3, 4));
        book.push(record(Biome::Snowy, 5, 5));
        assert_eq!(book.best_percent(Biome::Taiga), Some(75));
        assert_eq!(book.best_percent(Biome::Snowy), Some(100));
        assert_eq!(book.best_percent(Biome::Desert), None);
    }
}
