// ============================================
// src/app.rs
// キー入力をストアの操作に変換するアプリ本体
// ============================================

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::biome::{BIOMES, Biome};
use crate::data::{DataError, HouseSource};
use crate::house::{AttrKind, Pick};
use crate::quiz::{Advance, Outcome, Phase, QuizStore};
use crate::records::{RecordBook, SessionRecord};

/// アプリ全体の状態を管理する
pub struct App {
    pub store: QuizStore,
    source: Box<dyn HouseSource>,

    /// 過去の成績
    pub records: RecordBook,
    /// None なら保存しない
    record_path: Option<PathBuf>,

    /// 選択肢グリッド上のカーソル (行, 列)
    pub focus: (usize, usize),
    pub should_quit: bool,
    /// 直前の採点結果（表示中の問題のもの）
    pub last_outcome: Option<Outcome>,
}

impl App {
    pub fn new(
        store: QuizStore,
        source: Box<dyn HouseSource>,
        records: RecordBook,
        record_path: Option<PathBuf>,
    ) -> Self {
        Self {
            store,
            source,
            records,
            record_path,
            focus: (0, 0),
            should_quit: false,
            last_outcome: None,
        }
    }

    /// 最初の読み込み
    pub fn mount(&mut self) {
        let biome = self.store.biome();
        let result = self.store.load(biome, self.source.as_ref());
        self.after_load(result);
    }

    /// 画面に並べる行（砂漠だけ作業台の行がある）
    pub fn rows(&self) -> Vec<AttrKind> {
        let mut rows = vec![AttrKind::Beds, AttrKind::Chest];
        if self.store.needs_craft() {
            rows.push(AttrKind::Craft);
        }
        rows
    }

    pub fn focused_pick(&self) -> Option<Pick> {
        let kind = *self.rows().get(self.focus.0)?;
        kind.options().get(self.focus.1).copied()
    }

    /// 過去最高（今回の記録も含む）
    pub fn best_percent(&self) -> Option<u32> {
        self.records.best_percent(self.store.biome())
    }

    // MARK: 操作

    pub fn switch_biome(&mut self, name: &str) {
        let result = self.store.load_biome(name, self.source.as_ref());
        self.after_load(result);
    }

    pub fn play_again(&mut self) {
        let result = self.store.play_again(self.source.as_ref());
        self.after_load(result);
    }

    fn after_load(&mut self, result: Result<(), DataError>) {
        self.focus = (0, 0);
        self.last_outcome = None;
        if let Err(e) = result {
            log::error!("could not load {}: {}", self.store.biome(), e);
        }
    }

    /// 結果画面かエラー画面
    fn session_over(&self) -> bool {
        matches!(self.store.phase(), Phase::Finished | Phase::Failed(_))
    }

    fn cycle_biome(&mut self, step: isize) {
        let len = BIOMES.len() as isize;
        let next = (self.store.biome().index() as isize + step).rem_euclid(len) as usize;
        self.switch_biome(BIOMES[next].key());
    }

    fn move_focus(&mut self, d_row: isize, d_col: isize) {
        let rows = self.rows();
        let row = (self.focus.0 as isize + d_row).clamp(0, rows.len() as isize - 1) as usize;
        let width = rows[row].options().len() as isize;
        let col = (self.focus.1 as isize + d_col).clamp(0, width - 1) as usize;
        self.focus = (row, col);
    }

    /// キー入力の処理
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.switch_biome(BIOMES[idx].key());
            }
            KeyCode::Tab => self.cycle_biome(1),
            KeyCode::BackTab => self.cycle_biome(-1),
            KeyCode::Up => self.move_focus(-1, 0),
            KeyCode::Down => self.move_focus(1, 0),
            KeyCode::Left => self.move_focus(0, -1),
            KeyCode::Right => self.move_focus(0, 1),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.session_over() {
                    self.play_again();
                } else if let Some(pick) = self.focused_pick() {
                    self.store.select(pick);
                }
            }
            KeyCode::Char('s') => {
                if let Some(outcome) = self.store.submit(now) {
                    log::info!(
                        "{} answer, next house in {} ms",
                        if outcome.all_correct { "correct" } else { "wrong" },
                        outcome.delay.as_millis()
                    );
                    self.last_outcome = Some(outcome);
                }
            }
            KeyCode::Char('r') => {
                if self.session_over() {
                    self.play_again();
                }
            }
            _ => {}
        }
    }

    /// 予約された「次へ」を進める。終わったら成績を記録
    pub fn on_tick(&mut self, now: Instant) {
        match self.store.tick(now) {
            Some(Advance::Finished(summary)) => {
                self.records
                    .push(SessionRecord::from_summary(&summary, Utc::now()));
                self.save_records();
            }
            Some(Advance::Next) => {
                self.focus = (0, 0);
                self.last_outcome = None;
            }
            None => {}
        }
    }

    fn save_records(&self) {
        let Some(path) = &self.record_path else {
            return;
        };
        match self.records.save_to(path) {
            Ok(()) => log::debug!("saved records to {}", path.display()),
            Err(e) => log::warn!("could not save records to {}: {}", path.display(), e),
        }
    }
}

/// 切り替えタブの表示名
pub fn biome_titles() -> Vec<String> {
    BIOMES.iter().map(|b| Biome::display_name(*b)).collect()
}
