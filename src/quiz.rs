// ============================================
// src/quiz.rs
// クイズの状態と採点（状態機械）
// ============================================

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::biome::Biome;
use crate::data::{DataError, HouseSource};
use crate::house::{AttrKind, House, Pick, Picks};
use crate::timer::Deferred;

// --------------------------------------------------
// 定数・補助の型
// --------------------------------------------------

/// 正解時の待ち時間 (ms)
pub const DELAY_CORRECT_MS: u64 = 600;
/// 不正解時の待ち時間 (ms)。正解を長めに見せる
pub const DELAY_WRONG_MS: u64 = 1500;

/// 回答後、次の問題へ進むまでの待ち時間
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    pub correct: Duration,
    pub wrong: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            correct: Duration::from_millis(DELAY_CORRECT_MS),
            wrong: Duration::from_millis(DELAY_WRONG_MS),
        }
    }
}

/// 画面の状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Answering,
    /// 採点済み。答えを色分け表示して、次へ進むのを待っている
    Revealed,
    Finished,
    /// データの読み込みに失敗した
    Failed(String),
}

/// 選択肢ボタンの表示状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Plain,
    Selected,
    Correct,
    WrongPick,
    Faded,
}

/// 結果画面の評価
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeTier {
    Pace,
    Unsure,
}

impl GradeTier {
    pub fn from_percent(percent: u32) -> Self {
        if percent >= 90 {
            GradeTier::Pace
        } else {
            GradeTier::Unsure
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeTier::Pace => "Spoingus pace",
            GradeTier::Unsure => "???",
        }
    }

    pub fn image(self) -> &'static str {
        match self {
            GradeTier::Pace => "assets/grade/pace.png",
            GradeTier::Unsure => "assets/grade/huh.png",
        }
    }
}

/// submit の採点結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub all_correct: bool,
    pub delay: Duration,
}

/// 1セッション分の成績
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub biome: Biome,
    pub correct: u32,
    pub attempts: u32,
    pub percent: u32,
}

/// tick で起きたこと
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next,
    Finished(Summary),
}

pub fn percent_of(correct: u32, attempts: u32) -> u32 {
    if attempts == 0 {
        return 0;
    }
    (f64::from(correct) * 100.0 / f64::from(attempts)).round() as u32
}

// --------------------------------------------------
// ストア本体
// --------------------------------------------------

/// クイズ全体の状態を管理する
pub struct QuizStore {
    biome: Biome,
    houses: Vec<House>,
    idx: usize,
    picks: Picks,

    attempts: u32,
    correct: u32,
    phase: Phase,

    delays: Delays,
    /// 採点後の「次へ」予約
    advance: Deferred<()>,
    rng: StdRng,
}

impl QuizStore {
    pub fn new(biome: Biome, delays: Delays) -> Self {
        Self::with_rng(biome, delays, StdRng::from_os_rng())
    }

    /// シャッフル順を固定したいとき用
    pub fn with_seed(biome: Biome, delays: Delays, seed: u64) -> Self {
        Self::with_rng(biome, delays, StdRng::seed_from_u64(seed))
    }

    fn with_rng(biome: Biome, delays: Delays, rng: StdRng) -> Self {
        Self {
            biome,
            houses: Vec::new(),
            idx: 0,
            picks: Picks::default(),
            attempts: 0,
            correct: 0,
            phase: Phase::Loading,
            delays,
            advance: Deferred::new(),
            rng,
        }
    }

    // MARK: 読み込み

    /// 名前でバイオームを読み込む。知らない名前なら何もしない
    pub fn load_biome(&mut self, name: &str, source: &dyn HouseSource) -> Result<(), DataError> {
        match name.parse::<Biome>() {
            Ok(biome) => self.load(biome, source),
            Err(e) => {
                log::debug!("ignoring load request: {}", e);
                Ok(())
            }
        }
    }

    /// バイオームの家リストを読み込み、シャッフルして最初から始める
    pub fn load(&mut self, biome: Biome, source: &dyn HouseSource) -> Result<(), DataError> {
        self.biome = biome;
        self.phase = Phase::Loading;
        self.advance.cancel();

        let result = source.houses(biome);
        self.reset_session();

        match result {
            Ok(mut houses) => {
                houses.shuffle(&mut self.rng);
                log::info!("loaded {} houses for {}", houses.len(), biome);
                self.houses = houses;
                self.phase = if self.houses.is_empty() {
                    Phase::Finished
                } else {
                    Phase::Answering
                };
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// 同じバイオームをもう一度（並びは取り直し）
    pub fn play_again(&mut self, source: &dyn HouseSource) -> Result<(), DataError> {
        self.load(self.biome, source)
    }

    fn reset_session(&mut self) {
        self.houses.clear();
        self.idx = 0;
        self.attempts = 0;
        self.correct = 0;
        self.picks = Picks::default();
    }

    // MARK: 回答

    /// 仮回答を記録する。回答中以外は無視
    pub fn select(&mut self, pick: Pick) {
        if self.phase != Phase::Answering {
            return;
        }
        self.picks.set(pick);
    }

    /// 採点して「次へ」を予約する。
    /// 回答中でない、または必要な回答がそろっていなければ何もしない
    pub fn submit(&mut self, now: Instant) -> Option<Outcome> {
        if self.phase != Phase::Answering || !self.ready() {
            return None;
        }
        let house = self.houses.get(self.idx)?;

        let all_correct = self
            .required_kinds()
            .into_iter()
            .all(|kind| self.picks.get(kind).is_some() && self.picks.get(kind) == house.answer(kind));

        self.attempts += 1;
        if all_correct {
            self.correct += 1;
        }
        self.phase = Phase::Revealed;

        let delay = if all_correct {
            self.delays.correct
        } else {
            self.delays.wrong
        };
        self.advance.schedule(now, delay, ());
        log::debug!(
            "graded {} ({}): {}",
            self.idx,
            house.name,
            if all_correct { "correct" } else { "wrong" }
        );

        Some(Outcome { all_correct, delay })
    }

    /// 予約した「次へ」の期限が来ていれば進める
    pub fn tick(&mut self, now: Instant) -> Option<Advance> {
        self.advance.fire_due(now)?;

        self.idx += 1;
        if self.idx >= self.houses.len() {
            self.idx = self.houses.len();
            self.phase = Phase::Finished;
            let summary = self.summary();
            log::info!(
                "finished {}: {}/{} ({}%)",
                summary.biome,
                summary.correct,
                summary.attempts,
                summary.percent
            );
            return Some(Advance::Finished(summary));
        }

        self.picks = Picks::default();
        self.phase = Phase::Answering;
        Some(Advance::Next)
    }

    // MARK: 派生値

    fn required_kinds(&self) -> Vec<AttrKind> {
        let mut kinds = vec![AttrKind::Beds, AttrKind::Chest];
        if self.needs_craft() {
            kinds.push(AttrKind::Craft);
        }
        kinds
    }

    pub fn needs_craft(&self) -> bool {
        self.biome.needs_craft()
    }

    /// 必要な回答がそろっているか
    pub fn ready(&self) -> bool {
        self.picks.beds.is_some()
            && self.picks.chest.is_some()
            && (!self.needs_craft() || self.picks.craft.is_some())
    }

    pub fn percent(&self) -> u32 {
        percent_of(self.correct, self.attempts)
    }

    pub fn grade(&self) -> GradeTier {
        GradeTier::from_percent(self.percent())
    }

    pub fn summary(&self) -> Summary {
        Summary {
            biome: self.biome,
            correct: self.correct,
            attempts: self.attempts,
            percent: self.percent(),
        }
    }

    /// 選択肢ボタンの表示状態
    pub fn option_mark(&self, pick: Pick) -> OptionMark {
        let picked = self.picks.is_picked(pick);
        if self.phase != Phase::Revealed {
            return if picked {
                OptionMark::Selected
            } else {
                OptionMark::Plain
            };
        }

        let is_answer = self
            .house()
            .and_then(|h| h.answer(pick.kind()))
            .is_some_and(|answer| answer == pick);

        if is_answer {
            OptionMark::Correct
        } else if picked {
            OptionMark::WrongPick
        } else {
            OptionMark::Faded
        }
    }

    // MARK: 参照

    pub fn biome(&self) -> Biome {
        self.biome
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn house(&self) -> Option<&House> {
        self.houses.get(self.idx)
    }

    pub fn houses(&self) -> &[House] {
        &self.houses
    }

    pub fn index(&self) -> usize {
        self.idx
    }

    pub fn picks(&self) -> &Picks {
        &self.picks
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn is_revealed(&self) -> bool {
        self.phase == Phase::Revealed
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn advance_pending(&self) -> bool {
        self.advance.is_pending()
    }
}
