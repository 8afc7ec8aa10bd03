// ============================================
// src/main.rs (メインファイル)
// ============================================

use std::fs::File;
use std::io::{Result, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

mod app;
mod biome;
mod data;
mod house;
mod quiz;
mod records;
mod timer;
mod ui;

use app::App;
use biome::Biome;
use data::DirSource;
use quiz::{DELAY_CORRECT_MS, DELAY_WRONG_MS, Delays, QuizStore};
use records::RecordBook;

use clap::Parser;
use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

// --------------------------------------------------
// コマンドライン引数
// --------------------------------------------------

#[derive(Debug, Parser)]
#[command(version, about = "Guess the beds and chest of village houses.")]
struct Cli {
    /// `<biome>.json` が置いてあるディレクトリ
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// 最初に遊ぶバイオーム
    #[arg(long, default_value = "plains")]
    biome: Biome,

    /// シャッフルの乱数シード
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = DELAY_CORRECT_MS)]
    correct_delay_ms: u64,

    #[arg(long, default_value_t = DELAY_WRONG_MS)]
    wrong_delay_ms: u64,

    /// 記録ファイルの場所（省略時はOSのデータディレクトリ）
    #[arg(long)]
    records_file: Option<PathBuf>,

    /// 成績を保存しない
    #[arg(long)]
    no_records: bool,

    /// ログの出力先。画面はTUIが使うので、指定しなければログは出さない
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// --------------------------------------------------
// メイン関数 (TUIセットアップと実行ループ)
// --------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let mut app = build_app(&cli);
    app.mount();

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    log::info!("logging to {}", path.display());
    Ok(())
}

fn build_app(cli: &Cli) -> App {
    let delays = Delays {
        correct: Duration::from_millis(cli.correct_delay_ms),
        wrong: Duration::from_millis(cli.wrong_delay_ms),
    };
    let store = match cli.seed {
        Some(seed) => QuizStore::with_seed(cli.biome, delays, seed),
        None => QuizStore::new(cli.biome, delays),
    };

    let record_path = if cli.no_records {
        None
    } else {
        Some(cli.records_file.clone().unwrap_or_else(RecordBook::default_path))
    };
    // 読めない記録ファイルは無視して空から始める
    let records = match &record_path {
        Some(path) => RecordBook::load_from(path).unwrap_or_else(|e| {
            log::warn!("ignoring records at {}: {}", path.display(), e);
            RecordBook::default()
        }),
        None => RecordBook::default(),
    };

    App::new(
        store,
        Box::new(DirSource::new(&cli.data_dir)),
        records,
        record_path,
    )
}

fn setup_terminal() -> Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal(_terminal: &mut Terminal<impl Backend>) -> Result<()> {
    stdout().execute(Show)?; // カーソルを再表示
    stdout().execute(LeaveAlternateScreen)?; // 代替スクリーンを終了
    disable_raw_mode()?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<impl Backend>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key, Instant::now());
            }
        }
        // 採点後の「次へ」はここで進む
        app.on_tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["villagequiz"]);
        assert_eq!(cli.biome, Biome::Plains);
        assert_eq!(cli.correct_delay_ms, 600);
        assert_eq!(cli.wrong_delay_ms, 1500);
        assert!(!cli.no_records);
    }

    #[test]
    fn cli_rejects_unknown_biome() {
        assert!(Cli::try_parse_from(["villagequiz", "--biome", "lava"]).is_err());
    }

    #[test]
    fn build_app_without_records_starts_empty() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let data = data.to_str().unwrap();
        let cli = Cli::parse_from([
            "villagequiz",
            "--data-dir",
            data,
            "--biome",
            "desert",
            "--seed",
            "9",
            "--no-records",
        ]);
        let mut app = build_app(&cli);
        app.mount();
        assert!(app.records.history.is_empty());
        assert_eq!(app.store.biome(), Biome::Desert);
        assert!(app.store.needs_craft());
    }
}
