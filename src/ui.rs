// ============================================
// src/ui.rs
// UI描画
// ============================================

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};

use crate::app::{App, biome_titles};
use crate::house::Pick;
use crate::quiz::{OptionMark, Phase};

const HELP: &str = "[←↑↓→] move  [Enter] pick  [s] submit  [1-5/Tab] biome  [Esc] quit";

pub fn draw(f: &mut Frame, app: &App) {
    let size = f.area();
    // 枠線を描画
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Village Quiz !");
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] バイオーム切り替え
            Constraint::Length(1), // [1] 空白
            Constraint::Min(1),    // [2] 本体
        ])
        .split(inner_area);

    draw_biome_switcher(f, app, chunks[0]);

    match app.store.phase() {
        Phase::Loading => f.render_widget(
            Paragraph::new("Loading...").style(Style::default().fg(Color::Gray)),
            chunks[2],
        ),
        Phase::Failed(message) => draw_error(f, app, message, chunks[2]),
        Phase::Finished => draw_results(f, app, chunks[2]),
        Phase::Answering | Phase::Revealed => draw_question(f, app, chunks[2]),
    }
}

fn draw_biome_switcher(f: &mut Frame, app: &App, area: Rect) {
    let tabs = Tabs::new(biome_titles())
        .select(app.store.biome().index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Green).bold());
    f.render_widget(tabs, area);
}

/// 選択肢1つ分のスタイル
fn option_style(mark: OptionMark, focused: bool) -> Style {
    let style = match mark {
        OptionMark::Plain => Style::default().fg(Color::White),
        OptionMark::Selected => Style::default().fg(Color::Yellow).bold(),
        OptionMark::Correct => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
        OptionMark::WrongPick => Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::CROSSED_OUT | Modifier::SLOW_BLINK),
        OptionMark::Faded => Style::default().fg(Color::DarkGray),
    };
    if focused {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

fn draw_question(f: &mut Frame, app: &App, area: Rect) {
    let store = &app.store;
    let Some(house) = store.house() else {
        return;
    };

    let mut lines = vec![
        Line::from(format!("House {} / {}", store.index() + 1, store.houses().len()))
            .style(Style::default().fg(Color::Gray)),
        Line::from(house.name.as_str()).bold().centered(),
        Line::from(house.image.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
        Line::default(),
    ];

    for (row, kind) in app.rows().into_iter().enumerate() {
        // 行見出しの横に今の回答
        let mut header = vec![Span::raw(kind.label()).bold()];
        if let Some(pick) = store.picks().get(kind) {
            header.push(Span::styled(
                format!("  > {}", pick),
                Style::default().fg(Color::Yellow),
            ));
        }
        lines.push(Line::from(header));
        let spans: Vec<Span> = kind
            .options()
            .into_iter()
            .enumerate()
            .flat_map(|(col, pick)| {
                let focused = app.focus == (row, col) && !store.is_revealed();
                let style = option_style(store.option_mark(pick), focused);
                [
                    Span::styled(format!("[ {} ]", option_label(pick)), style),
                    Span::raw(" "),
                ]
            })
            .collect();
        lines.push(Line::from(spans));
        lines.push(Line::default());
    }

    // カーソル位置の選択肢のアイコン
    if let Some(pick) = app.focused_pick() {
        lines.push(
            Line::from(pick.icon_path())
                .style(Style::default().fg(Color::DarkGray))
                .centered(),
        );
    }

    // 送信ボタン（回答がそろうまで無効）
    let (submit_label, submit_style) = if store.advance_pending() {
        ("  Next...  ", Style::default().fg(Color::Gray))
    } else if store.ready() {
        (
            "  Submit [s]  ",
            Style::default().fg(Color::Black).bg(Color::Green).bold(),
        )
    } else {
        ("  Submit [s]  ", Style::default().fg(Color::DarkGray))
    };
    lines.push(Line::from(Span::styled(submit_label, submit_style)).centered());
    match app.last_outcome {
        Some(outcome) if outcome.all_correct => lines.push(
            Line::from("Correct!")
                .style(Style::default().fg(Color::Green).bold())
                .centered(),
        ),
        Some(_) => lines.push(
            Line::from("Wrong!")
                .style(Style::default().fg(Color::Red).bold())
                .centered(),
        ),
        None => {}
    }
    lines.push(
        Line::from(format!("Score: {} / {}", store.correct(), store.attempts()))
            .style(Style::default().fg(Color::Yellow))
            .centered(),
    );
    lines.push(Line::default());
    lines.push(Line::from(HELP).style(Style::default().fg(Color::DarkGray)));

    f.render_widget(Paragraph::new(lines), area);
}

fn option_label(pick: Pick) -> String {
    match pick {
        Pick::Beds(n) => n.to_string(),
        _ => pick.to_string(),
    }
}

fn draw_results(f: &mut Frame, app: &App, area: Rect) {
    let store = &app.store;
    let grade = store.grade();
    let best = match app.best_percent() {
        Some(p) => format!("Best in {}: {}%", store.biome().display_name(), p),
        None => String::new(),
    };

    let lines = vec![
        Line::from("Results").bold().centered(),
        Line::default(),
        Line::from(format!(
            "You scored {}% ({} / {})",
            store.percent(),
            store.correct(),
            store.attempts()
        ))
        .centered(),
        Line::from(grade.label())
            .style(Style::default().fg(Color::Magenta).bold())
            .centered(),
        Line::default(),
        Line::from(vec![Span::raw("YOU: ").bold(), Span::raw(grade.image())]).centered(),
        Line::from(best)
            .style(Style::default().fg(Color::Yellow))
            .centered(),
        Line::default(),
        Line::from(Span::styled(
            "  Play again [r]  ",
            Style::default().fg(Color::Black).bg(Color::Green).bold(),
        ))
        .centered(),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_error(f: &mut Frame, app: &App, message: &str, area: Rect) {
    let lines = vec![
        Line::from(format!(
            "Could not load {} houses",
            app.store.biome().display_name()
        ))
        .style(Style::default().fg(Color::Red).bold())
        .centered(),
        Line::from(message.to_string())
            .style(Style::default().fg(Color::Gray))
            .centered(),
        Line::default(),
        Line::from("[r] retry  [1-5] switch biome  [Esc] quit")
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::Biome;
    use crate::data::DirSource;
    use crate::quiz::{Delays, QuizStore};
    use crate::records::RecordBook;
    use ratatui::backend::TestBackend;
    use std::path::Path;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn mounted(data: &Path, biome: Biome) -> App {
        let store = QuizStore::with_seed(biome, Delays::default(), 3);
        let mut app = App::new(
            store,
            Box::new(DirSource::new(data)),
            RecordBook::default(),
            None,
        );
        app.mount();
        app
    }

    #[test]
    fn question_screen_shows_rows_and_score() {
        let app = mounted(&Path::new(env!("CARGO_MANIFEST_DIR")).join("data"), Biome::Desert);
        let screen = render(&app);
        assert!(screen.contains("Desert"));
        assert!(screen.contains("Beds"));
        assert!(screen.contains("Crafting Table"));
        assert!(screen.contains("Score: 0 / 0"));
        assert!(screen.contains("House 1 / 6"));
        assert!(screen.contains("assets/icons/beds_0.png"));
    }

    #[test]
    fn reveal_shows_picks_and_verdict() {
        let mut app = mounted(&Path::new(env!("CARGO_MANIFEST_DIR")).join("data"), Biome::Taiga);
        let house = app.store.house().cloned().unwrap();
        app.store.select(house.answer(crate::house::AttrKind::Beds).unwrap());
        app.store.select(house.answer(crate::house::AttrKind::Chest).unwrap());
        app.last_outcome = app.store.submit(std::time::Instant::now());

        let screen = render(&app);
        assert!(screen.contains(&format!("> {} beds", house.beds)));
        assert!(screen.contains("Correct!"));
        assert!(screen.contains("Next..."));
    }

    #[test]
    fn failed_load_shows_error_card() {
        let dir = tempfile::tempdir().unwrap();
        let app = mounted(dir.path(), Biome::Taiga);
        let screen = render(&app);
        assert!(screen.contains("Could not load Taiga houses"));
    }

    #[test]
    fn empty_biome_shows_results() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plains.json"), "[]").unwrap();
        let app = mounted(dir.path(), Biome::Plains);
        let screen = render(&app);
        assert!(screen.contains("Results"));
        assert!(screen.contains("You scored 0% (0 / 0)"));
        assert!(screen.contains("???"));
    }
}
