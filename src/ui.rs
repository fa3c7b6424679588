//! Layout and drawing: playfield, active piece, sidebar, overlays.

use crate::app::{Hud, Screen};
use crate::clock::ClockState;
use crate::field::{Cell, EMPTY, FIELD_HEIGHT, FIELD_WIDTH};
use crate::game::GameState;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

/// Each cell is drawn two terminal columns wide so it looks square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 24;

/// Playfield size in terminal cells, border included.
fn playfield_outer_size() -> (u16, u16) {
    (
        FIELD_WIDTH as u16 * CELL_WIDTH + 2,
        FIELD_HEIGHT as u16 + 2,
    )
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Field cells with the active piece painted on top.
fn composed_cells(state: &GameState) -> Vec<Vec<Cell>> {
    let mut cells: Vec<Vec<Cell>> = state.field().rows().map(<[Cell]>::to_vec).collect();
    if let Some(piece) = state.piece() {
        for (r, c, value) in piece.shape.occupied() {
            let row = piece.offset.y + r as i32;
            let col = piece.offset.x + c as i32;
            if let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) {
                if let Some(cell) = cells.get_mut(row).and_then(|line| line.get_mut(col)) {
                    *cell = value;
                }
            }
        }
    }
    cells
}

pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    state: &GameState,
    theme: &Theme,
    hud: &Hud,
    paused: bool,
) {
    let area = frame.area();
    let (pw, ph) = playfield_outer_size();
    let board = centered(area, pw + SIDEBAR_WIDTH, ph);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(board);

    draw_playfield(frame, state, theme, chunks[0]);
    draw_sidebar(frame, theme, hud, state, chunks[1]);

    match screen {
        Screen::Menu => draw_menu(frame, theme, board),
        Screen::Playing if paused => draw_pause_overlay(frame, theme, board),
        Screen::Playing => {}
        Screen::GameOver => draw_game_over(frame, theme, hud, board),
    }
}

fn draw_playfield(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Blockfall ", Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    for (r, row) in composed_cells(state).iter().enumerate() {
        let y = inner.y + r as u16;
        if y >= inner.y + inner.height {
            break;
        }
        for (c, &cell) in row.iter().enumerate() {
            let x = inner.x + c as u16 * CELL_WIDTH;
            if x + CELL_WIDTH > inner.x + inner.width {
                break;
            }
            let (symbol, style) = if cell == EMPTY {
                (" .", Style::default().fg(theme.div_line).bg(theme.bg))
            } else {
                let color = theme.cell_color(cell);
                ("██", Style::default().fg(color).bg(theme.bg))
            };
            buf.set_string(x, y, symbol, style);
        }
    }
}

fn draw_sidebar(frame: &mut Frame, theme: &Theme, hud: &Hud, state: &GameState, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let status = match state.clock_state() {
        ClockState::Running => "running",
        ClockState::Stopped => "stopped",
    };
    let lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(hud.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Lines: ", title_style),
            Span::styled(hud.lines.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("State: ", title_style),
            Span::styled(status, fg_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("←/→  move", fg_style)),
        Line::from(Span::styled("↓    soft drop", fg_style)),
        Line::from(Span::styled("↑/r  rotate", fg_style)),
        Line::from(Span::styled("u    rotate back", fg_style)),
        Line::from(Span::styled("p    pause", fg_style)),
        Line::from(Span::styled("q    quit", fg_style)),
    ];
    Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(area, frame.buffer_mut());
}

fn draw_popup(frame: &mut Frame, theme: &Theme, area: Rect, lines: Vec<Line>) {
    let popup = centered(area, 30, lines.len() as u16 + 2);
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_menu(frame: &mut Frame, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Blockfall ", Style::default().fg(theme.title).bold())),
        Line::from(""),
        Line::from(Span::styled(
            " Enter — Start    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
    ];
    draw_popup(frame, theme, area, lines);
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    draw_popup(frame, theme, area, lines);
}

fn draw_game_over(frame: &mut Frame, theme: &Theme, hud: &Hud, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Final score: {} ", hud.final_score),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Lines: {} ", hud.lines),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " Enter — Restart    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    draw_popup(frame, theme, area, lines);
}
