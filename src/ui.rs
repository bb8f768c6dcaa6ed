//! Layout and drawing: menu, board, HUD sidebar, overlays, result screen.

use crate::GameSession;
use crate::app::{BossState, MenuState, MenuTab, Popup, QuitOption, Screen};
use crate::grid::Coord;
use crate::input::{BoardGeometry, CELL_H, CELL_W};
use crate::session::{EndReason, Phase};
use crate::store::RankRow;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

pub const SIDEBAR_WIDTH: u16 = 26;

/// Duration of the match flash (tachyonfx fade on the cleared cells).
const MATCH_FADE_MS: u32 = 400;

/// Board footprint in terminal cells, border included.
fn board_pixel_size(rows: usize, cols: usize) -> (u16, u16) {
    (cols as u16 * CELL_W + 2, rows as u16 * CELL_H + 2)
}

/// Largest board (rows, cols) whose tiles, border and sidebar fit the given
/// terminal. Used to clamp --rows/--cols at startup so the board never
/// renders off-screen.
pub fn max_board_for_terminal(term_cols: u16, term_rows: u16) -> (usize, usize) {
    let rows = usize::from(term_rows.saturating_sub(2) / CELL_H);
    let cols = usize::from(term_cols.saturating_sub(2 + SIDEBAR_WIDTH) / CELL_W);
    (
        rows.clamp(2, crate::grid::MAX_DIM),
        cols.clamp(2, crate::grid::MAX_DIM),
    )
}

/// Where the board's inner grid lands for a given frame area. The app uses
/// the same function to map mouse coordinates, so drawing and input can
/// never disagree about tile positions.
pub fn board_geometry(area: Rect, rows: usize, cols: usize) -> BoardGeometry {
    let (bw, bh) = board_pixel_size(rows, cols);
    let total_w = bw + SIDEBAR_WIDTH;
    let x = area.x + area.width.saturating_sub(total_w) / 2;
    let y = area.y + area.height.saturating_sub(bh) / 2;
    BoardGeometry {
        x: x + 1,
        y: y + 1,
        rows,
        cols,
    }
}

/// Draw the current screen.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    theme: &Theme,
    session: &GameSession,
    menu_state: &MenuState,
    quit_selected: Option<QuitOption>,
    popups: &[Popup],
    boss: &BossState,
    drag: Option<((u16, u16), (u16, u16))>,
    leaderboard: &[RankRow],
    best_score: u32,
    match_fx_cells: &[Coord],
    match_fx: &mut Option<Effect>,
    match_fx_time: &mut Option<Instant>,
    now: Instant,
    no_animation: bool,
) {
    let area = frame.area();
    match screen {
        Screen::Menu => draw_menu(frame, theme, menu_state, best_score, area),
        Screen::Playing | Screen::QuitMenu => {
            draw_game(frame, theme, session, area, popups, boss, best_score);
            if let Some((start, current)) = drag {
                draw_drag_outline(frame, theme, session, area, start, current);
            }
            if !no_animation && !match_fx_cells.is_empty() {
                apply_match_effect(
                    frame,
                    theme,
                    session,
                    area,
                    match_fx_cells,
                    match_fx,
                    match_fx_time,
                    now,
                );
            }
            match session.phase() {
                Phase::Countdown => draw_countdown_overlay(frame, theme, session, area),
                Phase::Paused => draw_freeze_overlay(frame, theme, session, area),
                _ => {}
            }
            if screen == Screen::QuitMenu {
                if let Some(opt) = quit_selected {
                    draw_quit_menu(frame, theme, opt);
                }
            }
        }
        Screen::GameOver => {
            draw_result(frame, theme, session, area, leaderboard, best_score);
        }
    }
}

fn draw_menu(frame: &mut Frame, theme: &Theme, menu_state: &MenuState, best: u32, area: Rect) {
    let popup_w = 52u16;
    let popup_h = 20u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };

    let title = Line::from(vec![
        Span::styled(" Make ", Style::default().fg(theme.title).bold()),
        Span::styled(" TEN ", Style::default().fg(theme.bg).bg(theme.title).bold()),
    ]);

    let highlight_style = Style::default().fg(theme.bg).bg(theme.selection).bold();
    let selected_style = Style::default().fg(theme.selection).bold();
    let normal_style = Style::default().fg(theme.main_fg);

    let name_active = menu_state.current_tab == MenuTab::Name;
    let name_display = if menu_state.name.is_empty() && !name_active {
        "<type your name>".to_string()
    } else if name_active {
        format!("{}_", menu_state.name)
    } else {
        menu_state.name.clone()
    };
    let name_line = Line::from(vec![
        Span::styled(" Player ", if name_active { selected_style } else { normal_style }),
        Span::styled(
            format!(" {name_display} "),
            if name_active { highlight_style } else { normal_style },
        ),
    ]);

    let policy_active = menu_state.current_tab == MenuTab::Policy;
    let policy_span = |label: &str, mine: bool| {
        Span::styled(
            format!(" {label} "),
            if policy_active && mine {
                highlight_style
            } else if mine {
                selected_style
            } else {
                normal_style
            },
        )
    };
    let weighted = menu_state.policy == crate::bag::BagPolicy::Weighted;
    let policy_line = Line::from(vec![
        policy_span("WEIGHTED", weighted),
        Span::from("  "),
        policy_span("UNIFORM", !weighted),
    ]);

    let start_btn = if menu_state.current_tab == MenuTab::Start {
        Span::styled(" [ START ] ", highlight_style)
    } else {
        Span::styled(" [ START ] ", normal_style)
    };

    let error_line = menu_state
        .error
        .as_ref()
        .map(|e| Line::from(Span::styled(format!(" {e} "), Style::default().fg(theme.danger).bold())))
        .unwrap_or_else(|| Line::from(""));

    let lines = vec![
        Line::from(""),
        title,
        Line::from(""),
        Line::from(Span::styled(
            " drag a box around numbers that sum to 10 ",
            normal_style,
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Best: {best} "),
            Style::default().fg(theme.title),
        )),
        Line::from(""),
        name_line,
        Line::from(""),
        Line::from(Span::styled(
            " ─ TILE MIX ─ ",
            Style::default().fg(theme.div_line),
        )),
        policy_line,
        Line::from(""),
        Line::from(start_btn),
        error_line,
        Line::from(""),
        Line::from(vec![
            Span::styled(" ↕ ", Style::default().fg(theme.hint)),
            Span::from("FIELD   "),
            Span::styled(" ↔ ", Style::default().fg(theme.hint)),
            Span::from("CHANGE   "),
            Span::styled(" ENTER ", Style::default().fg(theme.hint)),
            Span::from("START"),
        ]),
        Line::from(Span::styled(
            " ⌁ [ESC] QUIT ",
            Style::default().fg(theme.danger),
        )),
    ];

    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

/// Board + sidebar, centered like the main game layout.
fn draw_game(
    frame: &mut Frame,
    theme: &Theme,
    session: &GameSession,
    area: Rect,
    popups: &[Popup],
    boss: &BossState,
    best: u32,
) {
    let grid = session.grid();
    let (bw, bh) = board_pixel_size(grid.rows(), grid.cols());

    // Anchor everything off board_geometry so input mapping and drawing can
    // never drift apart, even when the centering leftover is odd.
    let geom = board_geometry(area, grid.rows(), grid.cols());
    let board_area = Rect {
        x: geom.x - 1,
        y: geom.y - 1,
        width: bw.min(area.width),
        height: bh.min(area.height),
    };
    let sidebar_x = board_area.x + board_area.width;
    let sidebar_area = Rect {
        x: sidebar_x,
        y: board_area.y,
        width: SIDEBAR_WIDTH.min((area.x + area.width).saturating_sub(sidebar_x)),
        height: bh.min(area.height),
    };

    draw_board(frame, theme, session, board_area, popups);
    draw_sidebar(frame, theme, session, sidebar_area, boss, best);
}

fn draw_board(
    frame: &mut Frame,
    theme: &Theme,
    session: &GameSession,
    area: Rect,
    popups: &[Popup],
) {
    let grid = session.grid();
    let title = format!(" Make Ten  [{}] ", session.name());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    // Board background.
    for y in inner.y..inner.y + inner.height {
        for x in inner.x..inner.x + inner.width {
            buf[(x, y)].set_symbol(" ").set_bg(theme.bg);
        }
    }

    let delete_mode = session.delete_mode();
    for (coord, tile) in grid.tiles() {
        if tile.removed {
            continue;
        }
        // Offset shifts the tile up from its resting row while it falls.
        let visual_row = coord.row as f32 + tile.fall_offset;
        let py_f = visual_row * f32::from(CELL_H);
        let py = inner.y as i32 + py_f.round() as i32;
        let px = inner.x + coord.col as u16 * CELL_W;
        if py < i32::from(inner.y) || py + 1 >= i32::from(inner.y + inner.height) {
            continue; // still entering from above, or clipped
        }
        let py = py as u16;

        let (body, digit_fg) = if tile.selected {
            (theme.selection, theme.bg)
        } else if tile.hinted {
            (theme.hint, theme.bg)
        } else if delete_mode {
            (theme.danger, theme.bg)
        } else {
            (theme.div_line, theme.value_color(tile.value))
        };

        // Tile body is 3x1 inside its 4x2 cell; the spare column and row
        // read as grid lines.
        for dx in 0..CELL_W - 1 {
            let x = px + dx;
            if x < inner.x + inner.width {
                buf[(x, py)].set_symbol(" ").set_bg(body);
            }
        }
        let digit_x = px + 1;
        if digit_x < inner.x + inner.width {
            buf[(digit_x, py)]
                .set_symbol(&tile.value.to_string())
                .set_style(Style::default().fg(digit_fg).bg(body).bold());
        }
    }

    // Floating score popups.
    for popup in popups {
        if popup.x >= inner.x
            && popup.x < inner.x + inner.width
            && popup.y >= inner.y
            && popup.y < inner.y + inner.height
        {
            let style = Style::default().fg(popup.color).bg(theme.bg).bold();
            buf.set_string(popup.x, popup.y, &popup.text, style);
        }
    }
}

/// Perimeter highlight of the active drag's bounding box.
fn draw_drag_outline(
    frame: &mut Frame,
    theme: &Theme,
    session: &GameSession,
    area: Rect,
    start: (u16, u16),
    current: (u16, u16),
) {
    let grid = session.grid();
    let geom = board_geometry(area, grid.rows(), grid.cols());
    let x1 = start.0.min(current.0).max(geom.x);
    let x2 = start.0.max(current.0).min(geom.x + geom.width() - 1);
    let y1 = start.1.min(current.1).max(geom.y);
    let y2 = start.1.max(current.1).min(geom.y + geom.height() - 1);
    if x1 > x2 || y1 > y2 {
        return;
    }
    let buf = frame.buffer_mut();
    for x in x1..=x2 {
        buf[(x, y1)].set_bg(theme.selection);
        buf[(x, y2)].set_bg(theme.selection);
    }
    for y in y1..=y2 {
        buf[(x1, y)].set_bg(theme.selection);
        buf[(x2, y)].set_bg(theme.selection);
    }
}

/// Fade the just-matched cells back to the background.
fn apply_match_effect(
    frame: &mut Frame,
    theme: &Theme,
    session: &GameSession,
    area: Rect,
    cells: &[Coord],
    match_fx: &mut Option<Effect>,
    match_fx_time: &mut Option<Instant>,
    now: Instant,
) {
    let grid = session.grid();
    let geom = board_geometry(area, grid.rows(), grid.cols());
    let board_rect = Rect {
        x: geom.x,
        y: geom.y,
        width: geom.width(),
        height: geom.height(),
    }
    .intersection(area);
    let delta = match_fx_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
    *match_fx_time = Some(now);

    if match_fx.is_none() {
        let mut set: HashSet<(u16, u16)> = HashSet::new();
        for &c in cells {
            let (cx1, cy1, cx2, cy2) = geom.cell_rect(c);
            for x in cx1..=cx2 {
                for y in cy1..=cy2 {
                    set.insert((x, y));
                }
            }
        }
        let filter =
            CellFilter::PositionFn(ref_count(move |pos: Position| set.contains(&(pos.x, pos.y))));
        let bg = theme.bg;
        let effect = fx::fade_to(bg, bg, (MATCH_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(board_rect);
        *match_fx = Some(effect);
    }

    if let Some(effect) = match_fx {
        frame.render_effect(effect, board_rect, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_sidebar(
    frame: &mut Frame,
    theme: &Theme,
    session: &GameSession,
    area: Rect,
    boss: &BossState,
    best: u32,
) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // clock gauge
            Constraint::Length(5), // score / best / next reward
            Constraint::Length(3), // combo gauge
            Constraint::Length(7), // skills
            Constraint::Length(4), // boss
        ])
        .split(area);

    // --- Clock ---
    let clock_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let clock_inner = clock_block.inner(chunks[0]);
    clock_block.render(chunks[0], frame.buffer_mut());
    let time = session.time_left();
    let ratio = (f64::from(time) / 60.0).min(1.0);
    let clock_color = if time <= 10 {
        theme.danger
    } else if time <= 25 {
        Color::Yellow
    } else {
        Color::Green
    };
    Gauge::default()
        .ratio(ratio)
        .label(Span::styled(format!("{time}s"), fg_style.bold()))
        .gauge_style(Style::default().fg(clock_color).bg(theme.bg))
        .render(clock_inner, frame.buffer_mut());

    // --- Score ---
    let score_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let score_inner = score_block.inner(chunks[1]);
    score_block.render(chunks[1], frame.buffer_mut());
    let score_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(session.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Best:  ", title_style),
            Span::styled(best.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Bonus at: ", title_style),
            Span::styled(session.next_reward_score().to_string(), fg_style),
        ]),
    ];
    Paragraph::new(score_lines).render(score_inner, frame.buffer_mut());

    // --- Combo ---
    let combo_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let combo_inner = combo_block.inner(chunks[2]);
    combo_block.render(chunks[2], frame.buffer_mut());
    let combo_ratio = session.combo_ratio();
    let bar_color = if combo_ratio > 0.6 {
        Color::Green
    } else if combo_ratio > 0.3 {
        Color::Yellow
    } else {
        Color::Red
    };
    let combo_label = if session.combo() > 0 {
        format!("Combo x{}", session.combo())
    } else {
        "Combo".to_string()
    };
    Gauge::default()
        .ratio(combo_ratio)
        .label(Span::styled(combo_label, fg_style.bold()))
        .gauge_style(Style::default().fg(bar_color).bg(theme.bg))
        .render(combo_inner, frame.buffer_mut());

    // --- Skills ---
    let skills_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let skills_inner = skills_block.inner(chunks[3]);
    skills_block.render(chunks[3], frame.buffer_mut());
    let charge = |label: String, available: bool, armed: bool| {
        let style = if armed {
            Style::default().fg(theme.bg).bg(theme.danger).bold()
        } else if available {
            fg_style
        } else {
            Style::default().fg(theme.div_line)
        };
        Line::from(Span::styled(label, style))
    };
    let skills_lines = vec![
        charge(
            format!("[H]int     x{}", session.hint_charges()),
            session.hint_charges() > 0,
            false,
        ),
        charge(
            format!("[S]huffle  x{}", session.shuffle_charges()),
            session.shuffle_charges() > 0,
            false,
        ),
        charge(
            format!(
                "[D]elete   {}",
                if session.delete_mode() { "ARMED" } else { "one tile" }
            ),
            session.bomb_available(),
            session.delete_mode(),
        ),
        charge(
            "[W]ipe     whole board".to_string(),
            session.bomb_available(),
            false,
        ),
        charge(
            "[F]reeze   stop clock".to_string(),
            session.freeze_available(),
            false,
        ),
    ];
    Paragraph::new(skills_lines).render(skills_inner, frame.buffer_mut());

    // --- Boss (cosmetic) ---
    let boss_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let boss_inner = boss_block.inner(chunks[4]);
    boss_block.render(chunks[4], frame.buffer_mut());
    let face = if boss.is_down() { "(x_x)" } else { "(ò_ó)" };
    let boss_lines = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(boss_inner);
    Paragraph::new(Line::from(vec![
        Span::styled(format!("{face} "), Style::default().fg(theme.danger).bold()),
        Span::styled(format!("slain {}", boss.kills), fg_style),
    ]))
    .render(boss_lines[0], frame.buffer_mut());
    Gauge::default()
        .ratio(boss.hp_ratio())
        .gauge_style(Style::default().fg(theme.danger).bg(theme.bg))
        .render(boss_lines[1], frame.buffer_mut());
}

fn centered_popup(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_countdown_overlay(frame: &mut Frame, theme: &Theme, session: &GameSession, area: Rect) {
    let popup = centered_popup(area, 22, 5);
    let beats = session.countdown_left_ms() / 1000 + 1;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" READY… {beats} "),
            Style::default().fg(theme.bg).bg(theme.title).bold(),
        )),
        Line::from(""),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_freeze_overlay(frame: &mut Frame, theme: &Theme, session: &GameSession, area: Rect) {
    let popup = centered_popup(area, 26, 5);
    let secs = session.freeze_left_ms() / 1000 + 1;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" ❄ TIME FROZEN {secs} "),
            Style::default().fg(theme.bg).bg(theme.hint).bold(),
        )),
        Line::from(""),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_result(
    frame: &mut Frame,
    theme: &Theme,
    session: &GameSession,
    area: Rect,
    leaderboard: &[RankRow],
    best: u32,
) {
    let popup_w = 44u16;
    let popup_h = (14 + leaderboard.len().min(10)) as u16;
    let popup = centered_popup(area, popup_w, popup_h);

    let title = match session.phase() {
        Phase::Ended(EndReason::TimeUp) => " Time's up! ",
        Phase::Ended(EndReason::Deadlock) => " No moves left! ",
        _ => " Game over ",
    };
    let summary = session.audit_summary();
    let matches = summary
        .match_log
        .iter()
        .filter(|e| e.kind == crate::session::ActionKind::Match)
        .count();

    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(
            title,
            Style::default().fg(Color::White).bg(theme.danger).bold(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Score: ", Style::default().fg(theme.title)),
            Span::styled(summary.score.to_string(), Style::default().fg(theme.main_fg).bold()),
        ]),
        Line::from(vec![
            Span::styled(" Best: ", Style::default().fg(theme.title)),
            Span::styled(best.to_string(), Style::default().fg(theme.main_fg)),
        ]),
        Line::from(vec![
            Span::styled(" Matches: ", Style::default().fg(theme.title)),
            Span::styled(matches.to_string(), Style::default().fg(theme.main_fg)),
        ]),
    ];
    if summary.score > 0 && summary.score >= best {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).bold(),
        )));
    }
    lines.push(Line::from(""));
    if leaderboard.is_empty() {
        lines.push(Line::from(Span::styled(
            " no local rankings yet ",
            Style::default().fg(theme.div_line),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            " ─ RANKINGS ─ ",
            Style::default().fg(theme.div_line),
        )));
        for (i, row) in leaderboard.iter().take(10).enumerate() {
            let medal = match i {
                0 => "🥇",
                1 => "🥈",
                2 => "🥉",
                _ => "  ",
            };
            let style = if row.name == summary.name {
                Style::default().fg(theme.selection).bold()
            } else {
                Style::default().fg(theme.main_fg)
            };
            lines.push(Line::from(Span::styled(
                format!(" {medal} {:<16} {:>6} ", row.name, row.score),
                style,
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " R — Again    M — Menu    Q — Quit ",
        Style::default().fg(theme.main_fg),
    )));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Make Ten ", Style::default().fg(theme.title))),
        )
        .render(popup, frame.buffer_mut());
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let area = frame.area();
    let quit_rect = centered_popup(area, 24, 8);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .title(" Quit? ");

    for y in quit_rect.y..quit_rect.y + quit_rect.height {
        for x in quit_rect.x..quit_rect.x + quit_rect.width {
            frame.buffer_mut()[(x, y)].set_style(Style::default().bg(theme.bg));
        }
    }

    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::MainMenu, " Main Menu "),
        (QuitOption::Exit, " Exit "),
    ];
    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default().fg(theme.bg).bg(theme.title).bold()
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        frame.buffer_mut().set_string(rx, ry, label, style);
    }
}
