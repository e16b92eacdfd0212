use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::Line;
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs};
use tui::{Frame, Terminal};

use crate::app::{App, MenuItem};
use crate::components::modal::ModalView;
use crate::state::app_state::NoticeKind;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use tourney_api::{Match, MatchStatus, StandingRow, TournamentTeam};

static TABS: &[&str; 3] = &["Matches", "Standings", "Teams"];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    terminal
        .draw(|f| {
            layout.update(f.area());

            draw_tabs(f, layout.tab_bar, app);

            match app.state.active_tab {
                MenuItem::Matches => draw_matches(f, layout.main, app),
                MenuItem::Standings => draw_standings(f, layout.main, app),
                MenuItem::Teams => draw_teams(f, layout.main, app),
                MenuItem::Help => draw_help(f, layout.main),
            }

            draw_status_line(f, layout.status, app);

            if app.state.show_logs {
                draw_logs(f, layout.main);
            }

            if app.state.modal.is_open() {
                f.render_widget(ModalView { modal: &app.state.modal }, f.area());
            }

            draw_loading_spinner(f, f.area(), loading);
        })
        .unwrap();
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Matches => 0,
        MenuItem::Standings => 1,
        MenuItem::Teams => 2,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Tournament name, selected stage, and the actions it enables.
fn header_line(app: &App) -> String {
    let name = app
        .state
        .tournament
        .as_ref()
        .map(|t| t.name.as_str())
        .unwrap_or("Tournament");
    let actions: Vec<&str> = app.state.stage.actions().iter().map(|a| a.label()).collect();
    if actions.is_empty() {
        format!("{name} | {}", app.state.stage.filter.label())
    } else {
        format!("{name} | {} | {}", app.state.stage.filter.label(), actions.join("  "))
    }
}

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Matches ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, key_legend, content, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    f.render_widget(Paragraph::new(header_line(app)), header);
    f.render_widget(
        Paragraph::new("Keys: s=stage  j/k=move  h/l=page  Enter=edit  d=delete  c=create  r=refetch")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    let matches = &app.state.matches;
    if matches.matches.is_empty() {
        f.render_widget(
            Paragraph::new("No matches for this stage yet.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            content,
        );
        return;
    }

    let mut lines = Vec::with_capacity(matches.visible().len());
    for (idx, m) in matches.visible().iter().enumerate() {
        let marker = if idx == matches.row { ">" } else { " " };
        lines.push(format!("{marker} {}", format_match(m)));
    }
    f.render_widget(Paragraph::new(lines.join("\n")), content);

    let len = matches.matches.len();
    let page_count = matches.pager.page_count(len).max(1);
    f.render_widget(
        Paragraph::new(format!(
            "Page {}/{page_count} · {len} matches",
            matches.pager.current(len) + 1
        ))
        .style(Style::default().fg(Color::DarkGray)),
        footer,
    );
}

fn format_match(m: &Match) -> String {
    let home = side_label(&m.home);
    let away = side_label(&m.away);
    let score = match m.score() {
        Some((h, a)) => format!("{h:>2} - {a:<2}"),
        None => "-- - --".to_string(),
    };
    let status = match m.status {
        MatchStatus::Live => "LIVE".to_string(),
        MatchStatus::Completed => "FT".to_string(),
        MatchStatus::Cancelled => "CAN".to_string(),
        MatchStatus::Scheduled => m
            .kickoff
            .map(|t| t.format("%m/%d %H:%M").to_string())
            .unwrap_or_else(|| "SCH".to_string()),
    };
    let group = m
        .group
        .as_deref()
        .map(|g| format!("(grp {g}) "))
        .unwrap_or_default();
    let location = m
        .location
        .as_deref()
        .map(|l| format!("  @ {l}"))
        .unwrap_or_default();
    format!("{group}{home} {score} {away}  [{status}]{location}")
}

fn side_label(side: &Option<tourney_api::SideRef>) -> String {
    side.as_ref()
        .map(|s| truncate_name(&s.name, 14))
        .unwrap_or_else(|| truncate_name("TBD", 14))
}

fn truncate_name(name: &str, max: usize) -> String {
    let mut s: String = name.chars().take(max).collect();
    while s.chars().count() < max {
        s.push(' ');
    }
    s
}

fn draw_standings(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Standings ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, key_legend, content] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    f.render_widget(Paragraph::new(header_line(app)), header);
    f.render_widget(
        Paragraph::new("Keys: s=stage  j/k=scroll  v=grouped/flat view")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    let standings = &app.state.standings;
    if standings.rows.is_empty() {
        f.render_widget(
            Paragraph::new("No standings yet for this stage.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            content,
        );
        return;
    }

    let mut lines: Vec<String> = Vec::new();
    if standings.grouped_view {
        for group in standings.standings.groups() {
            lines.push(format!("Group {}", group.group));
            lines.push(standing_header());
            for row in &group.rows {
                lines.push(format_standing_row(row, None));
            }
            lines.push(String::new());
        }
    } else {
        lines.push(standing_header());
        for (idx, row) in standings.rows.iter().enumerate() {
            lines.push(format_standing_row(row, Some(idx + 1)));
        }
    }

    let offset = (standings.scroll_offset as usize).min(lines.len().saturating_sub(1));
    let window: Vec<String> =
        lines.into_iter().skip(offset).take(content.height as usize).collect();
    f.render_widget(Paragraph::new(window.join("\n")), content);
}

fn standing_header() -> String {
    format!(
        "  # {}  P  W  D  L    GD  Pts",
        truncate_name("Team", 18)
    )
}

fn format_standing_row(row: &StandingRow, rank_override: Option<usize>) -> String {
    let rank = rank_override.unwrap_or(row.position as usize);
    format!(
        "{rank:>3} {} {:>2} {:>2} {:>2} {:>2} {:>5} {:>4}",
        truncate_name(&row.team_name, 18),
        row.played,
        row.won,
        row.drawn,
        row.lost,
        row.goal_difference,
        row.points
    )
}

fn draw_teams(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Teams ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, key_legend, content] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    f.render_widget(Paragraph::new(header_line(app)), header);
    f.render_widget(
        Paragraph::new("Keys: s=stage  j/k=move  h/l=page  w=add wildcard")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    // Side pane for the stage's qualified teams when there is room for it.
    let mut list_area = content;
    let mut qualified_area: Option<Rect> = None;
    if content.width >= 80 && app.state.teams.qualified_stage.is_some() {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)])
                .areas(content);
        list_area = left;
        qualified_area = Some(right);
    }

    let teams = &app.state.teams;
    if teams.teams.is_empty() {
        f.render_widget(
            Paragraph::new("No teams registered yet.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            list_area,
        );
    } else {
        let mut lines = Vec::new();
        for (idx, team) in teams.visible().iter().enumerate() {
            let marker = if idx == teams.row { ">" } else { " " };
            lines.push(format!("{marker} {}", format_team(team)));
        }
        let len = teams.teams.len();
        let page_count = teams.pager.page_count(len).max(1);
        lines.push(String::new());
        lines.push(format!("Page {}/{page_count} · {len} teams", teams.pager.current(len) + 1));
        f.render_widget(Paragraph::new(lines.join("\n")), list_area);
    }

    if let Some(pane) = qualified_area {
        draw_qualified_pane(f, pane, app);
    }
}

fn format_team(team: &TournamentTeam) -> String {
    let mut flags = String::new();
    if team.in_quarter_finals {
        flags.push_str("[QF]");
    }
    if team.in_semi_finals {
        flags.push_str("[SF]");
    }
    if team.in_finals {
        flags.push_str("[F]");
    }
    let approval = if team.approved { "" } else { "  (pending approval)" };
    format!("{} {flags}{approval}", truncate_name(&team.name, 22))
}

fn draw_qualified_pane(f: &mut Frame, area: Rect, app: &App) {
    let stage_label = app
        .state
        .teams
        .qualified_stage
        .map(|s| s.label())
        .unwrap_or_default();
    let block = default_border(Color::DarkGray).title(format!(" Qualified · {stage_label} "));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.state.teams.qualified.is_empty() {
        f.render_widget(
            Paragraph::new("No teams flagged for this stage yet")
                .style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let lines: Vec<String> = app
        .state
        .teams
        .qualified
        .iter()
        .enumerate()
        .take(inner.height as usize)
        .map(|(seed, team)| format!("{:>2}. {}", seed + 1, team.name))
        .collect();
    f.render_widget(Paragraph::new(lines.join("\n")), inner);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = "q=quit  1=Matches  2=Standings  3=Teams
s/S=next/prev stage  r=refetch stage data
j/k=move  h/l=page  Enter=edit match  d=delete  c=create match
w=wildcard team  v=grouped standings

Stage actions (shown in the header when available):
e=end group stage / end tournament  p=promote  x=skip stage  g=generate fixtures

In modals: j/k=move  h/l=change value  Space=toggle  Enter=confirm  Esc=cancel";
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        inner,
    );
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    match &app.state.notice {
        Some(notice) => {
            let color = match notice.kind {
                NoticeKind::Success => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            f.render_widget(
                Paragraph::new(format!("[{}] {}", notice.timestamp, notice.text))
                    .style(Style::default().fg(color)),
                area,
            );
        }
        None => {
            f.render_widget(
                Paragraph::new("tmtui · ?=help")
                    .style(Style::default().fg(Color::DarkGray)),
                area,
            );
        }
    }
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let [_, logs] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(12)]).areas(area);
    f.render_widget(Clear, logs);
    let widget = tui_logger::TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style(Style::default().fg(Color::Gray));
    f.render_widget(widget, logs);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = Rect::new(area.width.saturating_sub(11), 1, 1, 1);
    f.render_widget(spinner, area);
}
