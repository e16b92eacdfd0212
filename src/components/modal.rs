use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget};

use crate::state::fixtures::FixtureProposal;
use crate::state::modal::{
    ActiveModal, COUNTER_LABELS, EndTournamentState, ManualMatchState, PromoteState,
    ScoreEntryState, TextTarget, counter_value,
};

const MODAL_WIDTH: u16 = 70;

/// Centered overlay for whatever modal is active. One renderer for every
/// action; the variant decides the body.
pub struct ModalView<'a> {
    pub modal: &'a ActiveModal,
}

impl Widget for ModalView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = match self.modal {
            ActiveModal::None => return,
            ActiveModal::Promote(state) => promote_lines(state),
            ActiveModal::Skip(state) => {
                let mut lines = vec![
                    dim(format!(
                        "Pick the {} bracket directly — the skipped stage is never played.",
                        state.target.label()
                    )),
                    Line::from(""),
                ];
                lines.extend(fixture_lines(&state.proposal));
                lines
            }
            ActiveModal::GenerateFixtures(proposal) => {
                let mut lines = vec![
                    dim(format!(
                        "Proposed {} fixtures, seeded top vs. bottom.",
                        proposal.stage.label()
                    )),
                    Line::from(""),
                ];
                lines.extend(fixture_lines(proposal));
                lines
            }
            ActiveModal::EndTournament(state) => end_tournament_lines(state),
            ActiveModal::ScoreEntry(state) => score_entry_lines(state),
            ActiveModal::Wildcard(state) => vec![
                dim("Register a team outside the normal qualification flow."),
                Line::from(""),
                Line::from(format!("Team name: {}_", state.name)),
                Line::from(""),
                dim("Enter confirm · Esc cancel"),
            ],
            ActiveModal::ManualMatch(state) => manual_match_lines(state),
            ActiveModal::ConfirmDelete(state) => vec![
                Line::from(format!("Delete {}?", state.label)),
                Line::from(""),
                dim("This cannot be undone on the client."),
                Line::from(""),
                dim("y/Enter confirm · n/Esc cancel"),
            ],
        };

        let height = (lines.len() as u16 + 2).min(area.height);
        let rect = centered_rect(area, MODAL_WIDTH.min(area.width.saturating_sub(2)), height);

        Clear.render(rect, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow))
            .title(self.modal.title());
        let inner = block.inner(rect);
        block.render(rect, buf);
        Paragraph::new(lines).render(inner, buf);
    }
}

pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn dim(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(text.into(), Style::default().fg(Color::DarkGray)))
}

fn promote_lines(state: &PromoteState) -> Vec<Line<'static>> {
    let mut lines = vec![
        dim(format!(
            "Select exactly {} teams to advance to the {}.",
            state.required,
            state.target.label()
        )),
        Line::from(""),
    ];
    for (idx, team) in state.candidates.iter().enumerate() {
        let marker = if idx == state.cursor { '>' } else { ' ' };
        let check = if state.selected[idx] { 'x' } else { ' ' };
        let style = if state.selected[idx] {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(Span::styled(
            format!("{marker} [{check}] {:>2}. {}", idx + 1, team.name),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "{}/{} selected",
        state.selected_count(),
        state.required
    )));
    lines.push(dim("Space toggle · j/k move · Enter confirm · Esc cancel"));
    lines
}

fn fixture_lines(proposal: &FixtureProposal) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(proposal.slots.len() + 3);
    for (idx, slot) in proposal.slots.iter().enumerate() {
        let home_cursor = proposal.cursor == idx * 2;
        let away_cursor = proposal.cursor == idx * 2 + 1;
        let home = slot_name(proposal, slot.home, home_cursor);
        let away = slot_name(proposal, slot.away, away_cursor);
        lines.push(Line::from(format!("M{:<2} {home} vs {away}", idx + 1)));
    }
    lines.push(Line::from(""));
    lines.push(dim("j/k move · h/l change team · Enter confirm · Esc cancel"));
    lines
}

fn slot_name(proposal: &FixtureProposal, idx: Option<usize>, under_cursor: bool) -> String {
    let name = proposal
        .team_at(idx)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| "────────".to_string());
    let padded = format!("{name:<18}");
    if under_cursor {
        format!(">{padded}")
    } else {
        format!(" {padded}")
    }
}

fn end_tournament_lines(state: &EndTournamentState) -> Vec<Line<'static>> {
    let mut lines = vec![
        dim("Select the champion. Ending the tournament is final on the backend."),
        Line::from(""),
    ];
    for (idx, team) in state.finalists.iter().enumerate() {
        let marker = if idx == state.selected { '>' } else { ' ' };
        let tag = if state.suggested == Some(idx) { "  (suggested by result)" } else { "" };
        let style = if idx == state.selected {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(Span::styled(
            format!("{marker} {}{tag}", team.name),
            style,
        )));
    }
    lines.push(Line::from(""));
    if state.override_warning {
        lines.push(Line::from(Span::styled(
            "Warning: this is not the side the recorded result suggests.",
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(dim("j/k select · Enter confirm · Esc cancel"));
    lines
}

fn score_entry_lines(state: &ScoreEntryState) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(format!("{} vs {}", state.home_name, state.away_name)),
        Line::from(""),
    ];

    let editing = |target| state.text_edit == Some(target);
    let fixed = [
        format!("Home score   {}", state.home_score),
        format!("Away score   {}", state.away_score),
        format!("Status       {}", state.status.label()),
        format!(
            "Kickoff      {}{}",
            state.kickoff_input,
            if editing(TextTarget::Kickoff) { "_" } else { "" }
        ),
        format!(
            "Location     {}{}",
            state.location,
            if editing(TextTarget::Location) { "_" } else { "" }
        ),
    ];
    for (idx, text) in fixed.into_iter().enumerate() {
        let marker = if state.cursor == idx { '>' } else { ' ' };
        lines.push(Line::from(format!("{marker} {text}")));
    }

    lines.push(Line::from(""));
    if state.players.is_empty() {
        let hint = if state.stats_loaded {
            "No player stats yet — press a to add a player row."
        } else {
            "Loading player stats..."
        };
        lines.push(dim(hint));
    }

    for (row, performance) in state.players.iter().enumerate() {
        let cursor_counter = state
            .counter_position()
            .and_then(|(r, c)| (r == row).then_some(c));
        let mut cells = String::new();
        for (c, label) in COUNTER_LABELS.iter().enumerate() {
            let value = counter_value(&performance.stats, c);
            let mark = if cursor_counter == Some(c) { '>' } else { ' ' };
            cells.push_str(&format!("{mark}{label} {value:<2}"));
        }
        lines.push(Line::from(format!("{:<16}{cells}", performance.player_name)));
        let points = performance.stats.points();
        lines.push(dim(format!(
            "                R {}  A {}  D {}  QB {}  ·  {} pts",
            points.rusher, points.attacker, points.defence, points.qb, points.total
        )));
    }

    lines.push(Line::from(""));
    if let Some(input) = &state.name_input {
        lines.push(Line::from(Span::styled(
            format!("New player: {input}_   (Enter=home side, Tab=away side, Esc=cancel)"),
            Style::default().fg(Color::Yellow),
        )));
    } else if state.text_edit.is_some() {
        lines.push(dim("typing — Enter/Esc done · Backspace delete"));
    } else {
        lines.push(dim("j/k move · h/l adjust · i edit text · a add player · Enter save · Esc cancel"));
    }
    lines
}

fn manual_match_lines(state: &ManualMatchState) -> Vec<Line<'static>> {
    let home = state.candidates.get(state.home_idx).map(|t| t.name.as_str()).unwrap_or("-");
    let away = state.candidates.get(state.away_idx).map(|t| t.name.as_str()).unwrap_or("-");
    let home_marker = if state.cursor == 0 { '>' } else { ' ' };
    let away_marker = if state.cursor == 1 { '>' } else { ' ' };
    vec![
        dim(format!("Create a {} match by hand.", state.stage.label())),
        Line::from(""),
        Line::from(format!("{home_marker} Home  {home}")),
        Line::from(format!("{away_marker} Away  {away}")),
        Line::from(""),
        dim("j/k switch side · h/l change team · Enter confirm · Esc cancel"),
    ]
}
