use crate::app::{App, MenuItem};
use crate::state::app_state::StageAction;
use crate::state::messages::NetworkRequest;
use crate::state::modal::ActiveModal;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    // A keypress acknowledges the previous toast.
    guard.state.notice = None;

    if guard.state.modal.is_open() {
        if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
            crate::cleanup_terminal();
            std::process::exit(0);
        }
        let requests = handle_modal_keys(&mut guard, key_event);
        drop(guard);
        for request in requests {
            let _ = network_requests.send(request).await;
        }
        return;
    }

    let mut requests: Vec<NetworkRequest> = Vec::new();

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Matches),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Standings),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Teams),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Stage selector — entering a stage fans out its fetches
        (_, Char('s') | Char(']'), _) => requests = guard.select_stage_next(),
        (_, Char('S') | Char('['), _) => requests = guard.select_stage_prev(),

        // Manual refetch of the current stage
        (_, Char('r'), _) => requests = guard.stage_requests(),

        // Matches tab
        (MenuItem::Matches, Char('j') | KeyCode::Down, _) => guard.state.matches.row_down(),
        (MenuItem::Matches, Char('k') | KeyCode::Up, _) => guard.state.matches.row_up(),
        (MenuItem::Matches, Char('l') | KeyCode::Right, _) => guard.state.matches.page_next(),
        (MenuItem::Matches, Char('h') | KeyCode::Left, _) => guard.state.matches.page_prev(),
        (MenuItem::Matches, KeyCode::Enter, _) => {
            if let Some(request) = guard.open_score_entry() {
                requests.push(request);
            }
        }
        (MenuItem::Matches, Char('d'), _) => guard.open_delete_confirm(),
        (MenuItem::Matches, Char('c'), _) => guard.open_manual_match(),

        // Standings tab
        (MenuItem::Standings, Char('v'), _) => guard.state.standings.toggle_grouped(),
        (MenuItem::Standings, Char('j') | KeyCode::Down, _) => {
            guard.state.standings.scroll_offset =
                guard.state.standings.scroll_offset.saturating_add(1);
        }
        (MenuItem::Standings, Char('k') | KeyCode::Up, _) => {
            guard.state.standings.scroll_offset =
                guard.state.standings.scroll_offset.saturating_sub(1);
        }

        // Teams tab
        (MenuItem::Teams, Char('j') | KeyCode::Down, _) => guard.state.teams.row_down(),
        (MenuItem::Teams, Char('k') | KeyCode::Up, _) => guard.state.teams.row_up(),
        (MenuItem::Teams, Char('l') | KeyCode::Right, _) => guard.state.teams.page_next(),
        (MenuItem::Teams, Char('h') | KeyCode::Left, _) => guard.state.teams.page_prev(),
        (MenuItem::Teams, Char('w'), _) => guard.open_wildcard(),

        // Stage actions — only those the current stage enables
        (_, Char(c @ ('e' | 'p' | 'x' | 'g')), _) => {
            if let Some(action) = action_for_key(&guard, c) {
                guard.open_action(action);
            }
        }

        // Global
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    drop(guard);
    for request in requests {
        let _ = network_requests.send(request).await;
    }
}

fn action_for_key(guard: &App, ch: char) -> Option<StageAction> {
    let available = guard.state.stage.actions();
    let candidates: &[StageAction] = match ch {
        'e' => &[StageAction::EndGroupStage, StageAction::EndTournament],
        'p' => &[StageAction::PromoteToSemiFinal, StageAction::PromoteToFinal],
        'x' => &[StageAction::SkipStage],
        'g' => &[StageAction::GenerateFixtures],
        _ => &[],
    };
    candidates.iter().copied().find(|a| available.contains(a))
}

fn handle_modal_keys(guard: &mut App, key_event: KeyEvent) -> Vec<NetworkRequest> {
    let mut requests = Vec::new();

    // The score editor's name prompt captures typing before anything else.
    if let ActiveModal::ScoreEntry(editor) = &mut guard.state.modal
        && editor.name_input.is_some()
    {
        match key_event.code {
            KeyCode::Esc => editor.cancel_add_player(),
            KeyCode::Enter => editor.commit_add_player(true),
            KeyCode::Tab => editor.commit_add_player(false),
            KeyCode::Backspace => {
                if let Some(input) = &mut editor.name_input {
                    input.pop();
                }
            }
            Char(c) => {
                if let Some(input) = &mut editor.name_input {
                    input.push(c);
                }
            }
            _ => {}
        }
        return requests;
    }

    // Likewise the kickoff/location text fields.
    if let ActiveModal::ScoreEntry(editor) = &mut guard.state.modal
        && editor.text_edit.is_some()
    {
        match key_event.code {
            KeyCode::Esc | KeyCode::Enter => editor.end_text_edit(),
            KeyCode::Backspace => editor.text_pop(),
            Char(c) => editor.text_push(c),
            _ => {}
        }
        return requests;
    }

    // The wildcard modal is a plain text prompt.
    if matches!(guard.state.modal, ActiveModal::Wildcard(_)) {
        match key_event.code {
            KeyCode::Esc => guard.close_modal(),
            KeyCode::Enter => {
                if let Some(request) = guard.confirm_modal() {
                    requests.push(request);
                }
            }
            KeyCode::Backspace => {
                if let ActiveModal::Wildcard(modal) = &mut guard.state.modal {
                    modal.name.pop();
                }
            }
            Char(c) => {
                if let ActiveModal::Wildcard(modal) = &mut guard.state.modal {
                    modal.name.push(c);
                }
            }
            _ => {}
        }
        return requests;
    }

    match key_event.code {
        KeyCode::Esc => guard.close_modal(),
        KeyCode::Enter => {
            if let Some(request) = guard.confirm_modal() {
                requests.push(request);
            }
        }
        Char('y') if matches!(guard.state.modal, ActiveModal::ConfirmDelete(_)) => {
            if let Some(request) = guard.confirm_modal() {
                requests.push(request);
            }
        }
        Char('n') if matches!(guard.state.modal, ActiveModal::ConfirmDelete(_)) => {
            guard.close_modal();
        }
        code => match &mut guard.state.modal {
            ActiveModal::Promote(modal) => match code {
                Char('j') | KeyCode::Down => modal.cursor_down(),
                Char('k') | KeyCode::Up => modal.cursor_up(),
                Char(' ') => modal.toggle(),
                _ => {}
            },
            ActiveModal::Skip(modal) => match code {
                Char('j') | KeyCode::Down => modal.proposal.cursor_down(),
                Char('k') | KeyCode::Up => modal.proposal.cursor_up(),
                Char('l') | KeyCode::Right => modal.proposal.cycle_team(1),
                Char('h') | KeyCode::Left => modal.proposal.cycle_team(-1),
                _ => {}
            },
            ActiveModal::GenerateFixtures(proposal) => match code {
                Char('j') | KeyCode::Down => proposal.cursor_down(),
                Char('k') | KeyCode::Up => proposal.cursor_up(),
                Char('l') | KeyCode::Right => proposal.cycle_team(1),
                Char('h') | KeyCode::Left => proposal.cycle_team(-1),
                _ => {}
            },
            ActiveModal::EndTournament(modal) => match code {
                Char('j') | KeyCode::Down => modal.select(1),
                Char('k') | KeyCode::Up => modal.select(0),
                KeyCode::Tab => modal.toggle(),
                _ => {}
            },
            ActiveModal::ScoreEntry(editor) => match code {
                Char('j') | KeyCode::Down => editor.cursor_down(),
                Char('k') | KeyCode::Up => editor.cursor_up(),
                Char('l') | Char('+') | KeyCode::Right => editor.adjust(1),
                Char('h') | Char('-') | KeyCode::Left => editor.adjust(-1),
                Char('a') => editor.begin_add_player(),
                Char('i') => editor.begin_text_edit(),
                _ => {}
            },
            ActiveModal::ManualMatch(modal) => match code {
                Char('j') | KeyCode::Down => modal.cursor = 1,
                Char('k') | KeyCode::Up => modal.cursor = 0,
                Char('l') | KeyCode::Right => modal.cycle(1),
                Char('h') | KeyCode::Left => modal.cycle(-1),
                _ => {}
            },
            _ => {}
        },
    }

    requests
}
