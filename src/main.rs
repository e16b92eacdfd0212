mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::error;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tourney_api::client::TourneyApi;
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let app = App::new();
    if app.settings.tournament_id.is_empty() {
        anyhow::bail!(
            "no tournament configured — set TMTUI_TOURNAMENT (see `tmtui --help`)"
        );
    }
    let client = TourneyApi::new(app.settings.api_base.as_str(), app.settings.api_key.as_str());
    let tournament_id = app.settings.tournament_id.clone();
    let app = Arc::new(Mutex::new(app));

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal();

    tui_logger::init_logger(log::LevelFilter::Error)?;
    tui_logger::set_default_level(log::LevelFilter::Error);

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, tournament_id, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic live-score refresh thread (every 30s)
    let periodic_updater = PeriodicRefresher::new(ui_event_tx.clone());
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Trigger the startup fetches
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    periodic_task.abort();

    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("tmtui {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "tmtui - tournament admin terminal UI

Usage:
  tmtui
  tmtui --help
  tmtui --version

Environment (a local .env file is read first):
  TMTUI_API_BASE     Platform API base URL (default http://127.0.0.1:8080/api)
  TMTUI_API_KEY      Static api_key header value
  TMTUI_TOURNAMENT   Tournament id to administer (required)
  TMTUI_STAGE        Stage pre-selected on startup (all, regular_round,
                     quarter_final, semi_final, final)
  TMTUI_LOG          Log level shown in the in-app log pane"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let requests = app.lock().await.startup_requests();
            for request in requests {
                let _ = network_requests.send(request).await;
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::RefreshTick => {
            let requests = app.lock().await.refresh_requests();
            for request in requests {
                let _ = network_requests.send(request).await;
            }
            false
        }
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::TournamentLoaded { tournament } => {
            app.lock().await.on_tournament_loaded(tournament);
        }
        NetworkResponse::MatchesLoaded { stage, matches } => {
            app.lock().await.on_matches_loaded(stage, matches);
        }
        NetworkResponse::StandingsLoaded { stage, standings } => {
            app.lock().await.on_standings_loaded(stage, standings);
        }
        NetworkResponse::TeamsLoaded { teams } => {
            app.lock().await.on_teams_loaded(teams);
        }
        NetworkResponse::QualifiedLoaded { stage, teams } => {
            app.lock().await.on_qualified_loaded(stage, teams);
        }
        NetworkResponse::PlayerStatsLoaded { match_id, players } => {
            app.lock().await.on_player_stats_loaded(match_id, players);
        }
        NetworkResponse::ActionCompleted { description } => {
            let requests = app.lock().await.on_action_completed(description);
            for request in requests {
                let _ = network_requests.send(request).await;
            }
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            app.lock().await.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide).unwrap();
    execute!(stdout, terminal::EnterAlternateScreen).unwrap();
    execute!(stdout, terminal::Clear(terminal::ClearType::All)).unwrap();
    terminal::enable_raw_mode().unwrap();
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::MoveTo(0, 0)).unwrap();
    execute!(stdout, terminal::Clear(terminal::ClearType::All)).unwrap();
    execute!(stdout, terminal::LeaveAlternateScreen).unwrap();
    execute!(stdout, cursor::Show).unwrap();
    terminal::disable_raw_mode().unwrap();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
