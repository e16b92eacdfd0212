use crate::state::messages::{NetworkRequest, NetworkResponse};
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tourney_api::client::{ApiResult, TourneyApi};

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Owns the API client and serves requests off the queue. Each request runs
/// in its own task so the fetches a stage change fans out proceed
/// concurrently; they populate disjoint UI state, so completion order is
/// irrelevant. Mutations still arrive one per operator action.
pub struct NetworkWorker {
    client: TourneyApi,
    tournament_id: String,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    in_flight: Arc<AtomicUsize>,
}

impl NetworkWorker {
    pub fn new(
        client: TourneyApi,
        tournament_id: String,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            tournament_id,
            requests,
            responses,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading().await;

            let client = self.client.clone();
            let tournament_id = self.tournament_id.clone();
            let responses = self.responses.clone();
            let in_flight = self.in_flight.clone();

            tokio::spawn(async move {
                let result = handle_request(&client, &tournament_id, request).await;
                debug!("network request complete");

                let is_ok = result.is_ok();
                let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                    message: err.to_string(),
                });

                if let Err(e) = responses.send(response).await {
                    error!("Failed to send network response: {e}");
                }
                finish_loading(&in_flight, &responses, is_ok).await;
            });
        }
    }

    async fn start_loading(&self) {
        // Only the 0 → 1 transition starts the spinner ticker; overlapping
        // fetches share it until the counter drains.
        if self.in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
            return;
        }

        let mut loading_state = LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if in_flight.load(Ordering::SeqCst) == 0 {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }
}

async fn finish_loading(
    in_flight: &AtomicUsize,
    responses: &mpsc::Sender<NetworkResponse>,
    is_ok: bool,
) {
    if in_flight.fetch_sub(1, Ordering::SeqCst) != 1 {
        return;
    }
    tokio::time::sleep(Duration::from_millis(15)).await;

    let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
    let _ = responses
        .send(NetworkResponse::LoadingStateChanged {
            loading_state: LoadingState { is_loading: false, spinner_char },
        })
        .await;
}

async fn handle_request(
    client: &TourneyApi,
    tournament_id: &str,
    request: NetworkRequest,
) -> ApiResult<NetworkResponse> {
    match request {
        NetworkRequest::LoadTournament => {
            debug!("loading tournament {tournament_id}");
            let tournament = client.fetch_tournament(tournament_id).await?;
            Ok(NetworkResponse::TournamentLoaded { tournament })
        }
        NetworkRequest::LoadMatches { stage } => {
            debug!("loading matches for {}", stage.label());
            let matches = client.fetch_matches(tournament_id, stage, None).await?;
            Ok(NetworkResponse::MatchesLoaded { stage, matches })
        }
        NetworkRequest::LoadStandings { stage } => {
            debug!("loading standings for {}", stage.label());
            let standings = client.fetch_standings(tournament_id, stage).await?;
            Ok(NetworkResponse::StandingsLoaded { stage, standings })
        }
        NetworkRequest::LoadTeams => {
            let teams = client.fetch_teams(tournament_id).await?;
            Ok(NetworkResponse::TeamsLoaded { teams })
        }
        NetworkRequest::LoadQualified { stage } => {
            debug!("loading teams qualified for {}", stage.label());
            let teams = client.fetch_teams(tournament_id).await?;
            let qualified = teams.into_iter().filter(|t| t.qualified_for(stage)).collect();
            Ok(NetworkResponse::QualifiedLoaded { stage, teams: qualified })
        }
        NetworkRequest::LoadPlayerStats { match_id } => {
            let players = client.fetch_player_stats(&match_id).await?;
            Ok(NetworkResponse::PlayerStatsLoaded { match_id, players })
        }
        NetworkRequest::PromoteTeams { target, team_ids } => {
            let count = team_ids.len();
            client.promote_teams(tournament_id, target, &team_ids).await?;
            Ok(NetworkResponse::ActionCompleted {
                description: format!("Promoted {count} teams to the {}", target.label()),
            })
        }
        NetworkRequest::SkipStage { target, team_ids } => {
            let count = team_ids.len();
            client.skip_stage(tournament_id, target, &team_ids).await?;
            Ok(NetworkResponse::ActionCompleted {
                description: format!("Skipped ahead: {count} teams moved to the {}", target.label()),
            })
        }
        NetworkRequest::GenerateKnockout { stage, pairings } => {
            let count = pairings.len();
            client.generate_knockout(tournament_id, stage, &pairings).await?;
            Ok(NetworkResponse::ActionCompleted {
                description: format!("Generated {count} {} matches", stage.label()),
            })
        }
        NetworkRequest::EndTournament { champion_team_id } => {
            client.end_tournament(tournament_id, &champion_team_id).await?;
            Ok(NetworkResponse::ActionCompleted {
                description: "Tournament ended".to_owned(),
            })
        }
        NetworkRequest::AddWildcard { name } => {
            client.add_wildcard(tournament_id, &name).await?;
            Ok(NetworkResponse::ActionCompleted {
                description: format!("Added wildcard team {name}"),
            })
        }
        NetworkRequest::CreateManualMatch { stage, home_team_id, away_team_id } => {
            client
                .create_manual_match(tournament_id, stage, &home_team_id, &away_team_id)
                .await?;
            Ok(NetworkResponse::ActionCompleted {
                description: "Match created".to_owned(),
            })
        }
        NetworkRequest::SubmitMatchUpdate { match_id, update, stats } => {
            for performance in &stats {
                client.submit_player_stats(&match_id, performance).await?;
            }
            client.update_match(&match_id, &update).await?;
            Ok(NetworkResponse::ActionCompleted {
                description: "Match updated".to_owned(),
            })
        }
        NetworkRequest::DeleteMatch { match_id } => {
            client.delete_match(&match_id).await?;
            Ok(NetworkResponse::ActionCompleted {
                description: "Match deleted".to_owned(),
            })
        }
    }
}
