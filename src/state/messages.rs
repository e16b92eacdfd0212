use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use tourney_api::{
    KnockoutPairing, Match, MatchUpdate, PlayerPerformance, Stage, StageFilter, Standings,
    Tournament, TournamentTeam,
};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadTournament,
    LoadMatches { stage: StageFilter },
    LoadStandings { stage: StageFilter },
    LoadTeams,
    /// Teams flagged as qualified for a knockout stage.
    LoadQualified { stage: Stage },
    LoadPlayerStats { match_id: String },
    PromoteTeams { target: Stage, team_ids: Vec<String> },
    SkipStage { target: Stage, team_ids: Vec<String> },
    GenerateKnockout { stage: Stage, pairings: Vec<KnockoutPairing> },
    EndTournament { champion_team_id: String },
    AddWildcard { name: String },
    CreateManualMatch { stage: Stage, home_team_id: String, away_team_id: String },
    /// Player rows are POSTed one by one, then the match itself is PUT.
    SubmitMatchUpdate {
        match_id: String,
        update: MatchUpdate,
        stats: Vec<PlayerPerformance>,
    },
    DeleteMatch { match_id: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    TournamentLoaded { tournament: Tournament },
    /// Responses carry the stage they were fetched for so a late arrival
    /// after another stage change can be dropped instead of applied.
    MatchesLoaded { stage: StageFilter, matches: Vec<Match> },
    StandingsLoaded { stage: StageFilter, standings: Standings },
    TeamsLoaded { teams: Vec<TournamentTeam> },
    QualifiedLoaded { stage: Stage, teams: Vec<TournamentTeam> },
    PlayerStatsLoaded { match_id: String, players: Vec<PlayerPerformance> },
    /// A mutation landed; the description feeds the success notice.
    ActionCompleted { description: String },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Periodic live-score refresh for the selected stage.
    RefreshTick,
}
