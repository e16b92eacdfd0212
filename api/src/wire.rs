/// Tournament-platform raw wire types — serde shapes for the backend's JSON.
/// These map to the clean domain types via the mapping fns in client.rs.
use serde::{Deserialize, Serialize};

/// Every response body carries this envelope. `status` is "SUCCESS" on
/// success; anything else is an error and `message` explains it.
#[derive(Debug, Deserialize, Clone)]
pub struct Envelope<T> {
    pub status: String,
    pub data: Option<T>,
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Tournament
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireTournament {
    pub id: Option<String>,
    pub name: Option<String>,
    pub stage: Option<String>,
    pub config: Option<WireTournamentConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireTournamentConfig {
    #[serde(rename = "topTeamsAdvance")]
    pub top_teams_advance: Option<u32>,
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireMatch {
    pub id: Option<String>,
    #[serde(rename = "homeTeam")]
    pub home_team: Option<WireSide>,
    #[serde(rename = "awayTeam")]
    pub away_team: Option<WireSide>,
    #[serde(rename = "homeScore")]
    pub home_score: Option<u32>,
    #[serde(rename = "awayScore")]
    pub away_score: Option<u32>,
    pub status: Option<String>, // "scheduled" | "live" | "completed" | "cancelled"
    pub stage: Option<String>,
    pub group: Option<String>,
    pub date: Option<String>, // ISO 8601
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireSide {
    #[serde(rename = "teamId")]
    pub team_id: Option<String>,
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Standings — the backend returns either an array of per-group objects or a
// single flat object. The untagged enum resolves the shape once, here.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum WireStandingsPayload {
    Grouped(Vec<WireGroupStanding>),
    Flat(WireFlatStandings),
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireGroupStanding {
    pub group: Option<String>,
    pub standings: Option<Vec<WireStandingRow>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireFlatStandings {
    pub standings: Option<Vec<WireStandingRow>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireStandingRow {
    #[serde(rename = "teamId")]
    pub team_id: Option<String>,
    #[serde(rename = "teamName")]
    pub team_name: Option<String>,
    pub played: Option<u32>,
    pub won: Option<u32>,
    pub drawn: Option<u32>,
    pub lost: Option<u32>,
    #[serde(rename = "goalDifference")]
    pub goal_difference: Option<i32>,
    pub points: Option<u32>,
    pub position: Option<u32>,
    pub group: Option<String>,
}

// ---------------------------------------------------------------------------
// Teams & groups
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireTournamentTeam {
    pub id: Option<String>,
    #[serde(rename = "teamId")]
    pub team_id: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "inQuarterFinals", default)]
    pub in_quarter_finals: bool,
    #[serde(rename = "inSemiFinals", default)]
    pub in_semi_finals: bool,
    #[serde(rename = "inFinals", default)]
    pub in_finals: bool,
    #[serde(default)]
    pub approved: bool,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireGroup {
    pub id: Option<String>,
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Player stats — counters absent from the wire default to zero
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct WirePlayerStats {
    #[serde(rename = "playerId")]
    pub player_id: Option<String>,
    #[serde(rename = "playerName")]
    pub player_name: Option<String>,
    #[serde(rename = "teamId")]
    pub team_id: Option<String>,
    #[serde(default)]
    pub sacks: u32,
    #[serde(default)]
    pub safeties: u32,
    #[serde(rename = "firstDowns", default)]
    pub first_downs: u32,
    #[serde(default)]
    pub interceptions: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(rename = "extraPoints1", default)]
    pub extra_points_1: u32,
    #[serde(rename = "extraPoints2", default)]
    pub extra_points_2: u32,
    #[serde(default)]
    pub returns: u32,
    #[serde(rename = "pickSixes", default)]
    pub pick_sixes: u32,
    #[serde(default)]
    pub touchdowns: u32,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PromoteTeamsBody<'a> {
    pub stage: crate::Stage,
    #[serde(rename = "teamIds")]
    pub team_ids: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct SkipStageBody<'a> {
    pub stage: crate::Stage,
    #[serde(rename = "teamIds")]
    pub team_ids: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct GenerateKnockoutBody<'a> {
    pub stage: crate::Stage,
    pub matches: &'a [crate::KnockoutPairing],
}

#[derive(Debug, Serialize)]
pub struct EndTournamentBody<'a> {
    #[serde(rename = "winnerTeamId")]
    pub winner_team_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct WildcardBody<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ManualMatchBody<'a> {
    pub stage: crate::Stage,
    #[serde(rename = "homeTeamId")]
    pub home_team_id: &'a str,
    #[serde(rename = "awayTeamId")]
    pub away_team_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct MatchUpdateBody {
    #[serde(rename = "homeScore", skip_serializing_if = "Option::is_none")]
    pub home_score: Option<u32>,
    #[serde(rename = "awayScore", skip_serializing_if = "Option::is_none")]
    pub away_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
