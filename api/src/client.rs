use crate::wire::{
    EndTournamentBody, Envelope, GenerateKnockoutBody, ManualMatchBody, MatchUpdateBody,
    PromoteTeamsBody, SkipStageBody, WildcardBody, WireGroup, WireGroupStanding, WireMatch,
    WirePlayerStats, WireSide, WireStandingRow, WireStandingsPayload, WireTournament,
    WireTournamentTeam,
};
use crate::{
    Group, GroupStanding, KnockoutPairing, Match, MatchStatus, MatchUpdate, PerformanceStats,
    PlayerPerformance, SideRef, Stage, StageFilter, StandingRow, Standings, Tournament,
    TournamentTeam,
};
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

/// Static auth header expected by the platform on every request.
const API_KEY_HEADER: &str = "api_key";
const SUCCESS_STATUS: &str = "SUCCESS";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Tournament-platform client. One instance per process; cheap to clone.
#[derive(Debug, Clone)]
pub struct TourneyApi {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    /// 2xx response whose envelope status was not "SUCCESS".
    Backend { url: String, message: String },
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Backend { url, message } => write!(f, "Backend rejected {url}: {message}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl TourneyApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            client: Client::builder()
                .user_agent("tmtui/0.1 (terminal tournament admin)")
                .build()
                .unwrap_or_default(),
            base_url,
            api_key: api_key.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn fetch_tournament(&self, tournament_id: &str) -> ApiResult<Tournament> {
        let url = format!("{}/tournaments/{tournament_id}", self.base_url);
        let raw: WireTournament = self.fetch(Method::GET, &url).await?;
        Ok(map_tournament(raw))
    }

    /// Matches for a tournament, optionally filtered by stage and status.
    pub async fn fetch_matches(
        &self,
        tournament_id: &str,
        stage: StageFilter,
        status: Option<MatchStatus>,
    ) -> ApiResult<Vec<Match>> {
        let mut url = format!("{}/tournaments/{tournament_id}/matches", self.base_url);
        push_query(&mut url, "stage", stage.as_query());
        push_query(&mut url, "status", status.map(|s| s.as_query()));
        let raw: Vec<WireMatch> = self.fetch(Method::GET, &url).await?;
        Ok(raw.into_iter().map(map_match).collect())
    }

    /// Standings for a tournament. The polymorphic payload (array of groups
    /// vs. one flat object) is resolved into the tagged variant here, once.
    pub async fn fetch_standings(
        &self,
        tournament_id: &str,
        stage: StageFilter,
    ) -> ApiResult<Standings> {
        let mut url = format!("{}/tournaments/{tournament_id}/standings", self.base_url);
        push_query(&mut url, "stage", stage.as_query());
        let raw: Option<WireStandingsPayload> = self.fetch_optional(Method::GET, &url).await?;
        Ok(map_standings(raw))
    }

    pub async fn fetch_teams(&self, tournament_id: &str) -> ApiResult<Vec<TournamentTeam>> {
        let url = format!("{}/tournaments/{tournament_id}/teams", self.base_url);
        let raw: Vec<WireTournamentTeam> = self.fetch(Method::GET, &url).await?;
        Ok(raw.into_iter().map(map_team).collect())
    }

    pub async fn fetch_groups(&self, tournament_id: &str) -> ApiResult<Vec<Group>> {
        let url = format!("{}/tournaments/{tournament_id}/groups", self.base_url);
        let raw: Vec<WireGroup> = self.fetch(Method::GET, &url).await?;
        Ok(raw.into_iter().map(map_group).collect())
    }

    pub async fn fetch_player_stats(&self, match_id: &str) -> ApiResult<Vec<PlayerPerformance>> {
        let url = format!("{}/matches/{match_id}/player-stats", self.base_url);
        let raw: Vec<WirePlayerStats> = self.fetch(Method::GET, &url).await?;
        Ok(raw.into_iter().map(map_player_stats).collect())
    }

    // -----------------------------------------------------------------------
    // Mutations — one backend write per operator action, never retried
    // -----------------------------------------------------------------------

    pub async fn promote_teams(
        &self,
        tournament_id: &str,
        target: Stage,
        team_ids: &[String],
    ) -> ApiResult<()> {
        let url = format!("{}/tournaments/{tournament_id}/promote-teams", self.base_url);
        self.command(Method::POST, &url, &PromoteTeamsBody { stage: target, team_ids })
            .await
    }

    pub async fn skip_stage(
        &self,
        tournament_id: &str,
        target: Stage,
        team_ids: &[String],
    ) -> ApiResult<()> {
        let url = format!("{}/tournaments/{tournament_id}/skip-stage", self.base_url);
        self.command(Method::POST, &url, &SkipStageBody { stage: target, team_ids })
            .await
    }

    pub async fn generate_knockout(
        &self,
        tournament_id: &str,
        stage: Stage,
        pairings: &[KnockoutPairing],
    ) -> ApiResult<()> {
        let url = format!(
            "{}/tournaments/{tournament_id}/generate-matches/knockout",
            self.base_url
        );
        self.command(Method::POST, &url, &GenerateKnockoutBody { stage, matches: pairings })
            .await
    }

    pub async fn end_tournament(
        &self,
        tournament_id: &str,
        winner_team_id: &str,
    ) -> ApiResult<()> {
        let url = format!("{}/tournaments/{tournament_id}/end", self.base_url);
        self.command(Method::POST, &url, &EndTournamentBody { winner_team_id })
            .await
    }

    pub async fn add_wildcard(&self, tournament_id: &str, name: &str) -> ApiResult<()> {
        let url = format!("{}/tournaments/{tournament_id}/wildcard", self.base_url);
        self.command(Method::POST, &url, &WildcardBody { name }).await
    }

    pub async fn create_manual_match(
        &self,
        tournament_id: &str,
        stage: Stage,
        home_team_id: &str,
        away_team_id: &str,
    ) -> ApiResult<()> {
        let url = format!("{}/tournaments/{tournament_id}/matches/manual", self.base_url);
        self.command(Method::POST, &url, &ManualMatchBody { stage, home_team_id, away_team_id })
            .await
    }

    pub async fn update_match(&self, match_id: &str, update: &MatchUpdate) -> ApiResult<()> {
        let url = format!("{}/matches/{match_id}", self.base_url);
        let body = MatchUpdateBody {
            home_score: update.home_score,
            away_score: update.away_score,
            status: update.status.map(|s| s.as_query()),
            date: update.kickoff.map(|d| d.to_rfc3339()),
            location: update.location.clone(),
        };
        self.command(Method::PUT, &url, &body).await
    }

    pub async fn delete_match(&self, match_id: &str) -> ApiResult<()> {
        let url = format!("{}/matches/{match_id}", self.base_url);
        let builder = self.request(Method::DELETE, &url);
        self.dispatch::<serde_json::Value>(builder, &url).await.map(|_| ())
    }

    pub async fn submit_player_stats(
        &self,
        match_id: &str,
        performance: &PlayerPerformance,
    ) -> ApiResult<()> {
        let url = format!("{}/matches/{match_id}/player-stats", self.base_url);
        self.command(Method::POST, &url, &performance_to_wire(performance)).await
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.timeout)
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
    ) -> ApiResult<T> {
        let builder = self.request(method, url);
        self.dispatch(builder, url)
            .await?
            .ok_or_else(|| ApiError::Other(format!("missing data in response from {url}")))
    }

    /// Like `fetch`, but an envelope with no `data` is fine (empty standings).
    async fn fetch_optional<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
    ) -> ApiResult<Option<T>> {
        let builder = self.request(method, url);
        self.dispatch(builder, url).await
    }

    async fn command<B: serde::Serialize>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> ApiResult<()> {
        let builder = self.request(method, url).json(body);
        self.dispatch::<serde_json::Value>(builder, url).await.map(|_| ())
    }

    async fn dispatch<T: serde::de::DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        url: &str,
    ) -> ApiResult<Option<T>> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;
        let response = response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.to_owned()))?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))?;
        if envelope.status != SUCCESS_STATUS {
            return Err(ApiError::Backend {
                url: url.to_owned(),
                message: envelope.message.unwrap_or(envelope.status),
            });
        }
        Ok(envelope.data)
    }
}

fn push_query(url: &mut String, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        let sep = if url.contains('?') { '&' } else { '?' };
        url.push(sep);
        url.push_str(key);
        url.push('=');
        url.push_str(value);
    }
}

// ---------------------------------------------------------------------------
// Mapping: platform wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_tournament(raw: WireTournament) -> Tournament {
    Tournament {
        id: raw.id.unwrap_or_default(),
        name: raw.name.unwrap_or_else(|| "Tournament".into()),
        stage: parse_stage(raw.stage.as_deref()),
        top_teams_advance: raw.config.and_then(|c| c.top_teams_advance).unwrap_or(8),
    }
}

fn map_match(raw: WireMatch) -> Match {
    Match {
        id: raw.id.unwrap_or_default(),
        home: raw.home_team.and_then(map_side),
        away: raw.away_team.and_then(map_side),
        home_score: raw.home_score,
        away_score: raw.away_score,
        status: parse_status(raw.status.as_deref().unwrap_or_default()),
        stage: parse_stage(raw.stage.as_deref()),
        group: raw.group,
        kickoff: raw.date.as_deref().and_then(parse_datetime),
        location: raw.location,
    }
}

fn map_side(raw: WireSide) -> Option<SideRef> {
    let team_id = raw.team_id?;
    Some(SideRef { name: raw.name.unwrap_or_else(|| team_id.clone()), team_id })
}

fn map_standings(raw: Option<WireStandingsPayload>) -> Standings {
    match raw {
        None => Standings::default(),
        Some(WireStandingsPayload::Grouped(groups)) => {
            Standings::Grouped(groups.into_iter().map(map_group_standing).collect())
        }
        Some(WireStandingsPayload::Flat(flat)) => Standings::Flat(
            flat.standings
                .unwrap_or_default()
                .into_iter()
                .map(map_row)
                .collect(),
        ),
    }
}

fn map_group_standing(raw: WireGroupStanding) -> GroupStanding {
    let group = raw.group.unwrap_or_default();
    let rows = raw
        .standings
        .unwrap_or_default()
        .into_iter()
        .map(|r| {
            let mut row = map_row(r);
            if row.group.is_none() {
                row.group = Some(group.clone());
            }
            row
        })
        .collect();
    GroupStanding { group, rows }
}

fn map_row(raw: WireStandingRow) -> StandingRow {
    StandingRow {
        team_id: raw.team_id.unwrap_or_default(),
        team_name: raw.team_name.unwrap_or_default(),
        played: raw.played.unwrap_or_default(),
        won: raw.won.unwrap_or_default(),
        drawn: raw.drawn.unwrap_or_default(),
        lost: raw.lost.unwrap_or_default(),
        goal_difference: raw.goal_difference.unwrap_or_default(),
        points: raw.points.unwrap_or_default(),
        position: raw.position.unwrap_or_default(),
        group: raw.group,
    }
}

fn map_team(raw: WireTournamentTeam) -> TournamentTeam {
    TournamentTeam {
        id: raw.id.unwrap_or_default(),
        team_id: raw.team_id.unwrap_or_default(),
        name: raw.name.unwrap_or_default(),
        image: raw.image,
        in_quarter_finals: raw.in_quarter_finals,
        in_semi_finals: raw.in_semi_finals,
        in_finals: raw.in_finals,
        approved: raw.approved,
    }
}

fn map_group(raw: WireGroup) -> Group {
    Group {
        id: raw.id.unwrap_or_default(),
        name: raw.name.unwrap_or_default(),
    }
}

fn map_player_stats(raw: WirePlayerStats) -> PlayerPerformance {
    PlayerPerformance {
        player_id: raw.player_id.unwrap_or_default(),
        player_name: raw.player_name.unwrap_or_default(),
        team_id: raw.team_id.unwrap_or_default(),
        stats: PerformanceStats {
            sacks: raw.sacks,
            safeties: raw.safeties,
            first_downs: raw.first_downs,
            interceptions: raw.interceptions,
            assists: raw.assists,
            extra_points_1: raw.extra_points_1,
            extra_points_2: raw.extra_points_2,
            returns: raw.returns,
            pick_sixes: raw.pick_sixes,
            touchdowns: raw.touchdowns,
        },
    }
}

fn performance_to_wire(p: &PlayerPerformance) -> WirePlayerStats {
    WirePlayerStats {
        player_id: Some(p.player_id.clone()),
        player_name: Some(p.player_name.clone()),
        team_id: Some(p.team_id.clone()),
        sacks: p.stats.sacks,
        safeties: p.stats.safeties,
        first_downs: p.stats.first_downs,
        interceptions: p.stats.interceptions,
        assists: p.stats.assists,
        extra_points_1: p.stats.extra_points_1,
        extra_points_2: p.stats.extra_points_2,
        returns: p.stats.returns,
        pick_sixes: p.stats.pick_sixes,
        touchdowns: p.stats.touchdowns,
    }
}

fn parse_stage(s: Option<&str>) -> Stage {
    s.and_then(Stage::from_query).unwrap_or_default()
}

fn parse_status(s: &str) -> MatchStatus {
    match s {
        "live" => MatchStatus::Live,
        "completed" => MatchStatus::Completed,
        "cancelled" => MatchStatus::Cancelled,
        _ => MatchStatus::Scheduled,
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("live"), MatchStatus::Live);
        assert_eq!(parse_status("completed"), MatchStatus::Completed);
        assert_eq!(parse_status("cancelled"), MatchStatus::Cancelled);
        assert_eq!(parse_status("scheduled"), MatchStatus::Scheduled);
        assert_eq!(parse_status("anything-else"), MatchStatus::Scheduled);
    }

    #[test]
    fn test_parse_stage() {
        assert_eq!(parse_stage(Some("quarter_final")), Stage::QuarterFinal);
        assert_eq!(parse_stage(Some("bogus")), Stage::RegularRound);
        assert_eq!(parse_stage(None), Stage::RegularRound);
    }

    #[test]
    fn query_assembly_uses_question_mark_then_ampersand() {
        let mut url = String::from("http://x/matches");
        push_query(&mut url, "stage", Some("final"));
        push_query(&mut url, "status", Some("live"));
        push_query(&mut url, "skip", None);
        assert_eq!(url, "http://x/matches?stage=final&status=live");
    }

    #[tokio::test]
    async fn fetch_tournament_sends_api_key_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tournaments/t1")
            .match_header("api_key", "secret")
            .with_status(200)
            .with_body(
                r#"{"status":"SUCCESS","data":{"id":"t1","name":"Spring Cup","stage":"semi_final","config":{"topTeamsAdvance":4}}}"#,
            )
            .create_async()
            .await;

        let api = TourneyApi::new(server.url(), "secret");
        let tournament = api.fetch_tournament("t1").await.expect("should fetch");
        mock.assert_async().await;
        assert_eq!(tournament.name, "Spring Cup");
        assert_eq!(tournament.stage, Stage::SemiFinal);
        assert_eq!(tournament.top_teams_advance, 4);
    }

    #[tokio::test]
    async fn non_success_envelope_surfaces_backend_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/tournaments/t1/end")
            .with_status(200)
            .with_body(r#"{"status":"ERROR","message":"tournament already ended"}"#)
            .create_async()
            .await;

        let api = TourneyApi::new(server.url(), "k");
        let err = api.end_tournament("t1", "team-9").await.unwrap_err();
        match err {
            ApiError::Backend { message, .. } => {
                assert_eq!(message, "tournament already ended");
            }
            other => panic!("expected Backend error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn grouped_standings_payload_resolves_to_grouped_variant() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/tournaments/t1/standings")
            .with_status(200)
            .with_body(
                r#"{"status":"SUCCESS","data":[
                    {"group":"A","standings":[{"teamId":"a1","teamName":"Alpha","points":9,"goalDifference":5,"position":1}]},
                    {"group":"B","standings":[{"teamId":"b1","teamName":"Beta","points":7,"goalDifference":2,"position":1}]}
                ]}"#,
            )
            .create_async()
            .await;

        let api = TourneyApi::new(server.url(), "k");
        let standings = api
            .fetch_standings("t1", StageFilter::All)
            .await
            .expect("should fetch");
        assert_eq!(standings.groups().len(), 2);
        let rows = standings.flattened();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].team_name, "Alpha");
        assert_eq!(rows[0].group.as_deref(), Some("A"), "group backfilled onto rows");
    }

    #[tokio::test]
    async fn flat_standings_payload_resolves_to_flat_variant() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/tournaments/t1/standings?stage=final")
            .with_status(200)
            .with_body(
                r#"{"status":"SUCCESS","data":{"standings":[
                    {"teamId":"a1","teamName":"Alpha","points":3,"position":1},
                    {"teamId":"b1","teamName":"Beta","points":0,"position":2}
                ]}}"#,
            )
            .create_async()
            .await;

        let api = TourneyApi::new(server.url(), "k");
        let standings = api
            .fetch_standings("t1", StageFilter::Only(Stage::Final))
            .await
            .expect("should fetch");
        assert!(standings.groups().is_empty());
        assert_eq!(standings.flattened().len(), 2);
    }

    #[tokio::test]
    async fn missing_standings_data_maps_to_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/tournaments/t1/standings")
            .with_status(200)
            .with_body(r#"{"status":"SUCCESS","data":null}"#)
            .create_async()
            .await;

        let api = TourneyApi::new(server.url(), "k");
        let standings = api
            .fetch_standings("t1", StageFilter::All)
            .await
            .expect("empty standings are not an error");
        assert!(standings.is_empty());
    }

    #[tokio::test]
    async fn fetch_matches_passes_stage_and_status_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tournaments/t1/matches?stage=quarter_final&status=live")
            .with_status(200)
            .with_body(
                r#"{"status":"SUCCESS","data":[{
                    "id":"m1",
                    "homeTeam":{"teamId":"a1","name":"Alpha"},
                    "awayTeam":{"teamId":"b1","name":"Beta"},
                    "homeScore":2,"awayScore":1,
                    "status":"live","stage":"quarter_final",
                    "date":"2026-05-02T18:30:00Z","location":"Field 2"
                }]}"#,
            )
            .create_async()
            .await;

        let api = TourneyApi::new(server.url(), "k");
        let matches = api
            .fetch_matches(
                "t1",
                StageFilter::Only(Stage::QuarterFinal),
                Some(MatchStatus::Live),
            )
            .await
            .expect("should fetch");
        mock.assert_async().await;
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert!(m.is_live());
        assert_eq!(m.score(), Some((2, 1)));
        assert_eq!(m.home.as_ref().map(|s| s.name.as_str()), Some("Alpha"));
        assert!(m.kickoff.is_some());
    }

    #[tokio::test]
    async fn fetch_groups_maps_ids_and_names() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/tournaments/t1/groups")
            .with_status(200)
            .with_body(
                r#"{"status":"SUCCESS","data":[{"id":"g1","name":"A"},{"id":"g2","name":"B"}]}"#,
            )
            .create_async()
            .await;

        let api = TourneyApi::new(server.url(), "k");
        let groups = api.fetch_groups("t1").await.expect("should fetch");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].name, "B");
    }

    #[tokio::test]
    async fn delete_match_accepts_envelope_without_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/matches/m7")
            .match_header("api_key", "k")
            .with_status(200)
            .with_body(r#"{"status":"SUCCESS"}"#)
            .create_async()
            .await;

        let api = TourneyApi::new(server.url(), "k");
        api.delete_match("m7").await.expect("delete should succeed");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/tournaments/t1/teams")
            .with_status(500)
            .create_async()
            .await;

        let api = TourneyApi::new(server.url(), "k");
        let err = api.fetch_teams("t1").await.unwrap_err();
        assert!(matches!(err, ApiError::Api(..)), "5xx must surface, got: {err}");
    }
}
