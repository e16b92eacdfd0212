pub mod client;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of the platform wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub stage: Stage,
    /// How many teams advance out of the group stage (platform config).
    pub top_teams_advance: u32,
}

/// One phase of the tournament, mirroring the backend stage enum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    RegularRound,
    QuarterFinal,
    SemiFinal,
    Final,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::RegularRound => "Group Stage",
            Stage::QuarterFinal => "Quarter-final",
            Stage::SemiFinal => "Semi-final",
            Stage::Final => "Final",
        }
    }

    /// Query-string token used by the matches/standings endpoints.
    pub fn as_query(&self) -> &'static str {
        match self {
            Stage::RegularRound => "regular_round",
            Stage::QuarterFinal => "quarter_final",
            Stage::SemiFinal => "semi_final",
            Stage::Final => "final",
        }
    }

    pub fn from_query(s: &str) -> Option<Self> {
        match s {
            "regular_round" => Some(Stage::RegularRound),
            "quarter_final" => Some(Stage::QuarterFinal),
            "semi_final" => Some(Stage::SemiFinal),
            "final" => Some(Stage::Final),
            _ => None,
        }
    }

    pub fn is_knockout(&self) -> bool {
        !matches!(self, Stage::RegularRound)
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            Stage::RegularRound => None,
            Stage::QuarterFinal => Some(Stage::RegularRound),
            Stage::SemiFinal => Some(Stage::QuarterFinal),
            Stage::Final => Some(Stage::SemiFinal),
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Stage::RegularRound => Some(Stage::QuarterFinal),
            Stage::QuarterFinal => Some(Stage::SemiFinal),
            Stage::SemiFinal => Some(Stage::Final),
            Stage::Final => None,
        }
    }

    /// Bracket slots a knockout stage holds (teams, not matches).
    pub fn bracket_size(&self) -> usize {
        match self {
            Stage::RegularRound => 0,
            Stage::QuarterFinal => 8,
            Stage::SemiFinal => 4,
            Stage::Final => 2,
        }
    }
}

/// Stage selection in the UI: the backend stages plus an aggregate view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StageFilter {
    #[default]
    All,
    Only(Stage),
}

impl StageFilter {
    pub fn label(&self) -> &'static str {
        match self {
            StageFilter::All => "All Stages",
            StageFilter::Only(stage) => stage.label(),
        }
    }

    /// `None` means the fetch is unfiltered.
    pub fn as_query(&self) -> Option<&'static str> {
        match self {
            StageFilter::All => None,
            StageFilter::Only(stage) => Some(stage.as_query()),
        }
    }

    /// The knockout stage this filter points at, if any.
    pub fn knockout_stage(&self) -> Option<Stage> {
        match self {
            StageFilter::Only(stage) if stage.is_knockout() => Some(*stage),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            StageFilter::All => StageFilter::Only(Stage::RegularRound),
            StageFilter::Only(stage) => {
                stage.next().map(StageFilter::Only).unwrap_or(StageFilter::All)
            }
        }
    }

    pub fn prev(self) -> Self {
        match self {
            StageFilter::All => StageFilter::Only(Stage::Final),
            StageFilter::Only(stage) => {
                stage.prev().map(StageFilter::Only).unwrap_or(StageFilter::All)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Match {
    pub id: String,
    pub home: Option<SideRef>,
    pub away: Option<SideRef>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: MatchStatus,
    pub stage: Stage,
    pub group: Option<String>,
    pub kickoff: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

impl Match {
    pub fn is_live(&self) -> bool {
        self.status == MatchStatus::Live
    }

    /// Both scores, when recorded.
    pub fn score(&self) -> Option<(u32, u32)> {
        self.home_score.zip(self.away_score)
    }

    /// The side ahead on a completed match. `None` for a draw, missing
    /// scores, or an unfinished match.
    pub fn completed_leader(&self) -> Option<&SideRef> {
        if self.status != MatchStatus::Completed {
            return None;
        }
        let (home, away) = self.score()?;
        if home > away {
            self.home.as_ref()
        } else if away > home {
            self.away.as_ref()
        } else {
            None
        }
    }
}

/// One side of a match: the participating tournament-team reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideRef {
    pub team_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "SCH",
            MatchStatus::Live => "LIVE",
            MatchStatus::Completed => "FT",
            MatchStatus::Cancelled => "CAN",
        }
    }

    pub fn as_query(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        }
    }

    /// Cycle order used by the score editor.
    pub fn cycle(self) -> Self {
        match self {
            MatchStatus::Scheduled => MatchStatus::Live,
            MatchStatus::Live => MatchStatus::Completed,
            MatchStatus::Completed => MatchStatus::Cancelled,
            MatchStatus::Cancelled => MatchStatus::Scheduled,
        }
    }
}

/// Fields an operator can change on a match. `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct MatchUpdate {
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: Option<MatchStatus>,
    pub kickoff: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

/// A team's participation record within one tournament.
#[derive(Debug, Clone, Default)]
pub struct TournamentTeam {
    pub id: String,
    pub team_id: String,
    pub name: String,
    pub image: Option<String>,
    pub in_quarter_finals: bool,
    pub in_semi_finals: bool,
    pub in_finals: bool,
    pub approved: bool,
}

impl TournamentTeam {
    /// Whether the progression flags mark this team as part of the given stage.
    pub fn qualified_for(&self, stage: Stage) -> bool {
        match stage {
            Stage::RegularRound => self.approved,
            Stage::QuarterFinal => self.in_quarter_finals,
            Stage::SemiFinal => self.in_semi_finals,
            Stage::Final => self.in_finals,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Group {
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Standings — tagged variant, resolved once at the fetch boundary
// ---------------------------------------------------------------------------

/// The backend returns either per-group standings or one flat ranked table.
/// The shape is decided once when the payload is mapped; render code only
/// ever sees this variant.
#[derive(Debug, Clone)]
pub enum Standings {
    Grouped(Vec<GroupStanding>),
    Flat(Vec<StandingRow>),
}

impl Default for Standings {
    fn default() -> Self {
        Standings::Flat(Vec::new())
    }
}

impl Standings {
    /// One ordered row sequence. Grouped input is concatenated and re-ranked
    /// by points (desc), goal difference (desc). Flat input is already ranked
    /// by the backend and passes through untouched. Empty input flattens to
    /// an empty sequence; never an error.
    pub fn flattened(&self) -> Vec<StandingRow> {
        match self {
            Standings::Flat(rows) => rows.clone(),
            Standings::Grouped(groups) => {
                let mut rows: Vec<StandingRow> =
                    groups.iter().flat_map(|g| g.rows.iter().cloned()).collect();
                rows.sort_by(|a, b| {
                    b.points
                        .cmp(&a.points)
                        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
                });
                rows
            }
        }
    }

    /// The per-group breakdown, kept for grouped display. Empty for flat input.
    pub fn groups(&self) -> &[GroupStanding] {
        match self {
            Standings::Grouped(groups) => groups,
            Standings::Flat(_) => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Standings::Grouped(groups) => groups.iter().all(|g| g.rows.is_empty()),
            Standings::Flat(rows) => rows.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupStanding {
    pub group: String,
    pub rows: Vec<StandingRow>,
}

#[derive(Debug, Clone, Default)]
pub struct StandingRow {
    pub team_id: String,
    pub team_name: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goal_difference: i32,
    pub points: u32,
    pub position: u32,
    pub group: Option<String>,
}

// ---------------------------------------------------------------------------
// Player performance — per match-edit session, persisted only on save
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct PlayerPerformance {
    pub player_id: String,
    pub player_name: String,
    pub team_id: String,
    pub stats: PerformanceStats,
}

/// The ten per-player counters the platform tracks. Counters absent from the
/// wire default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceStats {
    pub sacks: u32,
    pub safeties: u32,
    pub first_downs: u32,
    pub interceptions: u32,
    pub assists: u32,
    pub extra_points_1: u32,
    pub extra_points_2: u32,
    pub returns: u32,
    pub pick_sixes: u32,
    pub touchdowns: u32,
}

/// Category point totals shown live while an operator edits stats. The
/// authoritative totals are recomputed server-side on save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerPoints {
    pub rusher: u32,
    pub attacker: u32,
    pub defence: u32,
    pub qb: u32,
    pub total: u32,
}

impl PerformanceStats {
    /// Fixed weighted sums per display category. `first_downs` and
    /// `extra_points_1` count toward both attacker and qb — that matches the
    /// backend's per-role display and must not be deduplicated.
    pub fn points(&self) -> PlayerPoints {
        let rusher = 6 * self.returns;
        let attacker = 2 * self.extra_points_1 + self.first_downs + 6 * self.touchdowns;
        let defence =
            self.sacks + 2 * self.safeties + 3 * self.interceptions + 6 * self.pick_sixes;
        let qb = self.first_downs
            + 3 * self.assists
            + 2 * self.extra_points_1
            + 2 * self.extra_points_2;
        PlayerPoints {
            rusher,
            attacker,
            defence,
            qb,
            total: rusher + attacker + defence + qb,
        }
    }
}

/// One proposed knockout match: home and away tournament-team ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnockoutPairing {
    #[serde(rename = "homeTeamId")]
    pub home_team_id: String,
    #[serde(rename = "awayTeamId")]
    pub away_team_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(team: &str, points: u32, gd: i32) -> StandingRow {
        StandingRow {
            team_id: team.to_lowercase(),
            team_name: team.to_owned(),
            points,
            goal_difference: gd,
            ..Default::default()
        }
    }

    #[test]
    fn grouped_standings_flatten_to_sum_of_group_lengths() {
        let standings = Standings::Grouped(vec![
            GroupStanding { group: "A".into(), rows: vec![row("Alpha", 9, 5), row("Beta", 4, -1)] },
            GroupStanding { group: "B".into(), rows: vec![row("Gamma", 7, 2)] },
        ]);
        assert_eq!(standings.flattened().len(), 3);
        assert_eq!(standings.groups().len(), 2);
    }

    #[test]
    fn flattened_grouped_rows_sort_by_points_then_goal_difference() {
        let standings = Standings::Grouped(vec![
            GroupStanding { group: "A".into(), rows: vec![row("Low", 3, 8), row("Tied2", 6, 1)] },
            GroupStanding { group: "B".into(), rows: vec![row("Top", 9, 0), row("Tied1", 6, 4)] },
        ]);
        let names: Vec<String> =
            standings.flattened().into_iter().map(|r| r.team_name).collect();
        assert_eq!(names, vec!["Top", "Tied1", "Tied2", "Low"]);
    }

    #[test]
    fn flat_standings_pass_through_in_backend_order() {
        // Backend ranking wins even when it disagrees with a points sort.
        let standings = Standings::Flat(vec![row("Second", 4, 0), row("First", 9, 3)]);
        let names: Vec<String> =
            standings.flattened().into_iter().map(|r| r.team_name).collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[test]
    fn empty_standings_flatten_to_empty() {
        assert!(Standings::default().flattened().is_empty());
        assert!(Standings::Grouped(vec![]).flattened().is_empty());
        assert!(Standings::Grouped(vec![]).is_empty());
    }

    #[test]
    fn points_worked_scenario() {
        let stats = PerformanceStats {
            touchdowns: 2,
            first_downs: 3,
            extra_points_1: 1,
            ..Default::default()
        };
        let points = stats.points();
        assert_eq!(points.rusher, 0);
        assert_eq!(points.attacker, 17);
        assert_eq!(points.defence, 0);
        assert_eq!(points.qb, 5);
        assert_eq!(points.total, 22);
    }

    #[test]
    fn points_total_is_sum_of_categories() {
        let stats = PerformanceStats {
            sacks: 1,
            safeties: 2,
            first_downs: 3,
            interceptions: 1,
            assists: 2,
            extra_points_1: 1,
            extra_points_2: 1,
            returns: 2,
            pick_sixes: 1,
            touchdowns: 4,
        };
        let p = stats.points();
        assert_eq!(p.total, p.rusher + p.attacker + p.defence + p.qb);
    }

    #[test]
    fn zero_counters_give_zero_points() {
        assert_eq!(PerformanceStats::default().points(), PlayerPoints::default());
    }

    #[test]
    fn stage_navigation_and_query_round_trip() {
        assert_eq!(Stage::RegularRound.next(), Some(Stage::QuarterFinal));
        assert_eq!(Stage::Final.next(), None);
        assert_eq!(Stage::RegularRound.prev(), None);
        assert!(Stage::QuarterFinal.is_knockout());
        assert!(!Stage::RegularRound.is_knockout());
        for stage in [Stage::RegularRound, Stage::QuarterFinal, Stage::SemiFinal, Stage::Final] {
            assert_eq!(Stage::from_query(stage.as_query()), Some(stage));
        }
    }

    #[test]
    fn stage_filter_cycles_through_all_states() {
        let mut filter = StageFilter::All;
        for _ in 0..5 {
            filter = filter.next();
        }
        assert_eq!(filter, StageFilter::All);
        assert_eq!(StageFilter::All.prev(), StageFilter::Only(Stage::Final));
        assert_eq!(StageFilter::Only(Stage::RegularRound).knockout_stage(), None);
        assert_eq!(
            StageFilter::Only(Stage::SemiFinal).knockout_stage(),
            Some(Stage::SemiFinal)
        );
    }

    #[test]
    fn qualified_for_reads_progression_flags() {
        let team = TournamentTeam {
            approved: true,
            in_quarter_finals: true,
            in_semi_finals: false,
            ..Default::default()
        };
        assert!(team.qualified_for(Stage::RegularRound));
        assert!(team.qualified_for(Stage::QuarterFinal));
        assert!(!team.qualified_for(Stage::SemiFinal));
    }

    #[test]
    fn completed_leader_requires_completed_status_and_distinct_scores() {
        let mut m = Match {
            home: Some(SideRef { team_id: "h".into(), name: "Home".into() }),
            away: Some(SideRef { team_id: "a".into(), name: "Away".into() }),
            home_score: Some(3),
            away_score: Some(1),
            status: MatchStatus::Live,
            ..Default::default()
        };
        assert!(m.completed_leader().is_none(), "live match has no settled leader");
        m.status = MatchStatus::Completed;
        assert_eq!(m.completed_leader().map(|s| s.team_id.as_str()), Some("h"));
        m.away_score = Some(3);
        assert!(m.completed_leader().is_none(), "draw has no leader");
    }
}
