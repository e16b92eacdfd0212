use crate::state::fixtures::{FixtureProposal, TeamChoice};
use tourney_api::{
    Match, MatchStatus, MatchUpdate, PerformanceStats, PlayerPerformance, Stage,
};

/// The single modal host. Every operator action gets one variant carrying its
/// own small state; exactly one can be open at a time.
#[derive(Debug, Default)]
pub enum ActiveModal {
    #[default]
    None,
    Promote(PromoteState),
    Skip(SkipState),
    GenerateFixtures(FixtureProposal),
    EndTournament(EndTournamentState),
    ScoreEntry(ScoreEntryState),
    Wildcard(WildcardState),
    ManualMatch(ManualMatchState),
    ConfirmDelete(ConfirmDeleteState),
}

impl ActiveModal {
    pub fn is_open(&self) -> bool {
        !matches!(self, ActiveModal::None)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ActiveModal::None => "",
            ActiveModal::Promote(_) => " Promote Teams ",
            ActiveModal::Skip(_) => " Skip Stage ",
            ActiveModal::GenerateFixtures(_) => " Generate Fixtures ",
            ActiveModal::EndTournament(_) => " End Tournament ",
            ActiveModal::ScoreEntry(_) => " Update Match ",
            ActiveModal::Wildcard(_) => " Add Wildcard Team ",
            ActiveModal::ManualMatch(_) => " Create Match ",
            ActiveModal::ConfirmDelete(_) => " Delete Match ",
        }
    }
}

// ---------------------------------------------------------------------------
// Promotion — advance a subset of teams to the target stage
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct PromoteState {
    pub target: Stage,
    pub candidates: Vec<TeamChoice>,
    pub selected: Vec<bool>,
    pub required: usize,
    pub cursor: usize,
}

impl PromoteState {
    /// Candidates arrive in standings order; the top `required` rows start
    /// selected so the default confirms the table as it stands.
    pub fn new(target: Stage, candidates: Vec<TeamChoice>, required: usize) -> Self {
        let selected = (0..candidates.len()).map(|i| i < required).collect();
        Self { target, candidates, selected, required, cursor: 0 }
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.candidates.len() {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn toggle(&mut self) {
        if let Some(flag) = self.selected.get_mut(self.cursor) {
            *flag = !*flag;
        }
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|s| **s).count()
    }

    /// Exactly `required` teams must be picked before the request is built.
    pub fn validate(&self) -> Result<Vec<String>, String> {
        let count = self.selected_count();
        if count != self.required {
            return Err(format!(
                "select exactly {} teams for the {} ({count} selected)",
                self.required,
                self.target.label()
            ));
        }
        Ok(self
            .candidates
            .iter()
            .zip(&self.selected)
            .filter(|(_, sel)| **sel)
            .map(|(team, _)| team.id.clone())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Stage skip — pair a later stage's bracket directly
// ---------------------------------------------------------------------------

/// Skipping reuses the fixture proposal so the disjointness check guards this
/// flow too; only the submitted payload differs (teams, not matches).
#[derive(Debug)]
pub struct SkipState {
    pub target: Stage,
    pub proposal: FixtureProposal,
}

// ---------------------------------------------------------------------------
// End tournament — champion must be one of the two finalists
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct EndTournamentState {
    pub finalists: [TeamChoice; 2],
    /// Index of the side ahead on a completed final, if any.
    pub suggested: Option<usize>,
    pub selected: usize,
    /// Set when the operator picks against the suggestion. Non-blocking.
    pub override_warning: bool,
}

impl EndTournamentState {
    pub fn from_final_match(m: &Match) -> Result<Self, String> {
        let home = m.home.as_ref().ok_or("the final has no home team yet")?;
        let away = m.away.as_ref().ok_or("the final has no away team yet")?;
        let finalists = [
            TeamChoice { id: home.team_id.clone(), name: home.name.clone() },
            TeamChoice { id: away.team_id.clone(), name: away.name.clone() },
        ];
        let suggested = m.completed_leader().map(|leader| {
            if leader.team_id == finalists[0].id { 0 } else { 1 }
        });
        Ok(Self {
            finalists,
            suggested,
            selected: suggested.unwrap_or(0),
            override_warning: false,
        })
    }

    pub fn select(&mut self, idx: usize) {
        self.selected = idx.min(1);
        self.override_warning = matches!(self.suggested, Some(s) if s != self.selected);
    }

    pub fn toggle(&mut self) {
        self.select(1 - self.selected);
    }

    pub fn champion(&self) -> &TeamChoice {
        &self.finalists[self.selected]
    }
}

// ---------------------------------------------------------------------------
// Score entry — match result, schedule, and per-player counters
// ---------------------------------------------------------------------------

pub const COUNTER_LABELS: [&str; 10] = [
    "Sck", "Sfy", "FD", "Int", "Ast", "XP1", "XP2", "Ret", "P6", "TD",
];

/// Linear field cursor: scores, status, and schedule first, then one cell per
/// player counter in row-major order.
const FIXED_FIELDS: usize = 5;

pub const KICKOFF_FIELD: usize = 3;
pub const LOCATION_FIELD: usize = 4;
const KICKOFF_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Which text field the operator is currently typing into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTarget {
    Kickoff,
    Location,
}

#[derive(Debug)]
pub struct ScoreEntryState {
    pub match_id: String,
    pub home_name: String,
    pub away_name: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub home_score: u32,
    pub away_score: u32,
    pub status: MatchStatus,
    /// "YYYY-MM-DD HH:MM" (UTC). Empty or unparseable leaves the schedule alone.
    pub kickoff_input: String,
    pub location: String,
    pub players: Vec<PlayerPerformance>,
    pub cursor: usize,
    /// `Some` while the operator is typing a new player row's name.
    pub name_input: Option<String>,
    pub text_edit: Option<TextTarget>,
    pub stats_loaded: bool,
}

impl ScoreEntryState {
    pub fn from_match(m: &Match) -> Self {
        Self {
            match_id: m.id.clone(),
            home_name: m.home.as_ref().map(|s| s.name.clone()).unwrap_or_else(|| "TBD".into()),
            away_name: m.away.as_ref().map(|s| s.name.clone()).unwrap_or_else(|| "TBD".into()),
            home_team_id: m.home.as_ref().map(|s| s.team_id.clone()).unwrap_or_default(),
            away_team_id: m.away.as_ref().map(|s| s.team_id.clone()).unwrap_or_default(),
            home_score: m.home_score.unwrap_or_default(),
            away_score: m.away_score.unwrap_or_default(),
            status: m.status,
            kickoff_input: m
                .kickoff
                .map(|t| t.format(KICKOFF_FORMAT).to_string())
                .unwrap_or_default(),
            location: m.location.clone().unwrap_or_default(),
            players: Vec::new(),
            cursor: 0,
            name_input: None,
            text_edit: None,
            stats_loaded: false,
        }
    }

    /// Existing per-player stats arriving from the backend. Rows the operator
    /// already added in this session stay on top of the fetched ones.
    pub fn merge_fetched(&mut self, fetched: Vec<PlayerPerformance>) {
        let fresh: Vec<PlayerPerformance> = fetched
            .into_iter()
            .filter(|f| !self.players.iter().any(|p| p.player_id == f.player_id))
            .collect();
        self.players.extend(fresh);
        self.stats_loaded = true;
    }

    pub fn field_count(&self) -> usize {
        FIXED_FIELDS + self.players.len() * COUNTER_LABELS.len()
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.field_count() {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// The player row and counter the cursor is on, if past the fixed fields.
    pub fn counter_position(&self) -> Option<(usize, usize)> {
        let idx = self.cursor.checked_sub(FIXED_FIELDS)?;
        let row = idx / COUNTER_LABELS.len();
        (row < self.players.len()).then_some((row, idx % COUNTER_LABELS.len()))
    }

    /// Increment (`+1`) or decrement (`-1`) the field under the cursor.
    /// On the status field any adjustment cycles the status; the schedule
    /// fields are text and only change through `begin_text_edit`.
    pub fn adjust(&mut self, delta: i64) {
        match self.cursor {
            0 => self.home_score = bump(self.home_score, delta),
            1 => self.away_score = bump(self.away_score, delta),
            2 => self.status = self.status.cycle(),
            KICKOFF_FIELD | LOCATION_FIELD => {}
            _ => {
                if let Some((row, counter)) = self.counter_position() {
                    let cell = counter_mut(&mut self.players[row].stats, counter);
                    *cell = bump(*cell, delta);
                }
            }
        }
    }

    /// Start typing into the schedule field under the cursor, if any.
    pub fn begin_text_edit(&mut self) {
        self.text_edit = match self.cursor {
            KICKOFF_FIELD => Some(TextTarget::Kickoff),
            LOCATION_FIELD => Some(TextTarget::Location),
            _ => None,
        };
    }

    pub fn end_text_edit(&mut self) {
        self.text_edit = None;
    }

    pub fn text_push(&mut self, c: char) {
        match self.text_edit {
            Some(TextTarget::Kickoff) => self.kickoff_input.push(c),
            Some(TextTarget::Location) => self.location.push(c),
            None => {}
        }
    }

    pub fn text_pop(&mut self) {
        match self.text_edit {
            Some(TextTarget::Kickoff) => {
                self.kickoff_input.pop();
            }
            Some(TextTarget::Location) => {
                self.location.pop();
            }
            None => {}
        }
    }

    /// The typed kickoff, when it parses. Empty or malformed input leaves the
    /// schedule untouched on save.
    pub fn parsed_kickoff(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let input = self.kickoff_input.trim();
        if input.is_empty() {
            return None;
        }
        chrono::NaiveDateTime::parse_from_str(input, KICKOFF_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn begin_add_player(&mut self) {
        self.name_input = Some(String::new());
    }

    pub fn cancel_add_player(&mut self) {
        self.name_input = None;
    }

    /// Commit the typed name as a new performance row on the given side.
    /// The id is operator-scoped; the backend assigns the durable one on save.
    pub fn commit_add_player(&mut self, home_side: bool) {
        let Some(name) = self.name_input.take() else { return };
        let name = name.trim().to_owned();
        if name.is_empty() {
            return;
        }
        let team_id =
            if home_side { self.home_team_id.clone() } else { self.away_team_id.clone() };
        let player_id = format!("new-{}-{}", team_id, self.players.len());
        self.players.push(PlayerPerformance {
            player_id,
            player_name: name,
            team_id,
            stats: PerformanceStats::default(),
        });
        // Jump the cursor to the new row's first counter.
        self.cursor = FIXED_FIELDS + (self.players.len() - 1) * COUNTER_LABELS.len();
    }

    pub fn update(&self) -> MatchUpdate {
        MatchUpdate {
            home_score: Some(self.home_score),
            away_score: Some(self.away_score),
            status: Some(self.status),
            kickoff: self.parsed_kickoff(),
            location: (!self.location.is_empty()).then(|| self.location.clone()),
        }
    }
}

fn bump(value: u32, delta: i64) -> u32 {
    (value as i64 + delta).clamp(0, u32::MAX as i64) as u32
}

pub fn counter_mut(stats: &mut PerformanceStats, idx: usize) -> &mut u32 {
    match idx {
        0 => &mut stats.sacks,
        1 => &mut stats.safeties,
        2 => &mut stats.first_downs,
        3 => &mut stats.interceptions,
        4 => &mut stats.assists,
        5 => &mut stats.extra_points_1,
        6 => &mut stats.extra_points_2,
        7 => &mut stats.returns,
        8 => &mut stats.pick_sixes,
        _ => &mut stats.touchdowns,
    }
}

pub fn counter_value(stats: &PerformanceStats, idx: usize) -> u32 {
    match idx {
        0 => stats.sacks,
        1 => stats.safeties,
        2 => stats.first_downs,
        3 => stats.interceptions,
        4 => stats.assists,
        5 => stats.extra_points_1,
        6 => stats.extra_points_2,
        7 => stats.returns,
        8 => stats.pick_sixes,
        _ => stats.touchdowns,
    }
}

// ---------------------------------------------------------------------------
// Small input modals
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct WildcardState {
    pub name: String,
}

impl WildcardState {
    pub fn validate(&self) -> Result<&str, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("enter a team name first".into());
        }
        Ok(name)
    }
}

#[derive(Debug)]
pub struct ManualMatchState {
    pub stage: Stage,
    pub candidates: Vec<TeamChoice>,
    pub home_idx: usize,
    pub away_idx: usize,
    /// 0 = editing home side, 1 = editing away side.
    pub cursor: usize,
}

impl ManualMatchState {
    pub fn new(stage: Stage, candidates: Vec<TeamChoice>) -> Self {
        let away_idx = if candidates.len() > 1 { 1 } else { 0 };
        Self { stage, candidates, home_idx: 0, away_idx, cursor: 0 }
    }

    pub fn cycle(&mut self, delta: isize) {
        let len = self.candidates.len() as isize;
        if len == 0 {
            return;
        }
        let cell = if self.cursor == 0 { &mut self.home_idx } else { &mut self.away_idx };
        *cell = ((*cell as isize + delta).rem_euclid(len)) as usize;
    }

    pub fn validate(&self) -> Result<(&TeamChoice, &TeamChoice), String> {
        let home = self.candidates.get(self.home_idx).ok_or("pick a home team")?;
        let away = self.candidates.get(self.away_idx).ok_or("pick an away team")?;
        if home.id == away.id {
            return Err("a team cannot play itself".into());
        }
        Ok((home, away))
    }
}

#[derive(Debug)]
pub struct ConfirmDeleteState {
    pub match_id: String,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourney_api::SideRef;

    fn final_match(home_score: u32, away_score: u32, status: MatchStatus) -> Match {
        Match {
            id: "f1".into(),
            home: Some(SideRef { team_id: "h".into(), name: "Harriers".into() }),
            away: Some(SideRef { team_id: "a".into(), name: "Aces".into() }),
            home_score: Some(home_score),
            away_score: Some(away_score),
            status,
            stage: Stage::Final,
            ..Default::default()
        }
    }

    #[test]
    fn completed_final_suggests_the_higher_scoring_side() {
        let state =
            EndTournamentState::from_final_match(&final_match(3, 1, MatchStatus::Completed))
                .unwrap();
        assert_eq!(state.suggested, Some(0));
        assert_eq!(state.selected, 0);
        assert_eq!(state.champion().name, "Harriers");
        assert!(!state.override_warning);
    }

    #[test]
    fn overriding_the_suggestion_warns_but_still_confirms() {
        let mut state =
            EndTournamentState::from_final_match(&final_match(3, 1, MatchStatus::Completed))
                .unwrap();
        state.select(1);
        assert!(state.override_warning);
        assert_eq!(state.champion().id, "a", "confirmation still uses the manual pick");
        state.select(0);
        assert!(!state.override_warning, "returning to the suggestion clears the warning");
    }

    #[test]
    fn unfinished_final_has_no_suggestion_and_never_warns() {
        let mut state =
            EndTournamentState::from_final_match(&final_match(3, 1, MatchStatus::Live)).unwrap();
        assert_eq!(state.suggested, None);
        state.toggle();
        assert!(!state.override_warning);
    }

    #[test]
    fn final_without_both_teams_cannot_open_the_modal() {
        let mut m = final_match(0, 0, MatchStatus::Scheduled);
        m.away = None;
        assert!(EndTournamentState::from_final_match(&m).is_err());
    }

    fn choices(n: usize) -> Vec<TeamChoice> {
        (1..=n)
            .map(|i| TeamChoice { id: format!("t{i}"), name: format!("Team {i}") })
            .collect()
    }

    #[test]
    fn promotion_preselects_the_top_required_rows() {
        let state = PromoteState::new(Stage::SemiFinal, choices(8), 4);
        assert_eq!(state.selected_count(), 4);
        let ids = state.validate().unwrap();
        assert_eq!(ids, vec!["t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn promotion_count_mismatch_blocks_confirmation() {
        let mut state = PromoteState::new(Stage::SemiFinal, choices(8), 4);
        state.cursor = 0;
        state.toggle(); // deselect the top seed, leaving 3 of 4 picked
        let err = state.validate().unwrap_err();
        assert!(err.contains("exactly 4"), "got: {err}");
    }

    #[test]
    fn score_editor_adjusts_counters_and_recomputes_points() {
        let mut state = ScoreEntryState::from_match(&final_match(0, 0, MatchStatus::Live));
        state.begin_add_player();
        state.name_input.as_mut().unwrap().push_str("R. Vance");
        state.commit_add_player(true);
        assert_eq!(state.players.len(), 1);
        assert_eq!(state.players[0].team_id, "h");

        // Cursor landed on the new row's first counter; move to touchdowns.
        for _ in 0..9 {
            state.cursor_down();
        }
        state.adjust(2);
        assert_eq!(state.players[0].stats.touchdowns, 2);
        assert_eq!(state.players[0].stats.points().attacker, 12);
        state.adjust(-5);
        assert_eq!(state.players[0].stats.touchdowns, 0, "counters saturate at zero");
    }

    #[test]
    fn score_editor_status_field_cycles() {
        let mut state = ScoreEntryState::from_match(&final_match(0, 0, MatchStatus::Scheduled));
        state.cursor = 2;
        state.adjust(1);
        assert_eq!(state.status, MatchStatus::Live);
    }

    #[test]
    fn score_editor_schedule_fields_carry_on_the_update() {
        let mut state = ScoreEntryState::from_match(&final_match(0, 0, MatchStatus::Scheduled));
        state.cursor = KICKOFF_FIELD;
        state.begin_text_edit();
        for c in "2026-05-02 18:30".chars() {
            state.text_push(c);
        }
        state.end_text_edit();
        state.cursor = LOCATION_FIELD;
        state.begin_text_edit();
        for c in "Field 2".chars() {
            state.text_push(c);
        }
        state.end_text_edit();

        let update = state.update();
        let kickoff = update.kickoff.expect("kickoff should parse");
        assert_eq!(kickoff.format("%Y-%m-%d %H:%M").to_string(), "2026-05-02 18:30");
        assert_eq!(update.location.as_deref(), Some("Field 2"));
    }

    #[test]
    fn malformed_kickoff_input_leaves_the_schedule_alone() {
        let mut state = ScoreEntryState::from_match(&final_match(0, 0, MatchStatus::Scheduled));
        state.kickoff_input = "next tuesday".into();
        assert!(state.update().kickoff.is_none());
    }

    #[test]
    fn manual_match_rejects_a_team_against_itself() {
        let mut state = ManualMatchState::new(Stage::RegularRound, choices(3));
        assert!(state.validate().is_ok());
        state.cursor = 1;
        state.cycle(-1); // away back to index 0, same as home
        assert!(state.validate().is_err());
    }
}
