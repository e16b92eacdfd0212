use crate::app::MenuItem;
use crate::state::modal::ActiveModal;
use crate::state::pagination::Pager;
use chrono::Local;
use tourney_api::{
    Match, Stage, StageFilter, StandingRow, Standings, Tournament, TournamentTeam,
};

// ---------------------------------------------------------------------------
// Stage controller state
// ---------------------------------------------------------------------------

/// Qualification actions an operator can start from a stage view. Each opens
/// its modal; success re-triggers the stage fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    EndGroupStage,
    PromoteToSemiFinal,
    PromoteToFinal,
    SkipStage,
    GenerateFixtures,
    EndTournament,
}

impl StageAction {
    pub fn label(&self) -> &'static str {
        match self {
            StageAction::EndGroupStage => "[e]nd group stage",
            StageAction::PromoteToSemiFinal => "[p]romote to SF",
            StageAction::PromoteToFinal => "[p]romote to final",
            StageAction::SkipStage => "[x] skip stage",
            StageAction::GenerateFixtures => "[g]enerate fixtures",
            StageAction::EndTournament => "[e]nd tournament",
        }
    }

    /// Stage a promotion-style action advances teams into.
    pub fn promote_target(&self) -> Option<Stage> {
        match self {
            StageAction::EndGroupStage => Some(Stage::QuarterFinal),
            StageAction::PromoteToSemiFinal => Some(Stage::SemiFinal),
            StageAction::PromoteToFinal => Some(Stage::Final),
            _ => None,
        }
    }
}

/// The selected stage view plus which actions it enables. The authoritative
/// stage lives server-side; this is advisory UI state with no terminal state.
#[derive(Debug, Default)]
pub struct StageState {
    pub filter: StageFilter,
}

impl StageState {
    pub fn select(&mut self, filter: StageFilter) {
        self.filter = filter;
    }

    pub fn actions(&self) -> &'static [StageAction] {
        available_actions(self.filter)
    }
}

pub fn available_actions(filter: StageFilter) -> &'static [StageAction] {
    match filter {
        StageFilter::All => &[],
        StageFilter::Only(Stage::RegularRound) => &[StageAction::EndGroupStage],
        StageFilter::Only(Stage::QuarterFinal) => &[
            StageAction::PromoteToSemiFinal,
            StageAction::SkipStage,
            StageAction::GenerateFixtures,
        ],
        StageFilter::Only(Stage::SemiFinal) => &[
            StageAction::PromoteToFinal,
            StageAction::SkipStage,
            StageAction::GenerateFixtures,
        ],
        StageFilter::Only(Stage::Final) => {
            &[StageAction::EndTournament, StageAction::GenerateFixtures]
        }
    }
}

// ---------------------------------------------------------------------------
// Matches view state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MatchesState {
    pub matches: Vec<Match>,
    pub pager: Pager,
    /// Row index within the visible page.
    pub row: usize,
}

impl MatchesState {
    pub fn load(&mut self, matches: Vec<Match>) {
        // Keep the operator's position when a periodic refresh lands.
        let len = matches.len();
        self.matches = matches;
        self.pager.select(self.pager.page, len);
        self.row = self.row.min(self.visible().len().saturating_sub(1));
    }

    pub fn visible(&self) -> &[Match] {
        self.pager.slice(&self.matches)
    }

    pub fn selected(&self) -> Option<&Match> {
        self.visible().get(self.row)
    }

    pub fn row_down(&mut self) {
        let max = self.visible().len().saturating_sub(1);
        if self.row < max {
            self.row += 1;
        }
    }

    pub fn row_up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn page_next(&mut self) {
        self.pager.next(self.matches.len());
        self.row = 0;
    }

    pub fn page_prev(&mut self) {
        self.pager.prev(self.matches.len());
        self.row = 0;
    }

    pub fn reset(&mut self) {
        self.matches.clear();
        self.pager.reset();
        self.row = 0;
    }
}

// ---------------------------------------------------------------------------
// Standings view state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct StandingsState {
    pub standings: Standings,
    /// Flattened once on load; render code never re-detects the shape.
    pub rows: Vec<StandingRow>,
    pub grouped_view: bool,
    pub scroll_offset: u16,
}

impl StandingsState {
    pub fn load(&mut self, standings: Standings) {
        self.rows = standings.flattened();
        if standings.groups().is_empty() {
            self.grouped_view = false;
        }
        self.standings = standings;
        self.scroll_offset = 0;
    }

    pub fn toggle_grouped(&mut self) {
        if !self.standings.groups().is_empty() {
            self.grouped_view = !self.grouped_view;
        }
    }

    pub fn reset(&mut self) {
        self.standings = Standings::default();
        self.rows.clear();
        self.scroll_offset = 0;
    }
}

// ---------------------------------------------------------------------------
// Teams view state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TeamsState {
    pub teams: Vec<TournamentTeam>,
    /// Teams flagged for the selected knockout stage, standings-seeded.
    pub qualified: Vec<TournamentTeam>,
    pub qualified_stage: Option<Stage>,
    pub pager: Pager,
    pub row: usize,
}

impl TeamsState {
    pub fn load(&mut self, teams: Vec<TournamentTeam>) {
        let len = teams.len();
        self.teams = teams;
        self.pager.select(self.pager.page, len);
        self.row = self.row.min(self.visible().len().saturating_sub(1));
    }

    pub fn load_qualified(&mut self, stage: Stage, teams: Vec<TournamentTeam>) {
        self.qualified_stage = Some(stage);
        self.qualified = teams;
    }

    pub fn visible(&self) -> &[TournamentTeam] {
        self.pager.slice(&self.teams)
    }

    pub fn selected(&self) -> Option<&TournamentTeam> {
        self.visible().get(self.row)
    }

    pub fn row_down(&mut self) {
        let max = self.visible().len().saturating_sub(1);
        if self.row < max {
            self.row += 1;
        }
    }

    pub fn row_up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn page_next(&mut self) {
        self.pager.next(self.teams.len());
        self.row = 0;
    }

    pub fn page_prev(&mut self) {
        self.pager.prev(self.teams.len());
        self.row = 0;
    }
}

// ---------------------------------------------------------------------------
// Transient notice (toast)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    pub timestamp: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self::stamped(text.into(), NoticeKind::Success)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::stamped(text.into(), NoticeKind::Error)
    }

    fn stamped(text: String, kind: NoticeKind) -> Self {
        Self { text, kind, timestamp: Local::now().format("%H:%M").to_string() }
    }
}

// ---------------------------------------------------------------------------
// Root app state — owned by the page-level App, passed down immutably
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub notice: Option<Notice>,
    pub tournament: Option<Tournament>,
    pub stage: StageState,
    pub matches: MatchesState,
    pub standings: StandingsState,
    pub teams: TeamsState,
    pub modal: ActiveModal,
}

impl AppState {
    pub fn new(page_size: usize, filter: StageFilter) -> Self {
        let mut state = Self::default();
        state.stage.filter = filter;
        state.matches.pager = Pager::new(page_size);
        state.teams.pager = Pager::new(page_size);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_per_stage_match_the_progression_rules() {
        assert!(available_actions(StageFilter::All).is_empty());
        assert_eq!(
            available_actions(StageFilter::Only(Stage::RegularRound)),
            &[StageAction::EndGroupStage]
        );
        let qf = available_actions(StageFilter::Only(Stage::QuarterFinal));
        assert!(qf.contains(&StageAction::PromoteToSemiFinal));
        assert!(qf.contains(&StageAction::SkipStage));
        let f = available_actions(StageFilter::Only(Stage::Final));
        assert!(f.contains(&StageAction::EndTournament));
        assert!(
            !f.contains(&StageAction::SkipStage),
            "the final stage cannot be skipped"
        );
    }

    #[test]
    fn promotion_targets_follow_the_bracket() {
        assert_eq!(StageAction::EndGroupStage.promote_target(), Some(Stage::QuarterFinal));
        assert_eq!(StageAction::PromoteToSemiFinal.promote_target(), Some(Stage::SemiFinal));
        assert_eq!(StageAction::PromoteToFinal.promote_target(), Some(Stage::Final));
        assert_eq!(StageAction::EndTournament.promote_target(), None);
    }

    #[test]
    fn match_list_selection_survives_a_refresh() {
        let mut state = MatchesState { pager: Pager::new(2), ..Default::default() };
        let matches: Vec<Match> = (0..5)
            .map(|i| Match { id: format!("m{i}"), ..Default::default() })
            .collect();
        state.load(matches.clone());
        state.page_next();
        state.row_down();
        assert_eq!(state.selected().map(|m| m.id.as_str()), Some("m3"));
        // Refresh with a shorter list: page and row clamp instead of dangling.
        state.load(matches.into_iter().take(3).collect());
        assert!(state.selected().is_some());
    }
}
