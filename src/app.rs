use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, Notice, StageAction};
use crate::state::fixtures::{FixtureProposal, TeamChoice};
use crate::state::messages::NetworkRequest;
use crate::state::modal::{
    ActiveModal, ConfirmDeleteState, EndTournamentState, ManualMatchState, PromoteState,
    ScoreEntryState, SkipState, WildcardState,
};
use log::error;
use std::collections::HashMap;
use tourney_api::{
    Match, MatchStatus, PlayerPerformance, Stage, StageFilter, Standings, Tournament,
    TournamentTeam,
};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Matches,
    Standings,
    Teams,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        let settings = AppSettings::load();
        let state = AppState::new(settings.page_size, settings.stage);

        let app = Self { settings, state };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Fetch plans — entering a stage fans out independent fetches; each
    // populates disjoint state, so their completion order never matters
    // -----------------------------------------------------------------------

    pub fn startup_requests(&self) -> Vec<NetworkRequest> {
        let mut requests = vec![NetworkRequest::LoadTournament, NetworkRequest::LoadTeams];
        requests.extend(self.stage_requests());
        requests
    }

    pub fn stage_requests(&self) -> Vec<NetworkRequest> {
        let stage = self.state.stage.filter;
        let mut requests = vec![
            NetworkRequest::LoadMatches { stage },
            NetworkRequest::LoadStandings { stage },
        ];
        if let Some(knockout) = stage.knockout_stage() {
            requests.push(NetworkRequest::LoadQualified { stage: knockout });
        }
        requests
    }

    /// The periodic tick only refreshes matches; the rest of the stage data
    /// moves when the operator acts.
    pub fn refresh_requests(&self) -> Vec<NetworkRequest> {
        vec![NetworkRequest::LoadMatches { stage: self.state.stage.filter }]
    }

    pub fn select_stage_next(&mut self) -> Vec<NetworkRequest> {
        self.apply_stage(self.state.stage.filter.next())
    }

    pub fn select_stage_prev(&mut self) -> Vec<NetworkRequest> {
        self.apply_stage(self.state.stage.filter.prev())
    }

    fn apply_stage(&mut self, filter: StageFilter) -> Vec<NetworkRequest> {
        self.state.stage.select(filter);
        self.state.matches.reset();
        self.state.standings.reset();
        self.state.teams.qualified.clear();
        self.state.teams.qualified_stage = None;
        let _ = self.settings.save(filter);
        self.stage_requests()
    }

    // -----------------------------------------------------------------------
    // Network response handlers — called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_tournament_loaded(&mut self, tournament: Tournament) {
        self.state.tournament = Some(tournament);
    }

    pub fn on_matches_loaded(&mut self, stage: StageFilter, matches: Vec<Match>) {
        // A fetch for a stage the operator has already left is stale; drop it.
        if stage == self.state.stage.filter {
            self.state.matches.load(matches);
        }
    }

    pub fn on_standings_loaded(&mut self, stage: StageFilter, standings: Standings) {
        if stage == self.state.stage.filter {
            self.state.standings.load(standings);
        }
    }

    pub fn on_teams_loaded(&mut self, teams: Vec<TournamentTeam>) {
        self.state.teams.load(teams);
    }

    pub fn on_qualified_loaded(&mut self, stage: Stage, teams: Vec<TournamentTeam>) {
        if self.state.stage.filter.knockout_stage() == Some(stage) {
            let seeded = self.seed_by_standings(teams);
            self.state.teams.load_qualified(stage, seeded);
        }
    }

    pub fn on_player_stats_loaded(&mut self, match_id: String, players: Vec<PlayerPerformance>) {
        if let ActiveModal::ScoreEntry(editor) = &mut self.state.modal
            && editor.match_id == match_id
        {
            editor.merge_fetched(players);
        }
    }

    /// A mutation landed: close the modal, toast, and refetch everything the
    /// action may have moved.
    pub fn on_action_completed(&mut self, description: String) -> Vec<NetworkRequest> {
        self.state.modal = ActiveModal::None;
        self.state.notice = Some(Notice::success(description));
        let mut requests = vec![NetworkRequest::LoadTournament, NetworkRequest::LoadTeams];
        requests.extend(self.stage_requests());
        requests
    }

    pub fn on_error(&mut self, message: String) {
        self.notify_error(message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    // -----------------------------------------------------------------------
    // Stage actions — each opens its modal; validation errors become notices
    // -----------------------------------------------------------------------

    pub fn open_action(&mut self, action: StageAction) {
        if !self.state.stage.actions().contains(&action) {
            return;
        }
        match action {
            StageAction::EndGroupStage
            | StageAction::PromoteToSemiFinal
            | StageAction::PromoteToFinal => {
                let Some(target) = action.promote_target() else { return };
                self.open_promotion(target);
            }
            StageAction::SkipStage => self.open_skip(),
            StageAction::GenerateFixtures => self.open_generate_fixtures(),
            StageAction::EndTournament => self.open_end_tournament(),
        }
    }

    fn open_promotion(&mut self, target: Stage) {
        let candidates = self.promotion_candidates();
        if candidates.is_empty() {
            self.notify_error("no standings loaded yet — nothing to promote");
            return;
        }
        let required = self.required_for(target).min(candidates.len());
        self.state.modal = ActiveModal::Promote(PromoteState::new(target, candidates, required));
    }

    fn open_skip(&mut self) {
        let Some(current) = self.state.stage.filter.knockout_stage() else { return };
        let Some(target) = current.next() else { return };
        let teams = self.seeded_qualified(current);
        match FixtureProposal::seed_first(target, &teams, target.bracket_size()) {
            Ok(proposal) => {
                self.state.modal = ActiveModal::Skip(SkipState { target, proposal });
            }
            Err(e) => self.notify_error(e.to_string()),
        }
    }

    fn open_generate_fixtures(&mut self) {
        let Some(stage) = self.state.stage.filter.knockout_stage() else { return };
        let teams = self.seeded_qualified(stage);
        match FixtureProposal::from_seeding(stage, &teams) {
            Ok(proposal) => self.state.modal = ActiveModal::GenerateFixtures(proposal),
            Err(e) => self.notify_error(e.to_string()),
        }
    }

    fn open_end_tournament(&mut self) {
        let final_match = self
            .state
            .matches
            .matches
            .iter()
            .find(|m| m.stage == Stage::Final && m.status != MatchStatus::Cancelled);
        let Some(final_match) = final_match else {
            self.notify_error("no final match found — generate the final first");
            return;
        };
        match EndTournamentState::from_final_match(final_match) {
            Ok(state) => self.state.modal = ActiveModal::EndTournament(state),
            Err(e) => self.notify_error(e),
        }
    }

    // -----------------------------------------------------------------------
    // Per-tab modals
    // -----------------------------------------------------------------------

    /// Opens the score editor for the selected match. Returns the stats fetch
    /// the caller should issue.
    pub fn open_score_entry(&mut self) -> Option<NetworkRequest> {
        let m = self.state.matches.selected()?.clone();
        let match_id = m.id.clone();
        self.state.modal = ActiveModal::ScoreEntry(ScoreEntryState::from_match(&m));
        Some(NetworkRequest::LoadPlayerStats { match_id })
    }

    pub fn open_delete_confirm(&mut self) {
        let Some(m) = self.state.matches.selected() else { return };
        let label = format!("{} vs {}", side_name(&m.home), side_name(&m.away));
        self.state.modal =
            ActiveModal::ConfirmDelete(ConfirmDeleteState { match_id: m.id.clone(), label });
    }

    pub fn open_manual_match(&mut self) {
        let candidates: Vec<TeamChoice> = self
            .state
            .teams
            .teams
            .iter()
            .filter(|t| t.approved)
            .map(TeamChoice::from_team)
            .collect();
        if candidates.len() < 2 {
            self.notify_error("need at least two approved teams to create a match");
            return;
        }
        let stage = match self.state.stage.filter {
            StageFilter::Only(stage) => stage,
            StageFilter::All => Stage::RegularRound,
        };
        self.state.modal = ActiveModal::ManualMatch(ManualMatchState::new(stage, candidates));
    }

    pub fn open_wildcard(&mut self) {
        self.state.modal = ActiveModal::Wildcard(WildcardState::default());
    }

    pub fn close_modal(&mut self) {
        self.state.modal = ActiveModal::None;
    }

    /// Validate the open modal and build its request. Validation failures are
    /// surfaced as notices and never reach the network.
    pub fn confirm_modal(&mut self) -> Option<NetworkRequest> {
        let built: Result<NetworkRequest, String> = match &self.state.modal {
            ActiveModal::None => return None,
            ActiveModal::Promote(modal) => modal.validate().map(|team_ids| {
                NetworkRequest::PromoteTeams { target: modal.target, team_ids }
            }),
            ActiveModal::Skip(modal) => modal
                .proposal
                .validated_team_ids()
                .map(|team_ids| NetworkRequest::SkipStage { target: modal.target, team_ids })
                .map_err(|e| e.to_string()),
            ActiveModal::GenerateFixtures(proposal) => proposal
                .validate()
                .map(|pairings| NetworkRequest::GenerateKnockout { stage: proposal.stage, pairings })
                .map_err(|e| e.to_string()),
            ActiveModal::EndTournament(modal) => Ok(NetworkRequest::EndTournament {
                champion_team_id: modal.champion().id.clone(),
            }),
            ActiveModal::ScoreEntry(editor) => Ok(NetworkRequest::SubmitMatchUpdate {
                match_id: editor.match_id.clone(),
                update: editor.update(),
                stats: editor.players.clone(),
            }),
            ActiveModal::Wildcard(modal) => modal
                .validate()
                .map(|name| NetworkRequest::AddWildcard { name: name.to_owned() }),
            ActiveModal::ManualMatch(modal) => modal.validate().map(|(home, away)| {
                NetworkRequest::CreateManualMatch {
                    stage: modal.stage,
                    home_team_id: home.id.clone(),
                    away_team_id: away.id.clone(),
                }
            }),
            ActiveModal::ConfirmDelete(modal) => {
                Ok(NetworkRequest::DeleteMatch { match_id: modal.match_id.clone() })
            }
        };

        match built {
            Ok(request) => Some(request),
            Err(message) => {
                self.notify_error(message);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Promotion candidates in standings order; the teams list is the
    /// fallback when standings haven't loaded.
    fn promotion_candidates(&self) -> Vec<TeamChoice> {
        if !self.state.standings.rows.is_empty() {
            return self
                .state
                .standings
                .rows
                .iter()
                .map(|row| TeamChoice { id: row.team_id.clone(), name: row.team_name.clone() })
                .collect();
        }
        self.state
            .teams
            .teams
            .iter()
            .filter(|t| t.approved)
            .map(TeamChoice::from_team)
            .collect()
    }

    fn required_for(&self, target: Stage) -> usize {
        if target == Stage::QuarterFinal {
            self.state
                .tournament
                .as_ref()
                .map(|t| t.top_teams_advance as usize)
                .unwrap_or(Stage::QuarterFinal.bracket_size())
        } else {
            target.bracket_size()
        }
    }

    /// Qualified teams for a stage, ordered by standings position so the
    /// fixture proposal seeds top vs. bottom.
    fn seeded_qualified(&self, stage: Stage) -> Vec<TournamentTeam> {
        let teams = if self.state.teams.qualified_stage == Some(stage) {
            self.state.teams.qualified.clone()
        } else {
            self.state
                .teams
                .teams
                .iter()
                .filter(|t| t.qualified_for(stage))
                .cloned()
                .collect()
        };
        self.seed_by_standings(teams)
    }

    fn seed_by_standings(&self, mut teams: Vec<TournamentTeam>) -> Vec<TournamentTeam> {
        let order: HashMap<&str, usize> = self
            .state
            .standings
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.team_id.as_str(), i))
            .collect();
        teams.sort_by_key(|t| {
            order
                .get(t.id.as_str())
                .or_else(|| order.get(t.team_id.as_str()))
                .copied()
                .unwrap_or(usize::MAX)
        });
        teams
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("{message}");
        self.state.notice = Some(Notice::error(message));
    }
}

fn side_name(side: &Option<tourney_api::SideRef>) -> &str {
    side.as_ref().map(|s| s.name.as_str()).unwrap_or("TBD")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourney_api::SideRef;

    fn test_app(filter: StageFilter) -> App {
        App {
            settings: AppSettings {
                api_base: "http://127.0.0.1:8080/api".into(),
                api_key: String::new(),
                tournament_id: "t1".into(),
                stage: filter,
                page_size: 12,
                log_level: None,
            },
            state: AppState::new(12, filter),
        }
    }

    fn qualified_teams(n: usize, stage: Stage) -> Vec<TournamentTeam> {
        (1..=n)
            .map(|i| {
                let mut team = TournamentTeam {
                    id: format!("t{i}"),
                    team_id: format!("team-{i}"),
                    name: format!("Team {i}"),
                    approved: true,
                    ..Default::default()
                };
                match stage {
                    Stage::QuarterFinal => team.in_quarter_finals = true,
                    Stage::SemiFinal => team.in_semi_finals = true,
                    Stage::Final => team.in_finals = true,
                    Stage::RegularRound => {}
                }
                team
            })
            .collect()
    }

    #[test]
    fn knockout_stage_fetch_plan_includes_qualified_teams() {
        let app = test_app(StageFilter::Only(Stage::SemiFinal));
        let plan = app.stage_requests();
        assert_eq!(plan.len(), 3);
        assert!(plan
            .iter()
            .any(|r| matches!(r, NetworkRequest::LoadQualified { stage: Stage::SemiFinal })));
    }

    #[test]
    fn group_stage_fetch_plan_skips_qualified_teams() {
        let app = test_app(StageFilter::Only(Stage::RegularRound));
        let plan = app.stage_requests();
        assert_eq!(plan.len(), 2);
        assert!(!plan.iter().any(|r| matches!(r, NetworkRequest::LoadQualified { .. })));
    }

    #[test]
    fn stale_match_response_is_dropped() {
        let mut app = test_app(StageFilter::Only(Stage::Final));
        app.on_matches_loaded(
            StageFilter::Only(Stage::QuarterFinal),
            vec![Match::default()],
        );
        assert!(app.state.matches.matches.is_empty());
        app.on_matches_loaded(StageFilter::Only(Stage::Final), vec![Match::default()]);
        assert_eq!(app.state.matches.matches.len(), 1);
    }

    #[test]
    fn duplicate_fixture_confirmation_never_builds_a_request() {
        let mut app = test_app(StageFilter::Only(Stage::QuarterFinal));
        app.state.teams.load(qualified_teams(8, Stage::QuarterFinal));
        app.open_action(StageAction::GenerateFixtures);
        let ActiveModal::GenerateFixtures(proposal) = &mut app.state.modal else {
            panic!("expected fixture modal");
        };
        proposal.slots[1].home = proposal.slots[0].home;
        assert!(app.confirm_modal().is_none());
        let notice = app.state.notice.expect("validation failure must surface a notice");
        assert!(notice.text.contains("more than one match"), "got: {}", notice.text);
    }

    #[test]
    fn end_tournament_opens_with_suggested_champion() {
        let mut app = test_app(StageFilter::Only(Stage::Final));
        app.state.matches.load(vec![Match {
            id: "f1".into(),
            home: Some(SideRef { team_id: "h".into(), name: "Harriers".into() }),
            away: Some(SideRef { team_id: "a".into(), name: "Aces".into() }),
            home_score: Some(3),
            away_score: Some(1),
            status: MatchStatus::Completed,
            stage: Stage::Final,
            ..Default::default()
        }]);
        app.open_action(StageAction::EndTournament);
        let ActiveModal::EndTournament(modal) = &app.state.modal else {
            panic!("expected end-tournament modal");
        };
        assert_eq!(modal.suggested, Some(0));
        assert_eq!(modal.champion().name, "Harriers");
    }

    #[test]
    fn action_not_available_for_the_stage_is_ignored() {
        let mut app = test_app(StageFilter::All);
        app.open_action(StageAction::EndTournament);
        assert!(!app.state.modal.is_open());
    }

    #[test]
    fn action_completed_closes_modal_and_refetches() {
        let mut app = test_app(StageFilter::Only(Stage::QuarterFinal));
        app.state.modal = ActiveModal::Wildcard(WildcardState { name: "Wild".into() });
        let plan = app.on_action_completed("done".into());
        assert!(!app.state.modal.is_open());
        assert!(plan.iter().any(|r| matches!(r, NetworkRequest::LoadTournament)));
        assert!(plan.iter().any(|r| matches!(r, NetworkRequest::LoadMatches { .. })));
        assert!(plan.iter().any(|r| matches!(r, NetworkRequest::LoadQualified { .. })));
    }

    #[test]
    fn skip_stage_pairs_the_next_bracket_from_the_current_pool() {
        let mut app = test_app(StageFilter::Only(Stage::QuarterFinal));
        app.state.teams.load(qualified_teams(8, Stage::QuarterFinal));
        app.open_action(StageAction::SkipStage);
        let ActiveModal::Skip(modal) = &app.state.modal else {
            panic!("expected skip modal");
        };
        assert_eq!(modal.target, Stage::SemiFinal);
        assert_eq!(modal.proposal.slots.len(), 2, "semi-final bracket is 4 teams");
        let ids = modal.proposal.validated_team_ids().unwrap();
        assert_eq!(ids.len(), 4);
    }
}
