use std::collections::HashSet;
use std::fmt;
use tourney_api::{KnockoutPairing, Stage, TournamentTeam};

/// A team the operator can place into a bracket slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamChoice {
    pub id: String,
    pub name: String,
}

impl TeamChoice {
    pub fn from_team(team: &TournamentTeam) -> Self {
        Self { id: team.id.clone(), name: team.name.clone() }
    }
}

/// One proposed match. Slots hold indexes into the candidate list; `None`
/// means the operator cleared the slot and must refill it before submitting.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSlot {
    pub home: Option<usize>,
    pub away: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureError {
    NoTeams,
    OddTeamCount(usize),
    UnfilledSlot { match_index: usize },
    DuplicateTeam { name: String },
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureError::NoTeams => write!(f, "no qualified teams to pair"),
            FixtureError::OddTeamCount(n) => {
                write!(f, "cannot pair an odd number of teams ({n})")
            }
            FixtureError::UnfilledSlot { match_index } => {
                write!(f, "match {} has an empty slot", match_index + 1)
            }
            FixtureError::DuplicateTeam { name } => {
                write!(f, "{name} is assigned to more than one match")
            }
        }
    }
}

/// Editable knockout fixture proposal for one stage.
///
/// Seeding pairs position `i` against position `N-1-i` (top seed vs. bottom
/// seed). Every slot can be overridden before confirming; `validate` re-checks
/// the full set so no duplicate assignment ever reaches the network.
#[derive(Debug, Clone)]
pub struct FixtureProposal {
    pub stage: Stage,
    pub candidates: Vec<TeamChoice>,
    pub slots: Vec<FixtureSlot>,
    /// Linear slot cursor: even entries are home sides, odd entries away.
    pub cursor: usize,
}

impl FixtureProposal {
    /// Standard seeding over the whole candidate list.
    pub fn from_seeding(stage: Stage, teams: &[TournamentTeam]) -> Result<Self, FixtureError> {
        Self::seed_first(stage, teams, teams.len())
    }

    /// Seed only the first `take` candidates (stage-skip pairs a later
    /// stage's bracket out of a larger qualified pool).
    pub fn seed_first(
        stage: Stage,
        teams: &[TournamentTeam],
        take: usize,
    ) -> Result<Self, FixtureError> {
        let take = take.min(teams.len());
        if take == 0 {
            return Err(FixtureError::NoTeams);
        }
        if take % 2 != 0 {
            return Err(FixtureError::OddTeamCount(take));
        }

        let candidates = teams.iter().map(TeamChoice::from_team).collect();
        let slots = (0..take / 2)
            .map(|i| FixtureSlot { home: Some(i), away: Some(take - 1 - i) })
            .collect();
        Ok(Self { stage, candidates, slots, cursor: 0 })
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len() * 2
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.slot_count() {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Cycle the team under the cursor through the candidate list. One extra
    /// step in the cycle is the empty slot, so an operator can clear a slot.
    pub fn cycle_team(&mut self, delta: isize) {
        let states = self.candidates.len() as isize + 1; // last state = empty
        if states <= 1 {
            return;
        }
        let slot = &mut self.slots[self.cursor / 2];
        let cell = if self.cursor % 2 == 0 { &mut slot.home } else { &mut slot.away };
        let current = cell.map(|i| i as isize).unwrap_or(states - 1);
        let next = (current + delta).rem_euclid(states);
        *cell = if next == states - 1 { None } else { Some(next as usize) };
    }

    pub fn team_at(&self, idx: Option<usize>) -> Option<&TeamChoice> {
        idx.and_then(|i| self.candidates.get(i))
    }

    /// Check every slot is filled and the assignment is pairwise disjoint,
    /// then produce the pairings to submit. Nothing is sent on error.
    pub fn validate(&self) -> Result<Vec<KnockoutPairing>, FixtureError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut pairings = Vec::with_capacity(self.slots.len());
        for (match_index, slot) in self.slots.iter().enumerate() {
            let home = slot.home.ok_or(FixtureError::UnfilledSlot { match_index })?;
            let away = slot.away.ok_or(FixtureError::UnfilledSlot { match_index })?;
            for idx in [home, away] {
                let team = &self.candidates[idx];
                if !seen.insert(team.id.as_str()) {
                    return Err(FixtureError::DuplicateTeam { name: team.name.clone() });
                }
            }
            pairings.push(KnockoutPairing {
                home_team_id: self.candidates[home].id.clone(),
                away_team_id: self.candidates[away].id.clone(),
            });
        }
        Ok(pairings)
    }

    /// All team ids in the validated assignment, bracket order. Used by the
    /// stage-skip flow, which submits teams rather than matches.
    pub fn validated_team_ids(&self) -> Result<Vec<String>, FixtureError> {
        Ok(self
            .validate()?
            .into_iter()
            .flat_map(|p| [p.home_team_id, p.away_team_id])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams(n: usize) -> Vec<TournamentTeam> {
        (1..=n)
            .map(|i| TournamentTeam {
                id: format!("t{i}"),
                team_id: format!("team-{i}"),
                name: format!("Team {i}"),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn sixteen_teams_seed_into_eight_matches_top_vs_bottom() {
        let teams = teams(16);
        let proposal = FixtureProposal::from_seeding(Stage::QuarterFinal, &teams).unwrap();
        assert_eq!(proposal.slots.len(), 8);
        let pairings = proposal.validate().unwrap();
        assert_eq!(pairings[0].home_team_id, "t1");
        assert_eq!(pairings[0].away_team_id, "t16");
        assert_eq!(pairings[1].home_team_id, "t2");
        assert_eq!(pairings[1].away_team_id, "t15");
        assert_eq!(pairings[7].home_team_id, "t8");
        assert_eq!(pairings[7].away_team_id, "t9");
    }

    #[test]
    fn every_team_appears_in_exactly_one_slot() {
        let teams = teams(8);
        let proposal = FixtureProposal::from_seeding(Stage::SemiFinal, &teams).unwrap();
        let pairings = proposal.validate().unwrap();
        assert_eq!(pairings.len(), 4);
        let mut ids: Vec<String> = pairings
            .into_iter()
            .flat_map(|p| [p.home_team_id, p.away_team_id])
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn duplicate_assignment_blocks_validation() {
        let teams = teams(4);
        let mut proposal = FixtureProposal::from_seeding(Stage::SemiFinal, &teams).unwrap();
        // Point the second match's home slot at the team already in match one.
        proposal.slots[1].home = Some(0);
        match proposal.validate() {
            Err(FixtureError::DuplicateTeam { name }) => assert_eq!(name, "Team 1"),
            other => panic!("expected duplicate-team error, got {other:?}"),
        }
    }

    #[test]
    fn cleared_slot_blocks_validation() {
        let teams = teams(4);
        let mut proposal = FixtureProposal::from_seeding(Stage::SemiFinal, &teams).unwrap();
        proposal.slots[0].away = None;
        assert_eq!(
            proposal.validate(),
            Err(FixtureError::UnfilledSlot { match_index: 0 })
        );
    }

    #[test]
    fn odd_team_count_is_rejected_up_front() {
        let teams = teams(5);
        assert_eq!(
            FixtureProposal::from_seeding(Stage::QuarterFinal, &teams).unwrap_err(),
            FixtureError::OddTeamCount(5)
        );
        assert_eq!(
            FixtureProposal::from_seeding(Stage::QuarterFinal, &[]).unwrap_err(),
            FixtureError::NoTeams
        );
    }

    #[test]
    fn seed_first_pairs_a_smaller_bracket_from_a_larger_pool() {
        let teams = teams(8);
        let proposal = FixtureProposal::seed_first(Stage::Final, &teams, 2).unwrap();
        assert_eq!(proposal.slots.len(), 1);
        let pairings = proposal.validate().unwrap();
        assert_eq!(pairings[0].home_team_id, "t1");
        assert_eq!(pairings[0].away_team_id, "t2");
        // The full pool stays available for overrides.
        assert_eq!(proposal.candidates.len(), 8);
    }

    #[test]
    fn cycling_walks_candidates_and_the_empty_state() {
        let teams = teams(2);
        let mut proposal = FixtureProposal::from_seeding(Stage::Final, &teams).unwrap();
        assert_eq!(proposal.slots[0].home, Some(0));
        proposal.cycle_team(1);
        assert_eq!(proposal.slots[0].home, Some(1));
        proposal.cycle_team(1);
        assert_eq!(proposal.slots[0].home, None, "one past the end clears the slot");
        proposal.cycle_team(1);
        assert_eq!(proposal.slots[0].home, Some(0), "and wraps back around");
    }
}
