//! Dojos, teams and members, and the in-memory roster that administers them.

use crate::models::rank::Rank;
use serde::{Deserialize, Serialize};
use std::io::Read;
use uuid::Uuid;

/// Unique identifier for a dojo.
pub type DojoId = Uuid;
/// Unique identifier for a team.
pub type TeamId = Uuid;
/// Unique identifier for a member.
pub type MemberId = Uuid;

/// A team holds at most this many members.
pub const MAX_TEAM_MEMBERS: usize = 7;

/// Errors that can occur while editing the roster.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RosterError {
    /// Names must be non-empty after trimming.
    EmptyName,
    DojoNotFound(DojoId),
    TeamNotFound(TeamId),
    MemberNotFound(MemberId),
    /// A team with this name already exists in the dojo (case-insensitive).
    DuplicateTeamName,
    /// The team already has `MAX_TEAM_MEMBERS` members.
    TeamFull(TeamId),
    /// Rank label in imported data could not be parsed.
    InvalidRank(String),
    /// Malformed CSV input.
    Csv(String),
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterError::EmptyName => write!(f, "Name must not be empty"),
            RosterError::DojoNotFound(_) => write!(f, "Dojo not found"),
            RosterError::TeamNotFound(_) => write!(f, "Team not found"),
            RosterError::MemberNotFound(_) => write!(f, "Member not found"),
            RosterError::DuplicateTeamName => {
                write!(f, "A team with this name already exists in the dojo")
            }
            RosterError::TeamFull(_) => {
                write!(f, "Team already has {} members", MAX_TEAM_MEMBERS)
            }
            RosterError::InvalidRank(label) => write!(f, "Unknown rank: {}", label),
            RosterError::Csv(msg) => write!(f, "Invalid roster CSV: {}", msg),
        }
    }
}

impl std::error::Error for RosterError {}

/// An organizational unit fielding one or more teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Dojo {
    pub id: DojoId,
    pub name: String,
    pub location: Option<String>,
    pub logo: Option<String>,
}

impl Dojo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            location: None,
            logo: None,
        }
    }
}

/// A team of up to seven members representing one dojo.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// None while the team is not attached to a dojo.
    pub dojo_id: Option<DojoId>,
    /// Ordered member list (line-up order).
    pub member_ids: Vec<MemberId>,
    /// 1 = strongest. Assigned before bracket generation.
    pub seed_rank: Option<u32>,
    pub logo: Option<String>,
}

impl Team {
    pub fn new(name: impl Into<String>, dojo_id: Option<DojoId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            dojo_id,
            member_ids: Vec::new(),
            seed_rank: None,
            logo: None,
        }
    }

    /// Builder: set seed rank.
    pub fn with_seed(mut self, seed_rank: u32) -> Self {
        self.seed_rank = Some(seed_rank);
        self
    }
}

/// Team id together with the cached team name, so the two are set and cleared as one.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamAssignment {
    pub team_id: TeamId,
    pub team_name: String,
}

/// A participant.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub full_name: String,
    pub rank: Rank,
    pub team: Option<TeamAssignment>,
}

impl Member {
    pub fn new(full_name: impl Into<String>, rank: Rank) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            rank,
            team: None,
        }
    }

    pub fn team_id(&self) -> Option<TeamId> {
        self.team.as_ref().map(|a| a.team_id)
    }
}

/// Everything the organizer knows about who is competing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Roster {
    pub dojos: Vec<Dojo>,
    pub teams: Vec<Team>,
    pub members: Vec<Member>,
}

fn clean_name(name: &str) -> Result<String, RosterError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RosterError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Case-insensitive name comparison (Unicode lowercase, so "Åsane" equals "åsane").
fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dojo(&self, id: DojoId) -> Option<&Dojo> {
        self.dojos.iter().find(|d| d.id == id)
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Members of a team in line-up order.
    pub fn members_of(&self, team_id: TeamId) -> Vec<&Member> {
        self.team(team_id)
            .map(|t| {
                t.member_ids
                    .iter()
                    .filter_map(|id| self.member(*id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Add a dojo; returns its id.
    pub fn add_dojo(
        &mut self,
        name: &str,
        location: Option<String>,
    ) -> Result<DojoId, RosterError> {
        let mut dojo = Dojo::new(clean_name(name)?);
        dojo.location = location.filter(|l| !l.trim().is_empty());
        let id = dojo.id;
        self.dojos.push(dojo);
        Ok(id)
    }

    /// Add a team to a dojo. Team names are unique within a dojo (case-insensitive).
    pub fn add_team(&mut self, name: &str, dojo_id: Option<DojoId>) -> Result<TeamId, RosterError> {
        let name = clean_name(name)?;
        if let Some(d) = dojo_id {
            if self.dojo(d).is_none() {
                return Err(RosterError::DojoNotFound(d));
            }
        }
        let is_duplicate = self
            .teams
            .iter()
            .any(|t| t.dojo_id == dojo_id && same_name(&t.name, &name));
        if is_duplicate {
            return Err(RosterError::DuplicateTeamName);
        }
        let team = Team::new(name, dojo_id);
        let id = team.id;
        self.teams.push(team);
        Ok(id)
    }

    /// Add an unassigned member.
    pub fn add_member(&mut self, full_name: &str, rank: Rank) -> Result<MemberId, RosterError> {
        let member = Member::new(clean_name(full_name)?, rank);
        let id = member.id;
        self.members.push(member);
        Ok(id)
    }

    /// Add a member and, if given, put them on a team. Nothing is added when the team is
    /// unknown or full.
    pub fn add_member_to_team(
        &mut self,
        full_name: &str,
        rank: Rank,
        team_id: Option<TeamId>,
    ) -> Result<MemberId, RosterError> {
        let name = clean_name(full_name)?;
        if let Some(team_id) = team_id {
            let team = self.team(team_id).ok_or(RosterError::TeamNotFound(team_id))?;
            if team.member_ids.len() >= MAX_TEAM_MEMBERS {
                return Err(RosterError::TeamFull(team_id));
            }
        }
        let member_id = self.add_member(&name, rank)?;
        if let Some(team_id) = team_id {
            self.assign_member(member_id, team_id)?;
        }
        Ok(member_id)
    }

    /// Put a member on a team, taking them off any previous team.
    pub fn assign_member(&mut self, member_id: MemberId, team_id: TeamId) -> Result<(), RosterError> {
        let current = self
            .member(member_id)
            .ok_or(RosterError::MemberNotFound(member_id))?
            .team_id();
        if current == Some(team_id) {
            return Ok(());
        }
        let team = self
            .teams
            .iter()
            .find(|t| t.id == team_id)
            .ok_or(RosterError::TeamNotFound(team_id))?;
        if team.member_ids.len() >= MAX_TEAM_MEMBERS {
            return Err(RosterError::TeamFull(team_id));
        }
        let team_name = team.name.clone();

        self.unassign_member(member_id)?;
        if let Some(t) = self.teams.iter_mut().find(|t| t.id == team_id) {
            t.member_ids.push(member_id);
        }
        if let Some(m) = self.members.iter_mut().find(|m| m.id == member_id) {
            m.team = Some(TeamAssignment { team_id, team_name });
        }
        Ok(())
    }

    /// Take a member off their team (no-op if unassigned).
    pub fn unassign_member(&mut self, member_id: MemberId) -> Result<(), RosterError> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or(RosterError::MemberNotFound(member_id))?;
        if let Some(assignment) = member.team.take() {
            if let Some(t) = self.teams.iter_mut().find(|t| t.id == assignment.team_id) {
                t.member_ids.retain(|id| *id != member_id);
            }
        }
        Ok(())
    }

    /// Remove a team; its members become unassigned.
    pub fn remove_team(&mut self, team_id: TeamId) -> Result<(), RosterError> {
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(RosterError::TeamNotFound(team_id))?;
        self.teams.remove(idx);
        for m in &mut self.members {
            if m.team_id() == Some(team_id) {
                m.team = None;
            }
        }
        Ok(())
    }

    /// Rename a team and refresh the cached name on its members.
    pub fn rename_team(&mut self, team_id: TeamId, name: &str) -> Result<(), RosterError> {
        let name = clean_name(name)?;
        let dojo_id = self
            .team(team_id)
            .ok_or(RosterError::TeamNotFound(team_id))?
            .dojo_id;
        let is_duplicate = self.teams.iter().any(|t| {
            t.id != team_id && t.dojo_id == dojo_id && same_name(&t.name, &name)
        });
        if is_duplicate {
            return Err(RosterError::DuplicateTeamName);
        }
        if let Some(t) = self.teams.iter_mut().find(|t| t.id == team_id) {
            t.name = name.clone();
        }
        for m in &mut self.members {
            if let Some(a) = m.team.as_mut().filter(|a| a.team_id == team_id) {
                a.team_name = name.clone();
            }
        }
        Ok(())
    }

    pub fn set_seed_rank(&mut self, team_id: TeamId, seed_rank: Option<u32>) -> Result<(), RosterError> {
        let team = self
            .teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or(RosterError::TeamNotFound(team_id))?;
        team.seed_rank = seed_rank;
        Ok(())
    }

    /// Build a roster from CSV rows `dojo,team,member,rank` (header row required).
    ///
    /// Dojos and teams are created the first time their name appears. Team, member and rank
    /// columns may be blank (a dojo-only or team-only row); a blank rank means Mudansha.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, RosterError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let mut roster = Roster::new();

        for record in rdr.records() {
            let record = record.map_err(|e| RosterError::Csv(e.to_string()))?;
            let field = |i: usize| record.get(i).unwrap_or("").trim();
            let (dojo_name, team_name, member_name, rank_label) =
                (field(0), field(1), field(2), field(3));

            let existing_dojo = roster
                .dojos
                .iter()
                .find(|d| same_name(&d.name, dojo_name))
                .map(|d| d.id);
            let dojo_id = match existing_dojo {
                Some(id) => id,
                None => roster.add_dojo(dojo_name, None)?,
            };
            if team_name.is_empty() {
                continue;
            }
            let existing_team = roster
                .teams
                .iter()
                .find(|t| t.dojo_id == Some(dojo_id) && same_name(&t.name, team_name))
                .map(|t| t.id);
            let team_id = match existing_team {
                Some(id) => id,
                None => roster.add_team(team_name, Some(dojo_id))?,
            };
            if member_name.is_empty() {
                continue;
            }
            let rank = if rank_label.is_empty() {
                Rank::Mudansha
            } else {
                rank_label
                    .parse::<Rank>()
                    .map_err(|_| RosterError::InvalidRank(rank_label.to_string()))?
            };
            let member_id = roster.add_member(member_name, rank)?;
            roster.assign_member(member_id, team_id)?;
        }

        log::debug!(
            "Loaded roster: {} dojo(s), {} team(s), {} member(s)",
            roster.dojos.len(),
            roster.teams.len(),
            roster.members.len()
        );
        Ok(roster)
    }
}
