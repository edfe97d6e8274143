use arrayvec::ArrayVec;
use huddle_core::{
    Lineup, LineupError, LineupId, MAX_LINEUP_SIZE, Role, TeamId, UserId, suggest_lineup,
};

use super::{Ctx, StatsRepo, TeamsRepo, require};
use crate::error::{HuddleError, Result};

/// Saved five-player lineups.
pub struct LineupsRepo<'a> {
    ctx: Ctx<'a>,
}

impl<'a> LineupsRepo<'a> {
    pub(crate) fn new(ctx: Ctx<'a>) -> Self {
        Self { ctx }
    }

    pub fn create_lineup(
        &self,
        team_id: &TeamId,
        name: &str,
        players: impl IntoIterator<Item = UserId>,
        created_by: &UserId,
    ) -> Result<Lineup> {
        require("name", name)?;
        if team_id.is_empty() {
            return Err(HuddleError::validation("team_id", "must not be empty"));
        }
        let selected_players = Lineup::players_from(players).map_err(lineup_error)?;

        let now = self.ctx.now();
        let lineup = Lineup {
            id: self.ctx.next_id()?,
            team_id: team_id.clone(),
            name: name.trim().to_owned(),
            selected_players,
            created_by: created_by.clone(),
            created_at: now,
            updated_at: now,
        };
        Ok(self.ctx.table::<Lineup>().insert(lineup)?)
    }

    pub fn get_lineup_by_id(&self, id: &LineupId) -> Result<Option<Lineup>> {
        Ok(self.ctx.table::<Lineup>().get(id.as_str())?)
    }

    pub fn list_lineups_for_team(&self, team_id: &TeamId) -> Result<Vec<Lineup>> {
        Ok(self
            .ctx
            .table::<Lineup>()
            .find(|l| &l.team_id == team_id)?)
    }

    /// Append a player. A full lineup or a repeated player is rejected and
    /// nothing is written.
    pub fn add_player_to_lineup(&self, id: &LineupId, player: UserId) -> Result<Lineup> {
        let mut lineup = self
            .get_lineup_by_id(id)?
            .ok_or_else(|| HuddleError::not_found("lineup", id))?;
        if lineup.is_full() {
            return Err(lineup_error(LineupError::Full));
        }
        lineup.try_add(player).map_err(lineup_error)?;
        self.store(lineup)
    }

    pub fn remove_player_from_lineup(&self, id: &LineupId, player: &UserId) -> Result<Lineup> {
        let mut lineup = self
            .get_lineup_by_id(id)?
            .ok_or_else(|| HuddleError::not_found("lineup", id))?;
        if !lineup.remove(player) {
            return Ok(lineup);
        }
        self.store(lineup)
    }

    pub fn rename_lineup(&self, id: &LineupId, name: &str) -> Result<Lineup> {
        require("name", name)?;
        let mut lineup = self
            .get_lineup_by_id(id)?
            .ok_or_else(|| HuddleError::not_found("lineup", id))?;
        lineup.name = name.trim().to_owned();
        self.store(lineup)
    }

    pub fn delete_lineup(&self, id: &LineupId) -> Result<()> {
        if !self.ctx.table::<Lineup>().remove(id.as_str())? {
            return Err(HuddleError::not_found("lineup", id));
        }
        Ok(())
    }

    /// Top active players of the team by overall rating, best first.
    pub fn suggest_lineup(&self, team_id: &TeamId) -> Result<ArrayVec<UserId, MAX_LINEUP_SIZE>> {
        let stats = StatsRepo::new(self.ctx);
        let candidates = TeamsRepo::new(self.ctx)
            .list_members_for_team(team_id)?
            .into_iter()
            .filter(|m| m.role == Role::Player)
            .map(|m| -> Result<_> {
                let averages = stats.player_averages(&m.user_id)?;
                Ok((m.user_id, averages))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(suggest_lineup(&candidates))
    }

    fn store(&self, mut lineup: Lineup) -> Result<Lineup> {
        lineup.updated_at = self.ctx.now();
        let id = lineup.id.clone();
        let replacement = lineup.clone();
        self.ctx
            .table::<Lineup>()
            .update(id.as_str(), move |stored| *stored = replacement)?
            .ok_or_else(|| HuddleError::not_found("lineup", &id))?;
        Ok(lineup)
    }
}

fn lineup_error(error: LineupError) -> HuddleError {
    HuddleError::validation("selected_players", error.to_string())
}
