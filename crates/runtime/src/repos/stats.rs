use std::collections::BTreeSet;

use huddle_core::{
    Averages, CacheDrift, ConfirmationState, Event, EventId, EventType, GameStat, SeasonStats,
    SeasonTotals, StatLine, TeamGameStat, TeamId, TeamSeasonStats, UserId, player_averages,
    season_totals, team_cache_drift, team_season_averages,
};

use super::Ctx;
use crate::error::{HuddleError, Result};

/// One player's line in a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerLine {
    pub player_id: UserId,
    pub line: StatLine,
}

/// Everything one team enters after a game.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameStatsSubmission {
    pub game_id: EventId,
    pub team_id: TeamId,
    pub lines: Vec<PlayerLine>,
    /// Final score; the sum of player points when absent.
    pub points_for: Option<u32>,
    pub points_against: Option<u32>,
}

/// Per-game stat rows, the season caches built from them, and the
/// aggregates derived from both.
pub struct StatsRepo<'a> {
    ctx: Ctx<'a>,
}

impl<'a> StatsRepo<'a> {
    pub(crate) fn new(ctx: Ctx<'a>) -> Self {
        Self { ctx }
    }

    /// Store a team's stats for a game, replacing whatever that team
    /// entered for the game before.
    ///
    /// The game must exist, be a game, and be confirmed (or need no
    /// confirmation). Season caches are incremented on every call, so a
    /// re-save counts the game twice there; the rows themselves do not.
    pub fn save_game_stats(&self, submission: GameStatsSubmission) -> Result<Vec<GameStat>> {
        let GameStatsSubmission {
            game_id,
            team_id,
            lines,
            points_for,
            points_against,
        } = submission;

        let event = self
            .ctx
            .table::<Event>()
            .get(game_id.as_str())?
            .ok_or_else(|| HuddleError::not_found("event", &game_id))?;
        check_accepts_stats(&event)?;
        if !event.involves(&team_id) {
            return Err(HuddleError::validation(
                "team_id",
                format!("team '{team_id}' did not play in game '{game_id}'"),
            ));
        }
        validate_lines(&lines)?;

        let team_line = lines
            .iter()
            .try_fold(StatLine::default(), |acc, entry| acc.checked_add(entry.line))
            .ok_or_else(|| overflow("the team's combined line"))?;
        let points_for = points_for.unwrap_or(team_line.points);

        // Every cache update is computed before anything is written, so an
        // overflow leaves rows and caches untouched.
        let player_seasons = self.bumped_player_seasons(&lines)?;
        let team_seasons =
            self.bumped_team_season(&team_id, team_line, points_for, points_against)?;

        let now = self.ctx.now();
        let rows = lines
            .iter()
            .map(|entry| -> Result<GameStat> {
                Ok(GameStat {
                    id: self.ctx.next_id()?,
                    game_id: game_id.clone(),
                    team_id: team_id.clone(),
                    player_id: entry.player_id.clone(),
                    line: entry.line,
                    created_at: now,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let stat_table = self.ctx.table::<GameStat>();
        let mut all_rows = stat_table.load()?;
        all_rows.retain(|row| !(row.game_id == game_id && row.team_id == team_id));
        all_rows.extend(rows.iter().cloned());
        stat_table.save(&all_rows)?;

        self.upsert_team_game(&game_id, &team_id, points_for, points_against)?;
        if !lines.is_empty() {
            self.ctx.table::<SeasonStats>().save(&player_seasons)?;
        }
        self.ctx.table::<TeamSeasonStats>().save(&team_seasons)?;

        tracing::info!(
            "Saved {} stat line(s) for team '{}' in game '{}'",
            rows.len(),
            team_id,
            game_id
        );
        Ok(rows)
    }

    pub fn list_game_stats_for_game(&self, game_id: &EventId) -> Result<Vec<GameStat>> {
        Ok(self
            .ctx
            .table::<GameStat>()
            .find(|row| &row.game_id == game_id)?)
    }

    pub fn list_game_stats_for_player(&self, player_id: &UserId) -> Result<Vec<GameStat>> {
        Ok(self
            .ctx
            .table::<GameStat>()
            .find(|row| &row.player_id == player_id)?)
    }

    pub fn list_team_game_stats(&self, team_id: &TeamId) -> Result<Vec<TeamGameStat>> {
        Ok(self
            .ctx
            .table::<TeamGameStat>()
            .find(|row| &row.team_id == team_id)?)
    }

    /// Averages recomputed from the player's game rows.
    pub fn player_averages(&self, player_id: &UserId) -> Result<Averages> {
        Ok(player_averages(&self.list_game_stats_for_player(player_id)?))
    }

    /// Totals recomputed from the player's game rows.
    pub fn player_season_totals(&self, player_id: &UserId) -> Result<SeasonTotals> {
        Ok(season_totals(&self.list_game_stats_for_player(player_id)?))
    }

    /// Averages read from the team's season cache.
    pub fn team_season_averages(&self, team_id: &TeamId) -> Result<Averages> {
        Ok(team_season_averages(self.team_season_stats(team_id)?.as_ref()))
    }

    pub fn season_stats_for_player(&self, player_id: &UserId) -> Result<Option<SeasonStats>> {
        Ok(self
            .ctx
            .table::<SeasonStats>()
            .find_one(|s| &s.player_id == player_id)?)
    }

    pub fn team_season_stats(&self, team_id: &TeamId) -> Result<Option<TeamSeasonStats>> {
        Ok(self
            .ctx
            .table::<TeamSeasonStats>()
            .find_one(|s| &s.team_id == team_id)?)
    }

    /// The team's season cache next to a recomputation from game rows.
    pub fn cache_drift_for_team(&self, team_id: &TeamId) -> Result<CacheDrift> {
        let cache = self.team_season_stats(team_id)?;
        let rows = self
            .ctx
            .table::<GameStat>()
            .find(|row| &row.team_id == team_id)?;
        let drift = team_cache_drift(team_id, cache.as_ref(), &rows);

        if !drift.is_consistent() {
            tracing::debug!(
                "Team '{}' season cache has {} game(s), rows have {}",
                team_id,
                drift.cached.games_played,
                drift.recomputed.games_played
            );
        }
        Ok(drift)
    }

    fn upsert_team_game(
        &self,
        game_id: &EventId,
        team_id: &TeamId,
        points_for: u32,
        points_against: Option<u32>,
    ) -> Result<()> {
        let table = self.ctx.table::<TeamGameStat>();
        let mut scores = table.load()?;
        let now = self.ctx.now();

        match scores
            .iter_mut()
            .find(|s| &s.game_id == game_id && &s.team_id == team_id)
        {
            Some(score) => {
                score.points_for = points_for;
                score.points_against = points_against;
            }
            None => scores.push(TeamGameStat {
                id: self.ctx.next_id()?,
                game_id: game_id.clone(),
                team_id: team_id.clone(),
                points_for,
                points_against,
                created_at: now,
            }),
        }

        table.save(&scores)?;
        Ok(())
    }

    /// Player season caches with `lines` counted once more.
    fn bumped_player_seasons(&self, lines: &[PlayerLine]) -> Result<Vec<SeasonStats>> {
        let mut seasons = self.ctx.table::<SeasonStats>().load()?;
        let now = self.ctx.now();

        for entry in lines {
            match seasons.iter_mut().find(|s| s.player_id == entry.player_id) {
                Some(season) => {
                    season.games_played = season
                        .games_played
                        .checked_add(1)
                        .ok_or_else(|| overflow("a player's games played"))?;
                    season.totals = season
                        .totals
                        .checked_add(entry.line)
                        .ok_or_else(|| overflow("a player's season totals"))?;
                    season.updated_at = now;
                }
                None => seasons.push(SeasonStats {
                    id: self.ctx.next_id()?,
                    player_id: entry.player_id.clone(),
                    games_played: 1,
                    totals: entry.line,
                    updated_at: now,
                }),
            }
        }

        Ok(seasons)
    }

    /// Team season caches with one more game for `team_id`.
    fn bumped_team_season(
        &self,
        team_id: &TeamId,
        line: StatLine,
        points_for: u32,
        points_against: Option<u32>,
    ) -> Result<Vec<TeamSeasonStats>> {
        let mut seasons = self.ctx.table::<TeamSeasonStats>().load()?;
        let now = self.ctx.now();

        let index = match seasons.iter().position(|s| &s.team_id == team_id) {
            Some(index) => index,
            None => {
                seasons.push(TeamSeasonStats {
                    id: self.ctx.next_id()?,
                    team_id: team_id.clone(),
                    games_played: 0,
                    wins: 0,
                    losses: 0,
                    points_against: 0,
                    totals: StatLine::default(),
                    updated_at: now,
                });
                seasons.len() - 1
            }
        };

        let season = &mut seasons[index];
        season.games_played = season
            .games_played
            .checked_add(1)
            .ok_or_else(|| overflow("the team's games played"))?;
        season.totals = season
            .totals
            .checked_add(line)
            .ok_or_else(|| overflow("the team's season totals"))?;
        season.updated_at = now;
        if let Some(against) = points_against {
            season.points_against = season
                .points_against
                .checked_add(against)
                .ok_or_else(|| overflow("the team's points against"))?;
            if points_for > against {
                season.wins += 1;
            } else if points_for < against {
                season.losses += 1;
            }
        }

        Ok(seasons)
    }
}

fn check_accepts_stats(event: &Event) -> Result<()> {
    match event.event_type {
        EventType::Game => {}
        EventType::Practice | EventType::Meeting | EventType::Other => {
            return Err(HuddleError::StateConflict(format!(
                "event '{}' is a {}, not a game",
                event.id, event.event_type
            )));
        }
    }

    let state = ConfirmationState::of_event(event);
    if !state.accepts_stats() {
        return Err(HuddleError::StateConflict(format!(
            "game '{}' is {state}; stats need a confirmed game",
            event.id
        )));
    }
    Ok(())
}

fn validate_lines(lines: &[PlayerLine]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for entry in lines {
        if entry.player_id.is_empty() {
            return Err(HuddleError::validation("player_id", "must not be empty"));
        }
        if !seen.insert(&entry.player_id) {
            return Err(HuddleError::validation(
                "player_id",
                format!("player '{}' appears twice", entry.player_id),
            ));
        }
        if !entry.line.shooting_is_consistent() {
            return Err(HuddleError::validation(
                "line",
                format!("player '{}' has more makes than attempts", entry.player_id),
            ));
        }
    }
    Ok(())
}

fn overflow(what: &str) -> HuddleError {
    HuddleError::validation("line", format!("{what} would overflow"))
}
