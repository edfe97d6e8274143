use huddle_core::{
    Availability, ConfirmationAction, ConfirmationState, ConfirmationStatus, Event, EventId,
    EventUpdate, GameConfirmation, GameDetails, NewEvent, TeamId, TeamMembership, UserId,
};

use super::{Ctx, require};
use crate::error::{HuddleError, Result};

/// Calendar events and the cross-team game confirmation workflow.
///
/// A game against another team starts pending and is only visible to the
/// opponent once confirmed. Declining deletes the game outright.
pub struct EventsRepo<'a> {
    ctx: Ctx<'a>,
}

impl<'a> EventsRepo<'a> {
    pub(crate) fn new(ctx: Ctx<'a>) -> Self {
        Self { ctx }
    }

    /// Create an event. Games with an opponent also get a pending
    /// confirmation request addressed to the opponent.
    pub fn create_event(&self, new: NewEvent, created_by: &UserId) -> Result<Event> {
        require("title", &new.title)?;
        if new.team_id.is_empty() {
            return Err(HuddleError::validation("team_id", "must not be empty"));
        }
        let Some(event_date) = new.event_date else {
            return Err(HuddleError::validation("event_date", "is required"));
        };
        let opponent_team_id = new.opponent_team_id.filter(|id| !id.is_empty());
        if opponent_team_id.as_ref() == Some(&new.team_id) {
            return Err(HuddleError::validation(
                "opponent_team_id",
                "a team cannot play itself",
            ));
        }

        let state = ConfirmationState::initial(new.event_type, opponent_team_id.as_ref());
        let pending = state == ConfirmationState::PendingConfirmation;
        let now = self.ctx.now();

        let event = Event {
            id: self.ctx.next_id()?,
            team_id: new.team_id,
            opponent_team_id,
            title: new.title.trim().to_owned(),
            description: new.description,
            event_date,
            location: new.location,
            event_type: new.event_type,
            is_confirmed: !pending,
            pending_confirmation: pending,
            confirmed_by: None,
            confirmed_at: None,
            created_by: created_by.clone(),
            created_at: now,
            updated_at: now,
        };

        let request = match (&state, &event.opponent_team_id) {
            (ConfirmationState::PendingConfirmation, Some(target)) => Some(GameConfirmation {
                id: self.ctx.next_id()?,
                game_id: event.id.clone(),
                requesting_team_id: event.team_id.clone(),
                target_team_id: target.clone(),
                status: ConfirmationStatus::Pending,
                game_details: details_of(&event),
                requested_by: created_by.clone(),
                responded_by: None,
                responded_at: None,
                created_at: now,
            }),
            _ => None,
        };

        // Event before request.
        let event = self.ctx.table::<Event>().insert(event)?;
        if let Some(request) = request {
            self.ctx.table::<GameConfirmation>().insert(request)?;
            tracing::info!(
                "Game '{}' awaits confirmation from team '{}'",
                event.id,
                event.opponent_team_id.as_ref().map_or("", |id| id.as_str())
            );
        }

        Ok(event)
    }

    pub fn get_event_by_id(&self, id: &EventId) -> Result<Option<Event>> {
        Ok(self.ctx.table::<Event>().get(id.as_str())?)
    }

    /// The team's own events plus confirmed games it is the opponent in,
    /// ordered by date.
    pub fn list_events_for_team(&self, team_id: &TeamId) -> Result<Vec<Event>> {
        let mut events = self
            .ctx
            .table::<Event>()
            .find(|e| visible_to(e, team_id))?;
        events.sort_by(|a, b| a.event_date.cmp(&b.event_date));
        Ok(events)
    }

    /// Events from now on across every team the user actively belongs to.
    pub fn list_upcoming_for_user(&self, user_id: &UserId) -> Result<Vec<Event>> {
        let team_ids: Vec<TeamId> = self
            .ctx
            .table::<TeamMembership>()
            .find(|m| m.is_active && &m.user_id == user_id)?
            .into_iter()
            .map(|m| m.team_id)
            .collect();
        let now = self.ctx.now();

        let mut events = self
            .ctx
            .table::<Event>()
            .find(|e| e.event_date >= now && team_ids.iter().any(|team| visible_to(e, team)))?;
        events.sort_by(|a, b| a.event_date.cmp(&b.event_date));
        Ok(events)
    }

    /// Edit an event. A pending request carries the new details along.
    pub fn update_event(&self, id: &EventId, update: EventUpdate) -> Result<Event> {
        if let Some(title) = &update.title {
            require("title", title)?;
        }

        let now = self.ctx.now();
        let event = self
            .ctx
            .table::<Event>()
            .update(id.as_str(), |event| event.apply(update, now))?
            .ok_or_else(|| HuddleError::not_found("event", id))?;

        if event.pending_confirmation {
            let details = details_of(&event);
            let confirmations = self.ctx.table::<GameConfirmation>();
            let mut requests = confirmations.load()?;
            let mut touched = false;
            for request in requests
                .iter_mut()
                .filter(|r| r.game_id == event.id && r.status == ConfirmationStatus::Pending)
            {
                request.game_details = details.clone();
                touched = true;
            }
            if touched {
                confirmations.save(&requests)?;
            }
        }

        Ok(event)
    }

    /// Delete an event with its availability answers and any pending
    /// confirmation request.
    pub fn delete_event(&self, id: &EventId) -> Result<()> {
        if !self.ctx.table::<Event>().remove(id.as_str())? {
            return Err(HuddleError::not_found("event", id));
        }

        self.ctx
            .table::<Availability>()
            .retain(|a| &a.event_id != id)?;
        self.ctx
            .table::<GameConfirmation>()
            .retain(|r| !(&r.game_id == id && r.status == ConfirmationStatus::Pending))?;

        tracing::info!("Deleted event '{}'", id);
        Ok(())
    }

    /// Where a game stands in the confirmation workflow.
    ///
    /// Declined games no longer exist as events; their declined request is
    /// what reports the state. `None` means the id is unknown.
    pub fn confirmation_state(&self, game_id: &EventId) -> Result<Option<ConfirmationState>> {
        if let Some(event) = self.get_event_by_id(game_id)? {
            return Ok(Some(ConfirmationState::of_event(&event)));
        }

        let declined = self
            .ctx
            .table::<GameConfirmation>()
            .find_one(|r| &r.game_id == game_id && r.status == ConfirmationStatus::Declined)?;
        Ok(declined.map(|_| ConfirmationState::Declined))
    }

    /// Opponent accepts the game; it becomes visible on both calendars.
    pub fn confirm_game(&self, game_id: &EventId, responder: &UserId) -> Result<Event> {
        self.transition(game_id, ConfirmationAction::Confirm)?;
        let now = self.ctx.now();

        let event = self
            .ctx
            .table::<Event>()
            .update(game_id.as_str(), |event| {
                event.mark_confirmed(responder.clone(), now);
            })?
            .ok_or_else(|| HuddleError::not_found("event", game_id))?;
        self.respond(game_id, ConfirmationStatus::Confirmed, responder)?;

        tracing::info!("Game '{}' confirmed by '{}'", game_id, responder);
        Ok(event)
    }

    /// Opponent rejects the game; the event and its availability answers
    /// are deleted. The declined request remains as the record of it.
    pub fn decline_game(&self, game_id: &EventId, responder: &UserId) -> Result<()> {
        self.transition(game_id, ConfirmationAction::Decline)?;

        self.respond(game_id, ConfirmationStatus::Declined, responder)?;
        self.ctx.table::<Event>().remove(game_id.as_str())?;
        self.ctx
            .table::<Availability>()
            .retain(|a| &a.event_id != game_id)?;

        tracing::info!("Game '{}' declined by '{}'", game_id, responder);
        Ok(())
    }

    /// Requests addressed to the team that still await an answer.
    pub fn list_pending_confirmations_for_team(
        &self,
        team_id: &TeamId,
    ) -> Result<Vec<GameConfirmation>> {
        let mut requests = self.ctx.table::<GameConfirmation>().find(|r| {
            &r.target_team_id == team_id && r.status == ConfirmationStatus::Pending
        })?;
        requests.sort_by(|a, b| a.game_details.event_date.cmp(&b.game_details.event_date));
        Ok(requests)
    }

    fn transition(&self, game_id: &EventId, action: ConfirmationAction) -> Result<()> {
        let state = self
            .confirmation_state(game_id)?
            .ok_or_else(|| HuddleError::not_found("event", game_id))?;
        state.apply(action)?;
        Ok(())
    }

    /// Record the answer on the game's pending request, if it has one.
    fn respond(
        &self,
        game_id: &EventId,
        status: ConfirmationStatus,
        responder: &UserId,
    ) -> Result<Option<GameConfirmation>> {
        let table = self.ctx.table::<GameConfirmation>();
        let mut requests = table.load()?;
        let now = self.ctx.now();

        let Some(request) = requests
            .iter_mut()
            .find(|r| &r.game_id == game_id && r.status == ConfirmationStatus::Pending)
        else {
            tracing::warn!("Game '{}' has no pending confirmation request", game_id);
            return Ok(None);
        };
        request.respond(status, responder.clone(), now);
        let request = request.clone();

        table.save(&requests)?;
        Ok(Some(request))
    }
}

/// Own events, or confirmed games where the team is the opponent.
fn visible_to(event: &Event, team_id: &TeamId) -> bool {
    &event.team_id == team_id
        || (event.is_confirmed && event.opponent_team_id.as_ref() == Some(team_id))
}

fn details_of(event: &Event) -> GameDetails {
    GameDetails {
        title: event.title.clone(),
        event_date: event.event_date,
        location: event.location.clone(),
    }
}
