use huddle_core::{Availability, AvailabilityStatus, Event, EventId, UserId};
use serde::{Deserialize, Serialize};

use super::Ctx;
use crate::error::{HuddleError, Result};

/// Answer counts for one event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySummary {
    pub available: usize,
    pub maybe: usize,
    pub unavailable: usize,
}

impl AvailabilitySummary {
    pub fn total(&self) -> usize {
        self.available + self.maybe + self.unavailable
    }
}

/// Per-event attendance answers, one per (event, user).
pub struct AvailabilityRepo<'a> {
    ctx: Ctx<'a>,
}

impl<'a> AvailabilityRepo<'a> {
    pub(crate) fn new(ctx: Ctx<'a>) -> Self {
        Self { ctx }
    }

    /// Record the user's answer, replacing any earlier one.
    pub fn set_availability(
        &self,
        event_id: &EventId,
        user_id: &UserId,
        status: AvailabilityStatus,
        note: Option<String>,
    ) -> Result<Availability> {
        if self.ctx.table::<Event>().get(event_id.as_str())?.is_none() {
            return Err(HuddleError::not_found("event", event_id));
        }

        let table = self.ctx.table::<Availability>();
        let mut answers = table.load()?;
        answers.retain(|a| !(&a.event_id == event_id && &a.user_id == user_id));

        let answer = Availability {
            id: self.ctx.next_id()?,
            event_id: event_id.clone(),
            user_id: user_id.clone(),
            status,
            note: note.filter(|n| !n.trim().is_empty()),
            updated_at: self.ctx.now(),
        };
        answers.push(answer.clone());
        table.save(&answers)?;

        Ok(answer)
    }

    pub fn get_availability(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<Option<Availability>> {
        Ok(self
            .ctx
            .table::<Availability>()
            .find_one(|a| &a.event_id == event_id && &a.user_id == user_id)?)
    }

    pub fn list_availability_for_event(&self, event_id: &EventId) -> Result<Vec<Availability>> {
        Ok(self
            .ctx
            .table::<Availability>()
            .find(|a| &a.event_id == event_id)?)
    }

    pub fn availability_summary(&self, event_id: &EventId) -> Result<AvailabilitySummary> {
        let summary = self
            .list_availability_for_event(event_id)?
            .iter()
            .fold(AvailabilitySummary::default(), |mut summary, answer| {
                match answer.status {
                    AvailabilityStatus::Available => summary.available += 1,
                    AvailabilityStatus::Maybe => summary.maybe += 1,
                    AvailabilityStatus::Unavailable => summary.unavailable += 1,
                }
                summary
            });
        Ok(summary)
    }
}
