use std::collections::BTreeSet;

use huddle_core::{MessageReadStatus, NewNote, Note, NoteId, TeamId, UserId};

use super::{Ctx, require};
use crate::error::{HuddleError, Result};

/// Notes and direct messages, with per-user read receipts.
pub struct NotesRepo<'a> {
    ctx: Ctx<'a>,
}

impl<'a> NotesRepo<'a> {
    pub(crate) fn new(ctx: Ctx<'a>) -> Self {
        Self { ctx }
    }

    pub fn send_note(&self, new: NewNote) -> Result<Note> {
        require("content", &new.content)?;
        if new.author_id.is_empty() {
            return Err(HuddleError::validation("author_id", "must not be empty"));
        }
        if new.recipient_id.is_empty() {
            return Err(HuddleError::validation("recipient_id", "must not be empty"));
        }

        let now = self.ctx.now();
        let note = Note {
            id: self.ctx.next_id()?,
            author_id: new.author_id,
            recipient_id: new.recipient_id,
            team_id: new.team_id,
            content: new.content,
            note_type: new.note_type,
            created_at: now,
            updated_at: now,
        };
        Ok(self.ctx.table::<Note>().insert(note)?)
    }

    pub fn get_note_by_id(&self, id: &NoteId) -> Result<Option<Note>> {
        Ok(self.ctx.table::<Note>().get(id.as_str())?)
    }

    /// Newest first.
    pub fn list_notes_for_recipient(&self, user_id: &UserId) -> Result<Vec<Note>> {
        self.newest_first(|n| &n.recipient_id == user_id)
    }

    /// Newest first.
    pub fn list_notes_by_author(&self, user_id: &UserId) -> Result<Vec<Note>> {
        self.newest_first(|n| &n.author_id == user_id)
    }

    /// Newest first.
    pub fn list_notes_for_team(&self, team_id: &TeamId) -> Result<Vec<Note>> {
        self.newest_first(|n| n.team_id.as_ref() == Some(team_id))
    }

    /// Messages between two users in either direction, oldest first.
    pub fn conversation(&self, a: &UserId, b: &UserId) -> Result<Vec<Note>> {
        let mut notes = self.ctx.table::<Note>().find(|n| n.is_between(a, b))?;
        notes.sort_by(|x, y| x.created_at.cmp(&y.created_at));
        Ok(notes)
    }

    pub fn update_note(&self, id: &NoteId, content: &str) -> Result<Note> {
        require("content", content)?;
        let now = self.ctx.now();
        self.ctx
            .table::<Note>()
            .update(id.as_str(), |note| {
                note.content = content.to_owned();
                note.updated_at = now;
            })?
            .ok_or_else(|| HuddleError::not_found("note", id))
    }

    /// Delete a note and its read receipts.
    pub fn delete_note(&self, id: &NoteId) -> Result<()> {
        if !self.ctx.table::<Note>().remove(id.as_str())? {
            return Err(HuddleError::not_found("note", id));
        }
        self.ctx
            .table::<MessageReadStatus>()
            .retain(|r| &r.note_id != id)?;
        Ok(())
    }

    /// Record that `user_id` has read the note. Repeated calls keep the
    /// first receipt.
    pub fn mark_read(&self, note_id: &NoteId, user_id: &UserId) -> Result<MessageReadStatus> {
        if self.get_note_by_id(note_id)?.is_none() {
            return Err(HuddleError::not_found("note", note_id));
        }

        let table = self.ctx.table::<MessageReadStatus>();
        let mut receipts = table.load()?;
        if let Some(existing) = receipts
            .iter()
            .find(|r| &r.note_id == note_id && &r.user_id == user_id)
        {
            return Ok(existing.clone());
        }

        let receipt = MessageReadStatus {
            id: self.ctx.next_id()?,
            note_id: note_id.clone(),
            user_id: user_id.clone(),
            read_at: self.ctx.now(),
        };
        receipts.push(receipt.clone());
        table.save(&receipts)?;
        Ok(receipt)
    }

    pub fn is_read(&self, note_id: &NoteId, user_id: &UserId) -> Result<bool> {
        Ok(self
            .ctx
            .table::<MessageReadStatus>()
            .find_one(|r| &r.note_id == note_id && &r.user_id == user_id)?
            .is_some())
    }

    /// Notes addressed to `user_id` that they have not read.
    pub fn unread_count(&self, user_id: &UserId) -> Result<usize> {
        let read: BTreeSet<NoteId> = self
            .ctx
            .table::<MessageReadStatus>()
            .find(|r| &r.user_id == user_id)?
            .into_iter()
            .map(|r| r.note_id)
            .collect();

        Ok(self
            .ctx
            .table::<Note>()
            .find(|n| &n.recipient_id == user_id && !read.contains(&n.id))?
            .len())
    }

    fn newest_first(&self, predicate: impl FnMut(&Note) -> bool) -> Result<Vec<Note>> {
        let mut notes = self.ctx.table::<Note>().find(predicate)?;
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }
}
