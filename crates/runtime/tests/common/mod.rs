#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use huddle_core::{
    Event, EventType, FixedClock, NewEvent, NewMembership, NewTeam, NewUser, Role, Team, TeamId,
    Timestamp, User,
};
use huddle_runtime::{Huddle, InMemoryRecordStore, RecordStore};

pub fn season_start() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap()
}

/// In-memory huddle on a clock frozen at [`season_start`].
pub fn huddle() -> (Huddle, Arc<FixedClock>) {
    huddle_on(Arc::new(InMemoryRecordStore::new()))
}

pub fn huddle_on(store: Arc<dyn RecordStore>) -> (Huddle, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(season_start()));
    let huddle = Huddle::with_clock(store, clock.clone());
    (huddle, clock)
}

pub fn user(huddle: &Huddle, username: &str, role: Role) -> User {
    huddle
        .users()
        .create_user(NewUser {
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            password: "secret".to_owned(),
            role,
        })
        .expect("user should be created")
}

pub fn team(huddle: &Huddle, name: &str, owner: &User) -> Team {
    huddle
        .teams()
        .create_team(
            NewTeam {
                name: name.to_owned(),
                ..NewTeam::default()
            },
            &owner.id,
        )
        .expect("team should be created")
}

pub fn join(huddle: &Huddle, team: &Team, user: &User) {
    huddle
        .teams()
        .add_member(
            &team.id,
            &user.id,
            NewMembership {
                role: user.role,
                ..NewMembership::default()
            },
        )
        .expect("member should be added");
}

/// A game `days` after season start.
pub fn game(
    huddle: &Huddle,
    home: &TeamId,
    opponent: Option<&TeamId>,
    days: i64,
    by: &User,
) -> Event {
    huddle
        .events()
        .create_event(
            NewEvent {
                team_id: home.clone(),
                opponent_team_id: opponent.cloned(),
                title: "League game".to_owned(),
                event_date: Some(season_start() + Duration::days(days)),
                location: Some("Main gym".to_owned()),
                event_type: EventType::Game,
                ..NewEvent::default()
            },
            &by.id,
        )
        .expect("game should be created")
}
