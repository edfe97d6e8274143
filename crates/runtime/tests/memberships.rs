mod common;

use chrono::Duration;
use huddle_core::{
    MembershipUpdate, NewInvitation, NewMembership, NewRegistrationKey, Position, Role,
};
use huddle_runtime::HuddleError;

use common::{huddle, join, team, user};

#[test]
fn duplicate_membership_until_archived() {
    let (huddle, _clock) = huddle();
    let coach = user(&huddle, "coach", Role::Coach);
    let player = user(&huddle, "guard", Role::Player);
    let hawks = team(&huddle, "Hawks", &coach);
    let teams = huddle.teams();

    teams
        .add_member(&hawks.id, &player.id, NewMembership::default())
        .expect("first membership");

    let second = teams.add_member(&hawks.id, &player.id, NewMembership::default());
    assert!(matches!(
        second,
        Err(HuddleError::DuplicateMembership { .. })
    ));

    let archived = teams.archive_member(&hawks.id, &player.id).unwrap();
    assert!(!archived.is_active);
    assert!(archived.left_at.is_some());
    assert!(teams.list_members_for_team(&hawks.id).unwrap().is_empty());

    teams
        .add_member(&hawks.id, &player.id, NewMembership::default())
        .expect("rejoining after archive");
    assert_eq!(teams.list_members_for_team(&hawks.id).unwrap().len(), 1);
}

#[test]
fn roster_joins_users_in_jersey_order() {
    let (huddle, _clock) = huddle();
    let coach = user(&huddle, "coach", Role::Coach);
    let hawks = team(&huddle, "Hawks", &coach);
    let teams = huddle.teams();

    for (name, jersey) in [("forward", Some(23)), ("bench", None), ("guard", Some(3))] {
        let player = user(&huddle, name, Role::Player);
        teams
            .add_member(
                &hawks.id,
                &player.id,
                NewMembership {
                    role: Role::Player,
                    jersey_number: jersey,
                    position: Some(Position::PointGuard),
                },
            )
            .unwrap();
    }

    let roster: Vec<_> = teams
        .roster_for_team(&hawks.id)
        .unwrap()
        .into_iter()
        .map(|entry| entry.user.username)
        .collect();
    assert_eq!(roster, ["guard", "forward", "bench"]);

    let guard = huddle.users().get_user_by_username("GUARD").unwrap().unwrap();
    let updated = teams
        .update_member(
            &hawks.id,
            &guard.id,
            MembershipUpdate {
                jersey_number: Some(0),
                ..MembershipUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.jersey_number, Some(0));
}

#[test]
fn teams_for_user_skip_archived_teams() {
    let (huddle, _clock) = huddle();
    let coach = user(&huddle, "coach", Role::Coach);
    let player = user(&huddle, "guard", Role::Player);
    let hawks = team(&huddle, "Hawks", &coach);
    let owls = team(&huddle, "Owls", &coach);
    join(&huddle, &hawks, &player);
    join(&huddle, &owls, &player);

    huddle.teams().archive_team(&owls.id).unwrap();

    let teams = huddle.teams().list_teams_for_user(&player.id).unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].id, hawks.id);
    assert_eq!(huddle.teams().list_teams().unwrap().len(), 1);
}

/// Registration key with a single use.
///
/// 1. Coach issues the key
/// 2. First player redeems it and joins
/// 3. The key is spent; a second player is turned away
#[test]
fn single_use_key_admits_one_player() {
    let (huddle, _clock) = huddle();
    let coach = user(&huddle, "coach", Role::Coach);
    let first = user(&huddle, "first", Role::Player);
    let second = user(&huddle, "second", Role::Player);
    let hawks = team(&huddle, "Hawks", &coach);
    let keys = huddle.keys();

    let key = keys
        .create_key(
            NewRegistrationKey {
                team_id: hawks.id.clone(),
                role: Role::Player,
                max_uses: 1,
                valid_for: Duration::days(7),
            },
            &coach.id,
        )
        .unwrap();
    assert!(keys.validate_key(&key.code).unwrap());

    let membership = keys
        .redeem_key(&key.code.to_lowercase(), &first.id)
        .expect("first redemption");
    assert_eq!(membership.team_id, hawks.id);
    assert_eq!(membership.role, Role::Player);
    assert_eq!(huddle.teams().list_members_for_team(&hawks.id).unwrap().len(), 1);

    let spent = keys.get_key_by_code(&key.code).unwrap().unwrap();
    assert_eq!(spent.uses_remaining, 0);
    assert!(!spent.is_active);
    assert!(!keys.validate_key(&key.code).unwrap());

    let denied = keys.redeem_key(&key.code, &second.id);
    assert!(matches!(
        denied,
        Err(HuddleError::InvalidOrExpiredKey { .. })
    ));
    assert_eq!(huddle.teams().list_members_for_team(&hawks.id).unwrap().len(), 1);
}

#[test]
fn existing_member_does_not_spend_a_use() {
    let (huddle, _clock) = huddle();
    let coach = user(&huddle, "coach", Role::Coach);
    let player = user(&huddle, "guard", Role::Player);
    let hawks = team(&huddle, "Hawks", &coach);
    join(&huddle, &hawks, &player);

    let key = huddle
        .keys()
        .create_key(
            NewRegistrationKey {
                team_id: hawks.id.clone(),
                role: Role::Player,
                max_uses: 2,
                valid_for: Duration::days(1),
            },
            &coach.id,
        )
        .unwrap();

    let result = huddle.keys().redeem_key(&key.code, &player.id);
    assert!(matches!(
        result,
        Err(HuddleError::DuplicateMembership { .. })
    ));
    let key = huddle.keys().get_key_by_code(&key.code).unwrap().unwrap();
    assert_eq!(key.uses_remaining, 2);
}

#[test]
fn expired_and_deactivated_keys_are_invalid() {
    let (huddle, clock) = huddle();
    let coach = user(&huddle, "coach", Role::Coach);
    let hawks = team(&huddle, "Hawks", &coach);
    let new_key = || NewRegistrationKey {
        team_id: hawks.id.clone(),
        role: Role::Parent,
        max_uses: 5,
        valid_for: Duration::hours(2),
    };

    let expiring = huddle.keys().create_key(new_key(), &coach.id).unwrap();
    let revoked = huddle.keys().create_key(new_key(), &coach.id).unwrap();
    assert_ne!(expiring.code, revoked.code);

    huddle.keys().deactivate_key(&revoked.id).unwrap();
    assert!(!huddle.keys().validate_key(&revoked.code).unwrap());

    assert!(huddle.keys().validate_key(&expiring.code).unwrap());
    clock.advance(Duration::hours(2));
    assert!(!huddle.keys().validate_key(&expiring.code).unwrap());

    assert!(!huddle.keys().validate_key("NOPE1234").unwrap());
    assert_eq!(huddle.keys().list_keys_for_team(&hawks.id).unwrap().len(), 2);
}

#[test]
fn invitations_are_single_use() {
    let (huddle, clock) = huddle();
    let coach = user(&huddle, "coach", Role::Coach);
    let parent = user(&huddle, "parent", Role::Parent);
    let other = user(&huddle, "other", Role::Parent);
    let hawks = team(&huddle, "Hawks", &coach);
    let invitations = huddle.invitations();

    let invitation = invitations
        .create_invitation(
            NewInvitation {
                team_id: hawks.id.clone(),
                email: "parent@example.com".to_owned(),
                role: Role::Parent,
                valid_for: Duration::days(3),
            },
            &coach.id,
        )
        .unwrap();

    let membership = invitations
        .accept_invitation(&invitation.code, &parent.id)
        .unwrap();
    assert_eq!(membership.role, Role::Parent);

    let reused = invitations.accept_invitation(&invitation.code, &other.id);
    assert!(matches!(
        reused,
        Err(HuddleError::InvalidOrExpiredKey { .. })
    ));

    let late = invitations
        .create_invitation(
            NewInvitation {
                team_id: hawks.id.clone(),
                email: "other@example.com".to_owned(),
                role: Role::Parent,
                valid_for: Duration::days(1),
            },
            &coach.id,
        )
        .unwrap();
    clock.advance(Duration::days(2));
    assert!(matches!(
        invitations.accept_invitation(&late.code, &other.id),
        Err(HuddleError::InvalidOrExpiredKey { .. })
    ));

    let revoked = invitations.revoke_invitation(&late.id).unwrap();
    assert!(matches!(
        invitations.revoke_invitation(&revoked.id),
        Err(HuddleError::StateConflict(_))
    ));
}

#[test]
fn unrepresentable_or_empty_lifetimes_are_rejected() {
    let (huddle, _clock) = huddle();
    let coach = user(&huddle, "coach", Role::Coach);
    let hawks = team(&huddle, "Hawks", &coach);

    let key = huddle.keys().create_key(
        NewRegistrationKey {
            team_id: hawks.id.clone(),
            role: Role::Parent,
            max_uses: 1,
            valid_for: Duration::MAX,
        },
        &coach.id,
    );
    assert!(matches!(
        key,
        Err(HuddleError::Validation { field: "valid_for", .. })
    ));

    let invite = |valid_for: Duration| {
        huddle.invitations().create_invitation(
            NewInvitation {
                team_id: hawks.id.clone(),
                email: "parent@example.com".to_owned(),
                role: Role::Parent,
                valid_for,
            },
            &coach.id,
        )
    };
    for valid_for in [Duration::MAX, Duration::zero(), Duration::hours(-1)] {
        assert!(matches!(
            invite(valid_for),
            Err(HuddleError::Validation { field: "valid_for", .. })
        ));
    }

    assert!(huddle.keys().list_keys_for_team(&hawks.id).unwrap().is_empty());
    assert!(
        huddle
            .invitations()
            .list_invitations_for_team(&hawks.id)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn users_authenticate_while_active() {
    let (huddle, _clock) = huddle();
    let player = user(&huddle, "Guard", Role::Player);
    let users = huddle.users();

    assert!(users.authenticate("guard", "secret").unwrap().is_some());
    assert!(users.authenticate("guard", "wrong").unwrap().is_none());
    assert!(huddle.profiles().get_profile_by_user(&player.id).unwrap().is_some());

    let taken = users.create_user(huddle_core::NewUser {
        username: "GUARD".to_owned(),
        email: "x@example.com".to_owned(),
        password: "pw".to_owned(),
        role: Role::Player,
    });
    assert!(matches!(
        taken,
        Err(HuddleError::Validation {
            field: "username",
            ..
        })
    ));

    users.deactivate_user(&player.id).unwrap();
    assert!(users.authenticate("guard", "secret").unwrap().is_none());
}
