mod common;

use std::collections::HashSet;

use chrono::DateTime;
use common::{Harness, StubProfiles, user};
use tether_types::models::{FriendshipStatus, RequestDirection, RequestSource};

#[test]
fn friend_list_survives_profile_failures() {
    let (a, b, c) = (user(), user(), user());
    let h = Harness::with_profiles(StubProfiles {
        missing: HashSet::from([c]),
        ..Default::default()
    });
    h.befriend(a, b);
    h.befriend(c, a);

    let friends = h.queries.friend_list(a, None).unwrap().friends;
    assert_eq!(friends.len(), 2);

    let with_b = friends.iter().find(|f| f.friendship.peer == b).unwrap();
    assert_eq!(with_b.profile.as_ref().unwrap().user_id, b);

    let with_c = friends.iter().find(|f| f.friendship.peer == c).unwrap();
    assert!(with_c.profile.is_none());
}

#[test]
fn since_filter_returns_only_newer_rows() {
    let h = Harness::new();
    let (a, b, c) = (user(), user(), user());
    h.befriend(a, b);
    let checkpoint = h.queries.friend_list(a, None).unwrap().synced_at;
    assert_eq!(
        checkpoint,
        h.db.get_friendship(a, b).unwrap().unwrap().updated_at
    );

    // Stamps are strictly increasing, even within one millisecond
    h.befriend(a, c);
    h.engine.remove_friend(b, a).unwrap();

    let delta = h.queries.friend_list(a, Some(checkpoint)).unwrap();
    let mut seen: Vec<_> = delta
        .friends
        .iter()
        .map(|f| (f.friendship.peer, f.friendship.status))
        .collect();
    seen.sort_by_key(|(peer, _)| *peer);
    let mut expected = vec![(b, FriendshipStatus::Removed), (c, FriendshipStatus::Active)];
    expected.sort_by_key(|(peer, _)| *peer);
    assert_eq!(seen, expected);
    assert!(delta.synced_at > checkpoint);

    // Nothing changed since the delta
    let again = h.queries.friend_list(a, Some(delta.synced_at)).unwrap();
    assert!(again.friends.is_empty());
    assert_eq!(again.synced_at, delta.synced_at);

    let full = h.queries.friend_list(a, None).unwrap().friends;
    assert_eq!(full.len(), 1);
    assert_eq!(full[0].friendship.peer, c);

    let epoch = DateTime::from_timestamp_millis(0).unwrap();
    assert_eq!(h.queries.friend_list(a, Some(epoch)).unwrap().friends.len(), 2);
}

#[test]
fn remark_and_refriend_show_up_in_next_delta() {
    let h = Harness::new();
    let (a, b) = (user(), user());
    h.befriend(a, b);
    let token = h.queries.friend_list(a, None).unwrap().synced_at;

    h.engine.update_remark(a, b, "climbing partner").unwrap();
    let delta = h.queries.friend_list(a, Some(token)).unwrap();
    assert_eq!(delta.friends.len(), 1);
    assert_eq!(delta.friends[0].friendship.remark, "climbing partner");

    h.engine.remove_friend(a, b).unwrap();
    h.befriend(b, a);
    let delta = h.queries.friend_list(a, Some(delta.synced_at)).unwrap();
    assert_eq!(delta.friends.len(), 1);
    assert_eq!(delta.friends[0].friendship.status, FriendshipStatus::Active);
    assert_eq!(delta.friends[0].friendship.remark, "");
}

#[test]
fn request_lists_attach_counterparty_profile() {
    let h = Harness::new();
    let (a, b, c) = (user(), user(), user());
    h.engine.send_request(a, b, "hi b", RequestSource::Search).unwrap();
    h.engine.send_request(a, c, "hi c", RequestSource::Contacts).unwrap();
    h.engine.send_request(c, b, "", RequestSource::Group).unwrap();

    let sent = h.queries.requests(a, RequestDirection::Sent).unwrap();
    assert_eq!(sent.len(), 2);
    for view in &sent {
        assert_eq!(view.profile.as_ref().unwrap().user_id, view.request.to_user);
    }

    let received = h.queries.requests(b, RequestDirection::Received).unwrap();
    let senders: HashSet<_> = received
        .iter()
        .map(|v| v.profile.as_ref().unwrap().user_id)
        .collect();
    assert_eq!(senders, HashSet::from([a, c]));
}

#[test]
fn block_list_resolves_each_user_once() {
    let (a, b, c) = (user(), user(), user());
    let h = Harness::with_profiles(StubProfiles {
        missing: HashSet::from([b]),
        ..Default::default()
    });
    h.engine.block(a, b).unwrap();
    h.engine.block(a, c).unwrap();

    let blocks = h.queries.block_list(a).unwrap();
    assert_eq!(blocks.len(), 2);
    assert!(blocks.iter().any(|v| v.entry.blocked == b && v.profile.is_none()));
    assert!(blocks.iter().any(|v| v.entry.blocked == c && v.profile.is_some()));
    assert_eq!(*h.profiles.calls.lock().unwrap(), 2);

    assert!(h.queries.block_list(b).unwrap().is_empty());
}
