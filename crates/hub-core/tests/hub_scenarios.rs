// crates/hub-core/tests/hub_scenarios.rs
use hub_core::{
    ConnectionEvent, ConnectionId, Delivery, InboundEvent, OutboundEvent, RealtimeHub, RoomId,
    UserDescriptor,
};
use serde_json::json;

const A: ConnectionId = ConnectionId(1);
const B: ConnectionId = ConnectionId(2);
const C: ConnectionId = ConnectionId(3);

fn open(hub: &mut RealtimeHub, conn: ConnectionId) {
    let out = hub.process(conn, ConnectionEvent::Opened);
    assert!(out.is_empty());
}

fn send(
    hub: &mut RealtimeHub,
    conn: ConnectionId,
    name: &str,
    data: serde_json::Value,
) -> Vec<Delivery> {
    let event = InboundEvent::from_wire(name, data).expect("well-formed event");
    hub.process(conn, ConnectionEvent::Inbound(event))
}

fn join(hub: &mut RealtimeHub, conn: ConnectionId, project: &str, user: &str) -> Vec<Delivery> {
    send(
        hub,
        conn,
        "join_project",
        json!({ "projectId": project, "user": { "id": user } }),
    )
}

fn users(ids: &[&str]) -> OutboundEvent {
    OutboundEvent::UsersUpdated(ids.iter().map(|id| UserDescriptor::with_id(*id)).collect())
}

#[test]
fn join_broadcasts_roster_to_everyone_including_joiner() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    open(&mut hub, B);

    let out = join(&mut hub, A, "p1", "u1");
    assert_eq!(
        out,
        vec![Delivery {
            recipients: vec![A],
            event: users(&["u1"]),
        }]
    );

    let out = join(&mut hub, B, "p1", "u2");
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].recipients, vec![A, B]);
    assert_eq!(out[0].event, users(&["u1", "u2"]));
    assert_eq!(
        out[0].event.payload(),
        json!([{ "id": "u1" }, { "id": "u2" }])
    );
}

#[test]
fn disconnect_rebroadcasts_roster_to_remaining_members() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    open(&mut hub, B);
    join(&mut hub, A, "p1", "u1");
    join(&mut hub, B, "p1", "u2");

    let out = hub.process(A, ConnectionEvent::Closed);
    assert_eq!(
        out,
        vec![Delivery {
            recipients: vec![B],
            event: users(&["u2"]),
        }]
    );
    assert_eq!(hub.connection_count(), 1);
}

#[test]
fn task_moved_is_never_echoed_to_sender() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    open(&mut hub, B);
    open(&mut hub, C);
    join(&mut hub, A, "p1", "u1");
    join(&mut hub, B, "p1", "u2");
    join(&mut hub, C, "p1", "u3");

    let payload = json!({ "projectId": "p1", "taskId": "t1", "newStatus": "DONE" });
    let out = send(&mut hub, B, "task_moved", payload.clone());

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].recipients, vec![A, C]);
    assert_eq!(out[0].event, OutboundEvent::TaskUpdated(payload));
}

#[test]
fn new_comment_relays_payload_to_other_members() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    open(&mut hub, B);
    join(&mut hub, A, "p1", "u1");
    join(&mut hub, B, "p1", "u2");

    let payload = json!({
        "projectId": "p1",
        "taskId": "t1",
        "comment": { "id": "c1", "content": "looks good" }
    });
    let out = send(&mut hub, A, "new_comment", payload.clone());

    assert_eq!(
        out,
        vec![Delivery {
            recipients: vec![B],
            event: OutboundEvent::CommentReceived(payload),
        }]
    );
}

#[test]
fn relay_with_no_other_members_produces_nothing() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    join(&mut hub, A, "p1", "u1");

    let out = send(&mut hub, A, "task_moved", json!({ "projectId": "p1" }));
    assert!(out.is_empty());
}

#[test]
fn repeated_join_keeps_a_single_entry_per_connection() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    open(&mut hub, B);
    join(&mut hub, A, "p1", "u1");
    join(&mut hub, B, "p1", "u2");

    // Page refresh on the same socket re-sends join_project with a new name.
    let out = send(
        &mut hub,
        A,
        "join_project",
        json!({ "projectId": "p1", "user": { "id": "u1", "name": "Ann" } }),
    );

    let roster = hub.roster("p1");
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0].id, "u1");
    assert_eq!(roster[0].name.as_deref(), Some("Ann"));
    assert_eq!(out[0].recipients, vec![A, B]);
}

#[test]
fn same_user_in_two_tabs_appears_twice() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    open(&mut hub, B);
    join(&mut hub, A, "p1", "u1");
    let out = join(&mut hub, B, "p1", "u1");

    assert_eq!(out[0].event, users(&["u1", "u1"]));
}

#[test]
fn disconnect_cleans_every_joined_room_and_only_those() {
    let mut hub = RealtimeHub::new();
    for conn in [A, B, C] {
        open(&mut hub, conn);
    }
    join(&mut hub, A, "p1", "u1");
    join(&mut hub, A, "p2", "u1");
    join(&mut hub, A, "p3", "u1");
    join(&mut hub, B, "p1", "u2");
    join(&mut hub, B, "p2", "u2");
    join(&mut hub, C, "p4", "u3");

    let out = hub.process(A, ConnectionEvent::Closed);

    // p3 is now empty, so it gets no broadcast; p4 was never touched.
    let rooms_notified: Vec<_> = out
        .iter()
        .map(|d| (d.recipients.clone(), d.event.clone()))
        .collect();
    assert_eq!(
        rooms_notified,
        vec![
            (vec![B], users(&["u2"])),
            (vec![B], users(&["u2"])),
        ]
    );

    for project in ["p1", "p2", "p3"] {
        assert!(hub.roster(project).iter().all(|u| u.id != "u1"));
    }
    assert_eq!(hub.roster("p4"), vec![UserDescriptor::with_id("u3")]);
    assert!(hub.rooms_of(A).is_empty());
}

#[test]
fn events_do_not_cross_rooms() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    open(&mut hub, B);
    open(&mut hub, C);
    join(&mut hub, A, "p1", "u1");
    join(&mut hub, B, "p1", "u2");
    join(&mut hub, C, "p2", "u3");

    let out = send(&mut hub, A, "task_moved", json!({ "projectId": "p1" }));
    assert_eq!(out[0].recipients, vec![B]);

    let out = send(&mut hub, C, "task_moved", json!({ "projectId": "p2" }));
    assert!(out.is_empty());
}

#[test]
fn project_and_user_rooms_with_same_key_are_distinct() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    open(&mut hub, B);
    send(&mut hub, A, "authenticate", json!({ "email": "same" }));
    join(&mut hub, B, "same", "u2");

    let out = send(
        &mut hub,
        C,
        "notify_invite",
        json!({ "email": "same", "project": { "id": "p9" } }),
    );
    // C was never opened: dropped.
    assert!(out.is_empty());

    open(&mut hub, C);
    let out = send(
        &mut hub,
        C,
        "notify_invite",
        json!({ "email": "same", "project": { "id": "p9" } }),
    );
    assert_eq!(out[0].recipients, vec![A]);
}

#[test]
fn invite_reaches_only_authenticated_connections_of_that_email() {
    let mut hub = RealtimeHub::new();
    for conn in [A, B, C] {
        open(&mut hub, conn);
    }
    send(&mut hub, C, "authenticate", json!({ "email": "x@example.com" }));
    send(&mut hub, B, "authenticate", json!({ "email": "y@example.com" }));
    join(&mut hub, B, "p9", "u2");

    let out = send(
        &mut hub,
        A,
        "notify_invite",
        json!({
            "email": "x@example.com",
            "project": { "id": "p9", "name": "Board", "description": null }
        }),
    );

    assert_eq!(
        out,
        vec![Delivery {
            recipients: vec![C],
            event: OutboundEvent::ProjectAdded(
                json!({ "id": "p9", "name": "Board", "description": null })
            ),
        }]
    );
}

#[test]
fn invite_for_unknown_email_goes_nowhere() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);

    let out = send(
        &mut hub,
        A,
        "notify_invite",
        json!({ "email": "nobody@example.com", "project": { "id": "p1" } }),
    );
    assert!(out.is_empty());
}

#[test]
fn reauthenticating_moves_the_private_room() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    open(&mut hub, B);
    send(&mut hub, A, "authenticate", json!({ "email": "old@example.com" }));
    send(&mut hub, A, "authenticate", json!({ "email": "new@example.com" }));

    assert_eq!(hub.rooms_of(A), vec![RoomId::user("new@example.com")]);

    let invite = |email: &str| json!({ "email": email, "project": { "id": "p1" } });
    assert!(send(&mut hub, B, "notify_invite", invite("old@example.com")).is_empty());
    assert_eq!(
        send(&mut hub, B, "notify_invite", invite("new@example.com"))[0].recipients,
        vec![A]
    );
}

#[test]
fn leave_project_updates_remaining_roster() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    open(&mut hub, B);
    join(&mut hub, A, "p1", "u1");
    join(&mut hub, B, "p1", "u2");

    let out = send(&mut hub, A, "leave_project", json!({ "projectId": "p1" }));
    assert_eq!(
        out,
        vec![Delivery {
            recipients: vec![B],
            event: users(&["u2"]),
        }]
    );

    // A no longer receives relays from p1.
    let out = send(&mut hub, B, "task_moved", json!({ "projectId": "p1" }));
    assert!(out.is_empty());

    // Leaving again, or leaving a room never joined, is silent.
    assert!(send(&mut hub, A, "leave_project", json!({ "projectId": "p1" })).is_empty());
    assert!(send(&mut hub, A, "leave_project", json!({ "projectId": "p7" })).is_empty());
}

#[test]
fn disconnect_of_unknown_connection_is_a_no_op() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    join(&mut hub, A, "p1", "u1");

    assert!(hub.process(ConnectionId(99), ConnectionEvent::Closed).is_empty());
    assert!(hub.process(A, ConnectionEvent::Closed).is_empty());
    // Second close for the same connection.
    assert!(hub.process(A, ConnectionEvent::Closed).is_empty());

    assert_eq!(hub.connection_count(), 0);
    assert_eq!(hub.room_count(), 0);
    assert_eq!(hub.presence().room_count(), 0);
}

#[test]
fn events_after_close_do_not_resurrect_connection() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    hub.process(A, ConnectionEvent::Closed);

    assert!(join(&mut hub, A, "p1", "u1").is_empty());
    assert!(hub.roster("p1").is_empty());
    assert_eq!(hub.connection_count(), 0);
}

#[test]
fn roster_descriptor_lives_in_presence_not_connection_state() {
    let mut hub = RealtimeHub::new();
    open(&mut hub, A);
    send(&mut hub, A, "authenticate", json!({ "email": "a@example.com" }));
    join(&mut hub, A, "p1", "u1");
    join(&mut hub, A, "p1", "u1-renamed");

    let conn = hub.registry().get(A).expect("connection is open");
    assert_eq!(conn.email.as_deref(), Some("a@example.com"));
    assert_eq!(
        conn.rooms.iter().cloned().collect::<Vec<_>>(),
        vec![RoomId::user("a@example.com"), RoomId::project("p1")]
    );
    assert_eq!(hub.roster("p1"), vec![UserDescriptor::with_id("u1-renamed")]);
}
