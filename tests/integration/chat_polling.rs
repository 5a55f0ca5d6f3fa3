//! Chat session lifecycle against a scripted backend.

use std::time::Duration;

use ideahub::chat::{Applied, ChatEvent, ChatSurface, RefreshOrdering, TeamId};
use ideahub::Error;

use super::fixtures::{drain, msg, session, texts, FakeTransport, USER};

const INTERVAL: Duration = Duration::from_millis(3000);

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_polls_immediately_then_every_interval() {
    let transport = FakeTransport::with_messages(vec![msg("leo", "hi")]);
    let (mut chat, mut rx) = session(transport.clone(), INTERVAL);
    let mut surface = ChatSurface::new(RefreshOrdering::Sequenced, USER);

    chat.open(TeamId(4), "Solar Team").unwrap();
    sleep_ms(50).await;
    assert_eq!(transport.fetch_count(), 1);

    sleep_ms(9_000).await;
    // t = 0, 3, 6, 9
    assert_eq!(transport.fetch_count(), 4);

    drain(&mut rx, &mut surface);
    assert_eq!(texts(&surface), vec!["hi"]);
    assert_eq!(surface.current().unwrap().title, "Solar Team");
}

#[tokio::test(start_paused = true)]
async fn test_reopening_same_team_does_not_double_poll() {
    let transport = FakeTransport::new();
    let (mut chat, mut rx) = session(transport.clone(), INTERVAL);
    let mut surface = ChatSurface::new(RefreshOrdering::Sequenced, USER);

    let first = chat.open(TeamId(4), "Solar").unwrap();
    let second = chat.open(TeamId(4), "Solar Squad").unwrap();
    assert_eq!(first, second);

    sleep_ms(9_050).await;
    assert_eq!(transport.fetch_count(), 4);

    drain(&mut rx, &mut surface);
    assert_eq!(surface.current().unwrap().title, "Solar Squad");
}

#[tokio::test(start_paused = true)]
async fn test_opening_other_team_is_refused_while_open() {
    let transport = FakeTransport::new();
    let (mut chat, _rx) = session(transport.clone(), INTERVAL);

    chat.open(TeamId(1), "One").unwrap();
    let err = chat.open(TeamId(2), "Two").unwrap_err();
    assert!(matches!(err, Error::ChannelBusy { .. }));

    sleep_ms(3_050).await;
    assert_eq!(transport.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_close_twice_stops_polling() {
    let transport = FakeTransport::new();
    let (mut chat, mut rx) = session(transport.clone(), INTERVAL);
    let mut surface = ChatSurface::new(RefreshOrdering::Sequenced, USER);

    chat.open(TeamId(4), "Solar").unwrap();
    sleep_ms(50).await;
    assert!(chat.close());
    assert!(!chat.close());

    sleep_ms(30_000).await;
    assert_eq!(transport.fetch_count(), 1);

    let events = drain(&mut rx, &mut surface);
    let closed = events
        .iter()
        .filter(|e| matches!(e, ChatEvent::Closed { .. }))
        .count();
    assert_eq!(closed, 1);
    assert!(!surface.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_send_refreshes_without_waiting_for_tick() {
    let transport = FakeTransport::new();
    let (mut chat, mut rx) = session(transport.clone(), INTERVAL);
    let mut surface = ChatSurface::new(RefreshOrdering::Sequenced, USER);

    chat.open(TeamId(4), "Solar").unwrap();
    sleep_ms(50).await;
    drain(&mut rx, &mut surface);
    surface.input_mut().unwrap().push_str("hello team");

    chat.send("  hello team  ").unwrap();
    sleep_ms(50).await;

    assert_eq!(transport.posts(), vec![(TeamId(4), "hello team".to_string())]);
    assert_eq!(transport.fetch_count(), 2);

    let events = drain(&mut rx, &mut surface);
    assert!(events.iter().any(|e| matches!(e, ChatEvent::Sent { .. })));
    assert_eq!(texts(&surface), vec!["hello team"]);
    assert_eq!(surface.input(), "");
    let open = surface.current().unwrap();
    assert!(surface.is_own(&open.messages[0]));
}

#[tokio::test(start_paused = true)]
async fn test_send_then_close_does_not_render() {
    let transport = FakeTransport::new();
    transport.set_post_delay(Duration::from_millis(500));
    let (mut chat, mut rx) = session(transport.clone(), INTERVAL);
    let mut surface = ChatSurface::new(RefreshOrdering::Sequenced, USER);

    chat.open(TeamId(4), "Solar").unwrap();
    sleep_ms(50).await;
    drain(&mut rx, &mut surface);
    assert_eq!(surface.current().unwrap().renders, 1);

    chat.send("bye").unwrap();
    chat.close();
    sleep_ms(10_000).await;

    // The post still lands; the follow-up refresh never runs.
    assert_eq!(transport.posts().len(), 1);
    assert_eq!(transport.fetch_count(), 1);

    let events = drain(&mut rx, &mut surface);
    assert!(!events
        .iter()
        .any(|e| matches!(e, ChatEvent::Snapshot { .. })));
    assert!(!surface.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_events_from_previous_open_are_ignored() {
    let transport = FakeTransport::new();
    transport.set_post_delay(Duration::from_millis(500));
    let (mut chat, mut rx) = session(transport.clone(), INTERVAL);
    let mut surface = ChatSurface::new(RefreshOrdering::Sequenced, USER);

    chat.open(TeamId(1), "One").unwrap();
    chat.send("late").unwrap();
    chat.close();
    chat.open(TeamId(2), "Two").unwrap();
    drain(&mut rx, &mut surface);
    surface.input_mut().unwrap().push_str("draft");

    sleep_ms(1_000).await;
    for event in drain(&mut rx, &mut surface) {
        if let ChatEvent::Sent { .. } = event {
            assert_eq!(surface.apply(event), Applied::Ignored);
        }
    }
    assert_eq!(surface.input(), "draft");
    assert_eq!(surface.current().unwrap().team_id, Some(TeamId(2)));
}

#[tokio::test(start_paused = true)]
async fn test_failed_send_keeps_input_and_reports() {
    let transport = FakeTransport::new();
    transport.set_fail_post(true);
    let (mut chat, mut rx) = session(transport.clone(), INTERVAL);
    let mut surface = ChatSurface::new(RefreshOrdering::Sequenced, USER);

    chat.open(TeamId(4), "Solar").unwrap();
    sleep_ms(50).await;
    drain(&mut rx, &mut surface);
    surface.input_mut().unwrap().push_str("hi");

    chat.send("hi").unwrap();
    sleep_ms(50).await;

    let mut notices = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Applied::Notice(text) = surface.apply(event) {
            notices.push(text);
        }
    }
    assert_eq!(notices.len(), 1);
    assert!(notices[0].starts_with("Failed to send message"));
    assert_eq!(surface.input(), "hi");
    assert!(transport.posts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_keeps_polling() {
    let transport = FakeTransport::with_messages(vec![msg("leo", "first")]);
    transport.set_fail_fetch(true);
    let (mut chat, mut rx) = session(transport.clone(), INTERVAL);
    let mut surface = ChatSurface::new(RefreshOrdering::Sequenced, USER);

    chat.open(TeamId(4), "Solar").unwrap();
    sleep_ms(6_050).await;
    assert_eq!(transport.fetch_count(), 3);
    let events = drain(&mut rx, &mut surface);
    let failures = events
        .iter()
        .filter(|e| matches!(e, ChatEvent::FetchFailed { .. }))
        .count();
    assert_eq!(failures, 3);
    assert!(texts(&surface).is_empty());

    transport.set_fail_fetch(false);
    sleep_ms(3_000).await;
    drain(&mut rx, &mut surface);
    assert_eq!(texts(&surface), vec!["first"]);
}

/// A slow tick fetch issued before a send completes after the send's refresh.
async fn race(ordering: RefreshOrdering) -> Vec<String> {
    let transport = FakeTransport::with_messages(vec![msg("leo", "a")]);
    transport.delay_next_fetch(Duration::from_millis(5_000));
    let (mut chat, mut rx) = session(transport.clone(), INTERVAL);
    let mut surface = ChatSurface::new(ordering, USER);

    chat.open(TeamId(4), "Solar").unwrap();
    sleep_ms(10).await;
    assert_eq!(transport.fetch_count(), 1);

    chat.send("b").unwrap();
    sleep_ms(5_500).await;
    drain(&mut rx, &mut surface);
    texts(&surface)
}

#[tokio::test(start_paused = true)]
async fn test_stale_snapshot_dropped_when_sequenced() {
    assert_eq!(race(RefreshOrdering::Sequenced).await, vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_snapshot_shown_when_last_completed() {
    assert_eq!(race(RefreshOrdering::LastCompleted).await, vec!["a"]);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_session_stops_polling() {
    let transport = FakeTransport::new();
    let (mut chat, _rx) = session(transport.clone(), INTERVAL);
    chat.open(TeamId(4), "Solar").unwrap();
    sleep_ms(50).await;
    drop(chat);

    sleep_ms(10_000).await;
    assert_eq!(transport.fetch_count(), 1);
}
