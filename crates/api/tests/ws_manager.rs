//! Unit tests for `WsManager`.
//!
//! These tests exercise the relay connection manager directly, without
//! performing any HTTP upgrades. They verify add/remove semantics, fan-out
//! delivery, failure isolation, and graceful shutdown behaviour.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use wardwatch_api::config::RelayConfig;
use wardwatch_api::ws::{BroadcastReport, WsManager};

fn text(msg: Message) -> String {
    match msg {
        Message::Text(t) => t.as_str().to_string(),
        other => panic!("expected text message, got {other:?}"),
    }
}

fn small_queue(queue_capacity: usize, max_drops: u64) -> WsManager {
    WsManager::new(RelayConfig {
        queue_capacity,
        max_drops,
        ..RelayConfig::default()
    })
}

// ---------------------------------------------------------------------------
// Test: new manager starts with zero connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::default();

    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: add() opens the connection and increments the count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_opens_connection() {
    let manager = WsManager::default();

    let (_rx, _) = manager.add("conn-1".to_string()).await;

    assert_eq!(manager.connection_count().await, 1);
    assert!(manager.is_open("conn-1").await);
}

// ---------------------------------------------------------------------------
// Test: remove() closes and forgets the connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_closes_connection() {
    let manager = WsManager::default();

    let (_rx, _) = manager.add("conn-1".to_string()).await;
    manager.remove("conn-1").await;

    assert_eq!(manager.connection_count().await, 0);
    assert!(!manager.is_open("conn-1").await);
}

// ---------------------------------------------------------------------------
// Test: remove() with unknown ID is a no-op
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let manager = WsManager::default();

    let (_rx, _) = manager.add("conn-1".to_string()).await;
    manager.remove("nonexistent").await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() signals every socket task and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_signals_close_and_clears() {
    let manager = WsManager::default();

    let (mut rx1, closed1) = manager.add("conn-1".to_string()).await;
    let (_rx2, closed2) = manager.add("conn-2".to_string()).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert!(closed1.is_cancelled());
    assert!(closed2.is_cancelled());

    // The sender halves were dropped with the map.
    assert!(rx1.recv().await.is_none());
}

// ---------------------------------------------------------------------------
// Test: remove() signals the socket task
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_signals_close() {
    let manager = WsManager::default();

    let (_rx, closed) = manager.add("conn-1".to_string()).await;
    assert!(!closed.is_cancelled());

    manager.remove("conn-1").await;
    assert!(closed.is_cancelled());
}

// ---------------------------------------------------------------------------
// Test: relay() reaches every connection, the sender included
// ---------------------------------------------------------------------------

#[tokio::test]
async fn relay_fans_out_to_all_including_sender() {
    let manager = WsManager::default();

    let (mut rx1, _) = manager.add("conn-1".to_string()).await;
    let (mut rx2, _) = manager.add("conn-2".to_string()).await;
    let (mut rx3, _) = manager.add("conn-3".to_string()).await;

    let report = manager
        .relay("conn-2", Message::Text("hr=72".into()))
        .await;

    assert_eq!(
        report,
        BroadcastReport {
            attempted: 3,
            delivered: 3,
            dropped: 0,
            closed: 0,
        }
    );
    for rx in [&mut rx1, &mut rx2, &mut rx3] {
        assert_eq!(text(rx.recv().await.unwrap()), "hr=72");
        assert!(rx.try_recv().is_err(), "exactly one copy per target");
    }
}

// ---------------------------------------------------------------------------
// Test: binary payloads are relayed byte-for-byte
// ---------------------------------------------------------------------------

#[tokio::test]
async fn relay_preserves_binary_payload() {
    let manager = WsManager::default();

    let (mut rx, _) = manager.add("conn-1".to_string()).await;
    let payload = vec![0u8, 159, 146, 150, 255];

    manager
        .relay("conn-1", Message::Binary(payload.clone().into()))
        .await;

    match rx.recv().await.unwrap() {
        Message::Binary(bytes) => assert_eq!(bytes.as_ref(), payload.as_slice()),
        other => panic!("expected binary, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: messages from a sender that is not open are discarded
// ---------------------------------------------------------------------------

#[tokio::test]
async fn relay_from_unknown_sender_is_discarded() {
    let manager = WsManager::default();

    let (mut rx, _) = manager.add("conn-1".to_string()).await;
    let report = manager.relay("ghost", Message::Text("x".into())).await;

    assert_eq!(report, BroadcastReport::default());
    assert!(rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: a failed delivery does not affect other targets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_delivery_is_isolated() {
    let manager = WsManager::default();

    let (mut rx1, _) = manager.add("conn-1".to_string()).await;
    let (rx2, _) = manager.add("conn-2".to_string()).await;
    let (mut rx3, _) = manager.add("conn-3".to_string()).await;

    // conn-2's writer has gone away.
    drop(rx2);

    let report = manager
        .relay("conn-1", Message::Text("still alive".into()))
        .await;

    assert_eq!(report.attempted, 3);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.closed, 1);
    assert_eq!(text(rx1.recv().await.unwrap()), "still alive");
    assert_eq!(text(rx3.recv().await.unwrap()), "still alive");

    // The failed target was closed and removed.
    assert_eq!(manager.connection_count().await, 2);
    assert!(!manager.is_open("conn-2").await);
}

// ---------------------------------------------------------------------------
// Test: a closed connection is never attempted again
// ---------------------------------------------------------------------------

#[tokio::test]
async fn closed_connection_is_not_attempted() {
    let manager = WsManager::default();

    let (mut rx1, _) = manager.add("conn-1".to_string()).await;
    let (mut rx2, _) = manager.add("conn-2".to_string()).await;

    manager.remove("conn-2").await;
    let report = manager.relay("conn-1", Message::Text("after".into())).await;

    assert_eq!(report.attempted, 1);
    assert_eq!(report.closed, 0);
    assert_eq!(text(rx1.recv().await.unwrap()), "after");
    // conn-2's queue was dropped with its connection; nothing was queued.
    assert!(rx2.recv().await.is_none());
}

// ---------------------------------------------------------------------------
// Test: a closed connection can no longer send
// ---------------------------------------------------------------------------

#[tokio::test]
async fn closed_connection_cannot_send() {
    let manager = WsManager::default();

    let (mut rx1, _) = manager.add("conn-1".to_string()).await;
    let (_rx2, _) = manager.add("conn-2".to_string()).await;

    manager.remove("conn-2").await;
    let report = manager.relay("conn-2", Message::Text("late".into())).await;

    assert_eq!(report.attempted, 0);
    assert!(rx1.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: connections added after a broadcast never see it
// ---------------------------------------------------------------------------

#[tokio::test]
async fn late_joiner_misses_earlier_messages() {
    let manager = WsManager::default();

    let (mut rx1, _) = manager.add("conn-1".to_string()).await;
    manager.relay("conn-1", Message::Text("early".into())).await;

    let (mut late, _) = manager.add("conn-late".to_string()).await;
    manager.relay("conn-1", Message::Text("later".into())).await;

    assert_eq!(text(rx1.recv().await.unwrap()), "early");
    assert_eq!(text(rx1.recv().await.unwrap()), "later");
    assert_eq!(text(late.recv().await.unwrap()), "later");
    assert!(late.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: a full queue drops only for that target
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_queue_drops_only_for_slow_target() {
    let manager = small_queue(1, 0);

    let (mut fast, _) = manager.add("fast".to_string()).await;
    let (mut slow, _) = manager.add("slow".to_string()).await;

    let first = manager.relay("fast", Message::Text("m1".into())).await;
    assert_eq!(first.delivered, 2);

    // Drain the fast consumer only.
    assert_eq!(text(fast.recv().await.unwrap()), "m1");

    let second = manager.relay("fast", Message::Text("m2".into())).await;
    assert_eq!(second.delivered, 1);
    assert_eq!(second.dropped, 1);
    assert_eq!(second.closed, 0);

    assert_eq!(text(fast.recv().await.unwrap()), "m2");
    assert_eq!(text(slow.recv().await.unwrap()), "m1");
    assert!(slow.try_recv().is_err(), "m2 was dropped for the slow target");

    // max_drops = 0 never disconnects.
    assert!(manager.is_open("slow").await);
}

// ---------------------------------------------------------------------------
// Test: a target past max_drops is disconnected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn slow_target_is_disconnected_after_max_drops() {
    let manager = small_queue(1, 2);

    let (mut sender, _) = manager.add("sender".to_string()).await;
    let (_slow, slow_closed) = manager.add("slow".to_string()).await;

    // First fills the slow queue; the next two are dropped.
    for i in 0..3 {
        manager.relay("sender", Message::Text(format!("m{i}").into())).await;
        sender.recv().await.unwrap();
    }

    assert!(!manager.is_open("slow").await);
    assert_eq!(manager.connection_count().await, 1);
    // The socket task is told to hang up rather than left half-open.
    assert!(slow_closed.is_cancelled());

    let report = manager.relay("sender", Message::Text("m3".into())).await;
    assert_eq!(report.attempted, 1);
}

// ---------------------------------------------------------------------------
// Test: per-sender order is preserved at every receiver
// ---------------------------------------------------------------------------

#[tokio::test]
async fn per_sender_order_is_preserved() {
    let manager = WsManager::default();

    let (mut rx_a, _) = manager.add("a".to_string()).await;
    let (mut rx_b, _) = manager.add("b".to_string()).await;

    for m in ["m1", "m2", "m3"] {
        manager.relay("a", Message::Text(m.into())).await;
    }

    for rx in [&mut rx_a, &mut rx_b] {
        let got: Vec<String> = (0..3).map(|_| text(rx.try_recv().unwrap())).collect();
        assert_eq!(got, vec!["m1", "m2", "m3"]);
    }
}

// ---------------------------------------------------------------------------
// Test: concurrent senders keep their own order
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_senders_keep_their_own_order() {
    const SENDERS: usize = 4;
    const PER_SENDER: usize = 50;

    let manager = Arc::new(WsManager::default());
    let mut receivers: Vec<mpsc::Receiver<Message>> = Vec::new();
    for i in 0..SENDERS {
        receivers.push(manager.add(format!("s{i}")).await.0);
    }

    let mut tasks = Vec::new();
    for i in 0..SENDERS {
        let manager = Arc::clone(&manager);
        tasks.push(tokio::spawn(async move {
            for n in 0..PER_SENDER {
                manager
                    .relay(&format!("s{i}"), Message::Text(format!("{i}:{n}").into()))
                    .await;
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    for rx in &mut receivers {
        let mut next_expected = [0usize; SENDERS];
        for _ in 0..SENDERS * PER_SENDER {
            let msg = text(rx.try_recv().expect("every message was delivered"));
            let (sender, n) = msg.split_once(':').unwrap();
            let sender: usize = sender.parse().unwrap();
            let n: usize = n.parse().unwrap();
            assert_eq!(n, next_expected[sender], "out of order from sender {sender}");
            next_expected[sender] += 1;
        }
        assert!(rx.try_recv().is_err());
    }
}

// ---------------------------------------------------------------------------
// Test: adding with duplicate ID replaces the previous connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_id_replaces_previous_connection() {
    let manager = WsManager::default();

    let (mut rx_old, old_closed) = manager.add("conn-1".to_string()).await;
    let (mut rx_new, _) = manager.add("conn-1".to_string()).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.broadcast(Message::Text("replaced".into())).await;

    assert_eq!(text(rx_new.recv().await.unwrap()), "replaced");
    assert!(rx_old.recv().await.is_none(), "old connection was closed");
    assert!(old_closed.is_cancelled());
}

// ---------------------------------------------------------------------------
// Test: ping_all() queues a Ping for every connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_queues_ping() {
    let manager = WsManager::default();

    let (mut rx, _) = manager.add("conn-1".to_string()).await;
    manager.ping_all().await;

    assert!(matches!(rx.recv().await, Some(Message::Ping(_))));
}

// ---------------------------------------------------------------------------
// Test: pings on a full queue do not count towards max_drops
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pings_on_full_queue_are_not_counted_as_drops() {
    let manager = small_queue(1, 2);

    let (mut sender, _) = manager.add("sender".to_string()).await;
    let (_slow, slow_closed) = manager.add("slow".to_string()).await;

    // Fill the slow queue with a relayed message.
    manager.relay("sender", Message::Text("m0".into())).await;
    sender.recv().await.unwrap();

    // Pings find the slow queue full; none of them is a relayed drop.
    for _ in 0..5 {
        manager.ping_all().await;
        sender.recv().await.unwrap();
    }
    assert!(manager.is_open("slow").await);

    // The first real drop is still below the cutoff.
    let report = manager.relay("sender", Message::Text("m1".into())).await;
    assert_eq!(report.dropped, 1);
    assert_eq!(report.closed, 0);
    assert!(manager.is_open("slow").await);
    assert!(!slow_closed.is_cancelled());
}

// ---------------------------------------------------------------------------
// Test: ping_all() evicts connections whose writer is gone
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_evicts_disconnected_writers() {
    let manager = WsManager::default();

    let (mut alive, _) = manager.add("alive".to_string()).await;
    let (gone, gone_closed) = manager.add("gone".to_string()).await;
    drop(gone);

    manager.ping_all().await;

    assert_eq!(manager.connection_count().await, 1);
    assert!(!manager.is_open("gone").await);
    assert!(gone_closed.is_cancelled());
    assert!(matches!(alive.recv().await, Some(Message::Ping(_))));
}
