//! Session Worker Tests
//!
//! Sessions driven end to end over the in-memory transport.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use treekv::network::{ChannelClient, ChannelConnection};
use treekv::{Config, Engine};

const DEADLINE: Duration = Duration::from_secs(5);
const SETTLE: Duration = Duration::from_millis(100);

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_engine() -> Arc<Engine> {
    Arc::new(Engine::new(Config::default()).unwrap())
}

fn connect(engine: &Arc<Engine>, label: &str) -> (ChannelClient, thread::JoinHandle<()>) {
    let (connection, client) = ChannelConnection::pair(label);
    let worker = engine.spawn_session(Box::new(connection)).unwrap();
    (client, worker)
}

fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let start = Instant::now();
    while !condition() {
        assert!(start.elapsed() < DEADLINE, "timed out waiting for {}", what);
        thread::sleep(Duration::from_millis(5));
    }
}

fn ask(client: &ChannelClient, command: &str) -> String {
    client.send(command).unwrap();
    client
        .recv_timeout(DEADLINE)
        .unwrap()
        .expect("session closed unexpectedly")
}

// =============================================================================
// Command Loop Tests
// =============================================================================

#[test]
fn test_session_executes_commands() {
    let engine = setup_engine();
    let (client, worker) = connect(&engine, "c1");

    assert_eq!(ask(&client, "a apple red"), "added");
    assert_eq!(ask(&client, "a apple green"), "already in database");
    assert_eq!(ask(&client, "q apple"), "red");
    assert_eq!(ask(&client, "q pear"), "not found");
    assert_eq!(ask(&client, "d apple"), "removed");
    assert_eq!(ask(&client, "d apple"), "not in database");
    assert_eq!(ask(&client, "z"), "ill-formed command");
    assert_eq!(ask(&client, &format!("a {} v", "n".repeat(300))), "name too long");

    drop(client);
    worker.join().unwrap();
    assert_eq!(engine.live_sessions(), 0);
    assert!(engine.registry().is_empty());
}

#[test]
fn test_sessions_share_one_tree() {
    let engine = setup_engine();
    let (writer, w1) = connect(&engine, "writer");
    let (reader, w2) = connect(&engine, "reader");

    assert_eq!(ask(&writer, "a shared 42"), "added");
    assert_eq!(reader.request("q shared").unwrap().as_deref(), Some("42"));

    drop(writer);
    drop(reader);
    w1.join().unwrap();
    w2.join().unwrap();
    assert_eq!(engine.live_sessions(), 0);
}

#[test]
fn test_sessions_register_while_connected() {
    let engine = setup_engine();
    let mut clients: Vec<_> = (0..4).map(|i| Some(connect(&engine, &format!("c{}", i)))).collect();

    wait_until("all sessions registered", || engine.live_sessions() == 4);
    assert_eq!(engine.registry().len(), 4);

    // Disconnect out of registration order.
    for (remaining, idx) in [2, 0, 3, 1].into_iter().enumerate() {
        let (client, worker) = clients[idx].take().unwrap();
        drop(client);
        worker.join().unwrap();
        assert_eq!(engine.live_sessions(), 3 - remaining);
    }
    assert_eq!(engine.live_sessions(), 0);
    assert!(engine.registry().is_empty());
}

// =============================================================================
// Gate Tests
// =============================================================================

#[test]
fn test_stopped_gate_pauses_commands_until_release() {
    let engine = setup_engine();
    let (client, worker) = connect(&engine, "paused");
    assert_eq!(ask(&client, "a k v"), "added");

    engine.gate().stop();
    // Let the session come back around to its gate wait.
    thread::sleep(SETTLE);

    client.send("q k").unwrap();
    assert!(client.recv_timeout(SETTLE).is_err(), "command ran while gate stopped");

    engine.gate().release();
    assert_eq!(client.recv_timeout(DEADLINE).unwrap().as_deref(), Some("v"));

    drop(client);
    worker.join().unwrap();
}

// =============================================================================
// Cancellation Tests
// =============================================================================

#[test]
fn test_cancel_all_ends_blocked_reads() {
    let engine = setup_engine();
    let sessions: Vec<_> = (0..3).map(|i| connect(&engine, &format!("c{}", i))).collect();
    wait_until("sessions registered", || engine.live_sessions() == 3);

    assert_eq!(engine.cancel_all(), 3);
    for (client, worker) in sessions {
        worker.join().unwrap();
        assert_eq!(client.recv(), None);
    }
    assert_eq!(engine.live_sessions(), 0);
    assert!(engine.registry().is_empty());
}

#[test]
fn test_cancel_all_ends_sessions_waiting_at_gate() {
    let engine = setup_engine();
    engine.gate().stop();

    let sessions: Vec<_> = (0..3).map(|i| connect(&engine, &format!("c{}", i))).collect();
    wait_until("sessions registered", || engine.live_sessions() == 3);

    engine.cancel_all();
    for (_client, worker) in sessions {
        worker.join().unwrap();
    }
    assert_eq!(engine.live_sessions(), 0);
    assert!(engine.gate().is_stopped());
}

#[test]
fn test_cancel_all_keeps_accepting() {
    let engine = setup_engine();
    let (_old, old_worker) = connect(&engine, "old");
    wait_until("first session registered", || engine.live_sessions() == 1);

    engine.cancel_all();
    old_worker.join().unwrap();

    let (client, worker) = connect(&engine, "new");
    assert_eq!(ask(&client, "a after interrupt"), "added");
    drop(client);
    worker.join().unwrap();
}

// =============================================================================
// Shutdown Tests
// =============================================================================

#[test]
fn test_shutdown_drains_then_tears_down() {
    let engine = setup_engine();
    let sessions: Vec<_> = (0..5).map(|i| connect(&engine, &format!("c{}", i))).collect();

    for (i, (client, _)) in sessions.iter().enumerate() {
        assert_eq!(ask(client, &format!("a key{} v", i)), "added");
    }

    let freed = engine.shutdown();
    assert_eq!(freed, 5);
    assert_eq!(engine.live_sessions(), 0);
    assert!(engine.registry().is_empty());
    assert!(engine.tree().is_empty());

    for (client, worker) in sessions {
        worker.join().unwrap();
        assert_eq!(client.recv(), None);
    }
}

#[test]
fn test_session_after_shutdown_is_refused() {
    let engine = setup_engine();
    engine.shutdown();

    let (client, worker) = connect(&engine, "late");
    worker.join().unwrap();

    assert_eq!(engine.live_sessions(), 0);
    assert!(client.send("a k v").is_err() || client.recv().is_none());
    assert!(engine.tree().is_empty());
}
