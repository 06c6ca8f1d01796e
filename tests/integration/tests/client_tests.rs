//! Cross-crate behavior tests
//!
//! Run with: cargo test -p integration-tests --test client_tests

use integration_tests::{fixtures, offline_cluster, offline_options};
use ripcord::{Cluster, ClusterError, Event, EventKind, RestError, ShardId, Snowflake};
use ripcord_gateway::protocol::{Identify, IdentifyProperties, InboundFrame, OpCode, OutboundFrame};
use ripcord_gateway::SessionState;
use ripcord_rest::{normalize_route, Method, RestManager};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Cluster construction
// ============================================================================

#[tokio::test]
async fn test_explicit_shard_list_beats_total() {
    let cluster = Cluster::new("token", offline_options().shards(vec![1, 3]).total_shards(8))
        .await
        .unwrap();

    assert_eq!(cluster.shard_count(), 2);
    assert_eq!(cluster.total_shards(), 8);
    assert!(cluster.shard(ShardId(3)).is_some());
    assert!(cluster.shard(ShardId(0)).is_none());
}

#[tokio::test]
async fn test_spawn_reports_every_failed_shard() {
    let cluster = Cluster::new("token", offline_options().shards(vec![5, 7]))
        .await
        .unwrap();

    match cluster.spawn().await {
        Err(ClusterError::Spawn(failures)) => {
            let mut failed: Vec<u32> = failures.iter().map(|(id, _)| id.0).collect();
            failed.sort_unstable();
            assert_eq!(failed, vec![5, 7]);
        }
        other => panic!("expected aggregate failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_close_leaves_all_shards_disconnected() {
    let cluster = Cluster::new("token", offline_options().total_shards(2))
        .await
        .unwrap();
    cluster.close().await;

    for id in 0..2 {
        let shard = cluster.shard(ShardId(id)).unwrap();
        assert_eq!(shard.state(), SessionState::Disconnected);
    }
}

// ============================================================================
// Event bus wiring
// ============================================================================

#[tokio::test]
async fn test_handlers_registered_on_cluster_receive_emits() {
    let cluster = offline_cluster().await;
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    cluster.on(EventKind::Ready, move |event| {
        assert!(matches!(event, Event::Ready { .. }));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    cluster.bus().emit(&Event::Ready {
        shard_id: ShardId(0),
    });
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// ============================================================================
// REST pipeline
// ============================================================================

#[test]
fn test_message_routes_share_one_bucket() {
    let manager = RestManager::new("token");
    let a = manager.bucket(&normalize_route(
        &Method::GET,
        "/channels/372539957824323584/messages/532935925194555392",
    ));
    let b = manager.bucket(&normalize_route(
        &Method::GET,
        "/channels/372539957824323584/messages/999999999999999999",
    ));

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(manager.bucket_count(), 1);
}

#[tokio::test]
async fn test_bulk_delete_out_of_range_never_reaches_the_wire() {
    let cluster = offline_cluster().await;

    let result = cluster.bulk_delete_messages(Snowflake::new(1), 1).await;
    assert!(matches!(
        result,
        Err(ClusterError::Rest(RestError::Configuration(_)))
    ));
    assert_eq!(cluster.rest().bucket_count(), 0);
}

// ============================================================================
// Wire shapes
// ============================================================================

#[test]
fn test_identify_wire_shape() {
    let identify = Identify {
        token: "token".to_string(),
        properties: IdentifyProperties::default(),
        shard: [2, 4],
        presence: ripcord::Presence::default(),
        large_threshold: 250,
    };
    let json = OutboundFrame::identify(&identify).unwrap().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["op"], 2);
    assert_eq!(value["d"]["shard"], serde_json::json!([2, 4]));
    assert!(value["d"]["properties"]["$os"].is_string());
}

#[test]
fn test_fixture_frames_decode() {
    let hello = InboundFrame::from_json(fixtures::HELLO).unwrap();
    assert_eq!(hello.op, OpCode::Hello);
    assert_eq!(hello.as_hello().unwrap().heartbeat_interval, 45_000);

    let ready = InboundFrame::from_json(fixtures::READY_DISPATCH).unwrap();
    assert_eq!(ready.op, OpCode::Dispatch);
    assert_eq!(ready.t.as_deref(), Some("READY"));
    assert_eq!(ready.s, Some(1));
}
