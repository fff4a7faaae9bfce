//! Two clients negotiating a session through an in-process relay.
//!
//! Run with: `cargo run -p parley-client --example two_party`

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parley_client::prelude::*;
use parley_test_utils::{SinkRecorder, TestRelay, DEFAULT_TIMEOUT};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let relay = TestRelay::start().await;
    println!("relay listening on {}", relay.url());

    let caller_sink = SinkRecorder::new();
    let caller = RoomClient::new(Arc::new(caller_sink.clone()));
    let callee_sink = SinkRecorder::new();
    let callee = RoomClient::new(Arc::new(callee_sink.clone()));

    caller.connect_to_room(RoomConnectionParameters::new(relay.url(), "demo"));
    relay.wait_for_members("demo", 1, DEFAULT_TIMEOUT).await;
    callee.connect_to_room(RoomConnectionParameters::new(relay.url(), "demo"));

    caller_sink.wait_connected(DEFAULT_TIMEOUT).await;
    println!("caller connected as initiator");
    caller.send_offer_sdp(SessionDescription::offer("v=0 demo offer"));

    callee_sink.wait_connected(DEFAULT_TIMEOUT).await;
    if let Some(offer) = callee_sink.connected_params().and_then(|p| p.offer_sdp) {
        println!("callee received offer: {}", offer.sdp);
    }
    callee.send_answer_sdp(SessionDescription::answer("v=0 demo answer"));

    caller_sink.wait_description_count(1, DEFAULT_TIMEOUT).await;
    println!("caller received answer: {}", caller_sink.descriptions()[0].sdp);

    callee.send_local_ice_candidate(IceCandidate::new(
        "audio",
        0,
        "candidate:1 1 UDP 2122260223 10.0.0.2 5000 typ host",
    ));
    caller_sink.wait_candidate_count(1, DEFAULT_TIMEOUT).await;
    println!(
        "caller received candidate: {}",
        caller_sink.candidates()[0].sdp
    );

    caller.disconnect_from_room();
    callee_sink.wait_closed(DEFAULT_TIMEOUT).await;
    println!("callee saw the peer leave");

    callee.disconnect_from_room();
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}
