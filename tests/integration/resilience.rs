use crate::*;

/// A datagram that cannot be decoded is dropped without touching the
/// sender's session, and the dispatch loop keeps serving.
#[tokio::test]
async fn malformed_datagram_does_not_interrupt_service() {
    let mut server = start_server().await;
    let client = TestClient::new(server.addr).await;

    client.send_chunk("before ").await;
    client.send_raw(b"this is not an envelope").await;
    client.send_chunk("after").await;
    client.send_end().await;

    let completed = next_completed(&mut server).await;
    assert_eq!(completed.payload, "before after");
}

/// A JSON object missing required fields is malformed too — classification
/// happens on raw content, decoding on structure.
#[tokio::test]
async fn incomplete_envelope_is_dropped() {
    let mut server = start_server().await;
    let client = TestClient::new(server.addr).await;

    let incomplete = serde_json::json!({
        "title": "A Fairy Song",
        "author": "William Shakespeare"
    })
    .to_string();

    client.send_chunk("kept").await;
    client.send_raw(incomplete.as_bytes()).await;
    client.send_end().await;

    assert_eq!(next_completed(&mut server).await.payload, "kept");
}

/// One client's garbage never leaks into another client's session.
#[tokio::test]
async fn other_clients_are_unaffected_by_bad_traffic() {
    let mut server = start_server().await;
    let noisy = TestClient::new(server.addr).await;
    let clean = TestClient::new(server.addr).await;

    clean.send_chunk("clean-1 ").await;
    for _ in 0..5 {
        noisy.send_raw(b"\xff\xfe garbage \x00").await;
    }
    clean.send_chunk("clean-2").await;
    clean.send_end().await;

    let completed = next_completed(&mut server).await;
    assert_eq!(completed.origin, clean.socket.local_addr().unwrap());
    assert_eq!(completed.payload, "clean-1 clean-2");
    // The noisy client never sent a decodable chunk, so no session exists.
    assert!(server.dispatcher.sessions().is_empty());
}

/// `end` with no open session is reported and dropped, not fatal.
#[tokio::test]
async fn stray_end_does_not_kill_the_loop() {
    let mut server = start_server().await;
    let client = TestClient::new(server.addr).await;

    client.send_end().await;

    // The loop is still alive and serving.
    client.send_chunk("still works").await;
    client.send_end().await;
    assert_eq!(next_completed(&mut server).await.payload, "still works");
}
