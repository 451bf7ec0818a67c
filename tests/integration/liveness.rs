use crate::*;

/// A probe sent before the dispatch loop is running gets no reply; once the
/// loop starts on the same socket, the poll exits on the exact `online`
/// literal.
#[tokio::test]
async fn probe_loop_exits_once_the_server_comes_up() {
    let socket = bind_server().await;
    let addr = socket.local_addr().unwrap();
    let client = TestClient::new(addr).await;

    // Hold the dispatch loop back while the client is already polling.
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        // Leak the server handle so the loop outlives this task.
        std::mem::forget(serve_on(socket));
    });

    let mut unanswered = 0;
    let mut reply = None;
    for _ in 0..50 {
        client.send_raw(b"ping").await;
        match client.recv_reply(Duration::from_millis(100)).await {
            Some(r) => {
                reply = Some(r);
                break;
            }
            None => unanswered += 1,
        }
    }

    assert_eq!(reply.expect("server never answered"), b"online");
    assert!(
        unanswered >= 1,
        "expected at least one unanswered probe before the server came up"
    );
}

#[tokio::test]
async fn ping_is_answered_with_online() {
    let server = start_server().await;
    let client = TestClient::new(server.addr).await;

    client.send_raw(b"ping").await;
    let reply = client
        .recv_reply(Duration::from_secs(2))
        .await
        .expect("server should answer a probe");
    assert_eq!(reply, b"online");
}

#[tokio::test]
async fn probes_do_not_open_sessions() {
    let server = start_server().await;
    let client = TestClient::new(server.addr).await;

    for _ in 0..3 {
        client.send_raw(b"ping").await;
        client.recv_reply(Duration::from_secs(2)).await.unwrap();
    }

    assert!(server.dispatcher.sessions().is_empty());
}
