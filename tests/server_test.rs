//! Wire-level integration: real TCP connections speaking the
//! newline-delimited JSON protocol.

mod common;

use common::{track, MockProvider};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use blindbeat::net::GameServer;
use blindbeat::session::Session;

type LineReader = tokio::io::Lines<BufReader<OwnedReadHalf>>;

async fn start_server() -> (std::net::SocketAddr, Arc<MockProvider>) {
    let provider = Arc::new(MockProvider::new(vec![
        track("Stressed Out", &["Twenty One Pilots"]),
        track("Ride", &["Imagine Dragons"]),
    ]));
    let session = Arc::new(Session::new(provider.clone(), Duration::ZERO));
    session.request_next_track(false).await;

    let server = GameServer::bind("127.0.0.1:0", session)
        .await
        .expect("failed to bind");
    let addr = server.local_addr().expect("no local addr");
    tokio::spawn(server.run());
    (addr, provider)
}

async fn connect(addr: std::net::SocketAddr) -> (LineReader, OwnedWriteHalf) {
    let stream = TcpStream::connect(addr).await.expect("connect failed");
    let (reader, writer) = stream.into_split();
    (BufReader::new(reader).lines(), writer)
}

async fn next_json(lines: &mut LineReader) -> Value {
    let line = tokio::time::timeout(Duration::from_secs(5), lines.next_line())
        .await
        .expect("timed out waiting for a message")
        .expect("read failed")
        .expect("connection closed");
    serde_json::from_str(&line).expect("server sent invalid JSON")
}

#[tokio::test]
async fn wire_contract_roundtrip() {
    let (addr, _provider) = start_server().await;

    let (mut ana_rx, mut ana_tx) = connect(addr).await;
    assert_eq!(next_json(&mut ana_rx).await["type"], "connected");

    let (mut bob_rx, _bob_tx) = connect(addr).await;
    assert_eq!(next_json(&mut bob_rx).await["type"], "connected");

    ana_tx
        .write_all(
            b"{\"type\":\"answer\",\"answer\":\"twenty one pilots stressed out\",\"pseudo\":\"ana\"}\n",
        )
        .await
        .unwrap();

    // Everyone sees the verdict, not just the sender
    for rx in [&mut ana_rx, &mut bob_rx] {
        let reply = next_json(rx).await;
        assert_eq!(reply["type"], "reply");
        assert_eq!(reply["pseudo"], "ana");
        assert_eq!(reply["titleFound"], true);
        assert_eq!(reply["artistFound"], true);
        assert_eq!(reply["title"], "Stressed Out");
        assert_eq!(reply["artists"][0], "Twenty One Pilots");
        assert!(reply["confidence"]["title"].as_f64().unwrap() > 0.9);
        assert!(reply["confidence"]["artist"].as_f64().unwrap() > 0.9);

        let reveal = next_json(rx).await;
        assert_eq!(reveal["type"], "rightAnswer");
        assert_eq!(reveal["message"], "Twenty One Pilots - Stressed Out");

        assert_eq!(next_json(rx).await["type"], "newTrack");
    }
}

#[tokio::test]
async fn malformed_line_gets_error_without_disconnect() {
    let (addr, _provider) = start_server().await;

    let (mut ana_rx, mut ana_tx) = connect(addr).await;
    assert_eq!(next_json(&mut ana_rx).await["type"], "connected");

    ana_tx.write_all(b"this is not json\n").await.unwrap();
    let error = next_json(&mut ana_rx).await;
    assert_eq!(error["type"], "error");

    // The connection survives: a hint request still works
    ana_tx.write_all(b"{\"type\":\"hint\"}\n").await.unwrap();
    let hint = next_json(&mut ana_rx).await;
    assert_eq!(hint["type"], "hint");
    assert_eq!(hint["title"], "******** ***");
    assert_eq!(hint["artists"][0], "****** *** ******");
}

#[tokio::test]
async fn next_track_message_skips_by_default() {
    let (addr, provider) = start_server().await;

    let (mut rx, mut tx) = connect(addr).await;
    assert_eq!(next_json(&mut rx).await["type"], "connected");

    tx.write_all(b"{\"type\":\"nextTrack\"}\n").await.unwrap();

    let reveal = next_json(&mut rx).await;
    assert_eq!(reveal["type"], "rightAnswer");
    assert_eq!(reveal["message"], "Twenty One Pilots - Stressed Out");
    assert_eq!(next_json(&mut rx).await["type"], "newTrack");
    assert_eq!(provider.skips.load(std::sync::atomic::Ordering::SeqCst), 1);

    // Resync variant does not touch playback
    tx.write_all(b"{\"type\":\"nextTrack\",\"shouldSkip\":false}\n")
        .await
        .unwrap();
    assert_eq!(next_json(&mut rx).await["type"], "newTrack");
    assert_eq!(provider.skips.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unfound_reply_omits_revealed_fields() {
    let (addr, _provider) = start_server().await;

    let (mut rx, mut tx) = connect(addr).await;
    assert_eq!(next_json(&mut rx).await["type"], "connected");

    tx.write_all(b"{\"type\":\"answer\",\"answer\":\"bohemian rhapsody\",\"pseudo\":\"ana\"}\n")
        .await
        .unwrap();

    let reply = next_json(&mut rx).await;
    assert_eq!(reply["type"], "reply");
    assert_eq!(reply["titleFound"], false);
    assert_eq!(reply["artistFound"], false);
    assert!(reply.get("title").is_none());
    assert!(reply.get("artists").is_none());
    assert_eq!(reply["confidence"]["title"], 0.0);
}
