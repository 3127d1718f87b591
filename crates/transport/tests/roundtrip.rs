//! Client → server delivery over a real socket.

use gestureflow_common::config::TransportConfig;
use gestureflow_protocol::gesture::GestureLabel;
use gestureflow_protocol::message::ActionMessage;
use gestureflow_transport::{TransportClient, TransportServer};
use tokio::sync::mpsc;

#[tokio::test]
async fn messages_arrive_in_send_order() {
    let server = TransportServer::bind("127.0.0.1:0").await.unwrap();
    let address = server.local_addr().unwrap().to_string();
    let (tx, mut rx) = mpsc::channel(16);
    let serve = tokio::spawn(server.serve(tx));

    let mut client = TransportClient::connect(&TransportConfig {
        address,
        reconnect_interval_ms: 2000,
        ..TransportConfig::default()
    })
    .await;

    let sent = vec![
        ActionMessage::gesture(GestureLabel::Pointing),
        ActionMessage::pointer(0.3, 0.4),
        ActionMessage::pointer(0.31, 0.41),
        ActionMessage::gesture(GestureLabel::SwipeRight),
    ];
    for message in &sent {
        client.send(message).await.unwrap();
    }

    let mut received = Vec::new();
    for _ in 0..sent.len() {
        received.push(rx.recv().await.unwrap());
    }
    assert_eq!(received, sent);

    drop(rx);
    serve.await.unwrap().unwrap();
}
