use decksdk::{EventKind, ReceivedEvent, RegistrationParams, StreamDeck};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::sync::Mutex;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

async fn local_server() -> (TcpListener, RegistrationParams) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port().to_string();
    let params = RegistrationParams::from_args([
        "plexdeck",
        "-port",
        port.as_str(),
        "-pluginUUID",
        "PLUGIN-1",
        "-registerEvent",
        "registerPlugin",
    ])
    .unwrap();
    (listener, params)
}

async fn next_json<S>(ws: &mut S) -> Value
where
    S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match ws.next().await.unwrap().unwrap() {
            Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
            _ => continue,
        }
    }
}

#[tokio::test]
async fn test_register_events_and_set_image() {
    let (listener, params) = local_server().await;

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();

        let registration = next_json(&mut ws).await;
        assert_eq!(registration, json!({"event": "registerPlugin", "uuid": "PLUGIN-1"}));

        let appear = json!({"event": "willAppear", "context": "CTX1", "action": "a", "device": "D"});
        ws.send(Message::text(appear.to_string())).await.unwrap();
        ws.send(Message::text("not json")).await.unwrap();

        let command = next_json(&mut ws).await;
        ws.send(Message::Close(None)).await.unwrap();
        command
    });

    let deck = StreamDeck::connect(params).await.unwrap();
    let handle = deck.handle();
    let seen = Mutex::new(Vec::new());
    let handler = |event: &ReceivedEvent| {
        if event.event == EventKind::WillAppear {
            handle.set_image(event.surface().unwrap(), "images/thumb_1_2").unwrap();
        }
        seen.lock().unwrap().push(event.event);
    };

    deck.run(&handler, CancellationToken::new()).await.unwrap();

    let command = server.await.unwrap();
    assert_eq!(
        command,
        json!({"event": "setImage", "context": "CTX1", "payload": {"image": "images/thumb_1_2", "target": 0}})
    );
    assert_eq!(*seen.lock().unwrap(), vec![EventKind::WillAppear]);
}

#[tokio::test]
async fn test_cancellation_stops_the_loop() {
    let (listener, params) = local_server().await;

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        // Drain until the plugin closes.
        while let Some(Ok(message)) = ws.next().await {
            if message.is_close() {
                break;
            }
        }
    });

    let deck = StreamDeck::connect(params).await.unwrap();
    let handle = deck.handle();
    let token = CancellationToken::new();
    token.cancel();

    deck.run(&|_: &ReceivedEvent| {}, token).await.unwrap();
    server.await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(handle.is_closed());
    assert!(handle.set_image("CTX1", "x").is_err());
}

#[tokio::test]
async fn test_dropped_connection_is_an_error() {
    let (listener, params) = local_server().await;

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        drop(ws);
    });

    let deck = StreamDeck::connect(params).await.unwrap();
    server.await.unwrap();
    assert!(deck.run(&|_: &ReceivedEvent| {}, CancellationToken::new()).await.is_err());
}

#[tokio::test]
async fn test_connect_refused() {
    let (listener, params) = local_server().await;
    drop(listener);
    assert!(StreamDeck::connect(params).await.is_err());
}
