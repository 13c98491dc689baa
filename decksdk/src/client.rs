//! WebSocket channel to the Stream Deck application
//!
//! [`StreamDeck::connect`] opens the socket and registers the plugin.
//! [`StreamDeck::run`] then reads events until the application closes the
//! channel or the cancellation token fires. Outbound commands go through a
//! cloneable [`StreamDeckHandle`] so that other tasks can push images while
//! the read loop is running.

use crate::args::RegistrationParams;
use crate::commands::{Register, SetImage};
use crate::error::{Error, Result};
use crate::events::ReceivedEvent;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::ops::ControlFlow;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Receives the inbound events
pub trait EventHandler: Send + Sync {
    fn handle_event(&self, event: &ReceivedEvent);
}

impl<F> EventHandler for F
where
    F: Fn(&ReceivedEvent) + Send + Sync,
{
    fn handle_event(&self, event: &ReceivedEvent) {
        self(event)
    }
}

/// Sends commands to the Stream Deck application
#[derive(Debug, Clone)]
pub struct StreamDeckHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl StreamDeckHandle {
    /// Shows `image` on the key identified by `context`
    pub fn set_image(&self, context: &str, image: &str) -> Result<()> {
        self.send_json(&SetImage::new(context, image))
    }

    /// Returns true once the channel to the application is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.send(Message::text(text))
    }

    fn send(&self, message: Message) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| Error::connection("Stream Deck channel closed"))
    }
}

/// Connected and registered plugin
pub struct StreamDeck {
    params: RegistrationParams,
    ws_rx: SplitStream<WsStream>,
    handle: StreamDeckHandle,
    writer: JoinHandle<()>,
}

impl StreamDeck {
    /// Connects to the application and sends the registration message
    pub async fn connect(params: RegistrationParams) -> Result<Self> {
        let url = params.url();
        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
        let (ws_tx, ws_rx) = ws_stream.split();

        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_loop(ws_tx, rx));
        let handle = StreamDeckHandle { tx };

        handle.send_json(&Register {
            event: &params.register_event,
            uuid: &params.plugin_uuid,
        })?;
        tracing::info!(url = %url, plugin = %params.plugin_uuid, "Registered with Stream Deck");

        Ok(Self {
            params,
            ws_rx,
            handle,
            writer,
        })
    }

    pub fn params(&self) -> &RegistrationParams {
        &self.params
    }

    /// Returns a handle for sending commands
    pub fn handle(&self) -> StreamDeckHandle {
        self.handle.clone()
    }

    /// Dispatches inbound events to `handler` until the channel closes or
    /// `token` is cancelled.
    ///
    /// Returns `Ok(())` on cancellation or on a clean close by the
    /// application, and an error when the connection drops.
    pub async fn run<H: EventHandler + ?Sized>(
        mut self,
        handler: &H,
        token: CancellationToken,
    ) -> Result<()> {
        let result = loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("Stream Deck event loop cancelled");
                    break Ok(());
                }
                message = self.ws_rx.next() => {
                    let message = match message {
                        Some(Ok(message)) => message,
                        Some(Err(e)) => break Err(e.into()),
                        None => break Err(Error::connection("Stream Deck closed the connection")),
                    };
                    if let ControlFlow::Break(result) = self.handle_message(message, handler) {
                        break result;
                    }
                }
            }
        };

        let _ = self.handle.send(Message::Close(None));
        drop(self.handle);
        if tokio::time::timeout(std::time::Duration::from_secs(1), &mut self.writer)
            .await
            .is_err()
        {
            self.writer.abort();
        }
        result
    }

    fn handle_message<H: EventHandler + ?Sized>(
        &self,
        message: Message,
        handler: &H,
    ) -> ControlFlow<Result<()>> {
        match message {
            Message::Text(text) => {
                match ReceivedEvent::parse(text.as_str()) {
                    Ok(event) => {
                        tracing::trace!(event = ?event.event, context = ?event.context, "Stream Deck event");
                        handler.handle_event(&event);
                    }
                    Err(e) => tracing::warn!("Ignoring malformed Stream Deck event: {}", e),
                }
                ControlFlow::Continue(())
            }
            Message::Ping(payload) => {
                tracing::trace!("ping -> pong");
                match self.handle.send(Message::Pong(payload)) {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(e) => ControlFlow::Break(Err(e)),
                }
            }
            Message::Close(frame) => {
                tracing::info!(frame = ?frame, "Stream Deck closed the connection");
                ControlFlow::Break(Ok(()))
            }
            _ => ControlFlow::Continue(()),
        }
    }
}

async fn write_loop(
    mut ws_tx: SplitSink<WsStream, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(message) = rx.recv().await {
        let closing = matches!(message, Message::Close(_));
        if let Err(e) = ws_tx.send(message).await {
            tracing::warn!("Cannot send to Stream Deck: {}", e);
            break;
        }
        if closing {
            break;
        }
    }
    let _ = ws_tx.close().await;
}
