//! WebSocket Handler
//!
//! Upgrades a request into a live goal page and runs one goal tracker for
//! the lifetime of the socket.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, Stream, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::{PageHub, PageId};
use super::messages::{ClientMessage, ServerMessage};
use crate::api::{ApiResult, AppState, ProgressService};
use crate::auth::Session;
use crate::tracker::GoalTracker;

/// Query parameters of the upgrade request
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Session id returned by `POST /api/v1/auth/session`
    pub session: String,
}

/// `GET /api/v1/ws?session=<id>`
///
/// The session is resolved before upgrading, so an unknown session is
/// answered with 401 and never subscribes.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(params): Query<WsParams>,
) -> ApiResult<Response> {
    let session = state.sessions.get(&params.session).await?;
    Ok(ws.on_upgrade(move |socket| run_page(socket, state, session)))
}

/// An open page's handle into the hub
struct OpenPage {
    hub: Arc<PageHub>,
    id: PageId,
}

impl OpenPage {
    async fn push(&self, message: ServerMessage) {
        if let Err(e) = self.hub.send(&self.id, message).await {
            tracing::debug!(page_id = %self.id, error = %e, "Dropped outgoing message");
        }
    }
}

async fn run_page(socket: WebSocket, state: Arc<AppState>, session: Session) {
    let (mut sink, stream) = socket.split();
    let (outbox, inbox) = mpsc::unbounded_channel::<ServerMessage>();

    let page = match state.ws_hub.open(&session.user_id, outbox).await {
        Ok(id) => OpenPage {
            hub: Arc::clone(&state.ws_hub),
            id,
        },
        Err(e) => {
            tracing::warn!(user_id = %session.user_id, error = %e, "Refusing goal page");
            if let Ok(text) = serde_json::to_string(&ServerMessage::error(e.to_string())) {
                let _ = sink.send(Message::Text(text)).await;
            }
            return;
        }
    };

    page.push(ServerMessage::Connected {
        connection_id: page.id.clone(),
        user_id: session.user_id.clone(),
    })
    .await;

    let mut writer = tokio::spawn(write_outbox(sink, inbox, page.id.clone()));
    let mut tracker = GoalTracker::with_session(Arc::clone(&state.progress), session);

    tokio::select! {
        _ = drive_page(&page, &mut tracker, stream) => {}
        _ = &mut writer => {}
    }

    page.hub.close(&page.id).await;
    if !writer.is_finished() {
        let _ = writer.await;
    }
}

/// Snapshot → view, click → write, until the client or the store goes away
async fn drive_page<I>(
    page: &OpenPage,
    tracker: &mut GoalTracker<ProgressService>,
    mut incoming: I,
) where
    I: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let mut subscription = match tracker.subscribe().await {
        Ok(subscription) => subscription,
        Err(e) => {
            tracing::error!(page_id = %page.id, error = %e, "Error subscribing to user progress");
            page.push(ServerMessage::error(e.to_string())).await;
            return;
        }
    };

    loop {
        tokio::select! {
            snapshot = subscription.next() => match snapshot {
                Some(Ok(progress)) => {
                    let rendered = tracker.apply_snapshot(progress);
                    page.push(ServerMessage::view(rendered)).await;
                }
                Some(Err(e)) => {
                    tracing::error!(page_id = %page.id, error = %e, "Error fetching user progress");
                    page.push(ServerMessage::error(e.to_string())).await;
                    break;
                }
                None => break,
            },
            message = incoming.next() => match message {
                Some(Ok(message)) => {
                    if !on_socket_message(page, tracker, message).await {
                        break;
                    }
                }
                Some(Err(e)) => {
                    tracing::debug!(page_id = %page.id, error = %e, "WebSocket receive error");
                    break;
                }
                None => break,
            },
        }
    }
}

/// Drain queued messages onto the socket until the page closes
async fn write_outbox(
    mut sink: SplitSink<WebSocket, Message>,
    mut inbox: mpsc::UnboundedReceiver<ServerMessage>,
    page_id: PageId,
) {
    while let Some(message) = inbox.recv().await {
        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize message");
                continue;
            }
        };
        if sink.send(Message::Text(text)).await.is_err() {
            tracing::debug!(page_id = %page_id, "WebSocket send failed, closing page");
            break;
        }
    }
}

/// Returns false once the client asked to close
async fn on_socket_message(
    page: &OpenPage,
    tracker: &GoalTracker<ProgressService>,
    message: Message,
) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(request) => on_client_message(page, tracker, request).await,
                Err(e) => {
                    tracing::debug!(page_id = %page.id, error = %e, "Invalid client message");
                    page.push(ServerMessage::error(format!("Invalid message format: {}", e)))
                        .await;
                }
            }
            true
        }
        Message::Binary(_) => {
            page.push(ServerMessage::error("Binary messages not supported")).await;
            true
        }
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => false,
    }
}

async fn on_client_message(
    page: &OpenPage,
    tracker: &GoalTracker<ProgressService>,
    request: ClientMessage,
) {
    match request {
        ClientMessage::Complete { goal_id } => match tracker.complete_goal(&goal_id).await {
            Ok(completion) => {
                page.push(ServerMessage::Completed {
                    goal_id,
                    status: completion.into(),
                })
                .await;
            }
            Err(e) => {
                tracing::error!(page_id = %page.id, goal_id = %goal_id, error = %e, "Error updating objective");
                page.push(ServerMessage::error(e.to_string())).await;
            }
        },
        ClientMessage::Ping => page.push(ServerMessage::Pong).await,
    }
}
