//! WebSocket Live Goal Page
//!
//! Each WebSocket connection plays the role of one open goal page: it is
//! bound to a signed-in session, subscribes to that user's progress
//! document, and receives a freshly rendered view after every snapshot.
//!
//! ## Architecture
//!
//! - **PageHub**: Tracks open pages and enforces the page limit
//! - **Handler**: Upgrade, per-connection tracker loop, message handling
//! - **Messages**: Client and server message formats
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket(`ws://localhost:8090/api/v1/ws?session=${sessionId}`);
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'view') render(msg.goals, msg.chart_config);
//! };
//!
//! button.onclick = () => ws.send(JSON.stringify({type: 'complete', goal_id: 'goal_listen'}));
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::{websocket_handler, WsParams};
pub use hub::{HubConfig, HubError, PageHub, PageId};
pub use messages::{ClientMessage, CompletionStatus, ServerMessage};
