use serde::Serialize;

use crate::services::Notification;

/// Messages broadcast to all connected dashboard WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    #[serde(rename = "notification")]
    Notification(Notification),

    /// The masters list page has fresh data; clients should re-read it.
    #[serde(rename = "masters_updated")]
    MastersUpdated,

    #[serde(rename = "master_updated")]
    MasterUpdated { address: String },

    /// The session ended; clients should leave authenticated views.
    #[serde(rename = "session_ended")]
    SessionEnded,
}
