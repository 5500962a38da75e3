use crate::component::ChatComponent;
use std::time::SystemTime;

/// What the play-state read loop surfaces to the application.
#[derive(Debug, Clone)]
pub enum Event {
    /// The session reached Play and the read loop is running.
    Ready { username: String },
    /// A keep-alive arrived and was echoed back.
    KeepAlive { id: i64 },
    ChatMessage {
        component: ChatComponent,
        /// The component flattened to visible text.
        message: String,
        sender: String,
        time: SystemTime,
    },
    /// The server closed the session, or the transport failed. This is the
    /// read loop's final event.
    Disconnect { reason: String },
}
