//! # Replyref Core Library
//!
//! Construction, sanitization and change detection for reply references: the
//! metadata telling that one chat message replies to another, possibly in a
//! different chat, possibly to a message that no longer exists locally, and
//! possibly with a quoted excerpt of the original text.
//!
//! Reply headers arrive from the server untrusted. [`ReplyReference::from_wire`]
//! turns a header into a consistent value, dropping whatever contradicts the
//! context of the owning message and reporting it as a [`ReplyAnomaly`].
//!
//! ```
//! use replyref_core::models::{ChatId, MessageId, UserId};
//! use replyref_core::reply::ReplyReference;
//!
//! let reply = ReplyReference::for_outgoing(MessageId::Server(500));
//! assert_eq!(reply.target_message_id(), Some(MessageId::Server(500)));
//!
//! let view = reply.to_view(ChatId::User(UserId(7))).unwrap();
//! assert_eq!(view.chat_id, 7);
//! ```

pub mod environment;
pub mod error;
pub mod models;
pub mod reply;
pub mod services;
pub mod wire;

pub use error::{FormatError, OriginError, ReplyAnomaly, ReplyError};
pub use reply::{needs_change_notification, ReplyOwner, ReplyReference, Sanitized};
