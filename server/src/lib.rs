//! Transport and session plumbing for the shared Hold'em table: WebSocket
//! connection handling, command/event wire types, and the single-writer
//! table actor. All game logic lives in `holdem_engine`; this crate only
//! identifies clients, serializes/deserializes the wire protocol, and
//! serializes access to the one `holdem_engine::Table` on this server.

pub mod actor;
pub mod protocol;
