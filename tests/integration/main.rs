//! Workspace integration tests: the HTTP query surface and the live
//! WebSocket protocol over in-memory stores.

mod chat_test;
mod helpers;
mod ws_test;
