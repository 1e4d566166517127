//! Client library for the Chime streaming service: QR device login,
//! session/token management, and track search.
//!
//! The library is designed to sit behind the C-ABI bridge crate but is
//! usable on its own. All remote traffic goes through the [`RemoteService`]
//! seam, so tests drive the login and session state machines with an
//! in-memory fake instead of a network.

pub mod client;
pub mod cover;
pub mod qr;
pub mod remote;
pub mod search;
pub mod session;
pub mod transport;
pub mod wire;

pub use client::ChimeClient;
pub use cover::{cover_url, CoverKind};
pub use qr::{QrLoginAttempt, QrStatus};
pub use remote::{HttpRemoteService, QrKeyIssued, QrPollReply, RemoteService, SessionGrant};
pub use search::{SearchOutcome, DEFAULT_SEARCH_LIMIT};
pub use session::{Session, SessionManager, SessionState};
