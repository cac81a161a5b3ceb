//! Serial link plumbing.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Link Stack                          │
//! │                                                          │
//! │  ┌───────────┐   ┌────────────┐   ┌──────────────────┐   │
//! │  │ Transport │──▶│  Listener  │──▶│   SharedState    │   │
//! │  │ (reader)  │   │  (thread)  │   │ (latest record)  │   │
//! │  └───────────┘   └────────────┘   └──────────────────┘   │
//! │                                            ▲             │
//! │  ┌───────────┐                             │             │
//! │  │ Transport │◀── LinkSession ─────────────┘             │
//! │  │ (writer)  │    (commands, verdict queries)            │
//! │  └───────────┘                                           │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub(crate) mod listener;
pub(crate) mod shared;
pub mod transport;

pub use shared::LinkStatus;
