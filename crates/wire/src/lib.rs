// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed JSON request/response protocol carried on the daemon's
//! Unix domain socket — the submission and control surface spec.md leaves
//! to an external ingress, expressed with this codebase's own IPC idiom
//! instead of an HTTP framework.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;
mod response;
mod wire;

pub use request::Request;
pub use response::Response;
pub use wire::{decode, encode, read_message, read_request, write_message, write_response, ProtocolError, MAX_MESSAGE_LEN};
