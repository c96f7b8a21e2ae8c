// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Log lines are built from small message structs (see [`messages`]) that
//! implement `Display`, so the wording of every event lives in one place and
//! call sites stay free of format strings.
//!
//! # Usage
//!
//! ```rust
//! use the_canopy::observability::messages::node::NodeSkipped;
//! use the_canopy::observability::messages::StructuredLog;
//!
//! NodeSkipped { node_id: "send_invoice", flow_id: Some("billing") }.log();
//! ```

pub mod messages;
mod subscriber;

pub use subscriber::init_tracing;
