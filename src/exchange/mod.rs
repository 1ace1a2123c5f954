//! Exchange metadata subsystem.
//!
//! # Data Flow
//! ```text
//! ExchangeDefinition (API / config seed)
//!     → model.rs (validate name/comment, parse mode)
//!     → Exchange (typed, consumers empty)
//!     → registry.rs (identity-unique store, copy-out reads)
//! ```
//!
//! # Design Decisions
//! - The registry enforces identity and existence only; field validation
//!   happens at the manager boundary before the broker is touched
//! - Reads return clones; no caller keeps a live handle into the store

pub mod model;
pub mod registry;

pub use model::{Consumer, Exchange, ExchangeDefinition, ExchangeMode, NewConsumer};
pub use registry::ExchangeRegistry;
