//! # Network Model
//!
//! The data the checker operates on: gene declarations, discrete states and
//! the regulation rules that drive the asynchronous update semantics. These
//! types cross every boundary: loader ↔ state graph ↔ evaluator ↔ user.
//!
//! This module is pure data plus validation — no I/O, no evaluation logic.

pub mod loader;
pub mod network;
pub mod state;

pub use loader::{Document, Region};
pub use network::{Gene, GeneId, Network, NetworkSpec};
pub use state::{Level, State, StateId};
