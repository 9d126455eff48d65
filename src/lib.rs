//! Financial computation engine for self-employed bookkeeping.
//!
//! [`core`] holds the pure engine: bracket allocation, revenue and
//! obligation aggregation, summaries and balance projection. [`input`] reads
//! ledger snapshots into engine types at the boundary.

pub mod core;
pub mod input;
