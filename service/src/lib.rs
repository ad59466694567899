//! Service facade for the tally reputation ledger.
//!
//! Owns the [`VoteLedger`] and [`PoolScheduler`], exposes the operations the
//! chat-gateway layer calls, and translates ledger errors into the short
//! human-readable strings users actually see. Also home to configuration
//! loading and structured-logging initialisation.

pub mod config;
pub mod error;
pub mod logging;
pub mod service;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use logging::{init_logging, LogFormat};
pub use service::{ReputationService, UserStats, VoteReply};
