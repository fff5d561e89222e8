//! Agricultural land financial scoring: a scoring proxy and its dashboard.
//!
//! - [`proxy`]: `POST /api/agrifinance`, reshaping and forwarding to the
//!   scoring service
//! - [`dashboard`]: form state, reducer, score bands and gauge
//! - [`web`]: the HTTP server hosting both
//! - [`config`], [`logging`], [`cli`]: supporting plumbing

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod proxy;
pub mod web;
