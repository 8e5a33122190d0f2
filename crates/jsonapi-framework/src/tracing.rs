//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); events carry the
//! resource and relation they concern as structured fields instead.
//!
//! ```bash
//! RUST_LOG=info cargo run     # one line per request with its final status
//! RUST_LOG=debug cargo run    # batch fetches, id counts, store operations
//! ```
//!
//! With `RUST_LOG=debug`, a `GET /widgets/1,2` that includes an owner reads:
//!
//! ```text
//! DEBUG handle:Fetched primary resource="widgets" requested=2 fetched=2
//! DEBUG handle:Batch fetch relation=owner target=users count=1
//! DEBUG handle:Get resource="user" count=1 found=1
//!  INFO handle:Request served status=200
//! ```
//!
//! Failed requests log a single `WARN` carrying the status and the error.

/// Initializes the global subscriber. Call once, at process start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
