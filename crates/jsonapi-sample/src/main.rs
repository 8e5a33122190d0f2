//! # JSON:API Sample
//!
//! Starts the demo [`ApiSystem`], seeds it, and drives a handful of requests
//! through [`Api::handle`](jsonapi_framework::Api::handle), printing each response.
//!
//! ```bash
//! RUST_LOG=info cargo run -p jsonapi-sample
//! RUST_LOG=debug cargo run -p jsonapi-sample -- api.toml
//! ```
//!
//! The optional argument is a TOML [`ApiConfig`] file.

use jsonapi_framework::tracing::setup_tracing;
use jsonapi_framework::{ApiConfig, ApiRequest};
use jsonapi_sample::lifecycle::{ApiSystem, SystemError};
use serde_json::json;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => ApiConfig::load(path)?,
        None => ApiConfig::default().with_link_base("http://localhost:8080"),
    };

    info!("Starting application");
    let system = ApiSystem::start(config)?;
    system.seed().await?;

    let requests = [
        ApiRequest::get("/widgets/1,2"),
        ApiRequest::get("/widgets/3"),
        ApiRequest::get("/widgets/abc"),
        ApiRequest::get("/widgets?owner=10&include=tags"),
        ApiRequest::get("/articles/gears-explained"),
        ApiRequest::get("/authors?name=hopper"),
        ApiRequest::post("/widgets", json!({ "name": "Flywheel", "owner": 11 })),
        ApiRequest::post("/users", json!({ "name": "", "email": "nobody" })),
        ApiRequest::put("/tags/red", json!({ "label": "Red", "color": "#e00" })),
        ApiRequest::delete("/authors/ada"),
        ApiRequest::get("/gadgets/1"),
    ];

    for request in requests {
        let label = format!("{} {}", request.method, request.path);
        let response = system.api.handle(request).await;

        println!("{label} -> {}", response.status);
        if let Some(body) = response.body {
            println!(
                "{}",
                serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
            );
        }
    }

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
