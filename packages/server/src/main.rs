#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hydrant map server binary.

#[actix_web::main]
async fn main() -> Result<(), hydrant_map_server::ServerError> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    hydrant_map_server::run_server().await
}
