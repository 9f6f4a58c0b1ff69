//! # axiom-client - a typed client for the Axiom HTTP API
//!
//! The crate wraps `reqwest` with everything needed to talk to Axiom:
//! credential resolution from options and the environment, authentication and
//! organization headers, local checks of what an API token may access, JSON
//! decoding with an optional strict mode, and a structured error model.
//!
//! ## Quick Start
//!
//! ```no_run
//! use axiom_client::Client;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), axiom_client::Error> {
//!     // Uses AXIOM_TOKEN and, for personal tokens, AXIOM_ORG_ID.
//!     let client = Client::new()?;
//!
//!     client
//!         .datasets()
//!         .ingest_events("my-dataset", &[json!({"foo": "bar"})])
//!         .await?;
//!
//!     let res = client
//!         .datasets()
//!         .apl_query("['my-dataset'] | count", &Default::default())
//!         .await?;
//!     println!("Queried {:?}", res.datasets);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! Explicit builder options win over the `AXIOM_URL`, `AXIOM_TOKEN` and
//! `AXIOM_ORG_ID` environment variables, which win over the defaults. A
//! personal token (`xapt-`) used against Axiom Cloud needs an organization
//! ID; an API token (`xaat-`) is already bound to one.
//!
//! ```no_run
//! use axiom_client::Client;
//!
//! # fn example() -> Result<(), axiom_client::Error> {
//! let client = Client::builder()
//!     .cloud_config("xapt-...", "my-org-1234")?
//!     .strict_decoding(true)
//!     .no_env()
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```no_run
//! use axiom_client::{Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::new()?;
//! match client.teams().list().await {
//!     Ok(teams) => println!("{} teams", teams.len()),
//!     Err(Error::UnprivilegedToken) => eprintln!("API tokens cannot list teams"),
//!     Err(Error::Unauthenticated(_)) => eprintln!("Log in again"),
//!     Err(Error::Api(err)) => eprintln!("{}", err),
//!     Err(Error::DeserializationFailed { raw_response, serde_error, .. }) => {
//!         eprintln!("Unexpected payload {}: {}", raw_response, serde_error);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod apl;
mod client;
pub mod config;
pub mod datasets;
mod decode;
pub mod encoding;
mod error;
pub mod notifiers;
mod request;
mod response;
pub mod teams;
pub mod token;
pub mod tokens;
pub mod version;

pub use client::{Client, ORG_ID_HEADER};
pub use config::{ClientBuilder, ClientConfig};
pub use error::{ApiError, Error, Result};
pub use http::Method;
pub use request::ApiRequest;
pub use response::Response;
pub use token::TokenKind;
