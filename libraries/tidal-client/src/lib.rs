//! Tidal API Client
//!
//! HTTP client library for the Tidal API.
//!
//! # Features
//!
//! - **Authentication**: OAuth2 client-credentials and
//!   authorization-code-with-PKCE grants, with transparent token refresh
//! - **Catalog lookups**: artists, albums, tracks
//! - **User favorites**: a user's favorite artists
//!
//! # Example
//!
//! ```ignore
//! use tidal_client::{ClientConfig, GetOptions, TidalClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("client_id").with_client_secret("client_secret");
//!     let client = TidalClient::client_credentials(config)?;
//!
//!     let options = GetOptions::new().country_code("US");
//!     let artist = client.artists().get("3566", &options).await?;
//!     println!("{}", artist.name);
//!
//!     Ok(())
//! }
//! ```
//!
//! For user-level access, run the PKCE flow first:
//!
//! ```ignore
//! use tidal_client::{ClientConfig, PkceAuthorization, TidalClient};
//!
//! let config = ClientConfig::new("client_id")
//!     .with_redirect_uri("http://localhost:3000/callback");
//! let pkce = PkceAuthorization::new(&config)?;
//!
//! // Send the user to pkce.authorize_url(&state), then exchange the code
//! // the identity provider redirects back with:
//! let credential = pkce.exchange(&code).await?;
//! let client = TidalClient::with_credential(config, credential)?;
//! ```

mod albums;
mod artists;
mod auth;
mod client;
mod config;
mod error;
mod tracks;
mod types;
mod users;

// Re-export main types
pub use auth::{Authenticator, Credential, PkceAuthorization, TokenResponse};
pub use client::{ResponseMeta, TidalClient};
pub use config::{ClientConfig, GetOptions};
pub use error::{Result, TidalClientError};
pub use types::{
    Album, Artist, Copyright, Document, Identified, Links, ListDocument, Meta, Resource, Track,
};

// Re-export sub-clients for direct use if needed
pub use albums::AlbumsClient;
pub use artists::ArtistsClient;
pub use tracks::TracksClient;
pub use users::UsersClient;
