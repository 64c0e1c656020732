//! Album lookups.

use tracing::debug;

use crate::client::TidalClient;
use crate::config::GetOptions;
use crate::error::Result;
use crate::types::{Album, Document};

/// Album operations on the Tidal API.
pub struct AlbumsClient<'a> {
    client: &'a TidalClient,
}

impl<'a> AlbumsClient<'a> {
    pub(crate) fn new(client: &'a TidalClient) -> Self {
        Self { client }
    }

    /// Get an album by ID.
    pub async fn get(&self, id: &str, options: &GetOptions) -> Result<Album> {
        let path = format!("albums/{}", id);
        let (document, _) = self
            .client
            .get_json::<Document<Album>>(&path, options)
            .await?;

        let album = document.data.into_inner();
        debug!(id = %album.id, title = %album.title, "Fetched album");
        Ok(album)
    }
}
