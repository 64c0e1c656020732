//! Artist lookups.

use tracing::debug;

use crate::client::TidalClient;
use crate::config::GetOptions;
use crate::error::Result;
use crate::types::{Artist, Document};

/// Artist operations on the Tidal API.
pub struct ArtistsClient<'a> {
    client: &'a TidalClient,
}

impl<'a> ArtistsClient<'a> {
    pub(crate) fn new(client: &'a TidalClient) -> Self {
        Self { client }
    }

    /// Get an artist by ID.
    pub async fn get(&self, id: &str, options: &GetOptions) -> Result<Artist> {
        let path = format!("artists/{}", id);
        let (document, _) = self
            .client
            .get_json::<Document<Artist>>(&path, options)
            .await?;

        let artist = document.data.into_inner();
        debug!(id = %artist.id, name = %artist.name, "Fetched artist");
        Ok(artist)
    }
}
