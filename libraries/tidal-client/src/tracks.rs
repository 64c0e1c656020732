//! Track lookups.

use tracing::debug;

use crate::client::TidalClient;
use crate::config::GetOptions;
use crate::error::Result;
use crate::types::{Document, Track};

/// Track operations on the Tidal API.
pub struct TracksClient<'a> {
    client: &'a TidalClient,
}

impl<'a> TracksClient<'a> {
    pub(crate) fn new(client: &'a TidalClient) -> Self {
        Self { client }
    }

    /// Get a track by ID.
    pub async fn get(&self, id: &str, options: &GetOptions) -> Result<Track> {
        let path = format!("tracks/{}", id);
        let (document, _) = self
            .client
            .get_json::<Document<Track>>(&path, options)
            .await?;

        let track = document.data.into_inner();
        debug!(id = %track.id, title = %track.title, "Fetched track");
        Ok(track)
    }
}
