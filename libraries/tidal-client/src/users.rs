//! User favorites.

use tracing::debug;

use crate::client::TidalClient;
use crate::config::GetOptions;
use crate::error::Result;
use crate::types::{Artist, ListDocument};

/// User operations on the Tidal API.
pub struct UsersClient<'a> {
    client: &'a TidalClient,
}

impl<'a> UsersClient<'a> {
    pub(crate) fn new(client: &'a TidalClient) -> Self {
        Self { client }
    }

    /// Get the artists a user has marked as favorites, in the order the
    /// server returns them. Use [`GetOptions::limit`] and
    /// [`GetOptions::offset`] to page through large lists.
    pub async fn favorite_artists(
        &self,
        user_id: &str,
        options: &GetOptions,
    ) -> Result<Vec<Artist>> {
        let path = format!("users/{}/favorites/artists", user_id);
        let (document, _) = self
            .client
            .get_json::<ListDocument<Artist>>(&path, options)
            .await?;

        let artists = document.into_items();
        debug!(user_id = %user_id, count = artists.len(), "Fetched favorite artists");
        Ok(artists)
    }
}
