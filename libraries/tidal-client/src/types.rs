//! Wire envelope and domain entities for the Tidal API.
//!
//! The API wraps every resource in a JSON:API style envelope:
//!
//! ```json
//! {"data": {"id": "123", "type": "artists", "attributes": {...}}}
//! ```
//!
//! The authoritative identifier is the envelope's top-level `id`. An `id`
//! nested inside `attributes` may be absent or differ, so unwrapping an
//! envelope always overwrites the entity's `id` field with the top-level
//! value.

use serde::{Deserialize, Serialize};

/// An entity whose identifier is sourced from the envelope.
pub trait Identified {
    fn set_id(&mut self, id: String);
}

/// A single resource as it appears on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Resource<T> {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub resource_type: String,
    pub attributes: T,
}

impl<T: Identified> Resource<T> {
    /// Unwrap the attributes, promoting the envelope's top-level id.
    pub fn into_inner(self) -> T {
        let mut entity = self.attributes;
        entity.set_id(self.id);
        entity
    }
}

/// Envelope around a single resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document<T> {
    pub data: Resource<T>,
}

/// Envelope around a list of resources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDocument<T> {
    #[serde(default)]
    pub data: Vec<Resource<T>>,
    #[serde(default)]
    pub links: Links,
    #[serde(default)]
    pub meta: Meta,
}

impl<T: Identified> ListDocument<T> {
    /// Flatten the list envelope into entities, in input order, promoting
    /// each element's top-level id.
    pub fn into_items(self) -> Vec<T> {
        self.data.into_iter().map(Resource::into_inner).collect()
    }
}

/// Pagination links attached to a list envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

/// List metadata attached to a list envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub total: Option<u64>,
}

/// A Tidal artist.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub url: String,
    pub picture: String,
    pub popularity: f64,
    pub artist_types: Vec<String>,
}

impl Identified for Artist {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Copyright notice embedded in albums and tracks.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Copyright {
    pub text: String,
}

/// A Tidal album.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub duration: String,
    pub stream_ready: bool,
    pub stream_start_date: String,
    pub allow_streaming: bool,
    pub premium_streaming_only: bool,
    pub number_of_tracks: u32,
    pub number_of_items: u32,
    pub number_of_videos: u32,
    pub number_of_volumes: u32,
    pub release_date: String,
    pub copyright: Copyright,
    #[serde(rename = "type")]
    pub album_type: String,
    pub version: String,
    pub url: String,
    pub cover: String,
    pub video_cover: String,
    pub explicit: bool,
    pub upc: String,
    pub popularity: f64,
    pub audio_quality: String,
    pub audio_modes: Vec<String>,
    /// Primary artist, embedded rather than fetched separately
    pub artist: Option<Artist>,
    pub artists: Vec<Artist>,
}

impl Identified for Album {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// A Tidal track.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub duration: String,
    pub replay_gain: f64,
    pub peak: f64,
    pub allow_streaming: bool,
    pub stream_ready: bool,
    pub stream_start_date: String,
    pub premium_streaming_only: bool,
    pub track_number: u32,
    pub volume_number: u32,
    pub version: String,
    pub popularity: f64,
    pub copyright: Copyright,
    pub url: String,
    pub isrc: String,
    pub editable: bool,
    pub explicit: bool,
    pub audio_quality: String,
    pub audio_modes: Vec<String>,
    /// Primary artist, embedded rather than fetched separately
    pub artist: Option<Artist>,
    pub artists: Vec<Artist>,
    /// Parent album, embedded rather than fetched separately
    pub album: Option<Album>,
}

impl Identified for Track {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
