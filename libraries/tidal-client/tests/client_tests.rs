//! Tests for the Tidal API client request pipeline.
//!
//! These tests use mock servers to verify client behavior without
//! requiring real API credentials.

use std::time::Duration;

use tidal_client::{ClientConfig, GetOptions, TidalClient, TidalClientError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a client-credentials token endpoint and returns a client whose
/// API and auth base URLs both point at the mock server.
async fn setup_client(mock_server: &MockServer) -> TidalClient {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "test_token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(mock_server)
        .await;

    let config = ClientConfig::new("client_id")
        .with_client_secret("client_secret")
        .with_base_url(format!("{}/v2/", mock_server.uri()))
        .with_auth_url(mock_server.uri());

    TidalClient::client_credentials(config).unwrap()
}

// =============================================================================
// Envelope Decoding Tests
// =============================================================================

mod envelope {
    use super::*;

    #[tokio::test]
    async fn test_get_artist_promotes_top_level_id() {
        let mock_server = MockServer::start().await;
        let client = setup_client(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v2/artists/123"))
            .and(header("Authorization", "Bearer test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "id": "123",
                    "type": "artists",
                    "attributes": {
                        "id": "999",
                        "name": "Test Artist",
                        "popularity": 0.78,
                        "artistTypes": ["MAIN"]
                    }
                }
            })))
            .mount(&mock_server)
            .await;

        let artist = client
            .artists()
            .get("123", &GetOptions::new())
            .await
            .unwrap();

        // The envelope's top-level id always wins over the attribute-level one.
        assert_eq!(artist.id, "123");
        assert_eq!(artist.name, "Test Artist");
        assert_eq!(artist.artist_types, vec!["MAIN".to_string()]);
    }

    #[tokio::test]
    async fn test_get_album_with_embedded_artists() {
        let mock_server = MockServer::start().await;
        let client = setup_client(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v2/albums/456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "id": "456",
                    "type": "albums",
                    "attributes": {
                        "title": "Test Album",
                        "numberOfTracks": 12,
                        "releaseDate": "2024-03-01",
                        "explicit": false,
                        "copyright": {"text": "(c) 2024 Test Label"},
                        "artist": {"id": "a1", "name": "Main Artist"},
                        "artists": [
                            {"id": "a1", "name": "Main Artist"},
                            {"id": "a2", "name": "Featured Artist"}
                        ]
                    }
                }
            })))
            .mount(&mock_server)
            .await;

        let album = client.albums().get("456", &GetOptions::new()).await.unwrap();

        assert_eq!(album.id, "456");
        assert_eq!(album.title, "Test Album");
        assert_eq!(album.number_of_tracks, 12);
        assert_eq!(album.copyright.text, "(c) 2024 Test Label");
        assert_eq!(album.artist.unwrap().name, "Main Artist");
        assert_eq!(album.artists.len(), 2);
    }

    #[tokio::test]
    async fn test_get_track_with_embedded_album() {
        let mock_server = MockServer::start().await;
        let client = setup_client(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v2/tracks/789"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "id": "789",
                    "type": "tracks",
                    "attributes": {
                        "title": "Test Track",
                        "trackNumber": 4,
                        "volumeNumber": 1,
                        "isrc": "USRC12345678",
                        "audioQuality": "LOSSLESS",
                        "artist": {"id": "a1", "name": "Artist"},
                        "album": {"id": "al1", "title": "Parent Album"}
                    }
                }
            })))
            .mount(&mock_server)
            .await;

        let track = client.tracks().get("789", &GetOptions::new()).await.unwrap();

        assert_eq!(track.id, "789");
        assert_eq!(track.track_number, 4);
        assert_eq!(track.isrc, "USRC12345678");
        assert_eq!(track.album.unwrap().title, "Parent Album");
    }

    #[tokio::test]
    async fn test_favorite_artists_preserve_order_and_ids() {
        let mock_server = MockServer::start().await;
        let client = setup_client(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v2/users/u1/favorites/artists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"id": "a1", "type": "artists", "attributes": {"name": "First"}},
                    {"id": "a2", "type": "artists", "attributes": {"name": "Second"}}
                ],
                "links": {"next": "/users/u1/favorites/artists?offset=2"},
                "meta": {"total": 2}
            })))
            .mount(&mock_server)
            .await;

        let artists = client
            .users()
            .favorite_artists("u1", &GetOptions::new())
            .await
            .unwrap();

        assert_eq!(artists.len(), 2);
        assert_eq!(artists[0].id, "a1");
        assert_eq!(artists[0].name, "First");
        assert_eq!(artists[1].id, "a2");
        assert_eq!(artists[1].name, "Second");
    }
}

// =============================================================================
// Request Construction Tests
// =============================================================================

mod request_construction {
    use super::*;

    #[tokio::test]
    async fn test_options_become_query_parameters() {
        let mock_server = MockServer::start().await;
        let client = setup_client(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v2/artists/1"))
            .and(query_param("countryCode", "US"))
            .and(query_param("limit", "10"))
            .and(query_param("offset", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": "1", "type": "artists", "attributes": {"name": "X"}}
            })))
            .mount(&mock_server)
            .await;

        let options = GetOptions::new().country_code("US").limit(10).offset(20);
        let result = client.artists().get("1", &options).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_token_is_exchanged_once_and_reused() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "test_token",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v2/artists/1"))
            .and(header("Authorization", "Bearer test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": "1", "type": "artists", "attributes": {"name": "X"}}
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        let config = ClientConfig::new("client_id")
            .with_client_secret("client_secret")
            .with_base_url(format!("{}/v2/", mock_server.uri()))
            .with_auth_url(mock_server.uri());
        let client = TidalClient::client_credentials(config).unwrap();

        client.artists().get("1", &GetOptions::new()).await.unwrap();
        client.artists().get("1", &GetOptions::new()).await.unwrap();
    }
}

// =============================================================================
// Status and Body Handling Tests
// =============================================================================

mod status_handling {
    use super::*;

    #[tokio::test]
    async fn test_404_yields_unexpected_status() {
        let mock_server = MockServer::start().await;
        let client = setup_client(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v2/artists/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("artist not found"))
            .mount(&mock_server)
            .await;

        let result = client.artists().get("missing", &GetOptions::new()).await;

        match result.unwrap_err() {
            TidalClientError::UnexpectedStatus { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("not found"));
            }
            e => panic!("Expected UnexpectedStatus, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_error_body_is_never_decoded_as_success() {
        let mock_server = MockServer::start().await;
        let client = setup_client(&mock_server).await;

        // A well-formed envelope on a 500 must still fail.
        Mock::given(method("GET"))
            .and(path("/v2/artists/1"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "data": {"id": "1", "type": "artists", "attributes": {"name": "X"}}
            })))
            .mount(&mock_server)
            .await;

        let result = client.artists().get("1", &GetOptions::new()).await;

        assert!(matches!(
            result.unwrap_err(),
            TidalClientError::UnexpectedStatus { status: 500, .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_body_is_no_content_not_an_error() {
        let mock_server = MockServer::start().await;
        let client = setup_client(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v2/artists/1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let artist = client
            .artists()
            .get("1", &GetOptions::new())
            .await
            .unwrap();

        // No content: the target is left at its default.
        assert_eq!(artist.id, "");
        assert_eq!(artist.name, "");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_failure() {
        let mock_server = MockServer::start().await;
        let client = setup_client(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v2/artists/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
            .mount(&mock_server)
            .await;

        let result = client.artists().get("1", &GetOptions::new()).await;

        assert!(matches!(
            result.unwrap_err(),
            TidalClientError::Decode(_)
        ));
    }

    #[tokio::test]
    async fn test_deadline_expiry_yields_cancelled() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "test_token",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v2/artists/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(serde_json::json!({
                        "data": {"id": "1", "type": "artists", "attributes": {"name": "X"}}
                    })),
            )
            .mount(&mock_server)
            .await;

        let config = ClientConfig::new("client_id")
            .with_client_secret("client_secret")
            .with_base_url(format!("{}/v2/", mock_server.uri()))
            .with_auth_url(mock_server.uri())
            .with_timeout(Duration::from_millis(100));
        let client = TidalClient::client_credentials(config).unwrap();

        let result = client.artists().get("1", &GetOptions::new()).await;

        assert!(matches!(result.unwrap_err(), TidalClientError::Cancelled));
    }
}

// =============================================================================
// Raw Pass-Through Tests
// =============================================================================

mod raw_passthrough {
    use super::*;

    #[tokio::test]
    async fn test_raw_bytes_stream_through_unchanged() {
        let mock_server = MockServer::start().await;
        let client = setup_client(&mock_server).await;

        let payload: &[u8] = b"\x00\x01binary payload\xff";
        Mock::given(method("GET"))
            .and(path("/v2/images/cover"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload))
            .mount(&mock_server)
            .await;

        let mut sink: Vec<u8> = Vec::new();
        let meta = client
            .get_raw("images/cover", &GetOptions::new(), &mut sink)
            .await
            .unwrap();

        assert_eq!(meta.status.as_u16(), 200);
        assert_eq!(sink, payload);
    }

    #[tokio::test]
    async fn test_raw_non_2xx_is_unexpected_status() {
        let mock_server = MockServer::start().await;
        let client = setup_client(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v2/images/cover"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&mock_server)
            .await;

        let mut sink: Vec<u8> = Vec::new();
        let result = client
            .get_raw("images/cover", &GetOptions::new(), &mut sink)
            .await;

        assert!(matches!(
            result.unwrap_err(),
            TidalClientError::UnexpectedStatus { status: 403, .. }
        ));
        assert!(sink.is_empty());
    }
}
