use deckplexamp::client::TIMELINE_POLL_PATH;
use deckplexamp::{ClientBuilder, Error, PlexClient, PlexampClient, PlaybackState};
use mockito::Matcher;

const TIMELINE: &str = r#"<MediaContainer commandID="1">
  <Timeline type="music" state="playing" ratingKey="T1">
    <Track ratingKey="T1" title="Song" thumb="/thumb/1" updatedAt="V1" />
  </Timeline>
</MediaContainer>"#;

fn plexamp(url: &str) -> PlexampClient {
    PlexampClient::builder().base_url(url).build_plexamp().unwrap()
}

fn plex(url: &str) -> PlexClient {
    ClientBuilder::new().base_url(url).build_plex().unwrap()
}

#[tokio::test]
async fn test_current_snapshot() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/player/timeline/poll")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("wait".into(), "0".into()),
            Matcher::UrlEncoded("includeMetadata".into(), "1".into()),
            Matcher::UrlEncoded("commandID".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(TIMELINE)
        .create_async()
        .await;

    let snapshot = plexamp(&server.url())
        .current_snapshot()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(snapshot.rating_key, "T1");
    assert_eq!(snapshot.version.as_deref(), Some("V1"));
    assert_eq!(snapshot.thumb.as_deref(), Some("/thumb/1"));
    assert_eq!(snapshot.state, PlaybackState::Playing);
    mock.assert_async().await;
    assert!(TIMELINE_POLL_PATH.starts_with("/player/timeline/poll?"));
}

#[tokio::test]
async fn test_current_snapshot_without_music() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/player/timeline/poll")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"<MediaContainer><Timeline type="video" state="stopped"/></MediaContainer>"#)
        .create_async()
        .await;

    let snapshot = plexamp(&server.url()).current_snapshot().await.unwrap();
    assert!(snapshot.is_none());
}

#[tokio::test]
async fn test_timeline_http_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/player/timeline/poll")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let err = plexamp(&server.url()).current_snapshot().await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 500, .. }), "{err:?}");
}

#[tokio::test]
async fn test_timeline_garbage_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/player/timeline/poll")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<MediaContainer><Timeline")
        .create_async()
        .await;

    let err = plexamp(&server.url()).current_snapshot().await.unwrap_err();
    assert!(matches!(err, Error::Xml(_)), "{err:?}");
}

#[tokio::test]
async fn test_unreachable_player() {
    // Nothing listens on port 9 (discard) in the test environment.
    let err = plexamp("http://127.0.0.1:9")
        .current_snapshot()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)), "{err:?}");
}

#[tokio::test]
async fn test_fetch_thumbnail() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/library/metadata/1/thumb/2")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(b"\x89PNG\r\n\x1a\nfake".as_slice())
        .expect(1)
        .create_async()
        .await;

    let bytes = plex(&server.url())
        .fetch_thumbnail("/library/metadata/1/thumb/2")
        .await
        .unwrap()
        .unwrap();

    assert!(bytes.starts_with(b"\x89PNG"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_thumbnail_empty_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/thumb/empty")
        .with_status(200)
        .create_async()
        .await;

    let bytes = plex(&server.url()).fetch_thumbnail("/thumb/empty").await.unwrap();
    assert!(bytes.is_none());
}

#[tokio::test]
async fn test_fetch_thumbnail_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/thumb/missing")
        .with_status(404)
        .create_async()
        .await;

    let err = plex(&server.url())
        .fetch_thumbnail("/thumb/missing")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Status { status: 404, .. }), "{err:?}");
}

#[tokio::test]
async fn test_verify_connections() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/resources")
        .with_status(200)
        .with_body("<MediaContainer/>")
        .create_async()
        .await;
    server
        .mock("GET", "/identity")
        .with_status(401)
        .create_async()
        .await;

    plexamp(&server.url()).verify_connection().await.unwrap();
    assert!(plex(&server.url()).verify_connection().await.is_err());
}
