//! Data models for the Plexamp timeline poll
//!
//! The wire structures mirror the `MediaContainer` XML document returned by
//! `/player/timeline/poll`. Only the attributes PlexDeck needs are declared,
//! everything else in the payload is ignored by the deserializer.
//!
//! The wire structures are converted into a [`PlaybackSnapshot`] at the
//! boundary: empty attributes become `None` so that the rest of the
//! application never has to tell an absent value from an empty one.

use serde::Deserialize;

/// Timeline type reported for audio playback
pub const MUSIC_TIMELINE: &str = "music";

// ============================================================================
// Wire models
// ============================================================================

/// Root element of the timeline poll response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename = "MediaContainer")]
pub struct MediaContainer {
    #[serde(rename = "@commandID", default)]
    pub command_id: Option<String>,

    /// One entry per timeline type (music, video, photo)
    #[serde(rename = "Timeline", default)]
    pub timelines: Vec<Timeline>,
}

/// A `Timeline` entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Timeline {
    #[serde(rename = "@type", default)]
    pub kind: Option<String>,

    #[serde(rename = "@state", default)]
    pub state: Option<String>,

    #[serde(rename = "@ratingKey", default)]
    pub rating_key: Option<String>,

    #[serde(rename = "@time", default)]
    pub time: Option<String>,

    #[serde(rename = "@duration", default)]
    pub duration: Option<String>,

    #[serde(rename = "Track", default)]
    pub track: Option<Track>,
}

/// Track metadata nested in a `Timeline` when `includeMetadata=1`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Track {
    #[serde(rename = "@ratingKey", default)]
    pub rating_key: Option<String>,

    #[serde(rename = "@title", default)]
    pub title: Option<String>,

    #[serde(rename = "@grandparentTitle", default)]
    pub grandparent_title: Option<String>,

    #[serde(rename = "@parentTitle", default)]
    pub parent_title: Option<String>,

    /// Artwork path on the Plex server, e.g. `/library/metadata/355914/thumb/1724958934`
    #[serde(rename = "@thumb", default)]
    pub thumb: Option<String>,

    #[serde(rename = "@addedAt", default)]
    pub added_at: Option<String>,

    #[serde(rename = "@updatedAt", default)]
    pub updated_at: Option<String>,
}

impl MediaContainer {
    /// Parse a timeline poll document
    pub fn parse(xml: &str) -> crate::Result<Self> {
        Ok(quick_xml::de::from_str(xml)?)
    }

    /// Returns the first timeline of type `music`, if any
    pub fn music_timeline(&self) -> Option<&Timeline> {
        self.timelines
            .iter()
            .find(|t| t.kind.as_deref() == Some(MUSIC_TIMELINE))
    }

    /// Builds the typed snapshot of the music timeline.
    ///
    /// Returns `None` when no music timeline is reported, or when the music
    /// timeline carries no track identity (Plexamp stopped with an empty queue).
    pub fn music_snapshot(&self) -> Option<PlaybackSnapshot> {
        PlaybackSnapshot::from_timeline(self.music_timeline()?)
    }
}

// ============================================================================
// Typed snapshot
// ============================================================================

/// Playback state reported by Plexamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
    Buffering,
    /// Unknown state string.
    Unknown(String),
}

impl PlaybackState {
    pub fn from_plexamp_state(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "playing" => PlaybackState::Playing,
            "paused" => PlaybackState::Paused,
            "stopped" => PlaybackState::Stopped,
            "buffering" => PlaybackState::Buffering,
            _ => PlaybackState::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Stopped => "stopped",
            PlaybackState::Buffering => "buffering",
            PlaybackState::Unknown(s) => s.as_str(),
        }
    }
}

/// What is playing right now, as seen by one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    /// Stable track identity (Plex rating key)
    pub rating_key: String,
    /// Version marker: `updatedAt`, falling back to `addedAt`
    pub version: Option<String>,
    /// Artwork path on the Plex server
    pub thumb: Option<String>,
    pub state: PlaybackState,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl PlaybackSnapshot {
    /// Creates a snapshot with only the fields used for caching
    pub fn new(
        rating_key: impl Into<String>,
        version: Option<&str>,
        thumb: Option<&str>,
    ) -> Self {
        Self {
            rating_key: rating_key.into(),
            version: version.and_then(non_empty),
            thumb: thumb.and_then(non_empty),
            state: PlaybackState::Playing,
            title: None,
            artist: None,
            album: None,
        }
    }

    fn from_timeline(timeline: &Timeline) -> Option<Self> {
        let track = timeline.track.as_ref();

        let rating_key = timeline
            .rating_key
            .as_deref()
            .and_then(non_empty)
            .or_else(|| track.and_then(|t| t.rating_key.as_deref()).and_then(non_empty))?;

        let attr = |value: Option<&String>| value.map(String::as_str).and_then(non_empty);

        Some(Self {
            rating_key,
            version: attr(track.and_then(|t| t.updated_at.as_ref()))
                .or_else(|| attr(track.and_then(|t| t.added_at.as_ref()))),
            thumb: attr(track.and_then(|t| t.thumb.as_ref())),
            state: timeline
                .state
                .as_deref()
                .map(PlaybackState::from_plexamp_state)
                .unwrap_or(PlaybackState::Unknown(String::new())),
            title: attr(track.and_then(|t| t.title.as_ref())),
            artist: attr(track.and_then(|t| t.grandparent_title.as_ref())),
            album: attr(track.and_then(|t| t.parent_title.as_ref())),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<MediaContainer commandID="1">
  <Timeline type="video" state="stopped" />
  <Timeline type="music" state="playing" ratingKey="355914" time="12000" duration="240000">
    <Track ratingKey="355914" title="Teardrop" grandparentTitle="Massive Attack"
           parentTitle="Mezzanine" thumb="/library/metadata/355914/thumb/1724958934"
           addedAt="1700000000" updatedAt="1724958934">
      <Media id="1" audioCodec="flac">
        <Part id="2" key="/library/parts/2/file.flac">
          <Stream id="3" streamType="2" codec="flac" />
        </Part>
      </Media>
    </Track>
  </Timeline>
  <Timeline type="photo" state="stopped" />
</MediaContainer>"#;

    #[test]
    fn test_parse_music_snapshot() {
        let container = MediaContainer::parse(PLAYING).unwrap();
        assert_eq!(container.timelines.len(), 3);

        let snapshot = container.music_snapshot().unwrap();
        assert_eq!(snapshot.rating_key, "355914");
        assert_eq!(snapshot.version.as_deref(), Some("1724958934"));
        assert_eq!(
            snapshot.thumb.as_deref(),
            Some("/library/metadata/355914/thumb/1724958934")
        );
        assert_eq!(snapshot.state, PlaybackState::Playing);
        assert_eq!(snapshot.title.as_deref(), Some("Teardrop"));
        assert_eq!(snapshot.artist.as_deref(), Some("Massive Attack"));
        assert_eq!(snapshot.album.as_deref(), Some("Mezzanine"));
    }

    #[test]
    fn test_version_falls_back_to_added_at() {
        let xml = r#"<MediaContainer>
  <Timeline type="music" state="paused" ratingKey="42">
    <Track ratingKey="42" thumb="/t" addedAt="1600000000" updatedAt="" />
  </Timeline>
</MediaContainer>"#;
        let snapshot = MediaContainer::parse(xml).unwrap().music_snapshot().unwrap();
        assert_eq!(snapshot.version.as_deref(), Some("1600000000"));
        assert_eq!(snapshot.state, PlaybackState::Paused);
    }

    #[test]
    fn test_empty_attributes_become_none() {
        let xml = r#"<MediaContainer>
  <Timeline type="music" state="playing" ratingKey="42">
    <Track ratingKey="42" thumb="" />
  </Timeline>
</MediaContainer>"#;
        let snapshot = MediaContainer::parse(xml).unwrap().music_snapshot().unwrap();
        assert_eq!(snapshot.version, None);
        assert_eq!(snapshot.thumb, None);
    }

    #[test]
    fn test_no_music_timeline() {
        let xml = r#"<MediaContainer commandID="1">
  <Timeline type="video" state="playing" ratingKey="7" />
</MediaContainer>"#;
        let container = MediaContainer::parse(xml).unwrap();
        assert!(container.music_timeline().is_none());
        assert!(container.music_snapshot().is_none());
    }

    #[test]
    fn test_empty_container() {
        let container = MediaContainer::parse("<MediaContainer/>").unwrap();
        assert!(container.timelines.is_empty());
        assert!(container.music_snapshot().is_none());
    }

    #[test]
    fn test_music_timeline_without_track_identity() {
        let xml = r#"<MediaContainer><Timeline type="music" state="stopped" /></MediaContainer>"#;
        let container = MediaContainer::parse(xml).unwrap();
        assert!(container.music_timeline().is_some());
        assert!(container.music_snapshot().is_none());
    }

    #[test]
    fn test_first_music_timeline_wins() {
        let xml = r#"<MediaContainer>
  <Timeline type="music" state="playing" ratingKey="1"><Track updatedAt="10" /></Timeline>
  <Timeline type="music" state="playing" ratingKey="2"><Track updatedAt="20" /></Timeline>
</MediaContainer>"#;
        let snapshot = MediaContainer::parse(xml).unwrap().music_snapshot().unwrap();
        assert_eq!(snapshot.rating_key, "1");
        assert_eq!(snapshot.version.as_deref(), Some("10"));
    }

    #[test]
    fn test_rating_key_from_track_when_timeline_lacks_it() {
        let xml = r#"<MediaContainer>
  <Timeline type="music" state="playing"><Track ratingKey="99" /></Timeline>
</MediaContainer>"#;
        let snapshot = MediaContainer::parse(xml).unwrap().music_snapshot().unwrap();
        assert_eq!(snapshot.rating_key, "99");
    }

    #[test]
    fn test_invalid_xml() {
        assert!(MediaContainer::parse("<MediaContainer><Timeline").is_err());
    }

    #[test]
    fn test_playback_state_mapping() {
        assert_eq!(
            PlaybackState::from_plexamp_state("PLAYING"),
            PlaybackState::Playing
        );
        assert_eq!(
            PlaybackState::from_plexamp_state("weird"),
            PlaybackState::Unknown("weird".to_string())
        );
        assert_eq!(PlaybackState::Buffering.as_str(), "buffering");
    }
}
