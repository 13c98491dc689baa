//! Events received from the Stream Deck application

use serde::Deserialize;
use serde_json::Value;

/// Event names used by the Stream Deck application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    KeyDown,
    KeyUp,
    WillAppear,
    WillDisappear,
    TitleParametersDidChange,
    DeviceDidConnect,
    DeviceDidDisconnect,
    ApplicationDidLaunch,
    ApplicationDidTerminate,
    SystemDidWakeUp,
    DidReceiveSettings,
    DidReceiveGlobalSettings,
    PropertyInspectorDidAppear,
    PropertyInspectorDidDisappear,
    SendToPlugin,
    DialDown,
    DialUp,
    DialRotate,
    TouchTap,
    /// Any event this SDK does not know about
    #[serde(other)]
    Unknown,
}

/// One inbound message
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedEvent {
    pub event: EventKind,
    /// Action UUID, for key/dial events
    #[serde(default)]
    pub action: Option<String>,
    /// Opaque identifier of the key or dial instance
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub device_info: Option<Value>,
}

impl ReceivedEvent {
    /// Parses a text frame
    pub fn parse(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Context of the event, when it carries a non-empty one
    pub fn surface(&self) -> Option<&str> {
        self.context.as_deref().filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_will_appear() {
        let event = ReceivedEvent::parse(
            r#"{"action":"dev.plexdeck.nowplaying","event":"willAppear","context":"CTX1","device":"DEV1","payload":{"settings":{},"coordinates":{"column":0,"row":0},"isInMultiAction":false}}"#,
        )
        .unwrap();
        assert_eq!(event.event, EventKind::WillAppear);
        assert_eq!(event.surface(), Some("CTX1"));
        assert_eq!(event.device.as_deref(), Some("DEV1"));
        assert!(event.payload.is_some());
    }

    #[test]
    fn test_device_did_connect() {
        let event = ReceivedEvent::parse(
            r#"{"event":"deviceDidConnect","device":"DEV1","deviceInfo":{"name":"Stream Deck","type":0,"size":{"columns":5,"rows":3}}}"#,
        )
        .unwrap();
        assert_eq!(event.event, EventKind::DeviceDidConnect);
        assert_eq!(event.surface(), None);
        assert!(event.device_info.is_some());
    }

    #[test]
    fn test_unknown_event() {
        let event = ReceivedEvent::parse(r#"{"event":"somethingNew","context":"C"}"#).unwrap();
        assert_eq!(event.event, EventKind::Unknown);
    }

    #[test]
    fn test_empty_context() {
        let event = ReceivedEvent::parse(r#"{"event":"willDisappear","context":""}"#).unwrap();
        assert_eq!(event.surface(), None);
    }

    #[test]
    fn test_missing_event_name() {
        assert!(ReceivedEvent::parse(r#"{"context":"C"}"#).is_err());
    }
}
