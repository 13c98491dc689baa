//! Commands sent to the Stream Deck application

use serde::{Serialize, Serializer};

/// Registration message, sent once right after connecting
#[derive(Debug, Clone, Serialize)]
pub struct Register<'a> {
    pub event: &'a str,
    pub uuid: &'a str,
}

/// Which renderings of a key an image applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    HardwareAndSoftware,
    Hardware,
    Software,
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = match self {
            Target::HardwareAndSoftware => 0,
            Target::Hardware => 1,
            Target::Software => 2,
        };
        serializer.serialize_u8(value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SetImagePayload<'a> {
    /// Image path relative to the plugin directory (without extension) or a data URI
    pub image: &'a str,
    pub target: Target,
}

/// `setImage` command
#[derive(Debug, Clone, Serialize)]
pub struct SetImage<'a> {
    pub event: &'static str,
    pub context: &'a str,
    pub payload: SetImagePayload<'a>,
}

impl<'a> SetImage<'a> {
    pub fn new(context: &'a str, image: &'a str) -> Self {
        Self {
            event: "setImage",
            context,
            payload: SetImagePayload {
                image,
                target: Target::default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_image_json() {
        let value = serde_json::to_value(SetImage::new("CTX1", "images/thumb_1_2")).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "setImage",
                "context": "CTX1",
                "payload": {"image": "images/thumb_1_2", "target": 0}
            })
        );
    }

    #[test]
    fn test_register_json() {
        let value = serde_json::to_value(Register {
            event: "registerPlugin",
            uuid: "ABC",
        })
        .unwrap();
        assert_eq!(value, json!({"event": "registerPlugin", "uuid": "ABC"}));
    }
}
