//! Push-channel message envelope and its JSON codec.
//!
//! Every message on the channel is a flat object:
//!
//! ```json
//! {"type":"event","action":"selectedCameraChanged","payload":{"cameraName":"Cam2"}}
//! ```
//!
//! Field names are lower camel case and must stay that way; peers decode
//! the wire shape directly.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Action name of the selection notification.
pub const SELECTED_CAMERA_CHANGED: &str = "selectedCameraChanged";

/// Top-level push-channel envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Message category.
    #[serde(rename = "type")]
    pub kind: EnvelopeType,
    /// Specific event or request name, e.g. `selectedCameraChanged`.
    pub action: String,
    /// Action-specific data. `null` when absent.
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Discriminator for envelope categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeType {
    /// Server → peer state-change notification.
    Event,
    /// Peer → server request.
    Request,
    /// Server → peer answer to a request.
    Response,
    /// Peer → server command.
    Command,
}

/// Payload of [`SELECTED_CAMERA_CHANGED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedCameraPayload {
    /// Display name of the newly selected camera.
    pub camera_name: String,
}

impl Envelope {
    /// Builds an envelope from any serializable payload.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedEnvelope`] if the payload cannot be
    /// represented as JSON.
    pub fn new<P: Serialize>(
        kind: EnvelopeType,
        action: impl Into<String>,
        payload: &P,
    ) -> Result<Self, DispatchError> {
        let payload = serde_json::to_value(payload)
            .map_err(|e| DispatchError::MalformedEnvelope(e.to_string()))?;
        Ok(Self {
            kind,
            action: action.into(),
            payload,
        })
    }

    /// Builds the `selectedCameraChanged` event for `camera_name`.
    #[must_use]
    pub fn selected_camera_changed(camera_name: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeType::Event,
            action: SELECTED_CAMERA_CHANGED.to_string(),
            payload: serde_json::json!({ "cameraName": camera_name.into() }),
        }
    }

    /// Serializes the envelope to its compact wire form.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedEnvelope`] if serialization fails.
    pub fn encode(&self) -> Result<String, DispatchError> {
        serde_json::to_string(self).map_err(|e| DispatchError::MalformedEnvelope(e.to_string()))
    }

    /// Parses an envelope from its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedEnvelope`] if the text is not JSON,
    /// lacks `type` or `action`, or names an unknown category.
    pub fn decode(text: &str) -> Result<Self, DispatchError> {
        serde_json::from_str(text).map_err(|e| DispatchError::MalformedEnvelope(e.to_string()))
    }

    /// Parses an envelope, treating failure as routine.
    ///
    /// Returns `None` for anything [`Envelope::decode`] rejects.
    #[must_use]
    pub fn try_decode(text: &str) -> Option<Self> {
        match Self::decode(text) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring undecodable message");
                None
            }
        }
    }

    /// Reads the payload as a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedEnvelope`] if the payload does not
    /// have the shape of `P`.
    pub fn payload_as<P: for<'de> Deserialize<'de>>(&self) -> Result<P, DispatchError> {
        P::deserialize(&self.payload).map_err(|e| DispatchError::MalformedEnvelope(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn selected_camera_changed_wire_shape() {
        let Ok(json) = Envelope::selected_camera_changed("Cam2").encode() else {
            panic!("encode failed");
        };
        assert_eq!(
            json,
            r#"{"type":"event","action":"selectedCameraChanged","payload":{"cameraName":"Cam2"}}"#
        );
    }

    #[test]
    fn decode_reads_typed_payload() {
        let text = r#"{"type":"event","action":"selectedCameraChanged","payload":{"cameraName":"North"}}"#;
        let Ok(envelope) = Envelope::decode(text) else {
            panic!("decode failed");
        };
        assert_eq!(envelope.kind, EnvelopeType::Event);
        assert_eq!(envelope.action, SELECTED_CAMERA_CHANGED);
        let Ok(payload) = envelope.payload_as::<SelectedCameraPayload>() else {
            panic!("payload shape");
        };
        assert_eq!(payload.camera_name, "North");
    }

    #[test]
    fn missing_payload_decodes_as_null() {
        let Ok(envelope) = Envelope::decode(r#"{"type":"request","action":"ping"}"#) else {
            panic!("decode failed");
        };
        assert!(envelope.payload.is_null());
    }

    #[test]
    fn missing_action_is_malformed() {
        let result = Envelope::decode(r#"{"type":"event","payload":{}}"#);
        assert!(matches!(result, Err(DispatchError::MalformedEnvelope(_))));
    }

    #[test]
    fn unknown_type_is_malformed() {
        let result = Envelope::decode(r#"{"type":"gossip","action":"x"}"#);
        assert!(matches!(result, Err(DispatchError::MalformedEnvelope(_))));
    }

    #[test]
    fn try_decode_swallows_garbage() {
        assert!(Envelope::try_decode("not json at all").is_none());
        assert!(Envelope::try_decode("[1,2,3]").is_none());
        assert!(Envelope::try_decode(r#"{"type":"command","action":"noop"}"#).is_some());
    }

    #[test]
    fn new_accepts_typed_payload() {
        let payload = SelectedCameraPayload {
            camera_name: "Cam1".to_string(),
        };
        let Ok(envelope) = Envelope::new(EnvelopeType::Response, "current", &payload) else {
            panic!("build failed");
        };
        assert_eq!(
            envelope.payload.get("cameraName").and_then(|v| v.as_str()),
            Some("Cam1")
        );
    }
}
