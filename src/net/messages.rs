//! Wire message types
//!
//! JSON-serializable messages exchanged with game clients. Field names are
//! the contract the front end depends on; everything is camelCase on the
//! wire.

use serde::{Deserialize, Serialize};

use crate::matching::Confidence;

/// Messages sent by clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// A guess for the current track
    Answer { answer: String, pseudo: String },

    /// Move to the next track; `shouldSkip: false` re-fetches without
    /// skipping (resync after an external manual skip)
    #[serde(rename_all = "camelCase")]
    NextTrack {
        #[serde(default)]
        should_skip: Option<bool>,
    },

    /// Request a masked reveal of the current track
    Hint,
}

/// Messages broadcast to players
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// A fresh round has begun; clients clear their local answer history
    NewTrack,

    /// Verdict for one player's guess, sent to everyone
    #[serde(rename_all = "camelCase")]
    Reply {
        answer: String,
        pseudo: String,
        /// Per-guess verdicts, not the cumulative round state
        title_found: bool,
        artist_found: bool,
        confidence: Confidence,
        /// Present only once the fact has been cumulatively found
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        artists: Option<Vec<String>>,
    },

    /// Masked title/artists
    Hint { title: String, artists: Vec<String> },

    /// Full answer of a skipped track, found or not
    RightAnswer { message: String },

    /// Non-fatal error; the connection stays open
    Error { message: String },

    /// Greeting, sent once per new connection
    Connected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_deserialize() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"answer","answer":"stressed out","pseudo":"ana"}"#)
                .unwrap();
        match msg {
            ClientMessage::Answer { answer, pseudo } => {
                assert_eq!(answer, "stressed out");
                assert_eq!(pseudo, "ana");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_next_track_skip_defaults_to_absent() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"nextTrack"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::NextTrack { should_skip: None }));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"nextTrack","shouldSkip":false}"#).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::NextTrack {
                should_skip: Some(false)
            }
        ));
    }

    #[test]
    fn test_reply_serializes_camel_case() {
        let msg = ServerMessage::Reply {
            answer: "stressed out".to_string(),
            pseudo: "ana".to_string(),
            title_found: true,
            artist_found: false,
            confidence: Confidence {
                title: 1.0,
                artist: 0.0,
            },
            title: Some("Stressed Out".to_string()),
            artists: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"reply""#));
        assert!(json.contains(r#""titleFound":true"#));
        assert!(json.contains(r#""artistFound":false"#));
        assert!(json.contains(r#""title":"Stressed Out""#));
        // Unfound facts are omitted entirely
        assert!(!json.contains("artists"));
    }

    #[test]
    fn test_unit_variants_tag_only() {
        assert_eq!(
            serde_json::to_string(&ServerMessage::NewTrack).unwrap(),
            r#"{"type":"newTrack"}"#
        );
        assert_eq!(
            serde_json::to_string(&ServerMessage::Connected).unwrap(),
            r#"{"type":"connected"}"#
        );
    }

    #[test]
    fn test_right_answer_serialize() {
        let json = serde_json::to_string(&ServerMessage::RightAnswer {
            message: "Twenty One Pilots - Stressed Out".to_string(),
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"type":"rightAnswer","message":"Twenty One Pilots - Stressed Out"}"#
        );
    }
}
