//! Canned wire payloads

/// A READY dispatch with one available and one unavailable guild
pub const READY_DISPATCH: &str = r#"{
    "op": 0, "t": "READY", "s": 1,
    "d": {
        "v": 6,
        "user": {"id": "1", "username": "bot", "discriminator": "0001", "bot": true},
        "guilds": [
            {"id": "41771983423143937", "unavailable": true},
            {"id": "41771983423143938", "name": "lounge"}
        ],
        "session_id": "fixture-session"
    }
}"#;

/// A Hello frame with a 45 second heartbeat interval
pub const HELLO: &str = r#"{"op": 10, "d": {"heartbeat_interval": 45000, "_trace": []}}"#;
