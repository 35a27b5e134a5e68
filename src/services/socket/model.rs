use crate::services::db::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "msg", rename_all = "lowercase")]
pub enum ClientMessage {
    Sub {
        id: String,
        name: String,
    },
    Unsub {
        id: String,
    },
    Method {
        id: String,
        method: String,
        #[serde(default)]
        params: Value,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MethodFailure {
    pub error: u16,
    pub reason: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "msg", rename_all = "lowercase")]
pub enum ServerMessage {
    Added {
        collection: String,
        id: String,
        fields: Document,
    },
    /// Initial data for these subscriptions has been sent.
    Ready {
        subs: Vec<String>,
    },
    /// Subscription refused or ended; `error` is set when it was refused.
    NoSub {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Result {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<MethodFailure>,
    },
    Error {
        reason: String,
    },
}
