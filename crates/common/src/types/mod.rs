use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Body of non-validation error responses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Detail {
    pub detail: String,
}

impl Detail {
    pub fn new(msg: impl Into<String>) -> Self { Self { detail: msg.into() } }
}
