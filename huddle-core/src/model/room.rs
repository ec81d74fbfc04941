use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    pub fn parse(s: impl Into<String>) -> Result<Self, ModelError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(ModelError::EmptyRoomId);
        }
        Ok(Self(s))
    }

    /// Room named by the last non-empty segment of a page path or URL.
    ///
    /// `"/room/abc"`, `"https://host/abc/?x=1"` and `"abc"` all give `abc`.
    pub fn from_url_path(path: &str) -> Result<Self, ModelError> {
        let without_query = path.split(['?', '#']).next().unwrap_or_default();
        let without_origin = match without_query.split_once("://") {
            Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or_default(),
            None => without_query,
        };

        without_origin
            .split('/')
            .filter(|segment| !segment.is_empty())
            .next_back()
            .map(Self::parse)
            .unwrap_or_else(|| Err(ModelError::NoRoomInPath(path.to_owned())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoomId {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
