use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("member id must not be empty")]
    EmptyMemberId,

    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("no room segment in path '{0}'")]
    NoRoomInPath(String),

    #[error("malformed wire message: {0}")]
    Codec(#[from] serde_json::Error),
}
