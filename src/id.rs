use thiserror::Error;
use uuid::Uuid;

/// Primary key shared by every entity.
pub type Id = Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid identifier: {0}")]
pub struct InvalidIdentifier(pub String);

/// Fresh random (v4) identifier. Needs no coordination with the store.
pub fn new_id() -> Id {
    Uuid::new_v4()
}

pub fn parse_id(text: &str) -> Result<Id, InvalidIdentifier> {
    Uuid::parse_str(text).map_err(|e| InvalidIdentifier(e.to_string()))
}
