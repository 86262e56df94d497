use std::fmt;

use bson::Bson;

use crate::cast::Caster;

/// A literal the field's caster could not convert.
#[derive(Debug, Clone, PartialEq)]
pub struct CastError {
    pub caster: Caster,
    pub value: Bson,
}

impl fmt::Display for CastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot cast {} to {}", self.value, self.caster)
    }
}

impl std::error::Error for CastError {}

/// Errors raised while reading a schema description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    UnknownCaster(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::UnknownCaster(name) => write!(f, "unknown caster: {name}"),
        }
    }
}

impl std::error::Error for SchemaError {}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    UnknownField(String),
    Cast { field: String, source: CastError },
    SchemaNotFound(String),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::UnknownField(name) => write!(f, "unknown field: {name}"),
            MatchError::Cast { field, source } => write!(f, "field {field}: {source}"),
            MatchError::SchemaNotFound(id) => write!(f, "schema not found: {id}"),
        }
    }
}

impl std::error::Error for MatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MatchError::Cast { source, .. } => Some(source),
            _ => None,
        }
    }
}
