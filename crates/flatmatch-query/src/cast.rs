use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use bson::{Bson, DateTime};

use crate::error::{CastError, SchemaError};

/// Conversion applied to a raw query literal so it matches the field's
/// declared primitive type.
///
/// `Mixed` is the identity caster: used for fields whose element type is
/// unknown (empty arrays) and for whole embedded documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Caster {
    String,
    Number,
    Boolean,
    Date,
    ObjectId,
    Mixed,
}

impl Caster {
    pub fn name(&self) -> &'static str {
        match self {
            Caster::String => "String",
            Caster::Number => "Number",
            Caster::Boolean => "Boolean",
            Caster::Date => "Date",
            Caster::ObjectId => "ObjectId",
            Caster::Mixed => "Mixed",
        }
    }

    /// Convert one literal. `Null` passes through every caster.
    pub fn cast(&self, value: &Bson) -> Result<Bson, CastError> {
        if matches!(value, Bson::Null) {
            return Ok(Bson::Null);
        }
        let cast = match self {
            Caster::String => to_string(value),
            Caster::Number => to_number(value),
            Caster::Boolean => to_boolean(value),
            Caster::Date => to_date(value),
            Caster::ObjectId => to_object_id(value),
            Caster::Mixed => Some(value.clone()),
        };
        cast.ok_or_else(|| CastError {
            caster: *self,
            value: value.clone(),
        })
    }
}

impl fmt::Display for Caster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Caster {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "String" => Ok(Caster::String),
            "Number" | "Int" | "Double" | "Float" => Ok(Caster::Number),
            "Boolean" | "Bool" => Ok(Caster::Boolean),
            "Date" => Ok(Caster::Date),
            "ObjectId" => Ok(Caster::ObjectId),
            "Mixed" | "Any" => Ok(Caster::Mixed),
            other => Err(SchemaError::UnknownCaster(other.to_string())),
        }
    }
}

fn to_string(value: &Bson) -> Option<Bson> {
    let s = match value {
        Bson::String(_) => return Some(value.clone()),
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(n) => n.to_string(),
        Bson::Boolean(b) => b.to_string(),
        Bson::ObjectId(oid) => oid.to_hex(),
        _ => return None,
    };
    Some(Bson::String(s))
}

fn to_number(value: &Bson) -> Option<Bson> {
    match value {
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => Some(value.clone()),
        Bson::String(s) => parse_number(s.trim()),
        _ => None,
    }
}

/// Integers narrow to `Int32` when they fit, so `"5"` and `5` cast alike.
fn parse_number(s: &str) -> Option<Bson> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(match i32::try_from(n) {
            Ok(small) => Bson::Int32(small),
            Err(_) => Bson::Int64(n),
        });
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Bson::Double)
}

fn to_boolean(value: &Bson) -> Option<Bson> {
    let b = match value {
        Bson::Boolean(_) => return Some(value.clone()),
        Bson::String(s) => match s.trim() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => return None,
        },
        Bson::Int32(n @ (0 | 1)) => *n == 1,
        Bson::Int64(n @ (0 | 1)) => *n == 1,
        _ => return None,
    };
    Some(Bson::Boolean(b))
}

fn to_date(value: &Bson) -> Option<Bson> {
    let millis = match value {
        Bson::DateTime(_) => return Some(value.clone()),
        Bson::Int32(n) => i64::from(*n),
        Bson::Int64(n) => *n,
        Bson::String(s) => {
            return DateTime::parse_rfc3339_str(s.trim())
                .ok()
                .map(Bson::DateTime);
        }
        _ => return None,
    };
    Some(Bson::DateTime(DateTime::from_millis(millis)))
}

fn to_object_id(value: &Bson) -> Option<Bson> {
    match value {
        Bson::ObjectId(_) => Some(value.clone()),
        Bson::String(s) => ObjectId::parse_str(s.trim()).ok().map(Bson::ObjectId),
        _ => None,
    }
}
