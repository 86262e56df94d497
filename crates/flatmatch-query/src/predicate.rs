use std::convert::Infallible;

use bson::{Bson, Document};
use tracing::debug;

use crate::error::{CastError, MatchError};
use crate::lookup::LookupTable;

/// Set-membership operator wrapping several values for one array field.
pub const IN_OPERATOR: &str = "$in";

/// Build a query predicate from flat field/value arguments.
///
/// Lenient: keys missing from `table` are dropped, and a value the field's
/// caster rejects is kept as given.
///
/// - a plain field: `{ "visitors": 5 }` -> `{ "meta.visitors": 5 }`
/// - an array field, one value: `{ "numbers": 4 }` -> `{ "numbers": 4 }`
///   (the store matches arrays containing the value)
/// - an array field, several values: `{ "numbers": [4, 5] }` ->
///   `{ "numbers": { "$in": [4, 5] } }`
///
/// Output keys follow argument order. Two arguments resolving to the same
/// path: the later one wins.
pub fn build(args: &Document, table: &LookupTable) -> Document {
    let built = build_with(
        args,
        table,
        |key| {
            debug!(field = key, "dropping unknown field");
            Ok::<(), Infallible>(())
        },
        |key, value, err| {
            debug!(field = key, error = %err, "passing uncastable value through");
            Ok(value.clone())
        },
    );
    match built {
        Ok(predicate) => predicate,
        Err(never) => match never {},
    }
}

/// Like [`build`], but unknown keys and uncastable values are errors.
pub fn build_strict(args: &Document, table: &LookupTable) -> Result<Document, MatchError> {
    build_with(
        args,
        table,
        |key| Err(MatchError::UnknownField(key.to_string())),
        |key, _, err| {
            Err(MatchError::Cast {
                field: key.to_string(),
                source: err,
            })
        },
    )
}

fn build_with<E>(
    args: &Document,
    table: &LookupTable,
    mut on_unknown: impl FnMut(&str) -> Result<(), E>,
    mut on_cast_error: impl FnMut(&str, &Bson, CastError) -> Result<Bson, E>,
) -> Result<Document, E> {
    let mut predicate = Document::new();

    for (key, value) in args {
        let key = key.as_str();
        let Some(entry) = table.get(key) else {
            on_unknown(key)?;
            continue;
        };

        let mut cast = |value: &Bson| match entry.caster.cast(value) {
            Ok(v) => Ok(v),
            Err(err) => on_cast_error(key, value, err),
        };

        let resolved = match value {
            Bson::Array(values) if entry.is_array => {
                let values = values.iter().map(&mut cast).collect::<Result<Vec<_>, E>>()?;
                let mut membership = Document::new();
                membership.insert(IN_OPERATOR, Bson::Array(values));
                Bson::Document(membership)
            }
            _ => cast(value)?,
        };

        predicate.insert(entry.path.clone(), resolved);
    }

    Ok(predicate)
}
