mod cast;
mod config;
mod error;
mod lookup;
mod matcher;
mod predicate;
pub mod schema;

pub use cast::Caster;
pub use config::{DEFAULT_MAX_DEPTH, MatcherConfig};
pub use error::{CastError, MatchError, SchemaError};
pub use lookup::{LookupEntry, LookupTable, compile};
pub use matcher::FlatMatcher;
pub use predicate::{IN_OPERATOR, build, build_strict};
pub use schema::{Fields, Schema, SchemaId, SchemaNode, SchemaRegistry};
