use std::sync::Arc;

use bson::Document;

use crate::config::MatcherConfig;
use crate::error::MatchError;
use crate::lookup::LookupTable;
use crate::predicate::{build, build_strict};
use crate::schema::{Schema, SchemaId, SchemaRegistry};

/// One schema bound to its config, with the compiled lookup table cached.
///
/// Compile once per schema and reuse across requests; the table only
/// changes when [`FlatMatcher::set_max_depth`] is called.
#[derive(Debug, Clone)]
pub struct FlatMatcher {
    registry: Arc<SchemaRegistry>,
    schema: Schema,
    config: MatcherConfig,
    lookup: LookupTable,
}

impl FlatMatcher {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        schema: impl Into<SchemaId>,
        config: MatcherConfig,
    ) -> Result<Self, MatchError> {
        let id = schema.into();
        let schema = registry
            .get(&id)
            .cloned()
            .ok_or_else(|| MatchError::SchemaNotFound(id.to_string()))?;
        let lookup = LookupTable::compile(&schema, &registry, &config);
        Ok(Self {
            registry,
            schema,
            config,
            lookup,
        })
    }

    pub fn schema_id(&self) -> &SchemaId {
        self.schema.id()
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn max_depth(&self) -> usize {
        self.config.max_depth
    }

    /// Change the expansion ceiling and recompile the lookup table.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.config.max_depth = max_depth;
        self.lookup = LookupTable::compile(&self.schema, &self.registry, &self.config);
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.config.strict = strict;
    }

    pub fn lookup(&self) -> &LookupTable {
        &self.lookup
    }

    /// Build the predicate for `args`. Only fails in strict mode.
    pub fn matcher(&self, args: &Document) -> Result<Document, MatchError> {
        if self.config.strict {
            build_strict(args, &self.lookup)
        } else {
            Ok(build(args, &self.lookup))
        }
    }
}
