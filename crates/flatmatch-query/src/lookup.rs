use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::{debug, trace};

use crate::cast::Caster;
use crate::config::MatcherConfig;
use crate::schema::{Fields, Schema, SchemaId, SchemaNode, SchemaRegistry};

/// How a field name given in query arguments resolves against the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupEntry {
    /// Full dot-notation path of the field.
    pub path: String,
    pub caster: Caster,
    /// The field is an embedded array, so several values mean "any of".
    pub is_array: bool,
}

/// Short field names (and full paths, on name clashes) mapped to entries.
///
/// Given the schema
/// ```text
/// { title: String, meta: { date: Date, visitors: Number }, comments: [{ date: Date }] }
/// ```
/// the table holds:
/// ```text
/// "title"         -> title
/// "date"          -> meta.date
/// "visitors"      -> meta.visitors
/// "comments"      -> comments        (array, literal match)
/// "comments.date" -> comments.date
/// ```
///
/// A short name always resolves to the first field of that name met in
/// declaration order. Later fields of the same name are registered under
/// their full path and never overwrite an existing entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupTable {
    entries: HashMap<String, LookupEntry>,
}

impl LookupTable {
    /// Compile the table for `schema`, resolving references through `registry`.
    pub fn compile(schema: &Schema, registry: &SchemaRegistry, config: &MatcherConfig) -> Self {
        let mut compiler = Compiler::new(registry, config.max_depth);
        compiler.stack.push(schema.id());
        compiler.walk("", schema.fields(), 0);

        debug!(
            schema = %schema.id(),
            entries = compiler.table.len(),
            max_depth = config.max_depth,
            "compiled lookup table"
        );
        compiler.table
    }

    pub fn get(&self, name: &str) -> Option<&LookupEntry> {
        self.entries.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LookupEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert under the short name, or under the full path if the short name
    /// is taken. Existing entries are never overwritten.
    fn register(&mut self, name: &str, path: &str, caster: Caster, is_array: bool) {
        let key = if self.entries.contains_key(name) {
            path
        } else {
            name
        };
        if let Entry::Vacant(slot) = self.entries.entry(key.to_string()) {
            slot.insert(LookupEntry {
                path: path.to_string(),
                caster,
                is_array,
            });
        }
    }
}

/// Compile a lookup table from a bare field tree.
///
/// `prefix` is prepended to every registered path. No schema is considered
/// "current" at the top, so a self-reference is detected one level later
/// than with [`LookupTable::compile`].
pub fn compile(
    prefix: &str,
    fields: &Fields,
    registry: &SchemaRegistry,
    max_depth: usize,
) -> LookupTable {
    let mut compiler = Compiler::new(registry, max_depth);
    compiler.walk(prefix, fields, 0);
    compiler.table
}

struct Compiler<'a> {
    registry: &'a SchemaRegistry,
    max_depth: usize,
    /// Schemas currently being expanded, outermost first.
    stack: Vec<&'a SchemaId>,
    table: LookupTable,
}

impl<'a> Compiler<'a> {
    fn new(registry: &'a SchemaRegistry, max_depth: usize) -> Self {
        Self {
            registry,
            max_depth,
            stack: Vec::new(),
            table: LookupTable::default(),
        }
    }

    fn walk(&mut self, prefix: &str, fields: &'a Fields, depth: usize) {
        if depth > self.max_depth {
            trace!(prefix, depth, "max depth exceeded, not expanding");
            return;
        }
        let depth = depth + 1;

        for (name, node) in fields.iter() {
            let path = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}.{name}")
            };

            let (node, is_array) = match node {
                // No element type to go on: match literals as given.
                SchemaNode::Array(None) => {
                    self.table.register(name, &path, Caster::Mixed, true);
                    continue;
                }
                SchemaNode::Array(Some(inner)) => (inner.as_ref(), true),
                other => (other, false),
            };

            match node {
                SchemaNode::Scalar(caster) => {
                    self.table.register(name, &path, *caster, is_array);
                }
                SchemaNode::SchemaRef(id) => {
                    let Some(nested) = self.registry.get(id) else {
                        trace!(path = %path, schema = %id, "unknown schema reference, skipping");
                        continue;
                    };
                    // Whole embedded documents are matched literally.
                    if is_array {
                        self.table.register(name, &path, Caster::Mixed, true);
                    }

                    // A schema already being expanded gets exactly one more level.
                    let recursive = self.stack.contains(&nested.id());
                    let child_depth = if recursive && depth < self.max_depth {
                        trace!(path = %path, schema = %id, "recursive schema, expanding one level");
                        self.max_depth
                    } else {
                        depth
                    };

                    self.stack.push(nested.id());
                    self.walk(&path, nested.fields(), child_depth);
                    self.stack.pop();
                }
                SchemaNode::Object(nested) => {
                    if is_array {
                        self.table.register(name, &path, Caster::Mixed, true);
                    }
                    self.walk(&path, nested, depth);
                }
                SchemaNode::Array(_) => {
                    trace!(path = %path, "nested array has no lookup entry, skipping");
                }
            }
        }
    }
}
