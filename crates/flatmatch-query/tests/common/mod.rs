#![allow(dead_code)]

use flatmatch_query::*;

pub const BLOG_POST: &str = "BlogPost";
pub const COMMENTS: &str = "Comments";

/// Comments embed more comments; BlogPost embeds comments and a plain
/// nested `meta` object.
pub fn comments() -> Schema {
    Schema::new(COMMENTS)
        .field("title", Caster::String)
        .field("date", Caster::Date)
        .field("body", Caster::String)
        .field("comments", SchemaNode::array(SchemaNode::schema(COMMENTS)))
}

pub fn blog_post() -> Schema {
    Schema::new(BLOG_POST)
        .field("title", Caster::String)
        .field("author", Caster::String)
        .field("slug", Caster::String)
        .field("date", Caster::Date)
        .field(
            "meta",
            Fields::new()
                .with("date", Caster::Date)
                .with("visitors", Caster::Number),
        )
        .field("published", Caster::Boolean)
        .field("mixed", Fields::new())
        .field("numbers", SchemaNode::array(Caster::Number))
        .field("owners", SchemaNode::array(Caster::ObjectId))
        .field("comments", SchemaNode::array(SchemaNode::schema(COMMENTS)))
}

pub fn blog_registry() -> SchemaRegistry {
    SchemaRegistry::new().with(comments()).with(blog_post())
}

pub fn blog_table() -> LookupTable {
    let registry = blog_registry();
    LookupTable::compile(&blog_post(), &registry, &MatcherConfig::default())
}

pub fn sorted_keys(table: &LookupTable) -> Vec<String> {
    let mut keys: Vec<String> = table.iter().map(|(name, _)| name.to_string()).collect();
    keys.sort();
    keys
}

/// Number of dot-separated segments in a path.
pub fn path_depth(path: &str) -> usize {
    path.split('.').count()
}
