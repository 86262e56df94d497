mod common;

use bson::oid::ObjectId;
use bson::{Bson, DateTime, doc};
use common::*;
use flatmatch_query::*;

#[test]
fn root_and_nested_fields_get_full_paths() {
    let args = doc! { "title": "Dot Notation Test", "published": true, "visitors": 5 };
    let predicate = build(&args, &blog_table());
    assert_eq!(
        predicate,
        doc! { "title": "Dot Notation Test", "published": true, "meta.visitors": 5 }
    );
}

#[test]
fn values_are_cast_to_field_type() {
    let args = doc! { "visitors": "5", "published": "false", "title": 42 };
    let predicate = build(&args, &blog_table());
    assert_eq!(
        predicate,
        doc! { "meta.visitors": 5, "published": false, "title": "42" }
    );
}

#[test]
fn single_value_on_array_field_is_plain_equality() {
    let args = doc! { "title": "Simple Embedded Array", "numbers": 4 };
    let predicate = build(&args, &blog_table());
    assert_eq!(predicate, doc! { "title": "Simple Embedded Array", "numbers": 4 });
}

#[test]
fn several_values_on_array_field_use_in() {
    let args = doc! { "title": "Multi Value Embedded Array", "numbers": [4, 5] };
    let predicate = build(&args, &blog_table());
    assert_eq!(
        predicate,
        doc! { "title": "Multi Value Embedded Array", "numbers": { "$in": [4, 5] } }
    );
}

#[test]
fn in_values_are_cast_individually() {
    let hex = "507f1f77bcf86cd799439011";
    let oid = ObjectId::parse_str(hex).unwrap();
    let args = doc! { "owners": [hex, oid] };
    let predicate = build(&args, &blog_table());
    assert_eq!(predicate, doc! { "owners": { "$in": [oid, oid] } });
}

#[test]
fn embedded_document_field_by_dotted_name() {
    let args = doc! { "title": "Object Type Embedded Array", "comments.title": "Great comment!" };
    let predicate = build(&args, &blog_table());
    assert_eq!(
        predicate,
        doc! { "title": "Object Type Embedded Array", "comments.title": "Great comment!" }
    );
}

#[test]
fn embedded_documents_match_literally() {
    let first = doc! { "title": "first", "body": "one" };
    let second = doc! { "title": "second", "body": "two" };
    let args = doc! { "comments": [first.clone(), second.clone()] };
    let predicate = build(&args, &blog_table());
    assert_eq!(predicate, doc! { "comments": { "$in": [first, second] } });
}

#[test]
fn short_name_of_nested_embedded_field() {
    let predicate = build(&doc! { "body": "I totally agree!" }, &blog_table());
    assert_eq!(predicate, doc! { "comments.body": "I totally agree!" });
}

#[test]
fn unknown_fields_are_dropped() {
    let args = doc! { "title": "T", "nope": 1, "meta.nope": "x" };
    let predicate = build(&args, &blog_table());
    assert_eq!(predicate, doc! { "title": "T" });
}

#[test]
fn empty_array_field_passes_values_through() {
    let schema = Schema::new("Tagged").field("tags", SchemaNode::empty_array());
    let registry = SchemaRegistry::new().with(schema.clone());
    let table = LookupTable::compile(&schema, &registry, &MatcherConfig::default());

    let predicate = build(&doc! { "tags": ["a", 1, { "k": true }] }, &table);
    assert_eq!(predicate, doc! { "tags": { "$in": ["a", 1, { "k": true }] } });

    let predicate = build(&doc! { "tags": "a" }, &table);
    assert_eq!(predicate, doc! { "tags": "a" });
}

#[test]
fn dates_cast_from_strings_and_millis() {
    let args = doc! { "date": "2024-01-02T03:04:05Z", "meta.date": 1_000_i64 };
    let predicate = build(&args, &blog_table());
    let expected = DateTime::parse_rfc3339_str("2024-01-02T03:04:05Z").unwrap();
    assert_eq!(predicate.get("date"), Some(&Bson::DateTime(expected)));
    assert_eq!(
        predicate.get("meta.date"),
        Some(&Bson::DateTime(DateTime::from_millis(1_000)))
    );
}

#[test]
fn uncastable_value_passes_through_when_lenient() {
    let predicate = build(&doc! { "visitors": "many" }, &blog_table());
    assert_eq!(predicate, doc! { "meta.visitors": "many" });
}

#[test]
fn null_matches_missing_field() {
    let predicate = build(&doc! { "slug": Bson::Null }, &blog_table());
    assert_eq!(predicate, doc! { "slug": Bson::Null });
}

#[test]
fn arguments_are_not_modified() {
    let args = doc! { "numbers": ["4", "5"] };
    let before = args.clone();
    let predicate = build(&args, &blog_table());
    assert_eq!(args, before);
    assert_eq!(predicate, doc! { "numbers": { "$in": [4, 5] } });
}

#[test]
fn strict_rejects_unknown_field() {
    let err = build_strict(&doc! { "title": "T", "nope": 1 }, &blog_table()).unwrap_err();
    assert_eq!(err, MatchError::UnknownField("nope".into()));
    assert_eq!(err.to_string(), "unknown field: nope");
}

#[test]
fn strict_rejects_uncastable_value() {
    let err = build_strict(&doc! { "visitors": "many" }, &blog_table()).unwrap_err();
    match &err {
        MatchError::Cast { field, source } => {
            assert_eq!(field, "visitors");
            assert_eq!(source.caster, Caster::Number);
        }
        other => panic!("expected Cast, got {other:?}"),
    }
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn strict_accepts_known_fields() {
    let args = doc! { "visitors": 5, "numbers": [4, 5] };
    let predicate = build_strict(&args, &blog_table()).unwrap();
    assert_eq!(
        predicate,
        doc! { "meta.visitors": 5, "numbers": { "$in": [4, 5] } }
    );
}
