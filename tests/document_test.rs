//! Integration tests for schema-bound documents.

use std::sync::Arc;

use chrono::{FixedOffset, TimeZone, Utc};
use rayon::prelude::*;

use glaive::document::{FieldValue, GeoPoint, ObjectValue, Value};
use glaive::error::{GlaiveError, Result};
use glaive::schema::{
    ComplexFieldDescriptor, ComplexFieldDescriptorBuilder, DocumentFactory,
    FieldDescriptorBuilder, Multiplicity, ValueType,
};

#[derive(Debug, Clone, PartialEq)]
struct Taxonomy {
    id: i64,
    term: String,
    synonyms: Vec<String>,
}

fn taxonomy(id: i64, term: &str) -> Taxonomy {
    Taxonomy {
        id,
        term: term.to_string(),
        synonyms: vec![format!("{term}-syn")],
    }
}

fn taxonomy_field() -> Result<ComplexFieldDescriptor<Taxonomy>> {
    ComplexFieldDescriptorBuilder::<Taxonomy>::new()
        .facet(|t: &Taxonomy| vec![t.id])
        .store(|t: &Taxonomy| t.term.clone())
        .full_text(|t: &Taxonomy| t.synonyms.clone())
        .build("taxonomy", ValueType::Text, ValueType::Long, Multiplicity::Multi)
}

fn asset_factory() -> Result<DocumentFactory> {
    let builder = FieldDescriptorBuilder::new();
    DocumentFactory::builder("Asset")
        .set_updatable(true)
        .add_field(builder.build_text_field("title")?)?
        .add_field(builder.build_multivalued_numeric_field("category", ValueType::Long)?)?
        .add_field(builder.build_numeric_field("price", ValueType::Double)?)?
        .add_field(builder.build_date_field("created")?)?
        .add_field(builder.build_util_date_field("modified")?)?
        .add_field(builder.build_location_field("location")?)?
        .add_field(builder.build_binary_field("thumbnail")?)?
        .add_field(builder.build_boolean_field("published")?)?
        .add_field(taxonomy_field()?)?
        .build()
}

#[test]
fn test_round_trip_every_kind() -> Result<()> {
    let factory = asset_factory()?;
    let mut doc = factory.create_doc("1");

    let created = FixedOffset::east_opt(3600)
        .and_then(|tz| tz.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single())
        .ok_or_else(|| GlaiveError::other("invalid date"))?;
    let modified = Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap();
    let location = GeoPoint::new(47.07, 15.44)?;

    let values: Vec<(&str, Value)> = vec![
        ("title", "Dune".into()),
        ("price", 9.99_f64.into()),
        ("created", created.into()),
        ("modified", modified.into()),
        ("location", location.into()),
        ("thumbnail", FieldValue::Binary(vec![1, 2, 3]).into()),
        ("published", true.into()),
    ];
    for (name, value) in values {
        doc.set_value(name, value.clone())?;
        assert_eq!(doc.get_value(name)?, Some(value));
    }

    Ok(())
}

#[test]
fn test_multi_value_wrapping() -> Result<()> {
    let factory = asset_factory()?;
    let mut doc = factory.create_doc("1");

    doc.set_values("category", [1_i64, 2, 3])?;
    assert_eq!(doc.get_value("category")?, Some(Value::multi([1_i64, 2, 3])));

    doc.set_value("category", 4_i64)?;
    assert_eq!(doc.get_values_as::<i64>("category")?, vec![4]);

    Ok(())
}

#[test]
fn test_type_rejection_leaves_value_unchanged() -> Result<()> {
    let factory = asset_factory()?;
    let mut doc = factory.create_doc("1");
    doc.set_value("price", 10.0_f64)?;

    let result = doc.set_value("price", "ten");
    match result {
        Err(GlaiveError::TypeMismatch {
            field,
            expected,
            actual,
        }) => {
            assert_eq!(field, "price");
            assert_eq!(expected, "double");
            assert_eq!(actual, "text");
        }
        other => panic!("Expected type mismatch, got {other:?}"),
    }
    assert_eq!(doc.get_value_as::<f64>("price")?, Some(10.0));

    // A collection with one bad element commits nothing either.
    doc.set_values("category", [1_i64])?;
    let mixed = Value::Multi(vec![FieldValue::Long(2), FieldValue::from("three")]);
    assert!(doc.set_value("category", mixed).is_err());
    assert_eq!(doc.get_values_as::<i64>("category")?, vec![1]);

    Ok(())
}

#[test]
fn test_context_isolation() -> Result<()> {
    let factory = asset_factory()?;
    let mut doc = factory.create_doc("1");
    doc.set_value("title", "default")?;
    doc.set_contextualized_value("title", Some("ctxA"), "A")?;
    doc.set_contextualized_value("title", Some("ctxB"), "B")?;

    assert_eq!(doc.get_contextualized_value("title", Some("ctxA"))?, Some("A".into()));
    assert_eq!(doc.get_contextualized_value("title", Some("ctxB"))?, Some("B".into()));
    assert_eq!(doc.get_contextualized_value("title", None)?, Some("default".into()));

    let contexts = doc.get_field_contexts("title")?;
    assert_eq!(contexts.len(), 3);
    assert!(contexts.contains(&Some("ctxA".to_string())));
    assert!(contexts.contains(&None));

    assert_eq!(doc.get_values().get("title"), Some(&Value::from("default")));

    Ok(())
}

#[test]
fn test_contextualized_flag_propagates_across_documents() -> Result<()> {
    let factory = asset_factory()?;
    let first = factory.create_doc("1");
    let mut second = factory.create_doc("2");

    assert!(!first.list_field_descriptors()["title"].is_contextualized());
    second.set_contextualized_value("title", Some("de"), "Titel")?;

    assert!(factory.get_field("title").map(|f| f.is_contextualized()).unwrap_or(false));
    assert!(first.list_field_descriptors()["title"].is_contextualized());
    assert!(!factory.get_field("price").map(|f| f.is_contextualized()).unwrap_or(true));

    Ok(())
}

#[test]
fn test_contextualized_add_flags_field() -> Result<()> {
    let factory = asset_factory()?;
    let observer = factory.create_doc("1");
    let mut writer = factory.create_doc("2");

    // Default-context writes leave the flag alone.
    writer.add_value("category", 1_i64)?;
    writer.add_contextualized_value("category", None, 2_i64)?;
    assert!(!observer.list_field_descriptors()["category"].is_contextualized());

    writer.add_contextualized_value("category", Some("shop-eu"), vec![3_i64, 4])?;
    assert_eq!(
        writer
            .get_contextualized_value("category", Some("shop-eu"))?
            .unwrap_or_default()
            .len(),
        2
    );
    assert!(factory.get_field("category").map(|f| f.is_contextualized()).unwrap_or(false));
    assert!(observer.list_field_descriptors()["category"].is_contextualized());
    assert!(factory.create_doc("3").list_field_descriptors()["category"].is_contextualized());

    Ok(())
}

#[test]
fn test_concurrent_contextualized_writes() -> Result<()> {
    let factory = asset_factory()?;

    (0..64).into_par_iter().try_for_each(|i| {
        let context = format!("ctx{}", i % 4);
        let mut doc = factory.create_doc(i.to_string());
        doc.set_contextualized_value("title", Some(context.as_str()), "value")
    })?;

    assert!(factory.get_field("title").map(|f| f.is_contextualized()).unwrap_or(false));

    Ok(())
}

#[test]
fn test_reserved_and_unknown_fields() -> Result<()> {
    let factory = asset_factory()?;
    let mut doc = factory.create_doc("7");

    assert!(matches!(doc.set_value("_id_", "8"), Err(GlaiveError::ReservedFieldName(_))));
    assert!(matches!(doc.set_value("_type_", "X"), Err(GlaiveError::ReservedFieldName(_))));
    assert!(matches!(doc.set_value("missing", "x"), Err(GlaiveError::FieldNotFound(_))));
    assert_eq!(doc.get_value("_id_")?, Some("7".into()));
    assert_eq!(doc.get_value("_type_")?, Some("Asset".into()));
    assert!(doc.has_field("title"));
    assert!(!doc.has_field("_id_"));

    Ok(())
}

#[test]
fn test_complex_field_values() -> Result<()> {
    let field = taxonomy_field()?;
    let factory = DocumentFactory::builder("Asset").add_field(&field)?.build()?;
    let mut doc = factory.create_doc("1");

    let shared = Arc::new(taxonomy(3, "drama"));
    doc.set_value("taxonomy", ObjectValue::from_arc(Arc::clone(&shared)))?;
    doc.add_value("taxonomy", field.value(taxonomy(5, "comedy")))?;
    // Values of the store type are accepted as well.
    doc.add_value("taxonomy", "thriller")?;
    assert!(doc.add_value("taxonomy", 1_i64).is_err());

    let stored = doc.get_value("taxonomy")?.unwrap_or_default();
    assert_eq!(stored.len(), 3);

    let projections = field
        .complex()
        .ok_or_else(|| GlaiveError::other("missing projections"))?;
    let facets = stored
        .iter()
        .filter(|v| v.as_object().is_some())
        .map(|v| projections.facet_values(v))
        .collect::<Result<Vec<_>>>()?;
    assert_eq!(facets, vec![vec![FieldValue::Long(3)], vec![FieldValue::Long(5)]]);

    let objects = doc.get_values_as::<ObjectValue>("taxonomy");
    assert!(matches!(objects, Err(GlaiveError::IncompatibleCast(_))));

    assert_eq!(field.full_text_values(&shared), vec!["drama-syn".to_string()]);
    assert_eq!(field.sort_value(&stored), Some(FieldValue::from("drama")));

    Ok(())
}

#[test]
fn test_children_from_other_factory() -> Result<()> {
    let assets = asset_factory()?;
    let builder = FieldDescriptorBuilder::new();
    let comments = DocumentFactory::builder("Comment")
        .add_field(builder.build_text_field("body")?)?
        .build()?;

    let mut asset = assets.create_doc("1");
    assert!(matches!(asset.add_child(Vec::new()), Err(GlaiveError::Precondition(_))));
    assert!(asset.children().is_empty());

    let mut comment = comments.create_doc("1");
    comment.set_value("body", "great")?;
    asset.add_child([comment, assets.create_doc("1")])?;

    // Same id, different type: both kept.
    assert_eq!(asset.children().len(), 2);
    assert_eq!(asset.children()[0].type_name(), "Comment");
    assert_eq!(asset.children()[0].get_value("body")?, Some("great".into()));

    Ok(())
}
