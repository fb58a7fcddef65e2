//! JSON-schema validation of request payloads.
//!
//! The schema of a payload is generated from its Rust type with [`schemars`],
//! so the validated shape can never drift from the type the handler receives.
//! Properties keep their declaration order, which is the order violations are
//! reported in.

use schemars::{
    schema::{InstanceType, RootSchema, Schema, SingleOrVec},
    schema_for, JsonSchema,
};
use serde_json::Value;

/// A single reason a payload does not satisfy its schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("instance requires property \"{property}\"")]
    MissingProperty { property: String },
    #[error("{instance} is not of a type(s) {expected}")]
    InvalidType {
        instance: String,
        expected: &'static str,
    },
    #[error("{instance} does not conform to the \"{format}\" format")]
    InvalidFormat { instance: String, format: String },
}

/// Validates `instance` against the schema of `T`.
///
/// Returns every violation found. An empty vector means the instance is valid.
pub fn validate<T: JsonSchema>(instance: &Value) -> Vec<Violation> {
    validate_against(&schema_for!(T), instance)
}

fn validate_against(root: &RootSchema, instance: &Value) -> Vec<Violation> {
    let schema = &root.schema;

    if let Some(expected) = &schema.instance_type {
        if let Some(expected) = mismatch(expected, instance) {
            return vec![Violation::InvalidType {
                instance: String::from("instance"),
                expected,
            }];
        }
    }

    let (Some(object), Some(fields)) = (&schema.object, instance.as_object()) else {
        return Vec::new();
    };

    let mut violations = Vec::new();
    let mut missing = Vec::new();

    for (property, property_schema) in &object.properties {
        let Some(value) = fields.get(property) else {
            if object.required.contains(property) {
                missing.push(Violation::MissingProperty {
                    property: property.clone(),
                });
            }
            continue;
        };

        let Schema::Object(property_schema) = property_schema else {
            continue;
        };

        let instance = format!("instance.{property}");

        if let Some(expected) = &property_schema.instance_type {
            if let Some(expected) = mismatch(expected, value) {
                violations.push(Violation::InvalidType { instance, expected });
                continue;
            }
        }

        if let Some(format) = property_schema.format.as_deref() {
            if !conforms(format, value) {
                violations.push(Violation::InvalidFormat {
                    instance,
                    format: format.to_owned(),
                });
            }
        }
    }

    violations.append(&mut missing);

    violations
}

/// Returns the name of the expected type if `value` matches none of `expected`.
fn mismatch(expected: &SingleOrVec<InstanceType>, value: &Value) -> Option<&'static str> {
    match expected {
        SingleOrVec::Single(instance_type) => {
            (!matches_type(instance_type, value)).then(|| type_name(instance_type))
        }
        SingleOrVec::Vec(instance_types) => {
            let matched = instance_types
                .iter()
                .any(|instance_type| matches_type(instance_type, value));

            match (matched, instance_types.first()) {
                (false, Some(first)) => Some(type_name(first)),
                _ => None,
            }
        }
    }
}

fn matches_type(instance_type: &InstanceType, value: &Value) -> bool {
    match instance_type {
        InstanceType::Null => value.is_null(),
        InstanceType::Boolean => value.is_boolean(),
        InstanceType::Object => value.is_object(),
        InstanceType::Array => value.is_array(),
        InstanceType::Number => value.is_number(),
        InstanceType::String => value.is_string(),
        InstanceType::Integer => value.is_i64() || value.is_u64(),
    }
}

/// Integer formats bound the range of the Rust type the payload deserializes into.
fn conforms(format: &str, value: &Value) -> bool {
    match format {
        "int64" => value.is_i64(),
        "int32" => value.as_i64().is_some_and(|n| i32::try_from(n).is_ok()),
        "uint64" => value.is_u64(),
        "uint32" => value.as_u64().is_some_and(|n| u32::try_from(n).is_ok()),
        _ => true,
    }
}

fn type_name(instance_type: &InstanceType) -> &'static str {
    match instance_type {
        InstanceType::Null => "null",
        InstanceType::Boolean => "boolean",
        InstanceType::Object => "object",
        InstanceType::Array => "array",
        InstanceType::Number => "number",
        InstanceType::String => "string",
        InstanceType::Integer => "integer",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::book::{BookUpdate, NewBook};

    fn messages(violations: Vec<Violation>) -> Vec<String> {
        violations.iter().map(ToString::to_string).collect()
    }

    fn full_book() -> Value {
        json!({
            "isbn": "0691161518",
            "amazon_url": "http://a.co/eobPtX2",
            "author": "Matthew Peter",
            "language": "english",
            "pages": 55,
            "publisher": "kwantlen",
            "title": "worst book ever",
            "year": 1990
        })
    }

    #[test]
    fn complete_payload_is_accepted() {
        assert!(validate::<NewBook>(&full_book()).is_empty());
    }

    #[test]
    fn missing_year_is_reported() {
        let mut book = full_book();
        book.as_object_mut().unwrap().remove("year");

        assert_eq!(
            messages(validate::<NewBook>(&book)),
            vec!["instance requires property \"year\""]
        );
    }

    #[test]
    fn missing_properties_are_reported_in_declaration_order() {
        let book = json!({ "author": "Matthew Peter", "pages": 55 });

        assert_eq!(
            messages(validate::<NewBook>(&book)),
            vec![
                "instance requires property \"isbn\"",
                "instance requires property \"amazon_url\"",
                "instance requires property \"language\"",
                "instance requires property \"publisher\"",
                "instance requires property \"title\"",
                "instance requires property \"year\"",
            ]
        );
    }

    #[test]
    fn update_does_not_require_isbn() {
        let mut book = full_book();
        book.as_object_mut().unwrap().remove("isbn");

        assert!(validate::<BookUpdate>(&book).is_empty());
        assert_eq!(
            messages(validate::<NewBook>(&book)),
            vec!["instance requires property \"isbn\""]
        );
    }

    #[test]
    fn wrong_types_are_reported_before_missing_properties() {
        let mut book = full_book();
        let fields = book.as_object_mut().unwrap();
        fields.insert(String::from("pages"), json!("fifty"));
        fields.insert(String::from("year"), Value::Null);
        fields.remove("title");

        assert_eq!(
            messages(validate::<BookUpdate>(&book)),
            vec![
                "instance.pages is not of a type(s) integer",
                "instance.year is not of a type(s) integer",
                "instance requires property \"title\"",
            ]
        );
    }

    #[test]
    fn fractional_numbers_are_not_integers() {
        let mut book = full_book();
        book["pages"] = json!(55.5);

        assert_eq!(
            messages(validate::<NewBook>(&book)),
            vec!["instance.pages is not of a type(s) integer"]
        );
    }

    #[test]
    fn integral_floats_are_not_integers() {
        let mut book = full_book();
        book["year"] = json!(1990.0);

        assert_eq!(
            messages(validate::<NewBook>(&book)),
            vec!["instance.year is not of a type(s) integer"]
        );
    }

    #[test]
    fn integers_beyond_i64_are_out_of_format() {
        let mut book = full_book();
        book["pages"] = json!(u64::MAX);

        assert_eq!(
            messages(validate::<NewBook>(&book)),
            vec!["instance.pages does not conform to the \"int64\" format"]
        );
    }

    #[test]
    fn isbn_is_reported_before_later_fields() {
        let book = json!({ "pages": 1 });

        assert_eq!(
            messages(validate::<NewBook>(&book)),
            vec![
                "instance requires property \"isbn\"",
                "instance requires property \"amazon_url\"",
                "instance requires property \"author\"",
                "instance requires property \"language\"",
                "instance requires property \"publisher\"",
                "instance requires property \"title\"",
                "instance requires property \"year\"",
            ]
        );
    }

    #[test]
    fn non_object_instance_is_rejected_as_a_whole() {
        assert_eq!(
            messages(validate::<NewBook>(&json!(["not", "a", "book"]))),
            vec!["instance is not of a type(s) object"]
        );
    }
}
