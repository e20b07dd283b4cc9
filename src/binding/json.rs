//! JSON body decoding.
//!
//! The body is parsed into a [`Value`] once, keeping document order, then
//! each declared field pulls its own key out of the object. A field that fails to decode is reported
//! and skipped; the others are still set, so a partially valid body leaves a
//! partially populated target.

use serde_json::{Map, Value};

use super::errors::{ErrorKind, Errors};
use super::schema::Schema;

/// Decodes `body` into `target`, recording a `DeserializationError` for the
/// first problem found.
pub(crate) fn decode<T: 'static>(
    schema: &Schema<T>,
    target: &mut T,
    body: &[u8],
    errors: &mut Errors,
) {
    let value = match serde_json::from_slice::<Value>(body) {
        Ok(value) => value,
        Err(e) => {
            errors.add_overall(ErrorKind::Deserialization, e.to_string());
            return;
        }
    };

    if let Err(e) = decode_value(schema, target, value) {
        errors.add_overall(ErrorKind::Deserialization, e);
    }
}

/// Applies a parsed JSON value to `target`. `null` leaves it untouched.
pub(crate) fn decode_value<T: 'static>(
    schema: &Schema<T>,
    target: &mut T,
    value: Value,
) -> Result<(), String> {
    let object = match value {
        Value::Null => return Ok(()),
        Value::Object(object) => object,
        other => return Err(format!("expected a JSON object, found {}", describe(&other))),
    };

    let mut first_err = None;
    for field in schema.fields().iter().filter(|f| !f.is_ignored()) {
        let key = field.json_key();
        let Some(value) = lookup(&object, key) else { continue };
        if value.is_null() {
            continue;
        }
        if let Err(e) = field.set_json(target, value) {
            first_err.get_or_insert_with(|| format!("{key}: {e}"));
        }
    }

    first_err.map_or(Ok(()), Err)
}

/// The last key in document order equal to `key` ignoring ASCII case. A
/// body that repeats a key under different casings binds the final one.
fn lookup(object: &Map<String, Value>, key: &str) -> Option<Value> {
    object
        .iter()
        .rev()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, value)| value.clone())
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_)  => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Bindable;

    #[derive(Debug, Default, PartialEq)]
    struct Address {
        city: String,
        zip: u32,
    }

    impl Bindable for Address {
        fn describe(schema: &mut Schema<Self>) {
            schema.field("City", |a| &a.city, |a| &mut a.city).json("city");
            schema.field("Zip", |a| &a.zip, |a| &mut a.zip).json("zip");
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Profile {
        name: String,
        age: i32,
        tags: Vec<String>,
        hidden: String,
        address: Address,
    }

    impl Bindable for Profile {
        fn describe(schema: &mut Schema<Self>) {
            schema.field("Name", |p| &p.name, |p| &mut p.name).json("name");
            schema.field("Age", |p| &p.age, |p| &mut p.age).json("age");
            schema.field("Tags", |p| &p.tags, |p| &mut p.tags).json("tags");
            schema.field("Hidden", |p| &p.hidden, |p| &mut p.hidden).json("-");
            schema.nested("Address", |p| &p.address, |p| &mut p.address).json("address");
        }
    }

    fn run(body: &str) -> (Profile, Errors) {
        let schema = Schema::<Profile>::of();
        let mut profile = Profile::default();
        let mut errors = Errors::new();
        decode(&schema, &mut profile, body.as_bytes(), &mut errors);
        (profile, errors)
    }

    #[test]
    fn decodes_every_declared_key() {
        let (profile, errors) = run(
            r#"{"name":"Ada","age":36,"tags":["math","code"],"address":{"city":"London","zip":1815}}"#,
        );
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.age, 36);
        assert_eq!(profile.tags, ["math", "code"]);
        assert_eq!(profile.address, Address { city: "London".into(), zip: 1815 });
    }

    #[test]
    fn keys_fall_back_to_case_insensitive_match() {
        let (profile, errors) = run(r#"{"NAME":"Grace","Age":85}"#);
        assert!(errors.is_empty());
        assert_eq!(profile.name, "Grace");
        assert_eq!(profile.age, 85);
    }

    #[test]
    fn last_matching_key_in_the_document_wins() {
        let (profile, errors) = run(r#"{"NAME":"first","nAmE":"second","age":1}"#);
        assert!(errors.is_empty());
        assert_eq!(profile.name, "second");

        let (profile, _) = run(r#"{"name":"exact","Name":"later"}"#);
        assert_eq!(profile.name, "later");
    }

    #[test]
    fn type_mismatch_keeps_the_fields_that_decoded() {
        let (profile, errors) = run(r#"{"name":"Ada","age":"old","address":{"city":"London","zip":"x"}}"#);
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.age, 0);
        assert_eq!(profile.address.city, "London");

        let message = errors.overall(ErrorKind::Deserialization).unwrap();
        assert!(message.starts_with("age: "), "{message}");
        assert_eq!(errors.count(), 1);
    }

    #[test]
    fn malformed_json_is_a_deserialization_error() {
        let (profile, errors) = run("{ bad JSON");
        assert_eq!(profile, Profile::default());
        assert!(errors.overall(ErrorKind::Deserialization).is_some());
    }

    #[test]
    fn empty_body_is_a_deserialization_error() {
        let (_, errors) = run("");
        assert!(errors.overall(ErrorKind::Deserialization).is_some());
    }

    #[test]
    fn non_object_is_rejected_and_null_is_ignored() {
        let (_, errors) = run("[1,2]");
        assert_eq!(
            errors.overall(ErrorKind::Deserialization),
            Some("expected a JSON object, found array")
        );

        let (profile, errors) = run("null");
        assert!(errors.is_empty());
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn ignored_and_unknown_keys_are_skipped() {
        let (profile, errors) = run(r#"{"hidden":"x","Hidden":"y","extra":true}"#);
        assert!(errors.is_empty());
        assert_eq!(profile.hidden, "");
    }
}
