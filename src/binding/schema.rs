//! Per-type field descriptors.
//!
//! A [`Bindable`] type lists its fields once, in order, with accessors and
//! source keys. The form decoder, the JSON decoder and the required-field
//! walk all run off that list.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::errors::{ErrorKind, Errors};
use super::form::FormValue;
use super::validate;
use super::json;
use crate::request::Request;

/// Source key that switches a field off in every phase.
pub const IGNORE: &str = "-";

/// A record the binder can populate and validate.
///
/// ```rust
/// use tsu_binding::Request;
/// use tsu_binding::binding::{Bindable, Errors, Schema};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct BlogPost {
///     title: String,
///     content: String,
///     tags: Vec<String>,
/// }
///
/// impl Bindable for BlogPost {
///     fn describe(schema: &mut Schema<Self>) {
///         schema.field("Title", |p| &p.title, |p| &mut p.title).key("title").required();
///         schema.field("Content", |p| &p.content, |p| &mut p.content).key("content");
///         schema.field("Tags", |p| &p.tags, |p| &mut p.tags).form("tag").json("tags");
///     }
///
///     fn validate(&self, errors: &mut Errors, _req: &Request) {
///         if self.content.len() > 1024 {
///             errors.set_field("Content", "Content too long");
///         }
///     }
/// }
/// ```
pub trait Bindable: Default + Send + Sync + 'static {
    /// Declares the fields, in the order they should be walked.
    fn describe(schema: &mut Schema<Self>);

    /// Extra checks after the required-field walk. Anything recorded here
    /// loses to a deserialization or required error on the same key.
    fn validate(&self, _errors: &mut Errors, _req: &Request) {}
}

type FormSetter<T> = Box<dyn Fn(&mut T, &[String]) -> Result<(), ErrorKind> + Send + Sync>;
type JsonSetter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), String> + Send + Sync>;
type RequiredCheck<T> = Box<dyn Fn(&T, &mut Errors) + Send + Sync>;

/// The ordered field list of `T`.
pub struct Schema<T> {
    fields: Vec<Field<T>>,
}

impl<T: Bindable> Schema<T> {
    /// Runs `T::describe` and returns the result.
    pub fn of() -> Self {
        let mut schema = Self { fields: Vec::new() };
        T::describe(&mut schema);
        schema
    }
}

impl<T: 'static> Schema<T> {
    pub(crate) fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    /// A primitive, `Option` of a primitive, or `Vec` of primitives. Bound
    /// from form data (once given a form key) and from JSON.
    pub fn field<V>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Field<T>
    where
        V: FormValue + DeserializeOwned + Default + PartialEq + 'static,
    {
        let set_form: FormSetter<T> = Box::new(move |t, raw| get_mut(t).set_from_form(raw));
        self.push(Field::leaf(name, get, get_mut, Some(set_form)))
    }

    /// Any JSON-decodable value. Form data never touches it.
    pub fn value<V>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Field<T>
    where
        V: DeserializeOwned + Default + PartialEq + 'static,
    {
        self.push(Field::leaf(name, get, get_mut, None))
    }

    /// A nested record. JSON decodes into it field by field; a required
    /// nested record is validated by walking its own required fields.
    pub fn nested<V: Bindable>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Field<T> {
        let schema = Arc::new(Schema::<V>::of());
        let inner = Arc::clone(&schema);
        let set_json: JsonSetter<T> =
            Box::new(move |t, value| json::decode_value(&inner, get_mut(t), value));
        let check_required: RequiredCheck<T> =
            Box::new(move |t, errors| validate::required(&schema, get(t), errors));

        self.push(Field::new(name, None, set_json, check_required))
    }

    fn push(&mut self, field: Field<T>) -> &mut Field<T> {
        self.fields.push(field);
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }
}

/// One declared field. Returned by the [`Schema`] methods so the source keys
/// and flags can be chained on.
pub struct Field<T> {
    name: &'static str,
    form_key: Option<&'static str>,
    json_key: Option<&'static str>,
    required: bool,
    ignored: bool,
    set_form: Option<FormSetter<T>>,
    set_json: JsonSetter<T>,
    check_required: RequiredCheck<T>,
}

impl<T: 'static> Field<T> {
    fn new(
        name: &'static str,
        set_form: Option<FormSetter<T>>,
        set_json: JsonSetter<T>,
        check_required: RequiredCheck<T>,
    ) -> Self {
        Self {
            name,
            form_key: None,
            json_key: None,
            required: false,
            ignored: false,
            set_form,
            set_json,
            check_required,
        }
    }

    fn leaf<V>(
        name: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
        set_form: Option<FormSetter<T>>,
    ) -> Self
    where
        V: DeserializeOwned + Default + PartialEq + 'static,
    {
        let set_json: JsonSetter<T> = Box::new(move |t, value| {
            *get_mut(t) = serde_json::from_value(value).map_err(|e| e.to_string())?;
            Ok(())
        });
        let check_required: RequiredCheck<T> = Box::new(move |t, errors| {
            if *get(t) == V::default() {
                errors.add_field(name, ErrorKind::Required);
            }
        });
        Self::new(name, set_form, set_json, check_required)
    }
}

impl<T> Field<T> {
    /// Sets the form and the JSON key at once.
    pub fn key(&mut self, key: &'static str) -> &mut Self {
        self.form(key).json(key)
    }

    /// Key looked up in query-string and urlencoded body pairs. Without one,
    /// form binding leaves the field alone. No effect on nested records.
    pub fn form(&mut self, key: &'static str) -> &mut Self {
        if key == IGNORE {
            return self.ignore();
        }
        self.form_key = Some(key);
        self
    }

    /// Key looked up in a JSON body. Defaults to the field name.
    pub fn json(&mut self, key: &'static str) -> &mut Self {
        if key == IGNORE {
            return self.ignore();
        }
        self.json_key = Some(key);
        self
    }

    /// The field must not keep its zero value.
    pub fn required(&mut self) -> &mut Self {
        self.required = true;
        self
    }

    /// Skip the field when decoding and when validating.
    pub fn ignore(&mut self) -> &mut Self {
        self.ignored = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub(crate) fn form_key(&self) -> Option<&'static str> {
        if self.set_form.is_some() { self.form_key } else { None }
    }

    pub(crate) fn json_key(&self) -> &'static str {
        self.json_key.unwrap_or(self.name)
    }

    pub(crate) fn set_form(&self, target: &mut T, raw: &[String]) -> Result<(), ErrorKind> {
        match &self.set_form {
            Some(set) => set(target, raw),
            None => Ok(()),
        }
    }

    pub(crate) fn set_json(&self, target: &mut T, value: Value) -> Result<(), String> {
        (self.set_json)(target, value)
    }

    pub(crate) fn check_required(&self, target: &T, errors: &mut Errors) {
        (self.check_required)(target, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Author {
        name: String,
    }

    impl Bindable for Author {
        fn describe(schema: &mut Schema<Self>) {
            schema.field("Name", |a| &a.name, |a| &mut a.name).key("name").required();
        }
    }

    #[derive(Default)]
    struct Post {
        title: String,
        secret: String,
        author: Author,
    }

    impl Bindable for Post {
        fn describe(schema: &mut Schema<Self>) {
            schema.field("Title", |p| &p.title, |p| &mut p.title).form("title");
            schema.field("Secret", |p| &p.secret, |p| &mut p.secret).form("-").required();
            schema.nested("Author", |p| &p.author, |p| &mut p.author).form("author").required();
        }
    }

    #[test]
    fn keeps_declaration_order_and_flags() {
        let schema = Schema::<Post>::of();
        let names: Vec<_> = schema.fields().iter().map(Field::name).collect();
        assert_eq!(names, ["Title", "Secret", "Author"]);

        let [title, secret, author] = schema.fields() else { panic!("three fields") };
        assert_eq!(title.form_key(), Some("title"));
        assert_eq!(title.json_key(), "Title");
        assert!(secret.is_ignored());
        assert!(secret.is_required());
        assert_eq!(author.form_key(), None);
        assert!(author.is_required());
    }

    #[test]
    fn leaf_setters_write_through_accessors() {
        let schema = Schema::<Post>::of();
        let mut post = Post::default();

        schema.fields()[0].set_form(&mut post, &["Hello".to_owned()]).unwrap();
        assert_eq!(post.title, "Hello");

        schema.fields()[0].set_json(&mut post, Value::from("From JSON")).unwrap();
        assert_eq!(post.title, "From JSON");

        assert!(schema.fields()[0].set_json(&mut post, Value::from(5)).is_err());
        assert_eq!(post.title, "From JSON");
    }
}
