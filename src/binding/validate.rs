//! Required-field walk.

use super::errors::Errors;
use super::schema::Schema;

/// Records a `Required` error for every required field still at its zero
/// value, descending into required nested records. Walks top to bottom,
/// outer before inner; a nested field sharing a name with an outer one
/// overwrites it.
pub(crate) fn required<T: 'static>(schema: &Schema<T>, target: &T, errors: &mut Errors) {
    for field in schema.fields() {
        if field.is_required() && !field.is_ignored() {
            field.check_required(target, errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Bindable, ErrorKind};

    #[derive(Default)]
    struct Author {
        name: String,
        email: String,
    }

    impl Bindable for Author {
        fn describe(schema: &mut Schema<Self>) {
            schema.field("AuthorName", |a| &a.name, |a| &mut a.name).required();
            schema.field("Email", |a| &a.email, |a| &mut a.email);
        }
    }

    #[derive(Default)]
    struct Post {
        title: String,
        views: u64,
        draft: bool,
        tags: Vec<String>,
        internal: String,
        author: Author,
    }

    impl Bindable for Post {
        fn describe(schema: &mut Schema<Self>) {
            schema.field("Title", |p| &p.title, |p| &mut p.title).required();
            schema.field("Views", |p| &p.views, |p| &mut p.views).required();
            schema.field("Draft", |p| &p.draft, |p| &mut p.draft);
            schema.field("Tags", |p| &p.tags, |p| &mut p.tags).required();
            schema.field("Internal", |p| &p.internal, |p| &mut p.internal).ignore().required();
            schema.nested("Author", |p| &p.author, |p| &mut p.author).required();
        }
    }

    fn check(post: &Post) -> Errors {
        let mut errors = Errors::new();
        required(&Schema::<Post>::of(), post, &mut errors);
        errors
    }

    #[test]
    fn zero_values_are_flagged() {
        let errors = check(&Post::default());
        assert_eq!(errors.field("Title"), Some("Required"));
        assert_eq!(errors.field("Views"), Some("Required"));
        assert_eq!(errors.field("Tags"), Some("Required"));
        assert_eq!(errors.field("Draft"), None);
        assert_eq!(errors.field("Internal"), None);
    }

    #[test]
    fn nested_record_is_walked_not_compared() {
        let post = Post {
            title: "T".into(),
            views: 1,
            tags: vec!["a".into()],
            author: Author { name: String::new(), email: "a@b.c".into() },
            ..Post::default()
        };
        let errors = check(&post);
        assert_eq!(errors.field("AuthorName"), Some(ErrorKind::Required.as_str()));
        assert_eq!(errors.field("Author"), None);
        assert_eq!(errors.count(), 1);
    }

    #[test]
    fn filled_record_passes() {
        let post = Post {
            title: "T".into(),
            views: 3,
            tags: vec!["a".into()],
            author: Author { name: "Ann".into(), email: String::new() },
            ..Post::default()
        };
        assert!(check(&post).is_empty());
    }
}
