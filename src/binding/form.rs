//! `application/x-www-form-urlencoded` decoding.
//!
//! Two halves: [`FormData`] turns a query string and an optional body into a
//! multi-map, and [`FormValue`] turns the raw strings submitted under one key
//! into a typed field value.

use std::collections::HashMap;

use super::errors::ErrorKind;

// ── FormData ──────────────────────────────────────────────────────────────────

/// Decoded form pairs. Every key maps to its values in submission order:
/// query-string values first, then body values.
#[derive(Debug, Default)]
pub struct FormData {
    values: HashMap<String, Vec<String>>,
}

impl FormData {
    /// Decodes `query` and then `body`.
    ///
    /// A pair with a malformed `%` escape is skipped; the rest still decode.
    /// The first such problem is returned alongside the data.
    pub fn parse(query: Option<&str>, body: Option<&[u8]>) -> (Self, Option<String>) {
        let mut form = Self::default();
        let mut first_err = None;

        for input in [query.map(str::as_bytes), body].into_iter().flatten() {
            if let Err(e) = form.extend_from(input) {
                first_err.get_or_insert(e);
            }
        }

        (form, first_err)
    }

    /// All values submitted under `key`.
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// The first value submitted under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key)?.first().map(String::as_str)
    }

    fn extend_from(&mut self, input: &[u8]) -> Result<(), String> {
        let mut first_err = None;

        for pair in input.split(|&b| b == b'&').filter(|p| !p.is_empty()) {
            if let Err(e) = check_escapes(pair) {
                first_err.get_or_insert(e);
                continue;
            }
            // A lone pair never yields more than one item.
            if let Some((key, value)) = form_urlencoded::parse(pair).next() {
                self.values
                    .entry(key.into_owned())
                    .or_default()
                    .push(value.into_owned());
            }
        }

        first_err.map_or(Ok(()), Err)
    }
}

/// Every `%` must be followed by two hex digits.
fn check_escapes(pair: &[u8]) -> Result<(), String> {
    let mut i = 0;
    while i < pair.len() {
        if pair[i] == b'%' {
            let escape = pair.get(i + 1..i + 3);
            match escape {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => {
                    let end = (i + 3).min(pair.len());
                    return Err(format!(
                        "invalid URL escape \"{}\"",
                        String::from_utf8_lossy(&pair[i..end])
                    ));
                }
            }
        } else {
            i += 1;
        }
    }
    Ok(())
}

// ── Typed conversion ──────────────────────────────────────────────────────────

/// A primitive a single form string converts into.
///
/// An empty string converts to the type's zero value.
pub trait Scalar: Default + Sized {
    fn parse_form(raw: &str) -> Result<Self, ErrorKind>;
}

impl Scalar for String {
    fn parse_form(raw: &str) -> Result<Self, ErrorKind> {
        Ok(raw.to_owned())
    }
}

impl Scalar for bool {
    fn parse_form(raw: &str) -> Result<Self, ErrorKind> {
        match raw {
            "" | "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            _ => Err(ErrorKind::BooleanType),
        }
    }
}

macro_rules! scalar_from_str {
    ($kind:expr => $($ty:ty),+) => {$(
        impl Scalar for $ty {
            fn parse_form(raw: &str) -> Result<Self, ErrorKind> {
                if raw.is_empty() {
                    return Ok(Self::default());
                }
                raw.parse().map_err(|_| $kind)
            }
        }
    )+};
}

scalar_from_str!(ErrorKind::IntegerType => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
scalar_from_str!(ErrorKind::FloatType => f32, f64);

/// A field type the form deserializer can populate.
///
/// `raw` holds every value submitted under the field's key (never empty).
/// On error the field is left as it was, except for sequences, which keep
/// the elements that did convert.
pub trait FormValue {
    fn set_from_form(&mut self, raw: &[String]) -> Result<(), ErrorKind>;
}

macro_rules! form_value_scalar {
    ($($ty:ty),+) => {$(
        impl FormValue for $ty {
            fn set_from_form(&mut self, raw: &[String]) -> Result<(), ErrorKind> {
                *self = <$ty>::parse_form(first(raw))?;
                Ok(())
            }
        }
    )+};
}

form_value_scalar!(String, bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

fn first(raw: &[String]) -> &str {
    raw.first().map_or("", String::as_str)
}

impl<T: Scalar> FormValue for Option<T> {
    fn set_from_form(&mut self, raw: &[String]) -> Result<(), ErrorKind> {
        *self = Some(T::parse_form(first(raw))?);
        Ok(())
    }
}

/// One element per submitted value. An element that fails to convert stays
/// at its zero value and the last failure is reported.
impl<T: Scalar> FormValue for Vec<T> {
    fn set_from_form(&mut self, raw: &[String]) -> Result<(), ErrorKind> {
        let mut last_err = None;
        *self = raw
            .iter()
            .map(|r| {
                T::parse_form(r).unwrap_or_else(|kind| {
                    last_err = Some(kind);
                    T::default()
                })
            })
            .collect();
        last_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn query_then_body() {
        let (form, err) = FormData::parse(Some("tag=a&title=Query"), Some(&b"tag=b&tag=c"[..]));
        assert!(err.is_none());
        assert_eq!(form.get_all("tag").unwrap(), strings(&["a", "b", "c"]).as_slice());
        assert_eq!(form.get("title"), Some("Query"));
    }

    #[test]
    fn decodes_plus_and_percent() {
        let (form, _) = FormData::parse(Some("content=This+is%20the+content"), None);
        assert_eq!(form.get("content"), Some("This is the content"));
    }

    #[test]
    fn bad_escape_skips_only_that_pair() {
        let (form, err) = FormData::parse(Some("title=ok&content=100%zz&n=%4"), None);
        assert_eq!(err.as_deref(), Some("invalid URL escape \"%zz\""));
        assert_eq!(form.get("title"), Some("ok"));
        assert!(form.get("content").is_none());
        assert!(form.get("n").is_none());
    }

    #[test]
    fn empty_values_take_zero() {
        assert_eq!(i32::parse_form(""), Ok(0));
        assert_eq!(f64::parse_form(""), Ok(0.0));
        assert_eq!(bool::parse_form(""), Ok(false));
    }

    #[test]
    fn bool_tokens() {
        for t in ["1", "t", "T", "true", "TRUE", "True"] {
            assert_eq!(bool::parse_form(t), Ok(true), "{t}");
        }
        for f in ["0", "f", "F", "false", "FALSE", "False"] {
            assert_eq!(bool::parse_form(f), Ok(false), "{f}");
        }
        assert_eq!(bool::parse_form("yes"), Err(ErrorKind::BooleanType));
    }

    #[test]
    fn conversion_failures_map_to_kinds() {
        assert_eq!(i64::parse_form("4.5"), Err(ErrorKind::IntegerType));
        assert_eq!(u8::parse_form("-1"), Err(ErrorKind::IntegerType));
        assert_eq!(f32::parse_form("pi"), Err(ErrorKind::FloatType));
    }

    #[test]
    fn failed_scalar_leaves_field_alone() {
        let mut age = 7_i32;
        assert_eq!(age.set_from_form(&strings(&["seven"])), Err(ErrorKind::IntegerType));
        assert_eq!(age, 7);
    }

    #[test]
    fn sequence_keeps_order_and_reports_last_failure() {
        let mut scores: Vec<f64> = Vec::new();
        let res = scores.set_from_form(&strings(&["1.5", "x", "2", "y"]));
        assert_eq!(res, Err(ErrorKind::FloatType));
        assert_eq!(scores, vec![1.5, 0.0, 2.0, 0.0]);

        let mut tags: Vec<String> = Vec::new();
        tags.set_from_form(&strings(&["a", "b", "c"])).unwrap();
        assert_eq!(tags, strings(&["a", "b", "c"]));
    }

    #[test]
    fn option_wraps_value() {
        let mut draft: Option<bool> = None;
        draft.set_from_form(&strings(&["true"])).unwrap();
        assert_eq!(draft, Some(true));
    }
}
