use bstr::{BString, ByteSlice};

use lazy_static::lazy_static;
use regex::bytes::Regex;

/// These type aliases are useful for configuring the parsers.
pub type OptionalFields = Vec<OptField>;
pub type NoOptionalFields = ();

/// An optional field a la SAM.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct OptField {
    pub tag: [u8; 2],
    pub value: OptFieldVal,
}

#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum OptFieldVal {
    A(u8),
    Int(i64),
    /// Parsed straight to f64 so coverage values read back exactly
    /// what the tag said.
    Float(f64),
    Z(BString),
    BInt(Vec<i64>),
    BFloat(Vec<f64>),
}

impl OptField {
    /// Panics if the provided tag doesn't match the regex
    /// [A-Za-z][A-Za-z0-9].
    pub fn tag(t: &[u8]) -> [u8; 2] {
        assert_eq!(t.len(), 2);
        assert!(t[0].is_ascii_alphabetic());
        assert!(t[1].is_ascii_alphanumeric());
        [t[0], t[1]]
    }

    pub fn new(tag: &[u8], value: OptFieldVal) -> Self {
        let tag = OptField::tag(tag);
        OptField { tag, value }
    }

    /// Parses an optional field from a bytestring in the format
    /// <TAG>:<TYPE>:<VALUE>. Unparseable fields produce None and are
    /// skipped by the collection parser.
    pub fn parse(input: &[u8]) -> Option<Self> {
        lazy_static! {
            static ref RE_CHAR: Regex = Regex::new(r"(?-u)[!-~]").unwrap();
            static ref RE_INT: Regex = Regex::new(r"(?-u)[-+]?[0-9]+").unwrap();
            static ref RE_FLOAT: Regex =
                Regex::new(r"(?-u)[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?")
                    .unwrap();
            static ref RE_STRING: Regex = Regex::new(r"(?-u)[ !-~]+").unwrap();
        }

        use std::str::from_utf8;
        use OptFieldVal::*;

        if input.len() < 6 || input[2] != b':' || input[4] != b':' {
            return None;
        }

        let o_tag = &input[0..=1];
        let o_type = input[3];
        let o_contents = &input[5..];

        let o_val = match o_type {
            b'A' => RE_CHAR.find(o_contents).map(|s| s.as_bytes()[0]).map(A),
            b'i' => RE_INT
                .find(o_contents)
                .and_then(|s| from_utf8(s.as_bytes()).ok())
                .and_then(|s| s.parse().ok())
                .map(Int),
            b'f' => RE_FLOAT
                .find(o_contents)
                .and_then(|s| from_utf8(s.as_bytes()).ok())
                .and_then(|s| s.parse().ok())
                .map(Float),
            b'Z' | b'J' => RE_STRING
                .find(o_contents)
                .map(|s| s.as_bytes().into())
                .map(Z),
            b'B' => {
                let first = *o_contents.first()?;
                let rest = o_contents[1..]
                    .split_str(b",")
                    .filter_map(|s| from_utf8(s).ok());
                if first == b'f' {
                    Some(BFloat(rest.filter_map(|s| s.parse().ok()).collect()))
                } else {
                    Some(BInt(rest.filter_map(|s| s.parse().ok()).collect()))
                }
            }
            _ => None,
        }?;

        Some(Self::new(o_tag, o_val))
    }

    /// The numeric value of this field, if it holds one. Both `i` and
    /// `f` typed tags qualify; coverage tags are written either way in
    /// the wild.
    pub fn as_f64(&self) -> Option<f64> {
        match &self.value {
            OptFieldVal::Int(x) => Some(*x as f64),
            OptFieldVal::Float(x) => Some(*x),
            _ => None,
        }
    }
}

/// The Display output can be parsed back to an OptField.
impl std::fmt::Display for OptField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use OptFieldVal::*;

        write!(f, "{}{}:", char::from(self.tag[0]), char::from(self.tag[1]))?;

        match &self.value {
            A(x) => write!(f, "A:{}", char::from(*x)),
            Int(x) => write!(f, "i:{}", x),
            Float(x) => write!(f, "f:{}", x),
            Z(x) => write!(f, "Z:{}", x),
            BInt(x) => {
                write!(f, "B:i")?;
                for (i, a) in x.iter().enumerate() {
                    let sep = if i == 0 { "" } else { "," };
                    write!(f, "{}{}", sep, a)?
                }
                Ok(())
            }
            BFloat(x) => {
                write!(f, "B:f")?;
                for (i, a) in x.iter().enumerate() {
                    let sep = if i == 0 { "" } else { "," };
                    write!(f, "{}{}", sep, a)?
                }
                Ok(())
            }
        }
    }
}

/// OptFields describes how to parse, store, and query optional fields.
pub trait OptFields: Sized + Default + Clone {
    /// Return the optional field with the given tag, if it exists.
    fn get_field(&self, tag: &[u8]) -> Option<&OptField>;

    /// Return all optional fields.
    fn fields(&self) -> &[OptField];

    /// Given a sequence of bytestrings, parse them as optional fields
    /// to create a collection.
    fn parse<T>(input: T) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<[u8]>;

    /// The first numeric value among the given tags. Used to read
    /// coverage tags, which assemblers write under several names.
    fn first_numeric(&self, tags: &[&[u8]]) -> Option<f64> {
        tags.iter()
            .find_map(|tag| self.get_field(tag).and_then(OptField::as_f64))
    }
}

/// Useful for performance if we don't actually need any optional
/// fields.
impl OptFields for () {
    fn get_field(&self, _: &[u8]) -> Option<&OptField> {
        None
    }

    fn fields(&self) -> &[OptField] {
        &[]
    }

    fn parse<T>(_input: T) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<[u8]>,
    {
    }
}

/// Stores all the optional fields in a vector.
impl OptFields for Vec<OptField> {
    fn get_field(&self, tag: &[u8]) -> Option<&OptField> {
        self.iter().find(|o| o.tag == tag)
    }

    fn fields(&self) -> &[OptField] {
        self.as_slice()
    }

    fn parse<T>(input: T) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<[u8]>,
    {
        input
            .into_iter()
            .filter_map(|f| OptField::parse(f.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let field = OptField::parse(b"ll:f:40.5").unwrap();
        assert_eq!(field.tag, *b"ll");
        assert_eq!(field.as_f64(), Some(40.5));
        assert_eq!(field.to_string(), "ll:f:40.5");

        let field = OptField::parse(b"RC:i:120").unwrap();
        assert_eq!(field.as_f64(), Some(120.0));

        assert!(OptField::parse(b"bogus").is_none());
        assert!(OptField::parse(b"xx:q:1").is_none());
    }

    #[test]
    fn float_tags_read_back_exactly() {
        // a value with no exact f32 representation must not pick up
        // widening artifacts
        let field = OptField::parse(b"ll:f:30.2").unwrap();
        assert_eq!(field.as_f64(), Some(30.2));
        assert_eq!(field.to_string(), "ll:f:30.2");
    }

    #[test]
    fn first_numeric_falls_through_tags() {
        let fields: OptionalFields =
            OptFields::parse(vec![&b"UR:Z:x"[..], &b"dp:i:31"[..]]);
        assert_eq!(fields.first_numeric(&[b"ll", b"dp"]), Some(31.0));
        assert_eq!(fields.first_numeric(&[b"ec"]), None);
    }
}
