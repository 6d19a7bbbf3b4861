use std::{error, fmt};

use bstr::ByteSlice;

pub type GfaFieldResult<T> = Result<T, ParseFieldError>;
pub type GfaResult<T> = Result<T, ParseError>;

/// How forgiving the parser is about lines it cannot handle.
#[derive(Debug, Clone, Copy, Default)]
pub enum ParserTolerance {
    IgnoreAll,
    #[default]
    Safe,
    Pedantic,
}

#[derive(Debug, Clone)]
pub enum ParseFieldError {
    /// A segment ID couldn't be parsed as an unsigned integer.
    UintIdError,
    /// A bytestring wasn't valid UTF-8 where it had to be.
    Utf8Error,
    /// A field couldn't be parsed into the correct type.
    ParseFromStringError,
    /// Attempted to parse an orientation that wasn't + or -.
    OrientationError,
    /// A CIGAR overlap field held a malformed token.
    CigarError,
    /// A required field was incorrectly formatted. Includes the field
    /// name as defined by the GFA1 spec.
    InvalidField(&'static str),
    MissingFields,
}

macro_rules! impl_many_from {
    ($to:ty, ($from:ty, $out:expr)) => ();
    ($to:ty, ($from:ty, $out:expr), $(($f:ty, $o:expr)),* $(,)?) => (
        impl From<$from> for $to {
            fn from(_: $from) -> Self {
                $out
            }
        }
        impl_many_from!($to, $(($f, $o)),*);
    );
}

impl_many_from!(
    ParseFieldError,
    (std::str::Utf8Error, ParseFieldError::Utf8Error),
    (bstr::Utf8Error, ParseFieldError::Utf8Error),
    (
        std::num::ParseIntError,
        ParseFieldError::ParseFromStringError
    ),
    (
        std::num::ParseFloatError,
        ParseFieldError::ParseFromStringError
    )
);

impl fmt::Display for ParseFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ParseFieldError as PFE;
        match self {
            PFE::UintIdError => {
                write!(f, "Failed to parse a segment ID as an unsigned integer")
            }
            PFE::Utf8Error => {
                write!(f, "Failed to parse a bytestring as a UTF-8 string")
            }
            PFE::ParseFromStringError => {
                write!(f, "Failed to parse a field from a string")
            }
            PFE::OrientationError => {
                write!(f, "Failed to parse an orientation character")
            }
            PFE::CigarError => {
                write!(f, "Failed to parse a CIGAR overlap field")
            }
            PFE::InvalidField(field) => {
                write!(f, "Failed to parse field `{}`", field)
            }
            PFE::MissingFields => write!(f, "Line is missing required fields"),
        }
    }
}

impl error::Error for ParseFieldError {}

/// Type encapsulating the different kinds of GFA parsing errors.
#[derive(Debug)]
pub enum ParseError {
    /// The line type was something other than 'H', 'S', 'L', or 'P'.
    /// Ignored rather than fatal under the default tolerance.
    UnknownLineType,
    /// Tried to parse an empty line. Can be ignored.
    EmptyLine,
    /// A line couldn't be parsed. Includes the problem line and a
    /// variant describing the error.
    InvalidLine(ParseFieldError, String),
    /// A field couldn't be parsed.
    InvalidField(ParseFieldError),
    /// Wrapper for an IO error.
    IoError(std::io::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ParseError as PE;
        match self {
            PE::UnknownLineType => {
                write!(f, "Line type was not one of 'H', 'S', 'L', 'P'")
            }
            PE::EmptyLine => write!(f, "Line was empty"),
            PE::InvalidLine(field_err, line) => {
                write!(f, "Failed to parse line {}, error: {}", line, field_err)
            }
            PE::InvalidField(field_err) => {
                write!(f, "Failed to parse field: {}", field_err)
            }
            PE::IoError(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl From<std::io::Error> for ParseError {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err)
    }
}

impl From<ParseFieldError> for ParseError {
    #[inline]
    fn from(err: ParseFieldError) -> Self {
        Self::InvalidField(err)
    }
}

impl error::Error for ParseError {}

impl ParseError {
    #[inline]
    pub(crate) fn invalid_line(error: ParseFieldError, line: &[u8]) -> Self {
        let mut dest = String::new();
        line.to_str_lossy_into(&mut dest);
        Self::InvalidLine(error, dest)
    }

    /// Whether the caller may skip the offending line and carry on.
    #[inline]
    pub fn can_safely_continue(&self, tol: &ParserTolerance) -> bool {
        use ParserTolerance as Tol;
        match tol {
            Tol::IgnoreAll => true,
            Tol::Safe => matches!(
                self,
                ParseError::EmptyLine | ParseError::UnknownLineType
            ),
            Tol::Pedantic => false,
        }
    }
}
