use crate::parser::ParseFieldError;

/// Represents segment orientation/strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Orientation {
    Forward,
    Backward,
}

impl Orientation {
    /// Parse an orientation from a single-element bytestring, where +
    /// is Forward, - is Backward.
    #[inline]
    pub fn from_bytes_plus_minus<T: AsRef<[u8]>>(bs: T) -> Option<Self> {
        match bs.as_ref() {
            b"+" => Some(Orientation::Forward),
            b"-" => Some(Orientation::Backward),
            _ => None,
        }
    }

    #[inline]
    pub fn parse_error(opt: Option<Self>) -> Result<Self, ParseFieldError> {
        opt.ok_or(ParseFieldError::OrientationError)
    }

    #[inline]
    pub fn plus_minus_as_byte(&self) -> u8 {
        match self {
            Self::Forward => b'+',
            Self::Backward => b'-',
        }
    }

    #[inline]
    pub fn is_reverse(&self) -> bool {
        *self == Orientation::Backward
    }

    /// The opposite strand.
    #[inline]
    pub fn flip(&self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Default orientation is forward.
impl Default for Orientation {
    #[inline]
    fn default() -> Orientation {
        Orientation::Forward
    }
}

impl std::str::FromStr for Orientation {
    type Err = &'static str;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Orientation::from_bytes_plus_minus(s.as_bytes())
            .ok_or("Could not parse orientation (was not + or -)")
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", char::from(self.plus_minus_as_byte()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plus_minus() {
        assert_eq!(
            Orientation::from_bytes_plus_minus(b"+"),
            Some(Orientation::Forward)
        );
        assert_eq!(
            Orientation::from_bytes_plus_minus(b"-"),
            Some(Orientation::Backward)
        );
        assert_eq!(Orientation::from_bytes_plus_minus(b"?"), None);
    }

    #[test]
    fn flip_is_involution() {
        assert_eq!(Orientation::Forward.flip(), Orientation::Backward);
        assert_eq!(Orientation::Forward.flip().flip(), Orientation::Forward);
    }
}
