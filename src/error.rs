use snafu::Snafu;

/// The public Error type for this library.
#[derive(Debug, Snafu)]
pub struct Error(LibError);

/// The public Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// The internal Result type for this library.
pub(crate) type LibResult<T> = std::result::Result<T, LibError>;

/// A coarse classification of [`Error`] for callers that branch on failure modes without
/// matching display strings.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The input violates the wire or file format.
    Malformed,
    /// The input is well formed but outside the level this decoder was configured for.
    Unsupported,
    /// A numeric constructor rejected an out-of-range value.
    OutOfRange,
    /// A `Read` or `Write` failed at the file boundary.
    Io,
}

impl Error {
    /// Which of the failure classes this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match &self.0 {
            LibError::Io { .. } | LibError::Write { .. } => ErrorKind::Io,
            LibError::Malformed { .. } | LibError::StringTooLong { .. } => ErrorKind::Malformed,
            LibError::Unsupported { .. } => ErrorKind::Unsupported,
            LibError::OutOfRange { .. } => ErrorKind::OutOfRange,
        }
    }

    /// The byte offset (or word index) where decoding failed, for [`ErrorKind::Malformed`].
    pub fn offset(&self) -> Option<u64> {
        match &self.0 {
            LibError::Malformed { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// The internal Error type for this library.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum LibError {
    #[snafu(context(suffix(false)))]
    #[snafu(display("error while reading bytes: {}", source))]
    Io {
        site: String,
        source: crate::byte_iter::ByteError,
    },

    #[snafu(context(suffix(false)))]
    #[snafu(display("{}: error while writing bytes: {}", site, source))]
    Write {
        site: String,
        source: std::io::Error,
    },

    #[snafu(context(suffix(false)))]
    #[snafu(display("{}: malformed input at offset {}: {}", site, offset, description))]
    Malformed {
        site: String,
        offset: u64,
        description: String,
    },

    #[snafu(context(suffix(false)))]
    #[snafu(display("{}: well-formed but unsupported input: {}", site, what))]
    Unsupported { site: String, what: String },

    #[snafu(context(suffix(false)))]
    #[snafu(display("value {} is out of range for {}, maximum is {}", value, field, max))]
    OutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[snafu(context(suffix(false)))]
    #[snafu(display("{}: string data is too long for a vlq length field", site))]
    StringTooLong { site: String },
}

macro_rules! site {
    () => {
        format!("{}:{}", file!(), line!())
    };
}

macro_rules! io {
    () => {
        crate::error::Io { site: site!() }
    };
}

macro_rules! wr {
    () => {
        crate::error::Write { site: site!() }
    };
}

macro_rules! malformed_s {
    ($offset:expr, $msg:expr) => {
        crate::error::Malformed {
            site: site!(),
            offset: $offset as u64,
            description: String::from($msg),
        }
    };
    ($offset:expr, $fmt:expr, $($arg:expr),+) => {
        crate::error::Malformed {
            site: site!(),
            offset: $offset as u64,
            description: format!($fmt, $($arg),+),
        }
    };
}

macro_rules! malformed_e {
    ($offset:expr, $msg:expr) => {
        malformed_s!($offset, $msg).build()
    };
    ($offset:expr, $fmt:expr, $($arg:expr),+) => {
        malformed_s!($offset, $fmt, $($arg),+).build()
    };
}

macro_rules! malformed {
    ($offset:expr, $msg:expr) => {
        return Err(malformed_e!($offset, $msg))
    };
    ($offset:expr, $fmt:expr, $($arg:expr),+) => {
        return Err(malformed_e!($offset, $fmt, $($arg),+))
    };
}

macro_rules! unsupported {
    ($what:expr) => {
        return crate::error::Unsupported {
            site: site!(),
            what: String::from($what),
        }
        .fail()
    };
}

#[test]
fn site_test() {
    let line = line!() + 1;
    let site = site!();
    assert!(site.contains("error.rs"));
    assert!(site.contains(format!("{}", line).as_str()));
}

#[test]
fn malformed_macros_test() {
    fn foo() -> LibResult<u64> {
        malformed!(17u64, "bad {} byte", "status");
    }
    let result = foo();
    assert!(result.is_err());
    let e = result.err().unwrap();
    let message = format!("{}", e);
    assert!(message.contains("bad status byte"));
    assert!(message.contains("17"));
}

#[test]
fn kind_test() {
    let e: Error = malformed_e!(3u64, "nope").into();
    assert_eq!(ErrorKind::Malformed, e.kind());
    assert_eq!(Some(3), e.offset());
}
