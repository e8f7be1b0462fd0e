use core::fmt::{self, Display};

#[derive(Debug)]
pub enum Error {
    /// A table constraint rejected the values.
    BadInput,
    /// A row did not have the expected shape.
    Schema,
    /// Unrecoverable error.
    Fatal,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BadInput => "The database rejected the values.",
            Self::Schema => "The database returned an unexpected row.",
            Self::Fatal => "Unexpected database error.",
        })
    }
}

pub type Result<T> = core::result::Result<T, Error>;
