use std::string::FromUtf8Error;
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("not a studio model (id {id:#x}, version {version})")]
    NotAStudioModel { id: i32, version: i32 },
    #[error("required {file} data is missing or invalid")]
    MissingSibling { file: &'static str },
    #[error("{file} checksum {found:#x} doesn't match the mdl checksum {expected:#x}")]
    ChecksumMismatch {
        file: &'static str,
        expected: i32,
        found: i32,
    },
    #[error(transparent)]
    String(#[from] StringError),
    #[error("unsupported physics solid: {0}")]
    UnsupportedSolid(&'static str),
    #[error("referenced {data} is out of bounds at {offset}")]
    OutOfBounds { data: &'static str, offset: usize },
    #[error("trying to read past the end of the file")]
    Eof(usize),
}

#[derive(Debug, Error)]
pub enum StringError {
    #[error(transparent)]
    NonUTF8(#[from] std::str::Utf8Error),
    #[error("string is not null-terminated")]
    NotNullTerminated,
}

impl From<FromUtf8Error> for StringError {
    fn from(value: FromUtf8Error) -> Self {
        StringError::NonUTF8(value.utf8_error())
    }
}

impl From<FromUtf8Error> for ModelError {
    fn from(value: FromUtf8Error) -> Self {
        StringError::NonUTF8(value.utf8_error()).into()
    }
}
