// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::DataType;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single parameter lookup, read or write.
///
/// Errors concern one descriptor; an array visit that hits one keeps going
/// and reports every failure together as [`Error::Aggregate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("parameter \"{0}\" is not present")]
    UnknownKey(String),

    #[error("parameter \"{key}\" holds a {actual} value, {expected} was requested")]
    TypeMismatch {
        key: String,
        expected: DataType,
        actual: DataType,
    },

    #[error("value of parameter \"{key}\" does not fit in {width} bytes")]
    ValueTruncated { key: String, width: usize },

    #[error("parameter \"{key}\" needs {required} bytes, buffer holds {capacity}")]
    BufferTooSmall {
        key: String,
        required: usize,
        capacity: usize,
    },

    #[error("{size} bytes exceed the {capacity} byte capacity of parameter \"{key}\"")]
    CapacityExceeded {
        key: String,
        size: usize,
        capacity: usize,
    },

    #[error("parameter \"{key}\" has unsupported {data_type} width {size}")]
    InvalidSize {
        key: String,
        data_type: DataType,
        size: usize,
    },

    #[error("parameter \"{key}\" does not accept {value}")]
    InvalidValue { key: String, value: String },

    #[error("parameter \"{0}\" has not been written")]
    NoData(String),

    #[error("parameter \"{0}\" is read only")]
    ReadOnly(String),

    #[error("parameter key is null or not valid UTF-8")]
    InvalidKey,

    #[error("parameter \"{0}\" does not hold valid UTF-8")]
    InvalidUtf8(String),

    #[error("unknown parameter data type {0}")]
    UnknownType(u32),

    #[error("{}", summarize(.0))]
    Aggregate(Vec<Error>),

    #[error("provider call returned {0}")]
    CallFailed(i32),

    #[error("provider call returned a null pointer")]
    NullPointer,
}

impl Error {
    /// The key of the parameter the error is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::UnknownKey(key)
            | Error::NoData(key)
            | Error::ReadOnly(key)
            | Error::InvalidUtf8(key) => Some(key),
            Error::TypeMismatch { key, .. }
            | Error::ValueTruncated { key, .. }
            | Error::BufferTooSmall { key, .. }
            | Error::CapacityExceeded { key, .. }
            | Error::InvalidSize { key, .. }
            | Error::InvalidValue { key, .. } => Some(key),
            Error::InvalidKey
            | Error::UnknownType(_)
            | Error::Aggregate(_)
            | Error::CallFailed(_)
            | Error::NullPointer => None,
        }
    }

    /// Size a retry needs when a destination buffer was too small.
    pub fn required_size(&self) -> Option<usize> {
        match self {
            Error::BufferTooSmall { required, .. } => Some(*required),
            _ => None,
        }
    }

    /// Collapses per-parameter failures: none is success, one is returned as is.
    pub fn collect(mut errors: Vec<Error>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Aggregate(errors)),
        }
    }
}

fn summarize(errors: &[Error]) -> String {
    match errors.first() {
        Some(first) => format!("{} parameter(s) failed, first: {}", errors.len(), first),
        None => "no parameter failed".to_string(),
    }
}

#[test]
fn test_error_collect() {
    assert_eq!(Error::collect(vec![]), Ok(()));

    let single = Error::collect(vec![Error::NoData("iv".into())]).unwrap_err();
    assert_eq!(single, Error::NoData("iv".into()));

    let many = Error::collect(vec![
        Error::NoData("iv".into()),
        Error::UnknownKey("num".into()),
    ])
    .unwrap_err();
    assert!(matches!(many, Error::Aggregate(ref errors) if errors.len() == 2));
    assert!(many.to_string().starts_with("2 parameter(s) failed"));
}

#[test]
fn test_error_reports_required_size() {
    let err = Error::BufferTooSmall {
        key: "iv".into(),
        required: 16,
        capacity: 8,
    };
    assert_eq!(err.required_size(), Some(16));
    assert_eq!(err.key(), Some("iv"));
    assert_eq!(Error::InvalidKey.required_size(), None);
}
