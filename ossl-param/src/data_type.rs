// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;

use crate::{Error, Result};

/// The kind of value a parameter carries.
///
/// The discriminants are the ones used on the C ABI, so a tag can be read
/// straight out of `OSSL_PARAM::data_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u32)]
pub enum DataType {
    /// Signed integer, native endian, 1, 2, 4 or 8 bytes wide.
    Int = 1,
    /// Unsigned integer, native endian, 1, 2, 4 or 8 bytes wide.
    UInt = 2,
    /// IEEE 754 float, 4 or 8 bytes wide.
    Real = 3,
    /// UTF-8 text held in a buffer owned by the parameter.
    Utf8String = 4,
    /// Arbitrary bytes held in a buffer owned by the parameter.
    OctetString = 5,
    /// UTF-8 text in a buffer borrowed from the caller.
    Utf8Ptr = 6,
    /// Arbitrary bytes in a buffer borrowed from the caller.
    OctetPtr = 7,
}

/// Broad category of a [`DataType`]. Values never move between families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Integer,
    Unsigned,
    Real,
    Utf8,
    Octet,
}

impl DataType {
    pub const ALL: [DataType; 7] = [
        DataType::Int,
        DataType::UInt,
        DataType::Real,
        DataType::Utf8String,
        DataType::OctetString,
        DataType::Utf8Ptr,
        DataType::OctetPtr,
    ];

    pub fn from_raw(raw: u32) -> Result<Self> {
        DataType::from_u32(raw).ok_or(Error::UnknownType(raw))
    }

    pub fn as_raw(self) -> u32 {
        self as u32
    }

    pub fn family(self) -> Family {
        match self {
            DataType::Int => Family::Integer,
            DataType::UInt => Family::Unsigned,
            DataType::Real => Family::Real,
            DataType::Utf8String | DataType::Utf8Ptr => Family::Utf8,
            DataType::OctetString | DataType::OctetPtr => Family::Octet,
        }
    }

    /// Pointer variants reference caller-owned memory instead of owning it.
    pub fn is_pointer(self) -> bool {
        matches!(self, DataType::Utf8Ptr | DataType::OctetPtr)
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self.family(),
            Family::Integer | Family::Unsigned | Family::Real
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int => "integer",
            DataType::UInt => "unsigned integer",
            DataType::Real => "real",
            DataType::Utf8String => "UTF-8 string",
            DataType::OctetString => "octet string",
            DataType::Utf8Ptr => "UTF-8 pointer",
            DataType::OctetPtr => "octet pointer",
        };
        f.write_str(name)
    }
}

impl TryFrom<u32> for DataType {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self> {
        DataType::from_raw(raw)
    }
}

#[test]
fn test_data_type_matches_abi_discriminants() {
    use ossl_param_sys::*;

    let pairs = [
        (OSSL_PARAM_INTEGER, DataType::Int),
        (OSSL_PARAM_UNSIGNED_INTEGER, DataType::UInt),
        (OSSL_PARAM_REAL, DataType::Real),
        (OSSL_PARAM_UTF8_STRING, DataType::Utf8String),
        (OSSL_PARAM_OCTET_STRING, DataType::OctetString),
        (OSSL_PARAM_UTF8_PTR, DataType::Utf8Ptr),
        (OSSL_PARAM_OCTET_PTR, DataType::OctetPtr),
    ];
    for (raw, data_type) in pairs {
        assert_eq!(DataType::from_raw(raw).unwrap(), data_type);
        assert_eq!(data_type.as_raw(), raw);
    }
}

#[test]
fn test_unknown_data_type_is_rejected() {
    assert!(matches!(DataType::from_raw(0), Err(Error::UnknownType(0))));
    assert!(matches!(DataType::from_raw(8), Err(Error::UnknownType(8))));
}

#[test]
fn test_families() {
    assert_eq!(DataType::Utf8Ptr.family(), DataType::Utf8String.family());
    assert_eq!(DataType::OctetPtr.family(), DataType::OctetString.family());
    assert_ne!(DataType::Int.family(), DataType::UInt.family());
    assert_ne!(DataType::Utf8String.family(), DataType::OctetString.family());
    assert!(DataType::OctetPtr.is_pointer());
    assert!(!DataType::OctetString.is_pointer());
    assert!(DataType::Real.is_numeric() && DataType::UInt.is_numeric());
    assert!(!DataType::Utf8Ptr.is_numeric());
}
