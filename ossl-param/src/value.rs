// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

// Conversions between parameter buffers and native Rust values. Numbers are
// stored in native byte order; a value is only narrowed when it fits.

use num_traits::{FromPrimitive, ToPrimitive};
use std::mem::size_of;

use crate::{DataType, Error, Family, Param, Result};

/// A native type a parameter value can be read as.
pub trait FromParam: Sized {
    /// The data type a parameter built from this type would carry.
    fn data_type() -> DataType;

    fn accepts(data_type: DataType) -> bool {
        data_type.family() == Self::data_type().family()
    }

    /// Decodes the value. The data type has already been checked.
    fn from_param(param: &Param<'_>) -> Result<Self>;
}

/// A native type a parameter value can be written from.
pub trait ToParam {
    fn data_type() -> DataType;

    fn accepts(data_type: DataType) -> bool {
        data_type.family() == Self::data_type().family()
    }

    /// Bytes the value takes up in a buffer sized for it.
    fn encoded_len(&self) -> usize;

    /// Encodes the value. The data type has already been checked.
    fn to_param(&self, param: &mut Param<'_>) -> Result<()>;
}

pub(crate) fn check_width(key: &str, data_type: DataType, size: usize) -> Result<()> {
    let valid = match data_type.family() {
        Family::Integer | Family::Unsigned => matches!(size, 1 | 2 | 4 | 8),
        Family::Real => matches!(size, 4 | 8),
        Family::Utf8 | Family::Octet => true,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidSize {
            key: key.to_string(),
            data_type,
            size,
        })
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

fn numeric_payload<'p>(param: &'p Param<'_>) -> Result<&'p [u8]> {
    let bytes = param.payload()?;
    check_width(param.key(), param.data_type(), bytes.len())?;
    Ok(bytes)
}

fn read_signed(param: &Param<'_>) -> Result<i64> {
    let bytes = numeric_payload(param)?;
    Ok(match bytes.len() {
        1 => i8::from_ne_bytes(fixed(bytes)).into(),
        2 => i16::from_ne_bytes(fixed(bytes)).into(),
        4 => i32::from_ne_bytes(fixed(bytes)).into(),
        _ => i64::from_ne_bytes(fixed(bytes)),
    })
}

fn read_unsigned(param: &Param<'_>) -> Result<u64> {
    let bytes = numeric_payload(param)?;
    Ok(match bytes.len() {
        1 => u8::from_ne_bytes(fixed(bytes)).into(),
        2 => u16::from_ne_bytes(fixed(bytes)).into(),
        4 => u32::from_ne_bytes(fixed(bytes)).into(),
        _ => u64::from_ne_bytes(fixed(bytes)),
    })
}

fn read_real(param: &Param<'_>) -> Result<f64> {
    let bytes = numeric_payload(param)?;
    Ok(match bytes.len() {
        4 => f32::from_ne_bytes(fixed(bytes)).into(),
        _ => f64::from_ne_bytes(fixed(bytes)),
    })
}

fn encode_signed(value: i64, width: usize) -> Option<Vec<u8>> {
    match width {
        1 => i8::try_from(value).ok().map(|v| v.to_ne_bytes().to_vec()),
        2 => i16::try_from(value).ok().map(|v| v.to_ne_bytes().to_vec()),
        4 => i32::try_from(value).ok().map(|v| v.to_ne_bytes().to_vec()),
        8 => Some(value.to_ne_bytes().to_vec()),
        _ => None,
    }
}

fn encode_unsigned(value: u64, width: usize) -> Option<Vec<u8>> {
    match width {
        1 => u8::try_from(value).ok().map(|v| v.to_ne_bytes().to_vec()),
        2 => u16::try_from(value).ok().map(|v| v.to_ne_bytes().to_vec()),
        4 => u32::try_from(value).ok().map(|v| v.to_ne_bytes().to_vec()),
        8 => Some(value.to_ne_bytes().to_vec()),
        _ => None,
    }
}

fn encode_real(value: f64, width: usize) -> Option<Vec<u8>> {
    match width {
        4 => {
            let narrow = value as f32;
            if f64::from(narrow) == value || value.is_nan() {
                Some(narrow.to_ne_bytes().to_vec())
            } else {
                None
            }
        }
        8 => Some(value.to_ne_bytes().to_vec()),
        _ => None,
    }
}

/// Writes a number using the width the parameter's buffer dictates. A size
/// query is answered with the width of the native type.
fn write_numeric(
    param: &mut Param<'_>,
    native_width: usize,
    encode: impl FnOnce(usize) -> Option<Vec<u8>>,
) -> Result<()> {
    if param.is_query() {
        param.return_size = Some(native_width);
        return Ok(());
    }
    let width = param.capacity();
    check_width(param.key(), param.data_type(), width)?;
    let bytes = encode(width).ok_or_else(|| Error::ValueTruncated {
        key: param.key().to_string(),
        width,
    })?;
    param.store(&bytes, false)
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl FromParam for $t {
            fn data_type() -> DataType {
                DataType::Int
            }

            fn from_param(param: &Param<'_>) -> Result<Self> {
                let value = read_signed(param)?;
                <$t>::from_i64(value).ok_or_else(|| Error::ValueTruncated {
                    key: param.key().to_string(),
                    width: size_of::<$t>(),
                })
            }
        }

        impl ToParam for $t {
            fn data_type() -> DataType {
                DataType::Int
            }

            fn encoded_len(&self) -> usize {
                size_of::<$t>()
            }

            fn to_param(&self, param: &mut Param<'_>) -> Result<()> {
                let value = self.to_i64().ok_or_else(|| Error::ValueTruncated {
                    key: param.key().to_string(),
                    width: size_of::<i64>(),
                })?;
                write_numeric(param, size_of::<$t>(), |width| encode_signed(value, width))
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl FromParam for $t {
            fn data_type() -> DataType {
                DataType::UInt
            }

            fn from_param(param: &Param<'_>) -> Result<Self> {
                let value = read_unsigned(param)?;
                <$t>::from_u64(value).ok_or_else(|| Error::ValueTruncated {
                    key: param.key().to_string(),
                    width: size_of::<$t>(),
                })
            }
        }

        impl ToParam for $t {
            fn data_type() -> DataType {
                DataType::UInt
            }

            fn encoded_len(&self) -> usize {
                size_of::<$t>()
            }

            fn to_param(&self, param: &mut Param<'_>) -> Result<()> {
                let value = self.to_u64().ok_or_else(|| Error::ValueTruncated {
                    key: param.key().to_string(),
                    width: size_of::<u64>(),
                })?;
                write_numeric(param, size_of::<$t>(), |width| encode_unsigned(value, width))
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl FromParam for f64 {
    fn data_type() -> DataType {
        DataType::Real
    }

    fn from_param(param: &Param<'_>) -> Result<Self> {
        read_real(param)
    }
}

impl ToParam for f64 {
    fn data_type() -> DataType {
        DataType::Real
    }

    fn encoded_len(&self) -> usize {
        size_of::<f64>()
    }

    fn to_param(&self, param: &mut Param<'_>) -> Result<()> {
        let value = *self;
        write_numeric(param, size_of::<f64>(), |width| encode_real(value, width))
    }
}

impl FromParam for String {
    fn data_type() -> DataType {
        DataType::Utf8String
    }

    fn from_param(param: &Param<'_>) -> Result<Self> {
        param.as_str().map(str::to_owned)
    }
}

impl ToParam for str {
    fn data_type() -> DataType {
        DataType::Utf8String
    }

    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn to_param(&self, param: &mut Param<'_>) -> Result<()> {
        param.store(self.as_bytes(), true)
    }
}

impl ToParam for String {
    fn data_type() -> DataType {
        DataType::Utf8String
    }

    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn to_param(&self, param: &mut Param<'_>) -> Result<()> {
        self.as_str().to_param(param)
    }
}

impl FromParam for Vec<u8> {
    fn data_type() -> DataType {
        DataType::OctetString
    }

    fn from_param(param: &Param<'_>) -> Result<Self> {
        param.as_bytes().map(<[u8]>::to_vec)
    }
}

impl ToParam for [u8] {
    fn data_type() -> DataType {
        DataType::OctetString
    }

    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn to_param(&self, param: &mut Param<'_>) -> Result<()> {
        param.store(self, false)
    }
}

impl ToParam for Vec<u8> {
    fn data_type() -> DataType {
        DataType::OctetString
    }

    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn to_param(&self, param: &mut Param<'_>) -> Result<()> {
        self.as_slice().to_param(param)
    }
}

#[test]
fn test_integer_widening_and_narrowing() {
    let mut param = Param::with_capacity("blocksize", DataType::Int, 8);
    param.set(&-16i32).unwrap();
    assert_eq!(param.used_size(), Some(8));
    assert_eq!(param.get::<i64>().unwrap(), -16);
    assert_eq!(param.get::<i32>().unwrap(), -16);
    assert_eq!(param.get::<i8>().unwrap(), -16);

    param.set(&(i64::from(i32::MAX) + 1)).unwrap();
    assert_eq!(
        param.get::<i32>(),
        Err(Error::ValueTruncated {
            key: "blocksize".into(),
            width: 4,
        })
    );
}

#[test]
fn test_wide_value_into_narrow_buffer() {
    let mut param = Param::with_capacity("keylen", DataType::Int, 4);
    param.set(&32i64).unwrap();
    assert_eq!(param.used_size(), Some(4));
    assert_eq!(param.get::<i64>().unwrap(), 32);

    let before = param.get::<i32>().unwrap();
    assert_eq!(
        param.set(&i64::MAX),
        Err(Error::ValueTruncated {
            key: "keylen".into(),
            width: 4,
        })
    );
    assert_eq!(param.get::<i32>().unwrap(), before);
}

#[test]
fn test_no_sign_conversion() {
    let mut param = Param::with_capacity("flags", DataType::UInt, 8);
    assert!(matches!(
        param.set(&1i64),
        Err(Error::TypeMismatch { .. })
    ));
    param.set(&u64::MAX).unwrap();
    assert!(matches!(
        param.get::<i64>(),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        param.get::<u32>(),
        Err(Error::ValueTruncated { .. })
    ));
    assert_eq!(param.get::<u64>().unwrap(), u64::MAX);
}

#[test]
fn test_no_int_float_conversion() {
    let mut param = Param::with_capacity("num", DataType::Int, 4);
    assert!(matches!(
        param.set(&1.0f64),
        Err(Error::TypeMismatch { .. })
    ));

    let mut real = Param::with_capacity("ratio", DataType::Real, 8);
    real.set(&0.25f64).unwrap();
    assert!(matches!(
        real.get::<i64>(),
        Err(Error::TypeMismatch { .. })
    ));
    assert_eq!(real.get::<f64>().unwrap(), 0.25);
}

#[test]
fn test_real_narrowing() {
    let mut param = Param::with_capacity("ratio", DataType::Real, 4);
    param.set(&1.5f64).unwrap();
    assert_eq!(param.get::<f64>().unwrap(), 1.5);
    assert!(matches!(
        param.set(&0.1f64),
        Err(Error::ValueTruncated { width: 4, .. })
    ));
}

#[test]
fn test_numeric_buffer_width_checked() {
    let mut param = Param::with_capacity("keylen", DataType::Int, 3);
    assert!(matches!(
        param.set(&1i32),
        Err(Error::InvalidSize { size: 3, .. })
    ));
}

#[test]
fn test_numeric_query_reports_native_width() {
    let mut param = Param::query("keylen", DataType::Int);
    param.set(&32i32).unwrap();
    assert_eq!(param.used_size(), Some(4));
    assert_eq!(param.get::<i32>(), Err(Error::NoData("keylen".into())));
}

#[test]
fn test_string_round_trip_and_terminator() {
    let mut buffer = [0xFFu8; 8];
    {
        let mut param = Param::output("mode", DataType::Utf8Ptr, &mut buffer);
        param.set("CBC").unwrap();
        assert_eq!(param.used_size(), Some(3));
        assert_eq!(param.get::<String>().unwrap(), "CBC");
    }
    assert_eq!(&buffer[..4], b"CBC\0");
}

#[test]
fn test_octets_round_trip() {
    let iv: Vec<u8> = (0u8..16).collect();
    let param = Param::new("iv", &iv).unwrap();
    assert_eq!(param.data_type(), DataType::OctetString);
    assert_eq!(param.get::<Vec<u8>>().unwrap(), iv);
    assert!(matches!(
        param.get::<String>(),
        Err(Error::TypeMismatch { .. })
    ));
}
