// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

use crate::value::{check_width, FromParam, ToParam};
use crate::{DataType, Error, Family, Result};

/// Storage behind a [`Param`].
#[derive(Debug)]
pub(crate) enum Buffer<'a> {
    /// No storage yet: the parameter is a size query.
    Empty,
    /// Storage embedded in the parameter.
    Owned(Box<[u8]>),
    /// Caller memory the provider may write into.
    Borrowed(&'a mut [u8]),
    /// Caller memory the provider may only read.
    Shared(&'a [u8]),
}

impl Buffer<'_> {
    pub(crate) fn capacity(&self) -> usize {
        match self {
            Buffer::Empty => 0,
            Buffer::Owned(bytes) => bytes.len(),
            Buffer::Borrowed(bytes) => bytes.len(),
            Buffer::Shared(bytes) => bytes.len(),
        }
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        match self {
            Buffer::Empty => &[],
            Buffer::Owned(bytes) => &bytes[..],
            Buffer::Borrowed(bytes) => &bytes[..],
            Buffer::Shared(bytes) => bytes,
        }
    }
}

/// One named, typed slot of a [`ParamArray`](crate::ParamArray).
///
/// A parameter keeps its key, data type and buffer for its whole life. The
/// only things that change are the bytes in the buffer and the used size,
/// which records how many of those bytes are meaningful. When there is no
/// buffer (a size query) the used size reports how many bytes the value
/// needs instead.
#[derive(Debug)]
pub struct Param<'a> {
    key: &'a str,
    data_type: DataType,
    pub(crate) buffer: Buffer<'a>,
    pub(crate) return_size: Option<usize>,
}

impl<'a> Param<'a> {
    pub(crate) fn from_parts(
        key: &'a str,
        data_type: DataType,
        buffer: Buffer<'a>,
        return_size: Option<usize>,
    ) -> Self {
        Param {
            key,
            data_type,
            buffer,
            return_size,
        }
    }

    /// The entry that terminates an array.
    pub fn end() -> Self {
        Param::from_parts("", DataType::Int, Buffer::Empty, None)
    }

    /// A parameter without storage. Whoever handles it reports the size the
    /// value needs through [`Param::used_size`].
    pub fn query(key: &'a str, data_type: DataType) -> Self {
        Param::from_parts(key, data_type, Buffer::Empty, None)
    }

    /// A parameter owning `capacity` zeroed bytes, ready to be written.
    pub fn with_capacity(key: &'a str, data_type: DataType, capacity: usize) -> Self {
        let buffer = if capacity == 0 {
            Buffer::Empty
        } else {
            Buffer::Owned(vec![0; capacity].into_boxed_slice())
        };
        Param::from_parts(key, data_type, buffer, None)
    }

    /// A parameter writing into caller memory. The caller keeps ownership of
    /// `buffer` and reads the result back from it once the borrow ends.
    pub fn output(key: &'a str, data_type: DataType, buffer: &'a mut [u8]) -> Self {
        let buffer = if buffer.is_empty() {
            Buffer::Empty
        } else {
            Buffer::Borrowed(buffer)
        };
        Param::from_parts(key, data_type, buffer, None)
    }

    /// Binds a copy of `source` to a new parameter.
    ///
    /// With a fixed `capacity` the parameter owns that many bytes and
    /// `source` has to fit in them; without one the capacity is the size of
    /// `source`. The used size is the size of `source`.
    pub fn bind(
        key: &'a str,
        data_type: DataType,
        source: &[u8],
        capacity: Option<usize>,
    ) -> Result<Self> {
        let capacity = capacity.unwrap_or(source.len());
        if source.len() > capacity {
            return Err(Error::CapacityExceeded {
                key: key.to_string(),
                size: source.len(),
                capacity,
            });
        }
        validate_source(key, data_type, source)?;

        let mut bytes = vec![0; capacity].into_boxed_slice();
        bytes[..source.len()].copy_from_slice(source);
        Ok(Param::from_parts(
            key,
            data_type,
            Buffer::Owned(bytes),
            Some(source.len()),
        ))
    }

    /// A read-only parameter referencing caller memory, used to hand values
    /// to a provider without copying them.
    pub fn borrowed(key: &'a str, data_type: DataType, source: &'a [u8]) -> Result<Self> {
        validate_source(key, data_type, source)?;
        Ok(Param::from_parts(
            key,
            data_type,
            Buffer::Shared(source),
            Some(source.len()),
        ))
    }

    /// A parameter holding `value` in a buffer sized for it, typed after the
    /// native type of `value`.
    pub fn new<T: ToParam + ?Sized>(key: &'a str, value: &T) -> Result<Self> {
        let buffer = Buffer::Owned(vec![0; value.encoded_len()].into_boxed_slice());
        let mut param = Param::from_parts(key, T::data_type(), buffer, None);
        param.set(value)?;
        Ok(param)
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Bytes written by the last side that wrote the parameter, or the size
    /// a size query asked for. `None` until someone writes it.
    pub fn used_size(&self) -> Option<usize> {
        self.return_size
    }

    pub fn modified(&self) -> bool {
        self.return_size.is_some()
    }

    pub fn is_end(&self) -> bool {
        self.key.is_empty()
    }

    /// True while the parameter has no storage to receive a value.
    pub fn is_query(&self) -> bool {
        matches!(self.buffer, Buffer::Empty)
    }

    /// The meaningful bytes of the value, whatever its type.
    pub fn payload(&self) -> Result<&[u8]> {
        match self.return_size {
            // A size larger than the buffer is a refused write
            Some(size) if !self.is_query() && size <= self.capacity() => {
                Ok(&self.buffer.bytes()[..size])
            }
            _ => Err(Error::NoData(self.key.to_string())),
        }
    }

    /// Reads the value as `T`. `T` has to belong to the family of the
    /// parameter's data type.
    pub fn get<T: FromParam>(&self) -> Result<T> {
        if !T::accepts(self.data_type) {
            return Err(self.mismatch(T::data_type()));
        }
        T::from_param(self)
    }

    /// Reads the value as `T` only if the parameter was declared `expected`.
    pub fn get_as<T: FromParam>(&self, expected: DataType) -> Result<T> {
        if self.data_type != expected || !T::accepts(expected) {
            return Err(self.mismatch(expected));
        }
        T::from_param(self)
    }

    /// Writes `value` into the parameter, or records its size if the
    /// parameter is a size query.
    pub fn set<T: ToParam + ?Sized>(&mut self, value: &T) -> Result<()> {
        if !T::accepts(self.data_type) {
            return Err(self.mismatch(T::data_type()));
        }
        value.to_param(self)
    }

    /// Text view of a UTF-8 parameter, up to the first NUL if there is one.
    pub fn as_str(&self) -> Result<&str> {
        if self.data_type.family() != Family::Utf8 {
            return Err(self.mismatch(DataType::Utf8String));
        }
        let bytes = self.payload()?;
        let text = match bytes.iter().position(|&b| b == 0) {
            Some(nul) => &bytes[..nul],
            None => bytes,
        };
        std::str::from_utf8(text).map_err(|_| Error::InvalidUtf8(self.key.to_string()))
    }

    /// Byte view of an octet parameter.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        if self.data_type.family() != Family::Octet {
            return Err(self.mismatch(DataType::OctetString));
        }
        self.payload()
    }

    /// Copies a text or octet value into `dest`, returning the bytes copied.
    /// Nothing is copied when `dest` is too small; the error carries the
    /// size to allocate before retrying.
    pub fn get_into(&self, dest: &mut [u8]) -> Result<usize> {
        let value = match self.data_type.family() {
            Family::Utf8 => self.as_str()?.as_bytes(),
            Family::Octet => self.as_bytes()?,
            _ => return Err(self.mismatch(DataType::OctetString)),
        };
        if dest.len() < value.len() {
            return Err(Error::BufferTooSmall {
                key: self.key.to_string(),
                required: value.len(),
                capacity: dest.len(),
            });
        }
        dest[..value.len()].copy_from_slice(value);
        Ok(value.len())
    }

    /// Writes `bytes` as the whole value. Query parameters only record the
    /// size. A buffer that cannot hold `bytes` is left untouched, but the
    /// used size still reports how many bytes the value needs.
    pub(crate) fn store(&mut self, bytes: &[u8], terminate: bool) -> Result<()> {
        if terminate && bytes.contains(&0) {
            return Err(Error::InvalidValue {
                key: self.key.to_string(),
                value: format!("{:?}", String::from_utf8_lossy(bytes)),
            });
        }
        let capacity = self.buffer.capacity();
        let dest: &mut [u8] = match &mut self.buffer {
            Buffer::Empty => {
                self.return_size = Some(bytes.len());
                return Ok(());
            }
            Buffer::Shared(_) => return Err(Error::ReadOnly(self.key.to_string())),
            Buffer::Owned(dest) => &mut dest[..],
            Buffer::Borrowed(dest) => &mut dest[..],
        };
        if capacity < bytes.len() {
            self.return_size = Some(bytes.len());
            return Err(Error::BufferTooSmall {
                key: self.key.to_string(),
                required: bytes.len(),
                capacity,
            });
        }
        dest[..bytes.len()].copy_from_slice(bytes);
        if terminate && capacity > bytes.len() {
            dest[bytes.len()] = 0;
        }
        self.return_size = Some(bytes.len());
        Ok(())
    }

    pub(crate) fn mismatch(&self, expected: DataType) -> Error {
        Error::TypeMismatch {
            key: self.key.to_string(),
            expected,
            actual: self.data_type,
        }
    }
}

fn validate_source(key: &str, data_type: DataType, source: &[u8]) -> Result<()> {
    match data_type.family() {
        Family::Integer | Family::Unsigned | Family::Real => {
            check_width(key, data_type, source.len())
        }
        Family::Utf8 => {
            let text = std::str::from_utf8(source)
                .map_err(|_| Error::InvalidUtf8(key.to_string()))?;
            // Only NUL padding may follow the first NUL
            match text.find('\0') {
                Some(nul) if text[nul..].bytes().any(|b| b != 0) => Err(Error::InvalidValue {
                    key: key.to_string(),
                    value: format!("{:?}", text),
                }),
                _ => Ok(()),
            }
        }
        Family::Octet => Ok(()),
    }
}

#[test]
fn test_keylen_round_trip() {
    let mut param = Param::with_capacity("keylen", DataType::Int, 4);
    assert!(!param.modified());

    param.set(&32i32).unwrap();
    assert_eq!(param.get::<i32>().unwrap(), 32);
    assert_eq!(param.used_size(), Some(4));
    assert_eq!(param.capacity(), 4);
}

#[test]
fn test_get_with_other_tag_is_a_mismatch() {
    let param = Param::new("mode", "CBC").unwrap();
    assert_eq!(param.data_type(), DataType::Utf8String);

    let err = param.get::<i32>().unwrap_err();
    assert_eq!(
        err,
        Error::TypeMismatch {
            key: "mode".into(),
            expected: DataType::Int,
            actual: DataType::Utf8String,
        }
    );
    assert!(matches!(
        param.get::<u64>(),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        param.get_as::<String>(DataType::Utf8Ptr),
        Err(Error::TypeMismatch { .. })
    ));
    assert_eq!(
        param.get_as::<String>(DataType::Utf8String).unwrap(),
        "CBC"
    );
}

#[test]
fn test_bind_respects_fixed_capacity() {
    let err = Param::bind("iv", DataType::OctetString, &[0u8; 17], Some(16)).unwrap_err();
    assert_eq!(
        err,
        Error::CapacityExceeded {
            key: "iv".into(),
            size: 17,
            capacity: 16,
        }
    );

    let param = Param::bind("iv", DataType::OctetString, &[7u8; 8], Some(16)).unwrap();
    assert_eq!(param.capacity(), 16);
    assert_eq!(param.used_size(), Some(8));
    assert_eq!(param.as_bytes().unwrap(), &[7u8; 8]);
}

#[test]
fn test_bind_rejects_bad_numeric_width() {
    assert!(matches!(
        Param::bind("keylen", DataType::Int, &[0u8; 3], None),
        Err(Error::InvalidSize { size: 3, .. })
    ));
}

#[test]
fn test_store_into_small_buffer_leaves_it_untouched() {
    let mut buffer = [0xAAu8; 4];
    {
        let mut param = Param::output("iv", DataType::OctetPtr, &mut buffer);
        let err = param.set(&[1u8; 16][..]).unwrap_err();
        assert_eq!(err.required_size(), Some(16));
        // The size to allocate is reported without any byte being copied
        assert_eq!(param.used_size(), Some(16));
        assert_eq!(param.as_bytes(), Err(Error::NoData("iv".into())));
    }
    assert_eq!(buffer, [0xAAu8; 4]);
}

#[test]
fn test_shared_parameter_is_read_only() {
    let iv = [1u8; 16];
    let mut param = Param::borrowed("iv", DataType::OctetPtr, &iv).unwrap();
    assert_eq!(param.as_bytes().unwrap(), &iv);
    assert_eq!(param.set(&[2u8; 16][..]), Err(Error::ReadOnly("iv".into())));
}

#[test]
fn test_utf8_text_stops_at_nul() {
    let param = Param::bind("micalg", DataType::Utf8String, b"sha256\0\0", None).unwrap();
    assert_eq!(param.as_str().unwrap(), "sha256");
    assert!(matches!(
        Param::bind("micalg", DataType::Utf8String, b"sha256\0junk", None),
        Err(Error::InvalidValue { .. })
    ));

    let mut dest = [0u8; 3];
    assert_eq!(
        param.get_into(&mut dest),
        Err(Error::BufferTooSmall {
            key: "micalg".into(),
            required: 6,
            capacity: 3,
        })
    );
    let mut dest = [0u8; 6];
    assert_eq!(param.get_into(&mut dest).unwrap(), 6);
    assert_eq!(&dest, b"sha256");
}

#[test]
fn test_reading_unwritten_parameter() {
    let param = Param::with_capacity("ivlen", DataType::Int, 4);
    assert_eq!(param.get::<i32>(), Err(Error::NoData("ivlen".into())));

    let query = Param::query("iv", DataType::OctetPtr);
    assert_eq!(query.as_bytes(), Err(Error::NoData("iv".into())));
}

#[test]
fn test_text_with_embedded_nul_is_refused() {
    let err = Param::new("micalg", "sha\0256").unwrap_err();
    assert!(matches!(err, Error::InvalidValue { ref key, .. } if key == "micalg"));

    let mut param = Param::with_capacity("micalg", DataType::Utf8String, 16);
    assert!(param.set("a\0b").is_err());
    assert!(!param.modified());
    param.set("ab").unwrap();
    assert_eq!(param.get::<String>().unwrap(), "ab");
}
