// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

// Conversions between `OSSL_PARAM` arrays handed over the C ABI and the
// borrow-checked `ParamArray` the rest of the crate works with.

use crate::param::Buffer;
use crate::{DataType, Error, Param, ParamArray, ParamInfo, Result};
use ossl_param_sys::{OSSL_PARAM, OSSL_PARAM_UNMODIFIED};
use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};

/// The entry that ends a raw array.
pub const END: OSSL_PARAM = OSSL_PARAM {
    key: std::ptr::null(),
    data_type: 0,
    data: std::ptr::null_mut(),
    data_size: 0,
    return_size: 0,
};

impl ParamInfo {
    /// The descriptor-only form of this entry, as found in gettable tables.
    pub const fn to_raw(&self) -> OSSL_PARAM {
        if self.name().len() <= 1 {
            return END;
        }
        OSSL_PARAM {
            key: self.name().as_ptr() as *const c_char,
            data_type: self.data_type as u32,
            data: std::ptr::null_mut(),
            data_size: 0,
            return_size: OSSL_PARAM_UNMODIFIED,
        }
    }
}

/// Builds the raw form of a `ParamInfo` table, usable in a `static`.
pub const fn raw_table<const N: usize>(table: &[ParamInfo; N]) -> [OSSL_PARAM; N] {
    let mut raw = [END; N];
    let mut i = 0;
    while i < N {
        raw[i] = table[i].to_raw();
        i += 1;
    }
    raw
}

unsafe fn raw_key<'a>(param: &OSSL_PARAM) -> Result<&'a str> {
    CStr::from_ptr(param.key)
        .to_str()
        .map_err(|_| Error::InvalidKey)
}

/// Walks `params` up to its terminator.
unsafe fn entries<'a>(params: *const OSSL_PARAM) -> impl Iterator<Item = &'a OSSL_PARAM> {
    let mut cursor = params;
    std::iter::from_fn(move || {
        if cursor.is_null() || (*cursor).key.is_null() {
            return None;
        }
        let entry = &*cursor;
        cursor = cursor.add(1);
        Some(entry)
    })
}

/// A raw array decoded for one call.
///
/// Entries that cannot be decoded, such as one with an unknown data type,
/// are left out and their errors kept, so the provider still answers the
/// others. The array dereferences to the decoded [`ParamArray`].
pub struct RawParams<'a> {
    array: ParamArray<'a>,
    // Raw index of every decoded entry
    slots: Vec<usize>,
    rejected: Vec<Error>,
}

impl<'a> RawParams<'a> {
    unsafe fn decode<F>(params: *const OSSL_PARAM, mut decode_one: F) -> Self
    where
        F: FnMut(&'a OSSL_PARAM) -> Result<Param<'a>>,
    {
        let mut decoded = Vec::new();
        let mut slots = Vec::new();
        let mut rejected = Vec::new();
        for (slot, raw) in entries(params).enumerate() {
            match decode_one(raw) {
                Ok(param) => {
                    decoded.push(param);
                    slots.push(slot);
                }
                Err(e) => {
                    log::warn!("Skipping raw parameter {}: {}", slot, e);
                    rejected.push(e);
                }
            }
        }
        RawParams {
            array: ParamArray::new(decoded),
            slots,
            rejected,
        }
    }

    /// Errors of the entries that could not be decoded, in array order.
    pub fn rejected(&self) -> &[Error] {
        &self.rejected
    }

    /// Reports the used size of every written entry back into the raw array
    /// this one was decoded from. Skipped entries and entries nobody wrote
    /// keep their `return_size`.
    ///
    /// # Safety
    ///
    /// `params` must be the array passed to [`ParamArray::from_raw_mut`].
    pub unsafe fn write_back(&self, params: *mut OSSL_PARAM) {
        if params.is_null() {
            return;
        }
        for (param, &slot) in self.array.iter().zip(&self.slots) {
            if let Some(used) = param.used_size() {
                (*params.add(slot)).return_size = used;
            }
        }
    }

    /// Combines the outcome of handling the decoded entries with the errors
    /// of the skipped ones.
    pub fn finish(self, result: Result<()>) -> Result<()> {
        let mut errors = self.rejected;
        match result {
            Ok(()) => {}
            Err(Error::Aggregate(more)) => errors.extend(more),
            Err(e) => errors.push(e),
        }
        Error::collect(errors)
    }
}

impl<'a> std::ops::Deref for RawParams<'a> {
    type Target = ParamArray<'a>;

    fn deref(&self) -> &Self::Target {
        &self.array
    }
}

impl std::ops::DerefMut for RawParams<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.array
    }
}

impl<'a> ParamArray<'a> {
    /// Wraps a raw array the callee may write into, such as the argument of
    /// a `get_params` call.
    ///
    /// # Safety
    ///
    /// `params` must be null or point at an array ended by an entry with a
    /// null key. For as long as `'a`, every key must be a valid C string and
    /// every non-null `data` must be valid for reads and writes of
    /// `data_size` bytes, with no two entries sharing memory.
    pub unsafe fn from_raw_mut(params: *mut OSSL_PARAM) -> RawParams<'a> {
        RawParams::decode(params, |raw| {
            let key = raw_key(raw)?;
            let data_type = DataType::from_raw(raw.data_type)?;
            let buffer = if raw.data.is_null() || raw.data_size == 0 {
                Buffer::Empty
            } else {
                Buffer::Borrowed(std::slice::from_raw_parts_mut(
                    raw.data as *mut u8,
                    raw.data_size,
                ))
            };
            Ok(Param::from_parts(key, data_type, buffer, None))
        })
    }

    /// Wraps a raw array the callee may only read, such as the argument of a
    /// `set_ctx_params` call. Every entry with data counts as written, with
    /// its whole `data_size` in use.
    ///
    /// # Safety
    ///
    /// `params` must be null or point at an array ended by an entry with a
    /// null key. For as long as `'a`, every key must be a valid C string and
    /// every non-null `data` must be valid for reads of `data_size` bytes.
    pub unsafe fn from_raw(params: *const OSSL_PARAM) -> RawParams<'a> {
        RawParams::decode(params, |raw| {
            let key = raw_key(raw)?;
            let data_type = DataType::from_raw(raw.data_type)?;
            let param = if raw.data.is_null() {
                Param::query(key, data_type)
            } else {
                let source = std::slice::from_raw_parts(raw.data as *const u8, raw.data_size);
                Param::from_parts(key, data_type, Buffer::Shared(source), Some(raw.data_size))
            };
            Ok(param)
        })
    }
}

/// Runs `f` over the raw array `params` and reports what it wrote, also when
/// `f` fails part way through or some entries could not be decoded.
///
/// # Safety
///
/// Same as [`ParamArray::from_raw_mut`].
pub unsafe fn update<F>(params: *mut OSSL_PARAM, f: F) -> Result<()>
where
    F: FnOnce(&mut ParamArray<'_>) -> Result<()>,
{
    let mut array = ParamArray::from_raw_mut(params);
    let result = f(&mut array.array);
    array.write_back(params);
    array.finish(result)
}

/// Runs `f` over the values the caller passed in `params`. Entries that
/// cannot be decoded fail the call without keeping `f` from the others.
///
/// # Safety
///
/// Same as [`ParamArray::from_raw`].
pub unsafe fn apply<F>(params: *const OSSL_PARAM, f: F) -> Result<()>
where
    F: FnOnce(&mut ParamArray<'_>) -> Result<()>,
{
    let mut array = ParamArray::from_raw(params);
    let result = f(&mut array.array);
    array.finish(result)
}

/// Finds the first entry called `key` in `params`, or null.
///
/// # Safety
///
/// `params` must be null or point at an array ended by an entry with a null
/// key, holding valid C string keys.
pub unsafe fn locate(params: *mut OSSL_PARAM, key: &[u8]) -> *mut OSSL_PARAM {
    let key = match CStr::from_bytes_until_nul(key) {
        Ok(key) => key,
        Err(_) => return std::ptr::null_mut(),
    };
    let mut cursor = params;
    while !cursor.is_null() && !(*cursor).key.is_null() {
        if CStr::from_ptr((*cursor).key) == key {
            return cursor;
        }
        cursor = cursor.add(1);
    }
    std::ptr::null_mut()
}

/// True once the callee has written `param`.
pub fn modified(param: &OSSL_PARAM) -> bool {
    param.return_size != OSSL_PARAM_UNMODIFIED
}

/// A raw entry over caller memory. `key` has to be NUL-terminated.
pub fn construct(
    key: &'static [u8],
    data_type: DataType,
    data: *mut c_void,
    data_size: usize,
) -> OSSL_PARAM {
    OSSL_PARAM {
        key: key.as_ptr() as *const c_char,
        data_type: data_type.as_raw(),
        data,
        data_size,
        return_size: OSSL_PARAM_UNMODIFIED,
    }
}

pub fn construct_int(key: &'static [u8], value: &mut c_int) -> OSSL_PARAM {
    construct(
        key,
        DataType::Int,
        value as *mut c_int as *mut c_void,
        std::mem::size_of::<c_int>(),
    )
}

pub fn construct_uint(key: &'static [u8], value: &mut std::os::raw::c_uint) -> OSSL_PARAM {
    construct(
        key,
        DataType::UInt,
        value as *mut _ as *mut c_void,
        std::mem::size_of::<std::os::raw::c_uint>(),
    )
}

pub fn construct_size_t(key: &'static [u8], value: &mut usize) -> OSSL_PARAM {
    construct(
        key,
        DataType::UInt,
        value as *mut usize as *mut c_void,
        std::mem::size_of::<usize>(),
    )
}

pub fn construct_utf8_string(key: &'static [u8], buffer: &mut [u8]) -> OSSL_PARAM {
    construct(
        key,
        DataType::Utf8String,
        buffer.as_mut_ptr() as *mut c_void,
        buffer.len(),
    )
}

pub fn construct_utf8_ptr(key: &'static [u8], buffer: &mut [u8]) -> OSSL_PARAM {
    construct(
        key,
        DataType::Utf8Ptr,
        buffer.as_mut_ptr() as *mut c_void,
        buffer.len(),
    )
}

pub fn construct_octet_string(key: &'static [u8], buffer: &mut [u8]) -> OSSL_PARAM {
    construct(
        key,
        DataType::OctetString,
        buffer.as_mut_ptr() as *mut c_void,
        buffer.len(),
    )
}

pub fn construct_octet_ptr(key: &'static [u8], buffer: &mut [u8]) -> OSSL_PARAM {
    construct(
        key,
        DataType::OctetPtr,
        buffer.as_mut_ptr() as *mut c_void,
        buffer.len(),
    )
}

/// A size query: no memory, the callee reports the size in `return_size`.
pub fn construct_query(key: &'static [u8], data_type: DataType) -> OSSL_PARAM {
    construct(key, data_type, std::ptr::null_mut(), 0)
}

pub fn construct_end() -> OSSL_PARAM {
    END
}

/// Expects the `1` success code of a provider call.
pub fn ossl_returns_1(result: c_int) -> Result<()> {
    if result == 1 {
        Ok(())
    } else {
        Err(Error::CallFailed(result))
    }
}

pub fn ossl_returns_nonnull<T>(result: *mut T) -> Result<*mut T> {
    if result.is_null() {
        Err(Error::NullPointer)
    } else {
        Ok(result)
    }
}

pub fn ossl_returns_nonnull_const<T>(result: *const T) -> Result<*const T> {
    if result.is_null() {
        Err(Error::NullPointer)
    } else {
        Ok(result)
    }
}

#[test]
fn test_raw_get_reports_return_size() {
    use ossl_param_sys::param::*;

    let mut keylen: c_int = 0;
    let mut ivlen: c_int = 0;
    let mut mode = [0u8; 8];
    let mut params = [
        construct_int(OSSL_CIPHER_PARAM_KEYLEN, &mut keylen),
        construct_utf8_string(OSSL_CIPHER_PARAM_MODE, &mut mode),
        construct_query(OSSL_CIPHER_PARAM_IV, DataType::OctetPtr),
        construct_int(OSSL_CIPHER_PARAM_IVLEN, &mut ivlen),
        construct_end(),
    ];
    let result = unsafe {
        update(params.as_mut_ptr(), |array| {
            array.try_for_each_mut(|param| match param.key() {
                "keylen" => param.set(&32i32),
                "mode" => param.set("CBC"),
                "iv" => param.set(&[0u8; 16][..]),
                _ => Ok(()),
            })
        })
    };
    assert!(result.is_ok());
    assert_eq!(keylen, 32);
    assert_eq!(&mode[..4], b"CBC\0");
    assert_eq!(params[0].return_size, 4);
    assert_eq!(params[1].return_size, 3);
    assert_eq!(params[2].return_size, 16);
    assert!(!modified(&params[3]));
}

#[test]
fn test_raw_set_reads_caller_values() {
    use ossl_param_sys::param::*;

    let mut padding: std::os::raw::c_uint = 0;
    let mut iv = [4u8; 16];
    let params = [
        construct_uint(OSSL_CIPHER_PARAM_PADDING, &mut padding),
        construct_octet_string(OSSL_CIPHER_PARAM_IV, &mut iv),
        construct_end(),
    ];
    let mut array = unsafe { ParamArray::from_raw(params.as_ptr()) };
    assert_eq!(array.len(), 2);
    assert_eq!(array.get::<u32>("padding").unwrap(), 0);
    assert_eq!(array.locate("iv").unwrap().as_bytes().unwrap(), &[4u8; 16]);
    assert_eq!(
        array.set("iv", &[0u8; 16][..]),
        Err(Error::ReadOnly("iv".into()))
    );
    assert_eq!(iv, [4u8; 16]);
}

#[test]
fn test_unknown_type_does_not_hide_other_entries() {
    use ossl_param_sys::param::*;

    let mut keylen: c_int = 0;
    let mut num: c_int = 0;
    let mut ivlen: c_int = 0;
    let mut params = [
        construct_int(OSSL_CIPHER_PARAM_KEYLEN, &mut keylen),
        construct_int(OSSL_CIPHER_PARAM_NUM, &mut num),
        construct_int(OSSL_CIPHER_PARAM_IVLEN, &mut ivlen),
        construct_end(),
    ];
    params[1].data_type = 42;

    let array = unsafe { ParamArray::from_raw_mut(params.as_mut_ptr()) };
    assert_eq!(array.len(), 2);
    assert_eq!(array.rejected(), &[Error::UnknownType(42)]);
    drop(array);

    let result = unsafe {
        update(params.as_mut_ptr(), |array| {
            array.try_for_each_mut(|param| match param.key() {
                "keylen" => param.set(&32i32),
                "num" => param.set(&7i32),
                "ivlen" => param.set(&16i32),
                _ => Ok(()),
            })
        })
    };
    assert_eq!(result, Err(Error::UnknownType(42)));
    assert_eq!((keylen, num, ivlen), (32, 0, 16));
    assert_eq!(params[0].return_size, 4);
    assert!(!modified(&params[1]));
    assert_eq!(params[2].return_size, 4);
}

#[test]
fn test_apply_reads_past_unknown_type() {
    use ossl_param_sys::param::*;

    let mut padding: std::os::raw::c_uint = 1;
    let mut num: c_int = 5;
    let mut params = [
        construct_int(OSSL_CIPHER_PARAM_NUM, &mut num),
        construct_uint(OSSL_CIPHER_PARAM_PADDING, &mut padding),
        construct_end(),
    ];
    params[0].data_type = 0;

    let mut seen = None;
    let result = unsafe {
        apply(params.as_ptr(), |array| {
            seen = Some(array.get::<u32>("padding")?);
            Ok(())
        })
    };
    assert_eq!(result, Err(Error::UnknownType(0)));
    assert_eq!(seen, Some(1));
}

#[test]
fn test_locate_and_raw_table() {
    use ossl_param_sys::param::*;

    const TABLE: [ParamInfo; 3] = [
        ParamInfo::new(OSSL_CIPHER_PARAM_KEYLEN, DataType::Int),
        ParamInfo::new(OSSL_CIPHER_PARAM_IV, DataType::OctetPtr),
        ParamInfo::END,
    ];
    static RAW: [OSSL_PARAM; 3] = raw_table(&TABLE);

    assert_eq!(RAW[1].data_type, ossl_param_sys::OSSL_PARAM_OCTET_PTR);
    assert!(RAW[2].key.is_null());
    assert!(!modified(&RAW[0]) && RAW[0].data.is_null());

    let mut params = RAW;
    let found = unsafe { locate(params.as_mut_ptr(), OSSL_CIPHER_PARAM_IV) };
    assert_eq!(found, &mut params[1] as *mut OSSL_PARAM);
    let missing = unsafe { locate(params.as_mut_ptr(), OSSL_CIPHER_PARAM_NUM) };
    assert!(ossl_returns_nonnull(missing).is_err());
    assert_eq!(ossl_returns_1(0), Err(Error::CallFailed(0)));
}
