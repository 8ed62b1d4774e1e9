// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

use crate::provider::borrow_arc;
use crate::{ProviderContext, OSSL_PARAM_PROVIDER_DFLT_PROPERTIES};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use ossl_param::names::{
    CIPHER_PARAM_BLOCK_SIZE, CIPHER_PARAM_FLAGS, CIPHER_PARAM_IV, CIPHER_PARAM_IVLEN,
    CIPHER_PARAM_KEYLEN, CIPHER_PARAM_MODE, CIPHER_PARAM_NUM, CIPHER_PARAM_PADDING,
};
use ossl_param::ossl_param_sys::param::{
    OSSL_CIPHER_PARAM_BLOCK_SIZE, OSSL_CIPHER_PARAM_FLAGS, OSSL_CIPHER_PARAM_IV,
    OSSL_CIPHER_PARAM_IVLEN, OSSL_CIPHER_PARAM_KEYLEN, OSSL_CIPHER_PARAM_MODE,
    OSSL_CIPHER_PARAM_NUM, OSSL_CIPHER_PARAM_PADDING,
};
use ossl_param::ossl_param_sys::{
    OSSL_FUNC_CIPHER_DUPCTX, OSSL_FUNC_CIPHER_FREECTX, OSSL_FUNC_CIPHER_GETTABLE_CTX_PARAMS,
    OSSL_FUNC_CIPHER_GETTABLE_PARAMS, OSSL_FUNC_CIPHER_GET_CTX_PARAMS,
    OSSL_FUNC_CIPHER_GET_PARAMS, OSSL_FUNC_CIPHER_NEWCTX, OSSL_FUNC_CIPHER_SETTABLE_CTX_PARAMS,
    OSSL_FUNC_CIPHER_SET_CTX_PARAMS,
};
use ossl_param::raw::raw_table;
use ossl_param::types::VOID_PTR;
use ossl_param::{
    exchange, ossl_algorithm, ossl_dispatch, raw, DataType, Error, Operation, Param, ParamArray,
    ParamInfo, ParamProvider, Result, OSSL_ALGORITHM, OSSL_DISPATCH, OSSL_ERROR, OSSL_PARAM,
    OSSL_SUCCESS,
};
use std::sync::{Arc, Mutex, MutexGuard};

const AES_256_CBC_NAMES: &[u8] = b"AES-256-CBC:AES256\0";
const AES_256_CBC_DESCRIPTION: &[u8] = b"Reference AES-256-CBC\0";

pub const AES_256_CBC_KEY_LEN: usize = 32;
pub const AES_256_CBC_IV_LEN: usize = 16;
pub const AES_256_CBC_BLOCK_SIZE: usize = 16;
// No custom IV, no AEAD, no CTS
pub const AES_256_CBC_FLAGS: u32 = 0;

/// Block padding applied on the last block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum Padding {
    None = 0,
    Pkcs7 = 1,
}

// Parameters fixed by the algorithm
const CIPHER_PARAM_TYPES: [ParamInfo; 6] = [
    ParamInfo::new(OSSL_CIPHER_PARAM_MODE, DataType::Utf8String),
    ParamInfo::new(OSSL_CIPHER_PARAM_KEYLEN, DataType::Int),
    ParamInfo::new(OSSL_CIPHER_PARAM_IVLEN, DataType::Int),
    ParamInfo::new(OSSL_CIPHER_PARAM_BLOCK_SIZE, DataType::Int),
    ParamInfo::new(OSSL_CIPHER_PARAM_FLAGS, DataType::UInt),
    ParamInfo::END,
];

// Parameters that can be read from a cipher context
const CIPHER_CTX_GETTABLE_TYPES: [ParamInfo; 9] = [
    ParamInfo::new(OSSL_CIPHER_PARAM_KEYLEN, DataType::Int),
    ParamInfo::new(OSSL_CIPHER_PARAM_IVLEN, DataType::Int),
    ParamInfo::new(OSSL_CIPHER_PARAM_BLOCK_SIZE, DataType::Int),
    ParamInfo::new(OSSL_CIPHER_PARAM_MODE, DataType::Utf8String),
    ParamInfo::new(OSSL_CIPHER_PARAM_PADDING, DataType::UInt),
    ParamInfo::new(OSSL_CIPHER_PARAM_FLAGS, DataType::UInt),
    ParamInfo::new(OSSL_CIPHER_PARAM_IV, DataType::OctetPtr),
    ParamInfo::new(OSSL_CIPHER_PARAM_NUM, DataType::Int),
    ParamInfo::END,
];

// Parameters a cipher context can be configured with
const CIPHER_CTX_SETTABLE_TYPES: [ParamInfo; 5] = [
    ParamInfo::new(OSSL_CIPHER_PARAM_PADDING, DataType::UInt),
    ParamInfo::new(OSSL_CIPHER_PARAM_IV, DataType::OctetString),
    ParamInfo::new(OSSL_CIPHER_PARAM_NUM, DataType::Int),
    ParamInfo::new(OSSL_CIPHER_PARAM_KEYLEN, DataType::Int),
    ParamInfo::END,
];

static CIPHER_PARAM_TYPES_RAW: [OSSL_PARAM; 6] = raw_table(&CIPHER_PARAM_TYPES);
static CIPHER_CTX_GETTABLE_TYPES_RAW: [OSSL_PARAM; 9] = raw_table(&CIPHER_CTX_GETTABLE_TYPES);
static CIPHER_CTX_SETTABLE_TYPES_RAW: [OSSL_PARAM; 5] = raw_table(&CIPHER_CTX_SETTABLE_TYPES);

fn set_algorithm_param(param: &mut Param<'_>) -> Result<()> {
    match param.key() {
        CIPHER_PARAM_MODE => param.set("CBC"),
        CIPHER_PARAM_KEYLEN => param.set(&(AES_256_CBC_KEY_LEN as i32)),
        CIPHER_PARAM_IVLEN => param.set(&(AES_256_CBC_IV_LEN as i32)),
        CIPHER_PARAM_BLOCK_SIZE => param.set(&(AES_256_CBC_BLOCK_SIZE as i32)),
        CIPHER_PARAM_FLAGS => param.set(&AES_256_CBC_FLAGS),
        _ => Ok(()),
    }
}

/// The parameters of AES-256-CBC that do not depend on a context.
pub struct Aes256Cbc;

impl ParamProvider for Aes256Cbc {
    fn gettable_params(&self) -> &'static [ParamInfo] {
        &CIPHER_PARAM_TYPES
    }

    fn get_params(&self, params: &mut ParamArray<'_>) -> Result<()> {
        params.try_for_each_mut(set_algorithm_param)
    }
}

/// Per-context cipher configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherState {
    pub padding: Padding,
    pub iv: [u8; AES_256_CBC_IV_LEN],
    pub num: i32,
}

impl Default for CipherState {
    fn default() -> Self {
        CipherState {
            padding: Padding::Pkcs7,
            iv: [0; AES_256_CBC_IV_LEN],
            num: 0,
        }
    }
}

fn invalid_value(param: &Param<'_>, value: impl ToString) -> Error {
    Error::InvalidValue {
        key: param.key().to_string(),
        value: value.to_string(),
    }
}

impl ParamProvider for CipherState {
    fn gettable_params(&self) -> &'static [ParamInfo] {
        &CIPHER_CTX_GETTABLE_TYPES
    }

    fn get_params(&self, params: &mut ParamArray<'_>) -> Result<()> {
        params.try_for_each_mut(|param| match param.key() {
            CIPHER_PARAM_PADDING => param.set(&(self.padding as u32)),
            CIPHER_PARAM_IV => param.set(&self.iv[..]),
            CIPHER_PARAM_NUM => param.set(&self.num),
            _ => set_algorithm_param(param),
        })
    }

    fn settable_params(&self) -> &'static [ParamInfo] {
        &CIPHER_CTX_SETTABLE_TYPES
    }

    fn set_params(&mut self, params: &ParamArray<'_>) -> Result<()> {
        params.try_for_each(|param| match param.key() {
            CIPHER_PARAM_PADDING => {
                let padding: u32 = param.get()?;
                self.padding =
                    Padding::from_u32(padding).ok_or_else(|| invalid_value(param, padding))?;
                Ok(())
            }
            CIPHER_PARAM_IV => {
                let iv = param.as_bytes()?;
                if iv.len() != AES_256_CBC_IV_LEN {
                    return Err(invalid_value(param, format!("{} bytes", iv.len())));
                }
                self.iv.copy_from_slice(iv);
                Ok(())
            }
            CIPHER_PARAM_NUM => {
                self.num = param.get()?;
                Ok(())
            }
            CIPHER_PARAM_KEYLEN => {
                // The key length of AES-256 is not configurable
                let keylen: i32 = param.get()?;
                if usize::try_from(keylen).ok() != Some(AES_256_CBC_KEY_LEN) {
                    return Err(invalid_value(param, keylen));
                }
                Ok(())
            }
            _ => Ok(()),
        })
    }
}

pub struct CipherContext {
    provctx: Arc<ProviderContext>,
    state: Mutex<CipherState>,
}

impl CipherContext {
    pub fn new(provctx: Arc<ProviderContext>) -> Self {
        CipherContext {
            provctx,
            state: Mutex::new(CipherState::default()),
        }
    }

    pub fn get_provctx(&self) -> &Arc<ProviderContext> {
        &self.provctx
    }

    pub fn lock_state(&self) -> std::result::Result<MutexGuard<'_, CipherState>, &'static str> {
        self.state
            .lock()
            .map_err(|_| "Cipher context state is poisoned")
    }
}

// Creates a cipher context bound to the provider context provctx
pub unsafe extern "C" fn ossl_param_cipher_newctx(provctx: VOID_PTR) -> VOID_PTR {
    match borrow_arc::<ProviderContext>(provctx) {
        None => std::ptr::null_mut(),
        Some(context) => Arc::into_raw(Arc::new(CipherContext::new(context))) as VOID_PTR,
    }
}

// Frees a cipher context created by newctx or dupctx
pub unsafe extern "C" fn ossl_param_cipher_freectx(ctx: VOID_PTR) {
    if ctx.is_null() {
        return;
    }
    let arc_ctx = Arc::from_raw(ctx as *const CipherContext);
    // Nothing else should hold the context once the core frees it
    debug_assert_eq!(1, Arc::strong_count(&arc_ctx));
}

// Creates an independent copy of a cipher context
pub unsafe extern "C" fn ossl_param_cipher_dupctx(ctx: VOID_PTR) -> VOID_PTR {
    let result = crate::r#catch(Some("ossl_param_cipher_dupctx"), || {
        let arc_ctx: Arc<CipherContext> =
            borrow_arc(ctx).ok_or("Cipher context should not be NULL")?;
        let state = arc_ctx.lock_state()?.clone();
        let duplicate = CipherContext {
            provctx: arc_ctx.provctx.clone(),
            state: Mutex::new(state),
        };
        Ok(Arc::into_raw(Arc::new(duplicate)) as VOID_PTR)
    });
    result.unwrap_or(std::ptr::null_mut())
}

// Answers the algorithm parameters of AES-256-CBC
pub unsafe extern "C" fn ossl_param_cipher_get_params(
    params: *mut OSSL_PARAM,
) -> std::os::raw::c_int {
    let result = crate::r#catch(Some("ossl_param_cipher_get_params"), || {
        raw::update(params, |params| Aes256Cbc.get_params(params))?;
        Ok(OSSL_SUCCESS)
    });
    match result {
        Ok(result) => result,
        Err(()) => OSSL_ERROR,
    }
}

// Answers the parameters of a cipher context
pub unsafe extern "C" fn ossl_param_cipher_get_ctx_params(
    ctx: VOID_PTR,
    params: *mut OSSL_PARAM,
) -> std::os::raw::c_int {
    let result = crate::r#catch(Some("ossl_param_cipher_get_ctx_params"), || {
        let arc_ctx: Arc<CipherContext> =
            borrow_arc(ctx).ok_or("Cipher context should not be NULL")?;
        let mut state = arc_ctx.lock_state()?;
        raw::update(params, |params| {
            exchange(&mut *state, Operation::Get, params)
        })?;
        Ok(OSSL_SUCCESS)
    });
    match result {
        Ok(result) => result,
        Err(()) => OSSL_ERROR,
    }
}

// Configures a cipher context. Keys the context does not know are ignored.
pub unsafe extern "C" fn ossl_param_cipher_set_ctx_params(
    ctx: VOID_PTR,
    params: *const OSSL_PARAM,
) -> std::os::raw::c_int {
    let result = crate::r#catch(Some("ossl_param_cipher_set_ctx_params"), || {
        let arc_ctx: Arc<CipherContext> =
            borrow_arc(ctx).ok_or("Cipher context should not be NULL")?;
        let mut state = arc_ctx.lock_state()?;
        raw::apply(params, |params| exchange(&mut *state, Operation::Set, params))?;
        Ok(OSSL_SUCCESS)
    });
    match result {
        Ok(result) => result,
        Err(()) => OSSL_ERROR,
    }
}

pub unsafe extern "C" fn ossl_param_cipher_gettable_params(_provctx: VOID_PTR) -> *const OSSL_PARAM {
    CIPHER_PARAM_TYPES_RAW.as_ptr()
}

pub unsafe extern "C" fn ossl_param_cipher_gettable_ctx_params(
    _cctx: VOID_PTR,
    _provctx: VOID_PTR,
) -> *const OSSL_PARAM {
    CIPHER_CTX_GETTABLE_TYPES_RAW.as_ptr()
}

pub unsafe extern "C" fn ossl_param_cipher_settable_ctx_params(
    _cctx: VOID_PTR,
    _provctx: VOID_PTR,
) -> *const OSSL_PARAM {
    CIPHER_CTX_SETTABLE_TYPES_RAW.as_ptr()
}

pub type CipherNewCtxPtr = unsafe extern "C" fn(VOID_PTR) -> VOID_PTR;
pub type CipherFreeCtxPtr = unsafe extern "C" fn(VOID_PTR);
pub type CipherDupCtxPtr = unsafe extern "C" fn(VOID_PTR) -> VOID_PTR;
pub type CipherGetParamsPtr = unsafe extern "C" fn(*mut OSSL_PARAM) -> std::os::raw::c_int;
pub type CipherGetCtxParamsPtr =
    unsafe extern "C" fn(VOID_PTR, *mut OSSL_PARAM) -> std::os::raw::c_int;
pub type CipherSetCtxParamsPtr =
    unsafe extern "C" fn(VOID_PTR, *const OSSL_PARAM) -> std::os::raw::c_int;
pub type CipherGettableParamsPtr = unsafe extern "C" fn(VOID_PTR) -> *const OSSL_PARAM;
pub type CipherGettableCtxParamsPtr = unsafe extern "C" fn(VOID_PTR, VOID_PTR) -> *const OSSL_PARAM;

const OSSL_FUNC_CIPHER_NEWCTX_PTR: CipherNewCtxPtr = ossl_param_cipher_newctx;
const OSSL_FUNC_CIPHER_FREECTX_PTR: CipherFreeCtxPtr = ossl_param_cipher_freectx;
const OSSL_FUNC_CIPHER_DUPCTX_PTR: CipherDupCtxPtr = ossl_param_cipher_dupctx;
const OSSL_FUNC_CIPHER_GET_PARAMS_PTR: CipherGetParamsPtr = ossl_param_cipher_get_params;
const OSSL_FUNC_CIPHER_GET_CTX_PARAMS_PTR: CipherGetCtxParamsPtr =
    ossl_param_cipher_get_ctx_params;
const OSSL_FUNC_CIPHER_SET_CTX_PARAMS_PTR: CipherSetCtxParamsPtr =
    ossl_param_cipher_set_ctx_params;
const OSSL_FUNC_CIPHER_GETTABLE_PARAMS_PTR: CipherGettableParamsPtr =
    ossl_param_cipher_gettable_params;
const OSSL_FUNC_CIPHER_GETTABLE_CTX_PARAMS_PTR: CipherGettableCtxParamsPtr =
    ossl_param_cipher_gettable_ctx_params;
const OSSL_FUNC_CIPHER_SETTABLE_CTX_PARAMS_PTR: CipherGettableCtxParamsPtr =
    ossl_param_cipher_settable_ctx_params;

static AES_256_CBC_FUNCTIONS: [OSSL_DISPATCH; 10] = [
    unsafe { ossl_dispatch!(OSSL_FUNC_CIPHER_NEWCTX, OSSL_FUNC_CIPHER_NEWCTX_PTR) },
    unsafe { ossl_dispatch!(OSSL_FUNC_CIPHER_FREECTX, OSSL_FUNC_CIPHER_FREECTX_PTR) },
    unsafe { ossl_dispatch!(OSSL_FUNC_CIPHER_DUPCTX, OSSL_FUNC_CIPHER_DUPCTX_PTR) },
    unsafe { ossl_dispatch!(OSSL_FUNC_CIPHER_GET_PARAMS, OSSL_FUNC_CIPHER_GET_PARAMS_PTR) },
    unsafe {
        ossl_dispatch!(
            OSSL_FUNC_CIPHER_GET_CTX_PARAMS,
            OSSL_FUNC_CIPHER_GET_CTX_PARAMS_PTR
        )
    },
    unsafe {
        ossl_dispatch!(
            OSSL_FUNC_CIPHER_SET_CTX_PARAMS,
            OSSL_FUNC_CIPHER_SET_CTX_PARAMS_PTR
        )
    },
    unsafe {
        ossl_dispatch!(
            OSSL_FUNC_CIPHER_GETTABLE_PARAMS,
            OSSL_FUNC_CIPHER_GETTABLE_PARAMS_PTR
        )
    },
    unsafe {
        ossl_dispatch!(
            OSSL_FUNC_CIPHER_GETTABLE_CTX_PARAMS,
            OSSL_FUNC_CIPHER_GETTABLE_CTX_PARAMS_PTR
        )
    },
    unsafe {
        ossl_dispatch!(
            OSSL_FUNC_CIPHER_SETTABLE_CTX_PARAMS,
            OSSL_FUNC_CIPHER_SETTABLE_CTX_PARAMS_PTR
        )
    },
    ossl_dispatch!(),
];

pub static OSSL_PARAM_PROVIDER_CIPHERS: [OSSL_ALGORITHM; 2] = [
    ossl_algorithm!(
        AES_256_CBC_NAMES,
        OSSL_PARAM_PROVIDER_DFLT_PROPERTIES,
        AES_256_CBC_FUNCTIONS.as_ptr(),
        AES_256_CBC_DESCRIPTION
    ),
    ossl_algorithm!(),
];

#[cfg(test)]
fn test_provctx() -> VOID_PTR {
    let provctx = Arc::new(ProviderContext::new(crate::ProviderConfig::default()));
    Arc::into_raw(provctx) as VOID_PTR
}

#[cfg(test)]
unsafe fn free_test_provctx(provctx: VOID_PTR) {
    crate::ossl_param_provider_teardown(provctx as *const _);
}

#[test]
fn test_algorithm_params() {
    let values = ossl_param::fetch_all(&Aes256Cbc).unwrap();
    let keys: Vec<_> = values.iter().map(|(key, _)| *key).collect();
    assert_eq!(keys, ["mode", "keylen", "ivlen", "blocksize", "flags"]);
    assert_eq!(values[0].1, b"CBC");
    assert_eq!(values[1].1, 32i32.to_ne_bytes());

    // keylen into a 4 byte Int reads back as 32 with a used size of 4
    let mut params: ParamArray =
        vec![Param::with_capacity(CIPHER_PARAM_KEYLEN, DataType::Int, 4)].into();
    Aes256Cbc.get_params(&mut params).unwrap();
    assert_eq!(params.get::<i32>(CIPHER_PARAM_KEYLEN).unwrap(), 32);
    assert_eq!(params[0].used_size(), Some(4));
}

#[test]
fn test_mode_requested_as_int_is_a_mismatch() {
    let mut params: ParamArray =
        vec![Param::with_capacity(CIPHER_PARAM_MODE, DataType::Int, 4)].into();
    let result = Aes256Cbc.get_params(&mut params);
    assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    assert!(!params[0].modified());
}

#[test]
fn test_cipher_state_set_and_get() {
    let mut state = CipherState::default();
    let iv: Vec<u8> = (16u8..32).collect();
    let set: ParamArray = vec![
        Param::new(CIPHER_PARAM_PADDING, &0u32).unwrap(),
        Param::borrowed(CIPHER_PARAM_IV, DataType::OctetString, &iv).unwrap(),
        Param::new(CIPHER_PARAM_NUM, &3i32).unwrap(),
        Param::new(CIPHER_PARAM_KEYLEN, &32i32).unwrap(),
        Param::new("unknown", &1i32).unwrap(),
    ]
    .into();
    state.set_params(&set).unwrap();
    assert_eq!(state.padding, Padding::None);
    assert_eq!(state.iv.to_vec(), iv);
    assert_eq!(state.num, 3);

    assert_eq!(ossl_param::fetch_octets(&state, CIPHER_PARAM_IV).unwrap(), iv);
    let mut get: ParamArray = vec![
        Param::with_capacity(CIPHER_PARAM_PADDING, DataType::UInt, 8),
        Param::with_capacity(CIPHER_PARAM_IVLEN, DataType::Int, 4),
    ]
    .into();
    state.get_params(&mut get).unwrap();
    assert_eq!(get.get::<u64>(CIPHER_PARAM_PADDING).unwrap(), 0);
    assert_eq!(get.get::<i32>(CIPHER_PARAM_IVLEN).unwrap(), 16);
}

#[test]
fn test_cipher_state_rejects_bad_values() {
    let mut state = CipherState::default();
    let short_iv = [1u8; 8];
    let set: ParamArray = vec![
        Param::borrowed(CIPHER_PARAM_IV, DataType::OctetString, &short_iv).unwrap(),
        Param::new(CIPHER_PARAM_KEYLEN, &16i32).unwrap(),
        Param::new(CIPHER_PARAM_PADDING, &7u32).unwrap(),
        Param::new(CIPHER_PARAM_NUM, &5i32).unwrap(),
    ]
    .into();
    match state.set_params(&set) {
        Err(Error::Aggregate(errors)) => {
            let keys: Vec<_> = errors.iter().filter_map(Error::key).collect();
            assert_eq!(keys, ["iv", "keylen", "padding"]);
        }
        other => panic!("unexpected result {:?}", other),
    }
    // The valid entry is still applied
    assert_eq!(state.num, 5);
    assert_eq!(state.iv, [0; AES_256_CBC_IV_LEN]);
    assert_eq!(state.padding, Padding::Pkcs7);
}

#[test]
fn test_cipher_context_over_raw_abi() {
    use ossl_param::raw::{construct_end, construct_int, construct_octet_ptr, construct_octet_string};

    unsafe {
        let provctx = test_provctx();
        let ctx = ossl_param_cipher_newctx(provctx);
        assert!(!ctx.is_null());

        let mut iv = [0xa5u8; 16];
        let set = [construct_octet_string(OSSL_CIPHER_PARAM_IV, &mut iv), construct_end()];
        assert_eq!(ossl_param_cipher_set_ctx_params(ctx, set.as_ptr()), OSSL_SUCCESS);

        let dup = ossl_param_cipher_dupctx(ctx);
        assert!(!dup.is_null());

        let mut reset = [0u8; 16];
        let set = [construct_octet_string(OSSL_CIPHER_PARAM_IV, &mut reset), construct_end()];
        assert_eq!(ossl_param_cipher_set_ctx_params(ctx, set.as_ptr()), OSSL_SUCCESS);

        // The copy keeps the IV it was duplicated with
        let mut out = [0u8; 16];
        let mut keylen = 0;
        let mut get = [
            construct_octet_ptr(OSSL_CIPHER_PARAM_IV, &mut out),
            construct_int(OSSL_CIPHER_PARAM_KEYLEN, &mut keylen),
            construct_end(),
        ];
        assert_eq!(ossl_param_cipher_get_ctx_params(dup, get.as_mut_ptr()), OSSL_SUCCESS);
        assert_eq!(out, [0xa5u8; 16]);
        assert_eq!(keylen, 32);
        assert_eq!(get[0].return_size, 16);

        // A short IV is refused
        let mut short = [0u8; 4];
        let set = [construct_octet_string(OSSL_CIPHER_PARAM_IV, &mut short), construct_end()];
        assert_eq!(ossl_param_cipher_set_ctx_params(ctx, set.as_ptr()), OSSL_ERROR);

        ossl_param_cipher_freectx(dup);
        ossl_param_cipher_freectx(ctx);
        free_test_provctx(provctx);
    }
}

#[test]
fn test_cipher_null_context() {
    unsafe {
        assert!(ossl_param_cipher_newctx(std::ptr::null_mut()).is_null());
        assert!(ossl_param_cipher_dupctx(std::ptr::null_mut()).is_null());
        let mut end = [ossl_param::raw::construct_end()];
        assert_eq!(
            ossl_param_cipher_get_ctx_params(std::ptr::null_mut(), end.as_mut_ptr()),
            OSSL_ERROR
        );
    }
}

#[test]
fn test_cipher_gettable_tables() {
    unsafe {
        let gettable = ParamArray::from_raw(ossl_param_cipher_gettable_ctx_params(
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        ));
        assert_eq!(gettable.len(), 8);
        assert_eq!(
            gettable.locate(CIPHER_PARAM_IV).unwrap().data_type(),
            DataType::OctetPtr
        );

        let settable = ParamArray::from_raw(ossl_param_cipher_settable_ctx_params(
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        ));
        assert!(settable.find(CIPHER_PARAM_MODE).is_none());
        assert!(settable.find(CIPHER_PARAM_PADDING).is_some());
    }
}
