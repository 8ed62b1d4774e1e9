// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

use crate::provider::borrow_arc;
use crate::{ProviderContext, OSSL_PARAM_PROVIDER_DFLT_PROPERTIES};
use ossl_param::names::{
    DIGEST_PARAM_BLOCK_SIZE, DIGEST_PARAM_MICALG, DIGEST_PARAM_PAD_TYPE, DIGEST_PARAM_SSL3_MS,
    DIGEST_PARAM_XOFLEN,
};
use ossl_param::ossl_param_sys::param::{
    OSSL_DIGEST_PARAM_BLOCK_SIZE, OSSL_DIGEST_PARAM_MICALG, OSSL_DIGEST_PARAM_PAD_TYPE,
    OSSL_DIGEST_PARAM_SSL3_MS, OSSL_DIGEST_PARAM_XOFLEN,
};
use ossl_param::ossl_param_sys::{
    OSSL_FUNC_DIGEST_DUPCTX, OSSL_FUNC_DIGEST_FREECTX, OSSL_FUNC_DIGEST_GETTABLE_CTX_PARAMS,
    OSSL_FUNC_DIGEST_GETTABLE_PARAMS, OSSL_FUNC_DIGEST_GET_CTX_PARAMS,
    OSSL_FUNC_DIGEST_GET_PARAMS, OSSL_FUNC_DIGEST_NEWCTX, OSSL_FUNC_DIGEST_SETTABLE_CTX_PARAMS,
    OSSL_FUNC_DIGEST_SET_CTX_PARAMS,
};
use ossl_param::raw::raw_table;
use ossl_param::types::VOID_PTR;
use ossl_param::{
    exchange, ossl_algorithm, ossl_dispatch, raw, DataType, Error, Operation, ParamArray,
    ParamInfo, ParamProvider, Result, OSSL_ALGORITHM, OSSL_DISPATCH, OSSL_ERROR, OSSL_PARAM,
    OSSL_SUCCESS,
};
use std::sync::{Arc, RwLock};

const SHAKE_256_NAMES: &[u8] = b"SHAKE-256:SHAKE256:2.16.840.1.101.3.4.2.12\0";
const SHAKE_256_DESCRIPTION: &[u8] = b"Reference SHAKE-256\0";

/// Rate of the Keccak sponge for SHAKE-256, in bytes.
pub const SHAKE_256_BLOCK_SIZE: usize = 136;
/// Output length used until the caller sets `xoflen`.
pub const SHAKE_256_DEFAULT_XOFLEN: usize = 32;
const SHAKE_256_MICALG: &str = "shake256";

const DIGEST_PARAM_TYPES: [ParamInfo; 2] = [
    ParamInfo::new(OSSL_DIGEST_PARAM_BLOCK_SIZE, DataType::UInt),
    ParamInfo::END,
];

const DIGEST_CTX_GETTABLE_TYPES: [ParamInfo; 5] = [
    ParamInfo::new(OSSL_DIGEST_PARAM_XOFLEN, DataType::UInt),
    ParamInfo::new(OSSL_DIGEST_PARAM_BLOCK_SIZE, DataType::UInt),
    ParamInfo::new(OSSL_DIGEST_PARAM_MICALG, DataType::Utf8String),
    ParamInfo::new(OSSL_DIGEST_PARAM_PAD_TYPE, DataType::Int),
    ParamInfo::END,
];

// ssl3-ms is write only
const DIGEST_CTX_SETTABLE_TYPES: [ParamInfo; 4] = [
    ParamInfo::new(OSSL_DIGEST_PARAM_XOFLEN, DataType::UInt),
    ParamInfo::new(OSSL_DIGEST_PARAM_PAD_TYPE, DataType::Int),
    ParamInfo::new(OSSL_DIGEST_PARAM_SSL3_MS, DataType::OctetString),
    ParamInfo::END,
];

static DIGEST_PARAM_TYPES_RAW: [OSSL_PARAM; 2] = raw_table(&DIGEST_PARAM_TYPES);
static DIGEST_CTX_GETTABLE_TYPES_RAW: [OSSL_PARAM; 5] = raw_table(&DIGEST_CTX_GETTABLE_TYPES);
static DIGEST_CTX_SETTABLE_TYPES_RAW: [OSSL_PARAM; 4] = raw_table(&DIGEST_CTX_SETTABLE_TYPES);

/// The parameters of SHAKE-256 that do not depend on a context.
pub struct Shake256;

impl ParamProvider for Shake256 {
    fn gettable_params(&self) -> &'static [ParamInfo] {
        &DIGEST_PARAM_TYPES
    }

    fn get_params(&self, params: &mut ParamArray<'_>) -> Result<()> {
        params
            .set(DIGEST_PARAM_BLOCK_SIZE, &SHAKE_256_BLOCK_SIZE)
            .map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestState {
    pub xoflen: usize,
    pub pad_type: i32,
    ssl3_ms: Vec<u8>,
}

impl Default for DigestState {
    fn default() -> Self {
        DigestState {
            xoflen: SHAKE_256_DEFAULT_XOFLEN,
            pad_type: 0,
            ssl3_ms: Vec::new(),
        }
    }
}

impl DigestState {
    /// Whether an SSLv3 master secret has been handed over.
    pub fn has_ssl3_ms(&self) -> bool {
        !self.ssl3_ms.is_empty()
    }
}

impl ParamProvider for DigestState {
    fn gettable_params(&self) -> &'static [ParamInfo] {
        &DIGEST_CTX_GETTABLE_TYPES
    }

    fn get_params(&self, params: &mut ParamArray<'_>) -> Result<()> {
        params.try_for_each_mut(|param| match param.key() {
            DIGEST_PARAM_XOFLEN => param.set(&self.xoflen),
            DIGEST_PARAM_BLOCK_SIZE => param.set(&SHAKE_256_BLOCK_SIZE),
            DIGEST_PARAM_MICALG => param.set(SHAKE_256_MICALG),
            DIGEST_PARAM_PAD_TYPE => param.set(&self.pad_type),
            _ => Ok(()),
        })
    }

    fn settable_params(&self) -> &'static [ParamInfo] {
        &DIGEST_CTX_SETTABLE_TYPES
    }

    fn set_params(&mut self, params: &ParamArray<'_>) -> Result<()> {
        params.try_for_each(|param| match param.key() {
            DIGEST_PARAM_XOFLEN => {
                let xoflen: usize = param.get()?;
                if xoflen == 0 {
                    return Err(Error::InvalidValue {
                        key: param.key().to_string(),
                        value: xoflen.to_string(),
                    });
                }
                self.xoflen = xoflen;
                Ok(())
            }
            DIGEST_PARAM_PAD_TYPE => {
                self.pad_type = param.get()?;
                Ok(())
            }
            DIGEST_PARAM_SSL3_MS => {
                self.ssl3_ms = param.as_bytes()?.to_vec();
                Ok(())
            }
            _ => Ok(()),
        })
    }
}

pub struct DigestContext {
    provctx: Arc<ProviderContext>,
    state: RwLock<DigestState>,
}

impl DigestContext {
    pub fn new(provctx: Arc<ProviderContext>) -> Self {
        DigestContext {
            provctx,
            state: RwLock::new(DigestState::default()),
        }
    }

    pub fn get_provctx(&self) -> &Arc<ProviderContext> {
        &self.provctx
    }
}

const POISONED: &str = "Digest context state is poisoned";

// Creates a digest context bound to the provider context provctx
pub unsafe extern "C" fn ossl_param_digest_newctx(provctx: VOID_PTR) -> VOID_PTR {
    match borrow_arc::<ProviderContext>(provctx) {
        None => std::ptr::null_mut(),
        Some(context) => Arc::into_raw(Arc::new(DigestContext::new(context))) as VOID_PTR,
    }
}

// Frees a digest context created by newctx or dupctx
pub unsafe extern "C" fn ossl_param_digest_freectx(ctx: VOID_PTR) {
    if ctx.is_null() {
        return;
    }
    let arc_ctx = Arc::from_raw(ctx as *const DigestContext);
    debug_assert_eq!(1, Arc::strong_count(&arc_ctx));
}

// Creates an independent copy of a digest context
pub unsafe extern "C" fn ossl_param_digest_dupctx(ctx: VOID_PTR) -> VOID_PTR {
    let result = crate::r#catch(Some("ossl_param_digest_dupctx"), || {
        let arc_ctx: Arc<DigestContext> =
            borrow_arc(ctx).ok_or("Digest context should not be NULL")?;
        let state = arc_ctx.state.read().map_err(|_| POISONED)?.clone();
        let duplicate = DigestContext {
            provctx: arc_ctx.provctx.clone(),
            state: RwLock::new(state),
        };
        Ok(Arc::into_raw(Arc::new(duplicate)) as VOID_PTR)
    });
    result.unwrap_or(std::ptr::null_mut())
}

pub unsafe extern "C" fn ossl_param_digest_get_params(
    params: *mut OSSL_PARAM,
) -> std::os::raw::c_int {
    let result = crate::r#catch(Some("ossl_param_digest_get_params"), || {
        raw::update(params, |params| Shake256.get_params(params))?;
        Ok(OSSL_SUCCESS)
    });
    match result {
        Ok(result) => result,
        Err(()) => OSSL_ERROR,
    }
}

pub unsafe extern "C" fn ossl_param_digest_get_ctx_params(
    ctx: VOID_PTR,
    params: *mut OSSL_PARAM,
) -> std::os::raw::c_int {
    let result = crate::r#catch(Some("ossl_param_digest_get_ctx_params"), || {
        let arc_ctx: Arc<DigestContext> =
            borrow_arc(ctx).ok_or("Digest context should not be NULL")?;
        let state = arc_ctx.state.read().map_err(|_| POISONED)?;
        raw::update(params, |params| state.get_params(params))?;
        Ok(OSSL_SUCCESS)
    });
    match result {
        Ok(result) => result,
        Err(()) => OSSL_ERROR,
    }
}

pub unsafe extern "C" fn ossl_param_digest_set_ctx_params(
    ctx: VOID_PTR,
    params: *const OSSL_PARAM,
) -> std::os::raw::c_int {
    let result = crate::r#catch(Some("ossl_param_digest_set_ctx_params"), || {
        let arc_ctx: Arc<DigestContext> =
            borrow_arc(ctx).ok_or("Digest context should not be NULL")?;
        let mut state = arc_ctx.state.write().map_err(|_| POISONED)?;
        raw::apply(params, |params| exchange(&mut *state, Operation::Set, params))?;
        Ok(OSSL_SUCCESS)
    });
    match result {
        Ok(result) => result,
        Err(()) => OSSL_ERROR,
    }
}

pub unsafe extern "C" fn ossl_param_digest_gettable_params(_provctx: VOID_PTR) -> *const OSSL_PARAM {
    DIGEST_PARAM_TYPES_RAW.as_ptr()
}

pub unsafe extern "C" fn ossl_param_digest_gettable_ctx_params(
    _dctx: VOID_PTR,
    _provctx: VOID_PTR,
) -> *const OSSL_PARAM {
    DIGEST_CTX_GETTABLE_TYPES_RAW.as_ptr()
}

pub unsafe extern "C" fn ossl_param_digest_settable_ctx_params(
    _dctx: VOID_PTR,
    _provctx: VOID_PTR,
) -> *const OSSL_PARAM {
    DIGEST_CTX_SETTABLE_TYPES_RAW.as_ptr()
}

pub type DigestNewCtxPtr = unsafe extern "C" fn(VOID_PTR) -> VOID_PTR;
pub type DigestFreeCtxPtr = unsafe extern "C" fn(VOID_PTR);
pub type DigestDupCtxPtr = unsafe extern "C" fn(VOID_PTR) -> VOID_PTR;
pub type DigestGetParamsPtr = unsafe extern "C" fn(*mut OSSL_PARAM) -> std::os::raw::c_int;
pub type DigestGetCtxParamsPtr =
    unsafe extern "C" fn(VOID_PTR, *mut OSSL_PARAM) -> std::os::raw::c_int;
pub type DigestSetCtxParamsPtr =
    unsafe extern "C" fn(VOID_PTR, *const OSSL_PARAM) -> std::os::raw::c_int;
pub type DigestGettableParamsPtr = unsafe extern "C" fn(VOID_PTR) -> *const OSSL_PARAM;
pub type DigestGettableCtxParamsPtr = unsafe extern "C" fn(VOID_PTR, VOID_PTR) -> *const OSSL_PARAM;

const OSSL_FUNC_DIGEST_NEWCTX_PTR: DigestNewCtxPtr = ossl_param_digest_newctx;
const OSSL_FUNC_DIGEST_FREECTX_PTR: DigestFreeCtxPtr = ossl_param_digest_freectx;
const OSSL_FUNC_DIGEST_DUPCTX_PTR: DigestDupCtxPtr = ossl_param_digest_dupctx;
const OSSL_FUNC_DIGEST_GET_PARAMS_PTR: DigestGetParamsPtr = ossl_param_digest_get_params;
const OSSL_FUNC_DIGEST_GET_CTX_PARAMS_PTR: DigestGetCtxParamsPtr =
    ossl_param_digest_get_ctx_params;
const OSSL_FUNC_DIGEST_SET_CTX_PARAMS_PTR: DigestSetCtxParamsPtr =
    ossl_param_digest_set_ctx_params;
const OSSL_FUNC_DIGEST_GETTABLE_PARAMS_PTR: DigestGettableParamsPtr =
    ossl_param_digest_gettable_params;
const OSSL_FUNC_DIGEST_GETTABLE_CTX_PARAMS_PTR: DigestGettableCtxParamsPtr =
    ossl_param_digest_gettable_ctx_params;
const OSSL_FUNC_DIGEST_SETTABLE_CTX_PARAMS_PTR: DigestGettableCtxParamsPtr =
    ossl_param_digest_settable_ctx_params;

static SHAKE_256_FUNCTIONS: [OSSL_DISPATCH; 10] = [
    unsafe { ossl_dispatch!(OSSL_FUNC_DIGEST_NEWCTX, OSSL_FUNC_DIGEST_NEWCTX_PTR) },
    unsafe { ossl_dispatch!(OSSL_FUNC_DIGEST_FREECTX, OSSL_FUNC_DIGEST_FREECTX_PTR) },
    unsafe { ossl_dispatch!(OSSL_FUNC_DIGEST_DUPCTX, OSSL_FUNC_DIGEST_DUPCTX_PTR) },
    unsafe { ossl_dispatch!(OSSL_FUNC_DIGEST_GET_PARAMS, OSSL_FUNC_DIGEST_GET_PARAMS_PTR) },
    unsafe {
        ossl_dispatch!(
            OSSL_FUNC_DIGEST_GET_CTX_PARAMS,
            OSSL_FUNC_DIGEST_GET_CTX_PARAMS_PTR
        )
    },
    unsafe {
        ossl_dispatch!(
            OSSL_FUNC_DIGEST_SET_CTX_PARAMS,
            OSSL_FUNC_DIGEST_SET_CTX_PARAMS_PTR
        )
    },
    unsafe {
        ossl_dispatch!(
            OSSL_FUNC_DIGEST_GETTABLE_PARAMS,
            OSSL_FUNC_DIGEST_GETTABLE_PARAMS_PTR
        )
    },
    unsafe {
        ossl_dispatch!(
            OSSL_FUNC_DIGEST_GETTABLE_CTX_PARAMS,
            OSSL_FUNC_DIGEST_GETTABLE_CTX_PARAMS_PTR
        )
    },
    unsafe {
        ossl_dispatch!(
            OSSL_FUNC_DIGEST_SETTABLE_CTX_PARAMS,
            OSSL_FUNC_DIGEST_SETTABLE_CTX_PARAMS_PTR
        )
    },
    ossl_dispatch!(),
];

pub static OSSL_PARAM_PROVIDER_DIGESTS: [OSSL_ALGORITHM; 2] = [
    ossl_algorithm!(
        SHAKE_256_NAMES,
        OSSL_PARAM_PROVIDER_DFLT_PROPERTIES,
        SHAKE_256_FUNCTIONS.as_ptr(),
        SHAKE_256_DESCRIPTION
    ),
    ossl_algorithm!(),
];

#[test]
fn test_digest_defaults() {
    let state = DigestState::default();
    let values = ossl_param::fetch_all(&state).unwrap();
    let keys: Vec<_> = values.iter().map(|(key, _)| *key).collect();
    assert_eq!(keys, ["xoflen", "blocksize", "micalg", "pad_type"]);
    assert_eq!(values[0].1, 32usize.to_ne_bytes());
    assert_eq!(values[1].1, 136usize.to_ne_bytes());
    assert_eq!(values[2].1, b"shake256");

    assert_eq!(
        ossl_param::fetch(&Shake256, DIGEST_PARAM_BLOCK_SIZE, DataType::UInt).unwrap(),
        136usize.to_ne_bytes()
    );
}

#[test]
fn test_xoflen_narrows_when_it_fits() {
    use ossl_param::Param;

    let mut params: ParamArray =
        vec![Param::with_capacity(DIGEST_PARAM_XOFLEN, DataType::UInt, 4)].into();
    DigestState::default().get_params(&mut params).unwrap();
    assert_eq!(params.get::<u32>(DIGEST_PARAM_XOFLEN).unwrap(), 32);
    assert_eq!(params[0].used_size(), Some(4));
}

#[test]
fn test_digest_state_set_params() {
    use ossl_param::Param;

    let mut state = DigestState::default();
    let secret = [0x42u8; 48];
    let set: ParamArray = vec![
        Param::new(DIGEST_PARAM_XOFLEN, &64u32).unwrap(),
        Param::new(DIGEST_PARAM_PAD_TYPE, &1i32).unwrap(),
        Param::borrowed(DIGEST_PARAM_SSL3_MS, DataType::OctetString, &secret).unwrap(),
    ]
    .into();
    state.set_params(&set).unwrap();
    assert_eq!(state.xoflen, 64);
    assert_eq!(state.pad_type, 1);
    assert!(state.has_ssl3_ms());

    // The secret is never handed back
    let mut get: ParamArray = vec![Param::query(DIGEST_PARAM_SSL3_MS, DataType::OctetString)].into();
    state.get_params(&mut get).unwrap();
    assert!(!get[0].modified());

    let zero: ParamArray = vec![Param::new(DIGEST_PARAM_XOFLEN, &0u32).unwrap()].into();
    assert!(matches!(
        state.set_params(&zero),
        Err(Error::InvalidValue { .. })
    ));
    assert_eq!(state.xoflen, 64);
}

#[test]
fn test_digest_context_over_raw_abi() {
    use ossl_param::raw::{construct_end, construct_size_t, construct_utf8_string};

    unsafe {
        let provctx = Arc::into_raw(Arc::new(ProviderContext::new(
            crate::ProviderConfig::default(),
        ))) as VOID_PTR;
        let ctx = ossl_param_digest_newctx(provctx);
        assert!(!ctx.is_null());

        let mut xoflen: usize = 100;
        let set = [construct_size_t(OSSL_DIGEST_PARAM_XOFLEN, &mut xoflen), construct_end()];
        assert_eq!(ossl_param_digest_set_ctx_params(ctx, set.as_ptr()), OSSL_SUCCESS);

        let dup = ossl_param_digest_dupctx(ctx);
        let mut out: usize = 0;
        let mut micalg = [0u8; 16];
        let mut get = [
            construct_size_t(OSSL_DIGEST_PARAM_XOFLEN, &mut out),
            construct_utf8_string(OSSL_DIGEST_PARAM_MICALG, &mut micalg),
            construct_end(),
        ];
        assert_eq!(ossl_param_digest_get_ctx_params(dup, get.as_mut_ptr()), OSSL_SUCCESS);
        assert_eq!(out, 100);
        assert_eq!(&micalg[..9], b"shake256\0");
        assert_eq!(get[1].return_size, 8);

        ossl_param_digest_freectx(dup);
        ossl_param_digest_freectx(ctx);
        crate::ossl_param_provider_teardown(provctx as *const _);
    }
}
