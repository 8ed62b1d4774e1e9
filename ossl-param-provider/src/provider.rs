// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

use ossl_param::names::{
    PROV_PARAM_BUILDINFO, PROV_PARAM_NAME, PROV_PARAM_STATUS, PROV_PARAM_VERSION,
};
use ossl_param::ossl_param_sys::param::{
    OSSL_PROV_PARAM_BUILDINFO, OSSL_PROV_PARAM_NAME, OSSL_PROV_PARAM_STATUS,
    OSSL_PROV_PARAM_VERSION,
};
use ossl_param::ossl_param_sys::{OSSL_OP_CIPHER, OSSL_OP_DIGEST};
use ossl_param::raw::raw_table;
use ossl_param::{
    raw, DataType, ParamArray, ParamInfo, ParamProvider, Result, OSSL_ALGORITHM, OSSL_ERROR,
    OSSL_PARAM, OSSL_PROVIDER, OSSL_SUCCESS,
};
use std::sync::Arc;

use crate::cipher::OSSL_PARAM_PROVIDER_CIPHERS;
use crate::digest::OSSL_PARAM_PROVIDER_DIGESTS;

/// Identity the provider reports through its `name`, `version` and
/// `buildinfo` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub name: String,
    pub version: String,
    pub buildinfo: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            buildinfo: concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"))
                .to_string(),
        }
    }
}

// The types of parameters the provider supplies to the core
const PROVIDER_PARAM_TYPES: [ParamInfo; 5] = [
    // Provider name
    ParamInfo::new(OSSL_PROV_PARAM_NAME, DataType::Utf8Ptr),
    // Provider version
    ParamInfo::new(OSSL_PROV_PARAM_VERSION, DataType::Utf8Ptr),
    // Build info
    ParamInfo::new(OSSL_PROV_PARAM_BUILDINFO, DataType::Utf8Ptr),
    // Provider Status
    ParamInfo::new(OSSL_PROV_PARAM_STATUS, DataType::Int),
    ParamInfo::END,
];

static PROVIDER_PARAM_TYPES_RAW: [OSSL_PARAM; 5] = raw_table(&PROVIDER_PARAM_TYPES);

pub struct ProviderContext {
    config: ProviderConfig,
}

impl ProviderContext {
    pub fn new(config: ProviderConfig) -> Self {
        ProviderContext { config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

impl ParamProvider for ProviderContext {
    fn gettable_params(&self) -> &'static [ParamInfo] {
        &PROVIDER_PARAM_TYPES
    }

    fn get_params(&self, params: &mut ParamArray<'_>) -> Result<()> {
        params.try_for_each_mut(|param| match param.key() {
            PROV_PARAM_NAME => param.set(self.config.name.as_str()),
            PROV_PARAM_VERSION => param.set(self.config.version.as_str()),
            PROV_PARAM_BUILDINFO => param.set(self.config.buildinfo.as_str()),
            // The provider is usable for as long as it is loaded
            PROV_PARAM_STATUS => param.set(&1i32),
            _ => Ok(()),
        })
    }
}

/// Borrows the object behind a context pointer handed out with
/// `Arc::into_raw`, keeping it alive for as long as the returned `Arc`.
pub(crate) unsafe fn borrow_arc<T>(ptr: *const std::os::raw::c_void) -> Option<Arc<T>> {
    if ptr.is_null() {
        return None;
    }
    let ptr = ptr as *const T;
    Arc::increment_strong_count(ptr);
    Some(Arc::from_raw(ptr))
}

// Returns an array of parameter types that the provider supports
pub unsafe extern "C" fn ossl_param_provider_gettable_params(
    _provider: *const OSSL_PROVIDER,
) -> *const OSSL_PARAM {
    PROVIDER_PARAM_TYPES_RAW.as_ptr()
}

// Populates the provider's name, version, build information and status
pub unsafe extern "C" fn ossl_param_provider_get_params(
    provctx: *const OSSL_PROVIDER,
    params: *mut OSSL_PARAM,
) -> ::std::os::raw::c_int {
    let result = super::r#catch(Some("ossl_param_provider_get_params"), || {
        let context: Arc<ProviderContext> =
            borrow_arc(provctx).ok_or("Provider context should not be NULL")?;
        raw::update(params, |params| context.get_params(params))?;
        Ok(OSSL_SUCCESS)
    });
    match result {
        Ok(result) => result,
        Err(()) => OSSL_ERROR,
    }
}

// Function pointer of type OSSL_FUNC_PROVIDER_GETTABLE_PARAMS
pub type ProviderGettableParamsPtr =
    unsafe extern "C" fn(*const OSSL_PROVIDER) -> *const OSSL_PARAM;

// Function pointer of type OSSL_FUNC_PROVIDER_GET_PARAMS
pub type ProviderGetParamsPtr = unsafe extern "C" fn(
    provctx: *const OSSL_PROVIDER,
    params: *mut OSSL_PARAM,
) -> ::std::os::raw::c_int;

// Function pointer of type OSSL_FUNC_PROVIDER_QUERY_OPERATION
pub type ProviderQueryPtr = unsafe extern "C" fn(
    prov: *mut OSSL_PROVIDER,
    operation_id: ::std::os::raw::c_int,
    no_cache: *mut ::std::os::raw::c_int,
) -> *const OSSL_ALGORITHM;

// Function pointer of type OSSL_FUNC_PROVIDER_TEARDOWN
pub type ProviderTeardownPtr = unsafe extern "C" fn(provctx: *const OSSL_PROVIDER);

// Returns the algorithms implementing the requested operation, or NULL when
// the provider has none
pub unsafe extern "C" fn ossl_param_provider_query(
    _prov: *mut OSSL_PROVIDER,
    operation_id: ::std::os::raw::c_int,
    no_cache: *mut ::std::os::raw::c_int,
) -> *const OSSL_ALGORITHM {
    if !no_cache.is_null() {
        *no_cache = 0;
    }
    match operation_id {
        OSSL_OP_CIPHER => OSSL_PARAM_PROVIDER_CIPHERS.as_ptr(),
        OSSL_OP_DIGEST => OSSL_PARAM_PROVIDER_DIGESTS.as_ptr(),
        _ => {
            log::trace!("No algorithm for operation {}", operation_id);
            std::ptr::null()
        }
    }
}

// Teardowns the Provider context
pub unsafe extern "C" fn ossl_param_provider_teardown(provctx: *const OSSL_PROVIDER) {
    if provctx.is_null() {
        return;
    }
    // Makes sure the provider context gets dropped
    drop(Arc::from_raw(provctx as *const ProviderContext));
}

#[test]
fn test_provider_answers_identity() {
    let context = ProviderContext::new(ProviderConfig {
        name: "test provider".into(),
        version: "1.2.3".into(),
        buildinfo: "test build".into(),
    });
    let values = ossl_param::fetch_all(&context).unwrap();
    let keys: Vec<_> = values.iter().map(|(key, _)| *key).collect();
    assert_eq!(keys, ["name", "version", "buildinfo", "status"]);
    assert_eq!(values[0].1, b"test provider");
    assert_eq!(values[2].1, b"test build");
    assert_eq!(values[3].1, 1i32.to_ne_bytes());
    assert_eq!(
        ossl_param::fetch_string(&context, PROV_PARAM_VERSION).unwrap(),
        "1.2.3"
    );
}

#[test]
fn test_provider_query_operation() {
    use ossl_param::ossl_param_sys::OSSL_OP_MAC;

    let mut no_cache = 1;
    unsafe {
        let ciphers = ossl_param_provider_query(std::ptr::null_mut(), OSSL_OP_CIPHER, &mut no_cache);
        assert!(!ciphers.is_null());
        assert_eq!(no_cache, 0);
        assert!(!(*ciphers).implementation.is_null());

        let digests = ossl_param_provider_query(std::ptr::null_mut(), OSSL_OP_DIGEST, &mut no_cache);
        assert!(!digests.is_null());

        let macs = ossl_param_provider_query(std::ptr::null_mut(), OSSL_OP_MAC, &mut no_cache);
        assert!(macs.is_null());
    }
}

#[test]
fn test_provider_gettable_params() {
    let gettable = unsafe { ossl_param_provider_gettable_params(std::ptr::null()) };
    let params = unsafe { ParamArray::from_raw(gettable) };
    assert_eq!(params.len(), 4);
    assert_eq!(
        params.locate(PROV_PARAM_STATUS).unwrap().data_type(),
        DataType::Int
    );
    assert!(params.iter().all(|param| !param.modified()));
}
