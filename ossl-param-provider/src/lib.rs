// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0
#![allow(clippy::missing_safety_doc)]
#![deny(warnings)]

use std::sync::{Arc, OnceLock};

pub use ossl_param;

use ossl_param::ossl_param_sys::{
    OSSL_FUNC_PROVIDER_GETTABLE_PARAMS, OSSL_FUNC_PROVIDER_GET_PARAMS,
    OSSL_FUNC_PROVIDER_QUERY_OPERATION, OSSL_FUNC_PROVIDER_TEARDOWN,
};
use ossl_param::types::{VOID_PTR, VOID_PTR_PTR};
use ossl_param::{Error, OSSL_CORE_HANDLE, OSSL_DISPATCH};

pub mod cipher;
pub mod digest;

mod provider;
pub use provider::*;

mod catch;
pub use catch::r#catch;

// Properties every algorithm of this provider is registered with
pub const OSSL_PARAM_PROVIDER_DFLT_PROPERTIES: &[u8; 20] = b"provider=ossl-param\0";

// The init function populates the dispatch table and returns a void pointer
// to the provider context.
pub unsafe fn ossl_param_provider_init(
    _handle: *const OSSL_CORE_HANDLE,
    _in_: *const OSSL_DISPATCH,
    out: *mut *const OSSL_DISPATCH,
    provctx: VOID_PTR_PTR,
) -> Result<(), Error> {
    ossl_param_provider_init_with(ProviderConfig::default(), out, provctx)
}

/// Same as [`ossl_param_provider_init`], with the identity the provider
/// reports taken from `config`.
pub unsafe fn ossl_param_provider_init_with(
    config: ProviderConfig,
    out: *mut *const OSSL_DISPATCH,
    provctx: VOID_PTR_PTR,
) -> Result<(), Error> {
    let _ = env_logger::try_init();

    let ossl_param_provider_teardown_ptr: ProviderTeardownPtr = ossl_param_provider_teardown;

    let ossl_param_provider_gettable_params_ptr: ProviderGettableParamsPtr =
        ossl_param_provider_gettable_params;

    let ossl_param_provider_get_params_ptr: ProviderGetParamsPtr = ossl_param_provider_get_params;

    let ossl_param_provider_query_ptr: ProviderQueryPtr = ossl_param_provider_query;

    static DISPATCH_TABLE: OnceLock<[OSSL_DISPATCH; 5]> = OnceLock::new();

    let dispatch_table = DISPATCH_TABLE.get_or_init(|| {
        [
            ossl_param::ossl_dispatch!(
                OSSL_FUNC_PROVIDER_TEARDOWN,
                ossl_param_provider_teardown_ptr
            ),
            ossl_param::ossl_dispatch!(
                OSSL_FUNC_PROVIDER_GETTABLE_PARAMS,
                ossl_param_provider_gettable_params_ptr
            ),
            ossl_param::ossl_dispatch!(
                OSSL_FUNC_PROVIDER_GET_PARAMS,
                ossl_param_provider_get_params_ptr
            ),
            ossl_param::ossl_dispatch!(
                OSSL_FUNC_PROVIDER_QUERY_OPERATION,
                ossl_param_provider_query_ptr
            ),
            ossl_param::ossl_dispatch!(),
        ]
    });

    if out.is_null() || provctx.is_null() {
        log::error!("[Provider Init Error]: Neither out nor provctx parameters should be NULL");
        return Err(Error::NullPointer);
    }

    *out = dispatch_table.as_ptr();

    log::debug!(
        "Initialising provider \"{}\" version {}",
        config.name,
        config.version
    );
    let arc_context = Arc::new(ProviderContext::new(config));
    *provctx = Arc::into_raw(arc_context) as VOID_PTR;

    Ok(())
}

#[test]
fn test_provider_init() {
    use ossl_param::OSSL_PROVIDER;

    let mut out: *const OSSL_DISPATCH = std::ptr::null();
    let mut provctx: VOID_PTR = std::ptr::null_mut();

    // Initialize the provider
    let result: Result<(), Error> = unsafe {
        ossl_param_provider_init(
            std::ptr::null(),
            std::ptr::null(),
            &mut out,
            &mut provctx as *mut VOID_PTR,
        )
    };
    assert!(result.is_ok());
    assert!(!out.is_null());

    // The dispatch table ends with an empty entry
    let table = unsafe { std::slice::from_raw_parts(out, 5) };
    assert_eq!(table[0].function_id, OSSL_FUNC_PROVIDER_TEARDOWN);
    assert!(table[4].function.is_none());

    let prov_context: Arc<ProviderContext> =
        unsafe { Arc::from_raw(provctx as *const ProviderContext) };
    assert_eq!(prov_context.config().name, env!("CARGO_PKG_NAME"));

    unsafe {
        ossl_param_provider_teardown(Arc::into_raw(prov_context) as *const OSSL_PROVIDER);
    }
}

#[test]
fn test_provider_init_rejects_null_out() {
    let mut provctx: VOID_PTR = std::ptr::null_mut();
    let result = unsafe {
        ossl_param_provider_init(
            std::ptr::null(),
            std::ptr::null(),
            std::ptr::null_mut(),
            &mut provctx as *mut VOID_PTR,
        )
    };
    assert_eq!(result, Err(Error::NullPointer));
    assert!(provctx.is_null());
}
