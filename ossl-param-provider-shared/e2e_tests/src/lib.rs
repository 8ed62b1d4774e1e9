// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0
#![allow(clippy::missing_safety_doc)]

pub use ossl_param_provider::ossl_param::ossl_param_sys::param::*;
pub use ossl_param_provider::ossl_param::ossl_param_sys::*;
pub use ossl_param_provider::ossl_param::raw::*;
pub use ossl_param_provider::ossl_param::types::VOID_PTR;
pub use ossl_param_provider::ossl_param::{DataType, OSSL_ERROR, OSSL_SUCCESS};
use ossl_param_provider_shared::OSSL_provider_init;
use std::ffi::CStr;
use std::os::raw::{c_int, c_void};

pub type GetParamsFn = unsafe extern "C" fn(VOID_PTR, *mut OSSL_PARAM) -> c_int;
pub type AlgorithmGetParamsFn = unsafe extern "C" fn(*mut OSSL_PARAM) -> c_int;
pub type SetParamsFn = unsafe extern "C" fn(VOID_PTR, *const OSSL_PARAM) -> c_int;
pub type GettableFn = unsafe extern "C" fn(VOID_PTR) -> *const OSSL_PARAM;
pub type CtxGettableFn = unsafe extern "C" fn(VOID_PTR, VOID_PTR) -> *const OSSL_PARAM;
pub type NewCtxFn = unsafe extern "C" fn(VOID_PTR) -> VOID_PTR;
pub type FreeCtxFn = unsafe extern "C" fn(VOID_PTR);
pub type QueryFn = unsafe extern "C" fn(VOID_PTR, c_int, *mut c_int) -> *const OSSL_ALGORITHM;
pub type TeardownFn = unsafe extern "C" fn(VOID_PTR);

// Looks up the function registered under function_id in a dispatch table
pub unsafe fn find_function(
    table: *const OSSL_DISPATCH,
    function_id: c_int,
) -> Option<unsafe extern "C" fn()> {
    let mut cursor = table;
    while !cursor.is_null() && (*cursor).function_id != 0 {
        if (*cursor).function_id == function_id {
            return (*cursor).function;
        }
        cursor = cursor.add(1);
    }
    None
}

/// Looks up `function_id` in `table` and casts it to the signature `F` the
/// core associates with that id.
pub unsafe fn function<F: Copy>(table: *const OSSL_DISPATCH, function_id: c_int) -> F {
    let function = find_function(table, function_id)
        .unwrap_or_else(|| panic!("function {} is not dispatched", function_id));
    assert_eq!(
        std::mem::size_of::<F>(),
        std::mem::size_of::<unsafe extern "C" fn()>()
    );
    std::mem::transmute_copy(&function)
}

/// A provider initialised the way the core does it, through
/// `OSSL_provider_init`. Torn down on drop.
pub struct LoadedProvider {
    dispatch: *const OSSL_DISPATCH,
    provctx: VOID_PTR,
}

impl LoadedProvider {
    pub fn load() -> Self {
        let mut dispatch: *const OSSL_DISPATCH = std::ptr::null();
        let mut provctx: VOID_PTR = std::ptr::null_mut();
        unsafe {
            ossl_returns_1(OSSL_provider_init(
                std::ptr::null(),
                std::ptr::null(),
                &mut dispatch,
                &mut provctx,
            ))
            .unwrap();
        }
        assert!(!provctx.is_null());
        LoadedProvider { dispatch, provctx }
    }

    pub fn provctx(&self) -> VOID_PTR {
        self.provctx
    }

    pub unsafe fn function<F: Copy>(&self, function_id: c_int) -> F {
        function(self.dispatch, function_id)
    }

    pub fn get_params(&self, params: &mut [OSSL_PARAM]) -> c_int {
        unsafe {
            let get_params: GetParamsFn = self.function(OSSL_FUNC_PROVIDER_GET_PARAMS);
            get_params(self.provctx, params.as_mut_ptr())
        }
    }

    pub fn gettable_params(&self) -> *const OSSL_PARAM {
        unsafe {
            let gettable: GettableFn = self.function(OSSL_FUNC_PROVIDER_GETTABLE_PARAMS);
            gettable(self.provctx)
        }
    }

    /// The first algorithm the provider offers for `operation_id`, if any.
    pub fn query(&self, operation_id: c_int) -> Option<Algorithm> {
        unsafe {
            let query: QueryFn = self.function(OSSL_FUNC_PROVIDER_QUERY_OPERATION);
            let mut no_cache = 1;
            let algorithms = ossl_returns_nonnull_const(query(
                self.provctx,
                operation_id,
                &mut no_cache,
            ))
            .ok()?;
            assert_eq!(no_cache, 0);
            Some(Algorithm {
                names: CStr::from_ptr((*algorithms).algorithm_names)
                    .to_string_lossy()
                    .into_owned(),
                dispatch: (*algorithms).implementation,
                provctx: self.provctx,
            })
        }
    }
}

impl Drop for LoadedProvider {
    fn drop(&mut self) {
        unsafe {
            let teardown: TeardownFn = self.function(OSSL_FUNC_PROVIDER_TEARDOWN);
            teardown(self.provctx);
        }
    }
}

/// An algorithm implementation returned by the provider's query function.
pub struct Algorithm {
    pub names: String,
    dispatch: *const OSSL_DISPATCH,
    provctx: VOID_PTR,
}

impl Algorithm {
    pub unsafe fn function<F: Copy>(&self, function_id: c_int) -> F {
        function(self.dispatch, function_id)
    }

    pub fn provctx(&self) -> *mut c_void {
        self.provctx
    }
}

/// Reads the keys of a descriptor-only table such as a gettable list.
pub unsafe fn table_keys(table: *const OSSL_PARAM) -> Vec<String> {
    let mut keys = Vec::new();
    let mut cursor = table;
    while !cursor.is_null() && !(*cursor).key.is_null() {
        keys.push(CStr::from_ptr((*cursor).key).to_string_lossy().into_owned());
        cursor = cursor.add(1);
    }
    keys
}
