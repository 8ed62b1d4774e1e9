// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

use ossl_param_provider::ossl_param::types::VOID_PTR_PTR;
use ossl_param_provider::ossl_param::{OSSL_CORE_HANDLE, OSSL_DISPATCH, OSSL_ERROR, OSSL_SUCCESS};
use ossl_param_provider::{ossl_param_provider_init, r#catch};

#[no_mangle]
#[allow(non_snake_case)]
// The function name needs to be unique for dynamic libraries as the core
// looks for the OSSL_provider_init symbol while loading the provider.
pub unsafe extern "C" fn OSSL_provider_init(
    handle: *const OSSL_CORE_HANDLE,
    in_: *const OSSL_DISPATCH,
    out: *mut *const OSSL_DISPATCH,
    provctx: VOID_PTR_PTR,
) -> ::std::os::raw::c_int {
    let result = r#catch(Some("OSSL_provider_init"), || {
        ossl_param_provider_init(handle, in_, out, provctx)?;
        log::trace!("Provider initialised");

        Ok(OSSL_SUCCESS)
    });
    match result {
        Ok(result) => result,
        Err(()) => OSSL_ERROR,
    }
}
