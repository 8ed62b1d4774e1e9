// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0
#![allow(clippy::missing_safety_doc)]

//! Typed parameter exchange between a crypto core and its providers.
//!
//! A caller describes what it wants as a [`ParamArray`] of named, typed
//! [`Param`]s. The callee answers the keys it knows through the
//! [`ParamProvider`] trait, writing values into caller buffers or, for size
//! queries, reporting how big the value is. [`raw`] moves these arrays across
//! the C ABI as `OSSL_PARAM` arrays.

pub use ossl_param_sys;
pub use ossl_param_sys::{
    OSSL_ALGORITHM, OSSL_CORE_HANDLE, OSSL_DISPATCH, OSSL_PARAM, OSSL_PARAM_UNMODIFIED,
    OSSL_PROVIDER,
};

mod array;
mod data_type;
mod error;
mod negotiate;
mod param;
mod provider;
mod value;

pub mod names;
pub mod raw;
#[allow(non_camel_case_types)]
pub mod types;

pub use array::ParamArray;
pub use data_type::{DataType, Family};
pub use error::{Error, Result};
pub use negotiate::{fetch, fetch_all, fetch_octets, fetch_string, Negotiation, Phase};
pub use param::Param;
pub use provider::{exchange, lookup_info, Operation, ParamInfo, ParamProvider};
pub use raw::{ossl_returns_1, ossl_returns_nonnull, ossl_returns_nonnull_const};
pub use value::{FromParam, ToParam};

// The core expects an integer return value of 1 and 0 for success and error
pub const OSSL_SUCCESS: std::os::raw::c_int = 1;
pub const OSSL_ERROR: std::os::raw::c_int = 0;

#[macro_export]
macro_rules! ossl_dispatch {
    () => {
        $crate::OSSL_DISPATCH {
            function_id: 0,
            function: None,
        }
    };
    ($function_id:ident, $function:ident) => {
        $crate::OSSL_DISPATCH {
            function_id: $function_id,
            function: Some(std::mem::transmute::<_, unsafe extern "C" fn()>($function)),
        }
    };
}

#[macro_export]
macro_rules! ossl_param {
    () => {
        $crate::raw::END
    };
    ($key:ident, $data_type:ident) => {
        $crate::OSSL_PARAM {
            key: $key.as_ptr() as *const std::os::raw::c_char,
            data_type: $data_type,
            data: std::ptr::null_mut(),
            data_size: 0,
            return_size: $crate::OSSL_PARAM_UNMODIFIED,
        }
    };
    ($key:ident, $data_type:ident, $var:ident) => {
        $crate::OSSL_PARAM {
            key: $key.as_ptr() as *const std::os::raw::c_char,
            data_type: $data_type,
            data: &mut $var as *mut _ as *mut std::os::raw::c_void,
            data_size: std::mem::size_of_val(&$var),
            return_size: $crate::OSSL_PARAM_UNMODIFIED,
        }
    };
}

#[macro_export]
macro_rules! ossl_algorithm {
    () => {
        $crate::OSSL_ALGORITHM {
            algorithm_names: std::ptr::null(),
            property_definition: std::ptr::null(),
            implementation: std::ptr::null(),
            algorithm_description: std::ptr::null(),
        }
    };
    ($name:ident, $properties:ident, $implementation:expr, $description:ident) => {
        $crate::OSSL_ALGORITHM {
            algorithm_names: $name.as_ptr() as *const std::os::raw::c_char,
            property_definition: $properties.as_ptr() as *const std::os::raw::c_char,
            implementation: $implementation,
            algorithm_description: $description.as_ptr() as *const std::os::raw::c_char,
        }
    };
}

#[test]
fn test_ossl_param_macro() {
    use ossl_param_sys::param::OSSL_CIPHER_PARAM_PADDING;
    use ossl_param_sys::OSSL_PARAM_UNSIGNED_INTEGER;

    let mut padding: std::os::raw::c_uint = 1;
    let mut params = [
        ossl_param!(
            OSSL_CIPHER_PARAM_PADDING,
            OSSL_PARAM_UNSIGNED_INTEGER,
            padding
        ),
        ossl_param!(),
    ];
    assert_eq!(params[0].data_size, 4);
    assert!(params[1].key.is_null());

    let array = unsafe { ParamArray::from_raw_mut(params.as_mut_ptr()) };
    assert_eq!(array.len(), 1);
    assert_eq!(array[0].data_type(), DataType::UInt);
    assert!(!array[0].modified());
}

#[test]
fn test_ossl_dispatch_macro() {
    use ossl_param_sys::OSSL_FUNC_PROVIDER_TEARDOWN;

    unsafe extern "C" fn teardown(_provctx: *mut std::os::raw::c_void) {}
    type TeardownPtr = unsafe extern "C" fn(*mut std::os::raw::c_void);
    let teardown_ptr: TeardownPtr = teardown;

    let table = unsafe {
        [
            ossl_dispatch!(OSSL_FUNC_PROVIDER_TEARDOWN, teardown_ptr),
            ossl_dispatch!(),
        ]
    };
    assert_eq!(table[0].function_id, OSSL_FUNC_PROVIDER_TEARDOWN);
    assert!(table[0].function.is_some());
    assert!(table[1].function.is_none());
}
