// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

#![allow(non_camel_case_types)]

pub mod param;

use std::os::raw::{c_char, c_int, c_uint, c_void};

// Data type discriminants carried in OSSL_PARAM::data_type
pub const OSSL_PARAM_INTEGER: c_uint = 1;
pub const OSSL_PARAM_UNSIGNED_INTEGER: c_uint = 2;
pub const OSSL_PARAM_REAL: c_uint = 3;
pub const OSSL_PARAM_UTF8_STRING: c_uint = 4;
pub const OSSL_PARAM_OCTET_STRING: c_uint = 5;
pub const OSSL_PARAM_UTF8_PTR: c_uint = 6;
pub const OSSL_PARAM_OCTET_PTR: c_uint = 7;

// Value of OSSL_PARAM::return_size until one side writes the parameter
pub const OSSL_PARAM_UNMODIFIED: usize = usize::MAX;

// Operation ids
pub const OSSL_OP_DIGEST: c_int = 1;
pub const OSSL_OP_CIPHER: c_int = 2;
pub const OSSL_OP_MAC: c_int = 3;
pub const OSSL_OP_KDF: c_int = 4;
pub const OSSL_OP_RAND: c_int = 5;

// Provider function ids
pub const OSSL_FUNC_PROVIDER_TEARDOWN: c_int = 1024;
pub const OSSL_FUNC_PROVIDER_GETTABLE_PARAMS: c_int = 1025;
pub const OSSL_FUNC_PROVIDER_GET_PARAMS: c_int = 1026;
pub const OSSL_FUNC_PROVIDER_QUERY_OPERATION: c_int = 1027;

// Digest function ids
pub const OSSL_FUNC_DIGEST_NEWCTX: c_int = 1;
pub const OSSL_FUNC_DIGEST_FREECTX: c_int = 6;
pub const OSSL_FUNC_DIGEST_DUPCTX: c_int = 7;
pub const OSSL_FUNC_DIGEST_GET_PARAMS: c_int = 8;
pub const OSSL_FUNC_DIGEST_SET_CTX_PARAMS: c_int = 9;
pub const OSSL_FUNC_DIGEST_GET_CTX_PARAMS: c_int = 10;
pub const OSSL_FUNC_DIGEST_GETTABLE_PARAMS: c_int = 11;
pub const OSSL_FUNC_DIGEST_SETTABLE_CTX_PARAMS: c_int = 12;
pub const OSSL_FUNC_DIGEST_GETTABLE_CTX_PARAMS: c_int = 13;

// Cipher function ids
pub const OSSL_FUNC_CIPHER_NEWCTX: c_int = 1;
pub const OSSL_FUNC_CIPHER_FREECTX: c_int = 7;
pub const OSSL_FUNC_CIPHER_DUPCTX: c_int = 8;
pub const OSSL_FUNC_CIPHER_GET_PARAMS: c_int = 9;
pub const OSSL_FUNC_CIPHER_GET_CTX_PARAMS: c_int = 10;
pub const OSSL_FUNC_CIPHER_SET_CTX_PARAMS: c_int = 11;
pub const OSSL_FUNC_CIPHER_GETTABLE_PARAMS: c_int = 12;
pub const OSSL_FUNC_CIPHER_GETTABLE_CTX_PARAMS: c_int = 13;
pub const OSSL_FUNC_CIPHER_SETTABLE_CTX_PARAMS: c_int = 14;

/// One typed slot of a parameter array as it crosses the C ABI.
///
/// `data` points at `data_size` bytes of caller memory for every data type,
/// pointer variants included. An entry whose `key` is null ends the array.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OSSL_PARAM {
    pub key: *const c_char,
    pub data_type: c_uint,
    pub data: *mut c_void,
    pub data_size: usize,
    pub return_size: usize,
}

// Static tables only ever point at static, NUL-terminated key strings.
unsafe impl Sync for OSSL_PARAM {}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OSSL_DISPATCH {
    pub function_id: c_int,
    pub function: Option<unsafe extern "C" fn()>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OSSL_ALGORITHM {
    pub algorithm_names: *const c_char,
    pub property_definition: *const c_char,
    pub implementation: *const OSSL_DISPATCH,
    pub algorithm_description: *const c_char,
}

// Algorithm tables reference static strings and static dispatch tables.
unsafe impl Sync for OSSL_ALGORITHM {}

pub type OSSL_PROVIDER = c_void;
pub type OSSL_CORE_HANDLE = c_void;
