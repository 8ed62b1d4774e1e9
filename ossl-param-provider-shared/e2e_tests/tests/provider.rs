// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

use e2e_tests::*;
use std::ffi::CStr;

// Simple test to load the provider. Test fails if OSSL_provider_init reports an error
#[test]
fn test_loading_provider() {
    let _provider = LoadedProvider::load();
}

#[test]
fn test_provider_init_rejects_null_out() {
    let mut provctx: VOID_PTR = std::ptr::null_mut();
    let result = unsafe {
        ossl_param_provider_shared::OSSL_provider_init(
            std::ptr::null(),
            std::ptr::null(),
            std::ptr::null_mut(),
            &mut provctx,
        )
    };
    assert_eq!(result, OSSL_ERROR);
}

// Checks if the provider returns the expected list in the gettable param
// structure
#[test]
fn test_provider_gettable_param() {
    let provider = LoadedProvider::load();
    let gettable_params = provider.gettable_params();
    unsafe {
        assert_eq!(
            table_keys(gettable_params),
            ["name", "version", "buildinfo", "status"]
        );

        // Checks if the returned structure contains OSSL_PROV_PARAM_STATUS
        let status = ossl_returns_nonnull(locate(
            gettable_params as *mut OSSL_PARAM,
            OSSL_PROV_PARAM_STATUS,
        ))
        .unwrap();
        assert_eq!((*status).data_type, OSSL_PARAM_INTEGER);
        assert!(!modified(&*status));
    }
}

// Reads the provider status into a caller owned integer
#[test]
fn test_provider_status() {
    let provider = LoadedProvider::load();
    let mut status: std::os::raw::c_int = 0;
    let mut params = [
        construct_int(OSSL_PROV_PARAM_STATUS, &mut status),
        construct_end(),
    ];
    assert_eq!(provider.get_params(&mut params), OSSL_SUCCESS);
    assert_eq!(status, 1);
    assert_eq!(params[0].return_size, 4);
}

// Fetches the provider name in two passes: a size query without a buffer, then
// a fill into a buffer of the reported size
#[test]
fn test_provider_name_negotiation() {
    let provider = LoadedProvider::load();

    let mut query = [
        construct_query(OSSL_PROV_PARAM_NAME, DataType::Utf8Ptr),
        construct_query(OSSL_PROV_PARAM_VERSION, DataType::Utf8Ptr),
        construct_end(),
    ];
    assert_eq!(provider.get_params(&mut query), OSSL_SUCCESS);
    let name_len = query[0].return_size;
    let version_len = query[1].return_size;
    assert_eq!(name_len, "ossl-param-provider".len());

    // One spare byte for the terminator
    let mut name = vec![0u8; name_len + 1];
    let mut version = vec![0u8; version_len];
    let mut fill = [
        construct_utf8_ptr(OSSL_PROV_PARAM_NAME, &mut name),
        construct_utf8_ptr(OSSL_PROV_PARAM_VERSION, &mut version),
        construct_end(),
    ];
    assert_eq!(provider.get_params(&mut fill), OSSL_SUCCESS);
    assert_eq!(fill[0].return_size, name_len);
    assert_eq!(fill[1].return_size, version_len);

    let name = CStr::from_bytes_until_nul(&name).unwrap();
    assert_eq!(name.to_str().unwrap(), "ossl-param-provider");
    assert_eq!(std::str::from_utf8(&version).unwrap(), "0.1.0");
}

// A buffer too short for the name is refused and left as it was, with the
// size the name needs reported back
#[test]
fn test_provider_name_buffer_too_small() {
    let provider = LoadedProvider::load();
    let mut name = [0xffu8; 4];
    let mut status: std::os::raw::c_int = 0;
    let mut params = [
        construct_utf8_ptr(OSSL_PROV_PARAM_NAME, &mut name),
        construct_int(OSSL_PROV_PARAM_STATUS, &mut status),
        construct_end(),
    ];
    assert_eq!(provider.get_params(&mut params), OSSL_ERROR);
    assert_eq!(name, [0xffu8; 4]);
    assert_eq!(params[0].return_size, "ossl-param-provider".len());

    // The other entries are still answered
    assert_eq!(status, 1);
    assert!(modified(&params[1]));
}

// Keys the provider does not know are left untouched
#[test]
fn test_provider_ignores_unknown_keys() {
    let provider = LoadedProvider::load();
    let mut keylen: std::os::raw::c_int = -1;
    let mut params = [
        construct_int(OSSL_CIPHER_PARAM_KEYLEN, &mut keylen),
        construct_end(),
    ];
    assert_eq!(provider.get_params(&mut params), OSSL_SUCCESS);
    assert_eq!(keylen, -1);
    assert!(!modified(&params[0]));
}

#[test]
fn test_provider_query_operation() {
    let provider = LoadedProvider::load();

    let cipher = provider.query(OSSL_OP_CIPHER).unwrap();
    assert!(cipher.names.contains("AES-256-CBC"));

    let digest = provider.query(OSSL_OP_DIGEST).unwrap();
    assert!(digest.names.contains("SHAKE256"));

    assert!(provider.query(OSSL_OP_KDF).is_none());
}
