// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

//! Well known parameter names. Adding a name is backwards compatible;
//! renaming or retyping one breaks every provider using it.

// Provider parameters
/// Printable provider name, UTF-8.
pub const PROV_PARAM_NAME: &str = "name";
/// Provider version, UTF-8.
pub const PROV_PARAM_VERSION: &str = "version";
/// Provider specific build information, UTF-8.
pub const PROV_PARAM_BUILDINFO: &str = "buildinfo";
/// Provider status, integer (1 when usable).
pub const PROV_PARAM_STATUS: &str = "status";

// Cipher parameters
/// Unsigned integer, non-zero when padding is enabled.
pub const CIPHER_PARAM_PADDING: &str = "padding";
pub const CIPHER_PARAM_MODE: &str = "mode";
/// Integer.
pub const CIPHER_PARAM_BLOCK_SIZE: &str = "blocksize";
/// Unsigned integer.
pub const CIPHER_PARAM_FLAGS: &str = "flags";
/// Integer.
pub const CIPHER_PARAM_KEYLEN: &str = "keylen";
/// Integer.
pub const CIPHER_PARAM_IVLEN: &str = "ivlen";
/// Octet pointer.
pub const CIPHER_PARAM_IV: &str = "iv";
/// Integer.
pub const CIPHER_PARAM_NUM: &str = "num";

// Digest parameters
pub const DIGEST_PARAM_XOFLEN: &str = "xoflen";
pub const DIGEST_PARAM_SSL3_MS: &str = "ssl3-ms";
pub const DIGEST_PARAM_PAD_TYPE: &str = "pad_type";
pub const DIGEST_PARAM_MICALG: &str = "micalg";
/// Unsigned integer.
pub const DIGEST_PARAM_BLOCK_SIZE: &str = "blocksize";

#[test]
fn test_names_match_abi_names() {
    use ossl_param_sys::param::*;
    use std::ffi::CStr;

    let pairs: [(&str, &[u8]); 17] = [
        (PROV_PARAM_NAME, OSSL_PROV_PARAM_NAME),
        (PROV_PARAM_VERSION, OSSL_PROV_PARAM_VERSION),
        (PROV_PARAM_BUILDINFO, OSSL_PROV_PARAM_BUILDINFO),
        (PROV_PARAM_STATUS, OSSL_PROV_PARAM_STATUS),
        (CIPHER_PARAM_PADDING, OSSL_CIPHER_PARAM_PADDING),
        (CIPHER_PARAM_MODE, OSSL_CIPHER_PARAM_MODE),
        (CIPHER_PARAM_BLOCK_SIZE, OSSL_CIPHER_PARAM_BLOCK_SIZE),
        (CIPHER_PARAM_FLAGS, OSSL_CIPHER_PARAM_FLAGS),
        (CIPHER_PARAM_KEYLEN, OSSL_CIPHER_PARAM_KEYLEN),
        (CIPHER_PARAM_IVLEN, OSSL_CIPHER_PARAM_IVLEN),
        (CIPHER_PARAM_IV, OSSL_CIPHER_PARAM_IV),
        (CIPHER_PARAM_NUM, OSSL_CIPHER_PARAM_NUM),
        (DIGEST_PARAM_XOFLEN, OSSL_DIGEST_PARAM_XOFLEN),
        (DIGEST_PARAM_SSL3_MS, OSSL_DIGEST_PARAM_SSL3_MS),
        (DIGEST_PARAM_PAD_TYPE, OSSL_DIGEST_PARAM_PAD_TYPE),
        (DIGEST_PARAM_MICALG, OSSL_DIGEST_PARAM_MICALG),
        (DIGEST_PARAM_BLOCK_SIZE, OSSL_DIGEST_PARAM_BLOCK_SIZE),
    ];
    for (name, abi_name) in pairs {
        let abi_name = CStr::from_bytes_with_nul(abi_name).unwrap();
        assert_eq!(abi_name.to_str().unwrap(), name);
        assert!(name.is_ascii());
    }
}
