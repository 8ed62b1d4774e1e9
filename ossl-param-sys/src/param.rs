// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

// Parameter names that Providers can define
pub const OSSL_PROV_PARAM_NAME: &[u8; 5] = b"name\0";
pub const OSSL_PROV_PARAM_VERSION: &[u8; 8] = b"version\0";
pub const OSSL_PROV_PARAM_BUILDINFO: &[u8; 10] = b"buildinfo\0";
pub const OSSL_PROV_PARAM_STATUS: &[u8; 7] = b"status\0";

// Well known cipher parameters
pub const OSSL_CIPHER_PARAM_PADDING: &[u8; 8] = b"padding\0";
pub const OSSL_CIPHER_PARAM_MODE: &[u8; 5] = b"mode\0";
pub const OSSL_CIPHER_PARAM_BLOCK_SIZE: &[u8; 10] = b"blocksize\0";
pub const OSSL_CIPHER_PARAM_FLAGS: &[u8; 6] = b"flags\0";
pub const OSSL_CIPHER_PARAM_KEYLEN: &[u8; 7] = b"keylen\0";
pub const OSSL_CIPHER_PARAM_IVLEN: &[u8; 6] = b"ivlen\0";
pub const OSSL_CIPHER_PARAM_IV: &[u8; 3] = b"iv\0";
pub const OSSL_CIPHER_PARAM_NUM: &[u8; 4] = b"num\0";

// Digest parameters
pub const OSSL_DIGEST_PARAM_XOFLEN: &[u8; 7] = b"xoflen\0";
pub const OSSL_DIGEST_PARAM_SSL3_MS: &[u8; 8] = b"ssl3-ms\0";
pub const OSSL_DIGEST_PARAM_PAD_TYPE: &[u8; 9] = b"pad_type\0";
pub const OSSL_DIGEST_PARAM_MICALG: &[u8; 7] = b"micalg\0";
pub const OSSL_DIGEST_PARAM_BLOCK_SIZE: &[u8; 10] = b"blocksize\0";
