// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

use e2e_tests::*;
use std::os::raw::{c_int, c_uint};

fn new_ctx(digest: &Algorithm) -> VOID_PTR {
    let ctx = unsafe {
        let newctx: NewCtxFn = digest.function(OSSL_FUNC_DIGEST_NEWCTX);
        newctx(digest.provctx())
    };
    assert!(!ctx.is_null());
    ctx
}

fn free_ctx(digest: &Algorithm, ctx: VOID_PTR) {
    unsafe {
        let freectx: FreeCtxFn = digest.function(OSSL_FUNC_DIGEST_FREECTX);
        freectx(ctx);
    }
}

#[test]
fn test_digest_block_size() {
    let provider = LoadedProvider::load();
    let digest = provider.query(OSSL_OP_DIGEST).unwrap();

    let mut blocksize: usize = 0;
    let mut params = [
        construct_size_t(OSSL_DIGEST_PARAM_BLOCK_SIZE, &mut blocksize),
        construct_end(),
    ];
    unsafe {
        let get_params: AlgorithmGetParamsFn = digest.function(OSSL_FUNC_DIGEST_GET_PARAMS);
        assert_eq!(get_params(params.as_mut_ptr()), OSSL_SUCCESS);
    }
    assert_eq!(blocksize, 136);
}

// xoflen starts at 32 and can be narrowed into a 4 byte unsigned integer
#[test]
fn test_digest_xoflen() {
    let provider = LoadedProvider::load();
    let digest = provider.query(OSSL_OP_DIGEST).unwrap();
    let ctx = new_ctx(&digest);

    let (get_ctx_params, set_ctx_params): (GetParamsFn, SetParamsFn) = unsafe {
        (
            digest.function(OSSL_FUNC_DIGEST_GET_CTX_PARAMS),
            digest.function(OSSL_FUNC_DIGEST_SET_CTX_PARAMS),
        )
    };

    let mut xoflen: c_uint = 0;
    let mut params = [
        construct_uint(OSSL_DIGEST_PARAM_XOFLEN, &mut xoflen),
        construct_end(),
    ];
    assert_eq!(unsafe { get_ctx_params(ctx, params.as_mut_ptr()) }, OSSL_SUCCESS);
    assert_eq!(xoflen, 32);
    assert_eq!(params[0].return_size, 4);

    let mut xoflen: c_uint = 64;
    let params = [
        construct_uint(OSSL_DIGEST_PARAM_XOFLEN, &mut xoflen),
        construct_end(),
    ];
    assert_eq!(unsafe { set_ctx_params(ctx, params.as_ptr()) }, OSSL_SUCCESS);

    // Zero is not a usable output length and leaves the setting alone
    let mut zero: c_uint = 0;
    let params = [construct_uint(OSSL_DIGEST_PARAM_XOFLEN, &mut zero), construct_end()];
    assert_eq!(unsafe { set_ctx_params(ctx, params.as_ptr()) }, OSSL_ERROR);

    let mut xoflen: usize = 0;
    let mut params = [
        construct_size_t(OSSL_DIGEST_PARAM_XOFLEN, &mut xoflen),
        construct_end(),
    ];
    assert_eq!(unsafe { get_ctx_params(ctx, params.as_mut_ptr()) }, OSSL_SUCCESS);
    assert_eq!(xoflen, 64);

    free_ctx(&digest, ctx);
}

#[test]
fn test_digest_micalg_negotiation() {
    let provider = LoadedProvider::load();
    let digest = provider.query(OSSL_OP_DIGEST).unwrap();
    let ctx = new_ctx(&digest);
    let get_ctx_params: GetParamsFn =
        unsafe { digest.function(OSSL_FUNC_DIGEST_GET_CTX_PARAMS) };

    let mut query = [
        construct_query(OSSL_DIGEST_PARAM_MICALG, DataType::Utf8String),
        construct_end(),
    ];
    assert_eq!(unsafe { get_ctx_params(ctx, query.as_mut_ptr()) }, OSSL_SUCCESS);
    assert_eq!(query[0].return_size, "shake256".len());

    // Exactly the reported size, without room for a terminator
    let mut micalg = vec![0u8; query[0].return_size];
    let mut fill = [
        construct_utf8_string(OSSL_DIGEST_PARAM_MICALG, &mut micalg),
        construct_end(),
    ];
    assert_eq!(unsafe { get_ctx_params(ctx, fill.as_mut_ptr()) }, OSSL_SUCCESS);
    assert_eq!(micalg, b"shake256");

    free_ctx(&digest, ctx);
}

// The SSLv3 master secret is accepted but never read back
#[test]
fn test_digest_ssl3_ms_is_write_only() {
    let provider = LoadedProvider::load();
    let digest = provider.query(OSSL_OP_DIGEST).unwrap();
    let ctx = new_ctx(&digest);

    let mut secret = [0x42u8; 48];
    let mut pad_type: c_int = 1;
    let params = [
        construct_octet_string(OSSL_DIGEST_PARAM_SSL3_MS, &mut secret),
        construct_int(OSSL_DIGEST_PARAM_PAD_TYPE, &mut pad_type),
        construct_end(),
    ];
    unsafe {
        let set_ctx_params: SetParamsFn = digest.function(OSSL_FUNC_DIGEST_SET_CTX_PARAMS);
        assert_eq!(set_ctx_params(ctx, params.as_ptr()), OSSL_SUCCESS);
    }

    let mut out = [0u8; 48];
    let mut pad_type: c_int = 0;
    let mut params = [
        construct_octet_string(OSSL_DIGEST_PARAM_SSL3_MS, &mut out),
        construct_int(OSSL_DIGEST_PARAM_PAD_TYPE, &mut pad_type),
        construct_end(),
    ];
    unsafe {
        let get_ctx_params: GetParamsFn = digest.function(OSSL_FUNC_DIGEST_GET_CTX_PARAMS);
        assert_eq!(get_ctx_params(ctx, params.as_mut_ptr()), OSSL_SUCCESS);
    }
    assert_eq!(out, [0u8; 48]);
    assert!(!modified(&params[0]));
    assert_eq!(pad_type, 1);

    unsafe {
        let settable: CtxGettableFn = digest.function(OSSL_FUNC_DIGEST_SETTABLE_CTX_PARAMS);
        let keys = table_keys(settable(ctx, digest.provctx()));
        assert_eq!(keys, ["xoflen", "pad_type", "ssl3-ms"]);

        let gettable: CtxGettableFn = digest.function(OSSL_FUNC_DIGEST_GETTABLE_CTX_PARAMS);
        let keys = table_keys(gettable(ctx, digest.provctx()));
        assert!(!keys.iter().any(|key| key == "ssl3-ms"));
    }

    free_ctx(&digest, ctx);
}

#[test]
fn test_digest_dupctx() {
    let provider = LoadedProvider::load();
    let digest = provider.query(OSSL_OP_DIGEST).unwrap();
    let ctx = new_ctx(&digest);

    let mut xoflen: usize = 48;
    let params = [
        construct_size_t(OSSL_DIGEST_PARAM_XOFLEN, &mut xoflen),
        construct_end(),
    ];
    let dup = unsafe {
        let set_ctx_params: SetParamsFn = digest.function(OSSL_FUNC_DIGEST_SET_CTX_PARAMS);
        assert_eq!(set_ctx_params(ctx, params.as_ptr()), OSSL_SUCCESS);
        let dupctx: NewCtxFn = digest.function(OSSL_FUNC_DIGEST_DUPCTX);
        dupctx(ctx)
    };
    assert!(!dup.is_null());
    free_ctx(&digest, ctx);

    let mut out: usize = 0;
    let mut params = [construct_size_t(OSSL_DIGEST_PARAM_XOFLEN, &mut out), construct_end()];
    unsafe {
        let get_ctx_params: GetParamsFn = digest.function(OSSL_FUNC_DIGEST_GET_CTX_PARAMS);
        assert_eq!(get_ctx_params(dup, params.as_mut_ptr()), OSSL_SUCCESS);
    }
    assert_eq!(out, 48);

    free_ctx(&digest, dup);
}
