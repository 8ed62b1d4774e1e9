// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

use e2e_tests::*;
use std::os::raw::{c_int, c_uint};

struct CipherCtx<'a> {
    algorithm: &'a Algorithm,
    ctx: VOID_PTR,
}

impl<'a> CipherCtx<'a> {
    fn new(algorithm: &'a Algorithm) -> Self {
        let ctx = unsafe {
            let newctx: NewCtxFn = algorithm.function(OSSL_FUNC_CIPHER_NEWCTX);
            newctx(algorithm.provctx())
        };
        assert!(!ctx.is_null());
        CipherCtx { algorithm, ctx }
    }

    fn dup(&self) -> Self {
        let ctx = unsafe {
            let dupctx: NewCtxFn = self.algorithm.function(OSSL_FUNC_CIPHER_DUPCTX);
            dupctx(self.ctx)
        };
        assert!(!ctx.is_null());
        CipherCtx {
            algorithm: self.algorithm,
            ctx,
        }
    }

    fn get(&self, params: &mut [OSSL_PARAM]) -> c_int {
        unsafe {
            let get_ctx_params: GetParamsFn =
                self.algorithm.function(OSSL_FUNC_CIPHER_GET_CTX_PARAMS);
            get_ctx_params(self.ctx, params.as_mut_ptr())
        }
    }

    fn set(&self, params: &[OSSL_PARAM]) -> c_int {
        unsafe {
            let set_ctx_params: SetParamsFn =
                self.algorithm.function(OSSL_FUNC_CIPHER_SET_CTX_PARAMS);
            set_ctx_params(self.ctx, params.as_ptr())
        }
    }
}

impl Drop for CipherCtx<'_> {
    fn drop(&mut self) {
        unsafe {
            let freectx: FreeCtxFn = self.algorithm.function(OSSL_FUNC_CIPHER_FREECTX);
            freectx(self.ctx);
        }
    }
}

#[test]
fn test_cipher_algorithm_params() {
    let provider = LoadedProvider::load();
    let cipher = provider.query(OSSL_OP_CIPHER).unwrap();

    let mut keylen: c_int = 0;
    let mut ivlen: c_int = 0;
    let mut blocksize: c_int = 0;
    let mut mode = [0u8; 8];
    let mut params = [
        construct_int(OSSL_CIPHER_PARAM_KEYLEN, &mut keylen),
        construct_int(OSSL_CIPHER_PARAM_IVLEN, &mut ivlen),
        construct_int(OSSL_CIPHER_PARAM_BLOCK_SIZE, &mut blocksize),
        construct_utf8_string(OSSL_CIPHER_PARAM_MODE, &mut mode),
        construct_end(),
    ];
    unsafe {
        let get_params: AlgorithmGetParamsFn = cipher.function(OSSL_FUNC_CIPHER_GET_PARAMS);
        assert_eq!(get_params(params.as_mut_ptr()), OSSL_SUCCESS);
    }
    assert_eq!((keylen, ivlen, blocksize), (32, 16, 16));
    assert_eq!(params[0].return_size, 4);
    assert_eq!(&mode[..4], b"CBC\0");
}

// keylen written into a 4 byte integer reads back as 32 with a used size of 4
#[test]
fn test_cipher_keylen() {
    let provider = LoadedProvider::load();
    let cipher = provider.query(OSSL_OP_CIPHER).unwrap();
    let ctx = CipherCtx::new(&cipher);

    let mut keylen: c_int = 0;
    let mut params = [
        construct_int(OSSL_CIPHER_PARAM_KEYLEN, &mut keylen),
        construct_end(),
    ];
    assert_eq!(ctx.get(&mut params), OSSL_SUCCESS);
    assert_eq!(keylen, 32);
    assert_eq!(params[0].return_size, 4);

    // Only the AES-256 key length is accepted
    let mut keylen: c_int = 16;
    let params = [
        construct_int(OSSL_CIPHER_PARAM_KEYLEN, &mut keylen),
        construct_end(),
    ];
    assert_eq!(ctx.set(&params), OSSL_ERROR);
}

// The caller asks for the IV size, allocates that much and reads the IV
#[test]
fn test_cipher_iv_negotiation() {
    let provider = LoadedProvider::load();
    let cipher = provider.query(OSSL_OP_CIPHER).unwrap();
    let ctx = CipherCtx::new(&cipher);

    let mut iv: Vec<u8> = (0u8..16).collect();
    let set = [construct_octet_string(OSSL_CIPHER_PARAM_IV, &mut iv), construct_end()];
    assert_eq!(ctx.set(&set), OSSL_SUCCESS);

    let mut query = [
        construct_query(OSSL_CIPHER_PARAM_IV, DataType::OctetPtr),
        construct_end(),
    ];
    assert_eq!(ctx.get(&mut query), OSSL_SUCCESS);
    let required = query[0].return_size;
    assert_eq!(required, 16);

    let mut buffer = vec![0u8; required];
    let mut fill = [construct_octet_ptr(OSSL_CIPHER_PARAM_IV, &mut buffer), construct_end()];
    assert_eq!(ctx.get(&mut fill), OSSL_SUCCESS);
    assert_eq!(fill[0].return_size, required);
    assert_eq!(buffer, (0u8..16).collect::<Vec<_>>());
}

// A buffer smaller than the IV fails and is left untouched, but learns the
// size to allocate for a retry
#[test]
fn test_cipher_iv_buffer_too_small() {
    let provider = LoadedProvider::load();
    let cipher = provider.query(OSSL_OP_CIPHER).unwrap();
    let ctx = CipherCtx::new(&cipher);

    let mut buffer = [0x5au8; 15];
    let mut params = [construct_octet_ptr(OSSL_CIPHER_PARAM_IV, &mut buffer), construct_end()];
    assert_eq!(ctx.get(&mut params), OSSL_ERROR);
    assert_eq!(buffer, [0x5au8; 15]);
    assert_eq!(params[0].return_size, 16);

    let mut buffer = vec![0u8; params[0].return_size];
    let mut params = [construct_octet_ptr(OSSL_CIPHER_PARAM_IV, &mut buffer), construct_end()];
    assert_eq!(ctx.get(&mut params), OSSL_SUCCESS);
    assert_eq!(params[0].return_size, 16);
}

// An entry with a data type nobody knows fails the call, the entries around
// it are still answered
#[test]
fn test_cipher_params_around_unknown_type() {
    let provider = LoadedProvider::load();
    let cipher = provider.query(OSSL_OP_CIPHER).unwrap();

    let mut keylen: c_int = 0;
    let mut num: c_int = 0;
    let mut ivlen: c_int = 0;
    let mut params = [
        construct_int(OSSL_CIPHER_PARAM_KEYLEN, &mut keylen),
        construct_int(OSSL_CIPHER_PARAM_NUM, &mut num),
        construct_int(OSSL_CIPHER_PARAM_IVLEN, &mut ivlen),
        construct_end(),
    ];
    params[1].data_type = 42;
    unsafe {
        let get_params: AlgorithmGetParamsFn = cipher.function(OSSL_FUNC_CIPHER_GET_PARAMS);
        assert_eq!(get_params(params.as_mut_ptr()), OSSL_ERROR);
    }
    assert_eq!((keylen, ivlen), (32, 16));
    assert_eq!(params[0].return_size, 4);
    assert!(!modified(&params[1]));
    assert_eq!(params[2].return_size, 4);

    // Same on the way in: the valid padding setting is still applied
    let ctx = CipherCtx::new(&cipher);
    let mut padding: c_uint = 0;
    let mut bogus: c_int = 1;
    let mut params = [
        construct_int(OSSL_CIPHER_PARAM_NUM, &mut bogus),
        construct_uint(OSSL_CIPHER_PARAM_PADDING, &mut padding),
        construct_end(),
    ];
    params[0].data_type = 42;
    assert_eq!(ctx.set(&params), OSSL_ERROR);

    let mut padding: c_uint = 1;
    let mut params = [
        construct_uint(OSSL_CIPHER_PARAM_PADDING, &mut padding),
        construct_end(),
    ];
    assert_eq!(ctx.get(&mut params), OSSL_SUCCESS);
    assert_eq!(padding, 0);
}

// mode is text, asking for it as an integer is a type mismatch
#[test]
fn test_cipher_mode_as_integer() {
    let provider = LoadedProvider::load();
    let cipher = provider.query(OSSL_OP_CIPHER).unwrap();
    let ctx = CipherCtx::new(&cipher);

    let mut mode: c_int = 0;
    let mut params = [construct_int(OSSL_CIPHER_PARAM_MODE, &mut mode), construct_end()];
    assert_eq!(ctx.get(&mut params), OSSL_ERROR);
    assert_eq!(mode, 0);
}

#[test]
fn test_cipher_padding_and_dup() {
    let provider = LoadedProvider::load();
    let cipher = provider.query(OSSL_OP_CIPHER).unwrap();
    let ctx = CipherCtx::new(&cipher);

    let mut padding: c_uint = 0;
    let mut num: c_int = 7;
    let params = [
        construct_uint(OSSL_CIPHER_PARAM_PADDING, &mut padding),
        construct_int(OSSL_CIPHER_PARAM_NUM, &mut num),
        construct_end(),
    ];
    assert_eq!(ctx.set(&params), OSSL_SUCCESS);

    let dup = ctx.dup();
    let mut padding: c_uint = 1;
    let params = [
        construct_uint(OSSL_CIPHER_PARAM_PADDING, &mut padding),
        construct_end(),
    ];
    assert_eq!(ctx.set(&params), OSSL_SUCCESS);

    // The copy keeps the settings it was duplicated with
    let mut dup_padding: usize = 99;
    let mut dup_num: c_int = 0;
    let mut params = [
        construct_size_t(OSSL_CIPHER_PARAM_PADDING, &mut dup_padding),
        construct_int(OSSL_CIPHER_PARAM_NUM, &mut dup_num),
        construct_end(),
    ];
    assert_eq!(dup.get(&mut params), OSSL_SUCCESS);
    assert_eq!(dup_padding, 0);
    assert_eq!(dup_num, 7);
    assert_eq!(params[0].return_size, 8);
}

#[test]
fn test_cipher_settable_and_gettable_tables() {
    let provider = LoadedProvider::load();
    let cipher = provider.query(OSSL_OP_CIPHER).unwrap();
    unsafe {
        let gettable: CtxGettableFn = cipher.function(OSSL_FUNC_CIPHER_GETTABLE_CTX_PARAMS);
        let keys = table_keys(gettable(std::ptr::null_mut(), cipher.provctx()));
        assert_eq!(
            keys,
            ["keylen", "ivlen", "blocksize", "mode", "padding", "flags", "iv", "num"]
        );

        let settable: CtxGettableFn = cipher.function(OSSL_FUNC_CIPHER_SETTABLE_CTX_PARAMS);
        let keys = table_keys(settable(std::ptr::null_mut(), cipher.provctx()));
        assert_eq!(keys, ["padding", "iv", "num", "keylen"]);

        let gettable: GettableFn = cipher.function(OSSL_FUNC_CIPHER_GETTABLE_PARAMS);
        let keys = table_keys(gettable(cipher.provctx()));
        assert_eq!(keys, ["mode", "keylen", "ivlen", "blocksize", "flags"]);
    }
}
