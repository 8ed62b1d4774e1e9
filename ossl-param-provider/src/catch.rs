// Copyright (c) Microsoft. All rights reserved.

/**
MIT License

Copyright (c) Microsoft Corporation. All rights reserved.

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE
*/

// Derived from https://github.com/Azure/iot-identity-service/blob/91e0588/key/aziot-key-openssl-engine/src/lib.rs#L98

use std::panic::{catch_unwind, AssertUnwindSafe};

/// Catches the error, if any, from evaluating the given callback and converts it to a unit sentinel.
/// The error and its causes are logged, tagged with `function` when given.
/// A panic in the callback is caught and reported the same way.
///
/// Intended to be used at FFI boundaries, where a Rust error cannot pass through and must be converted to an integer, nullptr, etc.
pub fn r#catch<T>(
    function: Option<&'static str>,
    f: impl FnOnce() -> Result<T, Box<dyn std::error::Error>>,
) -> Result<T, ()> {
    let function = function.unwrap_or("ossl-param-provider");

    let err = match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(err)) => err,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|message| message.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::error!("[{}] panicked: {}", function, message);
            return Err(());
        }
    };

    log::error!("[{}] error: {}", function, err);

    let mut source = err.source();
    while let Some(err) = source {
        log::error!("[{}] caused by: {}", function, err);
        source = err.source();
    }

    Err(())
}

#[test]
fn test_catch_passes_values_through() {
    assert_eq!(r#catch(None, || Ok(1)), Ok(1));
}

#[test]
fn test_catch_converts_errors() {
    let result: Result<(), ()> = r#catch(Some("test"), || Err("failed".into()));
    assert_eq!(result, Err(()));

    let result: Result<(), ()> = r#catch(Some("test"), || {
        Err(ossl_param::Error::NoData("iv".into()).into())
    });
    assert_eq!(result, Err(()));
}

#[test]
fn test_catch_contains_panics() {
    let result: Result<i32, ()> = r#catch(Some("test"), || panic!("boom"));
    assert_eq!(result, Err(()));
}
