// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

use crate::{DataType, ParamArray, Result};

/// A parameter a provider can be asked for or configured with.
///
/// Tables of these end with [`ParamInfo::END`] so they can be handed over the
/// C ABI as they are, see [`raw_table`](crate::raw::raw_table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamInfo {
    name: &'static [u8],
    pub data_type: DataType,
}

impl ParamInfo {
    pub const END: ParamInfo = ParamInfo {
        name: b"\0",
        data_type: DataType::Int,
    };

    /// `name` is the NUL-terminated key.
    pub const fn new(name: &'static [u8], data_type: DataType) -> Self {
        ParamInfo { name, data_type }
    }

    pub fn key(&self) -> &'static str {
        let name = self.name.strip_suffix(b"\0").unwrap_or(self.name);
        std::str::from_utf8(name).unwrap_or_default()
    }

    /// The NUL-terminated key.
    pub const fn name(&self) -> &'static [u8] {
        self.name
    }

    pub fn is_end(&self) -> bool {
        self.key().is_empty()
    }
}

/// Direction of a parameter exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// The provider fills in the entries it knows.
    Get,
    /// The provider takes its configuration from the entries it knows.
    Set,
}

/// The parameter surface of a provider object (a provider, a cipher or
/// digest context, ...).
///
/// Implementations answer the keys they know and leave the others alone.
/// A failure on one key does not stop the others from being handled; all
/// failures are reported once the array has been walked.
pub trait ParamProvider {
    /// Parameters [`ParamProvider::get_params`] can answer.
    fn gettable_params(&self) -> &'static [ParamInfo];

    fn get_params(&self, params: &mut ParamArray<'_>) -> Result<()>;

    /// Parameters [`ParamProvider::set_params`] accepts.
    fn settable_params(&self) -> &'static [ParamInfo] {
        &[]
    }

    fn set_params(&mut self, params: &ParamArray<'_>) -> Result<()> {
        let _ = params;
        Ok(())
    }
}

/// Runs one exchange against `provider`.
pub fn exchange<P: ParamProvider + ?Sized>(
    provider: &mut P,
    operation: Operation,
    params: &mut ParamArray<'_>,
) -> Result<()> {
    log::trace!(
        "{:?} exchange over {} parameter(s)",
        operation,
        params.len()
    );
    match operation {
        Operation::Get => provider.get_params(params),
        Operation::Set => provider.set_params(params),
    }
}

/// Looks up the declared type of `key` in a provider table.
pub fn lookup_info(table: &[ParamInfo], key: &str) -> Option<ParamInfo> {
    table
        .iter()
        .take_while(|info| !info.is_end())
        .find(|info| info.key() == key)
        .copied()
}

#[cfg(test)]
pub(crate) mod test_provider {
    use super::*;
    use crate::names::*;
    use ossl_param_sys::param::*;

    /// Answers `keylen`, `mode` and `iv`; accepts `iv`.
    pub struct TestCipher {
        pub iv: Vec<u8>,
    }

    const GETTABLE: &[ParamInfo] = &[
        ParamInfo::new(OSSL_CIPHER_PARAM_KEYLEN, DataType::Int),
        ParamInfo::new(OSSL_CIPHER_PARAM_MODE, DataType::Utf8String),
        ParamInfo::new(OSSL_CIPHER_PARAM_IV, DataType::OctetPtr),
        ParamInfo::END,
    ];

    impl ParamProvider for TestCipher {
        fn gettable_params(&self) -> &'static [ParamInfo] {
            GETTABLE
        }

        fn get_params(&self, params: &mut ParamArray<'_>) -> Result<()> {
            params.try_for_each_mut(|param| match param.key() {
                CIPHER_PARAM_KEYLEN => param.set(&32i32),
                CIPHER_PARAM_MODE => param.set("CBC"),
                CIPHER_PARAM_IV => param.set(self.iv.as_slice()),
                _ => Ok(()),
            })
        }

        fn settable_params(&self) -> &'static [ParamInfo] {
            &GETTABLE[2..]
        }

        fn set_params(&mut self, params: &ParamArray<'_>) -> Result<()> {
            if let Some(iv) = params.find(CIPHER_PARAM_IV) {
                self.iv = iv.as_bytes()?.to_vec();
            }
            Ok(())
        }
    }
}

#[test]
fn test_exchange_dispatches_on_operation() {
    use crate::Param;
    use test_provider::TestCipher;

    let mut cipher = TestCipher { iv: vec![0; 16] };
    let iv = [9u8; 16];
    let mut set: ParamArray = vec![Param::borrowed("iv", DataType::OctetPtr, &iv).unwrap()].into();
    exchange(&mut cipher, Operation::Set, &mut set).unwrap();
    assert_eq!(cipher.iv, iv);

    let mut get: ParamArray = vec![Param::with_capacity("keylen", DataType::Int, 4)].into();
    exchange(&mut cipher, Operation::Get, &mut get).unwrap();
    assert_eq!(get.get::<i32>("keylen").unwrap(), 32);
}

#[test]
fn test_lookup_info() {
    use test_provider::TestCipher;

    let cipher = TestCipher { iv: vec![] };
    let info = lookup_info(cipher.gettable_params(), "mode").unwrap();
    assert_eq!(info.data_type, DataType::Utf8String);
    assert!(lookup_info(cipher.settable_params(), "mode").is_none());
    assert!(lookup_info(cipher.gettable_params(), "").is_none());
    assert_eq!(ParamInfo::END.key(), "");
}
