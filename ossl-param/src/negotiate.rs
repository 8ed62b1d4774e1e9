// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

// Two-pass retrieval for values whose size the caller cannot know: a first
// call with no buffer learns the size, a second call with a buffer of that
// size receives the value. Callers that know an upper bound can skip the
// first pass and hand over a buffer directly.

use crate::param::Buffer;
use crate::{DataType, Error, Param, ParamArray, ParamProvider, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No buffer yet, waiting for the provider to report the size.
    Query,
    /// Size known, buffer allocated, waiting for the value.
    Sized,
    /// Value received.
    Filled,
}

#[derive(Debug)]
pub struct Negotiation<'k> {
    key: &'k str,
    data_type: DataType,
    phase: Phase,
    required: usize,
}

impl<'k> Negotiation<'k> {
    pub fn new(key: &'k str, data_type: DataType) -> Self {
        Negotiation {
            key,
            data_type,
            phase: Phase::Query,
            required: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Size reported by the provider during the query pass.
    pub fn required_size(&self) -> Option<usize> {
        match self.phase {
            Phase::Query => None,
            Phase::Sized | Phase::Filled => Some(self.required),
        }
    }

    pub fn query_param(&self) -> Param<'k> {
        Param::query(self.key, self.data_type)
    }

    /// Records the size the provider answered the query with.
    pub fn sized(&mut self, answered: &Param<'_>) -> Result<usize> {
        let required = answered
            .used_size()
            .ok_or_else(|| Error::UnknownKey(self.key.to_string()))?;
        log::debug!("\"{}\" needs {} bytes", self.key, required);
        self.required = required;
        self.phase = Phase::Sized;
        Ok(required)
    }

    /// The parameter for the fill pass, writing into `buffer` after sizing it.
    pub fn fill_param<'b>(&self, buffer: &'b mut Vec<u8>) -> Result<Param<'b>>
    where
        'k: 'b,
    {
        if self.phase != Phase::Sized {
            return Err(Error::NoData(self.key.to_string()));
        }
        buffer.clear();
        buffer.resize(self.required, 0);
        Ok(Param::from_parts(
            self.key,
            self.data_type,
            Buffer::Borrowed(buffer.as_mut_slice()),
            None,
        ))
    }

    /// Completes the exchange, returning the size of the received value.
    pub fn filled(&mut self, param: &Param<'_>) -> Result<usize> {
        let used = param
            .used_size()
            .ok_or_else(|| Error::NoData(self.key.to_string()))?;
        if used != self.required {
            log::warn!(
                "\"{}\" was announced as {} bytes but {} were written",
                self.key,
                self.required,
                used
            );
        }
        self.phase = Phase::Filled;
        Ok(used)
    }
}

/// Fetches the raw value of `key` from `provider` in two passes.
pub fn fetch<P: ParamProvider + ?Sized>(
    provider: &P,
    key: &str,
    data_type: DataType,
) -> Result<Vec<u8>> {
    let mut negotiation = Negotiation::new(key, data_type);

    let mut query = ParamArray::new(vec![negotiation.query_param()]);
    provider.get_params(&mut query)?;
    negotiation.sized(query.locate(key)?)?;

    let mut buffer = Vec::new();
    let used = {
        let mut fill = ParamArray::new(vec![negotiation.fill_param(&mut buffer)?]);
        provider.get_params(&mut fill)?;
        negotiation.filled(fill.locate(key)?)?
    };
    buffer.truncate(used);
    Ok(buffer)
}

pub fn fetch_string<P: ParamProvider + ?Sized>(provider: &P, key: &str) -> Result<String> {
    let bytes = fetch(provider, key, DataType::Utf8Ptr)?;
    String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8(key.to_string()))
}

pub fn fetch_octets<P: ParamProvider + ?Sized>(provider: &P, key: &str) -> Result<Vec<u8>> {
    fetch(provider, key, DataType::OctetPtr)
}

/// Fetches every gettable parameter of `provider`, sizing them all in one
/// query pass and filling them all in one fill pass. Parameters the provider
/// did not answer are left out.
pub fn fetch_all<P: ParamProvider + ?Sized>(
    provider: &P,
) -> Result<Vec<(&'static str, Vec<u8>)>> {
    let table = provider.gettable_params();
    let mut query = ParamArray::query(table);
    provider.get_params(&mut query)?;

    let answered: Vec<_> = table
        .iter()
        .zip(query.iter())
        .filter_map(|(info, param)| param.used_size().map(|size| (*info, size)))
        .collect();

    let mut buffers: Vec<Vec<u8>> = answered.iter().map(|(_, size)| vec![0; *size]).collect();
    let used: Vec<Option<usize>> = {
        let mut fill: ParamArray = answered
            .iter()
            .zip(buffers.iter_mut())
            .map(|((info, _), buffer)| {
                Param::from_parts(
                    info.key(),
                    info.data_type,
                    Buffer::Borrowed(buffer.as_mut_slice()),
                    None,
                )
            })
            .collect();
        provider.get_params(&mut fill)?;
        fill.iter().map(Param::used_size).collect()
    };

    Ok(answered
        .into_iter()
        .zip(buffers.into_iter().zip(used))
        .filter_map(|((info, _), (mut buffer, used))| {
            used.map(|used| {
                buffer.truncate(used);
                (info.key(), buffer)
            })
        })
        .collect())
}

#[test]
fn test_iv_negotiation() {
    use crate::provider::test_provider::TestCipher;

    let iv: Vec<u8> = (0u8..16).collect();
    let cipher = TestCipher { iv: iv.clone() };

    let mut negotiation = Negotiation::new("iv", DataType::OctetPtr);
    assert_eq!(negotiation.phase(), Phase::Query);

    let mut query = ParamArray::new(vec![negotiation.query_param()]);
    cipher.get_params(&mut query).unwrap();
    let queried = query.locate("iv").unwrap();
    assert_eq!(queried.used_size(), Some(16));
    assert!(queried.is_query());
    assert_eq!(negotiation.sized(queried).unwrap(), 16);
    assert_eq!(negotiation.phase(), Phase::Sized);

    let mut buffer = Vec::new();
    {
        let mut fill = ParamArray::new(vec![negotiation.fill_param(&mut buffer).unwrap()]);
        cipher.get_params(&mut fill).unwrap();
        let filled = fill.locate("iv").unwrap();
        assert_eq!(filled.as_bytes().unwrap(), iv.as_slice());
        assert_eq!(negotiation.filled(filled).unwrap(), 16);
    }
    assert_eq!(negotiation.phase(), Phase::Filled);
    assert_eq!(negotiation.required_size(), Some(16));
    assert_eq!(buffer, iv);
}

#[test]
fn test_query_never_fails_for_size() {
    use crate::provider::test_provider::TestCipher;

    let cipher = TestCipher { iv: vec![1; 64] };
    let mut query = ParamArray::new(vec![Param::query("iv", DataType::OctetPtr)]);
    cipher.get_params(&mut query).unwrap();
    assert_eq!(query.locate("iv").unwrap().used_size(), Some(64));
}

#[test]
fn test_fill_with_short_buffer() {
    use crate::provider::test_provider::TestCipher;

    let cipher = TestCipher { iv: vec![5; 16] };
    let mut buffer = [0u8; 15];
    let err = {
        let mut fill = ParamArray::new(vec![Param::output("iv", DataType::OctetPtr, &mut buffer)]);
        let err = cipher.get_params(&mut fill).unwrap_err();
        // The short buffer learns the size a retry needs
        assert_eq!(fill.locate("iv").unwrap().used_size(), Some(16));
        err
    };
    assert_eq!(err.required_size(), Some(16));
    assert_eq!(buffer, [0u8; 15]);
}

#[test]
fn test_fill_before_query_is_refused() {
    let negotiation = Negotiation::new("iv", DataType::OctetPtr);
    let mut buffer = Vec::new();
    assert!(negotiation.fill_param(&mut buffer).is_err());
}

#[test]
fn test_fetch_helpers() {
    use crate::provider::test_provider::TestCipher;

    let cipher = TestCipher { iv: vec![3; 12] };
    assert_eq!(fetch_octets(&cipher, "iv").unwrap(), vec![3; 12]);
    assert_eq!(fetch_string(&cipher, "mode").unwrap(), "CBC");
    assert_eq!(
        fetch(&cipher, "keylen", DataType::Int).unwrap(),
        32i32.to_ne_bytes().to_vec()
    );
    assert_eq!(
        fetch(&cipher, "ivlen", DataType::Int),
        Err(Error::UnknownKey("ivlen".into()))
    );
}

#[test]
fn test_fetch_all() {
    use crate::provider::test_provider::TestCipher;

    let cipher = TestCipher { iv: vec![7; 16] };
    let values = fetch_all(&cipher).unwrap();
    let keys: Vec<_> = values.iter().map(|(key, _)| *key).collect();
    assert_eq!(keys, ["keylen", "mode", "iv"]);
    assert_eq!(values[1].1, b"CBC");
    assert_eq!(values[2].1, vec![7; 16]);
}
