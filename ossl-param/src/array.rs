// Copyright 2024 Contributors to the Parsec project.
// SPDX-License-Identifier: Apache-2.0

use crate::value::{FromParam, ToParam};
use crate::{DataType, Error, Param, ParamInfo, Result};

/// An ordered set of parameters exchanged in a single call.
///
/// The array always ends with a terminator ([`Param::end`]); anything placed
/// after a terminator while building it is dropped. Once built, entries can
/// be read and written but not added or removed. Keys are matched exactly and
/// the first match wins, so a duplicated key shadows the later entries.
#[derive(Debug)]
pub struct ParamArray<'a> {
    params: Vec<Param<'a>>,
}

impl<'a> ParamArray<'a> {
    pub fn new(params: Vec<Param<'a>>) -> Self {
        let mut params = params;
        if let Some(end) = params.iter().position(Param::is_end) {
            params.truncate(end);
        }
        params.push(Param::end());
        ParamArray { params }
    }

    /// Size-query entries for every parameter in a provider's table, in order.
    pub fn query(table: &[ParamInfo]) -> ParamArray<'static> {
        table
            .iter()
            .map(|info| Param::query(info.key(), info.data_type))
            .collect()
    }

    /// Number of entries before the terminator.
    pub fn len(&self) -> usize {
        self.params.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param<'a>> {
        let len = self.len();
        self.params[..len].iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Param<'a>> {
        let len = self.len();
        self.params[..len].iter_mut()
    }

    pub fn find(&self, key: &str) -> Option<&Param<'a>> {
        self.iter().find(|param| param.key() == key)
    }

    pub fn find_mut(&mut self, key: &str) -> Option<&mut Param<'a>> {
        self.iter_mut().find(|param| param.key() == key)
    }

    /// Like [`ParamArray::find`], for callers that need the key to be there.
    pub fn locate(&self, key: &str) -> Result<&Param<'a>> {
        self.find(key)
            .ok_or_else(|| Error::UnknownKey(key.to_string()))
    }

    pub fn locate_mut(&mut self, key: &str) -> Result<&mut Param<'a>> {
        self.find_mut(key)
            .ok_or_else(|| Error::UnknownKey(key.to_string()))
    }

    pub fn for_each<F: FnMut(&Param<'a>)>(&self, f: F) {
        self.iter().for_each(f)
    }

    /// Visits every entry even when some of them fail, then reports the
    /// failures together.
    pub fn try_for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&Param<'a>) -> Result<()>,
    {
        let errors = self.iter().filter_map(|param| f(param).err()).collect();
        Error::collect(errors)
    }

    /// Like [`ParamArray::try_for_each`], with write access to the entries.
    pub fn try_for_each_mut<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut Param<'a>) -> Result<()>,
    {
        let errors = self
            .iter_mut()
            .filter_map(|param| f(param).err())
            .collect();
        Error::collect(errors)
    }

    /// Reads `key` as `T`.
    pub fn get<T: FromParam>(&self, key: &str) -> Result<T> {
        self.locate(key)?.get()
    }

    /// Reads `key` as `T`, requiring it to be declared `expected`.
    pub fn get_as<T: FromParam>(&self, key: &str, expected: DataType) -> Result<T> {
        self.locate(key)?.get_as(expected)
    }

    /// Writes `value` to `key` if the caller asked for it. Returns whether
    /// the key was present.
    pub fn set<T: ToParam + ?Sized>(&mut self, key: &str, value: &T) -> Result<bool> {
        match self.find_mut(key) {
            Some(param) => param.set(value).map(|_| true),
            None => Ok(false),
        }
    }

    /// True if any entry has been written.
    pub fn modified(&self) -> bool {
        self.iter().any(Param::modified)
    }
}

impl<'a> FromIterator<Param<'a>> for ParamArray<'a> {
    fn from_iter<I: IntoIterator<Item = Param<'a>>>(iter: I) -> Self {
        ParamArray::new(iter.into_iter().collect())
    }
}

impl<'a> From<Vec<Param<'a>>> for ParamArray<'a> {
    fn from(params: Vec<Param<'a>>) -> Self {
        ParamArray::new(params)
    }
}

impl<'s, 'a> IntoIterator for &'s ParamArray<'a> {
    type Item = &'s Param<'a>;
    type IntoIter = std::slice::Iter<'s, Param<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> std::ops::Index<usize> for ParamArray<'a> {
    type Output = Param<'a>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.params[..self.len()][index]
    }
}

#[test]
fn test_terminator_is_appended_and_respected() {
    let params = ParamArray::new(vec![
        Param::new("keylen", &32i32).unwrap(),
        Param::end(),
        Param::new("ivlen", &16i32).unwrap(),
    ]);
    assert_eq!(params.len(), 1);
    assert!(params.find("ivlen").is_none());
    assert!(params.params.last().unwrap().is_end());

    let empty = ParamArray::new(vec![]);
    assert!(empty.is_empty());
    assert!(empty.find("").is_none());
}

#[test]
fn test_first_match_wins() {
    let params: ParamArray = vec![
        Param::new("keylen", &16i32).unwrap(),
        Param::new("keylen", &32i32).unwrap(),
    ]
    .into();
    assert_eq!(params.get::<i32>("keylen").unwrap(), 16);
}

#[test]
fn test_missing_key() {
    let params: ParamArray = vec![Param::new("keylen", &32i32).unwrap()].into();
    assert!(params.find("ivlen").is_none());
    assert_eq!(
        params.get::<i32>("ivlen"),
        Err(Error::UnknownKey("ivlen".into()))
    );
}

#[test]
fn test_for_each_visits_in_order() {
    let params: ParamArray = ["padding", "mode", "iv"]
        .iter()
        .map(|&key| Param::query(key, DataType::Int))
        .collect();
    let mut keys = Vec::new();
    params.for_each(|param| keys.push(param.key()));
    assert_eq!(keys, ["padding", "mode", "iv"]);
}

#[test]
fn test_one_bad_entry_does_not_stop_the_rest() {
    let mut params: ParamArray = vec![
        Param::with_capacity("mode", DataType::Utf8String, 8),
        Param::with_capacity("keylen", DataType::Int, 4),
        Param::with_capacity("ivlen", DataType::Int, 4),
    ]
    .into();

    let result = params.try_for_each_mut(|param| param.set(&16i32));
    assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    assert_eq!(params.get::<i32>("keylen").unwrap(), 16);
    assert_eq!(params.get::<i32>("ivlen").unwrap(), 16);
    assert!(!params.locate("mode").unwrap().modified());
}

#[test]
fn test_repeated_get_is_stable() {
    let mut params: ParamArray = vec![Param::with_capacity("keylen", DataType::Int, 4)].into();
    assert!(!params.modified());
    assert!(params.set("keylen", &32i32).unwrap());
    assert!(!params.set("ivlen", &16i32).unwrap());
    assert!(params.modified());

    let first = params.get::<i32>("keylen").unwrap();
    for _ in 0..3 {
        assert_eq!(params.get::<i32>("keylen").unwrap(), first);
    }
    assert_eq!(params.locate("keylen").unwrap().used_size(), Some(4));
}
