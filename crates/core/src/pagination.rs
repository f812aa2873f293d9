//! Pagination normalizer for list endpoints.
//!
//! List endpoints of the API do not agree on an envelope. All of these are
//! accepted and reduced to one [`Page`]:
//!
//! - a flat array: `[ ... ]`
//! - `{ "data": [ ... ], "pagination": { ... } }`
//! - `{ "data": [ ... ], "meta": { ... } }`
//! - `{ "data": { "data": [ ... ], "meta": { ... } } }`
//! - a paginator object, bare or under `data`:
//!   `{ "current_page": 1, "data": [ ... ], "last_page": 3, ... }`

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};
use crate::lenient::{decimal_from_value, first_present};

/// Canonical pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl PageMeta {
    /// Metadata for an unpaginated response holding `len` records.
    pub fn single(len: usize) -> Self {
        let len = len as u64;
        Self {
            current_page: 1,
            last_page: 1,
            per_page: clamp_u32(len),
            total: len,
            from: (len > 0).then_some(1),
            to: (len > 0).then_some(len),
        }
    }

    /// Whether a further page exists after the current one.
    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page
    }
}

impl Default for PageMeta {
    fn default() -> Self {
        Self::single(0)
    }
}

/// One page of records plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Normalize any supported envelope, decoding records with `decode`.
    pub fn from_envelope_with<F>(envelope: &Value, decode: F) -> DomainResult<Self>
    where
        F: Fn(&Value) -> DomainResult<T>,
    {
        let (records, meta) = locate(envelope)
            .ok_or_else(|| DomainError::malformed("response carries no record list"))?;

        let items = records.iter().map(decode).collect::<DomainResult<Vec<_>>>()?;
        let meta = match meta {
            Some(m) => meta_from_map(m, items.len()),
            None => PageMeta::single(items.len()),
        };

        Ok(Self { items, meta })
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Normalize any supported envelope, decoding records through serde.
    pub fn from_envelope(envelope: &Value) -> DomainResult<Self> {
        Self::from_envelope_with(envelope, |v| Ok(T::deserialize(v)?))
    }
}

/// Strip a `{ "data": ... }` wrapper when present.
pub fn unwrap_data(value: &Value) -> &Value {
    match value.get("data") {
        Some(inner) if !inner.is_null() => inner,
        _ => value,
    }
}

/// Record list of any supported envelope, ignoring pagination.
pub fn records(value: &Value) -> &[Value] {
    locate(value).map(|(r, _)| r.as_slice()).unwrap_or_default()
}

fn locate(value: &Value) -> Option<(&Vec<Value>, Option<&Map<String, Value>>)> {
    match value {
        Value::Array(records) => Some((records, None)),
        Value::Object(object) => match object.get("data") {
            Some(Value::Array(records)) => {
                let meta = ["pagination", "meta"]
                    .iter()
                    .find_map(|k| object.get(*k).and_then(Value::as_object))
                    .or_else(|| object.contains_key("current_page").then_some(object));
                Some((records, meta))
            }
            Some(inner @ Value::Object(_)) => locate(inner),
            _ => None,
        },
        _ => None,
    }
}

fn number(map: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    use rust_decimal::prelude::ToPrimitive;

    first_present(map, keys)
        .map(decimal_from_value)
        .and_then(|d| d.trunc().to_u64())
}

/// Server page numbers beyond `u32` saturate rather than wrap.
fn clamp_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn meta_from_map(map: &Map<String, Value>, len: usize) -> PageMeta {
    let len = len as u64;
    let current_page = number(map, &["current_page", "page"]).unwrap_or(1).max(1);
    let per_page = number(map, &["per_page", "limit"]).unwrap_or(len);
    let total = number(map, &["total"]).unwrap_or(len);
    let last_page = number(map, &["last_page", "total_pages"])
        .unwrap_or_else(|| if per_page == 0 { 1 } else { total.div_ceil(per_page) })
        .max(1);

    let offset = current_page.saturating_sub(1).saturating_mul(per_page);
    let from = number(map, &["from"]).or((len > 0).then_some(offset.saturating_add(1)));
    let to = number(map, &["to"]).or((len > 0).then_some(offset.saturating_add(len)));

    PageMeta {
        current_page: clamp_u32(current_page),
        last_page: clamp_u32(last_page),
        per_page: clamp_u32(per_page),
        total,
        from,
        to,
    }
}
