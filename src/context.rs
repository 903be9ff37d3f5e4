//! Request-scoped key/value context.
//!
//! The map lives in the request's `Extensions`, so it is created per request
//! and dropped with it. Middleware writes entries under caller-chosen keys and
//! handlers read them back, either through `ContextMap` as an extractor or
//! straight from `request.extensions()`.

use std::{any::Any, collections::HashMap, convert::Infallible, fmt, sync::Arc};

use axum::{
    extract::FromRequestParts,
    http::{Extensions, request::Parts},
};

use crate::token::TokenRecord;

type Value = Arc<dyn Any + Send + Sync>;

#[derive(Clone, Default)]
pub struct ContextMap {
    entries: HashMap<String, Value>,
}

impl ContextMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request's map, inserting an empty one if none exists yet.
    pub fn ensure(extensions: &mut Extensions) -> &mut ContextMap {
        extensions.get_or_insert_default::<ContextMap>()
    }

    /// Store `value` under `key`, replacing whatever was there.
    pub fn insert<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.entries.insert(key.into(), Arc::new(value));
    }

    /// The value under `key`, if it exists and has type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.downcast_ref::<T>()
    }

    /// Shorthand for the record the JWT middleware writes.
    pub fn token_record(&self, key: &str) -> Option<&TokenRecord> {
        self.get::<TokenRecord>(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ContextMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values are type-erased; keys are enough to see what is set.
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Yields the request's map, or an empty one when no middleware created it.
impl<S> FromRequestParts<S> for ContextMap
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<ContextMap>()
            .cloned()
            .unwrap_or_default())
    }
}
