//! Read-once byte sources with a materialization cache

use crate::error::StreamConsumed;
use anyhow::Result;
use parking_lot::Mutex;
use std::{
    fmt,
    io::Read,
    sync::{Arc, OnceLock},
};

type Reader = Box<dyn Read + Send>;

/// Bytes that are either already in memory or still behind a reader.
///
/// The reader is drained on first access and the bytes are cached, so every
/// later access yields exactly the same bytes. Clones share the cache.
#[derive(Clone)]
pub struct Source(Arc<Inner>);

struct Inner {
    cache: OnceLock<Vec<u8>>,
    reader: Mutex<Option<Reader>>,
}

impl Source {
    /// A source over bytes already in memory.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::new(Inner {
            cache: OnceLock::from(bytes.into()),
            reader: Mutex::new(None),
        }))
    }

    /// A source that reads lazily from `reader`.
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self(Arc::new(Inner {
            cache: OnceLock::new(),
            reader: Mutex::new(Some(Box::new(reader))),
        }))
    }

    /// Whether the bytes are in memory.
    pub fn is_materialized(&self) -> bool {
        self.0.cache.get().is_some()
    }

    /// The bytes of the source, reading the underlying reader at most once.
    ///
    /// If that single read fails, this and every later call returns an error.
    pub fn bytes(&self) -> Result<&[u8]> {
        if let Some(bytes) = self.0.cache.get() {
            return Ok(bytes.as_slice());
        }

        let mut reader = self.0.reader.lock();
        if let Some(bytes) = self.0.cache.get() {
            return Ok(bytes.as_slice());
        }

        let Some(mut source) = reader.take() else {
            return Err(StreamConsumed.into());
        };
        let mut buf = Vec::new();
        source.read_to_end(&mut buf)?;
        Ok(self.0.cache.get_or_init(|| buf).as_slice())
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.cache.get() {
            Some(bytes) => write!(f, "Source({} bytes)", bytes.len()),
            None => f.write_str("Source(unread)"),
        }
    }
}
