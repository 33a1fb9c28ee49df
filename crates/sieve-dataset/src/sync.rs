use std::sync::Mutex;

use sieve_common::spec::Element;

use crate::checkpoint::{IteratorStateReader, IteratorStateWriter};
use crate::dataset::DatasetIterator;
use crate::error::{DatasetError, DatasetResult};

/// A [`DatasetIterator`] that can be shared between threads.
///
/// Each operation holds the lock for its whole duration, so a pull and the
/// state changes it causes are never observed halfway by a concurrent `save`.
pub struct SyncIterator {
    inner: Mutex<Box<dyn DatasetIterator>>,
}

impl SyncIterator {
    pub fn new(inner: Box<dyn DatasetIterator>) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    pub fn get_next(&self) -> DatasetResult<Option<Element>> {
        self.lock()?.get_next()
    }

    pub fn save(&self, writer: &mut dyn IteratorStateWriter) -> DatasetResult<()> {
        self.lock()?.save(writer)
    }

    pub fn restore(&self, reader: &dyn IteratorStateReader) -> DatasetResult<()> {
        self.lock()?.restore(reader)
    }

    pub fn into_inner(self) -> DatasetResult<Box<dyn DatasetIterator>> {
        self.inner
            .into_inner()
            .map_err(|e| DatasetError::internal(e.to_string()))
    }

    fn lock(&self) -> DatasetResult<std::sync::MutexGuard<'_, Box<dyn DatasetIterator>>> {
        self.inner
            .lock()
            .map_err(|e| DatasetError::internal(e.to_string()))
    }
}
