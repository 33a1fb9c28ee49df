use std::fmt;
use std::sync::Arc;

use arrow_schema::DataType;
use sieve_common::spec::{Element, PartialShape};

use crate::checkpoint::{IteratorStateReader, IteratorStateWriter};
use crate::error::DatasetResult;
use crate::name;

/// The number of elements a dataset will produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Known(u64),
    Infinite,
    Unknown,
}

impl Cardinality {
    /// The conventional integer encoding where `-1` is infinite and `-2` is unknown.
    pub fn to_i64(self) -> i64 {
        match self {
            Cardinality::Known(n) => i64::try_from(n).unwrap_or(i64::MAX),
            Cardinality::Infinite => -1,
            Cardinality::Unknown => -2,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Known(n) => write!(f, "{n}"),
            Cardinality::Infinite => write!(f, "infinite"),
            Cardinality::Unknown => write!(f, "unknown"),
        }
    }
}

/// An immutable pipeline stage from which iterators are created.
pub trait Dataset: fmt::Debug + Send + Sync {
    /// The stage type, e.g. `Sampling`.
    fn dataset_type(&self) -> &'static str;

    /// The name the stage was declared with in the pipeline.
    fn node_name(&self) -> &str;

    fn output_dtypes(&self) -> &[DataType];

    fn output_shapes(&self) -> &[PartialShape];

    fn cardinality(&self) -> Cardinality;

    /// Creates an iterator whose prefix extends `prefix` with this stage's type.
    fn make_iterator(self: Arc<Self>, prefix: &str) -> DatasetResult<Box<dyn DatasetIterator>>;

    fn type_string(&self) -> String {
        name::op_name(self.dataset_type())
    }

    fn debug_string(&self) -> String {
        name::dataset_debug_string(self.dataset_type())
    }
}

/// A single traversal over a dataset.
///
/// `get_next` returns `Ok(None)` at end of sequence. An iterator restored from
/// a checkpoint continues exactly where the saved iterator stopped.
pub trait DatasetIterator: Send {
    fn prefix(&self) -> &str;

    fn output_dtypes(&self) -> &[DataType];

    fn output_shapes(&self) -> &[PartialShape];

    fn get_next(&mut self) -> DatasetResult<Option<Element>>;

    fn save(&self, writer: &mut dyn IteratorStateWriter) -> DatasetResult<()>;

    fn restore(&mut self, reader: &dyn IteratorStateReader) -> DatasetResult<()>;

    fn full_name(&self, key: &str) -> String {
        name::full_name(self.prefix(), key)
    }
}

impl<T: DatasetIterator + ?Sized> DatasetIterator for Box<T> {
    fn prefix(&self) -> &str {
        (**self).prefix()
    }

    fn output_dtypes(&self) -> &[DataType] {
        (**self).output_dtypes()
    }

    fn output_shapes(&self) -> &[PartialShape] {
        (**self).output_shapes()
    }

    fn get_next(&mut self) -> DatasetResult<Option<Element>> {
        (**self).get_next()
    }

    fn save(&self, writer: &mut dyn IteratorStateWriter) -> DatasetResult<()> {
        (**self).save(writer)
    }

    fn restore(&mut self, reader: &dyn IteratorStateReader) -> DatasetResult<()> {
        (**self).restore(reader)
    }
}

/// Adapts a [`DatasetIterator`] to [`Iterator`].
///
/// Iteration stops after the end of sequence or after the first error.
pub struct Elements<'a, I: DatasetIterator + ?Sized> {
    inner: &'a mut I,
    done: bool,
}

impl<I: DatasetIterator + ?Sized> Iterator for Elements<'_, I> {
    type Item = DatasetResult<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.inner.get_next() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

pub trait DatasetIteratorExt: DatasetIterator {
    fn elements(&mut self) -> Elements<'_, Self> {
        Elements {
            inner: self,
            done: false,
        }
    }
}

impl<T: DatasetIterator + ?Sized> DatasetIteratorExt for T {}
