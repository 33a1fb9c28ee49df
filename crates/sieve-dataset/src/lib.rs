//! Dataset stages with checkpointable iterators.
//!
//! A [`Dataset`] is an immutable stage description. Calling
//! [`Dataset::make_iterator`] starts a traversal whose state can be written to
//! an [`IteratorStateWriter`] and later restored from an
//! [`IteratorStateReader`], so a pipeline can be paused and resumed without
//! changing its output.

pub mod checkpoint;
pub mod dataset;
pub mod error;
pub mod memory;
pub mod name;
pub mod op;
pub mod range;
pub mod sampling;
pub mod sync;

pub use checkpoint::{IteratorStateReader, IteratorStateWriter, MemoryCheckpoint, StateValue};
pub use dataset::{Cardinality, Dataset, DatasetIterator, DatasetIteratorExt, Elements};
pub use error::{DatasetError, DatasetResult};
pub use memory::MemoryDataset;
pub use op::{SamplingArgs, SamplingDatasetOp};
pub use range::RangeDataset;
pub use sampling::{SamplingDataset, SamplingIterator};
pub use sync::SyncIterator;
