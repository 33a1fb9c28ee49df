use std::sync::Arc;

use arrow_schema::DataType;
use sieve_common::spec::{Element, PartialShape, Value};

use crate::checkpoint::{IteratorStateReader, IteratorStateWriter};
use crate::dataset::{Cardinality, Dataset, DatasetIterator};
use crate::error::{DatasetError, DatasetResult};
use crate::name;

/// Produces `start, start + step, ...` up to but excluding `stop`.
#[derive(Debug)]
pub struct RangeDataset {
    node_name: String,
    start: i64,
    stop: i64,
    step: i64,
    output_dtypes: Vec<DataType>,
    output_shapes: Vec<PartialShape>,
}

impl RangeDataset {
    pub const DATASET_TYPE: &'static str = "Range";

    const NEXT: &'static str = "next";

    pub fn try_new(
        node_name: impl Into<String>,
        start: i64,
        stop: i64,
        step: i64,
    ) -> DatasetResult<Self> {
        if step == 0 {
            return Err(DatasetError::invalid("range step must not be zero"));
        }
        Ok(Self {
            node_name: node_name.into(),
            start,
            stop,
            step,
            output_dtypes: vec![DataType::Int64],
            output_shapes: vec![PartialShape::scalar()],
        })
    }

    fn is_exhausted(&self, next: i64) -> bool {
        if self.step > 0 {
            next >= self.stop
        } else {
            next <= self.stop
        }
    }
}

impl Dataset for RangeDataset {
    fn dataset_type(&self) -> &'static str {
        Self::DATASET_TYPE
    }

    fn node_name(&self) -> &str {
        &self.node_name
    }

    fn output_dtypes(&self) -> &[DataType] {
        &self.output_dtypes
    }

    fn output_shapes(&self) -> &[PartialShape] {
        &self.output_shapes
    }

    fn cardinality(&self) -> Cardinality {
        let (start, stop, step) = (
            i128::from(self.start),
            i128::from(self.stop),
            i128::from(self.step),
        );
        let span = if step > 0 { stop - start } else { start - stop };
        if span <= 0 {
            return Cardinality::Known(0);
        }
        let step = step.abs();
        let count = (span + step - 1) / step;
        Cardinality::Known(count as u64)
    }

    fn make_iterator(self: Arc<Self>, prefix: &str) -> DatasetResult<Box<dyn DatasetIterator>> {
        Ok(Box::new(RangeIterator {
            prefix: name::iterator_prefix(Self::DATASET_TYPE, prefix),
            next: self.start,
            dataset: self,
        }))
    }
}

struct RangeIterator {
    dataset: Arc<RangeDataset>,
    prefix: String,
    next: i64,
}

impl DatasetIterator for RangeIterator {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn output_dtypes(&self) -> &[DataType] {
        &self.dataset.output_dtypes
    }

    fn output_shapes(&self) -> &[PartialShape] {
        &self.dataset.output_shapes
    }

    fn get_next(&mut self) -> DatasetResult<Option<Element>> {
        if self.dataset.is_exhausted(self.next) {
            return Ok(None);
        }
        let value = self.next;
        // Saturating keeps the iterator exhausted at the edges of `i64`.
        self.next = self.next.saturating_add(self.dataset.step);
        Ok(Some(vec![Value::Int64(value)]))
    }

    fn save(&self, writer: &mut dyn IteratorStateWriter) -> DatasetResult<()> {
        writer.write_i64(&self.full_name(RangeDataset::NEXT), self.next)
    }

    fn restore(&mut self, reader: &dyn IteratorStateReader) -> DatasetResult<()> {
        self.next = reader.read_i64(&self.full_name(RangeDataset::NEXT))?;
        Ok(())
    }
}
