use std::sync::Arc;

use arrow_schema::DataType;
use sieve_common::spec::{Element, PartialShape};

use crate::checkpoint::{IteratorStateReader, IteratorStateWriter};
use crate::dataset::{Cardinality, Dataset, DatasetIterator};
use crate::error::{DatasetError, DatasetResult};
use crate::name;

/// Produces a fixed list of elements in order.
#[derive(Debug)]
pub struct MemoryDataset {
    node_name: String,
    elements: Vec<Element>,
    output_dtypes: Vec<DataType>,
    output_shapes: Vec<PartialShape>,
}

impl MemoryDataset {
    pub const DATASET_TYPE: &'static str = "Memory";

    const INDEX: &'static str = "index";

    /// Every element must have one value per declared type, in order.
    pub fn try_new(
        node_name: impl Into<String>,
        output_dtypes: Vec<DataType>,
        elements: Vec<Element>,
    ) -> DatasetResult<Self> {
        for (i, element) in elements.iter().enumerate() {
            let actual: Vec<DataType> = element.iter().map(|v| v.data_type()).collect();
            if actual != output_dtypes {
                return Err(DatasetError::invalid(format!(
                    "element {i} has types {actual:?}, expected {output_dtypes:?}"
                )));
            }
        }
        let output_shapes = vec![PartialShape::scalar(); output_dtypes.len()];
        Ok(Self {
            node_name: node_name.into(),
            elements,
            output_dtypes,
            output_shapes,
        })
    }
}

impl Dataset for MemoryDataset {
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
        Cardinality::Known(self.elements.len() as u64)
    }

    fn make_iterator(self: Arc<Self>, prefix: &str) -> DatasetResult<Box<dyn DatasetIterator>> {
        Ok(Box::new(MemoryIterator {
            prefix: name::iterator_prefix(Self::DATASET_TYPE, prefix),
            index: 0,
            dataset: self,
        }))
    }
}

struct MemoryIterator {
    dataset: Arc<MemoryDataset>,
    prefix: String,
    index: usize,
}

impl DatasetIterator for MemoryIterator {
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
        let element = self.dataset.elements.get(self.index).cloned();
        if element.is_some() {
            self.index += 1;
        }
        Ok(element)
    }

    fn save(&self, writer: &mut dyn IteratorStateWriter) -> DatasetResult<()> {
        let index = i64::try_from(self.index)
            .map_err(|_| DatasetError::internal("memory iterator index overflow"))?;
        writer.write_i64(&self.full_name(MemoryDataset::INDEX), index)
    }

    fn restore(&mut self, reader: &dyn IteratorStateReader) -> DatasetResult<()> {
        let key = self.full_name(MemoryDataset::INDEX);
        let index = reader.read_i64(&key)?;
        let index = usize::try_from(index)
            .ok()
            .filter(|i| *i <= self.dataset.elements.len())
            .ok_or_else(|| {
                DatasetError::checkpoint(format!("invalid value for {key}: {index}"))
            })?;
        self.index = index;
        Ok(())
    }
}
