use std::sync::Arc;

use arrow_schema::DataType;
use sieve_common::config::SamplingConfig;
use sieve_common::spec::PartialShape;

use crate::dataset::Dataset;
use crate::error::{DatasetError, DatasetResult};
use crate::sampling::{validate_rate, SamplingDataset};

/// Arguments for a sampling stage as declared in a pipeline.
#[derive(Debug, Default)]
pub struct SamplingArgs {
    pub node_name: String,
    pub input: Option<Arc<dyn Dataset>>,
    pub rate: Option<f32>,
    pub seed: Option<i64>,
    pub seed2: Option<i64>,
    pub output_types: Option<Vec<DataType>>,
    pub output_shapes: Option<Vec<PartialShape>>,
}

/// Builds [`SamplingDataset`]s from declared arguments.
#[derive(Debug, Clone)]
pub struct SamplingDatasetOp {
    default_seed: i64,
    default_seed2: i64,
    allow_zero_rate: bool,
}

impl SamplingDatasetOp {
    pub const DATASET_TYPE: &'static str = SamplingDataset::DATASET_TYPE;
    pub const INPUT_DATASET: &'static str = "input_dataset";
    pub const RATE: &'static str = "rate";
    pub const SEED: &'static str = "seed";
    pub const SEED2: &'static str = "seed2";
    pub const OUTPUT_TYPES: &'static str = "output_types";
    pub const OUTPUT_SHAPES: &'static str = "output_shapes";

    pub fn new(config: &SamplingConfig) -> Self {
        Self {
            default_seed: config.seed,
            default_seed2: config.seed2,
            allow_zero_rate: config.allow_zero_rate,
        }
    }

    pub fn make_dataset(&self, args: SamplingArgs) -> DatasetResult<Arc<SamplingDataset>> {
        let SamplingArgs {
            node_name,
            input,
            rate,
            seed,
            seed2,
            output_types,
            output_shapes,
        } = args;
        let input = input.ok_or_else(|| DatasetError::missing(Self::INPUT_DATASET))?;
        let rate = rate.ok_or_else(|| DatasetError::missing(Self::RATE))?;
        validate_rate(rate, self.allow_zero_rate)?;

        if let Some(types) = output_types {
            if types != input.output_dtypes() {
                return Err(DatasetError::invalid(format!(
                    "{}: declared {types:?}, but the input produces {:?}",
                    Self::OUTPUT_TYPES,
                    input.output_dtypes()
                )));
            }
        }
        if let Some(shapes) = output_shapes {
            let compatible = shapes.len() == input.output_shapes().len()
                && shapes
                    .iter()
                    .zip(input.output_shapes())
                    .all(|(declared, actual)| declared.is_compatible_with(actual));
            if !compatible {
                let actual: Vec<String> =
                    input.output_shapes().iter().map(|s| s.to_string()).collect();
                let declared: Vec<String> = shapes.iter().map(|s| s.to_string()).collect();
                return Err(DatasetError::invalid(format!(
                    "{}: declared {declared:?}, but the input produces {actual:?}",
                    Self::OUTPUT_SHAPES,
                )));
            }
        }

        let dataset = SamplingDataset::try_new(
            node_name,
            input,
            rate,
            seed.unwrap_or(self.default_seed),
            seed2.unwrap_or(self.default_seed2),
        )?;
        Ok(Arc::new(dataset))
    }
}
