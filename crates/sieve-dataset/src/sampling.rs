use std::sync::Arc;

use arrow_schema::DataType;
use fastrace::local::LocalSpan;
use log::{debug, trace};
use sieve_common::spec::{Element, PartialShape};
use sieve_random::SamplingRng;

use crate::checkpoint::{IteratorStateReader, IteratorStateWriter};
use crate::dataset::{Cardinality, Dataset, DatasetIterator};
use crate::error::{DatasetError, DatasetResult};
use crate::name;

/// Keeps each input element independently with probability `rate`.
///
/// One uniform value is drawn per input element, and the element is kept
/// if the value is below the rate. The draws come from a generator seeded by
/// `(seed, seed2)`, so the output is a deterministic function of the seeds,
/// the rate and the input sequence.
#[derive(Debug)]
pub struct SamplingDataset {
    node_name: String,
    input: Arc<dyn Dataset>,
    rate: f32,
    seed: i64,
    seed2: i64,
    output_dtypes: Vec<DataType>,
    output_shapes: Vec<PartialShape>,
}

impl SamplingDataset {
    pub const DATASET_TYPE: &'static str = "Sampling";

    const NUM_RANDOM_SAMPLES: &'static str = "num_random_samples";
    const SEED: &'static str = "seed";
    const SEED2: &'static str = "seed2";
    const INPUT_IMPL_EMPTY: &'static str = "input_impl_empty";

    /// A rate of zero is accepted and produces an empty output.
    pub fn try_new(
        node_name: impl Into<String>,
        input: Arc<dyn Dataset>,
        rate: f32,
        seed: i64,
        seed2: i64,
    ) -> DatasetResult<Self> {
        validate_rate(rate, true)?;
        let node_name = node_name.into();
        debug!(
            "creating sampling dataset {node_name} over {} with rate {rate} and seeds ({seed}, {seed2})",
            input.node_name()
        );
        Ok(Self {
            node_name,
            output_dtypes: input.output_dtypes().to_vec(),
            output_shapes: input.output_shapes().to_vec(),
            input,
            rate,
            seed,
            seed2,
        })
    }

    pub fn input(&self) -> &Arc<dyn Dataset> {
        &self.input
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn seed2(&self) -> i64 {
        self.seed2
    }
}

pub(crate) fn validate_rate(rate: f32, allow_zero: bool) -> DatasetResult<()> {
    let valid = if allow_zero {
        (0.0..=1.0).contains(&rate)
    } else {
        rate > 0.0 && rate <= 1.0
    };
    if valid {
        Ok(())
    } else if allow_zero {
        Err(DatasetError::invalid(format!(
            "sample rate must be in [0, 1], got {rate}"
        )))
    } else {
        Err(DatasetError::invalid(format!(
            "sample rate must be in (0, 1], got {rate}"
        )))
    }
}

impl Dataset for SamplingDataset {
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

    /// The output size depends on the outcome of every trial,
    /// so it is reported as unknown even for a rate of one.
    fn cardinality(&self) -> Cardinality {
        Cardinality::Unknown
    }

    fn make_iterator(self: Arc<Self>, prefix: &str) -> DatasetResult<Box<dyn DatasetIterator>> {
        let prefix = name::iterator_prefix(Self::DATASET_TYPE, prefix);
        let input = self.input.clone().make_iterator(&prefix)?;
        Ok(Box::new(SamplingIterator {
            rng: SamplingRng::new(self.seed, self.seed2),
            input: Some(input),
            prefix,
            dataset: self,
        }))
    }
}

/// An iterator over a [`SamplingDataset`].
///
/// The iterator owns its generator and its input iterator. Every examined
/// input element advances both by one, so the draw count always equals the
/// number of elements pulled from the input.
pub struct SamplingIterator {
    dataset: Arc<SamplingDataset>,
    prefix: String,
    rng: SamplingRng,
    /// Dropped once the input reports the end of sequence.
    input: Option<Box<dyn DatasetIterator>>,
}

impl SamplingIterator {
    pub fn draw_count(&self) -> u64 {
        self.rng.draw_count()
    }
}

impl DatasetIterator for SamplingIterator {
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
        let _span = LocalSpan::enter_with_local_parent("SamplingIterator::get_next");
        let mut rejected: u64 = 0;
        loop {
            let Some(input) = self.input.as_mut() else {
                return Ok(None);
            };
            let Some(element) = input.get_next()? else {
                trace!(
                    "{}: input exhausted after {} draws ({rejected} rejected in this call)",
                    self.prefix,
                    self.rng.draw_count()
                );
                self.input = None;
                return Ok(None);
            };
            if self.rng.next_f32() < self.dataset.rate {
                if rejected > 0 {
                    trace!("{}: skipped {rejected} elements", self.prefix);
                }
                return Ok(Some(element));
            }
            rejected += 1;
        }
    }

    fn save(&self, writer: &mut dyn IteratorStateWriter) -> DatasetResult<()> {
        let draw_count = i64::try_from(self.rng.draw_count())
            .map_err(|_| DatasetError::internal("sampling draw count overflow"))?;
        writer.write_i64(
            &self.full_name(SamplingDataset::NUM_RANDOM_SAMPLES),
            draw_count,
        )?;
        writer.write_i64(&self.full_name(SamplingDataset::SEED), self.rng.seed())?;
        writer.write_i64(&self.full_name(SamplingDataset::SEED2), self.rng.seed2())?;
        match &self.input {
            Some(input) => input.save(writer)?,
            None => writer.write_str(&self.full_name(SamplingDataset::INPUT_IMPL_EMPTY), "")?,
        }
        debug!("{}: saved state after {draw_count} draws", self.prefix);
        Ok(())
    }

    fn restore(&mut self, reader: &dyn IteratorStateReader) -> DatasetResult<()> {
        let key = self.full_name(SamplingDataset::NUM_RANDOM_SAMPLES);
        let draw_count = reader.read_i64(&key)?;
        let draw_count = u64::try_from(draw_count).map_err(|_| {
            DatasetError::checkpoint(format!("invalid value for {key}: {draw_count}"))
        })?;
        let seed = reader.read_i64(&self.full_name(SamplingDataset::SEED))?;
        let seed2 = reader.read_i64(&self.full_name(SamplingDataset::SEED2))?;

        // The input is restored into a fresh iterator and the new state is only
        // committed once every part has been read, so a failed restore leaves
        // the generator and the input as they were.
        let input = if reader.contains(&self.full_name(SamplingDataset::INPUT_IMPL_EMPTY)) {
            None
        } else {
            let mut input = self.dataset.input.clone().make_iterator(&self.prefix)?;
            input.restore(reader)?;
            Some(input)
        };
        self.rng = SamplingRng::restore(seed, seed2, draw_count);
        self.input = input;
        debug!("{}: restored state after {draw_count} draws", self.prefix);
        Ok(())
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use sieve_common::spec::Value;

    use super::*;
    use crate::checkpoint::MemoryCheckpoint;
    use crate::dataset::DatasetIteratorExt;
    use crate::memory::MemoryDataset;
    use crate::range::RangeDataset;

    fn range(stop: i64) -> Arc<dyn Dataset> {
        Arc::new(RangeDataset::try_new("range", 0, stop, 1).unwrap())
    }

    fn sample(stop: i64, rate: f32) -> Arc<SamplingDataset> {
        Arc::new(SamplingDataset::try_new("sampling_dataset", range(stop), rate, 42, 7).unwrap())
    }

    fn values(iterator: &mut dyn DatasetIterator) -> Vec<i64> {
        iterator
            .elements()
            .map(|e| e.unwrap()[0].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_sampling_golden_outputs() {
        let mut iterator = sample(3, 1.0).make_iterator("Iterator").unwrap();
        assert_eq!(values(&mut iterator), vec![0, 1, 2]);

        let mut iterator = sample(20, 0.1).make_iterator("Iterator").unwrap();
        assert_eq!(values(&mut iterator), vec![9, 11, 19]);

        let mut iterator = sample(20, 0.0).make_iterator("Iterator").unwrap();
        assert_eq!(values(&mut iterator), Vec::<i64>::new());
    }

    #[test]
    fn test_sampling_draws_once_per_input_element() {
        let dataset = sample(20, 0.0);
        let prefix = "Iterator";
        let mut iterator = SamplingIterator {
            rng: SamplingRng::new(42, 7),
            input: Some(dataset.input.clone().make_iterator(prefix).unwrap()),
            prefix: prefix.to_string(),
            dataset,
        };
        assert_eq!(iterator.get_next().unwrap(), None);
        assert_eq!(iterator.draw_count(), 20);
        assert!(iterator.input.is_none());
        assert_eq!(iterator.get_next().unwrap(), None);
        assert_eq!(iterator.draw_count(), 20);
    }

    #[test]
    fn test_sampling_rejects_invalid_rates() {
        for rate in [-0.1, 1.5, f32::NAN, f32::INFINITY] {
            let result = SamplingDataset::try_new("sampling", range(3), rate, 0, 0);
            assert!(matches!(result, Err(DatasetError::InvalidArgument(_))));
        }
        assert!(validate_rate(0.0, true).is_ok());
        assert!(validate_rate(0.0, false).is_err());
        assert!(validate_rate(1.0, false).is_ok());
    }

    #[test]
    fn test_sampling_metadata_mirrors_input() {
        let input: Arc<dyn Dataset> = Arc::new(
            MemoryDataset::try_new(
                "words",
                vec![DataType::Utf8],
                vec![vec![Value::from("x")]],
            )
            .unwrap(),
        );
        let dataset =
            Arc::new(SamplingDataset::try_new("sampling", input.clone(), 1.0, 1, 2).unwrap());
        assert_eq!(dataset.output_dtypes(), input.output_dtypes());
        assert_eq!(dataset.output_shapes(), input.output_shapes());
        assert_eq!(dataset.cardinality(), Cardinality::Unknown);

        let mut iterator = dataset.make_iterator("Iterator").unwrap();
        assert_eq!(iterator.output_dtypes(), &[DataType::Utf8]);
        assert_eq!(iterator.get_next().unwrap(), Some(vec![Value::from("x")]));
    }

    #[test]
    fn test_sampling_checkpoint_keys() {
        let mut iterator = sample(20, 0.1).make_iterator("Iterator").unwrap();
        assert_eq!(iterator.get_next().unwrap(), Some(vec![Value::Int64(9)]));

        let mut checkpoint = MemoryCheckpoint::new();
        iterator.save(&mut checkpoint).unwrap();
        let keys: Vec<&str> = checkpoint.keys().collect();
        assert_eq!(
            keys,
            vec![
                "Iterator::Sampling::Range:next",
                "Iterator::Sampling:num_random_samples",
                "Iterator::Sampling:seed",
                "Iterator::Sampling:seed2",
            ]
        );
        assert_eq!(
            checkpoint
                .read_i64("Iterator::Sampling:num_random_samples")
                .unwrap(),
            10
        );
        assert_eq!(
            checkpoint.read_i64("Iterator::Sampling::Range:next").unwrap(),
            10
        );
    }

    #[test]
    fn test_sampling_restore_after_exhaustion() {
        let dataset = sample(3, 1.0);
        let mut iterator = dataset.clone().make_iterator("Iterator").unwrap();
        assert_eq!(values(&mut iterator), vec![0, 1, 2]);

        let mut checkpoint = MemoryCheckpoint::new();
        iterator.save(&mut checkpoint).unwrap();
        assert!(checkpoint.contains("Iterator::Sampling:input_impl_empty"));

        let mut restored = dataset.make_iterator("Iterator").unwrap();
        restored.restore(&checkpoint).unwrap();
        assert_eq!(restored.get_next().unwrap(), None);
    }

    #[test]
    fn test_sampling_restore_requires_draw_count() {
        let dataset = sample(20, 0.1);
        let mut iterator = dataset.clone().make_iterator("Iterator").unwrap();
        iterator.get_next().unwrap();
        let mut checkpoint = MemoryCheckpoint::new();
        iterator.save(&mut checkpoint).unwrap();
        checkpoint.remove("Iterator::Sampling:num_random_samples");

        let mut restored = dataset.make_iterator("Iterator").unwrap();
        assert!(matches!(
            restored.restore(&checkpoint),
            Err(DatasetError::CheckpointError(_))
        ));
    }

    #[test]
    fn test_sampling_restore_rejects_missing_input_state() {
        let dataset = sample(20, 0.1);
        let mut iterator = dataset.clone().make_iterator("Iterator").unwrap();
        iterator.get_next().unwrap();
        let mut checkpoint = MemoryCheckpoint::new();
        iterator.save(&mut checkpoint).unwrap();
        checkpoint.remove("Iterator::Sampling::Range:next");

        let mut restored = dataset.clone().make_iterator("Iterator").unwrap();
        assert!(restored.restore(&checkpoint).is_err());
        assert_eq!(values(&mut restored), vec![9, 11, 19]);

        let mut partial = dataset.make_iterator("Iterator").unwrap();
        assert_eq!(partial.get_next().unwrap(), Some(vec![Value::Int64(9)]));
        assert!(partial.restore(&checkpoint).is_err());
        assert_eq!(values(&mut partial), vec![11, 19]);
    }
}
