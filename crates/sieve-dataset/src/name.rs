//! Naming conventions shared by dataset stages and their iterators.
//!
//! An iterator created with prefix `P` for a stage of type `T` has the prefix
//! `P::T`, and its checkpoint keys are `P::T:key`. Because nested iterators
//! extend their parent's prefix, keys written by different stages never collide.

const DATASET_OP_SUFFIX: &str = "DatasetOp";
const DATASET_SUFFIX: &str = "Dataset";
const PREFIX_SEPARATOR: &str = "::";
const KEY_SEPARATOR: &str = ":";

/// The op name for a dataset type, e.g. `Sampling` becomes `SamplingDatasetOp`.
pub fn op_name(dataset_type: &str) -> String {
    format!("{dataset_type}{DATASET_OP_SUFFIX}")
}

pub fn dataset_debug_string(dataset_type: &str) -> String {
    format!(
        "{}{PREFIX_SEPARATOR}{DATASET_SUFFIX}",
        op_name(dataset_type)
    )
}

pub fn iterator_prefix(dataset_type: &str, prefix: &str) -> String {
    format!("{prefix}{PREFIX_SEPARATOR}{dataset_type}")
}

pub fn full_name(prefix: &str, key: &str) -> String {
    format!("{prefix}{KEY_SEPARATOR}{key}")
}
