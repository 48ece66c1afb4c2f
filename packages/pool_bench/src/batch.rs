use std::num::NonZero;
use std::sync::Arc;

use new_zealand::nz;

use crate::{Error, Result};

/// The batch that the original benchmark computes: sixteen sums of between roughly 11 and 98
/// million terms each.
pub const DEFAULT_INPUTS: [NonZero<u64>; 16] = [
    nz!(15_972_490),
    nz!(80_247_910),
    nz!(92_031_257),
    nz!(75_940_266),
    nz!(97_986_012),
    nz!(87_599_664),
    nz!(75_231_321),
    nz!(11_138_524),
    nz!(68_870_499),
    nz!(11_872_796),
    nz!(79_132_533),
    nz!(40_649_382),
    nz!(63_886_074),
    nz!(53_146_293),
    nz!(36_914_087),
    nz!(62_770_938),
];

/// An immutable, non-empty, ordered batch of positive integers to feed to the workload.
///
/// Every strategy in a run operates on the same batch. Cloning is cheap and shares the
/// underlying storage, so all strategies see the exact same inputs in the exact same order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputBatch {
    inputs: Arc<[NonZero<u64>]>,
}

impl InputBatch {
    /// Creates a batch from the given inputs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `inputs` is empty.
    pub fn new(inputs: impl IntoIterator<Item = NonZero<u64>>) -> Result<Self> {
        let inputs: Arc<[NonZero<u64>]> = inputs.into_iter().collect();

        if inputs.is_empty() {
            return Err(Error::InvalidInput(
                "the input batch must contain at least one integer".to_string(),
            ));
        }

        Ok(Self { inputs })
    }

    /// Creates a batch from plain integers, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `inputs` is empty or contains zero.
    pub fn from_integers(inputs: impl IntoIterator<Item = u64>) -> Result<Self> {
        let inputs = inputs
            .into_iter()
            .map(|n| {
                NonZero::new(n).ok_or_else(|| {
                    Error::InvalidInput("input integers must be positive, got 0".to_string())
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(inputs)
    }

    /// The inputs, in batch order.
    #[must_use]
    pub fn inputs(&self) -> &[NonZero<u64>] {
        &self.inputs
    }

    /// Iterates over the inputs as plain integers, in batch order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.inputs.iter().map(|n| n.get())
    }

    /// The number of inputs in the batch. Never zero.
    #[must_use]
    pub fn len(&self) -> NonZero<usize> {
        NonZero::new(self.inputs.len()).expect("guarded by constructor - a batch is never empty")
    }
}

impl Default for InputBatch {
    fn default() -> Self {
        Self {
            inputs: Arc::from(DEFAULT_INPUTS.as_slice()),
        }
    }
}
