use serde::{Deserialize, Serialize};

use crate::algorithms::boolean::CombineOptions;
use crate::algorithms::chains::ChainOptions;
use crate::algorithms::dead_ends::DeadEndOptions;
use crate::algorithms::loops::LoopOptions;
use crate::error::KernelError;

/// Options for every operation, loadable from one JSON document. Missing
/// sections and keys take their defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub combine: CombineOptions,
    pub chains: ChainOptions,
    pub loops: LoopOptions,
    pub dead_ends: DeadEndOptions,
}

impl KernelConfig {
    pub fn from_json_str(s: &str) -> Result<KernelConfig, KernelError> {
        let config: KernelConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), KernelError> {
        self.combine.validate()?;
        self.chains.validate()?;
        self.loops.validate()?;
        self.dead_ends.validate()
    }

    /// The same matching distance for every operation.
    pub fn with_point_matching_distance(mut self, distance: f64) -> Self {
        self.combine.point_matching_distance = distance;
        self.chains.point_matching_distance = distance;
        self.loops.point_matching_distance = distance;
        self.dead_ends.point_matching_distance = distance;
        self
    }
}
