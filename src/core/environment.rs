use crate::core::config::{SummaryLabels, TestConfig};
use crate::core::hardware::HardwareInfo;

/// Process-scope resources acquired before the run starts and shared
/// read-only with every check.
#[derive(Debug, Clone, Default)]
pub struct RunEnvironment {
    pub config: TestConfig,
    pub hardware: HardwareInfo,
    pub labels: SummaryLabels,
}

impl RunEnvironment {
    pub fn new(config: TestConfig, hardware: HardwareInfo, labels: SummaryLabels) -> Self {
        Self { config, hardware, labels }
    }

    /// Probe the host and resolve label overrides from the environment.
    pub fn detect(config: TestConfig) -> Self {
        Self::new(config, HardwareInfo::detect(), SummaryLabels::from_env())
    }
}
