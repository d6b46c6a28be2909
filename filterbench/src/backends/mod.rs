pub(crate) mod compute_kernel;
pub(crate) mod native_cpu;
pub(crate) mod native_gpu;
mod timing;

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

pub use timing::{Stage, Timing};
pub(crate) use timing::run_timed;

use crate::filters::DEFAULT_TOLERANCE;
use crate::gpu::{DeviceSelector, WorkgroupSize};

/// Execution backend a filter runs on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Method {
    /// Scalar CPU loop; ground truth for verification.
    Reference,
    /// Kernel program built from source at run time for the selected device.
    ComputeKernel,
    /// Precompiled row-parallel CPU schedule.
    NativeCpu,
    /// Precompiled GPU schedule with fixed 16×4 tiles.
    NativeGpu,
}

impl Method {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Per-run settings shared by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionParams {
    /// Compare the output against the reference after the timed loop.
    pub verify: bool,
    /// Timed dispatches after the untimed warm-up.
    pub iterations: u32,
    /// Largest accepted per-byte difference during verification.
    pub tolerance: u8,
    pub device: DeviceSelector,
    /// Compute-kernel workgroup override; `None` picks [`WorkgroupSize::DEFAULT`].
    pub workgroup: Option<WorkgroupSize>,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            verify: true,
            iterations: 8,
            tolerance: DEFAULT_TOLERANCE,
            device: DeviceSelector::default(),
            workgroup: None,
        }
    }
}

impl ExecutionParams {
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn device(mut self, device: DeviceSelector) -> Self {
        self.device = device;
        self
    }

    pub fn workgroup(mut self, workgroup: WorkgroupSize) -> Self {
        self.workgroup = Some(workgroup);
        self
    }

    pub(crate) fn workgroup_or_default(&self) -> WorkgroupSize {
        self.workgroup.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn method_names_round_trip() {
        let names: Vec<_> = Method::iter().map(Method::name).collect();
        assert_eq!(
            names,
            ["reference", "compute_kernel", "native_cpu", "native_gpu"]
        );
        assert_eq!(Method::from_str("native_gpu").unwrap(), Method::NativeGpu);
        assert!(Method::from_str("cuda").is_err());
    }

    #[test]
    fn default_params() {
        let params = ExecutionParams::default();

        assert!(params.verify);
        assert_eq!(params.iterations, 8);
        assert_eq!(params.tolerance, 1);
        assert_eq!(params.device, DeviceSelector::new(0, 0));
        assert_eq!(params.workgroup_or_default(), WorkgroupSize::new(16, 8));
    }

    #[test]
    fn builder_overrides_fields() {
        let params = ExecutionParams::default()
            .verify(false)
            .iterations(2)
            .workgroup(WorkgroupSize::new(8, 8));

        assert!(!params.verify);
        assert_eq!(params.iterations, 2);
        assert_eq!(params.workgroup, Some(WorkgroupSize::new(8, 8)));
    }
}
