use std::fmt;
use std::str::FromStr;

use crate::common::{Error, Result};

/// Workgroup shape for 2D compute dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkgroupSize {
    pub x: u32,
    pub y: u32,
}

impl WorkgroupSize {
    /// Used when the caller does not override the shape.
    pub const DEFAULT: WorkgroupSize = WorkgroupSize { x: 16, y: 8 };

    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Total invocations per workgroup.
    pub fn total(&self) -> u32 {
        self.x * self.y
    }

    /// Number of workgroups needed to cover a `width`×`height` image.
    pub fn dispatch_size(&self, width: u32, height: u32) -> (u32, u32) {
        (width.div_ceil(self.x), height.div_ceil(self.y))
    }

    /// Checks the shape against the limits of the device it will run on.
    pub fn validate(&self, limits: &wgpu::Limits) -> Result<()> {
        if self.x == 0 || self.y == 0 {
            return Err(Error::config(format!(
                "Workgroup size {} must be non-zero",
                self
            )));
        }
        if self.x > limits.max_compute_workgroup_size_x
            || self.y > limits.max_compute_workgroup_size_y
        {
            return Err(Error::config(format!(
                "Workgroup size {} exceeds device limits ({}x{})",
                self, limits.max_compute_workgroup_size_x, limits.max_compute_workgroup_size_y
            )));
        }
        if self.total() > limits.max_compute_invocations_per_workgroup {
            return Err(Error::config(format!(
                "Workgroup size {} has {} invocations, device allows {}",
                self,
                self.total(),
                limits.max_compute_invocations_per_workgroup
            )));
        }

        Ok(())
    }
}

impl Default for WorkgroupSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for WorkgroupSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// Parses `"XxY"` or `"X,Y"`.
impl FromStr for WorkgroupSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::config(format!("Invalid workgroup size '{}'", s));

        let (x, y) = s
            .split_once(['x', ','])
            .ok_or_else(invalid)?;
        let x = x.trim().parse().map_err(|_| invalid())?;
        let y = y.trim().parse().map_err(|_| invalid())?;

        Ok(Self::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_covers_partial_tiles() {
        let wg = WorkgroupSize::new(16, 8);
        assert_eq!(wg.dispatch_size(1, 1), (1, 1));
        assert_eq!(wg.dispatch_size(16, 8), (1, 1));
        assert_eq!(wg.dispatch_size(17, 9), (2, 2));
        assert_eq!(wg.dispatch_size(1920, 1080), (120, 135));
    }

    #[test]
    fn validates_against_limits() {
        let limits = wgpu::Limits::default();
        assert!(WorkgroupSize::DEFAULT.validate(&limits).is_ok());
        assert!(WorkgroupSize::new(0, 8).validate(&limits).is_err());
        assert!(WorkgroupSize::new(32, 32).validate(&limits).is_err());
        assert!(WorkgroupSize::new(1024, 1).validate(&limits).is_err());
    }

    #[test]
    fn parses_both_separators() {
        assert_eq!("8x4".parse::<WorkgroupSize>().unwrap(), WorkgroupSize::new(8, 4));
        assert_eq!("16,2".parse::<WorkgroupSize>().unwrap(), WorkgroupSize::new(16, 2));
        assert!("16".parse::<WorkgroupSize>().is_err());
        assert!("ax4".parse::<WorkgroupSize>().is_err());
    }
}
