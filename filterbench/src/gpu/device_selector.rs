//! Device enumeration and selection.
//!
//! wgpu has no notion of an OpenCL-style platform, so adapters are grouped
//! by the graphics API they are exposed through (Vulkan, Metal, DX12, GL).
//! Each group is a platform; the adapters inside it are its devices. The
//! order is stable across calls so that `P:D` indices printed by
//! [`list_platforms`] can be passed back through [`DeviceSelector`].

use std::fmt;
use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};

use crate::common::{Error, Result};

/// Device category filter applied before indexing devices of a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum DeviceType {
    #[default]
    All,
    /// Discrete, integrated or virtual GPU.
    Gpu,
    /// Software rasterizer (llvmpipe, lavapipe, WARP).
    Cpu,
    Other,
}

impl DeviceType {
    pub fn matches(self, device_type: wgpu::DeviceType) -> bool {
        match self {
            DeviceType::All => true,
            DeviceType::Gpu => matches!(
                device_type,
                wgpu::DeviceType::DiscreteGpu
                    | wgpu::DeviceType::IntegratedGpu
                    | wgpu::DeviceType::VirtualGpu
            ),
            DeviceType::Cpu => device_type == wgpu::DeviceType::Cpu,
            DeviceType::Other => device_type == wgpu::DeviceType::Other,
        }
    }
}

/// Which compute device a backend should run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceSelector {
    pub platform_index: u32,
    pub device_index: u32,
    pub device_type: DeviceType,
}

impl DeviceSelector {
    pub fn new(platform_index: u32, device_index: u32) -> Self {
        Self {
            platform_index,
            device_index,
            device_type: DeviceType::All,
        }
    }

    pub fn device_type(mut self, device_type: DeviceType) -> Self {
        self.device_type = device_type;
        self
    }
}

/// Parses `"P:D"`, the format used by the device listing.
impl FromStr for DeviceSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::config(format!("Invalid platform/device index '{}'", s));

        let (platform, device) = s.split_once(':').ok_or_else(invalid)?;
        let platform_index = platform.trim().parse().map_err(|_| invalid())?;
        let device_index = device.trim().parse().map_err(|_| invalid())?;

        Ok(Self::new(platform_index, device_index))
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} ({})",
            self.platform_index, self.device_index, self.device_type
        )
    }
}

/// One platform of the device listing.
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    pub index: u32,
    pub backend: wgpu::Backend,
    pub devices: Vec<wgpu::AdapterInfo>,
}

impl fmt::Display for PlatformInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Platform {}: {:?}", self.index, self.backend)?;
        if self.devices.is_empty() {
            return writeln!(f, "  No devices found.");
        }
        for (index, device) in self.devices.iter().enumerate() {
            writeln!(
                f,
                "  -> Device {}: {} ({:?})",
                index, device.name, device.device_type
            )?;
        }
        Ok(())
    }
}

pub(crate) fn create_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

/// Adapters grouped by backend, in a stable order.
fn platforms(instance: &wgpu::Instance) -> Vec<(wgpu::Backend, Vec<wgpu::Adapter>)> {
    let mut adapters: Vec<(wgpu::AdapterInfo, wgpu::Adapter)> = instance
        .enumerate_adapters(wgpu::Backends::all())
        .into_iter()
        .map(|adapter| (adapter.get_info(), adapter))
        .collect();
    adapters.sort_by(|(a, _), (b, _)| {
        (a.backend as u8, &a.name, a.device).cmp(&(b.backend as u8, &b.name, b.device))
    });

    let mut platforms: Vec<(wgpu::Backend, Vec<wgpu::Adapter>)> = Vec::new();
    for (info, adapter) in adapters {
        match platforms.last_mut() {
            Some((backend, devices)) if *backend == info.backend => devices.push(adapter),
            _ => platforms.push((info.backend, vec![adapter])),
        }
    }

    platforms
}

/// Lists every platform and its devices, for host diagnostics.
pub fn list_platforms() -> Vec<PlatformInfo> {
    let instance = create_instance();

    platforms(&instance)
        .into_iter()
        .enumerate()
        .map(|(index, (backend, adapters))| PlatformInfo {
            index: index as u32,
            backend,
            devices: adapters.iter().map(|a| a.get_info()).collect(),
        })
        .collect()
}

/// Resolves a selector to an adapter.
///
/// Out-of-range indices are configuration errors whose message names the
/// number of platforms/devices actually found.
pub(crate) fn select_adapter(
    instance: &wgpu::Instance,
    selector: &DeviceSelector,
) -> Result<wgpu::Adapter> {
    let mut platforms = platforms(instance);
    let platform_count = platforms.len();

    let platform_index = selector.platform_index as usize;
    if platform_index >= platform_count {
        return Err(Error::config(format!(
            "Platform index {} out of range ({} platforms found)",
            selector.platform_index, platform_count
        )));
    }
    let (_, adapters) = platforms.swap_remove(platform_index);

    let mut devices: Vec<wgpu::Adapter> = adapters
        .into_iter()
        .filter(|a| selector.device_type.matches(a.get_info().device_type))
        .collect();

    let device_index = selector.device_index as usize;
    if device_index >= devices.len() {
        return Err(Error::config(format!(
            "Device index {} out of range ({} devices found)",
            selector.device_index,
            devices.len()
        )));
    }

    Ok(devices.swap_remove(device_index))
}
