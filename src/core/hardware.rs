use serde::{Serialize, Deserialize};
use sysinfo::{System, Components, DiskKind, Disks, Networks};

/// Snapshot of the host taken once before a run. Every check reads it;
/// none of them mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HardwareInfo {
    pub system_info: SystemInfo,
    pub cpu_info: CpuInfo,
    pub memory_info: MemoryInfo,
    pub storage_devices: Vec<StorageDevice>,
    pub thermal_sensors: Vec<ThermalSensor>,
    pub network_interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub os_name: String,
    pub os_version: String,
    pub kernel_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuInfo {
    pub model_name: String,
    pub vendor: String,
    pub physical_cores: Option<u32>,
    pub logical_cores: u32,
    pub frequency_mhz: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub total_swap_bytes: u64,
    pub free_swap_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageDevice {
    pub name: String,
    pub device_type: DiskType,
    pub size_bytes: u64,
    pub available_bytes: u64,
    pub mount_point: String,
    pub filesystem: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiskType {
    Hdd,
    Ssd,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalSensor {
    pub name: String,
    pub current_temp_celsius: f32,
    pub critical_temp_celsius: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    pub mac_address: String,
    pub received_bytes: u64,
    pub transmitted_bytes: u64,
}

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| "unknown".to_string())
}

impl SystemInfo {
    pub fn detect() -> Self {
        Self {
            hostname: or_unknown(System::host_name()),
            os_name: or_unknown(System::name()),
            os_version: or_unknown(System::os_version()),
            kernel_version: or_unknown(System::kernel_version()),
        }
    }
}

impl HardwareInfo {
    /// Probe the host through `sysinfo`.
    pub fn detect() -> Self {
        let mut system = System::new_all();
        system.refresh_all();

        let global = system.global_cpu_info();
        let cpu_info = CpuInfo {
            model_name: global.brand().trim().to_string(),
            vendor: global.vendor_id().to_string(),
            physical_cores: system.physical_core_count().map(|n| n as u32),
            logical_cores: system.cpus().len() as u32,
            frequency_mhz: system.cpus().first().map(|c| c.frequency()).unwrap_or(0),
        };

        let memory_info = MemoryInfo {
            total_bytes: system.total_memory(),
            available_bytes: system.available_memory(),
            total_swap_bytes: system.total_swap(),
            free_swap_bytes: system.free_swap(),
        };

        let disks = Disks::new_with_refreshed_list();
        let storage_devices = disks
            .iter()
            .map(|disk| StorageDevice {
                name: disk.name().to_string_lossy().to_string(),
                device_type: match disk.kind() {
                    DiskKind::SSD => DiskType::Ssd,
                    DiskKind::HDD => DiskType::Hdd,
                    _ => DiskType::Unknown,
                },
                size_bytes: disk.total_space(),
                available_bytes: disk.available_space(),
                mount_point: disk.mount_point().to_string_lossy().to_string(),
                filesystem: disk.file_system().to_string_lossy().to_string(),
            })
            .collect();

        let components = Components::new_with_refreshed_list();
        let thermal_sensors = components
            .iter()
            .map(|component| ThermalSensor {
                name: component.label().to_string(),
                current_temp_celsius: component.temperature(),
                critical_temp_celsius: component.critical(),
            })
            .collect();

        let networks = Networks::new_with_refreshed_list();
        let mut network_interfaces: Vec<NetworkInterface> = networks
            .iter()
            .map(|(name, data)| NetworkInterface {
                name: name.clone(),
                mac_address: data.mac_address().to_string(),
                received_bytes: data.total_received(),
                transmitted_bytes: data.total_transmitted(),
            })
            .collect();
        network_interfaces.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            system_info: SystemInfo::detect(),
            cpu_info,
            memory_info,
            storage_devices,
            thermal_sensors,
            network_interfaces,
        }
    }
}
