use tracing::info;
use wgpu::Instance;

/// Failure to obtain a usable rendering device. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("No compatible GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("Request Device Error: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// Device and queue shared by every upload surface.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    pub async fn new() -> Result<Self, GpuError> {
        let instance = Instance::new(&wgpu::InstanceDescriptor::from_env_or_default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: None,
                ..Default::default()
            })
            .await?;
        let adapter_info = adapter.get_info();

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Depthkit Device"),
                ..Default::default()
            })
            .await?;

        info!("Using {} ({:?})", adapter_info.name, adapter_info.backend);
        Ok(Self {
            device,
            queue,
            adapter_info,
        })
    }

    /// Blocking variant of [`GpuContext::new`].
    pub fn acquire() -> Result<Self, GpuError> {
        pollster::block_on(Self::new())
    }
}
