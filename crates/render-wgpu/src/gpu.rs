use battleball_common::PhysicalSize;
use battleball_render::{
    BufferUsage, DepthTest, FrameDraw, GpuBackend, PipelineDesc, RenderError,
};
use wgpu::util::DeviceExt;

use crate::convert;

/// Logical device plus its submission queue.
pub struct WgpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

/// A compiled pipeline with the uniform bind group it draws with.
pub struct WgpuPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    depth_tested: bool,
}

/// [`GpuBackend`] over a wgpu instance and one presentation surface.
pub struct WgpuBackend {
    instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    config: Option<wgpu::SurfaceConfiguration>,
    depth_view: Option<wgpu::TextureView>,
    power_preference: wgpu::PowerPreference,
}

impl WgpuBackend {
    /// Create the instance and a surface for `target` (typically an `Arc<Window>`).
    pub fn new(target: impl Into<wgpu::SurfaceTarget<'static>>) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(target)
            .map_err(|e| RenderError::Device(format!("surface creation failed: {e}")))?;
        Ok(Self {
            instance,
            surface,
            config: None,
            depth_view: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
        })
    }

    pub fn with_power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }

    /// Current surface configuration, once configured.
    pub fn surface_config(&self) -> Option<&wgpu::SurfaceConfiguration> {
        self.config.as_ref()
    }

    /// Depth target matching the configured surface size.
    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sphere_depth_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: convert::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn reconfigure(&self, device: &WgpuDevice) {
        if let Some(config) = &self.config {
            self.surface.configure(&device.device, config);
        }
    }
}

impl GpuBackend for WgpuBackend {
    type Adapter = wgpu::Adapter;
    type Device = WgpuDevice;
    type Buffer = wgpu::Buffer;
    type Pipeline = WgpuPipeline;
    type Format = wgpu::TextureFormat;

    async fn request_adapter(&mut self) -> Option<wgpu::Adapter> {
        let preferred = self
            .instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: self.power_preference,
                compatible_surface: Some(&self.surface),
                force_fallback_adapter: false,
            })
            .await;

        let adapter = match preferred {
            Some(adapter) => adapter,
            None => {
                tracing::warn!("no hardware adapter, trying fallback");
                self.instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::LowPower,
                        compatible_surface: Some(&self.surface),
                        force_fallback_adapter: true,
                    })
                    .await?
            }
        };

        let info = adapter.get_info();
        tracing::info!(
            name = %info.name,
            backend = ?info.backend,
            device_type = ?info.device_type,
            "adapter selected"
        );
        Some(adapter)
    }

    async fn request_device(&mut self, adapter: &wgpu::Adapter) -> Result<WgpuDevice, RenderError> {
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("battleball_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| RenderError::Device(e.to_string()))?;

        device.on_uncaptured_error(Box::new(|err: wgpu::Error| {
            tracing::error!("uncaptured gpu error: {err}");
        }));
        Ok(WgpuDevice { device, queue })
    }

    fn preferred_format(&self, adapter: &wgpu::Adapter) -> wgpu::TextureFormat {
        let caps = self.surface.get_capabilities(adapter);
        caps.formats
            .first()
            .copied()
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb)
    }

    fn configure_surface(
        &mut self,
        device: &WgpuDevice,
        format: wgpu::TextureFormat,
        size: PhysicalSize,
    ) -> Result<(), RenderError> {
        if size.is_empty() {
            return Err(RenderError::SurfaceInvalid {
                width: size.width,
                height: size.height,
            });
        }
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
        };
        self.surface.configure(&device.device, &config);
        self.depth_view = Some(Self::create_depth_view(&device.device, size.width, size.height));
        tracing::debug!(width = size.width, height = size.height, ?format, "surface configured");
        self.config = Some(config);
        Ok(())
    }

    fn create_buffer(
        &mut self,
        device: &WgpuDevice,
        label: &str,
        contents: &[u8],
        usage: BufferUsage,
    ) -> wgpu::Buffer {
        device
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: convert::buffer_usage(usage),
            })
    }

    async fn create_pipeline(
        &mut self,
        device: &WgpuDevice,
        desc: &PipelineDesc<'_, wgpu::TextureFormat>,
        uniforms: &wgpu::Buffer,
    ) -> Result<WgpuPipeline, RenderError> {
        let device = &device.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.shader_source.into()),
        });
        if let Some(err) = device.pop_error_scope().await {
            return Err(RenderError::ShaderCompile(err.to_string()));
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("transform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("transform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let attributes = convert::vertex_attributes(desc.vertex_layout.attributes);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(desc.vertex_entry),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: desc.vertex_layout.stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(desc.fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: desc.target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: convert::topology(desc.topology),
                cull_mode: convert::cull_mode(desc.cull_mode),
                ..Default::default()
            },
            depth_stencil: convert::depth_stencil(desc.depth_test),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });
        if let Some(err) = device.pop_error_scope().await {
            return Err(RenderError::ShaderCompile(err.to_string()));
        }

        Ok(WgpuPipeline {
            pipeline,
            bind_group,
            depth_tested: desc.depth_test != DepthTest::Disabled,
        })
    }

    fn write_buffer(&mut self, device: &WgpuDevice, buffer: &wgpu::Buffer, offset: u64, data: &[u8]) {
        device.queue.write_buffer(buffer, offset, data);
    }

    fn draw_frame(
        &mut self,
        device: &WgpuDevice,
        frame: &FrameDraw<'_, Self>,
    ) -> Result<(), RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.reconfigure(device);
                return Err(RenderError::FrameRender("surface lost, reconfigured".into()));
            }
            Err(e) => return Err(RenderError::FrameRender(format!("acquire failed: {e}"))),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = match (&self.depth_view, frame.pipeline.depth_tested) {
            (Some(depth), true) => Some(depth),
            (None, true) => {
                return Err(RenderError::FrameRender("depth target not configured".into()));
            }
            (_, false) => None,
        };

        device.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut encoder = device
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sphere_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(convert::clear_color(frame.clear_color)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: depth_view.map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Discard,
                        }),
                        stencil_ops: None,
                    }
                }),
                ..Default::default()
            });
            pass.set_pipeline(&frame.pipeline.pipeline);
            pass.set_bind_group(0, &frame.pipeline.bind_group, &[]);
            pass.set_vertex_buffer(0, frame.vertex_buffer.slice(..));
            pass.set_index_buffer(frame.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..frame.index_count, 0, 0..1);
        }
        device.queue.submit(std::iter::once(encoder.finish()));

        if let Some(err) = pollster::block_on(device.device.pop_error_scope()) {
            return Err(RenderError::FrameRender(err.to_string()));
        }
        output.present();
        Ok(())
    }
}
