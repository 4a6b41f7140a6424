//! Recording backend used by the unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use battleball_common::PhysicalSize;

use crate::backend::{
    BufferUsage, CullMode, DepthTest, FrameDraw, GpuBackend, PipelineDesc, Topology,
};
use crate::RenderError;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    RequestAdapter,
    RequestDevice,
    PreferredFormat,
    ConfigureSurface(PhysicalSize),
    CreateBuffer {
        label: String,
        len: usize,
        usage: BufferUsage,
    },
    CreatePipeline {
        stride: u64,
        attributes: Vec<(u32, u64)>,
        topology: Topology,
        cull_mode: CullMode,
        depth_test: DepthTest,
    },
    WriteBuffer {
        label: String,
        offset: u64,
        data: Vec<u8>,
    },
    DrawFrame {
        index_count: u32,
    },
}

#[derive(Debug)]
pub struct MockBuffer {
    pub label: String,
}

#[derive(Default)]
pub struct MockBackend {
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub no_adapter: bool,
    pub device_error: Option<String>,
    pub shader_error: Option<String>,
    pub fail_draws: Rc<Cell<bool>>,
}

impl GpuBackend for MockBackend {
    type Adapter = ();
    type Device = ();
    type Buffer = MockBuffer;
    type Pipeline = ();
    type Format = &'static str;

    async fn request_adapter(&mut self) -> Option<()> {
        self.calls.borrow_mut().push(Call::RequestAdapter);
        if self.no_adapter { None } else { Some(()) }
    }

    async fn request_device(&mut self, _adapter: &()) -> Result<(), RenderError> {
        self.calls.borrow_mut().push(Call::RequestDevice);
        match &self.device_error {
            Some(message) => Err(RenderError::Device(message.clone())),
            None => Ok(()),
        }
    }

    fn preferred_format(&self, _adapter: &()) -> &'static str {
        self.calls.borrow_mut().push(Call::PreferredFormat);
        "mock-srgb"
    }

    fn configure_surface(
        &mut self,
        _device: &(),
        _format: &'static str,
        size: PhysicalSize,
    ) -> Result<(), RenderError> {
        self.calls.borrow_mut().push(Call::ConfigureSurface(size));
        Ok(())
    }

    fn create_buffer(
        &mut self,
        _device: &(),
        label: &str,
        contents: &[u8],
        usage: BufferUsage,
    ) -> MockBuffer {
        self.calls.borrow_mut().push(Call::CreateBuffer {
            label: label.to_string(),
            len: contents.len(),
            usage,
        });
        MockBuffer {
            label: label.to_string(),
        }
    }

    async fn create_pipeline(
        &mut self,
        _device: &(),
        desc: &PipelineDesc<'_, &'static str>,
        _uniforms: &MockBuffer,
    ) -> Result<(), RenderError> {
        self.calls.borrow_mut().push(Call::CreatePipeline {
            stride: desc.vertex_layout.stride,
            attributes: desc
                .vertex_layout
                .attributes
                .iter()
                .map(|a| (a.location, a.offset))
                .collect(),
            topology: desc.topology,
            cull_mode: desc.cull_mode,
            depth_test: desc.depth_test,
        });
        match &self.shader_error {
            Some(message) => Err(RenderError::ShaderCompile(message.clone())),
            None => Ok(()),
        }
    }

    fn write_buffer(&mut self, _device: &(), buffer: &MockBuffer, offset: u64, data: &[u8]) {
        self.calls.borrow_mut().push(Call::WriteBuffer {
            label: buffer.label.clone(),
            offset,
            data: data.to_vec(),
        });
    }

    fn draw_frame(&mut self, _device: &(), frame: &FrameDraw<'_, Self>) -> Result<(), RenderError> {
        self.calls.borrow_mut().push(Call::DrawFrame {
            index_count: frame.index_count,
        });
        if self.fail_draws.get() {
            Err(RenderError::FrameRender("surface lost".into()))
        } else {
            Ok(())
        }
    }
}
