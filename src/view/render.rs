use wgpu::*;
use wgpu::util::DeviceExt;

use crate::config::RenderConfig;
use crate::error::SceneError;
use crate::model::{Material, PerspectiveCamera, PrimitiveHandle, Scene, Shape};
use crate::view::backend::RenderBackend;
use crate::view::gpu_init::GpuContext;
use crate::view::mesh::{Instance, Mesh, MeshBuffer, Vertex};

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

pub struct CameraResources {
    pub camera_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub camera_bind_group: wgpu::BindGroup,
}

pub fn create_camera_resources(device: &wgpu::Device) -> CameraResources {
    let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("camera_buffer"),
        size: std::mem::size_of::<CameraUniform>() as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera_bgl"),
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

    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() }],
    });

    CameraResources { camera_buffer, bind_group_layout, camera_bind_group }
}

pub fn create_tile_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layout: &wgpu::BindGroupLayout,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("tile_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/tile.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("tile_pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("tile_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout(), Instance::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState { format, blend: Some(wgpu::BlendState::REPLACE), write_mask: wgpu::ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        // Planes are single-sided: the board disappears when orbited from behind.
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState { count: sample_count, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// Multisampled color target, or `None` when antialiasing is off.
pub fn create_msaa_view(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    sample_count: u32,
) -> Option<wgpu::TextureView> {
    if sample_count <= 1 {
        return None;
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("msaa_color"),
        size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
}

///////////////////////////////////////////////////////////////////////////////

/// Draws a [`Scene`] to a wgpu surface.
pub struct WgpuRenderer {
    gpu: GpuContext,
    pipeline: RenderPipeline,
    camera: CameraResources,
    sample_count: u32,
    msaa_view: Option<TextureView>,
    clear_color: Color,

    primitives: Vec<MeshBuffer>,

    // Instance offsets mirror the scene's nodes; rebuilt when its revision moves.
    instance_buffer: Option<Buffer>,
    draw_list: Vec<PrimitiveHandle>,
    synced_revision: Option<u64>,
}

impl WgpuRenderer {
    pub fn new(gpu: GpuContext, config: &RenderConfig) -> Self {
        let sample_count = config.sample_count();
        let camera = create_camera_resources(&gpu.device);
        let pipeline = create_tile_pipeline(&gpu.device, gpu.format, &camera.bind_group_layout, sample_count);
        let msaa_view = create_msaa_view(&gpu.device, gpu.format, gpu.config.width, gpu.config.height, sample_count);
        let [r, g, b, a] = config.clear_color;

        tracing::debug!(format = ?gpu.format, sample_count, "renderer created");

        Self {
            gpu,
            pipeline,
            camera,
            sample_count,
            msaa_view,
            clear_color: Color { r, g, b, a },
            primitives: Vec::new(),
            instance_buffer: None,
            draw_list: Vec::new(),
            synced_revision: None,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.gpu.config.width, self.gpu.config.height)
    }

    fn sync_instances(&mut self, scene: &Scene) {
        if self.synced_revision == Some(scene.revision()) {
            return;
        }

        let instances: Vec<Instance> = scene
            .nodes()
            .map(|n| Instance { offset: n.position.to_array() })
            .collect();
        self.draw_list = scene.nodes().map(|n| n.primitive).collect();
        self.instance_buffer = (!instances.is_empty()).then(|| {
            self.gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("instance_buffer"),
                contents: bytemuck::cast_slice(&instances),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });
        self.synced_revision = Some(scene.revision());

        tracing::debug!(nodes = instances.len(), revision = scene.revision(), "instances uploaded");
    }
}

impl RenderBackend for WgpuRenderer {
    fn create_primitive(&mut self, shape: &Shape, material: &Material) -> PrimitiveHandle {
        let handle = PrimitiveHandle(self.primitives.len() as u32);
        self.primitives.push(Mesh::from_shape(shape, material).upload(&self.gpu.device));
        handle
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if self.size() == (width.max(1), height.max(1)) {
            return;
        }
        self.gpu.resize(width, height);
        self.msaa_view = create_msaa_view(
            &self.gpu.device,
            self.gpu.format,
            self.gpu.config.width,
            self.gpu.config.height,
            self.sample_count,
        );
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), SceneError> {
        let uniform = CameraUniform { view_proj: camera.view_proj().to_cols_array_2d() };
        self.gpu.queue.write_buffer(&self.camera.camera_buffer, 0, bytemuck::bytes_of(&uniform));
        self.sync_instances(scene);

        let frame = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(SurfaceError::Timeout) => {
                tracing::warn!("timed out acquiring surface texture, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(SceneError::Surface(e)),
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let (target, resolve_target, store) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&view), StoreOp::Discard),
            None => (&view, None, StoreOp::Store),
        };

        let mut encoder = self.gpu.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(instances) = &self.instance_buffer {
                rp.set_pipeline(&self.pipeline);
                rp.set_bind_group(0, &self.camera.camera_bind_group, &[]);
                let stride = std::mem::size_of::<Instance>() as BufferAddress;

                for (i, handle) in self.draw_list.iter().enumerate() {
                    let Some(mesh) = self.primitives.get(handle.0 as usize) else {
                        continue;
                    };
                    // Offset the instance binding instead of first_instance, which WebGL2 lacks.
                    let offset = i as BufferAddress * stride;
                    rp.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    rp.set_vertex_buffer(1, instances.slice(offset..offset + stride));
                    rp.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint32);
                    rp.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
