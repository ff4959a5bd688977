use crate::constants::{AMBIENT_LIGHT, CLEAR_RGB, LIGHT_DIR};
use fnv::FnvHashMap;
use glam::Mat4;
use web_sys as web;
use wishverse_core::mesh::{prune_custom_meshes, MeshKey};
use wishverse_core::scene::{NodeKey, SceneNode, SceneOp};
use wishverse_core::Camera;

mod helpers;
use helpers::{create_depth_texture, make_mesh_pipeline, uniform_bind_group, uniform_layout, GpuMesh};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct GlobalsUniform {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    light: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct NodeUniform {
    model: [[f32; 4]; 4],
    normal_mat: [[f32; 4]; 4],
    color: [f32; 4],
    emissive: [f32; 4],
    params: [f32; 4],
}

impl NodeUniform {
    fn from_node(node: &SceneNode) -> Self {
        let m = &node.material;
        let normal_mat = node.transform.inverse().transpose();
        Self {
            model: node.transform.to_cols_array_2d(),
            normal_mat: if normal_mat.is_finite() {
                normal_mat.to_cols_array_2d()
            } else {
                Mat4::IDENTITY.to_cols_array_2d()
            },
            color: m.color.to_array4(m.opacity),
            emissive: m.emissive.to_array4(if m.unlit { 1.0 } else { 0.0 }),
            params: [m.roughness, m.metalness, 0.0, 0.0],
        }
    }
}

struct GpuNode {
    mesh: MeshKey,
    translucent: bool,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    opaque_pipeline: wgpu::RenderPipeline,
    blend_pipeline: wgpu::RenderPipeline,
    node_layout: wgpu::BindGroupLayout,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    _depth_tex: wgpu::Texture,
    depth_view: wgpu::TextureView,

    meshes: FnvHashMap<MeshKey, GpuMesh>,
    nodes: FnvHashMap<NodeKey, GpuNode>,
    // draw order mirrors the retained scene
    order: Vec<NodeKey>,

    width: u32,
    height: u32,
    clear_color: wgpu::Color,
}

impl<'a> GpuState<'a> {
    pub async fn new(canvas: &'a web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cake_shader"),
            source: wgpu::ShaderSource::Wgsl(wishverse_core::CAKE_WGSL.into()),
        });
        let globals_layout = uniform_layout(&device, "globals_bgl");
        let node_layout = uniform_layout(&device, "node_bgl");
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pl"),
            bind_group_layouts: &[&globals_layout, &node_layout],
            push_constant_ranges: &[],
        });
        let opaque_pipeline = make_mesh_pipeline(&device, &pipeline_layout, &shader, format, false);
        let blend_pipeline = make_mesh_pipeline(&device, &pipeline_layout, &shader, format, true);

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<GlobalsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = uniform_bind_group(&device, &globals_layout, &globals_buffer, "globals_bg");
        let (depth_tex, depth_view) = create_depth_texture(&device, width, height);

        log::info!("[gpu] ready {}x{} {:?}", width, height, format);
        Ok(Self {
            surface,
            device,
            queue,
            config,
            opaque_pipeline,
            blend_pipeline,
            node_layout,
            globals_buffer,
            globals_bind_group,
            _depth_tex: depth_tex,
            depth_view,
            meshes: FnvHashMap::default(),
            nodes: FnvHashMap::default(),
            order: Vec::new(),
            width,
            height,
            clear_color: wgpu::Color {
                r: CLEAR_RGB[0],
                g: CLEAR_RGB[1],
                b: CLEAR_RGB[2],
                a: 1.0,
            },
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            let (tex, view) = create_depth_texture(&self.device, width, height);
            self._depth_tex = tex;
            self.depth_view = view;
        }
    }

    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn ensure_mesh(&mut self, key: MeshKey, custom_path: Option<&[[f32; 2]]>) {
        if !self.meshes.contains_key(&key) {
            let mesh = key.build(custom_path);
            log::debug!("[gpu] mesh {:?}: {} tris", key, mesh.triangle_count());
            let gpu = GpuMesh::upload(&self.device, &mesh, "mesh");
            self.meshes.insert(key, gpu);
        }
    }

    /// Apply a retained-scene diff. `custom_path` feeds custom tier meshes.
    pub fn apply<'n>(
        &mut self,
        ops: impl IntoIterator<Item = &'n SceneOp>,
        order: impl Iterator<Item = &'n NodeKey>,
        custom_path: Option<&[[f32; 2]]>,
    ) {
        for op in ops {
            match op {
                SceneOp::Add(node) => {
                    self.ensure_mesh(node.mesh, custom_path);
                    let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some("node"),
                        size: std::mem::size_of::<NodeUniform>() as u64,
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    });
                    self.queue
                        .write_buffer(&buffer, 0, bytemuck::bytes_of(&NodeUniform::from_node(node)));
                    let bind_group = uniform_bind_group(&self.device, &self.node_layout, &buffer, "node_bg");
                    self.nodes.insert(
                        node.key.clone(),
                        GpuNode {
                            mesh: node.mesh,
                            translucent: node.material.opacity < 1.0,
                            buffer,
                            bind_group,
                        },
                    );
                }
                SceneOp::Update(node) => {
                    self.ensure_mesh(node.mesh, custom_path);
                    if let Some(gpu) = self.nodes.get_mut(&node.key) {
                        gpu.mesh = node.mesh;
                        gpu.translucent = node.material.opacity < 1.0;
                        self.queue
                            .write_buffer(&gpu.buffer, 0, bytemuck::bytes_of(&NodeUniform::from_node(node)));
                    }
                }
                SceneOp::Remove(key) => {
                    self.nodes.remove(key);
                }
            }
        }
        self.order.clear();
        self.order.extend(order.cloned());
        let evicted = prune_custom_meshes(&mut self.meshes, self.nodes.values().map(|n| n.mesh));
        if evicted > 0 {
            log::debug!("[gpu] evicted {evicted} custom tier mesh(es)");
        }
    }

    pub fn render(&mut self, camera: &Camera) -> Result<(), wgpu::SurfaceError> {
        let globals = GlobalsUniform {
            view_proj: camera.view_projection().to_cols_array_2d(),
            eye: camera.eye.extend(1.0).to_array(),
            light: [LIGHT_DIR[0], LIGHT_DIR[1], LIGHT_DIR[2], AMBIENT_LIGHT],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.globals_bind_group, &[]);
            // opaque first, then translucent on top
            for translucent in [false, true] {
                rpass.set_pipeline(if translucent {
                    &self.blend_pipeline
                } else {
                    &self.opaque_pipeline
                });
                for key in &self.order {
                    let Some(node) = self.nodes.get(key) else {
                        continue;
                    };
                    if node.translucent != translucent {
                        continue;
                    }
                    let Some(mesh) = self.meshes.get(&node.mesh) else {
                        continue;
                    };
                    if mesh.index_count == 0 {
                        continue;
                    }
                    rpass.set_bind_group(1, &node.bind_group, &[]);
                    rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
