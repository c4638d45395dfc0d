//! GPU rendering implementation using wgpu
//!
//! Converts batched draws to actual GPU draw calls. All geometry for a frame
//! is uploaded once, then each batch draws its own vertex range so paint
//! order matches batch order.

use crate::error::GpuError;
use crate::font::ATLAS_SIZE;
use crate::render::{BatchedDraw, GlyphInstance, RectInstance};
use bytemuck::{Pod, Zeroable};
use std::ops::Range;
use std::sync::Arc;

/// Vertex data for rectangles
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct RectVertex {
    pub position: [f32; 2],
    pub color: u32,
}

/// Vertex data for glyphs
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GlyphVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
    pub color: u32,
}

/// Uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ShaderUniforms {
    pub viewport_size: [f32; 2],
    pub _padding: [f32; 2], // Align to 16 bytes
}

const INITIAL_RECT_BUFFER: u64 = 64 * 1024;
const INITIAL_GLYPH_BUFFER: u64 = 256 * 1024;

/// Which pipeline a vertex range belongs to
enum DrawRange {
    Rects(Range<u32>),
    Glyphs(Range<u32>),
}

/// Frame geometry, split into per-batch vertex ranges
#[derive(Default)]
pub struct FrameVertices {
    pub rects: Vec<RectVertex>,
    pub glyphs: Vec<GlyphVertex>,
    ranges: Vec<DrawRange>,
}

impl FrameVertices {
    pub fn from_batches(batches: &[BatchedDraw]) -> Self {
        let mut frame = Self::default();
        for batch in batches {
            match batch {
                BatchedDraw::RectBatch { instances } if !instances.is_empty() => {
                    let start = frame.rects.len() as u32;
                    frame.rects.extend(instances.iter().flat_map(rect_vertices));
                    frame.ranges.push(DrawRange::Rects(start..frame.rects.len() as u32));
                }
                BatchedDraw::GlyphBatch { instances } if !instances.is_empty() => {
                    let start = frame.glyphs.len() as u32;
                    frame.glyphs.extend(instances.iter().flat_map(glyph_vertices));
                    frame.ranges.push(DrawRange::Glyphs(start..frame.glyphs.len() as u32));
                }
                _ => {}
            }
        }
        frame
    }

    pub fn draw_count(&self) -> usize {
        self.ranges.len()
    }
}

/// Two triangles per rectangle
fn rect_vertices(rect: &RectInstance) -> [RectVertex; 6] {
    let (x1, y1) = (rect.rect.x, rect.rect.y);
    let (x2, y2) = (x1 + rect.rect.width, y1 + rect.rect.height);
    let v = |x: f32, y: f32| RectVertex {
        position: [x, y],
        color: rect.color,
    };
    [v(x1, y1), v(x2, y1), v(x1, y2), v(x2, y1), v(x2, y2), v(x1, y2)]
}

fn glyph_vertices(glyph: &GlyphInstance) -> [GlyphVertex; 6] {
    let (x1, y1) = (glyph.rect.x, glyph.rect.y);
    let (x2, y2) = (x1 + glyph.rect.width, y1 + glyph.rect.height);
    let [u0, v0, u1, v1] = glyph.tex_coords;
    let v = |x: f32, y: f32, u: f32, t: f32| GlyphVertex {
        position: [x, y],
        tex_coord: [u, t],
        color: glyph.color,
    };
    [
        v(x1, y1, u0, v0),
        v(x2, y1, u1, v0),
        v(x1, y2, u0, v1),
        v(x2, y1, u1, v0),
        v(x2, y2, u1, v1),
        v(x1, y2, u0, v1),
    ]
}

/// GPU renderer that executes batched draw commands
pub struct GpuRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,

    // Pipelines
    rect_pipeline: wgpu::RenderPipeline,
    glyph_pipeline: wgpu::RenderPipeline,

    // Uniform buffer
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    // Glyph atlas texture
    glyph_texture: wgpu::Texture,
    glyph_bind_group: wgpu::BindGroup,
    atlas_version: Option<u64>,

    // Vertex buffers, grown on demand
    rect_vertex_buffer: wgpu::Buffer,
    glyph_vertex_buffer: wgpu::Buffer,
}

impl GpuRenderer {
    pub async fn new(window: Arc<winit::window::Window>) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Tile Editor Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        // Configure surface
        let size = window.inner_size();
        let config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(GpuError::SurfaceConfig)?;
        surface.configure(&device, &config);

        let rect_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Rectangle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/rect.wgsl").into()),
        });

        let glyph_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Glyph Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/glyph.wgsl").into()),
        });

        // Matches the font atlas
        let glyph_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Glyph Atlas"),
            size: wgpu::Extent3d {
                width: ATLAS_SIZE.0,
                height: ATLAS_SIZE.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let glyph_texture_view = glyph_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let glyph_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<ShaderUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let glyph_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Glyph Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let glyph_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Glyph Bind Group"),
            layout: &glyph_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&glyph_texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&glyph_sampler),
                },
            ],
        });

        let rect_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Rect Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let glyph_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Glyph Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout, &glyph_bind_group_layout],
                push_constant_ranges: &[],
            });

        let color_target = [Some(wgpu::ColorTargetState {
            format: config.format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let rect_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Rect Pipeline"),
            layout: Some(&rect_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &rect_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<RectVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                        wgpu::VertexAttribute {
                            offset: 8,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Uint32,
                        },
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &rect_shader,
                entry_point: Some("fs_main"),
                targets: &color_target,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let glyph_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Glyph Pipeline"),
            layout: Some(&glyph_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &glyph_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GlyphVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                        wgpu::VertexAttribute {
                            offset: 8,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                        wgpu::VertexAttribute {
                            offset: 16,
                            shader_location: 2,
                            format: wgpu::VertexFormat::Uint32,
                        },
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &glyph_shader,
                entry_point: Some("fs_main"),
                targets: &color_target,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let rect_vertex_buffer = vertex_buffer(&device, "Rect Vertex Buffer", INITIAL_RECT_BUFFER);
        let glyph_vertex_buffer = vertex_buffer(&device, "Glyph Vertex Buffer", INITIAL_GLYPH_BUFFER);

        Ok(Self {
            device,
            queue,
            surface,
            config,
            rect_pipeline,
            glyph_pipeline,
            uniform_buffer,
            uniform_bind_group,
            glyph_texture,
            glyph_bind_group,
            atlas_version: None,
            rect_vertex_buffer,
            glyph_vertex_buffer,
        })
    }

    /// Upload font atlas texture to GPU
    pub fn upload_font_atlas(&mut self, atlas_data: &[u8], (width, height): (u32, u32), version: u64) {
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.glyph_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            atlas_data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width), // R8: 1 byte per pixel
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.atlas_version = Some(version);
        log::debug!("Uploaded glyph atlas v{version}");
    }

    /// Atlas version last uploaded, if any
    pub fn atlas_version(&self) -> Option<u64> {
        self.atlas_version
    }

    /// Execute batched draw commands over a cleared frame
    pub fn render(&mut self, batches: &[BatchedDraw], logical_viewport: (f32, f32), clear: wgpu::Color) {
        // Shaders work in logical pixels
        let uniforms = ShaderUniforms {
            viewport_size: [logical_viewport.0, logical_viewport.1],
            _padding: [0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                log::warn!("Failed to get surface texture: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = FrameVertices::from_batches(batches);
        self.upload(&frame);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            for range in &frame.ranges {
                match range {
                    DrawRange::Rects(vertices) => {
                        render_pass.set_pipeline(&self.rect_pipeline);
                        render_pass.set_vertex_buffer(0, self.rect_vertex_buffer.slice(..));
                        render_pass.draw(vertices.clone(), 0..1);
                    }
                    DrawRange::Glyphs(vertices) => {
                        render_pass.set_pipeline(&self.glyph_pipeline);
                        render_pass.set_bind_group(1, &self.glyph_bind_group, &[]);
                        render_pass.set_vertex_buffer(0, self.glyph_vertex_buffer.slice(..));
                        render_pass.draw(vertices.clone(), 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn upload(&mut self, frame: &FrameVertices) {
        let rect_bytes: &[u8] = bytemuck::cast_slice(&frame.rects);
        let glyph_bytes: &[u8] = bytemuck::cast_slice(&frame.glyphs);

        ensure_capacity(&self.device, &mut self.rect_vertex_buffer, "Rect Vertex Buffer", rect_bytes.len());
        ensure_capacity(&self.device, &mut self.glyph_vertex_buffer, "Glyph Vertex Buffer", glyph_bytes.len());

        if !rect_bytes.is_empty() {
            self.queue.write_buffer(&self.rect_vertex_buffer, 0, rect_bytes);
        }
        if !glyph_bytes.is_empty() {
            self.queue.write_buffer(&self.glyph_vertex_buffer, 0, glyph_bytes);
        }
    }

    /// Resize surface when window changes
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

fn vertex_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Replace `buffer` with a larger one if `needed` bytes don't fit
fn ensure_capacity(device: &wgpu::Device, buffer: &mut wgpu::Buffer, label: &str, needed: usize) {
    let needed = needed as u64;
    if needed <= buffer.size() {
        return;
    }
    let size = needed.next_power_of_two();
    log::debug!("Growing {label} to {size} bytes");
    *buffer = vertex_buffer(device, label, size);
}
