use wgpu::{Buffer, BufferUsages, Device, Queue};

use crate::camera::Camera;
use crate::config::{BACKGROUND_COLOR, LAVA_COLOR, MAX_CONTRIBUTORS, RAYMARCH_STEPS};
use crate::simulation::volume::VolumeTransform;
use crate::simulation::{Contributor, ContributorBatch};

/// Scene parameters passed to the ray-march shader (160 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneParams {
    // Camera (80 bytes)
    pub inv_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],

    // Volume placement (16 bytes) - vec3 + f32 share one 16-byte slot
    pub volume_position: [f32; 3],
    pub volume_rotation_y: f32,

    // Field (16 bytes)
    pub volume_scale: f32,
    pub isolation: f32,
    pub subtract: f32,
    pub ball_count: u32,

    // March settings (16 bytes)
    pub max_steps: u32,
    pub _padding: [u32; 3],

    // Colors (32 bytes)
    pub background: [f32; 4],
    pub lava_color: [f32; 4],
}

impl SceneParams {
    pub fn new(camera: &Camera, transform: &VolumeTransform, isolation: f32, subtract: f32, ball_count: u32) -> Self {
        Self {
            inv_view_proj: camera.view_projection().inverse().to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).to_array(),
            volume_position: transform.position.to_array(),
            volume_rotation_y: transform.rotation_y,
            volume_scale: transform.scale,
            isolation,
            subtract,
            ball_count,
            max_steps: RAYMARCH_STEPS,
            _padding: [0; 3],
            background: BACKGROUND_COLOR,
            lava_color: LAVA_COLOR,
        }
    }
}

/// Storage buffer of contributors plus the scene uniform
pub struct VolumeBuffers {
    pub balls_buffer: Buffer,
    pub params_buffer: Buffer,
    /// Contributors in the last uploaded batch
    ball_count: u32,
    uploaded_generation: Option<u64>,
}

impl VolumeBuffers {
    pub fn new(device: &Device) -> Self {
        let balls_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("contributor-buffer"),
            size: (MAX_CONTRIBUTORS * std::mem::size_of::<Contributor>()) as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene-params-buffer"),
            size: std::mem::size_of::<SceneParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            balls_buffer,
            params_buffer,
            ball_count: 0,
            uploaded_generation: None,
        }
    }

    /// Upload a finalized batch unless it was already uploaded
    pub fn upload_batch(&mut self, queue: &Queue, batch: &ContributorBatch) {
        if self.uploaded_generation == Some(batch.generation()) {
            return;
        }

        let contributors = batch.contributors();
        let count = contributors.len().min(MAX_CONTRIBUTORS);
        if count < contributors.len() {
            log::warn!(
                "Dropping {} contributors beyond GPU capacity of {}",
                contributors.len() - count,
                MAX_CONTRIBUTORS
            );
        }

        if count > 0 {
            queue.write_buffer(&self.balls_buffer, 0, bytemuck::cast_slice(&contributors[..count]));
        }
        self.ball_count = count as u32;
        self.uploaded_generation = Some(batch.generation());
    }

    pub fn update_params(&self, queue: &Queue, params: &SceneParams) {
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));
    }

    pub fn ball_count(&self) -> u32 {
        self.ball_count
    }
}
