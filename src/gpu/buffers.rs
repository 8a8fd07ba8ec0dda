use wgpu::{Buffer, BufferUsages, Device, Queue};

use crate::config::{WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::scene::ShapeInstance;

/// Smallest instance buffer we allocate (boxes + histogram + a few balls fit)
const MIN_CAPACITY: usize = 1024;

/// Layout surface size passed to the shape shader (16 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScreenParams {
    pub width: f32,
    pub height: f32,
    pub _padding: [f32; 2],
}

/// Instance storage buffer plus the screen uniform.
///
/// The storage buffer grows (power of two) when a frame needs more shapes
/// than it can hold; it never shrinks.
pub struct SceneBuffers {
    pub instances: Buffer,
    pub screen_params: Buffer,
    capacity: usize,
    len: u32,
}

impl SceneBuffers {
    pub fn new(device: &Device, queue: &Queue) -> Self {
        let screen_params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("screen-params-buffer"),
            size: std::mem::size_of::<ScreenParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params = ScreenParams {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
            _padding: [0.0, 0.0],
        };
        queue.write_buffer(&screen_params, 0, bytemuck::bytes_of(&params));

        Self {
            instances: create_instance_buffer(device, MIN_CAPACITY),
            screen_params,
            capacity: MIN_CAPACITY,
            len: 0,
        }
    }

    /// Upload this frame's shapes, growing the storage buffer if needed
    pub fn upload(&mut self, device: &Device, queue: &Queue, shapes: &[ShapeInstance]) {
        if shapes.len() > self.capacity {
            self.capacity = shapes.len().next_power_of_two();
            self.instances = create_instance_buffer(device, self.capacity);
            log::debug!("Instance buffer grown to {} shapes", self.capacity);
        }

        if !shapes.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(shapes));
        }
        self.len = shapes.len() as u32;
    }

    /// Number of shapes uploaded for the current frame
    pub fn len(&self) -> u32 {
        self.len
    }
}

fn create_instance_buffer(device: &Device, capacity: usize) -> Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("shape-instance-buffer"),
        size: (capacity * std::mem::size_of::<ShapeInstance>()) as u64,
        usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
