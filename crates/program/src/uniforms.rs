use crate::cache::{BlockLayout, UniformLocation};

/// CPU-side staging copy of one uniform block.
///
/// Values are written at the offsets reflected from the program, then the
/// whole block is uploaded once per frame.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: BlockLayout,
    data: Vec<u8>,
}

impl UniformBlock {
    pub fn new(layout: BlockLayout) -> Self {
        Self {
            layout,
            data: vec![0; layout.size as usize],
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copy `bytes` to `location`.
    ///
    /// Returns `false` without touching the block when the location is absent,
    /// belongs to another block, or is not a block member large enough.
    pub fn write(&mut self, location: Option<UniformLocation>, bytes: &[u8]) -> bool {
        let Some(UniformLocation::Block {
            group,
            binding,
            offset,
            size,
        }) = location
        else {
            return false;
        };
        if group != self.layout.group || binding != self.layout.binding {
            return false;
        }
        let start = offset as usize;
        let end = start + bytes.len();
        if bytes.len() > size as usize || end > self.data.len() {
            tracing::warn!(offset, size, len = bytes.len(), "uniform write out of bounds");
            return false;
        }
        self.data[start..end].copy_from_slice(bytes);
        true
    }

    /// Column-major 4x4 matrix.
    pub fn set_mat4(&mut self, location: Option<UniformLocation>, value: &[f32; 16]) -> bool {
        self.write(location, bytemuck::cast_slice(value))
    }

    pub fn set_vec3(&mut self, location: Option<UniformLocation>, value: [f32; 3]) -> bool {
        self.write(location, bytemuck::cast_slice(&value))
    }

    pub fn set_f32(&mut self, location: Option<UniformLocation>, value: f32) -> bool {
        self.write(location, bytemuck::bytes_of(&value))
    }

    pub fn set_u32(&mut self, location: Option<UniformLocation>, value: u32) -> bool {
        self.write(location, bytemuck::bytes_of(&value))
    }

    /// Booleans are stored as a `u32` of 0 or 1.
    pub fn set_bool(&mut self, location: Option<UniformLocation>, value: bool) -> bool {
        self.set_u32(location, u32::from(value))
    }
}
