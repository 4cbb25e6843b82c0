use spritegrid_geometry::VertexArrays;
use wgpu::util::DeviceExt;

use crate::pipeline::AttributeSlot;

/// Flat float data backing a named attribute.
pub fn attribute_data<'a>(arrays: &'a VertexArrays, name: &str) -> Option<&'a [f32]> {
    match name {
        "aVertexPosition" => Some(&arrays.positions),
        "aVertexNormal" => Some(&arrays.normals),
        "aVertexTangent" => Some(&arrays.tangents),
        "aVertexBitangent" => Some(&arrays.bitangents),
        "aTextureCoord" => Some(&arrays.texture_coords),
        _ => None,
    }
}

/// Vertex buffers uploaded once at context creation and only bound afterwards.
pub struct VertexBuffers {
    /// In pipeline buffer-layout order.
    buffers: Vec<wgpu::Buffer>,
    vertex_count: u32,
}

impl VertexBuffers {
    pub fn upload(device: &wgpu::Device, arrays: &VertexArrays, slots: &[AttributeSlot]) -> Self {
        let buffers = slots
            .iter()
            .map(|slot| {
                let data = attribute_data(arrays, slot.name).unwrap_or_default();
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(slot.name),
                    contents: bytemuck::cast_slice(data),
                    usage: wgpu::BufferUsages::VERTEX,
                })
            })
            .collect();

        let vertex_count = (arrays.positions.len() / 3) as u32;
        tracing::debug!(buffers = slots.len(), vertex_count, "uploaded vertex buffers");

        Self {
            buffers,
            vertex_count,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        for (index, buffer) in self.buffers.iter().enumerate() {
            pass.set_vertex_buffer(index as u32, buffer.slice(..));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spritegrid_geometry::GridSize;

    #[test]
    fn every_attribute_name_has_data() {
        let arrays = VertexArrays::for_grid(GridSize::new(3, 3));
        let vertices = arrays.vertex_count();
        for name in spritegrid_program::ATTRIBUTE_NAMES {
            let data = attribute_data(&arrays, name).unwrap();
            let components = crate::pipeline::attribute_components(name) as usize;
            assert_eq!(data.len(), vertices * components, "{name}");
        }
    }

    #[test]
    fn unknown_attribute_has_no_data() {
        let arrays = VertexArrays::for_grid(GridSize::new(1, 1));
        assert!(attribute_data(&arrays, "aVertexColor").is_none());
    }
}
