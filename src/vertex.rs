//! Static quad geometry and its vertex layout.

use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use vulkanalia::prelude::v1_0::*;

/// One vertex: 2D position in normalized device coordinates plus an RGB color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub color: [f32; 3],
}

impl Vertex {
    pub const fn new(pos: [f32; 2], color: [f32; 3]) -> Self {
        Self { pos, color }
    }

    pub fn binding_description() -> vk::VertexInputBindingDescription {
        vk::VertexInputBindingDescription::builder()
            .binding(0)
            .stride(size_of::<Vertex>() as u32)
            .input_rate(vk::VertexInputRate::VERTEX)
            .build()
    }

    pub fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 2] {
        [
            vk::VertexInputAttributeDescription::builder()
                .binding(0)
                .location(0)
                .format(vk::Format::R32G32_SFLOAT)
                .offset(0)
                .build(),
            vk::VertexInputAttributeDescription::builder()
                .binding(0)
                .location(1)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(size_of::<[f32; 2]>() as u32)
                .build(),
        ]
    }
}

/// The four corners of the quad, listed clockwise to match the pipeline's
/// front-face winding.
pub const VERTICES: [Vertex; 4] = [
    Vertex::new([-0.5, -0.5], [1.0, 0.0, 0.0]),
    Vertex::new([0.5, -0.5], [0.0, 1.0, 0.0]),
    Vertex::new([0.5, 0.5], [0.0, 0.0, 1.0]),
    Vertex::new([-0.5, 0.5], [1.0, 1.0, 1.0]),
];

/// Two triangles sharing the quad's diagonal.
pub const INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_stride_matches_vertex_size() {
        let binding = Vertex::binding_description();
        assert_eq!(binding.binding, 0);
        assert_eq!(binding.stride, 20);
        assert_eq!(binding.stride as usize, size_of::<Vertex>());
        assert_eq!(binding.input_rate, vk::VertexInputRate::VERTEX);
    }

    #[test]
    fn attributes_describe_position_then_color() {
        let [pos, color] = Vertex::attribute_descriptions();

        assert_eq!(pos.location, 0);
        assert_eq!(pos.format, vk::Format::R32G32_SFLOAT);
        assert_eq!(pos.offset, 0);

        assert_eq!(color.location, 1);
        assert_eq!(color.format, vk::Format::R32G32B32_SFLOAT);
        assert_eq!(color.offset, 8);
    }

    #[test]
    fn quad_is_two_triangles_over_four_vertices() {
        assert_eq!(VERTICES.len(), 4);
        assert_eq!(INDICES.len(), 6);
        assert!(INDICES.iter().all(|&i| (i as usize) < VERTICES.len()));
        // Both triangles share the 0-2 diagonal.
        assert_eq!(&INDICES[..3], &[0, 1, 2]);
        assert_eq!(&INDICES[3..], &[2, 3, 0]);
    }
}
