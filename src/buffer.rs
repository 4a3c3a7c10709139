//! Buffer and device-memory management, plus the staged upload path.

use std::mem::size_of;

use anyhow::{anyhow, Result};
use vulkanalia::prelude::v1_0::*;

use crate::app::RenderContext;
use crate::vertex::{Vertex, INDICES, VERTICES};

/// Picks a memory type whose bit is set in the requirement mask and whose
/// property flags are a superset of `properties`. When several types qualify
/// the highest-indexed one wins.
pub fn find_memory_type(
    memory: &vk::PhysicalDeviceMemoryProperties,
    requirements: vk::MemoryRequirements,
    properties: vk::MemoryPropertyFlags,
) -> Result<u32> {
    (0..memory.memory_type_count)
        .filter(|i| {
            let suitable = (requirements.memory_type_bits & (1 << i)) != 0;
            let memory_type = memory.memory_types[*i as usize];
            suitable && memory_type.property_flags.contains(properties)
        })
        .last()
        .ok_or_else(|| {
            anyhow!(
                "no memory type satisfies mask {:#b} with flags {:?}",
                requirements.memory_type_bits,
                properties
            )
        })
}

pub unsafe fn create_buffer(
    instance: &Instance,
    device: &Device,
    data: &RenderContext,
    size: vk::DeviceSize,
    usage: vk::BufferUsageFlags,
    properties: vk::MemoryPropertyFlags,
) -> Result<(vk::Buffer, vk::DeviceMemory)> {
    let buffer_info = vk::BufferCreateInfo::builder()
        .size(size)
        .usage(usage)
        .sharing_mode(vk::SharingMode::EXCLUSIVE);

    let buffer = device.create_buffer(&buffer_info, None)?;

    let requirements = device.get_buffer_memory_requirements(buffer);
    let memory = instance.get_physical_device_memory_properties(data.physical_device);
    let memory_type = find_memory_type(&memory, requirements, properties)?;

    let alloc_info = vk::MemoryAllocateInfo::builder()
        .allocation_size(requirements.size)
        .memory_type_index(memory_type);

    let buffer_memory = device.allocate_memory(&alloc_info, None)?;
    device.bind_buffer_memory(buffer, buffer_memory, 0)?;

    Ok((buffer, buffer_memory))
}

/// One-shot buffer-to-buffer copy. Blocks until the graphics queue is idle,
/// so the source can be destroyed as soon as this returns.
pub unsafe fn copy_buffer(
    device: &Device,
    data: &RenderContext,
    src_buffer: vk::Buffer,
    dst_buffer: vk::Buffer,
    size: vk::DeviceSize,
) -> Result<()> {
    let alloc_info = vk::CommandBufferAllocateInfo::builder()
        .level(vk::CommandBufferLevel::PRIMARY)
        .command_pool(data.command_pool)
        .command_buffer_count(1);

    let command_buffer = device.allocate_command_buffers(&alloc_info)?[0];

    let info =
        vk::CommandBufferBeginInfo::builder().flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

    device.begin_command_buffer(command_buffer, &info)?;

    let regions = vk::BufferCopy::builder()
        .src_offset(0)
        .dst_offset(0)
        .size(size);

    device.cmd_copy_buffer(command_buffer, src_buffer, dst_buffer, &[regions]);

    device.end_command_buffer(command_buffer)?;

    let command_buffers = &[command_buffer];
    let info = vk::SubmitInfo::builder().command_buffers(command_buffers);

    device.queue_submit(data.graphics_queue, &[info], vk::Fence::null())?;
    device.queue_wait_idle(data.graphics_queue)?;

    device.free_command_buffers(data.command_pool, &[command_buffer]);

    Ok(())
}

pub unsafe fn create_vertex_buffer(
    instance: &Instance,
    device: &Device,
    data: &mut RenderContext,
) -> Result<()> {
    let size = (VERTICES.len() * size_of::<Vertex>()) as u64;

    let (staging_buffer, staging_buffer_memory) = create_buffer(
        instance,
        device,
        data,
        size,
        vk::BufferUsageFlags::TRANSFER_SRC,
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
    )?;

    let memory = device.map_memory(staging_buffer_memory, 0, size, vk::MemoryMapFlags::empty())?;
    std::ptr::copy_nonoverlapping(VERTICES.as_ptr(), memory.cast(), VERTICES.len());
    device.unmap_memory(staging_buffer_memory);

    let (vertex_buffer, vertex_buffer_memory) = create_buffer(
        instance,
        device,
        data,
        size,
        vk::BufferUsageFlags::TRANSFER_DST | vk::BufferUsageFlags::VERTEX_BUFFER,
        vk::MemoryPropertyFlags::DEVICE_LOCAL,
    )?;

    data.vertex_buffer = vertex_buffer;
    data.vertex_buffer_memory = vertex_buffer_memory;

    copy_buffer(device, data, staging_buffer, vertex_buffer, size)?;

    device.destroy_buffer(staging_buffer, None);
    device.free_memory(staging_buffer_memory, None);

    Ok(())
}

pub unsafe fn create_index_buffer(
    instance: &Instance,
    device: &Device,
    data: &mut RenderContext,
) -> Result<()> {
    let size = (INDICES.len() * size_of::<u16>()) as u64;

    let (staging_buffer, staging_buffer_memory) = create_buffer(
        instance,
        device,
        data,
        size,
        vk::BufferUsageFlags::TRANSFER_SRC,
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
    )?;

    let memory = device.map_memory(staging_buffer_memory, 0, size, vk::MemoryMapFlags::empty())?;
    std::ptr::copy_nonoverlapping(INDICES.as_ptr(), memory.cast(), INDICES.len());
    device.unmap_memory(staging_buffer_memory);

    let (index_buffer, index_buffer_memory) = create_buffer(
        instance,
        device,
        data,
        size,
        vk::BufferUsageFlags::TRANSFER_DST | vk::BufferUsageFlags::INDEX_BUFFER,
        vk::MemoryPropertyFlags::DEVICE_LOCAL,
    )?;

    data.index_buffer = index_buffer;
    data.index_buffer_memory = index_buffer_memory;

    copy_buffer(device, data, staging_buffer, index_buffer, size)?;

    device.destroy_buffer(staging_buffer, None);
    device.free_memory(staging_buffer_memory, None);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_properties(types: &[vk::MemoryPropertyFlags]) -> vk::PhysicalDeviceMemoryProperties {
        let mut memory = vk::PhysicalDeviceMemoryProperties::default();
        memory.memory_type_count = types.len() as u32;
        for (i, flags) in types.iter().enumerate() {
            memory.memory_types[i] = vk::MemoryType {
                property_flags: *flags,
                heap_index: 0,
            };
        }
        memory
    }

    fn requirements(memory_type_bits: u32) -> vk::MemoryRequirements {
        vk::MemoryRequirements {
            size: 256,
            alignment: 16,
            memory_type_bits,
        }
    }

    #[test]
    fn picks_last_qualifying_type() {
        let memory = memory_properties(&[
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        ]);

        let picked = find_memory_type(
            &memory,
            requirements(0b111),
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )
        .unwrap();

        // Types 0 and 2 both qualify; the highest index wins.
        assert_eq!(picked, 2);
    }

    #[test]
    fn respects_requirement_mask() {
        let memory = memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ]);

        // Only bit 0 is allowed by the mask.
        let picked =
            find_memory_type(&memory, requirements(0b01), vk::MemoryPropertyFlags::DEVICE_LOCAL)
                .unwrap();
        assert_eq!(picked, 0);
    }

    #[test]
    fn requires_property_superset() {
        let memory = memory_properties(&[
            vk::MemoryPropertyFlags::HOST_VISIBLE,
            vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT
                | vk::MemoryPropertyFlags::HOST_CACHED,
        ]);

        let picked = find_memory_type(
            &memory,
            requirements(0b11),
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )
        .unwrap();

        // Type 0 lacks HOST_COHERENT; type 1 has a superset of the request.
        assert_eq!(picked, 1);
    }

    #[test]
    fn no_qualifying_type_is_an_error() {
        let memory = memory_properties(&[vk::MemoryPropertyFlags::DEVICE_LOCAL]);

        let result = find_memory_type(
            &memory,
            requirements(0b1),
            vk::MemoryPropertyFlags::HOST_VISIBLE,
        );
        assert!(result.is_err());

        // An empty requirement mask also never matches.
        let result =
            find_memory_type(&memory, requirements(0), vk::MemoryPropertyFlags::DEVICE_LOCAL);
        assert!(result.is_err());
    }
}
