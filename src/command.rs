//! Command pool and the pre-recorded per-image command buffers.
//!
//! Render state never changes after startup, so one command buffer is
//! recorded per swapchain image up front and resubmitted every frame.

use anyhow::Result;
use vulkanalia::prelude::v1_0::*;

use crate::app::RenderContext;
use crate::device::QueueFamilyIndices;
use crate::vertex::INDICES;

pub unsafe fn create_command_pool(
    instance: &Instance,
    device: &Device,
    data: &mut RenderContext,
) -> Result<()> {
    let indices = QueueFamilyIndices::get(instance, data, data.physical_device)?;

    let info = vk::CommandPoolCreateInfo::builder().queue_family_index(indices.graphics);

    data.command_pool = device.create_command_pool(&info, None)?;

    Ok(())
}

pub unsafe fn create_command_buffers(device: &Device, data: &mut RenderContext) -> Result<()> {
    let allocate_info = vk::CommandBufferAllocateInfo::builder()
        .command_pool(data.command_pool)
        .level(vk::CommandBufferLevel::PRIMARY)
        .command_buffer_count(data.framebuffers.len() as u32);

    data.command_buffers = device.allocate_command_buffers(&allocate_info)?;

    for image_index in 0..data.command_buffers.len() {
        record_commands(device, data, data.command_buffers[image_index], image_index)?;
    }

    Ok(())
}

/// Records the full render pass for one swapchain image. The buffer may be
/// resubmitted while a previous submission is still pending, which the
/// single-semaphore-pair frame loop relies on.
unsafe fn record_commands(
    device: &Device,
    data: &RenderContext,
    command_buffer: vk::CommandBuffer,
    image_index: usize,
) -> Result<()> {
    let info = vk::CommandBufferBeginInfo::builder()
        .flags(vk::CommandBufferUsageFlags::SIMULTANEOUS_USE);

    device.begin_command_buffer(command_buffer, &info)?;

    let render_area = vk::Rect2D::builder()
        .offset(vk::Offset2D::default())
        .extent(data.swapchain_extent);

    let clear_values = &[vk::ClearValue {
        color: vk::ClearColorValue {
            float32: [0.0, 0.0, 0.0, 1.0],
        },
    }];

    let begin_info = vk::RenderPassBeginInfo::builder()
        .render_pass(data.render_pass)
        .framebuffer(data.framebuffers[image_index])
        .render_area(render_area)
        .clear_values(clear_values);

    device.cmd_begin_render_pass(command_buffer, &begin_info, vk::SubpassContents::INLINE);
    device.cmd_bind_pipeline(
        command_buffer,
        vk::PipelineBindPoint::GRAPHICS,
        data.pipeline,
    );

    let vertex_buffers = &[data.vertex_buffer];
    let offsets = &[0_u64];
    device.cmd_bind_vertex_buffers(command_buffer, 0, vertex_buffers, offsets);
    device.cmd_bind_index_buffer(command_buffer, data.index_buffer, 0, vk::IndexType::UINT16);

    device.cmd_draw_indexed(command_buffer, INDICES.len() as u32, 1, 0, 0, 0);

    device.cmd_end_render_pass(command_buffer);

    device.end_command_buffer(command_buffer)?;

    Ok(())
}
