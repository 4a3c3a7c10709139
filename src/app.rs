//! Application state: the Vulkan context record, startup sequencing, the
//! per-frame acquire/submit/present protocol, and teardown.

use anyhow::{anyhow, Result};
use vulkanalia::loader::{LibloadingLoader, LIBRARY};
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::ExtDebugUtilsExtension;
use vulkanalia::vk::KhrSurfaceExtension;
use vulkanalia::vk::KhrSwapchainExtension;
use vulkanalia::window as vk_window;
use winit::window::Window;

use crate::buffer::{create_index_buffer, create_vertex_buffer};
use crate::command::{create_command_buffers, create_command_pool};
use crate::device::{create_logical_device, pick_physical_device};
use crate::instance::{create_instance, VALIDATION_ENABLED};
use crate::pipeline::{create_pipeline, create_render_pass};
use crate::swapchain::{create_framebuffers, create_swapchain, create_swapchain_image_views};

/// Every Vulkan object the demo creates, threaded explicitly through the
/// component constructors instead of living in ambient globals.
#[derive(Default)]
pub struct RenderContext {
    pub messenger: vk::DebugUtilsMessengerEXT,
    pub surface: vk::SurfaceKHR,
    pub physical_device: vk::PhysicalDevice,
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
    pub swapchain_format: vk::Format,
    pub swapchain_extent: vk::Extent2D,
    pub swapchain: vk::SwapchainKHR,
    pub swapchain_images: Vec<vk::Image>,
    pub swapchain_image_views: Vec<vk::ImageView>,
    pub render_pass: vk::RenderPass,
    pub pipeline_layout: vk::PipelineLayout,
    pub pipeline: vk::Pipeline,
    pub framebuffers: Vec<vk::Framebuffer>,
    pub command_pool: vk::CommandPool,
    pub command_buffers: Vec<vk::CommandBuffer>,
    pub vertex_buffer: vk::Buffer,
    pub vertex_buffer_memory: vk::DeviceMemory,
    pub index_buffer: vk::Buffer,
    pub index_buffer_memory: vk::DeviceMemory,
    pub image_available: vk::Semaphore,
    pub render_finished: vk::Semaphore,
}

pub struct App {
    #[allow(dead_code)]
    entry: Entry,
    instance: Instance,
    device: Device,
    data: RenderContext,
    destroyed: bool,
}

impl App {
    pub unsafe fn create(window: &Window) -> Result<Self> {
        let loader = LibloadingLoader::new(LIBRARY)?;
        let entry = Entry::new(loader).map_err(|b| anyhow!("{}", b))?;
        let mut data = RenderContext::default();

        let instance = create_instance(window, &entry, &mut data)?;
        data.surface = vk_window::create_surface(&instance, window, window)?;
        pick_physical_device(&instance, &mut data)?;
        let device = create_logical_device(&instance, &mut data)?;

        create_swapchain(window, &instance, &device, &mut data)?;
        create_swapchain_image_views(&device, &mut data)?;
        create_render_pass(&device, &mut data)?;
        create_pipeline(&device, &mut data)?;
        create_framebuffers(&device, &mut data)?;
        create_command_pool(&instance, &device, &mut data)?;
        create_vertex_buffer(&instance, &device, &mut data)?;
        create_index_buffer(&instance, &device, &mut data)?;
        create_command_buffers(&device, &mut data)?;
        create_sync_objects(&device, &mut data)?;

        Ok(Self {
            entry,
            instance,
            device,
            data,
            destroyed: false,
        })
    }

    /// One frame: acquire an image, submit its pre-recorded commands gated
    /// on the image-available semaphore, present gated on render-finished.
    /// The single semaphore pair is reused every frame, so at most one
    /// frame is ever in flight.
    pub unsafe fn render(&mut self) -> Result<()> {
        let (image_index, _) = self.device.acquire_next_image_khr(
            self.data.swapchain,
            u64::MAX,
            self.data.image_available,
            vk::Fence::null(),
        )?;

        let wait_semaphores = &[self.data.image_available];
        let wait_stages = &[vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = &[self.data.command_buffers[image_index as usize]];
        let signal_semaphores = &[self.data.render_finished];
        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(wait_semaphores)
            .wait_dst_stage_mask(wait_stages)
            .command_buffers(command_buffers)
            .signal_semaphores(signal_semaphores);

        self.device
            .queue_submit(self.data.graphics_queue, &[submit_info], vk::Fence::null())?;

        let swapchains = &[self.data.swapchain];
        let image_indices = &[image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(signal_semaphores)
            .swapchains(swapchains)
            .image_indices(image_indices);

        self.device
            .queue_present_khr(self.data.present_queue, &present_info)?;

        Ok(())
    }

    /// Destroys every object in reverse creation order on both exit paths.
    /// Safe to call more than once; only the first call tears down.
    pub unsafe fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        self.device.device_wait_idle().unwrap();

        self.device
            .destroy_semaphore(self.data.render_finished, None);
        self.device
            .destroy_semaphore(self.data.image_available, None);

        self.device
            .destroy_command_pool(self.data.command_pool, None);

        self.device.destroy_buffer(self.data.index_buffer, None);
        self.device.free_memory(self.data.index_buffer_memory, None);
        self.device.destroy_buffer(self.data.vertex_buffer, None);
        self.device
            .free_memory(self.data.vertex_buffer_memory, None);

        for framebuffer in &self.data.framebuffers {
            self.device.destroy_framebuffer(*framebuffer, None);
        }

        self.device.destroy_pipeline(self.data.pipeline, None);
        self.device
            .destroy_pipeline_layout(self.data.pipeline_layout, None);
        self.device.destroy_render_pass(self.data.render_pass, None);

        for image_view in &self.data.swapchain_image_views {
            self.device.destroy_image_view(*image_view, None);
        }
        self.device.destroy_swapchain_khr(self.data.swapchain, None);

        self.device.destroy_device(None);
        self.instance.destroy_surface_khr(self.data.surface, None);

        if VALIDATION_ENABLED {
            self.instance
                .destroy_debug_utils_messenger_ext(self.data.messenger, None);
        }

        self.instance.destroy_instance(None);
    }
}

/// Exactly one image-available/render-finished semaphore pair, reused
/// every frame.
unsafe fn create_sync_objects(device: &Device, data: &mut RenderContext) -> Result<()> {
    let semaphore_info = vk::SemaphoreCreateInfo::builder();

    data.image_available = device.create_semaphore(&semaphore_info, None)?;
    data.render_finished = device.create_semaphore(&semaphore_info, None)?;

    Ok(())
}
