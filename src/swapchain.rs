//! Swapchain creation and the fixed selection policies behind it.
//!
//! The demo keeps every choice deterministic: the first reported surface
//! format, the first reported present mode, and an image count of two
//! clamped to the device's supported range.

use anyhow::{anyhow, Result};
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::KhrSurfaceExtension;
use vulkanalia::vk::KhrSwapchainExtension;
use winit::window::Window;

use crate::app::RenderContext;
use crate::device::QueueFamilyIndices;

/// Double buffering, before clamping against device capabilities.
const REQUESTED_IMAGE_COUNT: u32 = 2;

#[derive(Clone, Debug)]
pub struct SwapchainSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupport {
    pub unsafe fn get(
        instance: &Instance,
        data: &RenderContext,
        physical_device: vk::PhysicalDevice,
    ) -> Result<Self> {
        Ok(Self {
            capabilities: instance
                .get_physical_device_surface_capabilities_khr(physical_device, data.surface)?,
            formats: instance
                .get_physical_device_surface_formats_khr(physical_device, data.surface)?,
            present_modes: instance
                .get_physical_device_surface_present_modes_khr(physical_device, data.surface)?,
        })
    }
}

/// Takes the first format the surface reports. An empty list is a hard
/// error, never a silent default.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Result<vk::SurfaceFormatKHR> {
    formats
        .first()
        .copied()
        .ok_or_else(|| anyhow!("surface reports no supported formats"))
}

/// Takes the first present mode the surface reports.
pub fn choose_present_mode(present_modes: &[vk::PresentModeKHR]) -> Result<vk::PresentModeKHR> {
    present_modes
        .first()
        .copied()
        .ok_or_else(|| anyhow!("surface reports no supported present modes"))
}

/// The window's client size at creation time, clamped to the surface's
/// supported extent range when the driver leaves the extent up to us.
pub fn choose_extent(
    width: u32,
    height: u32,
    capabilities: &vk::SurfaceCapabilitiesKHR,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        capabilities.current_extent
    } else {
        vk::Extent2D::builder()
            .width(width.clamp(
                capabilities.min_image_extent.width,
                capabilities.max_image_extent.width,
            ))
            .height(height.clamp(
                capabilities.min_image_extent.height,
                capabilities.max_image_extent.height,
            ))
            .build()
    }
}

/// Requests double buffering, clamped to the device's `[min, max]` range.
/// A `max_image_count` of zero means the device imposes no upper bound.
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut image_count = REQUESTED_IMAGE_COUNT.max(capabilities.min_image_count);
    if capabilities.max_image_count != 0 {
        image_count = image_count.min(capabilities.max_image_count);
    }
    image_count
}

pub unsafe fn create_swapchain(
    window: &Window,
    instance: &Instance,
    device: &Device,
    data: &mut RenderContext,
) -> Result<()> {
    let indices = QueueFamilyIndices::get(instance, data, data.physical_device)?;
    let support = SwapchainSupport::get(instance, data, data.physical_device)?;

    let surface_format = choose_surface_format(&support.formats)?;
    let present_mode = choose_present_mode(&support.present_modes)?;
    let size = window.inner_size();
    let extent = choose_extent(size.width, size.height, &support.capabilities);
    let image_count = choose_image_count(&support.capabilities);

    let mut queue_family_indices = vec![];
    let image_sharing_mode = if indices.graphics != indices.present {
        queue_family_indices.push(indices.graphics);
        queue_family_indices.push(indices.present);
        vk::SharingMode::CONCURRENT
    } else {
        vk::SharingMode::EXCLUSIVE
    };

    let info = vk::SwapchainCreateInfoKHR::builder()
        .surface(data.surface)
        .min_image_count(image_count)
        .image_format(surface_format.format)
        .image_color_space(surface_format.color_space)
        .image_extent(extent)
        .image_array_layers(1)
        .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
        .image_sharing_mode(image_sharing_mode)
        .queue_family_indices(&queue_family_indices)
        .pre_transform(support.capabilities.current_transform)
        .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
        .present_mode(present_mode)
        .clipped(true)
        .old_swapchain(vk::SwapchainKHR::null());

    data.swapchain = device.create_swapchain_khr(&info, None)?;
    data.swapchain_images = device.get_swapchain_images_khr(data.swapchain)?;
    data.swapchain_format = surface_format.format;
    data.swapchain_extent = extent;

    log::info!(
        "Created swapchain: {} images, {:?}, {:?}, {}x{}",
        data.swapchain_images.len(),
        data.swapchain_format,
        present_mode,
        extent.width,
        extent.height
    );

    Ok(())
}

pub unsafe fn create_swapchain_image_views(device: &Device, data: &mut RenderContext) -> Result<()> {
    data.swapchain_image_views = data
        .swapchain_images
        .iter()
        .map(|i| {
            let info = vk::ImageViewCreateInfo::builder()
                .image(*i)
                .view_type(vk::ImageViewType::_2D)
                .format(data.swapchain_format)
                .subresource_range(
                    vk::ImageSubresourceRange::builder()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .base_mip_level(0)
                        .level_count(1)
                        .base_array_layer(0)
                        .layer_count(1)
                        .build(),
                );

            device.create_image_view(&info, None)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(())
}

/// One framebuffer per swapchain image view, bound to the render pass.
pub unsafe fn create_framebuffers(device: &Device, data: &mut RenderContext) -> Result<()> {
    data.framebuffers = data
        .swapchain_image_views
        .iter()
        .map(|i| {
            let attachments = &[*i];
            let info = vk::FramebufferCreateInfo::builder()
                .render_pass(data.render_pass)
                .attachments(attachments)
                .width(data.swapchain_extent.width)
                .height(data.swapchain_extent.height)
                .layers(1);

            device.create_framebuffer(&info, None)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_listed_format_wins() {
        let formats = [
            vk::SurfaceFormatKHR {
                format: vk::Format::R8G8B8A8_UNORM,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
            vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
        ];

        let chosen = choose_surface_format(&formats).unwrap();
        assert_eq!(chosen.format, vk::Format::R8G8B8A8_UNORM);
    }

    #[test]
    fn empty_format_list_is_fatal() {
        assert!(choose_surface_format(&[]).is_err());
    }

    #[test]
    fn first_listed_present_mode_wins() {
        let modes = [vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::FIFO];
        assert_eq!(
            choose_present_mode(&modes).unwrap(),
            vk::PresentModeKHR::IMMEDIATE
        );
    }

    #[test]
    fn empty_present_mode_list_is_fatal() {
        assert!(choose_present_mode(&[]).is_err());
    }

    #[test]
    fn image_count_clamps_to_capability_range() {
        let mut capabilities = vk::SurfaceCapabilitiesKHR::default();

        // Unbounded maximum: the request passes through.
        capabilities.min_image_count = 1;
        capabilities.max_image_count = 0;
        assert_eq!(choose_image_count(&capabilities), 2);

        // Device minimum above the request.
        capabilities.min_image_count = 3;
        assert_eq!(choose_image_count(&capabilities), 3);

        // Device maximum below the request.
        capabilities.min_image_count = 1;
        capabilities.max_image_count = 1;
        assert_eq!(choose_image_count(&capabilities), 1);
    }

    #[test]
    fn extent_prefers_the_surface_current_extent() {
        let mut capabilities = vk::SurfaceCapabilitiesKHR::default();
        capabilities.current_extent = vk::Extent2D {
            width: 800,
            height: 600,
        };

        let extent = choose_extent(1024, 768, &capabilities);
        assert_eq!(extent.width, 800);
        assert_eq!(extent.height, 600);
    }

    #[test]
    fn extent_clamps_window_size_when_driver_defers() {
        let mut capabilities = vk::SurfaceCapabilitiesKHR::default();
        capabilities.current_extent = vk::Extent2D {
            width: u32::MAX,
            height: u32::MAX,
        };
        capabilities.min_image_extent = vk::Extent2D {
            width: 100,
            height: 100,
        };
        capabilities.max_image_extent = vk::Extent2D {
            width: 640,
            height: 480,
        };

        let extent = choose_extent(800, 50, &capabilities);
        assert_eq!(extent.width, 640);
        assert_eq!(extent.height, 100);
    }
}
