//! Render pass and graphics pipeline construction from pre-compiled
//! SPIR-V binaries.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use vulkanalia::bytecode::Bytecode;
use vulkanalia::prelude::v1_0::*;

use crate::app::RenderContext;
use crate::vertex::Vertex;

/// Shader binaries, compiled offline (`<name>.vert.spv` / `<name>.frag.spv`).
const VERT_SHADER_PATH: &str = "shaders/quad.vert.spv";
const FRAG_SHADER_PATH: &str = "shaders/quad.frag.spv";

/// Reads a compiled shader binary in full. A missing file or a blob whose
/// length is not a multiple of four is reported as an error before any
/// pipeline object exists.
pub fn load_spirv(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let code = fs::read(path)
        .with_context(|| format!("failed to read shader binary `{}`", path.display()))?;

    if code.is_empty() || code.len() % 4 != 0 {
        bail!(
            "shader binary `{}` is not valid SPIR-V ({} bytes)",
            path.display(),
            code.len()
        );
    }

    Ok(code)
}

unsafe fn create_shader_module(device: &Device, bytecode: &[u8]) -> Result<vk::ShaderModule> {
    let bytecode = Bytecode::new(bytecode).map_err(|e| anyhow!("invalid SPIR-V: {:?}", e))?;

    let info = vk::ShaderModuleCreateInfo::builder()
        .code_size(bytecode.code_size())
        .code(bytecode.code());

    Ok(device.create_shader_module(&info, None)?)
}

/// Single color attachment, cleared on load and handed off for
/// presentation. The external dependency keeps color writes from starting
/// before the attachment image is released by the presentation engine.
pub unsafe fn create_render_pass(device: &Device, data: &mut RenderContext) -> Result<()> {
    let color_attachment = vk::AttachmentDescription::builder()
        .format(data.swapchain_format)
        .samples(vk::SampleCountFlags::_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::PRESENT_SRC_KHR);

    let color_attachment_ref = vk::AttachmentReference::builder()
        .attachment(0)
        .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

    let color_attachments = &[color_attachment_ref];
    let subpass = vk::SubpassDescription::builder()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(color_attachments);

    let dependency = vk::SubpassDependency::builder()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .src_access_mask(vk::AccessFlags::empty())
        .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .dst_access_mask(
            vk::AccessFlags::COLOR_ATTACHMENT_READ | vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
        );

    let attachments = &[color_attachment];
    let subpasses = &[subpass];
    let dependencies = &[dependency];
    let info = vk::RenderPassCreateInfo::builder()
        .attachments(attachments)
        .subpasses(subpasses)
        .dependencies(dependencies);

    data.render_pass = device.create_render_pass(&info, None)?;

    Ok(())
}

pub unsafe fn create_pipeline(device: &Device, data: &mut RenderContext) -> Result<()> {
    let vert_shader_code = load_spirv(VERT_SHADER_PATH)?;
    let frag_shader_code = load_spirv(FRAG_SHADER_PATH)?;

    let vert_shader_module = create_shader_module(device, &vert_shader_code)?;
    let frag_shader_module = create_shader_module(device, &frag_shader_code)?;

    let vert_stage = vk::PipelineShaderStageCreateInfo::builder()
        .stage(vk::ShaderStageFlags::VERTEX)
        .module(vert_shader_module)
        .name(b"main\0");

    let frag_stage = vk::PipelineShaderStageCreateInfo::builder()
        .stage(vk::ShaderStageFlags::FRAGMENT)
        .module(frag_shader_module)
        .name(b"main\0");

    let binding_descriptions = &[Vertex::binding_description()];
    let attribute_descriptions = &Vertex::attribute_descriptions();
    let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::builder()
        .vertex_binding_descriptions(binding_descriptions)
        .vertex_attribute_descriptions(attribute_descriptions);

    let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::builder()
        .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
        .primitive_restart_enable(false);

    // The swapchain extent never changes, so viewport and scissor are baked
    // into the pipeline rather than set dynamically.
    let viewport = vk::Viewport::builder()
        .x(0.0)
        .y(0.0)
        .width(data.swapchain_extent.width as f32)
        .height(data.swapchain_extent.height as f32)
        .min_depth(0.0)
        .max_depth(1.0);

    let scissor = vk::Rect2D::builder()
        .offset(vk::Offset2D { x: 0, y: 0 })
        .extent(data.swapchain_extent);

    let viewports = &[viewport];
    let scissors = &[scissor];
    let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
        .viewports(viewports)
        .scissors(scissors);

    let rasterization_state = vk::PipelineRasterizationStateCreateInfo::builder()
        .depth_clamp_enable(false)
        .rasterizer_discard_enable(false)
        .polygon_mode(vk::PolygonMode::FILL)
        .line_width(1.0)
        .cull_mode(vk::CullModeFlags::BACK)
        .front_face(vk::FrontFace::CLOCKWISE)
        .depth_bias_enable(false);

    let multisample_state = vk::PipelineMultisampleStateCreateInfo::builder()
        .sample_shading_enable(false)
        .rasterization_samples(vk::SampleCountFlags::_1);

    let attachment = vk::PipelineColorBlendAttachmentState::builder()
        .color_write_mask(vk::ColorComponentFlags::all())
        .blend_enable(true)
        .src_color_blend_factor(vk::BlendFactor::SRC_ALPHA)
        .dst_color_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
        .color_blend_op(vk::BlendOp::ADD)
        .src_alpha_blend_factor(vk::BlendFactor::ONE)
        .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
        .alpha_blend_op(vk::BlendOp::ADD);

    let attachments = &[attachment];
    let color_blend_state = vk::PipelineColorBlendStateCreateInfo::builder()
        .logic_op_enable(false)
        .logic_op(vk::LogicOp::COPY)
        .attachments(attachments)
        .blend_constants([0.0, 0.0, 0.0, 0.0]);

    let layout_info = vk::PipelineLayoutCreateInfo::builder();
    data.pipeline_layout = device.create_pipeline_layout(&layout_info, None)?;

    let stages = &[vert_stage, frag_stage];
    let info = vk::GraphicsPipelineCreateInfo::builder()
        .stages(stages)
        .vertex_input_state(&vertex_input_state)
        .input_assembly_state(&input_assembly_state)
        .viewport_state(&viewport_state)
        .rasterization_state(&rasterization_state)
        .multisample_state(&multisample_state)
        .color_blend_state(&color_blend_state)
        .layout(data.pipeline_layout)
        .render_pass(data.render_pass)
        .subpass(0);

    let pipelines = device.create_graphics_pipelines(vk::PipelineCache::null(), &[info], None)?;
    data.pipeline = pipelines.0[0];

    device.destroy_shader_module(vert_shader_module, None);
    device.destroy_shader_module(frag_shader_module, None);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("quad-vk-{}-{}", std::process::id(), name))
    }

    #[test]
    fn missing_shader_binary_is_an_error() {
        let result = load_spirv("shaders/does-not-exist.vert.spv");
        assert!(result.is_err());
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let path = temp_path("truncated.spv");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(&[0x03, 0x02, 0x23]).unwrap();
        drop(file);

        assert!(load_spirv(&path).is_err());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn empty_blob_is_rejected() {
        let path = temp_path("empty.spv");
        fs::File::create(&path).unwrap();

        assert!(load_spirv(&path).is_err());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn word_aligned_blob_loads_in_full() {
        let path = temp_path("valid.spv");
        let words = [0x07230203u32, 0x00010000, 0, 1, 0];
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        fs::write(&path, &bytes).unwrap();

        let loaded = load_spirv(&path).unwrap();
        assert_eq!(loaded, bytes);
        fs::remove_file(&path).unwrap();
    }
}
