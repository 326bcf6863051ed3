use bytemuck::{Pod, Zeroable};

use crate::color::{Rgb, Rgba};

pub const CIRCLE_SHADER: &str = include_str!("circles.wgsl");

/// One circle as the GPU sees it.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CircleInstance {
    pub center: [f32; 2],
    pub radius: f32,
    /// Glow blur in logical pixels, 0 for none.
    pub blur: f32,
    pub color: [f32; 4],
    pub glow: [f32; 4],
}

impl CircleInstance {
    pub fn new(center: glam::Vec2, radius: f32, color: Rgba, shadow: Option<(f32, Rgb)>) -> Self {
        let (blur, glow) = match shadow {
            Some((blur, rgb)) => {
                let [r, g, b] = rgb.to_f32();
                (blur, [r, g, b, 1.0])
            }
            None => (0.0, [0.0; 4]),
        };
        Self {
            center: center.to_array(),
            radius,
            blur,
            color: color.to_f32(),
            glow,
        }
    }

    pub const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32,
        2 => Float32,
        3 => Float32x4,
        4 => Float32x4,
    ];
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Uniforms {
    /// Logical canvas size.
    pub viewport: [f32; 2],
    pub _padding: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(module)
    }

    #[test]
    fn test_circle_shader_is_valid() {
        let module = validate_wgsl(CIRCLE_SHADER).unwrap();
        let entries: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(entries, vec!["vs_main", "fs_main"]);
    }

    #[test]
    fn test_uniforms_match_wgsl_size() {
        // vec2 viewport + vec2 padding
        assert_eq!(std::mem::size_of::<Uniforms>(), 16);
    }

    #[test]
    fn test_instance_layout_matches_attributes() {
        assert_eq!(std::mem::size_of::<CircleInstance>(), 48);
        let offsets: Vec<u64> = CircleInstance::ATTRIBUTES.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 8, 12, 16, 32]);
    }

    #[test]
    fn test_shadow_sets_blur_and_glow() {
        let plain = CircleInstance::new(Vec2::ONE, 2.0, Rgb::WHITE.with_alpha(0.5), None);
        assert_eq!(plain.blur, 0.0);
        let lit = CircleInstance::new(
            Vec2::ONE,
            2.0,
            Rgb::WHITE.with_alpha(0.5),
            Some((15.0, Rgb::new(255, 0, 0))),
        );
        assert_eq!(lit.blur, 15.0);
        assert_eq!(lit.glow, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(lit.color[3], 0.5);
    }
}
