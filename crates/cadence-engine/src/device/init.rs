/// How `GpuBuffers` sets up its device and swapchain.
///
/// The presenter only uploads one canvas texture per frame and draws a single
/// triangle, so the defaults ask for nothing beyond baseline wgpu.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB swapchain so canvas colors, which are sRGB-encoded bytes,
    /// reach the screen unchanged. Falls back to the first supported format.
    pub prefer_srgb: bool,

    /// Swap behavior. `Fifo` blocks `show` on vblank, which adds display
    /// pacing on top of the loop's own pacing sleep.
    pub present_mode: wgpu::PresentMode,

    /// Requested compositing mode; ignored when the surface does not list it.
    /// Canvas pixels are always opaque, so any mode works.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub power_preference: wgpu::PowerPreference,

    pub required_features: wgpu::Features,

    pub required_limits: wgpu::Limits,

    /// Frames the swapchain may queue ahead of the display.
    pub desired_maximum_frame_latency: u32,

    /// Linear filtering when the window is larger than the canvas; nearest
    /// keeps pixel edges crisp.
    pub smooth_scaling: bool,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::default(),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
            smooth_scaling: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_need_no_optional_features() {
        let init = GpuInit::default();

        assert!(init.required_features.is_empty());
        assert!(init.prefer_srgb);
        assert!(!init.smooth_scaling);
        assert_eq!(init.present_mode, wgpu::PresentMode::Fifo);
    }
}
