use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use winit::dpi::PhysicalSize;

/// Physical window size shared between the platform thread, which observes
/// resizes, and the presenter on the simulation thread.
#[derive(Debug, Clone, Default)]
pub struct SurfaceSize(Arc<AtomicU64>);

impl SurfaceSize {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        let cell = Self::default();
        cell.set(size);
        cell
    }

    pub fn set(&self, size: PhysicalSize<u32>) {
        let packed = (u64::from(size.width) << 32) | u64::from(size.height);
        self.0.store(packed, Ordering::Release);
    }

    pub fn get(&self) -> PhysicalSize<u32> {
        let packed = self.0.load(Ordering::Acquire);
        PhysicalSize::new((packed >> 32) as u32, packed as u32)
    }

    /// A zero-sized window (minimized, not yet mapped) has no buffers.
    pub fn is_drawable(&self) -> bool {
        let size = self.get();
        size.width > 0 && size.height > 0
    }
}

/// How the presenter reacts to a failed surface acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum SurfaceFault {
    /// The swapchain no longer matches the window; reconfigure, frame lost.
    Reconfigure,
    /// Transient; the frame is lost.
    Skip,
    Fatal,
}

pub(crate) fn classify(err: &wgpu::SurfaceError) -> SurfaceFault {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceFault::Reconfigure,
        wgpu::SurfaceError::OutOfMemory => SurfaceFault::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceFault::Skip,
    }
}

pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| formats.contains(f)) {
            return Some(f);
        }
    }

    formats.first().copied()
}

pub(crate) fn choose_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| supported.contains(m))
        .or_else(|| supported.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn size_round_trips_through_the_cell() {
        let cell = SurfaceSize::new(PhysicalSize::new(1920, 1080));
        assert_eq!(cell.get(), PhysicalSize::new(1920, 1080));
        assert!(cell.is_drawable());

        cell.set(PhysicalSize::new(0, 1080));
        assert!(!cell.is_drawable());
    }

    #[test]
    fn prefers_srgb_when_asked() {
        let formats = [TextureFormat::Bgra8Unorm, TextureFormat::Rgba8UnormSrgb];

        assert_eq!(
            choose_surface_format(&formats, true),
            Some(TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(
            choose_surface_format(&formats, false),
            Some(TextureFormat::Bgra8Unorm)
        );
        assert_eq!(choose_surface_format(&[], true), None);
    }

    #[test]
    fn unsupported_alpha_request_falls_back() {
        let supported = [wgpu::CompositeAlphaMode::Opaque];

        assert_eq!(
            choose_alpha_mode(&supported, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
        assert_eq!(choose_alpha_mode(&[], None), wgpu::CompositeAlphaMode::Auto);
    }

    #[test]
    fn surface_errors_map_to_recovery() {
        assert_eq!(classify(&wgpu::SurfaceError::Outdated), SurfaceFault::Reconfigure);
        assert_eq!(classify(&wgpu::SurfaceError::Lost), SurfaceFault::Reconfigure);
        assert_eq!(classify(&wgpu::SurfaceError::Timeout), SurfaceFault::Skip);
        assert_eq!(classify(&wgpu::SurfaceError::OutOfMemory), SurfaceFault::Fatal);
    }
}
