//! GPU presentation for the window host.
//!
//! Owns the wgpu device and swapchain and exposes them as a
//! `BufferStrategy` over CPU canvases.

mod blit;
mod buffers;
mod init;
mod surface;

pub use buffers::GpuBuffers;
pub use init::GpuInit;
pub use surface::SurfaceSize;
