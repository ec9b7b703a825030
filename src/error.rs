//! Error types for the fallible edges: pattern import and the viewer.
//!
//! The simulation core never fails; misconfiguration there is logged and
//! ignored.

use std::fmt;

/// Errors that can occur when importing a pattern from an image.
#[derive(Debug)]
pub enum PatternError {
    /// Failed to decode the image.
    Image(image::ImageError),
    /// Failed to read the file from disk.
    Io(std::io::Error),
    /// Every pixel was below the alpha threshold.
    Empty {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Image(e) => write!(f, "Failed to decode pattern image: {}", e),
            PatternError::Io(e) => write!(f, "Failed to read pattern file: {}", e),
            PatternError::Empty { width, height } => write!(
                f,
                "Pattern image ({}x{}) has no opaque pixels",
                width, height
            ),
        }
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PatternError::Image(e) => Some(e),
            PatternError::Io(e) => Some(e),
            PatternError::Empty { .. } => None,
        }
    }
}

impl From<image::ImageError> for PatternError {
    fn from(e: image::ImageError) -> Self {
        PatternError::Image(e)
    }
}

impl From<std::io::Error> for PatternError {
    fn from(e: std::io::Error) -> Self {
        PatternError::Io(e)
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The surface reports no usable configuration for the adapter.
    UnsupportedSurface,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::UnsupportedSurface => write!(f, "Surface is not supported by the selected adapter"),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the viewer.
#[derive(Debug)]
pub enum ViewerError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The pattern passed on the command line could not be loaded.
    Pattern(PatternError),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            ViewerError::Window(e) => write!(f, "Failed to create window: {}", e),
            ViewerError::Gpu(e) => write!(f, "GPU error: {}", e),
            ViewerError::Pattern(e) => write!(f, "Pattern error: {}", e),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::EventLoop(e) => Some(e),
            ViewerError::Window(e) => Some(e),
            ViewerError::Gpu(e) => Some(e),
            ViewerError::Pattern(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for ViewerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ViewerError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ViewerError {
    fn from(e: winit::error::OsError) -> Self {
        ViewerError::Window(e)
    }
}

impl From<GpuError> for ViewerError {
    fn from(e: GpuError) -> Self {
        ViewerError::Gpu(e)
    }
}

impl From<PatternError> for ViewerError {
    fn from(e: PatternError) -> Self {
        ViewerError::Pattern(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_empty_pattern_message() {
        let e = PatternError::Empty { width: 4, height: 2 };
        assert_eq!(e.to_string(), "Pattern image (4x2) has no opaque pixels");
        assert!(e.source().is_none());
    }

    #[test]
    fn test_viewer_error_wraps_pattern() {
        let e: ViewerError = PatternError::Empty { width: 1, height: 1 }.into();
        assert!(e.to_string().starts_with("Pattern error:"));
        assert!(e.source().is_some());
    }

    #[test]
    fn test_viewer_error_wraps_gpu() {
        let e: ViewerError = GpuError::NoAdapter.into();
        assert!(matches!(e, ViewerError::Gpu(GpuError::NoAdapter)));
        assert!(e.to_string().starts_with("GPU error: No compatible GPU adapter"));
        assert!(e.source().is_some());
    }
}
