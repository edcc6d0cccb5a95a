use std::sync::Arc;

use parking_lot::Mutex;

/// Largest side length accepted for a texture backing allocation.
pub const MAX_TEXTURE_DIMENSION: u32 = 16384;

#[remain::sorted]
#[derive(Debug, thiserror::Error)]
pub enum Err {
    #[error("Could not allocate {0} bytes of texture memory")]
    AllocationFailed(usize),
    #[error("Texture dimension {width}x{height} exceeds the texture size limit")]
    DimensionTooLarge { width: u32, height: u32 },
    #[error("Texture has zero size ({width}x{height})")]
    EmptyTexture { width: u32, height: u32 },
    #[error("Image holds {actual} bytes but the texture format needs {expected}")]
    PixelDataSizeMismatch { expected: usize, actual: usize },
}

/// A decoded source image. Images are shared through `Arc` and identified by
/// that allocation, never by their content.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Image {
    width: u32,
    height: u32,
    channels: u32,
    bytes_per_channel: u32,
    pixel_data: Vec<u8>,
}

impl Image {
    pub fn new(width: u32, height: u32, channels: u32, bytes_per_channel: u32, pixel_data: Vec<u8>) -> Self {
        Self { width, height, channels, bytes_per_channel, pixel_data }
    }

    /// Creates an 8-bit RGBA image from raw bytes.
    pub fn from_rgba8(width: u32, height: u32, pixel_data: Vec<u8>) -> Self {
        Self::new(width, height, 4, 1, pixel_data)
    }

    pub fn get_width(&self) -> u32 { self.width }
    pub fn get_height(&self) -> u32 { self.height }
    pub fn get_channels(&self) -> u32 { self.channels }
    pub fn get_bytes_per_channel(&self) -> u32 { self.bytes_per_channel }
    pub fn get_pixel_data(&self) -> &[u8] { &self.pixel_data }
}

impl From<image::RgbaImage> for Image {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self::from_rgba8(width, height, img.into_raw())
    }
}

impl From<image::DynamicImage> for Image {
    fn from(img: image::DynamicImage) -> Self {
        Self::from(img.into_rgba8())
    }
}

/// Only clamping is produced: feature IDs and table rows must never wrap.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AxisWrappingMode {
    ClampToEdge,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WrappingMode {
    s: AxisWrappingMode,
    t: AxisWrappingMode,
}

impl WrappingMode {
    pub fn new_with_single_mode(mode: AxisWrappingMode) -> Self { Self { s: mode, t: mode } }
    pub fn s(&self) -> AxisWrappingMode { self.s }
    pub fn t(&self) -> AxisWrappingMode { self.t }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FilterType {
    Nearest,
}

/// How a shader samples an encoded texture.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SamplerState {
    pub wrapping_mode: WrappingMode,
    pub filter: FilterType,
}

impl SamplerState {
    /// Clamp on both axes, nearest filtering. Feature IDs and table rows must
    /// never be interpolated.
    pub fn clamped_nearest() -> Self {
        Self {
            wrapping_mode: WrappingMode::new_with_single_mode(AxisWrappingMode::ClampToEdge),
            filter: FilterType::Nearest,
        }
    }
}

/// GPU pixel formats produced by the encoders.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PixelFormat {
    /// Single 8-bit unsigned integer channel.
    R8Uint,
    /// Four 8-bit unsigned integer channels.
    R8G8B8A8Uint,
    /// Single 32-bit float channel.
    R32Float,
    /// Four 32-bit float channels stored in alpha, blue, green, red order.
    A32B32G32R32Float,
}

impl PixelFormat {
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::R8Uint => 1,
            PixelFormat::R8G8B8A8Uint | PixelFormat::R32Float => 4,
            PixelFormat::A32B32G32R32Float => 16,
        }
    }
}

/// Opaque identifier of a texture object created by a [`crate::realize::TextureBackend`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct TextureResourceId(pub u64);

/// Everything a backend needs to know to create the texture object.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub sampler: SamplerState,
}

#[derive(Debug, Default)]
struct TextureState {
    staged: Option<Vec<u8>>,
    resource: Option<TextureResourceId>,
}

/// An encoded texture: staged pixel bytes produced on a worker thread, and the
/// backend resource once the owner thread has realized it.
#[derive(Debug)]
pub struct EncodedTexture {
    descriptor: TextureDescriptor,
    state: Mutex<TextureState>,
}

/// Texture shared by every encoded item referencing the same source image.
pub type SharedTexture = Arc<EncodedTexture>;

impl EncodedTexture {
    /// Allocates a zero-filled staging buffer for a `width`x`height` texture.
    pub(crate) fn allocate(width: u32, height: u32, format: PixelFormat) -> Result<Self, Err> {
        let len = Self::checked_len(width, height, format)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| Err::AllocationFailed(len))?;
        pixels.resize(len, 0);
        Ok(Self::from_staged(width, height, format, pixels))
    }

    /// Allocates a texture holding a byte-for-byte copy of `image`'s pixels.
    /// The image's byte size must match `format`.
    pub(crate) fn copy_of_image(image: &Image, format: PixelFormat) -> Result<Self, Err> {
        let expected = Self::checked_len(image.get_width(), image.get_height(), format)?;
        let src = image.get_pixel_data();
        if src.len() != expected {
            return Err(Err::PixelDataSizeMismatch { expected, actual: src.len() });
        }
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(src.len()).map_err(|_| Err::AllocationFailed(src.len()))?;
        pixels.extend_from_slice(src);
        Ok(Self::from_staged(image.get_width(), image.get_height(), format, pixels))
    }

    fn from_staged(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Self {
        Self {
            descriptor: TextureDescriptor { width, height, format, sampler: SamplerState::clamped_nearest() },
            state: Mutex::new(TextureState { staged: Some(pixels), resource: None }),
        }
    }

    fn checked_len(width: u32, height: u32, format: PixelFormat) -> Result<usize, Err> {
        if width == 0 || height == 0 {
            return Err(Err::EmptyTexture { width, height });
        }
        if width > MAX_TEXTURE_DIMENSION || height > MAX_TEXTURE_DIMENSION {
            return Err(Err::DimensionTooLarge { width, height });
        }
        Ok(width as usize * height as usize * format.bytes_per_pixel())
    }

    pub fn get_descriptor(&self) -> &TextureDescriptor { &self.descriptor }
    pub fn get_width(&self) -> u32 { self.descriptor.width }
    pub fn get_height(&self) -> u32 { self.descriptor.height }
    pub fn get_format(&self) -> PixelFormat { self.descriptor.format }

    /// Returns a copy of the staged pixel bytes, if they have not been handed
    /// to the backend yet.
    pub fn staged_pixels(&self) -> Option<Vec<u8>> {
        self.state.lock().staged.clone()
    }

    /// Gives mutable access to the staged pixel bytes.
    pub(crate) fn with_staged_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> Option<R> {
        self.state.lock().staged.as_deref_mut().map(f)
    }

    /// The realized backend resource, if any.
    pub fn get_resource(&self) -> Option<TextureResourceId> {
        self.state.lock().resource
    }

    pub fn is_realized(&self) -> bool {
        self.get_resource().is_some()
    }

    pub(crate) fn take_staged(&self) -> Option<Vec<u8>> {
        self.state.lock().staged.take()
    }

    pub(crate) fn restore_staged(&self, pixels: Vec<u8>) {
        self.state.lock().staged = Some(pixels);
    }

    pub(crate) fn set_resource(&self, resource: TextureResourceId) {
        self.state.lock().resource = Some(resource);
    }

    pub(crate) fn take_resource(&self) -> Option<TextureResourceId> {
        self.state.lock().resource.take()
    }
}
