use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use wgpu::util::DeviceExt;

/// Shown until the real image arrives: one opaque blue texel.
pub const PLACEHOLDER_PIXEL: [u8; 4] = [0, 0, 255, 255];

/// Decoded RGBA8 pixels ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    pub fn placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: PLACEHOLDER_PIXEL.to_vec(),
        }
    }

    /// Both sides are non-zero and at most `max_dimension` texels.
    pub fn fits_within(&self, max_dimension: u32) -> bool {
        (1..=max_dimension).contains(&self.width) && (1..=max_dimension).contains(&self.height)
    }
}

/// Read and decode an image file to RGBA8.
pub fn decode_image(path: &Path) -> Result<DecodedImage, image::ImageError> {
    let image = image::open(path)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        width,
        height,
        rgba: image.into_raw(),
    })
}

/// Where an in-flight load stands.
#[derive(Debug)]
pub enum LoadStatus {
    Pending,
    Loaded(DecodedImage),
    /// The loader gave up; the placeholder stays.
    Abandoned,
}

/// One background decode publishing its result over a channel.
///
/// The loader thread sends at most once. A failed read or decode is logged on
/// that thread and the sender is dropped without sending.
pub struct TextureLoad {
    path: PathBuf,
    receiver: Receiver<DecodedImage>,
}

impl TextureLoad {
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (sender, receiver) = mpsc::channel();
        let thread_path = path.clone();

        let spawned = std::thread::Builder::new()
            .name("texture-load".into())
            .spawn(move || match decode_image(&thread_path) {
                Ok(image) => {
                    tracing::debug!(
                        path = %thread_path.display(),
                        width = image.width,
                        height = image.height,
                        "decoded texture"
                    );
                    // The context may already be gone; nothing to do then.
                    let _ = sender.send(image);
                }
                Err(err) => {
                    tracing::warn!(path = %thread_path.display(), "texture load failed: {err}");
                }
            });
        if let Err(err) = spawned {
            tracing::warn!(path = %path.display(), "could not start texture loader: {err}");
        }

        Self { path, receiver }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check for a result without blocking.
    pub fn poll(&self) -> LoadStatus {
        match self.receiver.try_recv() {
            Ok(image) => LoadStatus::Loaded(image),
            Err(TryRecvError::Empty) => LoadStatus::Pending,
            Err(TryRecvError::Disconnected) => LoadStatus::Abandoned,
        }
    }
}

/// A sampled 2D texture, held through its default view.
pub struct GpuTexture {
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &DecodedImage,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.rgba,
        );
        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
        }
    }

    /// Upload a decoded image, or `None` when the device cannot hold it.
    ///
    /// Images past the device's 2D size limit are refused up front; anything
    /// else wgpu rejects is captured in an error scope rather than reaching the
    /// uncaptured-error handler.
    pub fn try_upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &DecodedImage,
        format: wgpu::TextureFormat,
    ) -> Option<Self> {
        let max = device.limits().max_texture_dimension_2d;
        if !image.fits_within(max) {
            tracing::warn!(
                texture = label,
                width = image.width,
                height = image.height,
                max,
                "image exceeds device texture limits"
            );
            return None;
        }

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let texture = Self::upload(device, queue, label, image, format);
        let validation = pollster::block_on(device.pop_error_scope());
        let out_of_memory = pollster::block_on(device.pop_error_scope());

        match validation.or(out_of_memory) {
            Some(err) => {
                tracing::warn!(texture = label, "texture upload rejected: {err}");
                None
            }
            None => Some(texture),
        }
    }

    pub fn placeholder(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self::upload(device, queue, label, &DecodedImage::placeholder(), format)
    }
}

/// Nearest filtering, clamped at the edges.
pub fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("sprite_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait(load: &TextureLoad) -> LoadStatus {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            match load.poll() {
                LoadStatus::Pending if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(5));
                }
                status => return status,
            }
        }
    }

    fn write_png(dir: &Path) -> PathBuf {
        let path = dir.join("brick.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn placeholder_is_one_blue_texel() {
        let image = DecodedImage::placeholder();
        assert_eq!((image.width, image.height), (1, 1));
        assert_eq!(image.rgba, vec![0, 0, 255, 255]);
    }

    #[test]
    fn size_limits_reject_empty_and_oversized_images() {
        let sized = |width, height| DecodedImage {
            width,
            height,
            rgba: Vec::new(),
        };
        assert!(sized(8192, 8192).fits_within(8192));
        assert!(sized(1, 1).fits_within(8192));
        assert!(!sized(8193, 1).fits_within(8192));
        assert!(!sized(1, 8193).fits_within(8192));
        assert!(!sized(0, 4).fits_within(8192));
    }

    #[test]
    fn oversized_image_keeps_the_placeholder_on_a_real_device() {
        let Some((device, queue)) = crate::headless::device() else {
            eprintln!("no adapter; skipping");
            return;
        };
        let width = device.limits().max_texture_dimension_2d + 1;
        let oversized = DecodedImage {
            width,
            height: 1,
            rgba: vec![0; width as usize * 4],
        };
        let format = wgpu::TextureFormat::Rgba8Unorm;

        assert!(GpuTexture::try_upload(&device, &queue, "normal_map", &oversized, format).is_none());

        // The device is still usable afterwards.
        let small = DecodedImage {
            width: 2,
            height: 2,
            rgba: vec![128; 16],
        };
        assert!(GpuTexture::try_upload(&device, &queue, "normal_map", &small, format).is_some());
        assert!(
            GpuTexture::try_upload(&device, &queue, "diffuse", &DecodedImage::placeholder(), format)
                .is_some()
        );
    }

    #[test]
    fn decodes_png_to_rgba8() {
        let dir = tempfile::tempdir().unwrap();
        let image = decode_image(&write_png(dir.path())).unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.rgba.len(), 4 * 2 * 4);
        assert_eq!(&image.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn background_load_publishes_once() {
        let dir = tempfile::tempdir().unwrap();
        let load = TextureLoad::spawn(write_png(dir.path()));

        match wait(&load) {
            LoadStatus::Loaded(image) => assert_eq!(image.width, 4),
            other => panic!("expected a decoded image, got {other:?}"),
        }
        assert!(matches!(wait(&load), LoadStatus::Abandoned));
    }

    #[test]
    fn missing_file_is_abandoned() {
        let load = TextureLoad::spawn("no/such/brick.png");
        assert_eq!(load.path(), Path::new("no/such/brick.png"));
        assert!(matches!(wait(&load), LoadStatus::Abandoned));
    }

    #[test]
    fn undecodable_file_is_abandoned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brick.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(matches!(wait(&TextureLoad::spawn(path)), LoadStatus::Abandoned));
    }
}
