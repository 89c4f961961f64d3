use crate::resource::Slot;
use crate::*;
use log::trace;
use std::rc::Rc;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Interpolation {
    NearestNeighbor,
    #[default]
    Linear,
}

/// A portable 8-bit RGBA bitmap as the toolkit hands it over.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SourceBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    alpha: bool,
    mask: Option<Vec<u8>>,
}

/// Bytes needed for `width * height` pixels of `bpp` bytes each.
fn buffer_len(width: u32, height: u32, bpp: usize) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(bpp))
        .ok_or(Error::UsageFault("bitmap dimensions overflow"))
}

impl SourceBitmap {
    /// `pixels` holds `width * height` RGBA quadruplets.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != buffer_len(width, height, 4)? {
            return Err(Error::UsageFault("pixel buffer does not match the bitmap size"));
        }
        Ok(Self {
            width,
            height,
            pixels,
            alpha: true,
            mask: None,
        })
    }

    /// `pixels` holds `width * height` RGB triplets; the bitmap is opaque.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != buffer_len(width, height, 3)? {
            return Err(Error::UsageFault("pixel buffer does not match the bitmap size"));
        }
        let mut rgba = Vec::with_capacity(buffer_len(width, height, 4)?);
        for px in pixels.chunks_exact(3) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 0xff]);
        }
        Ok(Self {
            width,
            height,
            pixels: rgba,
            alpha: false,
            mask: None,
        })
    }

    /// Attaches a mask with one byte per pixel; zero bytes are transparent.
    pub fn with_mask(mut self, mask: Vec<u8>) -> Result<Self> {
        if mask.len() != buffer_len(self.width, self.height, 1)? {
            return Err(Error::UsageFault("mask does not match the bitmap size"));
        }
        self.mask = Some(mask);
        Ok(self)
    }

    #[inline]
    pub fn size(&self) -> Size<u32> {
        pixel_size(self.width, self.height)
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.alpha
    }

    #[inline]
    pub fn has_mask(&self) -> bool {
        self.mask.is_some()
    }

    /// Converts to the 32-bit layout a render target consumes: premultiplied
    /// BGRA when the bitmap has alpha or a mask, BGRX otherwise.
    pub fn convert(&self) -> DevicePixels {
        let stride = self.width * 4;
        let mut data = Vec::with_capacity(self.pixels.len());
        let format = if self.alpha || self.mask.is_some() {
            for (i, px) in self.pixels.chunks_exact(4).enumerate() {
                let mut a = if self.alpha { px[3] } else { 0xff };
                if let Some(mask) = &self.mask {
                    if mask[i] == 0 {
                        a = 0;
                    }
                }
                let premul = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
                data.extend_from_slice(&[premul(px[2]), premul(px[1]), premul(px[0]), a]);
            }
            PixelFormat::Pbgra32
        } else {
            for px in self.pixels.chunks_exact(4) {
                data.extend_from_slice(&[px[2], px[1], px[0], 0xff]);
            }
            PixelFormat::Bgr32
        };
        DevicePixels {
            width: self.width,
            height: self.height,
            format,
            stride,
            data,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PixelFormat {
    /// Premultiplied BGRA.
    Pbgra32,
    /// BGR with an unused fourth byte.
    Bgr32,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DevicePixels {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub stride: u32,
    pub data: Vec<u8>,
}

pub(crate) struct BitmapData<B: Backend> {
    source: SourceBitmap,
    device: Slot<B::Bitmap>,
}

impl<B: Backend> DeviceResource<B> for BitmapData<B> {
    fn acquire(&self, target: &B::RenderTarget) -> Result<()> {
        self.device.ensure(target.id(), || {
            trace!("realize bitmap for {:?}", target.id());
            target.create_bitmap(&self.source.convert())
        })
    }

    #[inline]
    fn release(&self) {
        self.device.clear();
    }

    #[inline]
    fn realized_for(&self) -> Option<TargetId> {
        self.device.owner()
    }
}

/// An opaque token pairing a source bitmap with the device bitmap realized
/// from it.
pub struct NativeBitmap<B: Backend> {
    pub source: SourceBitmap,
    pub device: Option<(TargetId, B::Bitmap)>,
}

/// A shared bitmap descriptor. Releasing it drops only the device bitmap.
#[derive(Clone)]
pub struct Bitmap<B: Backend>(Rc<BitmapData<B>>);

impl<B: Backend> Bitmap<B> {
    pub(crate) fn new(source: SourceBitmap) -> Self {
        Self(Rc::new(BitmapData {
            source,
            device: Slot::new(),
        }))
    }

    pub(crate) fn from_native(native: NativeBitmap<B>) -> Result<Self> {
        let (target, device) = native
            .device
            .ok_or(Error::UsageFault("native bitmap has no device bitmap"))?;
        Ok(Self(Rc::new(BitmapData {
            source: native.source,
            device: Slot::with(target, device),
        })))
    }

    pub fn to_native(&self) -> NativeBitmap<B> {
        NativeBitmap {
            source: self.0.source.clone(),
            device: self.0.device.current(),
        }
    }

    #[inline]
    pub fn source(&self) -> &SourceBitmap {
        &self.0.source
    }

    #[inline]
    pub fn size(&self) -> Size<u32> {
        self.0.source.size()
    }

    #[inline]
    pub fn acquire(&self, target: &B::RenderTarget) -> Result<()> {
        self.0.acquire(target)
    }

    #[inline]
    pub fn release(&self) {
        self.0.release()
    }

    #[inline]
    pub fn realized_for(&self) -> Option<TargetId> {
        self.0.realized_for()
    }

    #[inline]
    pub fn native(&self, target: TargetId) -> Result<B::Bitmap> {
        self.0
            .device
            .get(target)
            .ok_or(Error::UsageFault("bitmap is not realized for this render target"))
    }

    #[inline]
    pub(crate) fn holder(&self) -> Rc<dyn DeviceResource<B>> {
        self.0.clone()
    }
}

impl<B: Backend> std::fmt::Debug for Bitmap<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("size", &(self.0.source.width, self.0.source.height))
            .field("realized_for", &self.0.device.owner())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Recorder, RecordingSurface};

    #[test]
    fn opaque_conversion() {
        let src = SourceBitmap::from_rgb(2, 1, vec![10, 20, 30, 40, 50, 60]).unwrap();
        let px = src.convert();
        assert_eq!(px.format, PixelFormat::Bgr32);
        assert_eq!(px.stride, 8);
        assert_eq!(px.data, vec![30, 20, 10, 0xff, 60, 50, 40, 0xff]);
    }

    #[test]
    fn premultiplied_conversion() {
        let src = SourceBitmap::from_rgba(1, 1, vec![255, 100, 0, 128]).unwrap();
        let px = src.convert();
        assert_eq!(px.format, PixelFormat::Pbgra32);
        assert_eq!(px.data, vec![0, 50, 128, 128]);
    }

    #[test]
    fn mask_conversion() {
        let src = SourceBitmap::from_rgb(2, 1, vec![255, 255, 255, 255, 255, 255])
            .unwrap()
            .with_mask(vec![0, 1])
            .unwrap();
        let px = src.convert();
        assert_eq!(px.format, PixelFormat::Pbgra32);
        assert_eq!(px.data, vec![0, 0, 0, 0, 255, 255, 255, 255]);
    }

    #[test]
    fn size_mismatch() {
        assert_eq!(
            SourceBitmap::from_rgba(2, 2, vec![0; 4]).unwrap_err(),
            ErrorKind::UsageFault
        );
        assert_eq!(
            SourceBitmap::from_rgb(1, 1, vec![0; 3])
                .unwrap()
                .with_mask(vec![])
                .unwrap_err(),
            ErrorKind::UsageFault
        );
    }

    #[test]
    fn rgb_buffer_is_validated() {
        assert_eq!(
            SourceBitmap::from_rgb(2, 1, vec![0; 3]).unwrap_err(),
            ErrorKind::UsageFault
        );
        assert_eq!(
            SourceBitmap::from_rgb(1, 1, vec![0; 4]).unwrap_err(),
            ErrorKind::UsageFault
        );
    }

    #[test]
    fn huge_dimensions_are_rejected() {
        assert_eq!(
            SourceBitmap::from_rgba(70_000, 70_000, vec![0; 4]).unwrap_err(),
            ErrorKind::UsageFault
        );
        assert_eq!(
            SourceBitmap::from_rgb(u32::MAX, u32::MAX, vec![0; 3]).unwrap_err(),
            ErrorKind::UsageFault
        );
    }

    #[test]
    fn release_keeps_source() {
        let recorder = Recorder::new();
        let target = recorder
            .create_render_target(&RecordingSurface::window(10, 10))
            .unwrap();
        let bitmap = Bitmap::<Recorder>::new(SourceBitmap::from_rgb(1, 1, vec![1, 2, 3]).unwrap());
        bitmap.acquire(&target).unwrap();
        bitmap.acquire(&target).unwrap();
        assert_eq!(recorder.stats().bitmaps, 1);
        bitmap.release();
        assert!(bitmap.native(target.id()).is_err());
        assert_eq!(bitmap.source().size().width, 1);
        bitmap.acquire(&target).unwrap();
        assert_eq!(recorder.stats().bitmaps, 2);
    }

    #[test]
    fn native_round_trip() {
        let recorder = Recorder::new();
        let target = recorder
            .create_render_target(&RecordingSurface::window(10, 10))
            .unwrap();
        let bitmap = Bitmap::<Recorder>::new(SourceBitmap::from_rgb(1, 1, vec![1, 2, 3]).unwrap());
        assert_eq!(
            Bitmap::from_native(bitmap.to_native()).unwrap_err(),
            ErrorKind::UsageFault
        );
        bitmap.acquire(&target).unwrap();
        let adopted = Bitmap::from_native(bitmap.to_native()).unwrap();
        assert_eq!(adopted.realized_for(), Some(target.id()));
        assert!(adopted.native(target.id()).is_ok());
    }
}
