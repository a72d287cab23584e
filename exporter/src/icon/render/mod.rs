use crate::error::ExportError;
use crate::icon::meta::{ResizeFilter, DEFAULT_MARGIN};
use image::{imageops, ImageBuffer, Rgba, RgbaImage};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Premultiplied RGBA with 16 bits per channel.
type PremultipliedImage = ImageBuffer<Rgba<u16>, Vec<u16>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Interpolation used when scaling
    pub filter: ResizeFilter,

    /// Thickness of the cleared border, 0 disables the trim
    pub margin: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            filter: ResizeFilter::default(),
            margin: DEFAULT_MARGIN,
        }
    }
}

/// Whether the border of an icon was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimOutcome {
    /// The outer ring was made transparent
    Applied,

    /// The icon is too small to keep any interior, left untouched
    Skipped,
}

#[derive(Debug)]
pub struct RenderedIcon {
    pub image: RgbaImage,
    pub trim: TrimOutcome,
}

/// Runs the full pipeline for one target width: scale, center on a square
/// canvas and clear the border.
pub fn render_icon(
    source: &RgbaImage,
    width: u32,
    options: &RenderOptions,
) -> Result<RenderedIcon, ExportError> {
    let scaled = resize_to_width(source, width, options.filter)?;
    let mut image = recanvas_centered(scaled, width)?;
    let trim = clear_border(&mut image, options.margin);

    Ok(RenderedIcon { image, trim })
}

/// Scales the image so its width matches `width`, keeping the aspect ratio.
///
/// Filtering happens on premultiplied alpha so transparent pixels do not
/// bleed their colour into visible edges.
pub fn resize_to_width(
    source: &RgbaImage,
    width: u32,
    filter: ResizeFilter,
) -> Result<RgbaImage, ExportError> {
    let (source_width, source_height) = source.dimensions();
    if width == 0 || source_width == 0 || source_height == 0 {
        return Err(ExportError::InvalidDimensions {
            width: source_width,
            height: source_height,
        });
    }

    // Rounded to the nearest pixel, never collapsing to zero rows
    let height = (u64::from(source_height) * u64::from(width) + u64::from(source_width) / 2)
        / u64::from(source_width);
    let height = u32::try_from(height.max(1))
        .map_err(|_| ExportError::InvalidDimensions { width, height: u32::MAX })?;

    if (source_width, source_height) == (width, height) {
        return Ok(source.clone());
    }

    let scaled = imageops::resize(
        &premultiply(source),
        width,
        height,
        filter.filter_type(),
    );

    Ok(unpremultiply(&scaled))
}

fn premultiply(image: &RgbaImage) -> PremultipliedImage {
    PremultipliedImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        let alpha = u32::from(a);

        // 255 * 255 maps onto 65535, so an opaque channel equals its alpha
        let channel = |c: u8| ((u32::from(c) * alpha * 65535 + 32512) / 65025) as u16;

        Rgba([channel(r), channel(g), channel(b), channel(255)])
    })
}

fn unpremultiply(image: &PremultipliedImage) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        let alpha = ((u32::from(a) + 128) / 257) as u8;
        if alpha == 0 {
            return TRANSPARENT;
        }

        let a = u32::from(a);
        let channel = |c: u16| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;

        Rgba([channel(r), channel(g), channel(b), alpha])
    })
}

/// Places the image in the middle of a transparent `side` x `side` canvas,
/// cropping whatever does not fit.
pub fn recanvas_centered(image: RgbaImage, side: u32) -> Result<RgbaImage, ExportError> {
    if image.dimensions() == (side, side) {
        return Ok(image);
    }

    if side == 0 {
        return Err(ExportError::InvalidDimensions {
            width: side,
            height: side,
        });
    }

    let mut canvas = RgbaImage::from_pixel(side, side, TRANSPARENT);
    let x = (i64::from(side) - i64::from(image.width())) / 2;
    let y = (i64::from(side) - i64::from(image.height())) / 2;
    imageops::replace(&mut canvas, &image, x, y);

    Ok(canvas)
}

/// Clears every pixel within `margin` of the edge.
pub fn clear_border(image: &mut RgbaImage, margin: u32) -> TrimOutcome {
    let (width, height) = image.dimensions();
    let inset = 2 * u64::from(margin);

    if margin == 0 || u64::from(width) <= inset || u64::from(height) <= inset {
        return TrimOutcome::Skipped;
    }

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if x < margin || y < margin || x >= width - margin || y >= height - margin {
            *pixel = TRANSPARENT;
        }
    }

    TrimOutcome::Applied
}
