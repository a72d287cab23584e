use image::RgbaImage;
use std::io::Write;

/// Encodes a truecolor PNG with alpha.
///
/// No colour profile or gamma chunks are written and the pixels are stored
/// losslessly, so the file carries exactly the rendered RGBA values.
pub fn encode_png<W: Write>(image: &RgbaImage, writer: W) -> Result<(), ::png::EncodingError> {
    let mut encoder = ::png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(::png::ColorType::Rgba);
    encoder.set_depth(::png::BitDepth::Eight);
    encoder.set_compression(::png::Compression::Best);
    encoder.set_adaptive_filter(::png::AdaptiveFilterType::Adaptive);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()
}
