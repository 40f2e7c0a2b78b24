use eframe::egui;
use image::GenericImageView;

pub const PREVIEW_MAX_DIMENSION: u32 = 320;
pub const ILLUSTRATION_MAX_DIMENSION: u32 = 512;

pub struct DecodedRgba {
    pub pixels: Vec<u8>,
    pub size: [usize; 2],
}

/// Decodes an encoded image and scales it down so its longest side is at most
/// `max_dimension`.
pub fn decode_rgba(bytes: &[u8], max_dimension: u32) -> Result<DecodedRgba, String> {
    let decoded = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let (orig_w, orig_h) = decoded.dimensions();
    let scale = (max_dimension as f32 / (orig_w.max(orig_h) as f32)).min(1.0);
    let resized = if scale < 1.0 {
        decoded.resize(
            (orig_w as f32 * scale).max(1.0) as u32,
            (orig_h as f32 * scale).max(1.0) as u32,
            image::imageops::FilterType::Triangle,
        )
    } else {
        decoded
    };
    let rgba = resized.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(DecodedRgba {
        pixels: rgba.into_raw(),
        size,
    })
}

pub fn load_texture(
    ctx: &egui::Context,
    name: impl Into<String>,
    bytes: &[u8],
    max_dimension: u32,
) -> Option<egui::TextureHandle> {
    let name = name.into();
    match decode_rgba(bytes, max_dimension) {
        Ok(decoded) => {
            let color_image =
                egui::ColorImage::from_rgba_unmultiplied(decoded.size, &decoded.pixels);
            Some(ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR))
        }
        Err(err) => {
            tracing::warn!(texture = %name, "image decode failed: {err}");
            None
        }
    }
}
