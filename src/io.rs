use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder, RgbImage};

use crate::canvas::LayerStack;
use crate::error::SaveError;

/// Flatten every layer over white and drop the alpha channel.
pub fn flatten_rgb(layers: &LayerStack) -> RgbImage {
    DynamicImage::ImageRgba8(layers.composite().into_image()).to_rgb8()
}

/// File name for a save made at `millis` since the Unix epoch.
pub fn timestamped_name(millis: u128) -> String {
    format!("drawing_{}.png", millis)
}

pub fn write_png(image: &RgbImage, path: &Path) -> Result<(), SaveError> {
    let io_err = |source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    PngEncoder::new(&mut writer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgb8,
    )?;
    writer.flush().map_err(io_err)
}

/// Write the flattened drawing to `dir/drawing_<millis>.png` and return the path.
pub fn save_drawing(layers: &LayerStack, dir: &Path) -> Result<PathBuf, SaveError> {
    std::fs::create_dir_all(dir).map_err(|source| SaveError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let path = dir.join(timestamped_name(millis));
    write_png(&flatten_rgb(layers), &path)?;
    log::info!("Saved drawing to {}", path.display());
    Ok(path)
}
