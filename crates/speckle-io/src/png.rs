use std::{fs, fs::File, io::BufWriter, path::Path};

use png::{BitDepth, ColorType, Decoder, Encoder};
use speckle_image::{Image, ImageSize};

use crate::error::IoError;

/// Read a PNG image with a single channel (mono8).
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A grayscale image with a single channel (mono8).
///
/// # Errors
///
/// An error if the file is missing, is not a `.png`, or is not 8-bit grayscale.
pub fn read_image_png_mono8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }
    if file_path.extension().map_or(true, |ext| ext != "png") {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let file = fs::File::open(file_path)?;
    let mut reader = Decoder::new(file)
        .read_info()
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    if info.color_type != ColorType::Grayscale || info.bit_depth != BitDepth::Eight {
        return Err(IoError::PngDecodeError(format!(
            "expected 8-bit grayscale, got {:?} {:?}",
            info.color_type, info.bit_depth
        )));
    }
    buf.truncate(info.buffer_size());

    Ok(Image::new(
        [info.width as usize, info.height as usize].into(),
        buf,
    )?)
}

/// Writes the given PNG _(grayscale 8-bit)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image to encode.
pub fn write_image_png_mono8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 1>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Grayscale,
    )
}

fn write_png_impl(
    file_path: impl AsRef<Path>,
    image_data: &[u8],
    image_size: ImageSize,
    depth: BitDepth,
    color_type: ColorType,
) -> Result<(), IoError> {
    let file = File::create(file_path)?;

    let mut encoder = Encoder::new(
        BufWriter::new(file),
        image_size.width as u32,
        image_size.height as u32,
    );
    encoder.set_color(color_type);
    encoder.set_depth(depth);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .write_image_data(image_data)
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_png_mono8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("ramp.png");

        let image = Image::<u8, 1>::from_fn([13, 7].into(), |x, y, _| (x * 19 + y * 3) as u8);
        write_image_png_mono8(&file_path, &image)?;
        assert!(file_path.exists(), "File does not exist: {:?}", file_path);

        let image_back = read_image_png_mono8(&file_path)?;
        assert_eq!(image_back, image);
        Ok(())
    }

    #[test]
    fn read_png_errors() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;

        let missing = tmp_dir.path().join("missing.png");
        assert!(matches!(
            read_image_png_mono8(&missing),
            Err(IoError::FileDoesNotExist(_))
        ));

        let text = tmp_dir.path().join("image.txt");
        fs::write(&text, b"not an image")?;
        assert!(matches!(
            read_image_png_mono8(&text),
            Err(IoError::InvalidFileExtension(_))
        ));

        let corrupt = tmp_dir.path().join("corrupt.png");
        fs::write(&corrupt, b"not an image")?;
        assert!(matches!(
            read_image_png_mono8(&corrupt),
            Err(IoError::PngDecodeError(_))
        ));
        Ok(())
    }
}
