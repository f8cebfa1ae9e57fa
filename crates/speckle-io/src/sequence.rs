use std::path::{Path, PathBuf};

use speckle_image::Image;

use crate::{
    error::IoError,
    png::{read_image_png_mono8, write_image_png_mono8},
};

/// File name of frame `index`: `img` followed by the index on at least 4 digits.
///
/// # Example
///
/// ```
/// use speckle_io::sequence::frame_file_name;
///
/// assert_eq!(frame_file_name(7), "img0007.png");
/// assert_eq!(frame_file_name(12345), "img12345.png");
/// ```
pub fn frame_file_name(index: usize) -> String {
    format!("img{index:04}.png")
}

/// Path of frame `index` inside `dir`.
pub fn frame_path(dir: impl AsRef<Path>, index: usize) -> PathBuf {
    dir.as_ref().join(frame_file_name(index))
}

/// Write frame `index` into `dir`.
pub fn write_frame(dir: impl AsRef<Path>, index: usize, image: &Image<u8, 1>) -> Result<(), IoError> {
    write_image_png_mono8(frame_path(dir, index), image)
}

/// Paths of the consecutive frames `img0000.png`, `img0001.png`, ... present in `dir`.
///
/// Listing stops at the first missing index.
///
/// # Errors
///
/// [`IoError::FileDoesNotExist`] if `dir` does not exist.
pub fn list_frames(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, IoError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(IoError::FileDoesNotExist(dir.to_path_buf()));
    }

    let frames = (0..)
        .map(|index| frame_path(dir, index))
        .take_while(|path| path.is_file())
        .collect::<Vec<_>>();

    log::debug!("found {} frames in {}", frames.len(), dir.display());

    Ok(frames)
}

/// Iterate over the frames listed by [`list_frames`], in order.
///
/// Frames are decoded one at a time as the iterator advances.
pub fn read_frames(
    dir: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Image<u8, 1>, IoError>>, IoError> {
    Ok(list_frames(dir)?.into_iter().map(read_image_png_mono8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_list_frames() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let frames = (0..3)
            .map(|i| Image::<u8, 1>::from_size_val([4, 3].into(), 10 * i as u8))
            .collect::<Result<Vec<_>, _>>()?;
        for (index, frame) in frames.iter().enumerate() {
            write_frame(tmp_dir.path(), index, frame)?;
        }
        // a gap ends the sequence
        write_frame(tmp_dir.path(), 4, &frames[0])?;

        let paths = list_frames(tmp_dir.path())?;
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[2], tmp_dir.path().join("img0002.png"));

        let mut decoded = read_frames(tmp_dir.path())?;
        assert_eq!(decoded.next().transpose()?, Some(frames[0].clone()));
        assert_eq!(decoded.collect::<Result<Vec<_>, _>>()?, frames[1..]);
        Ok(())
    }

    #[test]
    fn list_frames_missing_dir() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        assert!(matches!(
            list_frames(tmp_dir.path().join("nope")),
            Err(IoError::FileDoesNotExist(_))
        ));
        Ok(())
    }
}
