//! Output path helpers.

use std::path::{Path, PathBuf};

/// Default output path for a converted file: `<stem>_converted.<ext>` in the
/// input's directory.
///
/// `extension` may be given with or without a leading dot; `None` keeps the
/// input's own extension (and adds none if it has none).
///
/// ```
/// use std::path::Path;
///
/// use vidfit::converted_output_path;
///
/// assert_eq!(
///     converted_output_path(Path::new("videos/clip.mp4"), None),
///     Path::new("videos/clip_converted.mp4"),
/// );
/// assert_eq!(
///     converted_output_path(Path::new("clip.mp4"), Some(".mkv")),
///     Path::new("clip_converted.mkv"),
/// );
/// ```
pub fn converted_output_path(input: &Path, extension: Option<&str>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    let extension = extension
        .map(|extension| extension.trim_start_matches('.').to_string())
        .or_else(|| {
            input
                .extension()
                .map(|extension| extension.to_string_lossy().into_owned())
        });

    let file_name = match extension {
        Some(extension) if !extension.is_empty() => format!("{stem}_converted.{extension}"),
        _ => format!("{stem}_converted"),
    };
    input.with_file_name(file_name)
}
