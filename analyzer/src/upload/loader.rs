use anyhow::Context;
use retinacore::inference::UploadValidator;
use retinacore::interface::upload::media_type_for;
use retinacore::interface::{Upload, UploadMeta};
use std::fs;
use std::path::Path;

/// Picks an image from disk the way a browser file input would: the media
/// type comes from the extension and the metadata is validated before any
/// bytes are read.
pub fn select_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Upload> {
    let path_ref = path.as_ref();
    let name = path_ref
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", path_ref.display()))?
        .to_string();
    let metadata = fs::metadata(path_ref)
        .with_context(|| format!("reading metadata of {}", path_ref.display()))?;

    let meta = UploadMeta {
        media_type: media_type_for(&name).to_string(),
        size: metadata.len(),
        name,
    };
    UploadValidator::new().validate(&meta)?;

    let bytes = fs::read(path_ref).with_context(|| format!("reading {}", path_ref.display()))?;
    Ok(Upload::new(meta.name, meta.media_type, bytes))
}
