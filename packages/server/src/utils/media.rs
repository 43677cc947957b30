use std::path::Path;

use uuid::Uuid;

use crate::shaper::FieldErrorKind;

/// Directory under the media root that recipe images are written to.
pub const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

/// Check that an uploaded file looks like an image and return its
/// lowercase extension.
pub fn image_extension(file_name: Option<&str>) -> Result<String, FieldErrorKind> {
    let name = file_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| FieldErrorKind::Invalid("Upload must carry a file name".into()))?;

    let is_image = mime_guess::from_path(name)
        .first()
        .is_some_and(|mime| mime.type_() == "image");
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension {
        Some(ext) if is_image => Ok(ext),
        _ => Err(FieldErrorKind::Invalid(
            "Upload a valid image file".into(),
        )),
    }
}

/// Write image bytes under the media root and return the stored reference,
/// relative to that root.
pub async fn save_image(root: &Path, extension: &str, data: &[u8]) -> std::io::Result<String> {
    let reference = format!("{RECIPE_IMAGE_DIR}/{}.{extension}", Uuid::now_v7());
    let path = root.join(&reference);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, data).await?;
    Ok(reference)
}

/// Best-effort removal of a previously stored image.
pub async fn remove_image(root: &Path, reference: &str) {
    if let Err(e) = tokio::fs::remove_file(root.join(reference)).await {
        tracing::warn!(reference, "Failed to remove replaced image: {e}");
    }
}
