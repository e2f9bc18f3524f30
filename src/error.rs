use crate::config::MaterialRole;

/// Error type for cutout tile generation.
#[derive(Debug, thiserror::Error)]
pub enum CutoutError {
    #[error("Tile has incorrect thickness (expected 1 or 2, got {thickness})")]
    InvalidThickness { thickness: i32 },
    #[error("Unknown material role: {0}")]
    UnknownMaterialRole(String),
    #[error("Material role {0} has no candidate materials")]
    EmptyMaterialRole(MaterialRole),
    #[error("Invalid tile granularity: {0} (expected 2x2 or 4x4)")]
    InvalidGranularity(String),
    #[error("{option} must be within 0..=100, got {value}")]
    ChanceOutOfRange { option: &'static str, value: i32 },
    #[error("No texture registered for {0}")]
    MissingTexture(String),
    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CutoutError>;
