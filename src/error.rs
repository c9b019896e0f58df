use thiserror::Error;

#[derive(Debug, Error)]
pub enum RedactError {
    #[error("failed to decode image: {0}")]
    DecodeError(String),

    #[error("image dimensions are zero")]
    ZeroDimensions,

    #[error("failed to encode image: {0}")]
    EncodeError(String),

    #[error("jpeg quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("block factor must be in (0.0, 1.0], got {0}")]
    InvalidBlockFactor(f32),

    #[error("head scale must be positive, got {0}")]
    InvalidHeadScale(f64),

    #[error("failed to load overlay asset {path}: {reason}")]
    AssetLoad { path: String, reason: String },

    #[error("overlay asset registry is empty")]
    EmptyAssetRegistry,

    #[error("overlay effect selected but no asset registry was provided")]
    MissingOverlayAssets,

    #[error("no face locator was provided")]
    NoFaceLocator,

    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),

    #[cfg(feature = "rustface")]
    #[error("failed to load face detection model: {0}")]
    ModelLoad(String),
}
