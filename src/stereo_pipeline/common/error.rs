use thiserror::Error;

#[derive(Error, Debug)]
pub enum StereoError {
    #[error("Dimension mismatch in {context}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        context: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Depth estimation failed: {0}")]
    DepthEstimation(String),

    #[error("Frame source failed: {0}")]
    FrameSource(String),

    #[error("Video encoder failed: {0}")]
    Encoder(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Coarse classification used when deciding how a failure propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Mismatched or invalid dimensions; rejected before processing.
    Precondition,
    /// Out-of-range configuration values.
    Parameter,
    /// Depth estimator, frame source or encoder reported a failure.
    Collaborator,
    /// A frame or file could not be read or written.
    Io,
    /// The job cannot run at all.
    Fatal,
}

impl StereoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StereoError::DimensionMismatch { .. } | StereoError::InvalidDimensions(..) => {
                ErrorKind::Precondition
            }
            StereoError::InvalidParameter(_) => ErrorKind::Parameter,
            StereoError::DepthEstimation(_)
            | StereoError::FrameSource(_)
            | StereoError::Encoder(_) => ErrorKind::Collaborator,
            StereoError::InputReadError(_)
            | StereoError::OutputWriteError(_)
            | StereoError::DecodeError(_)
            | StereoError::EncodeError(_)
            | StereoError::IoError(_) => ErrorKind::Io,
            StereoError::JobFailed(_) => ErrorKind::Fatal,
        }
    }

    pub(crate) fn mismatch(
        context: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        StereoError::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, StereoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            StereoError::mismatch("warp", (4, 4), (2, 4)).kind(),
            ErrorKind::Precondition
        );
        assert_eq!(
            StereoError::DepthEstimation("model".into()).kind(),
            ErrorKind::Collaborator
        );
        assert_eq!(
            StereoError::InputReadError("frame.png".into()).kind(),
            ErrorKind::Io
        );
        assert_eq!(StereoError::JobFailed("init".into()).kind(), ErrorKind::Fatal);
    }

    #[test]
    fn test_mismatch_message_names_context() {
        let err = StereoError::mismatch("compose", (8, 4), (8, 2));
        assert!(err.to_string().contains("compose"));
    }
}
