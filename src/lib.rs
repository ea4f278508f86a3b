pub mod logger;
pub mod settings;
pub mod stereo_pipeline;
