// Birdmark Library
// Watermarked image delivery for the bird catalog

pub mod catalog;
pub mod config;
pub mod constants;
pub mod logging;
pub mod watermark;
