pub mod optimize;
pub mod preferences;
