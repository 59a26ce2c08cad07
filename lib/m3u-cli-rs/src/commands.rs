pub mod download;
pub mod info;
