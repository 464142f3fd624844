pub mod local_disk;
pub mod uploader;
