//! Local filesystem storage for uploaded images.

mod fs_image_store;

pub use fs_image_store::FsImageStore;
