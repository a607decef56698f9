pub mod exif_codec;
pub mod geocoder;
pub mod retry;
pub mod session;
