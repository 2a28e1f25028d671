//! Contact avatars: decoding, caching and the cold fetch stream.

mod decode;
mod fetcher;
mod store;
mod vcard;

use std::sync::Arc;

use bytes::Bytes;
use image::DynamicImage;

pub use decode::decode_photo;
pub use fetcher::{AvatarStream, AvatarSubscription};
pub use store::{AvatarStore, InMemoryAvatarStore};
pub use vcard::{VCardService, VCardTemp};

#[cfg(test)]
pub(crate) use decode::png_fixture;

/// A decoded avatar image and the bytes it came from.
#[derive(Debug, Clone)]
pub struct Avatar {
    data: Bytes,
    image: Arc<DynamicImage>,
}

impl Avatar {
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

impl PartialEq for Avatar {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Avatar {}
