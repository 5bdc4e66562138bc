//! Typed keys for the two joins.
//!
//! COCO uses bare integers for both `image_id` and `category_id`; wrapping
//! them keeps an image id from being looked up in the category table.

use std::fmt;

macro_rules! coco_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// The raw integer as it appeared in the JSON.
            #[inline]
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

coco_id! {
    /// `id` of an `images` record; the target of `annotation.image_id`.
    ImageId
}

coco_id! {
    /// `id` of a `categories` record; the target of `annotation.category_id`.
    CategoryId
}
