#[cfg(feature = "core")]
#[doc(inline)]
pub use pileup_core as core;

#[cfg(feature = "reference")]
#[doc(inline)]
pub use pileup_reference as reference;

#[cfg(feature = "image")]
#[doc(inline)]
pub use pileup_image as image;
