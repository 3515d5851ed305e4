//! Pixel-buffer filters.
//!
//! Every filter takes an RGBA `(H, W, 4)` u8 view of the source and returns
//! a freshly allocated array of the same shape; the source is never written.
//! Rows are processed in parallel with rayon, each output row reading only
//! the immutable source view.
//!
//! - **Blur** - box blur with white out-of-range taps (`blur.rs`)
//! - **Desaturate / Grayscale** - move RGB toward a weighted average (`grayscale.rs`)
//! - **Channel** - single-channel view (`channel.rs`)

pub mod blur;
pub mod channel;
pub mod grayscale;

pub use blur::{blur_rgba_u8, BlurRadius};
pub use channel::{channel_rgba_u8, ChannelSelector};
pub use grayscale::{desaturate_rgba_u8, grayscale_rgba_u8, Percentage, Weighting};
