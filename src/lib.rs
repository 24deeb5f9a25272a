//! Timemask is a real-time temporal-mask video effect.
//!
//! Instead of showing the live frame, every output pixel samples a different moment of recent
//! history, chosen by a grayscale [`TemporalMask`]. Motion ripples through time following the
//! shape of the mask.
//!
//! # Pipeline overview
//!
//! 1. **Ingest**: a [`FrameSource`] produces one frame per tick, pushed into a fixed-capacity
//!    [`FrameBuffer`] ring (oldest frame evicted on overflow).
//! 2. **Composite**: a [`Compositor`] turns the buffer and the mask into one output frame.
//!    [`InterpolatedCompositor`] (default) blends the two frames bracketing each pixel's
//!    fractional history depth; [`BandedCompositor`] is the discrete threshold-band reference.
//! 3. **Present**: the host shows [`TemporalSession::view`] and drives it with [`Command`]s.
//!
//! The core is synchronous and single-threaded. Callers that capture on another thread must
//! serialize `push` and `render` themselves.
#![forbid(unsafe_code)]

mod composite;
mod foundation;
mod frame;
mod frame_buffer;
mod mask;

pub mod command;
pub mod frame_source;
pub mod mask_source;
pub mod session;
pub mod settings;

pub use command::Command;
pub use composite::{BandedCompositor, Compositor, CompositorKind, InterpolatedCompositor};
pub use foundation::core::{FrameDims, RGB_CHANNELS};
pub use foundation::error::{TimemaskError, TimemaskResult};
pub use frame::Frame;
pub use frame_buffer::FrameBuffer;
pub use frame_source::{FrameSource, ImageSequence};
pub use mask::{MaskPattern, TemporalMask};
pub use mask_source::{FileMasks, MaskPlaylist, MaskSource, StaticMasks, load_mask_file};
pub use session::{SessionEvent, TemporalSession, View};
pub use settings::Settings;
