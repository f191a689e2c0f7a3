//! # xtickr
//!
//! Turns a photo into a WhatsApp-compatible sticker: crop, optional
//! background removal, text overlay, then a 512×512 WebP squeezed under
//! 100 KiB.
//!
//! # Architecture: Five-Stage Pipeline
//!
//! ```text
//! 1. Source       photo      →  bitmap        (decode, any channel layout)
//! 2. Crop         bitmap     →  sub-bitmap    (aspect-locked selection)
//! 3. Background   sub-bitmap →  RGBA          (injected matting capability)
//! 4. Text         RGBA       →  RGBA          (anchored caption)
//! 5. Export       RGBA       →  .webp         (512×512, quality ladder)
//! ```
//!
//! Every run takes one immutable [`pipeline::RunParams`] and rebuilds
//! everything from scratch. Stages that need input the user has not given
//! yet return [`types::Stage::AwaitingInput`] instead of failing.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Runs the five stages in order and collects progress events |
//! | [`imaging`] | The stages themselves, plus crop/anchor/quality math and the WebP backend |
//! | [`config`] | `xtickr.toml` loading, merging over stock defaults, validation |
//! | [`types`] | Aspect ratios, crop selections, anchors, stage outcomes |
//! | [`naming`] | `<prefix>_<8 hex>.webp` sticker file names |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Matting Is Injected
//!
//! Background removal needs a segmentation model, which is not something
//! to embed. The [`imaging::Segmenter`] trait is the seam; the CLI plugs in
//! [`imaging::CommandSegmenter`], which shells out to `rembg`, and tests
//! plug in a scripted matte.
//!
//! ## Failure Stops the Run
//!
//! A failed matte ends the run with an error. No later stage sees a
//! half-processed bitmap.
//!
//! ## Lossy WebP via libwebp
//!
//! The `image` crate only encodes lossless WebP, which has no quality knob
//! to step down. Encoding goes through the `webp` crate instead, with the
//! slowest compression method so each quality step yields the smallest
//! file it can.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
