/// Audio Processing Unit: 4 PSG channels plus the two DMA-fed Direct Sound FIFOs.
///
/// The real implementation lives in `apu_impl/`; this module re-exports its
/// public surface the way `ppu.rs` does for the PPU.
pub use crate::apu_impl::{SoundRegisters, APU};
