/// HLE BIOS: SWI dispatch plus the math/memory utility routines real
/// software calls through `swi`.
///
/// The real implementation lives in `bios_impl/`; this module re-exports its
/// public surface the way `ppu.rs` does for the PPU.
pub use crate::bios_impl::{
    arctan, arctan2, bit_unpack, cpu_fast_set, cpu_set, div, lz77_uncomp, rl_uncomp, soft_reset,
    sqrt, Bios, DivResult, SqrtResult,
};
pub use crate::bios_impl::{
    CPUSET_32BIT, CPUSET_FILL, SWI_ARCTAN, SWI_ARCTAN2, SWI_BG_AFFINE_SET, SWI_BIT_UNPACK,
    SWI_CPU_FAST_SET, SWI_CPU_SET, SWI_DIFF_16BIT_UNCOMP, SWI_DIFF_8BIT_UNCOMP_VRAM,
    SWI_DIFF_8BIT_UNCOMP_WRAM, SWI_DIV, SWI_DIV_ARM, SWI_HALT, SWI_HUFF_UNCOMP, SWI_INTR_WAIT,
    SWI_LZ77_UNCOMP_VRAM, SWI_LZ77_UNCOMP_WRAM, SWI_MIDI_KEY2FREQ, SWI_OBJ_AFFINE_SET,
    SWI_REGISTER_RAM_RESET, SWI_RL_UNCOMP_VRAM, SWI_RL_UNCOMP_WRAM, SWI_SOFT_RESET,
    SWI_SOUND_BIAS, SWI_SOUND_CHANNEL_CLEAR, SWI_SOUND_DRIVER_INIT, SWI_SOUND_DRIVER_MAIN,
    SWI_SOUND_DRIVER_MODE, SWI_SOUND_DRIVER_VSYNC, SWI_SOUND_DRIVER_VSYNC_OFF,
    SWI_SOUND_DRIVER_VSYNC_ON, SWI_SQRT, SWI_STOP, SWI_VBLANK_INTR_WAIT,
};
