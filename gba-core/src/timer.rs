/// Hardware timer block: 4 cascading 16-bit counters.
///
/// The real implementation lives in `timer_impl/`; this module re-exports its
/// public surface the way `ppu.rs` does for the PPU.
pub use crate::timer_impl::{
    TimerControl, Timer, TM0CNT_H, TM0CNT_L, TM1CNT_H, TM1CNT_L, TM2CNT_H, TM2CNT_L, TM3CNT_H,
    TM3CNT_L, TIMER_COUNT,
};
