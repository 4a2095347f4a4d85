/// Direct Memory Access controller.
///
/// The real implementation lives in `dma_impl/`; this module just re-exports
/// its public surface the way `ppu.rs` does for the PPU.
pub use crate::dma_impl::{
    DmaControl, DmaTiming, DMA, DMA0CNT_H, DMA0CNT_L, DMA0DAD, DMA0SAD, DMA1CNT_H, DMA1CNT_L,
    DMA1DAD, DMA1SAD, DMA2CNT_H, DMA2CNT_L, DMA2DAD, DMA2SAD, DMA3CNT_H, DMA3CNT_L, DMA3DAD,
    DMA3SAD, DMA_CHANNEL_COUNT,
};
