/// PPU - Constants and Memory Map
/// Screen dimensions
pub const SCREEN_WIDTH: usize = 240;
pub const SCREEN_HEIGHT: usize = 160;

/// LCD I/O Registers
pub const DISPCNT: u32 = 0x04000000; // Display Control
pub const DISPSTAT: u32 = 0x04000004; // Display Status
pub const VCOUNT: u32 = 0x04000006; // Vertical Counter

/// Background Control Registers (BGxCNT)
pub const BG0CNT: u32 = 0x04000008;
pub const BG1CNT: u32 = 0x0400000A;
pub const BG2CNT: u32 = 0x0400000C;
pub const BG3CNT: u32 = 0x0400000E;

/// Background Scroll Registers (BGxHOFS/BGxVOFS)
pub const BG0HOFS: u32 = 0x04000010;
pub const BG0VOFS: u32 = 0x04000012;
pub const BG1HOFS: u32 = 0x04000014;
pub const BG1VOFS: u32 = 0x04000016;
pub const BG2HOFS: u32 = 0x04000018;
pub const BG2VOFS: u32 = 0x0400001A;
pub const BG3HOFS: u32 = 0x0400001C;
pub const BG3VOFS: u32 = 0x0400001E;

/// Affine transform registers for BG2/BG3 (Mode 1-2), 8.8 fixed-point
/// matrix coefficients plus 20.8 fixed-point reference points.
pub const BG2PA: u32 = 0x04000020;
pub const BG2PB: u32 = 0x04000022;
pub const BG2PC: u32 = 0x04000024;
pub const BG2PD: u32 = 0x04000026;
pub const BG2X_L: u32 = 0x04000028;
pub const BG2X_H: u32 = 0x0400002A;
pub const BG2Y_L: u32 = 0x0400002C;
pub const BG2Y_H: u32 = 0x0400002E;
pub const BG3PA: u32 = 0x04000030;
pub const BG3PB: u32 = 0x04000032;
pub const BG3PC: u32 = 0x04000034;
pub const BG3PD: u32 = 0x04000036;
pub const BG3X_L: u32 = 0x04000038;
pub const BG3X_H: u32 = 0x0400003A;
pub const BG3Y_L: u32 = 0x0400003C;
pub const BG3Y_H: u32 = 0x0400003E;

/// Window and color-effect registers.
pub const WIN0H: u32 = 0x04000040;
pub const WIN1H: u32 = 0x04000042;
pub const WIN0V: u32 = 0x04000044;
pub const WIN1V: u32 = 0x04000046;
pub const WININ: u32 = 0x04000048;
pub const WINOUT: u32 = 0x0400004A;
pub const MOSAIC: u32 = 0x0400004C;
pub const BLDCNT: u32 = 0x04000050;
pub const BLDALPHA: u32 = 0x04000052;
pub const BLDY: u32 = 0x04000054;

/// Palette RAM: 0x05000000-0x050003FF (1KB)
pub const PALETTE_RAM_SIZE: usize = 0x400;
pub const BG_PALETTE_SIZE: usize = 0x200;
pub const OBJ_PALETTE_OFFSET: usize = 0x200;

/// OAM (Object Attribute Memory): 0x07000000-0x070003FF (1KB)
pub const OAM_SIZE: usize = 0x400;
pub const OAM_SPRITE_COUNT: usize = 128;

/// OBJ tiles in VRAM: 0x06010000-0x06017FFF (32KB in Mode 0-2)
pub const OBJ_TILE_BASE: usize = 0x10000;

/// Timing constants
pub const CYCLES_PER_SCANLINE: u32 = 1232;
pub const SCANLINES_TOTAL: u16 = 228;
pub const VISIBLE_SCANLINES: u16 = 160;

/// Cycles of HDraw before HBlank starts within a scanline (1006 visible +
/// 226 HBlank = 1232 total).
pub const HDRAW_CYCLES: u32 = 1006;
