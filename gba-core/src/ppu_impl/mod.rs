/// PPU - Picture Processing Unit
/// Modular implementation
mod affine;
mod blending;
mod constants;
mod mode0;
mod mode3;
mod mode4;
mod mode5;
mod sprites;
mod types;
mod windows;

pub use affine::{AffineMatrix, AffineParams};
pub use constants::*;
pub use sprites::SpriteAttribute;
pub use types::{BgControl, DisplayMode};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct PPU {
    /// Frame buffer (RGB555 format: xBBBBBGGGGGRRRRR)
    pub framebuffer: Vec<u16>,

    /// Display Control Register (DISPCNT)
    pub dispcnt: u16,

    /// Display Status Register (DISPSTAT)
    pub dispstat: u16,

    /// Current scanline (VCOUNT)
    pub scanline: u16,

    /// Accumulated PPU cycles
    pub cycles: u32,

    /// Background Control Registers (BG0-BG3)
    pub bg_control: [BgControl; 4],

    /// Background Scroll X (BG0-BG3)
    pub bg_hofs: [u16; 4],

    /// Background Scroll Y (BG0-BG3)
    pub bg_vofs: [u16; 4],

    /// Affine transform state for BG2 (Mode 1-2) and BG3 (Mode 2 only).
    pub bg2_affine: affine::AffineParams,
    pub bg3_affine: affine::AffineParams,

    /// Window system
    pub windows: windows::Windows,

    /// Blend control
    pub blend_control: blending::BlendControl,

    /// Alpha coefficients (BLDALPHA)
    pub alpha_coefficients: blending::AlphaCoefficients,

    /// Brightness coefficient (BLDY)
    pub brightness_coeff: u8,
}

impl PPU {
    pub fn new() -> Self {
        Self {
            framebuffer: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
            dispcnt: 0,
            dispstat: 0,
            scanline: 0,
            cycles: 0,
            bg_control: [BgControl::default(); 4],
            bg_hofs: [0; 4],
            bg_vofs: [0; 4],
            bg2_affine: affine::AffineParams::new(),
            bg3_affine: affine::AffineParams::new(),
            windows: windows::Windows::new(),
            blend_control: blending::BlendControl::new(),
            alpha_coefficients: blending::AlphaCoefficients { eva: 0, evb: 0 },
            brightness_coeff: 0,
        }
    }

    /// Read I/O register
    pub fn read_register(&self, addr: u32) -> u16 {
        match addr {
            DISPCNT => self.dispcnt,
            DISPSTAT => self.dispstat,
            VCOUNT => self.scanline,
            BG0CNT => self.bg_control[0].to_u16(),
            BG1CNT => self.bg_control[1].to_u16(),
            BG2CNT => self.bg_control[2].to_u16(),
            BG3CNT => self.bg_control[3].to_u16(),
            BG0HOFS => self.bg_hofs[0],
            BG0VOFS => self.bg_vofs[0],
            BG1HOFS => self.bg_hofs[1],
            BG1VOFS => self.bg_vofs[1],
            BG2HOFS => self.bg_hofs[2],
            BG2VOFS => self.bg_vofs[2],
            BG3HOFS => self.bg_hofs[3],
            BG3VOFS => self.bg_vofs[3],
            BLDCNT => self.blend_control.to_u16(),
            BLDALPHA => self.alpha_coefficients.to_u16(),
            BG2PA => self.bg2_affine.matrix.pa as u16,
            BG2PB => self.bg2_affine.matrix.pb as u16,
            BG2PC => self.bg2_affine.matrix.pc as u16,
            BG2PD => self.bg2_affine.matrix.pd as u16,
            BG3PA => self.bg3_affine.matrix.pa as u16,
            BG3PB => self.bg3_affine.matrix.pb as u16,
            BG3PC => self.bg3_affine.matrix.pc as u16,
            BG3PD => self.bg3_affine.matrix.pd as u16,
            // BGxX/Y are write-only on real hardware; reads return 0.
            _ => 0,
        }
    }

    /// Write I/O register
    pub fn write_register(&mut self, addr: u32, value: u16) {
        match addr {
            DISPCNT => {
                self.dispcnt = value;
            }
            DISPSTAT => {
                self.dispstat = (self.dispstat & 0x0007) | (value & 0xFFF8);
            }
            BG0CNT => self.bg_control[0] = BgControl::from_u16(value),
            BG1CNT => self.bg_control[1] = BgControl::from_u16(value),
            BG2CNT => self.bg_control[2] = BgControl::from_u16(value),
            BG3CNT => self.bg_control[3] = BgControl::from_u16(value),
            BG0HOFS => self.bg_hofs[0] = value & 0x1FF,
            BG0VOFS => self.bg_vofs[0] = value & 0x1FF,
            BG1HOFS => self.bg_hofs[1] = value & 0x1FF,
            BG1VOFS => self.bg_vofs[1] = value & 0x1FF,
            BG2HOFS => self.bg_hofs[2] = value & 0x1FF,
            BG2VOFS => self.bg_vofs[2] = value & 0x1FF,
            BG3HOFS => self.bg_hofs[3] = value & 0x1FF,
            BG3VOFS => self.bg_vofs[3] = value & 0x1FF,
            WIN0H => {
                let (left, right) = windows::WindowBounds::from_horizontal(value);
                self.windows.win0.left = left;
                self.windows.win0.right = right;
            }
            WIN1H => {
                let (left, right) = windows::WindowBounds::from_horizontal(value);
                self.windows.win1.left = left;
                self.windows.win1.right = right;
            }
            WIN0V => {
                let (top, bottom) = windows::WindowBounds::from_vertical(value);
                self.windows.win0.top = top;
                self.windows.win0.bottom = bottom;
            }
            WIN1V => {
                let (top, bottom) = windows::WindowBounds::from_vertical(value);
                self.windows.win1.top = top;
                self.windows.win1.bottom = bottom;
            }
            WININ => {
                self.windows.win0_control = windows::WindowControl::from_u8((value & 0xFF) as u8);
                self.windows.win1_control =
                    windows::WindowControl::from_u8(((value >> 8) & 0xFF) as u8);
            }
            WINOUT => {
                self.windows.winout_control = windows::WindowControl::from_u8((value & 0xFF) as u8);
                self.windows.winobj_control =
                    windows::WindowControl::from_u8(((value >> 8) & 0xFF) as u8);
            }
            BLDCNT => self.blend_control = blending::BlendControl::from_u16(value),
            BLDALPHA => self.alpha_coefficients = blending::AlphaCoefficients::from_u16(value),
            BLDY => self.brightness_coeff = (value & 0x1F).min(16) as u8,
            BG2PA => self.bg2_affine.matrix.pa = value as i16,
            BG2PB => self.bg2_affine.matrix.pb = value as i16,
            BG2PC => self.bg2_affine.matrix.pc = value as i16,
            BG2PD => self.bg2_affine.matrix.pd = value as i16,
            BG2X_L => {
                let high = ((self.bg2_affine.ref_x as u32 >> 16) & 0xFFF) as u16;
                self.bg2_affine.ref_x = affine::combine_ref_point(value, high);
            }
            BG2X_H => {
                let low = (self.bg2_affine.ref_x as u32 & 0xFFFF) as u16;
                self.bg2_affine.ref_x = affine::combine_ref_point(low, value);
            }
            BG2Y_L => {
                let high = ((self.bg2_affine.ref_y as u32 >> 16) & 0xFFF) as u16;
                self.bg2_affine.ref_y = affine::combine_ref_point(value, high);
            }
            BG2Y_H => {
                let low = (self.bg2_affine.ref_y as u32 & 0xFFFF) as u16;
                self.bg2_affine.ref_y = affine::combine_ref_point(low, value);
            }
            BG3PA => self.bg3_affine.matrix.pa = value as i16,
            BG3PB => self.bg3_affine.matrix.pb = value as i16,
            BG3PC => self.bg3_affine.matrix.pc = value as i16,
            BG3PD => self.bg3_affine.matrix.pd = value as i16,
            BG3X_L => {
                let high = ((self.bg3_affine.ref_x as u32 >> 16) & 0xFFF) as u16;
                self.bg3_affine.ref_x = affine::combine_ref_point(value, high);
            }
            BG3X_H => {
                let low = (self.bg3_affine.ref_x as u32 & 0xFFFF) as u16;
                self.bg3_affine.ref_x = affine::combine_ref_point(low, value);
            }
            BG3Y_L => {
                let high = ((self.bg3_affine.ref_y as u32 >> 16) & 0xFFF) as u16;
                self.bg3_affine.ref_y = affine::combine_ref_point(value, high);
            }
            BG3Y_H => {
                let low = (self.bg3_affine.ref_y as u32 & 0xFFFF) as u16;
                self.bg3_affine.ref_y = affine::combine_ref_point(low, value);
            }
            _ => {}
        }
    }

    /// Get current display mode
    pub fn display_mode(&self) -> DisplayMode {
        match self.dispcnt & 0x7 {
            0 => DisplayMode::Mode0,
            1 => DisplayMode::Mode1,
            2 => DisplayMode::Mode2,
            3 => DisplayMode::Mode3,
            4 => DisplayMode::Mode4,
            5 => DisplayMode::Mode5,
            _ => DisplayMode::Mode0,
        }
    }

    /// Execute PPU cycles
    pub fn step(&mut self, cycles: u32, vram: &[u8], palette_ram: &[u8], oam: &[u8]) {
        self.cycles += cycles;

        while self.cycles >= CYCLES_PER_SCANLINE {
            self.cycles -= CYCLES_PER_SCANLINE;

            // Render scanline if visible
            if self.scanline < VISIBLE_SCANLINES {
                self.render_scanline(vram, palette_ram, oam);
            }

            self.scanline += 1;

            if self.scanline >= SCANLINES_TOTAL {
                self.scanline = 0;
            }
        }

        // Re-derive the status flags every call, not only on scanline
        // rollover: HBlank can flip mid-scanline without a rollover.
        self.update_dispstat();
    }

    /// Refresh the read-only DISPSTAT flag bits (VBlank/HBlank/VCount-match)
    /// from the current scanline and intra-line cycle position. Bits 3-15
    /// (IRQ enables, VCount setting) are left untouched.
    fn update_dispstat(&mut self) {
        self.dispstat = (self.dispstat & 0xFFF8)
            | (self.in_vblank() as u16)
            | ((self.in_hblank() as u16) << 1)
            | ((self.vcount_match() as u16) << 2);
    }

    /// Check if in VBlank
    pub fn in_vblank(&self) -> bool {
        self.scanline >= VISIBLE_SCANLINES
    }

    /// Check if past the HDraw portion of the current scanline.
    pub fn in_hblank(&self) -> bool {
        self.cycles >= HDRAW_CYCLES
    }

    /// VCount setting latched in DISPSTAT bits 8-15.
    pub fn vcount_setting(&self) -> u16 {
        self.dispstat >> 8
    }

    /// Whether the current scanline matches the latched VCount setting.
    pub fn vcount_match(&self) -> bool {
        self.scanline == self.vcount_setting()
    }

    /// Render a single scanline
    fn render_scanline(&mut self, vram: &[u8], palette_ram: &[u8], oam: &[u8]) {
        match self.display_mode() {
            DisplayMode::Mode0 => {
                mode0::render_mode0_scanline(
                    self.scanline as usize,
                    SCREEN_WIDTH,
                    self.dispcnt,
                    &self.bg_control,
                    &self.bg_hofs,
                    &self.bg_vofs,
                    vram,
                    palette_ram,
                    &mut self.framebuffer,
                );
            }
            DisplayMode::Mode3 => {
                mode3::render_mode3_scanline(self.scanline, vram, &mut self.framebuffer);
            }
            DisplayMode::Mode4 => {
                // Bit 4 of DISPCNT = frame select (0 or 1)
                let frame_select = (self.dispcnt & (1 << 4)) != 0;
                mode4::render_mode4_scanline(
                    &mut self.framebuffer,
                    vram,
                    palette_ram,
                    self.scanline as usize,
                    frame_select,
                );
            }
            DisplayMode::Mode5 => {
                // Bit 4 of DISPCNT = frame select (0 or 1)
                let frame_select = (self.dispcnt & (1 << 4)) != 0;
                mode5::render_mode5_scanline(
                    &mut self.framebuffer,
                    vram,
                    self.scanline as usize,
                    frame_select,
                );
            }
            DisplayMode::Mode1 => self.render_mode1_scanline(vram, palette_ram),
            DisplayMode::Mode2 => self.render_mode2_scanline(vram, palette_ram),
        }

        // Render sprites if enabled (bit 12 of DISPCNT)
        if (self.dispcnt & (1 << 12)) != 0 {
            sprites::render_sprites_scanline(
                self.scanline as usize,
                SCREEN_WIDTH,
                oam,
                vram,
                palette_ram,
                &mut self.framebuffer,
            );
        }
    }

    /// Mode 1: BG0/BG1 regular, BG2 affine.
    fn render_mode1_scanline(&mut self, vram: &[u8], palette_ram: &[u8]) {
        let mut layers: [Vec<(u16, u8, bool)>; 3] =
            [vec![(0, 0, false); SCREEN_WIDTH], vec![(0, 0, false); SCREEN_WIDTH], vec![(0, 0, false); SCREEN_WIDTH]];

        for bg_num in 0..2 {
            if (self.dispcnt & (1 << (8 + bg_num))) == 0 {
                continue;
            }
            mode0::render_bg_scanline(
                vram,
                palette_ram,
                bg_num,
                &self.bg_control[bg_num],
                self.bg_hofs[bg_num],
                self.bg_vofs[bg_num],
                &mut layers[bg_num],
                self.scanline as usize,
                SCREEN_WIDTH,
            );
        }

        if (self.dispcnt & (1 << 10)) != 0 {
            let bg2 = &self.bg_control[2];
            let (tiles_w, _) = bg2.get_screen_size();
            let bg_size = tiles_w * 8;
            affine::render_affine_bg_layer(
                self.scanline as usize,
                SCREEN_WIDTH,
                bg_size,
                bg2.wrap,
                vram,
                palette_ram,
                (bg2.char_base as usize) * 16384,
                (bg2.screen_base as usize) * 2048,
                bg2.priority,
                &self.bg2_affine,
                &mut layers[2],
            );
        }

        mode0::composite_layers(&layers, self.scanline as usize, SCREEN_WIDTH, &mut self.framebuffer);
    }

    /// Mode 2: BG2 and BG3, both affine.
    fn render_mode2_scanline(&mut self, vram: &[u8], palette_ram: &[u8]) {
        let mut layers: [Vec<(u16, u8, bool)>; 2] =
            [vec![(0, 0, false); SCREEN_WIDTH], vec![(0, 0, false); SCREEN_WIDTH]];

        if (self.dispcnt & (1 << 10)) != 0 {
            let bg2 = &self.bg_control[2];
            let (tiles_w, _) = bg2.get_screen_size();
            affine::render_affine_bg_layer(
                self.scanline as usize,
                SCREEN_WIDTH,
                tiles_w * 8,
                bg2.wrap,
                vram,
                palette_ram,
                (bg2.char_base as usize) * 16384,
                (bg2.screen_base as usize) * 2048,
                bg2.priority,
                &self.bg2_affine,
                &mut layers[0],
            );
        }

        if (self.dispcnt & (1 << 11)) != 0 {
            let bg3 = &self.bg_control[3];
            let (tiles_w, _) = bg3.get_screen_size();
            affine::render_affine_bg_layer(
                self.scanline as usize,
                SCREEN_WIDTH,
                tiles_w * 8,
                bg3.wrap,
                vram,
                palette_ram,
                (bg3.char_base as usize) * 16384,
                (bg3.screen_base as usize) * 2048,
                bg3.priority,
                &self.bg3_affine,
                &mut layers[1],
            );
        }

        mode0::composite_layers(&layers, self.scanline as usize, SCREEN_WIDTH, &mut self.framebuffer);
    }

    /// Read sprite attributes out of an external OAM buffer (index 0-127).
    pub fn read_sprite(oam: &[u8], index: usize) -> SpriteAttribute {
        if index < OAM_SPRITE_COUNT {
            let offset = index * 8;
            SpriteAttribute::from_oam_bytes(&oam[offset..offset + 6])
        } else {
            SpriteAttribute::default()
        }
    }

    /// Get framebuffer for rendering
    pub fn framebuffer(&self) -> &[u16] {
        &self.framebuffer
    }
}

impl Default for PPU {
    fn default() -> Self {
        Self::new()
    }
}
