/// Cartridge backup storage (SRAM/Flash/EEPROM).
///
/// The real implementation lives in `save_impl/`; this module re-exports its
/// public surface the way `ppu.rs` does for the PPU.
pub use crate::save_impl::{detect_save_type, verify_save_type, SaveController, SaveMetadata, SaveType};
pub use crate::save_impl::{
    EEPROM_8K_SIZE, EEPROM_512B_SIZE, EEPROM_END, EEPROM_START, FLASH_128K_SIZE, FLASH_64K_SIZE,
    FLASH_ADDR_CMD1, FLASH_ADDR_CMD2, FLASH_ATMEL_64K, FLASH_CMD_BANK_SWITCH,
    FLASH_CMD_ENTER_ID, FLASH_CMD_ERASE_CHIP, FLASH_CMD_ERASE_SECTOR, FLASH_CMD_EXIT_ID,
    FLASH_CMD_READ, FLASH_CMD_WRITE_BYTE, FLASH_CMD_WRITE_DISABLE, FLASH_CMD_WRITE_ENABLE,
    FLASH_END, FLASH_MACRONIX_128K, FLASH_MACRONIX_64K, FLASH_PANASONIC_64K, FLASH_SANYO_128K,
    FLASH_SECTOR_SIZE, FLASH_START, SAVE_EEPROM_V, SAVE_FLASH1M_V, SAVE_FLASH512_V, SAVE_FLASH_V,
    SAVE_SRAM_V, SRAM_END, SRAM_SIZE, SRAM_START,
};
