/// Save System - Auto-detection
/// Detect save type from ROM data
use super::constants::*;
use super::types::SaveType;

/// Detect save type by scanning ROM for identification strings
pub fn detect_save_type(rom: &[u8]) -> SaveType {
    // Convert ROM to string for searching (safe for ASCII strings)
    let rom_str = String::from_utf8_lossy(rom);

    // Check for save type strings in order of specificity
    // More specific strings first to avoid false positives

    if rom_str.contains(SAVE_FLASH1M_V) {
        return SaveType::Flash128K;
    }

    if rom_str.contains(SAVE_FLASH512_V) {
        return SaveType::Flash64K;
    }

    if rom_str.contains(SAVE_FLASH_V) {
        // Generic FLASH - default to 64K
        return SaveType::Flash64K;
    }

    if rom_str.contains(SAVE_EEPROM_V) {
        // EEPROM - determine size by ROM size
        // Games > 16MB typically use 8KB EEPROM
        if rom.len() > 16 * 1024 * 1024 {
            return SaveType::Eeprom8K;
        } else {
            return SaveType::Eeprom512B;
        }
    }

    if rom_str.contains(SAVE_SRAM_V) {
        return SaveType::Sram;
    }

    // No save type detected
    SaveType::None
}

/// Verify save type by checking multiple heuristics
pub fn verify_save_type(_rom: &[u8], detected_type: SaveType) -> SaveType {
    // Additional verification can be done here
    // For now, trust the detection
    detected_type
}
