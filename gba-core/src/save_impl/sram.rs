/// Save System - SRAM Implementation
/// Simple battery-backed SRAM (32-64 KB)
use super::types::SaveType;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct Sram {
    data: Vec<u8>,
    size: usize,
}

impl Sram {
    pub fn new(save_type: SaveType) -> Self {
        let size = save_type.size();
        Self {
            data: vec![0xFF; size], // SRAM defaults to 0xFF when empty
            size,
        }
    }

    /// Read byte from SRAM
    pub fn read_byte(&self, offset: u32) -> u8 {
        let offset = (offset as usize) & (self.size - 1); // Wrap around
        self.data.get(offset).copied().unwrap_or(0xFF)
    }

    /// Write byte to SRAM
    pub fn write_byte(&mut self, offset: u32, value: u8) {
        let offset = (offset as usize) & (self.size - 1); // Wrap around
        if offset < self.data.len() {
            self.data[offset] = value;
        }
    }

    /// Get entire data for saving to file
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Load data from file
    pub fn load_data(&mut self, data: Vec<u8>) {
        if data.len() == self.size {
            self.data = data;
        } else {
            // Resize if needed
            self.data = data;
            self.data.resize(self.size, 0xFF);
        }
    }

    /// Clear all data (reset to 0xFF)
    pub fn clear(&mut self) {
        self.data.fill(0xFF);
    }
}
