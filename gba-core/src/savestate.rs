//! Quicksave: snapshot serializzato dell'intero stato emulato (CPU + bus),
//! distinto dal salvataggio di backup (SRAM/Flash/EEPROM) che vive accanto
//! alla ROM su disco tramite `SaveController::save_to_file`.
//!
//! Formato del blob: header a lunghezza fissa (magic a 4 byte + versione a
//! 4 byte, little-endian) seguito da un payload `serde_json`, lo stesso
//! approccio già usato nel core per lo stato seriale della CPU
//! (`gba_arm7tdmi::ARM7TDMI` deriva `Serialize`/`Deserialize`). Un
//! mismatch di versione abortisce il solo load, non il processo.
//!
//! ROM e BIOS restano fuori dal payload: sono immutabili durante
//! l'esecuzione (caricate una volta da file) e al load vengono riprese
//! dall'istanza già viva invece di essere duplicate nel blob.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bus::Bus;
use crate::emulator::GbaEmulator;
use gba_arm7tdmi::ARM7TDMI;

const MAGIC: [u8; 4] = *b"GBAQ";
const VERSION: u32 = 1;
const HEADER_LEN: usize = MAGIC.len() + 4;

/// Vista a prestito dello stato da serializzare: evita una `Clone` di
/// `Bus`/`ARM7TDMI` solo per produrre il blob di salvataggio.
#[derive(Serialize)]
struct SaveStateRef<'a> {
    cpu: &'a ARM7TDMI,
    bus: &'a Bus,
}

/// Controparte posseduta, prodotta dalla deserializzazione del payload.
/// Pubblica perché `lib.rs` la riesporta come il tipo che identifica uno
/// snapshot di quicksave, anche se in pratica si arriva sempre a uno
/// tramite `GbaEmulator::save_state`/`load_state`.
#[derive(Deserialize)]
pub struct SaveState {
    cpu: ARM7TDMI,
    bus: Bus,
}

#[derive(Error, Debug)]
pub enum SaveStateError {
    #[error("quicksave blob is truncated (expected at least {expected} header bytes, got {actual})")]
    Truncated { expected: usize, actual: usize },

    #[error("quicksave blob has an unrecognized magic header")]
    BadMagic,

    #[error("quicksave version {found} is incompatible with this build (expected {expected})")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("quicksave payload is corrupt: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GbaEmulator {
    /// Serializza CPU + bus in un blob versionato pronto da scrivere su
    /// file tramite `StateIo`. ROM/BIOS non compaiono nel payload.
    pub fn save_state(&self) -> Result<Vec<u8>, SaveStateError> {
        let snapshot = SaveStateRef {
            cpu: &self.cpu,
            bus: &self.bus,
        };
        let payload = serde_json::to_vec(&snapshot)?;

        let mut blob = Vec::with_capacity(HEADER_LEN + payload.len());
        blob.extend_from_slice(&MAGIC);
        blob.extend_from_slice(&VERSION.to_le_bytes());
        blob.extend_from_slice(&payload);
        Ok(blob)
    }

    /// Ripristina CPU + bus da un blob prodotto da `save_state`. La ROM/BIOS
    /// già caricate nell'istanza corrente sopravvivono al load invariate:
    /// lo stato ripristinato eredita quelle, non quelle (assenti) del blob.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<(), SaveStateError> {
        if bytes.len() < HEADER_LEN {
            return Err(SaveStateError::Truncated {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }

        let (header, payload) = bytes.split_at(HEADER_LEN);
        if header[..MAGIC.len()] != MAGIC {
            return Err(SaveStateError::BadMagic);
        }
        let version = u32::from_le_bytes(header[MAGIC.len()..HEADER_LEN].try_into().unwrap());
        if version != VERSION {
            return Err(SaveStateError::VersionMismatch {
                expected: VERSION,
                found: version,
            });
        }

        let restored: SaveState = serde_json::from_slice(payload)?;
        let mut bus = restored.bus;
        bus.memory.rom = std::mem::take(&mut self.bus.memory.rom);
        bus.memory.bios = std::mem::take(&mut self.bus.memory.bios);

        self.cpu = restored.cpu;
        self.bus = bus;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_state_then_load_state_round_trips_cpu_registers() {
        let mut emulator = GbaEmulator::new();
        emulator.bus.load_rom(vec![0xAAu8; 0x200]);
        emulator.cpu.regs.set_pc(0x0800_1234);
        emulator.bus.interrupt.ie = 0x1234;

        let blob = emulator.save_state().unwrap();

        let mut restored = GbaEmulator::new();
        restored.bus.load_rom(vec![0xAAu8; 0x200]);
        restored.load_state(&blob).unwrap();

        assert_eq!(restored.cpu.regs.pc(), 0x0800_1234);
        assert_eq!(restored.bus.interrupt.ie, 0x1234);
        // La ROM dell'istanza vivente non viene toccata dal blob.
        assert_eq!(restored.bus.memory.rom, vec![0xAAu8; 0x200]);
    }

    #[test]
    fn load_state_rejects_bad_magic() {
        let mut emulator = GbaEmulator::new();
        let mut blob = emulator.save_state().unwrap();
        blob[0] = b'X';
        assert!(matches!(
            emulator.load_state(&blob),
            Err(SaveStateError::BadMagic)
        ));
    }

    #[test]
    fn load_state_rejects_version_mismatch() {
        let mut emulator = GbaEmulator::new();
        let mut blob = emulator.save_state().unwrap();
        blob[4..8].copy_from_slice(&999u32.to_le_bytes());
        assert!(matches!(
            emulator.load_state(&blob),
            Err(SaveStateError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn load_state_rejects_truncated_blob() {
        let mut emulator = GbaEmulator::new();
        assert!(matches!(
            emulator.load_state(&[0u8; 3]),
            Err(SaveStateError::Truncated { .. })
        ));
    }
}
