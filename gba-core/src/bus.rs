use crate::apu::APU;
use crate::dma::{DmaTiming, DMA, DMA0SAD, DMA3CNT_H};
use crate::input::InputController;
use crate::interrupt::InterruptController;
use crate::memory::Memory;
use crate::ppu::PPU;
use crate::save::SaveController;
use crate::scheduler::{EventKind, Scheduler};
use crate::timer::{Timer, TM0CNT_L, TM3CNT_H};
use gba_arm7tdmi::cpu::{AccessWidth, MemoryBus};
use serde::{Deserialize, Serialize};

/// CPU cycles between APU frame-sequencer ticks (16,777,216 Hz clock).
/// Length/sweep/envelope tick at 256/128/64 Hz respectively, matching the
/// DMG/CGB frame sequencer the GBA's PSG channels inherited.
const APU_LENGTH_PERIOD: u64 = 65_536; // 256 Hz
const APU_SWEEP_PERIOD: u64 = 131_072; // 128 Hz
const APU_ENVELOPE_PERIOD: u64 = 262_144; // 64 Hz

/// Bus principale del sistema GBA
///
/// Smista letture/scritture verso memoria piatta, registri I/O e i
/// controller dei periferici (PPU, APU, DMA, timer, interrupt, save).
#[derive(Serialize, Deserialize)]
pub struct Bus {
    pub memory: Memory,
    pub ppu: PPU,
    pub apu: APU,
    pub dma: DMA,
    pub timer: Timer,
    pub interrupt: InterruptController,
    pub input: InputController,
    pub save: SaveController,
    pub scheduler: Scheduler,
    /// Set when the running program writes to HALTCNT (0x04000301). Cleared
    /// by `take_halt_request`, which `GbaEmulator::run_frame` polls once per
    /// CPU step to actually put the core to sleep — `Bus` has no reference
    /// to the CPU to flip `ARM7TDMI::halted` directly.
    #[serde(skip)]
    pub halt_requested: bool,
}

impl Bus {
    pub fn new() -> Self {
        let mut scheduler = Scheduler::new();
        scheduler.add_event(APU_LENGTH_PERIOD, EventKind::ApuLength);
        scheduler.add_event(APU_SWEEP_PERIOD, EventKind::ApuSweep);
        scheduler.add_event(APU_ENVELOPE_PERIOD, EventKind::ApuEnvelope);

        Self {
            memory: Memory::new(),
            ppu: PPU::new(),
            apu: APU::new(),
            dma: DMA::new(),
            timer: Timer::new(),
            interrupt: InterruptController::new(),
            input: InputController::new(),
            save: SaveController::new(),
            scheduler,
            halt_requested: false,
        }
    }

    /// Consumes the pending HALTCNT write flag, if any. `true` means the
    /// program just asked to halt the CPU until the next IRQ (GBA's `Halt`
    /// and `Stop` both reduce, in this core, to the same "sleep until
    /// interrupt" behavior per spec's simplification of `STOP`).
    pub fn take_halt_request(&mut self) -> bool {
        std::mem::take(&mut self.halt_requested)
    }

    /// Advances the scheduler by `cycles` and dispatches any APU
    /// length/envelope/sweep ticks that came due, rescheduling each for its
    /// next occurrence. HBlank/VBlank/timer timing stays driven by the PPU's
    /// and timers' own per-cycle counters (the scheduler here only owns the
    /// periodic events that are independent of CPU/PPU lockstep).
    pub fn step_scheduler(&mut self, cycles: u32) {
        self.scheduler.advance(cycles as u64);
        while let Some(kind) = self.scheduler.pop_due() {
            match kind {
                EventKind::ApuLength => {
                    self.apu.tick_length();
                    self.scheduler.add_event(APU_LENGTH_PERIOD, EventKind::ApuLength);
                }
                EventKind::ApuSweep => {
                    self.apu.tick_sweep();
                    self.scheduler.add_event(APU_SWEEP_PERIOD, EventKind::ApuSweep);
                }
                EventKind::ApuEnvelope => {
                    self.apu.tick_envelope();
                    self.scheduler
                        .add_event(APU_ENVELOPE_PERIOD, EventKind::ApuEnvelope);
                }
                // HBlank/VBlank/EndOfLine are derived from PPU state by the
                // run loop directly; TimerOverflow/DmaActivate/ApuSample/
                // IrqPoll are reserved for future scheduler-driven timers
                // and aren't posted today, so there's nothing to dispatch.
                other => {
                    log::warn!("scheduler: evento {:?} senza gestore registrato", other);
                }
            }
        }
    }

    /// Resets the scheduler's clock and re-arms the recurring APU events, to
    /// be called alongside `GbaEmulator::reset`.
    pub fn reset_scheduler(&mut self) {
        self.scheduler.clear();
        self.scheduler.add_event(APU_LENGTH_PERIOD, EventKind::ApuLength);
        self.scheduler.add_event(APU_SWEEP_PERIOD, EventKind::ApuSweep);
        self.scheduler.add_event(APU_ENVELOPE_PERIOD, EventKind::ApuEnvelope);
    }

    pub fn load_bios(&mut self, bios: Vec<u8>) {
        self.memory.load_bios(bios);
    }

    pub fn load_rom(&mut self, rom: Vec<u8>) {
        self.memory.load_rom(rom);
    }

    /// Avanza timer e DMA di `cycles` cicli CPU, applicando i trasferimenti
    /// DMA direttamente sulla memoria piatta e segnalando gli IRQ risultanti.
    ///
    /// # Returns
    /// Cicli bus extra consumati dai trasferimenti DMA in questo step (da
    /// aggiungere al conteggio cicli del chiamante: il DMA sottrae banda al
    /// bus esattamente come farebbe la CPU).
    pub fn step_peripherals(&mut self, cycles: u32) -> u32 {
        let timer_irq = self.timer.step(cycles);
        if timer_irq != 0 {
            self.interrupt.if_ |= (timer_irq as u16) << 3;
        }

        let memory = &mut self.memory;
        let (dma_irq, dma_cycles) = self.dma.step(|source, dest, is_32bit| {
            if is_32bit {
                let value = memory.read_word(source);
                memory.write_word(dest, value);
                wait_state_cycles(source, AccessWidth::Word, false)
                    + wait_state_cycles(dest, AccessWidth::Word, false)
            } else {
                let value = memory.read_halfword(source);
                memory.write_halfword(dest, value);
                wait_state_cycles(source, AccessWidth::Half, false)
                    + wait_state_cycles(dest, AccessWidth::Half, false)
            }
        });
        if dma_irq != 0 {
            self.interrupt.if_ |= (dma_irq as u16) << 8;
        }

        for _ in 0..cycles {
            self.apu.step();
        }

        dma_cycles
    }

    /// Segnala un evento di timing DMA (VBlank/HBlank/FIFO) ai 4 canali.
    pub fn trigger_dma(&mut self, timing: DmaTiming) {
        self.dma.trigger(timing);
    }

    /// Aggiorna il valore di open-bus con l'ultima istruzione fetchata dalla
    /// CPU, da richiamare una volta per step dal run loop.
    pub fn set_open_bus(&mut self, opcode: u32) {
        self.memory.open_bus = opcode;
    }
}

impl MemoryBus for Bus {
    fn read_byte(&mut self, addr: u32) -> u8 {
        // I/O Registers: 0x04000000-0x040003FE
        if (0x04000000..0x04000400).contains(&addr) {
            return self.read_io_byte(addr);
        }
        // SRAM/Flash backup: 0x0E000000-0x0E00FFFF (mirrorato fino a 0x0FFFFFFF)
        if (0x0E00_0000..=0x0FFF_FFFF).contains(&addr) {
            return self.save.read_byte(addr);
        }
        self.memory.read_byte(addr)
    }

    fn read_halfword(&mut self, addr: u32) -> u16 {
        // I/O Registers
        if (0x04000000..0x04000400).contains(&addr) {
            return self.read_io_halfword(addr);
        }
        self.memory.read_halfword(addr)
    }

    fn read_word(&mut self, addr: u32) -> u32 {
        // I/O Registers
        if (0x04000000..0x04000400).contains(&addr) {
            let low = self.read_io_halfword(addr);
            let high = self.read_io_halfword(addr + 2);
            return (low as u32) | ((high as u32) << 16);
        }
        self.memory.read_word(addr)
    }

    fn write_byte(&mut self, addr: u32, value: u8) {
        // I/O Registers
        if (0x04000000..0x04000400).contains(&addr) {
            self.write_io_byte(addr, value);
            return;
        }
        // SRAM/Flash backup
        if (0x0E00_0000..=0x0FFF_FFFF).contains(&addr) {
            self.save.write_byte(addr, value);
            return;
        }
        self.memory.write_byte(addr, value);
    }

    fn write_halfword(&mut self, addr: u32, value: u16) {
        // I/O Registers
        if (0x04000000..0x04000400).contains(&addr) {
            self.write_io_halfword(addr, value);
            return;
        }
        self.memory.write_halfword(addr, value);
    }

    fn write_word(&mut self, addr: u32, value: u32) {
        // I/O Registers
        if (0x04000000..0x04000400).contains(&addr) {
            self.write_io_halfword(addr, value as u16);
            self.write_io_halfword(addr + 2, (value >> 16) as u16);
            return;
        }
        self.memory.write_word(addr, value);
    }

    /// Tabella dei wait state per regione: cicli extra oltre al fetch base,
    /// in funzione di larghezza dell'accesso e se è Sequential (continuazione
    /// del burst precedente) o Non-sequential (nuovo indirizzo). Valori presi
    /// dai default hardware (vedi il commento di mappatura in `memory.rs`);
    /// il registro WAITCNT che permetterebbe di riconfigurare i wait state
    /// della ROM/SRAM a runtime non è implementato (vedi DESIGN.md).
    fn access_cycles(&self, addr: u32, width: AccessWidth, sequential: bool) -> u32 {
        wait_state_cycles(addr, width, sequential)
    }
}

/// Tabella dei wait state, libera da `self` così che anche il percorso DMA
/// (che trasferisce tra due indirizzi senza passare da un'istanza di `Bus`)
/// possa costarsi allo stesso modo degli accessi CPU.
fn wait_state_cycles(addr: u32, width: AccessWidth, sequential: bool) -> u32 {
    match addr {
        // BIOS, IWRAM, I/O, Palette, VRAM, OAM: tutte 1 ciclo di attesa
        // (0 wait state), indipendentemente da larghezza o N/S. Palette
        // e VRAM avrebbero +1 ciclo durante il rendering attivo; il core
        // lo ignora (vedi commento di `write_byte` su VRAM/Palette).
        0x0000_0000..=0x0000_3FFF
        | 0x0300_0000..=0x0300_7FFF
        | 0x0400_0000..=0x0400_03FF
        | 0x0500_0000..=0x0500_03FF
        | 0x0600_0000..=0x0601_7FFF
        | 0x0700_0000..=0x0700_03FF => 1,

        // EWRAM: 2 wait state fissi (3 cicli), stesso costo N o S, su
        // ogni larghezza. Il bus esterno a 16 bit raddoppia il costo
        // degli accessi a word, ma il core lo approssima a un costo
        // fisso per accesso come fa la mappa in `memory.rs`.
        0x0200_0000..=0x0203_FFFF => 3,

        // ROM (e i suoi mirror): wait state di default WS0, N=4/S=2
        // cicli per accesso a 8/16 bit; un accesso a word costa un N
        // seguito da un S (due fetch a 16 bit sul bus esterno).
        0x0800_0000..=0x09FF_FFFF | 0x0A00_0000..=0x0BFF_FFFF | 0x0C00_0000..=0x0DFF_FFFF => {
            match width {
                AccessWidth::Word => 4 + 2,
                _ => {
                    if sequential {
                        2
                    } else {
                        4
                    }
                }
            }
        }

        // SRAM/Flash/EEPROM: bus a 8 bit, 8 wait state fissi qualunque
        // sia la larghezza richiesta (il chip di salvataggio non accetta
        // accessi più larghi di un byte: `SaveController` li spezza).
        0x0E00_0000..=0x0FFF_FFFF => 9,

        // Regioni non mappate: nessun bus reale dietro, costo minimo.
        _ => 1,
    }
}

impl Bus {
    /// Leggi I/O register (halfword)
    fn read_io_halfword(&mut self, addr: u32) -> u16 {
        let aligned = addr & !1;
        match aligned {
            // PPU registers: DISPCNT through BLDY (0x04000000-0x04000055).
            // Addresses the PPU doesn't recognize fall through to its own
            // `_ => 0` arm, so routing the whole block here is safe.
            0x04000000..=0x04000056 => self.ppu.read_register(addr),

            // APU: i registri audio sono indirizzati a byte, componiamo
            // l'halfword dai due byte adiacenti.
            0x04000060..=0x040000A9 => self.apu.read_halfword(aligned),

            // DMA0-DMA3
            DMA0SAD..=DMA3CNT_H => self.dma.read_register(aligned) as u16,

            // Timer 0-3
            TM0CNT_L..=TM3CNT_H => self.timer.read_register(aligned),

            // Interrupt registers
            0x04000200 => self.interrupt.ie,         // IE
            0x04000202 => self.interrupt.if_,        // IF
            0x04000208 => self.interrupt.ime as u16, // IME

            // Input
            0x04000130 => self.input.read_keyinput(), // KEYINPUT

            _ => {
                // Altri I/O non implementati
                0
            }
        }
    }

    /// Scrivi I/O register (halfword)
    fn write_io_halfword(&mut self, addr: u32, value: u16) {
        let aligned = addr & !1;
        match aligned {
            // PPU registers: DISPCNT through BLDY (0x04000000-0x04000055).
            0x04000000..=0x04000056 => self.ppu.write_register(addr, value),

            // APU
            0x04000060..=0x040000A9 => self.apu.write_halfword(aligned, value),

            // DMA0-DMA3
            DMA0SAD..=DMA3CNT_H => self.dma.write_register(aligned, value as u32, true),

            // Timer 0-3
            TM0CNT_L..=TM3CNT_H => self.timer.write_register(aligned, value),

            // Interrupt registers
            0x04000200 => self.interrupt.ie = value,
            // Scrivere 1 in un bit di IF lo azzera (acknowledge), non lo setta.
            0x04000202 => self.interrupt.if_ &= !value,
            0x04000208 => self.interrupt.ime = (value & 0x01) != 0,

            // HALTCNT (high byte of this halfword, POSTFLG the low byte):
            // any write here requests the CPU sleep until the next IRQ.
            // Real hardware distinguishes Halt (bit7=0, wakes on any enabled
            // IRQ) from Stop (bit7=1, wakes on keypad/cart IRQ); this core
            // treats both alike per spec.md §4.3's documented simplification.
            0x04000300 => self.halt_requested = true,

            _ => {
                // Altri I/O non implementati
            }
        }
    }

    /// Leggi I/O register (byte)
    fn read_io_byte(&mut self, addr: u32) -> u8 {
        // L'APU espone già un'interfaccia byte-granulare nativa: passarci
        // attraverso evita di dover ricostruire l'halfword per poi
        // ri-spezzarla.
        if (0x04000060..=0x040000A9).contains(&addr) {
            return self.apu.read_byte(addr);
        }
        let halfword = self.read_io_halfword(addr & !1);
        if addr & 1 == 0 {
            (halfword & 0xFF) as u8
        } else {
            (halfword >> 8) as u8
        }
    }

    /// Scrivi I/O register (byte)
    fn write_io_byte(&mut self, addr: u32, value: u8) {
        if (0x04000060..=0x040000A9).contains(&addr) {
            self.apu.write_byte(addr, value);
            return;
        }
        let aligned = addr & !1;
        let current = self.read_io_halfword(aligned);
        let new_value = if addr & 1 == 0 {
            (current & 0xFF00) | (value as u16)
        } else {
            (current & 0x00FF) | ((value as u16) << 8)
        };
        self.write_io_halfword(aligned, new_value);
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
