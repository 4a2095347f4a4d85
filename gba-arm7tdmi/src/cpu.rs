use crate::arm::{self, data_processing, ArmInstruction, Condition};
use crate::instructions::{alu, branch, load_store, multiply};
use crate::registers::{Mode, Registers};
use crate::thumb::{self, thumb_alu, ThumbInstruction};
use serde::{Deserialize, Serialize};

//==============================================================================
// MEMORIA E BUS
//==============================================================================
// Il MemoryBus è il trait che definisce come la CPU accede alla memoria.
// Qualsiasi componente che implementa questo trait può essere usato dalla CPU
// per leggere/scrivere dati. Questo design modulare permette di:
// 1. Testare la CPU con un bus fittizio (DummyBus)
// 2. Usare un bus reale che gestisce tutta la memoria GBA
// 3. Cambiare implementazione senza modificare la CPU
//==============================================================================

/// Larghezza di un accesso al bus, usata per classificare il costo in wait
/// state dell'accesso (bus a 8/16/32 bit per regione, vedi `access_cycles`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessWidth {
    Byte,
    Half,
    Word,
}

/// Trait per accesso alla memoria dalla CPU
///
/// Questo trait definisce le operazioni base di lettura/scrittura che la CPU
/// deve poter fare sulla memoria. Implementalo per creare un bus personalizzato.
pub trait MemoryBus {
    fn read_byte(&mut self, addr: u32) -> u8;
    fn read_halfword(&mut self, addr: u32) -> u16;
    fn read_word(&mut self, addr: u32) -> u32;

    fn write_byte(&mut self, addr: u32, value: u8);
    fn write_halfword(&mut self, addr: u32, value: u16);
    fn write_word(&mut self, addr: u32, value: u32);

    /// Costo in cicli CPU di un singolo accesso al bus a `addr`, di
    /// larghezza `width`. `sequential` distingue un accesso Sequential (S,
    /// il successivo di un burst, stesso indirizzo di base o adiacente) da
    /// uno Non-sequential (N, il primo di un nuovo accesso). Questa è la
    /// fonte unica di verità per il timing dei wait state: CPU e DMA la
    /// interrogano invece di assumere un costo fisso.
    ///
    /// L'implementazione di default assume zero wait state ovunque (il bus
    /// "ideale" usato dai test e dai bus fittizi come `DummyBus`); `Bus` in
    /// `gba-core` la sovrascrive con la vera tabella per regione.
    fn access_cycles(&self, _addr: u32, _width: AccessWidth, _sequential: bool) -> u32 {
        1
    }
}

//==============================================================================
// CPU ARM7TDMI - STRUTTURA PRINCIPALE
//==============================================================================
// Questa è la CPU del Game Boy Advance. È un processore ARM7TDMI che:
// - Supporta set di istruzioni ARM a 32-bit
// - Supporta set di istruzioni THUMB a 16-bit (più compatto)
// - Ha 37 registri in totale (16 visibili + 21 banked)
// - Esegue istruzioni in pipeline a 3 stadi (Fetch-Decode-Execute)
//
// STATO CORRENTE:
// ✅ Struttura base implementata
// ✅ Registri e modalità CPU funzionanti
// ✅ Decode-dispatch per istruzioni ARM e THUMB
//==============================================================================

/// CPU ARM7TDMI del Game Boy Advance
///
/// Campi:
/// - `regs`: Registri della CPU (R0-R15, CPSR, SPSR, banked registers)
/// - `cycles`: Contatore cicli totali eseguiti
/// - `halted`: Se true, la CPU è in stato HALT (risparmio energetico)
/// - `last_opcode`: ultima istruzione fetchata, usata dal bus come valore
///   open-bus per letture fuori mappa
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ARM7TDMI {
    pub regs: Registers,
    pub cycles: u64,
    pub halted: bool,
    pub last_opcode: u32,
    /// Indirizzo atteso del prossimo fetch se l'esecuzione continuasse in
    /// sequenza (fetch precedente + la sua dimensione). Confrontarlo col
    /// `fetch_pc` del fetch corrente distingue un fetch Sequential (bus
    /// ancora nello stesso burst) da uno Non-sequential (branch, eccezione,
    /// primo fetch dopo reset) senza dover tracciare esplicitamente ogni
    /// punto di flush della pipeline.
    #[serde(skip)]
    prev_fetch_end: Option<u32>,
}

impl ARM7TDMI {
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            cycles: 0,
            halted: false,
            last_opcode: 0,
            prev_fetch_end: None,
        }
    }

    /// Reset della CPU
    pub fn reset(&mut self) {
        self.regs = Registers::new();
        self.regs.set_pc(0x0000_0000);
        self.cycles = 0;
        self.halted = false;
        self.last_opcode = 0;
        self.prev_fetch_end = None;
    }

    //==========================================================================
    // STEP - ESECUZIONE ISTRUZIONE
    //==========================================================================
    // Questo è il metodo principale che esegue UNA SINGOLA ISTRUZIONE.
    //
    // COME FUNZIONA:
    // 1. Controlla se la CPU è in HALT (se sì, salta e restituisce 1 ciclo)
    // 2. Legge il bit THUMB del CPSR per capire quale set istruzioni usare
    // 3. Esegue l'istruzione ARM (32-bit) o THUMB (16-bit)
    // 4. Restituisce il numero di cicli usati dall'istruzione
    //
    // IMPORTANTE: Ogni istruzione ha un costo in cicli diverso!
    // - Istruzioni semplici: 1 ciclo
    // - Accesso memoria: 1-3 cicli (dipende dalla regione)
    // - Moltiplicazioni: 1-4 cicli
    // - Branch: 2-3 cicli
    //==========================================================================

    /// Esegui una singola istruzione e restituisci i cicli usati
    ///
    /// # Arguments
    /// * `bus` - Il bus di memoria per leggere istruzioni e dati
    ///
    /// # Returns
    /// Numero di cicli CPU usati dall'istruzione
    pub fn step<M: MemoryBus>(&mut self, bus: &mut M) -> u32 {
        if self.halted {
            return 1;
        }

        let cycles = if self.regs.is_thumb() {
            self.execute_thumb(bus)
        } else {
            self.execute_arm(bus)
        };

        self.cycles += cycles as u64;
        cycles
    }

    //==========================================================================
    // ESECUZIONE ISTRUZIONI ARM (32-bit)
    //==========================================================================
    // Le istruzioni ARM sono a 32-bit e sono il set principale del processore.
    //
    // FORMATO ISTRUZIONE ARM:
    // [31:28] - Condition code (EQ, NE, CS, etc.)
    // [27:25] - Tipo istruzione
    // [24:0]  - Parametri specifici dell'istruzione
    //
    // PASSI PER IMPLEMENTARE:
    // 1. Leggere istruzione a 32-bit dal PC
    // 2. Verificare condition code (se non soddisfatto, skip)
    // 3. Decodificare il tipo di istruzione dai bit [27:25] e altri
    // 4. Eseguire l'operazione specifica
    // 5. Aggiornare PC (normalmente +4, o branch se è un salto)
    // 6. Restituire cicli usati
    //
    // Riferimento: ARM7TDMI Technical Manual, GBATEK
    //==========================================================================

    /// Esegui un'istruzione ARM (32-bit)
    fn execute_arm<M: MemoryBus>(&mut self, bus: &mut M) -> u32 {
        let fetch_pc = self.regs.pc();
        let sequential = self.prev_fetch_end == Some(fetch_pc);
        let fetch_cycles = bus.access_cycles(fetch_pc, AccessWidth::Word, sequential);
        let instruction = bus.read_word(fetch_pc);
        self.last_opcode = instruction;
        self.prev_fetch_end = Some(fetch_pc.wrapping_add(4));

        let next_pc = fetch_pc.wrapping_add(4);
        // Vista pipeline: mentre l'istruzione viene eseguita, R15 letto dal
        // codice (operand2 con Rm=15, STR Rd=15, ...) vale fetch+8.
        let exec_pc = fetch_pc.wrapping_add(8);
        self.regs.set_pc(exec_pc);

        let condition = Condition::from_opcode(instruction);
        if !condition.check(self.regs.cpsr) {
            self.regs.set_pc(next_pc);
            return fetch_cycles;
        }

        let decoded = arm::decode_arm(instruction);
        let extra_cycles = self.dispatch_arm(bus, decoded, next_pc);

        // Se l'istruzione non ha scritto PC esplicitamente, torniamo alla
        // normale sequenza (fetch+4).
        if self.regs.pc() == exec_pc {
            self.regs.set_pc(next_pc);
        }

        // Un salto esplicito invalida il burst di fetch in corso: il
        // prossimo fetch ripartirà da un indirizzo diverso da `next_pc` e
        // sarà quindi automaticamente ricostato come Non-sequential al
        // prossimo giro, senza bisogno di azzerare `prev_fetch_end` a mano.
        fetch_cycles + extra_cycles
    }

    /// Decodifica ed esegue una singola istruzione ARM già fetchata.
    ///
    /// `next_pc` è l'indirizzo dell'istruzione successiva nel flusso
    /// sequenziale (fetch+4), usato come indirizzo di ritorno da SWI/Undefined.
    fn dispatch_arm<M: MemoryBus>(&mut self, bus: &mut M, inst: ArmInstruction, next_pc: u32) -> u32 {
        match inst {
            ArmInstruction::DataProcessing {
                opcode,
                set_flags,
                rn,
                rd,
                operand2,
                immediate,
            } => {
                let (value, carry) = alu::decode_operand2(operand2, immediate, &self.regs);
                alu::execute_data_processing(&mut self.regs, opcode, rd, rn, value, set_flags, carry)
            }

            ArmInstruction::Branch { link, offset } => branch::execute_branch(&mut self.regs, offset, link),

            ArmInstruction::BranchExchange { rn } => branch::execute_branch_exchange(&mut self.regs, rn),

            ArmInstruction::SingleDataTransfer {
                load,
                byte,
                pre_index,
                add,
                writeback,
                rn,
                rd,
                offset,
                immediate,
            } => {
                let offset_val = if immediate {
                    offset
                } else {
                    alu::decode_operand2(offset, false, &self.regs).0
                };
                load_store::execute_single_data_transfer(
                    &mut self.regs,
                    bus,
                    load,
                    byte,
                    pre_index,
                    add,
                    writeback,
                    rn,
                    rd,
                    offset_val,
                )
            }

            ArmInstruction::BlockDataTransfer {
                load,
                pre_index,
                add,
                user_mode,
                writeback,
                rn,
                register_list,
            } => load_store::execute_block_data_transfer(
                &mut self.regs,
                bus,
                load,
                pre_index,
                add,
                writeback,
                user_mode,
                rn,
                register_list,
            ),

            ArmInstruction::HalfwordTransfer {
                load,
                pre_index,
                add,
                immediate,
                writeback,
                signed,
                halfword,
                rn,
                rd,
                offset,
            } => {
                let offset_val = if immediate {
                    offset as u32
                } else {
                    self.regs.r[offset as usize]
                };
                load_store::execute_halfword_transfer(
                    &mut self.regs,
                    bus,
                    load,
                    pre_index,
                    add,
                    writeback,
                    signed,
                    halfword,
                    rn,
                    rd,
                    offset_val,
                )
            }

            ArmInstruction::Multiply {
                accumulate,
                set_flags,
                rd,
                rn,
                rs,
                rm,
            } => multiply::execute_multiply(&mut self.regs, accumulate, set_flags, rd, rn, rs, rm),

            ArmInstruction::MultiplyLong {
                signed,
                accumulate,
                set_flags,
                rd_hi,
                rd_lo,
                rs,
                rm,
            } => multiply::execute_multiply_long(
                &mut self.regs,
                signed,
                accumulate,
                set_flags,
                rd_hi,
                rd_lo,
                rs,
                rm,
            ),

            ArmInstruction::Mrs { spsr, rd } => {
                let value = if spsr { self.regs.spsr() } else { self.regs.cpsr };
                if rd != 15 {
                    self.regs.r[rd as usize] = value;
                }
                0
            }

            ArmInstruction::Msr {
                spsr,
                field_mask,
                immediate,
                operand,
            } => {
                let value = if immediate {
                    let imm = operand & 0xFF;
                    let rotate = ((operand >> 8) & 0xF) * 2;
                    imm.rotate_right(rotate)
                } else {
                    self.regs.r[(operand & 0xF) as usize]
                };

                let mut mask: u32 = 0;
                if field_mask & 0x1 != 0 {
                    mask |= 0x0000_00FF; // control
                }
                if field_mask & 0x2 != 0 {
                    mask |= 0x0000_FF00; // extension
                }
                if field_mask & 0x4 != 0 {
                    mask |= 0x00FF_0000; // status
                }
                if field_mask & 0x8 != 0 {
                    mask |= 0xFF00_0000; // flags
                }

                if spsr {
                    let old = self.regs.spsr();
                    self.regs.set_spsr((old & !mask) | (value & mask));
                } else {
                    let merged = (self.regs.cpsr & !mask) | (value & mask);
                    if mask & 0xFF != 0 {
                        if let Some(new_mode) = Mode::from_bits(merged) {
                            self.regs.change_mode(new_mode);
                        }
                    }
                    self.regs.cpsr = (self.regs.cpsr & !mask) | (value & mask);
                }
                0
            }

            ArmInstruction::SWI { .. } => {
                self.enter_exception(Mode::Supervisor, 0x0000_0008, next_pc, false);
                2
            }

            ArmInstruction::Undefined => {
                self.enter_exception(Mode::Undefined, 0x0000_0004, next_pc, false);
                2
            }
        }
    }

    //==========================================================================
      // ESECUZIONE ISTRUZIONI THUMB (16-bit)
      //==========================================================================
      // Le istruzioni THUMB sono a 16-bit, più compatte ma meno potenti.
      // Vengono usate per risparmiare spazio ROM e migliorare cache performance.
      //
      // VANTAGGI THUMB:
      // - Codice più compatto (circa 65% della dimensione ARM)
      // - Migliore uso della cache
      // - Usato dalla maggior parte dei giochi GBA
      //
      // FORMATO ISTRUZIONE THUMB:
      // [15:13] o [15:11] - Tipo istruzione (varia)
      // [12:0]  - Parametri specifici
      //
      // DIFFERENZE DA ARM:
      // - NO condition codes (esegue sempre, tranne branch condizionali)
      // - Accesso limitato ai registri (spesso solo R0-R7)
      // - Set istruzioni ridotto
      //
      // Riferimento: ARM7TDMI Manual Section 5, GBATEK
      //==========================================================================

    /// Esegui un'istruzione THUMB (16-bit)
    fn execute_thumb<M: MemoryBus>(&mut self, bus: &mut M) -> u32 {
        let fetch_pc = self.regs.pc();
        let sequential = self.prev_fetch_end == Some(fetch_pc);
        let fetch_cycles = bus.access_cycles(fetch_pc, AccessWidth::Half, sequential);
        let instruction = bus.read_halfword(fetch_pc);
        self.last_opcode = instruction as u32;
        self.prev_fetch_end = Some(fetch_pc.wrapping_add(2));

        let next_pc = fetch_pc.wrapping_add(2);
        // Vista pipeline THUMB: R15 letto durante l'esecuzione vale fetch+4.
        let exec_pc = fetch_pc.wrapping_add(4);
        self.regs.set_pc(exec_pc);

        let decoded = thumb::decode_thumb(instruction);
        let extra_cycles = self.dispatch_thumb(bus, decoded, next_pc);

        if self.regs.pc() == exec_pc {
            self.regs.set_pc(next_pc);
        }
        fetch_cycles + extra_cycles
    }

    /// Decodifica ed esegue una singola istruzione THUMB già fetchata.
    fn dispatch_thumb<M: MemoryBus>(&mut self, bus: &mut M, inst: ThumbInstruction, next_pc: u32) -> u32 {
        match inst {
            ThumbInstruction::MoveShiftedRegister { op, offset, rs, rd } => {
                let rs_value = self.regs.r[rs as usize];
                let (value, carry) =
                    alu::shift_by_type(rs_value, op as u32, offset as u32, self.regs.flag_c());
                self.regs.r[rd as usize] = value;
                self.regs.set_flag_n((value & 0x8000_0000) != 0);
                self.regs.set_flag_z(value == 0);
                self.regs.set_flag_c(carry);
                0
            }

            ThumbInstruction::AddSubtract {
                sub,
                immediate,
                rn_offset,
                rs,
                rd,
            } => {
                let opcode = if sub { data_processing::SUB } else { data_processing::ADD };
                let operand2 = if immediate {
                    rn_offset as u32
                } else {
                    self.regs.r[rn_offset as usize]
                };
                alu::execute_data_processing(&mut self.regs, opcode, rd, rs, operand2, true, self.regs.flag_c())
            }

            ThumbInstruction::AluImmediate { op, rd, offset } => {
                let opcode = match op {
                    0 => data_processing::MOV,
                    1 => data_processing::CMP,
                    2 => data_processing::ADD,
                    _ => data_processing::SUB,
                };
                alu::execute_data_processing(&mut self.regs, opcode, rd, rd, offset as u32, true, self.regs.flag_c())
            }

            ThumbInstruction::AluOperation { op, rs, rd } => {
                let rs_value = self.regs.r[rs as usize];
                let carry = self.regs.flag_c();
                match op {
                    thumb_alu::AND => alu::execute_data_processing(&mut self.regs, data_processing::AND, rd, rd, rs_value, true, carry),
                    thumb_alu::EOR => alu::execute_data_processing(&mut self.regs, data_processing::EOR, rd, rd, rs_value, true, carry),
                    thumb_alu::ADC => alu::execute_data_processing(&mut self.regs, data_processing::ADC, rd, rd, rs_value, true, carry),
                    thumb_alu::SBC => alu::execute_data_processing(&mut self.regs, data_processing::SBC, rd, rd, rs_value, true, carry),
                    thumb_alu::TST => alu::execute_data_processing(&mut self.regs, data_processing::TST, rd, rd, rs_value, true, carry),
                    thumb_alu::CMP => alu::execute_data_processing(&mut self.regs, data_processing::CMP, rd, rd, rs_value, true, carry),
                    thumb_alu::CMN => alu::execute_data_processing(&mut self.regs, data_processing::CMN, rd, rd, rs_value, true, carry),
                    thumb_alu::ORR => alu::execute_data_processing(&mut self.regs, data_processing::ORR, rd, rd, rs_value, true, carry),
                    thumb_alu::BIC => alu::execute_data_processing(&mut self.regs, data_processing::BIC, rd, rd, rs_value, true, carry),
                    thumb_alu::MVN => alu::execute_data_processing(&mut self.regs, data_processing::MVN, rd, rd, rs_value, true, carry),
                    thumb_alu::NEG => alu::execute_data_processing(&mut self.regs, data_processing::RSB, rd, rs, 0, true, carry),
                    thumb_alu::MUL => multiply::execute_multiply(&mut self.regs, false, true, rd, 0, rs, rd),
                    thumb_alu::LSL | thumb_alu::LSR | thumb_alu::ASR | thumb_alu::ROR => {
                        let shift_type = match op {
                            thumb_alu::LSL => 0,
                            thumb_alu::LSR => 1,
                            thumb_alu::ASR => 2,
                            _ => 3,
                        };
                        let amount = rs_value & 0xFF;
                        let (value, new_carry) =
                            alu::shift_by_register_amount(self.regs.r[rd as usize], shift_type, amount, carry);
                        self.regs.r[rd as usize] = value;
                        self.regs.set_flag_n((value & 0x8000_0000) != 0);
                        self.regs.set_flag_z(value == 0);
                        self.regs.set_flag_c(new_carry);
                        0
                    }
                    _ => 0,
                }
            }

            ThumbInstruction::HiRegisterOps { op, h1, h2, rs, rd } => {
                let rd_full = rd + if h1 { 8 } else { 0 };
                let rs_full = rs + if h2 { 8 } else { 0 };
                let rs_value = if rs_full == 15 { self.regs.pc() } else { self.regs.r[rs_full as usize] };
                match op {
                    0 => {
                        // ADD
                        let rd_value = if rd_full == 15 { self.regs.pc() } else { self.regs.r[rd_full as usize] };
                        let result = rd_value.wrapping_add(rs_value);
                        if rd_full == 15 {
                            self.regs.set_pc(result & !1);
                            2
                        } else {
                            self.regs.r[rd_full as usize] = result;
                            0
                        }
                    }
                    1 => {
                        // CMP: aggiorna i flag, non scrive mai (rd fittizio)
                        alu::execute_data_processing(&mut self.regs, data_processing::CMP, 0, rd_full, rs_value, true, self.regs.flag_c())
                    }
                    2 => {
                        // MOV
                        if rd_full == 15 {
                            self.regs.set_pc(rs_value & !1);
                            2
                        } else {
                            self.regs.r[rd_full as usize] = rs_value;
                            0
                        }
                    }
                    _ => branch::execute_branch_exchange(&mut self.regs, rs_full),
                }
            }

            ThumbInstruction::LoadPcRelative { rd, offset } => {
                let base = self.regs.pc() & !3;
                let address = base.wrapping_add((offset as u32) * 4);
                let access_cycles = bus.access_cycles(address, AccessWidth::Word, false);
                self.regs.r[rd as usize] = bus.read_word(address);
                access_cycles + 1
            }

            ThumbInstruction::LoadStoreRegOffset { load, byte, ro, rb, rd } => {
                let address = self.regs.r[rb as usize].wrapping_add(self.regs.r[ro as usize]);
                let width = if byte { AccessWidth::Byte } else { AccessWidth::Word };
                let access_cycles = bus.access_cycles(address, width, false);
                if load {
                    let value = if byte {
                        bus.read_byte(address) as u32
                    } else {
                        bus.read_word(address & !3)
                    };
                    self.regs.r[rd as usize] = value;
                    access_cycles + 1
                } else {
                    if byte {
                        bus.write_byte(address, self.regs.r[rd as usize] as u8);
                    } else {
                        bus.write_word(address & !3, self.regs.r[rd as usize]);
                    }
                    access_cycles
                }
            }

            ThumbInstruction::LoadStoreSignExtended { h, sign, ro, rb, rd } => {
                let address = self.regs.r[rb as usize].wrapping_add(self.regs.r[ro as usize]);
                let width = if h { AccessWidth::Half } else { AccessWidth::Byte };
                let access_cycles = bus.access_cycles(address, width, false);
                match (sign, h) {
                    (false, false) => {
                        bus.write_halfword(address & !1, self.regs.r[rd as usize] as u16);
                        access_cycles
                    }
                    (false, true) => {
                        self.regs.r[rd as usize] = bus.read_halfword(address & !1) as u32;
                        access_cycles + 1
                    }
                    (true, false) => {
                        self.regs.r[rd as usize] = ((bus.read_byte(address) as i8) as i32) as u32;
                        access_cycles + 1
                    }
                    (true, true) => {
                        self.regs.r[rd as usize] = ((bus.read_halfword(address & !1) as i16) as i32) as u32;
                        access_cycles + 1
                    }
                }
            }

            ThumbInstruction::LoadStoreImmOffset { load, byte, offset, rb, rd } => {
                let scale = if byte { 1 } else { 4 };
                let address = self.regs.r[rb as usize].wrapping_add((offset as u32) * scale);
                let width = if byte { AccessWidth::Byte } else { AccessWidth::Word };
                let access_cycles = bus.access_cycles(address, width, false);
                if load {
                    let value = if byte {
                        bus.read_byte(address) as u32
                    } else {
                        bus.read_word(address & !3)
                    };
                    self.regs.r[rd as usize] = value;
                    access_cycles + 1
                } else {
                    if byte {
                        bus.write_byte(address, self.regs.r[rd as usize] as u8);
                    } else {
                        bus.write_word(address & !3, self.regs.r[rd as usize]);
                    }
                    access_cycles
                }
            }

            ThumbInstruction::LoadStoreHalfword { load, offset, rb, rd } => {
                let address = self.regs.r[rb as usize].wrapping_add((offset as u32) * 2);
                let access_cycles = bus.access_cycles(address, AccessWidth::Half, false);
                if load {
                    self.regs.r[rd as usize] = bus.read_halfword(address & !1) as u32;
                    access_cycles + 1
                } else {
                    bus.write_halfword(address & !1, self.regs.r[rd as usize] as u16);
                    access_cycles
                }
            }

            ThumbInstruction::LoadStoreSpRelative { load, rd, offset } => {
                let address = self.regs.sp().wrapping_add((offset as u32) * 4);
                let access_cycles = bus.access_cycles(address, AccessWidth::Word, false);
                if load {
                    self.regs.r[rd as usize] = bus.read_word(address & !3);
                    access_cycles + 1
                } else {
                    bus.write_word(address & !3, self.regs.r[rd as usize]);
                    access_cycles
                }
            }

            ThumbInstruction::LoadAddress { sp, rd, offset } => {
                let base = if sp { self.regs.sp() } else { self.regs.pc() & !3 };
                self.regs.r[rd as usize] = base.wrapping_add((offset as u32) * 4);
                0
            }

            ThumbInstruction::AddOffsetSp { sub, offset } => {
                let amount = (offset as u32) * 4;
                if sub {
                    self.regs.r[13] = self.regs.r[13].wrapping_sub(amount);
                } else {
                    self.regs.r[13] = self.regs.r[13].wrapping_add(amount);
                }
                0
            }

            ThumbInstruction::PushPop { load, r, rlist } => {
                if !load {
                    // PUSH: numero registri (+LR se r) calcolato prima di decrementare SP.
                    let count = rlist.count_ones() + if r { 1 } else { 0 };
                    let start = self.regs.sp().wrapping_sub(count * 4);
                    let mut address = start;
                    let mut access_cycles = 0;
                    let mut first = true;
                    for i in 0..8 {
                        if (rlist & (1 << i)) != 0 {
                            access_cycles += bus.access_cycles(address, AccessWidth::Word, !first);
                            first = false;
                            bus.write_word(address, self.regs.r[i as usize]);
                            address = address.wrapping_add(4);
                        }
                    }
                    if r {
                        access_cycles += bus.access_cycles(address, AccessWidth::Word, !first);
                        bus.write_word(address, self.regs.lr());
                    }
                    self.regs.r[13] = start;
                    access_cycles
                } else {
                    // POP
                    let mut address = self.regs.sp();
                    let mut access_cycles = 0;
                    let mut first = true;
                    for i in 0..8 {
                        if (rlist & (1 << i)) != 0 {
                            access_cycles += bus.access_cycles(address, AccessWidth::Word, !first);
                            first = false;
                            self.regs.r[i as usize] = bus.read_word(address);
                            address = address.wrapping_add(4);
                        }
                    }
                    if r {
                        access_cycles += bus.access_cycles(address, AccessWidth::Word, !first);
                        let value = bus.read_word(address);
                        self.regs.set_pc(value & !1);
                        address = address.wrapping_add(4);
                    }
                    self.regs.r[13] = address;
                    access_cycles + 1
                }
            }

            ThumbInstruction::LoadStoreMultiple { load, rb, rlist } => {
                let mut address = self.regs.r[rb as usize];
                let mut access_cycles = 0;
                let mut first = true;
                for i in 0..8 {
                    if (rlist & (1 << i)) != 0 {
                        access_cycles += bus.access_cycles(address, AccessWidth::Word, !first);
                        first = false;
                        if load {
                            self.regs.r[i as usize] = bus.read_word(address);
                        } else {
                            bus.write_word(address, self.regs.r[i as usize]);
                        }
                        address = address.wrapping_add(4);
                    }
                }
                self.regs.r[rb as usize] = address;
                if load {
                    access_cycles + 1
                } else {
                    access_cycles
                }
            }

            ThumbInstruction::ConditionalBranch { cond, offset } => {
                let condition = arm::Condition::from_opcode((cond as u32) << 28);
                if condition.check(self.regs.cpsr) {
                    let new_pc = (self.regs.pc() as i32).wrapping_add((offset as i32) * 2) as u32;
                    self.regs.set_pc(new_pc & !1);
                    2
                } else {
                    0
                }
            }

            ThumbInstruction::SoftwareInterrupt { .. } => {
                self.enter_exception(Mode::Supervisor, 0x0000_0008, next_pc, false);
                2
            }

            ThumbInstruction::UnconditionalBranch { offset } => {
                let new_pc = (self.regs.pc() as i32).wrapping_add((offset as i32) * 2) as u32;
                self.regs.set_pc(new_pc & !1);
                2
            }

            ThumbInstruction::LongBranchLink { first_instruction, offset } => {
                // `first_instruction` riflette il bit H grezzo: H=0 è la prima
                // metà (carica l'alto nel LR), H=1 la seconda (salto finale).
                if !first_instruction {
                    let mut ext = offset as i32;
                    if ext & 0x400 != 0 {
                        ext |= !0x7FF;
                    }
                    let target = (self.regs.pc() as i32).wrapping_add(ext << 12) as u32;
                    self.regs.set_lr(target);
                    0
                } else {
                    let target = self.regs.lr().wrapping_add((offset as u32) << 1);
                    self.regs.set_lr(next_pc | 1);
                    self.regs.set_pc(target & !1);
                    2
                }
            }

            ThumbInstruction::Undefined => {
                self.enter_exception(Mode::Undefined, 0x0000_0004, next_pc, false);
                2
            }
        }
    }

    /// Centralizza l'ingresso in una modalità eccezione: salva CPSR in SPSR,
    /// passa a `mode`, imposta LR = `return_addr`, disabilita IRQ (e FIQ se
    /// richiesto), forza ARM state e salta a `vector`.
    fn enter_exception(&mut self, mode: Mode, vector: u32, return_addr: u32, disable_fiq: bool) {
        let old_cpsr = self.regs.cpsr;
        self.regs.change_mode(mode);
        self.regs.set_spsr(old_cpsr);
        self.regs.set_lr(return_addr);
        self.regs.set_irq_disabled(true);
        if disable_fiq {
            self.regs.set_fiq_disabled(true);
        }
        self.regs.set_thumb(false);
        self.regs.set_pc(vector);
    }

    /// Richiedi un interrupt IRQ (invocato dal bus quando la linea IE & IF è
    /// asserita).
    ///
    /// `ime` è il bit master del controller interrupt. Un IRQ pendente
    /// sveglia la CPU da HALT indipendentemente da IME e dal bit I del CPSR
    /// (sull'hardware reale lo stato di halt termina non appena un
    /// interrupt abilitato diventa pendente), ma l'eccezione viene presa
    /// solo se IME=1 e CPSR.I=0.
    pub fn request_interrupt(&mut self, ime: bool) {
        self.halted = false;
        if ime && !self.regs.irq_disabled() {
            self.handle_irq();
        }
    }

    fn handle_irq(&mut self) {
        let return_addr = self.regs.pc().wrapping_add(4);
        self.enter_exception(Mode::IRQ, 0x0000_0018, return_addr, false);
    }
}

impl Default for ARM7TDMI {
    fn default() -> Self {
        Self::new()
    }
}
