// Implementazione istruzioni Load/Store
//
// Queste istruzioni trasferiscono dati tra registri e memoria:
// - LDR: Load Register (memoria → registro)
// - STR: Store Register (registro → memoria)
// - LDM: Load Multiple (memoria → più registri)
// - STM: Store Multiple (più registri → memoria)

use crate::{
    cpu::{AccessWidth, MemoryBus},
    registers::Registers,
};

/// Esegue Single Data Transfer (LDR/STR)
///
/// # Arguments
/// * `regs` - Registri CPU
/// * `bus` - Bus memoria per accesso
/// * `load` - true=LDR, false=STR
/// * `byte` - true=byte, false=word
/// * `pre_index` - Se true, applica offset prima dell'accesso
/// * `add` - Se true, somma offset; se false, sottrai
/// * `writeback` - Se true, scrivi indirizzo finale in Rn
/// * `rn` - Registro base
/// * `rd` - Registro source/dest
/// * `offset` - Offset da applicare
///
/// # Returns
/// Cicli extra oltre al fetch dell'opcode: il costo in wait state
/// dell'accesso dati (via `MemoryBus::access_cycles`, Non-sequential: è un
/// nuovo accesso, non la continuazione del burst di fetch) più 1 ciclo
/// interno per il load (scrittura nel registro destinazione).
pub fn execute_single_data_transfer(
    regs: &mut Registers,
    bus: &mut dyn MemoryBus,
    load: bool,
    byte: bool,
    pre_index: bool,
    add: bool,
    writeback: bool,
    rn: u8,
    rd: u8,
    offset: u32,
) -> u32 {
    let base = regs.r[rn as usize];

    // Calcola offset (può essere signed)
    let offset_val = if add { offset as i32 } else { -(offset as i32) };

    // Calcola indirizzo
    let address = if pre_index {
        // Pre-indexed: usa (base + offset)
        (base as i32).wrapping_add(offset_val) as u32
    } else {
        // Post-indexed: usa base, poi applica offset
        base
    };

    let width = if byte { AccessWidth::Byte } else { AccessWidth::Word };

    // Esegui load o store
    let access_cycles = if load {
        // LDR: carica da memoria
        let cost = bus.access_cycles(address, width, false);
        let value = if byte {
            bus.read_byte(address) as u32
        } else {
            bus.read_word(address & !3) // Word allineato
        };

        if rd == 15 {
            // Load in PC
            regs.set_pc(value & !3);
        } else {
            regs.r[rd as usize] = value;
        }
        cost
    } else {
        // STR: salva in memoria. regs.pc() qui è già la vista pipeline
        // (indirizzo dell'istruzione + 8); R15 letto da STR vale +12.
        let value = if rd == 15 {
            regs.pc() + 4
        } else {
            regs.r[rd as usize]
        };

        let cost = bus.access_cycles(address, width, false);
        if byte {
            bus.write_byte(address, value as u8);
        } else {
            bus.write_word(address & !3, value); // Word allineato
        }
        cost
    };

    // Writeback: aggiorna registro base
    if writeback || !pre_index {
        let final_address = (base as i32).wrapping_add(offset_val) as u32;
        if rn != 15 {
            regs.r[rn as usize] = final_address;
        }
    }

    // 1 ciclo interno in più per il load (scrittura del registro)
    if load {
        access_cycles + 1
    } else {
        access_cycles
    }
}

/// Esegue Block Data Transfer (LDM/STM)
///
/// Carica o salva multipli registri in un'operazione.
///
/// # Arguments
/// * `regs` - Registri CPU
/// * `bus` - Bus memoria
/// * `load` - true=LDM, false=STM
/// * `pre_index` - Se true, incrementa prima dell'accesso
/// * `add` - Se true, incrementa; se false, decrementa
/// * `writeback` - Se true, aggiorna Rn con indirizzo finale
/// * `rn` - Registro base
/// * `register_list` - Bitmask registri da trasferire (bit 0=R0, bit 15=R15)
///
/// # Returns
/// Cicli extra oltre al fetch dell'opcode: somma dei costi in wait state di
/// ogni accesso (il primo Non-sequential, gli altri Sequential — stesso
/// burst incrementale/decrementale), più 1 ciclo interno per il load.
#[allow(clippy::too_many_arguments)]
pub fn execute_block_data_transfer(
    regs: &mut Registers,
    bus: &mut dyn MemoryBus,
    load: bool,
    pre_index: bool,
    add: bool,
    writeback: bool,
    s_bit: bool,
    rn: u8,
    register_list: u16,
) -> u32 {
    let mut address = regs.r[rn as usize];
    let count = if register_list == 0 { 16 } else { register_list.count_ones() };
    let pc_in_list = (register_list & (1 << 15)) != 0;

    // Calcola indirizzo iniziale per decremento
    if !add {
        address = address.wrapping_sub(count * 4);
    }

    let mut cycles = 0;
    let mut first_access = true;

    // Trasferisci ogni registro nella lista
    for i in 0..16 {
        if (register_list & (1 << i)) != 0 {
            // Pre-increment se richiesto
            if pre_index {
                address = if add {
                    address.wrapping_add(4)
                } else {
                    address.wrapping_sub(4)
                };
            }

            // Solo il primo accesso del burst è Non-sequential; gli altri
            // proseguono lo stesso burst incrementale/decrementale.
            cycles += bus.access_cycles(address, AccessWidth::Word, !first_access);
            first_access = false;

            // Esegui load/store
            if load {
                let value = bus.read_word(address);
                if i == 15 {
                    regs.set_pc(value & !3);
                } else {
                    regs.r[i] = value;
                }
            } else {
                let value = if i == 15 { regs.pc() + 4 } else { regs.r[i] };
                bus.write_word(address, value);
            }

            // Post-increment se non pre
            if !pre_index {
                address = if add {
                    address.wrapping_add(4)
                } else {
                    address.wrapping_sub(4)
                };
            }
        }
    }

    // Writeback
    if writeback {
        let final_address = if add {
            regs.r[rn as usize].wrapping_add(count * 4)
        } else {
            regs.r[rn as usize].wrapping_sub(count * 4)
        };
        regs.r[rn as usize] = final_address;
    }

    // LDM with the S-bit and R15 in the list restores CPSR from the current
    // mode's SPSR (exception-return form, e.g. `LDMFD SP!, {R0-R12,PC}^`).
    if load && s_bit && pc_in_list {
        let spsr = regs.spsr();
        regs.change_mode(
            crate::registers::Mode::from_bits(spsr).unwrap_or(regs.mode),
        );
        regs.cpsr = spsr;
    }

    // 1 ciclo interno in più per il load (scrittura dell'ultimo registro)
    if load {
        cycles + 1
    } else {
        cycles
    }
}

/// Esegue Halfword and Signed Data Transfer (LDRH/STRH/LDRSB/LDRSH)
///
/// `signed`/`halfword` codificano il campo SH: (0,1)=LDRH/STRH unsigned,
/// (1,0)=LDRSB, (1,1)=LDRSH. SH=(0,0) non arriva qui (decodificato come SWP).
#[allow(clippy::too_many_arguments)]
pub fn execute_halfword_transfer(
    regs: &mut Registers,
    bus: &mut dyn MemoryBus,
    load: bool,
    pre_index: bool,
    add: bool,
    writeback: bool,
    signed: bool,
    halfword: bool,
    rn: u8,
    rd: u8,
    offset: u32,
) -> u32 {
    let base = regs.r[rn as usize];
    let offset_val = if add { offset as i32 } else { -(offset as i32) };

    let address = if pre_index {
        (base as i32).wrapping_add(offset_val) as u32
    } else {
        base
    };

    let width = if halfword { AccessWidth::Half } else { AccessWidth::Byte };
    let access_cycles = bus.access_cycles(address, width, false);

    if load {
        let value = match (signed, halfword) {
            (false, true) => bus.read_halfword(address & !1) as u32,
            (true, false) => (bus.read_byte(address) as i8) as i32 as u32,
            (true, true) => (bus.read_halfword(address & !1) as i16) as i32 as u32,
            (false, false) => bus.read_byte(address) as u32,
        };
        if rd == 15 {
            regs.set_pc(value & !1);
        } else {
            regs.r[rd as usize] = value;
        }
    } else {
        let value = if rd == 15 { regs.pc() } else { regs.r[rd as usize] };
        bus.write_halfword(address & !1, value as u16);
    }

    if writeback || !pre_index {
        let final_address = (base as i32).wrapping_add(offset_val) as u32;
        if rn != 15 {
            regs.r[rn as usize] = final_address;
        }
    }

    if load {
        access_cycles + 1
    } else {
        access_cycles
    }
}
