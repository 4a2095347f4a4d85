// Implementazione istruzioni ALU (Arithmetic Logic Unit)
//
// Queste sono le istruzioni di base per operazioni matematiche e logiche:
// - ADD, SUB: Addizione e sottrazione
// - AND, OR, EOR: Operazioni logiche
// - MOV, MVN: Spostamento dati
// - CMP, TST: Confronti e test (solo flag, no write)

use crate::arm::data_processing;
use crate::registers::Registers;

/// Esegue un'istruzione Data Processing (ALU)
///
/// # Arguments
/// * `regs` - Registri CPU
/// * `opcode` - Tipo operazione (AND, EOR, SUB, etc.)
/// * `rd` - Registro destinazione
/// * `rn` - Primo operando (registro)
/// * `operand2` - Secondo operando (già calcolato con eventuali shift)
/// * `set_flags` - Se true, aggiorna i flag NZCV
/// * `carry` - Carry da barrel shifter per operazioni logiche
///
/// # Returns
/// Cicli extra oltre al fetch dell'opcode (0: nessuna istruzione ALU tocca
/// il bus dati, il fetch è già contato da `execute_arm`/`execute_thumb`)
pub fn execute_data_processing(
    regs: &mut Registers,
    opcode: u8,
    rd: u8,
    rn: u8,
    operand2: u32,
    set_flags: bool,
    carry: bool,
) -> u32 {
    let rn_value = if rn == 15 {
        regs.pc()
    } else {
        regs.r[rn as usize]
    };

    let (result, new_carry, new_overflow) = match opcode {
        // AND: Rd = Rn AND Op2
        data_processing::AND => {
            let res = rn_value & operand2;
            (Some(res), carry, false)
        }

        // EOR: Rd = Rn XOR Op2
        data_processing::EOR => {
            let res = rn_value ^ operand2;
            (Some(res), carry, false)
        }

        // SUB: Rd = Rn - Op2
        data_processing::SUB => {
            let (res, overflow) = sub_with_flags(rn_value, operand2, false);
            (Some(res), rn_value >= operand2, overflow)
        }

        // RSB: Rd = Op2 - Rn
        data_processing::RSB => {
            let (res, overflow) = sub_with_flags(operand2, rn_value, false);
            (Some(res), operand2 >= rn_value, overflow)
        }

        // ADD: Rd = Rn + Op2
        data_processing::ADD => {
            let (res, overflow) = add_with_flags(rn_value, operand2, false);
            (
                Some(res),
                (res as u64) != ((rn_value as u64) + (operand2 as u64)),
                overflow,
            )
        }

        // ADC: Rd = Rn + Op2 + Carry
        data_processing::ADC => {
            let c = if regs.flag_c() { 1 } else { 0 };
            let (res, overflow) = add_with_flags(rn_value, operand2, regs.flag_c());
            let carry_out = ((rn_value as u64) + (operand2 as u64) + c) > 0xFFFF_FFFF;
            (Some(res), carry_out, overflow)
        }

        // SBC: Rd = Rn - Op2 + Carry - 1
        data_processing::SBC => {
            let c = if regs.flag_c() { 0 } else { 1 };
            let (res, overflow) = sub_with_flags(rn_value, operand2, !regs.flag_c());
            let carry_out = (rn_value as u64) >= ((operand2 as u64) + c);
            (Some(res), carry_out, overflow)
        }

        // RSC: Rd = Op2 - Rn + Carry - 1
        data_processing::RSC => {
            let c = if regs.flag_c() { 0 } else { 1 };
            let (res, overflow) = sub_with_flags(operand2, rn_value, !regs.flag_c());
            let carry_out = (operand2 as u64) >= ((rn_value as u64) + c);
            (Some(res), carry_out, overflow)
        }

        // TST: Flags = Rn AND Op2 (no write)
        data_processing::TST => {
            let res = rn_value & operand2;
            if set_flags {
                update_logic_flags(regs, res, carry);
            }
            (None, carry, false)
        }

        // TEQ: Flags = Rn XOR Op2 (no write)
        data_processing::TEQ => {
            let res = rn_value ^ operand2;
            if set_flags {
                update_logic_flags(regs, res, carry);
            }
            (None, carry, false)
        }

        // CMP: Flags = Rn - Op2 (no write)
        data_processing::CMP => {
            let (res, overflow) = sub_with_flags(rn_value, operand2, false);
            if set_flags {
                update_arithmetic_flags(regs, res, rn_value >= operand2, overflow);
            }
            (None, rn_value >= operand2, overflow)
        }

        // CMN: Flags = Rn + Op2 (no write)
        data_processing::CMN => {
            let (res, overflow) = add_with_flags(rn_value, operand2, false);
            if set_flags {
                let carry_out = ((rn_value as u64) + (operand2 as u64)) > 0xFFFF_FFFF;
                update_arithmetic_flags(regs, res, carry_out, overflow);
            }
            (None, false, overflow)
        }

        // ORR: Rd = Rn OR Op2
        data_processing::ORR => {
            let res = rn_value | operand2;
            (Some(res), carry, false)
        }

        // MOV: Rd = Op2
        data_processing::MOV => (Some(operand2), carry, false),

        // BIC: Rd = Rn AND NOT Op2
        data_processing::BIC => {
            let res = rn_value & !operand2;
            (Some(res), carry, false)
        }

        // MVN: Rd = NOT Op2
        data_processing::MVN => {
            let res = !operand2;
            (Some(res), carry, false)
        }

        _ => (None, false, false),
    };

    // Scrivi risultato nel registro destinazione (se presente)
    if let Some(value) = result {
        if rd == 15 {
            // Scrittura in PC
            regs.set_pc(value & !3); // Allinea a 4 byte

            // `MOVS PC, LR` / `SUBS PC, LR, #imm` style returns (rd==15 with
            // the S bit set) are the exception-return idiom, not a normal
            // flag update: CPSR is restored wholesale from the current
            // mode's SPSR and registers re-bank accordingly, the same as
            // LDM^'s PC-in-list-with-S-bit case in `load_store.rs`.
            if set_flags {
                let spsr = regs.spsr();
                regs.change_mode(
                    crate::registers::Mode::from_bits(spsr).unwrap_or(regs.mode),
                );
                regs.cpsr = spsr;
            }
        } else {
            regs.r[rd as usize] = value;

            // Aggiorna flag se richiesto
            if set_flags {
                if is_logic_operation(opcode) {
                    update_logic_flags(regs, value, new_carry);
                } else {
                    update_arithmetic_flags(regs, value, new_carry, new_overflow);
                }
            }
        }
    }

    0 // Nessun accesso bus: solo il fetch dell'opcode, già contato a parte
}

/// Addizione con rilevamento overflow
fn add_with_flags(a: u32, b: u32, carry: bool) -> (u32, bool) {
    let c = if carry { 1 } else { 0 };
    let result = a.wrapping_add(b).wrapping_add(c);

    // Overflow: segni uguali ma risultato con segno diverso
    let overflow = ((a ^ result) & (b ^ result) & 0x8000_0000) != 0;

    (result, overflow)
}

/// Sottrazione con rilevamento overflow
fn sub_with_flags(a: u32, b: u32, carry: bool) -> (u32, bool) {
    let c = if carry { 0 } else { 1 };
    let result = a.wrapping_sub(b).wrapping_sub(c);

    // Overflow: segni diversi e risultato con segno diverso da 'a'
    let overflow = ((a ^ b) & (a ^ result) & 0x8000_0000) != 0;

    (result, overflow)
}

/// Verifica se l'operazione è logica (usa carry da shifter)
fn is_logic_operation(opcode: u8) -> bool {
    matches!(
        opcode,
        data_processing::AND
            | data_processing::EOR
            | data_processing::ORR
            | data_processing::MOV
            | data_processing::BIC
            | data_processing::MVN
    )
}

/// Aggiorna flag per operazioni logiche (AND, OR, EOR, MOV, etc.)
fn update_logic_flags(regs: &mut Registers, result: u32, carry: bool) {
    regs.set_flag_n((result & 0x8000_0000) != 0);
    regs.set_flag_z(result == 0);
    regs.set_flag_c(carry);
    // V non viene toccato dalle operazioni logiche
}

/// Aggiorna flag per operazioni aritmetiche (ADD, SUB, etc.)
fn update_arithmetic_flags(regs: &mut Registers, result: u32, carry: bool, overflow: bool) {
    regs.set_flag_n((result & 0x8000_0000) != 0);
    regs.set_flag_z(result == 0);
    regs.set_flag_c(carry);
    regs.set_flag_v(overflow);
}

/// Decodifica e calcola Operand2 con barrel shifter
///
/// Operand2 può essere:
/// - Immediate: valore immediato ruotato
/// - Register: registro con shift opzionale
///
/// # Returns
/// (valore, carry_out)
pub fn decode_operand2(operand2: u32, immediate: bool, regs: &Registers) -> (u32, bool) {
    if immediate {
        // Immediate: [11:8]=rotate, [7:0]=imm
        let imm = operand2 & 0xFF;
        let rotate = ((operand2 >> 8) & 0xF) * 2;
        if rotate == 0 {
            (imm, regs.flag_c())
        } else {
            let value = imm.rotate_right(rotate);
            (value, (value & 0x8000_0000) != 0)
        }
    } else {
        // Register: [11:4]=shift, [3:0]=Rm
        let rm = (operand2 & 0xF) as u8;
        let shift_type = (operand2 >> 5) & 0x3;
        let rm_value = if rm == 15 { regs.pc() } else { regs.r[rm as usize] };

        if (operand2 & (1 << 4)) != 0 {
            // Shift by register: low byte of Rs gives the amount, full 0..255 range
            let rs = ((operand2 >> 8) & 0xF) as u8;
            let amount = regs.r[rs as usize] & 0xFF;
            barrel_shift_register(rm_value, shift_type, amount, regs.flag_c())
        } else {
            // Shift by immediate: 5-bit field, 0 is special-cased per shift type
            let amount = (operand2 >> 7) & 0x1F;
            barrel_shift_immediate(rm_value, shift_type, amount, regs.flag_c())
        }
    }
}

/// Barrel shifter for the immediate-shift-amount encoding.
///
/// A zero amount field is not "shift by zero": LSR/ASR with amount 0 mean
/// shift by 32, and ROR with amount 0 means RRX (rotate right through carry
/// by one bit). LSL with amount 0 is the only case that is a true no-op.
fn barrel_shift_immediate(value: u32, shift_type: u32, amount: u32, carry_in: bool) -> (u32, bool) {
    match shift_type {
        0 => shift_lsl(value, amount, carry_in),
        1 => {
            if amount == 0 {
                (0, (value & 0x8000_0000) != 0)
            } else {
                shift_lsr(value, amount)
            }
        }
        2 => {
            if amount == 0 {
                shift_asr(value, 32)
            } else {
                shift_asr(value, amount)
            }
        }
        3 => {
            if amount == 0 {
                // RRX
                let carry_in_bit = if carry_in { 0x8000_0000 } else { 0 };
                ((value >> 1) | carry_in_bit, (value & 1) != 0)
            } else {
                shift_ror(value, amount)
            }
        }
        _ => unreachable!(),
    }
}

/// Public entry point for the immediate-shift-amount barrel shifter, reused
/// by Thumb Format 1 (MoveShiftedRegister) and by the ARM register-offset
/// load/store addressing resolver.
pub fn shift_by_type(value: u32, shift_type: u32, amount: u32, carry_in: bool) -> (u32, bool) {
    barrel_shift_immediate(value, shift_type, amount, carry_in)
}

/// Public entry point for the register-specified-shift-amount barrel
/// shifter, reused by Thumb Format 4 (LSL/LSR/ASR/ROR with a register
/// amount).
pub fn shift_by_register_amount(value: u32, shift_type: u32, amount: u32, carry_in: bool) -> (u32, bool) {
    barrel_shift_register(value, shift_type, amount, carry_in)
}

/// Barrel shifter for the register-specified-shift-amount encoding (0..255).
fn barrel_shift_register(value: u32, shift_type: u32, amount: u32, carry_in: bool) -> (u32, bool) {
    if amount == 0 {
        return (value, carry_in);
    }
    match shift_type {
        0 => shift_lsl(value, amount, carry_in),
        1 => shift_lsr(value, amount),
        2 => shift_asr(value, amount),
        3 => shift_ror(value, amount),
        _ => unreachable!(),
    }
}

fn shift_lsl(value: u32, amount: u32, carry_in: bool) -> (u32, bool) {
    match amount {
        0 => (value, carry_in),
        1..=31 => (value << amount, (value & (1 << (32 - amount))) != 0),
        32 => (0, (value & 1) != 0),
        _ => (0, false),
    }
}

fn shift_lsr(value: u32, amount: u32) -> (u32, bool) {
    match amount {
        1..=31 => (value >> amount, (value & (1 << (amount - 1))) != 0),
        32 => (0, (value & 0x8000_0000) != 0),
        _ => (0, false),
    }
}

fn shift_asr(value: u32, amount: u32) -> (u32, bool) {
    if amount < 32 {
        (
            ((value as i32) >> amount) as u32,
            (value & (1 << (amount - 1))) != 0,
        )
    } else {
        let sign = (value & 0x8000_0000) != 0;
        (if sign { 0xFFFF_FFFF } else { 0 }, sign)
    }
}

fn shift_ror(value: u32, amount: u32) -> (u32, bool) {
    let amt = amount & 0x1F;
    if amt == 0 {
        (value, (value & 0x8000_0000) != 0)
    } else {
        (value.rotate_right(amt), (value & (1 << (amt - 1))) != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lsl_immediate_zero_is_noop() {
        assert_eq!(barrel_shift_immediate(0x1234, 0, 0, true), (0x1234, true));
        assert_eq!(barrel_shift_immediate(0x1234, 0, 0, false), (0x1234, false));
    }

    #[test]
    fn lsr_immediate_zero_means_shift_by_32() {
        assert_eq!(barrel_shift_immediate(0x8000_0000, 1, 0, false), (0, true));
        assert_eq!(barrel_shift_immediate(0x0000_0001, 1, 0, false), (0, false));
    }

    #[test]
    fn asr_immediate_zero_means_shift_by_32() {
        assert_eq!(barrel_shift_immediate(0x8000_0000, 2, 0, false), (0xFFFF_FFFF, true));
        assert_eq!(barrel_shift_immediate(0x0000_0001, 2, 0, false), (0, false));
    }

    #[test]
    fn ror_immediate_zero_is_rrx() {
        let (value, carry) = barrel_shift_immediate(0x0000_0001, 3, 0, true);
        assert_eq!(value, 0x8000_0000);
        assert!(carry);
    }

    #[test]
    fn register_shift_amount_32_and_beyond() {
        assert_eq!(barrel_shift_register(0x8000_0001, 0, 32, false), (0, true));
        assert_eq!(barrel_shift_register(0x8000_0001, 0, 33, false), (0, false));
        assert_eq!(barrel_shift_register(0x8000_0000, 1, 32, false), (0, true));
        assert_eq!(
            barrel_shift_register(0x8000_0000, 2, 40, false),
            (0xFFFF_FFFF, true)
        );
    }

    #[test]
    fn register_shift_amount_zero_keeps_carry() {
        assert_eq!(barrel_shift_register(0x1234, 3, 0, true), (0x1234, true));
    }

    #[test]
    fn movs_pc_lr_restores_cpsr_from_spsr() {
        use crate::registers::Mode;

        let mut regs = Registers::new();
        regs.change_mode(Mode::IRQ);
        // SPSR_irq holds what CPSR was before the exception: back in User
        // mode, Thumb cleared, Z flag set.
        let saved_cpsr = (Mode::User as u32) | (1 << 30);
        regs.set_spsr(saved_cpsr);
        regs.r[14] = 0x0800_1234; // LR_irq, return address

        // `MOVS PC, LR`
        execute_data_processing(&mut regs, data_processing::MOV, 15, 0, regs.r[14], true, false);

        assert_eq!(regs.pc(), 0x0800_1234);
        assert_eq!(regs.mode, Mode::User);
        assert_eq!(regs.cpsr, saved_cpsr);
    }

    #[test]
    fn mov_pc_without_s_bit_does_not_touch_cpsr() {
        let mut regs = Registers::new();
        let cpsr_before = regs.cpsr;
        execute_data_processing(&mut regs, data_processing::MOV, 15, 0, 0x0800_0100, false, false);
        assert_eq!(regs.pc(), 0x0800_0100);
        assert_eq!(regs.cpsr, cpsr_before);
    }
}
