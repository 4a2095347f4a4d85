/// Instruction execution handlers, grouped by category.
///
/// Decoding lives in `arm.rs`/`thumb.rs`; these modules turn a decoded
/// instruction into register/bus side effects.
pub mod alu;
pub mod branch;
pub mod load_store;
pub mod multiply;
