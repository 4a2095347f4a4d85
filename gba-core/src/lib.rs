pub mod apu;
mod apu_impl;
pub mod bios;
mod bios_impl;
#[cfg(test)]
mod bios_tests;
pub mod bus;
pub mod cartridge;
pub mod dma;
mod dma_impl;
#[cfg(test)]
mod dma_tests;
pub mod emulator;
pub mod input;
pub mod interrupt;
pub mod memory;
pub mod ppu;
mod ppu_impl;
pub mod runloop;
pub mod save;
mod save_impl;
#[cfg(test)]
mod save_tests;
pub mod savestate;
pub mod scheduler;
pub mod timer;
mod timer_impl;
#[cfg(test)]
mod timer_tests;

pub use bus::Bus;
pub use cartridge::Cartridge;
pub use emulator::GbaEmulator;
pub use input::InputController;
pub use runloop::{Command, CommandQueue, RunConfig, RunLoop, RunState};
pub use savestate::{SaveState, SaveStateError};
