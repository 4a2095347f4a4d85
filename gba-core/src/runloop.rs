/// Run loop: coda comandi dal front-end + pacing dei frame.
///
/// Il front-end (qualunque sia: SDL2, web, headless) gira su un thread
/// separato da quello di emulazione e comunica solo tramite `Command`,
/// spinto in una `CommandQueue` condivisa. `RunLoop::tick()` drena la coda,
/// esegue un frame se in esecuzione, poi mette in pausa il thread quanto
/// basta a rispettare il framerate nativo del GBA (o nessuna pausa, se in
/// modalità turbo).
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;

use crate::cartridge::{Cartridge, CartridgeError};
use crate::emulator::GbaEmulator;
use crate::input::GbaKey;
use crate::save::SaveType;
use crate::savestate::SaveStateError;

/// Frequenza di refresh nativa del GBA: 16,777,216 Hz / 280,896 cicli/frame.
const NATIVE_FPS: f64 = 59.737_410_34;

/// Stato del registro real-time clock (chip S-3511/3516 su alcune
/// cartucce). Il core lo conserva così com'è passato dal comando `Rtc`;
/// la lettura/scrittura via GPIO della cartridge non è nel perimetro di
/// questa emulazione (nessuna ROM nel set di test la richiede).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RtcState {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub day_of_week: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Comandi che il front-end può accodare per il thread di emulazione.
///
/// Ogni comando è dati puri: nessun callback, nessun puntatore grezzo.
/// Il rilascio delle risorse (payload `Vec<u8>`) avviene con un normale
/// `Drop` quando il comando viene consumato da `RunLoop::execute`.
#[derive(Debug, Clone)]
pub enum Command {
    Exit,
    LoadBios(Vec<u8>),
    LoadRom(Vec<u8>),
    LoadBackup(Vec<u8>),
    BackupType(SaveType),
    Reset,
    Run(f32),
    Pause,
    KeyInput(GbaKey, bool),
    /// Solo il path: il run loop produce/consuma i byte tramite
    /// `GbaEmulator::save_state`/`load_state` e li passa a `StateIo`, così
    /// il core non tocca mai direttamente un file handle.
    Quicksave(PathBuf),
    Quickload(PathBuf),
    AudioResampleFreq(u32),
    ColorCorrection(bool),
    Rtc(RtcState),
}

/// Coda comandi FIFO dietro un `parking_lot::Mutex`, condivisibile tra il
/// thread del front-end (che spinge) e quello di emulazione (che drena).
#[derive(Default)]
pub struct CommandQueue {
    inner: Mutex<VecDeque<Command>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    /// Accoda un comando, da chiamare dal thread del front-end.
    pub fn push(&self, command: Command) {
        self.inner.lock().push_back(command);
    }

    /// Svuota la coda in ordine FIFO, da chiamare una volta per
    /// `RunLoop::tick()` dal thread di emulazione.
    fn drain(&self) -> Vec<Command> {
        self.inner.lock().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Stato di esecuzione del run loop, guidato da `Command::Run`/`Command::Pause`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Paused,
    Running,
}

/// Configurazione runtime non legata all'hardware GBA in sé (frequenza di
/// resample audio, correzione colore per schermi non-GBA).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    pub audio_resample_freq: u32,
    pub color_correction: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            audio_resample_freq: 32_768,
            color_correction: false,
        }
    }
}

/// Confine di I/O file che il front-end implementa: il core produce e
/// consuma buffer di byte (stato salvato, backup) ma non apre mai un file
/// handle lui stesso.
pub trait StateIo {
    fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()>;
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("invalid ROM: {0}")]
    InvalidRom(#[from] CartridgeError),

    #[error("cannot change backup type after the emulator has started running")]
    BackupTypeAfterStart,

    #[error("cannot set the RTC after the emulator has started running")]
    RtcAfterStart,

    #[error("quicksave failed: {0}")]
    SaveState(#[from] SaveStateError),

    #[error("state I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coordina l'emulatore, la coda comandi e il pacing dei frame.
///
/// `S: StateIo` è il confine verso il front-end per quicksave/quickload;
/// passare un front-end diverso significa solo fornire un'implementazione
/// diversa di `StateIo`, nessun'altra modifica a `RunLoop`.
pub struct RunLoop<S: StateIo> {
    pub emulator: GbaEmulator,
    pub queue: std::sync::Arc<CommandQueue>,
    pub config: RunConfig,
    pub rtc: Option<RtcState>,
    state: RunState,
    speed: f32,
    state_io: S,
    last_tick: Instant,
    debt: Duration,
    exit_requested: bool,
}

impl<S: StateIo> RunLoop<S> {
    pub fn new(emulator: GbaEmulator, queue: std::sync::Arc<CommandQueue>, state_io: S) -> Self {
        Self {
            emulator,
            queue,
            config: RunConfig::default(),
            rtc: None,
            state: RunState::Paused,
            speed: 1.0,
            state_io,
            last_tick: Instant::now(),
            debt: Duration::ZERO,
            exit_requested: false,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Esegue una singola iterazione: drena i comandi pendenti, avanza un
    /// frame se in esecuzione, poi mette in pausa il thread per rispettare
    /// il framerate richiesto. Ritorna gli errori dei comandi falliti
    /// (il front-end decide come sorvegliarli: log, toast, ecc.).
    pub fn tick(&mut self) -> Vec<CommandError> {
        let mut errors = Vec::new();
        for command in self.queue.drain() {
            if let Err(err) = self.execute(command) {
                errors.push(err);
            }
        }

        if self.state == RunState::Running {
            self.emulator.run_frame();
        }

        self.pace();
        errors
    }

    /// Esegue `tick()` in loop finché non arriva `Command::Exit`.
    pub fn run(&mut self) {
        while !self.exit_requested {
            let errors = self.tick();
            for err in errors {
                log::warn!("run loop: comando fallito: {err}");
            }
        }
    }

    fn execute(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::Exit => {
                self.exit_requested = true;
            }
            Command::LoadBios(bios) => {
                self.emulator
                    .load_bios(bios)
                    .map_err(CommandError::InvalidRom)?;
            }
            Command::LoadRom(rom) => {
                let cartridge = Cartridge::from_bytes(rom)?;
                self.emulator.load_cartridge(cartridge);
                self.emulator.reset();
            }
            Command::LoadBackup(data) => {
                self.emulator.bus.save.load_from_bytes(data);
            }
            Command::BackupType(save_type) => {
                if self.emulator.started {
                    return Err(CommandError::BackupTypeAfterStart);
                }
                self.emulator.bus.save.force_save_type(save_type);
            }
            Command::Reset => {
                self.emulator.reset();
            }
            Command::Run(speed) => {
                self.state = RunState::Running;
                self.speed = speed;
            }
            Command::Pause => {
                self.state = RunState::Paused;
            }
            Command::KeyInput(key, pressed) => {
                self.emulator.input_mut().set_key(key, pressed);
            }
            Command::Quicksave(path) => {
                let bytes = self.emulator.save_state()?;
                self.state_io.write(&path, &bytes)?;
            }
            Command::Quickload(path) => {
                let bytes = self.state_io.read(&path)?;
                self.emulator.load_state(&bytes)?;
            }
            Command::AudioResampleFreq(freq) => {
                self.config.audio_resample_freq = freq;
            }
            Command::ColorCorrection(enabled) => {
                self.config.color_correction = enabled;
            }
            Command::Rtc(state) => {
                if self.emulator.started {
                    return Err(CommandError::RtcAfterStart);
                }
                self.rtc = Some(state);
            }
        }
        Ok(())
    }

    /// Dorme quanto basta a compensare lo scarto tra il tempo reale
    /// trascorso e il periodo di frame nativo, con un debito accumulato e
    /// limitato (non recupera all'infinito dopo una pausa lunga).
    /// `speed == 0.0` significa "turbo": nessuna pausa.
    fn pace(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;

        if self.speed == 0.0 {
            self.debt = Duration::ZERO;
            return;
        }

        let frame_period = Duration::from_secs_f64(1.0 / NATIVE_FPS / self.speed as f64);
        self.debt = self.debt.saturating_add(frame_period.saturating_sub(elapsed));

        let cap = frame_period * 4;
        if self.debt > cap {
            self.debt = cap;
        }

        if !self.debt.is_zero() {
            std::thread::sleep(self.debt);
            self.debt = Duration::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemStateIo {
        files: RefCell<HashMap<PathBuf, Vec<u8>>>,
    }

    impl StateIo for MemStateIo {
        fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), bytes.to_vec());
            Ok(())
        }

        fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
            self.files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
        }
    }

    fn test_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 0x200];
        rom[0xA0..0xAC].copy_from_slice(b"TEST GAME   ");
        rom[0xAC..0xB0].copy_from_slice(b"TEST");
        rom
    }

    #[test]
    fn run_command_starts_emulation() {
        let queue = std::sync::Arc::new(CommandQueue::new());
        let mut run_loop = RunLoop::new(GbaEmulator::new(), queue.clone(), MemStateIo::default());

        queue.push(Command::LoadRom(test_rom()));
        queue.push(Command::Run(1.0));

        run_loop.speed = 0.0; // avoid sleeping in the test
        let errors = run_loop.tick();
        assert!(errors.is_empty());
        assert_eq!(run_loop.state(), RunState::Running);
        assert!(run_loop.emulator.started);
    }

    #[test]
    fn pause_stops_frame_advance() {
        let queue = std::sync::Arc::new(CommandQueue::new());
        let mut run_loop = RunLoop::new(GbaEmulator::new(), queue.clone(), MemStateIo::default());
        run_loop.speed = 0.0;

        queue.push(Command::LoadRom(test_rom()));
        queue.push(Command::Run(1.0));
        run_loop.tick();
        assert!(run_loop.emulator.started);

        queue.push(Command::Pause);
        run_loop.tick();
        assert_eq!(run_loop.state(), RunState::Paused);
    }

    #[test]
    fn backup_type_rejected_after_start() {
        let queue = std::sync::Arc::new(CommandQueue::new());
        let mut run_loop = RunLoop::new(GbaEmulator::new(), queue.clone(), MemStateIo::default());
        run_loop.speed = 0.0;

        queue.push(Command::LoadRom(test_rom()));
        queue.push(Command::Run(1.0));
        run_loop.tick();

        queue.push(Command::BackupType(SaveType::Sram));
        let errors = run_loop.tick();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], CommandError::BackupTypeAfterStart));
    }

    #[test]
    fn quicksave_then_quickload_round_trips() {
        let queue = std::sync::Arc::new(CommandQueue::new());
        let mut run_loop = RunLoop::new(GbaEmulator::new(), queue.clone(), MemStateIo::default());
        run_loop.speed = 0.0;

        queue.push(Command::LoadRom(test_rom()));
        run_loop.tick();

        let path = PathBuf::from("slot0.sav");
        queue.push(Command::Quicksave(path.clone()));
        let errors = run_loop.tick();
        assert!(errors.is_empty());

        queue.push(Command::Quickload(path));
        let errors = run_loop.tick();
        assert!(errors.is_empty());
    }

    #[test]
    fn exit_command_stops_run_loop() {
        let queue = std::sync::Arc::new(CommandQueue::new());
        let mut run_loop = RunLoop::new(GbaEmulator::new(), queue.clone(), MemStateIo::default());
        run_loop.speed = 0.0;

        queue.push(Command::Exit);
        run_loop.run();
        assert!(run_loop.exit_requested);
    }
}
