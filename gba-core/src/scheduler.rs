//! Scheduler a eventi: un min-heap di callback taggate con un momento di
//! attivazione espresso in cicli CPU assoluti.
//!
//! Il resto del sistema (timer, DMA, APU) può registrare un evento invece di
//! essere interrogato ad ogni ciclo; il run loop pompa lo scheduler con
//! `pop_due` dopo ogni step CPU.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use serde::{Deserialize, Serialize};

/// Categorie di eventi pianificabili. I timer/DMA/APU si riferiscono al
/// canale tramite l'indice portato nel payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    HBlank,
    VBlank,
    EndOfLine,
    TimerOverflow(u8),
    DmaActivate(u8),
    ApuLength,
    ApuEnvelope,
    ApuSweep,
    ApuSample,
    IrqPoll,
}

/// Handle opaco restituito da `add_event`, usato per cancellare l'evento
/// prima che scada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct ScheduledEvent {
    trigger_cycle: u64,
    seq: u64,
    kind: EventKind,
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.trigger_cycle, self.seq).cmp(&(other.trigger_cycle, other.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Coda di eventi ordinata per ciclo di attivazione crescente (min-heap via
/// `Reverse`), con cancellazione lazy tramite un insieme di sequence number
/// annullati.
#[derive(Serialize, Deserialize)]
pub struct Scheduler {
    heap: BinaryHeap<Reverse<ScheduledEvent>>,
    cancelled: HashSet<u64>,
    cycles: u64,
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            cancelled: HashSet::new(),
            cycles: 0,
            seq: 0,
        }
    }

    /// Cicli assoluti trascorsi dall'ultimo reset/rebase.
    pub fn current_cycle(&self) -> u64 {
        self.cycles
    }

    /// Registra un evento che scatterà tra `delay` cicli da adesso.
    ///
    /// Un handler che si ri-pianifica con un ritardo <= 0 verrebbe
    /// riaccodato nel passato: per evitare loop infiniti il momento di
    /// attivazione viene forzato ad almeno `current_cycle + 1`.
    pub fn add_event(&mut self, delay: u64, kind: EventKind) -> EventHandle {
        let seq = self.seq;
        self.seq += 1;

        let requested = self.cycles.saturating_add(delay);
        let trigger_cycle = requested.max(self.cycles + 1);
        if trigger_cycle != requested {
            log::warn!(
                "scheduler: evento {:?} ripianificato nel passato (richiesto {}, applicato {})",
                kind,
                requested,
                trigger_cycle
            );
        }

        self.heap.push(Reverse(ScheduledEvent {
            trigger_cycle,
            seq,
            kind,
        }));
        EventHandle(seq)
    }

    /// Annulla un evento pendente. Una rimozione lazy: l'evento resta
    /// nell'heap ma viene scartato silenziosamente quando tocca a lui.
    pub fn cancel(&mut self, handle: EventHandle) {
        self.cancelled.insert(handle.0);
    }

    /// Avanza l'orologio dello scheduler di `cycles` cicli CPU.
    pub fn advance(&mut self, cycles: u64) {
        self.cycles += cycles;
    }

    /// Estrae il prossimo evento scaduto rispetto al ciclo corrente, se
    /// presente, saltando silenziosamente quelli cancellati.
    pub fn pop_due(&mut self) -> Option<EventKind> {
        loop {
            let Reverse(top) = self.heap.peek()?;
            if top.trigger_cycle > self.cycles {
                return None;
            }
            let Reverse(event) = self.heap.pop().unwrap();
            if self.cancelled.remove(&event.seq) {
                continue;
            }
            return Some(event.kind);
        }
    }

    /// Cicli mancanti al prossimo evento pendente (0 se già scaduto, `None`
    /// se la coda è vuota).
    pub fn next_event_in(&self) -> Option<u64> {
        self.heap
            .peek()
            .map(|Reverse(event)| event.trigger_cycle.saturating_sub(self.cycles))
    }

    /// Riporta il contatore cicli e ogni evento pendente a un'origine
    /// comune, da chiamare a fine frame per evitare la crescita illimitata
    /// di `cycles`.
    pub fn rebase(&mut self, origin: u64) {
        let base = origin.min(self.cycles);
        self.cycles -= base;
        let shifted: Vec<_> = self
            .heap
            .drain()
            .map(|Reverse(mut event)| {
                event.trigger_cycle = event.trigger_cycle.saturating_sub(base);
                Reverse(event)
            })
            .collect();
        self.heap.extend(shifted);
    }

    /// Svuota la coda e azzera l'orologio, da usare su reset dell'emulatore.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.cancelled.clear();
        self.cycles = 0;
        self.seq = 0;
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_order() {
        let mut sched = Scheduler::new();
        sched.add_event(10, EventKind::HBlank);
        sched.add_event(5, EventKind::VBlank);

        sched.advance(5);
        assert_eq!(sched.pop_due(), Some(EventKind::VBlank));
        assert_eq!(sched.pop_due(), None);

        sched.advance(5);
        assert_eq!(sched.pop_due(), Some(EventKind::HBlank));
    }

    #[test]
    fn fifo_tiebreak_on_equal_cycle() {
        let mut sched = Scheduler::new();
        sched.add_event(4, EventKind::TimerOverflow(0));
        sched.add_event(4, EventKind::TimerOverflow(1));

        sched.advance(4);
        assert_eq!(sched.pop_due(), Some(EventKind::TimerOverflow(0)));
        assert_eq!(sched.pop_due(), Some(EventKind::TimerOverflow(1)));
    }

    #[test]
    fn cancel_skips_event() {
        let mut sched = Scheduler::new();
        let handle = sched.add_event(3, EventKind::ApuSample);
        sched.cancel(handle);

        sched.advance(3);
        assert_eq!(sched.pop_due(), None);
    }

    #[test]
    fn reschedule_into_past_is_clamped() {
        let mut sched = Scheduler::new();
        sched.advance(100);
        // delay 0 da current_cycle=100 dovrebbe diventare 101, non 100.
        sched.add_event(0, EventKind::IrqPoll);
        assert_eq!(sched.next_event_in(), Some(1));
    }

    #[test]
    fn rebase_shifts_clock_and_pending_events() {
        let mut sched = Scheduler::new();
        sched.advance(1000);
        sched.add_event(50, EventKind::DmaActivate(2));

        sched.rebase(1000);
        assert_eq!(sched.current_cycle(), 0);
        assert_eq!(sched.next_event_in(), Some(50));
    }

    #[test]
    fn next_event_in_is_none_when_empty() {
        let sched = Scheduler::new();
        assert_eq!(sched.next_event_in(), None);
    }
}
