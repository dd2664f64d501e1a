//! A register-snapshot simulator of one hart.
//!
//! [`SimHart`] implements both context traits on plain memory. Every effect is
//! appended to an event trace, memory is a sparse map of 8-byte words, and `mret` is
//! modelled as the hardware does it (mode ← `MPP`, `MIE` ← `MPIE`, `pc` ← `mepc`).
//! Routines entered by `mret` are Rust closures registered at an address.
//!
//! Writing a machine-level register from below machine mode is an illegal instruction
//! on hardware; the simulator panics instead, so a test fails loudly.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::ops::ControlFlow;

use crate::csr::{InterruptMask, PmpEntry, PrivilegeMode, Status, StatusFlags};
use crate::hart::{HartContext, ResetContext, Resume};
use crate::trap::TrapVector;

/// One observable effect of the simulated hart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    DisableTranslation,
    GlobalPointer(usize),
    Store { addr: usize, value: u64 },
    StackPointer(usize),
    Status(Status),
    Epc(usize),
    TrapVector(TrapVector),
    InterruptEnable(InterruptMask),
    Pmp(PmpEntry),
    /// `mret` landed at `pc` in `mode`; `interrupts_masked` is `mie == 0` at that point.
    PrivilegeReturn {
        mode: PrivilegeMode,
        pc: usize,
        interrupts_masked: bool,
    },
    /// The routine entered at `entry` returned through `ra`, which pointed at `to`.
    RoutineReturned { entry: usize, to: Resume },
    WaitForInterrupt,
}

impl Event {
    /// Whether the event changes hart or memory state. `wfi` and routine returns do not.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Event::WaitForInterrupt | Event::RoutineReturned { .. })
    }
}

/// How a simulated routine ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoutineExit {
    /// Returns through `ra`.
    Return,
    /// Never returns; the simulation stops.
    Diverge,
}

/// Why the simulated hart stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// The idle loop executed its `wfi` budget.
    Parked,
    /// The routine at `entry` did not return.
    Diverged { entry: usize },
}

type Routine = Box<dyn FnMut(&mut SimHart) -> RoutineExit>;

/// Number of `wfi` the idle loop may execute before the simulation stops.
const DEFAULT_WFI_BUDGET: usize = 4;

pub struct SimHart {
    id: usize,
    mode: PrivilegeMode,
    pc: Option<usize>,
    satp: Option<usize>,
    gp: Option<usize>,
    sp: Option<usize>,
    status: usize,
    epc: Option<usize>,
    trap_vector: Option<TrapVector>,
    interrupt_enable: Option<InterruptMask>,
    pmp: Option<PmpEntry>,
    memory: BTreeMap<usize, u64>,
    routines: BTreeMap<usize, Routine>,
    events: Vec<Event>,
    wfi_budget: usize,
}

impl SimHart {
    /// A hart just out of reset: machine mode, nothing written.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            mode: PrivilegeMode::Machine,
            pc: None,
            satp: None,
            gp: None,
            sp: None,
            status: 0,
            epc: None,
            trap_vector: None,
            interrupt_enable: None,
            pmp: None,
            memory: BTreeMap::new(),
            routines: BTreeMap::new(),
            events: Vec::new(),
            wfi_budget: DEFAULT_WFI_BUDGET,
        }
    }

    /// Registers the routine `mret` runs when it lands on `entry`. Unregistered entries
    /// return immediately.
    pub fn with_routine(
        mut self,
        entry: usize,
        routine: impl FnMut(&mut SimHart) -> RoutineExit + 'static,
    ) -> Self {
        self.routines.insert(entry, Box::new(routine));
        self
    }

    pub fn with_wfi_budget(mut self, budget: usize) -> Self {
        self.wfi_budget = budget;
        self
    }

    /// Pre-fills `words` 8-byte words from `start` with `value`, without tracing.
    pub fn fill(&mut self, start: usize, words: usize, value: u64) {
        for i in 0..words {
            self.memory.insert(start + i * 8, value);
        }
    }

    pub fn read_word(&self, addr: usize) -> Option<u64> {
        self.memory.get(&addr).copied()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Every word store, in program order.
    pub fn stores(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::Store { addr, value } => Some((*addr, *value)),
            _ => None,
        })
    }

    pub fn mode(&self) -> PrivilegeMode {
        self.mode
    }

    pub fn pc(&self) -> Option<usize> {
        self.pc
    }

    pub fn translation(&self) -> Option<usize> {
        self.satp
    }

    pub fn global_pointer(&self) -> Option<usize> {
        self.gp
    }

    pub fn stack_pointer(&self) -> Option<usize> {
        self.sp
    }

    pub fn status(&self) -> Option<Status> {
        Status::from_bits(self.status)
    }

    pub fn epc(&self) -> Option<usize> {
        self.epc
    }

    pub fn trap_vector(&self) -> Option<TrapVector> {
        self.trap_vector
    }

    pub fn interrupt_enable(&self) -> Option<InterruptMask> {
        self.interrupt_enable
    }

    pub fn pmp(&self) -> Option<PmpEntry> {
        self.pmp
    }

    fn record(&mut self, event: Event) {
        log::trace!("sim hart {}: {:?}", self.id, event);
        self.events.push(event);
    }

    fn require_machine(&self, what: &str) {
        assert_eq!(
            self.mode,
            PrivilegeMode::Machine,
            "sim hart {}: illegal {} from {:?} mode",
            self.id,
            what,
            self.mode
        );
    }
}

impl HartContext for SimHart {
    type Halt = HaltReason;

    fn hart_id(&self) -> usize {
        self.id
    }

    unsafe fn write_status(&mut self, status: Status) {
        self.require_machine("mstatus write");
        self.status = status.bits();
        self.record(Event::Status(status));
    }

    unsafe fn write_epc(&mut self, entry: usize) {
        self.require_machine("mepc write");
        self.epc = Some(entry);
        self.record(Event::Epc(entry));
    }

    unsafe fn write_trap_vector(&mut self, vector: TrapVector) {
        self.require_machine("mtvec write");
        self.trap_vector = Some(vector);
        self.record(Event::TrapVector(vector));
    }

    unsafe fn write_interrupt_enable(&mut self, mask: InterruptMask) {
        self.require_machine("mie write");
        self.interrupt_enable = Some(mask);
        self.record(Event::InterruptEnable(mask));
    }

    unsafe fn write_pmp(&mut self, entry: PmpEntry) {
        self.require_machine("pmp write");
        self.pmp = Some(entry);
        self.record(Event::Pmp(entry));
    }

    unsafe fn privilege_return(&mut self, resume: Resume) -> ControlFlow<HaltReason> {
        self.require_machine("mret");
        let Some(previous) = self.status() else {
            panic!("sim hart {}: mret with reserved MPP", self.id);
        };
        let Some(entry) = self.epc else {
            panic!("sim hart {}: mret with mepc unset", self.id);
        };

        let mut flags = previous.flags;
        flags.set(StatusFlags::MIE, flags.contains(StatusFlags::MPIE));
        flags.insert(StatusFlags::MPIE);
        self.status = Status::new(PrivilegeMode::User, flags).bits();
        self.mode = previous.previous;
        self.pc = Some(entry);

        let interrupts_masked = self.interrupt_enable.is_none_or(|mask| mask.is_empty());
        self.record(Event::PrivilegeReturn {
            mode: self.mode,
            pc: entry,
            interrupts_masked,
        });

        let exit = match self.routines.remove(&entry) {
            Some(mut routine) => {
                let exit = routine(self);
                self.routines.insert(entry, routine);
                exit
            }
            None => RoutineExit::Return,
        };

        match exit {
            RoutineExit::Return => {
                self.record(Event::RoutineReturned { entry, to: resume });
                self.pc = None;
                ControlFlow::Continue(())
            }
            RoutineExit::Diverge => ControlFlow::Break(HaltReason::Diverged { entry }),
        }
    }

    fn wait_for_interrupt(&mut self) -> ControlFlow<HaltReason> {
        self.record(Event::WaitForInterrupt);
        self.wfi_budget = self.wfi_budget.saturating_sub(1);
        if self.wfi_budget == 0 {
            ControlFlow::Break(HaltReason::Parked)
        } else {
            ControlFlow::Continue(())
        }
    }
}

impl ResetContext for SimHart {
    unsafe fn disable_translation(&mut self) {
        self.satp = Some(0);
        self.record(Event::DisableTranslation);
    }

    unsafe fn load_global_pointer(&mut self, gp: usize) {
        self.gp = Some(gp);
        self.record(Event::GlobalPointer(gp));
    }

    unsafe fn zero_word(&mut self, addr: usize) {
        assert_eq!(addr % 8, 0, "sim hart {}: misaligned store to {:#x}", self.id, addr);
        self.memory.insert(addr, 0);
        self.record(Event::Store { addr, value: 0 });
    }

    unsafe fn load_stack_pointer(&mut self, sp: usize) {
        self.sp = Some(sp);
        self.record(Event::StackPointer(sp));
    }
}
