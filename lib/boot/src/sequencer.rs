//! The boot sequence proper.
//!
//! Operation numbering follows the order the steps run in on the boot hart:
//!
//! 1. election, 2. translation off, 3. `gp`, 4. `.bss` clearing, 5. stack,
//! 6. `mret` into early init, 7. `mret` into main.
//!
//! On hardware steps 1 to 5 run in the reset vector, before a stack exists, and the
//! reset vector then tail-calls into [`Sequencer::after_prologue`]. [`Sequencer::reset`]
//! runs every step on a [`ResetContext`].

use core::ops::ControlFlow;

use arch::{HartContext, ResetContext};
use config::boot::{BOOT_HART_ID, BSS_WORD};

use crate::layout::{BootLayout, BssRegion};
use crate::stage::BootStage;
use crate::transition::{self, Transition};

/// Whether `hart_id` performs the one-time setup.
pub const fn is_boot_hart(hart_id: usize) -> bool {
    hart_id == BOOT_HART_ID
}

pub struct Sequencer<'a, H: HartContext> {
    hart: &'a mut H,
    layout: &'a BootLayout,
    stage: BootStage,
}

impl<'a, H: HartContext> Sequencer<'a, H> {
    /// A sequence that starts from reset.
    pub fn new(hart: &'a mut H, layout: &'a BootLayout) -> Self {
        Self {
            hart,
            layout,
            stage: BootStage::Electing,
        }
    }

    /// A sequence whose prologue already ran elsewhere: the caller is the elected boot
    /// hart with translation off, `gp` loaded, `.bss` zeroed and a stack.
    pub fn after_prologue(hart: &'a mut H, layout: &'a BootLayout) -> Self {
        Self {
            hart,
            layout,
            stage: BootStage::AwaitingEarlyInit,
        }
    }

    pub fn stage(&self) -> BootStage {
        self.stage
    }

    fn advance(&mut self, next: BootStage) {
        debug_assert!(
            self.stage.can_move_to(next),
            "illegal boot stage move {} -> {}",
            self.stage,
            next
        );
        self.stage = next;
    }

    /// Operations 6 and 7, then the idle loop if the main routine returns.
    pub fn descend(mut self) -> H::Halt {
        debug_assert_eq!(self.stage, BootStage::AwaitingEarlyInit);
        let hart_id = self.hart.hart_id();

        log::debug!("hart {}: entering early init at {:#x}", hart_id, self.layout.early_init);
        // SAFETY: machine mode; the layout names a routine valid to run masked in it.
        let early = unsafe { transition::enter(&mut *self.hart, &Transition::early_init(self.layout)) };
        if let ControlFlow::Break(halt) = early {
            return halt;
        }

        // Early init returned through `ra`; it may have installed a logger by now.
        self.advance(BootStage::AwaitingMain);
        log::debug!("hart {}: early init done, entering main at {:#x}", hart_id, self.layout.main);
        // SAFETY: still machine mode, since early init ran there and returned normally.
        let main = unsafe { transition::enter(&mut *self.hart, &Transition::main(self.layout)) };
        if let ControlFlow::Break(halt) = main {
            return halt;
        }

        self.advance(BootStage::Idle);
        self.idle()
    }

    /// The terminal state: `wfi` forever.
    pub fn idle(&mut self) -> H::Halt {
        loop {
            if let ControlFlow::Break(halt) = self.hart.wait_for_interrupt() {
                return halt;
            }
        }
    }
}

impl<H: ResetContext> Sequencer<'_, H> {
    /// Every operation from reset on.
    pub fn reset(mut self) -> H::Halt {
        if !is_boot_hart(self.hart.hart_id()) {
            self.advance(BootStage::Idle);
            return self.idle();
        }
        self.advance(BootStage::ClearingBss);
        self.prologue();
        self.advance(BootStage::AwaitingEarlyInit);
        self.descend()
    }

    /// Operations 2 to 5.
    pub fn prologue(&mut self) {
        let layout = self.layout;
        // SAFETY: boot hart, right after reset; nothing runs on a stack or relies on
        // `.bss` yet.
        unsafe {
            self.hart.disable_translation();
            self.hart.load_global_pointer(layout.global_pointer);
        }
        self.clear_bss(layout.bss);
        // SAFETY: `stack_end` is the top of a region reserved for this hart.
        unsafe {
            self.hart.load_stack_pointer(layout.stack_end);
        }
    }

    /// Operation 4. Bounds are taken as word aligned without checking.
    pub fn clear_bss(&mut self, region: BssRegion) {
        if region.start() >= region.end() {
            return;
        }
        let mut addr = region.start();
        while addr < region.end() {
            // SAFETY: `addr` is inside `.bss`, which nothing has used yet.
            unsafe { self.hart.zero_word(addr) };
            addr += BSS_WORD;
        }
    }
}
