use arch::sim::{Event, HaltReason, RoutineExit, SimHart};
use arch::{InterruptMask, PrivilegeMode, Resume, StatusFlags, TrapVector};
use boot::transition::{MAIN_INTERRUPTS, OPEN_PMP};
use boot::{BootLayout, BootStage, BssRegion, Sequencer};

const GP: usize = 0x8000_8800;
const BSS_START: usize = 0x8001_0000;
const BSS_END: usize = 0x8001_0040;
const STACK_END: usize = 0x8002_0040;
const EARLY_INIT: usize = 0x8000_0100;
const MAIN: usize = 0x8000_0200;
const TRAP: usize = 0x8000_0300;
const GARBAGE: u64 = 0xdead_beef_cafe_f00d;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn layout(bss: BssRegion) -> BootLayout {
    BootLayout {
        global_pointer: GP,
        bss,
        stack_end: STACK_END,
        early_init: EARLY_INIT,
        main: MAIN,
        trap_vector: TrapVector::direct(TRAP),
    }
}

fn run(hart: &mut SimHart, layout: &BootLayout) -> HaltReason {
    Sequencer::new(hart, layout).reset()
}

#[test]
fn secondary_harts_park_without_touching_anything() {
    init_logger();
    let layout = layout(BssRegion::new(BSS_START, BSS_END));
    for id in [1, 2, 3, 7] {
        let mut hart = SimHart::new(id);
        hart.fill(BSS_START, 8, GARBAGE);

        assert_eq!(run(&mut hart, &layout), HaltReason::Parked);

        assert!(hart.events().iter().all(|event| *event == Event::WaitForInterrupt));
        assert!(!hart.events().is_empty());
        assert_eq!(hart.stack_pointer(), None);
        assert_eq!(hart.global_pointer(), None);
        assert_eq!(hart.translation(), None);
        assert_eq!(hart.trap_vector(), None);
        assert_eq!(hart.interrupt_enable(), None);
        assert_eq!(hart.pmp(), None);
        assert_eq!(hart.epc(), None);
        assert_eq!(hart.read_word(BSS_START), Some(GARBAGE));
    }
}

#[test]
fn boot_hart_clears_exactly_the_bss_words() {
    init_logger();
    let layout = layout(BssRegion::new(BSS_START, BSS_END));
    let mut hart = SimHart::new(0);
    // One guard word on each side of the region.
    hart.fill(BSS_START - 8, 10, GARBAGE);

    run(&mut hart, &layout);

    for addr in (BSS_START..BSS_END).step_by(8) {
        assert_eq!(hart.read_word(addr), Some(0), "word at {addr:#x}");
    }
    assert_eq!(hart.read_word(BSS_START - 8), Some(GARBAGE));
    assert_eq!(hart.read_word(BSS_END), Some(GARBAGE));

    let stores: Vec<_> = hart.stores().map(|(addr, _)| addr).collect();
    let expected: Vec<_> = (BSS_START..BSS_END).step_by(8).collect();
    assert_eq!(stores, expected);
}

#[test]
fn single_word_bss_is_zeroed() {
    init_logger();
    let layout = layout(BssRegion::new(BSS_START, BSS_START + 8));
    let mut hart = SimHart::new(0);
    hart.fill(BSS_START, 1, GARBAGE);

    run(&mut hart, &layout);

    assert_eq!(hart.read_word(BSS_START), Some(0));
    assert_eq!(hart.stores().count(), 1);
}

#[test]
fn empty_bss_writes_nothing() {
    init_logger();
    for bss in [
        BssRegion::new(BSS_START, BSS_START),
        BssRegion::new(BSS_START + 8, BSS_START),
    ] {
        let layout = layout(bss);
        let mut hart = SimHart::new(0);
        hart.fill(BSS_START - 16, 5, GARBAGE);

        run(&mut hart, &layout);

        assert_eq!(hart.stores().count(), 0);
        for i in 0..5 {
            assert_eq!(hart.read_word(BSS_START - 16 + i * 8), Some(GARBAGE));
        }
    }
}

#[test]
fn prologue_runs_in_order_before_any_privilege_change() {
    init_logger();
    let layout = layout(BssRegion::new(BSS_START, BSS_START + 16));
    let mut hart = SimHart::new(0);

    run(&mut hart, &layout);

    let events = hart.events();
    assert_eq!(events[0], Event::DisableTranslation);
    assert_eq!(events[1], Event::GlobalPointer(GP));
    assert_eq!(events[2], Event::Store { addr: BSS_START, value: 0 });
    assert_eq!(events[3], Event::Store { addr: BSS_START + 8, value: 0 });
    assert_eq!(events[4], Event::StackPointer(STACK_END));
    assert!(matches!(events[5], Event::Status(_)));
    assert_eq!(hart.translation(), Some(0));
}

#[test]
fn early_init_runs_in_machine_mode_with_interrupts_masked() {
    init_logger();
    let layout = layout(BssRegion::new(BSS_START, BSS_END));
    let mut hart = SimHart::new(0).with_routine(EARLY_INIT, |hart| {
        assert_eq!(hart.mode(), PrivilegeMode::Machine);
        assert_eq!(hart.pc(), Some(EARLY_INIT));
        assert_eq!(hart.interrupt_enable(), Some(InterruptMask::empty()));
        assert_eq!(hart.trap_vector(), Some(TrapVector::direct(TRAP)));
        // `mret` copied MPIE into MIE, but nothing is unmasked in `mie`.
        let status = hart.status().unwrap();
        assert!(status.flags.contains(StatusFlags::MIE));
        assert_eq!(hart.stack_pointer(), Some(STACK_END));
        assert_eq!(hart.pmp(), None);
        RoutineExit::Return
    });

    run(&mut hart, &layout);

    assert!(hart.events().contains(&Event::PrivilegeReturn {
        mode: PrivilegeMode::Machine,
        pc: EARLY_INIT,
        interrupts_masked: true,
    }));
}

#[test]
fn main_runs_in_supervisor_mode_with_interrupts_and_open_pmp() {
    init_logger();
    let layout = layout(BssRegion::new(BSS_START, BSS_END));
    let mut hart = SimHart::new(0).with_routine(MAIN, |hart| {
        assert_eq!(hart.mode(), PrivilegeMode::Supervisor);
        assert_eq!(hart.pc(), Some(MAIN));
        assert_eq!(hart.interrupt_enable(), Some(MAIN_INTERRUPTS));
        assert_eq!(hart.pmp(), Some(OPEN_PMP));
        let status = hart.status().unwrap();
        assert!(status.flags.contains(StatusFlags::MIE));
        assert!(status.flags.contains(StatusFlags::SPIE));
        RoutineExit::Diverge
    });

    assert_eq!(run(&mut hart, &layout), HaltReason::Diverged { entry: MAIN });
    assert!(hart.events().contains(&Event::PrivilegeReturn {
        mode: PrivilegeMode::Supervisor,
        pc: MAIN,
        interrupts_masked: false,
    }));
}

#[test]
fn returning_early_init_resumes_without_repeating_the_prologue() {
    init_logger();
    let layout = layout(BssRegion::new(BSS_START, BSS_END));
    let mut hart = SimHart::new(0);

    run(&mut hart, &layout);

    let events = hart.events();
    let resumed = events
        .iter()
        .position(|event| {
            *event
                == Event::RoutineReturned {
                    entry: EARLY_INIT,
                    to: Resume::Caller,
                }
        })
        .unwrap();
    let after = &events[resumed + 1..];
    assert!(after.iter().all(|event| !matches!(
        event,
        Event::DisableTranslation
            | Event::GlobalPointer(_)
            | Event::Store { .. }
            | Event::StackPointer(_)
    )));
    // Operation 7 follows directly.
    assert_eq!(after[1], Event::Epc(MAIN));
}

#[test]
fn trap_vector_is_installed_once_before_interrupts_are_touched() {
    init_logger();
    let layout = layout(BssRegion::new(BSS_START, BSS_END));
    let mut hart = SimHart::new(0);

    run(&mut hart, &layout);

    let events = hart.events();
    let vector = events
        .iter()
        .position(|event| matches!(event, Event::TrapVector(_)))
        .unwrap();
    let first_mie = events
        .iter()
        .position(|event| matches!(event, Event::InterruptEnable(_)))
        .unwrap();
    assert!(vector < first_mie);
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::TrapVector(_)))
            .count(),
        1
    );
}

#[test]
fn returning_main_parks_the_boot_hart() {
    init_logger();
    let layout = layout(BssRegion::new(BSS_START, BSS_END));
    let mut hart = SimHart::new(0).with_wfi_budget(16);

    assert_eq!(run(&mut hart, &layout), HaltReason::Parked);

    let events = hart.events();
    let returned = events
        .iter()
        .position(|event| {
            *event
                == Event::RoutineReturned {
                    entry: MAIN,
                    to: Resume::Idle,
                }
        })
        .unwrap();
    let tail = &events[returned + 1..];
    assert_eq!(tail.len(), 16);
    assert!(tail.iter().all(|event| *event == Event::WaitForInterrupt));
}

#[test]
fn fresh_sequencer_starts_electing() {
    let layout = layout(BssRegion::new(BSS_START, BSS_END));
    let mut hart = SimHart::new(0);
    assert_eq!(Sequencer::new(&mut hart, &layout).stage(), BootStage::Electing);
    assert_eq!(
        Sequencer::after_prologue(&mut hart, &layout).stage(),
        BootStage::AwaitingEarlyInit
    );
}
