//! Instruction-level conformance: data movement, ALU, and flag policy.

use i8080_core::{
    load_image, new_address_space, step_one, ConditionFlags, CoreConfig, CoreState, NullIo, Reg8,
    RegisterPair, StepOutcome, UNDOCUMENTED_OPCODES,
};
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn boot(program: &[u8]) -> (CoreState, Box<[u8]>) {
    let mut memory = new_address_space();
    load_image(&mut memory, 0, program).expect("program fits");
    (CoreState::default(), memory)
}

fn step(state: &mut CoreState, memory: &mut [u8]) -> StepOutcome {
    step_one(state, memory, &mut NullIo, &CoreConfig::default())
}

fn step_n(state: &mut CoreState, memory: &mut [u8], count: usize) {
    for _ in 0..count {
        assert_eq!(step(state, memory), StepOutcome::Continue);
    }
}

#[test]
fn mvi_mvi_add_produces_eight_with_clear_flags() {
    // MVI A,5 ; MVI B,3 ; ADD B
    let (mut state, mut memory) = boot(&[0x3E, 0x05, 0x06, 0x03, 0x80]);
    step_n(&mut state, &mut memory, 3);

    assert_eq!(state.arch.a(), 8);
    let flags = state.arch.flags();
    assert!(!flags.carry);
    assert!(!flags.zero);
    assert!(!flags.sign);
    assert!(!flags.parity);
    assert_eq!(state.arch.pc(), 5);
}

#[test]
fn inr_a_from_ff_wraps_to_zero_with_even_parity() {
    // MVI A,0xFF ; INR A
    let (mut state, mut memory) = boot(&[0x3E, 0xFF, 0x3C]);
    step_n(&mut state, &mut memory, 2);

    assert_eq!(state.arch.a(), 0x00);
    let flags = state.arch.flags();
    assert!(flags.zero);
    assert!(!flags.sign);
    assert!(flags.parity);
    assert!(!flags.carry);
}

#[test]
fn inr_and_dcr_never_touch_carry() {
    // STC ; MVI B,0xFF ; INR B ; DCR B
    let (mut state, mut memory) = boot(&[0x37, 0x06, 0xFF, 0x04, 0x05]);
    step_n(&mut state, &mut memory, 4);
    assert_eq!(state.arch.reg(Reg8::B), 0xFF);
    assert!(state.arch.flags().carry);
}

#[test]
fn memory_indirect_moves_use_hl() {
    // LXI H,0x2000 ; MVI M,0x42 ; MOV C,M ; MVI A,0x17 ; MOV M,A
    let (mut state, mut memory) = boot(&[0x21, 0x00, 0x20, 0x36, 0x42, 0x4E, 0x3E, 0x17, 0x77]);
    step_n(&mut state, &mut memory, 3);
    assert_eq!(memory[0x2000], 0x42);
    assert_eq!(state.arch.reg(Reg8::C), 0x42);

    step_n(&mut state, &mut memory, 2);
    assert_eq!(memory[0x2000], 0x17);
}

#[test]
fn inr_m_updates_memory_and_flags() {
    // LXI H,0x3000 ; INR M
    let (mut state, mut memory) = boot(&[0x21, 0x00, 0x30, 0x34]);
    memory[0x3000] = 0x7F;
    step_n(&mut state, &mut memory, 2);
    assert_eq!(memory[0x3000], 0x80);
    assert!(state.arch.flags().sign);
}

#[test]
fn direct_loads_and_stores() {
    // MVI A,0x99 ; STA 0x4000 ; LDA 0x4001 ; LXI H,0xBEEF ; SHLD 0x5000 ; LHLD 0x6000
    let (mut state, mut memory) = boot(&[
        0x3E, 0x99, 0x32, 0x00, 0x40, 0x3A, 0x01, 0x40, 0x21, 0xEF, 0xBE, 0x22, 0x00, 0x50, 0x2A,
        0x00, 0x60,
    ]);
    memory[0x4001] = 0x11;
    memory[0x6000] = 0x34;
    memory[0x6001] = 0x12;

    step_n(&mut state, &mut memory, 2);
    assert_eq!(memory[0x4000], 0x99);
    step_n(&mut state, &mut memory, 1);
    assert_eq!(state.arch.a(), 0x11);

    step_n(&mut state, &mut memory, 2);
    assert_eq!(memory[0x5000], 0xEF);
    assert_eq!(memory[0x5001], 0xBE);
    step_n(&mut state, &mut memory, 1);
    assert_eq!(state.arch.pair(RegisterPair::HL), 0x1234);
}

#[test]
fn indirect_accumulator_transfers() {
    // LXI B,0x2000 ; LXI D,0x2001 ; MVI A,0x5A ; STAX B ; LDAX D
    let (mut state, mut memory) = boot(&[
        0x01, 0x00, 0x20, 0x11, 0x01, 0x20, 0x3E, 0x5A, 0x02, 0x1A,
    ]);
    memory[0x2001] = 0xA5;
    step_n(&mut state, &mut memory, 5);
    assert_eq!(memory[0x2000], 0x5A);
    assert_eq!(state.arch.a(), 0xA5);
}

#[test]
fn sixteen_bit_increment_wraps_without_flags() {
    // LXI D,0xFFFF ; INX D ; DCX SP
    let (mut state, mut memory) = boot(&[0x11, 0xFF, 0xFF, 0x13, 0x3B]);
    step_n(&mut state, &mut memory, 3);
    assert_eq!(state.arch.pair(RegisterPair::DE), 0x0000);
    assert_eq!(state.arch.sp(), 0xFFFF);
    assert_eq!(state.arch.flags(), ConditionFlags::default());
}

#[test]
fn dad_sets_only_carry() {
    // LXI H,0x8000 ; LXI B,0x8001 ; DAD B
    let (mut state, mut memory) = boot(&[0x21, 0x00, 0x80, 0x01, 0x01, 0x80, 0x09]);
    step_n(&mut state, &mut memory, 3);
    assert_eq!(state.arch.pair(RegisterPair::HL), 0x0001);
    let flags = state.arch.flags();
    assert!(flags.carry);
    assert!(!flags.zero);
}

#[test]
fn dad_sp_doubles_against_stack_pointer() {
    // LXI SP,0x1234 ; LXI H,0x0001 ; DAD SP
    let (mut state, mut memory) = boot(&[0x31, 0x34, 0x12, 0x21, 0x01, 0x00, 0x39]);
    step_n(&mut state, &mut memory, 3);
    assert_eq!(state.arch.pair(RegisterPair::HL), 0x1235);
    assert!(!state.arch.flags().carry);
}

#[test]
fn carry_control_and_complement() {
    // MVI A,0x0F ; CMA ; STC ; CMC
    let (mut state, mut memory) = boot(&[0x3E, 0x0F, 0x2F, 0x37, 0x3F]);
    step_n(&mut state, &mut memory, 2);
    assert_eq!(state.arch.a(), 0xF0);
    assert_eq!(state.arch.flags(), ConditionFlags::default());
    step_n(&mut state, &mut memory, 1);
    assert!(state.arch.flags().carry);
    step_n(&mut state, &mut memory, 1);
    assert!(!state.arch.flags().carry);
}

#[rstest]
#[case::ana(0xA0, 0xF0, 0x3C, 0x30)]
#[case::xra(0xA8, 0xF0, 0x3C, 0xCC)]
#[case::ora(0xB0, 0xF0, 0x3C, 0xFC)]
fn logical_ops_clear_carry(
    #[case] opcode: u8,
    #[case] a: u8,
    #[case] b: u8,
    #[case] expected: u8,
) {
    // STC ; MVI A,a ; MVI B,b ; <op> B
    let (mut state, mut memory) = boot(&[0x37, 0x3E, a, 0x06, b, opcode]);
    step_n(&mut state, &mut memory, 4);
    assert_eq!(state.arch.a(), expected);
    assert!(!state.arch.flags().carry);
}

#[rstest]
#[case::adi(0xC6, 0x80, 0x80, 0x00, true)]
#[case::aci(0xCE, 0x10, 0x01, 0x12, false)]
#[case::sui(0xD6, 0x01, 0x02, 0xFF, true)]
#[case::sbi(0xDE, 0x05, 0x02, 0x02, false)]
#[case::ani(0xE6, 0xFF, 0x0F, 0x0F, false)]
#[case::xri(0xEE, 0xFF, 0xFF, 0x00, false)]
#[case::ori(0xF6, 0x00, 0x81, 0x81, false)]
fn immediate_alu_forms(
    #[case] opcode: u8,
    #[case] a: u8,
    #[case] operand: u8,
    #[case] expected: u8,
    #[case] carry: bool,
) {
    // STC ; MVI A,a ; <op> operand
    let (mut state, mut memory) = boot(&[0x37, 0x3E, a, opcode, operand]);
    step_n(&mut state, &mut memory, 3);
    assert_eq!(state.arch.a(), expected);
    assert_eq!(state.arch.flags().carry, carry);
    assert_eq!(state.arch.pc(), 5);
}

#[test]
fn compare_leaves_accumulator_unchanged() {
    // MVI A,0x10 ; CPI 0x20 ; CPI 0x10
    let (mut state, mut memory) = boot(&[0x3E, 0x10, 0xFE, 0x20, 0xFE, 0x10]);
    step_n(&mut state, &mut memory, 2);
    assert_eq!(state.arch.a(), 0x10);
    assert!(state.arch.flags().carry);
    assert!(!state.arch.flags().zero);

    step_n(&mut state, &mut memory, 1);
    assert!(state.arch.flags().zero);
    assert!(!state.arch.flags().carry);
}

#[rstest]
#[case::rlc(0x07, false, 0x80, 0x01, true)]
#[case::rrc(0x0F, false, 0x02, 0x01, false)]
#[case::ral(0x17, true, 0x00, 0x01, false)]
#[case::rar(0x1F, true, 0x01, 0x80, true)]
fn accumulator_rotates(
    #[case] opcode: u8,
    #[case] carry_in: bool,
    #[case] a: u8,
    #[case] expected: u8,
    #[case] carry_out: bool,
) {
    let (mut state, mut memory) = boot(&[0x3E, a, opcode]);
    state.arch.flags_mut().carry = carry_in;
    step_n(&mut state, &mut memory, 2);
    assert_eq!(state.arch.a(), expected);
    assert_eq!(state.arch.flags().carry, carry_out);
}

#[test]
fn exchanges_swap_pairs_and_stack_top() {
    // LXI H,0x1111 ; LXI D,0x2222 ; XCHG ; LXI SP,0x3000 ; XTHL
    let (mut state, mut memory) = boot(&[
        0x21, 0x11, 0x11, 0x11, 0x22, 0x22, 0xEB, 0x31, 0x00, 0x30, 0xE3,
    ]);
    memory[0x3000] = 0xCD;
    memory[0x3001] = 0xAB;

    step_n(&mut state, &mut memory, 3);
    assert_eq!(state.arch.pair(RegisterPair::HL), 0x2222);
    assert_eq!(state.arch.pair(RegisterPair::DE), 0x1111);

    step_n(&mut state, &mut memory, 2);
    assert_eq!(state.arch.pair(RegisterPair::HL), 0xABCD);
    assert_eq!(memory[0x3000], 0x22);
    assert_eq!(memory[0x3001], 0x22);
    assert_eq!(state.arch.sp(), 0x3000);
}

#[test]
fn sphl_and_pchl_transfer_hl() {
    // LXI H,0x0100 ; SPHL ; PCHL
    let (mut state, mut memory) = boot(&[0x21, 0x00, 0x01, 0xF9, 0xE9]);
    step_n(&mut state, &mut memory, 3);
    assert_eq!(state.arch.sp(), 0x0100);
    assert_eq!(state.arch.pc(), 0x0100);
}

#[test]
fn ei_and_di_toggle_interrupt_enable() {
    let (mut state, mut memory) = boot(&[0xFB, 0xF3]);
    step_n(&mut state, &mut memory, 1);
    assert!(state.arch.interrupt_enable());
    step_n(&mut state, &mut memory, 1);
    assert!(!state.arch.interrupt_enable());
}

#[test]
fn hlt_advances_pc_and_reports_halted() {
    let (mut state, mut memory) = boot(&[0x76]);
    assert_eq!(step(&mut state, &mut memory), StepOutcome::Halted);
    assert_eq!(state.arch.pc(), 1);
    assert!(state.run_state.is_halted());
    assert_eq!(step(&mut state, &mut memory), StepOutcome::Halted);
    assert_eq!(state.arch.pc(), 1);
}

#[test]
fn every_undocumented_opcode_is_a_one_byte_nop() {
    for opcode in UNDOCUMENTED_OPCODES {
        let (mut state, mut memory) = boot(&[opcode]);
        let before = state.arch.clone();
        assert_eq!(step(&mut state, &mut memory), StepOutcome::Continue);
        assert_eq!(state.arch.pc(), 1, "opcode {opcode:#04x}");
        state.arch.set_pc(0);
        assert_eq!(state.arch, before);
    }
}

#[rstest]
#[case(0x40, Reg8::B)]
#[case(0x49, Reg8::C)]
#[case(0x52, Reg8::D)]
#[case(0x5B, Reg8::E)]
#[case(0x64, Reg8::H)]
#[case(0x6D, Reg8::L)]
#[case(0x7F, Reg8::A)]
fn self_moves_are_no_ops(#[case] opcode: u8, #[case] reg: Reg8) {
    let (mut state, mut memory) = boot(&[opcode]);
    state.arch.set_reg(reg, 0x5C);
    step_n(&mut state, &mut memory, 1);
    assert_eq!(state.arch.reg(reg), 0x5C);
    assert_eq!(state.arch.pc(), 1);
}
