use super::*;
use crate::utils::test_utils::utils::{SAMPLE_ROWS, sample_store};
use crate::virtual_machine::files::FileStore;

fn run_with_store(source: &str, store: &mut FileStore) -> VM {
    let mut vm = VM::from_source(source).expect("parse failed");
    vm.run(store).expect("vm run failed");
    vm
}

fn run_vm(source: &str) -> VM {
    run_with_store(source, &mut sample_store())
}

fn run_store(source: &str) -> FileStore {
    let mut store = sample_store();
    run_with_store(source, &mut store);
    store
}

fn run_and_get(source: &str) -> (Value, Value) {
    let vm = run_vm(source);
    (vm.registers().t, vm.registers().x)
}

fn run_expect_err(source: &str) -> VMError {
    let mut vm = match VM::from_source(source) {
        Ok(vm) => vm,
        Err(e) => return e,
    };
    vm.run(&mut sample_store()).expect_err("expected error")
}

fn int(v: i64) -> Value {
    Value::from(v)
}

// ==================== Arithmetic ====================

const OPERANDS: &str = "COPY 5 T\nCOPY 3 X\n";

#[test]
fn add() {
    let (t, _) = run_and_get(&format!("{OPERANDS}ADDI T X T"));
    assert_eq!(t, int(8));
}

#[test]
fn sub() {
    let (t, _) = run_and_get(&format!("{OPERANDS}SUBI T X T"));
    assert_eq!(t, int(2));
}

#[test]
fn mul() {
    let (_, x) = run_and_get(&format!("{OPERANDS}MULI T X X"));
    assert_eq!(x, int(15));
}

#[test]
fn div() {
    let (t, _) = run_and_get(&format!("{OPERANDS}DIVI T X T"));
    assert_eq!(t, int(1));
}

#[test]
fn modulo() {
    let (t, _) = run_and_get(&format!("{OPERANDS}MODI T X T"));
    assert_eq!(t, int(2));
}

#[test]
fn div_and_mod_round_toward_negative_infinity() {
    assert_eq!(run_and_get("DIVI -7 2 T").0, int(-4));
    assert_eq!(run_and_get("MODI -7 2 T").0, int(1));
    assert_eq!(run_and_get("MODI 7 -2 T").0, int(-1));
    assert_eq!(run_and_get("DIVI 7 -2 T").0, int(-4));
    assert_eq!(run_and_get("DIVI -6 3 T").0, int(-2));
}

#[test]
fn add_wrapping() {
    let (t, _) = run_and_get("ADDI 9223372036854775807 1 T");
    assert_eq!(t, int(i64::MIN));
}

#[test]
fn division_by_zero_yields_no_result() {
    let (t, x) = run_and_get("COPY 4 T\nDIVI T 0 X\nMODI T 0 T");
    assert_eq!(x, Value::NoResult);
    assert_eq!(t, Value::NoResult);
}

#[test]
fn literal_zero_divisor() {
    assert_eq!(run_and_get("DIVI 5 0 T").0, Value::NoResult);
    assert_eq!(run_and_get("MODI 5 0 T").0, Value::NoResult);
}

#[test]
fn no_result_cannot_feed_arithmetic() {
    let err = run_expect_err("DIVI 1 0 X\nADDI X 1 T");
    assert!(matches!(
        err,
        VMError::NoResult { line: 2, ref operand } if operand == "X"
    ));
}

#[test]
fn copy_moves_values_including_no_result() {
    let (t, x) = run_and_get("COPY -12 X\nCOPY X T");
    assert_eq!((t, x), (int(-12), int(-12)));

    let (t, _) = run_and_get("DIVI 1 0 X\nCOPY X T");
    assert_eq!(t, Value::NoResult);
}

#[test]
fn copy_ignores_middle_operand() {
    let (t, _) = run_and_get("COPY 7 whatever T");
    assert_eq!(t, int(7));
}

#[test]
fn eof_is_not_an_arithmetic_operand() {
    let err = run_expect_err("GRAB 100\nADDI EOF 1 T");
    assert!(matches!(
        err,
        VMError::InvalidOperand { line: 2, ref token } if token == "EOF"
    ));
}

#[test]
fn bad_source_operand_is_a_runtime_error() {
    let err = run_expect_err("COPY 1 T\nADDI T 1x T");
    assert!(matches!(
        err,
        VMError::InvalidOperand { line: 2, ref token } if token == "1x"
    ));
}

// ==================== Test ====================

#[test]
fn test_comparisons() {
    assert_eq!(run_and_get("COPY 5 X\nTEST X > 3").0, int(1));
    assert_eq!(run_and_get("COPY 5 X\nTEST X < 3").0, int(0));
    assert_eq!(run_and_get("COPY 5 X\nTEST X = 5").0, int(1));
    assert_eq!(run_and_get("COPY 5 X\nTEST 4 = X").0, int(0));
}

#[test]
fn test_equality_is_structural_for_no_result() {
    assert_eq!(run_and_get("DIVI 1 0 X\nTEST X = X").0, int(1));
    assert_eq!(run_and_get("DIVI 1 0 X\nTEST X = 0").0, int(0));
}

#[test]
fn test_ordering_rejects_no_result() {
    let err = run_expect_err("DIVI 1 0 X\nTEST X > 1");
    assert!(matches!(err, VMError::NoResult { line: 2, .. }));
}

#[test]
fn test_bad_comparator() {
    let err = run_expect_err("TEST T ! 3");
    assert!(matches!(
        err,
        VMError::InvalidOperand { line: 1, ref token } if token == "!"
    ));
}

#[test]
fn test_single_operand_must_be_eof() {
    let err = run_expect_err("TEST X");
    assert!(matches!(err, VMError::InvalidOperand { line: 1, .. }));
}

#[test]
fn test_eof_as_comparison_operand() {
    assert_eq!(run_and_get("GRAB 100\nTEST EOF = 6").0, int(1));
    assert_eq!(run_and_get("TEST EOF = 0").0, int(1));
}

#[test]
fn test_eof_is_true_only_past_the_end() {
    let vm = run_vm("GRAB 100\nSEEK 10\nTEST EOF");
    assert_eq!(vm.registers().location, SAMPLE_ROWS.len());
    assert_eq!(vm.registers().t, int(0));

    let vm = run_vm("GRAB 100\nSEEK 10\nCOPY 1 X\nTEST EOF");
    assert_eq!(vm.registers().location, SAMPLE_ROWS.len() + 1);
    assert_eq!(vm.registers().t, int(1));
}

// ==================== Jumps ====================

#[test]
fn backward_loop_terminates() {
    let vm = run_vm(
        r#"
            COPY 0 X
            MARK LOOP
            ADDI X 1 X
            TEST X < 5
            TJMP LOOP
        "#,
    );
    assert_eq!(vm.registers().x, int(5));
    assert_eq!(vm.registers().t, int(0));
    assert!(vm.is_finished());
}

#[test]
fn jump_skips_forward() {
    let (_, x) = run_and_get("JUMP END\nCOPY 99 X\nMARK END");
    assert_eq!(x, int(0));
}

#[test]
fn test_then_branch() {
    let taken = "TEST 1 = 1\nTJMP L1\nCOPY 99 X\nMARK L1";
    assert_eq!(run_and_get(taken).1, int(0));

    let not_taken = "TEST 1 = 2\nTJMP L1\nCOPY 99 X\nMARK L1";
    assert_eq!(run_and_get(not_taken).1, int(99));

    let fjmp = "TEST 1 = 2\nFJMP L1\nCOPY 99 X\nMARK L1";
    assert_eq!(run_and_get(fjmp).1, int(0));
}

#[test]
fn fjmp_taken_on_zero() {
    let (_, x) = run_and_get("COPY 0 T\nFJMP SKIP\nCOPY 99 X\nMARK SKIP");
    assert_eq!(x, int(0));
}

#[test]
fn tjmp_not_taken_on_zero() {
    let (_, x) = run_and_get("COPY 0 T\nTJMP SKIP\nCOPY 99 X\nMARK SKIP");
    assert_eq!(x, int(99));
}

#[test]
fn no_result_counts_as_false() {
    let (_, x) = run_and_get("DIVI 1 0 T\nFJMP SKIP\nCOPY 99 X\nMARK SKIP");
    assert_eq!(x, int(0));
    let (_, x) = run_and_get("DIVI 1 0 T\nTJMP SKIP\nCOPY 99 X\nMARK SKIP");
    assert_eq!(x, int(99));
}

#[test]
fn unknown_label_fails_even_when_not_taken() {
    let err = run_expect_err("COPY 0 T\nTJMP NOWHERE");
    assert!(matches!(
        err,
        VMError::UnknownLabel { line: 2, ref label } if label == "NOWHERE"
    ));
}

#[test]
fn jump_lands_on_the_mark_position() {
    let mut vm = VM::from_source("JUMP B\nMARK A\nMARK B\nCOPY 1 T").unwrap();
    let mut store = FileStore::new();
    vm.step(&mut store).unwrap();
    assert_eq!(vm.pc(), 2);
    vm.step(&mut store).unwrap();
    assert_eq!(vm.pc(), 3);
}

// ==================== Engine ====================

#[test]
fn empty_program_returns_initial_registers() {
    let mut vm = VM::from_source("\n\n").unwrap();
    assert!(vm.program().is_empty());
    let regs = vm.run(&mut FileStore::new()).unwrap();
    assert_eq!(regs, RegisterBank::new());
    assert_eq!(vm.steps(), 0);
}

#[test]
fn notes_and_marks_only_advance() {
    let vm = run_vm("NOTE set things up\nMARK START\nCOPY 1 T");
    assert_eq!(vm.steps(), 3);
    assert_eq!(vm.pc(), 3);
    assert_eq!(vm.registers().t, int(1));
    assert_eq!(vm.registers().location, 1);
}

#[test]
fn step_after_finish_is_a_no_op() {
    let mut vm = VM::from_source("COPY 1 T").unwrap();
    let mut store = FileStore::new();
    vm.run(&mut store).unwrap();
    vm.step(&mut store).unwrap();
    assert_eq!(vm.steps(), 1);
    assert_eq!(vm.pc(), 1);
}

#[test]
fn parse_errors_surface_before_running() {
    let err = run_expect_err("COPY 1 T\nFROB T");
    assert!(matches!(err, VMError::UnknownOpcode { line: 2, .. }));
}

// ==================== Files ====================

#[test]
fn reading_f_walks_the_file() {
    let vm = run_vm("GRAB 100\nCOPY F X\nCOPY F T");
    assert_eq!(vm.registers().x, int(SAMPLE_ROWS[0]));
    assert_eq!(vm.registers().t, int(SAMPLE_ROWS[1]));
    assert_eq!(vm.registers().location, 2);
}

#[test]
fn grab_loads_eof() {
    let vm = run_vm("GRAB 100");
    let regs = vm.registers();
    assert!(regs.held);
    assert_eq!(regs.file_id.as_deref(), Some("100"));
    assert_eq!(regs.eof, SAMPLE_ROWS.len());
    assert_eq!(regs.location, 0);
}

#[test]
fn grab_of_empty_or_missing_file_keeps_previous_eof() {
    let vm = run_vm("GRAB 100\nGRAB 200");
    assert_eq!(vm.registers().eof, SAMPLE_ROWS.len());
    assert_eq!(vm.registers().file_id.as_deref(), Some("200"));

    let vm = run_vm("GRAB 300");
    assert_eq!(vm.registers().eof, 0);
    assert!(vm.registers().held);
}

#[test]
fn seek_then_read() {
    let (_, x) = run_and_get("GRAB 100\nSEEK 2\nCOPY F X");
    assert_eq!(x, int(3));
}

#[test]
fn seek_clamps_asymmetrically() {
    let vm = run_vm("GRAB 100\nSEEK 4\nSEEK -1");
    assert_eq!(vm.registers().location, 0);

    let vm = run_vm("GRAB 100\nSEEK 4\nSEEK 5");
    assert_eq!(vm.registers().location, 9);

    let vm = run_vm("GRAB 100\nSEEK 7");
    assert_eq!(vm.registers().location, SAMPLE_ROWS.len());
}

#[test]
fn seek_reads_register_operands() {
    let vm = run_vm("COPY 3 X\nGRAB 100\nSEEK X");
    assert_eq!(vm.registers().location, 4);
}

#[test]
fn read_past_eof_keeps_last_f() {
    let (_, x) = run_and_get("GRAB 100\nSEEK 5\nCOPY F T\nCOPY F X");
    assert_eq!(x, int(SAMPLE_ROWS[5]));
}

#[test]
fn write_inserts_after_advancing_the_cursor() {
    let store = run_store("GRAB 100\nCOPY 9 F");
    assert_eq!(store.rows("100"), Some(&[1, 9, 265, 3, 6, 557, 4][..]));

    let store = run_store("GRAB 100\nSEEK 1\nCOPY 9 F");
    assert_eq!(store.rows("100"), Some(&[1, 265, 9, 3, 6, 557, 4][..]));
}

#[test]
fn file_into_f_inserts_at_the_cursor() {
    let store = run_store("GRAB 100\nFILE F");
    assert_eq!(store.rows("100"), Some(&[100, 1, 265, 3, 6, 557, 4][..]));
}

#[test]
fn successive_writes_append_in_order() {
    let store = run_store("GRAB 200\nCOPY 7 F\nADDI 4 4 F");
    assert_eq!(store.rows("200"), Some(&[7, 8][..]));
}

#[test]
fn write_creates_missing_file() {
    let store = run_store("GRAB 300\nCOPY 4 F");
    assert_eq!(store.rows("300"), Some(&[4][..]));
}

#[test]
fn no_result_cannot_be_written_to_f() {
    let err = run_expect_err("GRAB 200\nDIVI 1 0 F");
    assert!(matches!(
        err,
        VMError::NoResult { line: 2, ref operand } if operand == "F"
    ));
}

#[test]
fn void_removes_row_equal_to_f() {
    let store = run_store("GRAB 100\nSEEK 2\nCOPY F X\nVOID");
    assert_eq!(store.rows("100"), Some(&[1, 265, 6, 557, 4][..]));
}

#[test]
fn void_missing_row() {
    let err = run_expect_err("GRAB 200\nVOID");
    assert!(matches!(
        err,
        VMError::RowNotFound { line: 2, ref file_id, value: 0 } if file_id == "200"
    ));
}

#[test]
fn void_requires_held_file() {
    let err = run_expect_err("VOID");
    assert!(matches!(err, VMError::FileAccessError { line: 1, .. }));
}

#[test]
fn f_requires_held_file() {
    let err = run_expect_err("COPY F T");
    assert!(matches!(err, VMError::FileAccessError { line: 1, .. }));
    let err = run_expect_err("COPY 1 F");
    assert!(matches!(err, VMError::FileAccessError { line: 1, .. }));
}

#[test]
fn drop_releases_the_file() {
    let vm = run_vm("GRAB 100\nCOPY F X\nDROP");
    let regs = vm.registers();
    assert!(!regs.held);
    assert_eq!(regs.location, 0);
    assert_eq!(regs.f, int(0));

    let err = run_expect_err("GRAB 100\nDROP\nCOPY F T");
    assert!(matches!(err, VMError::FileAccessError { line: 3, .. }));
}

#[test]
fn drop_twice_is_harmless() {
    let once = run_vm("GRAB 100\nCOPY F X\nDROP");
    let twice = run_vm("GRAB 100\nCOPY F X\nDROP\nDROP");
    assert_eq!(once.registers(), twice.registers());
}

#[test]
fn file_reports_held_id() {
    let (_, x) = run_and_get("GRAB 100\nFILE X");
    assert_eq!(x, int(100));
}

#[test]
fn file_errors() {
    let err = run_expect_err("FILE T");
    assert!(matches!(err, VMError::FileAccessError { line: 1, .. }));

    let err = run_expect_err("GRAB abc\nFILE T");
    assert!(matches!(
        err,
        VMError::InvalidOperand { line: 2, ref token } if token == "abc"
    ));

    let err = run_expect_err("GRAB 100\nFILE 5");
    assert!(matches!(err, VMError::InvalidRegister { line: 2, .. }));
}

#[test]
fn runs_share_one_store() {
    let mut store = sample_store();
    run_with_store("GRAB 200\nCOPY 42 F", &mut store);
    let reader = run_with_store("GRAB 200\nCOPY F X", &mut store);
    assert_eq!(reader.registers().x, int(42));
    assert_eq!(store.rows("200"), Some(&[42][..]));
}

#[test]
fn sample_program_sums_a_file() {
    let vm = run_vm(
        r#"
            NOTE sum every row of file 100 into X
            GRAB 100
            MARK LOOP
            ADDI X F X
            TEST EOF
            FJMP LOOP
            DROP
        "#,
    );
    // TEST EOF holds only once the cursor is past EOF, so the last row is
    // read twice.
    let expected: i64 = SAMPLE_ROWS.iter().sum::<i64>() + SAMPLE_ROWS[5];
    assert_eq!(vm.registers().x, int(expected));
    assert!(!vm.registers().held);
}
