#[cfg(test)]
mod tests {
    use crate::virtual_machine::isa::{Arity, Category, Opcode};
    use std::collections::HashSet;

    macro_rules! collect_table {
        (
            $( $(#[$doc:meta])* $name:ident, $mnemonic:literal => $category:ident, $arity:expr ),* $(,)?
        ) => {{
            vec![ $( (Opcode::$name, $mnemonic, Category::$category, $arity) ),* ]
        }};
    }

    fn table() -> Vec<(Opcode, &'static str, Category, Arity)> {
        crate::for_each_opcode!(collect_table)
    }

    #[test]
    fn table_covers_every_opcode_once() {
        let table = table();
        assert_eq!(table.len(), Opcode::ALL.len());
        let mnemonics: HashSet<_> = table.iter().map(|(_, m, _, _)| *m).collect();
        assert_eq!(mnemonics.len(), table.len());
    }

    #[test]
    fn mnemonics_round_trip() {
        for (opcode, mnemonic, category, arity) in table() {
            assert_eq!(Opcode::from_mnemonic(mnemonic), Some(opcode));
            assert_eq!(opcode.mnemonic(), mnemonic);
            assert_eq!(opcode.category(), category);
            assert_eq!(opcode.arity(), arity);
        }
    }

    #[test]
    fn mnemonics_are_four_uppercase_letters() {
        for (_, mnemonic, _, _) in table() {
            assert_eq!(mnemonic.len(), 4, "{mnemonic}");
            assert!(mnemonic.chars().all(|c| c.is_ascii_uppercase()), "{mnemonic}");
        }
    }

    #[test]
    fn arithmetic_opcodes_take_a_destination() {
        for (opcode, _, category, arity) in table() {
            if category == Category::Arithmetic {
                assert!(!arity.accepts(0) && !arity.accepts(1), "{opcode}");
            }
        }
    }
}
