use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    Non,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Arithmetic,
    Comparison,
    Unification,
    Logical,
    Control,
    Io,
}

/// One operator entry. The same symbol may carry a prefix entry and an infix
/// entry with different precedences (`-/1` vs `-/2`).
#[derive(Debug, Clone)]
pub struct OpDef {
    pub symbol: &'static str,
    pub prec: u16,
    pub assoc: Assoc,
    pub kind: OpKind,
    pub arity: u8,
}

impl OpDef {
    /// Highest precedence an already-parsed left operand may have.
    pub(crate) fn left_max(&self) -> u16 {
        match self.assoc {
            Assoc::Left => self.prec,
            Assoc::Right | Assoc::Non => self.prec - 1,
        }
    }

    /// Precedence limit for parsing the right (or only) operand.
    pub(crate) fn right_max(&self) -> u16 {
        match self.assoc {
            Assoc::Right => self.prec,
            Assoc::Left | Assoc::Non => self.prec - 1,
        }
    }
}

/// Operator registry indexed by symbol and fixity. Built once at engine
/// start-up; read-only afterwards.
#[derive(Debug, Clone)]
pub struct OperatorTable {
    prefix: HashMap<&'static str, OpDef>,
    infix: HashMap<&'static str, OpDef>,
}

impl OperatorTable {
    pub fn core() -> Self {
        let mut t = Self {
            prefix: HashMap::new(),
            infix: HashMap::new(),
        };
        use Assoc::*;
        use OpKind::*;
        for def in [
            (":-", 1200, Non, Control, 2),
            (";", 1100, Right, Control, 2),
            ("->", 1050, Right, Control, 2),
            (",", 1000, Right, Control, 2),
            ("\\+", 900, Right, Logical, 1),
            ("=", 700, Non, Unification, 2),
            ("\\=", 700, Non, Unification, 2),
            ("==", 700, Non, Logical, 2),
            ("\\==", 700, Non, Logical, 2),
            ("=..", 700, Non, Logical, 2),
            ("is", 700, Non, Arithmetic, 2),
            ("=:=", 700, Non, Comparison, 2),
            ("=\\=", 700, Non, Comparison, 2),
            ("<", 700, Non, Comparison, 2),
            ("=<", 700, Non, Comparison, 2),
            (">", 700, Non, Comparison, 2),
            (">=", 700, Non, Comparison, 2),
            ("+", 500, Left, Arithmetic, 2),
            ("-", 500, Left, Arithmetic, 2),
            ("*", 400, Left, Arithmetic, 2),
            ("/", 400, Left, Arithmetic, 2),
            ("//", 400, Left, Arithmetic, 2),
            ("mod", 400, Left, Arithmetic, 2),
            ("**", 200, Right, Arithmetic, 2),
            ("-", 200, Right, Arithmetic, 1),
            ("+", 200, Right, Arithmetic, 1),
        ] {
            let (symbol, prec, assoc, kind, arity) = def;
            t.add(OpDef {
                symbol,
                prec,
                assoc,
                kind,
                arity,
            });
        }
        t
    }

    pub fn add(&mut self, def: OpDef) {
        match def.arity {
            1 => self.prefix.insert(def.symbol, def),
            _ => self.infix.insert(def.symbol, def),
        };
    }

    pub fn prefix(&self, symbol: &str) -> Option<&OpDef> {
        self.prefix.get(symbol)
    }

    pub fn infix(&self, symbol: &str) -> Option<&OpDef> {
        self.infix.get(symbol)
    }

    /// Is the symbol an operator in either fixity?
    pub fn is_operator(&self, symbol: &str) -> bool {
        self.prefix.contains_key(symbol) || self.infix.contains_key(symbol)
    }
}
