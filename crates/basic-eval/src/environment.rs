//! Evaluator state (spec.md §3 "Environment"): variables, arrays, constants,
//! user types, `DEF FN`/`SUB`/`FUNCTION` tables, labels, the control-flow
//! stacks, the `DATA` pool, RNG, error state, files, and graphics.

use std::collections::HashMap;

use ahash::RandomState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use basic_ast::{Expression, ParamDecl, TypeFieldDecl, Value};
use basic_files::FileTable;
use basic_graphics::GraphicsState;

use crate::array::ArrayVar;
use crate::record::RecordInstance;

/// Default numeric type assigned to an unsuffixed name by `DEFINT`/`DEFLNG`/
/// `DEFSNG`/`DEFDBL`/`DEFSTR` (spec.md §3 `def_types`). Only the
/// integer/long vs. everything-else distinction is observable, since every
/// number is stored as `f64`; `Str` makes an unsuffixed name a text
/// variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefKind {
    Integer,
    Long,
    Single,
    Double,
    Str,
}

/// One active `FOR` loop (spec.md §3 `for_loop_state`): the loop variable,
/// its terminal value and step, and the line-table index of the `FOR`
/// itself so `NEXT` can jump back to the line right after it.
#[derive(Debug, Clone)]
pub struct ForState {
    pub var: String,
    pub end: f64,
    pub step: f64,
    pub pc: usize,
}

/// `user_functions`: a `DEF FN` body, evaluated with its own parameter
/// bindings layered over the ambient variable table.
#[derive(Debug, Clone)]
pub struct UserFunction {
    pub params: Vec<String>,
    pub body: Expression,
}

/// `subs` / `functions` (spec.md §3): pre-registered at run start so
/// forward references resolve, per spec.md §4.F.
#[derive(Debug, Clone)]
pub struct RoutineInfo {
    pub start_pc: usize,
    pub params: Vec<ParamDecl>,
    pub is_function: bool,
}

/// `ON ERROR` / `RESUME` state (spec.md §3 "Error state").
#[derive(Debug, Clone, Default)]
pub struct ErrorState {
    pub handler_pc: Option<usize>,
    pub in_handler: bool,
    pub resume_pc: Option<usize>,
    pub last_error_code: u32,
    pub last_error_line: u32,
}

/// A scalar `TYPE` instance, or one element of a `DIM a(n) AS t` array of
/// them (spec.md §4.F "Dim / Redim").
#[derive(Debug, Clone, Default)]
pub struct RecordArray {
    pub dims: Vec<u32>,
    pub elements: Vec<RecordInstance>,
}

/// One active `SELECT CASE` frame (spec.md §3 `select_case`, §9 "Line-numbered
/// structured code"): the selector value, plus whether some `CASE`/`CASE ELSE`
/// has already matched, so later clauses in the same block never re-fire
/// (classic BASIC has no fallthrough).
#[derive(Debug, Clone)]
pub struct SelectFrame {
    pub value: Value,
    pub matched: bool,
}

/// One active block `IF` frame (spec.md §9): where its `EndIf` lives, and
/// whether some branch has already been taken, so a later `ElseIf`/`Else`
/// reached by falling through a taken branch's body skips straight to the
/// end instead of re-entering.
#[derive(Debug, Clone)]
pub struct IfFrame {
    pub endif_pc: usize,
    pub taken: bool,
}

/// Saved caller bindings for one `SUB`/`FUNCTION` call, restored when its
/// `EndSub`/`EndFunction`/`Exit` pops (spec.md §4.F "parameter binding").
pub type ParamStash = (Vec<(String, Option<Value>)>, Vec<(String, String)>);

/// All mutable state a running program owns (spec.md §3 "Environment").
/// Owned entirely by one `Interpreter`; never shared across threads
/// (spec.md §5).
pub struct Environment {
    pub variables: HashMap<String, Value, RandomState>,
    pub arrays: HashMap<String, ArrayVar, RandomState>,
    pub constants: HashMap<String, Value, RandomState>,
    pub user_types: HashMap<String, Vec<TypeFieldDecl>>,
    pub records: HashMap<String, RecordInstance>,
    pub record_arrays: HashMap<String, RecordArray>,
    pub def_types: HashMap<char, DefKind>,
    pub user_functions: HashMap<String, UserFunction>,
    pub routines: HashMap<String, RoutineInfo>,
    pub labels: HashMap<String, usize>,
    pub labels_scanned: bool,

    pub gosub_return: Vec<usize>,
    pub for_loop_state: Vec<ForState>,
    pub while_loop_state: Vec<usize>,
    pub do_loop_state: Vec<usize>,
    pub select_case: Vec<SelectFrame>,
    pub if_stack: Vec<IfFrame>,
    pub sub_return: Vec<usize>,
    pub sub_param_bindings: Vec<ParamStash>,

    pub data_pool: Vec<Value>,
    /// `(line_number, pool_index)` for each `DATA` statement's first value,
    /// sorted ascending, used to resolve `RESTORE <line>` (spec.md §4.F).
    pub data_line_index: Vec<(u32, usize)>,
    pub data_cursor: usize,
    pub data_built: bool,

    pub rng: StdRng,

    pub error: ErrorState,

    pub files: FileTable,
    pub graphics: GraphicsState,
    /// `GET`/`PUT` graphics sprite buffers, keyed by the BASIC array name
    /// named in the statement (spec.md §4.D `copy_region`/`paste_region`
    /// wire format). Kept out-of-band from `arrays` because a sprite
    /// buffer is an opaque byte blob, not a `Value` array.
    pub sprite_buffers: HashMap<String, Vec<u8>>,

    pub print_column: usize,

    /// `DEF SEG` target; no-op beyond bookkeeping (no raw memory model).
    pub def_seg: Option<i64>,
}

impl Environment {
    pub fn new(deterministic_seed: Option<u64>) -> Self {
        let rng = match deterministic_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Environment {
            variables: HashMap::default(),
            arrays: HashMap::default(),
            constants: HashMap::default(),
            user_types: HashMap::new(),
            records: HashMap::new(),
            record_arrays: HashMap::new(),
            def_types: HashMap::new(),
            user_functions: HashMap::new(),
            routines: HashMap::new(),
            labels: HashMap::new(),
            labels_scanned: false,
            gosub_return: Vec::new(),
            for_loop_state: Vec::new(),
            while_loop_state: Vec::new(),
            do_loop_state: Vec::new(),
            select_case: Vec::new(),
            if_stack: Vec::new(),
            sub_return: Vec::new(),
            sub_param_bindings: Vec::new(),
            data_pool: Vec::new(),
            data_line_index: Vec::new(),
            data_cursor: 0,
            data_built: false,
            rng,
            error: ErrorState::default(),
            files: FileTable::new(),
            graphics: GraphicsState::default(),
            sprite_buffers: HashMap::new(),
            print_column: 0,
            def_seg: None,
        }
    }

    /// Reseeds `RND` from a fixed value (`RANDOMIZE n`) or from the clock
    /// (`RANDOMIZE TIMER`/bare `RANDOMIZE`, see spec.md §3).
    pub fn reseed(&mut self, seed: f64) {
        self.rng = StdRng::seed_from_u64(seed.to_bits());
    }

    pub fn reseed_nondeterministic(&mut self) {
        self.rng = StdRng::from_entropy();
    }

    pub fn next_random(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    /// `$` suffix, or else `DEFSTR`'s range for the name's first letter
    /// (spec.md §3 `def_types`).
    pub fn is_text_name(&self, name: &str) -> bool {
        if name.ends_with('$') {
            return true;
        }
        if name.ends_with(['%', '&', '!', '#']) {
            return false;
        }
        matches!(self.first_letter_kind(name), Some(DefKind::Str))
    }

    /// `%`/`&` suffix, or `DEFINT`/`DEFLNG`'s range for the name's first
    /// letter: numbers stored under these are rounded toward zero on store
    /// (spec.md §3 "integer-typed variables are rounded on store").
    pub fn is_integer_name(&self, name: &str) -> bool {
        if name.ends_with(['%', '&']) {
            return true;
        }
        if name.ends_with(['$', '!', '#']) {
            return false;
        }
        matches!(
            self.first_letter_kind(name),
            Some(DefKind::Integer) | Some(DefKind::Long)
        )
    }

    fn first_letter_kind(&self, name: &str) -> Option<DefKind> {
        let first = name.chars().next()?.to_ascii_uppercase();
        self.def_types.get(&first).copied()
    }

    pub fn default_value_for(&self, name: &str) -> Value {
        if self.is_text_name(name) {
            Value::empty_text()
        } else {
            Value::zero()
        }
    }

    /// Applies the `%`/`&`/`DEFINT`/`DEFLNG` truncate-toward-zero store
    /// rule (spec.md §3).
    pub fn coerce_for_store(&self, name: &str, value: Value) -> Value {
        match value {
            Value::Number(n) if self.is_integer_name(name) => Value::Number(n.trunc()),
            other => other,
        }
    }

    pub fn get_variable(&self, name: &str) -> Value {
        let key = name.to_ascii_uppercase();
        if let Some(v) = self.constants.get(&key) {
            return v.clone();
        }
        if let Some(v) = self.variables.get(&key) {
            return v.clone();
        }
        self.default_value_for(&key)
    }

    pub fn set_variable(&mut self, name: &str, value: Value) {
        let key = name.to_ascii_uppercase();
        let coerced = self.coerce_for_store(&key, value);
        self.variables.insert(key, coerced);
    }

    pub fn has_routine(&self, name: &str) -> bool {
        self.routines.contains_key(&name.to_ascii_uppercase())
    }

    pub fn has_user_function(&self, name: &str) -> bool {
        self.user_functions.contains_key(&name.to_ascii_uppercase())
    }

    pub fn has_array(&self, name: &str) -> bool {
        self.arrays.contains_key(&name.to_ascii_uppercase())
    }
}
