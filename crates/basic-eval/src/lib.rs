//! Tree-walking evaluator (spec.md §4.F, component F): owns a `Program`,
//! an `Environment`, and the host's `Console`/`Display` collaborators, and
//! drives execution either to completion or in cooperative chunks
//! (spec.md §5 "Concurrency & resource model").
//!
//! Mirrors the teacher's `core-state`/driver split: `Environment` is the
//! plain-data state struct, `Interpreter` is the thing that steps it
//! forward one statement at a time.

pub mod array;
pub mod builtins;
pub mod dispatch;
pub mod environment;
pub mod expr;
pub mod format;
pub mod record;

use basic_ast::{InterpreterError, JumpTarget, Program, RuntimeErrorKind};
use basic_collab::{Console, Display};
use basic_config::RuntimeConfig;
use basic_graphics::GraphicsState;
use tracing::{debug, warn};

use environment::Environment;

/// Everything needed to step a loaded program forward (spec.md §4.F).
pub struct Interpreter {
    pub program: Program,
    pub env: Environment,
    pub console: Box<dyn Console>,
    pub display: Box<dyn Display>,
    pub pc: usize,
    /// Set by any statement that redirects control flow; consulted once
    /// after the statement returns, then cleared (spec.md §4.F "Execute").
    next_pc: Option<usize>,
    pub end_program: bool,
    pub cancel_requested: bool,
    pub chunk_size: u32,
}

impl Interpreter {
    pub fn new(
        program: Program,
        console: Box<dyn Console>,
        display: Box<dyn Display>,
        config: &RuntimeConfig,
    ) -> Self {
        let mut env = Environment::new(if config.deterministic_randomize {
            Some(0)
        } else {
            None
        });
        env.graphics = GraphicsState::new(config.default_screen_mode);
        let mut interp = Interpreter {
            program,
            env,
            console,
            display,
            pc: 0,
            next_pc: None,
            end_program: false,
            cancel_requested: false,
            chunk_size: config.chunk_size.max(1),
        };
        interp.prescan_program();
        interp
    }

    /// Parses `source` and builds a ready-to-run `Interpreter` (spec.md §4.C
    /// + §4.F combined, the `Execute` entry point's first half).
    pub fn initialize(
        source: &str,
        console: Box<dyn Console>,
        display: Box<dyn Display>,
        config: &RuntimeConfig,
    ) -> Result<Self, InterpreterError> {
        let program = basic_parser::parse_program(source)?;
        Ok(Self::new(program, console, display, config))
    }

    /// `SUB`/`FUNCTION` headers and the `DATA` pool must be known before the
    /// first statement runs, since a program can `GOSUB`/call forward to a
    /// routine defined later in the line table, and `READ` must see every
    /// `DATA` value regardless of where execution currently is (spec.md §3
    /// `data_pool`, §4.F "forward references resolve").
    fn prescan_program(&mut self) {
        let mut current_type: Option<String> = None;
        for (pc, line) in self.program.iter().enumerate().collect::<Vec<_>>() {
            match &line.statement {
                basic_ast::Statement::Sub { name, params } => {
                    self.env.routines.insert(
                        name.to_ascii_uppercase(),
                        environment::RoutineInfo {
                            start_pc: pc,
                            params: params.clone(),
                            is_function: false,
                        },
                    );
                }
                basic_ast::Statement::Function { name, params } => {
                    self.env.routines.insert(
                        name.to_ascii_uppercase(),
                        environment::RoutineInfo {
                            start_pc: pc,
                            params: params.clone(),
                            is_function: true,
                        },
                    );
                }
                basic_ast::Statement::Type(name) => {
                    let key = name.to_ascii_uppercase();
                    self.env.user_types.entry(key.clone()).or_default();
                    current_type = Some(key);
                }
                basic_ast::Statement::TypeField(decl) => {
                    if let Some(key) = &current_type {
                        self.env.user_types.entry(key.clone()).or_default().push(decl.clone());
                    }
                }
                basic_ast::Statement::EndType => current_type = None,
                _ => {}
            }
        }
        dispatch::data::build_data_pool(self);
    }

    fn ensure_labels_scanned(&mut self) {
        if self.env.labels_scanned {
            return;
        }
        for (pc, line) in self.program.iter().enumerate().collect::<Vec<_>>() {
            if let basic_ast::Statement::Label(name) = &line.statement {
                self.env.labels.insert(name.to_ascii_uppercase(), pc);
            }
        }
        self.env.labels_scanned = true;
    }

    /// Resolves a `Goto`/`Gosub`/`OnGoto`/`Restore` target to a line-table
    /// index (spec.md §3 `JumpTarget`).
    pub(crate) fn resolve_jump(
        &mut self,
        target: &JumpTarget,
        line: u32,
    ) -> Result<usize, InterpreterError> {
        match target {
            JumpTarget::Line(n) => self
                .program
                .index_of(*n)
                .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::UndefinedLineNumber, line)),
            JumpTarget::Label(name) => {
                self.ensure_labels_scanned();
                self.env
                    .labels
                    .get(&name.to_ascii_uppercase())
                    .copied()
                    .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::UndefinedLineNumber, line))
            }
        }
    }

    pub(crate) fn set_next_pc(&mut self, idx: usize) {
        self.next_pc = Some(idx);
    }

    /// Whether the statement just executed already redirected control flow
    /// (a jump, a loop back-edge, a call) — `Compound` uses this to stop
    /// running the rest of a colon-joined line once one of its statements
    /// jumps away (spec.md §9 "Line-numbered structured code").
    pub(crate) fn control_transferred(&self) -> bool {
        self.next_pc.is_some() || self.end_program
    }

    pub fn request_cancel(&mut self) {
        self.cancel_requested = true;
    }

    pub fn finished(&self) -> bool {
        self.end_program || self.pc >= self.program.len()
    }

    /// Blocking run to completion (spec.md §5 `Execute`).
    pub fn run(&mut self) -> Result<(), InterpreterError> {
        while self.step()? {}
        Ok(())
    }

    /// Cooperative step budget (spec.md §5 `ExecuteChunk`): runs up to
    /// `max_statements`, returns whether the program has more work left.
    pub fn execute_chunk(&mut self, max_statements: u32) -> Result<bool, InterpreterError> {
        for _ in 0..max_statements {
            if !self.step()? {
                return Ok(false);
            }
        }
        Ok(!self.finished())
    }

    /// Cooperative run yielding to the host every `chunk_size` statements
    /// (spec.md §5 `RunAsync`).
    pub fn run_async(&mut self, mut yield_hook: impl FnMut(&mut Interpreter)) -> Result<(), InterpreterError> {
        let mut count = 0u32;
        loop {
            if !self.step()? {
                break;
            }
            count += 1;
            if count >= self.chunk_size {
                count = 0;
                yield_hook(self);
            }
        }
        Ok(())
    }

    /// Closes open files and rewinds to the first line, as happens between
    /// runs in a host REPL (spec.md §5 "Reset").
    pub fn reset(&mut self) {
        self.env.files.close_all();
        self.pc = 0;
        self.end_program = false;
        self.next_pc = None;
        self.cancel_requested = false;
        self.env.error = environment::ErrorState::default();
    }

    /// Runs exactly one statement, advancing `pc` according to whatever it
    /// set in `next_pc`, and applies `ON ERROR`/cancellation semantics
    /// (spec.md §4.F "Execute", §7 "Error handling design").
    pub(crate) fn step(&mut self) -> Result<bool, InterpreterError> {
        if self.cancel_requested {
            self.console.write_line(Some("Break"));
            self.end_program = true;
            self.cancel_requested = false;
            return Ok(false);
        }
        if self.end_program || self.pc >= self.program.len() {
            return Ok(false);
        }
        self.next_pc = None;
        let line = self.program.get(self.pc).cloned().expect("pc in bounds");
        match dispatch::execute_statement(self, &line.statement, line.number) {
            Ok(()) => {}
            Err(InterpreterError::Break) => {
                self.console.write_line(Some("Break"));
                self.end_program = true;
                return Ok(false);
            }
            Err(e) => {
                if let (Some(handler_pc), false) = (self.env.error.handler_pc, self.env.error.in_handler) {
                    debug!(code = e.code(), line = e.line(), "on_error_trap");
                    self.env.error.last_error_code = e.code();
                    self.env.error.last_error_line = e.line();
                    self.env.error.resume_pc = Some(self.pc);
                    self.env.error.in_handler = true;
                    self.pc = handler_pc;
                    return Ok(true);
                }
                warn!(code = e.code(), line = e.line(), "unhandled_runtime_error");
                self.console.write_line(Some(&format!("?{e}")));
                self.end_program = true;
                return Err(e);
            }
        }
        if let Some(idx) = self.next_pc.take() {
            self.pc = idx;
        } else {
            self.pc += 1;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basic_collab::{NoopConsole, NoopDisplay};

    #[test]
    fn straight_line_program_runs_to_completion() {
        let mut interp = Interpreter::initialize(
            "10 LET A = 1\n20 LET B = A + 1\n30 END\n",
            Box::new(NoopConsole::default()),
            Box::new(NoopDisplay::default()),
            &RuntimeConfig::default(),
        )
        .unwrap();
        interp.run().unwrap();
        assert_eq!(interp.env.get_variable("B"), basic_ast::Value::Number(2.0));
    }

    #[test]
    fn for_next_counts_the_expected_number_of_iterations() {
        let mut interp = Interpreter::initialize(
            "10 FOR I = 1 TO 3\n20 LET N = N + 1\n30 NEXT I\n40 END\n",
            Box::new(NoopConsole::default()),
            Box::new(NoopDisplay::default()),
            &RuntimeConfig::default(),
        )
        .unwrap();
        interp.run().unwrap();
        assert_eq!(interp.env.get_variable("N"), basic_ast::Value::Number(3.0));
    }

    #[test]
    fn division_by_zero_is_fatal_without_a_handler() {
        let mut interp = Interpreter::initialize(
            "10 LET A = 1 / 0\n20 END\n",
            Box::new(NoopConsole::default()),
            Box::new(NoopDisplay::default()),
            &RuntimeConfig::default(),
        )
        .unwrap();
        let err = interp.run().unwrap_err();
        assert_eq!(err.code(), basic_ast::RuntimeErrorKind::DivisionByZero.code());
    }

    #[test]
    fn on_error_goto_traps_and_resume_next_continues_after_the_fault() {
        let mut interp = Interpreter::initialize(
            "10 ON ERROR GOTO 100\n20 A=1/0\n30 LET B = 42\n40 END\n100 LET C = ERR\n110 RESUME NEXT\n",
            Box::new(NoopConsole::default()),
            Box::new(NoopDisplay::default()),
            &RuntimeConfig::default(),
        )
        .unwrap();
        interp.run().unwrap();
        assert_eq!(interp.env.get_variable("B"), basic_ast::Value::Number(42.0));
        assert_eq!(
            interp.env.get_variable("C"),
            basic_ast::Value::Number(basic_ast::RuntimeErrorKind::DivisionByZero.code() as f64)
        );
    }

    #[test]
    fn rem_keyword_comment_is_skipped_like_apostrophe() {
        let mut interp = Interpreter::initialize(
            "10 LET A = 1 REM this whole tail should vanish\n20 END\n",
            Box::new(NoopConsole::default()),
            Box::new(NoopDisplay::default()),
            &RuntimeConfig::default(),
        )
        .unwrap();
        interp.run().unwrap();
        assert_eq!(interp.env.get_variable("A"), basic_ast::Value::Number(1.0));
    }

    #[test]
    fn next_with_mismatched_variable_name_is_fatal() {
        let mut interp = Interpreter::initialize(
            "10 FOR X = 1 TO 3\n20 FOR Y = 1 TO 3\n30 NEXT X\n40 NEXT Y\n50 END\n",
            Box::new(NoopConsole::default()),
            Box::new(NoopDisplay::default()),
            &RuntimeConfig::default(),
        )
        .unwrap();
        let err = interp.run().unwrap_err();
        assert_eq!(err.code(), basic_ast::RuntimeErrorKind::NextWithoutFor.code());
    }

    #[test]
    fn next_with_matching_variable_name_closes_the_innermost_loop() {
        let mut interp = Interpreter::initialize(
            "10 FOR X = 1 TO 2\n20 FOR Y = 1 TO 2\n30 LET N = N + 1\n40 NEXT Y\n50 NEXT X\n60 END\n",
            Box::new(NoopConsole::default()),
            Box::new(NoopDisplay::default()),
            &RuntimeConfig::default(),
        )
        .unwrap();
        interp.run().unwrap();
        assert_eq!(interp.env.get_variable("N"), basic_ast::Value::Number(4.0));
    }

    #[test]
    fn hex_and_oct_builtins_render_without_creating_phantom_arrays() {
        let mut interp = Interpreter::initialize(
            "10 LET A$ = HEX$(255)\n20 LET B$ = OCT$(8)\n30 END\n",
            Box::new(NoopConsole::default()),
            Box::new(NoopDisplay::default()),
            &RuntimeConfig::default(),
        )
        .unwrap();
        interp.run().unwrap();
        assert_eq!(interp.env.get_variable("A$"), basic_ast::Value::Text("FF".into()));
        assert_eq!(interp.env.get_variable("B$"), basic_ast::Value::Text("10".into()));
    }

    #[test]
    fn mk_and_cv_builtins_round_trip_through_the_packed_byte_string() {
        let mut interp = Interpreter::initialize(
            "10 LET S$ = MKI$(1234)\n20 LET N = CVI(S$)\n30 END\n",
            Box::new(NoopConsole::default()),
            Box::new(NoopDisplay::default()),
            &RuntimeConfig::default(),
        )
        .unwrap();
        interp.run().unwrap();
        assert_eq!(interp.env.get_variable("N"), basic_ast::Value::Number(1234.0));
    }
}
