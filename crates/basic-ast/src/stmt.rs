//! Statement AST (spec.md §3 "Statement") — roughly 70 variants grouped as
//! assignment / control / I/O / data / graphics / sound, plus `Compound` for
//! colon-joined statements.
//!
//! Structured bodies (`SUB`/`FUNCTION`/`TYPE`, block `IF`, `SELECT CASE`,
//! `DO`/`LOOP`) are never nested as child statements here — per spec.md §9
//! ("Line-numbered structured code"), each block is a handful of marker
//! statements and the evaluator finds matching terminators by scanning the
//! line table with a nesting counter.

use crate::expr::{BinOp, Expression};

/// A jump target resolved by either line number or label name (spec.md §3,
/// `Goto`/`GotoLabel`, `Gosub`/`GosubLabel`, `OnGoto`, `Restore`).
#[derive(Debug, Clone, PartialEq)]
pub enum JumpTarget {
    Line(u32),
    Label(String),
}

/// An assignable location: a bare variable, an array element, or a
/// dotted field of a user-type instance (possibly nested, `a.b.c`).
#[derive(Debug, Clone, PartialEq)]
pub enum LValue {
    Variable(String),
    Index(String, Vec<Expression>),
    Field(Box<LValue>, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitScope {
    For,
    Do,
    Sub,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoKind {
    While,
    Until,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OnErrorTarget {
    Goto(JumpTarget),
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeKind {
    Same,
    Next,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Input,
    Output,
    Append,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterOp {
    Pset,
    Preset,
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub width: Expression,
    pub var: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimDecl {
    pub name: String,
    pub dims: Vec<Expression>,
    pub as_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeFieldDecl {
    pub field_name: String,
    pub type_name: String,
    pub string_width: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub is_array: bool,
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintSep {
    Semicolon,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintItem {
    Expr(Expression),
    Sep(PrintSep),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaseClause {
    Value(Expression),
    Range(Expression, Expression),
    Is(BinOp, Expression),
}

/// Whether a block `If`'s `then` branch is a single inline statement or the
/// multi-line form (spec.md §4.C, §4.F: a `Then` immediately followed by
/// end-of-line signals the block form).
#[derive(Debug, Clone, PartialEq)]
pub enum ThenBranch {
    Inline(Box<Statement>),
    Block,
}

/// A 2-D point used by graphics statements, with `step` marking relative
/// (`STEP(dx,dy)`) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: Expression,
    pub y: Expression,
    pub step: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Empty,
    Label(String),

    // Assignment
    Let {
        target: LValue,
        value: Expression,
    },

    // Control flow
    Goto(JumpTarget),
    Gosub(JumpTarget),
    Return,
    If {
        condition: Expression,
        then: ThenBranch,
        else_branch: Option<Box<Statement>>,
    },
    ElseIf(Expression),
    Else,
    EndIf,
    For {
        var: String,
        start: Expression,
        end: Expression,
        step: Option<Expression>,
    },
    Next(Option<String>),
    While(Expression),
    Wend,
    Do {
        cond: Option<Expression>,
        kind: Option<DoKind>,
    },
    Loop {
        cond: Option<Expression>,
        kind: Option<DoKind>,
    },
    Exit(ExitScope),
    End,
    Stop,
    OnGoto {
        selector: Expression,
        targets: Vec<JumpTarget>,
        is_gosub: bool,
    },
    OnError(OnErrorTarget),
    Resume {
        kind: ResumeKind,
        target: Option<JumpTarget>,
    },
    Sleep(Option<Expression>),
    Randomize(Option<Expression>),

    SelectCase(Expression),
    Case(Vec<CaseClause>),
    CaseElse,
    EndSelect,

    // I/O
    Print(Vec<PrintItem>),
    PrintFile {
        file_num: Expression,
        items: Vec<PrintItem>,
    },
    PrintUsing {
        file_num: Option<Expression>,
        format: Expression,
        items: Vec<Expression>,
    },
    Input {
        prompt: Option<String>,
        targets: Vec<LValue>,
    },
    LineInput {
        file_num: Option<Expression>,
        prompt: Option<String>,
        target: LValue,
    },
    Open {
        path: Expression,
        mode: OpenMode,
        file_num: Expression,
        record_len: Option<Expression>,
    },
    Close(Vec<Expression>),
    Write {
        file_num: Option<Expression>,
        items: Vec<Expression>,
    },
    Field {
        file_num: Expression,
        fields: Vec<FieldSpec>,
    },
    GetRecord {
        file_num: Expression,
        record: Option<Expression>,
    },
    PutRecord {
        file_num: Expression,
        record: Option<Expression>,
    },
    Lset {
        target: LValue,
        value: Expression,
    },
    Rset {
        target: LValue,
        value: Expression,
    },
    Kill(Expression),
    Name {
        old: Expression,
        new: Expression,
    },
    Files(Option<Expression>),

    // Data
    Dim(Vec<DimDecl>),
    Redim {
        preserve: bool,
        decls: Vec<DimDecl>,
    },
    Data(String),
    Read(Vec<LValue>),
    Restore(Option<JumpTarget>),
    Swap(LValue, LValue),
    Const {
        name: String,
        value: Expression,
    },
    Type(String),
    TypeField(TypeFieldDecl),
    EndType,
    DefType {
        first: char,
        last: char,
        basic_type: String,
    },
    DefFn {
        name: String,
        params: Vec<String>,
        body: Expression,
    },
    Declare {
        name: String,
        is_function: bool,
        params: Vec<ParamDecl>,
    },
    Sub {
        name: String,
        params: Vec<ParamDecl>,
    },
    EndSub,
    Function {
        name: String,
        params: Vec<ParamDecl>,
    },
    EndFunction,
    CallSub {
        name: String,
        args: Vec<Expression>,
    },

    // Graphics
    Cls,
    Screen {
        mode: Expression,
        active_page: Option<Expression>,
        visual_page: Option<Expression>,
    },
    Color {
        foreground: Option<Expression>,
        background: Option<Expression>,
        border: Option<Expression>,
    },
    Locate {
        row: Option<Expression>,
        col: Option<Expression>,
    },
    Pset {
        point: Point,
        color: Option<Expression>,
    },
    Preset {
        point: Point,
        color: Option<Expression>,
    },
    Line {
        p1: Option<Point>,
        p2: Point,
        color: Option<Expression>,
        is_box: bool,
        filled: bool,
    },
    Circle {
        center: Point,
        radius: Expression,
        color: Option<Expression>,
        start: Option<Expression>,
        end: Option<Expression>,
        aspect: Option<Expression>,
    },
    Paint {
        point: Point,
        fill_color: Option<Expression>,
        border_color: Option<Expression>,
    },
    Draw(Expression),
    Palette {
        index: Option<Expression>,
        color: Option<Expression>,
    },
    GetGraphics {
        p1: Point,
        p2: Point,
        array: String,
    },
    PutGraphics {
        point: Point,
        array: String,
        action: Option<RasterOp>,
    },

    // Sound
    Beep,
    Sound {
        frequency: Expression,
        duration: Expression,
    },
    Play(Expression),

    Compound(Vec<Statement>),
}
