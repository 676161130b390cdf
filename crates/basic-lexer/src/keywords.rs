//! Closed reserved-word table, matched case-insensitively (spec.md §4.A).

use basic_ast::TokenKind;

pub fn lookup(word: &str) -> Option<TokenKind> {
    let upper = word.to_ascii_uppercase();
    let kind = match upper.as_str() {
        "GOTO" => TokenKind::Goto,
        "GOSUB" => TokenKind::Gosub,
        "RETURN" => TokenKind::Return,
        "IF" => TokenKind::If,
        "THEN" => TokenKind::Then,
        "ELSE" => TokenKind::Else,
        "ELSEIF" => TokenKind::ElseIf,
        "ENDIF" => TokenKind::EndIf,
        "FOR" => TokenKind::For,
        "TO" => TokenKind::To,
        "STEP" => TokenKind::Step,
        "NEXT" => TokenKind::Next,
        "WHILE" => TokenKind::While,
        "WEND" => TokenKind::Wend,
        "DO" => TokenKind::Do,
        "LOOP" => TokenKind::Loop,
        "UNTIL" => TokenKind::Until,
        "EXIT" => TokenKind::Exit,
        "END" => TokenKind::End,
        "STOP" => TokenKind::Stop,
        "ON" => TokenKind::On,
        "ERROR" => TokenKind::Error,
        "RESUME" => TokenKind::Resume,
        "SLEEP" => TokenKind::Sleep,
        "RANDOMIZE" => TokenKind::Randomize,
        "SELECT" => TokenKind::Select,
        "CASE" => TokenKind::Case,
        "IS" => TokenKind::Is,
        "DIM" => TokenKind::Dim,
        "REDIM" => TokenKind::Redim,
        "PRESERVE" => TokenKind::Preserve,
        "AS" => TokenKind::As,
        "SHARED" => TokenKind::Shared,
        "CONST" => TokenKind::Const,
        "TYPE" => TokenKind::Type,
        "DEF" | "DEFFN" => TokenKind::Def,
        "DEFINT" | "DEFLNG" | "DEFSNG" | "DEFDBL" | "DEFSTR" => TokenKind::DefType,
        "FN" => TokenKind::Fn,
        "DECLARE" => TokenKind::Declare,
        "SUB" => TokenKind::Sub,
        "FUNCTION" => TokenKind::Function,
        "CALL" => TokenKind::Call,
        "DATA" => TokenKind::Data,
        "READ" => TokenKind::Read,
        "RESTORE" => TokenKind::Restore,
        "SWAP" => TokenKind::Swap,
        "LET" => TokenKind::Let,
        "PRINT" => TokenKind::Print,
        "USING" => TokenKind::Using,
        "INPUT" => TokenKind::Input,
        "LINE" => TokenKind::Line,
        "OPEN" => TokenKind::Open,
        "CLOSE" => TokenKind::Close,
        "OUTPUT" => TokenKind::Output,
        "APPEND" => TokenKind::Append,
        "RANDOM" => TokenKind::Random,
        "GET" => TokenKind::Get,
        "PUT" => TokenKind::Put,
        "FIELD" => TokenKind::Field,
        "LSET" => TokenKind::Lset,
        "RSET" => TokenKind::Rset,
        "KILL" => TokenKind::Kill,
        "NAME" => TokenKind::Name,
        "FILES" => TokenKind::Files,
        "WRITE" => TokenKind::Write,
        "CLS" => TokenKind::Cls,
        "SCREEN" => TokenKind::Screen,
        "COLOR" => TokenKind::Color,
        "LOCATE" => TokenKind::Locate,
        "PSET" | "PRESET" => TokenKind::Pset,
        "CIRCLE" => TokenKind::Circle,
        "PAINT" => TokenKind::Paint,
        "DRAW" => TokenKind::Draw,
        "PALETTE" => TokenKind::Palette,
        "B" | "BF" => return None, // handled as identifiers in the LINE ,B/,BF tail
        "BEEP" => TokenKind::Beep,
        "SOUND" => TokenKind::Sound,
        "PLAY" => TokenKind::Play,
        "AND" => TokenKind::And,
        "OR" => TokenKind::Or,
        "NOT" => TokenKind::Not,
        "XOR" => TokenKind::Xor,
        "EQV" => TokenKind::Eqv,
        "IMP" => TokenKind::Imp,
        "MOD" => TokenKind::Mod,
        "REM" => TokenKind::Rem,
        _ => return None,
    };
    Some(kind)
}
