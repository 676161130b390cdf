//! `TYPE`/`END TYPE` record instances (spec.md §3 `user_types`, §4.F
//! `Dim a AS t`).
//!
//! Fields are scalar `Value`s only — classic `TYPE` blocks nest records by
//! naming another type for a field, but this core keeps fields flat
//! (numeric or fixed-width string), matching the subset DESIGN.md records
//! as implemented.

use std::collections::HashMap;

use basic_ast::{TypeFieldDecl, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordInstance {
    fields: HashMap<String, Value>,
}

impl RecordInstance {
    pub fn new(decl: &[TypeFieldDecl]) -> Self {
        let mut fields = HashMap::new();
        for f in decl {
            let default = Value::default_for_name(&f.field_name);
            fields.insert(f.field_name.to_ascii_uppercase(), default);
        }
        RecordInstance { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(&field.to_ascii_uppercase())
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_ascii_uppercase(), value);
    }
}
