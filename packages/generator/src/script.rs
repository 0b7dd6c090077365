use std::ops::{Deref, DerefMut};

/// Text accumulator with scoped indentation
///
/// Indentation is only raised through [`ScriptBuilder::indent`], which hands
/// out a guard that restores the previous level when it goes out of scope.
#[derive(Debug, Clone)]
pub struct ScriptBuilder {
    buffer: String,
    indentation: String,
    indent_level: usize,
}

impl ScriptBuilder {
    pub fn new(indentation: impl Into<String>) -> Self {
        Self {
            buffer: String::new(),
            indentation: indentation.into(),
            indent_level: 0,
        }
    }

    pub fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn add_line(&mut self, text: &str) {
        self.add_indented(text);
        self.buffer.push('\n');
    }

    pub fn add_indented(&mut self, text: &str) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(&self.indentation);
        }
        self.buffer.push_str(text);
    }

    /// Raise the indentation level until the returned guard is dropped
    pub fn indent(&mut self) -> Indented<'_> {
        self.indent_level += 1;
        Indented { builder: self }
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn get_output(&self) -> &str {
        &self.buffer
    }

    pub fn into_output(self) -> String {
        self.buffer
    }
}

/// One level of indentation, released on drop
pub struct Indented<'a> {
    builder: &'a mut ScriptBuilder,
}

impl Deref for Indented<'_> {
    type Target = ScriptBuilder;

    fn deref(&self) -> &ScriptBuilder {
        self.builder
    }
}

impl DerefMut for Indented<'_> {
    fn deref_mut(&mut self) -> &mut ScriptBuilder {
        self.builder
    }
}

impl Drop for Indented<'_> {
    fn drop(&mut self) {
        self.builder.indent_level -= 1;
    }
}
