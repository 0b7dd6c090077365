use crate::script::ScriptBuilder;
use declgen_model::{Class, Enum, EnumValue, Property};

/// Hook for writing documentation comments ahead of declarations
///
/// Every method defaults to doing nothing, so implementors only override the
/// points they have documentation for.
pub trait DocAppender: Send + Sync {
    fn append_class_doc(&self, _sb: &mut ScriptBuilder, _class: &Class, _type_name: &str) {}

    fn append_enum_doc(&self, _sb: &mut ScriptBuilder, _enumeration: &Enum, _type_name: &str) {}

    fn append_property_doc(
        &self,
        _sb: &mut ScriptBuilder,
        _property: &Property,
        _property_name: &str,
        _property_type: &str,
    ) {
    }

    fn append_enum_value_doc(&self, _sb: &mut ScriptBuilder, _value: &EnumValue) {}
}

/// Default appender that writes nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDocAppender;

impl DocAppender for NullDocAppender {}
