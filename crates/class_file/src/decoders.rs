use std::{collections::HashMap, fmt, io::Read};

use crate::{AttributeInfo, ConstantPool, Parser, Result};

/// Decodes the body of one attribute, after its name index and length.
///
/// The decoder receives the declared attribute length and must consume
/// exactly that many bytes from the parser.
pub type AttributeDecoder<R> = fn(&mut Parser<R>, &ConstantPool, u32) -> Result<AttributeInfo>;

/// Attribute decoders keyed by attribute name.
///
/// Attributes whose name has no decoder are kept as
/// [`AttributeInfo::Unknown`].
pub struct AttributeDecoders<R> {
    decoders: HashMap<String, AttributeDecoder<R>>,
}
impl<R: Read> AttributeDecoders<R> {
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, decoder: AttributeDecoder<R>) -> Self {
        self.decoders.insert(name.into(), decoder);
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.decoders.remove(name);
        self
    }

    pub fn get(&self, name: &str) -> Option<AttributeDecoder<R>> {
        self.decoders.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decoders.contains_key(name)
    }
}
impl<R: Read> Default for AttributeDecoders<R> {
    fn default() -> Self {
        Self::empty()
            .with("ConstantValue", Parser::parse_constant_value_attribute)
            .with("Code", Parser::parse_code_attribute)
            .with("StackMapTable", Parser::parse_stack_map_table_attribute)
            .with("Exceptions", Parser::parse_exceptions_attribute)
            .with("SourceFile", Parser::parse_source_file_attribute)
            .with("Signature", Parser::parse_signature_attribute)
            .with("LineNumberTable", Parser::parse_line_number_table_attribute)
            .with(
                "LocalVariableTable",
                Parser::parse_local_variable_table_attribute,
            )
            .with("InnerClasses", Parser::parse_inner_classes_attribute)
            .with("NestHost", Parser::parse_nest_host_attribute)
            .with("NestMembers", Parser::parse_nest_members_attribute)
            .with("Deprecated", Parser::parse_deprecated_attribute)
            .with("Synthetic", Parser::parse_synthetic_attribute)
    }
}
impl<R> Clone for AttributeDecoders<R> {
    fn clone(&self) -> Self {
        Self {
            decoders: self.decoders.clone(),
        }
    }
}
impl<R> fmt::Debug for AttributeDecoders<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.decoders.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("AttributeDecoders")
            .field("names", &names)
            .finish()
    }
}
