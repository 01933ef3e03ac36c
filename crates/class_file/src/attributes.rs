use std::fmt;

use crate::{stack_map::StackMapFrame, AccessFlags};

/// An attribute list of a class, field, method or `Code` attribute.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Attributes(pub Vec<AttributeInfo>);
impl Attributes {
    pub fn find_by_name(&self, name: &str) -> Option<&AttributeInfo> {
        self.0.iter().find(|a| a.name() == name)
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.0.iter().find_map(|a| match a {
            AttributeInfo::Code(code) => Some(code),
            _ => None,
        })
    }

    pub(crate) fn code_position(&self) -> Option<usize> {
        self.0
            .iter()
            .position(|a| matches!(a, AttributeInfo::Code(_)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeInfo> {
        self.0.iter()
    }
}
impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a AttributeInfo;
    type IntoIter = std::slice::Iter<'a, AttributeInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeInfo {
    ConstantValue(ConstantValueAttribute),
    Code(CodeAttribute),
    StackMapTable(Vec<StackMapFrame>),
    /// Class pool indices of the checked exceptions a method may throw.
    Exceptions(Vec<u16>),
    SourceFile { sourcefile_index: u16 },
    Signature { signature_index: u16 },
    LineNumberTable(Vec<LineNumber>),
    LocalVariableTable(Vec<LocalVariable>),
    InnerClasses(Vec<InnerClass>),
    NestHost { host_class_index: u16 },
    NestMembers(Vec<u16>),
    Deprecated,
    Synthetic,
    /// An attribute without a registered decoder, kept byte for byte.
    Unknown(UnknownAttribute),
}
impl AttributeInfo {
    pub fn name(&self) -> &str {
        match self {
            AttributeInfo::ConstantValue(_) => "ConstantValue",
            AttributeInfo::Code(_) => "Code",
            AttributeInfo::StackMapTable(_) => "StackMapTable",
            AttributeInfo::Exceptions(_) => "Exceptions",
            AttributeInfo::SourceFile { .. } => "SourceFile",
            AttributeInfo::Signature { .. } => "Signature",
            AttributeInfo::LineNumberTable(_) => "LineNumberTable",
            AttributeInfo::LocalVariableTable(_) => "LocalVariableTable",
            AttributeInfo::InnerClasses(_) => "InnerClasses",
            AttributeInfo::NestHost { .. } => "NestHost",
            AttributeInfo::NestMembers(_) => "NestMembers",
            AttributeInfo::Deprecated => "Deprecated",
            AttributeInfo::Synthetic => "Synthetic",
            AttributeInfo::Unknown(unknown) => &unknown.name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantValueAttribute {
    pub constantvalue_index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InnerClass {
    pub inner_class_info_index: u16,
    pub outer_class_info_index: u16,
    pub inner_name_index: u16,
    pub inner_class_access_flags: AccessFlags,
}

#[derive(Clone, PartialEq)]
pub struct UnknownAttribute {
    pub name: String,
    pub info: Vec<u8>,
}
impl fmt::Debug for UnknownAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnknownAttribute")
            .field("name", &self.name)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}

#[cfg(test)]
mod attributes_tests {
    use super::*;

    fn attributes() -> Attributes {
        Attributes(vec![
            AttributeInfo::Unknown(UnknownAttribute {
                name: "RuntimeVisibleAnnotations".into(),
                info: vec![0, 0],
            }),
            AttributeInfo::Code(CodeAttribute {
                max_stack: 1,
                max_locals: 1,
                code: vec![0xb1],
                exception_table: vec![],
                attributes: Attributes::default(),
            }),
        ])
    }

    #[test]
    fn it_should_find_known_and_unknown_attributes_by_name() {
        let attributes = attributes();

        assert!(matches!(
            attributes.find_by_name("RuntimeVisibleAnnotations"),
            Some(AttributeInfo::Unknown(_))
        ));
        assert!(matches!(
            attributes.find_by_name("Code"),
            Some(AttributeInfo::Code(_))
        ));
        assert_eq!(attributes.find_by_name("Signature"), None);
    }

    #[test]
    fn it_should_locate_the_code_attribute() {
        let attributes = attributes();

        assert_eq!(attributes.code_position(), Some(1));
        assert_eq!(attributes.code().map(|c| c.code.as_slice()), Some(&[0xb1][..]));
    }

    #[test]
    fn it_should_summarize_unknown_payloads_in_debug_output() {
        let unknown = UnknownAttribute {
            name: "Foo".into(),
            info: vec![1, 2, 3],
        };

        assert_eq!(
            format!("{unknown:?}"),
            r#"UnknownAttribute { name: "Foo", info: "(3 bytes)" }"#
        );
    }
}
