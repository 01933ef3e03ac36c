use std::io::Read;

use crate::{
    attributes::{CodeAttribute, ConstantValueAttribute},
    parser::Parser,
    AccessFlags, AttributeInfo, Attributes, ConstantPool, Result,
};

/// A decoded class file. Nothing in it changes after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub magic: u32,
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
}
impl ClassFile {
    pub fn parse(bytes: impl Read) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn super_class(&self) -> Result<Option<&str>> {
        // If the value of the super_class item is zero, then this class file must represent the class Object,
        // the only class or interface without a direct superclass.
        if self.super_class == 0 {
            return Ok(None);
        }

        // Otherwise the constant_pool entry at that index must be a CONSTANT_Class_info structure
        // representing the direct superclass of the class defined by this class file.
        Ok(Some(self.constant_pool.class_name(self.super_class)?))
    }

    pub fn class_name(&self) -> Result<&str> {
        // The value of the this_class item must be a valid index into the constant_pool table.
        // The constant_pool entry at that index must be a CONSTANT_Class_info structure
        // representing the class or interface defined by this class file.
        self.constant_pool.class_name(self.this_class)
    }

    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|&index| self.constant_pool.class_name(index))
            .collect()
    }

    pub fn field_name(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.utf8(field.name_index)
    }

    pub fn field_descriptor(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.utf8(field.descriptor_index)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.utf8(method.name_index)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.utf8(method.descriptor_index)
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    /// The name recorded by the `SourceFile` attribute, if there is one.
    pub fn source_file(&self) -> Result<Option<&str>> {
        self.attributes
            .iter()
            .find_map(|a| match a {
                AttributeInfo::SourceFile { sourcefile_index } => Some(*sourcefile_index),
                _ => None,
            })
            .map(|index| self.constant_pool.utf8(index))
            .transpose()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}
impl FieldInfo {
    pub fn constant_value(&self) -> Option<&ConstantValueAttribute> {
        self.attributes.iter().find_map(|a| match a {
            AttributeInfo::ConstantValue(constant_value) => Some(constant_value),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub name: String,
    pub descriptor: String,
    pub attributes: Attributes,
    pub(crate) code_index: Option<usize>,
}
impl MethodInfo {
    /// The `Code` attribute, absent for abstract and native methods.
    pub fn code(&self) -> Option<&CodeAttribute> {
        match self.attributes.0.get(self.code_index?)? {
            AttributeInfo::Code(code) => Some(code),
            _ => None,
        }
    }
}
