use std::io::Read;

use log::trace;

use crate::{
    attributes::{
        CodeAttribute, ConstantValueAttribute, ExceptionTableEntry, InnerClass, LineNumber,
        LocalVariable,
    },
    AccessFlags, AttributeInfo, ConstantPool, Parser, Result,
};

impl<R: Read> Parser<R> {
    pub(crate) fn parse_constant_value_attribute(
        &mut self,
        _constant_pool: &ConstantPool,
        _length: u32,
    ) -> Result<AttributeInfo> {
        let constantvalue_index = self.read_u16()?;

        Ok(AttributeInfo::ConstantValue(ConstantValueAttribute {
            constantvalue_index,
        }))
    }

    pub(crate) fn parse_code_attribute(
        &mut self,
        constant_pool: &ConstantPool,
        _length: u32,
    ) -> Result<AttributeInfo> {
        let max_stack = self.read_u16()?;
        let max_locals = self.read_u16()?;
        let code_length = self.read_u32()?;
        let code = self.read_bytes(code_length as usize)?;
        let exception_table_length = self.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry())
            .collect::<Result<Vec<_>>>()?;
        trace!("parsing attributes of {code_length} byte(s) of code");
        let attributes = self.parse_attributes(constant_pool)?;

        Ok(AttributeInfo::Code(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        }))
    }

    fn parse_exception_table_entry(&mut self) -> Result<ExceptionTableEntry> {
        let start_pc = self.read_u16()?;
        let end_pc = self.read_u16()?;
        let handler_pc = self.read_u16()?;
        let catch_type = self.read_u16()?;

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    pub(crate) fn parse_exceptions_attribute(
        &mut self,
        _constant_pool: &ConstantPool,
        _length: u32,
    ) -> Result<AttributeInfo> {
        Ok(AttributeInfo::Exceptions(self.parse_u16_table()?))
    }

    pub(crate) fn parse_source_file_attribute(
        &mut self,
        _constant_pool: &ConstantPool,
        _length: u32,
    ) -> Result<AttributeInfo> {
        let sourcefile_index = self.read_u16()?;

        Ok(AttributeInfo::SourceFile { sourcefile_index })
    }

    pub(crate) fn parse_signature_attribute(
        &mut self,
        _constant_pool: &ConstantPool,
        _length: u32,
    ) -> Result<AttributeInfo> {
        let signature_index = self.read_u16()?;

        Ok(AttributeInfo::Signature { signature_index })
    }

    pub(crate) fn parse_line_number_table_attribute(
        &mut self,
        _constant_pool: &ConstantPool,
        _length: u32,
    ) -> Result<AttributeInfo> {
        let line_number_table_length = self.read_u16()?;
        let line_number_table = (0..line_number_table_length)
            .map(|_| self.parse_line_number())
            .collect::<Result<Vec<_>>>()?;

        Ok(AttributeInfo::LineNumberTable(line_number_table))
    }

    fn parse_line_number(&mut self) -> Result<LineNumber> {
        let start_pc = self.read_u16()?;
        let line_number = self.read_u16()?;

        Ok(LineNumber {
            start_pc,
            line_number,
        })
    }

    pub(crate) fn parse_local_variable_table_attribute(
        &mut self,
        _constant_pool: &ConstantPool,
        _length: u32,
    ) -> Result<AttributeInfo> {
        let local_variable_table_length = self.read_u16()?;
        let local_variable_table = (0..local_variable_table_length)
            .map(|_| self.parse_local_variable())
            .collect::<Result<Vec<_>>>()?;

        Ok(AttributeInfo::LocalVariableTable(local_variable_table))
    }

    fn parse_local_variable(&mut self) -> Result<LocalVariable> {
        let start_pc = self.read_u16()?;
        let length = self.read_u16()?;
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let index = self.read_u16()?;

        Ok(LocalVariable {
            start_pc,
            length,
            name_index,
            descriptor_index,
            index,
        })
    }

    pub(crate) fn parse_inner_classes_attribute(
        &mut self,
        _constant_pool: &ConstantPool,
        _length: u32,
    ) -> Result<AttributeInfo> {
        let number_of_classes = self.read_u16()?;
        let classes = (0..number_of_classes)
            .map(|_| self.parse_inner_class())
            .collect::<Result<Vec<_>>>()?;

        Ok(AttributeInfo::InnerClasses(classes))
    }

    fn parse_inner_class(&mut self) -> Result<InnerClass> {
        let inner_class_info_index = self.read_u16()?;
        let outer_class_info_index = self.read_u16()?;
        let inner_name_index = self.read_u16()?;
        let inner_class_access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);

        Ok(InnerClass {
            inner_class_info_index,
            outer_class_info_index,
            inner_name_index,
            inner_class_access_flags,
        })
    }

    pub(crate) fn parse_nest_host_attribute(
        &mut self,
        _constant_pool: &ConstantPool,
        _length: u32,
    ) -> Result<AttributeInfo> {
        let host_class_index = self.read_u16()?;

        Ok(AttributeInfo::NestHost { host_class_index })
    }

    pub(crate) fn parse_nest_members_attribute(
        &mut self,
        _constant_pool: &ConstantPool,
        _length: u32,
    ) -> Result<AttributeInfo> {
        Ok(AttributeInfo::NestMembers(self.parse_u16_table()?))
    }

    pub(crate) fn parse_deprecated_attribute(
        &mut self,
        _constant_pool: &ConstantPool,
        length: u32,
    ) -> Result<AttributeInfo> {
        // Markers carry no data, but a nonzero length is still skipped.
        self.read_bytes(length as usize)?;
        Ok(AttributeInfo::Deprecated)
    }

    pub(crate) fn parse_synthetic_attribute(
        &mut self,
        _constant_pool: &ConstantPool,
        length: u32,
    ) -> Result<AttributeInfo> {
        // Markers carry no data, but a nonzero length is still skipped.
        self.read_bytes(length as usize)?;
        Ok(AttributeInfo::Synthetic)
    }

    fn parse_u16_table(&mut self) -> Result<Vec<u16>> {
        let length = self.read_u16()?;
        (0..length).map(|_| self.read_u16()).collect()
    }
}

#[cfg(test)]
mod parse_attribute_tests {
    use std::io::Cursor;

    use crate::{
        attributes::UnknownAttribute, constant_pool::CpInfo, AttributeDecoders, ClassFileError,
    };

    use super::*;

    // #1 "Code", #2 "ConstantValue", #3 "Foo", #4 "LineNumberTable", #5 "Deprecated"
    fn constant_pool() -> ConstantPool {
        ConstantPool::new(
            6,
            ["Code", "ConstantValue", "Foo", "LineNumberTable", "Deprecated"]
                .into_iter()
                .map(|s| CpInfo::Utf8(s.into()))
                .collect(),
        )
    }

    fn parser(bytes: &[u8]) -> Parser<Cursor<&[u8]>> {
        Parser::new(Cursor::new(bytes))
    }

    #[test]
    fn it_should_parse_a_constant_value() {
        assert_eq!(
            parser(&[0x00, 0x02, 0x00, 0x00, 0x00, 0x02, 0x00, 0x07])
                .parse_attribute(&constant_pool())
                .unwrap(),
            AttributeInfo::ConstantValue(ConstantValueAttribute {
                constantvalue_index: 7
            })
        );
    }

    #[test]
    fn it_should_keep_unknown_attributes_verbatim() {
        let mut parser = parser(&[0x00, 0x03, 0x00, 0x00, 0x00, 0x03, 0xde, 0xad, 0xbe, 0xef]);

        assert_eq!(
            parser.parse_attribute(&constant_pool()).unwrap(),
            AttributeInfo::Unknown(UnknownAttribute {
                name: "Foo".into(),
                info: vec![0xde, 0xad, 0xbe],
            })
        );
        assert_eq!(parser.into_inner().position(), 9);
    }

    #[test]
    fn it_should_fail_when_an_unknown_payload_is_truncated() {
        let e = parser(&[0x00, 0x03, 0x00, 0x00, 0x00, 0x04, 0xde, 0xad])
            .parse_attribute(&constant_pool())
            .unwrap_err();

        assert!(matches!(e.root(), ClassFileError::ShortRead(4)));
        assert_eq!(e.stages(), vec!["attribute Foo"]);
    }

    #[test]
    fn it_should_fail_when_the_name_is_not_utf8() {
        let constant_pool = ConstantPool::new(2, vec![CpInfo::String { string_index: 1 }]);

        assert!(matches!(
            parser(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x00]).parse_attribute(&constant_pool),
            Err(ClassFileError::InvalidReference {
                index: 1,
                expected: "Utf8",
                found: "String"
            })
        ));
    }

    #[test]
    fn it_should_parse_a_code_attribute() {
        #[rustfmt::skip]
        let bytes = [
            0x00, 0x01, 0x00, 0x00, 0x00, 0x1d,
            0x00, 0x02, 0x00, 0x01,
            0x00, 0x00, 0x00, 0x03, 0x2a, 0xb7, 0xb1,
            0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x02, 0x00, 0x00,
            0x00, 0x01,
            0x00, 0x05, 0x00, 0x00, 0x00, 0x00,
        ];
        let mut parser = parser(&bytes);

        let AttributeInfo::Code(code) = parser.parse_attribute(&constant_pool()).unwrap() else {
            panic!("not a code attribute");
        };
        assert_eq!(code.max_stack, 2);
        assert_eq!(code.max_locals, 1);
        assert_eq!(code.code, vec![0x2a, 0xb7, 0xb1]);
        assert_eq!(
            code.exception_table,
            vec![ExceptionTableEntry {
                start_pc: 0,
                end_pc: 2,
                handler_pc: 2,
                catch_type: 0,
            }]
        );
        assert_eq!(code.attributes.0, vec![AttributeInfo::Deprecated]);
        assert_eq!(parser.into_inner().position(), bytes.len() as u64);
    }

    #[test]
    fn it_should_dispatch_nested_attributes_like_top_level_ones() {
        #[rustfmt::skip]
        let bytes = [
            0x00, 0x01, 0x00, 0x00, 0x00, 0x20,
            0x00, 0x01, 0x00, 0x01,
            0x00, 0x00, 0x00, 0x01, 0xb1,
            0x00, 0x00,
            0x00, 0x02,
            0x00, 0x03, 0x00, 0x00, 0x00, 0x01, 0x2a,
            0x00, 0x04, 0x00, 0x00, 0x00, 0x06, 0x00, 0x01, 0x00, 0x00, 0x00, 0x0c,
        ];

        let AttributeInfo::Code(code) = parser(&bytes).parse_attribute(&constant_pool()).unwrap()
        else {
            panic!("not a code attribute");
        };
        assert_eq!(
            code.attributes.0,
            vec![
                AttributeInfo::Unknown(UnknownAttribute {
                    name: "Foo".into(),
                    info: vec![0x2a],
                }),
                AttributeInfo::LineNumberTable(vec![LineNumber {
                    start_pc: 0,
                    line_number: 12,
                }]),
            ]
        );
    }

    #[test]
    fn it_should_name_the_nested_attribute_that_failed() {
        #[rustfmt::skip]
        let bytes = [
            0x00, 0x01, 0x00, 0x00, 0x00, 0x20,
            0x00, 0x01, 0x00, 0x01,
            0x00, 0x00, 0x00, 0x01, 0xb1,
            0x00, 0x00,
            0x00, 0x01,
            0x00, 0x04, 0x00, 0x00, 0x00, 0x06, 0x00, 0x01, 0x00,
        ];

        let e = parser(&bytes)
            .parse_attribute(&constant_pool())
            .unwrap_err();

        assert!(matches!(e.root(), ClassFileError::ShortRead(2)));
        assert_eq!(e.stages(), vec!["attribute Code", "attribute LineNumberTable"]);
        assert!(e.to_string().contains("attribute LineNumberTable"));
    }

    #[test]
    fn it_should_skip_the_payload_of_a_marker_attribute() {
        let mut parser = parser(&[0x00, 0x05, 0x00, 0x00, 0x00, 0x02, 0xca, 0xfe, 0x00]);

        assert_eq!(
            parser.parse_attribute(&constant_pool()).unwrap(),
            AttributeInfo::Deprecated
        );
        assert_eq!(parser.into_inner().position(), 8);
    }

    #[test]
    fn it_should_use_the_decoders_it_was_given() {
        let decoders = AttributeDecoders::default().without("ConstantValue");
        let mut parser = Parser::with_attribute_decoders(
            Cursor::new(&[0x00u8, 0x02, 0x00, 0x00, 0x00, 0x02, 0x00, 0x07][..]),
            decoders,
        );

        assert_eq!(
            parser.parse_attribute(&constant_pool()).unwrap(),
            AttributeInfo::Unknown(UnknownAttribute {
                name: "ConstantValue".into(),
                info: vec![0x00, 0x07],
            })
        );
    }

    #[test]
    fn it_should_read_the_count_before_the_attributes() {
        let mut parser = parser(&[0x00, 0x02, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00]);

        assert!(matches!(
            parser.parse_attributes(&constant_pool()),
            Err(ClassFileError::ShortRead(2))
        ));
    }
}
