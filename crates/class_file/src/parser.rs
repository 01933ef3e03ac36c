mod attributes;
mod stack_map;

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use log::{debug, trace};

use crate::{
    attributes::UnknownAttribute,
    class_file::{FieldInfo, MethodInfo},
    constant_pool::*,
};

use super::*;

type Endian = BigEndian;

const MAGIC_IDENTIFIER: u32 = 0xCAFEBABE;

/// Decodes a class file from a forward-only byte source.
///
/// Wrap unbuffered sources such as a [`std::fs::File`] in a
/// [`std::io::BufReader`] first; the parser reads field by field.
pub struct Parser<R> {
    r: R,
    attribute_decoders: AttributeDecoders<R>,
}
impl<R: Read> Parser<R> {
    pub fn new(r: R) -> Self {
        Self::with_attribute_decoders(r, AttributeDecoders::default())
    }

    pub fn with_attribute_decoders(r: R, attribute_decoders: AttributeDecoders<R>) -> Self {
        Self {
            r,
            attribute_decoders,
        }
    }

    pub fn into_inner(self) -> R {
        self.r
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        let magic = self
            .parse_magic_identifier()
            .map_err(|e| e.while_parsing("magic identifier"))?;
        let (major_version, minor_version) = self
            .parse_version()
            .map_err(|e| e.while_parsing("version"))?;
        trace!("class file version {major_version}.{minor_version}");

        let constant_pool = self
            .parse_constant_pool()
            .map_err(|e| e.while_parsing("constant pool"))?;
        let access_flags = AccessFlags::from_bits_truncate(
            self.read_u16()
                .map_err(|e| e.while_parsing("access flags"))?,
        );
        let this_class = self
            .read_u16()
            .map_err(|e| e.while_parsing("this class"))?;
        let super_class = self
            .read_u16()
            .map_err(|e| e.while_parsing("super class"))?;
        let interfaces = self
            .parse_interfaces()
            .map_err(|e| e.while_parsing("interfaces"))?;

        let fields_count = self
            .read_u16()
            .map_err(|e| e.while_parsing("fields count"))?;
        trace!("parsing {fields_count} field(s)");
        let fields = (0..fields_count)
            .map(|index| {
                self.parse_field_info(&constant_pool)
                    .map_err(|e| e.while_parsing(format!("field #{index}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self
            .read_u16()
            .map_err(|e| e.while_parsing("methods count"))?;
        trace!("parsing {methods_count} method(s)");
        let methods = (0..methods_count)
            .map(|index| {
                self.parse_method_info(&constant_pool)
                    .map_err(|e| e.while_parsing(format!("method #{index}")))
            })
            .collect::<Result<Vec<_>>>()?;

        trace!("parsing class attributes");
        let attributes = self
            .parse_attributes(&constant_pool)
            .map_err(|e| e.while_parsing("class attributes"))?;

        Ok(ClassFile {
            magic,
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_interfaces(&mut self) -> Result<Vec<u16>> {
        let interfaces_count = self.read_u16()?;

        let mut interfaces = vec![0u16; interfaces_count as usize];
        self.r
            .read_u16_into::<Endian>(&mut interfaces)
            .map_err(ClassFileError::from_read(interfaces.len() * 2))?;

        Ok(interfaces)
    }

    fn parse_field_info(&mut self, constant_pool: &ConstantPool) -> Result<FieldInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes(constant_pool)?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self, constant_pool: &ConstantPool) -> Result<MethodInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes(constant_pool)?;

        let name = constant_pool.utf8(name_index)?.to_owned();
        let descriptor = constant_pool.utf8(descriptor_index)?.to_owned();
        let code_index = attributes.code_position();
        trace!("parsed method {name}{descriptor}");

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            name,
            descriptor,
            attributes,
            code_index,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<u32> {
        match self.read_u32()? {
            MAGIC_IDENTIFIER => Ok(MAGIC_IDENTIFIER),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?;
        trace!("parsing constant pool of count {constant_pool_count}");

        let res = (1..constant_pool_count)
            .map(|index| self.parse_cp_info(index))
            .collect::<Result<Vec<_>>>()?;

        Ok(ConstantPool::new(constant_pool_count, res))
    }

    fn parse_cp_info(&mut self, index: u16) -> Result<CpInfo> {
        let tag = self.read_u8()?;
        match tag {
            CONSTANT_UTF8 => self.parse_utf8(),
            CONSTANT_CLASS => self.parse_class_info(),
            CONSTANT_STRING => self.parse_string(),
            CONSTANT_FIELD_REF => self.parse_field_ref(),
            CONSTANT_METHOD_REF => self.parse_method_ref(),
            CONSTANT_INTERFACE_METHOD_REF => self.parse_interface_method_ref(),
            CONSTANT_NAME_AND_TYPE => self.parse_name_and_type_info(),
            // Long and double entries would also take up the following slot.
            CONSTANT_INTEGER | CONSTANT_FLOAT | CONSTANT_LONG | CONSTANT_DOUBLE
            | CONSTANT_METHOD_HANDLE | CONSTANT_METHOD_TYPE | CONSTANT_DYNAMIC
            | CONSTANT_INVOKE_DYNAMIC | CONSTANT_MODULE | CONSTANT_PACKAGE => {
                Err(ClassFileError::UnsupportedConstant { index, tag })
            }
            _ => Err(ClassFileError::UnsupportedConstant { index, tag }),
        }
    }

    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.read_u16()?;
        let bytes = self.read_bytes(length as usize)?;

        Ok(CpInfo::Utf8(String::from_utf8_lossy(&bytes).into()))
    }

    fn parse_class_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;

        Ok(CpInfo::Class(ClassInfo { name_index }))
    }

    fn parse_string(&mut self) -> Result<CpInfo> {
        let string_index = self.read_u16()?;

        Ok(CpInfo::String { string_index })
    }

    fn parse_field_ref(&mut self) -> Result<CpInfo> {
        let ref_info = self.parse_ref_info()?;

        Ok(CpInfo::FieldRef(ref_info))
    }

    fn parse_method_ref(&mut self) -> Result<CpInfo> {
        let ref_info = self.parse_ref_info()?;

        Ok(CpInfo::MethodRef(ref_info))
    }

    fn parse_interface_method_ref(&mut self) -> Result<CpInfo> {
        let ref_info = self.parse_ref_info()?;

        Ok(CpInfo::InterfaceMethodRef(ref_info))
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::NameAndType(NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    /// Reads an `attributes_count` item followed by that many attributes.
    pub fn parse_attributes(&mut self, constant_pool: &ConstantPool) -> Result<Attributes> {
        let attributes_count = self.read_u16()?;
        (0..attributes_count)
            .map(|_| self.parse_attribute(constant_pool))
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    pub fn parse_attribute(&mut self, constant_pool: &ConstantPool) -> Result<AttributeInfo> {
        let attribute_name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;
        let name = constant_pool.utf8(attribute_name_index)?;

        let decoder = self.attribute_decoders.get(name);
        let attribute = match decoder {
            Some(decode) => decode(self, constant_pool, attribute_length),
            None => {
                debug!("keeping unknown attribute {name} ({attribute_length} bytes)");
                self.read_bytes(attribute_length as usize).map(|info| {
                    AttributeInfo::Unknown(UnknownAttribute {
                        name: name.to_owned(),
                        info,
                    })
                })
            }
        };

        attribute.map_err(|e| e.while_parsing(format!("attribute {name}")))
    }

    /// Reads exactly `length` bytes.
    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        (&mut self.r)
            .take(length as u64)
            .read_to_end(&mut bytes)
            .map_err(ClassFileError::from_read(length))?;

        if bytes.len() < length {
            return Err(ClassFileError::ShortRead(length));
        }
        Ok(bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.r
            .read_u32::<Endian>()
            .map_err(ClassFileError::from_read(4))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.r
            .read_u16::<Endian>()
            .map_err(ClassFileError::from_read(2))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.r.read_u8().map_err(ClassFileError::from_read(1))
    }
}



#[cfg(test)]
mod parse_version_tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn it_should_be_able_to_parse_a_version() {
        assert_eq!(
            Parser::new(Cursor::new(&[0x00u8, 0x03, 0x00, 0x2d][..]))
                .parse_version()
                .unwrap(),
            (45, 3)
        );
    }
}
