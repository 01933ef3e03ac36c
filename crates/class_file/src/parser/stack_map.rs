use std::io::Read;

use crate::{stack_map::*, AttributeInfo, ClassFileError, ConstantPool, Parser, Result};

impl<R: Read> Parser<R> {
    pub(crate) fn parse_stack_map_table_attribute(
        &mut self,
        _constant_pool: &ConstantPool,
        _length: u32,
    ) -> Result<AttributeInfo> {
        let number_of_entries = self.read_u16()?;
        let entries = (0..number_of_entries)
            .map(|_| self.parse_stack_map_frame())
            .collect::<Result<Vec<_>>>()?;

        Ok(AttributeInfo::StackMapTable(entries))
    }

    fn parse_stack_map_frame(&mut self) -> Result<StackMapFrame> {
        let frame_type = self.read_u8()?;
        let frame = match frame_type {
            0..=63 => StackMapFrame::Same { frame_type },
            64..=127 => StackMapFrame::SameLocals1StackItem {
                frame_type,
                stack: self.parse_verification_type_info()?,
            },
            128..=246 => return Err(ClassFileError::InvalidStackMapFrameType(frame_type)),
            SAME_LOCALS_1_STACK_ITEM_EXTENDED => {
                let offset_delta = self.read_u16()?;
                let stack = self.parse_verification_type_info()?;
                StackMapFrame::SameLocals1StackItemExtended {
                    offset_delta,
                    stack,
                }
            }
            248..=250 => StackMapFrame::Chop {
                frame_type,
                offset_delta: self.read_u16()?,
            },
            SAME_FRAME_EXTENDED => StackMapFrame::SameExtended {
                offset_delta: self.read_u16()?,
            },
            252..=254 => {
                let offset_delta = self.read_u16()?;
                let locals = self.parse_verification_type_infos((frame_type - 251) as u16)?;
                StackMapFrame::Append {
                    frame_type,
                    offset_delta,
                    locals,
                }
            }
            FULL_FRAME => {
                let offset_delta = self.read_u16()?;
                let number_of_locals = self.read_u16()?;
                let locals = self.parse_verification_type_infos(number_of_locals)?;
                let number_of_stack_items = self.read_u16()?;
                let stack = self.parse_verification_type_infos(number_of_stack_items)?;
                StackMapFrame::Full {
                    offset_delta,
                    locals,
                    stack,
                }
            }
        };

        Ok(frame)
    }

    fn parse_verification_type_infos(&mut self, count: u16) -> Result<Vec<VerificationTypeInfo>> {
        (0..count)
            .map(|_| self.parse_verification_type_info())
            .collect()
    }

    fn parse_verification_type_info(&mut self) -> Result<VerificationTypeInfo> {
        let tag = self.read_u8()?;
        let info = match tag {
            ITEM_TOP => VerificationTypeInfo::Top,
            ITEM_INTEGER => VerificationTypeInfo::Integer,
            ITEM_FLOAT => VerificationTypeInfo::Float,
            ITEM_DOUBLE => VerificationTypeInfo::Double,
            ITEM_LONG => VerificationTypeInfo::Long,
            ITEM_NULL => VerificationTypeInfo::Null,
            ITEM_UNINITIALIZED_THIS => VerificationTypeInfo::UninitializedThis,
            ITEM_OBJECT => VerificationTypeInfo::Object {
                cpool_index: self.read_u16()?,
            },
            ITEM_UNINITIALIZED => VerificationTypeInfo::Uninitialized {
                offset: self.read_u16()?,
            },
            _ => return Err(ClassFileError::InvalidVerificationTypeTag(tag)),
        };

        Ok(info)
    }
}
