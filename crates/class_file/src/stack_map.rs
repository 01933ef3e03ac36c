//! Frames of the `StackMapTable` attribute.
//!
//! ```txt
//! frame_type    shape
//! 0..=63        same
//! 64..=127      same_locals_1_stack_item
//! 128..=246     reserved
//! 247           same_locals_1_stack_item_extended
//! 248..=250     chop
//! 251           same_frame_extended
//! 252..=254     append
//! 255           full_frame
//! ```

pub(crate) const ITEM_TOP: u8 = 0;
pub(crate) const ITEM_INTEGER: u8 = 1;
pub(crate) const ITEM_FLOAT: u8 = 2;
pub(crate) const ITEM_DOUBLE: u8 = 3;
pub(crate) const ITEM_LONG: u8 = 4;
pub(crate) const ITEM_NULL: u8 = 5;
pub(crate) const ITEM_UNINITIALIZED_THIS: u8 = 6;
pub(crate) const ITEM_OBJECT: u8 = 7;
pub(crate) const ITEM_UNINITIALIZED: u8 = 8;

pub(crate) const SAME_LOCALS_1_STACK_ITEM_EXTENDED: u8 = 247;
pub(crate) const SAME_FRAME_EXTENDED: u8 = 251;
pub(crate) const FULL_FRAME: u8 = 255;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum VerificationTypeInfo {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    /// A `CONSTANT_Class_info` pool index.
    Object { cpool_index: u16 },
    /// Offset of the `new` instruction that created the object.
    Uninitialized { offset: u16 },
}
impl VerificationTypeInfo {
    pub fn tag(&self) -> u8 {
        match self {
            VerificationTypeInfo::Top => ITEM_TOP,
            VerificationTypeInfo::Integer => ITEM_INTEGER,
            VerificationTypeInfo::Float => ITEM_FLOAT,
            VerificationTypeInfo::Double => ITEM_DOUBLE,
            VerificationTypeInfo::Long => ITEM_LONG,
            VerificationTypeInfo::Null => ITEM_NULL,
            VerificationTypeInfo::UninitializedThis => ITEM_UNINITIALIZED_THIS,
            VerificationTypeInfo::Object { .. } => ITEM_OBJECT,
            VerificationTypeInfo::Uninitialized { .. } => ITEM_UNINITIALIZED,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum StackMapFrame {
    Same {
        frame_type: u8,
    },
    /// `frame_type` is in `64..=127` and encodes the offset delta plus 64.
    SameLocals1StackItem {
        frame_type: u8,
        stack: VerificationTypeInfo,
    },
    SameLocals1StackItemExtended {
        offset_delta: u16,
        stack: VerificationTypeInfo,
    },
    /// The last `251 - frame_type` locals are absent.
    Chop {
        frame_type: u8,
        offset_delta: u16,
    },
    SameExtended {
        offset_delta: u16,
    },
    /// `frame_type - 251` additional locals.
    Append {
        frame_type: u8,
        offset_delta: u16,
        locals: Vec<VerificationTypeInfo>,
    },
    Full {
        offset_delta: u16,
        locals: Vec<VerificationTypeInfo>,
        stack: Vec<VerificationTypeInfo>,
    },
}
impl StackMapFrame {
    pub fn frame_type(&self) -> u8 {
        match self {
            StackMapFrame::Same { frame_type }
            | StackMapFrame::SameLocals1StackItem { frame_type, .. }
            | StackMapFrame::Chop { frame_type, .. }
            | StackMapFrame::Append { frame_type, .. } => *frame_type,
            StackMapFrame::SameLocals1StackItemExtended { .. } => SAME_LOCALS_1_STACK_ITEM_EXTENDED,
            StackMapFrame::SameExtended { .. } => SAME_FRAME_EXTENDED,
            StackMapFrame::Full { .. } => FULL_FRAME,
        }
    }

    pub fn offset_delta(&self) -> u16 {
        match self {
            StackMapFrame::Same { frame_type } => *frame_type as u16,
            StackMapFrame::SameLocals1StackItem { frame_type, .. } => {
                (*frame_type as u16).saturating_sub(64)
            }
            StackMapFrame::SameLocals1StackItemExtended { offset_delta, .. }
            | StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::SameExtended { offset_delta }
            | StackMapFrame::Append { offset_delta, .. }
            | StackMapFrame::Full { offset_delta, .. } => *offset_delta,
        }
    }
}
