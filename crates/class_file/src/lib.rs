// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
#[macro_use]
pub mod constant_pool;
mod decoders;
mod error;
mod parser;
pub mod stack_map;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo};
pub use access_flags::AccessFlags;
pub use attributes::{AttributeInfo, Attributes};
pub use constant_pool::{ConstantPool, CpInfo};
pub use decoders::{AttributeDecoder, AttributeDecoders};
pub use error::ClassFileError;
pub use parser::Parser;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
