pub(crate) const CONSTANT_UTF8: u8 = 1;
pub(crate) const CONSTANT_INTEGER: u8 = 3;
pub(crate) const CONSTANT_FLOAT: u8 = 4;
pub(crate) const CONSTANT_LONG: u8 = 5;
pub(crate) const CONSTANT_DOUBLE: u8 = 6;
pub(crate) const CONSTANT_CLASS: u8 = 7;
pub(crate) const CONSTANT_STRING: u8 = 8;
pub(crate) const CONSTANT_FIELD_REF: u8 = 9;
pub(crate) const CONSTANT_METHOD_REF: u8 = 10;
pub(crate) const CONSTANT_INTERFACE_METHOD_REF: u8 = 11;
pub(crate) const CONSTANT_NAME_AND_TYPE: u8 = 12;
pub(crate) const CONSTANT_METHOD_HANDLE: u8 = 15;
pub(crate) const CONSTANT_METHOD_TYPE: u8 = 16;
pub(crate) const CONSTANT_DYNAMIC: u8 = 17;
pub(crate) const CONSTANT_INVOKE_DYNAMIC: u8 = 18;
pub(crate) const CONSTANT_MODULE: u8 = 19;
pub(crate) const CONSTANT_PACKAGE: u8 = 20;

#[macro_export]
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {{
        let index: u16 = $index;
        match $cp.get(index) {
            Some($crate::CpInfo::$i(n)) => Ok(n),
            c => Err($crate::ClassFileError::InvalidReference {
                index,
                expected: stringify!($i),
                found: c.map_or("nothing", |c| c.kind()),
            }),
        }
    }};
}

/// The constant pool of a class file.
///
/// Entries are addressed the way the class file addresses them: starting at
/// 1, with index 0 never holding an entry.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConstantPool {
    count: u16,
    cp_infos: Vec<CpInfo>,
}
impl ConstantPool {
    /// `count` is the `constant_pool_count` item of the class file, one more
    /// than the number of entries.
    pub fn new(count: u16, cp_infos: Vec<CpInfo>) -> Self {
        Self { count, cp_infos }
    }

    /// The declared `constant_pool_count`. Valid indices are `1..count`.
    pub fn count(&self) -> u16 {
        self.count
    }

    pub fn get(&self, index: u16) -> Option<&CpInfo> {
        let slot = index.checked_sub(1)?;
        self.cp_infos.get(slot as usize)
    }

    pub fn utf8(&self, index: u16) -> crate::Result<&str> {
        matches_cp_info!(self, index, Utf8).map(String::as_str)
    }

    /// Resolves a `CONSTANT_Class_info` entry to the class name it refers to.
    pub fn class_name(&self, index: u16) -> crate::Result<&str> {
        let ClassInfo { name_index } = matches_cp_info!(self, index, Class)?;
        self.utf8(*name_index)
    }

    /// Iterates over `(index, entry)` pairs in pool order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &CpInfo)> {
        (1..).zip(self.cp_infos.iter())
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpInfo;
    type IntoIter = std::slice::Iter<'a, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    Class(ClassInfo),
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    String { string_index: u16 },
    NameAndType(NameAndTypeInfo),
    Utf8(String),
}
impl CpInfo {
    pub fn tag(&self) -> u8 {
        match self {
            CpInfo::Class(_) => CONSTANT_CLASS,
            CpInfo::FieldRef(_) => CONSTANT_FIELD_REF,
            CpInfo::MethodRef(_) => CONSTANT_METHOD_REF,
            CpInfo::InterfaceMethodRef(_) => CONSTANT_INTERFACE_METHOD_REF,
            CpInfo::String { .. } => CONSTANT_STRING,
            CpInfo::NameAndType(_) => CONSTANT_NAME_AND_TYPE,
            CpInfo::Utf8(_) => CONSTANT_UTF8,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CpInfo::Class(_) => "Class",
            CpInfo::FieldRef(_) => "FieldRef",
            CpInfo::MethodRef(_) => "MethodRef",
            CpInfo::InterfaceMethodRef(_) => "InterfaceMethodRef",
            CpInfo::String { .. } => "String",
            CpInfo::NameAndType(_) => "NameAndType",
            CpInfo::Utf8(_) => "Utf8",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    // The value of the name_index item must be a valid index into the constant_pool table.
    // The constant_pool entry at that index must be a CONSTANT_Utf8_info structure
    // representing a valid binary class or interface name encoded in internal form.
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[cfg(test)]
mod constant_pool_tests {
    use super::*;
    use crate::ClassFileError;

    fn pool() -> ConstantPool {
        ConstantPool::new(
            4,
            vec![
                CpInfo::Utf8("java/lang/Object".into()),
                CpInfo::Class(ClassInfo { name_index: 1 }),
                CpInfo::String { string_index: 1 },
            ],
        )
    }

    #[test]
    fn it_should_address_entries_from_one() {
        let pool = pool();

        assert_eq!(pool.get(0), None);
        assert_eq!(pool.get(1), Some(&CpInfo::Utf8("java/lang/Object".into())));
        assert_eq!(pool.get(3), Some(&CpInfo::String { string_index: 1 }));
        assert_eq!(pool.get(4), None);
    }

    #[test]
    fn it_should_resolve_a_class_name() {
        assert_eq!(pool().class_name(2).unwrap(), "java/lang/Object");
    }

    #[test]
    fn it_should_fail_when_the_entry_has_another_kind() {
        match pool().utf8(2) {
            Err(ClassFileError::InvalidReference {
                index,
                expected,
                found,
            }) => {
                assert_eq!(index, 2);
                assert_eq!(expected, "Utf8");
                assert_eq!(found, "Class");
            }
            r => panic!("unexpected result: {r:?}"),
        }
    }

    #[test]
    fn it_should_fail_on_index_zero_and_out_of_range() {
        assert!(matches!(
            pool().utf8(0),
            Err(ClassFileError::InvalidReference { found: "nothing", .. })
        ));
        assert!(matches!(
            pool().class_name(9),
            Err(ClassFileError::InvalidReference { index: 9, .. })
        ));
    }

    #[test]
    fn it_should_report_the_tag_each_entry_was_read_from() {
        let tags = pool().iter().map(|(_, c)| c.tag()).collect::<Vec<_>>();

        assert_eq!(tags, vec![1, 7, 8]);
    }

    #[test]
    fn it_should_iterate_with_pool_indices() {
        let indices = pool().iter().map(|(i, _)| i).collect::<Vec<_>>();

        assert_eq!(indices, vec![1, 2, 3]);
    }
}
