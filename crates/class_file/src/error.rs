use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Short read: {0} byte(s) needed but the input ended")]
    ShortRead(usize),
    #[error("Unsupported constant pool entry #{index}: tag {tag}")]
    UnsupportedConstant { index: u16, tag: u8 },
    #[error("Invalid constant pool reference #{index}: expected {expected}, found {found}")]
    InvalidReference {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Invalid stack map frame type: {0}")]
    InvalidStackMapFrameType(u8),
    #[error("Invalid verification type tag: {0}")]
    InvalidVerificationTypeTag(u8),
    #[error("while parsing {stage}: {source}")]
    WhileParsing {
        stage: String,
        source: Box<ClassFileError>,
    },
}

impl ClassFileError {
    /// Maps an I/O failure of a read that needed `needed` bytes, turning an
    /// exhausted source into [`ClassFileError::ShortRead`].
    pub(crate) fn from_read(needed: usize) -> impl FnOnce(std::io::Error) -> Self {
        move |e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => ClassFileError::ShortRead(needed),
            _ => ClassFileError::IOError(e),
        }
    }

    /// Records the part of the class file that was being decoded.
    pub(crate) fn while_parsing(self, stage: impl Into<String>) -> Self {
        ClassFileError::WhileParsing {
            stage: stage.into(),
            source: Box::new(self),
        }
    }

    /// The failure itself, without the stages it was reported through.
    pub fn root(&self) -> &ClassFileError {
        match self {
            ClassFileError::WhileParsing { source, .. } => source.root(),
            e => e,
        }
    }

    /// The stages the failure was reported through, outermost first.
    pub fn stages(&self) -> Vec<&str> {
        let mut stages = Vec::new();
        let mut e = self;
        while let ClassFileError::WhileParsing { stage, source } = e {
            stages.push(stage.as_str());
            e = source.as_ref();
        }
        stages
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn it_should_name_every_stage_in_the_message() {
        let e = ClassFileError::ShortRead(2)
            .while_parsing("attribute Code")
            .while_parsing("method #1");

        assert_eq!(
            e.to_string(),
            "while parsing method #1: while parsing attribute Code: \
             Short read: 2 byte(s) needed but the input ended"
        );
        assert_eq!(e.stages(), vec!["method #1", "attribute Code"]);
        assert!(matches!(e.root(), ClassFileError::ShortRead(2)));
    }

    #[test]
    fn it_should_be_its_own_root_without_stages() {
        let e = ClassFileError::InvalidStackMapFrameType(200);

        assert!(e.stages().is_empty());
        assert!(matches!(
            e.root(),
            ClassFileError::InvalidStackMapFrameType(200)
        ));
    }
}
