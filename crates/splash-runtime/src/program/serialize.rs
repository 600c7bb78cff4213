//! Program serialization and deserialization

use super::CodecError;
use crate::token::Token;
use crate::value::Value;

// Value tags
const TAG_INT: u8 = 0x01;
const TAG_FLOAT: u8 = 0x02;
const TAG_STRING: u8 = 0x03;
const TAG_BOOL: u8 = 0x04;

// Instruction tags
const TAG_GOTO: u8 = 0x10;
const TAG_MARK: u8 = 0x11;
const TAG_IF: u8 = 0x12;
const TAG_ENDIF: u8 = 0x13;
const TAG_FUNC: u8 = 0x14;
const TAG_ENDFUNC: u8 = 0x15;
const TAG_DUP: u8 = 0x20;
const TAG_DROP: u8 = 0x21;
const TAG_PICK: u8 = 0x22;
const TAG_ROLL: u8 = 0x23;
const TAG_FIN: u8 = 0x30;
const TAG_ADD: u8 = 0x40;
const TAG_SUB: u8 = 0x41;
const TAG_MUL: u8 = 0x42;
const TAG_DIV: u8 = 0x43;
const TAG_HASH: u8 = 0x44;
const TAG_INPUT: u8 = 0x50;
const TAG_PRINT: u8 = 0x51;
const TAG_PRINTLN: u8 = 0x52;

/// Jump target written for an unresolved `IF` / `FUNC`
const NO_TARGET: i64 = -1;

/// Big-endian byte writer
pub(super) struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    pub(super) fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub(super) fn finish(self) -> Vec<u8> {
        self.bytes
    }

    pub(super) fn bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub(super) fn u8(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    pub(super) fn u16(&mut self, n: u16) {
        self.bytes.extend_from_slice(&n.to_be_bytes());
    }

    pub(super) fn u32(&mut self, n: u32) {
        self.bytes.extend_from_slice(&n.to_be_bytes());
    }

    fn i64(&mut self, n: i64) {
        self.bytes.extend_from_slice(&n.to_be_bytes());
    }

    /// Count or index as a `u32` field
    pub(super) fn len(&mut self, n: usize, what: &'static str) -> Result<(), CodecError> {
        let n = u32::try_from(n).map_err(|_| CodecError::TooLarge { what, len: n })?;
        self.u32(n);
        Ok(())
    }

    /// Length-prefixed UTF-8
    pub(super) fn str(&mut self, s: &str) -> Result<(), CodecError> {
        self.len(s.len(), "string")?;
        self.bytes(s.as_bytes());
        Ok(())
    }

    pub(super) fn value(&mut self, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Int(n) => {
                self.u8(TAG_INT);
                self.i64(*n);
            }
            Value::Float(n) => {
                self.u8(TAG_FLOAT);
                self.bytes(&n.to_bits().to_be_bytes());
            }
            Value::String(s) => {
                self.u8(TAG_STRING);
                self.str(s)?;
            }
            Value::Bool(b) => {
                self.u8(TAG_BOOL);
                self.u8(u8::from(*b));
            }
        }
        Ok(())
    }

    pub(super) fn token(&mut self, token: &Token) -> Result<(), CodecError> {
        let tag = match token {
            Token::Literal(value) => return self.value(value),
            Token::If(target) => {
                self.target(TAG_IF, *target);
                return Ok(());
            }
            Token::Func(target) => {
                self.target(TAG_FUNC, *target);
                return Ok(());
            }
            Token::Goto => TAG_GOTO,
            Token::Mark => TAG_MARK,
            Token::EndIf => TAG_ENDIF,
            Token::EndFunc => TAG_ENDFUNC,
            Token::Dup => TAG_DUP,
            Token::Drop => TAG_DROP,
            Token::Pick => TAG_PICK,
            Token::Roll => TAG_ROLL,
            Token::Fin => TAG_FIN,
            Token::Add => TAG_ADD,
            Token::Sub => TAG_SUB,
            Token::Mul => TAG_MUL,
            Token::Div => TAG_DIV,
            Token::Hash => TAG_HASH,
            Token::Input => TAG_INPUT,
            Token::Print => TAG_PRINT,
            Token::Println => TAG_PRINTLN,
        };
        self.u8(tag);
        Ok(())
    }

    fn target(&mut self, tag: u8, target: Option<usize>) {
        self.u8(tag);
        self.i64(target.map_or(NO_TARGET, |index| index as i64));
    }
}

/// Big-endian byte reader over a borrowed buffer
pub(super) struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub(super) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub(super) fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub(super) fn take(&mut self, len: usize, context: &'static str) -> Result<&'a [u8], CodecError> {
        if self.remaining() < len {
            return Err(CodecError::Truncated(context));
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N], CodecError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N, context)?);
        Ok(buf)
    }

    fn u8(&mut self, context: &'static str) -> Result<u8, CodecError> {
        Ok(self.array::<1>(context)?[0])
    }

    pub(super) fn u16(&mut self, context: &'static str) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.array(context)?))
    }

    pub(super) fn u32(&mut self, context: &'static str) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.array(context)?))
    }

    fn i64(&mut self, context: &'static str) -> Result<i64, CodecError> {
        Ok(i64::from_be_bytes(self.array(context)?))
    }

    pub(super) fn string(&mut self, context: &'static str) -> Result<String, CodecError> {
        let len = self.u32(context)? as usize;
        let bytes = self.take(len, context)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8(context))
    }

    pub(super) fn value(&mut self, context: &'static str) -> Result<Value, CodecError> {
        let tag = self.u8(context)?;
        self.value_with_tag(tag, context)?
            .ok_or(CodecError::UnknownTag { tag, context })
    }

    /// Decode the payload of a value tag; `None` if the tag is not a value tag
    fn value_with_tag(&mut self, tag: u8, context: &'static str) -> Result<Option<Value>, CodecError> {
        let value = match tag {
            TAG_INT => Value::Int(self.i64(context)?),
            TAG_FLOAT => Value::Float(f64::from_bits(u64::from_be_bytes(self.array(context)?))),
            TAG_STRING => Value::String(self.string(context)?),
            TAG_BOOL => Value::Bool(self.u8(context)? != 0),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    pub(super) fn token(&mut self) -> Result<Token, CodecError> {
        const CONTEXT: &str = "token";
        let tag = self.u8(CONTEXT)?;
        if let Some(value) = self.value_with_tag(tag, CONTEXT)? {
            return Ok(Token::Literal(value));
        }
        let token = match tag {
            TAG_IF => Token::If(self.target()?),
            TAG_FUNC => Token::Func(self.target()?),
            TAG_GOTO => Token::Goto,
            TAG_MARK => Token::Mark,
            TAG_ENDIF => Token::EndIf,
            TAG_ENDFUNC => Token::EndFunc,
            TAG_DUP => Token::Dup,
            TAG_DROP => Token::Drop,
            TAG_PICK => Token::Pick,
            TAG_ROLL => Token::Roll,
            TAG_FIN => Token::Fin,
            TAG_ADD => Token::Add,
            TAG_SUB => Token::Sub,
            TAG_MUL => Token::Mul,
            TAG_DIV => Token::Div,
            TAG_HASH => Token::Hash,
            TAG_INPUT => Token::Input,
            TAG_PRINT => Token::Print,
            TAG_PRINTLN => Token::Println,
            _ => {
                return Err(CodecError::UnknownTag {
                    tag,
                    context: CONTEXT,
                })
            }
        };
        Ok(token)
    }

    /// Negative targets decode as "not found"
    fn target(&mut self) -> Result<Option<usize>, CodecError> {
        let raw = self.i64("jump target")?;
        Ok(usize::try_from(raw).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_layout() {
        let mut writer = Writer::new();
        writer.value(&Value::Int(1)).unwrap();
        assert_eq!(writer.finish(), vec![TAG_INT, 0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_unresolved_target_written_as_minus_one() {
        let mut writer = Writer::new();
        writer.token(&Token::If(None)).unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes[0], TAG_IF);
        assert_eq!(&bytes[1..], &(-1i64).to_be_bytes());
    }

    #[test]
    fn test_length_fields_are_u32() {
        let mut writer = Writer::new();
        writer.len(u32::MAX as usize, "tokens").unwrap();
        assert_eq!(writer.finish(), vec![0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_length_beyond_u32_is_rejected() {
        let mut writer = Writer::new();
        let len = u32::MAX as usize + 1;
        assert_eq!(
            writer.len(len, "tokens"),
            Err(CodecError::TooLarge { what: "tokens", len })
        );
        assert!(writer.finish().is_empty());
    }

    #[test]
    fn test_unknown_token_tag() {
        let mut reader = Reader::new(&[0xEE]);
        assert_eq!(
            reader.token(),
            Err(CodecError::UnknownTag {
                tag: 0xEE,
                context: "token"
            })
        );
    }

    #[test]
    fn test_instruction_tag_is_not_a_value() {
        let mut reader = Reader::new(&[TAG_DUP]);
        assert!(matches!(
            reader.value("stack value"),
            Err(CodecError::UnknownTag { tag: TAG_DUP, .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut reader = Reader::new(&[TAG_STRING, 0, 0, 0, 1, 0xFF]);
        assert_eq!(
            reader.value("stack value"),
            Err(CodecError::InvalidUtf8("stack value"))
        );
    }

    #[test]
    fn test_float_bits_preserved() {
        let mut writer = Writer::new();
        writer.value(&Value::Float(f64::NAN)).unwrap();
        let bytes = writer.finish();
        let mut reader = Reader::new(&bytes);
        match reader.value("stack value").unwrap() {
            Value::Float(n) => assert!(n.is_nan()),
            other => panic!("expected float, got {:?}", other),
        }
    }
}
