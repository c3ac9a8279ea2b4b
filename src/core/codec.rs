//! Canonical binary field codec
//!
//! Every serialized field starts with a header naming its type code and
//! field code; fields appear in ascending `(type, field)` order. Blobs and
//! account ids are length-prefixed (VL), objects end with `0xE1` and arrays
//! with `0xF1`.

use super::amount::AmountError;
use thiserror::Error;

/// Errors produced while encoding or decoding binary transactions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Unexpected end of data at offset {0}")]
    UnexpectedEnd(usize),
    #[error("Unsupported field (type {type_code}, field {field_code})")]
    UnsupportedField { type_code: u8, field_code: u8 },
    #[error("Field (type {type_code}, field {field_code}) out of canonical order")]
    NonCanonicalOrder { type_code: u8, field_code: u8 },
    #[error("Invalid field header at offset {0}")]
    InvalidFieldHeader(usize),
    #[error("Invalid length prefix at offset {0}")]
    InvalidLength(usize),
    #[error("Blob of {0} bytes is too long to encode")]
    BlobTooLong(usize),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Not a payment: transaction type {0}")]
    NotAPayment(u16),
    #[error("Invalid account id length: {0}")]
    InvalidAccountLength(usize),
    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),
}

// =============================================================================
// Field identifiers
// =============================================================================

pub const TYPE_UINT16: u8 = 1;
pub const TYPE_UINT32: u8 = 2;
pub const TYPE_HASH256: u8 = 5;
pub const TYPE_AMOUNT: u8 = 6;
pub const TYPE_BLOB: u8 = 7;
pub const TYPE_ACCOUNT: u8 = 8;
pub const TYPE_OBJECT: u8 = 14;
pub const TYPE_ARRAY: u8 = 15;

/// A `(type code, field code)` pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId {
    pub type_code: u8,
    pub field_code: u8,
}

impl FieldId {
    pub const fn new(type_code: u8, field_code: u8) -> Self {
        Self {
            type_code,
            field_code,
        }
    }

    /// Whether this field is covered by transaction signatures
    pub fn is_signing_field(&self) -> bool {
        *self != TXN_SIGNATURE && *self != SIGNERS
    }
}

pub const TRANSACTION_TYPE: FieldId = FieldId::new(TYPE_UINT16, 2);
pub const NETWORK_ID: FieldId = FieldId::new(TYPE_UINT32, 1);
pub const FLAGS: FieldId = FieldId::new(TYPE_UINT32, 2);
pub const SOURCE_TAG: FieldId = FieldId::new(TYPE_UINT32, 3);
pub const SEQUENCE: FieldId = FieldId::new(TYPE_UINT32, 4);
pub const DESTINATION_TAG: FieldId = FieldId::new(TYPE_UINT32, 14);
pub const LAST_LEDGER_SEQUENCE: FieldId = FieldId::new(TYPE_UINT32, 27);
pub const TICKET_SEQUENCE: FieldId = FieldId::new(TYPE_UINT32, 41);
pub const INVOICE_ID: FieldId = FieldId::new(TYPE_HASH256, 17);
pub const AMOUNT: FieldId = FieldId::new(TYPE_AMOUNT, 1);
pub const FEE: FieldId = FieldId::new(TYPE_AMOUNT, 8);
pub const SEND_MAX: FieldId = FieldId::new(TYPE_AMOUNT, 9);
pub const DELIVER_MIN: FieldId = FieldId::new(TYPE_AMOUNT, 10);
pub const SIGNING_PUB_KEY: FieldId = FieldId::new(TYPE_BLOB, 3);
pub const TXN_SIGNATURE: FieldId = FieldId::new(TYPE_BLOB, 4);
pub const MEMO_TYPE: FieldId = FieldId::new(TYPE_BLOB, 12);
pub const MEMO_DATA: FieldId = FieldId::new(TYPE_BLOB, 13);
pub const MEMO_FORMAT: FieldId = FieldId::new(TYPE_BLOB, 14);
pub const ACCOUNT: FieldId = FieldId::new(TYPE_ACCOUNT, 1);
pub const DESTINATION: FieldId = FieldId::new(TYPE_ACCOUNT, 3);
pub const OBJECT_END: FieldId = FieldId::new(TYPE_OBJECT, 1);
pub const MEMO: FieldId = FieldId::new(TYPE_OBJECT, 10);
pub const SIGNER: FieldId = FieldId::new(TYPE_OBJECT, 16);
pub const ARRAY_END: FieldId = FieldId::new(TYPE_ARRAY, 1);
pub const SIGNERS: FieldId = FieldId::new(TYPE_ARRAY, 3);
pub const MEMOS: FieldId = FieldId::new(TYPE_ARRAY, 9);

// =============================================================================
// Writer
// =============================================================================

/// Append-only encoder for canonical binary fields
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_field_id(&mut self, field: FieldId) {
        let FieldId {
            type_code,
            field_code,
        } = field;
        match (type_code < 16, field_code < 16) {
            (true, true) => self.buf.push((type_code << 4) | field_code),
            (false, true) => self.buf.extend_from_slice(&[field_code, type_code]),
            (true, false) => self.buf.extend_from_slice(&[type_code << 4, field_code]),
            (false, false) => self.buf.extend_from_slice(&[0, type_code, field_code]),
        }
    }

    /// Length-prefixed blob
    pub fn write_vl(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let len = bytes.len();
        match len {
            0..=192 => self.buf.push(len as u8),
            193..=12_480 => {
                let rest = len - 193;
                self.buf.push(193 + (rest >> 8) as u8);
                self.buf.push((rest & 0xFF) as u8);
            }
            12_481..=918_744 => {
                let rest = len - 12_481;
                self.buf.push(241 + (rest >> 16) as u8);
                self.buf.push(((rest >> 8) & 0xFF) as u8);
                self.buf.push((rest & 0xFF) as u8);
            }
            _ => return Err(CodecError::BlobTooLong(len)),
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Cursor over canonical binary data
#[derive(Debug)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let data = self.data;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= data.len())
            .ok_or(CodecError::UnexpectedEnd(self.pos))?;
        let bytes = &data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    pub fn read_field_id(&mut self) -> Result<FieldId, CodecError> {
        let start = self.pos;
        let first = self.read_u8()?;
        let mut type_code = first >> 4;
        let mut field_code = first & 0x0F;

        if type_code == 0 {
            type_code = self.read_u8()?;
            if type_code < 16 {
                return Err(CodecError::InvalidFieldHeader(start));
            }
        }
        if field_code == 0 {
            field_code = self.read_u8()?;
            if field_code < 16 {
                return Err(CodecError::InvalidFieldHeader(start));
            }
        }

        Ok(FieldId::new(type_code, field_code))
    }

    pub fn read_vl_len(&mut self) -> Result<usize, CodecError> {
        let start = self.pos;
        let b0 = self.read_u8()? as usize;
        match b0 {
            0..=192 => Ok(b0),
            193..=240 => {
                let b1 = self.read_u8()? as usize;
                Ok(193 + (b0 - 193) * 256 + b1)
            }
            241..=254 => {
                let b1 = self.read_u8()? as usize;
                let b2 = self.read_u8()? as usize;
                Ok(12_481 + (b0 - 241) * 65_536 + b1 * 256 + b2)
            }
            _ => Err(CodecError::InvalidLength(start)),
        }
    }

    pub fn read_vl(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_vl_len()?;
        Ok(self.read_bytes(len)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(field: FieldId) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        writer.write_field_id(field);
        writer.into_bytes()
    }

    #[test]
    fn test_field_headers() {
        assert_eq!(header(TRANSACTION_TYPE), vec![0x12]);
        assert_eq!(header(ACCOUNT), vec![0x81]);
        assert_eq!(header(LAST_LEDGER_SEQUENCE), vec![0x20, 0x1B]);
        assert_eq!(header(SIGNER), vec![0xE0, 0x10]);
        assert_eq!(header(OBJECT_END), vec![0xE1]);
        assert_eq!(header(ARRAY_END), vec![0xF1]);
        assert_eq!(header(FieldId::new(16, 1)), vec![0x01, 0x10]);
        assert_eq!(header(FieldId::new(17, 20)), vec![0x00, 0x11, 0x14]);
    }

    #[test]
    fn test_field_header_roundtrip() {
        for field in [
            TRANSACTION_TYPE,
            TICKET_SEQUENCE,
            INVOICE_ID,
            SIGNER,
            FieldId::new(16, 1),
            FieldId::new(17, 20),
        ] {
            let bytes = header(field);
            let mut reader = BinaryReader::new(&bytes);
            assert_eq!(reader.read_field_id().unwrap(), field);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn test_vl_length_boundaries() {
        for len in [0usize, 192, 193, 12_480, 12_481, 20_000] {
            let blob = vec![0xAB; len];
            let mut writer = BinaryWriter::new();
            writer.write_vl(&blob).unwrap();
            let bytes = writer.into_bytes();

            let mut reader = BinaryReader::new(&bytes);
            assert_eq!(reader.read_vl().unwrap(), blob);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn test_vl_two_byte_prefix() {
        let mut writer = BinaryWriter::new();
        writer.write_vl(&[0u8; 193]).unwrap();
        assert_eq!(&writer.into_bytes()[..2], &[0xC1, 0x00]);
    }

    #[test]
    fn test_truncated_input() {
        let mut reader = BinaryReader::new(&[0x00, 0x01]);
        assert_eq!(reader.read_u32(), Err(CodecError::UnexpectedEnd(0)));
    }

    #[test]
    fn test_signing_fields() {
        assert!(ACCOUNT.is_signing_field());
        assert!(SIGNING_PUB_KEY.is_signing_field());
        assert!(!TXN_SIGNATURE.is_signing_field());
        assert!(!SIGNERS.is_signing_field());
    }
}
