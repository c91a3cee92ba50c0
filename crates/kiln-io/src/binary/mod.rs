// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Primitive binary writer and reader.
//!
//! [`BinaryWriter`] appends fixed- and variable-width primitives to a growable
//! buffer; [`BinaryReader`] consumes them again through a cursor. Every writer
//! call has a reader counterpart of the same name, and the two only agree when
//! they are driven by the same sequence of calls. Nothing on the wire records
//! which type was written.

mod reader;
mod writer;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;

/// Byte order used for multi-byte primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

/// A fixed-width number that can be written and read in either byte order.
pub trait Primitive: Copy {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Appends the encoded value to `out`.
    fn write_to(self, out: &mut Vec<u8>, endianness: Endianness);

    /// Decodes a value from exactly [`Self::WIDTH`] bytes.
    fn read_from(bytes: &[u8], endianness: Endianness) -> Self;
}

macro_rules! impl_primitive {
    ($($ty:ty),*) => {
        $(impl Primitive for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();

            fn write_to(self, out: &mut Vec<u8>, endianness: Endianness) {
                match endianness {
                    Endianness::Little => out.extend_from_slice(&self.to_le_bytes()),
                    Endianness::Big => out.extend_from_slice(&self.to_be_bytes()),
                }
            }

            fn read_from(bytes: &[u8], endianness: Endianness) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..Self::WIDTH]);
                match endianness {
                    Endianness::Little => <$ty>::from_le_bytes(raw),
                    Endianness::Big => <$ty>::from_be_bytes(raw),
                }
            }
        })*
    };
}

impl_primitive!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_and_reader_agree_in_both_byte_orders() {
        for endianness in [Endianness::Little, Endianness::Big] {
            let mut writer = BinaryWriter::with_endianness(endianness);
            writer.write(-3i8);
            writer.write(0xBEEFu16);
            writer.write(-70_000i32);
            writer.write(u64::MAX - 1);
            writer.write(1.5f32);
            writer.write(-2.25f64);
            writer.write_bool(true);
            writer.write_string("héllo").unwrap();
            writer.write_buffer(&[1, 2, 3]).unwrap();

            let bytes = writer.into_bytes();
            let mut reader = BinaryReader::with_endianness(&bytes, endianness);
            assert_eq!(reader.read::<i8>().unwrap(), -3);
            assert_eq!(reader.read::<u16>().unwrap(), 0xBEEF);
            assert_eq!(reader.read::<i32>().unwrap(), -70_000);
            assert_eq!(reader.read::<u64>().unwrap(), u64::MAX - 1);
            assert_eq!(reader.read::<f32>().unwrap(), 1.5);
            assert_eq!(reader.read::<f64>().unwrap(), -2.25);
            assert!(reader.read_bool().unwrap());
            assert_eq!(reader.read_string().unwrap(), "héllo");
            assert_eq!(reader.read_buffer().unwrap(), vec![1, 2, 3]);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn byte_order_is_honored() {
        let mut little = BinaryWriter::new();
        little.write(1u32);
        assert_eq!(little.as_bytes(), &[1, 0, 0, 0]);

        let mut big = BinaryWriter::with_endianness(Endianness::Big);
        big.write(1u32);
        assert_eq!(big.as_bytes(), &[0, 0, 0, 1]);
    }
}
