use std::io::{Error, ErrorKind, Read, Result};

#[derive(Clone, Copy, Default)]
enum Endianness {
    #[default]
    Big,
    Little,
}

/// Reader for walking vendor container headers. Borrows the file bytes, so
/// every candidate parser gets its own cursor and the buffer itself is never
/// disturbed.
pub struct Reader<'a> {
    endian: Endianness,
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    pub fn new_big_endian(data: &'a [u8]) -> Self {
        Self {
            endian: Endianness::Big,
            data,
            position: 0,
        }
    }

    pub fn new_little_endian(data: &'a [u8]) -> Self {
        Self {
            endian: Endianness::Little,
            data,
            position: 0,
        }
    }

    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    pub fn get_position(&self) -> usize {
        self.position
    }

    pub fn skip(&mut self, bytes: usize) -> Result<()> {
        let position = self.position + bytes;

        if position > self.data.len() {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                "reader skips out of bounds",
            ));
        }

        self.position = position;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;

        match self.endian {
            Endianness::Big => Ok(u32::from_be_bytes(buf)),
            Endianness::Little => Ok(u32::from_le_bytes(buf)),
        }
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;

        match self.endian {
            Endianness::Big => Ok(i32::from_be_bytes(buf)),
            Endianness::Little => Ok(i32::from_le_bytes(buf)),
        }
    }

    /// Borrows the next `length` bytes without copying them.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        if self.position + length > self.data.len() {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                "reader reads out of bounds",
            ));
        }

        let bytes = &self.data[self.position..self.position + length];
        self.position += length;
        Ok(bytes)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut remaining = &self.data[self.position..];
        remaining.read_exact(buf)?;
        self.position += buf.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_both_endians() {
        let data = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(Reader::new_big_endian(&data).read_u32().unwrap(), 0x01020304);
        assert_eq!(
            Reader::new_little_endian(&data).read_u32().unwrap(),
            0x04030201
        );
    }

    #[test]
    fn skip_and_borrowed_bytes() {
        let data = [0xaa, 0xbb, 0xcc, 0xdd];
        let mut reader = Reader::new_little_endian(&data);
        reader.skip(1).unwrap();
        assert_eq!(reader.read_bytes(2).unwrap(), &[0xbb, 0xcc]);
        assert_eq!(reader.get_position(), 3);
        assert!(reader.has_more_data());
        assert!(reader.skip(2).is_err());
        assert!(reader.read_bytes(2).is_err());
    }
}
