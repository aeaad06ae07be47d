use crate::EncodingError;

/// Cursor over a canonical-encoding byte slice, mirroring `Writer`'s field order.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], EncodingError> {
        if self.remaining() < n {
            return Err(EncodingError::UnexpectedEof);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_tag(&mut self) -> Result<u8, EncodingError> {
        self.read_u8()
    }

    pub fn expect_tag(&mut self, expected: u8) -> Result<(), EncodingError> {
        let got = self.read_tag()?;
        if got != expected {
            return Err(EncodingError::UnexpectedTag {
                expected,
                got,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, EncodingError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, EncodingError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u32(&mut self) -> Result<u32, EncodingError> {
        let bytes: [u8; 4] = self.take(4)?.try_into().expect("length checked above");
        Ok(u32::from_be_bytes(bytes))
    }

    pub fn read_u64(&mut self) -> Result<u64, EncodingError> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("length checked above");
        Ok(u64::from_be_bytes(bytes))
    }

    pub fn read_i64(&mut self) -> Result<i64, EncodingError> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("length checked above");
        Ok(i64::from_be_bytes(bytes))
    }

    pub fn read_f64(&mut self) -> Result<f64, EncodingError> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("length checked above");
        Ok(f64::from_bits(u64::from_be_bytes(bytes)))
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, EncodingError> {
        let len = self.read_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    pub fn read_str(&mut self) -> Result<String, EncodingError> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|e| EncodingError::InvalidUtf8(e.to_string()))
    }

    pub fn read_option<T>(
        &mut self,
        read_value: impl FnOnce(&mut Self) -> Result<T, EncodingError>,
    ) -> Result<Option<T>, EncodingError> {
        if self.read_bool()? {
            Ok(Some(read_value(self)?))
        } else {
            Ok(None)
        }
    }

    pub fn read_seq<T>(
        &mut self,
        mut read_elem: impl FnMut(&mut Self) -> Result<T, EncodingError>,
    ) -> Result<Vec<T>, EncodingError> {
        let len = self.read_u32()? as usize;
        let mut out = Vec::with_capacity(len.min(1 << 20));
        for _ in 0..len {
            out.push(read_elem(self)?);
        }
        Ok(out)
    }

    pub fn finish(self) -> Result<(), EncodingError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(EncodingError::TrailingBytes(self.remaining()))
        }
    }
}
