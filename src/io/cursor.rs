use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;

use super::ByteSource;

/// Stateful `Read + Seek` view over a shared [`ByteSource`].
///
/// This is what `zip::ZipArchive` consumes.
pub struct SourceCursor {
    source: Arc<dyn ByteSource>,
    position: u64,
}

impl SourceCursor {
    pub fn new(source: Arc<dyn ByteSource>) -> Self {
        Self {
            source,
            position: 0,
        }
    }
}

impl Read for SourceCursor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.source.len();
        if self.position >= len || buf.is_empty() {
            return Ok(0);
        }

        let n = (len - self.position).min(buf.len() as u64) as usize;
        self.source.read_exact_at(self.position, &mut buf[..n])?;
        self.position += n as u64;
        Ok(n)
    }
}

impl Seek for SourceCursor {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(p) => Some(p),
            SeekFrom::End(delta) => self.source.len().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };

        match target {
            Some(p) => {
                self.position = p;
                Ok(p)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of source",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemorySource;

    #[test]
    fn test_cursor_read_and_seek() {
        let mut cursor = SourceCursor::new(Arc::new(MemorySource::new(b"PK\x03\x04rest".to_vec())));

        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic).unwrap();
        assert_eq!(&magic, b"PK\x03\x04");

        assert_eq!(cursor.seek(SeekFrom::End(-2)).unwrap(), 6);
        let mut tail = Vec::new();
        cursor.read_to_end(&mut tail).unwrap();
        assert_eq!(tail, b"st");

        assert!(cursor.seek(SeekFrom::Current(-20)).is_err());
    }

    #[test]
    fn test_cursor_read_past_end_is_zero() {
        let mut cursor = SourceCursor::new(Arc::new(MemorySource::new(b"ab".to_vec())));
        cursor.seek(SeekFrom::Start(5)).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(cursor.read(&mut buf).unwrap(), 0);
    }
}
