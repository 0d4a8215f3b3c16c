use std::fs::File;
use std::io;
use std::path::Path;
#[cfg(all(not(unix), not(windows)))]
use std::io::{Read, Seek, SeekFrom};
#[cfg(all(not(unix), not(windows)))]
use std::sync::Mutex;

/// A random-access source of archive bytes.
///
/// Reads never move a shared cursor, so a source can be wrapped by several
/// [`SourceCursor`](super::SourceCursor)s at once.
pub trait ByteSource: Send + Sync {
    /// Total length of the source in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// Fails with `UnexpectedEof` when fewer than `buf.len()` bytes remain.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()>;
}

/// Archive bytes read straight from a file on disk.
pub struct FileSource {
    #[cfg(any(unix, windows))]
    file: File,
    #[cfg(all(not(unix), not(windows)))]
    file: Mutex<File>,
    len: u64,
}

impl FileSource {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Self::new(File::open(path)?)
    }

    pub fn new(file: File) -> io::Result<Self> {
        let len = file.metadata()?.len();
        #[cfg(all(not(unix), not(windows)))]
        let file = Mutex::new(file);
        Ok(Self { file, len })
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    #[cfg(unix)]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        use std::os::unix::fs::FileExt;
        self.file.read_exact_at(buf, offset)
    }

    #[cfg(windows)]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        use std::os::windows::fs::FileExt;
        let mut filled = 0;
        while filled < buf.len() {
            let n = self
                .file
                .seek_read(&mut buf[filled..], offset + filled as u64)?;
            if n == 0 {
                return Err(io::ErrorKind::UnexpectedEof.into());
            }
            filled += n;
        }
        Ok(())
    }

    #[cfg(all(not(unix), not(windows)))]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("file source lock poisoned"))?;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)
    }
}

/// Archive bytes held in memory.
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for MemorySource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl ByteSource for MemorySource {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let start = usize::try_from(offset)
            .ok()
            .filter(|&start| start <= self.data.len())
            .ok_or(io::ErrorKind::UnexpectedEof)?;
        let end = start
            .checked_add(buf.len())
            .filter(|&end| end <= self.data.len())
            .ok_or(io::ErrorKind::UnexpectedEof)?;
        buf.copy_from_slice(&self.data[start..end]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_reads_window() {
        let source = MemorySource::new(b"mimetypeapplication/epub+zip".to_vec());
        let mut buf = [0u8; 11];
        source.read_exact_at(8, &mut buf).unwrap();
        assert_eq!(&buf, b"application");
    }

    #[test]
    fn test_memory_source_short_read_is_eof() {
        let source = MemorySource::from(b"abc".to_vec());
        let mut buf = [0u8; 4];
        let err = source.read_exact_at(0, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let err = source.read_exact_at(10, &mut buf[..1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_file_source_len_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bytes.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let source = FileSource::open(&path).unwrap();
        assert_eq!(source.len(), 10);
        assert!(!source.is_empty());

        let mut buf = [0u8; 3];
        source.read_exact_at(4, &mut buf).unwrap();
        assert_eq!(&buf, b"456");
    }
}
