use crate::error::Error;
use crate::storage::{File, Storage};
use crate::IResult;
use std::fs::File as SysFile;
use std::fs::{remove_file, OpenOptions};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct FileStorage;

impl Storage for FileStorage {
    type F = SysFile;

    fn create<P: AsRef<Path>>(&self, name: P) -> IResult<Self::F> {
        OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(name)
            .map_err(Error::IO)
    }

    fn open<P: AsRef<Path>>(&self, name: P) -> IResult<Self::F> {
        OpenOptions::new()
            .write(true)
            .read(true)
            .open(name)
            .map_err(Error::IO)
    }

    fn remove<P: AsRef<Path>>(&self, name: P) -> IResult<()> {
        remove_file(name).map_err(Error::IO)
    }

    fn exists<P: AsRef<Path>>(&self, name: P) -> bool {
        name.as_ref().exists()
    }
}

impl File for SysFile {
    fn lock_file(&self) -> IResult<()> {
        fs2::FileExt::try_lock_exclusive(self).map_err(Error::IO)
    }

    fn unlock_file(&self) -> IResult<()> {
        fs2::FileExt::unlock(self).map_err(Error::IO)
    }

    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> IResult<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset).map_err(Error::IO)
    }

    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> IResult<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset).map_err(Error::IO)
    }

    #[cfg(unix)]
    fn write_at(&self, buf: &[u8], offset: u64) -> IResult<usize> {
        std::os::unix::fs::FileExt::write_at(self, buf, offset).map_err(Error::IO)
    }

    #[cfg(windows)]
    fn write_at(&self, buf: &[u8], offset: u64) -> IResult<usize> {
        std::os::windows::fs::FileExt::seek_write(self, buf, offset).map_err(Error::IO)
    }

    fn write(&mut self, buf: &[u8]) -> IResult<()> {
        Write::write_all(self, buf).map_err(Error::IO)
    }

    fn flush(&mut self) -> IResult<()> {
        Write::flush(self).map_err(Error::IO)
    }

    fn sync(&self) -> IResult<()> {
        SysFile::sync_all(self).map_err(Error::IO)
    }

    fn len(&self) -> IResult<u64> {
        SysFile::metadata(self)
            .map(|m| m.len())
            .map_err(Error::IO)
    }

    fn close(&mut self) -> IResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_name(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("bloomdisk-file-{}-{}", tag, rand::random::<u64>()))
    }

    #[test]
    fn test_read_exact_at() {
        let name = temp_name("read");
        let storage = FileStorage;
        let mut f = storage.create(&name).unwrap();
        File::write(&mut f, "hello world".as_bytes()).unwrap();
        f.sync().unwrap();
        let tests = vec![
            (0, "hello world"),
            (0, ""),
            (1, "ello"),
            (4, "o world"),
            (100, ""),
        ];
        let rf = storage.open(&name).unwrap();
        let mut buffer = vec![];
        for (offset, expect) in tests {
            buffer.resize(expect.as_bytes().len(), 0u8);
            rf.read_exact_at(buffer.as_mut_slice(), offset).unwrap();
            assert_eq!(buffer, Vec::from(String::from(expect)));
        }
        // EOF case
        buffer.resize(100, 0u8);
        rf.read_exact_at(buffer.as_mut_slice(), 2)
            .expect_err("failed to fill whole buffer");
        storage.remove(&name).unwrap();
    }

    #[test]
    fn test_write_all_at_overwrites_in_place() {
        let name = temp_name("write");
        let storage = FileStorage;
        let mut f = storage.create(&name).unwrap();
        File::write(&mut f, &[0u8; 8]).unwrap();
        f.write_all_at(&[0xab, 0xcd], 3).unwrap();
        assert_eq!(f.len().unwrap(), 8);

        let mut buf = [0u8; 8];
        f.read_exact_at(&mut buf, 0).unwrap();
        assert_eq!(buf, [0u8, 0, 0, 0xab, 0xcd, 0, 0, 0]);
        storage.remove(&name).unwrap();
    }

    #[test]
    fn test_open_missing_is_not_found() {
        let name = temp_name("missing");
        let storage = FileStorage;
        assert!(!storage.exists(&name));
        match storage.open(&name) {
            Err(Error::IO(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected open result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_exclusive_lock() {
        let name = temp_name("lock");
        let storage = FileStorage;
        let f = storage.create(&name).unwrap();
        let other = storage.open(&name).unwrap();
        f.lock_file().unwrap();
        assert!(other.lock_file().is_err());
        f.unlock_file().unwrap();
        other.lock_file().unwrap();
        other.unlock_file().unwrap();
        storage.remove(&name).unwrap();
    }
}
