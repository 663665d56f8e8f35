use crate::error::Error;
use crate::IResult;
use std::path::Path;

mod file;

pub use file::FileStorage;

pub trait Storage: Sync + Send {
    type F: File + 'static;

    /// Create the specified path file, truncating it if it already exists.
    fn create<P: AsRef<Path>>(&self, name: P) -> IResult<Self::F>;

    /// Open an existing file for writing and reading.
    ///
    /// Returns `Error::IO` with kind `NotFound` if the file does not exist.
    fn open<P: AsRef<Path>>(&self, name: P) -> IResult<Self::F>;

    /// Delete the named file
    fn remove<P: AsRef<Path>>(&self, name: P) -> IResult<()>;

    /// Returns true iff the name file exists.
    fn exists<P: AsRef<Path>>(&self, name: P) -> bool;
}

pub trait File: Sync + Send {
    /// Lock the file for exclusive usage without blocking.
    fn lock_file(&self) -> IResult<()>;

    /// UnLock the file
    fn unlock_file(&self) -> IResult<()>;

    /// Reads bytes from an offset in this source into a buffer, returning how
    /// many bytes were read.
    ///
    /// This function may yield fewer bytes than the size of `buf`, if it was
    /// interrupted or hit the "EOF".
    fn read_at(&self, buf: &mut [u8], offset: u64) -> IResult<usize>;

    /// Reads the exact number of bytes required to fill `buf` from an `offset`.
    ///
    /// Errors if the "EOF" is encountered before filling the buffer.
    fn read_exact_at(&self, mut buf: &mut [u8], mut offset: u64) -> IResult<()> {
        while !buf.is_empty() {
            match self.read_at(buf, offset) {
                Ok(0) => break,
                Ok(n) => {
                    let tmp = buf;
                    buf = &mut tmp[n..];
                    offset += n as u64;
                }
                Err(Error::IO(err)) if err.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        if !buf.is_empty() {
            return Err(Error::IO(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "failed to fill whole buffer.",
            )));
        }
        Ok(())
    }

    /// Writes bytes at an offset, returning how many bytes were written.
    fn write_at(&self, buf: &[u8], offset: u64) -> IResult<usize>;

    /// Writes the whole of `buf` starting at `offset`.
    fn write_all_at(&self, mut buf: &[u8], mut offset: u64) -> IResult<()> {
        while !buf.is_empty() {
            match self.write_at(buf, offset) {
                Ok(0) => {
                    return Err(Error::IO(std::io::Error::new(
                        std::io::ErrorKind::WriteZero,
                        "failed to write whole buffer.",
                    )));
                }
                Ok(n) => {
                    buf = &buf[n..];
                    offset += n as u64;
                }
                Err(Error::IO(err)) if err.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Append the whole of `buf` at the current position.
    fn write(&mut self, buf: &[u8]) -> IResult<()>;

    /// Flush buffer bytes to the operating system.
    fn flush(&mut self) -> IResult<()>;

    /// Flush file content to disk.
    fn sync(&self) -> IResult<()>;

    fn len(&self) -> IResult<u64>;

    /// Close the fd.
    fn close(&mut self) -> IResult<()>;
}
