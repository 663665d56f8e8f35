/// One mebibyte, the default zero-fill chunk.
pub const ONE_MB: usize = 1 << 20;

#[derive(Debug, Clone)]
pub struct Options {
    /// size in bytes of each zero block written while filling a fresh data file.
    pub zero_fill_chunk: usize,
    /// fsync both files on `save` and `free`.
    pub sync_on_save: bool,
    /// hold an exclusive advisory lock on the metadata file while the handle is ready.
    pub lock_files: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            zero_fill_chunk: ONE_MB,
            sync_on_save: false,
            lock_files: true,
        }
    }
}

impl Options {
    pub fn with_zero_fill_chunk(mut self, chunk: usize) -> Self {
        self.zero_fill_chunk = chunk.max(1);
        self
    }

    pub fn with_sync_on_save(mut self, sync: bool) -> Self {
        self.sync_on_save = sync;
        self
    }

    pub fn with_lock_files(mut self, lock: bool) -> Self {
        self.lock_files = lock;
        self
    }
}
