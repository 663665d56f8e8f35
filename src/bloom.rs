//! The disk resident Bloom filter handle.
//!
//! A filter is two files sharing a base name: `<base>.blm` holds the
//! metadata record and `<base>.dat` holds the raw bit array. The bit array is
//! never loaded as a whole, every probe reads (and possibly rewrites) a single
//! byte of the data file.
//!
//! A handle moves between three states: zero (fresh `BloomDisk::new()` or a
//! failed `init`), ready (after a successful `init`) and zero again after
//! `free`. A zeroed handle may be initialized again.

use crate::error::Error;
use crate::filter::{bits, Meta, Params, Probes, META_SIZE};
use crate::opt::Options;
use crate::storage::{File, FileStorage, Storage};
use crate::IResult;
use log::{debug, error, warn};
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const VERSION_MAJOR: u8 = 0;
pub const VERSION_MINOR: u8 = 1;

/// Longest accepted file name (`<base>.blm` / `<base>.dat`), directories excluded.
pub const MAX_NAME_LEN: usize = 69;

pub const META_SUFFIX: &str = "blm";
pub const DATA_SUFFIX: &str = "dat";

/// How a successful `init` obtained its files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// New zeroed files were created.
    Fresh,
    /// Files left by a previous handle were adopted.
    Reopened,
}

impl Outcome {
    /// The classic integer code: 1 for fresh files, 2 for adopted ones.
    pub fn code(self) -> i32 {
        match self {
            Outcome::Fresh => 1,
            Outcome::Reopened => 2,
        }
    }
}

/// Everything guarded by the handle mutex: both files and the counters.
struct Core<F: File> {
    data: F,
    meta: F,
    current_entries: u64,
    collisions: u64,
}

impl<F: File> Core<F> {
    /// Rewrites the metadata record from the current counters.
    fn persist(&self, params: &Params, sync: bool) -> IResult<()> {
        let record = Meta::new(params, self.current_entries, self.collisions);
        self.meta.write_all_at(&record.encode(), 0)?;
        if sync {
            self.data.sync()?;
            self.meta.sync()?;
        }
        Ok(())
    }
}

pub struct BloomDisk<S: Storage = FileStorage> {
    storage: S,
    options: Options,
    params: Params,
    name: String,
    filename_struct: PathBuf,
    filename_data: PathBuf,
    major: u8,
    minor: u8,
    // `Some` iff the handle is ready.
    core: Option<Mutex<Core<S::F>>>,
}

impl BloomDisk<FileStorage> {
    /// Returns a zeroed handle backed by the local file system.
    pub fn new() -> Self {
        Self::with_storage(FileStorage, Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Self::with_storage(FileStorage, options)
    }

    /// Shorthand for `new` followed by `init`.
    pub fn open<P: AsRef<Path>>(entries: u64, error: f64, base: P) -> IResult<(Self, Outcome)> {
        let mut bloom = Self::new();
        let outcome = bloom.init(entries, error, base)?;
        Ok((bloom, outcome))
    }
}

impl Default for BloomDisk<FileStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Storage> BloomDisk<S> {
    pub fn with_storage(storage: S, options: Options) -> Self {
        BloomDisk {
            storage,
            options,
            params: Params::default(),
            name: String::new(),
            filename_struct: PathBuf::new(),
            filename_data: PathBuf::new(),
            major: 0,
            minor: 0,
            core: None,
        }
    }

    /// Initializes the filter for `entries` elements at false positive rate
    /// `error`, backed by `<base>.blm` and `<base>.dat`.
    ///
    /// When the metadata file does not exist both files are created and the
    /// data file is zero filled (`Outcome::Fresh`). Otherwise the stored
    /// dimensions must match the ones derived from `entries` and `error`, and
    /// the stored counters are adopted (`Outcome::Reopened`).
    ///
    /// A ready handle is freed first. On failure the handle is left zeroed.
    pub fn init<P: AsRef<Path>>(&mut self, entries: u64, error: f64, base: P) -> IResult<Outcome> {
        if self.is_ready() {
            self.free()?;
        }
        self.reset();
        let base = base.as_ref();
        match self.try_init(entries, error, base) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("bloomdisk_init: {}: {}", base.display(), e);
                self.reset();
                Err(e)
            }
        }
    }

    fn try_init(&mut self, entries: u64, error: f64, base: &Path) -> IResult<Outcome> {
        let params = Params::new(entries, error)?;
        let (filename_struct, filename_data) = file_names(base)?;

        let (core, outcome) = match self.storage.open(&filename_struct) {
            Ok(meta) => {
                let core = self.reopen_files(meta, &params, &filename_struct, &filename_data)?;
                (core, Outcome::Reopened)
            }
            Err(Error::IO(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                let core = self.create_files(&params, &filename_struct, &filename_data)?;
                (core, Outcome::Fresh)
            }
            Err(e) => return Err(e),
        };

        debug!(
            "bloomdisk {}: {:?}, {} bits, {} hashes, {} of {} entries",
            base.display(),
            outcome,
            params.bits,
            params.hashes,
            core.current_entries,
            params.entries
        );
        self.params = params;
        self.name = base.display().to_string();
        self.filename_struct = filename_struct;
        self.filename_data = filename_data;
        self.major = VERSION_MAJOR;
        self.minor = VERSION_MINOR;
        self.core = Some(Mutex::new(core));
        Ok(outcome)
    }

    fn lock_meta(&self, meta: &S::F, path: &Path) -> IResult<()> {
        if !self.options.lock_files {
            return Ok(());
        }
        meta.lock_file()
            .map_err(|e| Error::Locked(format!("{}: {}", path.display(), e)))
    }

    fn create_files(
        &self,
        params: &Params,
        meta_path: &Path,
        data_path: &Path,
    ) -> IResult<Core<S::F>> {
        let meta = self.storage.create(meta_path)?;
        let mut data_created = false;
        let result = self.fill_files(meta, params, meta_path, data_path, &mut data_created);
        if result.is_err() {
            // Remove only the files this call created.
            let mut created = vec![meta_path];
            if data_created {
                created.push(data_path);
            }
            for path in created {
                if let Err(e) = self.storage.remove(path) {
                    warn!("bloomdisk_init: cant remove {}: {}", path.display(), e);
                }
            }
        }
        result
    }

    fn fill_files(
        &self,
        meta: S::F,
        params: &Params,
        meta_path: &Path,
        data_path: &Path,
        data_created: &mut bool,
    ) -> IResult<Core<S::F>> {
        self.lock_meta(&meta, meta_path)?;
        let mut data = self.storage.create(data_path)?;
        *data_created = true;

        let chunk_len = (self.options.zero_fill_chunk.max(1) as u64).min(params.bytes) as usize;
        let zeros = vec![0u8; chunk_len];
        let mut left = params.bytes;
        while left != 0 {
            let n = left.min(chunk_len as u64) as usize;
            data.write(&zeros[..n])?;
            left -= n as u64;
        }
        data.flush()?;

        let core = Core {
            data,
            meta,
            current_entries: 0,
            collisions: 0,
        };
        // The pair must be reopenable even if `save` is never called.
        core.persist(params, self.options.sync_on_save)?;
        Ok(core)
    }

    fn reopen_files(
        &self,
        meta: S::F,
        params: &Params,
        meta_path: &Path,
        data_path: &Path,
    ) -> IResult<Core<S::F>> {
        self.lock_meta(&meta, meta_path)?;
        let data = self.storage.open(data_path)?;

        let mut buf = [0u8; META_SIZE];
        meta.read_exact_at(&mut buf, 0).map_err(|e| match e {
            Error::IO(ref io) if io.kind() == std::io::ErrorKind::UnexpectedEof => Error::Corruption(
                format!("{}: short metadata record", meta_path.display()),
            ),
            e => e,
        })?;
        let stored = Meta::decode(&buf)?;
        if !stored.ready {
            return Err(Error::Corruption(format!(
                "{}: ready flag is clear",
                meta_path.display()
            )));
        }
        stored.check_layout(params)?;

        let len = data.len()?;
        if len != params.bytes {
            return Err(Error::Corruption(format!(
                "{}: {} bytes, expected {}",
                data_path.display(),
                len,
                params.bytes
            )));
        }

        Ok(Core {
            data,
            meta,
            current_entries: stored.current_entries,
            collisions: stored.collisions,
        })
    }

    fn lock_core(&self) -> IResult<MutexGuard<'_, Core<S::F>>> {
        let core = self.core.as_ref().ok_or(Error::NotReady)?;
        Ok(core.lock()?)
    }

    fn check_add(&self, key: &[u8], add: bool) -> IResult<bool> {
        if !self.is_ready() {
            return Err(Error::NotReady);
        }
        let mut hits = 0u8;
        for x in Probes::new(key, self.params.hashes, self.params.bits) {
            // One critical section per probe: no atomicity across the probes
            // of one key, but a byte is never read-modify-written concurrently.
            let was_set = {
                let core = self.lock_core()?;
                bits::test_bit_set_bit(&core.data, x, add)?
            };
            if was_set {
                hits += 1;
            } else if !add {
                return Ok(false);
            }
        }
        Ok(hits == self.params.hashes)
    }

    /// Returns true if `key` may be in the filter, false if it certainly is not.
    pub fn check(&self, key: &[u8]) -> IResult<bool> {
        self.check_add(key, false)
    }

    /// Adds `key` to the filter.
    ///
    /// Returns true if all of its bits were already set, i.e. the key (or a
    /// collision) had been added before. Every call bumps `current_entries`,
    /// a true return also bumps `collisions`.
    pub fn add(&self, key: &[u8]) -> IResult<bool> {
        let collided = self.check_add(key, true)?;
        let mut core = self.lock_core()?;
        core.current_entries += 1;
        if collided {
            core.collisions += 1;
        }
        Ok(collided)
    }

    /// Rewrites the metadata file from the current state. The data file is
    /// only synced when `Options::sync_on_save` is set.
    pub fn save(&self) -> IResult<()> {
        let core = self.lock_core()?;
        core.persist(&self.params, self.options.sync_on_save)?;
        debug!(
            "bloomdisk {}: saved {} entries, {} collisions",
            self.name, core.current_entries, core.collisions
        );
        Ok(())
    }

    /// Flushes the metadata, closes both files and zeroes the handle.
    ///
    /// Freeing a handle that is not ready only zeroes it.
    pub fn free(&mut self) -> IResult<()> {
        let result = match self.core.take() {
            Some(core) => {
                // The counters stay consistent even if a prober panicked.
                let mut core = core.into_inner().unwrap_or_else(PoisonError::into_inner);
                let mut result = core.persist(&self.params, self.options.sync_on_save);
                if self.options.lock_files {
                    result = result.and(core.meta.unlock_file());
                }
                result = result.and(core.data.close()).and(core.meta.close());
                debug!("bloomdisk {}: closed", self.name);
                result
            }
            None => Ok(()),
        };
        self.reset();
        result
    }

    fn reset(&mut self) {
        self.params = Params::default();
        self.name.clear();
        self.filename_struct = PathBuf::new();
        self.filename_data = PathBuf::new();
        self.major = 0;
        self.minor = 0;
        self.core = None;
    }

    /// Writes the diagnostic summary to standard output.
    pub fn print(&self) {
        print!("{}", self);
    }

    fn counters(&self) -> (u64, u64) {
        match &self.core {
            Some(core) => {
                let core = core.lock().unwrap_or_else(PoisonError::into_inner);
                (core.current_entries, core.collisions)
            }
            None => (0, 0),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.core.is_some()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn entries(&self) -> u64 {
        self.params.entries
    }

    pub fn error(&self) -> f64 {
        self.params.error
    }

    pub fn bpe(&self) -> f64 {
        self.params.bpe
    }

    pub fn bits(&self) -> u64 {
        self.params.bits
    }

    pub fn bytes(&self) -> u64 {
        self.params.bytes
    }

    pub fn hashes(&self) -> u8 {
        self.params.hashes
    }

    pub fn current_entries(&self) -> u64 {
        self.counters().0
    }

    pub fn collisions(&self) -> u64 {
        self.counters().1
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Format version as (major, minor), (0, 0) while not ready.
    pub fn version(&self) -> (u8, u8) {
        (self.major, self.minor)
    }

    pub fn meta_path(&self) -> &Path {
        &self.filename_struct
    }

    pub fn data_path(&self) -> &Path {
        &self.filename_data
    }
}

impl<S: Storage> Display for BloomDisk<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (current_entries, collisions) = self.counters();
        writeln!(f, "bloom disk {}", self.name)?;
        if !self.is_ready() {
            writeln!(f, " *** NOT READY ***")?;
        }
        writeln!(f, " ->version = {}.{}", self.major, self.minor)?;
        writeln!(f, " ->entries = {}", self.params.entries)?;
        writeln!(f, " ->current_entries = {}", current_entries)?;
        writeln!(f, " ->collisions = {}", collisions)?;
        writeln!(f, " ->error = {:.6}", self.params.error)?;
        writeln!(f, " ->bits = {}", self.params.bits)?;
        writeln!(f, " ->bits per elem = {:.6}", self.params.bpe)?;
        let kb = self.params.bytes / 1024;
        let mb = kb / 1024;
        let gb = mb / 1024;
        writeln!(
            f,
            " ->bytes = {} ({} KB, {} MB, {} GB)",
            self.params.bytes, kb, mb, gb
        )?;
        writeln!(f, " ->hash functions = {}", self.params.hashes)
    }
}

impl<S: Storage> Drop for BloomDisk<S> {
    fn drop(&mut self) {
        if self.is_ready() {
            let name = self.name.clone();
            if let Err(e) = self.free() {
                warn!("bloomdisk {}: flush on drop failed: {}", name, e);
            }
        }
    }
}

/// Derives `(<base>.blm, <base>.dat)`.
fn file_names(base: &Path) -> IResult<(PathBuf, PathBuf)> {
    let stem = base
        .file_name()
        .ok_or_else(|| Error::InvalidParam(format!("{} has no file name", base.display())))?;
    let len = stem.to_string_lossy().chars().count() + 1 + META_SUFFIX.len();
    if len > MAX_NAME_LEN {
        return Err(Error::NameTooLong(format!(
            "{}.{} has {} characters, at most {} allowed",
            stem.to_string_lossy(),
            META_SUFFIX,
            len,
            MAX_NAME_LEN
        )));
    }
    Ok((with_suffix(base, META_SUFFIX), with_suffix(base, DATA_SUFFIX)))
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        let (meta, data) = file_names(Path::new("dir/t1")).unwrap();
        assert_eq!(meta, PathBuf::from("dir/t1.blm"));
        assert_eq!(data, PathBuf::from("dir/t1.dat"));

        // A dot in the base is kept, not treated as an extension.
        let (meta, _) = file_names(Path::new("t1.v2")).unwrap();
        assert_eq!(meta, PathBuf::from("t1.v2.blm"));
    }

    #[test]
    fn test_file_name_length_bound() {
        let longest = "x".repeat(MAX_NAME_LEN - 4);
        assert!(file_names(Path::new(&longest)).is_ok());

        let too_long = "x".repeat(MAX_NAME_LEN - 3);
        match file_names(Path::new(&too_long)) {
            Err(Error::NameTooLong(_)) => {}
            other => panic!("unexpected: {:?}", other),
        }

        // Only the file name counts, not the directories above it.
        let deep = Path::new(&"d".repeat(200)).join("t1");
        assert!(file_names(&deep).is_ok());
        assert!(file_names(Path::new("")).is_err());
    }

    #[test]
    fn test_zero_handle() {
        let bloom = BloomDisk::new();
        assert!(!bloom.is_ready());
        assert_eq!(bloom.version(), (0, 0));
        assert_eq!(bloom.current_entries(), 0);
        assert_eq!(bloom.bits(), 0);
        match bloom.check(b"abc") {
            Err(Error::NotReady) => {}
            other => panic!("unexpected: {:?}", other),
        }
        match bloom.add(b"abc") {
            Err(Error::NotReady) => {}
            other => panic!("unexpected: {:?}", other),
        }
        assert!(bloom.save().is_err());
        assert!(bloom.to_string().contains("*** NOT READY ***"));
    }

    #[test]
    fn test_free_zero_handle() {
        let mut bloom = BloomDisk::new();
        bloom.free().unwrap();
        assert!(!bloom.is_ready());
    }

    #[test]
    fn test_outcome_code() {
        assert_eq!(Outcome::Fresh.code(), 1);
        assert_eq!(Outcome::Reopened.code(), 2);
    }
}
