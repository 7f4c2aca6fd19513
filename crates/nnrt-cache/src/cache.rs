//! `CompiledCache`: persists a compiled model's backend-owned byte buffers to
//! disk alongside a sidecar describing them, and restores them by
//! memory-mapping the files back in and re-validating every checksum.

use crate::crc16::crc16;
use crate::sidecar::{CacheData, Sidecar, MISSING_OP_VERSION};
use memmap2::{Mmap, MmapOptions};
use nnrt_core::{NnrtResult, NnrtStatus};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_FILES: usize = 100;

fn canonicalize_dir(dir: &Path) -> NnrtResult<PathBuf> {
    let canon = dir.canonicalize().map_err(|e| {
        log::error!("CompiledCache: cannot canonicalize cache dir {:?}: {}.", dir, e);
        NnrtStatus::InvalidFile
    })?;
    let text = canon.to_string_lossy();
    if !text.starts_with('/') || text.contains("//") {
        log::error!("CompiledCache: cache dir {:?} is not a clean absolute path.", canon);
        return Err(NnrtStatus::InvalidFile);
    }
    Ok(canon)
}

fn info_path(dir: &Path, model_name: &str) -> PathBuf {
    dir.join(format!("{model_name}cache_info.nncache"))
}

fn buffer_path(dir: &Path, model_name: &str, index: usize) -> PathBuf {
    dir.join(format!("{model_name}{index}.nncache"))
}

/// A restored set of memory-mapped cache buffers. Dropping it (or calling
/// `release` explicitly) unmaps every buffer and closes the underlying file
/// descriptors.
pub struct RestoredCache {
    buffers: Vec<Mmap>,
}

impl RestoredCache {
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn buffer(&self, index: usize) -> &[u8] {
        &self.buffers[index]
    }

    /// Unmaps every buffer now rather than waiting for drop.
    pub fn release(self) {
        drop(self);
    }
}

/// Identity under which a cache is saved and restored: the backend that
/// compiled the model, and the op-version it reports for compatibility
/// checking. Implemented by whichever backend wrapper owns the compiled
/// kernel; kept independent of the `Backend` trait itself so this crate
/// doesn't need to depend on `nnrt-backend`.
pub trait CacheIdentity {
    fn device_id(&self) -> i64;
    fn op_version(&self) -> i64;
}

pub struct CompiledCache;

impl CompiledCache {
    /// Saves `buffers` (the prepared model's cacheable byte buffers) under
    /// `dir/model_name`, tagged with `version` and the identity's device and
    /// op-version.
    pub fn save(
        buffers: &[Vec<u8>],
        dir: &Path,
        model_name: &str,
        version: i64,
        identity: &dyn CacheIdentity,
    ) -> NnrtResult<()> {
        if buffers.is_empty() {
            log::error!("CompiledCache::save: refusing to save an empty buffer list.");
            return Err(NnrtStatus::SaveCacheException);
        }
        if buffers.len() > MAX_FILES {
            log::error!(
                "CompiledCache::save: {} buffers exceeds the {} file limit.",
                buffers.len(),
                MAX_FILES
            );
            return Err(NnrtStatus::SaveCacheException);
        }
        let dir = canonicalize_dir(dir).map_err(|_| NnrtStatus::SaveCacheException)?;

        let mut model_check_sum = Vec::with_capacity(buffers.len());
        for (i, buf) in buffers.iter().enumerate() {
            let path = buffer_path(&dir, model_name, i);
            let mut file = File::create(&path).map_err(|e| {
                log::error!("CompiledCache::save: cannot create {:?}: {}.", path, e);
                NnrtStatus::SaveCacheException
            })?;
            file.write_all(buf).map_err(|e| {
                log::error!("CompiledCache::save: cannot write {:?}: {}.", path, e);
                NnrtStatus::SaveCacheException
            })?;
            model_check_sum.push(crc16(buf));
        }

        let data = CacheData {
            file_number: buffers.len() as i64,
            version,
            device_id: identity.device_id(),
            model_check_sum,
            op_version: Some(identity.op_version()),
            is_exceed_ram_limit: 0,
        };
        let sidecar = Sidecar::new(data).map_err(|e| {
            log::error!("CompiledCache::save: failed to serialize sidecar: {}.", e);
            NnrtStatus::SaveCacheException
        })?;
        let text = serde_json::to_vec(&sidecar).map_err(|e| {
            log::error!("CompiledCache::save: failed to serialize sidecar: {}.", e);
            NnrtStatus::SaveCacheException
        })?;
        std::fs::write(info_path(&dir, model_name), text).map_err(|e| {
            log::error!("CompiledCache::save: failed to write sidecar: {}.", e);
            NnrtStatus::SaveCacheException
        })?;
        Ok(())
    }

    /// Restores a previously saved cache for `model_name` under `dir`,
    /// verifying it belongs to `device_id` and is compatible with `version`.
    pub fn restore(dir: &Path, model_name: &str, version: i64, device_id: i64) -> NnrtResult<RestoredCache> {
        let dir = canonicalize_dir(dir)?;
        let info = info_path(&dir, model_name);
        let text = std::fs::read(&info).map_err(|e| {
            log::warn!("CompiledCache::restore: sidecar {:?} unreadable: {}.", info, e);
            NnrtStatus::InvalidFile
        })?;
        let sidecar: Sidecar = serde_json::from_slice(&text).map_err(|e| {
            log::warn!("CompiledCache::restore: sidecar {:?} failed to parse: {}.", info, e);
            NnrtStatus::InvalidFile
        })?;
        if !sidecar.checksum_matches().map_err(|_| NnrtStatus::InvalidFile)? {
            log::warn!("CompiledCache::restore: sidecar {:?} CheckSum mismatch.", info);
            return Err(NnrtStatus::InvalidFile);
        }
        if sidecar.data.op_version.is_none() {
            log::warn!(
                "CompiledCache::restore: sidecar {:?} has no opVersion, defaulting to sentinel {}.",
                info,
                MISSING_OP_VERSION
            );
        }
        if sidecar.data.device_id != device_id {
            log::warn!("CompiledCache::restore: device_id mismatch in {:?}.", info);
            return Err(NnrtStatus::InvalidFile);
        }
        if sidecar.data.version > version {
            log::warn!(
                "CompiledCache::restore: cache version {} is ahead of requested {}.",
                sidecar.data.version,
                version
            );
            return Err(NnrtStatus::InvalidFile);
        }
        if sidecar.data.version < version {
            log::warn!(
                "CompiledCache::restore: cache version {} is stale relative to requested {}.",
                sidecar.data.version,
                version
            );
            return Err(NnrtStatus::OperationForbidden);
        }

        let mut buffers = Vec::with_capacity(sidecar.data.file_number as usize);
        for i in 0..sidecar.data.file_number as usize {
            let path = buffer_path(&dir, model_name, i);
            let file = File::open(&path).map_err(|e| {
                log::warn!("CompiledCache::restore: cannot open {:?}: {}.", path, e);
                NnrtStatus::InvalidFile
            })?;
            let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(|e| {
                log::warn!("CompiledCache::restore: cannot map {:?}: {}.", path, e);
                NnrtStatus::InvalidFile
            })?;
            let expected = sidecar.data.model_check_sum[i];
            if crc16(&mmap) != expected {
                log::warn!("CompiledCache::restore: CRC mismatch for {:?}.", path);
                return Err(NnrtStatus::InvalidFile);
            }
            buffers.push(mmap);
        }
        Ok(RestoredCache { buffers })
    }
}
