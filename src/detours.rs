use crate::disassembly;
use crate::error::{DetourError, DetourErrorKind};
use crate::mem::{ExecutableMemoryRegion, NativeAddress};
use crate::resolve::MethodHandle;
use crate::stub::{self, STUB_SIZE};
use fnv::FnvHashMap;
use log::{debug, error};

/// One requested redirection, built transiently per patch operation.
///
/// Endpoint names are carried only for diagnostics; the patch itself works
/// on the raw addresses.
pub struct DetourRequest {
    source: NativeAddress,
    destination: NativeAddress,
    source_name: Option<String>,
    destination_name: Option<String>,
}

impl DetourRequest {
    pub fn new(source: NativeAddress, destination: NativeAddress) -> DetourRequest {
        DetourRequest {
            source,
            destination,
            source_name: None,
            destination_name: None,
        }
    }

    /// Request labeled with the endpoint method names.
    pub fn between(source: &MethodHandle, destination: &MethodHandle) -> DetourRequest {
        DetourRequest::new(source.entry, destination.entry)
            .named(&source.name, &destination.name)
    }

    pub fn named(mut self, source_name: &str, destination_name: &str) -> DetourRequest {
        self.source_name = Some(source_name.to_owned());
        self.destination_name = Some(destination_name.to_owned());
        self
    }

    /// Re-points the source past any unconditional jump thunks at its entry,
    /// so the patch lands on the real body instead of a linker stub.
    ///
    /// # Safety
    ///
    /// The source address and every jump target reached from it must be
    /// readable for one instruction's worth of bytes.
    pub unsafe fn through_entry_thunks(mut self) -> DetourRequest {
        self.source = unsafe { disassembly::follow_jump_chain(self.source) };
        self
    }

    pub fn source(&self) -> NativeAddress {
        self.source
    }

    pub fn destination(&self) -> NativeAddress {
        self.destination
    }

    /// Overwrites the entry of the callable at the source address with a
    /// jump stub to the destination. The write is destructive and nothing
    /// records the original bytes; see [`DetourRegistry`] for that.
    ///
    /// # Safety
    ///
    /// The [`ExecutableMemoryRegion`] contract must hold at the source
    /// address for [`STUB_SIZE`] bytes, and no thread may be executing the
    /// target while the stub is written.
    pub unsafe fn apply(&self) -> Result<(), DetourError> {
        unsafe { self.apply_inner() }.map_err(|e| self.fail(e))
    }

    unsafe fn apply_inner(&self) -> Result<(), DetourError> {
        self.validated()?;

        let stub = stub::host_stub(self.source, self.destination)?;
        let mut region = unsafe { ExecutableMemoryRegion::assume(self.source, STUB_SIZE) };
        region.write(self.source, &stub)?;

        debug!(
            "detoured {:#x} -> {:#x}: {}",
            self.source,
            self.destination,
            hex::encode(stub)
        );
        Ok(())
    }

    pub(crate) fn validated(&self) -> Result<(), DetourError> {
        if self.source == 0 || self.destination == 0 {
            return Err(DetourError::new(DetourErrorKind::NullAddress));
        }
        if self.source == self.destination {
            return Err(DetourError::new(DetourErrorKind::SameAddress));
        }
        Ok(())
    }

    /// Attaches the endpoint names and logs before propagating; a failed
    /// patch is never silent.
    pub(crate) fn fail(&self, e: DetourError) -> DetourError {
        let e = e.with_endpoints(
            self.source_name.as_deref(),
            self.destination_name.as_deref(),
        );
        error!("{e}");
        e
    }
}

/// Redirects all future invocations of the callable at `source` to the one
/// at `destination`.
///
/// # Safety
///
/// See [`DetourRequest::apply`].
pub unsafe fn apply_detour(
    source: NativeAddress,
    destination: NativeAddress,
) -> Result<(), DetourError> {
    unsafe { DetourRequest::new(source, destination).apply() }
}

struct PatchRecord {
    original: [u8; STUB_SIZE],
}

/// Patch bookkeeping with undo.
///
/// The bare [`apply_detour`] is one-way: re-patching a source overwrites the
/// previous stub and the original bytes are gone. The registry snapshots the
/// original bytes the first time a source is patched, keeps the patches
/// keyed by address, and restores every live patch when removed one by one
/// or when the registry is dropped.
pub struct DetourRegistry {
    patches: FnvHashMap<NativeAddress, PatchRecord>,
}

impl DetourRegistry {
    pub fn new() -> DetourRegistry {
        DetourRegistry {
            patches: FnvHashMap::default(),
        }
    }

    pub fn is_patched(&self, source: NativeAddress) -> bool {
        self.patches.contains_key(&source)
    }

    /// The pre-patch bytes recorded for `source`, if it is patched.
    pub fn original_bytes(&self, source: NativeAddress) -> Option<&[u8]> {
        self.patches.get(&source).map(|r| r.original.as_slice())
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Applies the request, snapshotting the original bytes first.
    ///
    /// Re-patching an already-patched source keeps the first snapshot, so a
    /// later [`remove`](DetourRegistry::remove) restores the true original.
    ///
    /// # Safety
    ///
    /// See [`DetourRequest::apply`]; additionally the source must be
    /// readable for [`STUB_SIZE`] bytes.
    pub unsafe fn apply(&mut self, request: &DetourRequest) -> Result<(), DetourError> {
        request.validated().map_err(|e| request.fail(e))?;

        let source = request.source;
        let fresh = !self.patches.contains_key(&source);
        let mut original = [0u8; STUB_SIZE];
        if fresh {
            let region = unsafe { ExecutableMemoryRegion::assume(source, STUB_SIZE) };
            let bytes = region
                .snapshot(source, STUB_SIZE)
                .map_err(|e| request.fail(e))?;
            original.copy_from_slice(&bytes);
        }

        unsafe { request.apply() }?;

        if fresh {
            debug!(
                "recorded original bytes at {source:#x}: {}",
                hex::encode(original)
            );
            self.patches.insert(source, PatchRecord { original });
        }
        Ok(())
    }

    /// Writes the recorded original bytes back over the stub at `source`.
    /// Returns whether a patch was live there.
    ///
    /// # Safety
    ///
    /// The [`ExecutableMemoryRegion`] contract must still hold at `source`,
    /// and no thread may be executing the patched callable.
    pub unsafe fn remove(&mut self, source: NativeAddress) -> Result<bool, DetourError> {
        let Some(record) = self.patches.remove(&source) else {
            return Ok(false);
        };

        let mut region = unsafe { ExecutableMemoryRegion::assume(source, STUB_SIZE) };
        region.write(source, &record.original)?;
        debug!("restored {STUB_SIZE} bytes at {source:#x}");
        Ok(true)
    }

    /// Restores every live patch.
    ///
    /// # Safety
    ///
    /// See [`remove`](DetourRegistry::remove), for every patched source.
    pub unsafe fn remove_all(&mut self) {
        let patched: Vec<NativeAddress> = self.patches.keys().copied().collect();
        for source in patched {
            let _ = unsafe { self.remove(source) };
        }
    }
}

impl Default for DetourRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DetourRegistry {
    fn drop(&mut self) {
        unsafe { self.remove_all() };
    }
}
