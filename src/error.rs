use crate::mem::NativeAddress;
use std::fmt::{Debug, Display, Formatter};

/// A symbolic reference could not be reduced to exactly one callable.
pub enum ResolutionError {
    NotACall(String),
    NotAMemberAccess(String),
    UnknownFunction(String),
    UnknownProperty(String),
    MissingGetter(String),
    MissingSetter(String),
}

impl Debug for ResolutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for ResolutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionError::NotACall(expr) => {
                write!(
                    f,
                    "couldn't obtain a callable for the method call expression: {expr}"
                )
            }
            ResolutionError::NotAMemberAccess(expr) => {
                write!(
                    f,
                    "couldn't obtain a property for the member access expression: {expr}"
                )
            }
            ResolutionError::UnknownFunction(name) => {
                write!(f, "no function named `{name}` is known to the host")
            }
            ResolutionError::UnknownProperty(name) => {
                write!(f, "no property named `{name}` is known to the host")
            }
            ResolutionError::MissingGetter(name) => {
                write!(f, "property `{name}` has no get accessor")
            }
            ResolutionError::MissingSetter(name) => {
                write!(f, "property `{name}` has no set accessor")
            }
        }
    }
}

impl std::error::Error for ResolutionError {}

/// A patch operation failed before any byte was written.
///
/// Carries the endpoint method names when the caller supplied them; the
/// rendered message falls back to the `null src` / `null dst` sentinels.
pub struct DetourError {
    source: Option<String>,
    destination: Option<String>,
    kind: DetourErrorKind,
}

pub enum DetourErrorKind {
    NullAddress,
    SameAddress,
    DisplacementOutOfRange(i64),
    OutOfRegion {
        base: NativeAddress,
        len: usize,
        at: NativeAddress,
        size: usize,
    },
    Os(usize),
}

impl DetourError {
    pub(crate) fn new(kind: DetourErrorKind) -> DetourError {
        DetourError {
            source: None,
            destination: None,
            kind,
        }
    }

    pub(crate) fn with_endpoints(
        mut self,
        source: Option<&str>,
        destination: Option<&str>,
    ) -> DetourError {
        self.source = source.map(str::to_owned);
        self.destination = destination.map(str::to_owned);
        self
    }

    pub fn kind(&self) -> &DetourErrorKind {
        &self.kind
    }
}

impl Debug for DetourError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for DetourError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unable to detour: {} -> {}: {}",
            self.source.as_deref().unwrap_or("null src"),
            self.destination.as_deref().unwrap_or("null dst"),
            self.kind
        )
    }
}

impl std::error::Error for DetourError {}

impl Display for DetourErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            DetourErrorKind::NullAddress => {
                write!(f, "null endpoint address")
            }
            DetourErrorKind::SameAddress => {
                write!(f, "source and destination are the same address")
            }
            DetourErrorKind::DisplacementOutOfRange(displacement) => {
                write!(
                    f,
                    "displacement {displacement} exceeds the signed 32-bit range"
                )
            }
            DetourErrorKind::OutOfRegion { base, len, at, size } => {
                write!(
                    f,
                    "{size} bytes at {at:#x} fall outside region {base:#x}..{:#x}",
                    base + len
                )
            }
            DetourErrorKind::Os(code) => {
                write!(f, "error code: {code}")
            }
        }
    }
}
