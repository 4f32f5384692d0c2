//! Per-device mount session state.

use std::collections::{HashMap, HashSet};

use crate::classifier::MountFailure;
use crate::types::DevicePath;

/// Aggregate mount status of a device across its parent and partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MountProgress {
    #[default]
    NoResult,
    Success,
    /// Only the parent device failed so far. Typical for a partition table
    /// that is not mountable by itself.
    OnlyParentError,
    ChildError,
    /// At least one of several partitions failed. Sticky until removal.
    MultipartError,
}

/// Failure family used to count distinct child failures. The read-only flag
/// of an unknown filesystem does not make it a different failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Unknown,
    Unsupported,
    UnknownFilesystem,
}

impl From<MountFailure> for FailureKind {
    fn from(failure: MountFailure) -> Self {
        match failure {
            MountFailure::Unknown => FailureKind::Unknown,
            MountFailure::Unsupported => FailureKind::Unsupported,
            MountFailure::UnknownFilesystem { .. } => FailureKind::UnknownFilesystem,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSessionState {
    pub parent_error_seen: bool,
    /// Every child error event, repeats included.
    pub child_error_count: u32,
    pub distinct_child_failures: HashSet<FailureKind>,
    pub last_status: MountProgress,
}

#[derive(Debug, Clone, Default)]
pub struct SessionTable {
    sessions: HashMap<DevicePath, DeviceSessionState>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, device_path: &DevicePath) -> Option<&DeviceSessionState> {
        self.sessions.get(device_path)
    }

    /// Session for the path, created on first use.
    pub fn entry(&mut self, device_path: &DevicePath) -> &mut DeviceSessionState {
        self.sessions.entry(device_path.clone()).or_default()
    }

    pub fn remove(&mut self, device_path: &DevicePath) -> Option<DeviceSessionState> {
        self.sessions.remove(device_path)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
