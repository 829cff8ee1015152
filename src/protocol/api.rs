//! API descriptors
//!
//! The static table of request types the broker understands and the version
//! range negotiated for each.

use crate::error::{Result, WireError};

/// Supported version range for version negotiation (ApiVersions)
pub const API_VERSIONS_MIN_VERSION: u16 = 0;
pub const API_VERSIONS_MAX_VERSION: u16 = 4;

/// Most descriptors a table may hold: the count travels as one count+1 byte
pub const MAX_API_DESCRIPTORS: usize = u8::MAX as usize - 1;

/// Supported version range for Fetch
pub const FETCH_MIN_VERSION: u16 = 0;
pub const FETCH_MAX_VERSION: u16 = 16;

/// Request types with a response builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ApiKey {
    Fetch = 1,
    ApiVersions = 18,
}

impl ApiKey {
    /// Every request type, in table order
    pub const ALL: [ApiKey; 2] = [ApiKey::ApiVersions, ApiKey::Fetch];

    /// Map a wire request type to a known key
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(ApiKey::Fetch),
            18 => Some(ApiKey::ApiVersions),
            _ => None,
        }
    }

    /// The wire value of this request type
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Default negotiable version range `(min, max)`
    pub fn version_range(self) -> (u16, u16) {
        match self {
            ApiKey::ApiVersions => (API_VERSIONS_MIN_VERSION, API_VERSIONS_MAX_VERSION),
            ApiKey::Fetch => (FETCH_MIN_VERSION, FETCH_MAX_VERSION),
        }
    }
}

/// One supported request type and its negotiable version range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiDescriptor {
    pub request_type: u16,
    pub min_version: u16,
    pub max_version: u16,
}

impl ApiDescriptor {
    pub fn new(request_type: u16, min_version: u16, max_version: u16) -> Self {
        Self {
            request_type,
            min_version,
            max_version,
        }
    }

    /// Whether `version` lies in `[min_version, max_version]`
    pub fn supports(&self, version: u16) -> bool {
        (self.min_version..=self.max_version).contains(&version)
    }
}

impl From<ApiKey> for ApiDescriptor {
    fn from(key: ApiKey) -> Self {
        let (min, max) = key.version_range();
        ApiDescriptor::new(key.as_u16(), min, max)
    }
}

/// Read-only table of supported request types
///
/// Built once at startup and shared by reference (usually behind an `Arc`)
/// with the dispatcher and every connection. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiTable {
    descriptors: Vec<ApiDescriptor>,
}

impl ApiTable {
    /// Build a table from explicit descriptors
    ///
    /// Later entries for an already present request type are ignored.
    /// Fails when more than `MAX_API_DESCRIPTORS` distinct types remain.
    pub fn new(descriptors: impl IntoIterator<Item = ApiDescriptor>) -> Result<Self> {
        let mut table: Vec<ApiDescriptor> = Vec::new();
        for descriptor in descriptors {
            if table.iter().any(|d| d.request_type == descriptor.request_type) {
                continue;
            }
            if table.len() == MAX_API_DESCRIPTORS {
                return Err(WireError::Config(format!(
                    "API table holds at most {} request types",
                    MAX_API_DESCRIPTORS
                )));
            }
            table.push(descriptor);
        }
        Ok(Self { descriptors: table })
    }

    /// Table of every request type with a builder, at its default range
    pub fn standard() -> Self {
        Self {
            descriptors: ApiKey::ALL.into_iter().map(ApiDescriptor::from).collect(),
        }
    }

    pub fn lookup(&self, request_type: u16) -> Option<&ApiDescriptor> {
        self.descriptors.iter().find(|d| d.request_type == request_type)
    }

    pub fn descriptors(&self) -> &[ApiDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for ApiTable {
    fn default() -> Self {
        Self::standard()
    }
}
