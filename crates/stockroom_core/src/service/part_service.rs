//! Part use-case service.
//!
//! # Responsibility
//! - Provide create/update/get/list/delete entry points for parts.
//! - Attach a freshly allocated SKU to every new part.
//!
//! # Invariants
//! - Input is validated before a SKU is allocated, so rejected input does not
//!   burn counter values.
//! - A SKU allocated for a part that then fails to persist is dropped, never
//!   handed to another part.
//! - Service layer remains storage-agnostic.

use crate::model::part::{NewPart, Part, PartId, PartValidationError};
use crate::repo::part_repo::{PartListQuery, PartRepository, RepoError, RepoResult};
use crate::sku::{AllocError, Sku, SkuAllocator};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Service error for part use-cases.
#[derive(Debug)]
pub enum PartServiceError {
    /// Input failed structural validation.
    Validation(PartValidationError),
    /// SKU allocator refused to issue.
    Allocation(AllocError),
    /// Target part does not exist.
    PartNotFound(PartId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for PartServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Allocation(err) => write!(f, "{err}"),
            Self::PartNotFound(id) => write!(f, "part not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent part state: {details}"),
        }
    }
}

impl Error for PartServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Allocation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PartServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::PartNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<PartValidationError> for PartServiceError {
    fn from(value: PartValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AllocError> for PartServiceError {
    fn from(value: AllocError) -> Self {
        Self::Allocation(value)
    }
}

/// Partial update for mutable part fields. The SKU is not among them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartUpdate {
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub quantity_on_hand: Option<i64>,
}

/// Part service facade over repository implementations.
pub struct PartService<R: PartRepository> {
    repo: R,
    allocator: Arc<SkuAllocator>,
}

impl<R: PartRepository> PartService<R> {
    /// Creates a service over `repo` sharing the process-wide allocator.
    pub fn new(repo: R, allocator: Arc<SkuAllocator>) -> Self {
        Self { repo, allocator }
    }

    /// Creates one part with the next SKU and returns the stored record.
    pub fn create_part(&self, request: NewPart) -> Result<Part, PartServiceError> {
        let started_at = Instant::now();
        request.validate()?;

        let sku = self.allocator.allocate()?;
        let mut part = Part::new(sku.clone(), request.name);
        part.description = request.description;
        part.quantity_on_hand = request.quantity_on_hand;

        let part_id = match self.repo.create_part(&part) {
            Ok(id) => id,
            Err(err) => {
                warn!(
                    "event=part_create module=service status=error duration_ms={} sku={} sku_discarded=true error={}",
                    started_at.elapsed().as_millis(),
                    sku,
                    err
                );
                return Err(err.into());
            }
        };

        let stored = self
            .repo
            .get_part(part_id, false)?
            .ok_or(PartServiceError::InconsistentState(
                "created part not found in read-back",
            ))?;
        info!(
            "event=part_create module=service status=ok duration_ms={} sku={}",
            started_at.elapsed().as_millis(),
            stored.sku
        );
        Ok(stored)
    }

    /// Applies a partial update and returns the stored record.
    pub fn update_part(&self, id: PartId, update: PartUpdate) -> Result<Part, PartServiceError> {
        let mut part = self
            .repo
            .get_part(id, false)?
            .ok_or(PartServiceError::PartNotFound(id))?;

        if let Some(name) = update.name {
            part.name = name;
        }
        if let Some(description) = update.description {
            part.description = description;
        }
        if let Some(quantity) = update.quantity_on_hand {
            part.quantity_on_hand = quantity;
        }

        self.repo.update_part(&part)?;
        self.repo
            .get_part(id, false)?
            .ok_or(PartServiceError::InconsistentState(
                "updated part not found in read-back",
            ))
    }

    pub fn get_part(&self, id: PartId, include_deleted: bool) -> RepoResult<Option<Part>> {
        self.repo.get_part(id, include_deleted)
    }

    pub fn get_part_by_sku(&self, sku: &Sku) -> RepoResult<Option<Part>> {
        self.repo.get_part_by_sku(sku)
    }

    pub fn list_parts(&self, query: &PartListQuery) -> RepoResult<Vec<Part>> {
        self.repo.list_parts(query)
    }

    /// Soft-deletes a part. Its SKU stays reserved.
    pub fn soft_delete_part(&self, id: PartId) -> Result<(), PartServiceError> {
        self.repo.soft_delete_part(id)?;
        Ok(())
    }

    /// Allocator shared by this service.
    pub fn allocator(&self) -> &Arc<SkuAllocator> {
        &self.allocator
    }
}
