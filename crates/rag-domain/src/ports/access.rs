//! Object Access Control (C1).

use async_trait::async_trait;

use crate::entities::AccessGrant;
use crate::error::Result;
use crate::value_objects::{ObjectType, Permission, PrincipalType};

/// Outcome of [`AccessControl::simulate`] for one `(object, principal)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedAccess {
    /// Whether the principal holds at least the requested level.
    pub allowed: bool,
}

/// Row-level permission checks on documents/chunks.
///
/// First-writer-wins: the first `grant` ever issued on an object installs
/// the caller as `owner`/`write` regardless of the requested level.
/// Subsequent grants require the caller to already hold `write` or
/// `owner` on the object, else [`crate::error::Error::Forbidden`].
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Grant `level` on `object` to each of `principals`, as `caller`.
    async fn grant(
        &self,
        caller: &str,
        object: &str,
        object_type: ObjectType,
        principals: &[(&str, PrincipalType)],
        level: Permission,
        policy: Option<&str>,
    ) -> Result<()>;

    /// Whether `principal` holds at least `required` on `object`.
    async fn check(&self, object: &str, principal: &str, required: Permission) -> Result<bool>;

    /// Boolean matrix of `principal` against `objects` at each of `levels`.
    /// Never partially fails: unknown objects simply yield all-false rows.
    async fn simulate(
        &self,
        objects: &[&str],
        principal: &str,
        levels: &[Permission],
    ) -> Result<Vec<Vec<SimulatedAccess>>>;

    /// List every grant recorded for `object`, for operator tooling.
    async fn grants_for(&self, object: &str) -> Result<Vec<AccessGrant>>;

    /// Every object `principal` holds at least `required` on, for the
    /// query endpoint's "search everything I can read" default scope.
    async fn objects_for_principal(&self, principal: &str, required: Permission) -> Result<Vec<String>>;
}
