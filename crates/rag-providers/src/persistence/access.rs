//! `AccessControl` adapter: the `access` table.
//!
//! First-writer-wins (§4.1): the first grant recorded for an `object_id`
//! installs the caller as `owner` regardless of the requested level; every
//! later `grant` call requires the caller to already hold `write` or
//! `owner`.

use async_trait::async_trait;
use rag_domain::entities::AccessGrant;
use rag_domain::error::{Error, Result};
use rag_domain::ports::access::{AccessControl, SimulatedAccess};
use rag_domain::value_objects::{ObjectType, Permission, PrincipalType};
use sea_orm::{ConnectionTrait, DbBackend, Statement};

use super::Db;

fn db_err(e: sea_orm::DbErr) -> Error {
    Error::database_with_source("postgres", e)
}

#[async_trait]
impl AccessControl for Db {
    async fn grant(
        &self,
        caller: &str,
        object: &str,
        object_type: ObjectType,
        principals: &[(&str, PrincipalType)],
        level: Permission,
        policy: Option<&str>,
    ) -> Result<()> {
        let existing = grants_for(&self.conn, object).await?;

        if existing.is_empty() {
            insert_grant(
                &self.conn,
                object,
                object_type,
                caller,
                PrincipalType::User,
                Permission::Owner,
                policy,
            )
            .await?;
        } else {
            let caller_level = existing
                .iter()
                .find(|g| g.principal_id == caller)
                .map(|g| g.permission);
            match caller_level {
                Some(p) if p >= Permission::Write => {}
                _ => {
                    return Err(Error::forbidden(format!(
                        "{caller} does not hold write/owner on {object}"
                    )))
                }
            }
        }

        for (principal_id, principal_type) in principals {
            insert_grant(&self.conn, object, object_type, principal_id, *principal_type, level, policy)
                .await?;
        }
        Ok(())
    }

    async fn check(&self, object: &str, principal: &str, required: Permission) -> Result<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT permission FROM access WHERE object_id = $1 AND principal_id = $2",
            [object.into(), principal.into()],
        );
        let Some(row) = self.conn.query_one(stmt).await.map_err(db_err)? else {
            return Ok(false);
        };
        let permission: String = row.try_get("", "permission").map_err(db_err)?;
        Ok(parse_permission(&permission)? >= required)
    }

    async fn simulate(
        &self,
        objects: &[&str],
        principal: &str,
        levels: &[Permission],
    ) -> Result<Vec<Vec<SimulatedAccess>>> {
        let mut rows = Vec::with_capacity(objects.len());
        for object in objects {
            let held = self
                .conn
                .query_one(Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    "SELECT permission FROM access WHERE object_id = $1 AND principal_id = $2",
                    [(*object).into(), principal.into()],
                ))
                .await
                .map_err(db_err)?
                .map(|row| row.try_get::<String>("", "permission"))
                .transpose()
                .map_err(db_err)?
                .map(|p| parse_permission(&p))
                .transpose()?;

            let row: Vec<SimulatedAccess> = levels
                .iter()
                .map(|required| SimulatedAccess {
                    allowed: held.is_some_and(|h| h >= *required),
                })
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }

    async fn grants_for(&self, object: &str) -> Result<Vec<AccessGrant>> {
        grants_for(&self.conn, object).await
    }

    async fn objects_for_principal(&self, principal: &str, required: Permission) -> Result<Vec<String>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT object_id, permission FROM access WHERE principal_id = $1",
            [principal.into()],
        );
        let rows = self.conn.query_all(stmt).await.map_err(db_err)?;
        rows.iter()
            .filter_map(|row| {
                let permission: String = match row.try_get("", "permission") {
                    Ok(p) => p,
                    Err(e) => return Some(Err(db_err(e))),
                };
                match parse_permission(&permission) {
                    Ok(level) if level >= required => {
                        Some(row.try_get("", "object_id").map_err(db_err))
                    }
                    Ok(_) => None,
                    Err(e) => Some(Err(e)),
                }
            })
            .collect()
    }
}

async fn grants_for<C: ConnectionTrait>(conn: &C, object: &str) -> Result<Vec<AccessGrant>> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT object_id, principal_id, permission, principal_type, object_type, policy
         FROM access WHERE object_id = $1",
        [object.into()],
    );
    let rows = conn.query_all(stmt).await.map_err(db_err)?;
    rows.iter()
        .map(|row| {
            let permission: String = row.try_get("", "permission").map_err(db_err)?;
            let principal_type: String = row.try_get("", "principal_type").map_err(db_err)?;
            let object_type: String = row.try_get("", "object_type").map_err(db_err)?;
            Ok(AccessGrant {
                object_id: row.try_get("", "object_id").map_err(db_err)?,
                principal_id: row.try_get("", "principal_id").map_err(db_err)?,
                permission: parse_permission(&permission)?,
                principal_type: parse_principal_type(&principal_type)?,
                object_type: parse_object_type(&object_type)?,
                policy: row.try_get("", "policy").map_err(db_err)?,
            })
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
async fn insert_grant<C: ConnectionTrait>(
    conn: &C,
    object: &str,
    object_type: ObjectType,
    principal: &str,
    principal_type: PrincipalType,
    level: Permission,
    policy: Option<&str>,
) -> Result<()> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        "INSERT INTO access (object_id, principal_id, permission, principal_type, object_type, policy)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (object_id, principal_id) DO UPDATE SET
            permission = EXCLUDED.permission,
            policy = EXCLUDED.policy",
        [
            object.into(),
            principal.into(),
            permission_name(level).into(),
            principal_type_name(principal_type).into(),
            object_type_name(object_type).into(),
            policy.into(),
        ],
    );
    conn.execute(stmt).await.map_err(db_err)?;
    Ok(())
}

fn permission_name(p: Permission) -> &'static str {
    match p {
        Permission::Read => "read",
        Permission::Write => "write",
        Permission::Owner => "owner",
    }
}

fn parse_permission(s: &str) -> Result<Permission> {
    match s {
        "read" => Ok(Permission::Read),
        "write" => Ok(Permission::Write),
        "owner" => Ok(Permission::Owner),
        other => Err(Error::corruption(format!("unknown permission '{other}'"))),
    }
}

fn principal_type_name(p: PrincipalType) -> &'static str {
    match p {
        PrincipalType::User => "user",
        PrincipalType::Service => "service",
        PrincipalType::Group => "group",
    }
}

fn parse_principal_type(s: &str) -> Result<PrincipalType> {
    match s {
        "user" => Ok(PrincipalType::User),
        "service" => Ok(PrincipalType::Service),
        "group" => Ok(PrincipalType::Group),
        other => Err(Error::corruption(format!("unknown principal type '{other}'"))),
    }
}

fn object_type_name(o: ObjectType) -> &'static str {
    match o {
        ObjectType::Document => "document",
        ObjectType::Chunk => "chunk",
    }
}

fn parse_object_type(s: &str) -> Result<ObjectType> {
    match s {
        "document" => Ok(ObjectType::Document),
        "chunk" => Ok(ObjectType::Chunk),
        other => Err(Error::corruption(format!("unknown object type '{other}'"))),
    }
}
