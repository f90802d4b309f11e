//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use petstore_core::error::PetstoreResult;
use petstore_core::identity::Authority;
use petstore_core::models::user::{CreateUser, UpdateUser, User};
use petstore_core::pagination::{Page, PageRequest};
use petstore_core::repository::{CrudRepository, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{audit_info, count_table, is_unique_violation, order_clause, parse_uuid};
use crate::error::DbError;

/// DB-side row struct; the record ID comes back via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    login: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    activated: bool,
    authorities: Vec<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    last_modified_by: String,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        let authorities = self
            .authorities
            .iter()
            .map(|a| {
                Authority::parse(a).ok_or_else(|| DbError::Decode(format!("unknown authority: {a}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(User {
            id: parse_uuid(&self.record_id, "user")?,
            login: self.login,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            activated: self.activated,
            authorities,
            password_hash: self.password_hash,
            audit: audit_info(
                self.created_by,
                self.created_at,
                self.last_modified_by,
                self.updated_at,
            ),
        })
    }
}

const SORT_COLUMNS: &[(&str, &str)] = &[
    ("login", "login"),
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("email", "email"),
    ("activated", "activated"),
];

const SELECT_BY_LOGINS: &str = "SELECT meta::id(id) AS record_id, * FROM user \
     WHERE login IN $logins ORDER BY created_at ASC";

fn authority_strings(authorities: &[Authority]) -> Vec<String> {
    authorities.iter().map(|a| a.as_str().to_string()).collect()
}

/// Map a failed write to `Duplicate` when the login index rejected it.
fn write_error(err: surrealdb::Error) -> DbError {
    let message = err.to_string();
    if is_unique_violation(&message) {
        DbError::Duplicate {
            entity: "user".into(),
        }
    } else {
        DbError::Query(message)
    }
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Hash(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }
}

impl<C: Connection> CrudRepository for SurrealUserRepository<C> {
    type Entity = User;
    type Create = CreateUser;
    type Update = UpdateUser;

    async fn create(&self, input: CreateUser, actor: &str) -> PetstoreResult<User> {
        let id_str = Uuid::new_v4().to_string();
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 login = $login, password_hash = $password_hash, \
                 first_name = $first_name, last_name = $last_name, \
                 email = $email, phone = $phone, \
                 activated = $activated, authorities = $authorities, \
                 created_by = $actor, last_modified_by = $actor; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('user', $id)",
            )
            .bind(("id", id_str.clone()))
            .bind(("login", input.login))
            .bind(("password_hash", password_hash))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .bind(("activated", input.activated))
            .bind(("authorities", authority_strings(&input.authorities)))
            .bind(("actor", actor.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(write_error)?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user()?)
    }

    async fn get_by_id(&self, id: Uuid) -> PetstoreResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser, actor: &str) -> PetstoreResult<User> {
        let id_str = id.to_string();

        let password_hash = input
            .password
            .as_deref()
            .map(|p| hash_password(p, self.pepper.as_deref()))
            .transpose()?;

        let mut sets = Vec::new();
        if password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.activated.is_some() {
            sets.push("activated = $activated");
        }
        if input.authorities.is_some() {
            sets.push("authorities = $authorities");
        }
        sets.push("last_modified_by = $actor");
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}; \
             SELECT meta::id(id) AS record_id, * FROM type::record('user', $id)",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("actor", actor.to_string()));

        if let Some(password_hash) = password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }
        if let Some(first_name) = input.first_name {
            builder = builder.bind(("first_name", first_name));
        }
        if let Some(last_name) = input.last_name {
            builder = builder.bind(("last_name", last_name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(activated) = input.activated {
            builder = builder.bind(("activated", activated));
        }
        if let Some(authorities) = input.authorities {
            builder = builder.bind(("authorities", authority_strings(&authorities)));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user()?)
    }

    async fn delete(&self, id: Uuid) -> PetstoreResult<()> {
        self.db
            .query("DELETE type::record('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, page: PageRequest) -> PetstoreResult<Page<User>> {
        let total = count_table(&self.db, "user").await?;

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM user {} \
             LIMIT $limit START $offset",
            order_clause(&page.sort, SORT_COLUMNS)
        );
        let mut result = self
            .db
            .query(&query)
            .bind(("limit", page.size))
            .bind(("offset", page.offset()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(UserRow::try_into_user)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(Page {
            items,
            total,
            page: page.page,
            size: page.size,
        })
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn get_by_login(&self, login: &str) -> PetstoreResult<User> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user WHERE login = $login")
            .bind(("login", login.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("login={login}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn find_by_logins(&self, logins: &[String]) -> PetstoreResult<Vec<User>> {
        if logins.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(SELECT_BY_LOGINS)
            .bind(("logins", logins.to_vec()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let users = rows
            .into_iter()
            .map(UserRow::try_into_user)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }

    async fn create_many(&self, inputs: Vec<CreateUser>, actor: &str) -> PetstoreResult<Vec<User>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        // One CREATE per user, each with its own indexed bindings, inside a
        // single transaction so a duplicate login rolls back the batch.
        let mut statements = vec!["BEGIN TRANSACTION;".to_string()];
        for i in 0..inputs.len() {
            statements.push(format!(
                "CREATE type::record('user', $id_{i}) SET \
                 login = $login_{i}, password_hash = $password_hash_{i}, \
                 first_name = $first_name_{i}, last_name = $last_name_{i}, \
                 email = $email_{i}, phone = $phone_{i}, \
                 activated = $activated_{i}, authorities = $authorities_{i}, \
                 created_by = $actor, last_modified_by = $actor;"
            ));
        }
        statements.push("COMMIT TRANSACTION;".to_string());
        let query = statements.join("\n");

        let logins: Vec<String> = inputs.iter().map(|u| u.login.clone()).collect();
        let mut builder = self.db.query(&query).bind(("actor", actor.to_string()));
        for (i, input) in inputs.into_iter().enumerate() {
            let password_hash = hash_password(&input.password, self.pepper.as_deref())?;
            builder = builder
                .bind((format!("id_{i}"), Uuid::new_v4().to_string()))
                .bind((format!("login_{i}"), input.login))
                .bind((format!("password_hash_{i}"), password_hash))
                .bind((format!("first_name_{i}"), input.first_name))
                .bind((format!("last_name_{i}"), input.last_name))
                .bind((format!("email_{i}"), input.email))
                .bind((format!("phone_{i}"), input.phone))
                .bind((format!("activated_{i}"), input.activated))
                .bind((format!("authorities_{i}"), authority_strings(&input.authorities)));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        // A failed transaction marks every statement as failed; the index
        // violation may sit behind any of them.
        let errors = result.take_errors();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.into_values().map(|e| e.to_string()).collect();
            debug!(?messages, "Batch user creation rolled back");
            let err = if messages.iter().any(|m| is_unique_violation(m)) {
                DbError::Duplicate {
                    entity: "user".into(),
                }
            } else {
                DbError::Query(messages.join("; "))
            };
            return Err(err.into());
        }

        let mut users = self.find_by_logins(&logins).await?;
        users.sort_by_key(|u| logins.iter().position(|l| *l == u.login));
        Ok(users)
    }
}
