use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::validation::{normalize_email, sanitize_phone, FieldErrors};
use crate::database::models::{admin, company, employer, job_seeker, oauth_employer, oauth_job_seeker};
use crate::database::types::{AccountKind, AccountRef};
use crate::errors::AppError;
use crate::services::{approvals, passwords};
use crate::services::storage::UploadTarget;

pub const EMAIL_USED: &str = "Email is already used";

/// A fully loaded account of any kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "account")]
pub enum Account {
    #[serde(rename = "jobSeeker")]
    JobSeeker(job_seeker::Model),
    #[serde(rename = "employer")]
    Employer(employer::Model),
    #[serde(rename = "company")]
    Company(company::Model),
    #[serde(rename = "admin")]
    Admin(admin::Model),
    #[serde(rename = "oauthJobSeeker")]
    OAuthJobSeeker(oauth_job_seeker::Model),
    #[serde(rename = "oauthEmployer")]
    OAuthEmployer(oauth_employer::Model),
}

impl Account {
    pub fn kind(&self) -> AccountKind {
        match self {
            Account::JobSeeker(_) => AccountKind::JobSeeker,
            Account::Employer(_) => AccountKind::Employer,
            Account::Company(_) => AccountKind::Company,
            Account::Admin(_) => AccountKind::Admin,
            Account::OAuthJobSeeker(_) => AccountKind::OAuthJobSeeker,
            Account::OAuthEmployer(_) => AccountKind::OAuthEmployer,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Account::JobSeeker(m) => m.id,
            Account::Employer(m) => m.id,
            Account::Company(m) => m.id,
            Account::Admin(m) => m.id,
            Account::OAuthJobSeeker(m) => m.id,
            Account::OAuthEmployer(m) => m.id,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Account::Admin(_))
    }

    pub fn display_name(&self) -> String {
        match self {
            Account::JobSeeker(m) => format!("{} {}", m.first_name, m.last_name),
            Account::Employer(m) => format!("{} {}", m.first_name, m.last_name),
            Account::Company(m) => m.name.clone(),
            Account::Admin(m) => m.username.clone(),
            Account::OAuthJobSeeker(m) => format!("{} {}", m.first_name, m.last_name),
            Account::OAuthEmployer(m) => format!("{} {}", m.first_name, m.last_name),
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Account::JobSeeker(m) => &m.email,
            Account::Employer(m) => &m.email,
            Account::Company(m) => &m.email,
            Account::Admin(m) => &m.email,
            Account::OAuthJobSeeker(m) => &m.email,
            Account::OAuthEmployer(m) => &m.email,
        }
    }

    pub fn account_ref(&self) -> Option<AccountRef> {
        AccountRef::new(self.kind(), self.id())
    }
}

// --- DTOs ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterJobSeeker {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub contact: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEmployer {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub contact: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCompany {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub kind: AccountKind,
    /// Username or email; company accounts use their name or email.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl RegisterJobSeeker {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors
            .required("firstName", &self.first_name, 64)
            .required("lastName", &self.last_name, 64)
            .username("username", &self.username)
            .email("email", &self.email)
            .password("password", &self.password)
            .phone("contact", self.contact.as_deref())
            .optional("address", self.address.as_deref(), 255);
        errors.finish()
    }
}

impl RegisterEmployer {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors
            .required("firstName", &self.first_name, 64)
            .required("lastName", &self.last_name, 64)
            .username("username", &self.username)
            .email("email", &self.email)
            .password("password", &self.password)
            .phone("contact", self.contact.as_deref())
            .optional("position", self.position.as_deref(), 128);
        errors.finish()
    }
}

impl RegisterCompany {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors
            .required("name", &self.name, 128)
            .email("email", &self.email)
            .password("password", &self.password)
            .phone("contact", self.contact.as_deref())
            .optional("address", self.address.as_deref(), 255)
            .optional("description", self.description.as_deref(), 4000);
        errors.finish()
    }
}

impl RegisterAdmin {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors
            .username("username", &self.username)
            .email("email", &self.email)
            .password("password", &self.password);
        errors.finish()
    }
}

impl ProfileUpdate {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors
            .not_blank("firstName", self.first_name.as_deref(), 64)
            .not_blank("lastName", self.last_name.as_deref(), 64)
            .not_blank("name", self.name.as_deref(), 128)
            .phone("contact", self.contact.as_deref())
            .optional("address", self.address.as_deref(), 255)
            .optional("description", self.description.as_deref(), 4000)
            .optional("position", self.position.as_deref(), 128);
        if let Some(username) = &self.username {
            errors.username("username", username);
        }
        errors.finish()
    }
}

fn clean_contact(contact: Option<String>) -> Option<String> {
    contact.and_then(|c| sanitize_phone(&c))
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

/// Fails with "already used" when `column` already holds `value` in `E`.
async fn ensure_unused<E>(
    db: &DatabaseConnection,
    column: E::Column,
    value: &str,
    message: &str,
) -> Result<(), AppError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let taken = E::find().filter(column.eq(value)).count(db).await? > 0;
    if taken {
        Err(AppError::InvalidInput(message.to_string()))
    } else {
        Ok(())
    }
}

// --- Registration ---

pub async fn register_job_seeker(
    db: &DatabaseConnection,
    dto: RegisterJobSeeker,
    bcrypt_cost: u32,
) -> Result<job_seeker::Model, AppError> {
    dto.validate()?;
    passwords::ensure_passwords_match(&dto.password, &dto.confirm_password)?;

    let email = normalize_email(&dto.email);
    ensure_unused::<job_seeker::Entity>(db, job_seeker::Column::Email, &email, EMAIL_USED).await?;

    let password = passwords::hash_password(&dto.password, bcrypt_cost)?;
    let now = Utc::now();

    let txn = db.begin().await?;
    let account = job_seeker::ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set(trimmed(&dto.first_name)),
        last_name: Set(trimmed(&dto.last_name)),
        username: Set(trimmed(&dto.username)),
        email: Set(email),
        password: Set(password),
        contact: Set(clean_contact(dto.contact)),
        address: Set(dto.address),
        description: Set(None),
        profile_picture: Set(None),
        resume: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    approvals::create_pending(&txn, AccountRef::JobSeeker(account.id)).await?;
    txn.commit().await?;

    log::info!("Job seeker {} registered, awaiting approval", account.id);
    Ok(account)
}

pub async fn register_employer(
    db: &DatabaseConnection,
    dto: RegisterEmployer,
    bcrypt_cost: u32,
) -> Result<employer::Model, AppError> {
    dto.validate()?;
    passwords::ensure_passwords_match(&dto.password, &dto.confirm_password)?;

    let email = normalize_email(&dto.email);
    ensure_unused::<employer::Entity>(db, employer::Column::Email, &email, EMAIL_USED).await?;

    let password = passwords::hash_password(&dto.password, bcrypt_cost)?;
    let now = Utc::now();

    let txn = db.begin().await?;
    let account = employer::ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set(trimmed(&dto.first_name)),
        last_name: Set(trimmed(&dto.last_name)),
        username: Set(trimmed(&dto.username)),
        email: Set(email),
        password: Set(password),
        contact: Set(clean_contact(dto.contact)),
        position: Set(dto.position),
        profile_picture: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    approvals::create_pending(&txn, AccountRef::Employer(account.id)).await?;
    txn.commit().await?;

    log::info!("Employer {} registered, awaiting approval", account.id);
    Ok(account)
}

pub async fn register_company(
    db: &DatabaseConnection,
    dto: RegisterCompany,
    bcrypt_cost: u32,
) -> Result<company::Model, AppError> {
    dto.validate()?;
    passwords::ensure_passwords_match(&dto.password, &dto.confirm_password)?;

    let email = normalize_email(&dto.email);
    let name = trimmed(&dto.name);
    ensure_unused::<company::Entity>(db, company::Column::Email, &email, EMAIL_USED).await?;
    ensure_unused::<company::Entity>(
        db,
        company::Column::Name,
        &name,
        "Company name is already used",
    )
    .await?;

    let password = passwords::hash_password(&dto.password, bcrypt_cost)?;
    let now = Utc::now();

    let txn = db.begin().await?;
    let account = company::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        password: Set(password),
        contact: Set(clean_contact(dto.contact)),
        address: Set(dto.address),
        description: Set(dto.description),
        profile_picture: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    approvals::create_pending(&txn, AccountRef::Company(account.id)).await?;
    txn.commit().await?;

    log::info!("Company {} registered, awaiting approval", account.id);
    Ok(account)
}

/// Admins are usable immediately; they are the ones doing the approving.
pub async fn register_admin(
    db: &DatabaseConnection,
    dto: RegisterAdmin,
    bcrypt_cost: u32,
) -> Result<admin::Model, AppError> {
    dto.validate()?;
    passwords::ensure_passwords_match(&dto.password, &dto.confirm_password)?;

    let email = normalize_email(&dto.email);
    let username = trimmed(&dto.username);
    ensure_unused::<admin::Entity>(db, admin::Column::Email, &email, EMAIL_USED).await?;
    ensure_unused::<admin::Entity>(
        db,
        admin::Column::Username,
        &username,
        "Username is already used",
    )
    .await?;

    let account = admin::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        email: Set(email),
        password: Set(passwords::hash_password(&dto.password, bcrypt_cost)?),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    log::info!("Admin {} registered", account.id);
    Ok(account)
}

pub async fn admin_count(db: &DatabaseConnection) -> Result<u64, AppError> {
    Ok(admin::Entity::find().count(db).await?)
}

// --- Login ---

fn identifier_condition(kind: AccountKind, identifier: &str) -> Condition {
    let email = normalize_email(identifier);
    match kind {
        AccountKind::JobSeeker => Condition::any()
            .add(job_seeker::Column::Username.eq(identifier))
            .add(job_seeker::Column::Email.eq(email)),
        AccountKind::Employer => Condition::any()
            .add(employer::Column::Username.eq(identifier))
            .add(employer::Column::Email.eq(email)),
        AccountKind::Company => Condition::any()
            .add(company::Column::Name.eq(identifier))
            .add(company::Column::Email.eq(email)),
        AccountKind::Admin => Condition::any()
            .add(admin::Column::Username.eq(identifier))
            .add(admin::Column::Email.eq(email)),
        AccountKind::OAuthJobSeeker | AccountKind::OAuthEmployer => Condition::all(),
    }
}

/// Credential login. Succeeds only for approved (or admin) accounts.
pub async fn login(db: &DatabaseConnection, request: LoginRequest) -> Result<Account, AppError> {
    let identifier = request.identifier.trim();
    if identifier.is_empty() || request.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Identifier and password are required".to_string(),
        ));
    }

    let condition = identifier_condition(request.kind, identifier);
    let account = match request.kind {
        AccountKind::JobSeeker => {
            let rows = job_seeker::Entity::find().filter(condition).all(db).await?;
            Account::JobSeeker(passwords::match_candidate(rows, &request.password)?)
        }
        AccountKind::Employer => {
            let rows = employer::Entity::find().filter(condition).all(db).await?;
            Account::Employer(passwords::match_candidate(rows, &request.password)?)
        }
        AccountKind::Company => {
            let rows = company::Entity::find().filter(condition).all(db).await?;
            Account::Company(passwords::match_candidate(rows, &request.password)?)
        }
        AccountKind::Admin => {
            let rows = admin::Entity::find().filter(condition).all(db).await?;
            Account::Admin(passwords::match_candidate(rows, &request.password)?)
        }
        AccountKind::OAuthJobSeeker | AccountKind::OAuthEmployer => {
            return Err(AppError::InvalidInput(
                "Google accounts sign in through /api/user/oauth/google".to_string(),
            ));
        }
    };

    if let Some(account_ref) = account.account_ref() {
        approvals::ensure_accepted(db, account_ref).await?;
    }

    Ok(account)
}

// --- Loading ---

pub async fn load_account(
    db: &DatabaseConnection,
    kind: AccountKind,
    id: Uuid,
) -> Result<Option<Account>, AppError> {
    let account = match kind {
        AccountKind::JobSeeker => job_seeker::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Account::JobSeeker),
        AccountKind::Employer => employer::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Account::Employer),
        AccountKind::Company => company::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Account::Company),
        AccountKind::Admin => admin::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Account::Admin),
        AccountKind::OAuthJobSeeker => oauth_job_seeker::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Account::OAuthJobSeeker),
        AccountKind::OAuthEmployer => oauth_employer::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Account::OAuthEmployer),
    };
    Ok(account)
}

// --- Profile editing ---

fn apply<T>(target: &mut sea_orm::ActiveValue<T>, value: Option<T>)
where
    T: Into<sea_orm::Value>,
{
    if let Some(value) = value {
        *target = Set(value);
    }
}

pub async fn update_profile(
    db: &DatabaseConnection,
    account: Account,
    update: ProfileUpdate,
) -> Result<Account, AppError> {
    update.validate()?;
    let now = Utc::now();
    let contact = update.contact.map(|c| sanitize_phone(&c));

    let updated = match account {
        Account::JobSeeker(model) => {
            let mut active = model.into_active_model();
            apply(&mut active.first_name, update.first_name.map(|v| trimmed(&v)));
            apply(&mut active.last_name, update.last_name.map(|v| trimmed(&v)));
            apply(&mut active.username, update.username.map(|v| trimmed(&v)));
            apply(&mut active.contact, contact);
            apply(&mut active.address, update.address.map(Some));
            apply(&mut active.description, update.description.map(Some));
            active.updated_at = Set(now);
            Account::JobSeeker(active.update(db).await?)
        }
        Account::Employer(model) => {
            let mut active = model.into_active_model();
            apply(&mut active.first_name, update.first_name.map(|v| trimmed(&v)));
            apply(&mut active.last_name, update.last_name.map(|v| trimmed(&v)));
            apply(&mut active.username, update.username.map(|v| trimmed(&v)));
            apply(&mut active.contact, contact);
            apply(&mut active.position, update.position.map(Some));
            active.updated_at = Set(now);
            Account::Employer(active.update(db).await?)
        }
        Account::Company(model) => {
            if let Some(name) = update.name.as_deref().map(str::trim) {
                if name != model.name {
                    ensure_unused::<company::Entity>(
                        db,
                        company::Column::Name,
                        name,
                        "Company name is already used",
                    )
                    .await?;
                }
            }
            let mut active = model.into_active_model();
            apply(&mut active.name, update.name.map(|v| trimmed(&v)));
            apply(&mut active.contact, contact);
            apply(&mut active.address, update.address.map(Some));
            apply(&mut active.description, update.description.map(Some));
            active.updated_at = Set(now);
            Account::Company(active.update(db).await?)
        }
        Account::OAuthJobSeeker(model) => {
            let mut active = model.into_active_model();
            apply(&mut active.first_name, update.first_name.map(|v| trimmed(&v)));
            apply(&mut active.last_name, update.last_name.map(|v| trimmed(&v)));
            apply(&mut active.contact, contact);
            apply(&mut active.address, update.address.map(Some));
            apply(&mut active.description, update.description.map(Some));
            active.updated_at = Set(now);
            Account::OAuthJobSeeker(active.update(db).await?)
        }
        Account::OAuthEmployer(model) => {
            let mut active = model.into_active_model();
            apply(&mut active.first_name, update.first_name.map(|v| trimmed(&v)));
            apply(&mut active.last_name, update.last_name.map(|v| trimmed(&v)));
            apply(&mut active.contact, contact);
            apply(&mut active.position, update.position.map(Some));
            active.updated_at = Set(now);
            Account::OAuthEmployer(active.update(db).await?)
        }
        Account::Admin(_) => {
            return Err(AppError::InvalidInput(
                "Admin profiles cannot be edited".to_string(),
            ));
        }
    };

    log::info!("Profile of {} {} updated", updated.kind(), updated.id());
    Ok(updated)
}

pub async fn change_password(
    db: &DatabaseConnection,
    account: Account,
    request: ChangePassword,
    bcrypt_cost: u32,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    errors.password("newPassword", &request.new_password);
    errors.finish()?;
    passwords::ensure_passwords_match(&request.new_password, &request.confirm_password)?;

    let current_hash = match &account {
        Account::JobSeeker(m) => m.password.as_str(),
        Account::Employer(m) => m.password.as_str(),
        Account::Company(m) => m.password.as_str(),
        Account::Admin(m) => m.password.as_str(),
        Account::OAuthJobSeeker(_) | Account::OAuthEmployer(_) => {
            return Err(AppError::InvalidInput(
                "Google accounts have no password".to_string(),
            ));
        }
    };
    if !passwords::verify_password(&request.current_password, current_hash) {
        return Err(AppError::Unauthorized(passwords::WRONG_PASSWORD.to_string()));
    }

    let hash = passwords::hash_password(&request.new_password, bcrypt_cost)?;
    let now = Utc::now();
    match account {
        Account::JobSeeker(model) => {
            let mut active = model.into_active_model();
            active.password = Set(hash);
            active.updated_at = Set(now);
            active.update(db).await?;
        }
        Account::Employer(model) => {
            let mut active = model.into_active_model();
            active.password = Set(hash);
            active.updated_at = Set(now);
            active.update(db).await?;
        }
        Account::Company(model) => {
            let mut active = model.into_active_model();
            active.password = Set(hash);
            active.updated_at = Set(now);
            active.update(db).await?;
        }
        Account::Admin(model) => {
            let mut active = model.into_active_model();
            active.password = Set(hash);
            active.update(db).await?;
        }
        Account::OAuthJobSeeker(_) | Account::OAuthEmployer(_) => {
            return Err(AppError::InvalidInput(
                "Google accounts have no password".to_string(),
            ));
        }
    }

    Ok(())
}

/// Stores the URL of an uploaded file on the account it belongs to.
pub async fn set_upload_url(
    db: &DatabaseConnection,
    account: Account,
    target: UploadTarget,
    url: String,
) -> Result<Account, AppError> {
    let now = Utc::now();
    let updated = match (account, target) {
        (Account::JobSeeker(model), target) => {
            let mut active = model.into_active_model();
            match target {
                UploadTarget::ProfilePicture => active.profile_picture = Set(Some(url)),
                UploadTarget::Resume => active.resume = Set(Some(url)),
            }
            active.updated_at = Set(now);
            Account::JobSeeker(active.update(db).await?)
        }
        (Account::OAuthJobSeeker(model), target) => {
            let mut active = model.into_active_model();
            match target {
                UploadTarget::ProfilePicture => active.profile_picture = Set(Some(url)),
                UploadTarget::Resume => active.resume = Set(Some(url)),
            }
            active.updated_at = Set(now);
            Account::OAuthJobSeeker(active.update(db).await?)
        }
        (Account::Employer(model), UploadTarget::ProfilePicture) => {
            let mut active = model.into_active_model();
            active.profile_picture = Set(Some(url));
            active.updated_at = Set(now);
            Account::Employer(active.update(db).await?)
        }
        (Account::OAuthEmployer(model), UploadTarget::ProfilePicture) => {
            let mut active = model.into_active_model();
            active.profile_picture = Set(Some(url));
            active.updated_at = Set(now);
            Account::OAuthEmployer(active.update(db).await?)
        }
        (Account::Company(model), UploadTarget::ProfilePicture) => {
            let mut active = model.into_active_model();
            active.profile_picture = Set(Some(url));
            active.updated_at = Set(now);
            Account::Company(active.update(db).await?)
        }
        (account, target) => {
            return Err(AppError::InvalidInput(format!(
                "{} accounts cannot upload a {}",
                account.kind(),
                target
            )));
        }
    };
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{registration_approval, ApprovalStatus};
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn seeker(username: &str, email: &str, password: &str) -> job_seeker::Model {
        let now = Utc::now();
        job_seeker::Model {
            id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Reyes".into(),
            username: username.into(),
            email: email.into(),
            password: passwords::hash_password(password, 4).unwrap(),
            contact: None,
            address: None,
            description: None,
            profile_picture: None,
            resume: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn approval_for(account: AccountRef, status: ApprovalStatus) -> registration_approval::Model {
        let mut model = registration_approval::Model {
            id: Uuid::new_v4(),
            job_seeker_id: None,
            employer_id: None,
            company_id: None,
            oauth_job_seeker_id: None,
            oauth_employer_id: None,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        if let AccountRef::JobSeeker(id) = account {
            model.job_seeker_id = Some(id);
        }
        model
    }

    fn registration(email: &str) -> RegisterJobSeeker {
        RegisterJobSeeker {
            first_name: "Ana".into(),
            last_name: "Reyes".into(),
            username: "ana.reyes".into(),
            email: email.into(),
            password: "correct-horse".into(),
            confirm_password: "correct-horse".into(),
            contact: None,
            address: None,
        }
    }

    fn login_request(identifier: &str, password: &str) -> LoginRequest {
        LoginRequest {
            kind: AccountKind::JobSeeker,
            identifier: identifier.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn second_registration_with_same_email_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(1)]])
            .into_connection();

        let err = register_job_seeker(&db, registration("ana@example.com"), 4)
            .await
            .unwrap_err();
        match err {
            AppError::InvalidInput(msg) => assert_eq!(msg, EMAIL_USED),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn registration_creates_account_and_pending_approval() {
        let stored = seeker("ana.reyes", "ana@example.com", "correct-horse");
        let approval = approval_for(AccountRef::JobSeeker(stored.id), ApprovalStatus::Unapproved);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(0)]])
            .append_query_results([vec![stored.clone()]])
            .append_query_results([vec![approval]])
            .into_connection();

        let created = register_job_seeker(&db, registration("Ana@Example.com"), 4)
            .await
            .unwrap();
        assert_eq!(created.id, stored.id);
    }

    #[tokio::test]
    async fn mismatched_confirmation_fails_before_touching_the_database() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut dto = registration("ana@example.com");
        dto.confirm_password = "something-else".into();

        let err = register_job_seeker(&db, dto, 4).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref m) if m == "Passwords do not match"));
    }

    #[tokio::test]
    async fn unknown_identifier_does_not_exist() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<job_seeker::Model>::new()])
            .into_connection();

        let err = login(&db, login_request("ghost", "whatever-pass")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Account doesn't exist"));
    }

    #[tokio::test]
    async fn correct_name_wrong_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![seeker("ana.reyes", "ana@example.com", "correct-horse")]])
            .into_connection();

        let err = login(&db, login_request("ana.reyes", "battery-staple"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Wrong password"));
    }

    #[tokio::test]
    async fn unapproved_account_cannot_log_in() {
        let account = seeker("ana.reyes", "ana@example.com", "correct-horse");
        let approval = approval_for(AccountRef::JobSeeker(account.id), ApprovalStatus::Unapproved);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![account]])
            .append_query_results([vec![approval]])
            .into_connection();

        let err = login(&db, login_request("ana.reyes", "correct-horse"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn accepted_duplicate_username_logs_in_with_its_own_password() {
        let first = seeker("ana.reyes", "ana1@example.com", "first-password");
        let second = seeker("ana.reyes", "ana2@example.com", "second-password");
        let approval = approval_for(AccountRef::JobSeeker(second.id), ApprovalStatus::Accepted);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![first, second.clone()]])
            .append_query_results([vec![approval]])
            .into_connection();

        let account = login(&db, login_request("ana.reyes", "second-password"))
            .await
            .unwrap();
        assert_eq!(account, Account::JobSeeker(second));
    }

    #[tokio::test]
    async fn oauth_accounts_cannot_change_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let now = Utc::now();
        let account = Account::OAuthEmployer(oauth_employer::Model {
            id: Uuid::new_v4(),
            google_id: "g-1".into(),
            email: "boss@example.com".into(),
            first_name: "Bo".into(),
            last_name: "Santos".into(),
            contact: None,
            position: None,
            profile_picture: None,
            created_at: now,
            updated_at: now,
        });
        let request = ChangePassword {
            current_password: "irrelevant".into(),
            new_password: "new-password".into(),
            confirm_password: "new-password".into(),
        };

        let err = change_password(&db, account, request, 4).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    fn company(name: &str) -> company::Model {
        let now = Utc::now();
        company::Model {
            id: Uuid::new_v4(),
            name: name.into(),
            email: "hr@acme.example".into(),
            password: "hash".into(),
            contact: None,
            address: None,
            description: None,
            profile_picture: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// SET clause of the only UPDATE in the log.
    fn update_set_clause(db: DatabaseConnection) -> String {
        db.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().to_vec())
            .find(|stmt| stmt.sql.starts_with("UPDATE"))
            .map(|stmt| stmt.sql.split(" WHERE ").next().unwrap_or_default().to_string())
            .expect("an UPDATE statement")
    }

    #[tokio::test]
    async fn profile_update_only_sets_fields_in_the_body() {
        let model = seeker("ana.reyes", "ana@example.com", "correct-horse");
        let mut saved = model.clone();
        saved.description = Some("Certified welder".into());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![saved.clone()]])
            .into_connection();

        let update = ProfileUpdate {
            description: Some("Certified welder".into()),
            ..Default::default()
        };
        let account = update_profile(&db, Account::JobSeeker(model), update)
            .await
            .unwrap();
        assert_eq!(account, Account::JobSeeker(saved));

        let set = update_set_clause(db);
        assert!(set.contains("\"description\""));
        assert!(set.contains("\"updated_at\""));
        assert!(!set.contains("\"first_name\""));
        assert!(!set.contains("\"username\""));
        assert!(!set.contains("\"contact\""));
    }

    #[tokio::test]
    async fn company_rename_to_a_taken_name_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(1)]])
            .into_connection();

        let update = ProfileUpdate {
            name: Some("  Globex ".into()),
            ..Default::default()
        };
        let err = update_profile(&db, Account::Company(company("Acme")), update)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Company name is already used");
    }

    #[tokio::test]
    async fn company_keeping_its_name_skips_the_duplicate_check() {
        let model = company("Acme");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model.clone()]])
            .into_connection();

        let update = ProfileUpdate {
            name: Some("Acme".into()),
            ..Default::default()
        };
        update_profile(&db, Account::Company(model), update)
            .await
            .unwrap();

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        assert!(log[0].statements()[0].sql.starts_with("UPDATE"));
    }

    #[tokio::test]
    async fn employers_cannot_store_a_resume() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let now = Utc::now();
        let account = Account::Employer(employer::Model {
            id: Uuid::new_v4(),
            first_name: "Bo".into(),
            last_name: "Santos".into(),
            username: "bo".into(),
            email: "bo@example.com".into(),
            password: "hash".into(),
            contact: None,
            position: None,
            profile_picture: None,
            created_at: now,
            updated_at: now,
        });

        let err = set_upload_url(&db, account, UploadTarget::Resume, "/uploads/cv.pdf".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn job_seeker_resume_url_is_saved() {
        let model = seeker("ana.reyes", "ana@example.com", "correct-horse");
        let mut saved = model.clone();
        saved.resume = Some("/uploads/cv.pdf".into());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![saved.clone()]])
            .into_connection();

        let account = set_upload_url(
            &db,
            Account::JobSeeker(model),
            UploadTarget::Resume,
            "/uploads/cv.pdf".into(),
        )
        .await
        .unwrap();
        assert_eq!(account, Account::JobSeeker(saved));
        assert!(update_set_clause(db).contains("\"resume\""));
    }

    #[test]
    fn account_serializes_with_kind_tag() {
        let account = Account::JobSeeker(seeker("ana.reyes", "ana@example.com", "correct-horse"));
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["kind"], "jobSeeker");
        assert_eq!(json["account"]["username"], "ana.reyes");
        assert!(json["account"].get("password").is_none());
    }
}
