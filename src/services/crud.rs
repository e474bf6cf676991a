//! Default CRUD for the small name-only lookup tables.

use std::marker::PhantomData;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait, QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::validation::FieldErrors;
use crate::database::models::{category, skill, vulnerability};
use crate::errors::AppError;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LookupInput {
    pub name: String,
}

impl LookupInput {
    fn validate(&self) -> Result<String, AppError> {
        let mut errors = FieldErrors::new();
        errors.required("name", &self.name, 64);
        errors.finish()?;
        Ok(self.name.trim().to_string())
    }
}

/// An entity with an integer id and a unique `name`.
pub trait LookupEntity: EntityTrait {
    /// Singular, capitalised; used in messages.
    const LABEL: &'static str;

    fn id_column() -> Self::Column;
    fn new_model(name: String) -> Self::ActiveModel;
    fn renamed(model: Self::Model, name: String) -> Self::ActiveModel;
}

macro_rules! lookup_entity {
    ($module:ident, $label:literal) => {
        impl LookupEntity for $module::Entity {
            const LABEL: &'static str = $label;

            fn id_column() -> $module::Column {
                $module::Column::Id
            }

            fn new_model(name: String) -> $module::ActiveModel {
                $module::ActiveModel {
                    name: Set(name),
                    ..Default::default()
                }
            }

            fn renamed(model: $module::Model, name: String) -> $module::ActiveModel {
                let mut active = model.into_active_model();
                active.name = Set(name);
                active
            }
        }
    };
}

lookup_entity!(skill, "Skill");
lookup_entity!(category, "Category");
lookup_entity!(vulnerability, "Vulnerability");

/// Unique violations surface with the entity's own label.
fn relabel(err: AppError, label: &str) -> AppError {
    match err {
        AppError::Conflict(_) => AppError::Conflict(format!("{} already exists", label)),
        other => other,
    }
}

pub struct CrudService<E>(PhantomData<E>);

impl<E> CrudService<E>
where
    E: LookupEntity,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
{
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<E::Model>, AppError> {
        Ok(E::find().order_by_asc(E::id_column()).all(db).await?)
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<E::Model, AppError> {
        E::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", E::LABEL, id)))
    }

    pub async fn create(db: &DatabaseConnection, input: LookupInput) -> Result<E::Model, AppError> {
        let name = input.validate()?;
        let created = E::new_model(name)
            .insert(db)
            .await
            .map_err(|e| relabel(e.into(), E::LABEL))?;
        log::info!("{} created", E::LABEL);
        Ok(created)
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        input: LookupInput,
    ) -> Result<E::Model, AppError> {
        let name = input.validate()?;
        let existing = Self::get(db, id).await?;
        let updated = E::renamed(existing, name)
            .update(db)
            .await
            .map_err(|e| relabel(e.into(), E::LABEL))?;
        log::info!("{} {} renamed", E::LABEL, id);
        Ok(updated)
    }

    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), AppError> {
        let result = E::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("{} {} not found", E::LABEL, id)));
        }
        log::info!("{} {} deleted", E::LABEL, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[test]
    fn conflicts_name_the_lookup() {
        let err = relabel(AppError::Conflict("Record already exists".into()), "Skill");
        assert_eq!(err.to_string(), "Skill already exists");
        let err = relabel(AppError::NotFound("x".into()), "Skill");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn lists_and_creates() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                category::Model { id: 1, name: "IT".into() },
                category::Model { id: 2, name: "Health".into() },
            ]])
            .append_query_results([vec![category::Model { id: 3, name: "Retail".into() }]])
            .into_connection();

        let all = CrudService::<category::Entity>::list(&db).await.unwrap();
        assert_eq!(all.len(), 2);

        let created = CrudService::<category::Entity>::create(
            &db,
            LookupInput { name: "  Retail ".into() },
        )
        .await
        .unwrap();
        assert_eq!(created.name, "Retail");
    }

    #[tokio::test]
    async fn blank_names_are_rejected_before_the_database() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = CrudService::<skill::Entity>::create(&db, LookupInput { name: " ".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<vulnerability::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let err = CrudService::<vulnerability::Entity>::get(&db, 9).await.unwrap_err();
        assert_eq!(err.to_string(), "Vulnerability 9 not found");
        let err = CrudService::<vulnerability::Entity>::delete(&db, 9).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
