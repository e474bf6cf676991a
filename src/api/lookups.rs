//! Generic controller for the lookup tables, mounted once per entity.

use std::marker::PhantomData;

use actix_web::{HttpRequest, HttpResponse, web};
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, IntoActiveModel, PrimaryKeyTrait};
use serde::Serialize;

use crate::{
    api::{
        context::{ensure_admin_access, resolve_account_context},
        response,
    },
    app_state::AppState,
    database::models::{category, skill, vulnerability},
    errors::AppError,
    services::crud::{CrudService, LookupEntity, LookupInput},
};

pub struct LookupController<E>(PhantomData<E>);

impl<E> LookupController<E>
where
    E: LookupEntity + 'static,
    E::Model: IntoActiveModel<E::ActiveModel> + Serialize + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
{
    async fn list(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
        let rows = CrudService::<E>::list(&data.db).await?;
        Ok(response::ok(format!("{} list", E::LABEL), rows))
    }

    async fn get(data: web::Data<AppState>, path: web::Path<i32>) -> Result<HttpResponse, AppError> {
        let row = CrudService::<E>::get(&data.db, path.into_inner()).await?;
        Ok(response::ok(format!("{} found", E::LABEL), row))
    }

    async fn create(
        req: HttpRequest,
        data: web::Data<AppState>,
        body: web::Json<LookupInput>,
    ) -> Result<HttpResponse, AppError> {
        let ctx = resolve_account_context(&req, &data).await?;
        ensure_admin_access(&ctx)?;
        let row = CrudService::<E>::create(&data.db, body.into_inner()).await?;
        Ok(response::created(format!("{} created", E::LABEL), row))
    }

    async fn update(
        req: HttpRequest,
        data: web::Data<AppState>,
        path: web::Path<i32>,
        body: web::Json<LookupInput>,
    ) -> Result<HttpResponse, AppError> {
        let ctx = resolve_account_context(&req, &data).await?;
        ensure_admin_access(&ctx)?;
        let row = CrudService::<E>::update(&data.db, path.into_inner(), body.into_inner()).await?;
        Ok(response::ok(format!("{} updated", E::LABEL), row))
    }

    async fn delete(
        req: HttpRequest,
        data: web::Data<AppState>,
        path: web::Path<i32>,
    ) -> Result<HttpResponse, AppError> {
        let ctx = resolve_account_context(&req, &data).await?;
        ensure_admin_access(&ctx)?;
        CrudService::<E>::delete(&data.db, path.into_inner()).await?;
        Ok(response::ok(format!("{} deleted", E::LABEL), ()))
    }

    pub fn scope(path: &str) -> actix_web::Scope {
        web::scope(path)
            .route("", web::get().to(Self::list))
            .route("", web::post().to(Self::create))
            .route("/{id}", web::get().to(Self::get))
            .route("/{id}", web::put().to(Self::update))
            .route("/{id}", web::delete().to(Self::delete))
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(LookupController::<skill::Entity>::scope("/skill"))
        .service(LookupController::<category::Entity>::scope("/category"))
        .service(LookupController::<vulnerability::Entity>::scope("/vulnerability"));
}
