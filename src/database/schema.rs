use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};

use crate::database::models::{
    admin, category, company, employer, job_finding_post, job_finding_post_category,
    job_finding_post_skill, job_post, job_post_category, job_post_skill, job_seeker,
    oauth_employer, oauth_job_seeker, registration_approval, session, skill, vulnerability,
};

/// Creates every table derived from the entities, skipping the ones that
/// already exist. Referenced tables come before the tables pointing at them.
pub async fn create_all(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statements = vec![
        schema.create_table_from_entity(job_seeker::Entity),
        schema.create_table_from_entity(employer::Entity),
        schema.create_table_from_entity(company::Entity),
        schema.create_table_from_entity(admin::Entity),
        schema.create_table_from_entity(oauth_job_seeker::Entity),
        schema.create_table_from_entity(oauth_employer::Entity),
        schema.create_table_from_entity(registration_approval::Entity),
        schema.create_table_from_entity(skill::Entity),
        schema.create_table_from_entity(category::Entity),
        schema.create_table_from_entity(vulnerability::Entity),
        schema.create_table_from_entity(job_post::Entity),
        schema.create_table_from_entity(job_post_skill::Entity),
        schema.create_table_from_entity(job_post_category::Entity),
        schema.create_table_from_entity(job_finding_post::Entity),
        schema.create_table_from_entity(job_finding_post_skill::Entity),
        schema.create_table_from_entity(job_finding_post_category::Entity),
        schema.create_table_from_entity(session::Entity),
    ];

    for statement in statements.iter_mut() {
        statement.if_not_exists();
        db.execute(backend.build(&*statement)).await?;
    }

    log::info!("Schema ready ({} tables)", statements.len());
    Ok(())
}
