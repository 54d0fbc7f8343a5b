use aula_entity::course::{Column, Entity, Model};
use aula_entity::{enrollment, teacher, user};
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select,
};
use serde::Serialize;
use std::collections::HashMap;

pub struct Query;

/// Filters for the public catalog: category, substring search, owning
/// teacher.
#[derive(Debug, Default, Clone)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub teacher_id: Option<i32>,
}

/// One catalog entry: the course joined with its teacher's identity, plus
/// the active-enrollment count merged in after the page fetch.
#[derive(Debug, FromQueryResult, Serialize)]
pub struct CatalogRow {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub teacher_id: i32,
    pub teacher_first_name: String,
    pub teacher_last_name: String,
    pub teacher_specialty: String,
    pub is_public: bool,
    pub requires_key: bool,
    pub max_enrollments: i32,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
    #[sea_orm(skip)]
    pub enrollment_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct EnrollmentCount {
    course_id: i32,
    count: i64,
}

fn catalog_select() -> Select<Entity> {
    Entity::find()
        .join(JoinType::InnerJoin, aula_entity::course::Relation::Teacher.def())
        .join(JoinType::InnerJoin, teacher::Relation::User.def())
        .select_only()
        .columns([
            Column::Id,
            Column::Title,
            Column::Description,
            Column::Category,
            Column::TeacherId,
            Column::IsPublic,
            Column::RequiresKey,
            Column::MaxEnrollments,
            Column::CreatedAt,
            Column::UpdatedAt,
        ])
        .column_as(user::Column::FirstName, "teacher_first_name")
        .column_as(user::Column::LastName, "teacher_last_name")
        .column_as(teacher::Column::Specialty, "teacher_specialty")
}

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    /// The course only if it belongs to the given teacher.
    pub async fn find_owned<C: ConnectionTrait>(
        conn: &C,
        course_id: i32,
        teacher_id: i32,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(course_id)
            .filter(Column::TeacherId.eq(teacher_id))
            .one(conn)
            .await
    }

    pub async fn list_by_teacher<C: ConnectionTrait>(conn: &C, teacher_id: i32) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_desc(Column::CreatedAt)
            .all(conn)
            .await
    }

    /// Every course with its teacher's identity, drafts included. Admin
    /// listings only.
    pub async fn list_all_with_teacher<C: ConnectionTrait>(conn: &C) -> Result<Vec<CatalogRow>, DbErr> {
        let mut rows = catalog_select()
            .order_by_desc(Column::CreatedAt)
            .into_model::<CatalogRow>()
            .all(conn)
            .await?;
        Self::merge_enrollment_counts(conn, &mut rows).await?;
        Ok(rows)
    }

    /// One page of the public catalog plus the filtered total, newest first.
    pub async fn catalog_page<C: ConnectionTrait>(
        conn: &C,
        filter: &CatalogFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<CatalogRow>, u64), DbErr> {
        let mut select = catalog_select().filter(Column::IsPublic.eq(true));

        if let Some(category) = &filter.category {
            select = select.filter(Column::Category.eq(category));
        }
        if let Some(search) = &filter.search {
            select = select.filter(
                Condition::any()
                    .add(Column::Title.contains(search))
                    .add(Column::Description.contains(search))
                    .add(user::Column::FirstName.contains(search))
                    .add(user::Column::LastName.contains(search)),
            );
        }
        if let Some(teacher_id) = filter.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .into_model::<CatalogRow>()
            .paginate(conn, limit.max(1));
        let total = paginator.num_items().await?;
        let mut rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        Self::merge_enrollment_counts(conn, &mut rows).await?;
        Ok((rows, total))
    }

    /// Free-text catalog search: the query also matches the teacher's name.
    pub async fn search<C: ConnectionTrait>(
        conn: &C,
        query: &str,
        category: Option<&str>,
    ) -> Result<Vec<CatalogRow>, DbErr> {
        let mut select = catalog_select().filter(Column::IsPublic.eq(true)).filter(
            Condition::any()
                .add(Column::Title.contains(query))
                .add(Column::Description.contains(query))
                .add(user::Column::FirstName.contains(query))
                .add(user::Column::LastName.contains(query)),
        );
        if let Some(category) = category {
            select = select.filter(Column::Category.eq(category));
        }

        let mut rows = select
            .order_by_desc(Column::CreatedAt)
            .into_model::<CatalogRow>()
            .all(conn)
            .await?;
        Self::merge_enrollment_counts(conn, &mut rows).await?;
        Ok(rows)
    }

    async fn merge_enrollment_counts<C: ConnectionTrait>(conn: &C, rows: &mut [CatalogRow]) -> Result<(), DbErr> {
        if rows.is_empty() {
            return Ok(());
        }
        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let counts: HashMap<i32, i64> = enrollment::Entity::find()
            .select_only()
            .column(enrollment::Column::CourseId)
            .column_as(Expr::col(enrollment::Column::Id).count(), "count")
            .filter(enrollment::Column::CourseId.is_in(ids))
            .filter(enrollment::Column::Status.eq(enrollment::Status::Active))
            .group_by(enrollment::Column::CourseId)
            .into_model::<EnrollmentCount>()
            .all(conn)
            .await?
            .into_iter()
            .map(|row| (row.course_id, row.count))
            .collect();

        for row in rows {
            row.enrollment_count = counts.get(&row.id).copied().unwrap_or_default();
        }
        Ok(())
    }
}
