//! `PostgreSQL` placement store.
//!
//! Each unit of work runs in a `SERIALIZABLE` transaction on a pooled
//! connection inside `spawn_blocking`. [`PlacementTransaction::lock_container`]
//! takes a `FOR UPDATE` lock on the row that owns the container (the board
//! for its backlog, otherwise the column or sprint row), so concurrent moves
//! into one container queue behind each other instead of racing the WIP
//! count.

use super::{
    models::{
        BoardColumnRow, BoardRow, SprintColumnRow, SprintRow, TaskRecord, TaskRow,
        TemplateTaskRow,
    },
    schema::{board_columns, boards, sprint_columns, sprints, task_blockers, tasks, template_tasks},
};
use crate::placement::{
    domain::{
        Board, BoardColumn, BoardColumnId, BoardId, ColumnPolicy, ColumnRole, Container, Estimate,
        OrganizationId, PersistedTaskData, Placement, PlacementRefs, Position, Priority, Sprint,
        SprintColumn, SprintColumnId, SprintId, Task, TaskDetails, TaskId, TaskTitle, TaskType,
        TemplateId, TemplateTask, WipLimit,
    },
    ports::{PlacementStore, PlacementStoreError, PlacementStoreResult, PlacementTransaction},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by placement adapters.
pub type PlacementPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed placement store.
#[derive(Debug, Clone)]
pub struct PostgresPlacementStore {
    pool: PlacementPgPool,
}

impl PostgresPlacementStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PlacementPgPool) -> Self {
        Self { pool }
    }
}

enum TransactionFailure<E> {
    Work(E),
    Database(DieselError),
}

impl<E> From<DieselError> for TransactionFailure<E> {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

#[async_trait]
impl PlacementStore for PostgresPlacementStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn PlacementTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<PlacementStoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(|err| E::from(PlacementStoreError::persistence(err)))?;
            connection
                .build_transaction()
                .serializable()
                .run::<T, TransactionFailure<E>, _>(|conn| {
                    let mut transaction = PgPlacementTransaction { conn };
                    work(&mut transaction).map_err(TransactionFailure::Work)
                })
                .map_err(|failure| match failure {
                    TransactionFailure::Work(err) => err,
                    TransactionFailure::Database(err) => E::from(store_error(err)),
                })
        })
        .await
        .map_err(|err| E::from(PlacementStoreError::persistence(err)))?
    }
}

struct PgPlacementTransaction<'c> {
    conn: &'c mut PgConnection,
}

impl PlacementTransaction for PgPlacementTransaction<'_> {
    fn find_task(&mut self, id: TaskId) -> PlacementStoreResult<Option<Task>> {
        let row = tasks::table
            .find(id.into_inner())
            .select(TaskRow::as_select())
            .first::<TaskRow>(self.conn)
            .optional()
            .map_err(store_error)?;
        row.map(row_to_task).transpose()
    }

    fn insert_task(&mut self, task: &Task) -> PlacementStoreResult<()> {
        let record = to_task_record(task)?;
        diesel::insert_into(tasks::table)
            .values(&record)
            .execute(self.conn)
            .map_err(|err| insert_error(err, "task", task.id()))?;
        Ok(())
    }

    fn update_task(&mut self, task: &Task) -> PlacementStoreResult<()> {
        let record = to_task_record(task)?;
        let updated = diesel::update(tasks::table.find(task.id().into_inner()))
            .set(&record)
            .execute(self.conn)
            .map_err(store_error)?;
        if updated == 0 {
            return Err(PlacementStoreError::not_found("task", task.id()));
        }
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> PlacementStoreResult<()> {
        let raw = id.into_inner();
        diesel::delete(
            task_blockers::table.filter(
                task_blockers::blocker_id
                    .eq(raw)
                    .or(task_blockers::blocked_id.eq(raw)),
            ),
        )
        .execute(self.conn)
        .map_err(store_error)?;
        diesel::delete(tasks::table.find(raw))
            .execute(self.conn)
            .map_err(store_error)?;
        Ok(())
    }

    fn update_positions(&mut self, positions: &[(TaskId, Position)]) -> PlacementStoreResult<()> {
        for (id, position) in positions {
            diesel::update(tasks::table.find(id.into_inner()))
                .set(tasks::position.eq(to_db_position(*position)?))
                .execute(self.conn)
                .map_err(store_error)?;
        }
        Ok(())
    }

    fn lock_container(
        &mut self,
        board_id: BoardId,
        container: Container,
    ) -> PlacementStoreResult<()> {
        let locked = match container {
            Container::Backlog => boards::table
                .find(board_id.into_inner())
                .select(boards::id)
                .for_update()
                .first::<uuid::Uuid>(self.conn),
            Container::BoardColumn(id) => board_columns::table
                .find(id.into_inner())
                .select(board_columns::id)
                .for_update()
                .first::<uuid::Uuid>(self.conn),
            Container::Sprint(id) => sprints::table
                .find(id.into_inner())
                .select(sprints::id)
                .for_update()
                .first::<uuid::Uuid>(self.conn),
            Container::SprintColumn(id, _) => sprint_columns::table
                .find(id.into_inner())
                .select(sprint_columns::id)
                .for_update()
                .first::<uuid::Uuid>(self.conn),
        };
        locked.optional().map_err(store_error)?;
        Ok(())
    }

    fn container_tasks(
        &mut self,
        board_id: BoardId,
        container: Container,
    ) -> PlacementStoreResult<Vec<Task>> {
        let board_rows = tasks::table
            .filter(tasks::board_id.eq(board_id.into_inner()))
            .select(TaskRow::as_select())
            .into_boxed();
        let query = match container {
            Container::Backlog => board_rows
                .filter(tasks::board_column_id.is_null())
                .filter(tasks::sprint_id.is_null())
                .filter(tasks::sprint_column_id.is_null()),
            Container::BoardColumn(id) => {
                board_rows.filter(tasks::board_column_id.eq(id.into_inner()))
            }
            Container::Sprint(id) => board_rows
                .filter(tasks::sprint_id.eq(id.into_inner()))
                .filter(tasks::sprint_column_id.is_null()),
            Container::SprintColumn(id, _) => {
                board_rows.filter(tasks::sprint_column_id.eq(id.into_inner()))
            }
        };
        let rows = query.load::<TaskRow>(self.conn).map_err(store_error)?;
        rows.into_iter().map(row_to_task).collect()
    }

    fn board_tasks(&mut self, board_id: BoardId) -> PlacementStoreResult<Vec<Task>> {
        let rows = tasks::table
            .filter(tasks::board_id.eq(board_id.into_inner()))
            .select(TaskRow::as_select())
            .load::<TaskRow>(self.conn)
            .map_err(store_error)?;
        rows.into_iter().map(row_to_task).collect()
    }

    fn find_board(&mut self, id: BoardId) -> PlacementStoreResult<Option<Board>> {
        let row = boards::table
            .find(id.into_inner())
            .select(BoardRow::as_select())
            .first::<BoardRow>(self.conn)
            .optional()
            .map_err(store_error)?;
        Ok(row.map(|board| {
            Board::from_parts(
                BoardId::from_uuid(board.id),
                OrganizationId::from_uuid(board.organization_id),
                board.name,
            )
        }))
    }

    fn insert_board(&mut self, board: &Board) -> PlacementStoreResult<()> {
        let row = BoardRow {
            id: board.id().into_inner(),
            organization_id: board.organization_id().into_inner(),
            name: board.name().to_owned(),
        };
        diesel::insert_into(boards::table)
            .values(&row)
            .execute(self.conn)
            .map_err(|err| insert_error(err, "board", board.id()))?;
        Ok(())
    }

    fn find_board_column(
        &mut self,
        id: BoardColumnId,
    ) -> PlacementStoreResult<Option<BoardColumn>> {
        let row = board_columns::table
            .find(id.into_inner())
            .select(BoardColumnRow::as_select())
            .first::<BoardColumnRow>(self.conn)
            .optional()
            .map_err(store_error)?;
        row.map(|column| {
            let policy = to_policy(&column.role, column.wip_limit)?;
            Ok(BoardColumn::from_parts(
                BoardColumnId::from_uuid(column.id),
                BoardId::from_uuid(column.board_id),
                column.name,
                policy,
            ))
        })
        .transpose()
    }

    fn insert_board_column(&mut self, column: &BoardColumn) -> PlacementStoreResult<()> {
        let policy = column.policy();
        let row = BoardColumnRow {
            id: column.id().into_inner(),
            board_id: column.board_id().into_inner(),
            name: column.name().to_owned(),
            role: policy.role.as_str().to_owned(),
            wip_limit: to_db_wip_limit(policy.wip_limit)?,
        };
        diesel::insert_into(board_columns::table)
            .values(&row)
            .execute(self.conn)
            .map_err(|err| insert_error(err, "board column", column.id()))?;
        Ok(())
    }

    fn find_sprint(&mut self, id: SprintId) -> PlacementStoreResult<Option<Sprint>> {
        let row = sprints::table
            .find(id.into_inner())
            .select(SprintRow::as_select())
            .first::<SprintRow>(self.conn)
            .optional()
            .map_err(store_error)?;
        Ok(row.map(|sprint| {
            Sprint::from_parts(
                SprintId::from_uuid(sprint.id),
                BoardId::from_uuid(sprint.board_id),
                sprint.name,
            )
        }))
    }

    fn insert_sprint(&mut self, sprint: &Sprint) -> PlacementStoreResult<()> {
        let row = SprintRow {
            id: sprint.id().into_inner(),
            board_id: sprint.board_id().into_inner(),
            name: sprint.name().to_owned(),
        };
        diesel::insert_into(sprints::table)
            .values(&row)
            .execute(self.conn)
            .map_err(|err| insert_error(err, "sprint", sprint.id()))?;
        Ok(())
    }

    fn find_sprint_column(
        &mut self,
        id: SprintColumnId,
    ) -> PlacementStoreResult<Option<SprintColumn>> {
        let row = sprint_columns::table
            .find(id.into_inner())
            .select(SprintColumnRow::as_select())
            .first::<SprintColumnRow>(self.conn)
            .optional()
            .map_err(store_error)?;
        row.map(|column| {
            let policy = to_policy(&column.role, column.wip_limit)?;
            Ok(SprintColumn::from_parts(
                SprintColumnId::from_uuid(column.id),
                SprintId::from_uuid(column.sprint_id),
                column.name,
                policy,
            ))
        })
        .transpose()
    }

    fn insert_sprint_column(&mut self, column: &SprintColumn) -> PlacementStoreResult<()> {
        let policy = column.policy();
        let row = SprintColumnRow {
            id: column.id().into_inner(),
            sprint_id: column.sprint_id().into_inner(),
            name: column.name().to_owned(),
            role: policy.role.as_str().to_owned(),
            wip_limit: to_db_wip_limit(policy.wip_limit)?,
        };
        diesel::insert_into(sprint_columns::table)
            .values(&row)
            .execute(self.conn)
            .map_err(|err| insert_error(err, "sprint column", column.id()))?;
        Ok(())
    }

    fn board_templates(&mut self, board_id: BoardId) -> PlacementStoreResult<Vec<TemplateTask>> {
        let rows = template_tasks::table
            .filter(template_tasks::board_id.eq(board_id.into_inner()))
            .order_by((template_tasks::template_order.asc(), template_tasks::id.asc()))
            .select(TemplateTaskRow::as_select())
            .load::<TemplateTaskRow>(self.conn)
            .map_err(store_error)?;
        rows.into_iter().map(row_to_template).collect()
    }

    fn insert_template(&mut self, template: &TemplateTask) -> PlacementStoreResult<()> {
        let details = template.details();
        let row = TemplateTaskRow {
            id: template.id().into_inner(),
            board_id: template.board_id().into_inner(),
            title: details.title.as_str().to_owned(),
            task_type: details.task_type.as_str().to_owned(),
            priority: details.priority.as_str().to_owned(),
            estimate: to_db_estimate(details.estimate)?,
            template_order: i32::try_from(template.order())
                .map_err(PlacementStoreError::persistence)?,
        };
        diesel::insert_into(template_tasks::table)
            .values(&row)
            .execute(self.conn)
            .map_err(|err| insert_error(err, "template", template.id()))?;
        Ok(())
    }

    fn blockers_of(&mut self, task_id: TaskId) -> PlacementStoreResult<Vec<TaskId>> {
        let ids = task_blockers::table
            .filter(task_blockers::blocked_id.eq(task_id.into_inner()))
            .order_by(task_blockers::blocker_id.asc())
            .select(task_blockers::blocker_id)
            .load::<uuid::Uuid>(self.conn)
            .map_err(store_error)?;
        Ok(ids.into_iter().map(TaskId::from_uuid).collect())
    }

    fn insert_blocking_edge(
        &mut self,
        blocker: TaskId,
        blocked: TaskId,
    ) -> PlacementStoreResult<()> {
        diesel::insert_into(task_blockers::table)
            .values((
                task_blockers::blocker_id.eq(blocker.into_inner()),
                task_blockers::blocked_id.eq(blocked.into_inner()),
            ))
            .on_conflict_do_nothing()
            .execute(self.conn)
            .map_err(store_error)?;
        Ok(())
    }

    fn delete_blocking_edge(
        &mut self,
        blocker: TaskId,
        blocked: TaskId,
    ) -> PlacementStoreResult<()> {
        diesel::delete(
            task_blockers::table
                .filter(task_blockers::blocker_id.eq(blocker.into_inner()))
                .filter(task_blockers::blocked_id.eq(blocked.into_inner())),
        )
        .execute(self.conn)
        .map_err(store_error)?;
        Ok(())
    }
}

fn store_error(err: DieselError) -> PlacementStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, info) => {
            PlacementStoreError::Conflict(info.message().to_owned())
        }
        other => PlacementStoreError::persistence(other),
    }
}

fn insert_error(err: DieselError, record: &'static str, id: impl ToString) -> PlacementStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            PlacementStoreError::duplicate(record, id)
        }
        other => store_error(other),
    }
}

fn to_db_position(position: Position) -> PlacementStoreResult<i64> {
    i64::try_from(position.value()).map_err(PlacementStoreError::persistence)
}

fn to_db_wip_limit(limit: Option<WipLimit>) -> PlacementStoreResult<Option<i32>> {
    limit
        .map(|value| i32::try_from(value.value()).map_err(PlacementStoreError::persistence))
        .transpose()
}

fn to_db_estimate(estimate: Option<Estimate>) -> PlacementStoreResult<Option<i32>> {
    estimate
        .map(|value| i32::try_from(value.points()).map_err(PlacementStoreError::persistence))
        .transpose()
}

fn to_policy(raw_role: &str, raw_limit: Option<i32>) -> PlacementStoreResult<ColumnPolicy> {
    let role = ColumnRole::try_from(raw_role).map_err(PlacementStoreError::persistence)?;
    let wip_limit = raw_limit
        .map(|value| {
            u32::try_from(value)
                .map(WipLimit::new)
                .map_err(PlacementStoreError::persistence)
        })
        .transpose()?;
    Ok(ColumnPolicy { role, wip_limit })
}

fn to_details(
    title: String,
    task_type: &str,
    priority: &str,
    estimate: Option<i32>,
) -> PlacementStoreResult<TaskDetails> {
    Ok(TaskDetails {
        title: TaskTitle::new(title).map_err(PlacementStoreError::persistence)?,
        task_type: TaskType::try_from(task_type).map_err(PlacementStoreError::persistence)?,
        priority: Priority::try_from(priority).map_err(PlacementStoreError::persistence)?,
        estimate: estimate
            .map(|points| {
                u32::try_from(points)
                    .map(Estimate::new)
                    .map_err(PlacementStoreError::persistence)
            })
            .transpose()?,
    })
}

fn to_task_record(task: &Task) -> PlacementStoreResult<TaskRecord> {
    let details = task.details();
    let refs = task.placement().refs();
    Ok(TaskRecord {
        id: task.id().into_inner(),
        board_id: task.board_id().into_inner(),
        title: details.title.as_str().to_owned(),
        task_type: details.task_type.as_str().to_owned(),
        priority: details.priority.as_str().to_owned(),
        estimate: to_db_estimate(details.estimate)?,
        board_column_id: refs.board_column.map(BoardColumnId::into_inner),
        sprint_id: refs.sprint.map(SprintId::into_inner),
        sprint_column_id: refs.sprint_column.map(SprintColumnId::into_inner),
        position: to_db_position(task.position())?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> PlacementStoreResult<Task> {
    let TaskRow {
        id,
        board_id,
        title,
        task_type,
        priority,
        estimate,
        board_column_id,
        sprint_id,
        sprint_column_id,
        position,
        created_at,
        updated_at,
    } = row;

    let refs = PlacementRefs {
        board_column: board_column_id.map(BoardColumnId::from_uuid),
        sprint: sprint_id.map(SprintId::from_uuid),
        sprint_column: sprint_column_id.map(SprintColumnId::from_uuid),
    };
    let rank = u64::try_from(position).map_err(PlacementStoreError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        board_id: BoardId::from_uuid(board_id),
        details: to_details(title, &task_type, &priority, estimate)?,
        placement: Placement::from_refs(refs),
        position: Position::new(rank),
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}

fn row_to_template(row: TemplateTaskRow) -> PlacementStoreResult<TemplateTask> {
    let order = u32::try_from(row.template_order).map_err(PlacementStoreError::persistence)?;
    let details = to_details(row.title, &row.task_type, &row.priority, row.estimate)?;
    Ok(TemplateTask::from_parts(
        TemplateId::from_uuid(row.id),
        BoardId::from_uuid(row.board_id),
        details,
        order,
    ))
}
