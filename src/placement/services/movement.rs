//! Placement state machine and task maintenance operations.
//!
//! Every operation runs as one store transaction: it loads what it needs,
//! authorizes the actor against the task's board, checks policy and writes.
//! Any failure leaves storage untouched. Events are published only after
//! the transaction commits.

use super::{
    CloneReport, ContainerListing, CreateTaskRequest, IntegrityWarning, MoveOutcome,
    MoveTaskRequest, PlacementError, PlacementResult, TaskDetailsUpdate,
    access::{
        active_blockers, apply_renumbering, authorized_board, integrity_warnings, is_blocked_by,
        load_task, ranked_in, resolve_target,
    },
    cloning::clone_templates,
};
use crate::placement::{
    config::PlacementConfig,
    domain::{
        Actor, BoardId, Classification, Container, ContainerTarget, GateDecision, InsertAnchor,
        Placement, PlacementDomainError, Position, SprintColumnId, Task, TaskDetails, TaskId,
        TaskMoved, TaskTitle, WipDecision, compare_ranked, evaluate_blocking, evaluate_wip,
        plan_insert,
    },
    ports::{PlacementEventSink, PlacementStore, PlacementTransaction},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Task placement orchestration service.
pub struct PlacementService<S, E, C>
where
    S: PlacementStore,
    E: PlacementEventSink,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    events: Arc<E>,
    clock: Arc<C>,
    config: PlacementConfig,
}

impl<S, E, C> Clone for PlacementService<S, E, C>
where
    S: PlacementStore,
    E: PlacementEventSink,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            events: Arc::clone(&self.events),
            clock: Arc::clone(&self.clock),
            config: self.config,
        }
    }
}

struct CommittedMove {
    outcome: MoveOutcome,
    from: Placement,
    to: Container,
}

impl<S, E, C> PlacementService<S, E, C>
where
    S: PlacementStore,
    E: PlacementEventSink,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a service with the default configuration.
    #[must_use]
    pub fn new(store: Arc<S>, events: Arc<E>, clock: Arc<C>) -> Self {
        Self::with_config(store, events, clock, PlacementConfig::default())
    }

    /// Creates a service with an explicit configuration.
    #[must_use]
    pub const fn with_config(
        store: Arc<S>,
        events: Arc<E>,
        clock: Arc<C>,
        config: PlacementConfig,
    ) -> Self {
        Self {
            store,
            events,
            clock,
            config,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> PlacementConfig {
        self.config
    }

    /// Moves a task into a container.
    ///
    /// Loads the task and its board, authorizes the actor, resolves the
    /// target, applies the blocking gate and the target's WIP limit, plans
    /// the position and writes the result, all in one transaction. A
    /// [`TaskMoved`] event follows the commit.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::TaskNotFound`] or
    /// [`PlacementError::BoardNotFound`] for missing records,
    /// [`PlacementError::Permission`] when the actor lacks a grant,
    /// [`PlacementError::Validation`] for bad targets or anchors,
    /// [`PlacementError::Blocked`] when the gate denies an unforced move,
    /// [`PlacementError::Capacity`] when the target is full, and
    /// [`PlacementError::Store`] when persistence fails.
    #[instrument(
        skip_all,
        fields(task_id = %request.task_id(), user_id = %request.actor().user_id())
    )]
    pub async fn move_task(&self, request: MoveTaskRequest) -> PlacementResult<MoveOutcome> {
        let clock = Arc::clone(&self.clock);
        let config = self.config;
        let user_id = request.actor().user_id();
        let committed = self
            .store
            .transaction(move |tx| execute_move(tx, &request, config, &*clock))
            .await?;

        let CommittedMove { outcome, from, to } = committed;
        info!(
            to = %to,
            position = %outcome.task.position(),
            renumbered = outcome.renumbered,
            "task moved"
        );
        let event = TaskMoved::new(
            outcome.task.id(),
            outcome.task.board_id(),
            from,
            to,
            user_id,
            &*self.clock,
        );
        self.publish(&event).await;
        Ok(outcome)
    }

    /// Lists the tasks placed in a container in display order.
    ///
    /// Orphaned rows touching the container and shared positions are
    /// reported as warnings rather than errors.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::BoardNotFound`],
    /// [`PlacementError::Permission`], [`PlacementError::Validation`] when
    /// the container is not on the board, or [`PlacementError::Store`].
    #[instrument(skip_all, fields(board_id = %board_id, container = %container))]
    pub async fn list_container(
        &self,
        actor: &Actor,
        board_id: BoardId,
        container: Container,
    ) -> PlacementResult<ContainerListing> {
        let caller = actor.clone();
        let listing = self
            .store
            .transaction(move |tx| -> PlacementResult<ContainerListing> {
                let board = authorized_board(tx, &caller, board_id)?;
                let target = resolve_target(tx, board.id(), ContainerTarget::from(container))?;
                let rows = tx.container_tasks(board.id(), target.container)?;
                let warnings = integrity_warnings(&rows);
                let mut tasks: Vec<Task> = rows
                    .into_iter()
                    .filter(|task| task.placement().is_in(target.container))
                    .collect();
                tasks.sort_by(|left, right| compare_ranked(&left.ranked(), &right.ranked()));
                Ok(ContainerListing {
                    container: target.container,
                    tasks,
                    warnings,
                })
            })
            .await?;
        log_integrity(board_id, &listing.warnings);
        Ok(listing)
    }

    /// Classifies a task's stored placement.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::TaskNotFound`] or [`PlacementError::Store`].
    pub async fn classify(&self, task_id: TaskId) -> PlacementResult<Classification> {
        self.store
            .transaction(move |tx| -> PlacementResult<Classification> {
                Ok(load_task(tx, task_id)?.classification())
            })
            .await
    }

    /// Returns every orphaned task on a board to the end of its backlog.
    ///
    /// Repaired tasks keep their creation order and each produces a
    /// [`TaskMoved`] event. Returns the number of tasks repaired.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::BoardNotFound`],
    /// [`PlacementError::Permission`] or [`PlacementError::Store`].
    #[instrument(skip_all, fields(board_id = %board_id))]
    pub async fn repair_orphans(&self, actor: &Actor, board_id: BoardId) -> PlacementResult<usize> {
        let caller = actor.clone();
        let clock = Arc::clone(&self.clock);
        let gap = self.config.position_gap;
        let repaired = self
            .store
            .transaction(move |tx| repair_board(tx, &caller, board_id, gap, &*clock))
            .await?;

        for (task_id, from) in &repaired {
            let event = TaskMoved::new(
                *task_id,
                board_id,
                *from,
                Container::Backlog,
                actor.user_id(),
                &*self.clock,
            );
            self.publish(&event).await;
        }
        info!(repaired = repaired.len(), "orphan repair finished");
        Ok(repaired.len())
    }

    /// Reports integrity problems across a whole board.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::BoardNotFound`],
    /// [`PlacementError::Permission`] or [`PlacementError::Store`].
    #[instrument(skip_all, fields(board_id = %board_id))]
    pub async fn audit_board(
        &self,
        actor: &Actor,
        board_id: BoardId,
    ) -> PlacementResult<Vec<IntegrityWarning>> {
        let caller = actor.clone();
        let warnings = self
            .store
            .transaction(move |tx| -> PlacementResult<Vec<IntegrityWarning>> {
                let board = authorized_board(tx, &caller, board_id)?;
                let tasks = tx.board_tasks(board.id())?;
                Ok(integrity_warnings(&tasks))
            })
            .await?;
        log_integrity(board_id, &warnings);
        Ok(warnings)
    }

    /// Creates a task at the end of its board's backlog.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::Validation`] for an invalid title,
    /// [`PlacementError::BoardNotFound`], [`PlacementError::Permission`] or
    /// [`PlacementError::Store`].
    #[instrument(skip_all, fields(board_id = %request.board_id))]
    pub async fn create_task(
        &self,
        actor: &Actor,
        request: CreateTaskRequest,
    ) -> PlacementResult<Task> {
        let CreateTaskRequest {
            board_id,
            title,
            task_type,
            priority,
            estimate,
        } = request;
        let details = TaskDetails {
            title: TaskTitle::new(title)?,
            task_type,
            priority,
            estimate,
        };
        let caller = actor.clone();
        let clock = Arc::clone(&self.clock);
        let gap = self.config.position_gap;
        let task = self
            .store
            .transaction(move |tx| -> PlacementResult<Task> {
                let board = authorized_board(tx, &caller, board_id)?;
                tx.lock_container(board.id(), Container::Backlog)?;
                let ranked = ranked_in(tx, board.id(), Container::Backlog)?;
                let mut task = Task::new(board.id(), details, Position::new(0), &*clock);
                let plan = plan_insert(&ranked, task.id(), InsertAnchor::End, gap)?;
                tx.update_positions(&plan.renumbered)?;
                task.reposition(plan.position);
                tx.insert_task(&task)?;
                Ok(task)
            })
            .await?;
        info!(task_id = %task.id(), "task created");
        Ok(task)
    }

    /// Updates descriptive fields without touching placement.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::Validation`] for an invalid title,
    /// [`PlacementError::TaskNotFound`], [`PlacementError::Permission`] or
    /// [`PlacementError::Store`].
    #[instrument(skip_all, fields(task_id = %task_id))]
    pub async fn update_task_details(
        &self,
        actor: &Actor,
        task_id: TaskId,
        update: TaskDetailsUpdate,
    ) -> PlacementResult<Task> {
        let TaskDetailsUpdate {
            title,
            task_type,
            priority,
            estimate,
        } = update;
        let new_title = title.map(TaskTitle::new).transpose()?;
        let caller = actor.clone();
        let clock = Arc::clone(&self.clock);
        self.store
            .transaction(move |tx| -> PlacementResult<Task> {
                let mut task = load_task(tx, task_id)?;
                authorized_board(tx, &caller, task.board_id())?;
                let current = task.details().clone();
                let details = TaskDetails {
                    title: new_title.unwrap_or(current.title),
                    task_type: task_type.unwrap_or(current.task_type),
                    priority: priority.unwrap_or(current.priority),
                    estimate: estimate.unwrap_or(current.estimate),
                };
                task.update_details(details, &*clock);
                tx.update_task(&task)?;
                Ok(task)
            })
            .await
    }

    /// Deletes a task and every blocking edge touching it.
    ///
    /// Remaining tasks in its container keep their positions.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::TaskNotFound`],
    /// [`PlacementError::Permission`] or [`PlacementError::Store`].
    #[instrument(skip_all, fields(task_id = %task_id))]
    pub async fn delete_task(&self, actor: &Actor, task_id: TaskId) -> PlacementResult<()> {
        let caller = actor.clone();
        self.store
            .transaction(move |tx| -> PlacementResult<()> {
                let task = load_task(tx, task_id)?;
                authorized_board(tx, &caller, task.board_id())?;
                tx.delete_task(task_id)?;
                Ok(())
            })
            .await?;
        info!("task deleted");
        Ok(())
    }

    /// Records that `blocker` blocks `blocked`.
    ///
    /// Adding an existing edge succeeds without change.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::Validation`] for self-blocking, edges
    /// across boards or edges closing a cycle, and
    /// [`PlacementError::TaskNotFound`], [`PlacementError::Permission`] or
    /// [`PlacementError::Store`] otherwise.
    #[instrument(skip_all, fields(blocker = %blocker, blocked = %blocked))]
    pub async fn add_blocker(
        &self,
        actor: &Actor,
        blocker: TaskId,
        blocked: TaskId,
    ) -> PlacementResult<()> {
        if blocker == blocked {
            return Err(PlacementDomainError::SelfBlocking(blocker).into());
        }
        let caller = actor.clone();
        self.store
            .transaction(move |tx| -> PlacementResult<()> {
                let blocking_task = load_task(tx, blocker)?;
                let blocked_task = load_task(tx, blocked)?;
                if blocking_task.board_id() != blocked_task.board_id() {
                    return Err(
                        PlacementDomainError::BlockingAcrossBoards { blocker, blocked }.into()
                    );
                }
                authorized_board(tx, &caller, blocked_task.board_id())?;
                if is_blocked_by(tx, blocker, blocked)? {
                    return Err(PlacementDomainError::BlockingCycle { blocker, blocked }.into());
                }
                tx.insert_blocking_edge(blocker, blocked)?;
                Ok(())
            })
            .await?;
        debug!("blocking edge recorded");
        Ok(())
    }

    /// Removes the edge `blocker` blocks `blocked`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::TaskNotFound`],
    /// [`PlacementError::Permission`] or [`PlacementError::Store`].
    #[instrument(skip_all, fields(blocker = %blocker, blocked = %blocked))]
    pub async fn remove_blocker(
        &self,
        actor: &Actor,
        blocker: TaskId,
        blocked: TaskId,
    ) -> PlacementResult<()> {
        let caller = actor.clone();
        self.store
            .transaction(move |tx| -> PlacementResult<()> {
                let blocked_task = load_task(tx, blocked)?;
                authorized_board(tx, &caller, blocked_task.board_id())?;
                tx.delete_blocking_edge(blocker, blocked)?;
                Ok(())
            })
            .await
    }

    /// Lists the blockers of a task that are not yet in a terminal column.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::TaskNotFound`],
    /// [`PlacementError::Permission`] or [`PlacementError::Store`].
    pub async fn active_blockers(
        &self,
        actor: &Actor,
        task_id: TaskId,
    ) -> PlacementResult<Vec<TaskId>> {
        let caller = actor.clone();
        self.store
            .transaction(move |tx| -> PlacementResult<Vec<TaskId>> {
                let task = load_task(tx, task_id)?;
                authorized_board(tx, &caller, task.board_id())?;
                active_blockers(tx, task_id)
            })
            .await
    }

    /// Clones the board's template tasks into a sprint column.
    ///
    /// Free capacity is computed once; the first templates that fit are
    /// appended in template order and the rest are reported as skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::Validation`] when the column or its sprint
    /// does not exist, [`PlacementError::Permission`] or
    /// [`PlacementError::Store`].
    #[instrument(skip_all, fields(sprint_column_id = %sprint_column_id))]
    pub async fn clone_templates_into(
        &self,
        actor: &Actor,
        sprint_column_id: SprintColumnId,
    ) -> PlacementResult<CloneReport> {
        let caller = actor.clone();
        let clock = Arc::clone(&self.clock);
        let gap = self.config.position_gap;
        let report = self
            .store
            .transaction(move |tx| clone_templates(tx, &caller, sprint_column_id, gap, &*clock))
            .await?;
        info!(
            placed = report.placed.len(),
            skipped = report.skipped.len(),
            "templates cloned"
        );
        Ok(report)
    }

    async fn publish(&self, event: &TaskMoved) {
        if let Err(err) = self.events.publish(event).await {
            warn!(task_id = %event.task_id, error = %err, "failed to publish task moved event");
        }
    }
}

fn execute_move(
    tx: &mut dyn PlacementTransaction,
    request: &MoveTaskRequest,
    config: PlacementConfig,
    clock: &impl Clock,
) -> PlacementResult<CommittedMove> {
    let mut task = load_task(tx, request.task_id())?;
    let board = authorized_board(tx, request.actor(), task.board_id())?;
    let target = resolve_target(tx, board.id(), request.target())?;
    let container = target.container;
    tx.lock_container(board.id(), container)?;

    // Reordering inside the current container is not an entry: neither
    // gate nor capacity applies.
    let reordering = task.placement().is_in(container);
    let blockers = if reordering {
        Vec::new()
    } else {
        active_blockers(tx, task.id())?
    };
    let warning = match evaluate_blocking(blockers.len(), target.role()) {
        GateDecision::Allow => None,
        GateDecision::AllowWithWarning(warning) => {
            warn!(blockers = warning.blockers, "moving blocked task into an active column");
            Some(warning)
        }
        GateDecision::Deny(warning) if request.force() && config.allow_force_override => {
            warn!(blockers = warning.blockers, "blocking gate overridden");
            Some(warning)
        }
        GateDecision::Deny(warning) => {
            return Err(PlacementError::Blocked {
                task_id: task.id(),
                blockers: warning.blockers,
            });
        }
    };

    let ranked = ranked_in(tx, board.id(), container)?;
    let wip = if reordering {
        WipDecision::Allow
    } else {
        evaluate_wip(target.wip_limit(), ranked.len().saturating_add(1))
    };
    if let WipDecision::Deny { current, limit } = wip {
        return Err(PlacementError::Capacity {
            container,
            current,
            limit,
        });
    }

    let plan = plan_insert(&ranked, task.id(), request.anchor(), config.position_gap)?;
    debug!(
        position = %plan.position,
        renumbered = plan.renumbered.len(),
        "insert planned"
    );

    let from = *task.placement();
    task.place(container, plan.position, clock);
    tx.update_task(&task)?;
    tx.update_positions(&plan.renumbered)?;

    Ok(CommittedMove {
        outcome: MoveOutcome {
            classification: task.classification(),
            task,
            warning,
            preceding: plan.preceding,
            renumbered: !plan.renumbered.is_empty(),
        },
        from,
        to: container,
    })
}

fn repair_board(
    tx: &mut dyn PlacementTransaction,
    actor: &Actor,
    board_id: BoardId,
    gap: u64,
    clock: &impl Clock,
) -> PlacementResult<Vec<(TaskId, Placement)>> {
    let board = authorized_board(tx, actor, board_id)?;
    let mut orphans: Vec<Task> = tx
        .board_tasks(board.id())?
        .into_iter()
        .filter(|task| task.classification() == Classification::Orphaned)
        .collect();
    if orphans.is_empty() {
        return Ok(Vec::new());
    }
    orphans.sort_by(|left, right| {
        left.created_at()
            .cmp(&right.created_at())
            .then_with(|| left.id().cmp(&right.id()))
    });

    tx.lock_container(board.id(), Container::Backlog)?;
    let mut ranked = ranked_in(tx, board.id(), Container::Backlog)?;
    let mut repaired = Vec::with_capacity(orphans.len());
    for mut orphan in orphans {
        let plan = plan_insert(&ranked, orphan.id(), InsertAnchor::End, gap)?;
        tx.update_positions(&plan.renumbered)?;
        apply_renumbering(&mut ranked, &plan.renumbered);

        let from = *orphan.placement();
        orphan.reset_to_backlog(plan.position, clock);
        tx.update_task(&orphan)?;
        warn!(task_id = %orphan.id(), from = ?from.refs(), "orphaned placement repaired");
        ranked.push(orphan.ranked());
        repaired.push((orphan.id(), from));
    }
    Ok(repaired)
}

fn log_integrity(board_id: BoardId, warnings: &[IntegrityWarning]) {
    for warning in warnings {
        warn!(board_id = %board_id, warning = %warning, "placement integrity warning");
    }
}
