//! Cloning predefined template tasks into sprint columns.
//!
//! Free capacity is counted once, under the container lock, and the
//! candidate list is cut to fit before anything is written.

use super::{
    CloneReport, PlacementResult,
    access::{apply_renumbering, authorized_board, ranked_in},
};
use crate::placement::{
    domain::{
        Actor, Container, ContainerKind, InsertAnchor, PlacementDomainError, Position,
        SprintColumnId, available_slots, plan_insert,
    },
    ports::PlacementTransaction,
};
use mockable::Clock;

pub(super) fn clone_templates(
    tx: &mut dyn PlacementTransaction,
    actor: &Actor,
    sprint_column_id: SprintColumnId,
    gap: u64,
    clock: &impl Clock,
) -> PlacementResult<CloneReport> {
    let not_found = || PlacementDomainError::ContainerNotFound {
        kind: ContainerKind::SprintColumn,
        id: sprint_column_id.into_inner(),
    };
    let column = tx
        .find_sprint_column(sprint_column_id)?
        .ok_or_else(not_found)?;
    let sprint = tx.find_sprint(column.sprint_id())?.ok_or_else(not_found)?;
    let board = authorized_board(tx, actor, sprint.board_id())?;
    let container = Container::SprintColumn(column.id(), sprint.id());
    tx.lock_container(board.id(), container)?;

    let mut ranked = ranked_in(tx, board.id(), container)?;
    let templates = tx.board_templates(board.id())?;
    let available =
        available_slots(column.policy().wip_limit, ranked.len()).unwrap_or(templates.len());

    let mut candidates = templates.into_iter();
    let mut report = CloneReport::default();
    for template in candidates.by_ref().take(available) {
        let mut task = template.instantiate(container, Position::new(0), clock);
        let plan = plan_insert(&ranked, task.id(), InsertAnchor::End, gap)?;
        tx.update_positions(&plan.renumbered)?;
        apply_renumbering(&mut ranked, &plan.renumbered);
        task.reposition(plan.position);
        tx.insert_task(&task)?;
        ranked.push(task.ranked());
        report.placed.push(task.id());
    }
    report.skipped = candidates.map(|template| template.id()).collect();
    Ok(report)
}
