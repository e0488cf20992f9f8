//! End-to-end placement flows through the public service API.

use super::helpers::Workspace;
use sprintboard::placement::{
    config::SyncConfig,
    domain::{Classification, ColumnRole, Container, InsertAnchor, SprintColumnId},
    services::PlacementError,
    sync::{ReconcileOutcome, SyncClient},
};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread")]
async fn task_walks_from_backlog_through_a_sprint_to_done() -> Result<(), eyre::Report> {
    let workspace = Workspace::seeded().await?;
    let (sprint, review) = workspace
        .sprint_with_column("Sprint 3", "Review", ColumnRole::Active, Some(2))
        .await?;
    let done = workspace.column("Done", ColumnRole::Terminal, None).await?;
    let task_id = workspace.task("Publish release notes").await?;

    let mut seen = Vec::new();
    for container in [sprint, review, done] {
        let outcome = workspace
            .service
            .move_task(workspace.request(task_id, container))
            .await?;
        seen.push(outcome.classification);
    }

    eyre::ensure!(
        seen == [
            Classification::Sprint,
            Classification::SprintColumn,
            Classification::BoardColumn,
        ],
        "unexpected classifications: {seen:?}"
    );
    eyre::ensure!(
        workspace.order_of(done).await? == vec![task_id],
        "task should end in done"
    );
    let events = workspace.events.events()?;
    eyre::ensure!(events.len() == 3, "expected three events, got {}", events.len());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn sprint_planning_clones_templates_until_the_column_fills() -> Result<(), eyre::Report> {
    let workspace = Workspace::seeded().await?;
    let (_, todo) = workspace
        .sprint_with_column("Sprint 4", "To do", ColumnRole::Initial, Some(3))
        .await?;
    for (order, title) in [(1, "Standup"), (2, "Retro"), (3, "Demo"), (4, "Plan"), (5, "Groom")] {
        workspace.template(title, order).await?;
    }
    let Container::SprintColumn(column_id, _) = todo else {
        eyre::bail!("expected a sprint column container");
    };

    let report = clone_into(&workspace, column_id).await?;

    eyre::ensure!(report.0 == 3, "expected three clones, got {}", report.0);
    eyre::ensure!(report.1 == 2, "expected two skips, got {}", report.1);
    let extra = workspace.task("Unplanned").await?;
    let overflow = workspace
        .service
        .move_task(workspace.request(extra, todo))
        .await;
    eyre::ensure!(
        matches!(overflow, Err(PlacementError::Capacity { current: 3, .. })),
        "expected a capacity error, got {overflow:?}"
    );
    Ok(())
}

async fn clone_into(
    workspace: &Workspace,
    column_id: SprintColumnId,
) -> Result<(usize, usize), eyre::Report> {
    let report = workspace
        .service
        .clone_templates_into(&workspace.actor, column_id)
        .await?;
    Ok((report.placed.len(), report.skipped.len()))
}

#[tokio::test(flavor = "multi_thread")]
async fn drag_and_drop_matches_the_server_order() -> Result<(), eyre::Report> {
    let workspace = Workspace::seeded().await?;
    let todo = workspace.column("To do", ColumnRole::Initial, None).await?;
    let first = workspace.task("First").await?;
    let second = workspace.task("Second").await?;
    let third = workspace.task("Third").await?;
    for task_id in [first, second, third] {
        workspace
            .service
            .move_task(workspace.request(task_id, todo))
            .await?;
    }
    let sync = SyncClient::new(
        Arc::new(workspace.service.clone()),
        workspace.actor.clone(),
        workspace.board.id(),
        SyncConfig::default(),
    );
    sync.refresh(todo).await?;

    let dragged = sync
        .drag(third, todo, InsertAnchor::After(first), false)
        .await?;

    eyre::ensure!(
        dragged.reconciliation == ReconcileOutcome::Reaffirmed,
        "drag should land where it was shown"
    );
    let server = workspace.order_of(todo).await?;
    eyre::ensure!(server == vec![first, third, second], "server order {server:?}");
    eyre::ensure!(sync.view(todo) == server, "client view diverged");
    Ok(())
}
