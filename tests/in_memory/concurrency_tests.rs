//! Concurrent movement against one store.

use super::helpers::Workspace;
use sprintboard::placement::{domain::ColumnRole, services::PlacementError};
use std::collections::HashSet;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_moves_respect_the_wip_limit() -> Result<(), eyre::Report> {
    let workspace = Workspace::seeded().await?;
    let doing = workspace.column("Doing", ColumnRole::Active, Some(3)).await?;
    let mut task_ids = Vec::new();
    for index in 0..8 {
        task_ids.push(workspace.task(&format!("Racer {index}")).await?);
    }

    let mut moves = JoinSet::new();
    for task_id in task_ids {
        let service = workspace.service.clone();
        let request = workspace.request(task_id, doing);
        moves.spawn(async move { service.move_task(request).await });
    }
    let mut placed = 0_usize;
    let mut refused = 0_usize;
    while let Some(joined) = moves.join_next().await {
        match joined? {
            Ok(_) => placed += 1,
            Err(PlacementError::Capacity { .. }) => refused += 1,
            Err(other) => eyre::bail!("unexpected failure: {other}"),
        }
    }

    eyre::ensure!(placed == 3, "expected three placements, got {placed}");
    eyre::ensure!(refused == 5, "expected five refusals, got {refused}");
    eyre::ensure!(workspace.order_of(doing).await?.len() == 3, "column overfilled");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_reorders_keep_positions_unique() -> Result<(), eyre::Report> {
    let workspace = Workspace::seeded().await?;
    let todo = workspace.column("To do", ColumnRole::Initial, None).await?;
    let mut task_ids = Vec::new();
    for index in 0..6 {
        let task_id = workspace.task(&format!("Card {index}")).await?;
        workspace
            .service
            .move_task(workspace.request(task_id, todo))
            .await?;
        task_ids.push(task_id);
    }

    let mut moves = JoinSet::new();
    for task_id in task_ids.iter().rev().copied() {
        let service = workspace.service.clone();
        let request = workspace.request(task_id, todo).at_start();
        moves.spawn(async move { service.move_task(request).await });
    }
    while let Some(joined) = moves.join_next().await {
        joined??;
    }

    let listing = workspace
        .service
        .list_container(&workspace.actor, workspace.board.id(), todo)
        .await?;
    let positions: HashSet<u64> = listing
        .tasks
        .iter()
        .map(|task| task.position().value())
        .collect();
    eyre::ensure!(positions.len() == 6, "positions collided: {positions:?}");
    eyre::ensure!(listing.warnings.is_empty(), "unexpected warnings");
    Ok(())
}
