//! Placement transactions against a real `PostgreSQL` database.

use super::helpers::{PgWorkspace, test_runtime};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use sprintboard::placement::{
    domain::{BoardColumnId, Classification, ColumnRole, Container, Placement, PlacementRefs},
    services::PlacementError,
};

#[rstest]
fn concurrent_moves_into_the_last_free_slot_place_one_task(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let runtime = test_runtime()?;
    let workspace = PgWorkspace::open(shared_test_cluster, &runtime)?;
    runtime.block_on(async {
        let doing = workspace.column("Doing", ColumnRole::Active, Some(2)).await?;
        let occupant = workspace.task_in("Occupant", doing).await?;
        let first = workspace.task("First racer").await?;
        let second = workspace.task("Second racer").await?;

        let (left, right) = tokio::join!(
            workspace.service.move_task(workspace.request(first, doing)),
            workspace.service.move_task(workspace.request(second, doing)),
        );

        let mut placed = Vec::new();
        for (task_id, result) in [(first, left), (second, right)] {
            match result {
                Ok(_) => placed.push(task_id),
                Err(PlacementError::Capacity { .. }) => {}
                Err(err) if err.is_retryable() => {}
                Err(err) => eyre::bail!("unexpected failure: {err}"),
            }
        }
        eyre::ensure!(placed.len() == 1, "expected one placement, got {placed:?}");

        let order = workspace.order_of(doing).await?;
        eyre::ensure!(order.len() == 2, "column holds {order:?}");
        eyre::ensure!(order.contains(&occupant), "occupant lost: {order:?}");
        Ok(())
    })
}

#[rstest]
fn moving_out_of_a_sprint_column_clears_sprint_references(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let runtime = test_runtime()?;
    let workspace = PgWorkspace::open(shared_test_cluster, &runtime)?;
    runtime.block_on(async {
        let (_, sprint_column) = workspace.sprint_with_column("Sprint 1", "Doing").await?;
        let todo = workspace.column("To do", ColumnRole::Initial, None).await?;
        let task_id = workspace.task_in("Round trip", sprint_column).await?;
        let in_sprint = workspace.stored(task_id).await?;
        eyre::ensure!(
            in_sprint.classification() == Classification::SprintColumn,
            "expected sprint column, got {:?}",
            in_sprint.classification()
        );

        workspace.service.move_task(workspace.request(task_id, todo)).await?;
        let in_column = workspace.stored(task_id).await?;
        let Container::BoardColumn(column_id) = todo else {
            eyre::bail!("board column container expected");
        };
        let expected = PlacementRefs {
            board_column: Some(column_id),
            ..PlacementRefs::default()
        };
        eyre::ensure!(
            in_column.placement().refs() == expected,
            "stale references: {:?}",
            in_column.placement().refs()
        );

        workspace
            .service
            .move_task(workspace.request(task_id, Container::Backlog))
            .await?;
        let in_backlog = workspace.stored(task_id).await?;
        eyre::ensure!(
            in_backlog.placement().refs() == PlacementRefs::default(),
            "backlog row keeps references: {:?}",
            in_backlog.placement().refs()
        );
        Ok(())
    })
}

#[rstest]
fn illegal_reference_rows_read_back_as_orphans(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let runtime = test_runtime()?;
    let workspace = PgWorkspace::open(shared_test_cluster, &runtime)?;
    runtime.block_on(async {
        let (sprint, _) = workspace.sprint_with_column("Sprint 2", "Doing").await?;
        let todo = workspace.column("To do", ColumnRole::Initial, None).await?;
        let (Container::BoardColumn(column_id), Container::Sprint(sprint_id)) = (todo, sprint)
        else {
            eyre::bail!("unexpected container kinds");
        };
        let refs = PlacementRefs {
            board_column: Some(column_id),
            sprint: Some(sprint_id),
            ..PlacementRefs::default()
        };
        let orphan = workspace.raw_task("Legacy row", refs).await?;

        let stored = workspace.stored(orphan).await?;
        eyre::ensure!(
            *stored.placement() == Placement::Orphaned { refs },
            "expected orphaned placement, got {:?}",
            stored.placement()
        );
        eyre::ensure!(
            !workspace.order_of(todo).await?.contains(&orphan),
            "orphan listed in its column"
        );

        let repaired = workspace
            .service
            .repair_orphans(&workspace.actor, workspace.board.id())
            .await?;
        eyre::ensure!(repaired == 1, "expected one repair, got {repaired}");
        eyre::ensure!(
            workspace.order_of(Container::Backlog).await?.contains(&orphan),
            "orphan not moved to the backlog"
        );
        Ok(())
    })
}

#[rstest]
fn refused_move_into_a_missing_column_leaves_the_row_untouched(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let runtime = test_runtime()?;
    let workspace = PgWorkspace::open(shared_test_cluster, &runtime)?;
    runtime.block_on(async {
        let task_id = workspace.task("Stay put").await?;
        let ghost = Container::BoardColumn(BoardColumnId::new());

        let result = workspace.service.move_task(workspace.request(task_id, ghost)).await;

        eyre::ensure!(result.is_err(), "move into a missing column succeeded");
        let stored = workspace.stored(task_id).await?;
        eyre::ensure!(
            stored.classification() == Classification::Backlog,
            "row changed after a refused move"
        );
        Ok(())
    })
}
