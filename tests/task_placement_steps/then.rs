//! Then steps for task placement BDD scenarios.

use super::world::{PlacementWorld, run_async};
use rstest_bdd_macros::then;
use sprintboard::placement::services::{MoveOutcome, PlacementError};

type MoveResult = Result<MoveOutcome, PlacementError>;

fn last_move(world: &PlacementWorld) -> Result<&MoveResult, eyre::Report> {
    world
        .last_move
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result"))
}

#[then("the move succeeds")]
fn move_succeeds(world: &PlacementWorld) -> Result<(), eyre::Report> {
    match last_move(world)? {
        Ok(_) => Ok(()),
        Err(err) => Err(eyre::eyre!("expected success, got {err}")),
    }
}

#[then("the move succeeds with a blocking warning")]
fn move_succeeds_with_warning(world: &PlacementWorld) -> Result<(), eyre::Report> {
    match last_move(world)? {
        Ok(outcome) if outcome.warning.is_some() => Ok(()),
        other => Err(eyre::eyre!("expected a warned success, got {other:?}")),
    }
}

#[then("the move fails with a capacity error")]
fn move_fails_with_capacity(world: &PlacementWorld) -> Result<(), eyre::Report> {
    let result = last_move(world)?;
    if !matches!(result, Err(PlacementError::Capacity { .. })) {
        return Err(eyre::eyre!("expected Capacity error, got {result:?}"));
    }
    Ok(())
}

#[then("the move fails with a blocked error")]
fn move_fails_with_blocked(world: &PlacementWorld) -> Result<(), eyre::Report> {
    let result = last_move(world)?;
    if !matches!(result, Err(PlacementError::Blocked { .. })) {
        return Err(eyre::eyre!("expected Blocked error, got {result:?}"));
    }
    Ok(())
}

#[then(r#""{container}" lists "{title}""#)]
fn container_lists(
    world: &PlacementWorld,
    container: String,
    title: String,
) -> Result<(), eyre::Report> {
    let target = world.container(&container)?;
    let task_id = world.task(&title)?;
    let listing = run_async(
        world
            .service
            .list_container(&world.actor, world.board.id(), target),
    )?;
    eyre::ensure!(
        listing.task_ids().contains(&task_id),
        "{container} does not list {title}"
    );
    Ok(())
}

#[then(r#""{title}" is classified as "{classification}""#)]
fn task_classified_as(
    world: &PlacementWorld,
    title: String,
    classification: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?;
    let actual = run_async(world.service.classify(task_id))?;
    eyre::ensure!(
        actual.as_str() == classification,
        "expected {classification}, found {}",
        actual.as_str()
    );
    Ok(())
}

#[then("{placed:u32} templates are placed and {skipped:u32} is skipped")]
fn templates_placed(
    world: &PlacementWorld,
    placed: u32,
    skipped: u32,
) -> Result<(), eyre::Report> {
    let report = world
        .last_clone
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing clone report"))?;
    eyre::ensure!(
        report.placed.len() == usize::try_from(placed)?
            && report.skipped.len() == usize::try_from(skipped)?,
        "expected {placed} placed and {skipped} skipped, got {report:?}"
    );
    Ok(())
}
