//! When steps for task placement BDD scenarios.

use super::world::{PlacementWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use sprintboard::placement::{domain::Container, services::MoveTaskRequest};

fn submit_move(
    world: &mut PlacementWorld,
    title: &str,
    container: &str,
    force: bool,
) -> Result<(), eyre::Report> {
    let request = MoveTaskRequest::new(
        world.actor.clone(),
        world.task(title)?,
        world.container(container)?,
    );
    let submitted = if force { request.forced() } else { request };
    let result = run_async(world.service.move_task(submitted));
    world.last_move = Some(result);
    Ok(())
}

#[when(r#""{title}" is moved to "{container}""#)]
fn move_task(
    world: &mut PlacementWorld,
    title: String,
    container: String,
) -> Result<(), eyre::Report> {
    submit_move(world, &title, &container, false)
}

#[when(r#""{title}" is force-moved to "{container}""#)]
fn force_move_task(
    world: &mut PlacementWorld,
    title: String,
    container: String,
) -> Result<(), eyre::Report> {
    submit_move(world, &title, &container, true)
}

#[when(r#"the templates are cloned into "{container}""#)]
fn clone_templates(world: &mut PlacementWorld, container: String) -> Result<(), eyre::Report> {
    let Container::SprintColumn(column_id, _) = world.container(&container)? else {
        return Err(eyre::eyre!("{container} is not a sprint column"));
    };
    let report = run_async(world.service.clone_templates_into(&world.actor, column_id))
        .wrap_err("clone templates")?;
    world.last_clone = Some(report);
    Ok(())
}
