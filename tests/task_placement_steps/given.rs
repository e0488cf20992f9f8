//! Given steps for task placement BDD scenarios.

use super::world::{PlacementWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use sprintboard::placement::{
    domain::{
        BoardColumn, ColumnRole, Container, Sprint, SprintColumn, TaskDetails, TaskTitle,
        TemplateTask, WipLimit,
    },
    ports::{PlacementStore, PlacementStoreError},
    services::{CreateTaskRequest, MoveTaskRequest},
};

fn parse_role(role: &str) -> Result<ColumnRole, eyre::Report> {
    ColumnRole::try_from(role).map_err(|err| eyre::eyre!("invalid role in scenario: {err}"))
}

#[given("an empty board")]
fn empty_board(world: &mut PlacementWorld) -> Result<(), eyre::Report> {
    let board = world.board.clone();
    run_async(world.store.transaction(move |tx| tx.insert_board(&board)))
        .wrap_err("store scenario board")?;
    Ok(())
}

fn add_column(
    world: &mut PlacementWorld,
    name: String,
    role: ColumnRole,
    limit: Option<u32>,
) -> Result<(), eyre::Report> {
    let base = BoardColumn::new(world.board.id(), &name, role)?;
    let column = match limit {
        Some(value) => base.with_wip_limit(WipLimit::new(value)),
        None => base,
    };
    let container = Container::BoardColumn(column.id());
    run_async(world.store.transaction(move |tx| tx.insert_board_column(&column)))
        .wrap_err("store board column")?;
    world.containers.insert(name, container);
    Ok(())
}

#[given(r#"a board column "{name}" with role "{role}" and WIP limit {limit:u32}"#)]
fn limited_column(
    world: &mut PlacementWorld,
    name: String,
    role: String,
    limit: u32,
) -> Result<(), eyre::Report> {
    let parsed = parse_role(&role)?;
    add_column(world, name, parsed, Some(limit))
}

#[given(r#"a board column "{name}" with role "{role}" and no WIP limit"#)]
fn unlimited_column(
    world: &mut PlacementWorld,
    name: String,
    role: String,
) -> Result<(), eyre::Report> {
    let parsed = parse_role(&role)?;
    add_column(world, name, parsed, None)
}

#[given(r#"a sprint column "{name}" with WIP limit {limit:u32}"#)]
fn sprint_column(world: &mut PlacementWorld, name: String, limit: u32) -> Result<(), eyre::Report> {
    let sprint = Sprint::new(world.board.id(), "Scenario sprint");
    let column = SprintColumn::new(sprint.id(), &name, ColumnRole::Initial)?
        .with_wip_limit(WipLimit::new(limit));
    let container = Container::SprintColumn(column.id(), sprint.id());
    run_async(world.store.transaction(move |tx| -> Result<(), PlacementStoreError> {
        tx.insert_sprint(&sprint)?;
        tx.insert_sprint_column(&column)
    }))
    .wrap_err("store sprint column")?;
    world.containers.insert(name, container);
    Ok(())
}

#[given(r#"a backlog task "{title}""#)]
fn backlog_task(world: &mut PlacementWorld, title: String) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(world.board.id(), title.clone());
    let task = run_async(world.service.create_task(&world.actor, request))
        .wrap_err("create backlog task")?;
    world.tasks.insert(title, task.id());
    Ok(())
}

#[given(r#"a task "{title}" placed in "{container}""#)]
fn placed_task(
    world: &mut PlacementWorld,
    title: String,
    container: String,
) -> Result<(), eyre::Report> {
    backlog_task(world, title.clone())?;
    let request = MoveTaskRequest::new(
        world.actor.clone(),
        world.task(&title)?,
        world.container(&container)?,
    );
    run_async(world.service.move_task(request)).wrap_err("place task for scenario setup")?;
    Ok(())
}

#[given(r#""{blocker}" blocks "{blocked}""#)]
fn blocks(
    world: &mut PlacementWorld,
    blocker: String,
    blocked: String,
) -> Result<(), eyre::Report> {
    let blocker_id = world.task(&blocker)?;
    let blocked_id = world.task(&blocked)?;
    run_async(world.service.add_blocker(&world.actor, blocker_id, blocked_id))
        .wrap_err("record blocking edge")?;
    Ok(())
}

#[given("{count:u32} template tasks")]
fn template_tasks(world: &mut PlacementWorld, count: u32) -> Result<(), eyre::Report> {
    for order in 0..count {
        let details = TaskDetails::new(TaskTitle::new(format!("Template {order}"))?);
        let template = TemplateTask::new(world.board.id(), details, order);
        run_async(world.store.transaction(move |tx| tx.insert_template(&template)))
            .wrap_err("store template")?;
    }
    Ok(())
}
